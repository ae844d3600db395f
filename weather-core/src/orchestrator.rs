//! Request sequencing for the weather screen.
//!
//! Three independent triggers feed two display slots:
//! - the default city, fired on activation, lands in the local slot
//! - the device location, fired shortly after, also lands in the local slot
//! - a manual search lands in the searched slot
//!
//! Every trigger runs on its own task and reports back through a channel of
//! [`ScreenEvent`]s. Nothing here touches display state; the receiving
//! [`Screen`](crate::screen::Screen) maps results on its own turn. Within a
//! slot, whichever response arrives last wins.

use std::{sync::Arc, time::Duration};

use log::{debug, info, warn};
use tokio::{sync::mpsc::UnboundedSender, task::JoinHandle};

use crate::{
    location::LocationProvider,
    model::{RequestOrigin, WeatherQuery, WeatherResult},
    preferences::{CITY_KEY, PreferenceStore, default_city},
    provider::WeatherClient,
};

/// Message from a background request to the presentation turn.
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenEvent {
    /// A location lookup started.
    Locating,
    /// The location lookup finished, with or without a fix.
    LocationSettled,
    /// A weather request completed.
    Weather { origin: RequestOrigin, result: WeatherResult },
}

#[derive(Debug, Clone)]
pub struct Orchestrator {
    client: Arc<dyn WeatherClient>,
    location: Arc<dyn LocationProvider>,
    preferences: Arc<dyn PreferenceStore>,
    events: UnboundedSender<ScreenEvent>,
    location_delay: Duration,
}

impl Orchestrator {
    pub fn new(
        client: Arc<dyn WeatherClient>,
        location: Arc<dyn LocationProvider>,
        preferences: Arc<dyn PreferenceStore>,
        events: UnboundedSender<ScreenEvent>,
    ) -> Self {
        Self { client, location, preferences, events, location_delay: Duration::from_millis(500) }
    }

    pub fn with_location_delay(mut self, delay: Duration) -> Self {
        self.location_delay = delay;
        self
    }

    /// Screen load: ask for location permission once.
    pub async fn prepare(&self) {
        match self.location.request_authorization().await {
            Ok(()) => debug!("Location access authorized"),
            Err(err) => warn!("Location access not available: {err}"),
        }
    }

    /// Screen activation: default city now, location after the configured delay.
    pub fn activate(&self) -> Vec<JoinHandle<()>> {
        let default_city = self.request_for_default_city();

        let this = self.clone();
        let delayed_location = tokio::spawn(async move {
            tokio::time::sleep(this.location_delay).await;
            this.locate_and_fetch().await;
        });

        vec![default_city, delayed_location]
    }

    pub fn request_for_default_city(&self) -> JoinHandle<()> {
        let city = default_city(self.preferences.as_ref());
        self.issue(RequestOrigin::DefaultCity, WeatherQuery::ByCityName(city))
    }

    /// Blank input is ignored and issues nothing. A successful search
    /// becomes the stored default city.
    pub fn request_for_searched_city(&self, text: &str) -> Option<JoinHandle<()>> {
        let city = text.trim();
        if city.is_empty() {
            debug!("Ignoring empty search");
            return None;
        }

        Some(self.issue(RequestOrigin::Search, WeatherQuery::ByCityName(city.to_string())))
    }

    pub fn request_user_location(&self) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move { this.locate_and_fetch().await })
    }

    fn issue(&self, origin: RequestOrigin, query: WeatherQuery) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move { this.fetch(origin, query).await })
    }

    async fn fetch(&self, origin: RequestOrigin, query: WeatherQuery) {
        debug!("Issuing {origin:?} request: {query:?}");
        let result = self.client.request(&query).await;

        if let (RequestOrigin::Search, Ok(payload)) = (origin, &result) {
            if let Err(err) = self.preferences.set_string(CITY_KEY, &payload.city_name) {
                warn!("Failed to remember searched city: {err:#}");
            }
        }

        self.send(ScreenEvent::Weather { origin, result });
    }

    async fn locate_and_fetch(&self) {
        self.send(ScreenEvent::Locating);

        let fix = match self.location.request_location().await {
            Ok(fixes) => fixes.last().copied(),
            Err(err) => {
                warn!("Location lookup failed: {err}");
                None
            }
        };

        let Some(coordinate) = fix else {
            self.send(ScreenEvent::LocationSettled);
            return;
        };

        self.location.stop_updating();
        self.send(ScreenEvent::LocationSettled);
        info!("Using location fix {:.4}, {:.4}", coordinate.latitude, coordinate.longitude);

        self.fetch(RequestOrigin::Location, WeatherQuery::ByCoordinates(coordinate)).await;
    }

    fn send(&self, event: ScreenEvent) {
        if self.events.send(event).is_err() {
            debug!("Screen is gone, dropping event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    use crate::{
        error::{LocationError, RequestError},
        model::{Coordinate, WeatherPayload},
        preferences::{CITY_KEY, FALLBACK_CITY, MemoryPreferences},
    };

    type Journal = Arc<Mutex<Vec<String>>>;

    fn payload(city: &str, lat: f64, lon: f64) -> WeatherPayload {
        WeatherPayload {
            city_name: city.to_string(),
            condition_id: 500,
            description: "light rain".to_string(),
            temperature_c: 14.0,
            coordinate: Coordinate::new(lat, lon),
            observation_time: None,
        }
    }

    #[derive(Debug)]
    struct FakeClient {
        journal: Journal,
        queries: Mutex<Vec<WeatherQuery>>,
    }

    #[async_trait]
    impl WeatherClient for FakeClient {
        async fn request(&self, query: &WeatherQuery) -> WeatherResult {
            self.journal.lock().unwrap().push("request".to_string());
            self.queries.lock().unwrap().push(query.clone());

            match query {
                WeatherQuery::ByCityName(name) if name == "Paris" => Ok(payload("Paris", 48.85, 2.35)),
                WeatherQuery::ByCityName(name) if name == "Offline" => Err(RequestError::NetworkError),
                WeatherQuery::ByCityName(_) => Err(RequestError::InvalidResponse),
                WeatherQuery::ByCoordinates(c) => Ok(payload("London", c.latitude, c.longitude)),
            }
        }
    }

    #[derive(Debug)]
    struct FakeLocation {
        journal: Journal,
        fixes: Result<Vec<Coordinate>, LocationError>,
    }

    #[async_trait]
    impl LocationProvider for FakeLocation {
        async fn request_authorization(&self) -> Result<(), LocationError> {
            self.journal.lock().unwrap().push("authorize".to_string());
            Ok(())
        }

        async fn request_location(&self) -> Result<Vec<Coordinate>, LocationError> {
            self.journal.lock().unwrap().push("locate".to_string());
            self.fixes.clone()
        }

        fn stop_updating(&self) {
            self.journal.lock().unwrap().push("stop".to_string());
        }
    }

    struct Harness {
        orchestrator: Orchestrator,
        client: Arc<FakeClient>,
        journal: Journal,
        prefs: Arc<MemoryPreferences>,
        events: UnboundedReceiver<ScreenEvent>,
    }

    fn harness(fixes: Result<Vec<Coordinate>, LocationError>, prefs: MemoryPreferences) -> Harness {
        let journal: Journal = Arc::default();
        let client = Arc::new(FakeClient { journal: journal.clone(), queries: Mutex::default() });
        let location = Arc::new(FakeLocation { journal: journal.clone(), fixes });
        let (tx, rx) = mpsc::unbounded_channel();

        let prefs = Arc::new(prefs);
        let orchestrator = Orchestrator::new(client.clone(), location, prefs.clone(), tx);
        Harness { orchestrator, client, journal, prefs, events: rx }
    }

    fn drain(rx: &mut UnboundedReceiver<ScreenEvent>) -> Vec<ScreenEvent> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            out.push(event);
        }
        out
    }

    #[tokio::test]
    async fn search_issues_one_city_query_for_searched_slot() {
        let mut h = harness(Ok(vec![]), MemoryPreferences::new());

        h.orchestrator.request_for_searched_city("  Paris ").expect("issued").await.unwrap();

        assert_eq!(*h.client.queries.lock().unwrap(), vec![WeatherQuery::ByCityName("Paris".into())]);
        let events = drain(&mut h.events);
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            ScreenEvent::Weather { origin: RequestOrigin::Search, result: Ok(p) } if p.city_name == "Paris"
        ));
    }

    #[tokio::test]
    async fn successful_search_becomes_default_city() {
        let h = harness(Ok(vec![]), MemoryPreferences::with(CITY_KEY, "Lyon"));

        h.orchestrator.request_for_searched_city("paris").expect("issued").await.unwrap();
        assert_eq!(h.prefs.get_string(CITY_KEY).as_deref(), Some("Lyon"));

        h.orchestrator.request_for_searched_city("Paris").expect("issued").await.unwrap();
        assert_eq!(h.prefs.get_string(CITY_KEY).as_deref(), Some("Paris"));

        h.orchestrator.request_for_default_city().await.unwrap();
        assert_eq!(
            h.client.queries.lock().unwrap().last(),
            Some(&WeatherQuery::ByCityName("Paris".into()))
        );
    }

    #[tokio::test]
    async fn failed_search_keeps_default_city() {
        let h = harness(Ok(vec![]), MemoryPreferences::with(CITY_KEY, "Lyon"));

        h.orchestrator.request_for_searched_city("Atlantis").expect("issued").await.unwrap();
        h.orchestrator.request_for_searched_city("Offline").expect("issued").await.unwrap();

        assert_eq!(h.prefs.get_string(CITY_KEY).as_deref(), Some("Lyon"));
    }

    #[tokio::test]
    async fn blank_search_is_a_no_op() {
        let mut h = harness(Ok(vec![]), MemoryPreferences::new());

        assert!(h.orchestrator.request_for_searched_city("").is_none());
        assert!(h.orchestrator.request_for_searched_city("   \t").is_none());

        assert!(h.client.queries.lock().unwrap().is_empty());
        assert!(drain(&mut h.events).is_empty());
    }

    #[tokio::test]
    async fn default_city_uses_stored_preference() {
        let mut h = harness(Ok(vec![]), MemoryPreferences::with(CITY_KEY, "Lyon"));

        h.orchestrator.request_for_default_city().await.unwrap();

        assert_eq!(*h.client.queries.lock().unwrap(), vec![WeatherQuery::ByCityName("Lyon".into())]);
        assert_eq!(
            drain(&mut h.events),
            vec![ScreenEvent::Weather {
                origin: RequestOrigin::DefaultCity,
                result: Err(RequestError::InvalidResponse),
            }]
        );
    }

    #[tokio::test]
    async fn default_city_falls_back_without_preference() {
        let h = harness(Ok(vec![]), MemoryPreferences::new());

        h.orchestrator.request_for_default_city().await.unwrap();

        assert_eq!(
            *h.client.queries.lock().unwrap(),
            vec![WeatherQuery::ByCityName(FALLBACK_CITY.into())]
        );
    }

    #[tokio::test]
    async fn location_uses_latest_fix_and_stops_before_requesting() {
        let fixes = vec![Coordinate::new(10.0, 10.0), Coordinate::new(48.85, 2.35)];
        let mut h = harness(Ok(fixes), MemoryPreferences::new());

        h.orchestrator.request_user_location().await.unwrap();

        assert_eq!(
            *h.client.queries.lock().unwrap(),
            vec![WeatherQuery::ByCoordinates(Coordinate::new(48.85, 2.35))]
        );
        assert_eq!(*h.journal.lock().unwrap(), vec!["locate", "stop", "request"]);

        let events = drain(&mut h.events);
        assert_eq!(events[0], ScreenEvent::Locating);
        assert_eq!(events[1], ScreenEvent::LocationSettled);
        assert!(matches!(
            &events[2],
            ScreenEvent::Weather { origin: RequestOrigin::Location, result: Ok(_) }
        ));
    }

    #[tokio::test]
    async fn location_failure_is_swallowed() {
        let mut h = harness(
            Err(LocationError::Unavailable("no signal".into())),
            MemoryPreferences::new(),
        );

        h.orchestrator.request_user_location().await.unwrap();

        assert!(h.client.queries.lock().unwrap().is_empty());
        assert_eq!(drain(&mut h.events), vec![ScreenEvent::Locating, ScreenEvent::LocationSettled]);
        assert!(!h.journal.lock().unwrap().contains(&"stop".to_string()));
    }

    #[tokio::test]
    async fn empty_fix_list_issues_nothing() {
        let mut h = harness(Ok(vec![]), MemoryPreferences::new());

        h.orchestrator.request_user_location().await.unwrap();

        assert!(h.client.queries.lock().unwrap().is_empty());
        assert_eq!(drain(&mut h.events), vec![ScreenEvent::Locating, ScreenEvent::LocationSettled]);
    }

    #[tokio::test]
    async fn prepare_requests_authorization() {
        let h = harness(Ok(vec![]), MemoryPreferences::new());

        h.orchestrator.prepare().await;

        assert_eq!(*h.journal.lock().unwrap(), vec!["authorize"]);
    }

    #[tokio::test(start_paused = true)]
    async fn activate_fires_default_city_then_location() {
        let mut h = harness(Ok(vec![Coordinate::new(51.5, -0.12)]), MemoryPreferences::new());
        let orchestrator = h.orchestrator.clone().with_location_delay(Duration::from_millis(500));

        for handle in orchestrator.activate() {
            handle.await.unwrap();
        }

        assert_eq!(
            *h.client.queries.lock().unwrap(),
            vec![
                WeatherQuery::ByCityName(FALLBACK_CITY.into()),
                WeatherQuery::ByCoordinates(Coordinate::new(51.5, -0.12)),
            ]
        );

        let origins: Vec<_> = drain(&mut h.events)
            .into_iter()
            .filter_map(|event| match event {
                ScreenEvent::Weather { origin, .. } => Some(origin),
                _ => None,
            })
            .collect();
        assert_eq!(origins, vec![RequestOrigin::DefaultCity, RequestOrigin::Location]);
    }

    #[tokio::test]
    async fn dropped_screen_does_not_fail_requests() {
        let h = harness(Ok(vec![]), MemoryPreferences::new());
        drop(h.events);

        h.orchestrator.request_for_searched_city("Offline").expect("issued").await.unwrap();

        assert_eq!(h.client.queries.lock().unwrap().len(), 1);
    }
}
