//! Presentation-side state for the weather screen.
//!
//! All mapping from results to display fields happens here, on whichever
//! task owns the [`Screen`], never on the request tasks.

use log::{info, warn};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::{
    error::RequestError,
    model::{DisplaySlot, RequestOrigin, WeatherDisplay, WeatherResult},
    orchestrator::ScreenEvent,
};

pub const ALERT_TITLE: &str = "Error";

pub const SETTINGS_CITY_ERROR: &str =
    "We couldn't find weather for your saved city. Please check the city in Settings.";

pub const SEARCH_CITY_ERROR: &str = "City not found. Please try another search.";

/// A modal message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(message: impl Into<String>) -> Self {
        Self { title: ALERT_TITLE.to_string(), message: message.into() }
    }
}

/// User-facing text for a failed request, or `None` if it stays silent.
pub fn failure_message(origin: RequestOrigin, err: RequestError) -> Option<String> {
    match err {
        RequestError::Cancelled => None,
        RequestError::InvalidResponse => Some(
            match origin {
                RequestOrigin::DefaultCity | RequestOrigin::Location => SETTINGS_CITY_ERROR,
                RequestOrigin::Search => SEARCH_CITY_ERROR,
            }
            .to_string(),
        ),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Default, Clone)]
pub struct Screen {
    searched: Option<WeatherDisplay>,
    local: Option<WeatherDisplay>,
    locating: bool,
}

impl Screen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self, slot: DisplaySlot) -> Option<&WeatherDisplay> {
        match slot {
            DisplaySlot::Searched => self.searched.as_ref(),
            DisplaySlot::Local => self.local.as_ref(),
        }
    }

    /// Whether the location activity indicator is showing.
    pub fn is_locating(&self) -> bool {
        self.locating
    }

    pub fn apply(&mut self, event: ScreenEvent) -> Option<Alert> {
        match event {
            ScreenEvent::Locating => {
                self.locating = true;
                None
            }
            ScreenEvent::LocationSettled => {
                self.locating = false;
                None
            }
            ScreenEvent::Weather { origin, result } => self.apply_result(origin, result),
        }
    }

    fn apply_result(&mut self, origin: RequestOrigin, result: WeatherResult) -> Option<Alert> {
        match result {
            Ok(payload) => {
                let slot = origin.slot();
                let display = WeatherDisplay::from(&payload);
                info!("{slot:?} slot now shows {} ({})", display.city_name, display.temperature);

                // Whole-value replace; the four fields never mix across responses.
                match slot {
                    DisplaySlot::Searched => self.searched = Some(display),
                    DisplaySlot::Local => self.local = Some(display),
                }
                None
            }
            Err(err) => {
                let message = failure_message(origin, err);
                if message.is_none() {
                    warn!("Suppressed {origin:?} failure: {err}");
                }
                message.map(Alert::new)
            }
        }
    }

    /// Apply events in arrival order until every sender is gone.
    pub async fn run<F>(&mut self, mut events: UnboundedReceiver<ScreenEvent>, mut on_alert: F)
    where
        F: FnMut(Alert),
    {
        while let Some(event) = events.recv().await {
            if let Some(alert) = self.apply(event) {
                on_alert(alert);
            }
        }
    }
}
