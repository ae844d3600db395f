use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RequestError;

/// A geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// What to ask the weather API for. Built once per request.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherQuery {
    ByCityName(String),
    ByCoordinates(Coordinate),
}

impl WeatherQuery {
    /// Ordered query parameters: credential, units, then the location terms.
    pub fn parameters(&self, api_key: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![("appid", api_key.to_string()), ("units", "metric".to_string())];

        match self {
            WeatherQuery::ByCityName(name) => params.push(("q", name.clone())),
            WeatherQuery::ByCoordinates(coord) => {
                params.push(("lat", coord.latitude.to_string()));
                params.push(("lon", coord.longitude.to_string()));
            }
        }

        params
    }
}

/// Which of the two display areas a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplaySlot {
    Searched,
    Local,
}

/// The trigger that produced a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestOrigin {
    DefaultCity,
    Location,
    Search,
}

impl RequestOrigin {
    pub fn slot(&self) -> DisplaySlot {
        match self {
            RequestOrigin::DefaultCity | RequestOrigin::Location => DisplaySlot::Local,
            RequestOrigin::Search => DisplaySlot::Searched,
        }
    }
}

/// Decoded weather for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherPayload {
    pub city_name: String,
    pub condition_id: u16,
    pub description: String,
    pub temperature_c: f64,
    pub coordinate: Coordinate,
    pub observation_time: Option<DateTime<Utc>>,
}

pub type WeatherResult = Result<WeatherPayload, RequestError>;

/// The four fields a slot shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherDisplay {
    pub city_name: String,
    pub description: String,
    pub icon: String,
    pub temperature: String,
}

impl From<&WeatherPayload> for WeatherDisplay {
    fn from(payload: &WeatherPayload) -> Self {
        Self {
            city_name: payload.city_name.clone(),
            description: payload.description.clone(),
            icon: condition_icon(payload.condition_id).to_string(),
            temperature: format_temperature(payload.temperature_c),
        }
    }
}

/// Icon key for an OpenWeather condition code.
pub fn condition_icon(condition_id: u16) -> &'static str {
    match condition_id {
        200..=232 => "cloud.bolt",
        300..=321 => "cloud.drizzle",
        500..=531 => "cloud.rain",
        600..=622 => "cloud.snow",
        701..=781 => "cloud.fog",
        800 => "sun.max",
        _ => "cloud",
    }
}

pub fn format_temperature(celsius: f64) -> String {
    format!("{celsius:.1}°C")
}
