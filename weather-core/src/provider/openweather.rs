use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    config::Config,
    error::RequestError,
    model::{Coordinate, WeatherPayload, WeatherQuery, WeatherResult},
};

use super::WeatherClient;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    base_url: String,
    api_key: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self { base_url: base_url.into(), api_key: api_key.into(), http })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let api_key = config.api_key().ok_or_else(|| {
            anyhow::anyhow!(
                "No OpenWeather API key configured.\n\
                 Hint: run `travel-weather configure` or set OPENWEATHER_API_KEY."
            )
        })?;

        Self::new(config.base_url.clone(), api_key, config.timeout())
    }
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lon: f64,
    lat: f64,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: u16,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    coord: OwCoord,
    main: OwMain,
    weather: Vec<OwWeather>,
    dt: Option<i64>,
}

fn into_payload(parsed: OwCurrentResponse) -> WeatherResult {
    let condition = parsed.weather.into_iter().next().ok_or(RequestError::InvalidResponse)?;

    Ok(WeatherPayload {
        city_name: parsed.name,
        condition_id: condition.id,
        description: condition.description,
        temperature_c: parsed.main.temp,
        coordinate: Coordinate::new(parsed.coord.lat, parsed.coord.lon),
        observation_time: parsed.dt.and_then(unix_to_utc),
    })
}

#[async_trait]
impl WeatherClient for OpenWeatherClient {
    async fn request(&self, query: &WeatherQuery) -> WeatherResult {
        debug!("OpenWeather request: {query:?}");

        let res = self
            .http
            .get(&self.base_url)
            .query(&query.parameters(&self.api_key))
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            debug!("OpenWeather request failed with status {}: {}", status, truncate_body(&body));
            return Err(RequestError::InvalidResponse);
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body).map_err(|err| {
            debug!("Failed to parse OpenWeather current JSON: {err}");
            RequestError::InvalidResponse
        })?;

        into_payload(parsed)
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
