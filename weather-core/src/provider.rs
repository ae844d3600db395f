use async_trait::async_trait;
use std::fmt::Debug;

use crate::model::{WeatherQuery, WeatherResult};

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// One network call per query, resolved to a payload or a classified failure.
#[async_trait]
pub trait WeatherClient: Send + Sync + Debug {
    async fn request(&self, query: &WeatherQuery) -> WeatherResult;
}
