//! Core library for the travel weather screen.
//!
//! This crate defines:
//! - Shared domain models (queries, payloads, display fields, slots)
//! - The OpenWeather client and location providers
//! - Preference storage and on-disk configuration
//! - The orchestrator that sequences requests and the screen state they feed
//!
//! It is used by `travel-weather-cli`, but can also back other front ends.

pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod orchestrator;
pub mod preferences;
pub mod provider;
pub mod screen;

pub use config::Config;
pub use error::{LocationError, RequestError};
pub use location::{DisabledLocationProvider, FixedLocationProvider, IpLocationProvider, LocationProvider};
pub use model::{Coordinate, DisplaySlot, RequestOrigin, WeatherDisplay, WeatherPayload, WeatherQuery};
pub use orchestrator::{Orchestrator, ScreenEvent};
pub use preferences::{ConfigPreferences, MemoryPreferences, PreferenceStore};
pub use provider::{OpenWeatherClient, WeatherClient};
pub use screen::{Alert, Screen};
