use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use crate::{error::LocationError, model::Coordinate};

use super::LocationProvider;

pub const DEFAULT_IP_API_URL: &str = "http://ip-api.com/json";

/// Approximate position from the public IP address.
#[derive(Debug)]
pub struct IpLocationProvider {
    url: String,
    http: Client,
    updating: AtomicBool,
}

impl IpLocationProvider {
    pub fn new(url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self { url: url.into(), http, updating: AtomicBool::new(false) })
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    message: Option<String>,
}

#[async_trait]
impl LocationProvider for IpLocationProvider {
    async fn request_authorization(&self) -> Result<(), LocationError> {
        Ok(())
    }

    async fn request_location(&self) -> Result<Vec<Coordinate>, LocationError> {
        self.updating.store(true, Ordering::SeqCst);

        let res = self
            .http
            .get(&self.url)
            .query(&[("fields", "status,message,lat,lon")])
            .send()
            .await
            .map_err(|err| LocationError::Unavailable(err.to_string()))?;

        let parsed: IpApiResponse =
            res.json().await.map_err(|err| LocationError::Unavailable(err.to_string()))?;

        debug!("ip-api response: {parsed:?}");

        if !self.updating.load(Ordering::SeqCst) {
            return Err(LocationError::Stopped);
        }

        match (parsed.status.as_str(), parsed.lat, parsed.lon) {
            ("success", Some(lat), Some(lon)) => Ok(vec![Coordinate::new(lat, lon)]),
            _ => Err(LocationError::Unavailable(
                parsed.message.unwrap_or_else(|| "no coordinate in response".to_string()),
            )),
        }
    }

    fn stop_updating(&self) {
        self.updating.store(false, Ordering::SeqCst);
    }
}
