//! Weather Underground PWS upload.
//!
//! Converts a [`WeatherReading`] to imperial units and sends it through the
//! legacy `updateweatherstation.php` GET endpoint. Unknown fields are left out
//! of the request, never sent as zero.

use std::time::Duration;

use reqwest::blocking::Client;
use thiserror::Error;
use tracing::{error, info};

use crate::reading::WeatherReading;

pub const UPLOAD_URL: &str =
    "https://weatherstation.wunderground.com/weatherstation/updateweatherstation.php";

/// 8-point compass in both the source's Hungarian abbreviations and English.
const COMPASS: &[(&[&str], u16)] = &[
    (&["É", "N"], 0),
    (&["ÉK", "NE"], 45),
    (&["K", "E"], 90),
    (&["DK", "SE"], 135),
    (&["D", "S"], 180),
    (&["DNy", "SW"], 225),
    (&["Ny", "W"], 270),
    (&["ÉNy", "NW"], 315),
];

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("upload request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upload rejected (HTTP {status}): {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
}

pub struct WundergroundClient {
    client: Client,
    endpoint: String,
    station_id: String,
    api_key: String,
}

impl WundergroundClient {
    pub fn new(station_id: &str, api_key: &str, timeout: Duration) -> Result<Self, PublishError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(PublishError::Client)?;
        Ok(Self::with_client(client, UPLOAD_URL, station_id, api_key))
    }

    pub fn with_client(client: Client, endpoint: &str, station_id: &str, api_key: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
            station_id: station_id.to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn send(&self, reading: &WeatherReading) -> Result<(), PublishError> {
        let mut params: Vec<(&str, String)> = vec![
            ("ID", self.station_id.clone()),
            ("PASSWORD", self.api_key.clone()),
            ("action", "updateraw".to_string()),
            ("dateutc", "now".to_string()),
        ];
        params.extend(to_params(reading));

        info!(station = %self.station_id, "Sending data to Weather Underground");
        let response = self.client.get(&self.endpoint).query(&params).send()?;
        let status = response.status();
        let body = response.text()?;

        if status == reqwest::StatusCode::OK && body.to_lowercase().contains("success") {
            info!(station = %self.station_id, "Upload accepted");
            Ok(())
        } else {
            error!(station = %self.station_id, %status, body = %body.trim(), "Upload rejected");
            Err(PublishError::Rejected {
                status,
                body: body.trim().to_string(),
            })
        }
    }
}

/// Weather-field query parameters for a reading, in imperial units.
pub fn to_params(reading: &WeatherReading) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();

    let temperature = reading.temperature.or_else(|| {
        let lake = reading.lake_temperature?;
        info!(lake_temperature = lake, "Using lake temperature as fallback");
        Some(lake)
    });
    if let Some(c) = temperature {
        params.push(("tempf", format!("{:.2}", celsius_to_fahrenheit(c))));
        params.push(("tempc", c.to_string()));
    }
    if let Some(c) = reading.dew_point {
        params.push(("dewptf", format!("{:.2}", celsius_to_fahrenheit(c))));
    }
    if let Some(h) = reading.humidity {
        params.push(("humidity", h.to_string()));
    }
    if let Some(p) = reading.pressure {
        params.push(("baromin", format!("{:.2}", hpa_to_inches(p))));
    }
    if let Some(s) = reading.wind_speed {
        params.push(("windspeedmph", format!("{:.2}", kmh_to_mph(s))));
    }
    if let Some(d) = reading.wind_direction.as_deref() {
        params.push(("winddir", wind_direction_degrees(d).to_string()));
    }
    if let Some(mm) = reading.precipitation {
        params.push(("rainin", format!("{:.2}", mm_to_inches(mm))));
    }
    if let Some(mm) = reading.precipitation_24h {
        params.push(("dailyrainin", format!("{:.2}", mm_to_inches(mm))));
    }
    if let Some(c) = reading.condition.as_deref() {
        params.push(("weather", c.to_string()));
    }
    if let Some(a) = reading.alert.as_deref() {
        info!(alert = %a, "Weather alert");
        params.push(("weatherAlert", a.to_string()));
    }

    params
}

pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

pub fn hpa_to_inches(hpa: f64) -> f64 {
    hpa * 0.02953
}

pub fn kmh_to_mph(kmh: f64) -> f64 {
    kmh * 0.621371
}

pub fn mm_to_inches(mm: f64) -> f64 {
    mm * 0.0393701
}

/// Unknown directions map to north (0).
pub fn wind_direction_degrees(direction: &str) -> u16 {
    let d = direction.trim();
    COMPASS
        .iter()
        .find(|(names, _)| names.contains(&d))
        .map(|(_, deg)| *deg)
        .unwrap_or(0)
}
