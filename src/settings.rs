use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;

use crate::parser::extract::current::DEFAULT_LAKE_MARKER;
use crate::scrape::{ScrapeOptions, Source, BASE_URL};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("missing required configuration: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub wunderground_id: Option<String>,
    pub wunderground_key: Option<String>,
    pub idokep_location: Option<String>,
    pub idokep_automata_id: Option<String>,
    #[serde(default)]
    pub use_automata: bool,
    #[serde(default = "default_scan_interval")]
    pub scan_interval: u64,
    #[serde(default)]
    pub run_once: bool,
    #[serde(default = "default_tesseract_path")]
    pub tesseract_path: PathBuf,
    #[serde(default = "default_lake_marker")]
    pub lake_marker: String,
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
    #[serde(default = "default_base_url")]
    pub idokep_base_url: String,
}

fn default_scan_interval() -> u64 {
    900
}

fn default_tesseract_path() -> PathBuf {
    PathBuf::from("tesseract")
}

fn default_lake_marker() -> String {
    DEFAULT_LAKE_MARKER.to_string()
}

fn default_http_timeout() -> u64 {
    10
}

fn default_base_url() -> String {
    BASE_URL.to_string()
}

/// Station credentials for the upload endpoint.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub station_id: String,
    pub api_key: String,
}

const LOCATION_OR_AUTOMATA: &str = "idokep_location or idokep_automata_id with use_automata=true";

impl Settings {
    /// Optional `idokep_bridge.{toml,yaml,json}` in the working directory,
    /// overridden by environment variables (`WUNDERGROUND_ID`, `USE_AUTOMATA`, ...).
    /// Values stay strings until deserialized so ids and keys keep leading zeros.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(Environment::default())
    }

    fn load_from(env: Environment) -> Result<Self, SettingsError> {
        let settings = Config::builder()
            .add_source(File::with_name("idokep_bridge").required(false))
            .add_source(env)
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// Automata wins when enabled and a station id is present.
    pub fn source(&self) -> Result<Source, SettingsError> {
        let station = non_empty(&self.idokep_automata_id);
        let location = non_empty(&self.idokep_location);

        match (self.use_automata, station, location) {
            (true, Some(id), _) => Ok(Source::Automata(id.to_string())),
            (_, _, Some(loc)) => Ok(Source::Location(loc.to_string())),
            _ => Err(SettingsError::Missing(vec![LOCATION_OR_AUTOMATA])),
        }
    }

    pub fn credentials(&self) -> Result<Credentials, SettingsError> {
        match (non_empty(&self.wunderground_id), non_empty(&self.wunderground_key)) {
            (Some(id), Some(key)) => Ok(Credentials {
                station_id: id.to_string(),
                api_key: key.to_string(),
            }),
            (id, key) => {
                let mut missing = Vec::new();
                if id.is_none() {
                    missing.push("wunderground_id");
                }
                if key.is_none() {
                    missing.push("wunderground_key");
                }
                Err(SettingsError::Missing(missing))
            }
        }
    }

    /// Every missing key at once, so a misconfigured deployment is fixed in one go.
    pub fn validate(&self, needs_credentials: bool) -> Result<(), SettingsError> {
        let mut missing = Vec::new();
        if needs_credentials {
            if let Err(SettingsError::Missing(keys)) = self.credentials() {
                missing.extend(keys);
            }
        }
        if self.source().is_err() {
            missing.push(LOCATION_OR_AUTOMATA);
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(SettingsError::Missing(missing))
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval)
    }

    pub fn scrape_options(&self) -> ScrapeOptions {
        ScrapeOptions {
            base_url: self.idokep_base_url.clone(),
            lake_marker: self.lake_marker.clone(),
        }
    }
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Settings {
        let mut builder = Config::builder();
        for (k, v) in pairs {
            builder = builder.set_override(*k, *v).unwrap();
        }
        builder.build().unwrap().try_deserialize().unwrap()
    }

    #[test]
    fn defaults() {
        let s = from_pairs(&[("idokep_location", "Velence")]);
        assert_eq!(s.scan_interval, 900);
        assert_eq!(s.http_timeout(), Duration::from_secs(10));
        assert_eq!(s.tesseract_path, PathBuf::from("tesseract"));
        assert_eq!(s.lake_marker, "Velencei-tó:");
        assert!(!s.use_automata);
        assert!(!s.run_once);
    }

    #[test]
    fn location_source() {
        let s = from_pairs(&[("idokep_location", "Velence"), ("idokep_automata_id", "fejnto")]);
        assert_eq!(s.source().unwrap(), Source::Location("Velence".into()));
    }

    #[test]
    fn automata_source_needs_flag() {
        let s = from_pairs(&[
            ("idokep_location", "Velence"),
            ("idokep_automata_id", "fejnto"),
            ("use_automata", "true"),
        ]);
        assert_eq!(s.source().unwrap(), Source::Automata("fejnto".into()));
    }

    #[test]
    fn automata_flag_without_station_falls_back_to_location() {
        let s = from_pairs(&[("idokep_location", "Velence"), ("use_automata", "true")]);
        assert_eq!(s.source().unwrap(), Source::Location("Velence".into()));
    }

    #[test]
    fn no_source_is_a_config_error() {
        let s = from_pairs(&[("wunderground_id", "IVELEN1"), ("idokep_location", "  ")]);
        let err = s.source().unwrap_err();
        assert!(matches!(err, SettingsError::Missing(ref keys) if keys == &[LOCATION_OR_AUTOMATA]));
    }

    #[test]
    fn validate_reports_everything_missing() {
        let s = from_pairs(&[("scan_interval", "60")]);
        let err = s.validate(true).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("missing required configuration: wunderground_id, wunderground_key, {}", LOCATION_OR_AUTOMATA)
        );
        let err = s.validate(false).unwrap_err();
        assert!(matches!(err, SettingsError::Missing(ref keys) if keys.len() == 1));
    }

    fn from_env(pairs: &[(&str, &str)]) -> Settings {
        let vars: config::Map<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::load_from(Environment::default().source(Some(vars))).unwrap()
    }

    #[test]
    fn numeric_looking_env_values_stay_verbatim() {
        let s = from_env(&[
            ("WUNDERGROUND_ID", "IVELEN1"),
            ("WUNDERGROUND_KEY", "00123456"),
            ("IDOKEP_AUTOMATA_ID", "1.50"),
            ("USE_AUTOMATA", "true"),
            ("SCAN_INTERVAL", "600"),
        ]);
        assert_eq!(s.wunderground_key.as_deref(), Some("00123456"));
        assert_eq!(s.idokep_automata_id.as_deref(), Some("1.50"));
        assert_eq!(s.source().unwrap(), Source::Automata("1.50".into()));
        assert!(s.use_automata);
        assert_eq!(s.scan_interval, 600);
    }

    #[test]
    fn credentials() {
        let s = from_pairs(&[("wunderground_id", "IVELEN1"), ("wunderground_key", "secret")]);
        let c = s.credentials().unwrap();
        assert_eq!(c.station_id, "IVELEN1");
        assert_eq!(c.api_key, "secret");
    }
}
