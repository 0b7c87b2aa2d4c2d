use std::fmt;

use tracing::info;

use crate::fetch::{FetchError, Fetcher};
use crate::parser::extract::{automata, current};
use crate::parser::ocr::OcrEngine;
use crate::reading::WeatherReading;

pub const BASE_URL: &str = "https://www.idokep.hu";

/// Which idokep.hu page a cycle reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// `/idojaras/<location>`, plain-text current conditions.
    Location(String),
    /// `/automata/<station>`, image-rendered station measurements.
    Automata(String),
}

impl Source {
    pub fn url(&self) -> String {
        self.url_with_base(BASE_URL)
    }

    pub fn url_with_base(&self, base: &str) -> String {
        let base = base.trim_end_matches('/');
        match self {
            Source::Location(loc) => format!("{}/idojaras/{}", base, loc),
            Source::Automata(id) => format!("{}/automata/{}", base, id),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Location(loc) => write!(f, "location {}", loc),
            Source::Automata(id) => write!(f, "automata {}", id),
        }
    }
}

/// Per-cycle extraction options that are not part of the source identity.
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    pub base_url: String,
    pub lake_marker: String,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            lake_marker: current::DEFAULT_LAKE_MARKER.to_string(),
        }
    }
}

/// One scrape cycle: fetch the page, run the matching extractor, assemble.
/// Only transport failures escape; field problems surface as `None` fields.
pub fn scrape(
    source: &Source,
    fetcher: &Fetcher,
    ocr: &dyn OcrEngine,
    options: &ScrapeOptions,
) -> Result<WeatherReading, FetchError> {
    let url = source.url_with_base(&options.base_url);
    info!(%source, url = %url, "Scraping");
    let doc = fetcher.fetch(&url)?;

    let reading = match source {
        Source::Location(_) => WeatherReading::from(current::extract(&doc, &options.lake_marker)),
        Source::Automata(_) => WeatherReading::from(automata::extract(&doc, ocr)),
    };

    info!(known = reading.known_fields(), ?reading, "Scraped reading");
    Ok(reading)
}
