//! Scrapes idokep.hu weather pages and republishes the readings to a
//! Weather Underground personal weather station.
//!
//! Two page shapes are supported:
//!   - `/idojaras/<location>`: current conditions rendered as plain HTML text
//!   - `/automata/<station>`: station measurements rendered as inline base64
//!     images, recovered through OCR

pub mod fetch;
pub mod parser;
pub mod publish;
pub mod reading;
pub mod scrape;
pub mod settings;

pub use reading::WeatherReading;
pub use scrape::{scrape, Source};
