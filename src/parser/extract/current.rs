use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::{info, warn};

use crate::parser::query::{find_text_node, select_first, selector, text};
use crate::reading::CurrentConditions;

pub const DEFAULT_LAKE_MARKER: &str = "Velencei-tó:";

static TEMPERATURE_SEL: LazyLock<Selector> = LazyLock::new(|| selector(".current-temperature"));
static CONDITION_SEL: LazyLock<Selector> = LazyLock::new(|| selector(".current-weather"));
static ALERT_SEL: LazyLock<Selector> = LazyLock::new(|| selector("#topalertbar > a:nth-child(1)"));

const DEGREE_SUFFIXES: &[&str] = &["˚C", "°C"];

/// Ordered condition keywords -> estimated relative humidity. First hit wins.
/// The page publishes no humidity, so this table stands in for a sensor.
const HUMIDITY_RULES: &[(&[&str], u8)] = &[
    (&["eső", "zivatar"], 80),
    (&["felhős"], 60),
    (&["napos"], 40),
];

/// Extract current conditions from a `/idojaras/<location>` page.
pub fn extract(doc: &Html, lake_marker: &str) -> CurrentConditions {
    let condition = extract_condition(doc);
    let humidity = condition.as_deref().and_then(estimate_humidity);

    CurrentConditions {
        temperature: extract_temperature(doc),
        lake_temperature: extract_lake_temperature(doc, lake_marker),
        alert: extract_alert(doc),
        humidity,
        condition,
    }
}

fn extract_temperature(doc: &Html) -> Option<f64> {
    let raw = text(select_first(doc, &TEMPERATURE_SEL)?);
    match parse_degrees(&raw) {
        Some(t) => {
            info!(temperature = t, "Found temperature");
            Some(t)
        }
        None => {
            warn!(field = "temperature", text = %raw, "Could not parse temperature");
            None
        }
    }
}

fn extract_lake_temperature(doc: &Html, marker: &str) -> Option<f64> {
    let raw = find_text_node(doc, marker)?.trim();
    let value = raw.split(':').nth(1).and_then(parse_degrees);
    match value {
        Some(t) => info!(lake_temperature = t, "Found lake temperature"),
        None => warn!(field = "lake_temperature", text = %raw, "Could not parse lake temperature"),
    }
    value
}

fn extract_condition(doc: &Html) -> Option<String> {
    let condition = text(select_first(doc, &CONDITION_SEL)?);
    if condition.is_empty() {
        return None;
    }
    info!(condition = %condition, "Found weather condition");
    Some(condition)
}

fn extract_alert(doc: &Html) -> Option<String> {
    let alert = text(select_first(doc, &ALERT_SEL)?);
    if alert.is_empty() {
        return None;
    }
    info!(alert = %alert, "Found weather alert");
    Some(alert)
}

/// Strict float parse after dropping a degree-Celsius suffix: "21.4˚C" -> 21.4.
fn parse_degrees(raw: &str) -> Option<f64> {
    let mut s = raw.trim();
    for suffix in DEGREE_SUFFIXES {
        s = s.trim_end_matches(suffix).trim_end();
    }
    s.parse::<f64>().ok()
}

pub fn estimate_humidity(condition: &str) -> Option<u8> {
    let lower = condition.to_lowercase();
    HUMIDITY_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, pct)| *pct)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(fixture: &str) -> CurrentConditions {
        let html = std::fs::read_to_string(format!("tests/fixtures/{}.html", fixture)).unwrap();
        extract(&Html::parse_document(&html), DEFAULT_LAKE_MARKER)
    }

    #[test]
    fn cloudy_page() {
        let c = parse("idojaras_felhos");
        assert_eq!(c.temperature, Some(21.4));
        assert_eq!(c.condition.as_deref(), Some("Felhős"));
        assert_eq!(c.humidity, Some(60));
        assert_eq!(c.alert, None);
        assert_eq!(c.lake_temperature, Some(23.0));
    }

    #[test]
    fn stormy_page_with_alert() {
        let c = parse("idojaras_zivatar");
        assert_eq!(c.temperature, Some(-2.5));
        assert_eq!(c.humidity, Some(80));
        assert_eq!(c.alert.as_deref(), Some("Zivatar miatt kiadott figyelmeztetés"));
        assert_eq!(c.lake_temperature, None);
    }

    #[test]
    fn unparseable_temperature_is_unknown() {
        let doc = Html::parse_document(
            r#"<div class="current-temperature">--˚C</div><div class="current-weather">Napos</div>"#,
        );
        let c = extract(&doc, DEFAULT_LAKE_MARKER);
        assert_eq!(c.temperature, None);
        assert_eq!(c.humidity, Some(40));
    }

    #[test]
    fn empty_page_is_all_unknown() {
        let c = extract(&Html::parse_document("<html><body></body></html>"), DEFAULT_LAKE_MARKER);
        assert_eq!(c, CurrentConditions::default());
    }

    #[test]
    fn humidity_rules_in_order() {
        assert_eq!(estimate_humidity("Gyenge eső"), Some(80));
        assert_eq!(estimate_humidity("ZIVATAR"), Some(80));
        assert_eq!(estimate_humidity("Erősen felhős"), Some(60));
        assert_eq!(estimate_humidity("Napos, felhős"), Some(60));
        assert_eq!(estimate_humidity("Napos"), Some(40));
        assert_eq!(estimate_humidity("Köd"), None);
        assert_eq!(estimate_humidity(""), None);
    }

    #[test]
    fn degree_suffixes() {
        assert_eq!(parse_degrees("21.4˚C"), Some(21.4));
        assert_eq!(parse_degrees(" 23 °C "), Some(23.0));
        assert_eq!(parse_degrees("12"), Some(12.0));
        assert_eq!(parse_degrees("n/a"), None);
    }
}
