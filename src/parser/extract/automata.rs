use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::parser::decode::decode_data_uri;
use crate::parser::numeric::{normalize, NormalizedNumber};
use crate::parser::ocr::OcrEngine;
use crate::parser::query::{attr, select_all, select_first, select_first_in, selector, text};
use crate::reading::StationMeasurements;

static TIME_SEL: LazyLock<Selector> = LazyLock::new(|| selector("time"));
static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| selector("table.table tr"));
static TH_SEL: LazyLock<Selector> = LazyLock::new(|| selector("th"));
static TD_SEL: LazyLock<Selector> = LazyLock::new(|| selector("td"));
static IMG_SEL: LazyLock<Selector> = LazyLock::new(|| selector("img"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Temperature,
    DewPoint,
    Humidity,
    Precipitation24h,
    PrecipitationIntensity,
}

/// Header wording as printed by the source; case-sensitive substring match,
/// first rule wins. Unknown wording drops the row.
const LABEL_RULES: &[(&str, Field)] = &[
    ("Hőmérséklet", Field::Temperature),
    ("Harmatpont", Field::DewPoint),
    ("Páratartalom", Field::Humidity),
    ("24 órás csapadék", Field::Precipitation24h),
    ("Csapadékintenzitás", Field::PrecipitationIntensity),
];

/// A table row's header label paired with its still-encoded image.
#[derive(Debug, Clone)]
pub struct RawImageField {
    pub label: String,
    pub src: String,
}

pub fn match_label(label: &str) -> Option<Field> {
    LABEL_RULES
        .iter()
        .find(|(needle, _)| label.contains(needle))
        .map(|(_, field)| *field)
}

/// Extract station measurements from an `/automata/<station>` page.
/// Runs one OCR call per image row, sequentially.
pub fn extract(doc: &Html, ocr: &dyn OcrEngine) -> StationMeasurements {
    let mut out = StationMeasurements {
        measurement_time: extract_measurement_time(doc),
        ..Default::default()
    };

    for raw in image_rows(doc) {
        let Some(field) = match_label(&raw.label) else {
            debug!(label = %raw.label, "Ignoring unmapped row");
            continue;
        };
        let value = read_value(&raw, ocr);
        assign(&mut out, field, value);
    }

    debug!(?out, "Extracted station measurements");
    out
}

fn extract_measurement_time(doc: &Html) -> Option<String> {
    let time = select_first(doc, &TIME_SEL)?;
    attr(time, "datetime").map(str::to_string)
}

/// Rows with a `th` label and an `img` inside the `td`; everything else is skipped.
pub fn image_rows(doc: &Html) -> Vec<RawImageField> {
    select_all(doc, &ROW_SEL)
        .filter_map(|row| {
            let header = select_first_in(row, &TH_SEL)?;
            let cell = select_first_in(row, &TD_SEL)?;
            let label = text(header);
            let Some(img) = select_first_in(cell, &IMG_SEL) else {
                debug!(label = %label, "Row has no image");
                return None;
            };
            let src = attr(img, "src").unwrap_or_default().to_string();
            Some(RawImageField { label, src })
        })
        .collect()
}

/// Decode -> OCR -> normalize. Any stage failing leaves the field unknown.
fn read_value(raw: &RawImageField, ocr: &dyn OcrEngine) -> Option<f64> {
    let image = match decode_data_uri(&raw.src) {
        Ok(img) => img,
        Err(e) => {
            warn!(field = %raw.label, error = %e, "Image decode failed");
            return None;
        }
    };

    let ocr_text = match ocr.recognize(&image) {
        Ok(t) => t,
        Err(e) => {
            warn!(field = %raw.label, error = %e, "OCR failed");
            return None;
        }
    };

    match normalize(&ocr_text) {
        NormalizedNumber::Parsed(v) => Some(v),
        NormalizedNumber::Unparsed(t) => {
            warn!(field = %raw.label, text = %t, "No number in OCR output");
            None
        }
    }
}

fn assign(out: &mut StationMeasurements, field: Field, value: Option<f64>) {
    let slot = match field {
        Field::Temperature => &mut out.temperature,
        Field::DewPoint => &mut out.dew_point,
        Field::Humidity => &mut out.humidity,
        Field::Precipitation24h => &mut out.precipitation_24h,
        Field::PrecipitationIntensity => &mut out.precipitation_intensity,
    };
    *slot = value;
}
