use serde::Serialize;

/// Canonical record handed to the publisher. Every field is independently
/// optional and serializes as `null` when unknown, so all keys are always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeatherReading {
    /// °C
    pub temperature: Option<f64>,
    /// °C
    pub dew_point: Option<f64>,
    /// %
    pub humidity: Option<f64>,
    /// mm over the last 24 hours
    pub precipitation_24h: Option<f64>,
    /// mm/h
    pub precipitation_intensity: Option<f64>,
    /// °C
    pub lake_temperature: Option<f64>,
    pub condition: Option<String>,
    pub alert: Option<String>,
    /// Source timestamp, passed through untouched.
    pub measurement_time: Option<String>,
    /// km/h
    pub wind_speed: Option<f64>,
    /// Compass abbreviation as printed by the source.
    pub wind_direction: Option<String>,
    /// hPa
    pub pressure: Option<f64>,
    /// mm
    pub precipitation: Option<f64>,
}

pub const FIELD_NAMES: [&str; 13] = [
    "temperature",
    "dew_point",
    "humidity",
    "precipitation_24h",
    "precipitation_intensity",
    "lake_temperature",
    "condition",
    "alert",
    "measurement_time",
    "wind_speed",
    "wind_direction",
    "pressure",
    "precipitation",
];

/// Fields the `/idojaras/<location>` page yields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurrentConditions {
    pub temperature: Option<f64>,
    pub lake_temperature: Option<f64>,
    pub condition: Option<String>,
    pub alert: Option<String>,
    pub humidity: Option<u8>,
}

/// Fields the `/automata/<station>` page yields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationMeasurements {
    pub measurement_time: Option<String>,
    pub temperature: Option<f64>,
    pub dew_point: Option<f64>,
    pub humidity: Option<f64>,
    pub precipitation_24h: Option<f64>,
    pub precipitation_intensity: Option<f64>,
}

impl From<CurrentConditions> for WeatherReading {
    fn from(c: CurrentConditions) -> Self {
        WeatherReading {
            temperature: c.temperature,
            lake_temperature: c.lake_temperature,
            humidity: c.humidity.map(f64::from),
            condition: c.condition,
            alert: c.alert,
            // fixed default for this source, which has no rain gauge
            precipitation: Some(0.0),
            ..Default::default()
        }
    }
}

impl From<StationMeasurements> for WeatherReading {
    fn from(m: StationMeasurements) -> Self {
        WeatherReading {
            temperature: m.temperature,
            dew_point: m.dew_point,
            humidity: m.humidity,
            precipitation_24h: m.precipitation_24h,
            precipitation_intensity: m.precipitation_intensity,
            measurement_time: m.measurement_time,
            ..Default::default()
        }
    }
}

impl WeatherReading {
    /// Number of fields that carry a value.
    pub fn known_fields(&self) -> usize {
        let numbers = [
            self.temperature,
            self.dew_point,
            self.humidity,
            self.precipitation_24h,
            self.precipitation_intensity,
            self.lake_temperature,
            self.wind_speed,
            self.pressure,
            self.precipitation,
        ];
        let texts = [
            &self.condition,
            &self.alert,
            &self.measurement_time,
            &self.wind_direction,
        ];
        numbers.iter().filter(|v| v.is_some()).count() + texts.iter().filter(|v| v.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn keys(reading: &WeatherReading) -> Vec<String> {
        match serde_json::to_value(reading).unwrap() {
            Value::Object(map) => map.keys().cloned().collect(),
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn all_keys_present_when_empty() {
        let mut got = keys(&WeatherReading::default());
        got.sort();
        let mut want: Vec<String> = FIELD_NAMES.iter().map(|s| s.to_string()).collect();
        want.sort();
        assert_eq!(got, want);
    }

    #[test]
    fn current_conditions_default_precipitation() {
        let r = WeatherReading::from(CurrentConditions::default());
        assert_eq!(r.precipitation, Some(0.0));
        assert_eq!(r.temperature, None);
        assert_eq!(r.wind_speed, None);
        assert_eq!(r.known_fields(), 1);
        assert_eq!(keys(&r).len(), FIELD_NAMES.len());
    }

    #[test]
    fn station_measurements_leave_precipitation_unknown() {
        let r = WeatherReading::from(StationMeasurements {
            temperature: Some(18.3),
            measurement_time: Some("2025-06-01T12:00:00+02:00".into()),
            ..Default::default()
        });
        assert_eq!(r.precipitation, None);
        assert_eq!(r.temperature, Some(18.3));
        assert_eq!(r.known_fields(), 2);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["dew_point"], Value::Null);
        assert_eq!(json["measurement_time"], "2025-06-01T12:00:00+02:00");
    }

    #[test]
    fn humidity_estimate_widens_to_float() {
        let r = WeatherReading::from(CurrentConditions {
            humidity: Some(60),
            ..Default::default()
        });
        assert_eq!(r.humidity, Some(60.0));
    }
}
