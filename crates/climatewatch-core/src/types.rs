//! Core data types for weather observations

use crate::error::{ClimateError, ClimateResult};
use crate::zones::ClimateZone;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Recognised observation keys
pub mod fields {
    pub const TEMPERATURE_C: &str = "temperature_c";
    pub const RAINFALL_MM: &str = "rainfall_mm";
    pub const HUMIDITY_PCT: &str = "humidity_pct";
    pub const WIND_KMH: &str = "wind_kmh";
    pub const RAINFALL_DEFICIT_PCT: &str = "rainfall_deficit_pct";

    pub const ALL: [&str; 5] = [
        TEMPERATURE_C,
        RAINFALL_MM,
        HUMIDITY_PCT,
        WIND_KMH,
        RAINFALL_DEFICIT_PCT,
    ];
}

/// A raw observation value as it arrives from a file or caller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ObservationValue {
    Integer(i64),
    Float(f64),
    String(String),
    Null,
    Other(serde_json::Value),
}

impl ObservationValue {
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            ObservationValue::Float(v) => Some(*v),
            ObservationValue::Integer(v) => Some(*v as f64),
            ObservationValue::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        value.filter(|v| v.is_finite())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ObservationValue::Null)
    }

    /// Cast to a number for `field`; null reads as missing
    pub fn to_f64(&self, field: &str) -> ClimateResult<Option<f64>> {
        if self.is_null() {
            return Ok(None);
        }
        self.as_f64()
            .map(Some)
            .ok_or_else(|| ClimateError::TypeMismatch {
                field: field.to_string(),
                value: self.to_string(),
            })
    }
}

impl std::fmt::Display for ObservationValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObservationValue::Integer(v) => write!(f, "{v}"),
            ObservationValue::Float(v) => write!(f, "{v}"),
            ObservationValue::String(s) => write!(f, "{s:?}"),
            ObservationValue::Null => write!(f, "null"),
            ObservationValue::Other(v) => write!(f, "{v}"),
        }
    }
}

/// Untyped observation record (field name -> value)
pub type ObservationRecord = HashMap<String, ObservationValue>;

/// Typed weather observation
///
/// Every field is optional so partial data is accepted. Readers apply the
/// documented defaults: rainfall, wind and deficit read as 0.0, temperature
/// reads as the zone's annual average, humidity has no default.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WeatherObservation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rainfall_mm: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity_pct: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_kmh: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rainfall_deficit_pct: Option<f64>,
}

impl WeatherObservation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_temperature(mut self, c: f64) -> Self {
        self.temperature_c = Some(c);
        self
    }

    pub fn with_rainfall(mut self, mm: f64) -> Self {
        self.rainfall_mm = Some(mm);
        self
    }

    pub fn with_humidity(mut self, pct: f64) -> Self {
        self.humidity_pct = Some(pct);
        self
    }

    pub fn with_wind(mut self, kmh: f64) -> Self {
        self.wind_kmh = Some(kmh);
        self
    }

    pub fn with_rainfall_deficit(mut self, pct: f64) -> Self {
        self.rainfall_deficit_pct = Some(pct);
        self
    }

    /// Temperature, falling back to the zone average
    pub fn temperature_or(&self, zone: &ClimateZone) -> f64 {
        self.temperature_c.unwrap_or(zone.avg_temp_c)
    }

    pub fn rainfall_or_zero(&self) -> f64 {
        self.rainfall_mm.unwrap_or(0.0)
    }

    pub fn wind_or_zero(&self) -> f64 {
        self.wind_kmh.unwrap_or(0.0)
    }

    pub fn rainfall_deficit_or_zero(&self) -> f64 {
        self.rainfall_deficit_pct.unwrap_or(0.0)
    }

    /// Convert an untyped record, casting numeric strings
    ///
    /// Unknown keys are ignored. A value that cannot be read as a number
    /// fails with [`ClimateError::TypeMismatch`].
    pub fn from_record(record: &ObservationRecord) -> ClimateResult<Self> {
        let mut obs = Self::default();

        for (key, value) in record {
            let slot = match key.as_str() {
                fields::TEMPERATURE_C => &mut obs.temperature_c,
                fields::RAINFALL_MM => &mut obs.rainfall_mm,
                fields::HUMIDITY_PCT => &mut obs.humidity_pct,
                fields::WIND_KMH => &mut obs.wind_kmh,
                fields::RAINFALL_DEFICIT_PCT => &mut obs.rainfall_deficit_pct,
                other => {
                    debug!(field = %other, "ignoring unrecognised observation field");
                    continue;
                }
            };
            *slot = value.to_f64(key)?;
        }

        Ok(obs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: &str) -> ObservationRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_observation_value_conversions() {
        assert_eq!(ObservationValue::Float(25.5).as_f64(), Some(25.5));
        assert_eq!(ObservationValue::Integer(42).as_f64(), Some(42.0));
        let text = |s: &str| ObservationValue::String(s.to_string());
        assert_eq!(text(" 12.5 ").as_f64(), Some(12.5));
        assert_eq!(text("heavy").as_f64(), None);
        assert_eq!(text("NaN").as_f64(), None);

        let null_val = ObservationValue::Null;
        assert!(null_val.is_null());
        assert_eq!(null_val.as_f64(), None);
        assert_eq!(null_val.to_f64("rainfall_mm"), Ok(None));
    }

    #[test]
    fn test_record_from_json_mixed_types() {
        let rec = record(
            r#"{"temperature_c": 34, "rainfall_mm": 280.5, "wind_kmh": "30",
                "humidity_pct": null, "station": "Pune"}"#,
        );
        assert_eq!(rec["temperature_c"], ObservationValue::Integer(34));
        assert_eq!(rec["rainfall_mm"], ObservationValue::Float(280.5));
        assert!(rec["humidity_pct"].is_null());

        let obs = WeatherObservation::from_record(&rec).unwrap();
        assert_eq!(obs.temperature_c, Some(34.0));
        assert_eq!(obs.rainfall_mm, Some(280.5));
        assert_eq!(obs.wind_kmh, Some(30.0));
        assert_eq!(obs.humidity_pct, None);
        assert_eq!(obs.rainfall_deficit_pct, None);
    }

    #[test]
    fn test_non_numeric_value_is_type_mismatch() {
        let rec = record(r#"{"rainfall_mm": "a lot"}"#);
        let err = WeatherObservation::from_record(&rec).unwrap_err();
        assert_eq!(
            err,
            ClimateError::TypeMismatch {
                field: "rainfall_mm".into(),
                value: "\"a lot\"".into(),
            }
        );

        for json in [r#"{"wind_kmh": true}"#, r#"{"wind_kmh": [1, 2]}"#] {
            let err = WeatherObservation::from_record(&record(json)).unwrap_err();
            assert!(matches!(
                err,
                ClimateError::TypeMismatch { ref field, .. } if field == "wind_kmh"
            ));
        }
    }

    #[test]
    fn test_unknown_non_numeric_fields_are_ignored() {
        let rec = record(r#"{"notes": "cloudy", "temperature_c": 20}"#);
        let obs = WeatherObservation::from_record(&rec).unwrap();
        assert_eq!(obs, WeatherObservation::new().with_temperature(20.0));
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let zone = ClimateZone::new("z", "Zone", vec![], 1000.0, 26.0).unwrap();
        let obs = WeatherObservation::new();
        assert_eq!(obs.temperature_or(&zone), 26.0);
        assert_eq!(obs.rainfall_or_zero(), 0.0);
        assert_eq!(obs.wind_or_zero(), 0.0);
        assert_eq!(obs.rainfall_deficit_or_zero(), 0.0);
    }

    #[test]
    fn test_observation_serde_skips_missing() {
        let obs = WeatherObservation::new().with_rainfall(12.0).with_humidity(80.0);
        let json = serde_json::to_string(&obs).unwrap();
        assert_eq!(json, r#"{"rainfall_mm":12.0,"humidity_pct":80.0}"#);

        let back: WeatherObservation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, obs);
    }
}
