//! Threshold-based weather alert generation
//!
//! Five independent rule families (flood, drought, heatwave, cold wave,
//! cyclone) are checked on every evaluation. Each family contributes at most
//! one alert, at its most severe matching tier, and families fire together
//! when several thresholds are crossed at once.

use crate::error::{ClimateError, ClimateResult};
use crate::types::WeatherObservation;
use crate::zones::ClimateZone;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Kind of weather event an alert describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    Flood,
    Drought,
    Heatwave,
    ColdWave,
    Cyclone,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::Flood => "flood",
            AlertType::Drought => "drought",
            AlertType::Heatwave => "heatwave",
            AlertType::ColdWave => "cold_wave",
            AlertType::Cyclone => "cyclone",
        }
    }

    /// Upper-case label used in alert headlines
    pub fn headline_label(&self) -> &'static str {
        match self {
            AlertType::Flood => "FLOOD",
            AlertType::Drought => "DROUGHT",
            AlertType::Heatwave => "HEATWAVE",
            AlertType::ColdWave => "COLD WAVE",
            AlertType::Cyclone => "CYCLONE",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert severity, in ascending order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Watch,
    Warning,
    SevereWarning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Watch => "watch",
            Severity::Warning => "warning",
            Severity::SevereWarning => "severe_warning",
        }
    }

    /// Headline for an alert of `alert_type` at this tier, e.g. `CYCLONE WATCH`
    pub fn headline(&self, alert_type: AlertType) -> String {
        let label = alert_type.headline_label();
        match self {
            Severity::Watch => format!("{label} WATCH"),
            Severity::Warning => format!("{label} WARNING"),
            Severity::SevereWarning => format!("SEVERE {label} WARNING"),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An early-warning alert for an extreme weather or climate event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherAlert {
    pub alert_id: String,
    pub alert_type: AlertType,
    pub severity: Severity,
    pub affected_zones: Vec<String>,
    pub message: String,
    pub issued_at: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}

impl WeatherAlert {
    /// Length of the validity window
    pub fn validity(&self) -> Duration {
        self.valid_until - self.issued_at
    }
}

/// Longest validity window a configuration may request
pub const MAX_VALIDITY_DAYS: i64 = 366;

/// Named alert thresholds and validity windows
///
/// Lower tiers are inclusive lower bounds (`>=`); the cold wave threshold is
/// an inclusive upper bound (`<=`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AlertThresholds {
    /// 24h rainfall for a flood warning (mm)
    pub flood_rainfall_mm: f64,
    /// 24h rainfall for a severe flood warning (mm)
    pub flood_severe_rainfall_mm: f64,
    /// Rainfall deficit for a drought watch (% below normal)
    pub drought_deficit_pct: f64,
    /// Rainfall deficit for a severe drought warning (% below normal)
    pub drought_severe_deficit_pct: f64,
    pub heatwave_temp_c: f64,
    pub severe_heatwave_temp_c: f64,
    pub cold_wave_temp_c: f64,
    /// Tropical storm (Beaufort 8)
    pub cyclone_wind_kmh: f64,
    /// Severe cyclonic storm
    pub severe_cyclone_wind_kmh: f64,
    /// Validity of flood, heatwave, cold wave and cyclone alerts
    pub acute_validity_hours: i64,
    /// Validity of drought alerts
    pub drought_validity_days: i64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            flood_rainfall_mm: 200.0,
            flood_severe_rainfall_mm: 400.0,
            drought_deficit_pct: 25.0,
            drought_severe_deficit_pct: 50.0,
            heatwave_temp_c: 40.0,
            severe_heatwave_temp_c: 45.0,
            cold_wave_temp_c: 5.0,
            cyclone_wind_kmh: 64.0,
            severe_cyclone_wind_kmh: 118.0,
            acute_validity_hours: 24,
            drought_validity_days: 7,
        }
    }
}

impl AlertThresholds {
    /// Check tier ordering and validity windows
    pub fn validate(&self) -> ClimateResult<()> {
        let tiers = [
            ("flood", self.flood_rainfall_mm, self.flood_severe_rainfall_mm),
            ("drought", self.drought_deficit_pct, self.drought_severe_deficit_pct),
            ("heatwave", self.heatwave_temp_c, self.severe_heatwave_temp_c),
            ("cyclone", self.cyclone_wind_kmh, self.severe_cyclone_wind_kmh),
        ];
        for (family, lower, severe) in tiers {
            if !lower.is_finite() || !severe.is_finite() {
                return Err(ClimateError::InvalidThresholds(format!(
                    "{family} thresholds must be finite"
                )));
            }
            if severe < lower {
                return Err(ClimateError::InvalidThresholds(format!(
                    "{family} severe threshold {severe} is below the lower tier {lower}"
                )));
            }
        }
        if !self.cold_wave_temp_c.is_finite() {
            return Err(ClimateError::InvalidThresholds(
                "cold wave threshold must be finite".to_string(),
            ));
        }
        if self.acute_validity_hours <= 0 || self.drought_validity_days <= 0 {
            return Err(ClimateError::InvalidThresholds(
                "validity windows must be positive".to_string(),
            ));
        }
        if self.acute_validity_hours > MAX_VALIDITY_DAYS * 24
            || self.drought_validity_days > MAX_VALIDITY_DAYS
        {
            return Err(ClimateError::InvalidThresholds(format!(
                "validity windows must not exceed {MAX_VALIDITY_DAYS} days"
            )));
        }
        Ok(())
    }

    /// Acute window; unvalidated values are clamped to `MAX_VALIDITY_DAYS`
    pub fn acute_validity(&self) -> Duration {
        Duration::hours(self.acute_validity_hours.clamp(0, MAX_VALIDITY_DAYS * 24))
    }

    pub fn drought_validity(&self) -> Duration {
        Duration::days(self.drought_validity_days.clamp(0, MAX_VALIDITY_DAYS))
    }
}

/// Source of alert identifiers
pub trait AlertIdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random UUID v4 identifiers
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl AlertIdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Deterministic `<prefix>-<n>` identifiers, counting from 1
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl AlertIdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{}", self.prefix, n)
    }
}

/// A rule family that fired, before identity and timestamps are attached
struct Trigger {
    alert_type: AlertType,
    severity: Severity,
    detail: String,
    action: &'static str,
}

/// Stateless rule evaluator mapping observations to alerts
#[derive(Clone)]
pub struct AlertGenerator {
    thresholds: AlertThresholds,
    ids: Arc<dyn AlertIdGenerator>,
}

impl fmt::Debug for AlertGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlertGenerator")
            .field("thresholds", &self.thresholds)
            .finish_non_exhaustive()
    }
}

impl Default for AlertGenerator {
    fn default() -> Self {
        Self::new(AlertThresholds::default())
    }
}

impl AlertGenerator {
    pub fn new(thresholds: AlertThresholds) -> Self {
        Self::with_id_generator(thresholds, Arc::new(UuidGenerator))
    }

    pub fn with_id_generator(thresholds: AlertThresholds, ids: Arc<dyn AlertIdGenerator>) -> Self {
        Self { thresholds, ids }
    }

    /// Apply every rule family to `obs` and return the active alerts
    pub fn evaluate_conditions(
        &self,
        zone: &ClimateZone,
        obs: &WeatherObservation,
    ) -> Vec<WeatherAlert> {
        self.evaluate_conditions_at(zone, obs, Utc::now())
    }

    /// Same as [`evaluate_conditions`](Self::evaluate_conditions) with a fixed evaluation instant
    pub fn evaluate_conditions_at(
        &self,
        zone: &ClimateZone,
        obs: &WeatherObservation,
        now: DateTime<Utc>,
    ) -> Vec<WeatherAlert> {
        let rainfall_mm = obs.rainfall_or_zero();
        let temperature_c = obs.temperature_or(zone);
        let wind_kmh = obs.wind_or_zero();
        let deficit_pct = obs.rainfall_deficit_or_zero();

        debug!(
            zone = %zone.zone_id,
            rainfall_mm, temperature_c, wind_kmh, deficit_pct,
            "evaluating alert rules"
        );

        let triggers = [
            self.flood(rainfall_mm),
            self.drought(deficit_pct),
            self.heatwave(temperature_c),
            self.cold_wave(temperature_c),
            self.cyclone(wind_kmh),
        ];

        triggers
            .into_iter()
            .flatten()
            .map(|trigger| self.build_alert(zone, trigger, now))
            .collect()
    }

    fn flood(&self, rainfall_mm: f64) -> Option<Trigger> {
        let t = &self.thresholds;
        if rainfall_mm >= t.flood_severe_rainfall_mm {
            Some(Trigger {
                alert_type: AlertType::Flood,
                severity: Severity::SevereWarning,
                detail: format!("Extremely heavy rainfall of {rainfall_mm:.0} mm in 24 hours."),
                action: "Evacuate flood-prone areas immediately. Do not cross flooded waterways.",
            })
        } else if rainfall_mm >= t.flood_rainfall_mm {
            Some(Trigger {
                alert_type: AlertType::Flood,
                severity: Severity::Warning,
                detail: format!("Heavy rainfall of {rainfall_mm:.0} mm expected in 24 hours."),
                action: "Move to higher ground if in low-lying areas.",
            })
        } else {
            None
        }
    }

    fn drought(&self, deficit_pct: f64) -> Option<Trigger> {
        let t = &self.thresholds;
        let detail = format!("Rainfall is {deficit_pct:.0}% below normal.");
        if deficit_pct >= t.drought_severe_deficit_pct {
            Some(Trigger {
                alert_type: AlertType::Drought,
                severity: Severity::SevereWarning,
                detail,
                action: concat!(
                    "Initiate water conservation measures ",
                    "and activate drought relief protocols."
                ),
            })
        } else if deficit_pct >= t.drought_deficit_pct {
            Some(Trigger {
                alert_type: AlertType::Drought,
                severity: Severity::Watch,
                detail,
                action: "Monitor reservoir levels and groundwater conditions.",
            })
        } else {
            None
        }
    }

    fn heatwave(&self, temperature_c: f64) -> Option<Trigger> {
        let t = &self.thresholds;
        let detail = format!("Temperature {temperature_c:.1}°C.");
        if temperature_c >= t.severe_heatwave_temp_c {
            Some(Trigger {
                alert_type: AlertType::Heatwave,
                severity: Severity::SevereWarning,
                detail,
                action: concat!(
                    "Avoid outdoor activities 11 AM - 4 PM. ",
                    "Stay hydrated. Heat stroke risk is EXTREME."
                ),
            })
        } else if temperature_c >= t.heatwave_temp_c {
            Some(Trigger {
                alert_type: AlertType::Heatwave,
                severity: Severity::Warning,
                detail,
                action: "Limit outdoor exposure during peak hours. Drink water regularly.",
            })
        } else {
            None
        }
    }

    // Single tier: there is no severe cold wave
    fn cold_wave(&self, temperature_c: f64) -> Option<Trigger> {
        (temperature_c <= self.thresholds.cold_wave_temp_c).then(|| Trigger {
            alert_type: AlertType::ColdWave,
            severity: Severity::Warning,
            detail: format!("Temperature {temperature_c:.1}°C."),
            action: "Keep elderly and children indoors. Protect livestock.",
        })
    }

    fn cyclone(&self, wind_kmh: f64) -> Option<Trigger> {
        let t = &self.thresholds;
        let detail = format!("Wind speed {wind_kmh:.0} km/h.");
        if wind_kmh >= t.severe_cyclone_wind_kmh {
            Some(Trigger {
                alert_type: AlertType::Cyclone,
                severity: Severity::SevereWarning,
                detail,
                action: "Evacuate coastal areas immediately. Do not go outdoors.",
            })
        } else if wind_kmh >= t.cyclone_wind_kmh {
            Some(Trigger {
                alert_type: AlertType::Cyclone,
                severity: Severity::Watch,
                detail,
                action: "Secure loose objects. Monitor IMD bulletins.",
            })
        } else {
            None
        }
    }

    fn build_alert(
        &self,
        zone: &ClimateZone,
        trigger: Trigger,
        now: DateTime<Utc>,
    ) -> WeatherAlert {
        let validity = match trigger.alert_type {
            AlertType::Drought => self.thresholds.drought_validity(),
            _ => self.thresholds.acute_validity(),
        };
        let message = format!(
            "{} for {}. {} {}",
            trigger.severity.headline(trigger.alert_type),
            zone.name,
            trigger.detail,
            trigger.action
        );

        info!(
            zone = %zone.zone_id,
            alert_type = %trigger.alert_type,
            severity = %trigger.severity,
            "alert raised"
        );

        WeatherAlert {
            alert_id: self.ids.next_id(),
            alert_type: trigger.alert_type,
            severity: trigger.severity,
            affected_zones: vec![zone.zone_id.clone()],
            message,
            issued_at: now,
            valid_until: now
                .checked_add_signed(validity)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }
}
