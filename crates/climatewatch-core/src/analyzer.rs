//! Climate reports and historical trend analysis
//!
//! The forecast is a persistence heuristic: tomorrow looks like today with
//! rainfall damped by a fixed factor, and the 7-day outlook is a categorical
//! comparison of today's values against the zone normal. Trend analysis is a
//! single pass over the supplied records with no windowing, no seasonal
//! adjustment and no significance testing.

use crate::alerts::{AlertGenerator, WeatherAlert};
use crate::rollups::RunningStats;
use crate::types::WeatherObservation;
use crate::zones::ClimateZone;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub const NEXT_24H_ADVISORY: &str =
    "Conditions similar to today expected. Monitor IMD forecasts at mausam.imd.gov.in.";

pub const NO_HISTORICAL_DATA: &str = "No historical data provided.";

/// Tuning for the persistence forecast
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ForecastSettings {
    /// Multiplier applied to today's rainfall for the next 24h
    pub rainfall_decay_factor: f64,
    /// Half-width of the "near normal" band, as a percentage of the reference
    pub normal_band_pct: f64,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            rainfall_decay_factor: 0.8,
            normal_band_pct: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RainfallOutlook {
    WetterThanNormal,
    NearNormal,
    DrierThanNormal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureOutlook {
    WarmerThanNormal,
    NearNormal,
    CoolerThanNormal,
}

impl RainfallOutlook {
    pub fn as_str(&self) -> &'static str {
        match self {
            RainfallOutlook::WetterThanNormal => "wetter_than_normal",
            RainfallOutlook::NearNormal => "near_normal",
            RainfallOutlook::DrierThanNormal => "drier_than_normal",
        }
    }
}

impl TemperatureOutlook {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureOutlook::WarmerThanNormal => "warmer_than_normal",
            TemperatureOutlook::NearNormal => "near_normal",
            TemperatureOutlook::CoolerThanNormal => "cooler_than_normal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Band {
    Above,
    Within,
    Below,
}

/// Place `value` relative to `reference` +/- `band_pct` percent (inclusive)
fn classify(value: f64, reference: f64, band_pct: f64) -> Band {
    let half_width = reference.abs() * band_pct / 100.0;
    if value > reference + half_width {
        Band::Above
    } else if value < reference - half_width {
        Band::Below
    } else {
        Band::Within
    }
}

/// Next-day persistence forecast
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Next24h {
    #[serde(flatten)]
    pub conditions: WeatherObservation,
    pub advisory: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SevenDayOutlook {
    pub rainfall_outlook: RainfallOutlook,
    pub temperature_outlook: TemperatureOutlook,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Forecast {
    pub next_24h: Next24h,
    pub next_7_days: SevenDayOutlook,
}

/// Climate report for a zone at a point in time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClimateReport {
    pub zone: ClimateZone,
    pub current_conditions: WeatherObservation,
    pub alerts: Vec<WeatherAlert>,
    pub forecast: Forecast,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TemperatureTrend {
    pub observations: usize,
    pub mean_c: f64,
    pub min_c: f64,
    pub max_c: f64,
    /// Mean minus the zone's annual average (signed)
    pub anomaly_vs_normal_c: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RainfallTrend {
    pub observations: usize,
    pub total_mm: f64,
    pub mean_daily_mm: f64,
    pub min_mm: f64,
    pub max_mm: f64,
    /// Mean minus the zone's daily normal (signed)
    pub anomaly_vs_normal_mm: f64,
    /// Shortfall of the total against the expected total; negative is a surplus
    pub deficit_vs_normal_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendSummary {
    pub zone_id: String,
    pub zone_name: String,
    pub observations: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<TemperatureTrend>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rainfall: Option<RainfallTrend>,
}

/// Returned instead of statistics when there is nothing to aggregate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NoData {
    pub zone_id: String,
    pub zone_name: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TrendResult {
    NoData(NoData),
    Summary(TrendSummary),
}

impl TrendResult {
    pub fn is_no_data(&self) -> bool {
        matches!(self, TrendResult::NoData(_))
    }

    pub fn summary(&self) -> Option<&TrendSummary> {
        match self {
            TrendResult::Summary(s) => Some(s),
            TrendResult::NoData(_) => None,
        }
    }
}

/// Builds reports and trend summaries on top of an [`AlertGenerator`]
#[derive(Debug, Clone, Default)]
pub struct ClimateAnalyzer {
    alerts: AlertGenerator,
    settings: ForecastSettings,
}

impl ClimateAnalyzer {
    pub fn new(alerts: AlertGenerator, settings: ForecastSettings) -> Self {
        Self { alerts, settings }
    }

    pub fn generate_report(&self, zone: &ClimateZone, obs: &WeatherObservation) -> ClimateReport {
        self.generate_report_at(zone, obs, Utc::now())
    }

    pub fn generate_report_at(
        &self,
        zone: &ClimateZone,
        obs: &WeatherObservation,
        now: DateTime<Utc>,
    ) -> ClimateReport {
        let alerts = self.alerts.evaluate_conditions_at(zone, obs, now);
        let forecast = self.forecast(zone, obs);

        info!(
            zone = %zone.zone_id,
            alerts = alerts.len(),
            rainfall_outlook = ?forecast.next_7_days.rainfall_outlook,
            temperature_outlook = ?forecast.next_7_days.temperature_outlook,
            "climate report generated"
        );

        ClimateReport {
            zone: zone.clone(),
            current_conditions: obs.clone(),
            alerts,
            forecast,
            generated_at: now,
        }
    }

    /// Persistence forecast for the next day and the coming week
    pub fn forecast(&self, zone: &ClimateZone, obs: &WeatherObservation) -> Forecast {
        let next_24h = Next24h {
            conditions: WeatherObservation {
                rainfall_mm: obs
                    .rainfall_mm
                    .map(|mm| mm * self.settings.rainfall_decay_factor),
                ..obs.clone()
            },
            advisory: NEXT_24H_ADVISORY.to_string(),
        };

        let band = self.settings.normal_band_pct;
        let rainfall_outlook = match classify(
            obs.rainfall_or_zero(),
            zone.daily_normal_rainfall_mm(),
            band,
        ) {
            Band::Above => RainfallOutlook::WetterThanNormal,
            Band::Within => RainfallOutlook::NearNormal,
            Band::Below => RainfallOutlook::DrierThanNormal,
        };
        let temperature_outlook = match classify(obs.temperature_or(zone), zone.avg_temp_c, band) {
            Band::Above => TemperatureOutlook::WarmerThanNormal,
            Band::Within => TemperatureOutlook::NearNormal,
            Band::Below => TemperatureOutlook::CoolerThanNormal,
        };

        Forecast {
            next_24h,
            next_7_days: SevenDayOutlook {
                rainfall_outlook,
                temperature_outlook,
            },
        }
    }

    /// Summarise historical observations against the zone normals
    pub fn trend_analysis(
        &self,
        zone: &ClimateZone,
        historical: &[WeatherObservation],
    ) -> TrendResult {
        if historical.is_empty() {
            warn!(zone = %zone.zone_id, "trend analysis requested without historical data");
            return TrendResult::NoData(NoData {
                zone_id: zone.zone_id.clone(),
                zone_name: zone.name.clone(),
                error: NO_HISTORICAL_DATA.to_string(),
            });
        }

        let mut temps = RunningStats::new();
        let mut rains = RunningStats::new();
        for obs in historical {
            temps.add_opt(obs.temperature_c);
            rains.add_opt(obs.rainfall_mm);
        }

        debug!(
            zone = %zone.zone_id,
            records = historical.len(),
            temperature_samples = temps.count(),
            rainfall_samples = rains.count(),
            "trend aggregation complete"
        );

        TrendResult::Summary(TrendSummary {
            zone_id: zone.zone_id.clone(),
            zone_name: zone.name.clone(),
            observations: historical.len(),
            temperature: temperature_trend(zone, &temps),
            rainfall: rainfall_trend(zone, &rains),
        })
    }
}

fn temperature_trend(zone: &ClimateZone, temps: &RunningStats) -> Option<TemperatureTrend> {
    let mean_c = temps.mean()?;
    Some(TemperatureTrend {
        observations: temps.count(),
        mean_c,
        min_c: temps.min()?,
        max_c: temps.max()?,
        anomaly_vs_normal_c: mean_c - zone.avg_temp_c,
    })
}

fn rainfall_trend(zone: &ClimateZone, rains: &RunningStats) -> Option<RainfallTrend> {
    let total_mm = rains.sum()?;
    let mean_daily_mm = rains.mean()?;
    let daily_normal = zone.daily_normal_rainfall_mm();
    let expected_mm = daily_normal * rains.count() as f64;
    let deficit_vs_normal_pct = if expected_mm > 0.0 {
        (1.0 - total_mm / expected_mm) * 100.0
    } else {
        0.0
    };

    Some(RainfallTrend {
        observations: rains.count(),
        total_mm,
        mean_daily_mm,
        min_mm: rains.min()?,
        max_mm: rains.max()?,
        anomaly_vs_normal_mm: mean_daily_mm - daily_normal,
        deficit_vs_normal_pct,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{AlertThresholds, AlertType, SequentialIdGenerator, Severity};
    use crate::zones::ZoneRegistry;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn zone(id: &str) -> ClimateZone {
        ZoneRegistry::global().get_zone(id).unwrap().clone()
    }

    fn analyzer() -> ClimateAnalyzer {
        ClimateAnalyzer::default()
    }

    fn near_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_report_echoes_inputs() {
        let z = zone("central-india");
        let obs = WeatherObservation::new()
            .with_temperature(27.0)
            .with_rainfall(3.0)
            .with_humidity(65.0);
        let report = analyzer().generate_report(&z, &obs);

        assert_eq!(report.zone, z);
        assert_eq!(report.current_conditions, obs);
        assert!(report.alerts.is_empty());
    }

    #[test]
    fn test_next_24h_damps_rainfall_only() {
        let z = zone("western-india");
        let obs = WeatherObservation::new()
            .with_temperature(31.0)
            .with_rainfall(100.0)
            .with_humidity(88.0)
            .with_wind(20.0)
            .with_rainfall_deficit(4.0);
        let next = analyzer().forecast(&z, &obs).next_24h;

        assert!(near_eq(next.conditions.rainfall_mm.unwrap(), 80.0));
        assert_eq!(next.conditions.temperature_c, Some(31.0));
        assert_eq!(next.conditions.humidity_pct, Some(88.0));
        assert_eq!(next.conditions.wind_kmh, Some(20.0));
        assert_eq!(next.conditions.rainfall_deficit_pct, Some(4.0));
        assert_eq!(next.advisory, NEXT_24H_ADVISORY);
    }

    #[test]
    fn test_next_24h_keeps_missing_rainfall_missing() {
        let z = zone("western-india");
        let next = analyzer()
            .forecast(&z, &WeatherObservation::new().with_temperature(30.0))
            .next_24h;
        assert_eq!(next.conditions.rainfall_mm, None);
    }

    #[test]
    fn test_rainfall_outlook_band() {
        let z = zone("northeast-india");
        let normal = z.daily_normal_rainfall_mm();
        let outlook = |mm: f64| {
            analyzer()
                .forecast(&z, &WeatherObservation::new().with_rainfall(mm))
                .next_7_days
                .rainfall_outlook
        };

        assert_eq!(outlook(normal), RainfallOutlook::NearNormal);
        assert_eq!(outlook(normal * 1.05), RainfallOutlook::NearNormal);
        assert_eq!(outlook(normal * 0.95), RainfallOutlook::NearNormal);
        assert_eq!(outlook(normal * 1.2), RainfallOutlook::WetterThanNormal);
        assert_eq!(outlook(normal * 0.5), RainfallOutlook::DrierThanNormal);
        assert_eq!(outlook(500.0), RainfallOutlook::WetterThanNormal);
    }

    #[test]
    fn test_missing_rainfall_reads_as_dry() {
        let z = zone("central-india");
        let outlook = analyzer().forecast(&z, &WeatherObservation::new()).next_7_days;
        assert_eq!(outlook.rainfall_outlook, RainfallOutlook::DrierThanNormal);
        assert_eq!(outlook.temperature_outlook, TemperatureOutlook::NearNormal);
    }

    #[test]
    fn test_temperature_outlook_band() {
        let z = zone("central-india");
        let outlook = |c: f64| {
            analyzer()
                .forecast(&z, &WeatherObservation::new().with_temperature(c))
                .next_7_days
                .temperature_outlook
        };

        // 27.0 +/- 2.7
        assert_eq!(outlook(29.0), TemperatureOutlook::NearNormal);
        assert_eq!(outlook(25.0), TemperatureOutlook::NearNormal);
        assert_eq!(outlook(35.0), TemperatureOutlook::WarmerThanNormal);
        assert_eq!(outlook(15.0), TemperatureOutlook::CoolerThanNormal);
    }

    #[test]
    fn test_custom_forecast_settings() {
        let settings = ForecastSettings {
            rainfall_decay_factor: 0.5,
            normal_band_pct: 50.0,
        };
        let a = ClimateAnalyzer::new(AlertGenerator::default(), settings);
        let z = zone("central-india");
        let obs = WeatherObservation::new().with_rainfall(10.0).with_temperature(35.0);
        let f = a.forecast(&z, &obs);

        assert!(near_eq(f.next_24h.conditions.rainfall_mm.unwrap(), 5.0));
        assert_eq!(f.next_7_days.temperature_outlook, TemperatureOutlook::NearNormal);
    }

    #[test]
    fn test_report_includes_alerts() {
        let gen = AlertGenerator::with_id_generator(
            AlertThresholds::default(),
            Arc::new(SequentialIdGenerator::new("rpt")),
        );
        let a = ClimateAnalyzer::new(gen, ForecastSettings::default());
        let now = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let obs = WeatherObservation::new()
            .with_temperature(46.0)
            .with_rainfall(500.0)
            .with_wind(120.0);
        let report = a.generate_report_at(&zone("southern-peninsula"), &obs, now);

        let kinds: Vec<_> = report.alerts.iter().map(|x| (x.alert_type, x.severity)).collect();
        assert_eq!(
            kinds,
            vec![
                (AlertType::Flood, Severity::SevereWarning),
                (AlertType::Heatwave, Severity::SevereWarning),
                (AlertType::Cyclone, Severity::SevereWarning),
            ]
        );
        assert_eq!(report.generated_at, now);
        assert_eq!(report.alerts[0].alert_id, "rpt-1");
    }

    #[test]
    fn test_report_serialization_shape() {
        let now = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let obs = WeatherObservation::new().with_temperature(27.0).with_rainfall(10.0);
        let report = analyzer().generate_report_at(&zone("central-india"), &obs, now);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["zone"]["zone_id"], "central-india");
        assert_eq!(json["forecast"]["next_24h"]["rainfall_mm"], 8.0);
        assert_eq!(json["forecast"]["next_24h"]["temperature_c"], 27.0);
        assert_eq!(
            json["forecast"]["next_7_days"]["rainfall_outlook"],
            "wetter_than_normal"
        );
        assert_eq!(json["forecast"]["next_7_days"]["temperature_outlook"], "near_normal");
        assert_eq!(json["generated_at"], "2024-07-01T00:00:00Z");

        let back: ClimateReport = serde_json::from_value(json).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn test_outlook_labels_match_serde() {
        for o in [
            RainfallOutlook::WetterThanNormal,
            RainfallOutlook::NearNormal,
            RainfallOutlook::DrierThanNormal,
        ] {
            assert_eq!(serde_json::to_value(o).unwrap(), o.as_str());
        }
        for o in [
            TemperatureOutlook::WarmerThanNormal,
            TemperatureOutlook::NearNormal,
            TemperatureOutlook::CoolerThanNormal,
        ] {
            assert_eq!(serde_json::to_value(o).unwrap(), o.as_str());
        }
    }

    #[test]
    fn test_trend_analysis_empty_is_no_data() {
        let z = zone("central-india");
        let result = analyzer().trend_analysis(&z, &[]);
        assert!(result.is_no_data());
        assert!(result.summary().is_none());

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["error"], NO_HISTORICAL_DATA);
        assert_eq!(json["zone_id"], "central-india");
    }

    #[test]
    fn test_trend_analysis_statistics() {
        let z = zone("central-india");
        let history = vec![
            WeatherObservation::new().with_temperature(25.0).with_rainfall(2.0),
            WeatherObservation::new().with_temperature(30.0).with_rainfall(6.0),
            WeatherObservation::new().with_temperature(29.0).with_rainfall(4.0),
        ];
        let result = analyzer().trend_analysis(&z, &history);
        let summary = result.summary().unwrap();

        assert_eq!(summary.zone_id, "central-india");
        assert_eq!(summary.zone_name, "Central India");
        assert_eq!(summary.observations, 3);

        let t = summary.temperature.unwrap();
        assert!(near_eq(t.mean_c, 28.0));
        assert_eq!(t.min_c, 25.0);
        assert_eq!(t.max_c, 30.0);
        assert!(near_eq(t.anomaly_vs_normal_c, 1.0));

        let r = summary.rainfall.unwrap();
        assert!(near_eq(r.total_mm, 12.0));
        assert!(near_eq(r.mean_daily_mm, 4.0));
        assert_eq!(r.min_mm, 2.0);
        assert_eq!(r.max_mm, 6.0);
        let normal = 1100.0 / 365.0;
        assert!(near_eq(r.anomaly_vs_normal_mm, 4.0 - normal));
        assert!(near_eq(r.deficit_vs_normal_pct, (1.0 - 12.0 / (normal * 3.0)) * 100.0));
    }

    #[test]
    fn test_trend_rainfall_total_over_thirty_days() {
        let z = zone("western-india");
        let history: Vec<_> = (0..30)
            .map(|day| WeatherObservation::new().with_rainfall(day as f64 * 1.7 + 0.3))
            .collect();
        let expected: f64 = (0..30).map(|day| day as f64 * 1.7 + 0.3).sum();

        let result = analyzer().trend_analysis(&z, &history);
        let rain = result.summary().unwrap().rainfall.unwrap();
        assert_eq!(rain.observations, 30);
        assert!((rain.total_mm - expected).abs() < 1e-9);
        assert!((rain.mean_daily_mm - expected / 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_trend_negative_anomaly_keeps_sign() {
        let z = zone("northwest-india");
        let history = vec![WeatherObservation::new().with_temperature(20.0)];
        let result = analyzer().trend_analysis(&z, &history);
        let t = result.summary().unwrap().temperature.unwrap();
        assert!(near_eq(t.anomaly_vs_normal_c, -4.0));
    }

    #[test]
    fn test_trend_partial_metrics() {
        let z = zone("eastern-india");
        let history = vec![
            WeatherObservation::new().with_temperature(20.0),
            WeatherObservation::new().with_humidity(70.0),
        ];
        let result = analyzer().trend_analysis(&z, &history);
        let summary = result.summary().unwrap();

        assert_eq!(summary.observations, 2);
        assert_eq!(summary.temperature.unwrap().observations, 1);
        assert!(summary.rainfall.is_none());

        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("rainfall").is_none());
        let back: TrendResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_zero_normal_rainfall_has_no_deficit() {
        let z = ClimateZone::new("dry", "Dry Zone", vec![], 0.0, 30.0).unwrap();
        let history = vec![WeatherObservation::new().with_rainfall(0.0)];
        let result = analyzer().trend_analysis(&z, &history);
        let r = result.summary().unwrap().rainfall.unwrap();
        assert_eq!(r.deficit_vs_normal_pct, 0.0);
    }
}
