use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use climatewatch_config::AppConfig;
use climatewatch_core::{
    fields, AlertGenerator, ClimateAnalyzer, ClimateReport, ClimateZone, ObservationRecord,
    TrendResult, WeatherAlert, WeatherObservation, ZoneRegistry, ENVIRONMENTAL_DISCLAIMER,
};
use tracing::info;

const RULE_WIDTH: usize = 60;

#[derive(Debug, Parser)]
#[command(
    name = "climatewatch",
    version,
    about = "Climate monitoring and early warning for India's climate zones"
)]
pub struct Cli {
    /// Output format
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// TOML config file (defaults to $CLIMATEWATCH_CONFIG, then ./climatewatch.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List all climate zones
    Zones,
    /// Show the zones containing a state
    States {
        /// State name, matched case-insensitively
        state: String,
    },
    /// Generate weather alerts for a zone
    Alerts {
        /// Zone ID (e.g. central-india, western-india)
        #[arg(long)]
        zone: String,
        /// JSON file with current observations; synthetic values when omitted
        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// Generate a full climate report for a zone
    Report {
        #[arg(long)]
        zone: String,
        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// Summarise historical observations for a zone
    Trend {
        #[arg(long)]
        zone: String,
        /// JSON file holding an array of observations
        #[arg(long)]
        data: PathBuf,
    },
}

/// Execute a parsed command and return what should be printed on stdout
pub fn run(cli: &Cli, config: &AppConfig) -> Result<String> {
    let registry = ZoneRegistry::global();

    match &cli.command {
        Command::Zones => render_zones(registry.all_zones(), cli.format),
        Command::States { state } => {
            let zones = registry.zones_for_state(state);
            render_states(state, &zones, cli.format)
        }
        Command::Alerts { zone, data } => {
            let zone = registry.get_zone(zone)?;
            let obs = match data {
                Some(path) => load_observation(path)?,
                None => synthetic_alert_observation(zone),
            };
            let generator = AlertGenerator::new(config.alert_thresholds());
            let alerts = generator.evaluate_conditions(zone, &obs);
            info!(zone = %zone.zone_id, count = alerts.len(), "alerts evaluated");
            render_alerts(zone, &alerts, cli.format)
        }
        Command::Report { zone, data } => {
            let zone = registry.get_zone(zone)?;
            let obs = match data {
                Some(path) => load_observation(path)?,
                None => synthetic_report_observation(zone),
            };
            let report = analyzer(config).generate_report(zone, &obs);
            render_report(&report, cli.format)
        }
        Command::Trend { zone, data } => {
            let zone = registry.get_zone(zone)?;
            let history = load_history(data)?;
            let result = analyzer(config).trend_analysis(zone, &history);
            render_trend(&result, cli.format)
        }
    }
}

fn analyzer(config: &AppConfig) -> ClimateAnalyzer {
    ClimateAnalyzer::new(
        AlertGenerator::new(config.alert_thresholds()),
        config.forecast_settings(),
    )
}

/// Read a single JSON observation object
pub fn load_observation(path: &Path) -> Result<WeatherObservation> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read observation file {}", path.display()))?;
    let record: ObservationRecord = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse observation file {}", path.display()))?;
    let obs = WeatherObservation::from_record(&record)
        .with_context(|| format!("invalid observation in {}", path.display()))?;
    Ok(obs)
}

/// Read a JSON array of observation objects
pub fn load_history(path: &Path) -> Result<Vec<WeatherObservation>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read history file {}", path.display()))?;
    let records: Vec<ObservationRecord> = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse history file {}", path.display()))?;
    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            WeatherObservation::from_record(record)
                .with_context(|| format!("invalid observation #{} in {}", i + 1, path.display()))
        })
        .collect()
}

/// Demonstration values for `alerts` when no file is given
pub fn synthetic_alert_observation(zone: &ClimateZone) -> WeatherObservation {
    WeatherObservation::new()
        .with_temperature(zone.avg_temp_c + 2.0)
        .with_rainfall(zone.daily_normal_rainfall_mm())
        .with_humidity(65.0)
        .with_wind(15.0)
        .with_rainfall_deficit(10.0)
}

/// Demonstration values for `report` when no file is given
pub fn synthetic_report_observation(zone: &ClimateZone) -> WeatherObservation {
    WeatherObservation::new()
        .with_temperature(zone.avg_temp_c)
        .with_rainfall(zone.daily_normal_rainfall_mm())
        .with_humidity(65.0)
        .with_wind(12.0)
        .with_rainfall_deficit(5.0)
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to serialize output")
}

fn push_disclaimer(out: &mut String) -> Result<()> {
    writeln!(out, "\nDISCLAIMER: {ENVIRONMENTAL_DISCLAIMER}")?;
    Ok(())
}

pub fn render_zones(zones: &[ClimateZone], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(zones);
    }

    let mut out = String::new();
    writeln!(out, "INDIA CLIMATE ZONES:")?;
    writeln!(
        out,
        "{:<22} {:<22} {:>14} {:>12}",
        "Zone ID", "Name", "Avg Rain (mm)", "Avg Temp (C)"
    )?;
    writeln!(out, "{}", "-".repeat(75))?;
    for zone in zones {
        writeln!(
            out,
            "{:<22} {:<22} {:>14.0} {:>12.1}",
            zone.zone_id, zone.name, zone.avg_rainfall_mm, zone.avg_temp_c
        )?;
    }
    push_disclaimer(&mut out)?;
    Ok(out)
}

pub fn render_states(state: &str, zones: &[&ClimateZone], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(zones);
    }

    let mut out = String::new();
    if zones.is_empty() {
        writeln!(out, "No climate zone lists the state '{state}'.")?;
        return Ok(out);
    }
    writeln!(out, "ZONES CONTAINING '{state}':")?;
    for zone in zones {
        writeln!(out, "  {} ({})", zone.zone_id, zone.name)?;
    }
    Ok(out)
}

pub fn render_alerts(
    zone: &ClimateZone,
    alerts: &[WeatherAlert],
    format: OutputFormat,
) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(alerts);
    }

    let mut out = String::new();
    writeln!(out, "WEATHER ALERTS: {}", zone.name)?;
    writeln!(out, "States: {}", zone.states.join(", "))?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;

    if alerts.is_empty() {
        writeln!(out, "No active alerts. Conditions are within normal range.")?;
    }
    for alert in alerts {
        writeln!(out)?;
        writeln!(out, "ALERT TYPE:  {}", alert.alert_type.as_str().to_uppercase())?;
        writeln!(out, "SEVERITY:    {}", alert.severity.as_str().to_uppercase())?;
        writeln!(out, "MESSAGE:     {}", alert.message)?;
        writeln!(
            out,
            "VALID UNTIL: {}",
            alert.valid_until.format("%Y-%m-%d %H:%M UTC")
        )?;
    }
    push_disclaimer(&mut out)?;
    Ok(out)
}

fn observation_lines(out: &mut String, obs: &WeatherObservation, indent: &str) -> Result<()> {
    let values = [
        (fields::TEMPERATURE_C, obs.temperature_c),
        (fields::RAINFALL_MM, obs.rainfall_mm),
        (fields::HUMIDITY_PCT, obs.humidity_pct),
        (fields::WIND_KMH, obs.wind_kmh),
        (fields::RAINFALL_DEFICIT_PCT, obs.rainfall_deficit_pct),
    ];
    for (key, value) in values {
        if let Some(v) = value {
            writeln!(out, "{indent}{key}: {v:.2}")?;
        }
    }
    Ok(())
}

pub fn render_report(report: &ClimateReport, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(report);
    }

    let mut out = String::new();
    writeln!(out, "CLIMATE REPORT: {}", report.zone.name)?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;

    writeln!(out, "\nCURRENT CONDITIONS:")?;
    observation_lines(&mut out, &report.current_conditions, "  ")?;

    writeln!(out, "\nACTIVE ALERTS: {}", report.alerts.len())?;
    for alert in &report.alerts {
        writeln!(
            out,
            "  [{}] {}: {}",
            alert.severity.as_str().to_uppercase(),
            alert.alert_type,
            alert.message
        )?;
    }

    let forecast = &report.forecast;
    writeln!(out, "\nFORECAST:")?;
    writeln!(out, "  next_24h:")?;
    observation_lines(&mut out, &forecast.next_24h.conditions, "    ")?;
    writeln!(out, "    advisory: {}", forecast.next_24h.advisory)?;
    writeln!(out, "  next_7_days:")?;
    writeln!(
        out,
        "    rainfall_outlook: {}",
        forecast.next_7_days.rainfall_outlook.as_str()
    )?;
    writeln!(
        out,
        "    temperature_outlook: {}",
        forecast.next_7_days.temperature_outlook.as_str()
    )?;

    push_disclaimer(&mut out)?;
    Ok(out)
}

pub fn render_trend(result: &TrendResult, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(result);
    }

    let mut out = String::new();
    match result {
        TrendResult::NoData(no_data) => {
            writeln!(out, "TREND ANALYSIS: {}", no_data.zone_name)?;
            writeln!(out, "{}", no_data.error)?;
        }
        TrendResult::Summary(summary) => {
            writeln!(out, "TREND ANALYSIS: {}", summary.zone_name)?;
            writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
            writeln!(out, "Observations: {}", summary.observations)?;

            if let Some(t) = &summary.temperature {
                writeln!(out, "\nTEMPERATURE ({} samples):", t.observations)?;
                writeln!(out, "  mean_c: {:.2}", t.mean_c)?;
                writeln!(out, "  min_c: {:.2}", t.min_c)?;
                writeln!(out, "  max_c: {:.2}", t.max_c)?;
                writeln!(out, "  anomaly_vs_normal_c: {:+.2}", t.anomaly_vs_normal_c)?;
            }
            if let Some(r) = &summary.rainfall {
                writeln!(out, "\nRAINFALL ({} samples):", r.observations)?;
                writeln!(out, "  total_mm: {:.2}", r.total_mm)?;
                writeln!(out, "  mean_daily_mm: {:.2}", r.mean_daily_mm)?;
                writeln!(out, "  min_mm: {:.2}", r.min_mm)?;
                writeln!(out, "  max_mm: {:.2}", r.max_mm)?;
                writeln!(out, "  anomaly_vs_normal_mm: {:+.2}", r.anomaly_vs_normal_mm)?;
                writeln!(out, "  deficit_vs_normal_pct: {:+.2}", r.deficit_vs_normal_pct)?;
            }
        }
    }
    push_disclaimer(&mut out)?;
    Ok(out)
}
