use climatewatch_core::{AlertThresholds, ClimateError, ForecastSettings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_ENV_VAR: &str = "CLIMATEWATCH_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "climatewatch.toml";
pub const DEFAULT_LOG_FILTER: &str = "warn,climatewatch=info";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub thresholds: Option<AlertThresholds>,
    pub forecast: Option<ForecastSettings>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Thresholds(#[from] ClimateError),
    #[error("Invalid forecast settings: {0}")]
    Forecast(String),
}

impl AppConfig {
    /// Load from CLIMATEWATCH_CONFIG, else ./climatewatch.toml if present, else defaults
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var(CONFIG_ENV_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        if Path::new(&path).exists() {
            Self::load_from(&path)
        } else {
            debug!(path = %path, "no config file, using defaults");
            Ok(AppConfig::default())
        }
    }

    /// Load an explicitly named file; a missing file is an error here
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let s = fs::read_to_string(path.as_ref())?;
        let cfg = Self::from_toml_str(&s)?;
        debug!(path = %path.as_ref().display(), "config loaded");
        Ok(cfg)
    }

    /// Explicit path when given, otherwise the [`load`](Self::load) lookup
    pub fn resolve(explicit: Option<&PathBuf>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => Self::load(),
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg = toml::from_str::<AppConfig>(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.alert_thresholds().validate()?;

        let forecast = self.forecast_settings();
        if !forecast.rainfall_decay_factor.is_finite() || forecast.rainfall_decay_factor < 0.0 {
            return Err(ConfigError::Forecast(format!(
                "rainfall_decay_factor must be >= 0, got {}",
                forecast.rainfall_decay_factor
            )));
        }
        if !forecast.normal_band_pct.is_finite() || forecast.normal_band_pct < 0.0 {
            return Err(ConfigError::Forecast(format!(
                "normal_band_pct must be >= 0, got {}",
                forecast.normal_band_pct
            )));
        }
        Ok(())
    }

    /// Configured thresholds, defaults for anything not set
    pub fn alert_thresholds(&self) -> AlertThresholds {
        self.thresholds.clone().unwrap_or_default()
    }

    pub fn forecast_settings(&self) -> ForecastSettings {
        self.forecast.unwrap_or_default()
    }

    /// Log filter (default "warn,climatewatch=info")
    pub fn log_filter(&self) -> String {
        self.logging
            .as_ref()
            .and_then(|l| l.filter.clone())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
    }
}
