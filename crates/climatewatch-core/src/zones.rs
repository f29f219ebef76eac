//! Climate zone registry
//!
//! India's six climatological zones following the IMD classification. The
//! table below is the single source of truth for zone IDs; every other
//! module should resolve zones through [`ZoneRegistry`] rather than
//! hardcoding averages.

use crate::error::{ClimateError, ClimateResult};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Days used to turn an annual rainfall average into a daily normal
pub const DAYS_PER_YEAR: f64 = 365.0;

/// One of India's major climate zones
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClimateZone {
    /// Kebab-case identifier, e.g. `central-india`
    pub zone_id: String,

    /// Human-readable name
    pub name: String,

    /// Member states, in definition order
    pub states: Vec<String>,

    /// Average annual rainfall (mm)
    pub avg_rainfall_mm: f64,

    /// Average annual temperature (°C)
    pub avg_temp_c: f64,
}

impl ClimateZone {
    /// Build a zone, rejecting negative or non-finite averages
    pub fn new(
        zone_id: impl Into<String>,
        name: impl Into<String>,
        states: Vec<String>,
        avg_rainfall_mm: f64,
        avg_temp_c: f64,
    ) -> ClimateResult<Self> {
        let zone_id = zone_id.into();

        if !avg_rainfall_mm.is_finite() || avg_rainfall_mm < 0.0 {
            return Err(ClimateError::InvalidZone {
                zone_id,
                reason: format!("average rainfall must be >= 0 mm, got {avg_rainfall_mm}"),
            });
        }
        if !avg_temp_c.is_finite() {
            return Err(ClimateError::InvalidZone {
                zone_id,
                reason: format!("average temperature must be finite, got {avg_temp_c}"),
            });
        }

        Ok(Self {
            zone_id,
            name: name.into(),
            states,
            avg_rainfall_mm,
            avg_temp_c,
        })
    }

    /// Expected rainfall for a single day (annual average spread evenly)
    pub fn daily_normal_rainfall_mm(&self) -> f64 {
        self.avg_rainfall_mm / DAYS_PER_YEAR
    }

    /// Case-insensitive exact match against the member states
    pub fn contains_state(&self, state: &str) -> bool {
        let wanted = state.to_lowercase();
        self.states.iter().any(|s| s.to_lowercase() == wanted)
    }
}

struct ZoneDef {
    zone_id: &'static str,
    name: &'static str,
    states: &'static [&'static str],
    avg_rainfall_mm: f64,
    avg_temp_c: f64,
}

static ZONE_TABLE: &[ZoneDef] = &[
    ZoneDef {
        zone_id: "northwest-india",
        name: "Northwest India",
        states: &[
            "Rajasthan",
            "Punjab",
            "Haryana",
            "Himachal Pradesh",
            "Jammu & Kashmir",
            "Ladakh",
        ],
        avg_rainfall_mm: 350.0,
        avg_temp_c: 24.0,
    },
    ZoneDef {
        zone_id: "northeast-india",
        name: "Northeast India",
        states: &[
            "Assam",
            "Meghalaya",
            "Arunachal Pradesh",
            "Nagaland",
            "Manipur",
            "Mizoram",
            "Tripura",
            "Sikkim",
        ],
        avg_rainfall_mm: 2500.0,
        avg_temp_c: 22.0,
    },
    ZoneDef {
        zone_id: "central-india",
        name: "Central India",
        states: &["Madhya Pradesh", "Chhattisgarh", "Jharkhand", "Odisha"],
        avg_rainfall_mm: 1100.0,
        avg_temp_c: 27.0,
    },
    ZoneDef {
        zone_id: "western-india",
        name: "Western India",
        states: &["Gujarat", "Maharashtra", "Goa"],
        avg_rainfall_mm: 900.0,
        avg_temp_c: 27.5,
    },
    ZoneDef {
        zone_id: "southern-peninsula",
        name: "Southern Peninsula",
        states: &[
            "Karnataka",
            "Tamil Nadu",
            "Kerala",
            "Andhra Pradesh",
            "Telangana",
        ],
        avg_rainfall_mm: 1200.0,
        avg_temp_c: 28.0,
    },
    ZoneDef {
        zone_id: "eastern-india",
        name: "Eastern India",
        states: &["West Bengal", "Bihar", "Uttar Pradesh", "Uttarakhand"],
        avg_rainfall_mm: 1050.0,
        avg_temp_c: 26.5,
    },
];

/// Read-only registry of the six built-in zones
#[derive(Debug, Clone)]
pub struct ZoneRegistry {
    zones: Vec<ClimateZone>,
}

impl Default for ZoneRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ZoneRegistry {
    pub fn new() -> Self {
        let zones = ZONE_TABLE
            .iter()
            .map(|def| ClimateZone {
                zone_id: def.zone_id.to_string(),
                name: def.name.to_string(),
                states: def.states.iter().map(|s| s.to_string()).collect(),
                avg_rainfall_mm: def.avg_rainfall_mm,
                avg_temp_c: def.avg_temp_c,
            })
            .collect();

        Self { zones }
    }

    /// Process-wide registry instance
    pub fn global() -> &'static ZoneRegistry {
        static REGISTRY: OnceLock<ZoneRegistry> = OnceLock::new();
        REGISTRY.get_or_init(ZoneRegistry::new)
    }

    /// Look up a zone by ID
    pub fn get_zone(&self, zone_id: &str) -> ClimateResult<&ClimateZone> {
        self.zones
            .iter()
            .find(|z| z.zone_id == zone_id)
            .ok_or_else(|| ClimateError::NotFound {
                zone_id: zone_id.to_string(),
                available: self.zone_ids().iter().map(|id| id.to_string()).collect(),
            })
    }

    /// All zones in definition order
    pub fn all_zones(&self) -> &[ClimateZone] {
        &self.zones
    }

    /// Zones listing `state` among their members (case-insensitive)
    pub fn zones_for_state(&self, state: &str) -> Vec<&ClimateZone> {
        self.zones.iter().filter(|z| z.contains_state(state)).collect()
    }

    pub fn zone_ids(&self) -> Vec<&str> {
        self.zones.iter().map(|z| z.zone_id.as_str()).collect()
    }
}
