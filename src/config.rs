use chrono::NaiveDate;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

use crate::demand::Calibration;
use crate::error::SizerError;
use crate::optimizer::{CostConfig, EvolutionConfig};
use crate::services::ServicesConfig;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct AppConfig {
    #[validate(nested)]
    pub site: SiteConfig,

    #[validate(nested)]
    pub costs: CostConfig,

    #[validate(nested)]
    pub evolution: EvolutionConfig,

    #[validate(nested)]
    pub calibration: Calibration,

    #[validate(nested)]
    pub services: ServicesConfig,

    /// Optional JSON file with normalized river-flow records.
    #[serde(default)]
    pub hydro_flow_table: Option<PathBuf>,
}

/// The settlement and horizon to size a plant for
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct SiteConfig {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    #[validate(range(min = 1))]
    pub households: u32,

    #[validate(range(min = 1))]
    pub num_days: usize,

    /// Simulation start date; today when unset.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    /// Seed for the single random stream driving demand synthesis and the
    /// capacity search.
    #[serde(default)]
    pub seed: u64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            latitude: 21.98,
            longitude: 96.1,
            households: 300,
            num_days: 7,
            start_date: None,
            seed: 0,
        }
    }
}

impl AppConfig {
    /// Layered load: built-in defaults, then `microgrid-sizer.toml`, then
    /// `MGS_`-prefixed environment variables (`MGS_SITE__SEED=1`).
    pub fn load() -> Result<Self, SizerError> {
        Self::from_figment(
            Figment::from(Serialized::defaults(AppConfig::default()))
                .merge(Toml::file("microgrid-sizer.toml"))
                .merge(Env::prefixed("MGS_").split("__")),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self, SizerError> {
        let config: AppConfig = figment
            .extract()
            .map_err(|e| SizerError::Config(e.to_string()))?;
        config
            .validate()
            .map_err(|e| SizerError::Config(e.to_string()))?;
        Ok(config)
    }
}
