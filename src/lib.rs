//! # microgrid-sizer
//!
//! Sizes an off-grid hybrid power plant (PV array, battery, diesel genset)
//! for a rural settlement. The pipeline synthesizes a minute-resolution
//! stochastic demand profile from appliance behavior, couples it with
//! per-unit PV generation from an external service, and searches the
//! capacity space by differential evolution against a penalized
//! levelized-cost objective.

pub mod config;
pub mod demand;
pub mod dispatch;
pub mod error;
pub mod optimizer;
pub mod pipeline;
pub mod services;
pub mod telemetry;

pub use config::AppConfig;
pub use error::SizerError;
pub use optimizer::Capacity;
pub use pipeline::PlantSizing;
