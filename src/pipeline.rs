//! Pipeline wiring: fetch the external series for the comparable past-year
//! window, synthesize the settlement demand, search the capacity space and
//! report the dispatch at the optimum.

use chrono::{Duration, Local};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::demand::{build_settlement_demand, default_catalog};
use crate::dispatch::energy_balance;
use crate::error::SizerError;
use crate::optimizer::{optimize_capacity, Capacity};
use crate::services::dates::comparable_date;
use crate::services::{HydroIndex, RenewablesProvider};

/// The sizing result: optimal capacities and the hourly dispatch trace.
#[derive(Debug, Clone, Serialize)]
pub struct PlantSizing {
    pub capacity: Capacity,
    /// PV generation at the chosen capacity.
    #[serde(rename = "E_PV")]
    pub e_pv: Vec<f64>,
    #[serde(rename = "E_batt")]
    pub e_batt: Vec<f64>,
    #[serde(rename = "E_diesel")]
    pub e_diesel: Vec<f64>,
    #[serde(rename = "C_batt")]
    pub c_batt: Vec<f64>,
    #[serde(rename = "E_load")]
    pub e_load: Vec<f64>,
    /// Normalized river flow, when a flow table is configured.
    #[serde(rename = "E_hydro", skip_serializing_if = "Option::is_none")]
    pub e_hydro: Option<Vec<f64>>,
}

/// Size the plant for the configured site.
///
/// The external fetches complete before the simulation core runs; the core
/// itself is synchronous and deterministic under the configured seed.
pub async fn run(
    cfg: &AppConfig,
    provider: &dyn RenewablesProvider,
    hydro: Option<&HydroIndex>,
) -> Result<PlantSizing, SizerError> {
    let site = &cfg.site;
    let start_date = site
        .start_date
        .unwrap_or_else(|| Local::now().date_naive());
    let end_date = start_date + Duration::days(site.num_days as i64 - 1);

    // Last year's weather is the poor man's forecast: fetch the comparable
    // 52-weeks-back window for both series.
    let analog_start = comparable_date(start_date);
    let analog_end = comparable_date(end_date);
    let (e_pv_unit, cooling) = futures::try_join!(
        provider.pv_unit_output(analog_start, analog_end, site.latitude, site.longitude),
        provider.cooling_index(analog_start, analog_end, site.latitude, site.longitude),
    )?;

    let mut rng = StdRng::seed_from_u64(site.seed);
    let e_load = build_settlement_demand(
        default_catalog(),
        site.households,
        start_date,
        site.num_days,
        &cooling,
        &cfg.calibration,
        &mut rng,
    )?;

    if e_pv_unit.len() < e_load.len() {
        return Err(SizerError::MissingData(format!(
            "PV series covers {} hours but the demand horizon needs {}",
            e_pv_unit.len(),
            e_load.len()
        )));
    }
    let e_pv_unit = &e_pv_unit[..e_load.len()];

    let (capacity, score) = optimize_capacity(&e_load, e_pv_unit, &cfg.evolution, &cfg.costs, &mut rng);
    if score.is_finite() {
        info!(score, "sizing complete");
    } else {
        // Downstream readers detect this by diesel running at capacity
        // across the horizon.
        warn!("demand is unreachable everywhere in the bounded space; reporting the best penalized candidate");
    }

    let trace = energy_balance(capacity.pv, capacity.battery, capacity.diesel, &e_load, e_pv_unit);
    let e_hydro = match hydro {
        Some(index) => Some(index.unit_hydro(
            site.latitude,
            site.longitude,
            start_date,
            site.num_days,
        )?),
        None => None,
    };

    Ok(PlantSizing {
        capacity,
        e_pv: e_pv_unit.iter().map(|&e| e * capacity.pv).collect(),
        e_batt: trace.e_batt,
        e_diesel: trace.e_diesel,
        c_batt: trace.c_batt,
        e_load,
        e_hydro,
    })
}
