//! # Capacity Optimizer
//!
//! Differential-evolution search over the (PV, battery, diesel) capacity
//! space, scoring every candidate with a penalized levelized-cost objective
//! evaluated against the dispatch simulation.

pub mod cost;
pub mod evolution;

pub use cost::{constrained_cost, cost, demand_constraint, CostConfig};
pub use evolution::{differential_evolution, EvolutionConfig};

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Plant capacity triple: PV in kW, battery in kWh, diesel in kW.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Capacity {
    #[serde(rename = "PV")]
    pub pv: f64,
    pub battery: f64,
    pub diesel: f64,
}

impl Capacity {
    pub fn from_slice(x: &[f64]) -> Self {
        Self {
            pv: x.first().copied().unwrap_or_default(),
            battery: x.get(1).copied().unwrap_or_default(),
            diesel: x.get(2).copied().unwrap_or_default(),
        }
    }
}

/// Search the bounded capacity space for the cheapest feasible triple.
///
/// Returns the best candidate and its score; an infinite score means no
/// candidate satisfied demand anywhere in the bounded space.
pub fn optimize_capacity(
    e_load: &[f64],
    e_pv: &[f64],
    evolution: &EvolutionConfig,
    costs: &CostConfig,
    rng: &mut StdRng,
) -> (Capacity, f64) {
    let (best, score) = differential_evolution(
        |x| constrained_cost(&Capacity::from_slice(x), e_load, e_pv, costs),
        evolution,
        rng,
    );
    let capacity = Capacity::from_slice(&best);
    info!(
        pv = capacity.pv,
        battery = capacity.battery,
        diesel = capacity.diesel,
        score,
        "capacity search finished"
    );
    (capacity, score)
}
