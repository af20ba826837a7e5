//! Penalized levelized-cost objective for a candidate capacity triple.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Capacity;
use crate::dispatch::energy_balance;

const HOURS_PER_YEAR: f64 = 8760.0;
/// Constraint violations larger than this make a candidate infeasible.
const CONSTRAINT_TOLERANCE: f64 = 1e-4;

/// Capital and fuel cost parameters, per kW (PV, diesel) or kWh (battery).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CostConfig {
    #[validate(range(min = 0.0))]
    pub pv_cost: f64,
    #[validate(range(min = 0.0))]
    pub battery_cost: f64,
    #[validate(range(min = 0.0))]
    pub diesel_cost: f64,
    /// Fuel cost per kWh of diesel generation.
    #[validate(range(min = 0.0))]
    pub diesel_fuel: f64,
    /// Horizon the simulated window is scaled to, so capital and fuel costs
    /// are commensurable despite a short simulation.
    #[validate(range(min = 1.0))]
    pub simulation_years: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            pv_cost: 720.0,
            battery_cost: 140.0,
            diesel_cost: 261.0,
            diesel_fuel: 0.2,
            simulation_years: 15.0,
        }
    }
}

/// Worst per-step shortfall of supply against demand. Non-negative values
/// mean demand is met everywhere.
pub fn demand_constraint(capacity: &Capacity, e_load: &[f64], e_pv: &[f64]) -> f64 {
    let trace = energy_balance(capacity.pv, capacity.battery, capacity.diesel, e_load, e_pv);
    (0..e_load.len())
        .map(|t| {
            trace.e_batt[t] + trace.e_diesel[t] + capacity.pv * e_pv.get(t).copied().unwrap_or_default()
                - e_load[t]
        })
        .fold(f64::INFINITY, f64::min)
}

/// Levelized cost of the candidate: capital plus scaled fuel, divided by
/// the scaled energy served.
pub fn cost(capacity: &Capacity, e_load: &[f64], e_pv: &[f64], costs: &CostConfig) -> f64 {
    let trace = energy_balance(capacity.pv, capacity.battery, capacity.diesel, e_load, e_pv);

    let load_factor = costs.simulation_years * HOURS_PER_YEAR / e_load.len() as f64;
    let fuel: f64 = trace
        .e_diesel
        .iter()
        .map(|&e| e * load_factor * costs.diesel_fuel)
        .sum();
    let total = capacity.pv * costs.pv_cost
        + capacity.battery * costs.battery_cost
        + capacity.diesel * costs.diesel_cost
        + fuel;

    let served: f64 = e_load.iter().map(|&e| e * load_factor).sum();
    total / served
}

/// The search objective: infinite when the candidate cannot meet demand,
/// the levelized cost otherwise. Total over the whole space, never errors.
pub fn constrained_cost(
    capacity: &Capacity,
    e_load: &[f64],
    e_pv: &[f64],
    costs: &CostConfig,
) -> f64 {
    if demand_constraint(capacity, e_load, e_pv) < -CONSTRAINT_TOLERANCE {
        return f64::INFINITY;
    }
    cost(capacity, e_load, e_pv, costs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_day() -> (Vec<f64>, Vec<f64>) {
        let load = vec![1.0; 24];
        let pv: Vec<f64> = (0..24)
            .map(|h| if (6..18).contains(&h) { 0.8 } else { 0.0 })
            .collect();
        (load, pv)
    }

    #[test]
    fn test_undersized_plant_is_infeasible() {
        let (load, pv) = flat_day();
        let tiny = Capacity {
            pv: 0.0,
            battery: 0.0,
            diesel: 0.1,
        };
        assert!(demand_constraint(&tiny, &load, &pv) < -CONSTRAINT_TOLERANCE);
        assert!(constrained_cost(&tiny, &load, &pv, &CostConfig::default()).is_infinite());
    }

    #[test]
    fn test_sufficient_diesel_is_feasible() {
        let (load, pv) = flat_day();
        let plant = Capacity {
            pv: 0.0,
            battery: 0.0,
            diesel: 1.0,
        };
        assert!(demand_constraint(&plant, &load, &pv) >= -CONSTRAINT_TOLERANCE);
        let score = constrained_cost(&plant, &load, &pv, &CostConfig::default());
        assert!(score.is_finite() && score > 0.0);
    }

    #[test]
    fn test_constraint_is_monotone_in_capacity() {
        let (load, pv) = flat_day();
        let base = Capacity {
            pv: 0.5,
            battery: 2.0,
            diesel: 0.4,
        };
        let baseline = demand_constraint(&base, &load, &pv);
        for grown in [
            Capacity { pv: base.pv + 1.0, ..base },
            Capacity { battery: base.battery + 5.0, ..base },
            Capacity { diesel: base.diesel + 1.0, ..base },
        ] {
            assert!(
                demand_constraint(&grown, &load, &pv) >= baseline - 1e-9,
                "adding capacity must never worsen the constraint"
            );
        }
    }

    #[test]
    fn test_fuel_cost_scales_with_diesel_use() {
        let load = vec![1.0; 24];
        let no_pv = vec![0.0; 24];
        let costs = CostConfig::default();
        let diesel_only = Capacity {
            pv: 0.0,
            battery: 0.0,
            diesel: 1.0,
        };
        let with_fuel = cost(&diesel_only, &load, &no_pv, &costs);
        let frozen_fuel = cost(
            &diesel_only,
            &load,
            &no_pv,
            &CostConfig {
                diesel_fuel: 0.0,
                ..costs
            },
        );
        assert!(with_fuel > frozen_fuel);
        // With fuel free, the levelized cost is just capex over energy.
        let load_factor = 15.0 * 8760.0 / 24.0;
        let expected = 261.0 / (24.0 * load_factor);
        assert!((frozen_fuel - expected).abs() < 1e-12);
    }
}
