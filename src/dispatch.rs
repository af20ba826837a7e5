//! # Plant Dispatch Simulation
//!
//! Per-timestep energy balance of the hybrid plant: PV serves the load
//! first, the battery absorbs surplus and covers deficit within its
//! state-of-charge band, and the diesel genset covers whatever remains up
//! to its rated capacity.

use serde::Serialize;

/// Round-trip efficiency of the battery.
pub const ROUND_TRIP_EFFICIENCY: f64 = 0.95;
/// Maximum usable fraction of the battery capacity.
pub const MAX_DISCHARGE: f64 = 0.9;
/// Fraction of capacity stored at the start of the horizon.
pub const INITIAL_SOC_FRACTION: f64 = 0.5;
/// Residual deficits below this threshold are treated as zero.
const DEFICIT_EPSILON: f64 = 1e-7;

/// One-way efficiency, applied to both charge and discharge.
pub fn charge_efficiency() -> f64 {
    ROUND_TRIP_EFFICIENCY.sqrt()
}

/// Per-timestep dispatch results, aligned with the demand series.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchTrace {
    /// Energy delivered by the battery.
    pub e_batt: Vec<f64>,
    /// Energy delivered by the diesel genset.
    pub e_diesel: Vec<f64>,
    /// Battery state of charge after the step.
    pub c_batt: Vec<f64>,
}

/// Simulate the energy balance over the whole horizon.
///
/// `e_pv` is generation per unit of installed PV capacity; `e_load` is the
/// demand in the same energy units per step.
pub fn energy_balance(
    pv_capacity: f64,
    battery_capacity: f64,
    diesel_capacity: f64,
    e_load: &[f64],
    e_pv: &[f64],
) -> DispatchTrace {
    let steps = e_load.len();
    let mut e_batt = vec![0.0; steps];
    let mut e_diesel = vec![0.0; steps];
    let mut c_batt = vec![0.0; steps];

    let efficiency = charge_efficiency();
    let mut soc = INITIAL_SOC_FRACTION * battery_capacity;
    let soc_floor = (1.0 - MAX_DISCHARGE) * battery_capacity;

    for t in 0..steps {
        let pv_output = pv_capacity * e_pv.get(t).copied().unwrap_or_default();
        let mut surplus = pv_output - e_load[t];

        if surplus > 0.0 {
            soc = (soc + efficiency * surplus).min(battery_capacity);
        } else {
            let available = soc - soc_floor;
            let discharged = available.min(-surplus / efficiency);
            if discharged > 0.0 {
                soc -= discharged;
            }
            let delivered = discharged * efficiency;
            e_batt[t] = delivered.max(0.0);
            surplus += delivered;
        }

        if surplus < -DEFICIT_EPSILON {
            e_diesel[t] = (-surplus).min(diesel_capacity);
        }
        c_batt[t] = soc;
    }

    DispatchTrace {
        e_batt,
        e_diesel,
        c_batt,
    }
}
