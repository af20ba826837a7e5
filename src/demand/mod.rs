//! # Stochastic Settlement Demand
//!
//! Minute-resolution household electricity demand synthesis. A [`UseCase`]
//! gathers [`User`] instances (households) which own [`Appliance`] instances;
//! each simulated day every appliance places randomized switch-on events
//! inside its functioning windows, and the per-minute loads aggregate up to
//! the settlement.
//!
//! ## Determinism
//!
//! Every stochastic function takes an explicit `&mut StdRng`; two runs with
//! the same seed and inputs produce identical profiles. Draws are consumed
//! in a fixed order per appliance-day:
//!
//! 1. occasional-use gate (one uniform, always consumed),
//! 2. per declared window: start jitter, end jitter (two integer uniforms),
//! 3. on-time jitter multiplier, then randomized total on-time (uniforms
//!    are skipped when their bounds collapse to a point),
//! 4. per duty cycle: two power jitters, an optional half-swap coin when
//!    three cycles are declared, then two duration jitters,
//! 5. per switch-on event: position, duration, coincidence (one Gaussian
//!    inside the peak range, one uniform off-peak), and a single power
//!    jitter when no duty cycle applies.
//!
//! The daily preference index (one integer uniform per user repetition) is
//! drawn before the user's appliances run.

pub mod appliance;
pub mod catalog;
pub mod settlement;
pub mod user;
pub mod usecase;

pub use appliance::{Appliance, ApplianceSpec, Window};
pub use catalog::{default_catalog, Catalog};
pub use settlement::build_settlement_demand;
pub use user::User;
pub use usecase::{PeakTimeRange, UseCase};

use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Samples per daily profile.
pub const MINUTES_PER_DAY: usize = 1440;

/// Weekday/weekend classification of a simulated day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayKind {
    Weekday,
    Weekend,
}

impl DayKind {
    pub fn of(date: NaiveDate) -> Self {
        if date.weekday().num_days_from_monday() > 4 {
            DayKind::Weekend
        } else {
            DayKind::Weekday
        }
    }
}

/// Calibration of the stochastic demand model.
///
/// `mu_peak` and `s_peak` regulate the Gaussian that governs coincident
/// switch-on inside the peak time range; `op_factor` bounds the clipped
/// uniform used off-peak; `peak_enlarge` widens the sampled peak range.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Calibration {
    #[validate(range(min = 0.0))]
    pub peak_enlarge: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub mu_peak: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub s_peak: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub op_factor: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            peak_enlarge: 0.15,
            mu_peak: 0.5,
            s_peak: 0.5,
            op_factor: 0.5,
        }
    }
}

/// Uniform multiplier in [1 − var, 1 + var] applied to `norm`.
///
/// Bounds are normalized, so a negative `var` yields the same distribution.
pub(crate) fn random_variation(rng: &mut StdRng, var: f64, norm: f64) -> f64 {
    let (lo, hi) = if 1.0 - var <= 1.0 + var {
        (1.0 - var, 1.0 + var)
    } else {
        (1.0 + var, 1.0 - var)
    };
    if lo == hi {
        norm
    } else {
        norm * rng.gen_range(lo..hi)
    }
}

/// Uniform draw between two bounds supplied in either order.
pub(crate) fn uniform_between(rng: &mut StdRng, a: f64, b: f64) -> f64 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if lo == hi {
        lo
    } else {
        rng.gen_range(lo..hi)
    }
}

/// Two-phase duty-cycle waveform: `p1` held for a jittered `t1` minutes,
/// then `p2` for a jittered `t2` minutes.
pub(crate) fn duty_cycle_wave(
    rng: &mut StdRng,
    var: f64,
    t1: u32,
    p1: f64,
    t2: u32,
    p2: f64,
) -> Vec<f64> {
    let n1 = random_variation(rng, var, t1 as f64).max(0.0) as usize;
    let n2 = random_variation(rng, var, t2 as f64).max(0.0) as usize;
    let mut wave = Vec::with_capacity(n1 + n2);
    wave.extend(std::iter::repeat(p1).take(n1));
    wave.extend(std::iter::repeat(p2).take(n2));
    wave
}
