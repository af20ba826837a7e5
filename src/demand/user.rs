//! A user category: one or more identical households owning appliances.

use rand::rngs::StdRng;
use rand::Rng;
use tracing::warn;

use super::appliance::Appliance;
use super::usecase::PeakTimeRange;
use super::{Calibration, DayKind, MINUTES_PER_DAY};
use crate::error::SizerError;

#[derive(Debug, Clone)]
pub struct User {
    pub name: String,
    /// How many identical users this category represents. Each repetition
    /// re-samples all stochasticity.
    pub num_users: u32,
    /// Number of daily preference slots (0 disables preference gating).
    pub user_preference: u32,
    /// The preference drawn for the current profile, in
    /// [1, user_preference], or 0 when preferences are disabled.
    pub rand_daily_pref: u32,
    pub appliances: Vec<Appliance>,
}

impl User {
    pub fn new(name: impl Into<String>, num_users: u32) -> Self {
        Self {
            name: name.into(),
            num_users: num_users.max(1),
            user_preference: 0,
            rand_daily_pref: 0,
            appliances: Vec::new(),
        }
    }

    pub fn with_preference(mut self, user_preference: u32) -> Self {
        self.user_preference = user_preference;
        self
    }

    pub fn add_appliance(&mut self, appliance: Appliance) {
        self.appliances.push(appliance);
    }

    /// Theoretical maximum profile of the whole category: every appliance
    /// always on across its windows, scaled by the category size.
    pub fn maximum_profile(&self) -> Vec<f64> {
        let mut profile = vec![0.0; MINUTES_PER_DAY];
        for appliance in &self.appliances {
            for (total, value) in profile.iter_mut().zip(appliance.maximum_profile()) {
                *total += value;
            }
        }
        profile.iter_mut().for_each(|p| *p *= self.num_users as f64);
        profile
    }

    /// One household's load for the given day.
    ///
    /// Appliances whose randomized on-time cannot fit their minimum cycle
    /// are skipped for the day with a warning.
    pub fn generate_single_load_profile(
        &mut self,
        day: usize,
        peak: &PeakTimeRange,
        day_kind: DayKind,
        calib: &Calibration,
        rng: &mut StdRng,
    ) -> Result<Vec<f64>, SizerError> {
        self.rand_daily_pref = if self.user_preference == 0 {
            0
        } else {
            rng.gen_range(1..=self.user_preference)
        };
        let pref = self.rand_daily_pref;

        let mut load = vec![0.0; MINUTES_PER_DAY];
        for appliance in &mut self.appliances {
            match appliance.generate_load_profile(day, peak, day_kind, pref, calib, rng) {
                Ok(()) => {
                    for (total, &value) in load.iter_mut().zip(&appliance.daily_use) {
                        *total += value;
                    }
                }
                Err(err @ SizerError::InsufficientWindow { .. }) => {
                    warn!(user = %self.name, %err, "skipping appliance for the day");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(load)
    }

    /// The category's load for the given day: `num_users` independent
    /// household profiles summed together.
    pub fn generate_aggregated_load_profile(
        &mut self,
        day: usize,
        peak: &PeakTimeRange,
        day_kind: DayKind,
        calib: &Calibration,
        rng: &mut StdRng,
    ) -> Result<Vec<f64>, SizerError> {
        let mut load = vec![0.0; MINUTES_PER_DAY];
        for _ in 0..self.num_users {
            let single = self.generate_single_load_profile(day, peak, day_kind, calib, rng)?;
            for (total, value) in load.iter_mut().zip(single) {
                *total += value;
            }
        }
        Ok(load)
    }
}
