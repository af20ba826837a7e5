//! A use case gathers user categories, computes the settlement-wide peak
//! time range once, and drives the per-day simulation.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use tracing::debug;

use super::user::User;
use super::{Calibration, DayKind, MINUTES_PER_DAY};
use crate::error::SizerError;
use crate::services::dates::date_range;

/// Minute range with elevated coincident switch-on probability.
///
/// The range is half-open and signed: the sampled center can sit close to
/// midnight, so the enlarged range may extend below minute 0 or past 1439.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeakTimeRange {
    pub start: i64,
    pub end: i64,
}

impl PeakTimeRange {
    /// Whether an inclusive minute range touches the peak range. Both
    /// endpoints strictly outside on the same side means no overlap.
    pub fn overlaps_minutes(&self, first: usize, last: usize) -> bool {
        let (lo, hi) = (first as i64, last as i64);
        let peak_last = self.end - 1;
        !((lo < self.start && hi < self.start) || (lo > peak_last && hi > peak_last))
    }
}

#[derive(Debug, Clone)]
pub struct UseCase {
    pub name: String,
    pub users: Vec<User>,
    days: Vec<NaiveDate>,
    peak_enlarge: f64,
    peak_time_range: Option<PeakTimeRange>,
}

impl UseCase {
    pub fn new(
        name: impl Into<String>,
        users: Vec<User>,
        date_start: NaiveDate,
        num_days: usize,
        peak_enlarge: f64,
    ) -> Self {
        Self {
            name: name.into(),
            users,
            days: date_range(date_start, num_days),
            peak_enlarge,
            peak_time_range: None,
        }
    }

    pub fn num_days(&self) -> usize {
        self.days.len()
    }

    pub fn peak_time_range(&self) -> Option<PeakTimeRange> {
        self.peak_time_range
    }

    /// Validate appliance power series against the horizon and sample the
    /// peak time range. Must run before profile generation.
    pub fn initialize(&mut self, rng: &mut StdRng) -> Result<(), SizerError> {
        let num_days = self.days.len();
        for user in &self.users {
            for appliance in &user.appliances {
                appliance.check_power_series(num_days)?;
            }
        }
        let peak = self.calc_peak_time_range(rng);
        debug!(usecase = %self.name, start = peak.start, end = peak.end, "peak time range");
        self.peak_time_range = Some(peak);
        Ok(())
    }

    /// Minutes attaining the population's theoretical maximum profile.
    fn peak_window(&self) -> Vec<usize> {
        let mut total_max = vec![0.0; MINUTES_PER_DAY];
        for user in &self.users {
            for (total, value) in total_max.iter_mut().zip(user.maximum_profile()) {
                *total += value;
            }
        }
        let max_value = total_max.iter().copied().fold(f64::MIN, f64::max);
        total_max
            .iter()
            .enumerate()
            .filter(|(_, &v)| v == max_value)
            .map(|(m, _)| m)
            .collect()
    }

    /// Sample the peak time range from the population maximum profile.
    ///
    /// The minutes attaining the theoretical maximum form the peak window;
    /// a Gaussian centered on its mean picks the peak time, and a second
    /// Gaussian draw enlarges it into a range of at least one minute.
    pub fn calc_peak_time_range(&self, rng: &mut StdRng) -> PeakTimeRange {
        let peak_window = self.peak_window();

        let first = peak_window[0] as f64;
        let last = peak_window[peak_window.len() - 1] as f64;
        let mean = peak_window.iter().sum::<usize>() as f64 / peak_window.len() as f64;
        let sigma = ((last - first) / 3.0).abs();
        let peak_time = Normal::new(mean.round(), sigma).unwrap().sample(rng).round();

        let enlarge_sigma = (self.peak_enlarge * peak_time).abs();
        let enlarged = Normal::new(peak_time, enlarge_sigma).unwrap().sample(rng);
        let rand_peak_enlarge = ((peak_time - enlarged).abs().round()).max(1.0);

        PeakTimeRange {
            start: (peak_time - rand_peak_enlarge) as i64,
            end: (peak_time + rand_peak_enlarge) as i64,
        }
    }

    /// Generate one minute-resolution profile per day and concatenate them.
    pub fn generate_daily_load_profiles(
        &mut self,
        calib: &Calibration,
        rng: &mut StdRng,
    ) -> Result<Vec<f64>, SizerError> {
        if self.peak_time_range.is_none() {
            self.initialize(rng)?;
        }
        let peak = self.peak_time_range.unwrap_or(PeakTimeRange { start: 0, end: 0 });

        let mut profiles = Vec::with_capacity(self.days.len() * MINUTES_PER_DAY);
        let days = self.days.clone();
        for (day_idx, day) in days.iter().enumerate() {
            let day_kind = DayKind::of(*day);
            let mut usecase_load = vec![0.0; MINUTES_PER_DAY];
            for user in &mut self.users {
                let user_load =
                    user.generate_aggregated_load_profile(day_idx, &peak, day_kind, calib, rng)?;
                for (total, value) in usecase_load.iter_mut().zip(user_load) {
                    *total += value;
                }
            }
            debug!(usecase = %self.name, day = day_idx + 1, of = days.len(), "day simulated");
            profiles.extend(usecase_load);
        }
        Ok(profiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demand::appliance::{Appliance, ApplianceSpec, PowerInput, Window};
    use rand::SeedableRng;

    fn window_appliance(window: Window) -> Appliance {
        let spec = ApplianceSpec {
            power: PowerInput::Constant(100.0),
            func_time: 60,
            func_cycle: 30,
            window_1: Some(window),
            ..Default::default()
        };
        Appliance::new("lamp", &spec).unwrap()
    }

    fn start_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 17).unwrap()
    }

    #[test]
    fn test_peak_window_is_the_shared_overlap() {
        // Two appliances overlap only in [900, 960]; the maximum of the
        // population profile sits exactly in that overlap.
        let mut user_a = User::new("a", 1);
        user_a.add_appliance(window_appliance(Window::new(600, 960)));
        let mut user_b = User::new("b", 1);
        user_b.add_appliance(window_appliance(Window::new(900, 1260)));

        let usecase = UseCase::new("overlap", vec![user_a, user_b], start_date(), 1, 0.15);
        let window = usecase.peak_window();
        assert_eq!(window, (900..960).collect::<Vec<_>>());
    }

    #[test]
    fn test_peak_time_is_drawn_near_the_peak_window() {
        let mut user_a = User::new("a", 1);
        user_a.add_appliance(window_appliance(Window::new(600, 960)));
        let mut user_b = User::new("b", 1);
        user_b.add_appliance(window_appliance(Window::new(900, 1260)));

        let usecase = UseCase::new("overlap", vec![user_a, user_b], start_date(), 1, 0.15);
        // The center is Gaussian around the window mean with a third of the
        // window width as spread; stay within a few standard deviations.
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let peak = usecase.calc_peak_time_range(&mut rng);
            let center = (peak.start + peak.end) / 2;
            assert!(
                (930 - 100..930 + 100).contains(&center),
                "seed {seed}: center {center} implausibly far from minute 930"
            );
        }
    }

    #[test]
    fn test_peak_range_is_never_empty() {
        let mut user = User::new("a", 1);
        user.add_appliance(window_appliance(Window::new(0, 1440)));
        let usecase = UseCase::new("flat", vec![user], start_date(), 1, 0.0);
        let mut rng = StdRng::seed_from_u64(3);
        let peak = usecase.calc_peak_time_range(&mut rng);
        assert!(peak.end - peak.start >= 2);
    }

    #[test]
    fn test_profiles_concatenate_days() {
        let mut user = User::new("a", 1);
        user.add_appliance(window_appliance(Window::new(600, 960)));
        let mut usecase = UseCase::new("three days", vec![user], start_date(), 3, 0.15);
        let mut rng = StdRng::seed_from_u64(0);
        let profile = usecase
            .generate_daily_load_profiles(&Calibration::default(), &mut rng)
            .unwrap();
        assert_eq!(profile.len(), 3 * MINUTES_PER_DAY);
    }

    #[test]
    fn test_overlap_classification() {
        let peak = PeakTimeRange { start: 100, end: 200 };
        assert!(peak.overlaps_minutes(150, 160)); // inside
        assert!(peak.overlaps_minutes(50, 120)); // straddles the start
        assert!(peak.overlaps_minutes(190, 260)); // straddles the end
        assert!(peak.overlaps_minutes(50, 300)); // spans the whole range
        assert!(!peak.overlaps_minutes(10, 90)); // both below
        assert!(!peak.overlaps_minutes(210, 260)); // both above
    }
}
