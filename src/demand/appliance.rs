//! # Appliance Model
//!
//! One appliance instance count owned by a user: behavioral parameters plus
//! the per-day minute-resolution profile generation. Each simulated day the
//! appliance randomizes its functioning windows and total on-time, then
//! places switch-on events into the remaining free spots until the on-time
//! budget is spent, sampling how many of its `number` identical units
//! coincide for every event.

use std::ops::Range;

use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::usecase::PeakTimeRange;
use super::{
    duty_cycle_wave, random_variation, uniform_between, Calibration, DayKind, MINUTES_PER_DAY,
};
use crate::error::SizerError;

/// Bounded retries for a switch-on event whose range overlaps none of the
/// declared duty-cycle windows.
const MAX_EVENT_ATTEMPTS: usize = 32;

/// Half-open functioning window in minutes of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "[u32; 2]", into = "[u32; 2]")]
pub struct Window {
    pub start: u32,
    pub end: u32,
}

impl Window {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn width(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Overlap against an inclusive minute range; window boundaries count.
    fn overlaps(&self, lo: i64, hi: i64) -> bool {
        let (w0, w1) = (self.start as i64, self.end as i64);
        !((lo < w0 && hi < w0) || (lo > w1 && hi > w1))
    }
}

impl TryFrom<[u32; 2]> for Window {
    type Error = String;

    fn try_from(v: [u32; 2]) -> Result<Self, Self::Error> {
        if v[0] > v[1] {
            return Err(format!("window start {} is after end {}", v[0], v[1]));
        }
        if v[1] > MINUTES_PER_DAY as u32 {
            return Err(format!("window end {} is past minute 1440", v[1]));
        }
        Ok(Window {
            start: v[0],
            end: v[1],
        })
    }
}

impl From<Window> for [u32; 2] {
    fn from(w: Window) -> Self {
        [w.start, w.end]
    }
}

/// `yes`/`no` flags as they appear in appliance parameter tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toggle {
    Yes,
    #[default]
    No,
}

impl Toggle {
    pub fn is_yes(self) -> bool {
        matches!(self, Toggle::Yes)
    }
}

/// Which days of the week an appliance may run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum WeekPattern {
    WeekdayOnly,
    WeekendOnly,
    AllWeek,
}

impl WeekPattern {
    pub fn allows(self, day: DayKind) -> bool {
        match self {
            WeekPattern::WeekdayOnly => day == DayKind::Weekday,
            WeekPattern::WeekendOnly => day == DayKind::Weekend,
            WeekPattern::AllWeek => true,
        }
    }
}

impl TryFrom<u8> for WeekPattern {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(WeekPattern::WeekdayOnly),
            1 => Ok(WeekPattern::WeekendOnly),
            2 => Ok(WeekPattern::AllWeek),
            other => Err(format!("wd_we_type must be 0, 1 or 2, got {other}")),
        }
    }
}

impl From<WeekPattern> for u8 {
    fn from(p: WeekPattern) -> Self {
        match p {
            WeekPattern::WeekdayOnly => 0,
            WeekPattern::WeekendOnly => 1,
            WeekPattern::AllWeek => 2,
        }
    }
}

/// Rated power: a single average value or a day-indexed series.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PowerInput {
    Constant(f64),
    Series(Vec<f64>),
}

impl Default for PowerInput {
    fn default() -> Self {
        PowerInput::Constant(0.0)
    }
}

impl PowerInput {
    pub fn scale(&mut self, factor: f64) {
        match self {
            PowerInput::Constant(p) => *p *= factor,
            PowerInput::Series(s) => s.iter_mut().for_each(|p| *p *= factor),
        }
    }

    fn mean(&self) -> f64 {
        match self {
            PowerInput::Constant(p) => *p,
            PowerInput::Series(s) if s.is_empty() => 0.0,
            PowerInput::Series(s) => s.iter().sum::<f64>() / s.len() as f64,
        }
    }

    fn for_day(&self, day: usize) -> f64 {
        match self {
            PowerInput::Constant(p) => *p,
            PowerInput::Series(s) => s.get(day).copied().unwrap_or_default(),
        }
    }
}

/// Appliance behavioral parameters as they appear in the catalog.
///
/// Unknown keys are rejected at deserialization time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ApplianceSpec {
    /// How many identical units of this appliance the owner has.
    pub number: u32,
    /// Average rated power in W, optionally day-indexed.
    pub power: PowerInput,
    /// Number of distinct functioning windows (1 to 3).
    pub num_windows: u8,
    /// Target total on-time per day in minutes.
    pub func_time: u32,
    /// Jitter applied to `func_time`, as a fraction.
    pub time_fraction_random_variability: f64,
    /// Minimum uninterrupted on-duration per switch-on, in minutes.
    pub func_cycle: u32,
    /// `yes` switches all `number` units on together.
    pub fixed: Toggle,
    /// Number of declared duty cycles (0 means plain power).
    pub fixed_cycle: u8,
    /// 1 tiles the duty cycle across the whole switch-on event, 0 runs it
    /// once per event.
    pub continuous_duty_cycle: u8,
    /// Bernoulli probability the appliance is used on a given day.
    pub occasional_use: f64,
    /// `yes` fills the randomized windows at constant power, skipping the
    /// stochastic switch-on search.
    pub flat: Toggle,
    /// Jitter on instantaneous power, as a fraction.
    pub thermal_p_var: f64,
    /// Preference gate against the user's daily preference draw (0 = none).
    pub pref_index: u32,
    /// Weekday-only (0), weekend-only (1) or any day (2).
    pub wd_we_type: WeekPattern,
    pub window_1: Option<Window>,
    pub window_2: Option<Window>,
    pub window_3: Option<Window>,
    /// Fractional jitter on window boundaries.
    pub random_var_w: f64,

    // Duty cycle 1
    pub p_11: f64,
    pub t_11: u32,
    pub cw11: Option<Window>,
    pub p_12: f64,
    pub t_12: u32,
    pub cw12: Option<Window>,
    pub r_c1: f64,
    // Duty cycle 2
    pub p_21: f64,
    pub t_21: u32,
    pub cw21: Option<Window>,
    pub p_22: f64,
    pub t_22: u32,
    pub cw22: Option<Window>,
    pub r_c2: f64,
    // Duty cycle 3
    pub p_31: f64,
    pub t_31: u32,
    pub cw31: Option<Window>,
    pub p_32: f64,
    pub t_32: u32,
    pub cw32: Option<Window>,
    pub r_c3: f64,
}

impl Default for ApplianceSpec {
    fn default() -> Self {
        Self {
            number: 1,
            power: PowerInput::default(),
            num_windows: 1,
            func_time: 0,
            time_fraction_random_variability: 0.0,
            func_cycle: 1,
            fixed: Toggle::No,
            fixed_cycle: 0,
            continuous_duty_cycle: 1,
            occasional_use: 1.0,
            flat: Toggle::No,
            thermal_p_var: 0.0,
            pref_index: 0,
            wd_we_type: WeekPattern::AllWeek,
            window_1: None,
            window_2: None,
            window_3: None,
            random_var_w: 0.0,
            p_11: 0.0,
            t_11: 0,
            cw11: None,
            p_12: 0.0,
            t_12: 0,
            cw12: None,
            r_c1: 0.0,
            p_21: 0.0,
            t_21: 0,
            cw21: None,
            p_22: 0.0,
            t_22: 0,
            cw22: None,
            r_c2: 0.0,
            p_31: 0.0,
            t_31: 0,
            cw31: None,
            p_32: 0.0,
            t_32: 0,
            cw32: None,
            r_c3: 0.0,
        }
    }
}

/// A two-phase duty cycle and the windows it is valid in.
#[derive(Debug, Clone)]
struct DutyCycle {
    p1: f64,
    t1: u32,
    p2: f64,
    t2: u32,
    duration_var: f64,
    window_1: Option<Window>,
    window_2: Option<Window>,
}

impl DutyCycle {
    fn matches(&self, lo: i64, hi: i64) -> bool {
        self.window_1.is_some_and(|w| w.overlaps(lo, hi))
            || self.window_2.is_some_and(|w| w.overlaps(lo, hi))
    }
}

/// Validated appliance ready for simulation.
#[derive(Debug, Clone)]
pub struct Appliance {
    pub name: String,
    pub number: u32,
    power: PowerInput,
    pub func_time: u32,
    time_fraction_random_variability: f64,
    pub func_cycle: u32,
    fixed: bool,
    flat: bool,
    continuous_duty_cycle: bool,
    occasional_use: f64,
    thermal_p_var: f64,
    pref_index: u32,
    week_pattern: WeekPattern,
    windows: Vec<Window>,
    window_jitter: Vec<u32>,
    cycles: Vec<DutyCycle>,

    /// Per-minute W written by the latest simulated day.
    pub daily_use: Vec<f64>,
    /// Minute ranges still available for switch-on placement, ascending and
    /// disjoint.
    free_spots: Vec<Range<usize>>,
    random_cycles: Vec<Vec<f64>>,
    current_cycle: Option<usize>,
}

impl Appliance {
    pub fn new(name: impl Into<String>, spec: &ApplianceSpec) -> Result<Self, SizerError> {
        let name = name.into();

        if !(1..=3).contains(&spec.num_windows) {
            return Err(SizerError::invalid_appliance(
                &name,
                format!("num_windows must be 1, 2 or 3, got {}", spec.num_windows),
            ));
        }
        let declared = [spec.window_1, spec.window_2, spec.window_3];
        let mut windows = Vec::with_capacity(spec.num_windows as usize);
        for (k, slot) in declared.iter().take(spec.num_windows as usize).enumerate() {
            match slot {
                Some(w) if !w.is_empty() => windows.push(*w),
                Some(_) => {
                    return Err(SizerError::invalid_appliance(
                        &name,
                        format!("window_{} has zero width", k + 1),
                    ))
                }
                None => {
                    return Err(SizerError::invalid_appliance(
                        &name,
                        format!(
                            "window_{} is not provided although {} windows were declared",
                            k + 1,
                            spec.num_windows
                        ),
                    ))
                }
            }
        }

        if spec.func_cycle == 0 || spec.func_cycle > MINUTES_PER_DAY as u32 {
            return Err(SizerError::invalid_appliance(
                &name,
                format!("func_cycle must be within 1..=1440, got {}", spec.func_cycle),
            ));
        }
        if spec.func_time > MINUTES_PER_DAY as u32 {
            return Err(SizerError::invalid_appliance(
                &name,
                format!("func_time must be at most 1440, got {}", spec.func_time),
            ));
        }
        let total_window_time: u32 = windows.iter().map(Window::width).sum();
        if total_window_time < spec.func_cycle {
            return Err(SizerError::invalid_appliance(
                &name,
                format!(
                    "windows cover {total_window_time} minutes, less than func_cycle {}",
                    spec.func_cycle
                ),
            ));
        }

        for (label, value) in [
            ("occasional_use", spec.occasional_use),
            (
                "time_fraction_random_variability",
                spec.time_fraction_random_variability,
            ),
            ("random_var_w", spec.random_var_w),
            ("thermal_p_var", spec.thermal_p_var),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SizerError::invalid_appliance(
                    &name,
                    format!("{label} must be within [0, 1], got {value}"),
                ));
            }
        }
        if spec.pref_index > 3 {
            return Err(SizerError::invalid_appliance(
                &name,
                format!("pref_index must be at most 3, got {}", spec.pref_index),
            ));
        }
        if spec.fixed_cycle > 3 {
            return Err(SizerError::invalid_appliance(
                &name,
                format!("fixed_cycle must be at most 3, got {}", spec.fixed_cycle),
            ));
        }

        let mut cycles = Vec::with_capacity(spec.fixed_cycle as usize);
        let cycle_params = [
            (
                spec.p_11, spec.t_11, spec.p_12, spec.t_12, spec.r_c1, spec.cw11, spec.cw12,
            ),
            (
                spec.p_21, spec.t_21, spec.p_22, spec.t_22, spec.r_c2, spec.cw21, spec.cw22,
            ),
            (
                spec.p_31, spec.t_31, spec.p_32, spec.t_32, spec.r_c3, spec.cw31, spec.cw32,
            ),
        ];
        for (p1, t1, p2, t2, duration_var, cw1, cw2) in
            cycle_params.into_iter().take(spec.fixed_cycle as usize)
        {
            cycles.push(DutyCycle {
                p1,
                t1,
                p2,
                t2,
                duration_var,
                window_1: cw1,
                window_2: cw2,
            });
        }
        // A single declared cycle defaults its windows to the functioning
        // windows so any event can match it.
        if spec.fixed_cycle == 1 {
            let cycle = &mut cycles[0];
            if cycle.window_1.is_none() {
                cycle.window_1 = Some(windows[0]);
            }
            if cycle.window_2.is_none() {
                cycle.window_2 = windows.get(1).copied();
            }
        }

        let window_jitter = windows
            .iter()
            .map(|w| (spec.random_var_w * w.width() as f64) as u32)
            .collect();

        Ok(Self {
            name,
            number: spec.number.max(1),
            power: spec.power.clone(),
            func_time: spec.func_time,
            time_fraction_random_variability: spec.time_fraction_random_variability,
            func_cycle: spec.func_cycle,
            fixed: spec.fixed.is_yes(),
            flat: spec.flat.is_yes(),
            continuous_duty_cycle: spec.continuous_duty_cycle != 0,
            occasional_use: spec.occasional_use,
            thermal_p_var: spec.thermal_p_var,
            pref_index: spec.pref_index,
            week_pattern: spec.wd_we_type,
            windows,
            window_jitter,
            cycles,
            daily_use: vec![0.0; MINUTES_PER_DAY],
            free_spots: Vec::new(),
            random_cycles: Vec::new(),
            current_cycle: None,
        })
    }

    /// A day-indexed power series must cover the whole horizon.
    pub fn check_power_series(&self, num_days: usize) -> Result<(), SizerError> {
        if let PowerInput::Series(series) = &self.power {
            if series.len() < num_days {
                return Err(SizerError::invalid_appliance(
                    &self.name,
                    format!(
                        "power series has {} values, fewer than the {num_days} simulated days",
                        series.len()
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Theoretical maximum profile: all `number` units on at mean power
    /// across every declared window.
    pub fn maximum_profile(&self) -> Vec<f64> {
        let mut profile = vec![0.0; MINUTES_PER_DAY];
        let level = self.power.mean() * self.number as f64;
        for w in &self.windows {
            for m in w.start..w.end {
                profile[m as usize] = level;
            }
        }
        profile
    }

    /// Generate the day's profile into `daily_use`.
    ///
    /// Returns `InsufficientWindow` when the randomized on-time cannot fit
    /// the minimum cycle; callers skip the appliance for that day.
    pub fn generate_load_profile(
        &mut self,
        day: usize,
        peak: &PeakTimeRange,
        day_kind: DayKind,
        rand_daily_pref: u32,
        calib: &Calibration,
        rng: &mut StdRng,
    ) -> Result<(), SizerError> {
        self.daily_use = vec![0.0; MINUTES_PER_DAY];
        self.free_spots.clear();
        self.current_cycle = None;

        // The use gate consumes its uniform before any other check.
        let gate: f64 = rng.gen();
        if gate > self.occasional_use
            || (self.pref_index != 0 && rand_daily_pref != self.pref_index)
            || !self.week_pattern.allows(day_kind)
            || self.func_time == 0
        {
            return Ok(());
        }

        let power = self.power.for_day(day);
        let rand_windows = self.randomized_windows(rng);
        let rand_time = self.randomized_on_time(day, &rand_windows, rng)?;

        if self.flat {
            let level = power * self.number as f64;
            for w in &rand_windows {
                for m in w.start..w.end {
                    self.daily_use[m as usize] = level;
                }
            }
            return Ok(());
        }

        self.assign_random_cycles(rng);
        self.free_spots = rand_windows
            .iter()
            .filter(|w| !w.is_empty())
            .map(|w| w.start as usize..w.end as usize)
            .collect();

        let mut tot_time: u32 = 0;
        while tot_time <= rand_time {
            let Some(event) = self.draw_event(rand_time, rng) else {
                break;
            };
            tot_time += event.len() as u32;

            if tot_time > rand_time {
                // On-time budget reached: truncate the final event and stop.
                let keep = event.len() - (tot_time - rand_time) as usize;
                if keep > 0 {
                    let event = event.start..event.start + keep;
                    let coincidence = self.coincident_switch_on(
                        peak.overlaps_minutes(event.start, event.end - 1),
                        calib,
                        rng,
                    );
                    self.apply_event(coincidence, power, &event, rng);
                }
                break;
            }

            let coincidence = self.coincident_switch_on(
                peak.overlaps_minutes(event.start, event.end - 1),
                calib,
                rng,
            );
            self.apply_event(coincidence, power, &event, rng);
        }
        Ok(())
    }

    /// Jitter each window's endpoints independently, clipped to the day.
    fn randomized_windows(&self, rng: &mut StdRng) -> Vec<Window> {
        self.windows
            .iter()
            .zip(&self.window_jitter)
            .map(|(w, &jitter)| {
                let jitter = jitter as i64;
                let start = rng
                    .gen_range(w.start as i64 - jitter..=w.start as i64 + jitter)
                    .clamp(0, MINUTES_PER_DAY as i64);
                let end = rng
                    .gen_range(w.end as i64 - jitter..=w.end as i64 + jitter)
                    .clamp(start, MINUTES_PER_DAY as i64);
                Window::new(start as u32, end as u32)
            })
            .collect()
    }

    /// Randomized total on-time, floored at `func_cycle` and capped by the
    /// randomized windows.
    fn randomized_on_time(
        &self,
        day: usize,
        windows: &[Window],
        rng: &mut StdRng,
    ) -> Result<u32, SizerError> {
        let multiplier = random_variation(rng, self.time_fraction_random_variability, 1.0);
        let jittered = (self.func_time as f64 * multiplier) as u32;
        let mut rand_time =
            uniform_between(rng, self.func_time as f64, jittered as f64).round() as u32;

        if rand_time < self.func_cycle {
            rand_time = self.func_cycle;
        }
        let total_time: u32 = windows.iter().map(Window::width).sum();
        if rand_time as f64 > 0.99 * total_time as f64 {
            rand_time = (0.99 * total_time as f64) as u32;
        }
        if rand_time < self.func_cycle {
            return Err(SizerError::InsufficientWindow {
                name: self.name.clone(),
                day,
            });
        }
        Ok(rand_time)
    }

    /// Pre-draw the jittered duty-cycle waveforms for the day. With three
    /// declared cycles each waveform may have its halves swapped.
    fn assign_random_cycles(&mut self, rng: &mut StdRng) {
        let swap_halves = self.cycles.len() >= 3;
        let thermal = self.thermal_p_var;
        let mut waves = Vec::with_capacity(self.cycles.len());
        for cycle in &self.cycles {
            let p1 = random_variation(rng, thermal, cycle.p1);
            let p2 = random_variation(rng, thermal, cycle.p2);
            let reversed = swap_halves && rng.gen_bool(0.5);
            let wave = if reversed {
                duty_cycle_wave(rng, cycle.duration_var, cycle.t2, p2, cycle.t1, p1)
            } else {
                duty_cycle_wave(rng, cycle.duration_var, cycle.t1, p1, cycle.t2, p2)
            };
            waves.push(wave);
        }
        self.random_cycles = waves;
    }

    /// Draw one switch-on event from the free spots.
    ///
    /// Returns `None` once no spot can hold `func_cycle` minutes, or when a
    /// duty-cycle appliance exhausts its redraw budget.
    fn draw_event(&mut self, rand_time: u32, rng: &mut StdRng) -> Option<Range<usize>> {
        let func_cycle = self.func_cycle as usize;
        for _ in 0..MAX_EVENT_ATTEMPTS {
            // Candidate switch-on minutes leave at least func_cycle before
            // their spot's end.
            let mut candidates: Vec<(usize, usize)> = Vec::new();
            for (spot_idx, spot) in self.free_spots.iter().enumerate() {
                if spot.len() >= func_cycle {
                    candidates.extend((spot.start..=spot.end - func_cycle).map(|m| (m, spot_idx)));
                }
            }
            if candidates.is_empty() {
                return None;
            }

            let (switch_on, spot_idx) = candidates[rng.gen_range(0..candidates.len())];
            let spot_end = self.free_spots[spot_idx].end;
            let upper = (rand_time as usize).min(spot_end - switch_on);
            let duration = if upper > func_cycle {
                uniform_between(rng, func_cycle as f64, upper as f64) as usize
            } else if upper == func_cycle {
                func_cycle
            } else {
                warn!(
                    appliance = %self.name,
                    "switch-on upper bound fell below func_cycle, ending day"
                );
                return None;
            };
            let mut event = switch_on..switch_on + duration;

            if self.cycles.is_empty() {
                return Some(event);
            }
            let (lo, hi) = (event.start as i64, event.end as i64 - 1);
            if let Some(idx) = self.cycles.iter().position(|c| c.matches(lo, hi)) {
                self.current_cycle = Some(idx);
                let cycle_len = self.random_cycles[idx].len();
                if !self.continuous_duty_cycle && cycle_len > 0 && event.len() > cycle_len {
                    // One cycle per event: shrink the event to the cycle.
                    event = event.start..event.start + cycle_len;
                }
                return Some(event);
            }
            // No duty-cycle window overlaps this event; redraw rather than
            // defaulting to an arbitrary cycle.
        }
        warn!(
            appliance = %self.name,
            attempts = MAX_EVENT_ATTEMPTS,
            "no switch-on event overlapped a duty-cycle window, ending day"
        );
        None
    }

    /// How many of the `number` units switch on together for one event.
    fn coincident_switch_on(
        &self,
        inside_peak: bool,
        calib: &Calibration,
        rng: &mut StdRng,
    ) -> u32 {
        if self.fixed {
            return self.number;
        }
        let n = self.number as f64;
        if inside_peak {
            let mu = n * calib.mu_peak;
            let sigma = (calib.s_peak * mu).abs();
            let draw = Normal::new(mu, sigma).unwrap().sample(rng);
            draw.ceil().max(1.0).min(n) as u32
        } else {
            let prob = uniform_between(rng, 0.0, ((n - calib.op_factor) / n).max(0.0));
            let mut on = 1;
            for i in 1..self.number {
                if i as f64 / n <= prob {
                    on = i + 1;
                }
            }
            on
        }
    }

    /// Write the event into `daily_use` and retire its range.
    fn apply_event(&mut self, coincidence: u32, power: f64, event: &Range<usize>, rng: &mut StdRng) {
        if self.cycles.is_empty() {
            let value = random_variation(rng, self.thermal_p_var, coincidence as f64 * power);
            for m in event.clone() {
                self.daily_use[m] = value;
            }
        } else if let Some(idx) = self.current_cycle {
            let wave = &self.random_cycles[idx];
            if !wave.is_empty() {
                for (k, m) in event.clone().enumerate() {
                    self.daily_use[m] = wave[k % wave.len()] * coincidence as f64;
                }
            }
        }
        self.occupy(event);
    }

    /// Remove the event's range from the free spots, splitting its
    /// containing spot into up to two remainders.
    fn occupy(&mut self, event: &Range<usize>) {
        let Some(idx) = self
            .free_spots
            .iter()
            .position(|s| event.start >= s.start && event.end <= s.end)
        else {
            return;
        };
        let spot = self.free_spots.remove(idx);
        let mut insert_at = idx;
        if spot.start < event.start {
            self.free_spots.insert(insert_at, spot.start..event.start);
            insert_at += 1;
        }
        if event.end < spot.end {
            self.free_spots.insert(insert_at, event.end..spot.end);
        }
    }

    #[cfg(test)]
    fn free_spots(&self) -> &[Range<usize>] {
        &self.free_spots
    }
}
