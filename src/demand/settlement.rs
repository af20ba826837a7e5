//! Settlement demand synthesis: sample which appliances each household
//! owns, simulate every day at minute resolution and integrate to hourly
//! kWh.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, info};

use super::appliance::Appliance;
use super::catalog::Catalog;
use super::user::User;
use super::usecase::UseCase;
use super::{Calibration, MINUTES_PER_DAY};
use crate::error::SizerError;
use crate::services::dates::{comparable_date, date_range};

pub const HOURS_PER_DAY: usize = 24;

/// Build the settlement's hourly demand in kWh over the horizon.
///
/// Household appliance ownership is Bernoulli-sampled once from the
/// occurrence table; each day is then simulated by a fresh single-day use
/// case so seasonal appliances can take that day's cooling index. The
/// cooling map is keyed by the comparable date one year (52 weeks) earlier.
pub fn build_settlement_demand(
    catalog: &Catalog,
    num_households: u32,
    date_start: NaiveDate,
    num_days: usize,
    cooling: &BTreeMap<NaiveDate, f64>,
    calib: &Calibration,
    rng: &mut StdRng,
) -> Result<Vec<f64>, SizerError> {
    let mut owned: Vec<Vec<&str>> = Vec::with_capacity(num_households as usize);
    for _ in 0..num_households {
        let mut names = Vec::new();
        for (name, &rate) in &catalog.occurrence {
            if rng.gen::<f64>() < rate {
                names.push(name.as_str());
            }
        }
        owned.push(names);
    }
    info!(
        households = num_households,
        num_days, "sampled appliance ownership"
    );

    let mut hourly = Vec::with_capacity(num_days * HOURS_PER_DAY);
    for date in date_range(date_start, num_days) {
        let analog = comparable_date(date);
        let cooling_index = *cooling.get(&analog).ok_or_else(|| {
            SizerError::MissingData(format!("cooling demand for comparable date {analog}"))
        })?;

        let mut households = Vec::with_capacity(owned.len());
        for (idx, names) in owned.iter().enumerate() {
            let mut household = User::new(format!("household #{idx}"), 1);
            for name in names {
                let seasonal = catalog.is_seasonal(name);
                for alias in catalog.expand(name) {
                    let mut spec = catalog.spec(alias)?.clone();
                    if seasonal {
                        spec.power.scale(cooling_index.min(1.0));
                    }
                    household.add_appliance(Appliance::new(*name, &spec)?);
                }
            }
            households.push(household);
        }

        let mut settlement = UseCase::new("settlement", households, date, 1, calib.peak_enlarge);
        let minute_profile = settlement.generate_daily_load_profiles(calib, rng)?;
        hourly.extend(integrate_to_hourly_kwh(&minute_profile));
        debug!(%date, cooling_index, "settlement day simulated");
    }
    Ok(hourly)
}

/// Average each 60-minute block of a W profile and convert to kWh.
fn integrate_to_hourly_kwh(minute_profile: &[f64]) -> Vec<f64> {
    minute_profile
        .chunks(MINUTES_PER_DAY / HOURS_PER_DAY)
        .map(|block| block.iter().sum::<f64>() / block.len() as f64 / 1000.0)
        .collect()
}
