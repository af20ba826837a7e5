//! River-flow lookup: pick the gauging station nearest the settlement and
//! read its normalized daily flow for the comparable dates of the horizon.

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use super::dates::{comparable_date, date_range};
use crate::error::SizerError;

/// Hours each daily flow value is repeated across.
const HOURS_PER_DAY: usize = 24;

/// Irrawaddy-basin gauging stations with daily-normalized flow records.
pub static RIVER_STATIONS: &[RiverStation] = &[
    RiverStation { number: "2260100", name: "HKAMTI", latitude: 26.0, longitude: 95.7 },
    RiverStation { number: "2260110", name: "MAWLAIK", latitude: 23.63, longitude: 94.42 },
    RiverStation { number: "2260120", name: "MONYWA", latitude: 22.1, longitude: 95.13 },
    RiverStation { number: "2260400", name: "KATHA", latitude: 24.17, longitude: 96.33 },
    RiverStation { number: "2260500", name: "SAGAING", latitude: 21.98, longitude: 96.1 },
    RiverStation { number: "2260600", name: "MAGWAY", latitude: 20.13, longitude: 94.92 },
    RiverStation { number: "2260700", name: "PYAY", latitude: 18.8, longitude: 95.22 },
];

#[derive(Debug, Clone, Copy)]
pub struct RiverStation {
    pub number: &'static str,
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

/// One day of normalized flow at one station.
#[derive(Debug, Clone, Deserialize)]
pub struct FlowRecord {
    #[serde(rename = "Station_Number")]
    pub station_number: String,
    pub date: NaiveDate,
    pub norm: f64,
}

/// Great-circle distance in kilometers.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// The station closest to a location.
pub fn nearest_station(lat: f64, lon: f64) -> &'static RiverStation {
    let mut closest = &RIVER_STATIONS[0];
    let mut min_distance = haversine_km(lat, lon, closest.latitude, closest.longitude);
    for station in &RIVER_STATIONS[1..] {
        let distance = haversine_km(lat, lon, station.latitude, station.longitude);
        if distance < min_distance {
            closest = station;
            min_distance = distance;
        }
    }
    closest
}

/// Normalized-flow table, loaded from a JSON file of [`FlowRecord`]s.
#[derive(Debug, Clone)]
pub struct HydroIndex {
    records: Vec<FlowRecord>,
}

impl HydroIndex {
    pub fn new(records: Vec<FlowRecord>) -> Self {
        Self { records }
    }

    pub fn from_json_file(path: &std::path::Path) -> Result<Self, SizerError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SizerError::Config(format!("cannot read flow table {path:?}: {e}")))?;
        let records: Vec<FlowRecord> = serde_json::from_str(&raw)
            .map_err(|e| SizerError::Config(format!("malformed flow table {path:?}: {e}")))?;
        Ok(Self::new(records))
    }

    /// Hourly normalized flow at the nearest station: each day's value for
    /// the comparable date, repeated across its 24 hours.
    pub fn unit_hydro(
        &self,
        lat: f64,
        lon: f64,
        start_date: NaiveDate,
        num_days: usize,
    ) -> Result<Vec<f64>, SizerError> {
        let station = nearest_station(lat, lon);
        debug!(station = station.name, "nearest river station");

        let mut hourly = Vec::with_capacity(num_days * HOURS_PER_DAY);
        for date in date_range(start_date, num_days) {
            let analog = comparable_date(date);
            let norm = self
                .records
                .iter()
                .find(|r| r.station_number == station.number && r.date == analog)
                .map(|r| r.norm)
                .ok_or_else(|| {
                    SizerError::MissingData(format!(
                        "flow at station {} for comparable date {analog}",
                        station.name
                    ))
                })?;
            hourly.extend(std::iter::repeat(norm).take(HOURS_PER_DAY));
        }
        Ok(hourly)
    }
}
