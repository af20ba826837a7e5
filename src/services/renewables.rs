//! Renewables data service client: hourly PV output per unit capacity and
//! per-day heating/cooling demand indices for a location.
//!
//! The service itself is an external collaborator; this adapter only
//! shapes requests and filters responses. Failures are fatal at this
//! boundary and never retried here.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::Validate;

use crate::error::SizerError;

/// Environment variable holding the API token when the config omits it.
pub const TOKEN_ENV_VAR: &str = "RENEWABLES_NINJA_API_TOKEN";

/// Connection settings for the renewables data service.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServicesConfig {
    #[validate(length(min = 1))]
    pub base_url: String,
    /// API token; falls back to `RENEWABLES_NINJA_API_TOKEN`.
    #[serde(default)]
    pub token: Option<String>,
    #[validate(range(min = 1))]
    pub timeout_secs: u64,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.renewables.ninja/api/data".to_string(),
            token: None,
            timeout_secs: 30,
        }
    }
}

/// Seam for the two data series the pipeline needs before the core runs.
#[async_trait]
pub trait RenewablesProvider: Send + Sync {
    /// Hourly PV output per kW installed, for every hour whose local date
    /// lies in `[start, end]`.
    async fn pv_unit_output(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        lat: f64,
        lon: f64,
    ) -> Result<Vec<f64>, SizerError>;

    /// Per-day cooling demand index over `[start, end]`.
    async fn cooling_index(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        lat: f64,
        lon: f64,
    ) -> Result<BTreeMap<NaiveDate, f64>, SizerError>;
}

pub struct RenewablesClient {
    client: Client,
    base_url: String,
    token: String,
}

impl RenewablesClient {
    pub fn new(cfg: &ServicesConfig) -> Result<Self, SizerError> {
        let token = cfg
            .token
            .clone()
            .or_else(|| std::env::var(TOKEN_ENV_VAR).ok())
            .ok_or_else(|| {
                SizerError::Config(format!(
                    "no renewables API token configured and {TOKEN_ENV_VAR} is unset"
                ))
            })?;
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(cfg.timeout_secs))
                .build()
                .unwrap_or_default(),
            base_url: cfg.base_url.clone(),
            token,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, SizerError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(%url, "fetching renewables data");
        let response = self
            .client
            .get(&url)
            .query(params)
            .header("Authorization", format!("Token {}", self.token))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SizerError::ExternalFetch(format!(
                "{endpoint} request returned {status}"
            )));
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl RenewablesProvider for RenewablesClient {
    async fn pv_unit_output(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        lat: f64,
        lon: f64,
    ) -> Result<Vec<f64>, SizerError> {
        // Fetch one day of padding on each side: the service works in UTC
        // while rows carry local time, so boundary hours arrive in the
        // neighboring day's response.
        let date_from = start - chrono::Duration::days(1);
        let date_to = end + chrono::Duration::days(1);
        let params = [
            ("local_time", "true".to_string()),
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("date_from", date_from.format("%Y-%m-%d").to_string()),
            ("date_to", date_to.format("%Y-%m-%d").to_string()),
            ("dataset", "merra2".to_string()),
            ("capacity", "1".to_string()),
            ("system_loss", "0.1".to_string()),
            ("tracking", "0".to_string()),
            ("tilt", "35".to_string()),
            ("azim", "180".to_string()),
            ("format", "json".to_string()),
        ];
        let body: PvResponse = self.get_json("pv", &params).await?;

        let mut rows: Vec<(String, f64)> = body
            .data
            .into_values()
            .filter(|row| {
                local_date(&row.local_time)
                    .map(|d| (start..=end).contains(&d))
                    .unwrap_or(false)
            })
            .map(|row| (row.local_time, row.electricity))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(rows.into_iter().map(|(_, e)| e).collect())
    }

    async fn cooling_index(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        lat: f64,
        lon: f64,
    ) -> Result<BTreeMap<NaiveDate, f64>, SizerError> {
        let params = [
            ("local_time", "true".to_string()),
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("date_from", start.format("%Y-%m-%d").to_string()),
            ("date_to", end.format("%Y-%m-%d").to_string()),
            ("dataset", "merra2".to_string()),
            ("heating_threshold", "14".to_string()),
            ("cooling_threshold", "20".to_string()),
            ("base_power", "0".to_string()),
            ("heating_power", "0.3".to_string()),
            ("cooling_power", "0.15".to_string()),
            ("smoothing", "0.5".to_string()),
            ("solar_gains", "0.012".to_string()),
            ("wind_chill", "-0.2".to_string()),
            ("humidity_discomfort", "0.05".to_string()),
            ("use_diurnal_profile", "true".to_string()),
            ("format", "json".to_string()),
            ("mean", "day".to_string()),
        ];
        let body: DemandResponse = self.get_json("demand", &params).await?;

        let mut index = BTreeMap::new();
        for (key, row) in body.data {
            if let Some(date) = local_date(&key) {
                index.insert(date, row.cooling_demand);
            }
        }
        Ok(index)
    }
}

/// Date part of a `YYYY-MM-DD[ HH:MM]` local timestamp.
fn local_date(timestamp: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(timestamp.get(..10)?, "%Y-%m-%d").ok()
}

#[derive(Debug, Deserialize)]
struct PvResponse {
    data: BTreeMap<String, PvRow>,
}

#[derive(Debug, Deserialize)]
struct PvRow {
    local_time: String,
    electricity: f64,
}

#[derive(Debug, Deserialize)]
struct DemandResponse {
    data: BTreeMap<String, DemandRow>,
}

#[derive(Debug, Deserialize)]
struct DemandRow {
    cooling_demand: f64,
}
