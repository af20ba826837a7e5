use thiserror::Error;

/// Error kinds surfaced by the sizing pipeline
#[derive(Debug, Error)]
pub enum SizerError {
    /// The appliance parameters cannot produce a valid daily profile.
    /// Raised at construction time, before any simulation runs.
    #[error("invalid appliance '{name}': {reason}")]
    InvalidAppliance { name: String, reason: String },

    /// The randomized on-time for one day cannot fit the appliance's
    /// minimum cycle. The appliance is skipped for that day.
    #[error("appliance '{name}' cannot fit func_cycle into its windows on day {day}")]
    InsufficientWindow { name: String, day: usize },

    /// The PV/cooling service returned a non-success status or the
    /// transport failed. Fatal at the boundary; no retries.
    #[error("external data fetch failed: {0}")]
    ExternalFetch(String),

    /// A fetched series or the hydro table is missing an expected entry.
    #[error("missing data: {0}")]
    MissingData(String),

    /// Configuration could not be loaded or failed validation.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for SizerError {
    fn from(err: reqwest::Error) -> Self {
        SizerError::ExternalFetch(err.to_string())
    }
}

impl SizerError {
    pub(crate) fn invalid_appliance(name: &str, reason: impl Into<String>) -> Self {
        SizerError::InvalidAppliance {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
