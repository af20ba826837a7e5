//! Appliance catalog: behavior parameters keyed by name, household
//! occurrence rates, alias expansion and seasonality flags.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::Deserialize;

use super::appliance::ApplianceSpec;
use crate::error::SizerError;

/// The built-in rural-settlement catalog.
static CATALOG: Lazy<Catalog> = Lazy::new(|| {
    toml::from_str(include_str!("catalog.toml")).expect("embedded appliance catalog is valid")
});

pub fn default_catalog() -> &'static Catalog {
    &CATALOG
}

/// Appliance parameter tables for one settlement type.
///
/// Ordered maps keep the Bernoulli household sampling deterministic under a
/// seeded generator.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Catalog {
    /// Appliances whose power scales with the daily cooling demand index.
    #[serde(default)]
    pub seasonal: Vec<String>,
    /// Probability that a household owns each appliance.
    pub occurrence: BTreeMap<String, f64>,
    /// Names that expand to several underlying appliance definitions, such
    /// as weekday/weekend variants.
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,
    pub appliances: BTreeMap<String, ApplianceSpec>,
}

impl Catalog {
    pub fn parse(toml_source: &str) -> Result<Self, SizerError> {
        toml::from_str(toml_source).map_err(|e| SizerError::Config(e.to_string()))
    }

    pub fn spec(&self, name: &str) -> Result<&ApplianceSpec, SizerError> {
        self.appliances
            .get(name)
            .ok_or_else(|| SizerError::MissingData(format!("appliance definition '{name}'")))
    }

    /// Underlying definition names for an owned appliance.
    pub fn expand<'a>(&'a self, name: &'a str) -> Vec<&'a str> {
        match self.aliases.get(name) {
            Some(aliases) => aliases.iter().map(String::as_str).collect(),
            None => vec![name],
        }
    }

    pub fn is_seasonal(&self, name: &str) -> bool {
        self.seasonal.iter().any(|s| s == name)
    }
}
