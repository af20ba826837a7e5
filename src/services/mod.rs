//! External data adapters: the renewables service client, the river-flow
//! table and shared date arithmetic. Everything here completes before the
//! simulation core runs.

pub mod dates;
pub mod hydro;
pub mod renewables;

pub use hydro::HydroIndex;
pub use renewables::{RenewablesClient, RenewablesProvider, ServicesConfig};
