//! Core data models
//!
//! Proxy records, check results, country lookup and the statistics/template
//! inputs derived from a node document.

mod country;
mod proxy;
mod stats;

pub use country::{CountryInfo, CountryTable, DEFAULT_COUNTRIES};
pub use proxy::{flag_code, CheckResult, ProxyRecord, ProxyType};
pub use stats::{ConfigData, StatsData};
