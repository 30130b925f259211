use std::collections::HashMap;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

/// Built-in country table, used when no external `countries.json` can be read
pub const DEFAULT_COUNTRIES: &str = include_str!("../../base/countries.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryInfo {
    pub code: String,
    pub flag: String,
    /// Localized display name
    #[serde(rename = "cn-name")]
    pub cn_name: String,
    #[serde(rename = "en-name")]
    pub en_name: String,
}

/// Country lookup keyed by two-letter code
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountryTable {
    countries: HashMap<String, CountryInfo>,
}

impl CountryTable {
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        let list: Vec<CountryInfo> = serde_json::from_str(content)?;
        Ok(list.into_iter().collect())
    }

    pub fn builtin() -> Result<Self, serde_json::Error> {
        Self::from_json(DEFAULT_COUNTRIES)
    }

    /// Loads the table from `path`, falling back to the built-in table when
    /// the file cannot be read. A file that is present but malformed is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, serde_json::Error> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_json(&content),
            Err(e) => {
                warn!(
                    "Failed to read {}: {}, using built-in country table",
                    path.display(),
                    e
                );
                Self::builtin()
            }
        }
    }

    pub fn get(&self, code: &str) -> Option<&CountryInfo> {
        self.countries.get(code)
    }
}

impl FromIterator<CountryInfo> for CountryTable {
    fn from_iter<I: IntoIterator<Item = CountryInfo>>(iter: I) -> Self {
        CountryTable {
            countries: iter
                .into_iter()
                .map(|country| (country.code.clone(), country))
                .collect(),
        }
    }
}
