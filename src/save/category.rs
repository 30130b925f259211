//! Named, rule-selected subsets of checked nodes

use log::warn;
use regex::Regex;
use serde::Deserialize;

use crate::models::{CheckResult, ProxyRecord, ProxyType};

/// Which results belong to a category
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CategoryRule {
    MatchAll,
    /// Protocol tags; `ss`/`shadowsocks` and `hy2`/`hysteria2` are interchangeable
    MatchProtocol(Vec<String>),
    /// Two-letter codes parsed from the `🇺🇸US` name prefix
    MatchCountry(Vec<String>),
    /// A tag attached to the check result
    MatchTag(String),
    /// Regular expression over the display name
    MatchName(String),
}

/// A category as written in `config.yaml`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryConfig {
    /// File name the category is saved under
    pub name: String,
    /// `match-all`, or a single-key map such as `match-tag: openai`
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub rule: CategoryRule,
}

#[derive(Debug, Clone)]
pub struct ProxyCategory {
    pub name: String,
    pub rule: CategoryRule,
    name_regex: Option<Regex>,
    pub proxies: Vec<ProxyRecord>,
}

impl ProxyCategory {
    pub fn new(name: impl Into<String>, rule: CategoryRule) -> Self {
        let name = name.into();
        let name_regex = match &rule {
            CategoryRule::MatchName(pattern) => match Regex::new(pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!("Category {} has an invalid name pattern: {}", name, e);
                    None
                }
            },
            _ => None,
        };

        ProxyCategory {
            name,
            rule,
            name_regex,
            proxies: Vec::new(),
        }
    }

    pub fn matches(&self, result: &CheckResult) -> bool {
        let proxy = &result.proxy;
        match &self.rule {
            CategoryRule::MatchAll => true,
            CategoryRule::MatchProtocol(tags) => tags.iter().any(|tag| same_protocol(tag, &proxy.type_tag)),
            CategoryRule::MatchCountry(codes) => proxy
                .flag_code()
                .is_some_and(|code| codes.iter().any(|c| c.eq_ignore_ascii_case(&code))),
            CategoryRule::MatchTag(tag) => result.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)),
            CategoryRule::MatchName(_) => self
                .name_regex
                .as_ref()
                .is_some_and(|re| re.is_match(&proxy.name)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }
}

impl From<&CategoryConfig> for ProxyCategory {
    fn from(config: &CategoryConfig) -> Self {
        ProxyCategory::new(config.name.clone(), config.rule.clone())
    }
}

fn same_protocol(wanted: &str, actual: &str) -> bool {
    if wanted.eq_ignore_ascii_case(actual) {
        return true;
    }
    let wanted = ProxyType::from_tag(&wanted.to_ascii_lowercase());
    wanted != ProxyType::Unknown && wanted == ProxyType::from_tag(&actual.to_ascii_lowercase())
}

/// Append every result's proxy to each category it matches
///
/// Membership is not exclusive; results are copied, never modified.
pub fn categorize(results: &[CheckResult], categories: &mut [ProxyCategory]) {
    for result in results {
        for category in categories.iter_mut() {
            if category.matches(result) {
                category.proxies.push(result.proxy.clone());
            }
        }
    }
}
