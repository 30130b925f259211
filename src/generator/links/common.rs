use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::ProxyRecord;
use crate::utils::url::query_escape;

static LEADING_FLAG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\x{1F1E6}-\x{1F1FF}]+").unwrap());

/// Removes a leading regional-indicator flag and surrounding whitespace.
pub fn strip_flag_emoji(name: &str) -> String {
    LEADING_FLAG_REGEX.replace(name, "").trim().to_string()
}

/// Display name ready to be used as a link fragment.
pub fn escaped_remark(node: &ProxyRecord) -> String {
    query_escape(&strip_flag_emoji(&node.name))
}

/// True when the node carries an address, a port and the given credential.
pub fn has_endpoint(node: &ProxyRecord, credential: &str) -> bool {
    !node.server.is_empty() && !node.port.is_empty() && !credential.is_empty()
}

/// First non-empty value among `candidates`.
pub fn first_non_empty<'a>(candidates: &[&'a str]) -> &'a str {
    candidates
        .iter()
        .copied()
        .find(|value| !value.is_empty())
        .unwrap_or("")
}

/// Query parameters, encoded in key order.
#[derive(Debug, Default)]
pub struct QueryParams {
    params: BTreeMap<&'static str, String>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &'static str, value: impl Into<String>) {
        self.params.insert(key, value.into());
    }

    /// Sets `key` only when `value` is non-empty.
    pub fn set_non_empty(&mut self, key: &'static str, value: &str) {
        if !value.is_empty() {
            self.set(key, value);
        }
    }

    pub fn encode(&self) -> String {
        self.params
            .iter()
            .map(|(key, value)| format!("{}={}", query_escape(key), query_escape(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}
