//! Proxy model definitions
//!
//! Contains the validated proxy record built from a raw node mapping, and the
//! result of a health check that wraps it.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::utils::fields::{
    get_bool, get_int, get_nested_string, get_port, get_string, get_string_list,
};

/// Two leading regional-indicator symbols followed by a two-letter code, e.g. `🇺🇸US`.
static FLAG_CODE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([\x{1F1E6}-\x{1F1FF}]{2})([A-Z]{2})").unwrap());

/// Represents the type of a proxy.
/// Only the protocols that have a shareable link form are distinguished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyType {
    Unknown,
    Shadowsocks,
    VMess,
    Vless,
    Trojan,
    Hysteria2,
}

impl ProxyType {
    /// Maps the `type` tag of a node onto a protocol.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "ss" | "shadowsocks" => ProxyType::Shadowsocks,
            "vmess" => ProxyType::VMess,
            "vless" => ProxyType::Vless,
            "trojan" => ProxyType::Trojan,
            "hysteria2" | "hy2" => ProxyType::Hysteria2,
            _ => ProxyType::Unknown,
        }
    }
}

/// A single proxy node.
///
/// The well-known fields are extracted leniently at construction; the raw
/// mapping is kept untouched so the node serializes back exactly as it came
/// in, including keys this crate does not model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Mapping", into = "Mapping")]
pub struct ProxyRecord {
    pub name: String,
    /// Raw `type` tag as written in the node
    pub type_tag: String,
    pub server: String,
    /// Port as text; empty when absent
    pub port: String,
    pub uuid: String,
    pub password: String,
    pub cipher: String,
    pub network: String,
    /// String form of `tls`; empty when the field is a boolean
    pub tls: String,
    /// Whether `tls` is enabled, from either a boolean or `true`/`tls` text
    pub tls_enabled: bool,
    pub servername: String,
    pub sni: String,
    pub client_fingerprint: String,
    pub alpn: Vec<String>,
    pub skip_cert_verify: bool,
    pub alter_id: i64,
    pub flow: String,
    pub obfs: String,
    pub obfs_password: String,
    pub ws_path: String,
    pub ws_host: String,
    raw: Mapping,
}

impl ProxyRecord {
    pub fn proxy_type(&self) -> ProxyType {
        ProxyType::from_tag(&self.type_tag)
    }

    /// Two-letter country code parsed from a leading `🇺🇸US`-style prefix.
    pub fn flag_code(&self) -> Option<String> {
        flag_code(&self.name)
    }

    /// Looks up a field that has no dedicated slot on the record.
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.raw.get(Value::String(key.to_string()))
    }

    pub fn raw(&self) -> &Mapping {
        &self.raw
    }
}

impl From<Mapping> for ProxyRecord {
    fn from(raw: Mapping) -> Self {
        let tls = get_string(&raw, &["tls"]);
        let tls_enabled = get_bool(&raw, "tls") || tls == "tls";

        ProxyRecord {
            name: get_string(&raw, &["name"]),
            type_tag: get_string(&raw, &["type"]),
            server: get_string(&raw, &["server"]),
            port: get_port(&raw, "port"),
            uuid: get_string(&raw, &["uuid"]),
            password: get_string(&raw, &["password"]),
            cipher: get_string(&raw, &["cipher"]),
            network: get_string(&raw, &["network"]),
            tls,
            tls_enabled,
            servername: get_string(&raw, &["servername"]),
            sni: get_string(&raw, &["sni"]),
            client_fingerprint: get_string(&raw, &["client-fingerprint"]),
            alpn: get_string_list(&raw, "alpn"),
            skip_cert_verify: get_bool(&raw, "skip-cert-verify"),
            alter_id: get_int(&raw, "alterId"),
            flow: get_string(&raw, &["flow"]),
            obfs: get_string(&raw, &["obfs"]),
            obfs_password: get_string(&raw, &["obfs-password"]),
            ws_path: get_nested_string(&raw, &["ws-opts", "path"]),
            ws_host: get_nested_string(&raw, &["ws-opts", "headers", "Host"]),
            raw,
        }
    }
}

impl From<ProxyRecord> for Mapping {
    fn from(record: ProxyRecord) -> Self {
        record.raw
    }
}

/// Parses the two-letter country code from a `🇺🇸US ...` display name.
pub fn flag_code(name: &str) -> Option<String> {
    FLAG_CODE_REGEX
        .captures(name)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str().to_string())
}

/// A node that passed the upstream health check.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    pub proxy: ProxyRecord,
    /// Free-form labels attached by the checker, e.g. unlocked media platforms
    pub tags: Vec<String>,
}

impl CheckResult {
    pub fn new(proxy: ProxyRecord) -> Self {
        CheckResult {
            proxy,
            tags: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}
