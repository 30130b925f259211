//! The aggregated node document (`node.yaml`)

use serde::{Deserialize, Serialize};

use crate::models::ProxyRecord;

/// Top-level shape of a node document: a single `proxies` sequence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    #[serde(default)]
    pub proxies: Vec<ProxyRecord>,
}

impl NodeDocument {
    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }
}

/// Parse a node document from YAML
pub fn parse_node_yaml(content: &str) -> Result<NodeDocument, serde_yaml::Error> {
    serde_yaml::from_str(content)
}

/// Serialize proxies into a node document
pub fn to_node_yaml(proxies: &[ProxyRecord]) -> Result<String, serde_yaml::Error> {
    #[derive(Serialize)]
    struct Borrowed<'a> {
        proxies: &'a [ProxyRecord],
    }

    serde_yaml::to_string(&Borrowed { proxies })
}
