use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Aggregate counts over one node document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsData {
    #[serde(rename = "nodes")]
    pub total_nodes: usize,
    /// Two-letter country code to node count
    pub countries: HashMap<String, usize>,
    /// Protocol `type` tag to node count
    pub types: HashMap<String, usize>,
    #[serde(rename = "v2ray-subscription")]
    pub v2ray_subscription: bool,
    #[serde(rename = "media-check")]
    pub media_check: bool,
}

/// Template inputs for the media group block
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ConfigData {
    pub media_check: bool,
    pub platforms: Vec<String>,
}

impl ConfigData {
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_json_keys() {
        let mut stats = StatsData {
            total_nodes: 2,
            v2ray_subscription: true,
            ..Default::default()
        };
        stats.countries.insert("US".to_string(), 2);
        let json: serde_json::Value = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["nodes"], 2);
        assert_eq!(json["countries"]["US"], 2);
        assert_eq!(json["v2ray-subscription"], true);
        assert_eq!(json["media-check"], false);
    }

    #[test]
    fn test_config_data_ignores_unrelated_keys() {
        let data = ConfigData::from_yaml("media-check: true\nplatforms: [openai, iprisk]\nsave-method: gist\n")
            .unwrap();
        assert!(data.media_check);
        assert_eq!(data.platforms, vec!["openai", "iprisk"]);
    }
}
