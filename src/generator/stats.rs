//! Node statistics for `stats.json`

use crate::models::{ProxyRecord, StatsData};

/// Count nodes overall, per country and per protocol in a single pass
///
/// The country comes from a `🇺🇸US`-style prefix on the display name; nodes
/// without one still count toward the total and their protocol.
pub fn generate_stats(nodes: &[ProxyRecord]) -> StatsData {
    let mut stats = StatsData::default();

    for node in nodes {
        stats.total_nodes += 1;

        if let Some(code) = node.flag_code() {
            *stats.countries.entry(code).or_insert(0) += 1;
        }

        if !node.type_tag.is_empty() {
            *stats.types.entry(node.type_tag.clone()).or_insert(0) += 1;
        }
    }

    stats
}

/// Serialize stats as pretty-printed JSON
pub fn stats_to_json(stats: &StatsData) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_node_yaml;

    #[test]
    fn test_generate_stats() {
        let doc = parse_node_yaml(
            r#"
proxies:
  - {name: "🇺🇸US 01", type: ss}
  - {name: "🇺🇸US 02", type: vmess}
  - {name: "🇯🇵JP 01", type: vmess}
  - {name: "Relay 01", type: trojan}
  - {name: "🇭🇰hk lower", type: trojan}
  - {name: "no type"}
"#,
        )
        .unwrap();

        let stats = generate_stats(&doc.proxies);
        assert_eq!(stats.total_nodes, 6);
        assert_eq!(stats.countries.len(), 2);
        assert_eq!(stats.countries["US"], 2);
        assert_eq!(stats.countries["JP"], 1);
        assert_eq!(stats.types["vmess"], 2);
        assert_eq!(stats.types["trojan"], 2);
        assert_eq!(stats.types.values().sum::<usize>(), 5);
    }

    #[test]
    fn test_empty_input() {
        let stats = generate_stats(&[]);
        assert_eq!(stats, StatsData::default());
    }
}
