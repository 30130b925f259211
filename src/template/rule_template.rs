//! Rule template expansion
//!
//! A rule template is plain YAML text with three placeholder tokens. Each line
//! that contains a token is replaced by generated lines carrying the same
//! indentation; every other line is copied through. There are no expressions
//! or conditionals beyond these tokens.

use crate::models::{ConfigData, CountryInfo, CountryTable, StatsData};

pub const COUNTRY_NAME_LIST_TOKEN: &str = "{countries.name.list}";
pub const COUNTRY_GROUPS_TOKEN: &str = "{countries.list}";
pub const MEDIA_GROUPS_TOKEN: &str = "{media.list}";

/// Platform id excluded from media groups even when configured
const EXCLUDED_PLATFORM: &str = "iprisk";

/// Media platforms that get a dedicated group: (id, group name, filter)
const MEDIA_PLATFORMS: [(&str, &str, &str); 6] = [
    ("tiktok", "TikTok", "(?i)抖音|TK-|TikTok"),
    ("youtube", "YouTube", "(?i)油管|YT-|YouTube"),
    ("netflix", "Netflix", "(?i)奈菲|NF|Netflix"),
    ("disney", "Disney", "(?i)迪士尼|D+|Disney"),
    ("openai", "OpenAI", "(?i)GPT|OpenAI"),
    ("gemini", "Gemini", "(?i)GM|Gemini"),
];

/// Expand a rule template and append the node document
///
/// # Arguments
/// * `template` - Rule template text
/// * `stats` - Statistics of the node document; its country set drives the country tokens
/// * `countries` - Country lookup; codes missing from it are skipped
/// * `config` - Media group switch and platform order
/// * `node_content` - Node document appended verbatim after a blank line
pub fn expand_rule_template(
    template: &str,
    stats: &StatsData,
    countries: &CountryTable,
    config: &ConfigData,
    node_content: &str,
) -> String {
    let mut result: Vec<String> = Vec::new();

    for line in template.split('\n') {
        if line.contains(COUNTRY_NAME_LIST_TOKEN) {
            result.extend(country_name_list(stats, countries, get_indent(line)));
        } else if line.contains(COUNTRY_GROUPS_TOKEN) {
            result.extend(country_groups(stats, countries, get_indent(line)));
        } else if line.contains(MEDIA_GROUPS_TOKEN) {
            result.extend(media_groups(config, get_indent(line)));
        } else {
            result.push(line.to_string());
        }
    }

    result.push(String::new());
    result.push(node_content.to_string());
    result.join("\n")
}

/// Join a rule document and a node document without expanding any token
pub fn concat_rule_and_node(rule: &str, node_content: &str) -> String {
    format!("{}\n\n{}", rule, node_content)
}

/// Leading run of spaces and tabs
pub fn get_indent(line: &str) -> &str {
    let end = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    &line[..end]
}

/// Countries present in `stats` that the table knows about.
///
/// Follows the iteration order of the stats map, which is not stable between runs.
fn matched_countries<'a>(
    stats: &'a StatsData,
    countries: &'a CountryTable,
) -> impl Iterator<Item = &'a CountryInfo> + 'a {
    stats
        .countries
        .keys()
        .filter_map(move |code| countries.get(code))
}

fn country_name_list(stats: &StatsData, countries: &CountryTable, indent: &str) -> Vec<String> {
    matched_countries(stats, countries)
        .map(|country| format!("{}- {} {}", indent, country.flag, country.cn_name))
        .collect()
}

fn country_groups(stats: &StatsData, countries: &CountryTable, indent: &str) -> Vec<String> {
    matched_countries(stats, countries)
        .flat_map(|country| {
            let filter = format!(
                "(?i){}|{}|{}_|{}",
                country.flag, country.cn_name, country.code, country.en_name
            );
            group_block(
                indent,
                &format!("{} {}", country.flag, country.cn_name),
                &filter,
            )
        })
        .collect()
}

fn media_groups(config: &ConfigData, indent: &str) -> Vec<String> {
    if !config.media_check {
        return Vec::new();
    }

    config
        .platforms
        .iter()
        .filter(|platform| platform.as_str() != EXCLUDED_PLATFORM)
        .filter_map(|platform| {
            MEDIA_PLATFORMS
                .iter()
                .find(|(id, _, _)| *id == platform.as_str())
        })
        .flat_map(|(_, name, filter)| group_block(indent, name, filter))
        .collect()
}

/// A `url-test` proxy group that includes every node whose name matches `filter`
fn group_block(indent: &str, name: &str, filter: &str) -> Vec<String> {
    vec![
        format!("{}- name: {}", indent, name),
        format!("{}  include-all: true", indent),
        format!("{}  filter: {}", indent, filter),
        format!("{}  type: url-test", indent),
        format!("{}  interval: 300", indent),
        format!("{}  tolerance: 50", indent),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn us_table() -> CountryTable {
        vec![CountryInfo {
            code: "US".to_string(),
            flag: "🇺🇸".to_string(),
            cn_name: "美国".to_string(),
            en_name: "United States".to_string(),
        }]
        .into_iter()
        .collect()
    }

    fn stats_with(codes: &[(&str, usize)]) -> StatsData {
        let mut stats = StatsData::default();
        for (code, count) in codes {
            stats.countries.insert(code.to_string(), *count);
        }
        stats
    }

    #[test]
    fn test_get_indent() {
        assert_eq!(get_indent("  \t- x"), "  \t");
        assert_eq!(get_indent("x"), "");
        assert_eq!(get_indent("   "), "   ");
    }

    #[test]
    fn test_country_groups_block() {
        let out = expand_rule_template(
            "  {countries.list}",
            &stats_with(&[("US", 3)]),
            &us_table(),
            &ConfigData::default(),
            "proxies: []",
        );
        let lines: Vec<&str> = out.split('\n').collect();
        assert_eq!(
            lines,
            vec![
                "  - name: 🇺🇸 美国",
                "    include-all: true",
                "    filter: (?i)🇺🇸|美国|US_|United States",
                "    type: url-test",
                "    interval: 300",
                "    tolerance: 50",
                "",
                "proxies: []",
            ]
        );
        assert!(lines[2].contains("  filter: (?i)🇺🇸|美国|US_|United States"));
    }

    #[test]
    fn test_country_name_list_skips_unknown_codes() {
        let template = "proxy-groups:\n  - name: Select\n    proxies:\n      {countries.name.list}\nrules: []";
        let out = expand_rule_template(
            template,
            &stats_with(&[("US", 1), ("ZZ", 4)]),
            &us_table(),
            &ConfigData::default(),
            "",
        );
        assert_eq!(
            out,
            "proxy-groups:\n  - name: Select\n    proxies:\n      - 🇺🇸 美国\nrules: []\n\n"
        );
    }

    #[test]
    fn test_media_groups_disabled_removes_line() {
        let config = ConfigData {
            media_check: false,
            platforms: vec!["openai".to_string()],
        };
        let out = expand_rule_template(
            "a\n  {media.list}\nb",
            &StatsData::default(),
            &us_table(),
            &config,
            "",
        );
        assert_eq!(out, "a\nb\n\n");
    }

    #[test]
    fn test_media_groups_follow_platform_order() {
        let config = ConfigData {
            media_check: true,
            platforms: vec![
                "gemini".to_string(),
                "iprisk".to_string(),
                "unknown".to_string(),
                "netflix".to_string(),
            ],
        };
        let out = expand_rule_template(
            "\t{media.list}",
            &StatsData::default(),
            &CountryTable::default(),
            &config,
            "",
        );
        let lines: Vec<&str> = out.split('\n').collect();
        assert_eq!(lines.len(), 12 + 2);
        assert_eq!(lines[0], "\t- name: Gemini");
        assert_eq!(lines[2], "\t  filter: (?i)GM|Gemini");
        assert_eq!(lines[6], "\t- name: Netflix");
        assert_eq!(lines[11], "\t  tolerance: 50");
        assert!(!out.contains("iprisk"));
    }

    #[test]
    fn test_untouched_lines_and_node_append() {
        let out = expand_rule_template(
            "mixed-port: 7890\nmode: rule\n",
            &StatsData::default(),
            &CountryTable::default(),
            &ConfigData::default(),
            "proxies:\n- name: a\n",
        );
        assert_eq!(out, "mixed-port: 7890\nmode: rule\n\n\nproxies:\n- name: a\n");
        assert_eq!(
            out,
            concat_rule_and_node("mixed-port: 7890\nmode: rule\n", "proxies:\n- name: a\n")
        );
    }
}
