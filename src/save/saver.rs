//! One save cycle: categorize, persist, then derive stats, links and the
//! rule subscription from the persisted node document.

use std::io;

use chrono::Local;
use log::{debug, error, info, warn};
use thiserror::Error;

use crate::generator::{generate_stats, proxy_to_links, stats_to_json};
use crate::models::{CheckResult, CountryTable, ProxyRecord, StatsData};
use crate::parser::{parse_node_yaml, to_node_yaml, NodeDocument};
use crate::settings::Settings;
use crate::storage::{
    resolve_backend, resolve_backend_by_name, LocalSaver, Persist, SaveMethod, StorageError,
};
use crate::template::{concat_rule_and_node, expand_rule_template};
use crate::utils::file_get;
use crate::utils::url::warp_url;
use crate::utils::web_get;

use super::category::{categorize, CategoryRule, ProxyCategory};

pub const NODE_FILE: &str = "node.yaml";
pub const RULE_FILE: &str = "rule.yaml";
pub const SUB_FILE: &str = "sub.yaml";
pub const STATS_FILE: &str = "stats.json";
pub const V2RAY_FILE: &str = "v2ray.txt";

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("Failed to download rule template: {0}")]
    Fetch(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Missing input: {0}")]
    MissingInput(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFailure {
    pub stage: String,
    pub error: String,
}

/// What one pass of the save cycle produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    /// Backend the pass wrote through
    pub backend: String,
    /// Names of the files written, in order
    pub saved: Vec<String>,
    pub failures: Vec<StageFailure>,
}

impl SaveReport {
    fn new(backend: &str) -> Self {
        SaveReport {
            backend: backend.to_string(),
            saved: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn has_saved(&self, name: &str) -> bool {
        self.saved.iter().any(|n| n == name)
    }

    pub fn failed(&self, stage: &str) -> bool {
        self.failures.iter().any(|f| f.stage == stage)
    }

    /// `Ok(true)` means the artifact was written, `Ok(false)` that the stage had nothing to write
    fn record(&mut self, stage: &str, outcome: Result<bool, SaveError>) {
        match outcome {
            Ok(true) => self.saved.push(stage.to_string()),
            Ok(false) => {}
            Err(err) => self.fail(stage, err),
        }
    }

    fn fail(&mut self, stage: &str, err: SaveError) {
        error!("Failed to save {} via {}: {}", stage, self.backend, err);
        self.failures.push(StageFailure {
            stage: stage.to_string(),
            error: err.to_string(),
        });
    }
}

/// A single save pass through one backend
pub struct ConfigSaver<'a> {
    results: &'a [CheckResult],
    settings: &'a Settings,
    label: String,
    local_pass: bool,
    /// Set when this cycle's rule download failed in an earlier pass
    rule_fetch_failed: bool,
    backend: Box<dyn Persist>,
    local: LocalSaver,
}

impl<'a> ConfigSaver<'a> {
    pub fn new(results: &'a [CheckResult], settings: &'a Settings, method: SaveMethod) -> Self {
        Self::with_backend(results, settings, method, resolve_backend(method, settings))
    }

    /// Resolve the backend from its configuration name; unknown names fail on write
    pub fn named(results: &'a [CheckResult], settings: &'a Settings, name: &str) -> Self {
        ConfigSaver {
            results,
            settings,
            label: name.to_string(),
            local_pass: name.parse::<SaveMethod>().ok() == Some(SaveMethod::Local),
            rule_fetch_failed: false,
            backend: resolve_backend_by_name(name, settings),
            local: LocalSaver::new(settings.output_path()),
        }
    }

    pub fn with_backend(
        results: &'a [CheckResult],
        settings: &'a Settings,
        method: SaveMethod,
        backend: Box<dyn Persist>,
    ) -> Self {
        ConfigSaver {
            results,
            settings,
            label: method.to_string(),
            local_pass: method == SaveMethod::Local,
            rule_fetch_failed: false,
            backend,
            local: LocalSaver::new(settings.output_path()),
        }
    }

    /// Skip `sub.yaml` because the rule template could not be fetched this cycle
    pub fn with_rule_fetch_failed(mut self, failed: bool) -> Self {
        self.rule_fetch_failed = failed;
        self
    }

    /// Categories for this pass: all nodes as `node.yaml`, then the configured ones
    pub fn categories(&self) -> Vec<ProxyCategory> {
        let mut categories = vec![ProxyCategory::new(NODE_FILE, CategoryRule::MatchAll)];
        for config in &self.settings.categories {
            if categories.iter().any(|c| c.name == config.name) {
                warn!("Duplicate category {}, ignoring", config.name);
                continue;
            }
            categories.push(ProxyCategory::from(config));
        }
        categories
    }

    /// Run every stage; a failing stage is logged and the rest still run
    pub fn save(&self) -> SaveReport {
        let mut report = SaveReport::new(&self.label);

        let mut categories = self.categories();
        categorize(self.results, &mut categories);
        for category in &categories {
            if category.is_empty() {
                warn!("Category {} has no nodes, skipping", category.name);
                continue;
            }
            report.record(&category.name, self.save_category(category));
        }

        let mut rule_fetched = !self.rule_fetch_failed;
        if self.local_pass {
            let outcome = self.download_rule();
            rule_fetched &= outcome.is_ok();
            report.record(RULE_FILE, outcome);
        }

        let (node_content, document) = match self.load_nodes() {
            Ok(loaded) => loaded,
            Err(err) => {
                report.fail(NODE_FILE, err);
                return report;
            }
        };

        let stats = self.build_stats(&document);
        report.record(STATS_FILE, self.save_stats(&stats));
        report.record(V2RAY_FILE, self.save_links(&document.proxies));
        let sub = if rule_fetched {
            self.save_sub(&stats, &node_content)
        } else {
            Err(SaveError::MissingInput(format!(
                "{} was not fetched in this cycle",
                RULE_FILE
            )))
        };
        report.record(SUB_FILE, sub);

        report
    }

    fn save_category(&self, category: &ProxyCategory) -> Result<bool, SaveError> {
        let content = to_node_yaml(&category.proxies)?;
        self.backend.persist(content.as_bytes(), &category.name)?;
        info!(
            "Saved {} nodes to {} via {}",
            category.proxies.len(),
            category.name,
            self.label
        );
        Ok(true)
    }

    fn download_rule(&self) -> Result<bool, SaveError> {
        if self.settings.rule_url.is_empty() {
            debug!("No rule-url configured, keeping the existing {}", RULE_FILE);
            return Ok(false);
        }

        let url = warp_url(
            &self.settings.rule_url,
            &self.settings.github_proxy,
            &Local::now(),
        );
        let content = web_get(&url, self.settings.download_timeout).map_err(SaveError::Fetch)?;
        self.local.persist(content.as_bytes(), RULE_FILE)?;
        Ok(true)
    }

    /// Read a file from the local output directory
    fn read_output(&self, name: &str) -> Result<String, SaveError> {
        let path = self.local.path_of(name);
        file_get(&path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => SaveError::MissingInput(path.display().to_string()),
            _ => SaveError::Io(err),
        })
    }

    fn load_nodes(&self) -> Result<(String, NodeDocument), SaveError> {
        let content = self.read_output(NODE_FILE)?;
        let document = parse_node_yaml(&content)?;
        Ok((content, document))
    }

    fn build_stats(&self, document: &NodeDocument) -> StatsData {
        let mut stats = generate_stats(&document.proxies);
        stats.v2ray_subscription = self.settings.v2ray_subscription;
        stats.media_check = self.settings.media_check;
        stats
    }

    fn save_stats(&self, stats: &StatsData) -> Result<bool, SaveError> {
        let json = stats_to_json(stats)?;
        self.backend.persist(json.as_bytes(), STATS_FILE)?;
        info!(
            "Saved {} with {} nodes via {}",
            STATS_FILE, stats.total_nodes, self.label
        );
        Ok(true)
    }

    fn save_links(&self, proxies: &[ProxyRecord]) -> Result<bool, SaveError> {
        if !self.settings.v2ray_subscription {
            debug!("v2ray-subscription disabled, skipping {}", V2RAY_FILE);
            return Ok(false);
        }

        let links = proxy_to_links(proxies);
        if links.is_empty() {
            warn!("No node could be converted to a share link, skipping {}", V2RAY_FILE);
            return Ok(false);
        }

        self.backend.persist(links.join("\n").as_bytes(), V2RAY_FILE)?;
        info!(
            "Saved {} links to {} via {}",
            links.len(),
            V2RAY_FILE,
            self.label
        );
        Ok(true)
    }

    fn save_sub(&self, stats: &StatsData, node_content: &str) -> Result<bool, SaveError> {
        let rule = self.read_output(RULE_FILE)?;

        let content = if self.settings.rule_template {
            let countries = CountryTable::load(self.settings.countries_path())?;
            expand_rule_template(
                &rule,
                stats,
                &countries,
                &self.settings.config_data(),
                node_content,
            )
        } else {
            concat_rule_and_node(&rule, node_content)
        };

        self.backend.persist(content.as_bytes(), SUB_FILE)?;
        info!("Saved {} via {}", SUB_FILE, self.label);
        Ok(true)
    }
}

/// Run a full save cycle
///
/// Always saves to the local output directory first, then repeats the cycle
/// through the configured backend when it is not `local`.
pub fn save_config(results: &[CheckResult], settings: &Settings) -> Vec<SaveReport> {
    let local = ConfigSaver::new(results, settings, SaveMethod::Local).save();
    let rule_fetch_failed = local.failed(RULE_FILE);
    let mut reports = vec![local];

    if settings.save_method.parse::<SaveMethod>().ok() != Some(SaveMethod::Local) {
        reports.push(
            ConfigSaver::named(results, settings, &settings.save_method)
                .with_rule_fetch_failed(rule_fetch_failed)
                .save(),
        );
    }

    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::rc::Rc;

    /// Records every write in memory
    #[derive(Clone, Default)]
    struct Recorder {
        files: Rc<RefCell<BTreeMap<String, String>>>,
    }

    impl Persist for Recorder {
        fn persist(&self, content: &[u8], name: &str) -> Result<(), StorageError> {
            self.files.borrow_mut().insert(
                name.to_string(),
                String::from_utf8_lossy(content).into_owned(),
            );
            Ok(())
        }
    }

    struct Failing;

    impl Persist for Failing {
        fn persist(&self, _content: &[u8], _name: &str) -> Result<(), StorageError> {
            Err(StorageError::Network("connection refused".to_string()))
        }
    }

    fn results() -> Vec<CheckResult> {
        let yaml = r#"
- {name: "🇺🇸US 01", type: ss, server: 1.2.3.4, port: 8388, password: pw}
- {name: "🇯🇵JP 01", type: trojan, server: jp.example.com, port: 443, password: pw}
- {name: "wg", type: wireguard, server: 5.6.7.8, port: 51820}
"#;
        let proxies: Vec<ProxyRecord> = serde_yaml::from_str(yaml).unwrap();
        proxies.into_iter().map(CheckResult::new).collect()
    }

    fn settings(dir: &std::path::Path) -> Settings {
        Settings {
            output_dir: dir.join("output").display().to_string(),
            config_dir: dir.join("config").display().to_string(),
            ..Settings::default()
        }
    }

    #[test]
    fn test_local_pass_writes_every_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        let output = settings.output_path();
        crate::utils::file_write(output.join(RULE_FILE), b"proxy-groups:\n  {countries.list}")
            .unwrap();

        let results = results();
        let report = ConfigSaver::new(&results, &settings, SaveMethod::Local).save();

        assert!(report.is_complete(), "{:?}", report.failures);
        assert_eq!(report.saved, vec![NODE_FILE, STATS_FILE, V2RAY_FILE, SUB_FILE]);

        let links = std::fs::read_to_string(output.join(V2RAY_FILE)).unwrap();
        assert_eq!(links.lines().count(), 2);

        let sub = std::fs::read_to_string(output.join(SUB_FILE)).unwrap();
        assert!(sub.contains("  - name: 🇺🇸 美国"));
        assert!(sub.contains("  - name: 🇯🇵 日本"));
        assert!(sub.ends_with(&std::fs::read_to_string(output.join(NODE_FILE)).unwrap()));
    }

    #[test]
    fn test_remote_pass_reads_local_copy() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = settings(dir.path());
        settings.v2ray_subscription = false;
        settings.rule_template = false;
        let results = results();
        let local = ConfigSaver::new(&results, &settings, SaveMethod::Local).save();
        assert!(local.failed(SUB_FILE));

        crate::utils::file_write(settings.output_path().join(RULE_FILE), b"rules: []").unwrap();
        let recorder = Recorder::default();
        let report = ConfigSaver::with_backend(
            &results,
            &settings,
            SaveMethod::Gist,
            Box::new(recorder.clone()),
        )
        .save();

        assert!(report.is_complete(), "{:?}", report.failures);
        let files = recorder.files.borrow();
        assert_eq!(
            files.keys().map(String::as_str).collect::<Vec<_>>(),
            vec![NODE_FILE, STATS_FILE, SUB_FILE]
        );
        assert!(files[SUB_FILE].starts_with("rules: []\n\nproxies:"));
        let stats: serde_json::Value = serde_json::from_str(&files[STATS_FILE]).unwrap();
        assert_eq!(stats["nodes"], 3);
        assert_eq!(stats["v2ray-subscription"], false);
    }

    #[test]
    fn test_backend_failures_do_not_stop_the_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        let results = results();
        ConfigSaver::new(&results, &settings, SaveMethod::Local).save();

        let report =
            ConfigSaver::with_backend(&results, &settings, SaveMethod::S3, Box::new(Failing))
                .save();
        assert!(report.saved.is_empty());
        for stage in [NODE_FILE, STATS_FILE, V2RAY_FILE, SUB_FILE] {
            assert!(report.failed(stage), "{} should have failed", stage);
        }
    }

    #[test]
    fn test_empty_results_skip_node_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        let report = ConfigSaver::new(&[], &settings, SaveMethod::Local).save();
        assert!(report.saved.is_empty());
        assert!(report.failed(NODE_FILE));
        assert!(!settings.output_path().join(NODE_FILE).exists());
    }

    #[test]
    fn test_configured_categories_follow_default() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = settings(dir.path());
        settings.categories = serde_yaml::from_str(
            "- {name: trojan.yaml, rule: {match-protocol: [trojan]}}\n- {name: node.yaml, rule: match-all}\n",
        )
        .unwrap();
        let results = results();
        let saver = ConfigSaver::new(&results, &settings, SaveMethod::Local);
        let names: Vec<String> = saver.categories().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["node.yaml", "trojan.yaml"]);

        let report = saver.save();
        assert!(report.has_saved("trojan.yaml"));
        let trojan = std::fs::read_to_string(settings.output_path().join("trojan.yaml")).unwrap();
        assert_eq!(parse_node_yaml(&trojan).unwrap().proxies.len(), 1);
    }

    #[test]
    fn test_failed_rule_fetch_skips_sub_with_stale_rule() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = settings(dir.path());
        settings.rule_url = "http://127.0.0.1:1/rule.yaml".to_string();
        settings.download_timeout = 5;
        let output = settings.output_path();
        crate::utils::file_write(output.join(RULE_FILE), b"rules: [] # last cycle").unwrap();

        let results = results();
        let local = ConfigSaver::new(&results, &settings, SaveMethod::Local).save();
        assert!(local.failed(RULE_FILE));
        assert!(local.failed(SUB_FILE));
        assert!(local.has_saved(NODE_FILE));
        assert!(local.has_saved(STATS_FILE));
        assert!(!output.join(SUB_FILE).exists());

        let recorder = Recorder::default();
        let remote = ConfigSaver::with_backend(
            &results,
            &settings,
            SaveMethod::WebDav,
            Box::new(recorder.clone()),
        )
        .with_rule_fetch_failed(true)
        .save();
        assert!(remote.failed(SUB_FILE));
        assert!(remote.has_saved(NODE_FILE));
        assert!(!recorder.files.borrow().contains_key(SUB_FILE));
    }

    #[test]
    fn test_save_config_adds_remote_pass() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = settings(dir.path());
        let results = results();

        let reports = save_config(&results, &settings);
        assert_eq!(reports.len(), 1);

        settings.save_method = "ftp".to_string();
        let reports = save_config(&results, &settings);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1].backend, "ftp");
        assert!(reports[1].failed(NODE_FILE));
        assert!(reports[0].has_saved(NODE_FILE));
    }
}
