use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{info, warn};

use subsave::parser::parse_node_yaml;
use subsave::settings::update_settings_from_file;
use subsave::utils::{file_exists, file_get};
use subsave::{save_config, CheckResult, Settings};

/// Config file picked up from the working directory when `--config` is absent
const DEFAULT_CONFIG: &str = "config.yaml";

/// Save checked proxy nodes as node documents, share links, a rule
/// subscription and stats
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Node document holding the checked proxies
    #[arg(short, long, value_name = "FILE")]
    input: String,

    /// Output directory, overrides output-dir
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<String>,

    /// Backend for the remote pass, overrides save-method
    #[arg(short, long, value_name = "METHOD")]
    save_method: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let args = Args::parse();

    match args.config.as_deref() {
        Some(path) => update_settings_from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path))?,
        None if file_exists(DEFAULT_CONFIG) => update_settings_from_file(DEFAULT_CONFIG)
            .with_context(|| format!("Failed to load settings from {}", DEFAULT_CONFIG))?,
        None => info!("No config file found, using defaults"),
    }

    let mut settings = Settings::clone(&Settings::current());
    if let Some(dir) = args.output_dir {
        settings.output_dir = dir;
    }
    if let Some(method) = args.save_method {
        settings.save_method = method;
    }

    let content = file_get(Path::new(&args.input))
        .with_context(|| format!("Failed to read {}", args.input))?;
    let document = parse_node_yaml(&content)
        .with_context(|| format!("Failed to parse {}", args.input))?;
    info!("Loaded {} nodes from {}", document.proxies.len(), args.input);

    let results: Vec<CheckResult> = document.proxies.into_iter().map(CheckResult::new).collect();

    for report in save_config(&results, &settings) {
        if report.is_complete() {
            info!(
                "Save via {} finished: {}",
                report.backend,
                report.saved.join(", ")
            );
        } else {
            warn!(
                "Save via {} finished with {} failed stage(s), saved: {}",
                report.backend,
                report.failures.len(),
                report.saved.join(", ")
            );
        }
    }

    Ok(())
}
