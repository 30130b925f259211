//! Categorization and the save cycle

pub mod category;
pub mod saver;

pub use category::{categorize, CategoryConfig, CategoryRule, ProxyCategory};
pub use saver::{
    save_config, ConfigSaver, SaveError, SaveReport, StageFailure, NODE_FILE, RULE_FILE,
    STATS_FILE, SUB_FILE, V2RAY_FILE,
};
