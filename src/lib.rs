pub mod generator;
pub mod models;
pub mod parser;
pub mod save;
pub mod settings;
pub mod storage;
pub mod template;
pub mod utils;

// Re-export the node types for easier access
pub use models::{CheckResult, ProxyRecord, ProxyType};

// Re-export the save cycle entry points
pub use save::{save_config, ConfigSaver, SaveReport};
pub use settings::Settings;
pub use storage::{Persist, SaveMethod};
