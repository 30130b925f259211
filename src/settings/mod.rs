//! Settings loaded from `config.yaml`

pub mod settings_struct;

pub use settings_struct::{
    update_settings_from_content, update_settings_from_file, Settings, SettingsError, GLOBAL,
};
