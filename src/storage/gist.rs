use log::info;
use serde_json::json;

use crate::settings::Settings;
use crate::utils::http::build_client;

use super::{check_response, network_error, Persist, SaveMethod, StorageError, UPLOAD_TIMEOUT};

pub const GITHUB_API: &str = "https://api.github.com";

#[derive(Debug, Clone)]
pub struct GistConfig {
    pub token: String,
    pub gist_id: String,
    pub api_base: String,
}

impl GistConfig {
    pub fn from_settings(settings: &Settings) -> Result<Self, StorageError> {
        if settings.github_token.is_empty() || settings.github_gist_id.is_empty() {
            return Err(StorageError::incomplete(
                SaveMethod::Gist,
                "github-token and github-gist-id are required",
            ));
        }

        let api_base = if settings.github_api_mirror.is_empty() {
            GITHUB_API
        } else {
            settings.github_api_mirror.as_str()
        };

        Ok(GistConfig {
            token: settings.github_token.clone(),
            gist_id: settings.github_gist_id.clone(),
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn gist_url(&self) -> String {
        format!("{}/gists/{}", self.api_base, self.gist_id)
    }
}

/// Updates one file of an existing gist per write
pub struct GistSaver {
    config: GistConfig,
}

impl GistSaver {
    pub fn new(config: GistConfig) -> Self {
        GistSaver { config }
    }
}

/// Request body replacing the content of file `name`
pub fn gist_payload(content: &[u8], name: &str) -> serde_json::Value {
    json!({
        "files": {
            name: {
                "content": String::from_utf8_lossy(content),
            }
        }
    })
}

impl Persist for GistSaver {
    fn persist(&self, content: &[u8], name: &str) -> Result<(), StorageError> {
        let client = build_client(UPLOAD_TIMEOUT).map_err(StorageError::Network)?;
        let response = client
            .patch(self.config.gist_url())
            .header("Accept", "application/vnd.github+json")
            .header("Authorization", format!("token {}", self.config.token))
            .json(&gist_payload(content, name))
            .send()
            .map_err(network_error)?;
        check_response(response)?;

        info!("Uploaded {} to gist {}", name, self.config.gist_id);
        Ok(())
    }
}
