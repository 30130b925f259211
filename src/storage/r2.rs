use log::info;
use url::Url;

use crate::settings::Settings;
use crate::utils::http::build_client;

use super::{
    check_response, content_type_for, network_error, Persist, SaveMethod, StorageError,
    UPLOAD_TIMEOUT,
};

/// Cloudflare R2 reached through an upload worker
#[derive(Debug, Clone)]
pub struct R2Config {
    pub worker_url: String,
    pub worker_token: String,
}

impl R2Config {
    pub fn from_settings(settings: &Settings) -> Result<Self, StorageError> {
        if settings.worker_url.is_empty() || settings.worker_token.is_empty() {
            return Err(StorageError::incomplete(
                SaveMethod::R2,
                "worker-url and worker-token are required",
            ));
        }
        Url::parse(&settings.worker_url).map_err(|e| {
            StorageError::incomplete(SaveMethod::R2, format!("invalid worker-url: {}", e))
        })?;

        Ok(R2Config {
            worker_url: settings.worker_url.trim_end_matches('/').to_string(),
            worker_token: settings.worker_token.clone(),
        })
    }

    /// `<worker-url>/storage?key=<name>&token=<token>`
    pub fn upload_url(&self, name: &str) -> Result<Url, StorageError> {
        let mut url = Url::parse(&format!("{}/storage", self.worker_url)).map_err(|e| {
            StorageError::incomplete(SaveMethod::R2, format!("invalid worker-url: {}", e))
        })?;
        url.query_pairs_mut()
            .append_pair("key", name)
            .append_pair("token", &self.worker_token);
        Ok(url)
    }
}

pub struct R2Saver {
    config: R2Config,
}

impl R2Saver {
    pub fn new(config: R2Config) -> Self {
        R2Saver { config }
    }
}

impl Persist for R2Saver {
    fn persist(&self, content: &[u8], name: &str) -> Result<(), StorageError> {
        let client = build_client(UPLOAD_TIMEOUT).map_err(StorageError::Network)?;
        let response = client
            .post(self.config.upload_url(name)?)
            .header("Content-Type", content_type_for(name))
            .body(content.to_vec())
            .send()
            .map_err(network_error)?;
        check_response(response)?;

        info!("Uploaded {} to R2", name);
        Ok(())
    }
}
