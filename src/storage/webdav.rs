use log::info;

use crate::settings::Settings;
use crate::utils::http::build_client;
use crate::utils::url::url_encode;

use super::{
    check_response, content_type_for, network_error, Persist, SaveMethod, StorageError,
    UPLOAD_TIMEOUT,
};

#[derive(Debug, Clone)]
pub struct WebDavConfig {
    pub url: String,
    pub username: String,
    pub password: String,
}

impl WebDavConfig {
    pub fn from_settings(settings: &Settings) -> Result<Self, StorageError> {
        let mut missing = Vec::new();
        if settings.webdav_url.is_empty() {
            missing.push("webdav-url");
        }
        if settings.webdav_username.is_empty() {
            missing.push("webdav-username");
        }
        if settings.webdav_password.is_empty() {
            missing.push("webdav-password");
        }
        if !missing.is_empty() {
            return Err(StorageError::incomplete(
                SaveMethod::WebDav,
                format!("missing {}", missing.join(", ")),
            ));
        }

        Ok(WebDavConfig {
            url: settings.webdav_url.trim_end_matches('/').to_string(),
            username: settings.webdav_username.clone(),
            password: settings.webdav_password.clone(),
        })
    }

    pub fn file_url(&self, name: &str) -> String {
        format!("{}/{}", self.url, url_encode(name))
    }
}

/// PUTs each file into a WebDAV collection
pub struct WebDavSaver {
    config: WebDavConfig,
}

impl WebDavSaver {
    pub fn new(config: WebDavConfig) -> Self {
        WebDavSaver { config }
    }
}

impl Persist for WebDavSaver {
    fn persist(&self, content: &[u8], name: &str) -> Result<(), StorageError> {
        let client = build_client(UPLOAD_TIMEOUT).map_err(StorageError::Network)?;
        let response = client
            .put(self.config.file_url(name))
            .basic_auth(&self.config.username, Some(&self.config.password))
            .header("Content-Type", content_type_for(name))
            .body(content.to_vec())
            .send()
            .map_err(network_error)?;
        check_response(response)?;

        info!("Uploaded {} to WebDAV", name);
        Ok(())
    }
}
