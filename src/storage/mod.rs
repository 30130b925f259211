//! Storage backends for generated files
//!
//! Every backend exposes the same [`Persist`] contract. A backend is resolved
//! from its configuration name; incomplete credentials do not fail resolution
//! but yield a backend whose every write reports what is missing.

pub mod gist;
pub mod local;
pub mod r2;
pub mod s3;
pub mod webdav;

use std::fmt;
use std::str::FromStr;

use log::debug;
use thiserror::Error;

use crate::settings::Settings;

pub use gist::{GistConfig, GistSaver};
pub use local::LocalSaver;
pub use r2::{R2Config, R2Saver};
pub use s3::{S3Config, S3Saver};
pub use webdav::{WebDavConfig, WebDavSaver};

/// Timeout for a single upload, in seconds
pub const UPLOAD_TIMEOUT: u64 = 30;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("{backend} configuration is incomplete: {reason}")]
    ConfigIncomplete { backend: String, reason: String },

    #[error("Unknown save method: {0:?}")]
    UnknownMethod(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn incomplete(backend: SaveMethod, reason: impl Into<String>) -> Self {
        StorageError::ConfigIncomplete {
            backend: backend.to_string(),
            reason: reason.into(),
        }
    }
}

/// A destination for generated files
pub trait Persist {
    /// Store `content` under the logical file name `name`
    fn persist(&self, content: &[u8], name: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaveMethod {
    Local,
    R2,
    Gist,
    WebDav,
    S3,
}

impl SaveMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            SaveMethod::Local => "local",
            SaveMethod::R2 => "r2",
            SaveMethod::Gist => "gist",
            SaveMethod::WebDav => "webdav",
            SaveMethod::S3 => "s3",
        }
    }
}

impl fmt::Display for SaveMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SaveMethod {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(SaveMethod::Local),
            "r2" => Ok(SaveMethod::R2),
            "gist" => Ok(SaveMethod::Gist),
            "webdav" => Ok(SaveMethod::WebDav),
            "s3" => Ok(SaveMethod::S3),
            other => Err(StorageError::UnknownMethod(other.to_string())),
        }
    }
}

/// Backend that fails every write with the error found while resolving it
#[derive(Debug, Clone)]
pub struct Unavailable {
    reason: Deferred,
}

#[derive(Debug, Clone)]
enum Deferred {
    Incomplete { backend: String, reason: String },
    UnknownMethod(String),
}

impl Unavailable {
    fn from_error(err: StorageError) -> Self {
        let reason = match err {
            StorageError::ConfigIncomplete { backend, reason } => {
                Deferred::Incomplete { backend, reason }
            }
            StorageError::UnknownMethod(method) => Deferred::UnknownMethod(method),
            other => Deferred::Incomplete {
                backend: "storage".to_string(),
                reason: other.to_string(),
            },
        };
        Unavailable { reason }
    }
}

impl Persist for Unavailable {
    fn persist(&self, _content: &[u8], _name: &str) -> Result<(), StorageError> {
        Err(match &self.reason {
            Deferred::Incomplete { backend, reason } => StorageError::ConfigIncomplete {
                backend: backend.clone(),
                reason: reason.clone(),
            },
            Deferred::UnknownMethod(method) => StorageError::UnknownMethod(method.clone()),
        })
    }
}

/// Resolve a backend by method; never fails, see [`Unavailable`]
pub fn resolve_backend(method: SaveMethod, settings: &Settings) -> Box<dyn Persist> {
    let resolved: Result<Box<dyn Persist>, StorageError> = match method {
        SaveMethod::Local => Ok(Box::new(LocalSaver::new(settings.output_path()))),
        SaveMethod::R2 => R2Config::from_settings(settings)
            .map(|config| Box::new(R2Saver::new(config)) as Box<dyn Persist>),
        SaveMethod::Gist => GistConfig::from_settings(settings)
            .map(|config| Box::new(GistSaver::new(config)) as Box<dyn Persist>),
        SaveMethod::WebDav => WebDavConfig::from_settings(settings)
            .map(|config| Box::new(WebDavSaver::new(config)) as Box<dyn Persist>),
        SaveMethod::S3 => S3Config::from_settings(settings)
            .map(|config| Box::new(S3Saver::new(config)) as Box<dyn Persist>),
    };

    resolved.unwrap_or_else(|err| {
        debug!("Backend {} unavailable: {}", method, err);
        Box::new(Unavailable::from_error(err))
    })
}

/// Resolve a backend by configuration name; unknown names fail on every write
pub fn resolve_backend_by_name(name: &str, settings: &Settings) -> Box<dyn Persist> {
    match name.parse::<SaveMethod>() {
        Ok(method) => resolve_backend(method, settings),
        Err(err) => Box::new(Unavailable::from_error(err)),
    }
}

/// Content type used when uploading a generated file
pub fn content_type_for(name: &str) -> &'static str {
    if name.ends_with(".yaml") || name.ends_with(".yml") {
        "application/x-yaml"
    } else if name.ends_with(".json") {
        "application/json"
    } else {
        "text/plain; charset=utf-8"
    }
}

/// Map a non-success response onto [`StorageError::Http`]
pub(crate) fn check_response(
    response: reqwest::blocking::Response,
) -> Result<(), StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().unwrap_or_default();
    Err(StorageError::Http {
        status: status.as_u16(),
        body,
    })
}

pub(crate) fn network_error(err: reqwest::Error) -> StorageError {
    StorageError::Network(err.to_string())
}
