use std::path::{Path, PathBuf};

use log::info;

use crate::utils::file_write;

use super::{Persist, StorageError};

/// Writes files into the output directory
#[derive(Debug, Clone)]
pub struct LocalSaver {
    output_path: PathBuf,
}

impl LocalSaver {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        LocalSaver {
            output_path: output_path.into(),
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.output_path.join(name)
    }
}

impl Persist for LocalSaver {
    fn persist(&self, content: &[u8], name: &str) -> Result<(), StorageError> {
        let path = self.path_of(name);
        file_write(&path, content)?;
        info!("Saved {} ({} bytes)", path.display(), content.len());
        Ok(())
    }
}
