use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::record::RawRecord;
use crate::types::identifiers::{RecordId, RecordIdError};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Catalog root is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("Invalid description path: {0}")]
    InvalidPath(#[from] RecordIdError),
}

/// Enumerates the unparsed descriptions in some scope (course folder, bundle).
pub trait CatalogSource {
    fn list_description_records(&self) -> Result<Vec<RawRecord>, CatalogError>;
}

impl CatalogSource for Vec<RawRecord> {
    fn list_description_records(&self) -> Result<Vec<RawRecord>, CatalogError> {
        Ok(self.clone())
    }
}

/// Recursively collects every file under `root` whose name ends with `suffix`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    pub root: PathBuf,
    pub suffix: String,
}

impl DirectorySource {
    pub const DEFAULT_SUFFIX: &'static str = ".metadata.json";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            suffix: Self::DEFAULT_SUFFIX.to_string(),
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    fn collect(&self, dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), CatalogError> {
        let mut entries = fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                self.collect(&path, out)?;
            } else if path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(&self.suffix))
            {
                out.push(path);
            }
        }

        Ok(())
    }
}

impl CatalogSource for DirectorySource {
    fn list_description_records(&self) -> Result<Vec<RawRecord>, CatalogError> {
        if !self.root.is_dir() {
            return Err(CatalogError::NotADirectory(self.root.clone()));
        }

        let mut paths = Vec::new();
        self.collect(&self.root, &mut paths)?;

        let mut records = Vec::with_capacity(paths.len());
        for path in paths {
            let id = RecordId::from_path(&self.root, &path)?;
            let bytes = fs::read(&path)?;
            records.push(RawRecord::new(id, bytes));
        }

        Ok(records)
    }
}
