use std::fs;
use std::path::{Path, PathBuf};

use crate::model::reference::ReferenceSet;

/// Error type for reading a reference file
#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// Produces the individual and source records of a reference file
pub trait ReferenceLoader {
    fn load(&self, path: &Path) -> Result<ReferenceSet, ReferenceError>;
}

/// Reads a YAML (or JSON) extract of a reference file:
///
/// ```yaml
/// individuals:
///   - { pointer: I1, first_name: Ada, last_name: Byron, birth_year: 1815 }
/// sources:
///   - { pointer: S1, title: Parish Registers, author: Church of England }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractLoader;

impl ReferenceLoader for ExtractLoader {
    fn load(&self, path: &Path) -> Result<ReferenceSet, ReferenceError> {
        let text = fs::read_to_string(path).map_err(|e| ReferenceError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let value: serde_yaml::Value =
            serde_yaml::from_str(&text).map_err(|e| ReferenceError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;
        if value.is_null() {
            return Ok(ReferenceSet::default());
        }
        serde_yaml::from_value(value).map_err(|e| ReferenceError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Resolve a project's reference path against the project file's directory
pub fn resolve_reference_path(project_file: &Path, reference: &str) -> PathBuf {
    let reference = Path::new(reference);
    if reference.is_absolute() {
        return reference.to_path_buf();
    }
    match project_file.parent() {
        Some(dir) => dir.join(reference),
        None => reference.to_path_buf(),
    }
}
