use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::model::project::Project;

/// Error type for project file operations
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("could not serialize project: {0}")]
    SerializeError(#[from] serde_yaml::Error),
    #[error("project has no file name")]
    NoFilename,
}

/// Write a file atomically: temp file in the same directory, then rename
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Load a project file. The returned project remembers its path.
pub fn load_project(path: &Path) -> Result<Project, ProjectError> {
    let text = fs::read_to_string(path).map_err(|e| ProjectError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut project = parse_project(&text).map_err(|e| ProjectError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    project.filename = path.to_path_buf();
    tracing::debug!(path = %path.display(), plans = project.plans.len(), "project loaded");
    Ok(project)
}

/// Parse project YAML. An empty document is an empty project.
pub fn parse_project(text: &str) -> Result<Project, serde_yaml::Error> {
    let value: serde_yaml::Value = serde_yaml::from_str(text)?;
    if value.is_null() {
        return Ok(Project::default());
    }
    Project::from_value(value)
}

pub fn serialize_project(project: &Project) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(&project.to_value()?)
}

/// Save a project to the file it was loaded from
pub fn save_project(project: &Project) -> Result<(), ProjectError> {
    if project.filename.as_os_str().is_empty() {
        return Err(ProjectError::NoFilename);
    }
    save_project_to(project, &project.filename)
}

pub fn save_project_to(project: &Project, path: &Path) -> Result<(), ProjectError> {
    let content = serialize_project(project)?;
    atomic_write(path, content.as_bytes()).map_err(|e| ProjectError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::info!(path = %path.display(), "project saved");
    Ok(())
}

/// Create and save a new project, linked to `gedcom` unless it is empty.
/// Refuses to overwrite an existing file.
pub fn create_project(path: &Path, gedcom: &str) -> Result<Project, ProjectError> {
    if path.exists() {
        return Err(ProjectError::WriteError {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::AlreadyExists, "file already exists"),
        });
    }
    let mut project = Project::new(path);
    project.gedcom = gedcom.to_string();
    save_project(&project)?;
    Ok(project)
}
