use std::path::Path;

use crate::cli::commands::NewArgs;
use crate::cli::output::project_to_json;
use crate::io::project_io;

fn validate_project_path(path: &Path) -> Result<(), String> {
    if path.as_os_str().is_empty() {
        return Err("project path cannot be empty".to_string());
    }
    if path.is_dir() {
        return Err(format!("{} is a directory", path.display()));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            return Err(format!("directory does not exist: {}", parent.display()));
        }
    }
    Ok(())
}

pub fn cmd_new(args: NewArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(&args.path);
    validate_project_path(path)?;

    let project = project_io::create_project(path, args.gedcom.as_deref().unwrap_or(""))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&project_to_json(&project))?);
    } else {
        println!("created {}", path.display());
    }
    Ok(())
}
