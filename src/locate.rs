//! Project file discovery
//!
//! A uVision project directory conventionally holds one `.uvprojx` named
//! after the directory. Discovery prefers that file and otherwise falls
//! back to the first project file in lexical order.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocateError {
    #[error("not a uVision project directory: {}", .0.display())]
    NoProjectFile(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Finds the project file inside `project_dir`.
pub fn find_project_file(project_dir: &Path) -> Result<PathBuf, LocateError> {
    let mut candidates = Vec::new();
    for entry in fs::read_dir(project_dir)? {
        let path = entry?.path();
        let is_project = path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("uvprojx"));
        if is_project {
            candidates.push(path);
        }
    }
    candidates.sort();
    debug!("{} project file candidates in {}", candidates.len(), project_dir.display());
    if let Some(dir_name) = project_dir.file_name() {
        let preferred = project_dir.join(format!("{}.uvprojx", dir_name.to_string_lossy()));
        if candidates.contains(&preferred) {
            return Ok(preferred);
        }
    }
    candidates
        .into_iter()
        .next()
        .ok_or_else(|| LocateError::NoProjectFile(project_dir.to_path_buf()))
}
