//! File discovery for config files.
//!
//! Each [`SearchPath`] resolves to one directory, which is checked for
//! `{dir}/{file_name}`. Paths are listed in **priority-ascending** order: files
//! found later are loaded later and override earlier ones.
//!
//! Missing files are silently skipped. Only actual I/O errors (permissions,
//! etc.) are propagated.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ParamfigError;
use crate::types::SearchPath;

/// Resolve a [`SearchPath`] to a concrete directory.
///
/// `app_name` is used by `SearchPath::Platform` to construct the platform-specific
/// config directory (e.g. `~/.config/{app_name}/` on Linux).
///
/// Returns `None` if the path cannot be resolved (e.g. no home directory found).
pub fn resolve_search_path(sp: &SearchPath, app_name: &str) -> Option<PathBuf> {
    match sp {
        SearchPath::Platform => {
            let proj = directories::ProjectDirs::from("", "", app_name)?;
            Some(proj.config_dir().to_path_buf())
        }
        SearchPath::Home(subdir) => {
            let user = directories::UserDirs::new()?;
            Some(user.home_dir().join(subdir))
        }
        SearchPath::Cwd => std::env::current_dir().ok(),
        SearchPath::Path(p) => Some(p.clone()),
    }
}

/// Every `{dir}/{file_name}` candidate, in search order. Search paths that
/// can't be resolved are dropped.
pub fn candidate_files(search_paths: &[SearchPath], file_name: &str, app_name: &str) -> Vec<PathBuf> {
    search_paths
        .iter()
        .filter_map(|sp| {
            let dir = resolve_search_path(sp, app_name);
            if dir.is_none() {
                debug!(search_path = ?sp, "search path did not resolve");
            }
            dir
        })
        .map(|dir| dir.join(file_name))
        .collect()
}

/// Read every candidate that exists, in order.
pub fn load_candidates(candidates: &[PathBuf]) -> Result<Vec<(PathBuf, String)>, ParamfigError> {
    let mut results = Vec::new();
    for file_path in candidates {
        match read_optional(file_path)? {
            Some(content) => results.push((file_path.clone(), content)),
            None => debug!(path = %file_path.display(), "config file not found"),
        }
    }
    Ok(results)
}

fn read_optional(path: &Path) -> Result<Option<String>, ParamfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ParamfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
