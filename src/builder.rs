use std::path::PathBuf;

use tracing::debug;

use crate::config::Config;
use crate::error::ParamfigError;
use crate::file;
use crate::types::SearchPath;

/// Builder for discovering and loading a [`Config`].
///
/// Layers, lowest priority first:
///
/// 1. Files found on the [search paths](Self::search_paths), in list order.
/// 2. Files added with [`add_file`](Self::add_file), in call order.
/// 3. Environment variables `{PREFIX}__{SECTION}__{OPTION}` (see
///    [`Config::apply_env`]).
pub struct ConfigBuilder {
    app_name: Option<String>,
    file_name: Option<String>,
    search_paths: Option<Vec<SearchPath>>,
    files: Vec<PathBuf>,
    env_prefix: Option<String>,
    env_enabled: bool,
    strict: bool,
}

impl ConfigBuilder {
    pub(crate) fn new() -> Self {
        Self {
            app_name: None,
            file_name: None,
            search_paths: None,
            files: Vec::new(),
            env_prefix: None,
            env_enabled: true,
            strict: false,
        }
    }

    /// Set the application name. This derives sensible defaults:
    /// - `file_name` → `"{app_name}.yaml"`
    /// - `search_paths` → `[SearchPath::Platform]`
    /// - `env_prefix` → `"{APP_NAME}"` (uppercased)
    pub fn app_name(mut self, name: &str) -> Self {
        self.app_name = Some(name.to_string());
        self
    }

    /// Override the config file name (default: `"{app_name}.yaml"`). A name
    /// ending in `.toml` is parsed as TOML.
    pub fn file_name(mut self, name: &str) -> Self {
        self.file_name = Some(name.to_string());
        self
    }

    /// Replace the default search paths entirely.
    ///
    /// Paths are listed in **priority-ascending** order: the last entry has the
    /// highest priority. See [`SearchPath`] for the available variants.
    pub fn search_paths(mut self, paths: Vec<SearchPath>) -> Self {
        self.search_paths = Some(paths);
        self
    }

    /// Append a search path without replacing the defaults.
    /// If no paths have been set yet, starts from the default `[Platform]`.
    pub fn add_search_path(mut self, path: SearchPath) -> Self {
        self.search_paths
            .get_or_insert_with(|| vec![SearchPath::Platform])
            .push(path);
        self
    }

    /// Read an explicit file after the search paths. Missing files are skipped
    /// like any other candidate.
    pub fn add_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    /// Override the environment variable prefix (default: uppercased `app_name`).
    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    /// Disable environment variable loading entirely.
    pub fn no_env(mut self) -> Self {
        self.env_enabled = false;
        self
    }

    /// Enable or disable strict mode (default: `false`).
    /// A strict tree fails on access to an unknown section instead of creating it.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Resolve the effective app name, or error if not set.
    fn effective_app_name(&self) -> Result<&str, ParamfigError> {
        self.app_name
            .as_deref()
            .ok_or(ParamfigError::AppNameRequired)
    }

    /// Resolve the effective file name.
    fn effective_file_name(&self) -> Result<String, ParamfigError> {
        if let Some(name) = &self.file_name {
            return Ok(name.clone());
        }
        let app = self.effective_app_name()?;
        Ok(format!("{app}.yaml"))
    }

    /// Resolve the effective search paths.
    fn effective_search_paths(&self) -> Vec<SearchPath> {
        if let Some(paths) = &self.search_paths {
            return paths.clone();
        }
        vec![SearchPath::Platform]
    }

    /// Resolve the effective env prefix (None if env disabled).
    fn effective_env_prefix(&self) -> Result<Option<String>, ParamfigError> {
        if !self.env_enabled {
            return Ok(None);
        }
        if let Some(prefix) = &self.env_prefix {
            return Ok(Some(prefix.clone()));
        }
        let app = self.effective_app_name()?;
        Ok(Some(app.to_uppercase()))
    }

    /// Load the configuration through all layers.
    pub fn load(self) -> Result<Config, ParamfigError> {
        self.load_with_vars(std::env::vars())
    }

    fn load_with_vars(
        self,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Config, ParamfigError> {
        let app_name = self.effective_app_name()?;
        let file_name = self.effective_file_name()?;
        let env_prefix = self.effective_env_prefix()?;

        let mut candidates =
            file::candidate_files(&self.effective_search_paths(), &file_name, app_name);
        candidates.extend(self.files.iter().cloned());

        let mut config = if self.strict {
            Config::strict()
        } else {
            Config::new()
        };
        for (path, content) in file::load_candidates(&candidates)? {
            config.load_file(&path, &content)?;
        }
        if let Some(prefix) = env_prefix {
            let applied = config.apply_env(&prefix, vars)?;
            debug!(prefix = %prefix, applied, "applied env overrides");
        }
        Ok(config)
    }
}
