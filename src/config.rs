//! The configuration tree: sections of options, addressable by flat key.
//!
//! A [`Config`] is a two-level mapping `section -> option -> value`. Every
//! option is also reachable through its flat key `"{section}_{option}"`, which
//! is how a whole tree is fed into a `**kwargs`-style function. Configuration
//! only ever grows or changes: removal is defined but always fails.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::builder::ConfigBuilder;
use crate::error::ParamfigError;
use crate::section::Section;
use crate::types::{ConfigPaths, DocumentFormat};
use crate::value::{Value, yaml_key};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    sections: BTreeMap<String, Section>,
    lookup: BTreeMap<String, (String, String)>,
    strict: bool,
    sources: Vec<PathBuf>,
}

impl Config {
    /// Names a section may not take: the tree's own operations.
    pub const RESERVED: &'static [&'static str] = &[
        "new",
        "strict",
        "builder",
        "read",
        "read_file",
        "load",
        "load_as",
        "set",
        "set_flat",
        "get",
        "get_by_section",
        "contains",
        "contains_key",
        "section",
        "get_section",
        "sections",
        "iter",
        "keys",
        "len",
        "is_empty",
        "remove",
        "update",
        "label",
        "is_strict",
        "sources",
        "apply_env",
        "into_shared",
        "bind_section",
        "is_reserved",
        "to_yaml",
    ];

    /// An empty, non-strict tree: looking up an unknown section creates it.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty strict tree: looking up an unknown section fails.
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    pub fn is_reserved(section: &str) -> bool {
        Self::RESERVED.contains(&section)
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Files successfully read so far, in read order.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Read one path or each of a list in turn. Files that can't be opened
    /// are skipped, so a list of candidate locations can be tried in one
    /// call. Returns the paths that were read. A file that opens but fails to
    /// parse is an error.
    pub fn read(&mut self, paths: impl ConfigPaths) -> Result<Vec<PathBuf>, ParamfigError> {
        let mut read_ok = Vec::new();
        for path in paths.into_paths() {
            if self.read_file(&path)? {
                read_ok.push(path);
            }
        }
        Ok(read_ok)
    }

    /// Read a single file. Returns `false` if it couldn't be opened.
    pub fn read_file(&mut self, path: impl AsRef<Path>) -> Result<bool, ParamfigError> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "skipping unreadable config file");
                return Ok(false);
            }
        };
        self.load_file(path, &content)?;
        Ok(true)
    }

    /// Load the content of `path`, picking the format from its extension, and
    /// record it as a source.
    pub(crate) fn load_file(&mut self, path: &Path, content: &str) -> Result<(), ParamfigError> {
        self.load_as(content, DocumentFormat::from_path(path))?;
        debug!(path = %path.display(), "loaded config file");
        self.sources.push(path.to_path_buf());
        Ok(())
    }

    /// Load a YAML document of `section: {option: value}` mappings.
    pub fn load(&mut self, document: &str) -> Result<(), ParamfigError> {
        self.load_as(document, DocumentFormat::Yaml)
    }

    /// Load a document in the given format. A top level that isn't a mapping,
    /// and section bodies that aren't mappings, are ignored.
    pub fn load_as(&mut self, document: &str, format: DocumentFormat) -> Result<(), ParamfigError> {
        match format {
            DocumentFormat::Yaml => {
                let serde_yaml::Value::Mapping(top) =
                    serde_yaml::from_str::<serde_yaml::Value>(document)?
                else {
                    return Ok(());
                };
                for (section, body) in top {
                    let (Some(section), serde_yaml::Value::Mapping(options)) =
                        (yaml_key(&section), body)
                    else {
                        continue;
                    };
                    for (option, value) in options {
                        if let Some(option) = yaml_key(&option) {
                            self.set(&section, &option, Value::from_yaml(value))?;
                        }
                    }
                }
            }
            DocumentFormat::Toml => {
                let top: toml::Table = toml::from_str(document)?;
                for (section, body) in top {
                    let toml::Value::Table(options) = body else {
                        continue;
                    };
                    for (option, value) in options {
                        self.set(&section, &option, Value::from_toml(value))?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Set an option, creating its section if needed.
    pub fn set(
        &mut self,
        section: &str,
        option: &str,
        value: impl Into<Value>,
    ) -> Result<(), ParamfigError> {
        if Self::is_reserved(section) {
            return Err(ParamfigError::ReservedName {
                name: section.to_string(),
                scope: "Config",
            });
        }
        if Section::is_reserved(option) {
            return Err(ParamfigError::ReservedName {
                name: option.to_string(),
                scope: "Section",
            });
        }
        let key = flat_key(section, option);
        let target = (section.to_string(), option.to_string());
        if let Some(previous) = self.lookup.get(&key)
            && previous != &target
        {
            warn!(
                key = %key,
                previous = %format!("{}.{}", previous.0, previous.1),
                "flat key now refers to a different option"
            );
        }
        self.lookup.insert(key, target);
        self.sections
            .entry(section.to_string())
            .or_insert_with(|| Section::new(section))
            .insert(option.to_string(), value.into());
        Ok(())
    }

    /// Assign through a flat key that is already registered.
    pub fn set_flat(&mut self, key: &str, value: impl Into<Value>) -> Result<(), ParamfigError> {
        let (section, option) = self
            .lookup
            .get(key)
            .cloned()
            .ok_or_else(|| ParamfigError::KeyNotFound(key.to_string()))?;
        self.sections
            .entry(section.clone())
            .or_insert_with(|| Section::new(section))
            .insert(option, value.into());
        Ok(())
    }

    /// Look up a value by flat key.
    pub fn get(&self, key: &str) -> Result<&Value, ParamfigError> {
        let (section, option) = self
            .lookup
            .get(key)
            .ok_or_else(|| ParamfigError::KeyNotFound(key.to_string()))?;
        self.get_by_section(section, option)
    }

    pub fn get_by_section(&self, section: &str, option: &str) -> Result<&Value, ParamfigError> {
        self.sections
            .get(section)
            .ok_or_else(|| ParamfigError::KeyNotFound(flat_key(section, option)))?
            .get(option)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.lookup.contains_key(key)
    }

    /// Access a section for update. In non-strict mode an unknown section is
    /// created empty; in strict mode it is an error.
    pub fn section(&mut self, name: &str) -> Result<&mut Section, ParamfigError> {
        if Self::is_reserved(name) {
            return Err(ParamfigError::ReservedName {
                name: name.to_string(),
                scope: "Config",
            });
        }
        if !self.sections.contains_key(name) {
            if self.strict {
                return Err(ParamfigError::SectionNotFound(name.to_string()));
            }
            debug!(section = name, "creating empty section on access");
            self.sections
                .insert(name.to_string(), Section::new(name));
        }
        self.sections
            .get_mut(name)
            .ok_or_else(|| ParamfigError::SectionNotFound(name.to_string()))
    }

    pub fn get_section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    /// Iterate `(flat_key, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.lookup.iter().filter_map(|(key, (section, option))| {
            let value = self.sections.get(section)?.options().get(option)?;
            Some((key.as_str(), value))
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.lookup.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    /// Options are never removed; this always fails.
    pub fn remove(&mut self, key: &str) -> Result<Value, ParamfigError> {
        Err(ParamfigError::Immutable(key.to_string()))
    }

    /// Render the whole tree as YAML, each section under a comment banner.
    pub fn to_yaml(&self) -> Result<String, ParamfigError> {
        let mut parts = Vec::with_capacity(self.sections.len() * 2);
        for (name, section) in &self.sections {
            parts.push(format!("\n#\n# {}\n#", capitalize(name)));
            parts.push(section.to_yaml()?);
        }
        Ok(parts.join("\n"))
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let yaml = self.to_yaml().map_err(|_| fmt::Error)?;
        write!(f, "{yaml}")
    }
}

pub fn flat_key(section: &str, option: &str) -> String {
    format!("{section}_{option}")
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
