//! Small shared enums: where to look for files, how to parse them, and how a
//! binder treats keywords and write-back order.

use std::path::{Path, PathBuf};

/// Where to search for config files.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchPath {
    /// Platform config directory (XDG on Linux, ~/Library/Application Support on macOS).
    Platform,
    /// A subdirectory under the user's home directory, e.g. `Home(".myapp")`.
    Home(&'static str),
    /// Current working directory.
    Cwd,
    /// An explicit path.
    Path(PathBuf),
}

/// One config file path or a list of them, as accepted by
/// [`Config::read`](crate::Config::read). A single path is never split into
/// its components.
pub trait ConfigPaths {
    fn into_paths(self) -> Vec<PathBuf>;
}

impl ConfigPaths for &Path {
    fn into_paths(self) -> Vec<PathBuf> {
        vec![self.to_path_buf()]
    }
}

impl ConfigPaths for PathBuf {
    fn into_paths(self) -> Vec<PathBuf> {
        vec![self]
    }
}

impl ConfigPaths for &PathBuf {
    fn into_paths(self) -> Vec<PathBuf> {
        vec![self.clone()]
    }
}

impl ConfigPaths for &str {
    fn into_paths(self) -> Vec<PathBuf> {
        vec![PathBuf::from(self)]
    }
}

impl ConfigPaths for String {
    fn into_paths(self) -> Vec<PathBuf> {
        vec![PathBuf::from(self)]
    }
}

impl<P: AsRef<Path>> ConfigPaths for Vec<P> {
    fn into_paths(self) -> Vec<PathBuf> {
        self.iter().map(|p| p.as_ref().to_path_buf()).collect()
    }
}

impl<P: AsRef<Path>> ConfigPaths for &[P] {
    fn into_paths(self) -> Vec<PathBuf> {
        self.iter().map(|p| p.as_ref().to_path_buf()).collect()
    }
}

impl<P: AsRef<Path>, const N: usize> ConfigPaths for [P; N] {
    fn into_paths(self) -> Vec<PathBuf> {
        self.iter().map(|p| p.as_ref().to_path_buf()).collect()
    }
}

/// Document syntax of a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFormat {
    #[default]
    Yaml,
    Toml,
}

impl DocumentFormat {
    /// `.toml` files are TOML; everything else is treated as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => DocumentFormat::Toml,
            _ => DocumentFormat::Yaml,
        }
    }
}

/// What a bound function does with a caller keyword it neither declares nor
/// finds in its default sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeywordPolicy {
    /// Drop it silently (unless the function takes `**kwargs`).
    #[default]
    Discard,
    /// Fail with [`SignatureMismatch`](crate::ParamfigError::SignatureMismatch),
    /// even when the function takes `**kwargs`.
    Reject,
}

/// Order in which a layered binder writes call values back to its sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateOrder {
    /// Innermost (first added) source first.
    #[default]
    InnerFirst,
    OuterFirst,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(DocumentFormat::from_path(Path::new("a.toml")), DocumentFormat::Toml);
        assert_eq!(DocumentFormat::from_path(Path::new("a.TOML")), DocumentFormat::Toml);
        assert_eq!(DocumentFormat::from_path(Path::new("a.yaml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("a.conf")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("noext")), DocumentFormat::Yaml);
    }

    #[test]
    fn single_path_stays_whole() {
        let path = Path::new("/etc/app/app.yaml");
        assert_eq!(path.into_paths(), vec![PathBuf::from("/etc/app/app.yaml")]);
        assert_eq!("app.yaml".into_paths(), vec![PathBuf::from("app.yaml")]);
        assert_eq!(
            ["a.yaml", "b.toml"].into_paths(),
            vec![PathBuf::from("a.yaml"), PathBuf::from("b.toml")]
        );
    }
}
