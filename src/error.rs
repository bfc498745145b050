use std::path::PathBuf;
use thiserror::Error;

use crate::coerce::ValueKind;

#[derive(Debug, Error)]
pub enum ParamfigError {
    #[error("'{name}' is a reserved {scope} word")]
    ReservedName { name: String, scope: &'static str },

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Config has no section '{0}'")]
    SectionNotFound(String),

    #[error("Can not convert {key}='{value}' to {expected}")]
    Coercion {
        key: String,
        value: String,
        expected: ValueKind,
    },

    #[error("Unexpected keyword argument '{keyword}' for {callable}")]
    SignatureMismatch { keyword: String, callable: String },

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Missing required argument '{0}'")]
    MissingArgument(String),

    #[error("Too many positional arguments: expected at most {expected}, got {given}")]
    TooManyPositional { expected: usize, given: usize },

    #[error("Multiple values for argument '{0}'")]
    DuplicateArgument(String),

    #[error("Configuration can only be updated or added, not removed ('{0}')")]
    Immutable(String),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("App name is required: call .app_name() on the builder")]
    AppNameRequired,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_name_formats_correctly() {
        let err = ParamfigError::ReservedName {
            name: "set".into(),
            scope: "Config",
        };
        let msg = err.to_string();
        assert!(msg.contains("set"));
        assert!(msg.contains("Config"));
    }

    #[test]
    fn coercion_formats_key_value_and_kind() {
        let err = ParamfigError::Coercion {
            key: "port".into(),
            value: "abc".into(),
            expected: ValueKind::Int,
        };
        assert_eq!(err.to_string(), "Can not convert port='abc' to int");
    }

    #[test]
    fn key_not_found_formats() {
        let err = ParamfigError::KeyNotFound("web_port".into());
        assert!(err.to_string().contains("web_port"));
    }

    #[test]
    fn app_name_required_formats() {
        let err = ParamfigError::AppNameRequired;
        assert!(err.to_string().contains("app_name"));
    }
}
