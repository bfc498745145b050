//! One named group of `option: value` pairs.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::ParamfigError;
use crate::value::Value;

/// A configuration section.
///
/// Sections are owned by a [`Config`](crate::Config); new options enter through
/// [`Config::set`](crate::Config::set) so the flat-key index stays complete.
/// Existing options can be reassigned in place with [`replace`](Self::replace).
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    name: String,
    options: BTreeMap<String, Value>,
    dirty: bool,
}

impl Section {
    /// Names an option may not take: the section's own operations.
    pub const RESERVED: &'static [&'static str] = &[
        "new",
        "name",
        "get",
        "contains",
        "options",
        "iter",
        "keys",
        "len",
        "is_empty",
        "replace",
        "remove",
        "update",
        "label",
        "dirty",
        "is_reserved",
        "to_yaml",
    ];

    /// A detached, empty section. It starts out dirty.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: BTreeMap::new(),
            dirty: true,
        }
    }

    pub fn is_reserved(option: &str) -> bool {
        Self::RESERVED.contains(&option)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, option: &str) -> Result<&Value, ParamfigError> {
        self.options
            .get(option)
            .ok_or_else(|| ParamfigError::KeyNotFound(format!("{option} (section {})", self.name)))
    }

    pub fn contains(&self, option: &str) -> bool {
        self.options.contains_key(option)
    }

    pub fn options(&self) -> &BTreeMap<String, Value> {
        &self.options
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Reassign an option that already exists.
    pub fn replace(&mut self, option: &str, value: impl Into<Value>) -> Result<(), ParamfigError> {
        match self.options.get_mut(option) {
            Some(slot) => {
                *slot = value.into();
                self.dirty = true;
                Ok(())
            }
            None => Err(ParamfigError::KeyNotFound(format!(
                "{option} (section {})",
                self.name
            ))),
        }
    }

    /// Options are never removed; this always fails.
    pub fn remove(&mut self, option: &str) -> Result<Value, ParamfigError> {
        Err(ParamfigError::Immutable(format!("{}.{option}", self.name)))
    }

    /// Whether anything changed since the last call. Reading clears the flag.
    pub fn dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    /// Render as a one-section YAML document.
    pub fn to_yaml(&self) -> Result<String, ParamfigError> {
        let mut doc = BTreeMap::new();
        doc.insert(self.name.as_str(), &self.options);
        Ok(serde_yaml::to_string(&doc)?)
    }

    pub(crate) fn insert(&mut self, option: String, value: Value) {
        self.options.insert(option, value);
        self.dirty = true;
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let yaml = self.to_yaml().map_err(|_| fmt::Error)?;
        write!(f, "{yaml}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bread() -> Section {
        let mut section = Section::new("bread");
        section.insert("butter".into(), "win".into());
        section.insert("milk".into(), "fail".into());
        section
    }

    #[test]
    fn dirty_latches_and_resets() {
        let mut section = bread();
        assert!(section.dirty());
        assert!(!section.dirty());
        section.replace("milk", "win").unwrap();
        assert!(section.dirty());
        assert!(!section.dirty());
    }

    #[test]
    fn replace_requires_existing_option() {
        let mut section = bread();
        assert!(matches!(
            section.replace("jam", 1),
            Err(ParamfigError::KeyNotFound(_))
        ));
        assert!(!section.contains("jam"));
    }

    #[test]
    fn get_missing_option_fails() {
        let section = bread();
        assert_eq!(section.get("butter").unwrap(), &Value::from("win"));
        assert!(section.get("nope").is_err());
    }

    #[test]
    fn remove_always_fails() {
        let mut section = bread();
        assert!(matches!(
            section.remove("milk"),
            Err(ParamfigError::Immutable(_))
        ));
        assert_eq!(section.len(), 2);
    }

    #[test]
    fn renders_yaml() {
        let out = bread().to_string();
        assert_eq!(out, "bread:\n  butter: win\n  milk: fail\n");
    }

    #[test]
    fn reserved_names_cover_operations() {
        assert!(Section::is_reserved("dirty"));
        assert!(Section::is_reserved("get"));
        assert!(!Section::is_reserved("host"));
    }
}
