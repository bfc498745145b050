//! Default sources: the mutable mappings a bound function reads its defaults
//! from and writes its call values back to.
//!
//! Sources are shared through `Rc<RefCell<_>>` handles. Configuration state is
//! process-wide with a single logical owner, and a non-`Send` handle keeps it
//! that way. A binder borrows a source only while reading or applying one
//! call's updates, never across the dispatch into the wrapped function.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::config::Config;
use crate::error::ParamfigError;
use crate::section::Section;
use crate::value::Value;

/// A mutable `name -> value` mapping that can back a binder.
pub trait DefaultSource {
    fn get(&self, key: &str) -> Option<Value>;

    fn keys(&self) -> Vec<String>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Apply every update or none of them.
    fn update(&mut self, updates: &[(String, Value)]) -> Result<(), ParamfigError>;

    /// Short description for log lines.
    fn label(&self) -> String;
}

pub type SharedSource = Rc<RefCell<dyn DefaultSource>>;

pub type SharedConfig = Rc<RefCell<Config>>;

/// Wrap a source in a shared handle.
pub fn shared<S: DefaultSource>(source: S) -> Rc<RefCell<S>> {
    Rc::new(RefCell::new(source))
}

impl Config {
    pub fn into_shared(self) -> SharedConfig {
        Rc::new(RefCell::new(self))
    }
}

impl DefaultSource for BTreeMap<String, Value> {
    fn get(&self, key: &str) -> Option<Value> {
        BTreeMap::get(self, key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        BTreeMap::keys(self).cloned().collect()
    }

    fn update(&mut self, updates: &[(String, Value)]) -> Result<(), ParamfigError> {
        for (key, value) in updates {
            self.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    fn label(&self) -> String {
        "mapping".to_string()
    }
}

/// A detached section. Updates may add options.
impl DefaultSource for Section {
    fn get(&self, key: &str) -> Option<Value> {
        self.options().get(key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.options().keys().cloned().collect()
    }

    fn update(&mut self, updates: &[(String, Value)]) -> Result<(), ParamfigError> {
        for (key, value) in updates {
            self.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    fn label(&self) -> String {
        format!("section {}", self.name())
    }
}

/// The whole tree, addressed by flat key.
impl DefaultSource for Config {
    fn get(&self, key: &str) -> Option<Value> {
        Config::get(self, key).ok().cloned()
    }

    fn keys(&self) -> Vec<String> {
        Config::keys(self).map(str::to_string).collect()
    }

    fn update(&mut self, updates: &[(String, Value)]) -> Result<(), ParamfigError> {
        if let Some((missing, _)) = updates.iter().find(|(k, _)| !self.contains_key(k)) {
            return Err(ParamfigError::KeyNotFound(missing.clone()));
        }
        for (key, value) in updates {
            self.set_flat(key, value.clone())?;
        }
        Ok(())
    }

    fn label(&self) -> String {
        "config".to_string()
    }
}

/// One section of a shared tree, used as a default source.
///
/// Call-time writes land in the tree itself, so every other view of the tree
/// (flat keys, rendering, dirty flags) sees them.
#[derive(Debug, Clone)]
pub struct SectionSource {
    tree: SharedConfig,
    section: String,
}

impl SectionSource {
    /// Resolve `section` in `tree`. A non-strict tree creates it on demand;
    /// a strict tree fails for an unknown section.
    pub fn new(tree: &SharedConfig, section: &str) -> Result<Self, ParamfigError> {
        tree.borrow_mut().section(section)?;
        Ok(Self {
            tree: Rc::clone(tree),
            section: section.to_string(),
        })
    }

    pub fn section_name(&self) -> &str {
        &self.section
    }
}

impl DefaultSource for SectionSource {
    fn get(&self, key: &str) -> Option<Value> {
        self.tree
            .borrow()
            .get_by_section(&self.section, key)
            .ok()
            .cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.tree
            .borrow()
            .get_section(&self.section)
            .map(|s| s.options().keys().cloned().collect())
            .unwrap_or_default()
    }

    fn update(&mut self, updates: &[(String, Value)]) -> Result<(), ParamfigError> {
        let mut tree = self.tree.borrow_mut();
        let section = tree.section(&self.section)?;
        if let Some((missing, _)) = updates.iter().find(|(k, _)| !section.contains(k)) {
            return Err(ParamfigError::KeyNotFound(format!(
                "{missing} (section {})",
                self.section
            )));
        }
        for (key, value) in updates {
            section.replace(key, value.clone())?;
        }
        Ok(())
    }

    fn label(&self) -> String {
        format!("section {}", self.section)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_source_inserts() {
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), Value::Int(1));
        map.update(&[("a".into(), Value::Int(2)), ("b".into(), Value::Int(3))])
            .unwrap();
        assert_eq!(DefaultSource::get(&map, "a"), Some(Value::Int(2)));
        assert_eq!(DefaultSource::keys(&map), vec!["a", "b"]);
    }

    #[test]
    fn config_source_uses_flat_keys() {
        let mut config = Config::new();
        config.set("web", "port", 80).unwrap();
        assert_eq!(DefaultSource::get(&config, "web_port"), Some(Value::Int(80)));
        config.update(&[("web_port".into(), Value::Int(81))]).unwrap();
        assert_eq!(Config::get(&config, "web_port").unwrap(), &Value::Int(81));
    }

    #[test]
    fn config_source_update_is_all_or_nothing() {
        let mut config = Config::new();
        config.set("web", "port", 80).unwrap();
        let err = config
            .update(&[("web_port".into(), Value::Int(1)), ("nope".into(), Value::Int(2))])
            .unwrap_err();
        assert!(matches!(err, ParamfigError::KeyNotFound(_)));
        assert_eq!(Config::get(&config, "web_port").unwrap(), &Value::Int(80));
    }

    #[test]
    fn section_source_writes_into_tree() {
        let mut config = Config::new();
        config.set("web", "port", 80).unwrap();
        let tree = config.into_shared();
        let mut source = SectionSource::new(&tree, "web").unwrap();
        assert_eq!(source.keys(), vec!["port"]);
        source.update(&[("port".into(), Value::Int(90))]).unwrap();
        assert_eq!(tree.borrow().get("web_port").unwrap(), &Value::Int(90));
    }

    #[test]
    fn section_source_respects_strictness() {
        let tree = Config::strict().into_shared();
        assert!(matches!(
            SectionSource::new(&tree, "web"),
            Err(ParamfigError::SectionNotFound(_))
        ));
        let lenient = Config::new().into_shared();
        let source = SectionSource::new(&lenient, "web").unwrap();
        assert!(source.keys().is_empty());
        assert!(lenient.borrow().get_section("web").is_some());
    }
}
