use tracing::debug;

use crate::coerce::ValueKind;
use crate::config::Config;
use crate::error::ParamfigError;
use crate::value::Value;

impl Config {
    /// Overlay environment variables of the form `{PREFIX}__{SECTION}__{OPTION}`.
    ///
    /// Double underscore `__` separates section from option.
    /// Single `_` within a segment is literal (part of the name).
    /// Segments are lowercased.
    ///
    /// An option that already exists is cast by its current value's kind, so a
    /// bad value fails the same way a bad call argument would. A new option is
    /// parsed heuristically: bool > integer > float > string.
    ///
    /// Takes an iterator so tests can pass synthetic data instead of
    /// `std::env::vars()`. Returns how many variables were applied.
    pub fn apply_env(
        &mut self,
        prefix: &str,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<usize, ParamfigError> {
        let needle = format!("{prefix}__");
        let mut applied = 0;

        for (key, raw) in vars {
            let Some(rest) = key.strip_prefix(&needle) else {
                continue;
            };
            let segments: Vec<&str> = rest.split("__").collect();
            let [section, option] = segments.as_slice() else {
                debug!(var = %key, "ignoring env var without SECTION__OPTION shape");
                continue;
            };
            if section.is_empty() || option.is_empty() {
                continue;
            }
            let (section, option) = (section.to_lowercase(), option.to_lowercase());

            let value = match self.get_by_section(&section, &option) {
                Ok(current) => ValueKind::of(current).cast(&key, &raw)?,
                Err(_) => parse_env_value(&raw),
            };
            debug!(var = %key, section = %section, option = %option, "applying env override");
            self.set(&section, &option, value)?;
            applied += 1;
        }

        Ok(applied)
    }
}

/// Parse an env var value for an option with no existing value.
/// Tries: bool → integer → float → string.
fn parse_env_value(s: &str) -> Value {
    if s.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        // Only use float if the string actually contains a dot,
        // to avoid "NaN" / "inf" being parsed as float.
        if s.contains('.') {
            return Value::Float(f);
        }
    }
    Value::String(s.to_string())
}
