//! String coercion inferred from example values.
//!
//! Environment variables and command-line flags only ever produce strings.
//! The default value a function declares (or the value already stored in a
//! config section) is the one source of truth for the intended type, so the
//! cast for a name is derived from an example rather than declared:
//!
//! | Example        | String input handling                                        |
//! |----------------|--------------------------------------------------------------|
//! | `bool`         | `true/false/yes/no/t/f/y/n/on/off/1/0`, else error           |
//! | `int`, `float` | numeric parse, else error                                    |
//! | list           | shell-style split, elements cast by the first example element |
//! | map            | parsed as a YAML flow mapping, else passed through           |
//! | anything else  | passed through unchanged                                     |
//!
//! Values that are not strings are never touched.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::ParamfigError;
use crate::signature::{Arguments, Callable, Invocation, Signature};
use crate::value::Value;

/// Stand-in for backslashes while shell-splitting, so Windows-style paths
/// survive the POSIX escape rules untouched.
const BACKSLASH_PLACEHOLDER: char = '\u{E000}';

/// The semantic type implied by an example value.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Text,
    /// A list; `None` when the example list was empty and elements stay strings.
    List(Option<Box<ValueKind>>),
    Map,
    /// Opaque passthrough.
    Other,
}

impl ValueKind {
    /// Classify an example value.
    pub fn of(example: &Value) -> ValueKind {
        match example {
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::Text,
            Value::List(items) => {
                ValueKind::List(items.first().map(|v| Box::new(ValueKind::of(v))))
            }
            Value::Map(_) => ValueKind::Map,
            Value::Null => ValueKind::Other,
        }
    }

    /// Cast a string input for `key` into this kind.
    pub fn cast(&self, key: &str, input: &str) -> Result<Value, ParamfigError> {
        let fail = || ParamfigError::Coercion {
            key: key.to_string(),
            value: input.to_string(),
            expected: self.clone(),
        };
        match self {
            ValueKind::Bool => parse_bool(input).map(Value::Bool).ok_or_else(fail),
            ValueKind::Int => input
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| fail()),
            ValueKind::Float => input
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| fail()),
            ValueKind::Text | ValueKind::Other => Ok(Value::String(input.to_string())),
            ValueKind::List(element) => {
                let parts = split_list(input).ok_or_else(fail)?;
                let items = match element {
                    Some(kind) => parts
                        .iter()
                        .map(|part| kind.cast(key, part))
                        .collect::<Result<Vec<_>, _>>()?,
                    None => parts.into_iter().map(Value::String).collect(),
                };
                Ok(Value::List(items))
            }
            ValueKind::Map => Ok(parse_flow_mapping(input)
                .unwrap_or_else(|| Value::String(input.to_string()))),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Bool => write!(f, "bool"),
            ValueKind::Int => write!(f, "int"),
            ValueKind::Float => write!(f, "float"),
            ValueKind::Text => write!(f, "str"),
            ValueKind::List(None) => write!(f, "list"),
            ValueKind::List(Some(element)) => write!(f, "list of {element}"),
            ValueKind::Map => write!(f, "map"),
            ValueKind::Other => write!(f, "value"),
        }
    }
}

/// Parse the tolerant boolean vocabulary, case-insensitively.
pub fn parse_bool(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Some(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Split a string with POSIX shell quoting rules, keeping backslashes literal.
///
/// Returns `None` on unbalanced quotes.
pub fn split_list(input: &str) -> Option<Vec<String>> {
    let guarded = input.replace('\\', &BACKSLASH_PLACEHOLDER.to_string());
    let parts = shlex::split(&guarded)?;
    Some(
        parts
            .into_iter()
            .map(|p| p.replace(BACKSLASH_PLACEHOLDER, "\\"))
            .collect(),
    )
}

fn parse_flow_mapping(input: &str) -> Option<Value> {
    match serde_yaml::from_str::<serde_yaml::Value>(input).ok()? {
        mapping @ serde_yaml::Value::Mapping(_) => Some(Value::from_yaml(mapping)),
        _ => None,
    }
}

/// Per-name casts built from a model of example values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Coercer {
    kinds: BTreeMap<String, ValueKind>,
}

impl Coercer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build casts for every non-string example in `model`.
    pub fn from_model<'a, K, I>(model: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, &'a Value)>,
    {
        let mut coercer = Self::new();
        for (name, example) in model {
            coercer.learn(name, example);
        }
        coercer
    }

    /// Record `example` as the model for `name`, replacing any earlier one.
    /// String examples carry no type information and are ignored.
    pub fn learn(&mut self, name: impl Into<String>, example: &Value) {
        if !example.is_string() {
            self.kinds.insert(name.into(), ValueKind::of(example));
        }
    }

    pub fn kind(&self, name: &str) -> Option<&ValueKind> {
        self.kinds.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Cast `value` if it is a string and `name` has a model; otherwise return it
    /// untouched.
    pub fn cast(&self, name: &str, value: Value) -> Result<Value, ParamfigError> {
        match (&value, self.kinds.get(name)) {
            (Value::String(s), Some(kind)) => kind.cast(name, s),
            _ => Ok(value),
        }
    }

    /// Cast supplied arguments, naming positional ones by `signature`.
    /// Positional values past the declared parameters belong to a variadic
    /// and are left alone.
    pub fn cast_arguments(
        &self,
        signature: &Signature,
        arguments: Arguments,
    ) -> Result<Arguments, ParamfigError> {
        let names: Vec<&str> = signature
            .positional_params()
            .map(|p| p.name.as_str())
            .collect();
        let mut positional = Vec::with_capacity(arguments.positional.len());
        for (i, value) in arguments.positional.into_iter().enumerate() {
            positional.push(match names.get(i) {
                Some(name) => self.cast(name, value)?,
                None => value,
            });
        }
        let mut keywords = Vec::with_capacity(arguments.keywords.len());
        for (name, value) in arguments.keywords {
            let value = self.cast(&name, value)?;
            keywords.push((name, value));
        }
        Ok(Arguments {
            positional,
            keywords,
        })
    }
}

/// A callable whose string arguments are cast before dispatch.
///
/// The model is the callable's own non-string defaults, overlaid by an
/// optional extra model. With `provide_defaults` on (the default), model
/// values also stand in for parameters the caller omits, and show up as
/// defaults in the signature of parameters that declare none. Nothing is
/// written back anywhere; see [`Binder`](crate::Binder) for that.
pub struct Coercing<C> {
    inner: C,
    coercer: Coercer,
    model: BTreeMap<String, Value>,
    provide_defaults: bool,
}

impl<C: Callable> Coercing<C> {
    pub fn new(inner: C) -> Self {
        let mut coercer = Coercer::new();
        for param in inner.signature().params() {
            if let Some(default) = &param.default {
                coercer.learn(param.name.clone(), default);
            }
        }
        Self {
            inner,
            coercer,
            model: BTreeMap::new(),
            provide_defaults: true,
        }
    }

    /// Overlay extra examples; they win over the callable's defaults.
    pub fn with_model<K, V, I>(mut self, model: I) -> Self
    where
        K: Into<String>,
        V: Borrow<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (name, example) in model {
            let name = name.into();
            let example = example.borrow();
            self.coercer.learn(name.clone(), example);
            self.model.insert(name, example.clone());
        }
        self
    }

    /// Whether model values fill omitted parameters. On by default.
    pub fn provide_defaults(mut self, on: bool) -> Self {
        self.provide_defaults = on;
        self
    }

    pub fn coercer(&self) -> &Coercer {
        &self.coercer
    }

    fn with_model_defaults(&self, signature: Signature) -> Signature {
        if !self.provide_defaults || self.model.is_empty() {
            return signature;
        }
        let params = signature
            .params()
            .iter()
            .cloned()
            .map(|mut param| {
                if !param.is_variadic() && param.default.is_none() {
                    param.default = self.model.get(&param.name).cloned();
                }
                param
            })
            .collect();
        Signature::from_params_unchecked(params)
    }
}

impl<C: Callable> Callable for Coercing<C> {
    type Output = C::Output;

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn signature(&self) -> Signature {
        self.with_model_defaults(self.inner.signature())
    }

    fn call_signature(&self) -> Signature {
        self.with_model_defaults(self.inner.call_signature())
    }

    fn call(&self, arguments: Arguments) -> Result<Self::Output, ParamfigError> {
        let declared = self.inner.call_signature();
        let arguments = self.coercer.cast_arguments(&declared, arguments)?;
        if !self.provide_defaults || self.model.is_empty() {
            return self.inner.call(arguments);
        }

        let mut bound = self.with_model_defaults(declared.clone()).bind(arguments)?;
        let mut invocation = Invocation::default();
        for param in declared.declared() {
            let value = bound
                .arguments
                .remove(&param.name)
                .or_else(|| self.model.get(&param.name).cloned())
                .or_else(|| param.default.clone())
                .ok_or_else(|| ParamfigError::MissingArgument(param.name.clone()))?;
            invocation.values.push((param.name.clone(), value));
        }
        invocation.args = bound.extra_positional;
        invocation.kwargs = bound.extra_keywords;
        self.inner.call(invocation.into_arguments(&declared))
    }
}
