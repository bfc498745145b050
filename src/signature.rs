//! Declarative parameter descriptors and argument binding.
//!
//! Rust has no runtime signature introspection, so a callable states its
//! parameter list up front as a [`Signature`]. Binding caller [`Arguments`]
//! against it follows ordinary call semantics: positional values fill
//! positional parameters in order, keywords match by name, overflow lands in
//! the variadic parameters, and anything left over is an error.
//!
//! [`Function`] is the raw callable built from a closure. It is the lowest
//! layer: it fills declared defaults, rejects keywords it does not know, and
//! hands the closure a fully resolved [`Invocation`].

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::error::ParamfigError;
use crate::value::Value;

/// How a parameter accepts its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ParamKind {
    PositionalOnly,
    PositionalOrKeyword,
    VarPositional,
    KeywordOnly,
    VarKeyword,
}

impl ParamKind {
    pub fn is_variadic(self) -> bool {
        matches!(self, ParamKind::VarPositional | ParamKind::VarKeyword)
    }

    pub fn accepts_positional(self) -> bool {
        matches!(
            self,
            ParamKind::PositionalOnly | ParamKind::PositionalOrKeyword
        )
    }

    pub fn accepts_keyword(self) -> bool {
        matches!(
            self,
            ParamKind::PositionalOrKeyword | ParamKind::KeywordOnly
        )
    }
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub kind: ParamKind,
    pub default: Option<Value>,
}

impl Param {
    pub fn new(name: impl Into<String>, kind: ParamKind, default: Option<Value>) -> Self {
        Self {
            name: name.into(),
            kind,
            default,
        }
    }

    /// A positional-or-keyword parameter without a default.
    pub fn required(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::PositionalOrKeyword, None)
    }

    /// A positional-or-keyword parameter with a default.
    pub fn with_default(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Self::new(name, ParamKind::PositionalOrKeyword, Some(default.into()))
    }

    pub fn positional_only(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::PositionalOnly, None)
    }

    pub fn keyword_only(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Self::new(name, ParamKind::KeywordOnly, Some(default.into()))
    }

    /// `*name`
    pub fn var_positional(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::VarPositional, None)
    }

    /// `**name`
    pub fn var_keyword(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::VarKeyword, None)
    }

    pub fn is_variadic(&self) -> bool {
        self.kind.is_variadic()
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ParamKind::VarPositional => write!(f, "*{}", self.name),
            ParamKind::VarKeyword => write!(f, "**{}", self.name),
            _ => match &self.default {
                Some(Value::String(s)) => write!(f, "{}={s:?}", self.name),
                Some(default) => write!(f, "{}={default}", self.name),
                None => write!(f, "{}", self.name),
            },
        }
    }
}

/// An ordered parameter list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signature {
    params: Vec<Param>,
}

impl Signature {
    /// Build a signature, validating the usual ordering rules: kinds appear in
    /// `positional-only, positional-or-keyword, *args, keyword-only, **kwargs`
    /// order, names are unique, and a positional parameter without a default
    /// never follows one with a default.
    pub fn new(params: Vec<Param>) -> Result<Self, ParamfigError> {
        let mut seen = HashSet::new();
        let mut saw_default = false;
        for (i, param) in params.iter().enumerate() {
            if !seen.insert(param.name.as_str()) {
                return Err(ParamfigError::InvalidSignature(format!(
                    "duplicate parameter '{}'",
                    param.name
                )));
            }
            if i > 0 && params[i - 1].kind > param.kind {
                return Err(ParamfigError::InvalidSignature(format!(
                    "parameter '{}' is out of order",
                    param.name
                )));
            }
            if i > 0 && param.is_variadic() && params[i - 1].kind == param.kind {
                return Err(ParamfigError::InvalidSignature(format!(
                    "more than one {:?} parameter",
                    param.kind
                )));
            }
            if param.kind.accepts_positional() {
                if param.default.is_some() {
                    saw_default = true;
                } else if saw_default {
                    return Err(ParamfigError::InvalidSignature(format!(
                        "non-default parameter '{}' follows default parameter",
                        param.name
                    )));
                }
            }
        }
        Ok(Self { params })
    }

    /// Skip the default-ordering rule. Widened signatures draw defaults from
    /// config sources and may legitimately leave a gap.
    pub(crate) fn from_params_unchecked(params: Vec<Param>) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Parameters that can receive positional values, in order.
    pub fn positional_params(&self) -> impl Iterator<Item = &Param> {
        self.params.iter().filter(|p| p.kind.accepts_positional())
    }

    /// All non-variadic parameters, in order.
    pub fn declared(&self) -> impl Iterator<Item = &Param> {
        self.params.iter().filter(|p| !p.is_variadic())
    }

    pub fn var_positional(&self) -> Option<&Param> {
        self.params
            .iter()
            .find(|p| p.kind == ParamKind::VarPositional)
    }

    pub fn var_keyword(&self) -> Option<&Param> {
        self.params.iter().find(|p| p.kind == ParamKind::VarKeyword)
    }

    /// True if `name` is a non-variadic parameter.
    pub fn declares(&self, name: &str) -> bool {
        self.declared().any(|p| p.name == name)
    }

    /// Bind caller arguments the way a call would, recording only what the
    /// caller actually supplied.
    pub fn bind(&self, arguments: Arguments) -> Result<BoundArguments, ParamfigError> {
        let mut bound = BoundArguments::default();

        let positional: Vec<&Param> = self.positional_params().collect();
        let given = arguments.positional.len();
        for (i, value) in arguments.positional.into_iter().enumerate() {
            match positional.get(i) {
                Some(param) => {
                    bound.arguments.insert(param.name.clone(), value);
                }
                None if self.var_positional().is_some() => bound.extra_positional.push(value),
                None => {
                    return Err(ParamfigError::TooManyPositional {
                        expected: positional.len(),
                        given,
                    });
                }
            }
        }

        for (name, value) in arguments.keywords {
            let target = self
                .param(&name)
                .filter(|p| p.kind.accepts_keyword());
            if target.is_some() {
                if bound.arguments.contains_key(&name) {
                    return Err(ParamfigError::DuplicateArgument(name));
                }
                bound.arguments.insert(name, value);
            } else if self.var_keyword().is_some() {
                if bound.extra_keywords.contains_key(&name) {
                    return Err(ParamfigError::DuplicateArgument(name));
                }
                bound.extra_keywords.insert(name, value);
            } else {
                return Err(ParamfigError::SignatureMismatch {
                    keyword: name,
                    callable: self.to_string(),
                });
            }
        }

        for param in self.declared() {
            if param.default.is_none() && !bound.arguments.contains_key(&param.name) {
                return Err(ParamfigError::MissingArgument(param.name.clone()));
            }
        }

        Ok(bound)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        let mut star_written = false;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if param.kind == ParamKind::KeywordOnly
                && !star_written
                && self.var_positional().is_none()
            {
                write!(f, "*, ")?;
                star_written = true;
            }
            write!(f, "{param}")?;
        }
        write!(f, ")")
    }
}

/// Arguments as a caller supplies them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    pub positional: Vec<Value>,
    pub keywords: Vec<(String, Value)>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keywords.push((name.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keywords.is_empty()
    }
}

/// The explicitly supplied arguments after binding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArguments {
    /// Values for named (non-variadic) parameters.
    pub arguments: BTreeMap<String, Value>,
    /// Positional overflow destined for `*args`.
    pub extra_positional: Vec<Value>,
    /// Keyword overflow destined for `**kwargs`.
    pub extra_keywords: BTreeMap<String, Value>,
}

/// Fully resolved arguments handed to a closure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Invocation {
    /// Declared parameters in signature order.
    pub values: Vec<(String, Value)>,
    pub args: Vec<Value>,
    pub kwargs: BTreeMap<String, Value>,
}

impl Invocation {
    /// Look up a declared parameter, then the keyword overflow.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
            .or_else(|| self.kwargs.get(name))
    }

    /// Re-express as caller arguments for `signature`: positional-capable
    /// parameters go positionally so `*args` can follow them.
    pub fn into_arguments(self, signature: &Signature) -> Arguments {
        let mut arguments = Arguments::new();
        for (name, value) in self.values {
            let positional = signature
                .param(&name)
                .is_some_and(|p| p.kind.accepts_positional());
            if positional {
                arguments.positional.push(value);
            } else {
                arguments.keywords.push((name, value));
            }
        }
        arguments.positional.extend(self.args);
        arguments.keywords.extend(self.kwargs);
        arguments
    }
}

/// Anything that can be called with [`Arguments`] and describes itself with
/// a [`Signature`].
pub trait Callable {
    type Output;

    fn name(&self) -> &str;

    /// The signature callers see. Wrappers may compute it on the fly.
    fn signature(&self) -> Signature;

    /// The signature `call` actually accepts. Differs from [`signature`](Self::signature)
    /// only when a wrapper hides variadic parameters that still work.
    fn call_signature(&self) -> Signature {
        self.signature()
    }

    fn call(&self, arguments: Arguments) -> Result<Self::Output, ParamfigError>;
}

impl<C: Callable + ?Sized> Callable for Box<C> {
    type Output = C::Output;

    fn name(&self) -> &str {
        (**self).name()
    }

    fn signature(&self) -> Signature {
        (**self).signature()
    }

    fn call_signature(&self) -> Signature {
        (**self).call_signature()
    }

    fn call(&self, arguments: Arguments) -> Result<Self::Output, ParamfigError> {
        (**self).call(arguments)
    }
}

/// A closure with a declared signature.
pub struct Function<F> {
    name: String,
    signature: Signature,
    func: F,
}

impl<F, R> Function<F>
where
    F: Fn(&Invocation) -> Result<R, ParamfigError>,
{
    pub fn new(name: impl Into<String>, signature: Signature, func: F) -> Self {
        Self {
            name: name.into(),
            signature,
            func,
        }
    }
}

impl<F, R> Callable for Function<F>
where
    F: Fn(&Invocation) -> Result<R, ParamfigError>,
{
    type Output = R;

    fn name(&self) -> &str {
        &self.name
    }

    fn signature(&self) -> Signature {
        self.signature.clone()
    }

    fn call(&self, arguments: Arguments) -> Result<R, ParamfigError> {
        let mut bound = self.signature.bind(arguments).map_err(|e| match e {
            ParamfigError::SignatureMismatch { keyword, .. } => ParamfigError::SignatureMismatch {
                keyword,
                callable: self.name.clone(),
            },
            other => other,
        })?;
        let mut invocation = Invocation {
            args: bound.extra_positional,
            kwargs: bound.extra_keywords,
            ..Invocation::default()
        };
        for param in self.signature.declared() {
            let value = match bound.arguments.remove(&param.name) {
                Some(v) => v,
                None => param
                    .default
                    .clone()
                    .ok_or_else(|| ParamfigError::MissingArgument(param.name.clone()))?,
            };
            invocation.values.push((param.name.clone(), value));
        }
        (self.func)(&invocation)
    }
}
