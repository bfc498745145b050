//! Binding default sources to callables.
//!
//! A [`Bound`] callable keeps its original calling convention, but its
//! defaults come from one or more [`DefaultSource`]s and every call writes the
//! values it actually used back into them. Per call:
//!
//! 1. Caller keywords the callable can't place are rejected or dropped,
//!    depending on the [`KeywordPolicy`].
//! 2. String inputs are cast by example (see [`coerce`](crate::coerce)):
//!    source values first, the callable's own defaults second.
//! 3. Arguments are bound against the *widened* signature: declared
//!    parameters with source-backed defaults, plus every source-only key as a
//!    keyword-only parameter.
//! 4. Each declared parameter takes the caller's value, else the source value,
//!    else its own default. Caller and source values are scheduled for
//!    write-back.
//! 5. All scheduled updates are applied, source by source in
//!    [`UpdateOrder`], before dispatch.
//! 6. A callable taking `**kwargs` receives every source key it doesn't
//!    declare; any other callable receives only its declared parameters.
//! 7. The wrapped callable runs.
//!
//! Sources listed on one binder layer inner to outer: outer values win when
//! filling defaults. A `Bound` is itself [`Callable`], so binders also stack.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::coerce::Coercer;
use crate::config::Config;
use crate::error::ParamfigError;
use crate::signature::{Arguments, Callable, Invocation, Param, ParamKind, Signature};
use crate::source::{DefaultSource, SectionSource, SharedConfig, SharedSource};
use crate::types::{KeywordPolicy, UpdateOrder};
use crate::value::Value;

/// Settings for binding default sources to a callable.
pub struct Binder {
    sources: Vec<SharedSource>,
    lazy: bool,
    policy: KeywordPolicy,
    order: UpdateOrder,
    hide_var_positional: bool,
    hide_var_keyword: bool,
    strict: bool,
}

impl Binder {
    /// Bind against a single source, casting string inputs and dropping
    /// unknown keywords.
    pub fn new(source: SharedSource) -> Self {
        Self::layered(vec![source])
    }

    /// The strict variant: only for `**kwargs`-style callables (no `*args`,
    /// every declared parameter defaulted), and any keyword that is neither
    /// declared nor a source key fails.
    pub fn strict(source: SharedSource) -> Self {
        Self {
            policy: KeywordPolicy::Reject,
            strict: true,
            ..Self::new(source)
        }
    }

    /// Bind against several sources, listed inner to outer.
    pub fn layered(sources: Vec<SharedSource>) -> Self {
        Self {
            sources,
            lazy: true,
            policy: KeywordPolicy::Discard,
            order: UpdateOrder::InnerFirst,
            hide_var_positional: false,
            hide_var_keyword: true,
            strict: false,
        }
    }

    /// Bind against a whole shared tree by flat key.
    pub fn for_config(tree: &SharedConfig) -> Self {
        Self::new(tree.clone())
    }

    /// Bind against one section of a shared tree.
    pub fn for_section(tree: &SharedConfig, section: &str) -> Result<Self, ParamfigError> {
        let source = SectionSource::new(tree, section)?;
        Ok(Self::new(crate::source::shared(source)))
    }

    /// Add a source outside the existing ones.
    pub fn add_source(mut self, source: SharedSource) -> Self {
        self.sources.push(source);
        self
    }

    /// Turn string coercion on or off (default on).
    pub fn lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }

    pub fn keyword_policy(mut self, policy: KeywordPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn update_order(mut self, order: UpdateOrder) -> Self {
        self.order = order;
        self
    }

    /// Hide `*args` from the visible signature (default: shown).
    pub fn hide_var_positional(mut self, hide: bool) -> Self {
        self.hide_var_positional = hide;
        self
    }

    /// Hide `**kwargs` from the visible signature (default: hidden).
    pub fn hide_var_keyword(mut self, hide: bool) -> Self {
        self.hide_var_keyword = hide;
        self
    }

    /// Wrap `inner`.
    pub fn bind<C: Callable>(self, inner: C) -> Result<Bound<C>, ParamfigError> {
        if self.strict {
            let signature = inner.call_signature();
            if signature.var_keyword().is_none() {
                return Err(ParamfigError::InvalidSignature(format!(
                    "{} must take **kwargs to be bound strictly",
                    inner.name()
                )));
            }
            if signature.var_positional().is_some() {
                return Err(ParamfigError::InvalidSignature(format!(
                    "{} may not take *args to be bound strictly",
                    inner.name()
                )));
            }
            if let Some(param) = signature.declared().find(|p| p.default.is_none()) {
                return Err(ParamfigError::InvalidSignature(format!(
                    "{} parameter '{}' needs a default to be bound strictly",
                    inner.name(),
                    param.name
                )));
            }
        }
        Ok(Bound {
            inner,
            binder: self,
        })
    }

    /// Current defaults across all sources; outer sources win.
    fn merged(&self) -> BTreeMap<String, Value> {
        let mut merged = BTreeMap::new();
        for source in &self.sources {
            let source = source.borrow();
            for key in source.keys() {
                if let Some(value) = source.get(&key) {
                    merged.insert(key, value);
                }
            }
        }
        merged
    }

    /// Write updates to every source that holds the key.
    fn apply(&self, updates: &[(String, Value)]) -> Result<(), ParamfigError> {
        let ordered: Vec<&SharedSource> = match self.order {
            UpdateOrder::InnerFirst => self.sources.iter().collect(),
            UpdateOrder::OuterFirst => self.sources.iter().rev().collect(),
        };
        for source in ordered {
            let relevant: Vec<(String, Value)> = {
                let source = source.borrow();
                updates
                    .iter()
                    .filter(|(key, _)| source.contains(key))
                    .cloned()
                    .collect()
            };
            if relevant.is_empty() {
                continue;
            }
            let mut source = source.borrow_mut();
            trace!(source = %source.label(), count = relevant.len(), "writing call values back");
            source.update(&relevant)?;
        }
        Ok(())
    }
}

/// The signature a bound callable exposes: declared parameters with
/// source-backed defaults, `*args`, source-only keys as keyword-only
/// parameters, then `**kwargs`.
fn widen(declared: &Signature, merged: &BTreeMap<String, Value>) -> Signature {
    let mut params = Vec::new();
    for param in declared.declared() {
        let default = merged.get(&param.name).cloned().or_else(|| param.default.clone());
        params.push(Param::new(param.name.clone(), param.kind, default));
    }
    // Keyword-only parameters must follow `*args`.
    let split = params
        .iter()
        .position(|p| p.kind == ParamKind::KeywordOnly)
        .unwrap_or(params.len());
    let mut keyword_only = params.split_off(split);
    if let Some(var) = declared.var_positional() {
        params.push(var.clone());
    }
    for (name, value) in merged {
        if !declared.declares(name) {
            keyword_only.push(Param::new(
                name.clone(),
                ParamKind::KeywordOnly,
                Some(value.clone()),
            ));
        }
    }
    params.extend(keyword_only);
    if let Some(var) = declared.var_keyword() {
        params.push(var.clone());
    }
    Signature::from_params_unchecked(params)
}

/// A callable whose defaults are drawn from, and written back to, default
/// sources.
pub struct Bound<C> {
    inner: C,
    binder: Binder,
}

impl<C: Callable> Bound<C> {
    pub fn inner(&self) -> &C {
        &self.inner
    }

    fn coercer(&self, declared: &Signature, merged: &BTreeMap<String, Value>) -> Coercer {
        let mut coercer = Coercer::new();
        for param in declared.declared() {
            if let Some(default) = &param.default {
                coercer.learn(param.name.clone(), default);
            }
        }
        for (name, value) in merged {
            coercer.learn(name.clone(), value);
        }
        coercer
    }

    /// Enforce the keyword policy before binding. Keywords with nowhere to go
    /// are rejected or dropped; with `**kwargs` they pass through under
    /// [`KeywordPolicy::Discard`].
    fn screen_keywords(
        &self,
        declared: &Signature,
        merged: &BTreeMap<String, Value>,
        mut arguments: Arguments,
    ) -> Result<Arguments, ParamfigError> {
        let known = |name: &str| {
            declared
                .param(name)
                .is_some_and(|p| p.kind.accepts_keyword())
                || merged.contains_key(name)
        };
        match self.binder.policy {
            KeywordPolicy::Reject => {
                if let Some((name, _)) = arguments.keywords.iter().find(|(n, _)| !known(n.as_str())) {
                    return Err(ParamfigError::SignatureMismatch {
                        keyword: name.clone(),
                        callable: self.inner.name().to_string(),
                    });
                }
            }
            KeywordPolicy::Discard if declared.var_keyword().is_none() => {
                arguments.keywords.retain(|(name, _)| {
                    let keep = known(name.as_str());
                    if !keep {
                        debug!(callable = self.inner.name(), keyword = %name, "discarding unknown keyword");
                    }
                    keep
                });
            }
            KeywordPolicy::Discard => {}
        }
        Ok(arguments)
    }
}

impl<C: Callable> Callable for Bound<C> {
    type Output = C::Output;

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn signature(&self) -> Signature {
        let visible = self
            .call_signature()
            .params()
            .iter()
            .filter(|p| match p.kind {
                ParamKind::VarPositional => !self.binder.hide_var_positional,
                ParamKind::VarKeyword => !self.binder.hide_var_keyword,
                _ => true,
            })
            .cloned()
            .collect();
        Signature::from_params_unchecked(visible)
    }

    /// The widened signature with nothing hidden.
    fn call_signature(&self) -> Signature {
        widen(&self.inner.call_signature(), &self.binder.merged())
    }

    fn call(&self, arguments: Arguments) -> Result<Self::Output, ParamfigError> {
        let declared = self.inner.call_signature();
        let merged = self.binder.merged();
        let widened = widen(&declared, &merged);

        let arguments = self.screen_keywords(&declared, &merged, arguments)?;
        let coercer = self.coercer(&declared, &merged);
        let arguments = if self.binder.lazy {
            coercer.cast_arguments(&widened, arguments)?
        } else {
            arguments
        };
        let mut bound = widened.bind(arguments)?;

        let mut updates = Vec::new();
        let mut invocation = Invocation::default();
        for param in declared.declared() {
            let value = if let Some(value) = bound.arguments.remove(&param.name) {
                if merged.contains_key(&param.name) {
                    updates.push((param.name.clone(), value.clone()));
                }
                value
            } else if let Some(value) = merged.get(&param.name) {
                let value = if self.binder.lazy {
                    coercer.cast(&param.name, value.clone())?
                } else {
                    value.clone()
                };
                updates.push((param.name.clone(), value.clone()));
                value
            } else if let Some(default) = &param.default {
                default.clone()
            } else {
                return Err(ParamfigError::MissingArgument(param.name.clone()));
            };
            invocation.values.push((param.name.clone(), value));
        }

        // What is left in `bound.arguments` are source-only keys the caller set.
        for (name, value) in std::mem::take(&mut bound.arguments) {
            updates.push((name.clone(), value.clone()));
            invocation.kwargs.insert(name, value);
        }
        invocation.args = bound.extra_positional;
        for (name, value) in bound.extra_keywords {
            if !declared.declares(&name) {
                invocation.kwargs.insert(name, value);
            }
        }

        self.binder.apply(&updates)?;

        if declared.var_keyword().is_some() {
            for (name, value) in self.binder.merged() {
                if !declared.declares(&name) && !invocation.kwargs.contains_key(&name) {
                    invocation.kwargs.insert(name, value);
                }
            }
        } else if !invocation.kwargs.is_empty() {
            debug!(
                callable = self.inner.name(),
                keywords = ?invocation.kwargs.keys().collect::<Vec<_>>(),
                "dropping keywords the callable does not declare"
            );
            invocation.kwargs.clear();
        }

        self.inner.call(invocation.into_arguments(&declared))
    }
}

/// Bind a callable to a whole shared tree, addressed by flat key.
pub fn bind_config<C: Callable>(tree: &SharedConfig, inner: C) -> Result<Bound<C>, ParamfigError> {
    Binder::for_config(tree).bind(inner)
}

/// Bind a callable to one section of a shared tree.
pub fn bind_section<C: Callable>(
    tree: &SharedConfig,
    section: &str,
    inner: C,
) -> Result<Bound<C>, ParamfigError> {
    Binder::for_section(tree, section)?.bind(inner)
}

impl Config {
    /// Shorthand for [`bind_section`] on a tree that is not shared yet
    /// elsewhere: wraps `self` in a handle and returns it with the binding.
    pub fn bind_section<C: Callable>(
        self,
        section: &str,
        inner: C,
    ) -> Result<(SharedConfig, Bound<C>), ParamfigError> {
        let tree = self.into_shared();
        let bound = bind_section(&tree, section, inner)?;
        Ok((tree, bound))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::Function;
    use crate::source::{SharedSource, shared};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Map = BTreeMap<String, Value>;

    fn map(pairs: &[(&str, Value)]) -> Rc<RefCell<Map>> {
        shared(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<Map>(),
        )
    }

    fn sig(params: Vec<Param>) -> Signature {
        Signature::new(params).unwrap()
    }

    /// `f(**k)` returning its keyword map.
    fn kwargs_fn() -> Function<impl Fn(&Invocation) -> Result<Map, ParamfigError>> {
        Function::new("main", sig(vec![Param::var_keyword("k")]), |inv| {
            Ok(inv.kwargs.clone())
        })
    }

    fn expect(pairs: &[(&str, Value)]) -> Map {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn kwargs_receive_the_whole_source() {
        let source = map(&[("a", Value::Int(3))]);
        let main = Binder::new(source.clone()).bind(kwargs_fn()).unwrap();
        assert_eq!(main.call(Arguments::new()).unwrap(), expect(&[("a", Value::Int(3))]));
        assert_eq!(
            main.call(Arguments::new().kwarg("a", 5)).unwrap(),
            expect(&[("a", Value::Int(5))])
        );
        assert_eq!(source.borrow()["a"], Value::Int(5));
    }

    #[test]
    fn declared_values_flow_back() {
        let source = map(&[("a", Value::Int(4))]);
        let f = Function::new(
            "f",
            sig(vec![Param::required("a"), Param::with_default("b", 2)]),
            |inv| Ok((inv.get("a").cloned(), inv.get("b").cloned())),
        );
        let f = Binder::new(source.clone()).bind(f).unwrap();
        let (a, b) = f.call(Arguments::new().arg(9)).unwrap();
        assert_eq!(a, Some(Value::Int(9)));
        assert_eq!(b, Some(Value::Int(2)));
        assert_eq!(source.borrow()["a"], Value::Int(9));

        let (a, _) = f.call(Arguments::new()).unwrap();
        assert_eq!(a, Some(Value::Int(9)));
    }

    #[test]
    fn source_default_overrides_declared_default() {
        let source = map(&[("blob", Value::Int(4))]);
        let f = Function::new("main", sig(vec![Param::with_default("blob", 3)]), |inv| {
            Ok(inv.get("blob").cloned())
        });
        let f = Binder::new(source).bind(f).unwrap();
        assert_eq!(f.call(Arguments::new()).unwrap(), Some(Value::Int(4)));
        assert_eq!(f.call(Arguments::new().kwarg("blob", 2)).unwrap(), Some(Value::Int(2)));
    }

    #[test]
    fn source_only_keyword_updates_source_but_is_dropped() {
        let source = map(&[("b", Value::Int(4))]);
        let f = Function::new("main", sig(vec![Param::with_default("a", 4)]), |inv| {
            Ok(inv.get("a").cloned())
        });
        let f = Binder::new(source.clone()).bind(f).unwrap();
        assert_eq!(f.call(Arguments::new().kwarg("b", 5)).unwrap(), Some(Value::Int(4)));
        assert_eq!(*source.borrow(), expect(&[("b", Value::Int(5))]));
    }

    #[test]
    fn unknown_keyword_is_discarded_without_kwargs() {
        let source = map(&[]);
        let f = Function::new("main", sig(vec![Param::with_default("a", 1)]), |inv| {
            Ok(inv.get("a").cloned())
        });
        let f = Binder::new(source.clone()).bind(f).unwrap();
        assert_eq!(f.call(Arguments::new().kwarg("zzz", 5)).unwrap(), Some(Value::Int(1)));
        assert!(source.borrow().is_empty());
    }

    #[test]
    fn unknown_keyword_reaches_kwargs() {
        let source = map(&[]);
        let f = Function::new(
            "main",
            sig(vec![Param::with_default("a", 3), Param::var_keyword("k")]),
            |inv| Ok((inv.get("a").cloned(), inv.kwargs.clone())),
        );
        let f = Binder::new(source).bind(f).unwrap();
        let (a, k) = f.call(Arguments::new().kwarg("a", 4)).unwrap();
        assert_eq!(a, Some(Value::Int(4)));
        assert!(k.is_empty());
        let (a, k) = f.call(Arguments::new().kwarg("b", 6)).unwrap();
        assert_eq!(a, Some(Value::Int(3)));
        assert_eq!(k, expect(&[("b", Value::Int(6))]));
    }

    #[test]
    fn strict_binder_rejects_unknown_keyword() {
        let source = map(&[("a", Value::Int(1)), ("b", Value::Int(2))]);
        let main = Binder::strict(source.clone()).bind(kwargs_fn()).unwrap();
        assert_eq!(
            main.call(Arguments::new().kwarg("a", 5)).unwrap(),
            expect(&[("a", Value::Int(5)), ("b", Value::Int(2))])
        );
        let err = main.call(Arguments::new().kwarg("c", 5)).unwrap_err();
        assert!(matches!(
            err,
            ParamfigError::SignatureMismatch { ref keyword, .. } if keyword == "c"
        ));
        assert_eq!(source.borrow()["a"], Value::Int(5));
    }

    #[test]
    fn strict_binder_requires_kwargs_only_shape() {
        let var_arg = Function::new("var_arg", sig(vec![Param::var_positional("a")]), |_| Ok(()));
        assert!(matches!(
            Binder::strict(map(&[])).bind(var_arg),
            Err(ParamfigError::InvalidSignature(_))
        ));
        let fixed = Function::new(
            "fixed_arg",
            sig(vec![Param::required("a"), Param::required("b")]),
            |_| Ok(()),
        );
        assert!(Binder::strict(map(&[])).bind(fixed).is_err());
        let defaulted = Function::new(
            "main",
            sig(vec![Param::with_default("a", 3), Param::var_keyword("k")]),
            |_| Ok(()),
        );
        assert!(Binder::strict(map(&[])).bind(defaulted).is_ok());
    }

    #[test]
    fn string_inputs_are_cast_by_source_type() {
        let source = map(&[("port", Value::Int(80)), ("hosts", Value::from(vec!["a"]))]);
        let main = Binder::new(source.clone()).bind(kwargs_fn()).unwrap();
        let k = main
            .call(Arguments::new().kwarg("port", "8080").kwarg("hosts", "x y"))
            .unwrap();
        assert_eq!(k["port"], Value::Int(8080));
        assert_eq!(k["hosts"], Value::from(vec!["x", "y"]));
        assert_eq!(source.borrow()["port"], Value::Int(8080));
    }

    #[test]
    fn string_inputs_are_cast_by_declared_default() {
        let source = map(&[]);
        let f = Function::new("main", sig(vec![Param::with_default("debug", true)]), |inv| {
            Ok(inv.get("debug").cloned())
        });
        let f = Binder::new(source).bind(f).unwrap();
        assert_eq!(
            f.call(Arguments::new().arg("off")).unwrap(),
            Some(Value::Bool(false))
        );
        assert!(matches!(
            f.call(Arguments::new().arg("maybe")),
            Err(ParamfigError::Coercion { .. })
        ));
    }

    #[test]
    fn string_source_value_cast_by_declared_default() {
        let source = map(&[("count", Value::from("12"))]);
        let f = Function::new("main", sig(vec![Param::with_default("count", 0)]), |inv| {
            Ok(inv.get("count").cloned())
        });
        let f = Binder::new(source.clone()).bind(f).unwrap();
        assert_eq!(f.call(Arguments::new()).unwrap(), Some(Value::Int(12)));
        assert_eq!(source.borrow()["count"], Value::Int(12));
    }

    #[test]
    fn lazy_off_passes_strings_through() {
        let source = map(&[("port", Value::Int(80))]);
        let main = Binder::new(source).lazy(false).bind(kwargs_fn()).unwrap();
        let k = main.call(Arguments::new().kwarg("port", "81")).unwrap();
        assert_eq!(k["port"], Value::from("81"));
    }

    #[test]
    fn var_positional_passes_through() {
        let source = map(&[("a", Value::Int(1))]);
        let f = Function::new(
            "main",
            sig(vec![
                Param::required("a"),
                Param::var_positional("rest"),
                Param::var_keyword("k"),
            ]),
            |inv| Ok((inv.get("a").cloned(), inv.args.clone())),
        );
        let f = Binder::new(source).bind(f).unwrap();
        let (a, rest) = f.call(Arguments::new().arg(7).arg(8).arg(9)).unwrap();
        assert_eq!(a, Some(Value::Int(7)));
        assert_eq!(rest, vec![Value::Int(8), Value::Int(9)]);
    }

    #[test]
    fn visible_signature_draws_defaults_from_source() {
        let source = map(&[("a", Value::Int(4)), ("extra", Value::Bool(true))]);
        let f = Function::new(
            "main",
            sig(vec![
                Param::required("a"),
                Param::with_default("b", 2),
                Param::var_positional("rest"),
                Param::var_keyword("k"),
            ]),
            |_| Ok(()),
        );
        let bound = Binder::new(source).bind(f).unwrap();
        assert_eq!(bound.signature().to_string(), "(a=4, b=2, *rest, extra=true)");
        let shown = Binder::new(map(&[]))
            .hide_var_keyword(false)
            .hide_var_positional(true)
            .bind(bound)
            .unwrap();
        assert_eq!(shown.signature().to_string(), "(a=4, b=2, *, extra=true, **k)");
        assert_eq!(
            shown.inner().call_signature().to_string(),
            "(a=4, b=2, *rest, extra=true, **k)"
        );
    }

    #[test]
    fn missing_required_argument_without_source() {
        let f = Function::new("main", sig(vec![Param::required("a")]), |_| Ok(()));
        let f = Binder::new(map(&[])).bind(f).unwrap();
        assert!(matches!(
            f.call(Arguments::new()),
            Err(ParamfigError::MissingArgument(name)) if name == "a"
        ));
    }

    #[test]
    fn layered_sources_outer_wins_and_both_update() {
        let inner = map(&[("a", Value::Int(1)), ("b", Value::Int(2))]);
        let outer = map(&[("a", Value::Int(10))]);
        let sources: Vec<SharedSource> = vec![inner.clone() as SharedSource, outer.clone()];
        let main = Binder::layered(sources).bind(kwargs_fn()).unwrap();
        assert_eq!(
            main.call(Arguments::new()).unwrap(),
            expect(&[("a", Value::Int(10)), ("b", Value::Int(2))])
        );
        main.call(Arguments::new().kwarg("a", 7)).unwrap();
        assert_eq!(inner.borrow()["a"], Value::Int(7));
        assert_eq!(outer.borrow()["a"], Value::Int(7));
        assert!(!outer.borrow().contains_key("b"));
    }

    #[test]
    fn stacked_binders_compose() {
        let inner = map(&[("a", Value::Int(1))]);
        let outer = map(&[("b", Value::Int(2))]);
        let once = Binder::new(inner.clone()).bind(kwargs_fn()).unwrap();
        assert_eq!(once.signature().to_string(), "(*, a=1)");
        let twice = Binder::new(outer.clone()).bind(once).unwrap();
        assert_eq!(twice.signature().to_string(), "(*, a=1, b=2)");
        assert_eq!(
            twice.call(Arguments::new()).unwrap(),
            expect(&[("a", Value::Int(1)), ("b", Value::Int(2))])
        );
        let k = twice
            .call(Arguments::new().kwarg("a", "5").kwarg("b", "6"))
            .unwrap();
        assert_eq!(k, expect(&[("a", Value::Int(5)), ("b", Value::Int(6))]));
        assert_eq!(inner.borrow()["a"], Value::Int(5));
        assert_eq!(outer.borrow()["b"], Value::Int(6));
    }

    #[test]
    fn strict_binder_accepts_bound_with_hidden_kwargs() {
        let once = Binder::new(map(&[("a", Value::Int(1))]))
            .bind(kwargs_fn())
            .unwrap();
        let twice = Binder::strict(map(&[("b", Value::Int(2))]))
            .bind(once)
            .unwrap();
        assert_eq!(
            twice.call(Arguments::new().kwarg("b", 3)).unwrap(),
            expect(&[("a", Value::Int(1)), ("b", Value::Int(3))])
        );
    }

    #[test]
    fn section_binding_writes_into_tree() {
        let mut config = Config::new();
        config.set("web", "port", 8080).unwrap();
        config.set("web", "debug", false).unwrap();
        let f = Function::new(
            "serve",
            sig(vec![
                Param::with_default("host", "127.0.0.1"),
                Param::with_default("port", 80),
                Param::with_default("debug", true),
            ]),
            |inv| Ok((inv.get("port").cloned(), inv.get("debug").cloned())),
        );
        let (tree, serve) = config.bind_section("web", f).unwrap();
        tree.borrow_mut().section("web").unwrap().dirty();

        let (port, debug) = serve
            .call(Arguments::new().kwarg("port", "9000").kwarg("debug", "yes"))
            .unwrap();
        assert_eq!(port, Some(Value::Int(9000)));
        assert_eq!(debug, Some(Value::Bool(true)));
        assert_eq!(tree.borrow().get("web_port").unwrap(), &Value::Int(9000));
        assert!(tree.borrow_mut().section("web").unwrap().dirty());
        assert!(!tree.borrow().contains_key("web_host"));
    }

    #[test]
    fn config_binding_uses_flat_keys() {
        let mut config = Config::new();
        config.set("bread", "butter", "win").unwrap();
        config.set("bread", "milk", "fail").unwrap();
        let tree = config.into_shared();
        let main = bind_config(&tree, kwargs_fn()).unwrap();
        let k = main.call(Arguments::new().kwarg("bread_milk", "win")).unwrap();
        assert_eq!(
            k,
            expect(&[("bread_butter", Value::from("win")), ("bread_milk", Value::from("win"))])
        );
        assert_eq!(tree.borrow().get("bread_milk").unwrap(), &Value::from("win"));
    }

    #[test]
    fn wrapped_function_may_read_the_tree() {
        let mut config = Config::new();
        config.set("web", "port", 1).unwrap();
        let tree = config.into_shared();
        let reader = tree.clone();
        let f = Function::new("main", sig(vec![Param::with_default("port", 0)]), move |_| {
            Ok(reader.borrow().get("web_port").cloned()?)
        });
        let f = bind_section(&tree, "web", f).unwrap();
        assert_eq!(f.call(Arguments::new().arg(2)).unwrap(), Value::Int(2));
    }
}
