//! Two-level configuration trees bound to function parameters. Load your
//! files, bind a function, and call it.
//!
//! Paramfig keeps configuration as `section -> option -> value` and lets a
//! function draw its defaults straight from it. Calling the function with an
//! explicit argument writes that value back into the tree, so the next call
//! (and everything else reading the tree) sees it.
//!
//! ```ignore
//! let tree = Config::builder().app_name("myapp").load()?.into_shared();
//! let serve = Binder::for_section(&tree, "web")?.bind(serve_fn)?;
//! serve.call(Arguments::new().kwarg("port", "9000"))?;
//! ```
//!
//! That searches the platform config directory for `myapp.yaml`, applies
//! `MYAPP__SECTION__OPTION` environment variables, binds `serve_fn` to the
//! `web` section, casts `"9000"` to an integer because the config holds an
//! integer for `port`, and records `web.port = 9000` before `serve_fn` runs.
//!
//! # The tree
//!
//! A [`Config`] holds named [`Section`]s. Every option is also reachable by
//! its flat key `"{section}_{option}"`, which is how a whole tree feeds a
//! function that takes `**kwargs`. Trees only grow or change: `remove` exists
//! and always fails.
//!
//! - **Strict vs lenient**: a lenient tree (the default) creates an unknown
//!   section on access; a strict tree fails with
//!   [`SectionNotFound`](ParamfigError::SectionNotFound). Unknown *options*
//!   are an error either way.
//! - **Reserved names**: section names may not shadow the tree's own
//!   operations ([`Config::RESERVED`]), option names may not shadow a
//!   section's ([`Section::RESERVED`]).
//! - **Dirty flag**: each section latches "changed" on every write and
//!   clears it when read through [`Section::dirty`]. Sections start dirty.
//! - **Rendering**: `to_string()` gives YAML with a `# Section` banner before
//!   each section, in sorted order. Loading the rendered text back yields the
//!   same tree.
//!
//! # Coercion by example
//!
//! Values arriving as strings (from a command line, an environment variable)
//! are cast to the kind of an example value: `ValueKind::of(&example)`. Bools
//! accept `y/yes/t/true/on/1` and `n/no/f/false/off/0`; lists split
//! shell-style and cast each element like the example's first element;
//! integers and floats must parse. String examples carry no type and leave
//! input untouched. See [`coerce`].
//!
//! # Binding
//!
//! [`Binder`] wraps a [`Callable`] so its defaults come from one or more
//! [`DefaultSource`]s. See [`binder`] for the per-call algorithm. In short:
//!
//! - Declared parameters take caller value, then source value, then their
//!   own default. Caller and source values are written back.
//! - Source keys the function doesn't declare become keyword-only
//!   parameters of the bound signature. A `**kwargs` function receives them
//!   all; any other function only gets its declared parameters.
//! - Unknown caller keywords are dropped ([`KeywordPolicy::Discard`], the
//!   default) or rejected ([`KeywordPolicy::Reject`], and always for
//!   [`Binder::strict`]).
//! - A [`Bound`] is itself `Callable`: binders stack, and several sources can
//!   layer on one binder ([`Binder::layered`], outer values win).
//!
//! # Layer precedence when loading
//!
//! ```text
//! Config files          search paths in order, later paths win
//!        ↑ overridden by
//! Added files           .add_file(), in call order
//!        ↑ overridden by
//! Environment vars      PREFIX__SECTION__OPTION
//! ```
//!
//! Missing files are silently skipped. A file that exists but can't be read
//! or parsed is an error.
//!
//! # Clap adapter
//!
//! The `cli` module (behind the `clap` feature, on by default) turns a bound
//! signature into a `clap::Command` and parsed matches back into
//! [`Arguments`]. To use paramfig without clap:
//!
//! ```toml
//! paramfig = { version = "...", default-features = false }
//! ```
//!
//! # Logging
//!
//! Paramfig emits [`tracing`](https://docs.rs/tracing) events (skipped
//! files, discarded keywords, write-backs) and never installs a subscriber.
//!
//! # Error handling
//!
//! All fallible operations return [`ParamfigError`]. See the [`error`] module
//! for the full set.

pub mod binder;
pub mod coerce;
pub mod error;
pub mod signature;
pub mod source;
pub mod types;

mod builder;
#[cfg(feature = "clap")]
pub mod cli;
mod config;
mod env;
mod file;
mod section;
mod value;

#[cfg(test)]
mod fixtures;

pub use binder::{Binder, Bound, bind_config, bind_section};
pub use builder::ConfigBuilder;
pub use coerce::{Coercer, Coercing, ValueKind};
pub use config::{Config, flat_key};
pub use error::ParamfigError;
pub use section::Section;
pub use signature::{
    Arguments, BoundArguments, Callable, Function, Invocation, Param, ParamKind, Signature,
};
pub use source::{DefaultSource, SectionSource, SharedConfig, SharedSource, shared};
pub use types::{ConfigPaths, DocumentFormat, KeywordPolicy, SearchPath, UpdateOrder};
pub use value::Value;
