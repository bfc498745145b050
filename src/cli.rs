//! Clap adapter for paramfig.
//!
//! This module is the **optional integration layer** between paramfig's
//! framework-agnostic core and the [clap](https://docs.rs/clap) CLI parser.
//! It is compiled only when the `clap` Cargo feature is enabled (on by
//! default).
//!
//! [`command_for`] turns a [`Signature`] (usually the visible signature of a
//! [`Bound`](crate::Bound) callable, so defaults reflect the loaded config)
//! into a `clap::Command`: one `--option` per parameter and a trailing
//! positional list for `*args`. [`arguments_from_matches`] goes the other
//! way. Values stay strings; the binder casts them by example.
//!
//! ```ignore
//! let command = cli::command_for("serve", &serve.signature());
//! let matches = command.get_matches();
//! serve.call(cli::arguments_from_matches(&serve.signature(), &matches)?)?;
//! ```

use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::error::ParamfigError;
use crate::signature::{Arguments, Signature};
use crate::value::Value;

/// `--long-name` for a parameter.
fn long_name(name: &str) -> String {
    name.replace('_', "-")
}

/// Build a command with one option per parameter of `signature`.
///
/// Options never carry clap defaults: anything not given on the command line
/// is left for the config sources to fill. The signature's defaults are shown
/// in the help text instead.
pub fn command_for(name: &str, signature: &Signature) -> Command {
    let mut command = Command::new(name.to_string());
    for param in signature.declared() {
        let help = match &param.default {
            Some(default) => format!("[default: {default}]"),
            None => "[required]".to_string(),
        };
        command = command.arg(
            Arg::new(param.name.clone())
                .long(long_name(&param.name))
                .value_name(param.name.to_uppercase())
                .action(ArgAction::Set)
                .help(help),
        );
    }
    if let Some(var) = signature.var_positional() {
        command = command.arg(
            Arg::new(var.name.clone())
                .value_name(var.name.to_uppercase())
                .num_args(1..)
                .action(ArgAction::Append)
                .trailing_var_arg(true),
        );
    }
    command
}

/// Collect what the user actually typed as call arguments.
///
/// Options become string keyword arguments. Trailing values become extra
/// positional arguments; since they can only follow the declared positional
/// parameters, those are then passed positionally, falling back to the
/// signature's defaults for any not given.
pub fn arguments_from_matches(
    signature: &Signature,
    matches: &ArgMatches,
) -> Result<Arguments, ParamfigError> {
    let given = |name: &str| matches.get_one::<String>(name).cloned().map(Value::String);

    let trailing: Vec<Value> = signature
        .var_positional()
        .and_then(|var| matches.get_many::<String>(&var.name))
        .map(|values| values.cloned().map(Value::String).collect())
        .unwrap_or_default();

    let mut arguments = Arguments::new();
    for param in signature.declared() {
        if !trailing.is_empty() && param.kind.accepts_positional() {
            let value = given(&param.name)
                .or_else(|| param.default.clone())
                .ok_or_else(|| ParamfigError::MissingArgument(param.name.clone()))?;
            arguments.positional.push(value);
        } else if let Some(value) = given(&param.name) {
            arguments.keywords.push((param.name.clone(), value));
        }
    }
    arguments.positional.extend(trailing);
    Ok(arguments)
}
