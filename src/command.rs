//! Command descriptors: the static declaration of a command's shape.

use crate::shell::Shell;
use std::collections::HashMap;

/// Resolved arguments handed to a command handler.
///
/// Keys come from the command's declared parameter names (positional tokens)
/// or straight from `key=value` tokens typed by the user. Declared parameters
/// the user never supplied are simply absent; see [`arg_or`] for consulting a
/// declared default.
pub type Args = HashMap<String, String>;

/// The handler invoked once a command's arguments are resolved.
///
/// Receives the live session so it can reach the caller-supplied data (and,
/// for meta-commands like `help`, the registry itself). A returned error is
/// reported to the user without ending the session.
pub type Handler<T> = Box<dyn Fn(&mut Shell<T>, &Args) -> anyhow::Result<()>>;

/// Declaration of one accepted argument: its name, help text, and default.
///
/// The order of `ArgSpec`s in a [`Command`] is the positional order used when
/// the user omits explicit `key=` prefixes.
pub struct ArgSpec {
    /// Parameter name; the key under which a matched value appears in [`Args`].
    pub name: String,
    /// Help text shown by the built-in `help` command.
    pub help: String,
    /// Default value shown by `help`. The core never inserts it into [`Args`];
    /// handlers consult it via [`arg_or`].
    pub default: String,
}

impl ArgSpec {
    /// Convenience constructor from string slices.
    pub fn new(name: &str, help: &str, default: &str) -> Self {
        Self {
            name: name.to_string(),
            help: help.to_string(),
            default: default.to_string(),
        }
    }
}

/// A command for the shell: description, declared parameters, and handler.
///
/// Descriptors are plain data plus one closure; there is no trait hierarchy
/// to implement. Parameter names within one descriptor must be unique.
/// Descriptors are immutable once registered.
pub struct Command<T> {
    /// Human-readable summary, shown by `help`.
    pub description: String,
    /// Accepted arguments in positional matching order.
    pub args: Vec<ArgSpec>,
    /// The handler run on dispatch.
    pub run: Handler<T>,
}

/// Look up `key` in `args`, falling back to `default` when absent.
///
/// The argument resolver leaves unsupplied parameters out of the map, so
/// handlers use this to apply the defaults they declared.
pub fn arg_or<'a>(args: &'a Args, key: &str, default: &'a str) -> &'a str {
    args.get(key).map_or(default, String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arg_or_prefers_supplied_values() {
        let mut args = Args::new();
        args.insert("key".to_string(), "supplied".to_string());
        assert_eq!(arg_or(&args, "key", "fallback"), "supplied");
        assert_eq!(arg_or(&args, "missing", "fallback"), "fallback");
    }
}
