//! Mapping argument tokens onto a command's declared parameters.
//!
//! The hybrid scheme lets the user type either `set foo bar` (positional) or
//! `set key=foo value=bar` (explicit, reorderable) without the command author
//! writing two code paths.

use crate::command::{ArgSpec, Args};
use crate::error::ShellError;
use crate::splitter::Splitter;

/// Outcome of resolving one statement's argument tokens.
#[derive(Debug)]
pub struct ResolvedArgs {
    /// The key to value mapping handed to the handler.
    pub values: Args,
    /// Positional tokens beyond the declared parameter count. These are
    /// discarded with a warning; they never fail the dispatch.
    pub extra: Vec<String>,
}

/// Resolve `tokens` against the declared parameter order in `specs`.
///
/// Each token is split on `=` with `arg_splitter`:
/// - one piece: a positional value, matched to the parameter at the current
///   positional index. The index advances only on positional tokens, so
///   explicit `key=value` tokens interleaved before a positional one do not
///   shift it.
/// - two pieces: an explicit `key=value` pair, inserted under the given key
///   whether or not that key is declared.
/// - anything else: the token is malformed, the whole dispatch fails.
pub fn resolve(
    arg_splitter: &Splitter,
    tokens: &[String],
    specs: &[ArgSpec],
) -> Result<ResolvedArgs, ShellError> {
    let mut values = Args::new();
    let mut extra = Vec::new();
    let mut positional = 0usize;

    for token in tokens {
        let fields = arg_splitter.split(token)?;
        match fields.as_slice() {
            [value] => {
                match specs.get(positional) {
                    Some(spec) => {
                        values.insert(spec.name.clone(), value.clone());
                    }
                    None => extra.push(token.clone()),
                }
                positional += 1;
            }
            [key, value] => {
                values.insert(key.clone(), value.clone());
            }
            _ => return Err(ShellError::InvalidArgument(token.clone())),
        }
    }

    Ok(ResolvedArgs { values, extra })
}
