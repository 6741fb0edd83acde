//! The shell's error taxonomy.
//!
//! Everything except [`ShellError::Init`] is a per-statement failure: it is
//! printed at the read-loop boundary and the session keeps running. `Init`
//! means a tokenizer could not be constructed, and without a tokenizer no
//! command can ever be parsed, so the session never starts.

use crate::splitter::{ConfigError, SplitError};
use thiserror::Error;

/// Any failure the shell core can report.
#[derive(Debug, Error)]
pub enum ShellError {
    /// Tokenizer construction failed; fatal, raised before the loop starts.
    #[error("error initializing tokenizer: {0}")]
    Init(#[from] ConfigError),

    /// The line editor failed outside of the ordinary interrupt/end-of-input
    /// conditions (those are termination signals, not errors).
    #[error("line editor error: {0}")]
    Editor(#[from] rustyline::error::ReadlineError),

    /// Malformed quoting in a statement or argument token.
    #[error("error splitting input: {0}")]
    Tokenize(#[from] SplitError),

    /// The statement named a command that is not registered.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// An argument token split into more than two `=`-separated pieces, or
    /// into none at all.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A command handler reported a failure; its meaning is owned by the
    /// handler, the core only relays it.
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}
