//! A generic, embeddable interactive command shell.
//!
//! This crate provides a line-oriented interpreter: input is tokenized with
//! quote-aware splitting, arguments are resolved against a command's declared
//! parameter list (positionally or as explicit `key=value` pairs), and a
//! persistent read-eval-print loop adds history and tab completion on top.
//! Command implementations are plain closures registered by name; the session
//! carries an arbitrary caller-supplied payload that the core never inspects.
//!
//! The main entry point is [`Shell`]: register [`Command`] descriptors, then
//! either drive it line by line with [`Shell::execute_line`] or enter the
//! interactive loop with [`Shell::run`].

mod command;
mod error;
mod repl;
mod resolver;
mod shell;
pub mod splitter;

pub use command::{ArgSpec, Args, Command, Handler, arg_or};
pub use error::ShellError;
pub use repl::Termination;
pub use resolver::{ResolvedArgs, resolve};
pub use shell::Shell;
