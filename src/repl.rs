//! The interactive read-eval-print loop.
//!
//! [`Shell::run`] drives a `rustyline` editor: prompt, read, execute, repeat.
//! Interrupt and end-of-input are modelled as [`Termination`] values returned
//! to the caller rather than as an in-library process exit, so embedders can
//! choose their own shutdown behavior; a standalone binary typically maps
//! [`Termination::Interrupted`] to `std::process::exit`.

use crate::error::ShellError;
use crate::shell::Shell;
use rustyline::Editor;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;

/// Why the read loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The user entered `exit` or `quit`.
    Exit,
    /// The input stream ended (Ctrl-D / closed stdin).
    EndOfInput,
    /// The interrupt signal preempted the blocking line read (Ctrl-C).
    Interrupted,
}

impl<T> Shell<T> {
    /// Run the interactive loop until the session terminates.
    ///
    /// History is loaded from the configured path before the first prompt,
    /// every non-empty line is appended, and the file is persisted
    /// best-effort on every exit path; history I/O failures are logged and
    /// never fatal. A running handler is never interrupted mid-execution;
    /// the interrupt only preempts the blocking read.
    ///
    /// Tab completion offers the command names registered when the loop
    /// starts. A command registered mid-session by a handler is dispatchable
    /// immediately but only joins the completion candidates on the next
    /// `run()`.
    pub fn run(&mut self) -> Result<Termination, ShellError> {
        let mut rl: Editor<CommandCompleter, DefaultHistory> = Editor::new()?;
        rl.set_helper(Some(CommandCompleter {
            names: self.completions(""),
        }));

        self.load_history(&mut rl);

        let termination = loop {
            let prompt = (self.prompter)(self);
            match rl.readline(&prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        if let Err(err) = rl.add_history_entry(line.as_str()) {
                            log::warn!("failed to record history entry: {err}");
                        }
                    }
                    if self.execute_line(&line) {
                        break Termination::Exit;
                    }
                }
                Err(ReadlineError::Interrupted) => break Termination::Interrupted,
                Err(ReadlineError::Eof) => break Termination::EndOfInput,
                Err(err) => {
                    self.persist_history(&mut rl);
                    return Err(err.into());
                }
            }
        };

        self.persist_history(&mut rl);
        Ok(termination)
    }

    fn load_history(&self, rl: &mut Editor<CommandCompleter, DefaultHistory>) {
        if !self.history_path.exists() {
            return;
        }
        if let Err(err) = rl.load_history(&self.history_path) {
            log::warn!(
                "failed to load history from {}: {err}",
                self.history_path.display()
            );
        }
    }

    fn persist_history(&self, rl: &mut Editor<CommandCompleter, DefaultHistory>) {
        if let Err(err) = rl.save_history(&self.history_path) {
            log::warn!(
                "failed to save history to {}: {err}",
                self.history_path.display()
            );
        }
    }
}

/// Tab completion over the registered command names.
///
/// The candidate set is snapshotted when the loop starts; the registry is
/// effectively read-only while the loop runs. Matching is always
/// case-insensitive, independent of the session's lookup mode.
struct CommandCompleter {
    names: Vec<String>,
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let prefix = line[..pos].to_lowercase();
        let pairs = self
            .names
            .iter()
            .filter(|name| name.to_lowercase().starts_with(&prefix))
            .map(|name| Pair {
                display: name.clone(),
                replacement: name.clone(),
            })
            .collect();
        Ok((0, pairs))
    }
}

impl Hinter for CommandCompleter {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for CommandCompleter {}

impl Validator for CommandCompleter {}

impl rustyline::Helper for CommandCompleter {}

#[cfg(test)]
mod tests {
    use super::*;
    use rustyline::history::{History, SearchDirection};

    #[test]
    fn completion_matches_the_whole_line_prefix_case_insensitively() {
        let completer = CommandCompleter {
            names: vec!["Foo".to_string(), "foobar".to_string(), "other".to_string()],
        };
        let history = DefaultHistory::new();
        let ctx = rustyline::Context::new(&history);

        let (start, pairs) = completer.complete("FO", 2, &ctx).unwrap();
        assert_eq!(start, 0);
        let names: Vec<&str> = pairs.iter().map(|p| p.replacement.as_str()).collect();
        assert_eq!(names, ["Foo", "foobar"]);

        let (_, pairs) = completer.complete("zz", 2, &ctx).unwrap();
        assert!(pairs.is_empty());
    }

    fn entries(rl: &Editor<CommandCompleter, DefaultHistory>) -> Vec<String> {
        (0..rl.history().len())
            .map(|i| {
                rl.history()
                    .get(i, SearchDirection::Forward)
                    .unwrap()
                    .map(|r| r.entry.into_owned())
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn history_round_trips_through_the_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history");
        let shell = Shell::new("test", ()).unwrap().history_path(&path);

        let mut rl: Editor<CommandCompleter, DefaultHistory> = Editor::new().unwrap();
        rl.add_history_entry("cmd1 first").unwrap();
        rl.add_history_entry("cmd2 a=\"quoted value\"").unwrap();
        shell.persist_history(&mut rl);

        let mut reloaded: Editor<CommandCompleter, DefaultHistory> = Editor::new().unwrap();
        shell.load_history(&mut reloaded);
        assert_eq!(entries(&reloaded), ["cmd1 first", "cmd2 a=\"quoted value\""]);
    }

    #[test]
    fn loading_a_missing_history_file_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let shell = Shell::new("test", ())
            .unwrap()
            .history_path(dir.path().join("never-written"));

        let mut rl: Editor<CommandCompleter, DefaultHistory> = Editor::new().unwrap();
        shell.load_history(&mut rl);
        assert!(rl.history().is_empty());
    }
}
