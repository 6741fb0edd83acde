//! The shell session: command registry, dispatcher, and statement execution.

use crate::command::{ArgSpec, Args, Command};
use crate::error::ShellError;
use crate::resolver;
use crate::splitter::Splitter;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::rc::Rc;

/// Tokens that terminate the session when they lead a statement. They are
/// never looked up in the registry and cannot be registered as commands.
const RESERVED: [&str; 2] = ["exit", "quit"];

/// An interactive command shell over an arbitrary payload `T`.
///
/// The shell owns its command registry and tokenizers; the payload is shared
/// with command handlers through the session handle and never inspected or
/// mutated by the core itself.
///
/// Example
/// ```
/// use shell_cli::{ArgSpec, Command, Shell};
///
/// let mut shell = Shell::new("demo", Vec::<String>::new()).unwrap();
/// shell.register(
///     "note",
///     Command {
///         description: "Record a note".to_string(),
///         args: vec![ArgSpec::new("text", "Text to record", "")],
///         run: Box::new(|shell, args| {
///             if let Some(text) = args.get("text") {
///                 shell.data.push(text.clone());
///             }
///             Ok(())
///         }),
///     },
/// );
/// assert!(!shell.execute_line("note text='hello there'"));
/// assert_eq!(shell.data, vec!["hello there".to_string()]);
/// ```
pub struct Shell<T> {
    name: String,
    commands: HashMap<String, Rc<Command<T>>>,
    case_insensitive: bool,
    pub(crate) prompter: Box<dyn Fn(&Shell<T>) -> String>,
    pub(crate) history_path: PathBuf,
    splitter: Splitter,
    arg_splitter: Splitter,
    /// Caller-supplied context data, opaque to the core.
    pub data: T,
}

impl<T> Shell<T> {
    /// Create a session named `name` carrying `data`.
    ///
    /// Constructs both tokenizers (space-delimited for statements,
    /// `=`-delimited for argument tokens). A construction failure here is the
    /// one unrecoverable condition in the design.
    pub fn new(name: &str, data: T) -> Result<Self, ShellError> {
        let splitter = Splitter::new(' ', &['"', '\''])?;
        let arg_splitter = Splitter::new('=', &['"', '\''])?;

        Ok(Self {
            name: name.to_string(),
            commands: HashMap::new(),
            case_insensitive: false,
            prompter: Box::new(|shell: &Shell<T>| format!("{}> ", shell.name())),
            history_path: std::env::temp_dir().join(format!("{name}_history")),
            splitter,
            arg_splitter,
            data,
        })
    }

    /// The project name this session was created with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Treat command names case-insensitively.
    ///
    /// Configure this before registering commands: registry keys are
    /// lower-cased at registration time when the flag is set.
    pub fn case_insensitive(mut self, yes: bool) -> Self {
        self.case_insensitive = yes;
        self
    }

    /// Replace the prompt generator. The default prompt is `"<name>> "`.
    pub fn prompt(mut self, prompter: impl Fn(&Shell<T>) -> String + 'static) -> Self {
        self.prompter = Box::new(prompter);
        self
    }

    /// Set the history file location. Defaults to `<tmpdir>/<name>_history`.
    pub fn history_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.history_path = path.into();
        self
    }

    /// Register `command` under `name`; a later registration under the same
    /// name replaces the earlier one.
    ///
    /// The reserved `exit`/`quit` names are ignored with a warning. Duplicate
    /// parameter names within the descriptor are a caller bug and logged.
    pub fn register(&mut self, name: &str, command: Command<T>) {
        if RESERVED.contains(&name) {
            log::warn!("'{name}' is reserved for terminating the session; registration ignored");
            return;
        }

        let mut seen = HashSet::new();
        for spec in &command.args {
            if !seen.insert(spec.name.as_str()) {
                log::warn!(
                    "command '{name}' declares parameter '{}' more than once",
                    spec.name
                );
            }
        }

        let key = if self.case_insensitive {
            name.to_lowercase()
        } else {
            name.to_string()
        };
        self.commands.insert(key, Rc::new(command));
    }

    fn lookup(&self, name: &str) -> Option<Rc<Command<T>>> {
        let key = if self.case_insensitive {
            name.to_lowercase()
        } else {
            name.to_string()
        };
        self.commands.get(&key).cloned()
    }

    /// Dispatch one already-tokenized statement.
    ///
    /// An empty token slice is a no-op success. Extra positional arguments
    /// are reported as warnings and discarded; every other failure is
    /// returned to the caller.
    pub fn dispatch(&mut self, tokens: &[String]) -> Result<(), ShellError> {
        let Some(first) = tokens.first() else {
            return Ok(());
        };

        let cmd = self
            .lookup(first)
            .ok_or_else(|| ShellError::UnknownCommand(first.clone()))?;

        let resolved = resolver::resolve(&self.arg_splitter, &tokens[1..], &cmd.args)?;
        for token in &resolved.extra {
            println!("WARNING: extra argument: {token}");
        }

        (cmd.run)(self, &resolved.values).map_err(ShellError::Handler)
    }

    /// Execute one statement: trim, tokenize, check for the reserved
    /// terminators, dispatch. Returns whether the session should end.
    fn run_statement(&mut self, statement: &str) -> Result<bool, ShellError> {
        let statement = statement.trim();
        let tokens = self.splitter.split(statement)?;

        let Some(first) = tokens.first() else {
            return Ok(false);
        };
        if first.is_empty() {
            return Ok(false);
        }
        if RESERVED.contains(&first.as_str()) {
            return Ok(true);
        }

        self.dispatch(&tokens)?;
        Ok(false)
    }

    /// Execute a full input line of `;`-separated statements.
    ///
    /// Statement failures are printed and do not stop later statements in the
    /// same line. Returns `true` when an `exit`/`quit` was encountered, in
    /// which case the remaining statements are not executed.
    pub fn execute_line(&mut self, line: &str) -> bool {
        for statement in line.split(';') {
            if statement.is_empty() {
                continue;
            }
            match self.run_statement(statement) {
                Ok(true) => return true,
                Ok(false) => {}
                Err(err) => println!("Error: {err}"),
            }
        }
        false
    }

    /// Registered command names whose lower-cased form starts with the
    /// lower-cased `line`. Completion is always case-insensitive, independent
    /// of the session's lookup mode.
    pub fn completions(&self, line: &str) -> Vec<String> {
        let prefix = line.to_lowercase();
        let mut names: Vec<String> = self
            .commands
            .keys()
            .filter(|name| name.to_lowercase().starts_with(&prefix))
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// The built-in `help` command.
    ///
    /// With no argument, lists every registered command and its description;
    /// with a `command` argument, shows that command's description and full
    /// parameter list with defaults.
    pub fn help_command() -> Command<T> {
        Command {
            description: "Get help for a command".to_string(),
            args: vec![ArgSpec::new("command", "Command to get help for", "")],
            run: Box::new(|shell, args: &Args| {
                match args.get("command").filter(|name| !name.is_empty()) {
                    Some(name) => match help_detail(shell, name) {
                        Some(text) => {
                            println!("{text}");
                            Ok(())
                        }
                        None => Err(ShellError::UnknownCommand(name.clone()).into()),
                    },
                    None => {
                        println!("{}", help_overview(shell));
                        Ok(())
                    }
                }
            }),
        }
    }
}

fn help_overview<T>(shell: &Shell<T>) -> String {
    let mut names: Vec<&String> = shell.commands.keys().collect();
    names.sort();

    let mut out = String::from("Commands:\n");
    for name in names {
        if let Some(cmd) = shell.commands.get(name) {
            out.push_str(&format!("  {}: {}\n", name, cmd.description));
        }
    }
    out.push_str("Use 'help <command>' to get help for a specific command");
    out
}

fn help_detail<T>(shell: &Shell<T>, name: &str) -> Option<String> {
    let cmd = shell.lookup(name)?;

    let mut out = format!("Command: {name}\nDescription: {}\nArguments:\n", cmd.description);
    for spec in &cmd.args {
        out.push_str(&format!(
            "  {} : {} (default: {})\n",
            spec.name, spec.help, spec.default
        ));
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test payload: a trace of handler invocations.
    type Trace = Vec<String>;

    fn tracing_command(tag: &str) -> Command<Trace> {
        let tag = tag.to_string();
        Command {
            description: format!("trace {tag}"),
            args: vec![
                ArgSpec::new("a", "first", ""),
                ArgSpec::new("b", "second", ""),
            ],
            run: Box::new(move |shell, args| {
                let a = crate::command::arg_or(args, "a", "-");
                let b = crate::command::arg_or(args, "b", "-");
                shell.data.push(format!("{tag}:{a}:{b}"));
                Ok(())
            }),
        }
    }

    fn shell() -> Shell<Trace> {
        let mut shell = Shell::new("test", Trace::new()).unwrap();
        shell.register("cmd1", tracing_command("cmd1"));
        shell.register("cmd2", tracing_command("cmd2"));
        shell
    }

    fn toks(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn dispatch_of_empty_tokens_is_a_no_op() {
        let mut sh = shell();
        sh.dispatch(&[]).unwrap();
        assert!(sh.data.is_empty());
    }

    #[test]
    fn dispatch_reports_unknown_commands() {
        let mut sh = shell();
        let err = sh.dispatch(&toks(&["nope"])).unwrap_err();
        match err {
            ShellError::UnknownCommand(name) => assert_eq!(name, "nope"),
            other => panic!("expected UnknownCommand, got {other}"),
        }
    }

    #[test]
    fn dispatch_survives_extra_arguments() {
        let mut sh = shell();
        sh.dispatch(&toks(&["cmd1", "1", "2", "3"])).unwrap();
        assert_eq!(sh.data, vec!["cmd1:1:2"]);
    }

    #[test]
    fn registration_is_last_write_wins() {
        let mut sh = shell();
        sh.register("cmd1", tracing_command("replacement"));
        sh.dispatch(&toks(&["cmd1"])).unwrap();
        assert_eq!(sh.data, vec!["replacement:-:-"]);
    }

    #[test]
    fn reserved_names_are_not_registrable() {
        let mut sh = shell();
        sh.register("exit", tracing_command("exit"));
        sh.register("quit", tracing_command("quit"));
        assert!(sh.lookup("exit").is_none());
        assert!(sh.lookup("quit").is_none());
    }

    #[test]
    fn case_insensitive_mode_lowers_names_on_both_sides() {
        let mut sh = Shell::new("test", Trace::new()).unwrap().case_insensitive(true);
        sh.register("Foo", tracing_command("foo"));
        sh.dispatch(&toks(&["foo", "x"])).unwrap();
        sh.dispatch(&toks(&["FOO", "y"])).unwrap();
        assert_eq!(sh.data, vec!["foo:x:-", "foo:y:-"]);
    }

    #[test]
    fn case_sensitive_mode_requires_an_exact_match() {
        let mut sh = Shell::new("test", Trace::new()).unwrap();
        sh.register("Foo", tracing_command("foo"));
        assert!(matches!(
            sh.dispatch(&toks(&["foo"])),
            Err(ShellError::UnknownCommand(_))
        ));
    }

    #[test]
    fn execute_line_splits_statements_and_stops_at_exit() {
        let mut sh = shell();
        let cancel = sh.execute_line("cmd1 1; cmd2 2; exit; cmd1 3");
        assert!(cancel);
        assert_eq!(sh.data, vec!["cmd1:1:-", "cmd2:2:-"]);
    }

    #[test]
    fn quit_terminates_like_exit() {
        let mut sh = shell();
        assert!(sh.execute_line("quit"));
    }

    #[test]
    fn statement_failures_do_not_stop_the_line() {
        let mut sh = shell();
        let cancel = sh.execute_line("nope; cmd1 ok");
        assert!(!cancel);
        assert_eq!(sh.data, vec!["cmd1:ok:-"]);
    }

    #[test]
    fn empty_statements_are_skipped() {
        let mut sh = shell();
        assert!(!sh.execute_line(" ; ;; cmd1 x ; "));
        assert_eq!(sh.data, vec!["cmd1:x:-"]);
    }

    #[test]
    fn handler_failures_propagate_without_ending_the_session() {
        let mut sh = shell();
        sh.register(
            "fail",
            Command {
                description: "always fails".to_string(),
                args: vec![],
                run: Box::new(|_, _| Err(anyhow::anyhow!("boom"))),
            },
        );
        let err = sh.dispatch(&toks(&["fail"])).unwrap_err();
        assert!(matches!(err, ShellError::Handler(_)));
        assert!(!sh.execute_line("fail; cmd1 after"));
        assert_eq!(sh.data, vec!["cmd1:after:-"]);
    }

    #[test]
    fn help_overview_lists_each_command_once() {
        let mut sh = shell();
        sh.register("help", Shell::help_command());
        let overview = help_overview(&sh);
        for name in ["cmd1", "cmd2", "help"] {
            assert_eq!(overview.matches(&format!("  {name}:")).count(), 1);
        }
    }

    #[test]
    fn help_detail_shows_parameters_and_defaults() {
        let mut sh = Shell::new("test", Trace::new()).unwrap();
        sh.register(
            "greet",
            Command {
                description: "Say hello".to_string(),
                args: vec![ArgSpec::new("who", "Name to greet", "world")],
                run: Box::new(|_, _| Ok(())),
            },
        );
        let detail = help_detail(&sh, "greet").unwrap();
        assert!(detail.contains("Command: greet"));
        assert!(detail.contains("Description: Say hello"));
        assert!(detail.contains("  who : Name to greet (default: world)"));
        assert!(help_detail(&sh, "missing").is_none());
    }

    #[test]
    fn help_with_unknown_command_fails() {
        let mut sh = shell();
        sh.register("help", Shell::help_command());
        let err = sh.dispatch(&toks(&["help", "missing"])).unwrap_err();
        assert!(err.to_string().contains("unknown command: missing"));
    }

    #[test]
    fn completions_are_always_case_insensitive() {
        let mut sh = Shell::new("test", Trace::new()).unwrap();
        sh.register("Foo", tracing_command("foo"));
        sh.register("foobar", tracing_command("foobar"));
        sh.register("other", tracing_command("other"));
        assert_eq!(sh.completions("FO"), vec!["Foo", "foobar"]);
        assert_eq!(sh.completions(""), vec!["Foo", "foobar", "other"]);
    }

    #[test]
    fn quoted_statement_tokens_reach_the_resolver_intact() {
        let mut sh = shell();
        sh.execute_line("cmd1 'first value' b=\"two words\"");
        assert_eq!(sh.data, vec!["cmd1:first value:two words"]);
    }
}
