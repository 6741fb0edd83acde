//! Interactive demo: a small key/value store driven through the shell.
//!
//! ```text
//! kvdemo> set name "Ada Lovelace"
//! kvdemo> get name
//! Ada Lovelace
//! kvdemo> list; exit
//! ```

use argh::FromArgs;
use shell_cli::{ArgSpec, Command, Shell, Termination, arg_or};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(FromArgs)]
/// An interactive key/value store shell.
struct DemoArgs {
    /// path of the history file; defaults to a file in the system temp dir
    #[argh(option)]
    history: Option<PathBuf>,

    /// match command names case-insensitively
    #[argh(switch)]
    ignore_case: bool,
}

/// The session payload: a sorted key/value store.
type Store = BTreeMap<String, String>;

fn set_command() -> Command<Store> {
    Command {
        description: "Store a value under a key".to_string(),
        args: vec![
            ArgSpec::new("key", "Key to store under", ""),
            ArgSpec::new("value", "Value to store", ""),
        ],
        run: Box::new(|shell, args| {
            let key = args
                .get("key")
                .ok_or_else(|| anyhow::anyhow!("missing key"))?;
            let value = arg_or(args, "value", "");
            shell.data.insert(key.clone(), value.to_string());
            Ok(())
        }),
    }
}

fn get_command() -> Command<Store> {
    Command {
        description: "Print the value stored under a key".to_string(),
        args: vec![
            ArgSpec::new("key", "Key to look up", ""),
            ArgSpec::new("fallback", "Value printed when the key is absent", "<unset>"),
        ],
        run: Box::new(|shell, args| {
            let key = args
                .get("key")
                .ok_or_else(|| anyhow::anyhow!("missing key"))?;
            let fallback = arg_or(args, "fallback", "<unset>");
            println!("{}", shell.data.get(key).map_or(fallback, String::as_str));
            Ok(())
        }),
    }
}

fn del_command() -> Command<Store> {
    Command {
        description: "Delete a key".to_string(),
        args: vec![ArgSpec::new("key", "Key to delete", "")],
        run: Box::new(|shell, args| {
            let key = args
                .get("key")
                .ok_or_else(|| anyhow::anyhow!("missing key"))?;
            if shell.data.remove(key).is_none() {
                anyhow::bail!("no such key: {key}");
            }
            Ok(())
        }),
    }
}

fn list_command() -> Command<Store> {
    Command {
        description: "List all stored keys and values".to_string(),
        args: vec![],
        run: Box::new(|shell, _args| {
            for (key, value) in &shell.data {
                println!("{key} = {value}");
            }
            Ok(())
        }),
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args: DemoArgs = argh::from_env();

    let mut shell = match Shell::new("kvdemo", Store::new()) {
        Ok(shell) => shell.case_insensitive(args.ignore_case),
        Err(err) => {
            eprintln!("Error initializing cli: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(path) = args.history {
        shell = shell.history_path(path);
    }

    shell.register("set", set_command());
    shell.register("get", get_command());
    shell.register("del", del_command());
    shell.register("list", list_command());
    shell.register("help", Shell::help_command());

    match shell.run() {
        Ok(Termination::Exit | Termination::EndOfInput) => ExitCode::SUCCESS,
        // Hard-exit policy for the standalone binary; embedders of the
        // library can react to Interrupted however they like.
        Ok(Termination::Interrupted) => ExitCode::from(130),
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
