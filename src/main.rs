use clap::Parser;
use eyre::{Context, Result};
use log::info;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

mod cli;
mod commands;
mod config;
mod hook;
mod notify;
mod observability;
#[cfg(test)]
mod test_support;

use cli::{Cli, Commands};
use config::{Config, LogLevel};
use observability::hook_name_from_path;

const BIN_NAME: &str = "hookcast";

fn setup_logging(log_level: &LogLevel) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(BIN_NAME)
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("hookcast.log");

    // Hooks must keep stdout/stderr clean for the host, so logs only go to the file
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // RUST_LOG env var takes precedence, otherwise use config log_level
    let mut builder = env_logger::Builder::new();

    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    } else {
        builder.filter_level(log_level.as_filter());
    }

    builder.target(env_logger::Target::Pipe(target)).try_init()?;

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

/// When invoked through a symlink named after a hook, run that hook
fn hook_args(mut args: Vec<OsString>) -> Vec<OsString> {
    let invoked_as = args.first().and_then(|arg0| hook_name_from_path(Path::new(arg0)));

    match invoked_as {
        Some(name) if name != BIN_NAME => {
            args.splice(1..1, [OsString::from("hook"), OsString::from(name)]);
            args
        }
        _ => args,
    }
}

/// Strip a rejected hook command line down to `hook <name>`
fn bare_hook_args(args: &[OsString]) -> Option<Vec<OsString>> {
    match args {
        [arg0, sub, name, ..] if sub == "hook" && !name.to_string_lossy().starts_with('-') => {
            Some(vec![arg0.clone(), sub.clone(), name.clone()])
        }
        _ => None,
    }
}

/// Parse argv, returning a warning to log once logging is up.
///
/// clap exits with status 2 on bad arguments, which the host reads as a block,
/// so a hook whose extra arguments are rejected still runs with its defaults.
fn parse_cli(args: Vec<OsString>) -> (Cli, Option<String>) {
    let args = hook_args(args);

    let err = match Cli::try_parse_from(args.clone()) {
        Ok(cli) => return (cli, None),
        Err(e) => e,
    };

    if err.use_stderr()
        && let Some(bare) = bare_hook_args(&args)
        && let Ok(cli) = Cli::try_parse_from(bare)
    {
        let reason = err.to_string();
        let warning = format!(
            "Ignoring rejected hook arguments: {}",
            reason.lines().next().unwrap_or_default()
        );
        return (cli, Some(warning));
    }

    err.exit()
}

fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Send {
            event_type,
            data,
            meta,
            dry_run,
        } => commands::send::run(&event_type, data.as_deref(), &meta, dry_run, &config),
        Commands::Hook { name, notify, payload } => commands::hook::run(&name, notify, payload.as_deref(), &config),
        Commands::Speak { message, backend } => commands::speak::run(&message, backend.as_deref(), &config),
        Commands::Doctor => commands::doctor::run(&config),
        Commands::Config { action } => commands::config::run(action, &config),
        Commands::Completions { shell } => commands::completions::run(shell),
    }
}

fn main() -> Result<()> {
    let (cli, arg_warning) = parse_cli(std::env::args_os().collect());
    let is_hook = matches!(cli.command, Commands::Hook { .. });

    // Load configuration (before logging, so log messages in Config::load are silent)
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // A hook keeps running without a log file rather than failing the host
    if let Err(e) = setup_logging(&config.log_level)
        && !is_hook
    {
        eprintln!("warning: logging disabled: {:#}", e);
    }

    if let Some(warning) = arg_warning {
        log::warn!("{}", warning);
    }

    info!("Starting hookcast with config from: {:?}", cli.config);

    run(cli, config).context("Command failed")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<OsString> {
        list.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_hook_args_passthrough() {
        let input = args(&["/usr/local/bin/hookcast", "doctor"]);
        assert_eq!(hook_args(input.clone()), input);
    }

    #[test]
    fn test_hook_args_from_symlink_name() {
        let rewritten = hook_args(args(&["/home/me/.claude/hooks/notification", "--notify"]));
        assert_eq!(rewritten, args(&["/home/me/.claude/hooks/notification", "hook", "notification", "--notify"]));
    }

    #[test]
    fn test_hook_args_strips_extension() {
        let rewritten = hook_args(args(&["hooks/pre_tool_use.hook"]));
        assert_eq!(rewritten, args(&["hooks/pre_tool_use.hook", "hook", "pre_tool_use"]));
    }

    #[test]
    fn test_parse_cli_symlinked_hook_ignores_bad_flag() {
        let (cli, warning) = parse_cli(args(&["/home/me/.claude/hooks/notification", "--bogus"]));
        assert!(warning.is_some());
        match cli.command {
            Commands::Hook { name, notify, payload } => {
                assert_eq!(name, "notification");
                assert!(!notify);
                assert!(payload.is_none());
            }
            _ => panic!("expected hook command"),
        }
    }

    #[test]
    fn test_parse_cli_explicit_hook_ignores_bad_flag() {
        let (cli, warning) = parse_cli(args(&["hookcast", "hook", "pre_tool_use", "--notfy"]));
        assert!(warning.is_some());
        assert!(matches!(cli.command, Commands::Hook { name, .. } if name == "pre_tool_use"));
    }

    #[test]
    fn test_parse_cli_valid_args_have_no_warning() {
        let (cli, warning) = parse_cli(args(&["/hooks/stop", "--notify"]));
        assert!(warning.is_none());
        assert!(matches!(cli.command, Commands::Hook { notify: true, .. }));
    }

    #[test]
    fn test_bare_hook_args() {
        assert_eq!(
            bare_hook_args(&args(&["hookcast", "hook", "stop", "--x", "y"])),
            Some(args(&["hookcast", "hook", "stop"]))
        );
        assert_eq!(bare_hook_args(&args(&["hookcast", "hook", "--x"])), None);
        assert_eq!(bare_hook_args(&args(&["hookcast", "send", "x"])), None);
    }
}
