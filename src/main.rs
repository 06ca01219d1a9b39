use std::path::Path;
use std::process;

use repver::cli;
use repver::config::{Config, CONFIG_FILE};
use repver::error::RepverError;
use repver::runner::{self, RunOptions};
use repver::{logger, validator};

fn main() {
    let args = cli::parse_args();

    if let Err(e) = logger::init(args.debug) {
        eprintln!("Warning: could not initialize debug logging: {e}");
    }

    if args.exists {
        exists_mode(args.command.as_deref());
    }

    let config = match Config::load(CONFIG_FILE) {
        Ok(config) => config,
        Err(e) => fail(&e, None),
    };

    if let Err(e) = validator::validate(&config) {
        fail(&e, None);
    }

    if args.dry_run {
        println!("DRY RUN MODE ENABLED");
    }

    let Some(command) = args.command else {
        fail(&RepverError::NoCommand, Some(&config));
    };

    let options = RunOptions {
        command,
        params: args.params,
        dry_run: args.dry_run,
    };

    if let Err(e) = runner::run(&config, &options) {
        fail(&e, Some(&config));
    }
}

/// Report a fatal error with its exit code, plus any help text the failure
/// calls for, then terminate
fn fail(err: &RepverError, config: Option<&Config>) -> ! {
    eprintln!("Error ({}): {err}", err.exit_code());

    let help = match err {
        RepverError::NoCommand | RepverError::CommandNotFound(_) => {
            config.map(cli::generate_help)
        }
        RepverError::MissingParameters { help } => Some(help.clone()),
        _ => None,
    };
    if let Some(help) = help {
        eprintln!("\n{help}");
    }

    process::exit(err.exit_code());
}

/// Handle `--exists`: check that `.repver` exists, parses, validates, and
/// contains the named command. Exit 0 on success, 1 otherwise, without
/// regard to parameter completeness.
fn exists_mode(command: Option<&str>) -> ! {
    let Some(command) = command else {
        eprintln!("--command is required with --exists");
        process::exit(1);
    };

    if !Path::new(CONFIG_FILE).exists() {
        eprintln!(".repver not found");
        process::exit(1);
    }

    let config = match Config::load(CONFIG_FILE) {
        Ok(config) => config,
        Err(_) => {
            eprintln!("invalid .repver");
            process::exit(1);
        }
    };

    if validator::validate(&config).is_err() {
        eprintln!("invalid .repver");
        process::exit(1);
    }

    if config.command(command).is_none() {
        eprintln!("command not found: {command}");
        process::exit(1);
    }

    process::exit(0);
}
