//! Command-line surface
//!
//! Parameter flags are declared by the configuration, not by this binary,
//! so parsing happens in two phases: `--param-<name>=<value>` tokens are
//! collected off the raw argument list first, and everything left goes
//! through clap. Which parameter names actually matter is decided later,
//! once the selected command is known.

use clap::Parser;
use std::collections::BTreeMap;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "repver")]
#[command(about = "Rewrite version strings across files, driven by a .repver configuration")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Command from .repver to execute
    #[arg(long)]
    command: Option<String>,

    /// Enable debug output on standard error
    #[arg(long)]
    debug: bool,

    /// Show what would change without writing files or performing git operations
    #[arg(long)]
    dry_run: bool,

    /// Check that .repver exists, validates, and contains --command
    #[arg(long)]
    exists: bool,
}

#[derive(Debug)]
pub struct Args {
    pub command: Option<String>,
    pub params: BTreeMap<String, String>,
    pub debug: bool,
    pub dry_run: bool,
    pub exists: bool,
}

pub fn parse_args() -> Args {
    parse_from(std::env::args())
}

/// Two-phase parse over an explicit argument list
pub fn parse_from<I>(args: I) -> Args
where
    I: IntoIterator<Item = String>,
{
    let mut rest = Vec::new();
    let mut params = BTreeMap::new();

    let mut iter = args.into_iter();
    if let Some(program) = iter.next() {
        rest.push(program);
    }

    while let Some(arg) = iter.next() {
        if let Some(flag) = arg.strip_prefix("--param-") {
            match flag.split_once('=') {
                Some((name, value)) => {
                    params.insert(name.to_string(), value.to_string());
                }
                None => {
                    // Space-separated form: the next token is the value
                    let value = iter.next().unwrap_or_default();
                    params.insert(flag.to_string(), value);
                }
            }
        } else {
            rest.push(arg);
        }
    }

    let cli = Cli::parse_from(rest);

    Args {
        command: cli.command,
        params,
        debug: cli.debug,
        dry_run: cli.dry_run,
        exists: cli.exists,
    }
}

/// Help message listing every configured command with its parameters,
/// sorted by command name
pub fn generate_help(config: &Config) -> String {
    let mut help = String::new();

    help.push_str("USAGE:\n");
    help.push_str("  repver --command=<command_name> [--param-<name>=<value> ...] [OPTIONS]\n\n");
    help.push_str("AVAILABLE COMMANDS:\n");

    if config.commands.is_empty() {
        help.push_str("  No commands defined in .repver configuration\n");
        return help;
    }

    let max_name_len = config
        .commands
        .iter()
        .map(|c| c.name.len())
        .max()
        .unwrap_or(0);

    let mut commands: Vec<_> = config.commands.iter().collect();
    commands.sort_by(|a, b| a.name.cmp(&b.name));

    for command in commands {
        // Skip commands whose patterns cannot be enumerated
        let Ok(params) = command.parameter_names() else {
            continue;
        };

        let padding = " ".repeat(max_name_len - command.name.len() + 2);
        help.push_str(&format!("  {}{}", command.name, padding));

        if params.is_empty() {
            help.push_str("No parameters required\n");
            help.push_str(&format!("    Example: repver --command={}\n\n", command.name));
        } else {
            help.push_str(&format!("Parameters: [{}]\n", params.join(", ")));
            help.push_str(&format!("    Example: repver --command={}", command.name));
            for param in &params {
                help.push_str(&format!(" --param-{param}=<value>"));
            }
            help.push_str("\n\n");
        }
    }

    help.push_str("OPTIONS:\n");
    help.push_str("  --debug    Enable debug output\n");
    help.push_str(
        "  --dry-run  Show what would be changed without modifying files or performing git operations\n",
    );

    help
}

/// Targeted usage hint for a command invoked with parameters missing
pub fn missing_parameters_help(command: &str, missing: &[String], required: &[String]) -> String {
    let mut help = String::new();

    help.push_str(&format!(
        "Command '{command}' requires the following parameters:\n"
    ));
    for param in missing {
        help.push_str(&format!("  --param-{param}=<value>\n"));
    }

    help.push_str("\nComplete usage example:\n");
    help.push_str(&format!("  repver --command={command}"));
    for param in required {
        help.push_str(&format!(" --param-{param}=<value>"));
    }

    help
}
