use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, FromArgMatches, Parser};
use std::io::Write;
use std::process::ExitCode;

mod admin;
mod cmd;
mod config;
mod utils;

use admin::{AdminError, RestTableAdmin, TableAdmin};
use config::{ClientFlags, ClientOptions};

/// Table Admin - one command per table administration call
///
/// Layout:
///   table-admin <command> <project-id> <instance-id> [arguments]
///
/// Global flags / env:
///   -v / -vv            Increase verbosity (logs go to stderr)
///   -q / --quiet        Errors only
///   --endpoint          Admin endpoint (or BIGTABLE_ADMIN_ENDPOINT)
///   --access-token      Bearer token (or BIGTABLE_ADMIN_ACCESS_TOKEN / GOOGLE_OAUTH_ACCESS_TOKEN)
///   --no-proxy          Ignore HTTP(S)_PROXY for the endpoint
///
/// Examples:
///   table-admin create-table my-project my-instance my-table
///   table-admin check-consistency my-project my-instance my-table <token>
///   table-admin list-snapshots my-project my-instance my-cluster
#[derive(Parser, Debug)]
#[command(
    name = "table-admin",
    version,
    author,
    about = "Table Admin - command-line examples for the table administration API",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Silence all non-error logging
    #[arg(short, long)]
    quiet: bool,

    /// Admin API endpoint (http or https URL)
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// OAuth2 access token sent as a bearer token
    #[arg(long, value_name = "TOKEN")]
    access_token: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Delay between consistency polls in milliseconds
    #[arg(long, value_name = "MS")]
    poll_interval_ms: Option<u64>,

    /// Maximum consistency polls before giving up
    #[arg(long, value_name = "N")]
    max_polls: Option<u32>,

    /// Ignore HTTP(S)_PROXY when talking to the endpoint
    #[arg(long)]
    no_proxy: bool,

    /// <command> <project-id> <instance-id> [arguments]
    #[arg(
        value_name = "ARGS",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    args: Vec<String>,
}

impl Cli {
    fn flags(&self) -> ClientFlags {
        ClientFlags {
            endpoint: self.endpoint.clone(),
            access_token: self.access_token.clone(),
            timeout_secs: self.timeout_secs,
            poll_interval_ms: self.poll_interval_ms,
            max_polls: self.max_polls,
            no_proxy: self.no_proxy,
        }
    }
}

fn program_name() -> String {
    std::env::args()
        .next()
        .as_deref()
        .map(|p| p.rsplit(['/', '\\']).next().unwrap_or(p).to_string())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| "table-admin".to_string())
}

/// Help and version go out through clap as usual; every other parse failure
/// is reported and mapped to the dispatcher's failure status.
fn parse_failure(e: clap::Error) -> ExitCode {
    match e.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => e.exit(),
        _ => {
            let _ = e.print();
            ExitCode::from(cmd::EXIT_FAILURE as u8)
        }
    }
}

fn main() -> Result<ExitCode> {
    let matches = match Cli::command()
        .after_help(format!("Commands:\n{}", cmd::usage_text()))
        .try_get_matches()
    {
        Ok(m) => m,
        Err(e) => return Ok(parse_failure(e)),
    };
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(c) => c,
        Err(e) => return Ok(parse_failure(e)),
    };

    utils::init_logging(utils::derive_level(cli.verbose, cli.quiet));

    let flags = cli.flags();
    let connect = move |project: &str, instance: &str| -> Result<Box<dyn TableAdmin>, AdminError> {
        let options = ClientOptions::resolve(flags)?;
        RestTableAdmin::new(project, instance, options)
            .map(|a| Box::new(a) as Box<dyn TableAdmin>)
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut err = std::io::stderr();
    let code = cmd::dispatch(cli.args, &program_name(), connect, &mut out, &mut err);
    out.flush().context("failed to flush stdout")?;

    Ok(ExitCode::from(code as u8))
}
