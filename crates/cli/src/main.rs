// rostersync CLI - one subcommand per migration script
// Every command re-reads remote state and only writes what is missing, so a
// run can be repeated after a partial failure.

mod context;
mod exit_codes;
mod identities;
mod lookup;
mod profiles;
mod roster;
mod submissions;
mod sync;

use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use rostersync_aws::AwsError;
use rostersync_config::ConfigError;
use rostersync_data_client::DataApiError;
use rostersync_recon::{DrainError, LedgerCounts, ReconError};

use context::Context;
use exit_codes::{
    EXIT_CONFIG, EXIT_ERROR, EXIT_FETCH, EXIT_INPUT, EXIT_RESULTS_WRITE, EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Debug, Parser)]
#[command(name = "rostersync")]
#[command(about = "Idempotent migration scripts for the roster backend")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Directory holding amplify_outputs.json, rostersync.toml and scripts/
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create a data API user for every identity account that lacks one
    #[command(after_help = "\
Examples:
  rostersync sync-accounts
  rostersync --root ../backend sync-accounts
  RUST_LOG=debug rostersync sync-accounts

Results: scripts/sync_results.json")]
    SyncAccounts,

    /// Create identity accounts for roster entries with the student role
    #[command(after_help = "\
Examples:
  rostersync seed-identities

Results: scripts/identity_results.json
Temporary passwords: scripts/user_credentials.json")]
    SeedIdentities,

    /// Create or link a student profile for every student account
    #[command(after_help = "\
Examples:
  rostersync link-profiles
  rostersync --root ../backend link-profiles

Results: scripts/student_profiles_results.json")]
    LinkProfiles,

    /// Create submissions from the intake file, skipping ones already present
    #[command(after_help = "\
Examples:
  rostersync create-submissions

Results: scripts/submissions_results.json")]
    CreateSubmissions,

    /// Write every roster entry to the roster table
    #[command(after_help = "\
Examples:
  rostersync upload-roster
  AWS_PROFILE=staging rostersync upload-roster

Results: scripts/roster_upload_results.json")]
    UploadRoster,

    /// Print the student profile belonging to an identity account
    #[command(after_help = "\
Examples:
  rostersync find-profile 3f1c2a9e-0b7d-4c1e-9a55-2d6f0e8b1c44
  rostersync find-profile 3f1c2a9e-0b7d-4c1e-9a55-2d6f0e8b1c44 > profile.json")]
    FindProfile {
        /// Identity account id (the account's cognitoId)
        account_id: String,
    },
}

fn long_version() -> &'static str {
    concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_COMMIT_HASH"), ")")
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(usage_exit_code(&e));
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let result = Context::load(cli.root).and_then(|ctx| match cli.command {
        Commands::SyncAccounts => sync::cmd_sync_accounts(&ctx),
        Commands::SeedIdentities => identities::cmd_seed_identities(&ctx),
        Commands::LinkProfiles => profiles::cmd_link_profiles(&ctx),
        Commands::CreateSubmissions => submissions::cmd_create_submissions(&ctx),
        Commands::UploadRoster => roster::cmd_upload_roster(&ctx),
        Commands::FindProfile { account_id } => lookup::cmd_find_profile(&ctx, &account_id),
    });

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

/// `--help` and `--version` come through clap's error path too.
fn usage_exit_code(err: &clap::Error) -> u8 {
    if err.use_stderr() {
        EXIT_USAGE
    } else {
        EXIT_SUCCESS
    }
}

/// Print the end-of-run summary to stdout.
pub(crate) fn print_summary(title: &str, counts: LedgerCounts, labels: [&str; 3]) {
    println!("\n{}", title);
    println!("  {:<10} {}", labels[0], counts.created);
    println!("  {:<10} {}", labels[1], counts.linked);
    println!("  {:<10} {}", labels[2], counts.skipped);
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn fetch(msg: impl Into<String>) -> Self {
        Self { code: EXIT_FETCH, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        let hint = match &err {
            ConfigError::Missing { .. } => {
                Some("run from the backend checkout, or pass --root <dir>".to_string())
            }
            ConfigError::MissingSection { section: "auth", .. } => {
                Some("deploy the auth resource before running identity commands".to_string())
            }
            ConfigError::MissingSection { section: "data", .. } => {
                Some("deploy the data resource before running data commands".to_string())
            }
            _ => None,
        };
        Self { code: EXIT_CONFIG, message: err.to_string(), hint }
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        match err {
            ReconError::Write { .. } => Self {
                code: EXIT_RESULTS_WRITE,
                message: err.to_string(),
                hint: Some("remote writes already ran; rerunning is safe".to_string()),
            },
            ReconError::Io { .. } | ReconError::Parse { .. } => Self {
                code: EXIT_INPUT,
                message: err.to_string(),
                hint: None,
            },
        }
    }
}

impl<E: fmt::Display> From<DrainError<E>> for CliError {
    fn from(err: DrainError<E>) -> Self {
        CliError::fetch(err.to_string())
            .with_hint("no records were written; rerun once the service is reachable")
    }
}

impl From<AwsError> for CliError {
    fn from(err: AwsError) -> Self {
        let code = match err {
            AwsError::Config(_) => EXIT_CONFIG,
            _ => EXIT_ERROR,
        };
        Self { code, message: err.to_string(), hint: None }
    }
}

impl From<DataApiError> for CliError {
    fn from(err: DataApiError) -> Self {
        let hint = match &err {
            DataApiError::Http(401, _) | DataApiError::Http(403, _) => {
                Some("check data.api_key in amplify_outputs.json; API keys expire".to_string())
            }
            _ => None,
        };
        Self { code: EXIT_ERROR, message: err.to_string(), hint }
    }
}
