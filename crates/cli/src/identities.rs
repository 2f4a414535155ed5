//! `rostersync seed-identities`: create identity accounts for the roster.

use std::thread;

use serde::Serialize;

use rostersync_aws::{generate_temporary_password, IdentityDirectory, IdentityPages};
use rostersync_config::Pacing;
use rostersync_recon::input::load_roster;
use rostersync_recon::ledger::write_json;
use rostersync_recon::{
    drain, plan_identities, IdentityDecision, IdentityFilter, LedgerLabels, LedgerRecord,
    ResultLedger, RosterEntry, SkippedRecord,
};

use crate::context::Context;
use crate::CliError;

pub const RESULTS_FILE: &str = "identity_results.json";
pub const CREDENTIALS_FILE: &str = "user_credentials.json";

/// Temporary password handed to a newly created account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credential {
    pub email: String,
    pub temporary_password: String,
}

pub fn cmd_seed_identities(ctx: &Context) -> Result<(), CliError> {
    let roster = load_roster(&ctx.roster_path())?;
    let directory = ctx.identity_directory()?;
    let filter = IdentityFilter {
        role: ctx.settings.identities.role.clone(),
        email_suffix: ctx.settings.identities.email_suffix.clone(),
    };

    let (ledger, credentials) = seed_identities(
        &directory,
        &roster,
        &filter,
        &ctx.settings.pacing,
        generate_temporary_password,
    )?;

    // Passwords first: if the results write fails they are still on disk.
    if !credentials.is_empty() {
        let path = ctx.results_path(CREDENTIALS_FILE);
        write_json(&path, &credentials)?;
        log::info!("{} temporary passwords saved to {}", credentials.len(), path.display());
    }
    let counts = ledger.finalize(&ctx.results_path(RESULTS_FILE))?;

    crate::print_summary("Identity seeding", counts, ["created", "existing", "skipped"]);
    Ok(())
}

/// Create an account for every eligible roster entry the directory does
/// not already hold. `password` supplies each temporary password.
pub fn seed_identities<D, P>(
    directory: &D,
    roster: &[RosterEntry],
    filter: &IdentityFilter,
    pacing: &Pacing,
    mut password: P,
) -> Result<(ResultLedger, Vec<Credential>), CliError>
where
    D: IdentityDirectory + ?Sized,
    P: FnMut() -> String,
{
    let existing = drain(&IdentityPages(directory), pacing.identity_pages())?;
    let plan = plan_identities(roster, &existing, filter);
    log::info!(
        "{} eligible roster entries, {} existing accounts, {} to create",
        plan.eligible,
        existing.len(),
        plan.creates()
    );

    let mut ledger = ResultLedger::new(LedgerLabels::SEED_IDENTITIES);
    let mut credentials = Vec::new();
    let mut first_create = true;

    for decision in plan.decisions {
        match decision {
            IdentityDecision::AlreadyPresent { email, username } => {
                ledger.record_linked(LedgerRecord::new(username).with_email(email));
            }
            IdentityDecision::SkipNoEmail { roster_id } => {
                let key = roster_id.unwrap_or_else(|| "(no id)".to_string());
                ledger.record_skipped(SkippedRecord::new(key, "roster entry has no email"));
            }
            IdentityDecision::CreateIdentity { email } => {
                if !first_create {
                    thread::sleep(pacing.account_create());
                }
                first_create = false;

                let temporary_password = password();
                match directory.create_account(&email, &temporary_password) {
                    Ok(username) => {
                        log::info!("created identity {} ({})", email, username);
                        ledger.record_created(LedgerRecord::new(username).with_email(email.clone()));
                        credentials.push(Credential { email, temporary_password });
                    }
                    Err(e) => {
                        ledger.record_skipped(SkippedRecord::new(email, e));
                    }
                }
            }
        }
    }

    Ok((ledger, credentials))
}
