//! `rostersync sync-accounts`: mirror identity accounts into the data API.

use std::thread;

use rostersync_aws::{IdentityDirectory, IdentityPages};
use rostersync_config::Pacing;
use rostersync_data_client::{DataClient, UserPages};
use rostersync_recon::{
    drain, reconcile_accounts, AccountDecision, AccountIndex, LedgerLabels, LedgerRecord,
    ResultLedger, SkippedRecord,
};

use crate::context::Context;
use crate::CliError;

pub const RESULTS_FILE: &str = "sync_results.json";

pub fn cmd_sync_accounts(ctx: &Context) -> Result<(), CliError> {
    let directory = ctx.identity_directory()?;
    let client = ctx.data_client()?;

    let ledger = sync_accounts(&directory, &client, &ctx.settings.pacing)?;
    let counts = ledger.finalize(&ctx.results_path(RESULTS_FILE))?;

    crate::print_summary("Account sync", counts, ["created", "existing", "skipped"]);
    Ok(())
}

/// Fetch both sides in full, then create a data API user for every
/// identity account that has none. Create failures are recorded as skips.
pub fn sync_accounts<D: IdentityDirectory + ?Sized>(
    directory: &D,
    client: &DataClient,
    pacing: &Pacing,
) -> Result<ResultLedger, CliError> {
    let identities = drain(&IdentityPages(directory), pacing.identity_pages())?;
    let users = drain(&UserPages(client), pacing.profile_pages())?;
    log::info!("{} identity accounts, {} users", identities.len(), users.len());

    let index = AccountIndex::build(&users);
    let plan = reconcile_accounts(&identities, &index);
    log::info!("{} to create, {} already present", plan.creates(), plan.existing());

    let mut ledger = ResultLedger::new(LedgerLabels::SYNC_ACCOUNTS);
    let mut first_create = true;

    for decision in plan.decisions {
        match decision {
            AccountDecision::AlreadyPresent { email, internal_id, .. } => {
                ledger.record_linked(LedgerRecord::new(internal_id).with_email(email));
            }
            AccountDecision::SkipNoEmail { username } => {
                ledger.record_skipped(SkippedRecord::new(username, "identity account has no email"));
            }
            AccountDecision::SkipRepeat { username, email } => {
                ledger.record_skipped(SkippedRecord::new(
                    username,
                    format!("repeats {email}, already handled in this run"),
                ));
            }
            AccountDecision::CreateAccount { input } => {
                if !first_create {
                    thread::sleep(pacing.account_create());
                }
                first_create = false;

                match client.create_user(&input) {
                    Ok(created) => {
                        log::info!("created user {} for {}", created.id, input.email);
                        ledger.record_created(LedgerRecord::new(created.id).with_email(input.email));
                    }
                    Err(e) => {
                        ledger.record_skipped(SkippedRecord::new(
                            input.email,
                            format!("createUser failed: {e}"),
                        ));
                    }
                }
            }
        }
    }

    Ok(ledger)
}
