//! `rostersync create-submissions`: load intake submissions into the data
//! API.

use std::thread;

use rostersync_config::Pacing;
use rostersync_data_client::{DataClient, ProfilePages, SubmissionPages, UserPages};
use rostersync_recon::input::{load_intake, load_roster};
use rostersync_recon::{
    dedupe_submissions, drain, reconcile_submissions, AccountIndex, IntakeEntry, LedgerLabels,
    LedgerRecord, ProfileIndex, ResultLedger, RosterEntry, RosterIndex, SkippedRecord,
    SubmissionDecision, SubmissionIndex,
};

use crate::context::Context;
use crate::CliError;

pub const RESULTS_FILE: &str = "submissions_results.json";

pub fn cmd_create_submissions(ctx: &Context) -> Result<(), CliError> {
    let intake = load_intake(&ctx.intake_path())?;
    let roster = load_roster(&ctx.roster_path())?;
    let client = ctx.data_client()?;

    let ledger = create_submissions(&client, &intake, &roster, &ctx.settings.pacing)?;
    let counts = ledger.finalize(&ctx.results_path(RESULTS_FILE))?;

    crate::print_summary("Submission import", counts, ["created", "existing", "skipped"]);
    Ok(())
}

pub fn create_submissions(
    client: &DataClient,
    intake: &[IntakeEntry],
    roster: &[RosterEntry],
    pacing: &Pacing,
) -> Result<ResultLedger, CliError> {
    let users = drain(&UserPages(client), pacing.submission_pages())?;
    let profiles = drain(&ProfilePages(client), pacing.submission_pages())?;
    let existing = drain(&SubmissionPages(client), pacing.submission_pages())?;
    log::info!(
        "{} intake entries against {} users, {} profiles, {} existing submissions",
        intake.len(),
        users.len(),
        profiles.len(),
        existing.len()
    );

    let plan = reconcile_submissions(
        intake,
        &AccountIndex::build(&users),
        &ProfileIndex::build(&profiles),
        &RosterIndex::build(roster),
    );
    let plan = dedupe_submissions(plan, &SubmissionIndex::build(&existing));
    log::info!("{} to create, {} unresolved", plan.creates(), plan.skips());

    let skipped = |entry_index: usize, reason: String| {
        let entry = &intake[entry_index];
        let key = entry
            .auth_id()
            .unwrap_or_else(|| format!("entry {}", entry_index + 1));
        SkippedRecord::new(key, reason).with_entry(entry.to_value())
    };

    let mut ledger = ResultLedger::new(LedgerLabels::CREATE_SUBMISSIONS);
    let mut first_create = true;

    for decision in plan.decisions {
        match decision {
            SubmissionDecision::SkipUnresolved { entry_index, reason } => {
                ledger.record_skipped(skipped(entry_index, reason.to_string()));
            }
            SubmissionDecision::AlreadyPresent { email, existing_id, .. } => {
                ledger.record_linked(LedgerRecord::new(existing_id).with_email(email));
            }
            SubmissionDecision::CreateSubmission { email, entry_index, input } => {
                if !first_create {
                    thread::sleep(pacing.submission_create());
                }
                first_create = false;

                match client.create_submission(&input) {
                    Ok(created) => {
                        log::info!("created submission {} for {}", created.id, email);
                        let mut record = LedgerRecord::new(created.id).with_email(email);
                        if let Some(title) = input.title {
                            record = record.with_title(title);
                        }
                        ledger.record_created(record);
                    }
                    Err(e) => {
                        ledger.record_skipped(skipped(
                            entry_index,
                            format!("createSubmission failed: {e}"),
                        ));
                    }
                }
            }
        }
    }

    Ok(ledger)
}
