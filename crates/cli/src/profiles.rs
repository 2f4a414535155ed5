//! `rostersync link-profiles`: give every student account a profile and a
//! back-reference to it.

use std::collections::HashMap;
use std::thread;

use rostersync_config::Pacing;
use rostersync_data_client::{DataClient, DataApiError, ProfilePages, UserPages};
use rostersync_recon::input::load_roster;
use rostersync_recon::{
    drain, reconcile_profiles, Account, LedgerLabels, LedgerRecord, LinkPlan, LinkedProfiles,
    PendingLink, ProfileDecision, ProfileIndex, ProfileRef, ProfileTarget, ResultLedger,
    RosterEntry, RosterIndex, SkippedRecord,
};

use crate::context::Context;
use crate::CliError;

pub const RESULTS_FILE: &str = "student_profiles_results.json";

pub fn cmd_link_profiles(ctx: &Context) -> Result<(), CliError> {
    let roster = load_roster(&ctx.roster_path())?;
    let client = ctx.data_client()?;
    let target = ProfileTarget {
        role: ctx.settings.profiles.role.clone(),
        link_type: ctx.settings.profiles.link_type.clone(),
    };

    let ledger = link_profiles(&client, &roster, &target, &ctx.settings.pacing)?;
    let counts = ledger.finalize(&ctx.results_path(RESULTS_FILE))?;

    crate::print_summary("Profile linking", counts, ["created", "linked", "skipped"]);
    Ok(())
}

pub fn link_profiles(
    client: &DataClient,
    roster: &[RosterEntry],
    target: &ProfileTarget,
    pacing: &Pacing,
) -> Result<ResultLedger, CliError> {
    let users = drain(&UserPages(client), pacing.profile_pages())?;
    let profiles = drain(&ProfilePages(client), pacing.profile_pages())?;
    log::info!(
        "{} users, {} profiles, {} roster entries",
        users.len(),
        profiles.len(),
        roster.len()
    );

    let plan = reconcile_profiles(
        &users,
        &ProfileIndex::build(&profiles),
        &RosterIndex::build(roster),
        target,
    );
    log::info!(
        "{} accounts with role {}: {} to create, {} to link, {} without roster entry",
        plan.considered,
        target.role,
        plan.creates(),
        plan.links(),
        plan.skips()
    );

    let listed: HashMap<&str, &Account> =
        users.iter().map(|u| (u.internal_id.as_str(), u)).collect();
    Ok(execute(client, plan, &listed, pacing))
}

/// What a link step reports back to the ledger once it has run.
struct Outcome {
    email: Option<String>,
    profile_id: String,
    created: bool,
}

/// Run a plan in order. A create stores the new id under its decision
/// index; the update that follows resolves against it. Nothing is recorded
/// as created or linked until the back-reference is in place.
fn execute(
    client: &DataClient,
    plan: LinkPlan,
    listed: &HashMap<&str, &Account>,
    pacing: &Pacing,
) -> ResultLedger {
    let mut ledger = ResultLedger::new(LedgerLabels::LINK_PROFILES);
    let mut created_ids: HashMap<usize, String> = HashMap::new();
    let mut first_create = true;

    for (at, decision) in plan.decisions.into_iter().enumerate() {
        match decision {
            ProfileDecision::SkipNoRosterMatch { account_id, email } => {
                let key = email.unwrap_or(account_id);
                ledger.record_skipped(SkippedRecord::new(key, "no matching roster entry"));
            }
            ProfileDecision::LinkExisting { email, profile_id, .. } => {
                log::debug!("{} already has profile {}", email.as_deref().unwrap_or("?"), profile_id);
            }
            ProfileDecision::CreateProfile { email, input, .. } => {
                if !first_create {
                    thread::sleep(pacing.profile_create());
                }
                first_create = false;

                match client.create_student_profile(&input) {
                    Ok(profile) => {
                        log::info!("created profile {} for {}", profile.id, email);
                        created_ids.insert(at, profile.id);
                    }
                    Err(e) => {
                        ledger.record_skipped(SkippedRecord::new(
                            email,
                            format!("createStudentProfile failed: {e}"),
                        ));
                    }
                }
            }
            ProfileDecision::UpdateLinkedProfiles { account_id, email, add } => {
                let Some(outcome) =
                    link(client, &account_id, email, &add, &created_ids, listed, &mut ledger)
                else {
                    continue;
                };
                let mut record = LedgerRecord::new(outcome.profile_id);
                if let Some(email) = outcome.email {
                    record = record.with_email(email);
                }
                if outcome.created {
                    ledger.record_created(record);
                } else {
                    ledger.record_linked(record);
                }
            }
        }
    }

    ledger
}

/// Merge one link into the account's current `linkedProfiles` and write it
/// back when it changed. `None` when the step was skipped.
fn link(
    client: &DataClient,
    account_id: &str,
    email: Option<String>,
    add: &PendingLink,
    created_ids: &HashMap<usize, String>,
    listed: &HashMap<&str, &Account>,
    ledger: &mut ResultLedger,
) -> Option<Outcome> {
    let key = email.clone().unwrap_or_else(|| account_id.to_string());

    // An unresolved create already recorded its own skip.
    let link = add.resolve(created_ids)?;
    let created = matches!(add.profile, ProfileRef::Created(_));

    let mut current = match current_links(client, account_id, listed) {
        Ok(links) => links,
        Err(e) => {
            ledger.record_skipped(SkippedRecord::new(
                key,
                format!("profile {} not linked: getUser failed: {e}", link.id),
            ));
            return None;
        }
    };

    if current.merge(&link) {
        if let Err(e) = client.update_user_linked_profiles(account_id, &current) {
            ledger.record_skipped(SkippedRecord::new(
                key,
                format!("profile {} not linked: updateUser failed: {e}", link.id),
            ));
            return None;
        }
        log::info!("linked profile {} to user {}", link.id, account_id);
    }

    Some(Outcome {
        email,
        profile_id: link.id,
        created,
    })
}

/// Fresh `linkedProfiles` for an account. Falls back to the listed copy
/// when the account has vanished since the list.
fn current_links(
    client: &DataClient,
    account_id: &str,
    listed: &HashMap<&str, &Account>,
) -> Result<LinkedProfiles, DataApiError> {
    match client.get_user(account_id)? {
        Some(account) => Ok(account.linked_profiles),
        None => Ok(listed
            .get(account_id)
            .map(|a| a.linked_profiles.clone())
            .unwrap_or_default()),
    }
}
