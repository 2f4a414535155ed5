//! `rostersync find-profile`: resolve an identity account to its student
//! profile and print the full record.

use serde_json::Value;

use rostersync_config::Pacing;
use rostersync_data_client::{DataClient, ProfilePages};
use rostersync_recon::{drain, Account, Profile};

use crate::context::Context;
use crate::CliError;

pub fn cmd_find_profile(ctx: &Context, account_id: &str) -> Result<(), CliError> {
    let client = ctx.data_client()?;
    let profile = find_profile(&client, account_id, &ctx.settings.pacing)?;

    let text = serde_json::to_string_pretty(&profile)
        .map_err(|e| CliError::general(format!("cannot render profile: {e}")))?;
    println!("{}", text);
    Ok(())
}

/// How a profile was tied to the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchedBy {
    Owner,
    ContactEmail,
}

/// Owner match first (the profile's `userId` holds either of the account's
/// ids), then the contact email.
pub fn match_profile<'a>(account: &Account, profiles: &'a [Profile]) -> Option<(&'a Profile, MatchedBy)> {
    let owned = profiles.iter().find(|p| {
        p.owner_account_id
            .as_deref()
            .is_some_and(|owner| owner == account.account_id || owner == account.internal_id)
    });
    if let Some(profile) = owned {
        return Some((profile, MatchedBy::Owner));
    }

    let email = account.email.as_deref()?;
    profiles
        .iter()
        .find(|p| p.contact_email.as_deref() == Some(email))
        .map(|p| (p, MatchedBy::ContactEmail))
}

pub fn find_profile(client: &DataClient, account_id: &str, pacing: &Pacing) -> Result<Value, CliError> {
    if account_id.trim().is_empty() {
        return Err(CliError::usage("account id must not be blank"));
    }

    let users = client
        .list_user_by_cognito_id(account_id)
        .map_err(|e| CliError::fetch(format!("user lookup failed: {e}")))?;
    let Some(account) = users.into_iter().next() else {
        return Err(CliError::general(format!("no user with cognitoId {account_id}"))
            .with_hint("run sync-accounts to mirror identity accounts into the data API"));
    };
    log::info!("user {} ({})", account.internal_id, account.email.as_deref().unwrap_or("no email"));

    let profiles = drain(&ProfilePages(client), pacing.profile_pages())?;
    let Some((profile, matched_by)) = match_profile(&account, &profiles) else {
        return Err(CliError::general(format!(
            "no student profile for user {} among {} profiles",
            account.internal_id,
            profiles.len()
        ))
        .with_hint("run link-profiles to create missing profiles"));
    };
    log::info!("profile {} matched by {:?}", profile.id, matched_by);

    client
        .get_student_profile(&profile.id)
        .map_err(|e| CliError::fetch(format!("profile read failed: {e}")))?
        .ok_or_else(|| CliError::general(format!("profile {} disappeared during lookup", profile.id)))
}
