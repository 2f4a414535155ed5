//! Lookup indexes, built once at the start of a run and passed by
//! reference into the reconcilers.

use std::collections::HashMap;

use crate::model::{Account, IdentityAccount, Profile, RosterEntry, Submission};

/// Accounts by email and by identity-provider id. Last write wins.
#[derive(Debug, Default)]
pub struct AccountIndex<'a> {
    by_email: HashMap<&'a str, &'a Account>,
    by_account_id: HashMap<&'a str, &'a Account>,
}

impl<'a> AccountIndex<'a> {
    pub fn build(accounts: &'a [Account]) -> Self {
        let mut index = Self::default();
        for account in accounts {
            if let Some(email) = account.email.as_deref() {
                index.by_email.insert(email, account);
            }
            if !account.account_id.is_empty() {
                index.by_account_id.insert(account.account_id.as_str(), account);
            }
        }
        index
    }

    /// Exact, case-sensitive email match.
    pub fn by_email(&self, email: &str) -> Option<&'a Account> {
        self.by_email.get(email).copied()
    }

    pub fn by_account_id(&self, account_id: &str) -> Option<&'a Account> {
        self.by_account_id.get(account_id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_email.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_email.is_empty()
    }
}

/// Profiles by owning account id.
///
/// Duplicates mean a previous run stopped part-way; the last one listed
/// wins and no error is raised.
#[derive(Debug, Default)]
pub struct ProfileIndex<'a> {
    by_owner: HashMap<&'a str, &'a Profile>,
}

impl<'a> ProfileIndex<'a> {
    pub fn build(profiles: &'a [Profile]) -> Self {
        let by_owner = profiles
            .iter()
            .filter_map(|p| p.owner_account_id.as_deref().map(|owner| (owner, p)))
            .collect();
        Self { by_owner }
    }

    pub fn by_owner(&self, account_id: &str) -> Option<&'a Profile> {
        self.by_owner.get(account_id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_owner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_owner.is_empty()
    }
}

/// Roster entries by `id` and by `email`. The first entry listed wins,
/// matching a front-to-back scan of the file.
#[derive(Debug, Default)]
pub struct RosterIndex<'a> {
    by_id: HashMap<&'a str, &'a RosterEntry>,
    by_email: HashMap<&'a str, &'a RosterEntry>,
}

impl<'a> RosterIndex<'a> {
    pub fn build(roster: &'a [RosterEntry]) -> Self {
        let mut index = Self::default();
        for entry in roster {
            if let Some(id) = entry.id.as_deref() {
                index.by_id.entry(id).or_insert(entry);
            }
            if let Some(email) = entry.email.as_deref() {
                index.by_email.entry(email).or_insert(entry);
            }
        }
        index
    }

    pub fn by_id(&self, id: &str) -> Option<&'a RosterEntry> {
        self.by_id.get(id).copied()
    }

    pub fn by_email(&self, email: &str) -> Option<&'a RosterEntry> {
        self.by_email.get(email).copied()
    }
}

/// Existing submissions by (owning profile id, week).
#[derive(Debug, Default)]
pub struct SubmissionIndex<'a> {
    by_profile_week: HashMap<(&'a str, i64), &'a Submission>,
}

impl<'a> SubmissionIndex<'a> {
    pub fn build(submissions: &'a [Submission]) -> Self {
        let by_profile_week = submissions
            .iter()
            .filter_map(|s| match (s.owner_profile_id.as_deref(), s.week) {
                (Some(owner), Some(week)) => Some(((owner, week), s)),
                _ => None,
            })
            .collect();
        Self { by_profile_week }
    }

    pub fn find(&self, profile_id: &str, week: i64) -> Option<&'a Submission> {
        self.by_profile_week.get(&(profile_id, week)).copied()
    }

    pub fn len(&self) -> usize {
        self.by_profile_week.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_profile_week.is_empty()
    }
}

/// Identity-provider accounts by email.
#[derive(Debug, Default)]
pub struct IdentityIndex<'a> {
    by_email: HashMap<&'a str, &'a IdentityAccount>,
}

impl<'a> IdentityIndex<'a> {
    pub fn build(identities: &'a [IdentityAccount]) -> Self {
        let by_email = identities
            .iter()
            .filter_map(|i| i.email.as_deref().map(|e| (e, i)))
            .collect();
        Self { by_email }
    }

    pub fn by_email(&self, email: &str) -> Option<&'a IdentityAccount> {
        self.by_email.get(email).copied()
    }
}
