//! Identity seeding: decide which roster entries need an identity-provider
//! account.

use std::collections::HashSet;

use crate::index::IdentityIndex;
use crate::model::{IdentityAccount, RosterEntry};

/// Which roster entries are eligible for an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityFilter {
    /// Exact `user_roles` value required.
    pub role: String,
    /// Required email ending, e.g. `@example.com`. `None` admits any email.
    pub email_suffix: Option<String>,
}

impl Default for IdentityFilter {
    fn default() -> Self {
        Self {
            role: "student".into(),
            email_suffix: None,
        }
    }
}

impl IdentityFilter {
    pub fn admits(&self, entry: &RosterEntry) -> bool {
        if entry.user_roles.as_deref() != Some(self.role.as_str()) {
            return false;
        }
        match (&self.email_suffix, entry.email.as_deref()) {
            (None, _) => true,
            (Some(suffix), Some(email)) => email.ends_with(suffix.as_str()),
            (Some(_), None) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityDecision {
    CreateIdentity { email: String },
    AlreadyPresent { email: String, username: String },
    SkipNoEmail { roster_id: Option<String> },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityPlan {
    pub decisions: Vec<IdentityDecision>,
    /// Roster entries that passed the filter.
    pub eligible: usize,
}

impl IdentityPlan {
    pub fn creates(&self) -> usize {
        self.decisions
            .iter()
            .filter(|d| matches!(d, IdentityDecision::CreateIdentity { .. }))
            .count()
    }
}

/// Plan identity creation for every eligible roster entry. An entry is
/// already present when an existing identity carries its email, either as
/// the `email` attribute or as the username.
pub fn plan_identities(
    roster: &[RosterEntry],
    existing: &[IdentityAccount],
    filter: &IdentityFilter,
) -> IdentityPlan {
    let index = IdentityIndex::build(existing);
    let usernames: HashSet<&str> = existing.iter().map(|i| i.username.as_str()).collect();
    let mut planned: HashSet<&str> = HashSet::new();
    let mut plan = IdentityPlan::default();

    for entry in roster.iter().filter(|e| filter.admits(e)) {
        plan.eligible += 1;

        let Some(email) = entry.email.as_deref().filter(|e| !e.is_empty()) else {
            plan.decisions.push(IdentityDecision::SkipNoEmail {
                roster_id: entry.id.clone(),
            });
            continue;
        };

        let found = index
            .by_email(email)
            .map(|i| i.username.clone())
            .or_else(|| usernames.get(email).map(|u| u.to_string()));
        if let Some(username) = found {
            plan.decisions.push(IdentityDecision::AlreadyPresent {
                email: email.to_string(),
                username,
            });
            continue;
        }

        if planned.insert(email) {
            plan.decisions.push(IdentityDecision::CreateIdentity {
                email: email.to_string(),
            });
        }
    }

    plan
}
