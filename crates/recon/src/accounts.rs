//! Account sync: mirror identity-provider accounts into the data API.
//! Create-if-absent only; existing accounts are never updated.

use std::collections::HashSet;

use serde::Serialize;

use crate::index::AccountIndex;
use crate::model::IdentityAccount;

pub const DEFAULT_ROLE: &str = "student";
pub const DEFAULT_STATUS: &str = "active";

/// Create request for a data API user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInput {
    pub cognito_id: String,
    pub email: String,
    pub roles: Vec<String>,
    pub status: String,
}

impl AccountInput {
    pub fn new(cognito_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            cognito_id: cognito_id.into(),
            email: email.into(),
            roles: vec![DEFAULT_ROLE.to_string()],
            status: DEFAULT_STATUS.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountDecision {
    CreateAccount {
        input: AccountInput,
    },
    AlreadyPresent {
        username: String,
        email: String,
        internal_id: String,
    },
    SkipNoEmail {
        username: String,
    },
    /// Another identity earlier in the listing already claimed this email.
    SkipRepeat {
        username: String,
        email: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountPlan {
    pub decisions: Vec<AccountDecision>,
}

impl AccountPlan {
    pub fn creates(&self) -> usize {
        self.decisions
            .iter()
            .filter(|d| matches!(d, AccountDecision::CreateAccount { .. }))
            .count()
    }

    pub fn existing(&self) -> usize {
        self.decisions
            .iter()
            .filter(|d| matches!(d, AccountDecision::AlreadyPresent { .. }))
            .count()
    }
}

/// Plan one decision per identity account, in fetch order.
pub fn reconcile_accounts(identities: &[IdentityAccount], accounts: &AccountIndex<'_>) -> AccountPlan {
    let mut planned: HashSet<&str> = HashSet::new();
    let mut plan = AccountPlan::default();

    for identity in identities {
        let Some(email) = identity.email.as_deref().filter(|e| !e.is_empty()) else {
            plan.decisions.push(AccountDecision::SkipNoEmail {
                username: identity.username.clone(),
            });
            continue;
        };

        let existing = accounts
            .by_email(email)
            .or_else(|| accounts.by_account_id(&identity.username));
        if let Some(account) = existing {
            plan.decisions.push(AccountDecision::AlreadyPresent {
                username: identity.username.clone(),
                email: email.to_string(),
                internal_id: account.internal_id.clone(),
            });
            continue;
        }

        if !planned.insert(email) {
            log::debug!("identity {} repeats {email}; already planned", identity.username);
            plan.decisions.push(AccountDecision::SkipRepeat {
                username: identity.username.clone(),
                email: email.to_string(),
            });
            continue;
        }

        plan.decisions.push(AccountDecision::CreateAccount {
            input: AccountInput::new(identity.username.clone(), email),
        });
    }

    plan
}
