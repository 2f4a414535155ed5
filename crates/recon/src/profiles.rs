//! Profile linking: one profile per (account, role), created only when no
//! existing profile is found, then back-referenced from the account.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::index::{ProfileIndex, RosterIndex};
use crate::links::ProfileLink;
use crate::model::{Account, RosterEntry};

/// Roster exports write an empty org name as two literal quote characters.
const EMPTY_QUOTED: &str = "\"\"";

/// Which accounts get a profile, and how the back-reference is tagged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileTarget {
    pub role: String,
    pub link_type: String,
}

impl Default for ProfileTarget {
    fn default() -> Self {
        Self {
            role: "student".into(),
            link_type: "Profile".into(),
        }
    }
}

/// Create request for a profile record. Optional fields that are `None`
/// are left out of the request entirely.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub experience_years: i64,
    pub contact_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_staff: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_name: Option<String>,
}

impl ProfileInput {
    pub fn from_roster(account: &Account, contact_email: &str, entry: &RosterEntry) -> Self {
        Self {
            user_id: account.account_id.clone(),
            first_name: entry.first_name.clone().unwrap_or_default(),
            last_name: entry.last_name.clone().unwrap_or_default(),
            title: non_empty(&entry.title),
            bio: non_empty(&entry.bio),
            location: non_empty(&entry.location),
            experience_years: entry
                .experience_years
                .as_ref()
                .map(parse_years)
                .unwrap_or(0),
            contact_email: contact_email.to_string(),
            is_staff: entry.is_staff.as_ref().and_then(Value::as_bool),
            org_name: org_name(entry.org_name.as_ref()),
        }
    }
}

fn non_empty(field: &Option<String>) -> Option<String> {
    field.as_ref().filter(|s| !s.is_empty()).cloned()
}

fn org_name(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() && s != EMPTY_QUOTED => Some(s.clone()),
        _ => None,
    }
}

/// Integer parse with a zero fallback. Whole floats truncate, text is
/// trimmed and must be a plain integer, booleans count as 0/1.
pub fn parse_years(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse::<i64>().unwrap_or(0),
        Value::Bool(b) => i64::from(*b),
        _ => 0,
    }
}

/// Profile a pending back-reference points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileRef {
    /// Already exists remotely.
    Existing(String),
    /// Created by the decision at this index of the plan; the id is known
    /// only once the create has run.
    Created(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLink {
    pub kind: String,
    pub profile: ProfileRef,
}

impl PendingLink {
    /// Resolve against ids returned by executed creates, keyed by decision
    /// index. `None` if the create never produced an id.
    pub fn resolve(&self, created: &HashMap<usize, String>) -> Option<ProfileLink> {
        let id = match &self.profile {
            ProfileRef::Existing(id) => id.clone(),
            ProfileRef::Created(at) => created.get(at)?.clone(),
        };
        Some(ProfileLink::new(self.kind.clone(), id))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProfileDecision {
    LinkExisting {
        account_id: String,
        email: Option<String>,
        profile_id: String,
    },
    CreateProfile {
        account_id: String,
        email: String,
        input: ProfileInput,
    },
    SkipNoRosterMatch {
        account_id: String,
        email: Option<String>,
    },
    /// Merge `add` into the account's `linkedProfiles`. `account_id` is the
    /// account's data API id.
    UpdateLinkedProfiles {
        account_id: String,
        email: Option<String>,
        add: PendingLink,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkPlan {
    pub decisions: Vec<ProfileDecision>,
    /// Accounts that carried the target role.
    pub considered: usize,
}

impl LinkPlan {
    pub fn creates(&self) -> usize {
        self.count(|d| matches!(d, ProfileDecision::CreateProfile { .. }))
    }

    pub fn links(&self) -> usize {
        self.count(|d| matches!(d, ProfileDecision::LinkExisting { .. }))
    }

    pub fn skips(&self) -> usize {
        self.count(|d| matches!(d, ProfileDecision::SkipNoRosterMatch { .. }))
    }

    fn count(&self, pred: impl Fn(&ProfileDecision) -> bool) -> usize {
        self.decisions.iter().filter(|d| pred(d)).count()
    }
}

/// Decide, per account carrying the target role, whether to link an
/// existing profile, create one from the roster, or skip. Input order is
/// preserved.
pub fn reconcile_profiles(
    accounts: &[Account],
    profiles: &ProfileIndex<'_>,
    roster: &RosterIndex<'_>,
    target: &ProfileTarget,
) -> LinkPlan {
    let mut plan = LinkPlan::default();

    for account in accounts.iter().filter(|a| a.roles.contains(&target.role)) {
        plan.considered += 1;

        let profile_ref = if let Some(existing) = profiles.by_owner(&account.account_id) {
            plan.decisions.push(ProfileDecision::LinkExisting {
                account_id: account.internal_id.clone(),
                email: account.email.clone(),
                profile_id: existing.id.clone(),
            });
            ProfileRef::Existing(existing.id.clone())
        } else {
            let matched = account
                .email
                .as_deref()
                .and_then(|email| roster.by_email(email).map(|entry| (email, entry)));

            let Some((email, entry)) = matched else {
                plan.decisions.push(ProfileDecision::SkipNoRosterMatch {
                    account_id: account.internal_id.clone(),
                    email: account.email.clone(),
                });
                continue;
            };

            let at = plan.decisions.len();
            plan.decisions.push(ProfileDecision::CreateProfile {
                account_id: account.internal_id.clone(),
                email: email.to_string(),
                input: ProfileInput::from_roster(account, email, entry),
            });
            ProfileRef::Created(at)
        };

        plan.decisions.push(ProfileDecision::UpdateLinkedProfiles {
            account_id: account.internal_id.clone(),
            email: account.email.clone(),
            add: PendingLink {
                kind: target.link_type.clone(),
                profile: profile_ref,
            },
        });
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::LinkedProfiles;
    use crate::model::{Profile, Roles};
    use serde_json::json;

    fn student(id: &str, cognito: &str, email: &str) -> Account {
        Account {
            internal_id: id.into(),
            account_id: cognito.into(),
            email: Some(email.into()),
            roles: Roles::new(["student"]),
            linked_profiles: LinkedProfiles::default(),
        }
    }

    fn roster_entry(value: Value) -> RosterEntry {
        serde_json::from_value(value).unwrap()
    }

    fn create_input(plan: &LinkPlan) -> &ProfileInput {
        plan.decisions
            .iter()
            .find_map(|d| match d {
                ProfileDecision::CreateProfile { input, .. } => Some(input),
                _ => None,
            })
            .expect("plan has a create")
    }

    #[test]
    fn end_to_end_single_student() {
        let accounts = vec![student("a1", "c-a1", "x@y.com")];
        let roster = vec![roster_entry(json!({
            "email": "x@y.com", "first_name": "Ann", "last_name": "Lee"
        }))];
        let plan = reconcile_profiles(
            &accounts,
            &ProfileIndex::default(),
            &RosterIndex::build(&roster),
            &ProfileTarget::default(),
        );

        assert_eq!(plan.decisions.len(), 2);
        match &plan.decisions[0] {
            ProfileDecision::CreateProfile { input, .. } => {
                assert_eq!(input.first_name, "Ann");
                assert_eq!(input.last_name, "Lee");
                assert_eq!(input.contact_email, "x@y.com");
            }
            other => panic!("expected create, got {other:?}"),
        }
        match &plan.decisions[1] {
            ProfileDecision::UpdateLinkedProfiles { account_id, add, .. } => {
                assert_eq!(account_id, "a1");
                assert_eq!(add.kind, "Profile");
                assert_eq!(add.profile, ProfileRef::Created(0));

                let mut created = HashMap::new();
                created.insert(0, "new-id".to_string());
                assert_eq!(add.resolve(&created), Some(ProfileLink::new("Profile", "new-id")));
            }
            other => panic!("expected link update, got {other:?}"),
        }
    }

    #[test]
    fn existing_profile_is_linked_not_recreated() {
        let accounts = vec![student("a1", "c-a1", "x@y.com")];
        let profiles = vec![Profile {
            id: "p-1".into(),
            owner_account_id: Some("c-a1".into()),
            first_name: None,
            last_name: None,
            contact_email: None,
        }];
        let roster = vec![roster_entry(json!({"email": "x@y.com", "first_name": "Ann"}))];

        let plan = reconcile_profiles(
            &accounts,
            &ProfileIndex::build(&profiles),
            &RosterIndex::build(&roster),
            &ProfileTarget::default(),
        );
        assert_eq!(plan.creates(), 0);
        assert_eq!(plan.links(), 1);
        assert!(matches!(
            &plan.decisions[1],
            ProfileDecision::UpdateLinkedProfiles { add, .. }
                if add.profile == ProfileRef::Existing("p-1".into())
        ));
    }

    #[test]
    fn second_run_creates_nothing() {
        let accounts = vec![
            student("a1", "c1", "one@y.com"),
            student("a2", "c2", "two@y.com"),
        ];
        let roster = vec![
            roster_entry(json!({"email": "one@y.com", "first_name": "One"})),
            roster_entry(json!({"email": "two@y.com", "first_name": "Two"})),
        ];
        let roster_index = RosterIndex::build(&roster);
        let target = ProfileTarget::default();

        let first = reconcile_profiles(&accounts, &ProfileIndex::default(), &roster_index, &target);
        assert_eq!(first.creates(), 2);

        // Apply the first run: every created profile now exists remotely.
        let created: Vec<Profile> = first
            .decisions
            .iter()
            .enumerate()
            .filter_map(|(i, d)| match d {
                ProfileDecision::CreateProfile { input, .. } => Some(Profile {
                    id: format!("p{i}"),
                    owner_account_id: Some(input.user_id.clone()),
                    first_name: Some(input.first_name.clone()),
                    last_name: Some(input.last_name.clone()),
                    contact_email: Some(input.contact_email.clone()),
                }),
                _ => None,
            })
            .collect();

        let second = reconcile_profiles(&accounts, &ProfileIndex::build(&created), &roster_index, &target);
        assert_eq!(second.creates(), 0);
        assert_eq!(second.links(), 2);
        // one primary decision per account, never both
        assert_eq!(second.links() + second.creates(), accounts.len());
    }

    #[test]
    fn accounts_without_target_role_are_ignored() {
        let mut admin = student("a1", "c1", "x@y.com");
        admin.roles = Roles::new(["ADMIN"]);
        let mut upper = student("a2", "c2", "z@y.com");
        upper.roles = Roles::new(["STUDENT"]);
        let roster = vec![roster_entry(json!({"email": "z@y.com"}))];

        let plan = reconcile_profiles(
            &[admin, upper],
            &ProfileIndex::default(),
            &RosterIndex::build(&roster),
            &ProfileTarget::default(),
        );
        assert_eq!(plan.considered, 1);
        assert_eq!(plan.creates(), 1);
    }

    #[test]
    fn no_roster_match_is_skipped_without_link() {
        let accounts = vec![student("a1", "c1", "nobody@y.com")];
        let plan = reconcile_profiles(
            &accounts,
            &ProfileIndex::default(),
            &RosterIndex::default(),
            &ProfileTarget::default(),
        );
        assert_eq!(
            plan.decisions,
            vec![ProfileDecision::SkipNoRosterMatch {
                account_id: "a1".into(),
                email: Some("nobody@y.com".into()),
            }]
        );
    }

    #[test]
    fn optional_fields_are_omitted() {
        let accounts = vec![student("a1", "c1", "x@y.com")];
        let roster = vec![roster_entry(json!({
            "email": "x@y.com",
            "org_name": "\"\"",
            "title": "",
            "location": "Austin"
        }))];
        let plan = reconcile_profiles(
            &accounts,
            &ProfileIndex::default(),
            &RosterIndex::build(&roster),
            &ProfileTarget::default(),
        );
        let input = create_input(&plan);
        let wire = serde_json::to_value(input).unwrap();
        let obj = wire.as_object().unwrap();

        assert!(!obj.contains_key("orgName"));
        assert!(!obj.contains_key("bio"));
        assert!(!obj.contains_key("title"));
        assert_eq!(obj["firstName"], json!(""));
        assert_eq!(obj["lastName"], json!(""));
        assert_eq!(obj["location"], json!("Austin"));
        assert_eq!(obj["userId"], json!("c1"));
    }

    #[test]
    fn experience_years_falls_back_to_zero() {
        let accounts = vec![student("a1", "c1", "x@y.com")];
        let roster = vec![roster_entry(json!({
            "email": "x@y.com", "experience_years": "not-a-number"
        }))];
        let plan = reconcile_profiles(
            &accounts,
            &ProfileIndex::default(),
            &RosterIndex::build(&roster),
            &ProfileTarget::default(),
        );
        assert_eq!(create_input(&plan).experience_years, 0);
    }

    #[test]
    fn parse_years_variants() {
        assert_eq!(parse_years(&json!(4)), 4);
        assert_eq!(parse_years(&json!(" 12 ")), 12);
        assert_eq!(parse_years(&json!("5.5")), 0);
        assert_eq!(parse_years(&json!(3.9)), 3);
        assert_eq!(parse_years(&json!(true)), 1);
        assert_eq!(parse_years(&Value::Null), 0);
    }

    #[test]
    fn is_staff_only_when_boolean() {
        let account = student("a1", "c1", "x@y.com");
        let as_text = roster_entry(json!({"is_staff": "true"}));
        let as_bool = roster_entry(json!({"is_staff": false}));

        assert_eq!(ProfileInput::from_roster(&account, "x@y.com", &as_text).is_staff, None);
        assert_eq!(ProfileInput::from_roster(&account, "x@y.com", &as_bool).is_staff, Some(false));
    }

    #[test]
    fn org_name_kept_when_real() {
        let account = student("a1", "c1", "x@y.com");
        let entry = roster_entry(json!({"org_name": "Acme"}));
        assert_eq!(
            ProfileInput::from_roster(&account, "x@y.com", &entry).org_name.as_deref(),
            Some("Acme")
        );
        let numeric = roster_entry(json!({"org_name": 7}));
        assert_eq!(ProfileInput::from_roster(&account, "x@y.com", &numeric).org_name, None);
    }
}
