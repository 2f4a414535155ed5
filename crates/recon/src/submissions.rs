//! Submission creation: resolve each intake entry through
//! `auth_id` → roster → email → account → profile, then build the create
//! request. Any broken link in the chain skips the entry.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::index::{AccountIndex, ProfileIndex, RosterIndex, SubmissionIndex};
use crate::model::{text_of, IntakeEntry};

const DEFAULT_STATUS: &str = "DRAFT";

/// Why an intake entry could not be resolved to a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingAuthId,
    NoRosterMatch { auth_id: String },
    NoRosterEmail { auth_id: String },
    NoAccount { email: String },
    NoProfile { email: String },
    /// Same profile and week appear earlier in the intake file.
    Duplicate { email: String, week: i64 },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAuthId => write!(f, "no auth_id provided"),
            Self::NoRosterMatch { auth_id } => {
                write!(f, "no matching student found for auth_id: {auth_id}")
            }
            Self::NoRosterEmail { auth_id } => {
                write!(f, "no email found for student with auth_id: {auth_id}")
            }
            Self::NoAccount { email } => write!(f, "no user found with email: {email}"),
            Self::NoProfile { email } => write!(f, "no student profile found for user: {email}"),
            Self::Duplicate { email, week } => {
                write!(f, "duplicate entry for {email}, week {week}")
            }
        }
    }
}

/// Create request for a submission record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionInput {
    pub student_profile_id: String,
    /// Whole numbers are normalised to integers. Anything else is sent as
    /// read so the API decides.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week: Option<Value>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brainlift_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_post: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployed_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technologies: Option<Value>,
}

impl SubmissionInput {
    pub fn from_intake(entry: &IntakeEntry, student_profile_id: &str) -> Self {
        let week = entry.get("week").and_then(normalize_week);
        let text = |key: &str| entry.get(key).and_then(text_of);

        let title = text("title")
            .or_else(|| week.as_ref().and_then(week_number).map(|w| format!("Week {w} Submission")));

        Self {
            student_profile_id: student_profile_id.to_string(),
            week,
            status: text("status").unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            title,
            description: text("description").unwrap_or_default(),
            demo_link: text("demo_link"),
            repo_link: text("repo_link"),
            brainlift_link: text("brainlift_link"),
            social_post: text("social_post"),
            deployed_url: text("deployed_url"),
            notes: text("notes"),
            passing: entry.get("passing").and_then(Value::as_bool),
            technologies: entry
                .get("technologies")
                .filter(|v| !is_empty_value(v))
                .cloned(),
        }
    }

    /// Integer week, when there is one. Entries without it are never
    /// deduplicated.
    pub fn week_number(&self) -> Option<i64> {
        self.week.as_ref().and_then(week_number)
    }
}

fn normalize_week(value: &Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        other => Some(week_number(other).map_or_else(|| other.clone(), Value::from)),
    }
}

fn week_number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => {
            let s = s.trim();
            s.parse().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            })
        }
        _ => None,
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        Value::Object(obj) => obj.is_empty(),
        Value::Bool(b) => !b,
        _ => false,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionDecision {
    CreateSubmission {
        email: String,
        entry_index: usize,
        input: SubmissionInput,
    },
    SkipUnresolved {
        entry_index: usize,
        reason: SkipReason,
    },
    /// The owning profile already has a submission for this week.
    AlreadyPresent {
        email: String,
        entry_index: usize,
        existing_id: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionPlan {
    pub decisions: Vec<SubmissionDecision>,
}

impl SubmissionPlan {
    pub fn creates(&self) -> usize {
        self.decisions
            .iter()
            .filter(|d| matches!(d, SubmissionDecision::CreateSubmission { .. }))
            .count()
    }

    pub fn skips(&self) -> usize {
        self.decisions
            .iter()
            .filter(|d| matches!(d, SubmissionDecision::SkipUnresolved { .. }))
            .count()
    }
}

/// Resolve every intake entry to its owning profile. Entries that fail any
/// step are skipped with a reason; the run never aborts.
pub fn reconcile_submissions(
    entries: &[IntakeEntry],
    accounts: &AccountIndex<'_>,
    profiles: &ProfileIndex<'_>,
    roster: &RosterIndex<'_>,
) -> SubmissionPlan {
    let decisions = entries
        .iter()
        .enumerate()
        .map(|(entry_index, entry)| {
            match resolve(entry, accounts, profiles, roster) {
                Ok((email, profile_id)) => SubmissionDecision::CreateSubmission {
                    input: SubmissionInput::from_intake(entry, &profile_id),
                    email,
                    entry_index,
                },
                Err(reason) => SubmissionDecision::SkipUnresolved {
                    entry_index,
                    reason,
                },
            }
        })
        .collect();

    SubmissionPlan { decisions }
}

/// Returns (email, profile id).
fn resolve(
    entry: &IntakeEntry,
    accounts: &AccountIndex<'_>,
    profiles: &ProfileIndex<'_>,
    roster: &RosterIndex<'_>,
) -> Result<(String, String), SkipReason> {
    let auth_id = entry.auth_id().ok_or(SkipReason::MissingAuthId)?;

    let student = roster
        .by_id(&auth_id)
        .ok_or_else(|| SkipReason::NoRosterMatch {
            auth_id: auth_id.clone(),
        })?;

    let email = student
        .email
        .clone()
        .filter(|e| !e.is_empty())
        .ok_or(SkipReason::NoRosterEmail { auth_id })?;

    let account = accounts
        .by_email(&email)
        .ok_or_else(|| SkipReason::NoAccount {
            email: email.clone(),
        })?;

    let profile = profiles
        .by_owner(&account.account_id)
        .ok_or_else(|| SkipReason::NoProfile {
            email: email.clone(),
        })?;

    Ok((email, profile.id.clone()))
}

/// Replace creates whose (profile, week) already exists remotely with
/// `AlreadyPresent`, and drop repeats of the same (profile, week) within
/// the plan. Entries without a week are left alone.
pub fn dedupe_submissions(plan: SubmissionPlan, existing: &SubmissionIndex<'_>) -> SubmissionPlan {
    let mut planned: HashSet<(String, i64)> = HashSet::new();

    let decisions = plan
        .decisions
        .into_iter()
        .map(|decision| {
            let SubmissionDecision::CreateSubmission {
                email,
                entry_index,
                input,
            } = decision
            else {
                return decision;
            };
            let Some(week) = input.week_number() else {
                return SubmissionDecision::CreateSubmission {
                    email,
                    entry_index,
                    input,
                };
            };

            if let Some(found) = existing.find(&input.student_profile_id, week) {
                return SubmissionDecision::AlreadyPresent {
                    email,
                    entry_index,
                    existing_id: found.id.clone(),
                };
            }

            if !planned.insert((input.student_profile_id.clone(), week)) {
                return SubmissionDecision::SkipUnresolved {
                    entry_index,
                    reason: SkipReason::Duplicate { email, week },
                };
            }
            SubmissionDecision::CreateSubmission {
                email,
                entry_index,
                input,
            }
        })
        .collect();

    SubmissionPlan { decisions }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::LinkedProfiles;
    use crate::model::{Account, Profile, Roles, RosterEntry, Submission};
    use serde_json::{json, Map};

    fn intake(value: Value) -> IntakeEntry {
        match value {
            Value::Object(fields) => IntakeEntry::new(fields),
            _ => IntakeEntry::new(Map::new()),
        }
    }

    struct World {
        accounts: Vec<Account>,
        profiles: Vec<Profile>,
        roster: Vec<RosterEntry>,
    }

    impl World {
        fn new() -> Self {
            Self {
                accounts: vec![Account {
                    internal_id: "u1".into(),
                    account_id: "c1".into(),
                    email: Some("ann@x.com".into()),
                    roles: Roles::new(["student"]),
                    linked_profiles: LinkedProfiles::default(),
                }],
                profiles: vec![Profile {
                    id: "p1".into(),
                    owner_account_id: Some("c1".into()),
                    first_name: None,
                    last_name: None,
                    contact_email: None,
                }],
                roster: vec![
                    RosterEntry {
                        id: Some("r1".into()),
                        email: Some("ann@x.com".into()),
                        ..Default::default()
                    },
                    RosterEntry {
                        id: Some("r2".into()),
                        email: None,
                        ..Default::default()
                    },
                    RosterEntry {
                        id: Some("r3".into()),
                        email: Some("ghost@x.com".into()),
                        ..Default::default()
                    },
                ],
            }
        }

        fn plan(&self, entries: &[IntakeEntry]) -> SubmissionPlan {
            reconcile_submissions(
                entries,
                &AccountIndex::build(&self.accounts),
                &ProfileIndex::build(&self.profiles),
                &RosterIndex::build(&self.roster),
            )
        }
    }

    fn skip_reason(decision: &SubmissionDecision) -> &SkipReason {
        match decision {
            SubmissionDecision::SkipUnresolved { reason, .. } => reason,
            other => panic!("expected skip, got {other:?}"),
        }
    }

    #[test]
    fn resolved_entry_creates_with_defaults() {
        let world = World::new();
        let plan = world.plan(&[intake(json!({"auth_id": "r1", "week": 2}))]);

        match &plan.decisions[0] {
            SubmissionDecision::CreateSubmission { email, input, .. } => {
                assert_eq!(email, "ann@x.com");
                assert_eq!(input.student_profile_id, "p1");
                let wire = serde_json::to_value(input).unwrap();
                assert_eq!(
                    wire,
                    json!({
                        "studentProfileId": "p1",
                        "week": 2,
                        "status": "DRAFT",
                        "title": "Week 2 Submission",
                        "description": ""
                    })
                );
            }
            other => panic!("expected create, got {other:?}"),
        }
    }

    #[test]
    fn chain_failures_each_skip_with_reason() {
        let mut world = World::new();
        world.roster.push(RosterEntry {
            id: Some("r4".into()),
            email: Some("noprofile@x.com".into()),
            ..Default::default()
        });
        world.accounts.push(Account {
            internal_id: "u4".into(),
            account_id: "c4".into(),
            email: Some("noprofile@x.com".into()),
            roles: Roles::default(),
            linked_profiles: LinkedProfiles::default(),
        });

        let plan = world.plan(&[
            intake(json!({"week": 1})),
            intake(json!({"auth_id": "missing"})),
            intake(json!({"auth_id": "r2"})),
            intake(json!({"auth_id": "r3"})),
            intake(json!({"auth_id": "r4"})),
        ]);

        assert_eq!(plan.skips(), 5);
        assert_eq!(skip_reason(&plan.decisions[0]), &SkipReason::MissingAuthId);
        assert_eq!(
            skip_reason(&plan.decisions[1]),
            &SkipReason::NoRosterMatch { auth_id: "missing".into() }
        );
        assert_eq!(
            skip_reason(&plan.decisions[2]),
            &SkipReason::NoRosterEmail { auth_id: "r2".into() }
        );
        assert_eq!(
            skip_reason(&plan.decisions[3]),
            &SkipReason::NoAccount { email: "ghost@x.com".into() }
        );
        assert_eq!(
            skip_reason(&plan.decisions[4]),
            &SkipReason::NoProfile { email: "noprofile@x.com".into() }
        );
    }

    #[test]
    fn no_roster_email_never_reaches_account_lookup() {
        // An account keyed by the empty email would match if a lookup ran.
        let mut world = World::new();
        world.accounts.push(Account {
            internal_id: "u9".into(),
            account_id: "c1".into(),
            email: Some(String::new()),
            roles: Roles::default(),
            linked_profiles: LinkedProfiles::default(),
        });
        world.roster[1].email = Some(String::new());

        let plan = world.plan(&[intake(json!({"auth_id": "r2"}))]);
        assert_eq!(plan.decisions.len(), 1);
        assert_eq!(
            skip_reason(&plan.decisions[0]),
            &SkipReason::NoRosterEmail { auth_id: "r2".into() }
        );
    }

    #[test]
    fn optional_fields_copied_only_when_present() {
        let world = World::new();
        let plan = world.plan(&[intake(json!({
            "auth_id": "r1",
            "week": "3",
            "status": "SUBMITTED",
            "title": "My App",
            "demo_link": "https://demo",
            "repo_link": null,
            "notes": "ok",
            "passing": true,
            "technologies": []
        }))]);

        let SubmissionDecision::CreateSubmission { input, .. } = &plan.decisions[0] else {
            panic!("expected create");
        };
        let wire = serde_json::to_value(input).unwrap();
        let obj = wire.as_object().unwrap();
        assert_eq!(obj["week"], json!(3));
        assert_eq!(obj["status"], json!("SUBMITTED"));
        assert_eq!(obj["title"], json!("My App"));
        assert_eq!(obj["demoLink"], json!("https://demo"));
        assert_eq!(obj["notes"], json!("ok"));
        assert_eq!(obj["passing"], json!(true));
        assert!(!obj.contains_key("repoLink"));
        assert!(!obj.contains_key("technologies"));
        assert!(obj.values().all(|v| !v.is_null()));
    }

    #[test]
    fn whole_float_week_counts_as_integer() {
        let world = World::new();
        let plan = world.plan(&[intake(json!({"auth_id": "r1", "week": 2.0}))]);
        let SubmissionDecision::CreateSubmission { input, .. } = &plan.decisions[0] else {
            panic!("expected create");
        };
        assert_eq!(input.week_number(), Some(2));
        let wire = serde_json::to_value(input).unwrap();
        assert_eq!(wire["week"], json!(2));
        assert_eq!(wire["title"], json!("Week 2 Submission"));

        let existing = vec![Submission {
            id: "s-old".into(),
            owner_profile_id: Some("p1".into()),
            week: Some(2),
            status: None,
            title: None,
        }];
        let deduped = dedupe_submissions(plan, &SubmissionIndex::build(&existing));
        assert!(matches!(
            &deduped.decisions[0],
            SubmissionDecision::AlreadyPresent { existing_id, .. } if existing_id == "s-old"
        ));
    }

    #[test]
    fn non_integer_week_is_passed_through() {
        let world = World::new();
        let plan = world.plan(&[
            intake(json!({"auth_id": "r1", "week": 2.5})),
            intake(json!({"auth_id": "r1", "week": "two"})),
        ]);

        for (decision, raw) in plan.decisions.iter().zip([json!(2.5), json!("two")]) {
            let SubmissionDecision::CreateSubmission { input, .. } = decision else {
                panic!("expected create");
            };
            assert_eq!(input.week, Some(raw));
            assert_eq!(input.week_number(), None);
            assert_eq!(input.title, None);
        }
    }

    #[test]
    fn technologies_kept_when_non_empty() {
        let world = World::new();
        let plan = world.plan(&[intake(json!({
            "auth_id": "r1", "week": 1, "technologies": ["rust", "react"]
        }))]);
        let SubmissionDecision::CreateSubmission { input, .. } = &plan.decisions[0] else {
            panic!("expected create");
        };
        assert_eq!(input.technologies, Some(json!(["rust", "react"])));
    }

    #[test]
    fn existing_week_becomes_already_present() {
        let world = World::new();
        let plan = world.plan(&[
            intake(json!({"auth_id": "r1", "week": 1})),
            intake(json!({"auth_id": "r1", "week": 2})),
            intake(json!({"auth_id": "r1", "week": 2})),
        ]);
        let existing = vec![Submission {
            id: "s-old".into(),
            owner_profile_id: Some("p1".into()),
            week: Some(1),
            status: None,
            title: None,
        }];

        let deduped = dedupe_submissions(plan, &SubmissionIndex::build(&existing));
        assert!(matches!(
            &deduped.decisions[0],
            SubmissionDecision::AlreadyPresent { existing_id, .. } if existing_id == "s-old"
        ));
        assert!(matches!(
            &deduped.decisions[1],
            SubmissionDecision::CreateSubmission { .. }
        ));
        assert_eq!(
            skip_reason(&deduped.decisions[2]),
            &SkipReason::Duplicate { email: "ann@x.com".into(), week: 2 }
        );
        assert_eq!(deduped.creates(), 1);
    }
}
