use std::collections::HashMap;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde_json::json;

use rostersync_recon::input::{load_intake, load_roster};
use rostersync_recon::{
    dedupe_submissions, reconcile_profiles, reconcile_submissions, Account, AccountIndex,
    LedgerLabels, LedgerRecord, Profile, ProfileDecision, ProfileIndex, ProfileRef, ProfileTarget,
    ResultLedger, RosterIndex, SkipReason, SkippedRecord, Submission, SubmissionDecision,
    SubmissionIndex,
};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load<T: DeserializeOwned>(name: &str) -> Vec<T> {
    let path = fixtures_dir().join(name);
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    serde_json::from_str(&text).unwrap_or_else(|e| panic!("cannot parse {name}: {e}"))
}

// -------------------------------------------------------------------------
// Profiles
// -------------------------------------------------------------------------

#[test]
fn profile_plan_over_fixtures() {
    let accounts: Vec<Account> = load("accounts.json");
    let profiles: Vec<Profile> = load("profiles.json");
    let roster = load_roster(&fixtures_dir().join("students.json")).unwrap();

    let plan = reconcile_profiles(
        &accounts,
        &ProfileIndex::build(&profiles),
        &RosterIndex::build(&roster),
        &ProfileTarget::default(),
    );

    // ann (array roles), bo (JSON-text roles), cy (bare string role)
    assert_eq!(plan.considered, 3);
    assert_eq!(plan.decisions.len(), 5);

    match &plan.decisions[0] {
        ProfileDecision::CreateProfile { account_id, input, .. } => {
            assert_eq!(account_id, "u-ann");
            assert_eq!(
                serde_json::to_value(input).unwrap(),
                json!({
                    "userId": "c-ann",
                    "firstName": "Ann",
                    "lastName": "Lee",
                    "title": "Engineer",
                    "location": "Austin",
                    "experienceYears": 4,
                    "contactEmail": "ann@school.edu",
                    "isStaff": false
                })
            );
        }
        other => panic!("expected create for ann, got {other:?}"),
    }
    assert!(matches!(
        &plan.decisions[1],
        ProfileDecision::UpdateLinkedProfiles { account_id, add, .. }
            if account_id == "u-ann" && add.profile == ProfileRef::Created(0)
    ));
    assert!(matches!(
        &plan.decisions[2],
        ProfileDecision::LinkExisting { profile_id, .. } if profile_id == "p-bo"
    ));
    assert!(matches!(
        &plan.decisions[3],
        ProfileDecision::UpdateLinkedProfiles { account_id, add, .. }
            if account_id == "u-bo" && add.profile == ProfileRef::Existing("p-bo".into())
    ));
    assert!(matches!(
        &plan.decisions[4],
        ProfileDecision::SkipNoRosterMatch { account_id, .. } if account_id == "u-cy"
    ));
}

#[test]
fn existing_back_reference_is_a_no_op_merge() {
    let accounts: Vec<Account> = load("accounts.json");
    let bo = accounts.iter().find(|a| a.internal_id == "u-bo").unwrap();

    let mut linked = bo.linked_profiles.clone();
    let plan = reconcile_profiles(
        std::slice::from_ref(bo),
        &ProfileIndex::build(&load::<Profile>("profiles.json")),
        &RosterIndex::default(),
        &ProfileTarget::default(),
    );
    let ProfileDecision::UpdateLinkedProfiles { add, .. } = &plan.decisions[1] else {
        panic!("expected link update");
    };
    let link = add.resolve(&HashMap::new()).unwrap();
    assert!(!linked.merge(&link));
    assert_eq!(linked.len(), 1);
}

#[test]
fn unresolved_created_reference_yields_nothing() {
    let accounts: Vec<Account> = load("accounts.json");
    let roster = load_roster(&fixtures_dir().join("students.json")).unwrap();
    let plan = reconcile_profiles(
        &accounts[..1],
        &ProfileIndex::default(),
        &RosterIndex::build(&roster),
        &ProfileTarget::default(),
    );
    let ProfileDecision::UpdateLinkedProfiles { add, .. } = &plan.decisions[1] else {
        panic!("expected link update");
    };
    // The create failed, so no id was recorded for decision 0.
    assert_eq!(add.resolve(&HashMap::new()), None);
}

#[test]
fn custom_link_type_is_used() {
    let accounts: Vec<Account> = load("accounts.json");
    let target = ProfileTarget {
        link_type: "StudentProfile".into(),
        ..Default::default()
    };
    let plan = reconcile_profiles(
        &accounts,
        &ProfileIndex::build(&load::<Profile>("profiles.json")),
        &RosterIndex::default(),
        &target,
    );
    let kinds: Vec<_> = plan
        .decisions
        .iter()
        .filter_map(|d| match d {
            ProfileDecision::UpdateLinkedProfiles { add, .. } => Some(add.kind.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(kinds, vec!["StudentProfile"]);
}

// -------------------------------------------------------------------------
// Submissions
// -------------------------------------------------------------------------

#[test]
fn submission_plan_over_fixtures() {
    let accounts: Vec<Account> = load("accounts.json");
    let profiles: Vec<Profile> = load("profiles.json");
    let existing: Vec<Submission> = load("existing_submissions.json");
    let roster = load_roster(&fixtures_dir().join("students.json")).unwrap();
    let intake = load_intake(&fixtures_dir().join("submissions.json")).unwrap();

    let plan = reconcile_submissions(
        &intake,
        &AccountIndex::build(&accounts),
        &ProfileIndex::build(&profiles),
        &RosterIndex::build(&roster),
    );
    let plan = dedupe_submissions(plan, &SubmissionIndex::build(&existing));

    assert_eq!(plan.decisions.len(), intake.len());
    assert!(matches!(
        &plan.decisions[0],
        SubmissionDecision::AlreadyPresent { existing_id, .. } if existing_id == "s-bo-1"
    ));
    match &plan.decisions[1] {
        SubmissionDecision::CreateSubmission { email, input, .. } => {
            assert_eq!(email, "bo@school.edu");
            assert_eq!(input.student_profile_id, "p-bo");
            assert_eq!(input.title.as_deref(), Some("Week 2 Submission"));
        }
        other => panic!("expected create, got {other:?}"),
    }

    let reasons: Vec<_> = plan.decisions[2..]
        .iter()
        .map(|d| match d {
            SubmissionDecision::SkipUnresolved { reason, .. } => reason.clone(),
            other => panic!("expected skip, got {other:?}"),
        })
        .collect();
    assert_eq!(
        reasons,
        vec![
            SkipReason::NoProfile { email: "ann@school.edu".into() },
            SkipReason::NoRosterEmail { auth_id: "r-eve".into() },
            SkipReason::MissingAuthId,
        ]
    );
}

// -------------------------------------------------------------------------
// Ledger
// -------------------------------------------------------------------------

#[test]
fn ledger_file_round() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("student_profiles_results.json");

    let mut ledger = ResultLedger::new(LedgerLabels::LINK_PROFILES);
    ledger.record_created(LedgerRecord::new("p-new").with_email("ann@school.edu"));
    ledger.record_skipped(SkippedRecord::new("cy@school.edu", "no matching student in roster"));
    ledger.finalize(&path).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["created_profiles"][0]["id"], json!("p-new"));
    assert_eq!(value["linked_existing_profiles"], json!([]));
    assert_eq!(value["skipped_users"][0]["key"], json!("cy@school.edu"));
}
