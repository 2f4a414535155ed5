//! `rostersync-recon`: Reconciliation engine for the roster migration.
//!
//! Pure engine crate: receives fully drained collections, returns plans of
//! tagged decisions, and records outcomes in a result ledger. No network
//! dependencies; the only IO is reading input files and writing results.

pub mod accounts;
pub mod error;
pub mod fetch;
pub mod identities;
pub mod index;
pub mod input;
pub mod ledger;
pub mod links;
pub mod model;
pub mod profiles;
pub mod submissions;

pub use accounts::{reconcile_accounts, AccountDecision, AccountInput, AccountPlan};
pub use error::ReconError;
pub use fetch::{drain, DrainError, Page, PageSource};
pub use identities::{plan_identities, IdentityDecision, IdentityFilter, IdentityPlan};
pub use index::{AccountIndex, IdentityIndex, ProfileIndex, RosterIndex, SubmissionIndex};
pub use ledger::{LedgerCounts, LedgerLabels, LedgerRecord, ResultLedger, SkippedRecord};
pub use links::{LinkedProfiles, ProfileLink};
pub use model::{Account, IdentityAccount, IntakeEntry, Profile, Roles, RosterEntry, Submission};
pub use profiles::{
    reconcile_profiles, LinkPlan, PendingLink, ProfileDecision, ProfileInput, ProfileRef,
    ProfileTarget,
};
pub use submissions::{
    dedupe_submissions, reconcile_submissions, SkipReason, SubmissionDecision, SubmissionInput,
    SubmissionPlan,
};
