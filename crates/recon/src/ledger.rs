//! Result Ledger: in-memory record of a run, written once at the end.

use std::fs;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;

use crate::error::ReconError;

/// Array names used in a command's results file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerLabels {
    pub created: &'static str,
    /// `None` for commands with nothing to link.
    pub linked: Option<&'static str>,
    pub skipped: &'static str,
}

impl LedgerLabels {
    pub const SYNC_ACCOUNTS: Self = Self {
        created: "created_users",
        linked: Some("existing_users"),
        skipped: "skipped_users",
    };
    pub const LINK_PROFILES: Self = Self {
        created: "created_profiles",
        linked: Some("linked_existing_profiles"),
        skipped: "skipped_users",
    };
    pub const CREATE_SUBMISSIONS: Self = Self {
        created: "created_submissions",
        linked: Some("existing_submissions"),
        skipped: "skipped_submissions",
    };
    pub const SEED_IDENTITIES: Self = Self {
        created: "created_identities",
        linked: Some("existing_identities"),
        skipped: "skipped_identities",
    };
    pub const UPLOAD_ROSTER: Self = Self {
        created: "uploaded_entries",
        linked: None,
        skipped: "skipped_entries",
    };
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl LedgerRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            email: None,
            id: id.into(),
            title: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRecord {
    pub key: String,
    pub reason: String,
    /// Raw input entry, kept for submissions so they can be re-fed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<Value>,
}

impl SkippedRecord {
    pub fn new(key: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            key: key.into(),
            reason: reason.to_string(),
            entry: None,
        }
    }

    pub fn with_entry(mut self, entry: Value) -> Self {
        self.entry = Some(entry);
        self
    }
}

/// Counts reported after a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerCounts {
    pub created: usize,
    pub linked: usize,
    pub skipped: usize,
}

#[derive(Debug)]
pub struct ResultLedger {
    labels: LedgerLabels,
    started_at: DateTime<Utc>,
    created: Vec<LedgerRecord>,
    linked: Vec<LedgerRecord>,
    skipped: Vec<SkippedRecord>,
}

impl ResultLedger {
    pub fn new(labels: LedgerLabels) -> Self {
        Self {
            labels,
            started_at: Utc::now(),
            created: Vec::new(),
            linked: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn record_created(&mut self, record: LedgerRecord) {
        self.created.push(record);
    }

    pub fn record_linked(&mut self, record: LedgerRecord) {
        self.linked.push(record);
    }

    pub fn record_skipped(&mut self, record: SkippedRecord) {
        log::warn!("skipped {}: {}", record.key, record.reason);
        self.skipped.push(record);
    }

    pub fn created(&self) -> &[LedgerRecord] {
        &self.created
    }

    pub fn linked(&self) -> &[LedgerRecord] {
        &self.linked
    }

    pub fn skipped(&self) -> &[SkippedRecord] {
        &self.skipped
    }

    pub fn counts(&self) -> LedgerCounts {
        LedgerCounts {
            created: self.created.len(),
            linked: self.linked.len(),
            skipped: self.skipped.len(),
        }
    }

    /// Report as a JSON value, stamped with `finished_at`.
    pub fn to_value(&self, finished_at: DateTime<Utc>) -> Value {
        let report = Report {
            ledger: self,
            finished_at,
        };
        // Serializing plain records into a Value cannot fail.
        serde_json::to_value(report).unwrap_or(Value::Null)
    }

    /// Write the report to `path` and consume the ledger.
    pub fn finalize(self, path: &Path) -> Result<LedgerCounts, ReconError> {
        let report = Report {
            ledger: &self,
            finished_at: Utc::now(),
        };
        let write_err = |message: String| ReconError::Write {
            path: path.display().to_string(),
            message,
        };

        let text = serde_json::to_string_pretty(&report).map_err(|e| write_err(e.to_string()))?;
        fs::write(path, text + "\n").map_err(|e| write_err(e.to_string()))?;

        log::info!("results saved to {}", path.display());
        Ok(self.counts())
    }
}

struct Report<'a> {
    ledger: &'a ResultLedger,
    finished_at: DateTime<Utc>,
}

impl Serialize for Report<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let ledger = self.ledger;
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(ledger.labels.created, &ledger.created)?;
        if let Some(linked) = ledger.labels.linked {
            map.serialize_entry(linked, &ledger.linked)?;
        }
        map.serialize_entry(ledger.labels.skipped, &ledger.skipped)?;
        map.serialize_entry(
            "meta",
            &Meta {
                started_at: ledger.started_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                finished_at: self.finished_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            },
        )?;
        map.end()
    }
}

#[derive(Serialize)]
struct Meta {
    started_at: String,
    finished_at: String,
}

/// Write any serializable value as pretty JSON. Used for side files such as
/// generated credentials.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ReconError> {
    let write_err = |message: String| ReconError::Write {
        path: path.display().to_string(),
        message,
    };
    let text = serde_json::to_string_pretty(value).map_err(|e| write_err(e.to_string()))?;
    fs::write(path, text + "\n").map_err(|e| write_err(e.to_string()))
}
