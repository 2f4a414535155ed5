//! Local input files: the roster export and the submissions intake.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ReconError;
use crate::model::{IntakeEntry, RosterEntry};

pub fn load_roster(path: &Path) -> Result<Vec<RosterEntry>, ReconError> {
    read_array(path)
}

pub fn load_intake(path: &Path) -> Result<Vec<IntakeEntry>, ReconError> {
    let records = load_records(path)?;
    Ok(records.into_iter().map(IntakeEntry::new).collect())
}

/// Raw JSON objects, for uploads that copy records verbatim.
pub fn load_records(path: &Path) -> Result<Vec<Map<String, Value>>, ReconError> {
    read_array(path)
}

fn read_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ReconError> {
    let text = fs::read_to_string(path).map_err(|e| ReconError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let items: Vec<T> = serde_json::from_str(&text).map_err(|e| ReconError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    log::info!("loaded {} records from {}", items.len(), path.display());
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn file_with(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn roster_loads() {
        let file = file_with(r#"[{"id": "r1", "email": "a@x.com", "first_name": "Ann"}]"#);
        let roster = load_roster(file.path()).unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].email.as_deref(), Some("a@x.com"));
    }

    #[test]
    fn intake_keeps_raw_fields() {
        let file = file_with(r#"[{"auth_id": "r1", "week": 1, "custom": {"x": 1}}]"#);
        let intake = load_intake(file.path()).unwrap();
        assert_eq!(intake[0].auth_id().as_deref(), Some("r1"));
        assert!(intake[0].get("custom").is_some());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_roster(Path::new("/nonexistent/students.json")).unwrap_err();
        assert!(matches!(err, ReconError::Io { .. }));
    }

    #[test]
    fn non_array_is_parse_error() {
        let file = file_with(r#"{"id": "r1"}"#);
        let err = load_records(file.path()).unwrap_err();
        assert!(matches!(err, ReconError::Parse { .. }), "{err}");
    }
}
