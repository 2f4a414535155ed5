//! `rostersync upload-roster`: copy the local roster into the roster table.

use serde_json::{Map, Value};

use rostersync_aws::RecordStore;
use rostersync_recon::input::load_records;
use rostersync_recon::{LedgerLabels, LedgerRecord, ResultLedger, SkippedRecord};

use crate::context::Context;
use crate::CliError;

pub const RESULTS_FILE: &str = "roster_upload_results.json";

pub fn cmd_upload_roster(ctx: &Context) -> Result<(), CliError> {
    let records = load_records(&ctx.roster_path())?;
    let table = ctx.roster_table()?;

    let ledger = upload_roster(&table, &records);
    let counts = ledger.finalize(&ctx.results_path(RESULTS_FILE))?;

    println!("\nRoster upload to {}", table.table_name());
    println!("  {:<10} {}", "uploaded", counts.created);
    println!("  {:<10} {}", "skipped", counts.skipped);
    Ok(())
}

/// Put every record, one call each. Puts overwrite by key, so repeating
/// the upload is harmless.
pub fn upload_roster<S: RecordStore + ?Sized>(store: &S, records: &[Map<String, Value>]) -> ResultLedger {
    let mut ledger = ResultLedger::new(LedgerLabels::UPLOAD_ROSTER);

    for (i, record) in records.iter().enumerate() {
        let key = record_key(record).unwrap_or_else(|| format!("entry {}", i + 1));
        match store.put_record(record) {
            Ok(()) => {
                log::debug!("put {}", key);
                let mut uploaded = LedgerRecord::new(key);
                if let Some(email) = record.get("email").and_then(Value::as_str) {
                    uploaded = uploaded.with_email(email);
                }
                ledger.record_created(uploaded);
            }
            Err(e) => {
                ledger.record_skipped(SkippedRecord::new(key, e).with_entry(Value::Object(record.clone())));
            }
        }
    }

    log::info!("{} of {} roster entries uploaded", ledger.created().len(), records.len());
    ledger
}

fn record_key(record: &Map<String, Value>) -> Option<String> {
    match record.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
