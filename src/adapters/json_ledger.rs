//! JSON form of a ledger snapshot, used by the demo binary and fixtures.

use std::path::Path;

use crate::domain::ledger::LedgerSnapshot;
use crate::error::Result;

pub fn parse_ledger_json(json: &str) -> Result<LedgerSnapshot> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_ledger_file(path: &Path) -> Result<LedgerSnapshot> {
    let content = std::fs::read_to_string(path)?;
    let ledger = parse_ledger_json(&content)?;
    tracing::info!(
        path = %path.display(),
        version = ledger.version,
        days = ledger.days.len(),
        "Ledger loaded"
    );
    Ok(ledger)
}
