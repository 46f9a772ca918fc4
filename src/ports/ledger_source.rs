use std::sync::Arc;

use crate::domain::ledger::LedgerSnapshot;

/// Hands out the current ledger snapshot.
///
/// Each query calls `current` once and evaluates against that `Arc` only, so a
/// refresh landing mid-query is never observed.
pub trait LedgerSource: Send + Sync {
    fn current(&self) -> Arc<LedgerSnapshot>;
}
