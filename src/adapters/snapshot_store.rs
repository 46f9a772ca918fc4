use std::sync::{Arc, RwLock};

use tracing::{info, warn};

use crate::domain::ledger::LedgerSnapshot;
use crate::error::{BookingError, Result};
use crate::ports::ledger_source::LedgerSource;

/// Holds the current ledger behind an `Arc` and swaps it whole on refresh.
///
/// Readers clone the `Arc` and keep evaluating against it even if a refresh
/// lands meanwhile; nothing is ever mutated in place.
pub struct SnapshotStore {
    current: RwLock<Arc<LedgerSnapshot>>,
}

impl SnapshotStore {
    pub fn new(initial: LedgerSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    /// Install a refreshed ledger. Versions must not go backwards; an equal
    /// version is accepted and still counts as new contents.
    pub fn replace(&self, mut next: LedgerSnapshot) -> Result<()> {
        let mut guard = self.current.write().map_err(|_| BookingError::Ledger {
            reason: "snapshot lock poisoned".into(),
        })?;
        if next.version < guard.version {
            warn!(
                current = guard.version,
                offered = next.version,
                "Ignoring stale ledger snapshot"
            );
            return Err(BookingError::Ledger {
                reason: format!(
                    "stale snapshot version {} (current {})",
                    next.version, guard.version
                ),
            });
        }
        next.restamp();
        info!(
            version = next.version,
            generation = next.generation(),
            days = next.days.len(),
            refreshed_at = %next.refreshed_at,
            "Ledger snapshot replaced"
        );
        *guard = Arc::new(next);
        Ok(())
    }

    pub fn version(&self) -> u64 {
        self.current().version
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(LedgerSnapshot::empty())
    }
}

impl LedgerSource for SnapshotStore {
    fn current(&self) -> Arc<LedgerSnapshot> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => {
                tracing::error!("Snapshot lock poisoned on read, serving last snapshot");
                Arc::clone(&poisoned.into_inner())
            }
        }
    }
}
