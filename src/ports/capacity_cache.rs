use chrono::NaiveDate;

use crate::domain::occupancy::DayCapacity;

/// Memo of computed days, keyed by [`LedgerSnapshot::generation`].
///
/// [`LedgerSnapshot::generation`]: crate::domain::ledger::LedgerSnapshot::generation
pub trait CapacityCache: Send + Sync {
    fn get(&self, generation: u64, date: NaiveDate) -> Option<DayCapacity>;
    fn set(&self, generation: u64, date: NaiveDate, capacity: &DayCapacity);
}
