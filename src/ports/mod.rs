pub mod capacity_cache;
pub mod ledger_source;
