pub mod cache;
pub mod json_ledger;
pub mod snapshot_store;
