pub mod capacity_cache;
