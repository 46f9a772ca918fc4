use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::ledger::normalize_resource;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Business policy limits. These are commercial decisions, not physical limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PolicyConfig {
    #[serde(default = "default_capacity")]
    pub capacity_per_resource: u32,
    /// Per-resource ceilings that replace `capacity_per_resource`.
    #[serde(default)]
    pub capacity_overrides: HashMap<String, u32>,
    #[serde(default = "default_max_fishing_groups")]
    pub max_fishing_groups_per_day: u32,
    #[serde(default = "default_max_anglers")]
    pub max_anglers_per_group: u32,
    /// The one resource fishing trips depart from and lock.
    #[serde(default = "default_fishing_base")]
    pub fishing_base_resource: String,
    /// Resources always reported in a day's capacity, booked or not.
    #[serde(default = "default_resources")]
    pub resources: Vec<String>,
    #[serde(default = "default_inshore_keywords")]
    pub inshore_addon_keywords: Vec<String>,
    #[serde(default = "default_horizon")]
    pub calendar_horizon_days: u32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            capacity_per_resource: default_capacity(),
            capacity_overrides: HashMap::new(),
            max_fishing_groups_per_day: default_max_fishing_groups(),
            max_anglers_per_group: default_max_anglers(),
            fishing_base_resource: default_fishing_base(),
            resources: default_resources(),
            inshore_addon_keywords: default_inshore_keywords(),
            calendar_horizon_days: default_horizon(),
        }
    }
}

impl PolicyConfig {
    /// Person ceiling for a resource, honouring overrides.
    pub fn ceiling_for(&self, resource: &str) -> u32 {
        let key = normalize_resource(resource);
        self.capacity_overrides
            .iter()
            .find(|(name, _)| normalize_resource(name) == key)
            .map_or(self.capacity_per_resource, |(_, cap)| *cap)
    }

    pub fn fishing_base(&self) -> String {
        normalize_resource(&self.fishing_base_resource)
    }

    pub fn is_fishing_base(&self, resource: &str) -> bool {
        let key = normalize_resource(resource);
        !key.is_empty() && key == self.fishing_base()
    }

    /// True when a free-text add-on names an inshore fishing outing.
    pub fn is_inshore_addon(&self, add_on: &str) -> bool {
        let lowered = add_on.to_lowercase();
        self.inshore_addon_keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .any(|k| !k.is_empty() && lowered.contains(&k))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
        }
    }
}

fn default_capacity() -> u32 {
    10
}

fn default_max_fishing_groups() -> u32 {
    1
}

fn default_max_anglers() -> u32 {
    5
}

fn default_fishing_base() -> String {
    "loco".into()
}

fn default_resources() -> Vec<String> {
    vec![default_fishing_base()]
}

fn default_inshore_keywords() -> Vec<String> {
    vec!["inshore".into()]
}

fn default_horizon() -> u32 {
    90
}

fn default_max_entries() -> usize {
    512
}
