use chrono::NaiveDate;

use crate::config::types::PolicyConfig;
use crate::domain::dates::parse_iso_date;

pub fn date(value: &str) -> NaiveDate {
    parse_iso_date(value).unwrap()
}

pub fn policy_with_resources(resources: &[&str]) -> PolicyConfig {
    PolicyConfig {
        resources: resources.iter().map(|r| (*r).to_string()).collect(),
        ..PolicyConfig::default()
    }
}
