use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::dates::{add_days, format_iso_date};
use super::fishing_window::{ActivityIndex, CalendarKind, FishingBlock, evaluate_block};
use super::ledger::display_name;
use super::occupancy::{CapacityView, DayCapacity};
use crate::config::types::PolicyConfig;

/// One-line summary of a day for calendar cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DayStatus {
    Available,
    FishingReserved { resource: String },
    OvernightBooked,
    Booked { persons: u32 },
}

impl std::fmt::Display for DayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available => write!(f, "Available"),
            Self::FishingReserved { resource } => {
                write!(f, "{} Reserved (Fishing)", display_name(resource))
            }
            Self::OvernightBooked => write!(f, "Overnight booked"),
            Self::Booked { persons } => write!(f, "{persons} booked"),
        }
    }
}

pub fn day_status(capacity: &DayCapacity, policy: &PolicyConfig) -> DayStatus {
    if capacity.fishing_base_locked {
        DayStatus::FishingReserved {
            resource: policy.fishing_base(),
        }
    } else if capacity.overnight_booked {
        DayStatus::OvernightBooked
    } else if capacity.booked_persons > 0 {
        DayStatus::Booked {
            persons: capacity.booked_persons,
        }
    } else {
        DayStatus::Available
    }
}

/// Fill level band used to colour calendar cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Empty,
    Low,
    Moderate,
    High,
    Critical,
}

impl Severity {
    pub fn color(self) -> &'static str {
        match self {
            Self::Empty => "#4caf50",
            Self::Low => "#8bc34a",
            Self::Moderate => "#ffc107",
            Self::High => "#ff9800",
            Self::Critical => "#f44336",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::Low => write!(f, "low"),
            Self::Moderate => write!(f, "moderate"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

pub fn severity_for_percent(percent: f64) -> Severity {
    if percent <= 0.0 {
        Severity::Empty
    } else if percent <= 30.0 {
        Severity::Low
    } else if percent <= 60.0 {
        Severity::Moderate
    } else if percent <= 80.0 {
        Severity::High
    } else {
        Severity::Critical
    }
}

/// Band for a resource on the day, or for the fullest resource when `resource` is `None`.
pub fn day_severity(capacity: &DayCapacity, policy: &PolicyConfig, resource: Option<&str>) -> Severity {
    let percent = match resource {
        Some(name) => capacity.resource_or_empty(name, policy).capacity_percent,
        None => capacity.peak_percent(),
    };
    severity_for_percent(percent)
}

/// Every date in `[from, from + days)` on which no new fishing group can start.
///
/// Builds the activity index once and runs the same block rule the per-date
/// check uses, so the two always agree.
pub fn blocked_fishing_dates(
    view: &CapacityView<'_>,
    from: NaiveDate,
    days: u32,
    kind: CalendarKind,
) -> BTreeMap<NaiveDate, FishingBlock> {
    let policy = view.policy();
    let index = ActivityIndex::build(view.ledger(), policy);
    (0..i64::from(days))
        .map(|offset| add_days(from, offset))
        .filter_map(|date| {
            evaluate_block(&index, date, kind, policy.max_fishing_groups_per_day)
                .map(|block| (date, block))
        })
        .collect()
}

/// [`blocked_fishing_dates`] keyed by ISO date with rendered reasons.
pub fn blocked_fishing_reasons(
    view: &CapacityView<'_>,
    from: NaiveDate,
    days: u32,
    kind: CalendarKind,
) -> BTreeMap<String, String> {
    blocked_fishing_dates(view, from, days, kind)
        .into_iter()
        .map(|(date, block)| (format_iso_date(date), block.to_string()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub status: DayStatus,
    pub label: String,
    pub severity: Severity,
    pub color: String,
    pub fishing_block: Option<FishingBlock>,
}

/// One cell per day of `year`-`month`; empty for an invalid month.
pub fn calendar_month(
    view: &CapacityView<'_>,
    year: i32,
    month: u32,
    resource: Option<&str>,
    kind: CalendarKind,
) -> Vec<CalendarCell> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let policy = view.policy();
    let length = first
        .iter_days()
        .take_while(|d| d.month() == month)
        .count();
    let blocks = blocked_fishing_dates(view, first, u32::try_from(length).unwrap_or(31), kind);

    first
        .iter_days()
        .take(length)
        .map(|date| {
            let capacity = view.day(date);
            let status = day_status(&capacity, policy);
            let severity = day_severity(&capacity, policy, resource);
            CalendarCell {
                date,
                label: status.to_string(),
                status,
                severity,
                color: severity.color().to_string(),
                fishing_block: blocks.get(&date).copied(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ledger::{BookingEntry, FishingTripEntry, LedgerSnapshot, TripType};
    use crate::domain::occupancy::day_capacity;
    use crate::domain::rules::fishing_block;
    use crate::test_helpers::date;

    #[test]
    fn severity_band_edges() {
        assert_eq!(severity_for_percent(0.0), Severity::Empty);
        assert_eq!(severity_for_percent(10.0), Severity::Low);
        assert_eq!(severity_for_percent(30.0), Severity::Low);
        assert_eq!(severity_for_percent(30.1), Severity::Moderate);
        assert_eq!(severity_for_percent(60.0), Severity::Moderate);
        assert_eq!(severity_for_percent(80.0), Severity::High);
        assert_eq!(severity_for_percent(80.1), Severity::Critical);
        assert_eq!(severity_for_percent(120.0), Severity::Critical);
    }

    #[test]
    fn status_labels() {
        let policy = PolicyConfig::default();
        let ledger = LedgerSnapshot::builder()
            .fishing_trip(date("2025-06-10"), FishingTripEntry::new(TripType::Offshore, 2))
            .booking(date("2025-07-01"), BookingEntry::new("resort_a", 4, 0).overnight(2))
            .booking(date("2025-08-01"), BookingEntry::new("resort_a", 3, 0))
            .build();
        let label = |d: &str| day_status(&day_capacity(&ledger, &policy, date(d)), &policy).to_string();
        assert_eq!(label("2025-06-10"), "Loco Reserved (Fishing)");
        assert_eq!(label("2025-06-11"), "Loco Reserved (Fishing)");
        assert_eq!(label("2025-07-02"), "Overnight booked");
        assert_eq!(label("2025-08-01"), "3 booked");
        assert_eq!(label("2025-08-02"), "Available");
    }

    #[test]
    fn severity_by_resource_or_peak() {
        let policy = PolicyConfig::default();
        let ledger = LedgerSnapshot::builder()
            .booking(date("2025-08-01"), BookingEntry::new("resort_a", 9, 0))
            .booking(date("2025-08-01"), BookingEntry::new("loco", 2, 0))
            .build();
        let cap = day_capacity(&ledger, &policy, date("2025-08-01"));
        assert_eq!(day_severity(&cap, &policy, None), Severity::Critical);
        assert_eq!(day_severity(&cap, &policy, Some("loco")), Severity::Low);
        assert_eq!(day_severity(&cap, &policy, Some("nowhere")), Severity::Empty);
    }

    #[test]
    fn bulk_map_matches_per_date_rule() {
        let policy = PolicyConfig::default();
        let ledger = LedgerSnapshot::builder()
            .fishing_trip(date("2025-06-10"), FishingTripEntry::new(TripType::Offshore, 2))
            .booking(
                date("2025-06-20"),
                BookingEntry::new("resort_a", 2, 0).with_add_on("inshore"),
            )
            .build();
        let view = CapacityView::new(&ledger, &policy);
        let from = date("2025-06-01");
        for kind in [CalendarKind::General, CalendarKind::LongRange] {
            let map = blocked_fishing_dates(&view, from, 40, kind);
            for offset in 0..40 {
                let d = add_days(from, offset);
                assert_eq!(map.get(&d).copied(), fishing_block(&view, d, kind), "{d} {kind:?}");
            }
        }
    }

    #[test]
    fn reasons_map_uses_iso_keys() {
        let policy = PolicyConfig::default();
        let ledger = LedgerSnapshot::builder()
            .fishing_trip(date("2025-06-10"), FishingTripEntry::new(TripType::Offshore, 2))
            .build();
        let view = CapacityView::new(&ledger, &policy);
        let reasons = blocked_fishing_reasons(&view, date("2025-06-08"), 5, CalendarKind::General);
        let keys: Vec<_> = reasons.keys().cloned().collect();
        assert_eq!(keys, vec!["2025-06-09", "2025-06-10", "2025-06-11"]);
        assert!(reasons["2025-06-10"].contains("quota"));
    }

    #[test]
    fn month_has_one_cell_per_day() {
        let policy = PolicyConfig::default();
        let ledger = LedgerSnapshot::empty();
        let view = CapacityView::new(&ledger, &policy);
        let feb = calendar_month(&view, 2024, 2, None, CalendarKind::General);
        assert_eq!(feb.len(), 29);
        assert!(feb.iter().all(|c| c.label == "Available" && c.severity == Severity::Empty));
        assert!(calendar_month(&view, 2025, 13, None, CalendarKind::General).is_empty());
    }
}
