//! The sliding two-day fishing lock.
//!
//! Fishing activity on day X (a trip, or a day-trip booking carrying an inshore
//! add-on) locks the fishing base on X and X+1. Every fishing question in the
//! crate goes through [`activity_at`], [`fishing_lock`] and [`evaluate_block`].
//! The per-date queries probe the ledger directly ([`LedgerProbe`]). The bulk
//! calendar probes a precomputed [`ActivityIndex`]. The rule code is the same
//! in both cases.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::dates::add_days;
use super::ledger::LedgerSnapshot;
use crate::config::types::PolicyConfig;

/// Read access to the per-day fishing facts the lock rule depends on.
pub trait ActivityProbe {
    fn trips_on(&self, date: NaiveDate) -> u32;
    fn inshore_addon_on(&self, date: NaiveDate) -> bool;

    fn has_activity(&self, date: NaiveDate) -> bool {
        self.trips_on(date) > 0 || self.inshore_addon_on(date)
    }
}

/// Probes a ledger snapshot on demand.
pub struct LedgerProbe<'a> {
    ledger: &'a LedgerSnapshot,
    policy: &'a PolicyConfig,
}

impl<'a> LedgerProbe<'a> {
    pub fn new(ledger: &'a LedgerSnapshot, policy: &'a PolicyConfig) -> Self {
        Self { ledger, policy }
    }
}

impl ActivityProbe for LedgerProbe<'_> {
    fn trips_on(&self, date: NaiveDate) -> u32 {
        u32::try_from(self.ledger.fishing_trips_on(date).len()).unwrap_or(u32::MAX)
    }

    fn inshore_addon_on(&self, date: NaiveDate) -> bool {
        self.ledger
            .bookings_on(date)
            .iter()
            .any(|b| b.add_ons.iter().any(|a| self.policy.is_inshore_addon(a)))
    }
}

/// Fishing facts for every ledger date, gathered in one pass.
#[derive(Debug, Clone, Default)]
pub struct ActivityIndex {
    trips: BTreeMap<NaiveDate, u32>,
    inshore: BTreeSet<NaiveDate>,
}

impl ActivityIndex {
    pub fn build(ledger: &LedgerSnapshot, policy: &PolicyConfig) -> Self {
        let mut index = Self::default();
        for (date, day) in &ledger.days {
            if !day.fishing_trips.is_empty() {
                let count = u32::try_from(day.fishing_trips.len()).unwrap_or(u32::MAX);
                index.trips.insert(*date, count);
            }
            if day
                .bookings
                .iter()
                .any(|b| b.add_ons.iter().any(|a| policy.is_inshore_addon(a)))
            {
                index.inshore.insert(*date);
            }
        }
        index
    }
}

impl ActivityProbe for ActivityIndex {
    fn trips_on(&self, date: NaiveDate) -> u32 {
        self.trips.get(&date).copied().unwrap_or(0)
    }

    fn inshore_addon_on(&self, date: NaiveDate) -> bool {
        self.inshore.contains(&date)
    }
}

/// Fishing activity `offset` days away from `date`.
pub fn activity_at(probe: &impl ActivityProbe, date: NaiveDate, offset: i64) -> bool {
    probe.has_activity(add_days(date, offset))
}

/// Lock state of the fishing base on a date, and what caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FishingLock {
    Free,
    TripToday,
    InshoreAddOnToday,
    SpilloverFromPreviousDay { origin: NaiveDate },
}

impl FishingLock {
    pub fn is_locked(self) -> bool {
        !matches!(self, Self::Free)
    }
}

impl std::fmt::Display for FishingLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Free => write!(f, "The fishing base is free"),
            Self::TripToday => write!(f, "The fishing base is reserved by a fishing trip booked today"),
            Self::InshoreAddOnToday => write!(
                f,
                "The fishing base is reserved by an inshore fishing outing booked today"
            ),
            Self::SpilloverFromPreviousDay { origin } => write!(
                f,
                "The fishing base is still locked by the fishing trip of {origin}"
            ),
        }
    }
}

pub fn fishing_lock(probe: &impl ActivityProbe, date: NaiveDate) -> FishingLock {
    if probe.trips_on(date) > 0 {
        FishingLock::TripToday
    } else if probe.inshore_addon_on(date) {
        FishingLock::InshoreAddOnToday
    } else if activity_at(probe, date, -1) {
        FishingLock::SpilloverFromPreviousDay {
            origin: add_days(date, -1),
        }
    } else {
        FishingLock::Free
    }
}

/// Which blocking rule set a fishing calendar renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarKind {
    /// Every trip type. Blocks quota, today's lock, yesterday's spillover and tomorrow's trip.
    #[default]
    General,
    /// Offshore and big-game calendar. Does not block on the previous day's activity.
    LongRange,
}

/// Why no new fishing group can start on a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "block", rename_all = "snake_case")]
pub enum FishingBlock {
    QuotaReached { booked: u32, max: u32 },
    Locked { lock: FishingLock },
    NextDayConflict { next: NaiveDate },
}

impl std::fmt::Display for FishingBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QuotaReached { booked, max } => write!(
                f,
                "Fishing quota reached: {booked} of {max} group(s) already booked"
            ),
            Self::Locked { lock } => write!(f, "{lock}"),
            Self::NextDayConflict { next } => write!(
                f,
                "A fishing trip is already booked on {next}; a trip today would overlap its lock"
            ),
        }
    }
}

/// First rule that stops a new fishing group starting on `date`, if any.
///
/// A trip already booked today only blocks through the quota, so a policy
/// allowing several groups per day still admits the next one.
pub fn evaluate_block(
    probe: &impl ActivityProbe,
    date: NaiveDate,
    kind: CalendarKind,
    max_groups: u32,
) -> Option<FishingBlock> {
    let booked = probe.trips_on(date);
    if booked >= max_groups {
        return Some(FishingBlock::QuotaReached {
            booked,
            max: max_groups,
        });
    }

    match fishing_lock(probe, date) {
        FishingLock::InshoreAddOnToday => {
            return Some(FishingBlock::Locked {
                lock: FishingLock::InshoreAddOnToday,
            });
        }
        lock @ FishingLock::SpilloverFromPreviousDay { .. } if kind == CalendarKind::General => {
            return Some(FishingBlock::Locked { lock });
        }
        _ => {}
    }

    if activity_at(probe, date, 1) {
        return Some(FishingBlock::NextDayConflict {
            next: add_days(date, 1),
        });
    }
    None
}
