#![allow(clippy::cast_precision_loss)] // Person counts are small enough for f64

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::dates::{add_days, is_within_range};
use super::fishing_window::{FishingLock, LedgerProbe, fishing_lock};
use super::ledger::{LedgerSnapshot, normalize_resource};
use crate::config::types::PolicyConfig;
use crate::ports::capacity_cache::CapacityCache;

/// Nights a long-range fishing trip keeps the fishing base occupied.
pub const FISHING_SPILLOVER_DAYS: u32 = 2;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceCapacity {
    pub resource: String,
    pub booked_persons: u32,
    pub ceiling: u32,
    pub remaining_spots: u32,
    pub is_full: bool,
    pub capacity_percent: f64,
}

impl ResourceCapacity {
    pub fn new(resource: impl Into<String>, booked_persons: u32, ceiling: u32) -> Self {
        let remaining_spots = ceiling.saturating_sub(booked_persons);
        let capacity_percent = if ceiling == 0 {
            100.0
        } else {
            f64::from(booked_persons) / f64::from(ceiling) * 100.0
        };
        Self {
            resource: resource.into(),
            booked_persons,
            ceiling,
            remaining_spots,
            is_full: remaining_spots == 0,
            capacity_percent,
        }
    }
}

/// A multi-day occupancy that touches a date, counted from its start date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvernightSpillover {
    pub origin_date: NaiveDate,
    pub nights: u32,
    pub resource: String,
    pub persons: u32,
    pub from_fishing: bool,
}

/// Occupancy of one date. Computed on demand; never stored in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayCapacity {
    pub date: NaiveDate,
    pub resources: BTreeMap<String, ResourceCapacity>,
    pub booked_persons: u32,
    pub fishing_groups: u32,
    pub fishing_anglers: u32,
    pub fishing_lock: FishingLock,
    pub fishing_base_locked: bool,
    pub overnight_booked: bool,
    pub can_book_new_overnight: bool,
    /// More than one stay is active on this date; the ledger breaks the one-overnight rule.
    pub overnight_conflict: bool,
    pub spillovers: Vec<OvernightSpillover>,
}

impl DayCapacity {
    pub fn resource(&self, name: &str) -> Option<&ResourceCapacity> {
        self.resources.get(&normalize_resource(name))
    }

    /// Capacity of a resource, zero-booked when nothing was filed against it.
    pub fn resource_or_empty(&self, name: &str, policy: &PolicyConfig) -> ResourceCapacity {
        let key = normalize_resource(name);
        self.resources
            .get(&key)
            .cloned()
            .unwrap_or_else(|| ResourceCapacity::new(key, 0, policy.ceiling_for(name)))
    }

    /// Fullest resource's percentage, 0 for an empty day.
    pub fn peak_percent(&self) -> f64 {
        self.resources
            .values()
            .map(|r| r.capacity_percent)
            .fold(0.0, f64::max)
    }

    /// Stays holding the overnight slot (fishing spillovers excluded).
    pub fn active_overnights(&self) -> impl Iterator<Item = &OvernightSpillover> {
        self.spillovers.iter().filter(|s| !s.from_fishing)
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Fold every booking, stay spillover and fishing trip touching `date`.
pub fn day_capacity(ledger: &LedgerSnapshot, policy: &PolicyConfig, date: NaiveDate) -> DayCapacity {
    let base = policy.fishing_base();
    let mut counts: BTreeMap<String, u32> = BTreeMap::new();
    for name in policy.resources.iter().chain(std::iter::once(&base)) {
        let key = normalize_resource(name);
        if !key.is_empty() {
            counts.entry(key).or_insert(0);
        }
    }
    let mut add = |resource: String, persons: u32| {
        if resource.is_empty() {
            warn!(%date, persons, "Booking without a resource name, not counted");
            return;
        }
        let slot = counts.entry(resource).or_insert(0);
        *slot = slot.saturating_add(persons);
    };

    // Direct day bookings, including stays that start today.
    for booking in ledger.bookings_on(date) {
        add(booking.resource_key(), booking.persons());
    }

    // Stays that started earlier and still cover today. Only start dates up to
    // `date` can reach it.
    let mut spillovers = Vec::new();
    for (start, booking) in ledger.overnight_bookings_until(date) {
        if !is_within_range(start, booking.overnight_nights, date) {
            continue;
        }
        if start != date {
            add(booking.resource_key(), booking.persons());
        }
        spillovers.push(OvernightSpillover {
            origin_date: start,
            nights: booking.overnight_nights,
            resource: booking.resource_key(),
            persons: booking.persons(),
            from_fishing: false,
        });
    }

    // Long-range trips from yesterday still hold the base today.
    let yesterday = add_days(date, -1);
    for trip in ledger
        .fishing_trips_on(yesterday)
        .iter()
        .filter(|t| t.trip_type.is_long_range())
    {
        add(base.clone(), trip.anglers);
        spillovers.push(OvernightSpillover {
            origin_date: yesterday,
            nights: FISHING_SPILLOVER_DAYS,
            resource: base.clone(),
            persons: trip.anglers,
            from_fishing: true,
        });
    }

    // Today's trips.
    let trips = ledger.fishing_trips_on(date);
    let mut fishing_anglers = 0_u32;
    for trip in trips {
        add(base.clone(), trip.anglers);
        fishing_anglers = fishing_anglers.saturating_add(trip.anglers);
        if trip.trip_type.is_long_range() {
            spillovers.push(OvernightSpillover {
                origin_date: date,
                nights: FISHING_SPILLOVER_DAYS,
                resource: base.clone(),
                persons: trip.anglers,
                from_fishing: true,
            });
        }
    }

    let resources: BTreeMap<String, ResourceCapacity> = counts
        .into_iter()
        .map(|(key, booked)| {
            let ceiling = policy.ceiling_for(&key);
            (key.clone(), ResourceCapacity::new(key, booked, ceiling))
        })
        .collect();
    let booked_persons = resources
        .values()
        .fold(0_u32, |acc, r| acc.saturating_add(r.booked_persons));

    let active_stays = spillovers.iter().filter(|s| !s.from_fishing).count();
    if active_stays > 1 {
        warn!(%date, active_stays, "Ledger holds more than one overnight stay on the same day");
    }

    let lock = fishing_lock(&LedgerProbe::new(ledger, policy), date);

    DayCapacity {
        date,
        resources,
        booked_persons,
        fishing_groups: u32::try_from(trips.len()).unwrap_or(u32::MAX),
        fishing_anglers,
        fishing_lock: lock,
        fishing_base_locked: lock.is_locked(),
        overnight_booked: active_stays > 0,
        can_book_new_overnight: active_stays == 0,
        overnight_conflict: active_stays > 1,
        spillovers,
    }
}

/// Capacity of one resource on a date.
pub fn resource_day_capacity(
    ledger: &LedgerSnapshot,
    policy: &PolicyConfig,
    date: NaiveDate,
    resource: &str,
) -> ResourceCapacity {
    day_capacity(ledger, policy, date).resource_or_empty(resource, policy)
}

/// Dates in `[from, from + days)` where the ledger holds more than one stay.
pub fn overnight_conflicts(
    ledger: &LedgerSnapshot,
    policy: &PolicyConfig,
    from: NaiveDate,
    days: u32,
) -> Vec<NaiveDate> {
    (0..i64::from(days))
        .map(|offset| add_days(from, offset))
        .filter(|date| day_capacity(ledger, policy, *date).overnight_conflict)
        .collect()
}

// ---------------------------------------------------------------------------
// Snapshot-bound view
// ---------------------------------------------------------------------------

/// One ledger snapshot plus the policy, optionally memoised.
///
/// All rule evaluation goes through a view so a whole decision sees exactly one
/// snapshot.
pub struct CapacityView<'a> {
    ledger: &'a LedgerSnapshot,
    policy: &'a PolicyConfig,
    cache: Option<&'a dyn CapacityCache>,
}

impl<'a> CapacityView<'a> {
    pub fn new(ledger: &'a LedgerSnapshot, policy: &'a PolicyConfig) -> Self {
        Self {
            ledger,
            policy,
            cache: None,
        }
    }

    #[must_use]
    pub fn with_cache(mut self, cache: &'a dyn CapacityCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn ledger(&self) -> &'a LedgerSnapshot {
        self.ledger
    }

    pub fn policy(&self) -> &'a PolicyConfig {
        self.policy
    }

    pub fn probe(&self) -> LedgerProbe<'a> {
        LedgerProbe::new(self.ledger, self.policy)
    }

    pub fn day(&self, date: NaiveDate) -> DayCapacity {
        let generation = self.ledger.generation();
        if let Some(cache) = self.cache {
            if let Some(hit) = cache.get(generation, date) {
                debug!(%date, generation, "Cache hit for day capacity");
                return hit;
            }
            let computed = day_capacity(self.ledger, self.policy, date);
            cache.set(generation, date, &computed);
            return computed;
        }
        day_capacity(self.ledger, self.policy, date)
    }

    pub fn resource(&self, date: NaiveDate, resource: &str) -> ResourceCapacity {
        self.day(date).resource_or_empty(resource, self.policy)
    }
}
