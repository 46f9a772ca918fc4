use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::adapters::cache::capacity_cache::LruCapacityCache;
use crate::config::types::{Config, PolicyConfig};
use crate::domain::calendar::{self, CalendarCell, DayStatus, Severity};
use crate::domain::decision::{BeachAvailability, FishingAvailability};
use crate::domain::fishing_window::{CalendarKind, FishingBlock, FishingLock};
use crate::domain::ledger::{LedgerSnapshot, TripType};
use crate::domain::occupancy::{self, CapacityView, DayCapacity, ResourceCapacity};
use crate::domain::rules;
use crate::ports::capacity_cache::CapacityCache;
use crate::ports::ledger_source::LedgerSource;

/// Public query surface for booking forms and calendars.
///
/// Every method reads the ledger source exactly once and answers from that
/// snapshot.
pub struct AvailabilityEngine {
    source: Arc<dyn LedgerSource>,
    policy: PolicyConfig,
    cache: Option<Arc<dyn CapacityCache>>,
}

impl AvailabilityEngine {
    pub fn new(source: Arc<dyn LedgerSource>, config: &Config) -> Self {
        let cache: Arc<dyn CapacityCache> = Arc::new(LruCapacityCache::new(config.cache.max_entries));
        Self {
            source,
            policy: config.policy.clone(),
            cache: Some(cache),
        }
    }

    /// Engine that recomputes every day on each call.
    pub fn uncached(source: Arc<dyn LedgerSource>, policy: PolicyConfig) -> Self {
        Self {
            source,
            policy,
            cache: None,
        }
    }

    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    pub fn snapshot(&self) -> Arc<LedgerSnapshot> {
        self.source.current()
    }

    fn with_view<T>(&self, f: impl FnOnce(&CapacityView<'_>) -> T) -> T {
        let ledger = self.source.current();
        let view = CapacityView::new(&ledger, &self.policy);
        match &self.cache {
            Some(cache) => f(&view.with_cache(cache.as_ref())),
            None => f(&view),
        }
    }

    pub fn day_capacity(&self, date: NaiveDate) -> DayCapacity {
        self.with_view(|view| view.day(date))
    }

    pub fn beach_day_capacity(&self, date: NaiveDate, resource: &str) -> ResourceCapacity {
        self.with_view(|view| view.resource(date, resource))
    }

    pub fn is_resource_locked_by_fishing(&self, date: NaiveDate) -> bool {
        self.with_view(|view| rules::is_resource_locked_by_fishing(view, date))
    }

    pub fn fishing_lock(&self, date: NaiveDate) -> FishingLock {
        self.with_view(|view| rules::fishing_lock(view, date))
    }

    pub fn check_beach_availability(
        &self,
        date: NaiveDate,
        resource: &str,
        party_size: u32,
        overnight_nights: Option<u32>,
    ) -> BeachAvailability {
        self.with_view(|view| {
            rules::check_beach_availability(view, date, resource, party_size, overnight_nights)
        })
    }

    pub fn check_fishing_capacity(
        &self,
        date: NaiveDate,
        anglers: u32,
        trip_type: TripType,
    ) -> FishingAvailability {
        self.with_view(|view| rules::check_fishing_capacity(view, date, anglers, trip_type))
    }

    /// Fishing-blocked dates over the configured horizon starting at `from`.
    pub fn blocked_fishing_dates_map(
        &self,
        from: NaiveDate,
        kind: CalendarKind,
    ) -> BTreeMap<NaiveDate, FishingBlock> {
        self.with_view(|view| {
            calendar::blocked_fishing_dates(view, from, self.policy.calendar_horizon_days, kind)
        })
    }

    /// Same as [`Self::blocked_fishing_dates_map`], keyed by ISO date with rendered reasons.
    pub fn blocked_fishing_reasons(&self, from: NaiveDate, kind: CalendarKind) -> BTreeMap<String, String> {
        self.with_view(|view| {
            calendar::blocked_fishing_reasons(view, from, self.policy.calendar_horizon_days, kind)
        })
    }

    pub fn day_status(&self, date: NaiveDate) -> DayStatus {
        self.with_view(|view| calendar::day_status(&view.day(date), &self.policy))
    }

    pub fn day_label(&self, date: NaiveDate) -> String {
        self.day_status(date).to_string()
    }

    pub fn day_severity(&self, date: NaiveDate, resource: Option<&str>) -> Severity {
        self.with_view(|view| calendar::day_severity(&view.day(date), &self.policy, resource))
    }

    pub fn day_color(&self, date: NaiveDate, resource: Option<&str>) -> &'static str {
        self.day_severity(date, resource).color()
    }

    pub fn calendar_month(
        &self,
        year: i32,
        month: u32,
        resource: Option<&str>,
        kind: CalendarKind,
    ) -> Vec<CalendarCell> {
        self.with_view(|view| calendar::calendar_month(view, year, month, resource, kind))
    }

    /// Dates over the horizon where the ledger holds more than one stay.
    pub fn overnight_conflicts(&self, from: NaiveDate) -> Vec<NaiveDate> {
        let ledger = self.source.current();
        occupancy::overnight_conflicts(&ledger, &self.policy, from, self.policy.calendar_horizon_days)
    }
}
