use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Canonical key for a resource name: trimmed, lower-case, separators as `_`.
pub fn normalize_resource(name: &str) -> String {
    name.trim()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Human label for a resource key: `resort_a` becomes `Resort A`.
pub fn display_name(resource: &str) -> String {
    normalize_resource(resource)
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// One confirmed day-trip (or stay, when `overnight_nights > 0`) at a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingEntry {
    pub resource: String,
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    #[serde(default)]
    pub add_ons: Vec<String>,
    #[serde(default)]
    pub overnight_nights: u32,
}

impl BookingEntry {
    pub fn new(resource: impl Into<String>, adults: u32, children: u32) -> Self {
        Self {
            resource: resource.into(),
            adults,
            children,
            add_ons: Vec::new(),
            overnight_nights: 0,
        }
    }

    #[must_use]
    pub fn with_add_on(mut self, add_on: impl Into<String>) -> Self {
        self.add_ons.push(add_on.into());
        self
    }

    #[must_use]
    pub fn overnight(mut self, nights: u32) -> Self {
        self.overnight_nights = nights;
        self
    }

    pub fn persons(&self) -> u32 {
        self.adults.saturating_add(self.children)
    }

    pub fn resource_key(&self) -> String {
        normalize_resource(&self.resource)
    }

    pub fn is_overnight(&self) -> bool {
        self.overnight_nights > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripType {
    Inshore,
    Offshore,
    BigGame,
}

impl TripType {
    /// Long-range trips keep the fishing base occupied into the following day.
    pub fn is_long_range(self) -> bool {
        matches!(self, Self::Offshore | Self::BigGame)
    }
}

impl std::fmt::Display for TripType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inshore => write!(f, "Inshore"),
            Self::Offshore => write!(f, "Offshore"),
            Self::BigGame => write!(f, "Big game"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FishingTripEntry {
    pub trip_type: TripType,
    pub anglers: u32,
    #[serde(default)]
    pub meal_add_ons: Vec<String>,
}

impl FishingTripEntry {
    pub fn new(trip_type: TripType, anglers: u32) -> Self {
        Self {
            trip_type,
            anglers,
            meal_add_ons: Vec::new(),
        }
    }
}

/// Everything filed under one calendar date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySnapshot {
    #[serde(default)]
    pub bookings: Vec<BookingEntry>,
    #[serde(default)]
    pub fishing_trips: Vec<FishingTripEntry>,
    #[serde(default)]
    pub confirmed_codes: Vec<String>,
}

impl DaySnapshot {
    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty() && self.fishing_trips.is_empty()
    }

    pub fn is_confirmed(&self, code: &str) -> bool {
        self.confirmed_codes.iter().any(|c| c == code)
    }
}

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// Immutable, date-indexed view of all confirmed bookings.
///
/// A refresh produces a whole new snapshot with a higher `version`; nothing
/// mutates one after it has been built.
///
/// `version` comes from the feed and may repeat. `generation` is assigned
/// locally, never repeats within the process, and is what memoised results
/// are keyed on. Building, deserializing and cloning all mint a new one.
#[derive(Debug, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub version: u64,
    pub refreshed_at: DateTime<Utc>,
    #[serde(default)]
    pub days: BTreeMap<NaiveDate, DaySnapshot>,
    #[serde(skip, default = "next_generation")]
    generation: u64,
}

impl Clone for LedgerSnapshot {
    fn clone(&self) -> Self {
        Self {
            version: self.version,
            refreshed_at: self.refreshed_at,
            days: self.days.clone(),
            generation: next_generation(),
        }
    }
}

// Equality is on contents; two snapshots of the same feed compare equal
// whatever their generations.
impl PartialEq for LedgerSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.refreshed_at == other.refreshed_at
            && self.days == other.days
    }
}

impl Eq for LedgerSnapshot {}

impl LedgerSnapshot {
    pub fn empty() -> Self {
        Self {
            version: 0,
            refreshed_at: DateTime::<Utc>::default(),
            days: BTreeMap::new(),
            generation: next_generation(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Give this snapshot a fresh generation, invalidating anything memoised
    /// against the old one.
    pub(crate) fn restamp(&mut self) {
        self.generation = next_generation();
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DaySnapshot> {
        self.days.get(&date)
    }

    pub fn bookings_on(&self, date: NaiveDate) -> &[BookingEntry] {
        self.day(date)
            .map(|d| d.bookings.as_slice())
            .unwrap_or_default()
    }

    pub fn fishing_trips_on(&self, date: NaiveDate) -> &[FishingTripEntry] {
        self.day(date)
            .map(|d| d.fishing_trips.as_slice())
            .unwrap_or_default()
    }

    /// `(start date, booking)` pairs with at least one night, starting on or
    /// before `last`.
    pub fn overnight_bookings_until(
        &self,
        last: NaiveDate,
    ) -> impl Iterator<Item = (NaiveDate, &BookingEntry)> {
        self.days.range(..=last).flat_map(|(date, day)| {
            day.bookings
                .iter()
                .filter(|b| b.is_overnight())
                .map(move |b| (*date, b))
        })
    }

    pub fn builder() -> LedgerBuilder {
        LedgerBuilder::default()
    }
}

impl Default for LedgerSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// Assembles a [`LedgerSnapshot`]; the only way entries get into one.
#[derive(Debug, Default)]
pub struct LedgerBuilder {
    version: u64,
    refreshed_at: Option<DateTime<Utc>>,
    days: BTreeMap<NaiveDate, DaySnapshot>,
}

impl LedgerBuilder {
    #[must_use]
    pub fn version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub fn refreshed_at(mut self, at: DateTime<Utc>) -> Self {
        self.refreshed_at = Some(at);
        self
    }

    #[must_use]
    pub fn booking(mut self, date: NaiveDate, entry: BookingEntry) -> Self {
        self.days.entry(date).or_default().bookings.push(entry);
        self
    }

    #[must_use]
    pub fn fishing_trip(mut self, date: NaiveDate, entry: FishingTripEntry) -> Self {
        self.days.entry(date).or_default().fishing_trips.push(entry);
        self
    }

    #[must_use]
    pub fn confirmed(mut self, date: NaiveDate, code: impl Into<String>) -> Self {
        self.days
            .entry(date)
            .or_default()
            .confirmed_codes
            .push(code.into());
        self
    }

    pub fn build(self) -> LedgerSnapshot {
        LedgerSnapshot {
            version: self.version,
            refreshed_at: self.refreshed_at.unwrap_or_else(Utc::now),
            days: self.days,
            generation: next_generation(),
        }
    }
}
