use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::fishing_window::{FishingBlock, FishingLock};
use super::ledger::display_name;

/// The rule that turned a request down. `Display` is the user-facing reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    NoResource,
    InvalidPartySize,
    InvalidNightCount {
        requested: u32,
        max: u32,
    },
    FishingQuotaReached {
        date: NaiveDate,
        booked: u32,
        max: u32,
    },
    NoAnglers,
    TooManyAnglers {
        requested: u32,
        max: u32,
    },
    FishingLocked {
        date: NaiveDate,
        lock: FishingLock,
    },
    NextDayFishingConflict {
        date: NaiveDate,
        next: NaiveDate,
    },
    FullyBooked {
        resource: String,
        date: NaiveDate,
    },
    NotEnoughSpots {
        resource: String,
        date: NaiveDate,
        remaining: u32,
        requested: u32,
    },
    OvernightConflict {
        date: NaiveDate,
    },
    FishingBaseLockedDuringStay {
        resource: String,
        date: NaiveDate,
        lock: FishingLock,
    },
    FishingBaseFull {
        resource: String,
        date: NaiveDate,
        remaining: u32,
        requested: u32,
    },
}

impl Rejection {
    pub fn from_block(date: NaiveDate, block: FishingBlock) -> Self {
        match block {
            FishingBlock::QuotaReached { booked, max } => Self::FishingQuotaReached { date, booked, max },
            FishingBlock::Locked { lock } => Self::FishingLocked { date, lock },
            FishingBlock::NextDayConflict { next } => Self::NextDayFishingConflict { date, next },
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoResource => write!(f, "No resource selected"),
            Self::InvalidPartySize => write!(f, "Party size must be at least 1"),
            Self::InvalidNightCount { requested: 0, .. } => {
                write!(f, "An overnight stay needs at least one night")
            }
            Self::InvalidNightCount { requested, max } => write!(
                f,
                "Stays are limited to {max} night(s); {requested} requested"
            ),
            Self::FishingQuotaReached { date, booked, max } => write!(
                f,
                "Fishing quota reached on {date}: {booked} of {max} group(s) already booked"
            ),
            Self::NoAnglers => write!(f, "A fishing trip needs at least one angler"),
            Self::TooManyAnglers { requested, max } => write!(
                f,
                "A fishing group takes at most {max} anglers ({requested} requested)"
            ),
            Self::FishingLocked { date, lock } => write!(f, "Not available on {date}: {lock}"),
            Self::NextDayFishingConflict { date, next } => write!(
                f,
                "A fishing trip is already booked on {next}; a trip on {date} would overlap its two-day lock"
            ),
            Self::FullyBooked { resource, date } => {
                write!(f, "{} is fully booked on {date}", display_name(resource))
            }
            Self::NotEnoughSpots {
                resource,
                date,
                remaining,
                requested,
            } => write!(
                f,
                "Only {remaining} spot(s) left at {} on {date} for a party of {requested}; reduce the party or pick another day",
                display_name(resource)
            ),
            Self::OvernightConflict { date } => write!(
                f,
                "An overnight stay is already booked on {date}; only one overnight stay per day"
            ),
            Self::FishingBaseLockedDuringStay {
                resource,
                date,
                lock,
            } => write!(
                f,
                "{} is locked by fishing on {date}, during the requested stay: {lock}",
                display_name(resource)
            ),
            Self::FishingBaseFull {
                resource,
                date,
                remaining,
                requested,
            } => write!(
                f,
                "Only {remaining} spot(s) left at {} on {date} for {requested} angler(s)",
                display_name(resource)
            ),
        }
    }
}

/// Outcome of a day-trip or overnight request at a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeachAvailability {
    pub can_book: bool,
    pub reason: String,
    /// Spots left after the booking; on rejection, spots left as things stand.
    pub remaining_after: u32,
    pub rejection: Option<Rejection>,
}

impl BeachAvailability {
    pub fn accepted(reason: String, remaining_after: u32) -> Self {
        Self {
            can_book: true,
            reason,
            remaining_after,
            rejection: None,
        }
    }

    pub fn rejected(rejection: Rejection, remaining: u32) -> Self {
        Self {
            can_book: false,
            reason: rejection.to_string(),
            remaining_after: remaining,
            rejection: Some(rejection),
        }
    }
}

/// Outcome of a fishing-trip request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FishingAvailability {
    pub can_book: bool,
    pub message: String,
    pub rejection: Option<Rejection>,
}

impl FishingAvailability {
    pub fn accepted(message: String) -> Self {
        Self {
            can_book: true,
            message,
            rejection: None,
        }
    }

    pub fn rejected(rejection: Rejection) -> Self {
        Self {
            can_book: false,
            message: rejection.to_string(),
            rejection: Some(rejection),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::date;

    #[test]
    fn fully_booked_names_resource_and_date() {
        let r = Rejection::FullyBooked {
            resource: "resort_a".into(),
            date: date("2025-06-10"),
        };
        assert_eq!(r.to_string(), "Resort A is fully booked on 2025-06-10");
    }

    #[test]
    fn not_enough_spots_suggests_alternatives() {
        let r = Rejection::NotEnoughSpots {
            resource: "loco".into(),
            date: date("2025-06-10"),
            remaining: 2,
            requested: 4,
        };
        let msg = r.to_string();
        assert!(msg.contains("Only 2 spot(s) left at Loco"));
        assert!(msg.contains("reduce the party"));
    }

    #[test]
    fn block_maps_to_matching_rejection() {
        let d = date("2025-06-10");
        assert_eq!(
            Rejection::from_block(d, FishingBlock::QuotaReached { booked: 1, max: 1 }),
            Rejection::FishingQuotaReached {
                date: d,
                booked: 1,
                max: 1
            }
        );
        assert!(matches!(
            Rejection::from_block(
                d,
                FishingBlock::NextDayConflict {
                    next: date("2025-06-11")
                }
            ),
            Rejection::NextDayFishingConflict { .. }
        ));
    }

    #[test]
    fn rejected_outcome_carries_reason_text() {
        let outcome = FishingAvailability::rejected(Rejection::TooManyAnglers { requested: 6, max: 5 });
        assert!(!outcome.can_book);
        assert!(outcome.message.contains("at most 5 anglers"));
        assert!(outcome.rejection.is_some());
    }

    #[test]
    fn rejection_serializes_with_kind_tag() {
        let json = serde_json::to_value(Rejection::OvernightConflict {
            date: date("2025-07-02"),
        })
        .unwrap();
        assert_eq!(json["kind"], "overnight_conflict");
        assert_eq!(json["date"], "2025-07-02");
    }
}
