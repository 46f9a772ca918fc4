//! Cross-resource booking rules. Every function here is a pure read of one
//! snapshot through a [`CapacityView`].

use chrono::NaiveDate;
use tracing::debug;

use super::dates::{next_day, stay_dates};
use super::decision::{BeachAvailability, FishingAvailability, Rejection};
use super::fishing_window::{CalendarKind, FishingBlock, FishingLock, evaluate_block, fishing_lock as lock_on};
use super::ledger::{TripType, display_name, normalize_resource};
use super::occupancy::{CapacityView, ResourceCapacity};

/// Lock state of the fishing base on `date`.
pub fn fishing_lock(view: &CapacityView<'_>, date: NaiveDate) -> FishingLock {
    lock_on(&view.probe(), date)
}

pub fn is_resource_locked_by_fishing(view: &CapacityView<'_>, date: NaiveDate) -> bool {
    fishing_lock(view, date).is_locked()
}

/// Date-only reason a new fishing group cannot start on `date`.
pub fn fishing_block(view: &CapacityView<'_>, date: NaiveDate, kind: CalendarKind) -> Option<FishingBlock> {
    evaluate_block(
        &view.probe(),
        date,
        kind,
        view.policy().max_fishing_groups_per_day,
    )
}

/// Can a fishing group of `anglers` depart on `date`?
pub fn check_fishing_capacity(
    view: &CapacityView<'_>,
    date: NaiveDate,
    anglers: u32,
    trip_type: TripType,
) -> FishingAvailability {
    let policy = view.policy();
    let outcome = decide_fishing(view, date, anglers, trip_type);
    debug!(
        %date,
        anglers,
        %trip_type,
        base = %policy.fishing_base(),
        can_book = outcome.can_book,
        "Fishing capacity checked"
    );
    outcome
}

fn decide_fishing(
    view: &CapacityView<'_>,
    date: NaiveDate,
    anglers: u32,
    trip_type: TripType,
) -> FishingAvailability {
    let policy = view.policy();
    let block = fishing_block(view, date, CalendarKind::General);

    // The quota wins over every other reason, whatever the group size.
    if let Some(FishingBlock::QuotaReached { booked, max }) = block {
        return FishingAvailability::rejected(Rejection::FishingQuotaReached { date, booked, max });
    }
    if anglers == 0 {
        return FishingAvailability::rejected(Rejection::NoAnglers);
    }
    if anglers > policy.max_anglers_per_group {
        return FishingAvailability::rejected(Rejection::TooManyAnglers {
            requested: anglers,
            max: policy.max_anglers_per_group,
        });
    }
    if let Some(block) = block {
        return FishingAvailability::rejected(Rejection::from_block(date, block));
    }

    let base = policy.fishing_base();
    let spots = view.resource(date, &base);
    if spots.remaining_spots < anglers {
        return FishingAvailability::rejected(Rejection::FishingBaseFull {
            resource: base,
            date,
            remaining: spots.remaining_spots,
            requested: anglers,
        });
    }
    // Long-range groups are back at the base the next day too.
    if trip_type.is_long_range() {
        let next = next_day(date);
        let next_spots = view.resource(next, &base);
        if next_spots.remaining_spots < anglers {
            return FishingAvailability::rejected(Rejection::FishingBaseFull {
                resource: base,
                date: next,
                remaining: next_spots.remaining_spots,
                requested: anglers,
            });
        }
    }

    FishingAvailability::accepted(format!(
        "{trip_type} fishing trip for {anglers} angler(s) can depart from {} on {date}",
        display_name(&base)
    ))
}

/// Can a party of `party_size` book `resource` on `date`, optionally staying
/// `overnight_nights` nights?
pub fn check_beach_availability(
    view: &CapacityView<'_>,
    date: NaiveDate,
    resource: &str,
    party_size: u32,
    overnight_nights: Option<u32>,
) -> BeachAvailability {
    let outcome = decide_beach(view, date, resource, party_size, overnight_nights);
    debug!(
        %date,
        resource,
        party_size,
        nights = overnight_nights.unwrap_or(0),
        can_book = outcome.can_book,
        "Beach availability checked"
    );
    outcome
}

fn decide_beach(
    view: &CapacityView<'_>,
    date: NaiveDate,
    resource: &str,
    party_size: u32,
    overnight_nights: Option<u32>,
) -> BeachAvailability {
    let policy = view.policy();
    let key = normalize_resource(resource);
    if key.is_empty() {
        return BeachAvailability::rejected(Rejection::NoResource, 0);
    }

    let first_day = view.day(date);
    let spots = first_day.resource_or_empty(&key, policy);
    if party_size == 0 {
        return BeachAvailability::rejected(Rejection::InvalidPartySize, spots.remaining_spots);
    }
    if let Some(nights) = overnight_nights {
        let max = policy.calendar_horizon_days;
        if nights == 0 || nights > max {
            return BeachAvailability::rejected(
                Rejection::InvalidNightCount {
                    requested: nights,
                    max,
                },
                spots.remaining_spots,
            );
        }
    }

    let is_base = policy.is_fishing_base(&key);
    if is_base && first_day.fishing_lock.is_locked() {
        return BeachAvailability::rejected(
            Rejection::FishingLocked {
                date,
                lock: first_day.fishing_lock,
            },
            spots.remaining_spots,
        );
    }
    if let Some(rejection) = capacity_rejection(&spots, date, party_size) {
        return BeachAvailability::rejected(rejection, spots.remaining_spots);
    }

    if let Some(nights) = overnight_nights {
        for night in stay_dates(date, nights) {
            let day = if night == date {
                first_day.clone()
            } else {
                view.day(night)
            };
            if day.overnight_booked {
                return BeachAvailability::rejected(
                    Rejection::OvernightConflict { date: night },
                    spots.remaining_spots,
                );
            }
            if is_base && day.fishing_lock.is_locked() {
                return BeachAvailability::rejected(
                    Rejection::FishingBaseLockedDuringStay {
                        resource: key,
                        date: night,
                        lock: day.fishing_lock,
                    },
                    spots.remaining_spots,
                );
            }
            if night != date {
                let night_spots = day.resource_or_empty(&key, policy);
                if let Some(rejection) = capacity_rejection(&night_spots, night, party_size) {
                    return BeachAvailability::rejected(rejection, spots.remaining_spots);
                }
            }
        }
    }

    let remaining_after = spots.remaining_spots - party_size;
    let stay = match overnight_nights {
        Some(nights) => format!(" for {nights} night(s)"),
        None => String::new(),
    };
    BeachAvailability::accepted(
        format!(
            "{} can take {party_size} on {date}{stay}; {remaining_after} spot(s) left afterwards",
            display_name(&key)
        ),
        remaining_after,
    )
}

fn capacity_rejection(spots: &ResourceCapacity, date: NaiveDate, party_size: u32) -> Option<Rejection> {
    if party_size <= spots.remaining_spots {
        return None;
    }
    Some(if spots.remaining_spots == 0 {
        Rejection::FullyBooked {
            resource: spots.resource.clone(),
            date,
        }
    } else {
        Rejection::NotEnoughSpots {
            resource: spots.resource.clone(),
            date,
            remaining: spots.remaining_spots,
            requested: party_size,
        }
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::types::PolicyConfig;
    use crate::domain::ledger::{BookingEntry, FishingTripEntry, LedgerSnapshot};
    use crate::test_helpers::date;

    fn offshore_on(day: &str) -> LedgerSnapshot {
        LedgerSnapshot::builder()
            .fishing_trip(date(day), FishingTripEntry::new(TripType::Offshore, 2))
            .build()
    }

    #[test]
    fn fishing_accepted_on_empty_ledger() {
        let policy = PolicyConfig::default();
        let ledger = LedgerSnapshot::empty();
        let view = CapacityView::new(&ledger, &policy);
        let outcome = check_fishing_capacity(&view, date("2025-06-10"), 4, TripType::Offshore);
        assert!(outcome.can_book, "{}", outcome.message);
        assert!(outcome.message.contains("4 angler(s)"));
        assert!(outcome.message.contains("Loco"));
    }

    #[test]
    fn quota_wins_even_for_oversized_groups() {
        let policy = PolicyConfig::default();
        let ledger = offshore_on("2025-06-10");
        let view = CapacityView::new(&ledger, &policy);
        let outcome = check_fishing_capacity(&view, date("2025-06-10"), 9, TripType::Inshore);
        assert_eq!(
            outcome.rejection,
            Some(Rejection::FishingQuotaReached {
                date: date("2025-06-10"),
                booked: 1,
                max: 1
            })
        );
    }

    #[test]
    fn too_many_anglers_rejected() {
        let policy = PolicyConfig::default();
        let ledger = LedgerSnapshot::empty();
        let view = CapacityView::new(&ledger, &policy);
        let outcome = check_fishing_capacity(&view, date("2025-06-10"), 6, TripType::Inshore);
        assert_eq!(
            outcome.rejection,
            Some(Rejection::TooManyAnglers { requested: 6, max: 5 })
        );
        let none = check_fishing_capacity(&view, date("2025-06-10"), 0, TripType::Inshore);
        assert_eq!(none.rejection, Some(Rejection::NoAnglers));
    }

    #[test]
    fn previous_and_next_day_trips_block() {
        let policy = PolicyConfig::default();
        let ledger = offshore_on("2025-06-10");
        let view = CapacityView::new(&ledger, &policy);

        let after = check_fishing_capacity(&view, date("2025-06-11"), 2, TripType::Inshore);
        assert!(matches!(
            after.rejection,
            Some(Rejection::FishingLocked {
                lock: FishingLock::SpilloverFromPreviousDay { .. },
                ..
            })
        ));

        let before = check_fishing_capacity(&view, date("2025-06-09"), 2, TripType::Inshore);
        assert!(matches!(
            before.rejection,
            Some(Rejection::NextDayFishingConflict { .. })
        ));

        assert!(check_fishing_capacity(&view, date("2025-06-12"), 2, TripType::BigGame).can_book);
    }

    #[test]
    fn inshore_addon_blocks_fishing_that_day() {
        let policy = PolicyConfig::default();
        let ledger = LedgerSnapshot::builder()
            .booking(
                date("2025-06-10"),
                BookingEntry::new("resort_a", 2, 0).with_add_on("Inshore fishing"),
            )
            .build();
        let view = CapacityView::new(&ledger, &policy);
        let outcome = check_fishing_capacity(&view, date("2025-06-10"), 2, TripType::Offshore);
        assert_eq!(
            outcome.rejection,
            Some(Rejection::FishingLocked {
                date: date("2025-06-10"),
                lock: FishingLock::InshoreAddOnToday
            })
        );
    }

    #[test]
    fn tourists_at_base_limit_anglers() {
        let policy = PolicyConfig::default();
        let ledger = LedgerSnapshot::builder()
            .booking(date("2025-06-10"), BookingEntry::new("loco", 6, 2))
            .build();
        let view = CapacityView::new(&ledger, &policy);
        let outcome = check_fishing_capacity(&view, date("2025-06-10"), 3, TripType::Inshore);
        assert_eq!(
            outcome.rejection,
            Some(Rejection::FishingBaseFull {
                resource: "loco".into(),
                date: date("2025-06-10"),
                remaining: 2,
                requested: 3
            })
        );
        assert!(check_fishing_capacity(&view, date("2025-06-10"), 2, TripType::Inshore).can_book);
    }

    #[test]
    fn long_range_trip_needs_room_at_base_next_day() {
        let policy = PolicyConfig::default();
        let ledger = LedgerSnapshot::builder()
            .booking(date("2025-06-11"), BookingEntry::new("loco", 8, 0))
            .build();
        let view = CapacityView::new(&ledger, &policy);

        for trip_type in [TripType::Offshore, TripType::BigGame] {
            let outcome = check_fishing_capacity(&view, date("2025-06-10"), 5, trip_type);
            assert_eq!(
                outcome.rejection,
                Some(Rejection::FishingBaseFull {
                    resource: "loco".into(),
                    date: date("2025-06-11"),
                    remaining: 2,
                    requested: 5
                }),
                "{trip_type}"
            );
        }
        assert!(check_fishing_capacity(&view, date("2025-06-10"), 2, TripType::Offshore).can_book);
        // Inshore groups are gone by the next day.
        assert!(check_fishing_capacity(&view, date("2025-06-10"), 5, TripType::Inshore).can_book);
    }

    #[test]
    fn second_group_allowed_when_policy_permits() {
        let policy = PolicyConfig {
            max_fishing_groups_per_day: 2,
            ..PolicyConfig::default()
        };
        let ledger = offshore_on("2025-06-10");
        let view = CapacityView::new(&ledger, &policy);
        assert!(check_fishing_capacity(&view, date("2025-06-10"), 2, TripType::Inshore).can_book);
    }

    #[test]
    fn locked_base_rejects_beach_booking() {
        let policy = PolicyConfig::default();
        let ledger = offshore_on("2025-06-10");
        let view = CapacityView::new(&ledger, &policy);
        for day in ["2025-06-10", "2025-06-11"] {
            let outcome = check_beach_availability(&view, date(day), "Loco", 1, None);
            assert!(matches!(outcome.rejection, Some(Rejection::FishingLocked { .. })), "{day}");
        }
        assert!(check_beach_availability(&view, date("2025-06-10"), "resort_a", 4, None).can_book);
    }

    #[test]
    fn full_resource_reports_fully_booked() {
        let policy = PolicyConfig::default();
        let ledger = LedgerSnapshot::builder()
            .booking(date("2025-06-10"), BookingEntry::new("resort_a", 6, 4))
            .build();
        let view = CapacityView::new(&ledger, &policy);
        let outcome = check_beach_availability(&view, date("2025-06-10"), "resort_a", 1, None);
        assert_eq!(
            outcome.rejection,
            Some(Rejection::FullyBooked {
                resource: "resort_a".into(),
                date: date("2025-06-10")
            })
        );
        assert_eq!(outcome.remaining_after, 0);
    }

    #[test]
    fn partial_capacity_reports_remaining() {
        let policy = PolicyConfig::default();
        let ledger = LedgerSnapshot::builder()
            .booking(date("2025-06-10"), BookingEntry::new("resort_a", 7, 0))
            .build();
        let view = CapacityView::new(&ledger, &policy);
        let outcome = check_beach_availability(&view, date("2025-06-10"), "resort_a", 4, None);
        assert!(matches!(
            outcome.rejection,
            Some(Rejection::NotEnoughSpots { remaining: 3, requested: 4, .. })
        ));
        let ok = check_beach_availability(&view, date("2025-06-10"), "resort_a", 3, None);
        assert!(ok.can_book);
        assert_eq!(ok.remaining_after, 0);
    }

    #[test]
    fn overnight_checks_every_night() {
        let policy = PolicyConfig::default();
        let ledger = LedgerSnapshot::builder()
            .booking(date("2025-07-03"), BookingEntry::new("resort_a", 8, 0))
            .build();
        let view = CapacityView::new(&ledger, &policy);
        let outcome = check_beach_availability(&view, date("2025-07-01"), "resort_a", 4, Some(3));
        assert_eq!(
            outcome.rejection,
            Some(Rejection::NotEnoughSpots {
                resource: "resort_a".into(),
                date: date("2025-07-03"),
                remaining: 2,
                requested: 4
            })
        );
        let two_nights = check_beach_availability(&view, date("2025-07-01"), "resort_a", 4, Some(2));
        assert!(two_nights.can_book);
        assert_eq!(two_nights.remaining_after, 6);
        assert!(two_nights.reason.contains("2 night(s)"));
    }

    #[test]
    fn overnight_range_hitting_existing_stay_rejected() {
        let policy = PolicyConfig::default();
        let ledger = LedgerSnapshot::builder()
            .booking(date("2025-07-03"), BookingEntry::new("resort_b", 2, 0).overnight(1))
            .build();
        let view = CapacityView::new(&ledger, &policy);
        let outcome = check_beach_availability(&view, date("2025-07-01"), "resort_a", 2, Some(3));
        assert_eq!(
            outcome.rejection,
            Some(Rejection::OvernightConflict {
                date: date("2025-07-03")
            })
        );
        // A day trip is unaffected by someone else's stay.
        assert!(check_beach_availability(&view, date("2025-07-03"), "resort_a", 2, None).can_book);
    }

    #[test]
    fn overnight_at_base_rejected_when_fishing_lands_mid_stay() {
        let policy = PolicyConfig::default();
        let ledger = offshore_on("2025-06-12");
        let view = CapacityView::new(&ledger, &policy);
        let outcome = check_beach_availability(&view, date("2025-06-10"), "loco", 2, Some(3));
        assert!(matches!(
            outcome.rejection,
            Some(Rejection::FishingBaseLockedDuringStay { .. })
        ));
    }

    #[test]
    fn invalid_requests_are_explained() {
        let policy = PolicyConfig::default();
        let ledger = LedgerSnapshot::empty();
        let view = CapacityView::new(&ledger, &policy);
        let d = date("2025-06-10");
        assert_eq!(
            check_beach_availability(&view, d, " ", 2, None).rejection,
            Some(Rejection::NoResource)
        );
        assert_eq!(
            check_beach_availability(&view, d, "resort_a", 0, None).rejection,
            Some(Rejection::InvalidPartySize)
        );
        assert_eq!(
            check_beach_availability(&view, d, "resort_a", 2, Some(0)).rejection,
            Some(Rejection::InvalidNightCount { requested: 0, max: 90 })
        );
    }

    #[test]
    fn stays_longer_than_the_horizon_rejected() {
        let policy = PolicyConfig::default();
        let ledger = LedgerSnapshot::empty();
        let view = CapacityView::new(&ledger, &policy);
        let d = date("2025-06-10");

        let endless = check_beach_availability(&view, d, "resort_a", 2, Some(u32::MAX));
        assert_eq!(
            endless.rejection,
            Some(Rejection::InvalidNightCount {
                requested: u32::MAX,
                max: 90
            })
        );
        assert!(endless.reason.contains("limited to 90 night(s)"));
        assert_eq!(endless.remaining_after, 10);

        assert!(check_beach_availability(&view, d, "resort_a", 2, Some(90)).can_book);
        assert!(!check_beach_availability(&view, d, "resort_a", 2, Some(91)).can_book);
    }

    #[test]
    fn lock_queries_follow_the_window() {
        let policy = PolicyConfig::default();
        let ledger = offshore_on("2025-06-10");
        let view = CapacityView::new(&ledger, &policy);
        assert!(is_resource_locked_by_fishing(&view, date("2025-06-10")));
        assert!(is_resource_locked_by_fishing(&view, date("2025-06-11")));
        assert!(!is_resource_locked_by_fishing(&view, date("2025-06-09")));
    }
}
