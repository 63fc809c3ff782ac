//! Slot expansion and conflict marking. Pure functions of their inputs.
//!
//! - `expand_slots`: weekly rules -> concrete one-hour slots over the horizon
//! - `mark_booked`: flips slots to booked where a confirmed booking matches

use crate::domain::entities::{AvailabilityRule, Booking, BookingStatus, SlotInstance};
use chrono::{Datelike, Duration, NaiveDateTime};
use std::collections::HashSet;

/// Forward-looking generation window in days, inclusive of today.
pub const HORIZON_DAYS: i64 = 42;

/// Expands weekly availability rules into concrete one-hour slot instances.
///
/// For each day of the horizon the first rule matching its day-of-week is
/// consulted (rule order is the store's iteration order; multiple rules per
/// weekday are an upstream data ambiguity, not resolved here). The rule's
/// [start, end) window is partitioned into consecutive one-hour slots; a
/// trailing remainder shorter than one hour is dropped. Slots starting
/// before `now` are never emitted. Output is ordered by day, then by start.
pub fn expand_slots(rules: &[AvailabilityRule], now: NaiveDateTime) -> Vec<SlotInstance> {
    let today = now.date();
    let mut slots = Vec::new();

    for offset in 0..HORIZON_DAYS {
        let day = today + Duration::days(offset);
        let day_of_week = day.weekday().num_days_from_sunday() as u8;
        let Some(rule) = rules.iter().find(|r| r.day_of_week == day_of_week) else {
            continue;
        };

        let window_end = day.and_time(rule.end);
        let mut start = day.and_time(rule.start);
        loop {
            let end = start + Duration::hours(1);
            if end > window_end {
                break;
            }
            if start >= now {
                slots.push(SlotInstance {
                    tutor_id: rule.tutor_id,
                    start,
                    end,
                    is_booked: false,
                });
            }
            start = end;
        }
    }

    slots
}

/// Marks slots booked where a confirmed booking's start matches exactly.
///
/// Monotonic: a slot already booked is never flipped back to available, so
/// re-running with a windowed subset of bookings (incremental refresh) or
/// with duplicate/out-of-order realtime events is safe.
pub fn mark_booked(slots: &mut [SlotInstance], bookings: &[Booking]) {
    let taken: HashSet<NaiveDateTime> = bookings
        .iter()
        .filter(|b| b.status == BookingStatus::Confirmed)
        .map(|b| b.start)
        .collect();

    for slot in slots.iter_mut() {
        if taken.contains(&slot.start) {
            slot.is_booked = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn rule(day_of_week: u8, start: &str, end: &str) -> AvailabilityRule {
        AvailabilityRule {
            tutor_id: 1,
            day_of_week,
            start: NaiveTime::parse_from_str(start, "%H:%M").unwrap(),
            end: NaiveTime::parse_from_str(end, "%H:%M").unwrap(),
        }
    }

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_time(NaiveTime::parse_from_str(time, "%H:%M").unwrap())
    }

    fn confirmed_at(start: NaiveDateTime) -> Booking {
        Booking {
            id: 1,
            tutor_id: 1,
            student_name: "Thandi".into(),
            student_email: "thandi@example.com".into(),
            start,
            end: start + Duration::hours(1),
            status: BookingStatus::Confirmed,
        }
    }

    // 2026-08-31 is a Monday.
    const MONDAY: &str = "2026-08-31";

    #[test]
    fn monday_morning_rule_yields_three_slots() {
        let rules = vec![rule(1, "09:00", "12:00")];
        let slots = expand_slots(&rules, at(MONDAY, "08:00"));

        let monday_slots: Vec<_> = slots
            .iter()
            .filter(|s| s.start.date() == at(MONDAY, "08:00").date())
            .collect();
        assert_eq!(monday_slots.len(), 3);
        assert_eq!(monday_slots[0].start, at(MONDAY, "09:00"));
        assert_eq!(monday_slots[0].end, at(MONDAY, "10:00"));
        assert_eq!(monday_slots[1].start, at(MONDAY, "10:00"));
        assert_eq!(monday_slots[2].start, at(MONDAY, "11:00"));
        assert_eq!(monday_slots[2].end, at(MONDAY, "12:00"));
    }

    #[test]
    fn no_slot_starts_before_now() {
        let rules = vec![rule(1, "09:00", "12:00")];
        let now = at(MONDAY, "10:30");
        let slots = expand_slots(&rules, now);
        assert!(slots.iter().all(|s| s.start >= now));
        // 11:00 is still offered the same day
        assert_eq!(slots[0].start, at(MONDAY, "11:00"));
    }

    #[test]
    fn sub_hour_window_yields_nothing() {
        let rules = vec![rule(1, "09:00", "09:30")];
        let slots = expand_slots(&rules, at(MONDAY, "08:00"));
        assert!(slots.is_empty());
    }

    #[test]
    fn trailing_partial_hour_is_dropped() {
        let rules = vec![rule(1, "09:00", "11:45")];
        let now = at(MONDAY, "08:00");
        let slots = expand_slots(&rules, now);
        let monday_slots: Vec<_> = slots
            .iter()
            .filter(|s| s.start.date() == now.date())
            .collect();
        assert_eq!(monday_slots.len(), 2);
        assert!(monday_slots.iter().all(|s| s.end <= at(MONDAY, "11:45")));
    }

    #[test]
    fn slots_are_hourly_consecutive_and_ordered() {
        let rules = vec![rule(1, "09:00", "12:00"), rule(3, "14:00", "16:00")];
        let slots = expand_slots(&rules, at(MONDAY, "00:00"));

        for pair in slots.windows(2) {
            assert!(pair[0].start < pair[1].start);
        }
        for slot in &slots {
            assert_eq!(slot.end - slot.start, Duration::hours(1));
        }
        for pair in slots.windows(2) {
            if pair[0].start.date() == pair[1].start.date() {
                assert_eq!(pair[0].end, pair[1].start);
            }
        }
    }

    #[test]
    fn horizon_is_42_days_inclusive_of_today() {
        // A rule for every weekday: one day per horizon day.
        let rules: Vec<_> = (0..7).map(|d| rule(d, "09:00", "10:00")).collect();
        let now = at(MONDAY, "00:00");
        let slots = expand_slots(&rules, now);
        assert_eq!(slots.len(), 42);
        assert_eq!(slots.first().unwrap().start.date(), now.date());
        assert_eq!(
            slots.last().unwrap().start.date(),
            now.date() + Duration::days(41)
        );
    }

    #[test]
    fn first_rule_wins_when_weekday_is_duplicated() {
        let rules = vec![rule(1, "09:00", "10:00"), rule(1, "14:00", "16:00")];
        let slots = expand_slots(&rules, at(MONDAY, "00:00"));
        let monday_slots: Vec<_> = slots
            .iter()
            .filter(|s| s.start.date() == at(MONDAY, "00:00").date())
            .collect();
        assert_eq!(monday_slots.len(), 1);
        assert_eq!(monday_slots[0].start, at(MONDAY, "09:00"));
    }

    #[test]
    fn booked_marking_is_exact_match_only() {
        let rules = vec![rule(1, "09:00", "12:00")];
        let mut slots = expand_slots(&rules, at(MONDAY, "08:00"));

        mark_booked(&mut slots, &[confirmed_at(at(MONDAY, "10:00"))]);

        for slot in slots.iter().filter(|s| s.start.date() == at(MONDAY, "08:00").date()) {
            assert_eq!(slot.is_booked, slot.start == at(MONDAY, "10:00"));
        }
    }

    #[test]
    fn cancelled_bookings_do_not_block_slots() {
        let rules = vec![rule(1, "09:00", "12:00")];
        let mut slots = expand_slots(&rules, at(MONDAY, "08:00"));

        let mut cancelled = confirmed_at(at(MONDAY, "10:00"));
        cancelled.status = BookingStatus::Cancelled;
        mark_booked(&mut slots, &[cancelled]);

        assert!(slots.iter().all(|s| !s.is_booked));
    }

    #[test]
    fn rerun_with_subset_never_unbooks() {
        let rules = vec![rule(1, "09:00", "12:00")];
        let mut slots = expand_slots(&rules, at(MONDAY, "08:00"));

        mark_booked(&mut slots, &[confirmed_at(at(MONDAY, "10:00"))]);
        // Incremental refresh with an empty window omits the 10:00 booking.
        mark_booked(&mut slots, &[]);

        assert!(slots
            .iter()
            .any(|s| s.start == at(MONDAY, "10:00") && s.is_booked));
    }
}
