//! Simulated passage of time.
//!
//! Advancing the clock by `days` turns expired items into waste and, for
//! items still in storage, randomly bumps their usage counters to mimic crew
//! consumption. The simulator is log-agnostic: use [`expired_between`] to find
//! the transitions that need an action-log entry.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use thiserror::Error;

use crate::model::{Item, Status};

/// Default chance per simulated day that a stored item is used.
pub const DEFAULT_USAGE_PROBABILITY_PER_DAY: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("at least one day must be simulated")]
    NoDays,
    #[error("simulating {days} days runs past the supported calendar")]
    SpanOutOfRange { days: u32 },
}

/// Advances every item by `days` calendar days from the current wall clock.
///
/// Uses the thread-local RNG and the default usage probability. See
/// [`advance_with`] for the deterministic variant.
pub fn advance(items: &[Item], days: u32) -> Result<Vec<Item>, LifecycleError> {
    advance_with(
        items,
        days,
        Utc::now(),
        DEFAULT_USAGE_PROBABILITY_PER_DAY,
        &mut rand::thread_rng(),
    )
}

/// Advances items by `days` starting at `now`.
///
/// 1. Items carrying an expiration on or before `now + days` that are not
///    already waste become waste, stamped with the simulated time.
/// 2. Items still stored are used with probability
///    `min(1, probability_per_day × days)`; a used item's counter grows by a
///    uniform integer in `[1, days]`.
///
/// A single call with `days = n` is not the same as `n` calls with `days = 1`;
/// the usage probability is evaluated once for the whole span.
///
/// # Returns
/// A new vector in input order; `items` is left untouched.
pub fn advance_with<R: Rng>(
    items: &[Item],
    days: u32,
    now: DateTime<Utc>,
    probability_per_day: f64,
    rng: &mut R,
) -> Result<Vec<Item>, LifecycleError> {
    if days == 0 {
        return Err(LifecycleError::NoDays);
    }

    let simulated_now = Duration::try_days(i64::from(days))
        .and_then(|span| now.checked_add_signed(span))
        .ok_or(LifecycleError::SpanOutOfRange { days })?;
    let usage_probability = (probability_per_day * f64::from(days)).clamp(0.0, 1.0);

    let advanced = items
        .iter()
        .map(|item| {
            let mut next = item.clone();
            if next.status != Status::Waste && next.is_expired_at(simulated_now) {
                next.status = Status::Waste;
                next.last_modified = simulated_now;
                return next;
            }

            if next.status == Status::Stored && rng.gen_bool(usage_probability) {
                next.usage_count = next.usage_count.saturating_add(rng.gen_range(1..=days));
                next.last_modified = simulated_now;
            }
            next
        })
        .collect();

    Ok(advanced)
}

/// Items that were not waste in `before` but are waste in `after`.
///
/// Items are matched by identifier; items missing from `before` are ignored.
pub fn expired_between<'a>(before: &[Item], after: &'a [Item]) -> Vec<&'a Item> {
    after
        .iter()
        .filter(|item| item.status == Status::Waste)
        .filter(|item| {
            before
                .iter()
                .find(|old| old.id == item.id)
                .is_some_and(|old| old.status != Status::Waste)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::model::Priority;
    use crate::model::fixtures::{days_after_epoch, epoch, item};

    fn seeded() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let advanced = advance(&[], 5).unwrap();
        assert!(advanced.is_empty());
    }

    #[test]
    fn zero_days_is_rejected() {
        assert_eq!(advance(&[], 0), Err(LifecycleError::NoDays));
    }

    #[test]
    fn span_past_calendar_end_is_rejected() {
        let items = vec![item("s", Priority::Low, Status::Stored, "C-01", 1.0)];
        assert_eq!(
            advance_with(&items, 200_000_000, epoch(), 0.1, &mut seeded()),
            Err(LifecycleError::SpanOutOfRange { days: 200_000_000 })
        );
        assert!(advance_with(&items, u32::MAX, epoch(), 0.1, &mut seeded()).is_err());
    }

    #[test]
    fn expired_item_becomes_waste_at_simulated_now() {
        let items = vec![
            item("milk", Priority::Medium, Status::Stored, "C-01", 1.0)
                .with_expiration(days_after_epoch(-1)),
        ];
        let advanced = advance_with(&items, 1, epoch(), 0.0, &mut seeded()).unwrap();

        assert_eq!(advanced[0].status, Status::Waste);
        assert_eq!(advanced[0].last_modified, days_after_epoch(1));
        assert_eq!(items[0].status, Status::Stored, "input must stay untouched");
    }

    #[test]
    fn wall_clock_advance_expires_yesterdays_item() {
        let started = Utc::now();
        let items = vec![
            item("bread", Priority::Low, Status::Stored, "C-01", 1.0)
                .with_expiration(started - Duration::days(1)),
        ];
        let advanced = advance(&items, 1).unwrap();
        assert_eq!(advanced[0].status, Status::Waste);
        assert!(advanced[0].last_modified >= started + Duration::days(1));
    }

    #[test]
    fn expiration_inside_simulated_span_counts() {
        let items = vec![
            item("due", Priority::Low, Status::InTransit, "Dock", 1.0)
                .with_expiration(days_after_epoch(3)),
            item("later", Priority::Low, Status::Stored, "C-01", 1.0)
                .with_expiration(days_after_epoch(4)),
        ];
        let advanced = advance_with(&items, 3, epoch(), 0.0, &mut seeded()).unwrap();
        assert_eq!(advanced[0].status, Status::Waste);
        assert_eq!(advanced[1].status, Status::Stored);
    }

    #[test]
    fn waste_is_never_revived_or_touched() {
        let mut wasted = item("old", Priority::Low, Status::Waste, "C-01", 1.0)
            .with_expiration(days_after_epoch(-10));
        wasted.last_modified = days_after_epoch(-10);
        let advanced = advance_with(&[wasted.clone()], 30, epoch(), 1.0, &mut seeded()).unwrap();
        assert_eq!(advanced[0], wasted);
    }

    #[test]
    fn certain_usage_bumps_within_range() {
        let items: Vec<Item> = (0..20)
            .map(|n| item(&format!("s{}", n), Priority::Low, Status::Stored, "C-01", 1.0))
            .collect();
        let advanced = advance_with(&items, 4, epoch(), 0.5, &mut seeded()).unwrap();

        for (before, after) in items.iter().zip(&advanced) {
            let delta = after.usage_count - before.usage_count;
            assert!((1..=4).contains(&delta), "delta {} outside [1, 4]", delta);
            assert_eq!(after.last_modified, days_after_epoch(4));
        }
    }

    #[test]
    fn zero_probability_leaves_usage_untouched() {
        let items = vec![item("s", Priority::Low, Status::Stored, "C-01", 1.0).with_usage_count(3)];
        let advanced = advance_with(&items, 7, epoch(), 0.0, &mut seeded()).unwrap();
        assert_eq!(advanced[0], items[0]);
    }

    #[test]
    fn in_transit_items_are_not_used() {
        let items = vec![item("t", Priority::Low, Status::InTransit, "Dock", 1.0)];
        let advanced = advance_with(&items, 10, epoch(), 1.0, &mut seeded()).unwrap();
        assert_eq!(advanced[0].usage_count, 0);
    }

    #[test]
    fn expired_between_reports_only_new_waste() {
        let before = vec![
            item("a", Priority::Low, Status::Stored, "C-01", 1.0),
            item("b", Priority::Low, Status::Waste, "C-01", 1.0),
            item("c", Priority::Low, Status::Stored, "C-01", 1.0),
        ];
        let mut after = before.clone();
        after[0].status = Status::Waste;

        let expired = expired_between(&before, &after);
        let ids: Vec<_> = expired.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn waste_status_is_monotonic(
                specs in prop::collection::vec((0u8..3, -20i64..20, any::<bool>()), 0..12),
                days in 1u32..30,
                seed in any::<u64>(),
            ) {
                let items: Vec<Item> = specs
                    .iter()
                    .enumerate()
                    .map(|(n, (status, exp_day, has_exp))| {
                        let cargo = item(&format!("i{}", n), Priority::Low, Status::ALL[*status as usize], "C-01", 1.0);
                        if *has_exp { cargo.with_expiration(days_after_epoch(*exp_day)) } else { cargo }
                    })
                    .collect();

                let mut rng = StdRng::seed_from_u64(seed);
                let advanced = advance_with(&items, days, epoch(), DEFAULT_USAGE_PROBABILITY_PER_DAY, &mut rng).unwrap();

                prop_assert_eq!(advanced.len(), items.len());
                for (before, after) in items.iter().zip(&advanced) {
                    if before.status == Status::Waste {
                        prop_assert_eq!(after.status, Status::Waste);
                    }
                    prop_assert!(after.usage_count >= before.usage_count);
                }
            }
        }
    }
}
