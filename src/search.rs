//! Item retrieval ranking and expiry watch.
//!
//! `rank` answers free-text searches from the crew: it filters items whose
//! name, id, location, status or priority contain the query and orders them
//! so the most relevant and most urgent items come first.
//! `identify_expiring` lists items that will expire within a look-ahead window.

use std::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};

use crate::model::{Item, Status};

/// Default look-ahead window for the expiry watch.
pub const DEFAULT_EXPIRING_THRESHOLD_DAYS: i64 = 14;

/// Ranks items matching a free-text query.
///
/// The query is trimmed and compared case-insensitively. An empty query is an
/// explicit non-match and yields no results.
///
/// Ordering, by successive tie-breaks:
/// 1. exact (case-insensitive) name match
/// 2. priority, high before medium before low
/// 3. items with an expiration date, earliest first, before items without
/// 4. most recently modified first
///
/// The sort is stable, so repeated calls on the same input return the same order.
pub fn rank(query: &str, items: &[Item]) -> Vec<Item> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<Item> = items
        .iter()
        .filter(|item| matches_query(item, &needle))
        .cloned()
        .collect();

    matches.sort_by(|a, b| compare_relevance(a, b, &needle));
    matches
}

fn matches_query(item: &Item, needle: &str) -> bool {
    item.name.to_lowercase().contains(needle)
        || item.id.to_lowercase().contains(needle)
        || item.location.to_lowercase().contains(needle)
        || item.status.label().contains(needle)
        || item.priority.label().contains(needle)
}

fn compare_relevance(a: &Item, b: &Item, needle: &str) -> Ordering {
    let a_exact = a.name.to_lowercase() == needle;
    let b_exact = b.name.to_lowercase() == needle;

    // `true` sorts after `false`, so compare b against a.
    b_exact
        .cmp(&a_exact)
        .then_with(|| a.priority.rank().cmp(&b.priority.rank()))
        .then_with(|| compare_expiration(a.expiration_date, b.expiration_date))
        .then_with(|| b.last_modified.cmp(&a.last_modified))
}

fn compare_expiration(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Lists items expiring within `threshold_days` of `now`, soonest first.
///
/// Waste items and items that already expired (on or before `now`) are left
/// out; the lifecycle simulator is responsible for those. A window reaching
/// past the representable calendar covers every future expiration.
pub fn identify_expiring(items: &[Item], threshold_days: i64, now: DateTime<Utc>) -> Vec<Item> {
    let horizon = Duration::try_days(threshold_days)
        .and_then(|window| now.checked_add_signed(window))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    let mut expiring: Vec<Item> = items
        .iter()
        .filter(|item| item.status != Status::Waste)
        .filter(|item| {
            item.expiration_date
                .is_some_and(|expires| expires > now && expires <= horizon)
        })
        .cloned()
        .collect();

    expiring.sort_by(|a, b| compare_expiration(a.expiration_date, b.expiration_date));
    expiring
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Priority;
    use crate::model::fixtures::{days_after_epoch, epoch, item};

    fn ids(items: &[Item]) -> Vec<&str> {
        items.iter().map(|item| item.id.as_str()).collect()
    }

    #[test]
    fn blank_query_returns_nothing() {
        let items = vec![item("A", Priority::High, Status::Stored, "C-01", 1.0)];
        assert!(rank("", &items).is_empty());
        assert!(rank("   \t", &items).is_empty());
    }

    #[test]
    fn matches_on_every_searchable_field() {
        let items = vec![
            Item {
                name: "Oxygen Canister".to_string(),
                ..item("OX-1", Priority::Low, Status::Stored, "C-01", 1.0)
            },
            item("BAT-7", Priority::Low, Status::Stored, "Node-2", 1.0),
            item("X", Priority::Low, Status::InTransit, "Dock", 1.0),
            item("Y", Priority::High, Status::Stored, "Dock", 1.0),
        ];

        assert_eq!(ids(&rank("oxygen", &items)), vec!["OX-1"]);
        assert_eq!(ids(&rank("bat", &items)), vec!["BAT-7"]);
        assert_eq!(ids(&rank("node", &items)), vec!["BAT-7"]);
        assert_eq!(ids(&rank("TRANSIT", &items)), vec!["X"]);
        assert_eq!(ids(&rank("high", &items)), vec!["Y"]);
    }

    #[test]
    fn exact_name_match_outranks_priority() {
        let items = vec![
            Item {
                name: "Water Filter".to_string(),
                ..item("W-1", Priority::High, Status::Stored, "C-01", 1.0)
            },
            Item {
                name: "Water".to_string(),
                ..item("W-2", Priority::Low, Status::Stored, "C-01", 1.0)
            },
        ];

        assert_eq!(ids(&rank("water", &items)), vec!["W-2", "W-1"]);
    }

    #[test]
    fn priority_then_expiration_then_recency() {
        let mut stale = item("K-stale", Priority::Medium, Status::Stored, "C-kit", 1.0);
        stale.last_modified = epoch();
        let mut fresh = item("K-fresh", Priority::Medium, Status::Stored, "C-kit", 1.0);
        fresh.last_modified = days_after_epoch(2);
        let soon = item("K-soon", Priority::Medium, Status::Stored, "C-kit", 1.0)
            .with_expiration(days_after_epoch(3));
        let later = item("K-later", Priority::Medium, Status::Stored, "C-kit", 1.0)
            .with_expiration(days_after_epoch(9));
        let urgent = item("K-urgent", Priority::High, Status::Stored, "C-kit", 1.0);
        let spare = item("K-spare", Priority::Low, Status::Stored, "C-kit", 1.0)
            .with_expiration(days_after_epoch(1));

        let items = vec![spare, stale, later, fresh, urgent, soon];
        assert_eq!(
            ids(&rank("k-", &items)),
            vec!["K-urgent", "K-soon", "K-later", "K-fresh", "K-stale", "K-spare"]
        );
    }

    #[test]
    fn ranking_is_idempotent() {
        let items: Vec<Item> = (0..6)
            .map(|n| item(&format!("S-{}", n), Priority::Low, Status::Stored, "C-01", 1.0))
            .collect();
        let first = rank("s-", &items);
        let second = rank("s-", &items);
        assert_eq!(first, second);
        assert_eq!(ids(&first), vec!["S-0", "S-1", "S-2", "S-3", "S-4", "S-5"]);
    }

    #[test]
    fn expiring_window_excludes_waste_past_and_distant_items() {
        let now = epoch();
        let items = vec![
            item("soon", Priority::Low, Status::Stored, "C", 1.0).with_expiration(days_after_epoch(5)),
            item("sooner", Priority::Low, Status::InTransit, "C", 1.0)
                .with_expiration(days_after_epoch(2)),
            item("edge", Priority::Low, Status::Stored, "C", 1.0).with_expiration(days_after_epoch(14)),
            item("far", Priority::Low, Status::Stored, "C", 1.0).with_expiration(days_after_epoch(15)),
            item("past", Priority::Low, Status::Stored, "C", 1.0).with_expiration(days_after_epoch(-1)),
            item("wasted", Priority::Low, Status::Waste, "C", 1.0).with_expiration(days_after_epoch(3)),
            item("none", Priority::Low, Status::Stored, "C", 1.0),
        ];

        let expiring = identify_expiring(&items, DEFAULT_EXPIRING_THRESHOLD_DAYS, now);
        assert_eq!(ids(&expiring), vec!["sooner", "soon", "edge"]);
    }

    #[test]
    fn oversized_window_covers_all_future_expirations() {
        let items = vec![
            item("decade", Priority::Low, Status::Stored, "C", 1.0)
                .with_expiration(days_after_epoch(3650)),
            item("past", Priority::Low, Status::Stored, "C", 1.0).with_expiration(days_after_epoch(-1)),
        ];
        for threshold in [200_000_000, i64::MAX] {
            let expiring = identify_expiring(&items, threshold, epoch());
            assert_eq!(ids(&expiring), vec!["decade"]);
        }
    }
}
