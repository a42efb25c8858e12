//! Placement advice for incoming cargo.
//!
//! For every item that is still in transit the advisor picks one container
//! with enough free capacity, using an objective that depends on the item's
//! priority:
//! - high: the most accessible container (fewest stowed items)
//! - medium: a weighted blend of free space (60%) and accessibility (40%)
//! - low: the fullest container, consolidating low-value cargo
//!
//! When no container has room the recommendation carries the
//! "requires rearrangement" target instead of an error.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::{Container, Item, Priority, Status};
use crate::types::{EPSILON_GENERAL, Stowage};

const SPACE_WEIGHT: f64 = 0.6;
const ACCESS_WEIGHT: f64 = 0.4;

/// Where an item should go.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlacementTarget {
    /// A concrete container, by identifier and display name.
    Container { id: String, name: String },
    /// No container can take the item as things are arranged now.
    RequiresRearrangement,
}

impl PlacementTarget {
    pub fn container_id(&self) -> Option<&str> {
        match self {
            PlacementTarget::Container { id, .. } => Some(id),
            PlacementTarget::RequiresRearrangement => None,
        }
    }

    pub fn requires_rearrangement(&self) -> bool {
        matches!(self, PlacementTarget::RequiresRearrangement)
    }
}

impl fmt::Display for PlacementTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementTarget::Container { name, .. } => f.write_str(name),
            PlacementTarget::RequiresRearrangement => f.write_str("Requires rearrangement"),
        }
    }
}

/// Why a target was chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlacementReason {
    NoSuitableContainer,
    MostAccessible,
    BalancedSpaceAndAccess,
    SpaceEfficiency,
}

impl PlacementReason {
    pub fn code(&self) -> &'static str {
        match self {
            PlacementReason::NoSuitableContainer => "no_suitable_container",
            PlacementReason::MostAccessible => "most_accessible",
            PlacementReason::BalancedSpaceAndAccess => "balanced_space_and_access",
            PlacementReason::SpaceEfficiency => "space_efficiency",
        }
    }

    fn for_priority(priority: Priority) -> Self {
        match priority {
            Priority::High => PlacementReason::MostAccessible,
            Priority::Medium => PlacementReason::BalancedSpaceAndAccess,
            Priority::Low => PlacementReason::SpaceEfficiency,
        }
    }
}

impl fmt::Display for PlacementReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementReason::NoSuitableContainer => {
                write!(f, "No suitable container available with current arrangement")
            }
            PlacementReason::MostAccessible => {
                write!(f, "High priority item placed in most accessible location")
            }
            PlacementReason::BalancedSpaceAndAccess => write!(
                f,
                "Medium priority item placed with balanced space efficiency and accessibility"
            ),
            PlacementReason::SpaceEfficiency => {
                write!(f, "Low priority item placed to maximize space efficiency")
            }
        }
    }
}

/// Placement advice for a single item.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementRecommendation {
    pub item_id: String,
    pub item_name: String,
    pub target: PlacementTarget,
    pub reason: PlacementReason,
}

/// Progress events emitted while recommendations are computed.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum PlacementEvent {
    /// A recommendation for one item is ready.
    ItemRecommended {
        item_id: String,
        item_name: String,
        target: PlacementTarget,
        reason_code: String,
        reason_text: String,
    },
    /// All in-transit items were evaluated.
    Finished {
        placed: usize,
        requires_rearrangement: usize,
    },
}

impl From<&PlacementRecommendation> for PlacementEvent {
    fn from(rec: &PlacementRecommendation) -> Self {
        PlacementEvent::ItemRecommended {
            item_id: rec.item_id.clone(),
            item_name: rec.item_name.clone(),
            target: rec.target.clone(),
            reason_code: rec.reason.code().to_string(),
            reason_text: rec.reason.to_string(),
        }
    }
}

/// Recommends a container for every in-transit item.
///
/// Every item is evaluated against the same container snapshot; capacity
/// taken by an earlier recommendation in the batch is not reserved. Use
/// [`recommend_reserving`] when recommendations are applied automatically.
///
/// # Parameters
/// * `items` - Full item collection; only `in-transit` items are evaluated
/// * `containers` - Containers with their current fill
///
/// # Returns
/// One recommendation per in-transit item, in input order
pub fn recommend(items: &[Item], containers: &[Container]) -> Vec<PlacementRecommendation> {
    recommend_with_progress(items, containers, |_| {})
}

/// Same as [`recommend`], invoking a callback per recommendation (suitable for SSE).
pub fn recommend_with_progress(
    items: &[Item],
    containers: &[Container],
    mut on_event: impl FnMut(&PlacementEvent),
) -> Vec<PlacementRecommendation> {
    let recommendations: Vec<PlacementRecommendation> = awaiting_placement(items)
        .map(|item| {
            let rec = match select_container(item, containers) {
                Some((idx, reason)) => recommendation_to(item, &containers[idx], reason),
                None => unplaceable(item),
            };
            on_event(&PlacementEvent::from(&rec));
            rec
        })
        .collect();

    on_event(&finished_event(&recommendations));
    recommendations
}

/// Recommends containers while debiting each recommendation from a running
/// capacity ledger.
///
/// Unlike [`recommend`], two items are never sent to a container whose free
/// capacity only fits one of them. Items are still evaluated in input order.
pub fn recommend_reserving(items: &[Item], containers: &[Container]) -> Vec<PlacementRecommendation> {
    let mut ledger: Vec<Container> = containers.to_vec();

    awaiting_placement(items)
        .map(|item| match select_container(item, &ledger) {
            Some((idx, reason)) => {
                let rec = recommendation_to(item, &ledger[idx], reason);
                let reserved = &mut ledger[idx];
                reserved.used_capacity += item.volume;
                reserved.items.push(item.id.clone());
                rec
            }
            None => unplaceable(item),
        })
        .collect()
}

fn awaiting_placement(items: &[Item]) -> impl Iterator<Item = &Item> {
    items.iter().filter(|item| item.status == Status::InTransit)
}

fn finished_event(recommendations: &[PlacementRecommendation]) -> PlacementEvent {
    let requires_rearrangement = recommendations
        .iter()
        .filter(|rec| rec.target.requires_rearrangement())
        .count();
    PlacementEvent::Finished {
        placed: recommendations.len() - requires_rearrangement,
        requires_rearrangement,
    }
}

fn recommendation_to(
    item: &Item,
    container: &Container,
    reason: PlacementReason,
) -> PlacementRecommendation {
    PlacementRecommendation {
        item_id: item.id.clone(),
        item_name: item.name.clone(),
        target: PlacementTarget::Container {
            id: container.id.clone(),
            name: container.name.clone(),
        },
        reason,
    }
}

fn unplaceable(item: &Item) -> PlacementRecommendation {
    PlacementRecommendation {
        item_id: item.id.clone(),
        item_name: item.name.clone(),
        target: PlacementTarget::RequiresRearrangement,
        reason: PlacementReason::NoSuitableContainer,
    }
}

/// Picks the index of the best eligible container for the item.
fn select_container(item: &Item, containers: &[Container]) -> Option<(usize, PlacementReason)> {
    let eligible = containers
        .iter()
        .enumerate()
        .filter(|(_, container)| container.can_hold(item));

    let chosen = match item.priority {
        // `min_by_key` keeps the first of equal minima.
        Priority::High => eligible
            .min_by_key(|(_, container)| container.item_count())
            .map(|(idx, _)| idx),
        Priority::Medium => first_highest(eligible, balanced_score),
        Priority::Low => first_highest(eligible, |container: &Container| container.fill_ratio()),
    }?;

    Some((chosen, PlacementReason::for_priority(item.priority)))
}

fn balanced_score(container: &Container) -> f64 {
    let access = 1.0 / (container.item_count() as f64 + 1.0);
    SPACE_WEIGHT * container.free_fraction() + ACCESS_WEIGHT * access
}

/// Returns the index of the highest score, keeping the earliest on ties.
fn first_highest<'a>(
    candidates: impl Iterator<Item = (usize, &'a Container)>,
    score: impl Fn(&Container) -> f64,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, container) in candidates {
        let value = score(container);
        match best {
            Some((_, best_value)) if value <= best_value + EPSILON_GENERAL => {}
            _ => best = Some((idx, value)),
        }
    }
    best.map(|(idx, _)| idx)
}
