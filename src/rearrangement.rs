//! Rearrangement planning when incoming cargo does not fit.
//!
//! The planner compares the volume of incoming items with the free capacity
//! summed over all containers. If there is a shortfall it evicts stored
//! low-priority items (falling back to medium priority), stalest first, until
//! the shortfall is covered. The plan is only advice; applying it is done by
//! [`crate::inventory::Inventory::apply_plan`].

use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::model::{Container, Item, Priority, Status};
use crate::types::{Stowage, total_volume};

/// Placeholder location evicted items are moved to.
pub const DEFAULT_STAGING_LOCATION: &str = "Temporary Storage";

/// Eviction tiers, tried in order until one has candidates.
const EVICTION_TIERS: [Priority; 2] = [Priority::Low, Priority::Medium];

/// One relocation in a rearrangement plan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RearrangementStep {
    pub item_id: String,
    pub item_name: String,
    pub from_location: String,
    pub to_location: String,
    pub priority: Priority,
}

/// Ordered relocation steps plus a human-readable reason. Never empty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RearrangementPlan {
    pub steps: Vec<RearrangementStep>,
    pub reason: String,
}

impl RearrangementPlan {
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}

/// Computes a rearrangement plan that frees enough space for `incoming`.
///
/// # Parameters
/// * `items` - Full item collection, eviction candidates are taken from here
/// * `containers` - Containers with their current fill
/// * `incoming` - Items that need space
///
/// # Returns
/// `None` if the aggregate free capacity already covers the incoming volume,
/// if there is nothing to evict, or if evicting every candidate still leaves
/// a shortfall.
pub fn plan(items: &[Item], containers: &[Container], incoming: &[Item]) -> Option<RearrangementPlan> {
    plan_with_staging(items, containers, incoming, DEFAULT_STAGING_LOCATION)
}

/// Same as [`plan`] with a custom staging location.
pub fn plan_with_staging(
    items: &[Item],
    containers: &[Container],
    incoming: &[Item],
    staging_location: &str,
) -> Option<RearrangementPlan> {
    let space_needed = total_volume(incoming);
    let space_available: f64 = containers.iter().map(Stowage::free_capacity).sum();

    // Aggregate check only; fragmented free space counts as available.
    if space_available >= space_needed {
        return None;
    }

    let (tier, candidates) = EVICTION_TIERS
        .iter()
        .map(|tier| (*tier, eviction_candidates(items, *tier)))
        .find(|(_, candidates)| !candidates.is_empty())?;

    let shortfall = space_needed - space_available;
    let mut freed = 0.0;
    let mut evicted: Vec<&Item> = Vec::new();
    for candidate in candidates {
        evicted.push(candidate);
        freed += candidate.volume;
        if freed >= shortfall {
            break;
        }
    }

    if freed < shortfall {
        debug!(
            shortfall,
            freed,
            tier = tier.label(),
            "eviction candidates cannot cover the shortfall"
        );
        return None;
    }

    let steps: Vec<RearrangementStep> = evicted
        .into_iter()
        .map(|item| RearrangementStep {
            item_id: item.id.clone(),
            item_name: item.name.clone(),
            from_location: item.location.clone(),
            to_location: staging_location.to_string(),
            priority: item.priority,
        })
        .collect();

    let reason = format!(
        "{} {} priority items need to be relocated to make space for incoming items",
        steps.len(),
        tier
    );
    Some(RearrangementPlan { steps, reason })
}

/// Stored items of the given priority, least recently modified first.
fn eviction_candidates(items: &[Item], priority: Priority) -> Vec<&Item> {
    let mut candidates: Vec<&Item> = items
        .iter()
        .filter(|item| item.priority == priority && item.status == Status::Stored)
        .collect();
    candidates.sort_by_key(|item| item.last_modified);
    candidates
}
