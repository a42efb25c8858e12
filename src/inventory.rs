//! In-memory inventory snapshot.
//!
//! The engine itself never mutates anything. This module is the host-side
//! collaborator that owns a snapshot of items and containers, keeps each
//! container's contents and used capacity in sync with the items that point at
//! it, applies plans and accepted recommendations, and emits one action-log
//! entry per effect.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::lifecycle::expired_between;
use crate::model::{ActionKind, ActionLogEntry, Container, Item, Priority, Status, ValidationError};
use crate::placement::{self, PlacementRecommendation, PlacementTarget};
use crate::rearrangement::RearrangementPlan;
use crate::types::{Stowage, total_volume};

/// User recorded for actions the system performs on its own.
pub const SYSTEM_USER: &str = "System";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("duplicate item id: {0}")]
    DuplicateItem(String),
    #[error("duplicate container id: {0}")]
    DuplicateContainer(String),
    #[error("item not found: {0}")]
    ItemNotFound(String),
    #[error("container not found: {0}")]
    ContainerNotFound(String),
    #[error("item {0} has no container to be placed in")]
    NoTarget(String),
    #[error("item {0} is waste and cannot be moved")]
    WasteIsTerminal(String),
    #[error("plan moves item {0} more than once")]
    DuplicateStep(String),
    #[error("item {0} is not awaiting placement")]
    NotAwaitingPlacement(String),
    #[error("plan is stale: item {item_id} is at {actual}, plan expects {expected}")]
    StalePlan {
        item_id: String,
        expected: String,
        actual: String,
    },
}

/// Snapshot of the station inventory with a derived container index.
#[derive(Clone, Debug, Default)]
pub struct Inventory {
    items: Vec<Item>,
    containers: Vec<Container>,
}

impl Inventory {
    /// Builds a snapshot and derives container contents from item locations.
    ///
    /// Any `used_capacity` or `items` supplied with the containers is replaced.
    pub fn new(items: Vec<Item>, containers: Vec<Container>) -> Result<Self, InventoryError> {
        for item in &items {
            item.validate()?;
        }
        for container in &containers {
            container.validate()?;
        }
        if let Some(dup) = first_duplicate(items.iter().map(|item| item.id.as_str())) {
            return Err(InventoryError::DuplicateItem(dup.to_string()));
        }
        if let Some(dup) = first_duplicate(containers.iter().map(|c| c.id.as_str())) {
            return Err(InventoryError::DuplicateContainer(dup.to_string()));
        }

        let mut inventory = Self { items, containers };
        inventory.reindex();
        Ok(inventory)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    pub fn into_parts(self) -> (Vec<Item>, Vec<Container>) {
        (self.items, self.containers)
    }

    pub fn item(&self, item_id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == item_id)
    }

    pub fn container(&self, container_id: &str) -> Option<&Container> {
        self.containers.iter().find(|c| c.id == container_id)
    }

    /// Items that are not stowed in any known container (staging, airlock, ...).
    pub fn unassigned(&self) -> impl Iterator<Item = &Item> {
        self.items
            .iter()
            .filter(|item| !self.containers.iter().any(|c| c.holds(item)))
    }

    /// Relocates every step's item to its destination.
    ///
    /// The plan is checked against the snapshot first; nothing changes if any
    /// step refers to an unknown item, an item that has moved since planning,
    /// or an item another step already moves.
    pub fn apply_plan(
        &mut self,
        plan: &RearrangementPlan,
        user: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<ActionLogEntry>, InventoryError> {
        let mut targets = Vec::with_capacity(plan.steps.len());
        for step in &plan.steps {
            let idx = self.index_of(&step.item_id)?;
            if targets.contains(&idx) {
                return Err(InventoryError::DuplicateStep(step.item_id.clone()));
            }
            let item = &self.items[idx];
            if item.is_waste() {
                return Err(InventoryError::WasteIsTerminal(item.id.clone()));
            }
            if item.location != step.from_location {
                return Err(InventoryError::StalePlan {
                    item_id: item.id.clone(),
                    expected: step.from_location.clone(),
                    actual: item.location.clone(),
                });
            }
            targets.push(idx);
        }

        let entries = plan
            .steps
            .iter()
            .zip(targets)
            .map(|(step, idx)| {
                let item = &mut self.items[idx];
                item.location = step.to_location.clone();
                item.last_modified = now;
                ActionLogEntry::new(now, ActionKind::Relocate, item, user)
                    .at_location(step.to_location.as_str())
                    .with_details(format!(
                        "Moved {} from {} to {}",
                        item.name, step.from_location, step.to_location
                    ))
            })
            .collect::<Vec<_>>();

        self.reindex();
        info!(steps = entries.len(), "📦 Rearrangement plan applied");
        Ok(entries)
    }

    /// Stows an in-transit item in the recommended container.
    pub fn accept_recommendation(
        &mut self,
        recommendation: &PlacementRecommendation,
        user: &str,
        now: DateTime<Utc>,
    ) -> Result<ActionLogEntry, InventoryError> {
        let (container_id, container_name) = match &recommendation.target {
            PlacementTarget::Container { id, name } => (id.clone(), name.clone()),
            PlacementTarget::RequiresRearrangement => {
                return Err(InventoryError::NoTarget(recommendation.item_id.clone()));
            }
        };
        if self.container(&container_id).is_none() {
            return Err(InventoryError::ContainerNotFound(container_id));
        }

        let idx = self.index_of(&recommendation.item_id)?;
        let item = &mut self.items[idx];
        if item.is_waste() {
            return Err(InventoryError::WasteIsTerminal(item.id.clone()));
        }
        item.location = container_id.clone();
        item.status = Status::Stored;
        item.last_modified = now;

        let entry = ActionLogEntry::new(now, ActionKind::Place, item, user)
            .at_location(container_id)
            .with_details(format!("Placed {} in {}", item.name, container_name));
        self.reindex();
        Ok(entry)
    }

    /// Stows an in-transit item where the advisor currently recommends.
    pub fn accept_placement(
        &mut self,
        item_id: &str,
        user: &str,
        now: DateTime<Utc>,
    ) -> Result<ActionLogEntry, InventoryError> {
        let idx = self.index_of(item_id)?;
        let item = &self.items[idx];
        if item.status != Status::InTransit {
            return Err(InventoryError::NotAwaitingPlacement(item.id.clone()));
        }
        let recommendation = placement::recommend(std::slice::from_ref(item), &self.containers)
            .into_iter()
            .next()
            .ok_or_else(|| InventoryError::NotAwaitingPlacement(item_id.to_string()))?;
        self.accept_recommendation(&recommendation, user, now)
    }

    /// Records a retrieval: the usage counter grows by one.
    pub fn retrieve(
        &mut self,
        item_id: &str,
        user: &str,
        now: DateTime<Utc>,
    ) -> Result<ActionLogEntry, InventoryError> {
        let idx = self.index_of(item_id)?;
        let item = &mut self.items[idx];
        item.usage_count = item.usage_count.saturating_add(1);
        item.last_modified = now;

        Ok(ActionLogEntry::new(now, ActionKind::Retrieve, item, user)
            .at_location(item.location.as_str())
            .with_details(format!("Retrieved {} from {}", item.name, item.location)))
    }

    /// Marks an item as waste.
    pub fn mark_waste(
        &mut self,
        item_id: &str,
        user: &str,
        now: DateTime<Utc>,
    ) -> Result<ActionLogEntry, InventoryError> {
        let idx = self.index_of(item_id)?;
        let item = &mut self.items[idx];
        if item.is_waste() {
            return Err(InventoryError::WasteIsTerminal(item.id.clone()));
        }
        item.status = Status::Waste;
        item.last_modified = now;

        Ok(ActionLogEntry::new(now, ActionKind::Dispose, item, user)
            .with_details(format!("Marked {} as waste", item.name)))
    }

    /// Replaces the items with a simulated generation and logs every item that
    /// expired in the process.
    pub fn record_expirations(&mut self, advanced: Vec<Item>, now: DateTime<Utc>) -> Vec<ActionLogEntry> {
        let entries: Vec<ActionLogEntry> = expired_between(&self.items, &advanced)
            .into_iter()
            .map(|item| {
                ActionLogEntry::new(now, ActionKind::Dispose, item, SYSTEM_USER)
                    .with_details(format!("{} has expired and has been marked as waste", item.name))
            })
            .collect();

        debug!(expired = entries.len(), "simulation applied");
        self.items = advanced;
        self.reindex();
        entries
    }

    /// Dashboard figures for the current snapshot.
    pub fn summary(&self) -> InventorySummary {
        let total_capacity: f64 = self.containers.iter().map(|c| c.capacity).sum();
        let used_capacity: f64 = self.containers.iter().map(|c| c.used_capacity).sum();
        let space_utilization = if total_capacity > 0.0 {
            (used_capacity / total_capacity * 100.0).round()
        } else {
            0.0
        };

        let count_priority =
            |priority: Priority| self.items.iter().filter(|i| i.priority == priority).count();
        let count_status = |status: Status| self.items.iter().filter(|i| i.status == status).count();

        InventorySummary {
            total_items: self.items.len(),
            total_capacity,
            used_capacity,
            space_utilization,
            by_priority: PriorityCounts {
                high: count_priority(Priority::High),
                medium: count_priority(Priority::Medium),
                low: count_priority(Priority::Low),
            },
            by_status: StatusCounts {
                stored: count_status(Status::Stored),
                in_transit: count_status(Status::InTransit),
                waste: count_status(Status::Waste),
            },
            containers: self
                .containers
                .iter()
                .map(|c| ContainerUtilization {
                    id: c.id.clone(),
                    name: c.name.clone(),
                    capacity: c.capacity,
                    used_capacity: c.used_capacity,
                    utilization_percent: c.utilization_percent(),
                    item_count: c.item_count(),
                })
                .collect(),
        }
    }

    fn index_of(&self, item_id: &str) -> Result<usize, InventoryError> {
        self.items
            .iter()
            .position(|item| item.id == item_id)
            .ok_or_else(|| InventoryError::ItemNotFound(item_id.to_string()))
    }

    /// Re-derives `items` and `used_capacity` of every container.
    fn reindex(&mut self) {
        let items = &self.items;
        for container in &mut self.containers {
            let held: Vec<&Item> = items.iter().filter(|item| container.holds(item)).collect();
            container.used_capacity = total_volume(held.iter().copied());
            container.items = held.iter().map(|item| item.id.clone()).collect();
        }
    }
}

fn first_duplicate<'a>(ids: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().find(|id| !seen.insert(*id))
}

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriorityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub stored: usize,
    pub in_transit: usize,
    pub waste: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContainerUtilization {
    pub id: String,
    pub name: String,
    pub capacity: f64,
    pub used_capacity: f64,
    pub utilization_percent: f64,
    pub item_count: usize,
}

/// Aggregate figures for the dashboard.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub total_items: usize,
    pub total_capacity: f64,
    pub used_capacity: f64,
    /// Rounded percentage, 0 when there is no capacity
    pub space_utilization: f64,
    pub by_priority: PriorityCounts,
    pub by_status: StatusCounts,
    pub containers: Vec<ContainerUtilization>,
}
