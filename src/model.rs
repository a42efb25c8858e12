//! Data models for the stowage engine.
//!
//! This module defines the data shapes the engine operates on:
//! - `Item`: a piece of cargo with priority, status and location
//! - `Container`: a storage container with capacity and contained item ids
//! - `ActionLogEntry`: an append-only record of an operator or system action
//!
//! Items are joined to containers through the container identifier
//! (`item.location == container.id`); the container name is display-only.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

use crate::types::{Stowage, Volumetric, Weighted, validation};

/// Validation error for item and container data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid item: {0}")]
    InvalidItem(String),
    #[error("Invalid container: {0}")]
    InvalidContainer(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Handling priority of an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Severity rank: high(0) < medium(1) < low(2).
    pub const fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle status of an item. `Waste` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Stored,
    InTransit,
    Waste,
}

impl Status {
    pub const fn label(self) -> &'static str {
        match self {
            Status::Stored => "stored",
            Status::InTransit => "in-transit",
            Status::Waste => "waste",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Status::Waste)
    }

    pub const ALL: [Status; 3] = [Status::Stored, Status::InTransit, Status::Waste];
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A piece of cargo tracked by the station inventory.
///
/// # Fields
/// * `id` - Unique identifier
/// * `location` - Identifier of the holding container, or a free label
///   (staging area, airlock) when the item is not inside a container
/// * `volume` - Occupied storage volume
/// * `weight` - Weight in kg
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": "FD-001",
    "name": "Food Packet",
    "priority": "medium",
    "status": "stored",
    "location": "C-01",
    "weight": 2.5,
    "volume": 4.0,
    "lastModified": "2026-10-01T08:00:00Z",
    "expirationDate": "2026-12-01T00:00:00Z",
    "usageCount": 0
}))]
pub struct Item {
    pub id: String,
    pub name: String,
    pub priority: Priority,
    pub status: Status,
    pub location: String,
    pub weight: f64,
    pub volume: f64,
    pub last_modified: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub usage_count: u32,
}

impl Item {
    /// Creates a new item with validation.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use stowage_advisor::model::{Item, Priority, Status};
    ///
    /// let ok = Item::new("W-1", "Water", Priority::High, Status::Stored, "C-01", 1.0, 2.0, Utc::now());
    /// assert!(ok.is_ok());
    ///
    /// let bad = Item::new("W-2", "Water", Priority::High, Status::Stored, "C-01", 1.0, -2.0, Utc::now());
    /// assert!(bad.is_err());
    /// ```
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        priority: Priority,
        status: Status,
        location: impl Into<String>,
        weight: f64,
        volume: f64,
        last_modified: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let item = Self {
            id: id.into(),
            name: name.into(),
            priority,
            status,
            location: location.into(),
            weight,
            volume,
            last_modified,
            expiration_date: None,
            usage_count: 0,
        };
        item.validate()?;
        Ok(item)
    }

    /// Attaches an expiration timestamp (builder style).
    pub fn with_expiration(mut self, expiration: DateTime<Utc>) -> Self {
        self.expiration_date = Some(expiration);
        self
    }

    /// Sets the usage counter (builder style).
    pub fn with_usage_count(mut self, usage_count: u32) -> Self {
        self.usage_count = usage_count;
        self
    }

    /// Checks identifier and numeric fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_identifier(&self.id, "Item id")
            .and_then(|_| validation::validate_quantity(self.weight, "Weight"))
            .and_then(|_| validation::validate_quantity(self.volume, "Volume"))
            .map_err(|msg| ValidationError::InvalidItem(format!("{} ({})", msg, self.id)))
    }

    /// Returns `true` if the item carries an expiration on or before `moment`.
    pub fn is_expired_at(&self, moment: DateTime<Utc>) -> bool {
        self.expiration_date.is_some_and(|expires| expires <= moment)
    }

    pub fn is_waste(&self) -> bool {
        self.status.is_terminal()
    }
}

impl Volumetric for Item {
    fn volume(&self) -> f64 {
        self.volume
    }
}

impl Weighted for Item {
    fn weight(&self) -> f64 {
        self.weight
    }
}

/// A storage container aboard the station.
///
/// `used_capacity` and `items` are derived from the item collection by
/// [`crate::inventory::Inventory`]; the engine reads them as given.
///
/// # Fields
/// * `id` - Identifier, the key items refer to in `location`
/// * `name` - Display name
/// * `location` - Zone or module label where the container is mounted
/// * `items` - Identifiers of contained items, in insertion order
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    pub id: String,
    pub name: String,
    pub capacity: f64,
    #[serde(default)]
    pub used_capacity: f64,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub items: Vec<String>,
}

impl Container {
    /// Creates a new empty container with validation.
    ///
    /// # Returns
    /// `Ok(Container)` for valid values, otherwise `Err(ValidationError)`
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        capacity: f64,
        location: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let container = Self {
            id: id.into(),
            name: name.into(),
            capacity,
            used_capacity: 0.0,
            location: location.into(),
            items: Vec::new(),
        };
        container.validate()?;
        Ok(container)
    }

    /// Checks identifier and capacity.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_identifier(&self.id, "Container id")
            .and_then(|_| validation::validate_quantity(self.capacity, "Capacity"))
            .map_err(|msg| ValidationError::InvalidContainer(format!("{} ({})", msg, self.id)))
    }

    /// Returns `true` if the item is linked to this container.
    pub fn holds(&self, item: &Item) -> bool {
        item.location == self.id
    }

    /// Utilization in percent (0.0 for zero capacity).
    pub fn utilization_percent(&self) -> f64 {
        self.fill_ratio() * 100.0
    }

    /// Copies the container with explicit fill data (builder style).
    pub fn with_contents(mut self, used_capacity: f64, items: Vec<String>) -> Self {
        self.used_capacity = used_capacity;
        self.items = items;
        self
    }
}

impl Stowage for Container {
    fn capacity(&self) -> f64 {
        self.capacity
    }

    fn used_capacity(&self) -> f64 {
        self.used_capacity
    }

    fn item_count(&self) -> usize {
        self.items.len()
    }
}

/// Kind of action recorded in the action log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Place,
    Retrieve,
    Relocate,
    Dispose,
}

/// Append-only action log record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActionLogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub action: ActionKind,
    pub item_id: String,
    pub item_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ActionLogEntry {
    /// Creates an entry for the given item; the id is a fresh UUID.
    pub fn new(
        timestamp: DateTime<Utc>,
        action: ActionKind,
        item: &Item,
        user: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp,
            action,
            item_id: item.id.clone(),
            item_name: item.name.clone(),
            location: None,
            user: user.into(),
            details: None,
        }
    }

    pub fn at_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::*;

    /// Fixed reference instant for deterministic tests.
    pub fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap()
    }

    pub fn days_after_epoch(days: i64) -> DateTime<Utc> {
        epoch() + Duration::days(days)
    }

    pub fn item(id: &str, priority: Priority, status: Status, location: &str, volume: f64) -> Item {
        Item::new(id, id, priority, status, location, 1.0, volume, epoch()).unwrap()
    }

    pub fn container(id: &str, capacity: f64, used: f64, count: usize) -> Container {
        let items = (0..count).map(|n| format!("{}-item-{}", id, n)).collect();
        Container::new(id, format!("{} name", id), capacity, "Module A")
            .unwrap()
            .with_contents(used, items)
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn item_rejects_negative_volume() {
        let result = Item::new("X", "X", Priority::Low, Status::Stored, "C", 1.0, -1.0, epoch());
        assert!(matches!(result, Err(ValidationError::InvalidItem(_))));
    }

    #[test]
    fn item_rejects_nan_weight() {
        let result = Item::new("X", "X", Priority::Low, Status::Stored, "C", f64::NAN, 1.0, epoch());
        assert!(result.is_err());
    }

    #[test]
    fn container_rejects_empty_id() {
        assert!(matches!(
            Container::new(" ", "Bay", 10.0, "Node 1"),
            Err(ValidationError::InvalidContainer(_))
        ));
    }

    #[test]
    fn status_serializes_kebab_case() {
        let json = serde_json::to_string(&Status::InTransit).unwrap();
        assert_eq!(json, "\"in-transit\"");
        let parsed: Status = serde_json::from_str("\"waste\"").unwrap();
        assert_eq!(parsed, Status::Waste);
    }

    #[test]
    fn priority_rank_orders_by_severity() {
        assert!(Priority::High.rank() < Priority::Medium.rank());
        assert!(Priority::Medium.rank() < Priority::Low.rank());
    }

    #[test]
    fn item_parses_camel_case_json_without_optional_fields() {
        let json = r#"{
            "id": "M-7",
            "name": "Medkit",
            "priority": "high",
            "status": "in-transit",
            "location": "Airlock",
            "weight": 3.0,
            "volume": 5.0,
            "lastModified": "2026-10-01T12:00:00Z"
        }"#;
        let item: Item = serde_json::from_str(json).expect("valid item JSON");
        assert_eq!(item.status, Status::InTransit);
        assert_eq!(item.usage_count, 0);
        assert!(item.expiration_date.is_none());
    }

    #[test]
    fn expiration_check_is_inclusive() {
        let item = item("F", Priority::Low, Status::Stored, "C", 1.0)
            .with_expiration(days_after_epoch(1));
        assert!(!item.is_expired_at(epoch()));
        assert!(item.is_expired_at(days_after_epoch(1)));
    }

    #[test]
    fn container_holds_by_identifier_not_name() {
        let bay = container("C-01", 100.0, 0.0, 0);
        let mut cargo = item("A", Priority::Low, Status::Stored, "C-01", 1.0);
        assert!(bay.holds(&cargo));
        cargo.location = bay.name.clone();
        assert!(!bay.holds(&cargo));
    }

    #[test]
    fn log_entry_builder_sets_optional_fields() {
        let cargo = item("A", Priority::Low, Status::Stored, "C-01", 1.0);
        let entry = ActionLogEntry::new(epoch(), ActionKind::Retrieve, &cargo, "crew")
            .at_location("C-01")
            .with_details("Retrieved A from C-01");
        assert_eq!(entry.location.as_deref(), Some("C-01"));
        assert_eq!(entry.item_id, "A");
        assert!(!entry.id.is_empty());
    }
}
