//! Waste disposal manifests.
//!
//! Summarizes waste items for the return vehicle: totals, a split into
//! standard and hazardous waste, and the (static) return metadata.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::{Item, Status};
use crate::types::{total_volume, total_weight};

/// Decides whether a waste item needs hazardous handling.
///
/// Items carry no hazard field yet; implement this trait once a proper
/// classification source exists.
pub trait HazardClassifier {
    fn is_hazardous(&self, item: &Item) -> bool;
}

/// Name-based classifier: an item is hazardous when its name contains a marker
/// word (case-insensitive). A heuristic with no enforced vocabulary.
#[derive(Clone, Debug)]
pub struct LegacyNameClassifier {
    marker: String,
}

impl LegacyNameClassifier {
    pub const DEFAULT_MARKER: &'static str = "hazard";

    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into().to_lowercase(),
        }
    }
}

impl Default for LegacyNameClassifier {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MARKER)
    }
}

impl HazardClassifier for LegacyNameClassifier {
    fn is_hazardous(&self, item: &Item) -> bool {
        item.name.to_lowercase().contains(&self.marker)
    }
}

/// Static return-vehicle metadata printed on every manifest.
#[derive(Clone, Debug)]
pub struct ManifestSettings {
    pub return_vehicle: String,
    pub return_lead_days: i64,
}

impl ManifestSettings {
    pub const DEFAULT_RETURN_VEHICLE: &'static str = "Progress MS-23";
    pub const DEFAULT_RETURN_LEAD_DAYS: i64 = 30;
}

impl Default for ManifestSettings {
    fn default() -> Self {
        Self {
            return_vehicle: Self::DEFAULT_RETURN_VEHICLE.to_string(),
            return_lead_days: Self::DEFAULT_RETURN_LEAD_DAYS,
        }
    }
}

/// Disposal summary for a set of waste items.
#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WasteManifest {
    pub total_items: usize,
    pub total_volume: f64,
    pub total_weight: f64,
    pub standard_items: usize,
    pub hazardous_items: usize,
    pub standard: Vec<Item>,
    pub hazardous: Vec<Item>,
    pub items: Vec<Item>,
    pub return_vehicle: String,
    pub estimated_return_date: DateTime<Utc>,
}

/// Builds a manifest with the default settings and the legacy classifier.
pub fn build_manifest(waste_items: &[Item]) -> WasteManifest {
    build_manifest_with(
        waste_items,
        &LegacyNameClassifier::default(),
        &ManifestSettings::default(),
        Utc::now(),
    )
}

/// Builds a manifest with an explicit classifier, settings and clock.
///
/// The return date is `now + return_lead_days` regardless of the items,
/// capped at the last representable instant.
/// An empty input yields zero totals and empty partitions.
pub fn build_manifest_with(
    waste_items: &[Item],
    classifier: &impl HazardClassifier,
    settings: &ManifestSettings,
    now: DateTime<Utc>,
) -> WasteManifest {
    let (hazardous, standard): (Vec<Item>, Vec<Item>) = waste_items
        .iter()
        .cloned()
        .partition(|item| classifier.is_hazardous(item));

    WasteManifest {
        total_items: waste_items.len(),
        total_volume: total_volume(waste_items),
        total_weight: total_weight(waste_items),
        standard_items: standard.len(),
        hazardous_items: hazardous.len(),
        standard,
        hazardous,
        items: waste_items.to_vec(),
        return_vehicle: settings.return_vehicle.clone(),
        estimated_return_date: estimated_return(now, settings.return_lead_days),
    }
}

fn estimated_return(now: DateTime<Utc>, lead_days: i64) -> DateTime<Utc> {
    Duration::try_days(lead_days)
        .and_then(|lead| now.checked_add_signed(lead))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Filters the waste subset out of a full item collection.
pub fn waste_subset(items: &[Item]) -> Vec<Item> {
    items
        .iter()
        .filter(|item| item.status == Status::Waste)
        .cloned()
        .collect()
}
