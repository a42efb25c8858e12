//! Engine tunables and the host-side control flow.
//!
//! The host calls [`analyze`] explicitly after a batch of inventory changes:
//! placement advice runs over all in-transit items and, when any of them
//! cannot be seated, the rearrangement planner runs with those items as the
//! incoming set.

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::lifecycle::{self, DEFAULT_USAGE_PROBABILITY_PER_DAY, LifecycleError};
use crate::model::{Container, Item};
use crate::placement::{self, PlacementRecommendation};
use crate::rearrangement::{self, DEFAULT_STAGING_LOCATION, RearrangementPlan};
use crate::search::{self, DEFAULT_EXPIRING_THRESHOLD_DAYS};
use crate::waste::{self, LegacyNameClassifier, ManifestSettings, WasteManifest};

/// Configuration for the stowage engine.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Look-ahead window for the expiry watch, in days
    pub expiring_threshold_days: i64,
    /// Chance per simulated day that a stored item is used (0.0 to 1.0)
    pub usage_probability_per_day: f64,
    /// Label evicted items are relocated to
    pub staging_location: String,
    /// Return metadata printed on waste manifests
    pub manifest: ManifestSettings,
    /// Fixed seed for the lifecycle simulation; entropy when absent.
    ///
    /// Every call reseeds from this value, so the same items and day count
    /// always yield the same usage bumps. Leave it unset for varying runs.
    pub simulation_seed: Option<u64>,
}

impl EngineConfig {
    pub const DEFAULT_EXPIRING_THRESHOLD_DAYS: i64 = DEFAULT_EXPIRING_THRESHOLD_DAYS;
    pub const DEFAULT_USAGE_PROBABILITY_PER_DAY: f64 = DEFAULT_USAGE_PROBABILITY_PER_DAY;
    pub const DEFAULT_STAGING_LOCATION: &'static str = DEFAULT_STAGING_LOCATION;

    /// Creates a builder for a custom configuration.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            expiring_threshold_days: Self::DEFAULT_EXPIRING_THRESHOLD_DAYS,
            usage_probability_per_day: Self::DEFAULT_USAGE_PROBABILITY_PER_DAY,
            staging_location: Self::DEFAULT_STAGING_LOCATION.to_string(),
            manifest: ManifestSettings::default(),
            simulation_seed: None,
        }
    }
}

/// Builder for EngineConfig.
#[derive(Clone, Debug, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    pub fn expiring_threshold_days(mut self, days: i64) -> Self {
        self.config.expiring_threshold_days = days;
        self
    }

    pub fn usage_probability_per_day(mut self, probability: f64) -> Self {
        self.config.usage_probability_per_day = probability;
        self
    }

    pub fn staging_location(mut self, location: impl Into<String>) -> Self {
        self.config.staging_location = location.into();
        self
    }

    pub fn return_vehicle(mut self, vehicle: impl Into<String>) -> Self {
        self.config.manifest.return_vehicle = vehicle.into();
        self
    }

    pub fn return_lead_days(mut self, days: i64) -> Self {
        self.config.manifest.return_lead_days = days;
        self
    }

    pub fn simulation_seed(mut self, seed: Option<u64>) -> Self {
        self.config.simulation_seed = seed;
        self
    }

    pub fn build(self) -> EngineConfig {
        self.config
    }
}

/// Result of one placement pass.
#[derive(Clone, Debug)]
pub struct PlacementAnalysis {
    pub recommendations: Vec<PlacementRecommendation>,
    pub plan: Option<RearrangementPlan>,
}

impl PlacementAnalysis {
    pub fn unplaceable_count(&self) -> usize {
        self.recommendations
            .iter()
            .filter(|rec| rec.target.requires_rearrangement())
            .count()
    }
}

/// Runs placement advice and, if needed, rearrangement planning.
pub fn analyze(items: &[Item], containers: &[Container], config: &EngineConfig) -> PlacementAnalysis {
    let recommendations = placement::recommend(items, containers);

    let unplaceable: Vec<Item> = recommendations
        .iter()
        .filter(|rec| rec.target.requires_rearrangement())
        .filter_map(|rec| items.iter().find(|item| item.id == rec.item_id))
        .cloned()
        .collect();

    let plan = if unplaceable.is_empty() {
        None
    } else {
        rearrangement::plan_with_staging(items, containers, &unplaceable, &config.staging_location)
    };

    debug!(
        recommendations = recommendations.len(),
        unplaceable = unplaceable.len(),
        planned_steps = plan.as_ref().map_or(0, RearrangementPlan::step_count),
        "placement analysis finished"
    );

    PlacementAnalysis {
        recommendations,
        plan,
    }
}

/// Items expiring within the configured window.
pub fn expiring(items: &[Item], config: &EngineConfig, now: DateTime<Utc>) -> Vec<Item> {
    search::identify_expiring(items, config.expiring_threshold_days, now)
}

/// Advances the simulation using the configured probability and seed.
///
/// With a seed configured, repeated calls on the same input are identical.
pub fn simulate(
    items: &[Item],
    days: u32,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> Result<Vec<Item>, LifecycleError> {
    let probability = config.usage_probability_per_day;
    match config.simulation_seed {
        Some(seed) => {
            lifecycle::advance_with(items, days, now, probability, &mut StdRng::seed_from_u64(seed))
        }
        None => lifecycle::advance_with(items, days, now, probability, &mut rand::thread_rng()),
    }
}

/// Waste manifest for the waste subset of `items`.
pub fn manifest(items: &[Item], config: &EngineConfig, now: DateTime<Utc>) -> WasteManifest {
    let waste_items = waste::waste_subset(items);
    waste::build_manifest_with(
        &waste_items,
        &LegacyNameClassifier::default(),
        &config.manifest,
        now,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{container, epoch, item};
    use crate::model::{Priority, Status};

    #[test]
    fn builder_overrides_defaults() {
        let config = EngineConfig::builder()
            .expiring_threshold_days(7)
            .usage_probability_per_day(0.25)
            .staging_location("Node 1 Stowage")
            .return_vehicle("Cygnus NG-30")
            .return_lead_days(12)
            .simulation_seed(Some(9))
            .build();

        assert_eq!(config.expiring_threshold_days, 7);
        assert_eq!(config.usage_probability_per_day, 0.25);
        assert_eq!(config.staging_location, "Node 1 Stowage");
        assert_eq!(config.manifest.return_vehicle, "Cygnus NG-30");
        assert_eq!(config.manifest.return_lead_days, 12);
        assert_eq!(config.simulation_seed, Some(9));
    }

    #[test]
    fn analysis_without_shortfall_has_no_plan() {
        let containers = vec![container("A", 100.0, 0.0, 0)];
        let items = vec![item("x", Priority::High, Status::InTransit, "Dock", 10.0)];
        let analysis = analyze(&items, &containers, &EngineConfig::default());
        assert_eq!(analysis.unplaceable_count(), 0);
        assert!(analysis.plan.is_none());
    }

    #[test]
    fn unplaceable_items_trigger_plan_with_configured_staging() {
        let containers = vec![container("A", 20.0, 20.0, 1)];
        let items = vec![
            item("old-low", Priority::Low, Status::Stored, "A", 20.0),
            item("big", Priority::High, Status::InTransit, "Dock", 15.0),
        ];
        let config = EngineConfig::builder().staging_location("Hatch 2").build();

        let analysis = analyze(&items, &containers, &config);
        assert_eq!(analysis.unplaceable_count(), 1);
        let plan = analysis.plan.expect("plan expected");
        assert_eq!(plan.steps[0].item_id, "old-low");
        assert_eq!(plan.steps[0].to_location, "Hatch 2");
    }

    #[test]
    fn seeded_simulation_is_reproducible() {
        let items: Vec<Item> = (0..10)
            .map(|n| item(&format!("s{}", n), Priority::Low, Status::Stored, "A", 1.0))
            .collect();
        let config = EngineConfig::builder().simulation_seed(Some(7)).build();

        let first = simulate(&items, 3, epoch(), &config).unwrap();
        let second = simulate(&items, 3, epoch(), &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn manifest_uses_only_waste_items() {
        let items = vec![
            item("a", Priority::Low, Status::Stored, "A", 5.0),
            item("b", Priority::Low, Status::Waste, "A", 2.0),
        ];
        let manifest = manifest(&items, &EngineConfig::default(), epoch());
        assert_eq!(manifest.total_items, 1);
        assert_eq!(manifest.total_volume, 2.0);
    }
}
