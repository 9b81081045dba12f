//! Simulated IoT pickup records for demonstration dashboards.
//!
//! Every district gets a stable household population. For each of the most
//! recent `days` calendar days every household independently puts out each
//! bin with a category-specific probability, and the truck weighs it from a
//! category-specific uniform range. Households whose id ends in `5` or `9`
//! over-fill their residual bin, which is what the compliance scoring later
//! picks up.

use std::ops::Range;

use chrono::{DateTime, Days, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::{Builder, Uuid};

use crate::error::CoreError;
use crate::model::{Category, District, HouseholdId, WasteRecord};

/// Residual multiplier applied to bad-actor households.
pub const BAD_ACTOR_RESIDUAL_FACTOR: f64 = 2.5;

/// First numeric suffix of generated household identifiers.
const HOUSEHOLD_BASE: u32 = 1000;
/// First numeric suffix of generated route identifiers.
const ROUTE_BASE: u32 = 100;

/// Pickup probability and weight range of a category.
#[derive(Debug, Clone)]
pub struct CategoryProfile {
    /// Chance that a household puts the bin out on a given day.
    pub probability: f64,
    /// Uniform weight range in kilograms.
    pub weight_kg: Range<f64>,
}

/// Simulation profile of a category.
#[must_use]
pub const fn profile(category: Category) -> CategoryProfile {
    match category {
        Category::Organic => CategoryProfile {
            probability: 0.8,
            weight_kg: 1.5..4.5,
        },
        Category::Recyclable => CategoryProfile {
            probability: 0.4,
            weight_kg: 0.5..2.5,
        },
        Category::Residual => CategoryProfile {
            probability: 0.9,
            weight_kg: 1.0..3.0,
        },
    }
}

/// Household identifiers of a district, e.g. `BADINH-1000`, `BADINH-1001`, ...
#[must_use]
pub fn household_ids(district: District, count: u32) -> Vec<HouseholdId> {
    let prefix = district.household_prefix();
    (0..count)
        .map(|offset| HouseholdId(format!("{prefix}-{}", HOUSEHOLD_BASE + offset)))
        .collect()
}

/// Route shared by all pickups of a district on the given day offset.
#[must_use]
pub fn route_id(district: District, day_offset: u32) -> String {
    format!("R-{}-{}", district.route_prefix(), ROUTE_BASE + day_offset)
}

/// Households whose id ends in `5` or `9` systematically over-fill residual bins.
#[must_use]
pub fn is_bad_actor(household_id: &HouseholdId) -> bool {
    household_id.0.ends_with('5') || household_id.0.ends_with('9')
}

fn round_kg(kg: f64) -> f64 {
    (kg * 100.0).round() / 100.0
}

fn positive(name: &'static str, value: u32) -> Result<u32, CoreError> {
    if value == 0 {
        return Err(CoreError::InvalidArgument {
            name,
            reason: "must be a positive integer".to_owned(),
        });
    }
    Ok(value)
}

/// Record generator with an injected random source and clock.
pub struct RecordGenerator<R = ChaCha8Rng> {
    rng: R,
    now: DateTime<Utc>,
}

impl RecordGenerator<ChaCha8Rng> {
    /// Reproducible generator: the same seed and `now` yield the same records.
    #[must_use]
    pub fn seeded(seed: u64, now: DateTime<Utc>) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed), now)
    }

    /// Generator seeded from OS entropy and anchored at the current time.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(ChaCha8Rng::from_entropy(), Utc::now())
    }
}

impl<R: Rng> RecordGenerator<R> {
    /// Create a generator from an arbitrary random source.
    #[must_use]
    pub fn new(rng: R, now: DateTime<Utc>) -> Self {
        Self { rng, now }
    }

    /// Simulate pickups for the last `days` days (today included) across all districts.
    ///
    /// Records are ordered by day (most recent first), district, household, and category.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidArgument`] when either parameter is zero or the
    /// window reaches outside the supported calendar range.
    pub fn generate(
        &mut self,
        days: u32,
        households_per_district: u32,
    ) -> Result<Vec<WasteRecord>, CoreError> {
        let days = positive("days", days)?;
        let households_per_district = positive("households_per_district", households_per_district)?;

        let populations: Vec<(District, Vec<HouseholdId>)> = District::ALL
            .into_iter()
            .map(|district| (district, household_ids(district, households_per_district)))
            .collect();

        let mut records = Vec::new();

        for day_offset in 0..days {
            let timestamp = self
                .now
                .checked_sub_days(Days::new(u64::from(day_offset)))
                .ok_or_else(|| CoreError::InvalidArgument {
                    name: "days",
                    reason: format!("{days} days reach before the supported calendar range"),
                })?;

            for (district, households) in &populations {
                let route = route_id(*district, day_offset);

                for household_id in households {
                    for category in Category::ALL {
                        let Some(weight_kg) = self.sample_pickup(household_id, category) else {
                            continue;
                        };

                        records.push(WasteRecord {
                            id: self.record_id(),
                            household_id: household_id.clone(),
                            district: *district,
                            category,
                            weight_kg,
                            timestamp,
                            route_id: route.clone(),
                        });
                    }
                }
            }
        }

        log::debug!(
            "Generated {} records for {} households per district over {days} days",
            records.len(),
            households_per_district
        );

        Ok(records)
    }

    /// Weight of a pickup, or `None` when the bin was not put out.
    fn sample_pickup(&mut self, household_id: &HouseholdId, category: Category) -> Option<f64> {
        let CategoryProfile {
            probability,
            weight_kg,
        } = profile(category);

        if !self.rng.gen_bool(probability) {
            return None;
        }

        let mut weight = self.rng.gen_range(weight_kg);
        if category == Category::Residual && is_bad_actor(household_id) {
            weight *= BAD_ACTOR_RESIDUAL_FACTOR;
        }
        Some(round_kg(weight))
    }

    fn record_id(&mut self) -> Uuid {
        let mut bytes = [0_u8; 16];
        self.rng.fill(&mut bytes);
        Builder::from_random_bytes(bytes).into_uuid()
    }
}

/// Simulate pickups with a fresh entropy-seeded generator.
///
/// # Errors
///
/// Returns [`CoreError::InvalidArgument`] when either parameter is zero.
pub fn generate(days: u32, households_per_district: u32) -> Result<Vec<WasteRecord>, CoreError> {
    RecordGenerator::from_entropy().generate(days, households_per_district)
}
