//! Domain data structures for districts, pickups, and compliance statistics.

use std::fmt;
use std::ops::AddAssign;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Residual share (in percent) above which a household is flagged.
pub const RESIDUAL_FLAG_THRESHOLD: f64 = 50.0;

/// Urban districts served by the collection network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum District {
    /// Ba Dinh.
    #[serde(rename = "Ba Dinh")]
    BaDinh,
    /// Hoan Kiem.
    #[serde(rename = "Hoan Kiem")]
    HoanKiem,
    /// Tay Ho.
    #[serde(rename = "Tay Ho")]
    TayHo,
    /// Cau Giay.
    #[serde(rename = "Cau Giay")]
    CauGiay,
    /// Dong Da.
    #[serde(rename = "Dong Da")]
    DongDa,
    /// Hai Ba Trung.
    #[serde(rename = "Hai Ba Trung")]
    HaiBaTrung,
}

impl District {
    /// Every district, in display order.
    pub const ALL: [Self; 6] = [
        Self::BaDinh,
        Self::HoanKiem,
        Self::TayHo,
        Self::CauGiay,
        Self::DongDa,
        Self::HaiBaTrung,
    ];

    /// Human-readable district name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BaDinh => "Ba Dinh",
            Self::HoanKiem => "Hoan Kiem",
            Self::TayHo => "Tay Ho",
            Self::CauGiay => "Cau Giay",
            Self::DongDa => "Dong Da",
            Self::HaiBaTrung => "Hai Ba Trung",
        }
    }

    /// Upper-case name without whitespace, e.g. `BADINH`.
    #[must_use]
    pub fn household_prefix(self) -> String {
        self.name()
            .chars()
            .filter(|ch| !ch.is_whitespace())
            .collect::<String>()
            .to_uppercase()
    }

    /// First two letters of the name, upper-case, e.g. `BA`.
    #[must_use]
    pub fn route_prefix(self) -> String {
        self.name().chars().take(2).collect::<String>().to_uppercase()
    }
}

impl fmt::Display for District {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

impl FromStr for District {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim();
        Self::ALL
            .into_iter()
            .find(|district| district.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::UnknownDistrict(raw.to_owned()))
    }
}

/// Mutually exclusive waste categories logged by collection trucks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Food and garden waste.
    Organic,
    /// Sorted recyclables.
    Recyclable,
    /// Unsorted residual waste.
    Residual,
}

impl Category {
    /// Every category, in collection order.
    pub const ALL: [Self; 3] = [Self::Organic, Self::Recyclable, Self::Residual];

    /// Human-readable category name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Organic => "Organic",
            Self::Recyclable => "Recyclable",
            Self::Residual => "Residual",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::UnknownCategory(raw.to_owned()))
    }
}

/// One value per category: absolute kilograms or percentage shares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CategoryWeights {
    /// Organic value.
    pub organic: f64,
    /// Recyclable value.
    pub recyclable: f64,
    /// Residual value.
    pub residual: f64,
}

impl CategoryWeights {
    /// All categories at zero.
    pub const ZERO: Self = Self {
        organic: 0.0,
        recyclable: 0.0,
        residual: 0.0,
    };

    /// Value for a single category.
    #[must_use]
    pub const fn get(&self, category: Category) -> f64 {
        match category {
            Category::Organic => self.organic,
            Category::Recyclable => self.recyclable,
            Category::Residual => self.residual,
        }
    }

    /// Add `kg` to the given category.
    pub fn add(&mut self, category: Category, kg: f64) {
        match category {
            Category::Organic => self.organic += kg,
            Category::Recyclable => self.recyclable += kg,
            Category::Residual => self.residual += kg,
        }
    }

    /// Sum over all categories.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.organic + self.recyclable + self.residual
    }

    /// Percentage share of each category; all zero when the total is not positive.
    #[must_use]
    pub fn composition(&self) -> Self {
        let total = self.total();
        if total <= 0.0 {
            return Self::ZERO;
        }
        Self {
            organic: self.organic / total * 100.0,
            recyclable: self.recyclable / total * 100.0,
            residual: self.residual / total * 100.0,
        }
    }
}

impl AddAssign for CategoryWeights {
    fn add_assign(&mut self, other: Self) {
        self.organic += other.organic;
        self.recyclable += other.recyclable;
        self.residual += other.residual;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Identifier for a household bin, e.g. `BADINH-1005`.
pub struct HouseholdId(pub String);

impl fmt::Display for HouseholdId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A single weighed pickup reported by a collection truck.
pub struct WasteRecord {
    /// Unique record identifier.
    pub id: Uuid,
    /// Household the bin belongs to.
    pub household_id: HouseholdId,
    /// District of the household.
    pub district: District,
    /// Waste category of the bin.
    pub category: Category,
    /// Measured weight in kilograms.
    pub weight_kg: f64,
    /// When the pickup happened.
    pub timestamp: DateTime<Utc>,
    /// Route the truck was driving, e.g. `R-BA-103`.
    pub route_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Compliance rollup for one household.
pub struct HouseholdStats {
    /// Household identifier.
    pub household_id: HouseholdId,
    /// District the household belongs to.
    pub district: District,
    /// Total weight over all categories.
    pub total_weight: f64,
    /// Percentage share per category.
    pub composition: CategoryWeights,
    /// Absolute kilograms per category.
    pub weights: CategoryWeights,
    /// `100 - residual%`, floored at zero.
    pub compliance_score: f64,
    /// Residual share exceeds [`RESIDUAL_FLAG_THRESHOLD`].
    pub is_flagged: bool,
}

impl HouseholdStats {
    /// Derive all statistics from the summed category weights of a household.
    #[must_use]
    pub fn from_weights(
        household_id: HouseholdId,
        district: District,
        weights: CategoryWeights,
    ) -> Self {
        let composition = weights.composition();
        Self {
            household_id,
            district,
            total_weight: weights.total(),
            composition,
            weights,
            compliance_score: compliance_score(&composition),
            is_flagged: composition.residual > RESIDUAL_FLAG_THRESHOLD,
        }
    }
}

/// Compliance score for a composition: higher organic and recycling shares score better.
#[must_use]
pub fn compliance_score(composition: &CategoryWeights) -> f64 {
    (100.0 - composition.residual).max(0.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Rollup for one district, recomputed from summed household weights.
pub struct DistrictStats {
    /// District.
    #[serde(rename = "name")]
    pub district: District,
    /// Total weight over all households.
    pub total_weight: f64,
    /// Percentage share per category of the summed weights.
    pub composition: CategoryWeights,
    /// Absolute kilograms per category.
    pub weights: CategoryWeights,
    /// Number of households with at least one record.
    pub household_count: u32,
    /// Total divided by the household count (zero without households).
    pub average_household_weight: f64,
    /// Households whose residual share is above the flag threshold.
    pub flagged_households_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Output of one analysis run.
pub struct AnalysisResult {
    /// Records the statistics were derived from.
    pub records: Vec<WasteRecord>,
    /// Per-household statistics.
    pub household_stats: Vec<HouseholdStats>,
    /// Per-district statistics, one row for every district.
    pub district_stats: Vec<DistrictStats>,
    /// City-wide total weight.
    pub total_weight: f64,
    /// Unweighted mean compliance over households; `None` without households.
    pub average_compliance: Option<f64>,
}

impl AnalysisResult {
    /// Statistics row for a district.
    #[must_use]
    pub fn district(&self, district: District) -> Option<&DistrictStats> {
        self.district_stats
            .iter()
            .find(|stats| stats.district == district)
    }

    /// Statistics for a household.
    #[must_use]
    pub fn household(&self, household_id: &HouseholdId) -> Option<&HouseholdStats> {
        self.household_stats
            .iter()
            .find(|stats| &stats.household_id == household_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Kind of advisory insight.
pub enum InsightKind {
    /// Something needs attention.
    Alert,
    /// General trend.
    Observation,
    /// Suggested policy action.
    Recommendation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Categorized free-text insight returned by an advisor.
pub struct Insight {
    /// Short headline.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Insight kind.
    #[serde(rename = "type")]
    pub kind: InsightKind,
}

impl Insight {
    /// Fallback shown when no advisor is configured.
    #[must_use]
    pub fn missing_api_key() -> Self {
        Self {
            title: "API Key Missing".to_owned(),
            content: "Provide an advisory API key to generate policy insights.".to_owned(),
            kind: InsightKind::Alert,
        }
    }

    /// Fallback shown when the advisor failed or answered with garbage.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            title: "Analysis Unavailable".to_owned(),
            content: "Could not generate insights at this time. Please try again later."
                .to_owned(),
            kind: InsightKind::Alert,
        }
    }
}
