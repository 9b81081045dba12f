//! Read-only projections of an [`AnalysisResult`] for dashboards.

use crate::model::{AnalysisResult, CategoryWeights, District, DistrictStats, HouseholdStats};

/// Recycling share (in percent) the city aims for.
pub const RECYCLING_TARGET_PERCENT: f64 = 30.0;
/// Districts with more flagged households than this are on high alert.
pub const DISTRICT_ALERT_FLAGGED: u32 = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Household table filter: exact district and case-insensitive id substring.
pub struct HouseholdFilter {
    /// Only households of this district; `None` for all districts.
    pub district: Option<District>,
    /// Substring the household id must contain.
    pub search: String,
}

impl HouseholdFilter {
    /// Check whether a household passes the filter.
    #[must_use]
    pub fn matches(&self, household: &HouseholdStats) -> bool {
        let district_ok = self
            .district
            .is_none_or(|district| district == household.district);
        let needle = self.search.to_lowercase();
        district_ok && household.household_id.0.to_lowercase().contains(&needle)
    }

    /// Advance the district filter: all → each district in order → all.
    pub fn cycle_district(&mut self) {
        self.district = match self.district {
            None => District::ALL.first().copied(),
            Some(current) => District::ALL
                .iter()
                .skip_while(|district| **district != current)
                .nth(1)
                .copied(),
        };
    }
}

/// Households passing the filter, worst compliance first.
#[must_use]
pub fn filter_households<'a>(
    households: &'a [HouseholdStats],
    filter: &HouseholdFilter,
) -> Vec<&'a HouseholdStats> {
    let mut matching: Vec<&HouseholdStats> = households
        .iter()
        .filter(|household| filter.matches(household))
        .collect();
    matching.sort_by(|left, right| {
        left.compliance_score
            .total_cmp(&right.compliance_score)
            .then_with(|| left.household_id.cmp(&right.household_id))
    });
    matching
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Traffic-light band of a compliance score.
pub enum ComplianceBand {
    /// Above 75.
    Good,
    /// Above 50.
    Fair,
    /// 50 or below.
    Poor,
}

impl ComplianceBand {
    /// Band for a score.
    #[must_use]
    pub fn for_score(score: f64) -> Self {
        if score > 75.0 {
            Self::Good
        } else if score > 50.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

/// Whether a district has more flagged households than [`DISTRICT_ALERT_FLAGGED`].
#[must_use]
pub const fn is_high_alert(district: &DistrictStats) -> bool {
    district.flagged_households_count > DISTRICT_ALERT_FLAGGED
}

#[derive(Debug, Clone, PartialEq)]
/// Headline figures of an analysis run.
pub struct CitySummary {
    /// City-wide kilograms per category.
    pub weights: CategoryWeights,
    /// City-wide percentage per category.
    pub composition: CategoryWeights,
    /// Total weight in kilograms.
    pub total_weight: f64,
    /// Recyclable share of the total, in percent.
    pub recycling_rate: f64,
    /// Households above the residual threshold.
    pub flagged_households: usize,
    /// Unweighted mean compliance, if any household reported.
    pub average_compliance: Option<f64>,
}

impl CitySummary {
    /// Summarize an analysis run.
    #[must_use]
    pub fn from_result(result: &AnalysisResult) -> Self {
        let weights = result
            .district_stats
            .iter()
            .fold(CategoryWeights::ZERO, |mut acc, district| {
                acc += district.weights;
                acc
            });
        let composition = weights.composition();
        Self {
            weights,
            composition,
            total_weight: result.total_weight,
            recycling_rate: composition.recyclable,
            flagged_households: result
                .household_stats
                .iter()
                .filter(|household| household.is_flagged)
                .count(),
            average_compliance: result.average_compliance,
        }
    }

    /// Total weight in metric tonnes.
    #[must_use]
    pub fn total_tonnes(&self) -> f64 {
        self.total_weight / 1000.0
    }

    /// Whether the recycling target is met.
    #[must_use]
    pub fn meets_recycling_target(&self) -> bool {
        self.recycling_rate >= RECYCLING_TARGET_PERCENT
    }
}
