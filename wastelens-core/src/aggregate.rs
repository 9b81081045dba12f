//! Household → district → city reduction of pickup records.

use std::collections::BTreeMap;

use crate::error::CoreError;
use crate::model::{
    AnalysisResult, CategoryWeights, District, DistrictStats, HouseholdId, HouseholdStats,
    WasteRecord,
};

/// Group records by household and derive each household's statistics.
///
/// Households are returned ordered by identifier, so the result does not depend on
/// record order.
///
/// # Errors
///
/// Returns a data-integrity [`CoreError`] when a record weight is not a positive
/// finite number or when one household's records disagree on its district.
pub fn household_stats(records: &[WasteRecord]) -> Result<Vec<HouseholdStats>, CoreError> {
    let mut households: BTreeMap<&HouseholdId, (District, CategoryWeights)> = BTreeMap::new();

    for record in records {
        if !record.weight_kg.is_finite() || record.weight_kg <= 0.0 {
            return Err(CoreError::InvalidWeight {
                record: record.id,
                weight: record.weight_kg,
            });
        }

        let (district, weights) = households
            .entry(&record.household_id)
            .or_insert((record.district, CategoryWeights::ZERO));

        if *district != record.district {
            return Err(CoreError::DistrictMismatch {
                household: record.household_id.clone(),
                first: *district,
                second: record.district,
            });
        }

        weights.add(record.category, record.weight_kg);
    }

    Ok(households
        .into_iter()
        .map(|(household_id, (district, weights))| {
            HouseholdStats::from_weights(household_id.clone(), district, weights)
        })
        .collect())
}

#[derive(Default)]
struct DistrictAccumulator {
    weights: CategoryWeights,
    household_count: u32,
    flagged_count: u32,
}

/// Fold household statistics into one row per district.
///
/// Every district is present, including those without households. Composition is
/// recomputed from the summed weights rather than averaged over households.
#[must_use]
pub fn district_stats(households: &[HouseholdStats]) -> Vec<DistrictStats> {
    let mut districts: BTreeMap<District, DistrictAccumulator> = District::ALL
        .into_iter()
        .map(|district| (district, DistrictAccumulator::default()))
        .collect();

    for household in households {
        let acc = districts.entry(household.district).or_default();
        acc.weights += household.weights;
        acc.household_count += 1;
        if household.is_flagged {
            acc.flagged_count += 1;
        }
    }

    districts
        .into_iter()
        .map(|(district, acc)| {
            let total_weight = acc.weights.total();
            DistrictStats {
                district,
                total_weight,
                composition: acc.weights.composition(),
                weights: acc.weights,
                household_count: acc.household_count,
                average_household_weight: total_weight / f64::from(acc.household_count.max(1)),
                flagged_households_count: acc.flagged_count,
            }
        })
        .collect()
}

/// Unweighted mean compliance over households, `None` when there are none.
///
/// Every household counts once regardless of how much waste it produced.
#[must_use]
pub fn average_compliance(households: &[HouseholdStats]) -> Option<f64> {
    if households.is_empty() {
        return None;
    }
    let sum: f64 = households
        .iter()
        .map(|household| household.compliance_score)
        .sum();
    #[expect(
        clippy::cast_precision_loss,
        reason = "household counts stay far below 2^52"
    )]
    let count = households.len() as f64;
    Some(sum / count)
}

/// Reduce a record set into household, district, and city statistics.
///
/// # Errors
///
/// Returns a data-integrity [`CoreError`] when the records are inconsistent; see
/// [`household_stats`].
pub fn aggregate(records: &[WasteRecord]) -> Result<AnalysisResult, CoreError> {
    let household_stats = household_stats(records)?;
    let district_stats = district_stats(&household_stats);
    let total_weight = district_stats.iter().map(|stats| stats.total_weight).sum();
    let average_compliance = average_compliance(&household_stats);

    log::debug!(
        "Aggregated {} records into {} households, {total_weight:.2} kg total",
        records.len(),
        household_stats.len()
    );

    Ok(AnalysisResult {
        records: records.to_vec(),
        household_stats,
        district_stats,
        total_weight,
        average_compliance,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::generator::RecordGenerator;
    use crate::model::Category;

    const TOLERANCE: f64 = 1e-6;

    fn record(household: &str, district: District, category: Category, kg: f64) -> WasteRecord {
        WasteRecord {
            id: Uuid::new_v4(),
            household_id: HouseholdId(household.to_owned()),
            district,
            category,
            weight_kg: kg,
            timestamp: Utc
                .with_ymd_and_hms(2024, 5, 20, 8, 0, 0)
                .single()
                .expect("valid timestamp"),
            route_id: "R-BA-100".to_owned(),
        }
    }

    fn generated() -> Vec<WasteRecord> {
        let now = Utc
            .with_ymd_and_hms(2024, 5, 20, 8, 0, 0)
            .single()
            .expect("valid timestamp");
        RecordGenerator::seeded(2024, now)
            .generate(7, 20)
            .expect("valid parameters")
    }

    fn close(left: f64, right: f64) -> bool {
        (left - right).abs() < TOLERANCE
    }

    #[test]
    fn single_household_scenario() {
        let records = vec![
            record("H1", District::BaDinh, Category::Organic, 3.0),
            record("H1", District::BaDinh, Category::Residual, 7.0),
        ];
        let result = aggregate(&records).expect("consistent records");

        let household = result
            .household(&HouseholdId("H1".to_owned()))
            .expect("H1 aggregated");
        assert!(close(household.total_weight, 10.0), "total");
        assert!(close(household.composition.organic, 30.0), "organic");
        assert!(close(household.composition.recyclable, 0.0), "recyclable");
        assert!(close(household.composition.residual, 70.0), "residual");
        assert!(close(household.compliance_score, 30.0), "score");
        assert!(household.is_flagged, "flagged");
        assert_eq!(result.average_compliance, Some(household.compliance_score));
    }

    #[test]
    fn empty_districts_report_zero_rows() {
        let records = vec![record("H1", District::BaDinh, Category::Organic, 2.0)];
        let result = aggregate(&records).expect("consistent records");

        assert_eq!(result.district_stats.len(), District::ALL.len(), "all districts present");
        let empty = result.district(District::TayHo).expect("row for Tay Ho");
        assert_eq!(empty.total_weight, 0.0);
        assert_eq!(empty.composition, CategoryWeights::ZERO);
        assert_eq!(empty.average_household_weight, 0.0);
        assert_eq!(empty.flagged_households_count, 0);
        assert_eq!(empty.household_count, 0);
    }

    #[test]
    fn empty_input_has_no_average_compliance() {
        let result = aggregate(&[]).expect("empty input is valid");
        assert!(result.household_stats.is_empty(), "no households");
        assert_eq!(result.average_compliance, None);
        assert_eq!(result.total_weight, 0.0);
        assert_eq!(result.district_stats.len(), 6, "districts still listed");
    }

    #[test]
    fn district_composition_uses_summed_weights() {
        let records = vec![
            record("A", District::DongDa, Category::Organic, 9.0),
            record("A", District::DongDa, Category::Residual, 1.0),
            record("B", District::DongDa, Category::Residual, 2.0),
        ];
        let result = aggregate(&records).expect("consistent records");
        let dong_da = result.district(District::DongDa).expect("row for Dong Da");

        // Averaging household shares would give 45% organic; summed weights give 75%.
        assert!(close(dong_da.composition.organic, 75.0), "{:?}", dong_da.composition);
        assert!(close(dong_da.composition.residual, 25.0), "{:?}", dong_da.composition);
        assert!(close(dong_da.average_household_weight, 6.0), "average");
        assert_eq!(dong_da.household_count, 2);
        assert_eq!(dong_da.flagged_households_count, 1, "B is all residual");
    }

    #[test]
    fn totals_round_trip_across_levels() {
        let records = generated();
        let result = aggregate(&records).expect("generated records are consistent");

        let record_total: f64 = records.iter().map(|record| record.weight_kg).sum();
        let household_total: f64 = result
            .household_stats
            .iter()
            .map(|household| household.total_weight)
            .sum();
        let district_total: f64 = result
            .district_stats
            .iter()
            .map(|district| district.total_weight)
            .sum();

        assert!(close(result.total_weight, district_total), "city vs districts");
        assert!(close(district_total, household_total), "districts vs households");
        assert!(close(household_total, record_total), "households vs records");

        for district in &result.district_stats {
            let within: f64 = result
                .household_stats
                .iter()
                .filter(|household| household.district == district.district)
                .map(|household| household.total_weight)
                .sum();
            assert!(close(within, district.total_weight), "{}", district.district);
        }
    }

    #[test]
    fn compositions_sum_to_one_hundred() {
        let result = aggregate(&generated()).expect("generated records are consistent");

        for household in &result.household_stats {
            let sum = household.composition.total();
            if household.total_weight > 0.0 {
                assert!(close(sum, 100.0), "{} sums to {sum}", household.household_id);
            } else {
                assert_eq!(household.composition, CategoryWeights::ZERO);
            }
        }
        for district in &result.district_stats {
            assert!(close(district.composition.total(), 100.0), "{}", district.district);
        }
    }

    #[test]
    fn flag_and_score_follow_residual_share() {
        let result = aggregate(&generated()).expect("generated records are consistent");
        for household in &result.household_stats {
            assert_eq!(
                household.is_flagged,
                household.composition.residual > 50.0,
                "{}",
                household.household_id
            );
            assert_eq!(
                household.compliance_score,
                (100.0 - household.composition.residual).max(0.0),
                "{}",
                household.household_id
            );
        }
    }

    #[test]
    fn input_order_does_not_change_statistics() {
        let records = generated();
        let mut reversed = records.clone();
        reversed.reverse();

        let forward = aggregate(&records).expect("consistent");
        let backward = aggregate(&reversed).expect("consistent");

        assert_eq!(forward.household_stats.len(), backward.household_stats.len());
        for (left, right) in forward.household_stats.iter().zip(&backward.household_stats) {
            assert_eq!(left.household_id, right.household_id, "same household order");
            assert!(close(left.total_weight, right.total_weight), "{}", left.household_id);
            assert!(close(left.compliance_score, right.compliance_score), "{}", left.household_id);
            assert_eq!(left.is_flagged, right.is_flagged);
        }
        for (left, right) in forward.district_stats.iter().zip(&backward.district_stats) {
            assert_eq!(left.district, right.district);
            assert!(close(left.total_weight, right.total_weight), "{}", left.district);
            assert_eq!(left.flagged_households_count, right.flagged_households_count);
        }
        assert!(close(forward.total_weight, backward.total_weight), "city total");
    }

    #[test]
    fn bad_actor_residual_is_amplified_and_flagged() {
        let honest_residual = 2.0;
        let records = vec![
            record("TAYHO-1004", District::TayHo, Category::Organic, 2.5),
            record("TAYHO-1004", District::TayHo, Category::Residual, honest_residual),
            record("TAYHO-1005", District::TayHo, Category::Organic, 2.5),
            record(
                "TAYHO-1005",
                District::TayHo,
                Category::Residual,
                honest_residual * crate::generator::BAD_ACTOR_RESIDUAL_FACTOR,
            ),
        ];
        let result = aggregate(&records).expect("consistent records");

        let honest = result
            .household(&HouseholdId("TAYHO-1004".to_owned()))
            .expect("honest household");
        let bad = result
            .household(&HouseholdId("TAYHO-1005".to_owned()))
            .expect("bad actor");

        assert!(close(bad.weights.residual / honest.weights.residual, 2.5), "ratio");
        assert!(bad.composition.residual > 50.0, "{}", bad.composition.residual);
        assert!(bad.is_flagged, "bad actor flagged");
        assert!(!honest.is_flagged, "honest household not flagged");
    }

    #[test]
    fn conflicting_districts_are_rejected() {
        let records = vec![
            record("H1", District::BaDinh, Category::Organic, 1.0),
            record("H1", District::CauGiay, Category::Residual, 1.0),
        ];
        let err = aggregate(&records).expect_err("district mismatch");
        assert!(err.is_data_integrity(), "{err}");
        assert!(
            matches!(
                err,
                CoreError::DistrictMismatch {
                    first: District::BaDinh,
                    second: District::CauGiay,
                    ..
                }
            ),
            "{err}"
        );
    }

    #[test]
    fn non_positive_weights_are_rejected() {
        for weight in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let records = vec![record("H1", District::BaDinh, Category::Organic, weight)];
            let err = household_stats(&records).expect_err("invalid weight");
            assert!(matches!(err, CoreError::InvalidWeight { .. }), "{err}");
        }
    }

    #[test]
    fn aggregation_leaves_records_untouched() {
        let records = generated();
        let snapshot = records.clone();
        let result = aggregate(&records).expect("consistent");
        assert_eq!(records, snapshot, "input not mutated");
        assert_eq!(result.records, snapshot, "records carried through");
    }
}
