//! Error taxonomy of the generation and aggregation pipeline.

use uuid::Uuid;

use crate::model::{District, HouseholdId};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
/// Errors raised while generating or aggregating pickup records.
pub enum CoreError {
    /// A generation parameter is out of range.
    #[error("Invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// Parameter name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// A raw district value is not served by the network.
    #[error("Unknown district: {0}")]
    UnknownDistrict(String),
    /// A raw category value is not one of the collected categories.
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
    /// Records of one household disagree on its district.
    #[error("Household {household} reported in both {first} and {second}")]
    DistrictMismatch {
        /// Household in question.
        household: HouseholdId,
        /// District of the first record seen.
        first: District,
        /// Conflicting district.
        second: District,
    },
    /// A record carries a weight that is not a positive finite number.
    #[error("Record {record} has invalid weight {weight} kg")]
    InvalidWeight {
        /// Offending record.
        record: Uuid,
        /// Reported weight.
        weight: f64,
    },
}

impl CoreError {
    /// Whether the error stems from inconsistent or out-of-domain input data.
    #[must_use]
    pub const fn is_data_integrity(&self) -> bool {
        !matches!(self, Self::InvalidArgument { .. })
    }
}
