//! High-level service facade combining simulation, aggregation, and advisory insights.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use crate::aggregate::aggregate;
use crate::error::CoreError;
use crate::generator::RecordGenerator;
use crate::model::{AnalysisResult, DistrictStats, Insight};
use crate::ports::{AdvisoryError, DEFAULT_TIMEOUT, InsightPort};

/// Upper bound on insights handed to the dashboard.
pub const MAX_INSIGHTS: usize = 3;

/// Public entry point for running analyses and fetching insights.
pub struct AnalyticsService {
    advisor: Option<Arc<dyn InsightPort>>,
    timeout: Duration,
}

impl AnalyticsService {
    /// Create a service bound to an optional advisory backend.
    #[must_use]
    pub fn new(advisor: Option<Arc<dyn InsightPort>>, timeout: Duration) -> Self {
        Self { advisor, timeout }
    }

    /// Service without any advisory backend.
    #[must_use]
    pub fn offline() -> Self {
        Self::new(None, DEFAULT_TIMEOUT)
    }

    /// Whether an advisory backend is configured.
    #[must_use]
    pub fn has_advisor(&self) -> bool {
        self.advisor.is_some()
    }

    /// Simulate a fresh record batch and aggregate it.
    ///
    /// # Errors
    ///
    /// Returns a [`CoreError`] if the parameters are invalid or the records are inconsistent.
    pub fn analyze<R: Rng>(
        &self,
        generator: &mut RecordGenerator<R>,
        days: u32,
        households_per_district: u32,
    ) -> Result<AnalysisResult, CoreError> {
        let records = generator.generate(days, households_per_district)?;
        aggregate(&records)
    }

    /// Fetch insights for the given districts.
    ///
    /// Never fails: a missing backend, a failed or slow call, and a malformed answer
    /// all yield a single alert insight instead.
    pub async fn insights(&self, districts: &[DistrictStats]) -> Vec<Insight> {
        let Some(advisor) = &self.advisor else {
            log::info!("No advisory backend configured, skipping insights");
            return vec![Insight::missing_api_key()];
        };

        let outcome = match tokio::time::timeout(self.timeout, advisor.insights(districts)).await {
            Ok(result) => result.and_then(accept),
            Err(_elapsed) => Err(AdvisoryError::Timeout(self.timeout)),
        };

        match outcome {
            Ok(insights) => {
                log::debug!("{} returned {} insights", advisor.name(), insights.len());
                insights
            }
            Err(AdvisoryError::MissingApiKey) => {
                log::warn!("{} has no API key", advisor.name());
                vec![Insight::missing_api_key()]
            }
            Err(err) => {
                log::warn!("{} analysis failed: {err}", advisor.name());
                vec![Insight::unavailable()]
            }
        }
    }
}

/// Reject empty or blank answers and cap the number of insights.
fn accept(mut insights: Vec<Insight>) -> Result<Vec<Insight>, AdvisoryError> {
    if insights.is_empty() {
        return Err(AdvisoryError::Malformed("no insights returned".to_owned()));
    }
    if insights
        .iter()
        .any(|insight| insight.title.trim().is_empty() || insight.content.trim().is_empty())
    {
        return Err(AdvisoryError::Malformed(
            "insight without title or content".to_owned(),
        ));
    }
    insights.truncate(MAX_INSIGHTS);
    Ok(insights)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::aggregate::district_stats;
    use crate::model::InsightKind;

    enum Behavior {
        Answer(Vec<Insight>),
        Fail,
        Hang,
    }

    struct FakeAdvisor(Behavior);

    #[async_trait]
    impl InsightPort for FakeAdvisor {
        fn name(&self) -> &str {
            "fake"
        }

        async fn insights(
            &self,
            _districts: &[DistrictStats],
        ) -> Result<Vec<Insight>, AdvisoryError> {
            match &self.0 {
                Behavior::Answer(insights) => Ok(insights.clone()),
                Behavior::Fail => Err(AdvisoryError::Malformed("boom".to_owned())),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(Vec::new())
                }
            }
        }
    }

    fn service(behavior: Behavior) -> AnalyticsService {
        AnalyticsService::new(
            Some(Arc::new(FakeAdvisor(behavior))),
            Duration::from_millis(50),
        )
    }

    fn insight(title: &str, kind: InsightKind) -> Insight {
        Insight {
            title: title.to_owned(),
            content: format!("{title} body"),
            kind,
        }
    }

    #[tokio::test]
    async fn failing_advisor_yields_single_alert() {
        let insights = service(Behavior::Fail).insights(&district_stats(&[])).await;
        assert_eq!(insights.len(), 1, "exactly one fallback");
        assert_eq!(insights.first().map(|insight| insight.kind), Some(InsightKind::Alert));
        assert_eq!(insights, vec![Insight::unavailable()]);
    }

    #[tokio::test]
    async fn slow_advisor_times_out_into_fallback() {
        let insights = service(Behavior::Hang).insights(&district_stats(&[])).await;
        assert_eq!(insights, vec![Insight::unavailable()]);
    }

    #[tokio::test]
    async fn empty_or_blank_answers_are_malformed() {
        let insights = service(Behavior::Answer(Vec::new()))
            .insights(&district_stats(&[]))
            .await;
        assert_eq!(insights, vec![Insight::unavailable()]);

        let blank = vec![insight(" ", InsightKind::Observation)];
        let insights = service(Behavior::Answer(blank))
            .insights(&district_stats(&[]))
            .await;
        assert_eq!(insights, vec![Insight::unavailable()]);
    }

    #[tokio::test]
    async fn valid_answers_are_passed_through_and_capped() {
        let answer = vec![
            insight("Worst district", InsightKind::Alert),
            insight("Trend", InsightKind::Observation),
            insight("Policy", InsightKind::Recommendation),
            insight("Extra", InsightKind::Observation),
        ];
        let insights = service(Behavior::Answer(answer.clone()))
            .insights(&district_stats(&[]))
            .await;
        assert_eq!(insights.len(), MAX_INSIGHTS);
        assert_eq!(insights.as_slice(), answer.get(..MAX_INSIGHTS).expect("four insights"));
    }

    #[tokio::test]
    async fn missing_advisor_reports_missing_key() {
        let service = AnalyticsService::offline();
        assert!(!service.has_advisor(), "offline service");
        let insights = service.insights(&district_stats(&[])).await;
        assert_eq!(insights, vec![Insight::missing_api_key()]);
    }

    #[test]
    fn analyze_runs_the_full_pipeline() {
        let now = Utc
            .with_ymd_and_hms(2024, 5, 20, 8, 0, 0)
            .single()
            .expect("valid timestamp");
        let mut generator = RecordGenerator::seeded(5, now);
        let result = AnalyticsService::offline()
            .analyze(&mut generator, 2, 3)
            .expect("valid parameters");
        assert_eq!(result.district_stats.len(), 6, "every district reported");
        assert!(result.household_stats.len() <= 18, "at most 6 x 3 households");

        let err = AnalyticsService::offline()
            .analyze(&mut generator, 0, 3)
            .expect_err("zero days");
        assert!(!err.is_data_integrity(), "{err}");
    }
}
