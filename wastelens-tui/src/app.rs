use std::sync::Arc;

use wastelens_core::{
    error::CoreError,
    generator::RecordGenerator,
    model::{AnalysisResult, District, HouseholdStats, Insight},
    service::AnalyticsService,
    view::{HouseholdFilter, filter_households},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Overview,
    Households,
}

pub(crate) struct App {
    pub service: Arc<AnalyticsService>,
    pub generator: RecordGenerator,
    pub days: u32,
    pub households_per_district: u32,

    pub screen: Screen,
    pub result: Option<AnalysisResult>,

    pub insights: Vec<Insight>,
    pub insights_loading: bool,

    pub filter: HouseholdFilter,
    pub editing_search: bool,
    pub household_index: usize,

    pub error_message: Option<String>,
}

impl App {
    pub(crate) fn new(
        service: Arc<AnalyticsService>,
        generator: RecordGenerator,
        days: u32,
        households_per_district: u32,
        district: Option<District>,
    ) -> Self {
        Self {
            service,
            generator,
            days,
            households_per_district,
            screen: Screen::Overview,
            result: None,
            insights: Vec::new(),
            insights_loading: false,
            filter: HouseholdFilter {
                district,
                search: String::new(),
            },
            editing_search: false,
            household_index: 0,
            error_message: None,
        }
    }

    /// Replace the current analysis with a freshly simulated one.
    pub(crate) fn regenerate(&mut self) -> Result<(), CoreError> {
        self.result = None;
        self.insights.clear();
        self.household_index = 0;

        let result =
            self.service
                .analyze(&mut self.generator, self.days, self.households_per_district)?;
        log::info!(
            "Analysis ready: {} records, {} households",
            result.records.len(),
            result.household_stats.len()
        );
        self.result = Some(result);
        Ok(())
    }

    pub(crate) fn filtered_households(&self) -> Vec<&HouseholdStats> {
        self.result
            .as_ref()
            .map(|result| filter_households(&result.household_stats, &self.filter))
            .unwrap_or_default()
    }

    pub(crate) fn toggle_screen(&mut self) {
        self.screen = match self.screen {
            Screen::Overview => Screen::Households,
            Screen::Households => Screen::Overview,
        };
        self.editing_search = false;
    }

    pub(crate) fn cycle_district(&mut self) {
        self.filter.cycle_district();
        self.household_index = 0;
    }

    pub(crate) fn push_search(&mut self, character: char) {
        self.filter.search.push(character);
        self.household_index = 0;
    }

    pub(crate) fn pop_search(&mut self) {
        self.filter.search.pop();
        self.household_index = 0;
    }

    pub(crate) fn select_previous(&mut self) {
        self.household_index = self.household_index.saturating_sub(1);
    }

    pub(crate) fn select_next(&mut self) {
        if self.household_index + 1 < self.filtered_households().len() {
            self.household_index += 1;
        }
    }
}
