//! Advisory backend asking Google Gemini for waste policy insights.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use wastelens_core::{
    model::{DistrictStats, Insight},
    ports::{AdvisoryConfig, AdvisoryError, InsightPort},
};

const SYSTEM_INSTRUCTION: &str = "You are an expert waste management analyst for the city of Hanoi. \
Your goal is to analyze aggregated waste data and provide actionable, policy-relevant insights. \
Focus on high residual waste rates (non-compliance), recycling efficiency, \
and specific recommendations for districts. Keep insights concise and professional.";

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'a str,
}

/// Response from `generateContent`; only the first text part matters.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Insight backend for the Gemini `generateContent` API.
pub struct GeminiInsightPort {
    client: Client,
    config: AdvisoryConfig,
}

impl GeminiInsightPort {
    /// Create a backend bound to the given HTTP client and settings.
    #[must_use]
    pub fn new(client: Client, config: AdvisoryConfig) -> Self {
        Self { client, config }
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl InsightPort for GeminiInsightPort {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn insights(&self, districts: &[DistrictStats]) -> Result<Vec<Insight>, AdvisoryError> {
        let api_key = self.config.api_key().ok_or(AdvisoryError::MissingApiKey)?;

        let prompt = build_prompt(districts)?;
        let body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![RequestPart {
                    text: SYSTEM_INSTRUCTION,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![RequestPart { text: &prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        log::debug!(
            "Requesting insights from {} for {} districts",
            self.config.model,
            districts.len()
        );

        let req = self
            .client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .timeout(self.config.timeout)
            .json(&body);

        let response = fetch_json::<GenerateContentResponse>(req).await?;
        parse_insights(&response)
    }
}

/// Build the advisor bundle, or `None` when no API key is configured.
#[must_use]
pub fn advisor(client: Client, config: AdvisoryConfig) -> Option<Arc<dyn InsightPort>> {
    if !config.has_api_key() {
        log::info!("Gemini advisor disabled: no API key configured");
        return None;
    }
    Some(Arc::new(GeminiInsightPort::new(client, config)))
}

/// Prompt embedding the district statistics as pretty JSON.
fn build_prompt(districts: &[DistrictStats]) -> Result<String, AdvisoryError> {
    let data = serde_json::to_string_pretty(districts)?;
    Ok(format!(
        "Analyze the following waste management data for Hanoi districts:\n\
         {data}\n\n\
         Provide 3 distinct insights in JSON format with the following structure:\n\
         [\n  {{ \"title\": \"...\", \"content\": \"...\", \"type\": \"alert\" | \"observation\" | \"recommendation\" }}\n]\n\n\
         Make sure one is an 'alert' about the worst performing district (highest residual), \
         one is an 'observation' about general trends, and one is a 'recommendation' for policy."
    ))
}

/// Decode the insight array from the first candidate's text.
fn parse_insights(response: &GenerateContentResponse) -> Result<Vec<Insight>, AdvisoryError> {
    let text = response
        .candidates
        .iter()
        .filter_map(|candidate| candidate.content.as_ref())
        .flat_map(|content| &content.parts)
        .find_map(|part| part.text.as_deref())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| AdvisoryError::Malformed("no text in response".to_owned()))?;

    let insights: Vec<Insight> = serde_json::from_str(strip_code_fence(text))?;
    if insights.is_empty() {
        return Err(AdvisoryError::Malformed("empty insight list".to_owned()));
    }
    Ok(insights)
}

// Models occasionally wrap JSON in a markdown fence despite the MIME type.
fn strip_code_fence(text: &str) -> &str {
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

// Small helper to fetch and decode JSON with status handling.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, AdvisoryError> {
    let response = req.send().await.map_err(AdvisoryError::from)?;
    check_status(response.status())?;
    response.json().await.map_err(AdvisoryError::from)
}

fn check_status(status: StatusCode) -> Result<(), AdvisoryError> {
    if status.is_success() {
        return Ok(());
    }
    log::warn!("Gemini answered with {status}");
    Err(AdvisoryError::Status(status.as_u16()))
}
