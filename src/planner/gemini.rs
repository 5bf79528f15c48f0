//! Gemini API client implementation
//!
//! Implements [`PlannerClient`] against the `generateContent` endpoint with a
//! JSON response schema, bounded retries, and exponential backoff for
//! transient statuses.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::prompts;
use super::{PlannerClient, PlannerError};
use crate::config::PlannerConfig;
use crate::plan::TripPlan;

/// Maximum number of retries for transient errors
const MAX_RETRIES: u32 = 3;

/// Initial backoff delay for retries
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 500 | 502 | 503 | 504)
}

/// Gemini generateContent client
pub struct GeminiClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
    max_output_tokens: u32,
}

impl GeminiClient {
    /// Create a new client from configuration
    ///
    /// Reads the API key from the environment variable named in config.
    pub fn from_config(config: &PlannerConfig) -> Result<Self, PlannerError> {
        debug!(model = %config.model, "GeminiClient::from_config: called");
        let api_key = config
            .api_key()
            .map_err(|e| PlannerError::Configuration(e.to_string()))?;

        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(PlannerError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: config.base_url.clone(),
            http,
            max_output_tokens: config.max_output_tokens,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Build the request body; plan-producing calls attach the response schema
    fn build_request_body(&self, prompt: &str, structured: bool) -> serde_json::Value {
        debug!(structured, prompt_len = prompt.len(), "build_request_body: called");
        let mut body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "maxOutputTokens": self.max_output_tokens,
            },
        });
        if structured {
            body["generationConfig"]["responseMimeType"] = serde_json::json!("application/json");
            body["generationConfig"]["responseSchema"] = prompts::plan_response_schema();
        }
        body
    }

    /// POST with retries; returns the first candidate's text
    async fn generate(&self, prompt: &str, structured: bool) -> Result<String, PlannerError> {
        let body = self.build_request_body(prompt, structured);
        let url = self.endpoint();

        let mut last_error = None;
        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let backoff = INITIAL_BACKOFF_MS * 2u64.pow(attempt - 1);
                warn!(attempt, backoff_ms = backoff, "generate: retrying after transient error");
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }

            let response = match self
                .http
                .post(&url)
                .header("x-goog-api-key", self.api_key.clone())
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    debug!(attempt, error = %e, "generate: network error");
                    last_error = Some(PlannerError::Network(e));
                    continue;
                }
            };

            let status = response.status().as_u16();

            if status == 429 {
                debug!("generate: rate limited (429)");
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(60);
                return Err(PlannerError::RateLimited {
                    retry_after: Duration::from_secs(retry_after),
                });
            }

            if is_retryable_status(status) && attempt < MAX_RETRIES {
                let text = response.text().await.unwrap_or_default();
                debug!(attempt, status, "generate: retryable error");
                last_error = Some(PlannerError::Api { status, message: text });
                continue;
            }

            if !response.status().is_success() {
                debug!(status, "generate: API error");
                let text = response.text().await.unwrap_or_default();
                return Err(PlannerError::Api { status, message: text });
            }

            debug!("generate: success");
            let api_response: GenerateResponse = response
                .json()
                .await
                .map_err(PlannerError::Network)?;
            return api_response.first_text().ok_or(PlannerError::EmptyResponse);
        }

        Err(last_error.unwrap_or(PlannerError::EmptyResponse))
    }

    /// Parse and validate a plan payload, classifying failures as malformed
    fn parse_plan(text: &str) -> Result<TripPlan, PlannerError> {
        let cleaned = strip_code_fences(text);
        let plan: TripPlan = serde_json::from_str(cleaned)
            .map_err(|e| PlannerError::MalformedPlan(e.to_string()))?;
        plan.validate()
            .map_err(|e| PlannerError::MalformedPlan(e.to_string()))?;
        Ok(plan)
    }
}

/// Strip a markdown ```json fence the service sometimes wraps payloads in
fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    text.strip_suffix("```").unwrap_or(text).trim()
}

#[async_trait]
impl PlannerClient for GeminiClient {
    async fn synthesize_trip(
        &self,
        from: &str,
        to: &str,
        travel_style: &str,
        preferences: &[String],
    ) -> Result<TripPlan, PlannerError> {
        debug!(%from, %to, %travel_style, "synthesize_trip: called");
        let prompt = prompts::trip_prompt(from, to, travel_style, preferences);
        let text = self.generate(&prompt, true).await?;
        Self::parse_plan(&text)
    }

    async fn synthesize_route(
        &self,
        from: &str,
        to: &str,
        preferences: &[String],
    ) -> Result<TripPlan, PlannerError> {
        debug!(%from, %to, "synthesize_route: called");
        let prompt = prompts::route_prompt(from, to, preferences);
        let text = self.generate(&prompt, true).await?;
        Self::parse_plan(&text)
    }

    async fn refine(&self, plan: &TripPlan, instruction: &str) -> Result<TripPlan, PlannerError> {
        debug!(instruction_len = instruction.len(), "refine: called");
        let prompt = prompts::refine_prompt(plan, instruction);
        let text = self.generate(&prompt, true).await?;
        Self::parse_plan(&text)
    }

    async fn resolve_city(&self, lat: f64, lng: f64) -> Result<String, PlannerError> {
        debug!(lat, lng, "resolve_city: called");
        let prompt = prompts::geocode_prompt(lat, lng);
        let text = self.generate(&prompt, false).await?;
        Ok(text.trim().to_string())
    }
}

// Gemini API response types

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content
            .parts
            .into_iter()
            .find_map(|p| p.text)
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> GeminiClient {
        GeminiClient {
            model: "gemini-2.5-flash".to_string(),
            api_key: "test-key".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            http: Client::new(),
            max_output_tokens: 8192,
        }
    }

    #[test]
    fn test_endpoint_includes_model() {
        let client = test_client();
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_structured_body_carries_schema() {
        let client = test_client();
        let body = client.build_request_body("plan a trip", true);
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert!(body["generationConfig"]["responseSchema"].is_object());
        assert_eq!(body["contents"][0]["parts"][0]["text"], "plan a trip");
    }

    #[test]
    fn test_plain_body_has_no_schema() {
        let client = test_client();
        let body = client.build_request_body("what city is here", false);
        assert!(body["generationConfig"].get("responseSchema").is_none());
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn test_parse_plan_rejects_bad_json_as_malformed() {
        let err = GeminiClient::parse_plan("not json at all").unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_parse_plan_rejects_day_order_violation_as_malformed() {
        let raw = r#"{
            "tripTitle": "Broken",
            "totalDuration": 2,
            "estimatedTotalBudget": "₹1,000",
            "itinerary": [
                {"day": 2, "title": "t", "city": "A", "lat": 0, "lng": 0, "transport": [], "activities": []},
                {"day": 1, "title": "t", "city": "B", "lat": 0, "lng": 0, "transport": [], "activities": []}
            ]
        }"#;
        let err = GeminiClient::parse_plan(raw).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_parse_plan_accepts_fenced_payload() {
        let raw = r#"```json
        {
            "tripTitle": "Quick hop",
            "totalDuration": 1,
            "estimatedTotalBudget": "₹500",
            "itinerary": [
                {"day": 1, "title": "t", "city": "Pune", "lat": 18.5, "lng": 73.8, "transport": [], "activities": []}
            ]
        }
        ```"#;
        let plan = GeminiClient::parse_plan(raw).unwrap();
        assert_eq!(plan.title, "Quick hop");
    }

    #[test]
    fn test_response_first_text() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"Jaipur, Rajasthan"}]}}]}"#;
        let resp: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.first_text().unwrap(), "Jaipur, Rajasthan");
    }

    #[test]
    fn test_empty_candidates_yield_none() {
        let resp: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.first_text().is_none());
    }
}
