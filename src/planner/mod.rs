//! Plan-synthesis service client
//!
//! The planner is the external collaborator that does all route reasoning.
//! It is consumed through the [`PlannerClient`] trait; the production
//! implementation talks to Gemini over HTTPS. Each call is independent: no
//! conversation state lives on this side of the boundary.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

mod error;
mod gemini;
pub mod prompts;

pub use error::PlannerError;
pub use gemini::GeminiClient;

use crate::config::PlannerConfig;
use crate::plan::TripPlan;

/// Stateless client for the plan-synthesis service
///
/// All four calls may fail with a transport-class error; the plan-producing
/// calls may additionally fail with [`PlannerError::MalformedPlan`] when the
/// service answers but the payload does not validate.
#[async_trait]
pub trait PlannerClient: Send + Sync {
    /// Generate a fresh multi-day itinerary; the service picks the duration
    async fn synthesize_trip(
        &self,
        from: &str,
        to: &str,
        travel_style: &str,
        preferences: &[String],
    ) -> Result<TripPlan, PlannerError>;

    /// Find a point-to-point route as a single-day document with no activities
    async fn synthesize_route(
        &self,
        from: &str,
        to: &str,
        preferences: &[String],
    ) -> Result<TripPlan, PlannerError>;

    /// Replace the plan wholesale based on a natural-language instruction
    async fn refine(&self, plan: &TripPlan, instruction: &str) -> Result<TripPlan, PlannerError>;

    /// Reverse geocode a coordinate into "City, State/Country"
    async fn resolve_city(&self, lat: f64, lng: f64) -> Result<String, PlannerError>;
}

/// Create a planner client from configuration
pub fn create_client(config: &PlannerConfig) -> Result<Arc<dyn PlannerClient>, PlannerError> {
    debug!(model = %config.model, "create_client: called");
    Ok(Arc::new(GeminiClient::from_config(config)?))
}
