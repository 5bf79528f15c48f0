//! Refinement request builder
//!
//! Turns the refinement controls (day slider, budget slider, free-text ask)
//! into one natural-language instruction for the synthesis service. No
//! structured diff is sent: the service gets this instruction plus the full
//! current plan as context and returns a complete replacement document.

use tracing::debug;

use super::{TripPlan, format_inr};

/// Build the refinement instruction, or `None` when nothing changed
///
/// Clauses are emitted in a fixed order: duration (only if it differs from
/// the plan's current duration), budget (only if the requested anchor differs
/// from the plan's current anchor), then the trimmed free text verbatim.
/// `None` means no round-trip should be made at all.
pub fn build_refinement(
    plan: &TripPlan,
    requested_days: u32,
    requested_budget: u32,
    free_text: &str,
) -> Option<String> {
    debug!(
        requested_days,
        requested_budget,
        free_text_len = free_text.len(),
        "build_refinement: called"
    );
    let mut request = String::new();

    if requested_days != plan.total_duration {
        request.push_str(&format!("Change the trip duration to {} days. ", requested_days));
    }
    if requested_budget != plan.budget_anchor() {
        request.push_str(&format!(
            "Adjust the total budget to be around ₹{}. ",
            format_inr(requested_budget)
        ));
    }
    let free_text = free_text.trim();
    if !free_text.is_empty() {
        request.push_str(free_text);
    }

    let request = request.trim().to_string();
    if request.is_empty() { None } else { Some(request) }
}
