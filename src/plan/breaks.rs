//! Break insertion flow
//!
//! A constrained refinement: the user picks a break duration for one day and
//! the flow emits a fixed-shape instruction asking the service to insert the
//! break and push all subsequent departure times later. The recalculation
//! itself stays with the service; nothing here does time arithmetic.

use tracing::debug;

/// Minutes values the picker can step through
pub const MINUTE_STEPS: [u32; 4] = [0, 15, 30, 45];

/// Maximum hours value the picker allows
pub const MAX_BREAK_HOURS: u32 = 23;

/// A break being composed for one itinerary day
#[derive(Debug, Clone)]
pub struct BreakRequest {
    pub day: u32,
    pub city: String,
    pub hours: u32,
    pub minutes: u32,
}

impl BreakRequest {
    /// Start composing a break for the given day (defaults to 2h, matching
    /// the most common ask)
    pub fn new(day: u32, city: impl Into<String>) -> Self {
        Self {
            day,
            city: city.into(),
            hours: 2,
            minutes: 0,
        }
    }

    pub fn increment_hours(&mut self) {
        if self.hours < MAX_BREAK_HOURS {
            self.hours += 1;
        }
    }

    pub fn decrement_hours(&mut self) {
        self.hours = self.hours.saturating_sub(1);
    }

    pub fn increment_minutes(&mut self) {
        let idx = MINUTE_STEPS.iter().position(|m| *m == self.minutes).unwrap_or(0);
        if idx + 1 < MINUTE_STEPS.len() {
            self.minutes = MINUTE_STEPS[idx + 1];
        }
    }

    pub fn decrement_minutes(&mut self) {
        let idx = MINUTE_STEPS.iter().position(|m| *m == self.minutes).unwrap_or(0);
        if idx > 0 {
            self.minutes = MINUTE_STEPS[idx - 1];
        }
    }

    /// A zero-length break can never be confirmed; the confirm control stays
    /// disabled rather than relying on a later no-op check.
    pub fn is_confirmable(&self) -> bool {
        self.hours > 0 || self.minutes > 0
    }

    /// The refinement instruction for this break, or `None` while the
    /// duration is still zero
    pub fn instruction(&self) -> Option<String> {
        debug!(day = self.day, hours = self.hours, minutes = self.minutes, "BreakRequest::instruction");
        if !self.is_confirmable() {
            return None;
        }
        let mut request = format!("On Day {} in {}, add a break of ", self.day, self.city);
        if self.hours > 0 {
            request.push_str(&format!(
                "{} hour{}",
                self.hours,
                if self.hours > 1 { "s" } else { "" }
            ));
        }
        if self.minutes > 0 {
            if self.hours > 0 {
                request.push_str(" and ");
            }
            request.push_str(&format!("{} minutes", self.minutes));
        }
        request.push_str(
            ". Then, recalculate the rest of the trip accordingly, updating departure times for subsequent travel.",
        );
        Some(request)
    }
}
