//! Plan document model
//!
//! The `TripPlan` is the unit of truth for one trip or route: the complete
//! itinerary exchanged with the synthesis service, rendered to the user, and
//! saved to history. It is replaced wholesale on every successful refinement,
//! never patched in place.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

mod breaks;
mod hotels;
mod refine;

pub use breaks::{BreakRequest, MAX_BREAK_HOURS, MINUTE_STEPS};
pub use hotels::{HotelSite, hotel_search_links};
pub use refine::build_refinement;

/// Fallback budget anchor (₹) when the budget string carries no number
pub const DEFAULT_BUDGET_ANCHOR: u32 = 20_000;

/// Errors from validating a plan document
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Plan has no itinerary days")]
    EmptyItinerary,

    #[error("Day {position} is numbered {found}, expected {expected}")]
    DayOutOfOrder {
        position: usize,
        found: u32,
        expected: u32,
    },
}

/// Mode of one transport leg (closed set, fixed by the service schema)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportMode {
    Train,
    Bus,
    Metro,
    #[serde(rename = "Local Bus")]
    LocalBus,
    Ferry,
    #[serde(rename = "Auto Rickshaw")]
    AutoRickshaw,
    Other,
}

impl TransportMode {
    /// Display label matching the wire name
    pub fn label(&self) -> &'static str {
        match self {
            Self::Train => "Train",
            Self::Bus => "Bus",
            Self::Metro => "Metro",
            Self::LocalBus => "Local Bus",
            Self::Ferry => "Ferry",
            Self::AutoRickshaw => "Auto Rickshaw",
            Self::Other => "Other",
        }
    }
}

/// One point-to-point movement within a day
///
/// Times and prices are free-form display strings. The service is asked for
/// precise values but nothing here parses or sorts by them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportLeg {
    pub mode: TransportMode,
    pub from: String,
    pub to: String,
    /// Operator/class info (corporation name, bus type, depot)
    pub details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(rename = "bookingLink", skip_serializing_if = "Option::is_none")]
    pub booking_link: Option<String>,
    #[serde(rename = "departureTime", skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<String>,
    #[serde(rename = "arrivalTime", skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<String>,
}

/// One calendar day: city, transport legs in execution order, activities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayPlan {
    pub day: u32,
    pub title: String,
    pub city: String,
    /// Decimal degrees, used only for mapping, never range-checked
    pub lat: f64,
    pub lng: f64,
    pub transport: Vec<TransportLeg>,
    pub activities: Vec<String>,
}

/// The complete itinerary or route record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripPlan {
    /// Present only once persisted; `None` means unsaved, locally held
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "tripTitle")]
    pub title: String,
    #[serde(rename = "totalDuration")]
    pub total_duration: u32,
    #[serde(rename = "estimatedTotalBudget", default)]
    pub estimated_budget: Option<String>,
    pub itinerary: Vec<DayPlan>,
}

impl TripPlan {
    /// Check the structural invariants every displayed or resubmitted plan
    /// must hold: non-empty itinerary, days numbered 1..=n with no gaps.
    ///
    /// A violation means the synthesis service answered unintelligibly, so
    /// callers map it to the malformed-response error class, not a local bug.
    pub fn validate(&self) -> Result<(), PlanError> {
        debug!(days = self.itinerary.len(), "TripPlan::validate: called");
        if self.itinerary.is_empty() {
            return Err(PlanError::EmptyItinerary);
        }
        for (i, day) in self.itinerary.iter().enumerate() {
            let expected = i as u32 + 1;
            if day.day != expected {
                return Err(PlanError::DayOutOfOrder {
                    position: i,
                    found: day.day,
                    expected,
                });
            }
        }
        Ok(())
    }

    /// Numeric budget anchor for this plan (see [`budget_anchor`])
    pub fn budget_anchor(&self) -> u32 {
        budget_anchor(self.estimated_budget.as_deref())
    }

    /// Copy of this plan without a persistence id (what gets saved)
    pub fn without_id(&self) -> TripPlan {
        let mut plan = self.clone();
        plan.id = None;
        plan
    }
}

/// Extract the numeric anchor from a budget display string
///
/// Takes the first integer token found after stripping thousands separators,
/// falling back to [`DEFAULT_BUDGET_ANCHOR`]. The anchor only seeds the
/// editable budget control; the display string stays authoritative.
pub fn budget_anchor(budget: Option<&str>) -> u32 {
    let Some(budget) = budget else {
        return DEFAULT_BUDGET_ANCHOR;
    };
    let cleaned: String = budget.chars().filter(|c| *c != ',').collect();
    let digits: String = cleaned
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(DEFAULT_BUDGET_ANCHOR)
}

/// Format a rupee amount with Indian digit grouping (₹1,00,000)
///
/// The last three digits form one group, every two digits above that another.
pub fn format_inr(amount: u32) -> String {
    let digits = amount.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut grouped = String::new();
    let head_bytes = head.as_bytes();
    for (i, b) in head_bytes.iter().enumerate() {
        if i > 0 && (head_bytes.len() - i) % 2 == 0 {
            grouped.push(',');
        }
        grouped.push(*b as char);
    }
    format!("{},{}", grouped, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: u32, city: &str) -> DayPlan {
        DayPlan {
            day: n,
            title: format!("Day {} in {}", n, city),
            city: city.to_string(),
            lat: 0.0,
            lng: 0.0,
            transport: vec![],
            activities: vec![],
        }
    }

    fn plan(days: Vec<DayPlan>) -> TripPlan {
        TripPlan {
            id: None,
            title: "Test trip".to_string(),
            total_duration: days.len() as u32,
            estimated_budget: Some("₹10,000 - ₹12,000".to_string()),
            itinerary: days,
        }
    }

    #[test]
    fn test_validate_accepts_sequential_days() {
        let p = plan(vec![day(1, "Delhi"), day(2, "Agra"), day(3, "Jaipur")]);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_itinerary() {
        let p = plan(vec![]);
        assert!(matches!(p.validate(), Err(PlanError::EmptyItinerary)));
    }

    #[test]
    fn test_validate_rejects_gap_in_day_numbers() {
        let p = plan(vec![day(1, "Delhi"), day(3, "Jaipur")]);
        match p.validate() {
            Err(PlanError::DayOutOfOrder {
                position,
                found,
                expected,
            }) => {
                assert_eq!(position, 1);
                assert_eq!(found, 3);
                assert_eq!(expected, 2);
            }
            other => panic!("expected DayOutOfOrder, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_duplicate_day_numbers() {
        let p = plan(vec![day(1, "Delhi"), day(1, "Agra")]);
        assert!(matches!(p.validate(), Err(PlanError::DayOutOfOrder { .. })));
    }

    #[test]
    fn test_budget_anchor_takes_first_integer() {
        assert_eq!(budget_anchor(Some("₹10,000 - ₹12,000")), 10_000);
        assert_eq!(budget_anchor(Some("approx 8500 rupees")), 8_500);
    }

    #[test]
    fn test_budget_anchor_defaults() {
        assert_eq!(budget_anchor(None), DEFAULT_BUDGET_ANCHOR);
        assert_eq!(budget_anchor(Some("cheap")), DEFAULT_BUDGET_ANCHOR);
        assert_eq!(budget_anchor(Some("")), DEFAULT_BUDGET_ANCHOR);
    }

    #[test]
    fn test_format_inr_indian_grouping() {
        assert_eq!(format_inr(500), "500");
        assert_eq!(format_inr(8_000), "8,000");
        assert_eq!(format_inr(100_000), "1,00,000");
        assert_eq!(format_inr(12_345_678), "1,23,45,678");
    }

    #[test]
    fn test_budget_anchor_roundtrip_through_format() {
        // The control seeds from the anchor and the anchor re-derives from
        // the formatted value, so the two must always agree.
        for value in [500u32, 5_000, 20_000, 99_999, 1_00_000, 12_34_567] {
            let formatted = format!("₹{}", format_inr(value));
            assert_eq!(budget_anchor(Some(&formatted)), value);
        }
    }

    #[test]
    fn test_wire_format_field_names() {
        let p = plan(vec![day(1, "Pune")]);
        let json = serde_json::to_value(&p).unwrap();
        assert!(json.get("tripTitle").is_some());
        assert!(json.get("totalDuration").is_some());
        assert!(json.get("estimatedTotalBudget").is_some());
        assert!(json.get("id").is_none());
        assert_eq!(json["itinerary"][0]["day"], 1);
    }

    #[test]
    fn test_deserialize_service_payload() {
        let raw = r#"{
            "tripTitle": "Mumbai to Pune",
            "totalDuration": 1,
            "estimatedTotalBudget": "₹600 - ₹900",
            "itinerary": [{
                "day": 1,
                "title": "Express bus via the old highway",
                "city": "Pune",
                "lat": 18.5204,
                "lng": 73.8567,
                "transport": [{
                    "mode": "Bus",
                    "from": "Mumbai Central",
                    "to": "Pune Swargate",
                    "details": "MSRTC Shivneri, AC seater",
                    "departureTime": "08:30 AM",
                    "arrivalTime": "12:15 PM"
                }],
                "activities": []
            }]
        }"#;
        let p: TripPlan = serde_json::from_str(raw).unwrap();
        assert!(p.validate().is_ok());
        assert_eq!(p.itinerary[0].transport[0].mode, TransportMode::Bus);
        assert_eq!(p.budget_anchor(), 600);
    }

    #[test]
    fn test_without_id_strips_persistence_id() {
        let mut p = plan(vec![day(1, "Pune")]);
        p.id = Some("abc".to_string());
        assert!(p.without_id().id.is_none());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn anchor_of_formatted_value_is_identity(value in 1u32..100_000_000) {
                let formatted = format!("₹{}", format_inr(value));
                prop_assert_eq!(budget_anchor(Some(&formatted)), value);
            }

            #[test]
            fn anchor_never_panics_on_arbitrary_text(s in ".{0,64}") {
                let _ = budget_anchor(Some(&s));
            }

            #[test]
            fn grouping_preserves_digits(value in 0u32..u32::MAX) {
                let grouped = format_inr(value);
                let digits: String = grouped.chars().filter(|c| *c != ',').collect();
                prop_assert_eq!(digits, value.to_string());
            }
        }
    }
}
