//! Prompt and response-schema builders for the synthesis service
//!
//! The service does all route reasoning; these prompts fix the contract:
//! public transport only, precise timings, bus detail, a budget range in ₹,
//! and a JSON document matching [`plan_response_schema`].

use serde_json::{Value, json};

use crate::plan::TripPlan;

/// JSON response schema shared by all plan-producing calls
///
/// Mirrors the wire format of [`TripPlan`]; the service is asked to conform
/// and the payload is still validated locally after parsing.
pub fn plan_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "tripTitle": { "type": "STRING" },
            "totalDuration": { "type": "INTEGER" },
            "estimatedTotalBudget": {
                "type": "STRING",
                "description": "Estimated total budget in Indian Rupees, formatted as a range (e.g., '₹10,000 - ₹12,000')."
            },
            "itinerary": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "day": { "type": "INTEGER" },
                        "title": { "type": "STRING" },
                        "city": { "type": "STRING" },
                        "lat": { "type": "NUMBER", "description": "Latitude of the city for the day." },
                        "lng": { "type": "NUMBER", "description": "Longitude of the city for the day." },
                        "transport": {
                            "type": "ARRAY",
                            "items": {
                                "type": "OBJECT",
                                "properties": {
                                    "mode": {
                                        "type": "STRING",
                                        "enum": ["Train", "Bus", "Metro", "Local Bus", "Ferry", "Auto Rickshaw", "Other"]
                                    },
                                    "from": { "type": "STRING" },
                                    "to": { "type": "STRING" },
                                    "details": {
                                        "type": "STRING",
                                        "description": "Bus/train number, transport corporation (e.g., KSRTC, MSRTC), bus type, and depot names."
                                    },
                                    "price": { "type": "STRING", "description": "Estimated ticket price for the journey." },
                                    "bookingLink": { "type": "STRING", "description": "URL of the official government booking site." },
                                    "departureTime": { "type": "STRING", "description": "Scheduled departure time (e.g., '08:30 AM')." },
                                    "arrivalTime": { "type": "STRING", "description": "Estimated arrival time (e.g., '01:45 PM')." }
                                },
                                "required": ["mode", "from", "to", "details"]
                            }
                        },
                        "activities": { "type": "ARRAY", "items": { "type": "STRING" } }
                    },
                    "required": ["day", "title", "city", "lat", "lng", "transport", "activities"]
                }
            }
        },
        "required": ["tripTitle", "totalDuration", "itinerary", "estimatedTotalBudget"]
    })
}

fn bus_preference_text(preferences: &[String], trip: bool) -> &'static str {
    let prefers_bus = preferences.iter().any(|p| p == "Bus") && !preferences.iter().any(|p| p == "Train");
    match (prefers_bus, trip) {
        (true, true) => {
            "The user has a strong preference for travelling by Bus. Prioritize bus routes, \
             especially state-run corporations connecting smaller, less-known destinations."
        }
        (false, true) => {
            "The user is open to all forms of public transport, but the itinerary should still \
             emphasize bus travel to explore India's interior."
        }
        (true, false) => "The user has a strong preference for travelling by Bus. Find the most direct and efficient bus route.",
        (false, false) => "The user is open to both Train and Bus options.",
    }
}

/// Prompt for generating a fresh multi-day trip
pub fn trip_prompt(from: &str, to: &str, travel_style: &str, preferences: &[String]) -> String {
    format!(
        "You are an expert travel planner for India, specializing in budget-friendly, \
         off-the-beaten-path itineraries using exclusively public transport.\n\n\
         CRITICAL INSTRUCTIONS:\n\
         1. Sequential plan: when the traveller arrives somewhere, specify the single next \
         bus/train to take. Do not list multiple options.\n\
         2. Precise timings: every transport leg MUST carry a scheduled departureTime and an \
         estimated arrivalTime. Avoid vague descriptions like 'frequent buses'; for rural routes \
         give the best known time slot (e.g., 'Morning, around 9:00 AM').\n\
         3. Bus detail: name the state transport corporation (e.g., KSRTC, MSRTC), the bus type \
         ('Express', 'Ordinary', 'Sleeper'), and the specific bus stand or depot.\n\
         4. Public transport only: trains, government buses, local transport. No flights or \
         private taxis.\n\
         5. For each inter-city Train journey provide a bookingLink to https://www.irctc.co.in.\n\
         6. Calculate an estimatedTotalBudget for the whole trip as a range in Indian Rupees \
         (e.g., '₹10,000 - ₹12,000'), matched to the travel style.\n\n\
         USER REQUEST:\n\
         Create a detailed, day-by-day itinerary from {from} to {to}. The user's preferred travel \
         style is '{travel_style}'; determine an appropriate total duration from it. {pref}\n\
         For each day provide the city, its coordinates (lat, lng), and 1-2 budget-friendly \
         activities reflecting local culture.\n\
         The response must be in JSON format.",
        pref = bus_preference_text(preferences, true),
    )
}

/// Prompt for finding a single point-to-point route (single-day document)
pub fn route_prompt(from: &str, to: &str, preferences: &[String]) -> String {
    format!(
        "You are a public transport route specialist for India, with a focus on bus travel. \
         Find the most efficient route from a starting point to a destination, detailing every \
         change and transfer.\n\n\
         CRITICAL INSTRUCTIONS:\n\
         1. Multi-leg journey: the route from {from} to {to} may require several bus or train \
         changes. Detail every leg sequentially in the transport array.\n\
         2. Precise timings: every leg MUST carry a scheduled departureTime and an estimated \
         arrivalTime. No vague terms like 'frequent service'.\n\
         3. Bus detail: state transport corporation and bus type for each bus; train number for \
         each train.\n\
         4. Provide a bookingLink to the official government booking site where applicable.\n\
         5. Public transport only: government buses and Indian Railways. No flights, private \
         taxis, or ride-sharing.\n\
         6. Single-day plan: the whole journey is one itinerary entry with day set to 1 and an \
         empty activities array.\n\
         7. Include an estimatedTotalBudget for the end-to-end journey.\n\n\
         USER REQUEST:\n\
         Find the complete public transport route from {from} to {to}. {pref}\n\
         The response must be in JSON format.",
        pref = bus_preference_text(preferences, false),
    )
}

/// Prompt for refining an existing plan with a natural-language instruction
///
/// The full current plan rides along as context; the service returns a
/// complete replacement document under the same schema.
pub fn refine_prompt(plan: &TripPlan, instruction: &str) -> String {
    let plan_json = serde_json::to_string(plan).unwrap_or_default();
    format!(
        "You are an expert travel planner for India. Given the existing itinerary below, modify \
         it based on the user's request.\n\n\
         CRITICAL INSTRUCTIONS:\n\
         1. Keep the core rules: public transport only (trains, government buses), with a strong \
         preference for buses that connect smaller towns and villages.\n\
         2. Maintain precision: state transport corporation, bus type, and bus stand names for \
         every bus; specific departureTime and arrivalTime for every leg.\n\
         3. Handle breaks: if the user adds a break or delay, recalculate the subsequent legs \
         with new, realistic timings (a 3-hour break pushes the next departure at least 3 hours \
         later).\n\
         4. Budget adjustment: if the user changes the budget, re-evaluate all costs (bus types, \
         cheaper activities, food estimates) and update estimatedTotalBudget accordingly.\n\
         5. Adhere to the exact original JSON schema.\n\n\
         USER'S REQUEST: \"{instruction}\"\n\n\
         EXISTING ITINERARY (in JSON format):\n{plan_json}",
    )
}

/// Prompt for reverse geocoding a coordinate into "City, State/Country"
pub fn geocode_prompt(lat: f64, lng: f64) -> String {
    format!(
        "What is the name of the city and state/country at latitude {lat} and longitude {lng}? \
         Respond with only the city and state/country name, in the format \"City, State/Country\". \
         For example: \"Jaipur, Rajasthan\" or \"Kathmandu, Nepal\".",
    )
}
