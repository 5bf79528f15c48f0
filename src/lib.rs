//! Yatra: a terminal planner for travelling India by public transport
//!
//! The crate is organised around one session: form input becomes a request to
//! the external plan-synthesis service, the returned itinerary is validated
//! and displayed with a synced route map, and every further edit (duration,
//! budget, free-text ask, break insertion) is one natural-language refinement
//! that replaces the plan wholesale.

pub mod cli;
pub mod config;
pub mod map;
pub mod plan;
pub mod planner;
pub mod session;
pub mod store;
pub mod tui;
