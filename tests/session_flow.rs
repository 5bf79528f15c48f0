//! Integration tests for the planning session
//!
//! These drive the session the way the runner does: submit, await a scripted
//! planner, apply the tagged result, and check what the user would see.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use yatra::plan::{DayPlan, TripPlan, build_refinement};
use yatra::planner::{PlannerClient, PlannerError};
use yatra::session::{FormKind, Session, View};
use yatra::store::{SqliteStore, TripStore};

/// Scripted planner: pops responses in order, records every call
struct ScriptedPlanner {
    responses: Mutex<Vec<Result<TripPlan, PlannerError>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedPlanner {
    fn new(responses: Vec<Result<TripPlan, PlannerError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn next(&self, call: String) -> Result<TripPlan, PlannerError> {
        self.calls.lock().unwrap().push(call);
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Err(PlannerError::EmptyResponse)
        } else {
            responses.remove(0)
        }
    }
}

#[async_trait]
impl PlannerClient for ScriptedPlanner {
    async fn synthesize_trip(
        &self,
        from: &str,
        to: &str,
        _travel_style: &str,
        _preferences: &[String],
    ) -> Result<TripPlan, PlannerError> {
        self.next(format!("trip:{}->{}", from, to))
    }

    async fn synthesize_route(
        &self,
        from: &str,
        to: &str,
        _preferences: &[String],
    ) -> Result<TripPlan, PlannerError> {
        self.next(format!("route:{}->{}", from, to))
    }

    async fn refine(&self, _plan: &TripPlan, instruction: &str) -> Result<TripPlan, PlannerError> {
        self.next(format!("refine:{}", instruction))
    }

    async fn resolve_city(&self, _lat: f64, _lng: f64) -> Result<String, PlannerError> {
        Ok("Jaipur, Rajasthan".to_string())
    }
}

fn plan_with_days(title: &str, cities: &[&str]) -> TripPlan {
    TripPlan {
        id: None,
        title: title.to_string(),
        total_duration: cities.len() as u32,
        estimated_budget: Some("₹8,000 - ₹10,000".to_string()),
        itinerary: cities
            .iter()
            .enumerate()
            .map(|(i, city)| DayPlan {
                day: i as u32 + 1,
                title: format!("Day {} in {}", i + 1, city),
                city: city.to_string(),
                lat: 20.0 + i as f64,
                lng: 75.0 + i as f64,
                transport: vec![],
                activities: vec![],
            })
            .collect(),
    }
}

#[tokio::test]
async fn test_synthesis_then_failed_refinement_keeps_plan() {
    let planner = Arc::new(ScriptedPlanner::new(vec![
        Ok(plan_with_days("Deccan loop", &["Pune", "Kolhapur", "Badami"])),
        Err(PlannerError::MalformedPlan("truncated".to_string())),
    ]));
    let mut session = Session::new();

    // First synthesis succeeds.
    session.choose_mode(FormKind::Trip);
    let epoch = session.begin_synthesis().unwrap();
    let form = session.trip_form.clone();
    let result = planner
        .synthesize_trip(&form.from, &form.to, form.style.label(), &form.preferences())
        .await;
    session.apply_result(epoch, result);
    assert_eq!(session.plan().unwrap().title, "Deccan loop");

    // Refinement fails; the plan survives and only the banner appears.
    let plan = session.plan().unwrap().clone();
    let instruction = build_refinement(&plan, 5, plan.budget_anchor(), "").unwrap();
    let epoch = session.begin_refinement().unwrap();
    let result = planner.refine(&plan, &instruction).await;
    session.apply_result(epoch, result);

    let View::Viewing { plan, refining, banner } = session.view() else {
        panic!("left viewing state");
    };
    assert_eq!(plan.title, "Deccan loop");
    assert_eq!(plan.itinerary.len(), 3);
    assert!(!refining);
    assert!(banner.is_some());

    let calls = planner.calls.lock().unwrap();
    assert_eq!(calls[0], "trip:Delhi->Goa");
    assert!(calls[1].starts_with("refine:Change the trip duration to 5 days."));
}

#[tokio::test]
async fn test_result_after_go_home_is_discarded() {
    let planner = Arc::new(ScriptedPlanner::new(vec![Ok(plan_with_days("Late", &["Goa"]))]));
    let mut session = Session::new();

    session.choose_mode(FormKind::Transport);
    let epoch = session.begin_synthesis().unwrap();
    let form = session.transport_form.clone();

    // User abandons the wait before the call lands.
    session.go_home();

    let result = planner.synthesize_route(&form.from, &form.to, &form.preferences()).await;
    session.apply_result(epoch, result);

    assert!(matches!(session.view(), View::Selecting));
    assert!(session.plan().is_none());
}

#[tokio::test]
async fn test_first_failure_returns_to_form_for_retry() {
    let planner = Arc::new(ScriptedPlanner::new(vec![
        Err(PlannerError::Timeout(std::time::Duration::from_secs(120))),
        Ok(plan_with_days("Second try", &["Mumbai"])),
    ]));
    let mut session = Session::new();

    session.choose_mode(FormKind::Transport);
    session.transport_form.to = "Nashik".to_string();
    let epoch = session.begin_synthesis().unwrap();
    let form = session.transport_form.clone();
    let result = planner.synthesize_route(&form.from, &form.to, &form.preferences()).await;
    session.apply_result(epoch, result);
    assert!(matches!(session.view(), View::SynthesisFailed { .. }));

    // Retry from the preserved form succeeds.
    session.retry_from_error();
    assert_eq!(session.transport_form.to, "Nashik");
    let epoch = session.begin_synthesis().unwrap();
    let form = session.transport_form.clone();
    let result = planner.synthesize_route(&form.from, &form.to, &form.preferences()).await;
    session.apply_result(epoch, result);
    assert_eq!(session.plan().unwrap().title, "Second try");
}

#[test]
fn test_save_and_reload_through_store() {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::open(dir.path().join("trips.db")).unwrap();
    let identity = store.sign_in().unwrap().unwrap();

    let mut session = Session::new();
    session.open_saved(plan_with_days("Ghats by bus", &["Pune", "Mahabaleshwar"]));

    let revision = session.begin_save().unwrap();
    let id = store
        .save_trip(&identity.user_id, &session.plan().unwrap().without_id())
        .unwrap();
    session.mark_saved(revision, id.clone());
    assert!(!session.can_save());

    let trips = store.list_trips(&identity.user_id).unwrap();
    assert_eq!(trips.len(), 1);
    assert_eq!(trips[0].id, id);
    assert_eq!(trips[0].plan.title, "Ghats by bus");
    assert!(trips[0].plan.validate().is_ok());
}
