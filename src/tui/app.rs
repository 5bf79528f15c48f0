//! TUI application state and key handling
//!
//! Pure state transitions: keys mutate the [`Session`] and queue pending
//! calls; the runner drains the queue and owns all I/O. No rendering here.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::seq::IndexedRandom;
use tracing::debug;

use crate::map::{self, MapScene};
use crate::plan::{BreakRequest, HotelSite, TripPlan, build_refinement, hotel_search_links};
use crate::session::{Epoch, FormKind, Revision, Session, View};
use crate::store::SavedTrip;

/// Words for the loading indicator while the service thinks
pub const LOADING_WORDS: &[&str] = &[
    "Charting",
    "Routing",
    "Timetabling",
    "Plotting",
    "Wandering",
    "Mapping",
    "Scheduling",
    "Meandering",
];

/// Asynchronous work queued by key handling, drained by the runner
#[derive(Debug)]
pub enum PendingCall {
    Trip {
        epoch: Epoch,
        from: String,
        to: String,
        style: String,
        preferences: Vec<String>,
    },
    Route {
        epoch: Epoch,
        from: String,
        to: String,
        preferences: Vec<String>,
    },
    Refine {
        epoch: Epoch,
        plan: TripPlan,
        instruction: String,
    },
    Locate {
        lat: f64,
        lng: f64,
    },
    Save {
        revision: Revision,
        plan: TripPlan,
    },
    History,
}

/// Focusable controls on the trip form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripField {
    From,
    To,
    Style,
    Train,
    Bus,
}

impl TripField {
    fn next(self) -> Self {
        match self {
            Self::From => Self::To,
            Self::To => Self::Style,
            Self::Style => Self::Train,
            Self::Train => Self::Bus,
            Self::Bus => Self::From,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::From => Self::Bus,
            Self::To => Self::From,
            Self::Style => Self::To,
            Self::Train => Self::Style,
            Self::Bus => Self::Train,
        }
    }
}

/// Focusable controls on the route form (no travel style)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteField {
    From,
    To,
    Train,
    Bus,
}

impl RouteField {
    fn next(self) -> Self {
        match self {
            Self::From => Self::To,
            Self::To => Self::Train,
            Self::Train => Self::Bus,
            Self::Bus => Self::From,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::From => Self::Bus,
            Self::To => Self::From,
            Self::Train => Self::To,
            Self::Bus => Self::Train,
        }
    }
}

/// Refinement panel controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefineFocus {
    Days,
    Budget,
    Text,
}

/// State of the refinement overlay
///
/// Seeded from the current plan when opened, so "unchanged" comparisons in
/// the builder see the same values the user sees.
#[derive(Debug, Clone)]
pub struct RefinePanel {
    pub days: u32,
    pub budget: u32,
    pub text: String,
    pub focus: RefineFocus,
}

/// Budget control range and step, in rupees
const BUDGET_MIN: u32 = 5_000;
const BUDGET_MAX: u32 = 100_000;
const BUDGET_STEP: u32 = 1_000;

/// State of the break-insertion modal
#[derive(Debug, Clone)]
pub struct BreakModal {
    pub request: BreakRequest,
    pub minutes_focused: bool,
}

/// State of the hotel-links overlay
#[derive(Debug, Clone)]
pub struct HotelPanel {
    pub city: String,
    pub links: Vec<HotelSite>,
}

/// Exclusive overlays above the main view
#[derive(Debug, Clone)]
pub enum Overlay {
    None,
    Refine(RefinePanel),
    Break(BreakModal),
    Hotels(HotelPanel),
    History,
}

/// Items on the mode-selection screen, in display order
pub const SELECTION_ITEMS: [&str; 3] = ["Plan a Trip", "Find a Route", "Trip History"];

/// TUI application state
pub struct App {
    pub session: Session,
    pub map_scene: MapScene,
    pub overlay: Overlay,
    pub pending: Vec<PendingCall>,
    pub should_quit: bool,

    pub selection_cursor: usize,
    pub trip_focus: TripField,
    pub route_focus: RouteField,
    /// Selected day in the itinerary view (index into the itinerary)
    pub selected_day: usize,
    pub history: Option<Vec<SavedTrip>>,
    pub history_cursor: usize,

    pub loading_word: &'static str,
    pub spinner_frame: usize,

    /// Home coordinates from config, for the locate affordance
    home: (f64, f64),
}

impl App {
    pub fn new(home: (f64, f64)) -> Self {
        Self {
            session: Session::new(),
            map_scene: MapScene::new(),
            overlay: Overlay::None,
            pending: Vec::new(),
            should_quit: false,
            selection_cursor: 0,
            trip_focus: TripField::From,
            route_focus: RouteField::From,
            selected_day: 0,
            history: None,
            history_cursor: 0,
            loading_word: LOADING_WORDS[0],
            spinner_frame: 0,
            home,
        }
    }

    /// Advance the spinner
    pub fn tick(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
    }

    /// Re-derive map scene and clamp cursors after the plan changed
    pub fn refresh_plan_artifacts(&mut self) {
        let itinerary = self.session.plan().map(|p| p.itinerary.clone()).unwrap_or_default();
        map::sync(&mut self.map_scene, &itinerary);
        if !itinerary.is_empty() {
            self.selected_day = self.selected_day.min(itinerary.len() - 1);
        } else {
            self.selected_day = 0;
        }
    }

    /// Fill the active form's origin field from a resolved city name
    pub fn apply_located_city(&mut self, city: String) {
        debug!(%city, "App::apply_located_city: called");
        self.session.locating = false;
        match self.session.view() {
            View::TripForm => self.session.trip_form.from = city,
            View::TransportForm => self.session.transport_form.from = city,
            _ => {}
        }
    }

    pub fn set_history(&mut self, trips: Vec<SavedTrip>) {
        self.history_cursor = 0;
        self.history = Some(trips);
    }

    fn pick_loading_word(&mut self) {
        self.loading_word = LOADING_WORDS
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(LOADING_WORDS[0]);
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match &self.overlay {
            Overlay::Refine(_) => self.handle_refine_key(key),
            Overlay::Break(_) => self.handle_break_key(key),
            Overlay::Hotels(_) => self.handle_hotels_key(key),
            Overlay::History => self.handle_history_key(key),
            Overlay::None => match self.session.view() {
                View::Selecting => self.handle_selection_key(key),
                View::TripForm => self.handle_trip_form_key(key),
                View::TransportForm => self.handle_transport_form_key(key),
                View::Synthesizing { .. } => self.handle_loading_key(key),
                View::SynthesisFailed { .. } => self.handle_error_key(key),
                View::Viewing { .. } => self.handle_viewing_key(key),
            },
        }
    }

    fn handle_selection_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => {
                self.selection_cursor = self.selection_cursor.checked_sub(1).unwrap_or(SELECTION_ITEMS.len() - 1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selection_cursor = (self.selection_cursor + 1) % SELECTION_ITEMS.len();
            }
            KeyCode::Enter => match self.selection_cursor {
                0 => self.session.choose_mode(FormKind::Trip),
                1 => self.session.choose_mode(FormKind::Transport),
                _ => self.open_history(),
            },
            _ => {}
        }
    }

    fn open_history(&mut self) {
        debug!("App::open_history: called");
        self.history = None;
        self.overlay = Overlay::History;
        self.pending.push(PendingCall::History);
    }

    fn start_locate(&mut self) {
        if self.session.locating {
            return;
        }
        self.session.locating = true;
        let (lat, lng) = self.home;
        self.pending.push(PendingCall::Locate { lat, lng });
    }

    fn handle_trip_form_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('l') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.start_locate();
            return;
        }
        match key.code {
            KeyCode::Esc => self.session.go_home(),
            KeyCode::Tab | KeyCode::Down => self.trip_focus = self.trip_focus.next(),
            KeyCode::BackTab | KeyCode::Up => self.trip_focus = self.trip_focus.prev(),
            KeyCode::Enter => self.submit_trip_form(),
            KeyCode::Left if self.trip_focus == TripField::Style => {
                self.session.trip_form.style = self.session.trip_form.style.prev();
            }
            KeyCode::Right if self.trip_focus == TripField::Style => {
                self.session.trip_form.style = self.session.trip_form.style.next();
            }
            KeyCode::Char(' ') if self.trip_focus == TripField::Train => {
                self.session.trip_form.prefer_train = !self.session.trip_form.prefer_train;
            }
            KeyCode::Char(' ') if self.trip_focus == TripField::Bus => {
                self.session.trip_form.prefer_bus = !self.session.trip_form.prefer_bus;
            }
            KeyCode::Char(c) => match self.trip_focus {
                TripField::From => self.session.trip_form.from.push(c),
                TripField::To => self.session.trip_form.to.push(c),
                _ => {}
            },
            KeyCode::Backspace => match self.trip_focus {
                TripField::From => {
                    self.session.trip_form.from.pop();
                }
                TripField::To => {
                    self.session.trip_form.to.pop();
                }
                _ => {}
            },
            _ => {}
        }
    }

    fn submit_trip_form(&mut self) {
        let form = self.session.trip_form.clone();
        let Some(epoch) = self.session.begin_synthesis() else {
            return;
        };
        self.pick_loading_word();
        let style = form.style.label().to_string();
        let preferences = form.preferences();
        self.pending.push(PendingCall::Trip {
            epoch,
            from: form.from,
            to: form.to,
            style,
            preferences,
        });
    }

    fn handle_transport_form_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('l') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.start_locate();
            return;
        }
        match key.code {
            KeyCode::Esc => self.session.go_home(),
            KeyCode::Tab | KeyCode::Down => self.route_focus = self.route_focus.next(),
            KeyCode::BackTab | KeyCode::Up => self.route_focus = self.route_focus.prev(),
            KeyCode::Enter => self.submit_transport_form(),
            KeyCode::Char(' ') if self.route_focus == RouteField::Train => {
                self.session.transport_form.prefer_train = !self.session.transport_form.prefer_train;
            }
            KeyCode::Char(' ') if self.route_focus == RouteField::Bus => {
                self.session.transport_form.prefer_bus = !self.session.transport_form.prefer_bus;
            }
            KeyCode::Char(c) => match self.route_focus {
                RouteField::From => self.session.transport_form.from.push(c),
                RouteField::To => self.session.transport_form.to.push(c),
                _ => {}
            },
            KeyCode::Backspace => match self.route_focus {
                RouteField::From => {
                    self.session.transport_form.from.pop();
                }
                RouteField::To => {
                    self.session.transport_form.to.pop();
                }
                _ => {}
            },
            _ => {}
        }
    }

    fn submit_transport_form(&mut self) {
        let form = self.session.transport_form.clone();
        let Some(epoch) = self.session.begin_synthesis() else {
            return;
        };
        self.pick_loading_word();
        let preferences = form.preferences();
        self.pending.push(PendingCall::Route {
            epoch,
            from: form.from,
            to: form.to,
            preferences,
        });
    }

    fn handle_loading_key(&mut self, key: KeyEvent) {
        // The in-flight call cannot be aborted, but the user can abandon it;
        // the epoch bump makes the eventual result land dead.
        if key.code == KeyCode::Esc {
            self.session.go_home();
        }
    }

    fn handle_error_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('r') | KeyCode::Enter => self.session.retry_from_error(),
            KeyCode::Esc | KeyCode::Char('q') => self.session.go_home(),
            _ => {}
        }
    }

    fn handle_viewing_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.session.go_home();
                self.refresh_plan_artifacts();
            }
            KeyCode::Char('x') => self.session.dismiss_banner(),
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_day = self.selected_day.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let days = self.session.plan().map(|p| p.itinerary.len()).unwrap_or(0);
                if days > 0 {
                    self.selected_day = (self.selected_day + 1).min(days - 1);
                }
            }
            KeyCode::Char('r') if !self.session.is_loading() => self.open_refine_panel(),
            KeyCode::Char('b') if !self.session.is_loading() => self.open_break_modal(),
            KeyCode::Char('h') => self.open_hotels(),
            KeyCode::Char('s') => {
                if let Some(plan) = self.session.plan().map(TripPlan::without_id)
                    && let Some(revision) = self.session.begin_save()
                {
                    self.pending.push(PendingCall::Save { revision, plan });
                }
            }
            _ => {}
        }
    }

    fn open_refine_panel(&mut self) {
        let Some(plan) = self.session.plan() else {
            return;
        };
        self.overlay = Overlay::Refine(RefinePanel {
            days: plan.total_duration,
            budget: plan.budget_anchor(),
            text: String::new(),
            focus: RefineFocus::Days,
        });
    }

    fn open_hotels(&mut self) {
        let Some(plan) = self.session.plan() else {
            return;
        };
        let Some(day) = plan.itinerary.get(self.selected_day) else {
            return;
        };
        self.overlay = Overlay::Hotels(HotelPanel {
            city: day.city.clone(),
            links: hotel_search_links(&day.city),
        });
    }

    fn handle_hotels_key(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('h')) {
            self.overlay = Overlay::None;
        }
    }

    fn open_break_modal(&mut self) {
        let Some(plan) = self.session.plan() else {
            return;
        };
        let Some(day) = plan.itinerary.get(self.selected_day) else {
            return;
        };
        self.overlay = Overlay::Break(BreakModal {
            request: BreakRequest::new(day.day, &day.city),
            minutes_focused: false,
        });
    }

    fn handle_refine_key(&mut self, key: KeyEvent) {
        let Overlay::Refine(panel) = &mut self.overlay else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.overlay = Overlay::None,
            KeyCode::Enter => self.submit_refinement(),
            KeyCode::Tab | KeyCode::Down => {
                panel.focus = match panel.focus {
                    RefineFocus::Days => RefineFocus::Budget,
                    RefineFocus::Budget => RefineFocus::Text,
                    RefineFocus::Text => RefineFocus::Days,
                };
            }
            KeyCode::BackTab | KeyCode::Up => {
                panel.focus = match panel.focus {
                    RefineFocus::Days => RefineFocus::Text,
                    RefineFocus::Budget => RefineFocus::Days,
                    RefineFocus::Text => RefineFocus::Budget,
                };
            }
            KeyCode::Left => match panel.focus {
                RefineFocus::Days => panel.days = panel.days.saturating_sub(1).max(1),
                RefineFocus::Budget => {
                    // An out-of-range seed snaps into range on first adjust.
                    panel.budget = panel.budget.saturating_sub(BUDGET_STEP).clamp(BUDGET_MIN, BUDGET_MAX);
                }
                RefineFocus::Text => {}
            },
            KeyCode::Right => match panel.focus {
                RefineFocus::Days => panel.days = (panel.days + 1).min(30),
                RefineFocus::Budget => {
                    panel.budget = panel.budget.saturating_add(BUDGET_STEP).clamp(BUDGET_MIN, BUDGET_MAX);
                }
                RefineFocus::Text => {}
            },
            KeyCode::Char(c) if panel.focus == RefineFocus::Text => panel.text.push(c),
            KeyCode::Backspace if panel.focus == RefineFocus::Text => {
                panel.text.pop();
            }
            _ => {}
        }
    }

    fn submit_refinement(&mut self) {
        let Overlay::Refine(panel) = &self.overlay else {
            return;
        };
        let panel = panel.clone();
        let Some(plan) = self.session.plan() else {
            self.overlay = Overlay::None;
            return;
        };
        // No deltas and no text: close without a round-trip.
        let Some(instruction) = build_refinement(plan, panel.days, panel.budget, &panel.text) else {
            debug!("App::submit_refinement: no-op, closing panel");
            self.overlay = Overlay::None;
            return;
        };
        let plan = plan.clone();
        let Some(epoch) = self.session.begin_refinement() else {
            return;
        };
        self.pick_loading_word();
        self.pending.push(PendingCall::Refine { epoch, plan, instruction });
        self.overlay = Overlay::None;
    }

    fn handle_break_key(&mut self, key: KeyEvent) {
        let Overlay::Break(modal) = &mut self.overlay else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.overlay = Overlay::None,
            KeyCode::Tab | KeyCode::Up | KeyCode::Down => {
                modal.minutes_focused = !modal.minutes_focused;
            }
            KeyCode::Left => {
                if modal.minutes_focused {
                    modal.request.decrement_minutes();
                } else {
                    modal.request.decrement_hours();
                }
            }
            KeyCode::Right => {
                if modal.minutes_focused {
                    modal.request.increment_minutes();
                } else {
                    modal.request.increment_hours();
                }
            }
            KeyCode::Enter => self.confirm_break(),
            // Hand off to the hotel links for the same day's city.
            KeyCode::Char('h') => {
                let city = modal.request.city.clone();
                self.overlay = Overlay::Hotels(HotelPanel {
                    links: hotel_search_links(&city),
                    city,
                });
            }
            _ => {}
        }
    }

    fn confirm_break(&mut self) {
        let Overlay::Break(modal) = &self.overlay else {
            return;
        };
        // Zero-length break: the confirm control is inert, modal stays open.
        let Some(instruction) = modal.request.instruction() else {
            return;
        };
        let Some(plan) = self.session.plan().cloned() else {
            self.overlay = Overlay::None;
            return;
        };
        let Some(epoch) = self.session.begin_refinement() else {
            return;
        };
        self.pick_loading_word();
        self.pending.push(PendingCall::Refine { epoch, plan, instruction });
        // Modal closes immediately; the result shows up via the session.
        self.overlay = Overlay::None;
    }

    fn handle_history_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.overlay = Overlay::None,
            KeyCode::Up | KeyCode::Char('k') => {
                self.history_cursor = self.history_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let len = self.history.as_ref().map(|h| h.len()).unwrap_or(0);
                if len > 0 {
                    self.history_cursor = (self.history_cursor + 1).min(len - 1);
                }
            }
            KeyCode::Enter => {
                let plan = self
                    .history
                    .as_ref()
                    .and_then(|h| h.get(self.history_cursor))
                    .map(|t| t.plan.clone());
                if let Some(plan) = plan {
                    self.session.open_saved(plan);
                    self.overlay = Overlay::None;
                    self.refresh_plan_artifacts();
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::DayPlan;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn sample_plan() -> TripPlan {
        TripPlan {
            id: None,
            title: "Konkan coast".to_string(),
            total_duration: 3,
            estimated_budget: Some("₹6,000 - ₹8,000".to_string()),
            itinerary: (1..=3)
                .map(|n| DayPlan {
                    day: n,
                    title: format!("Day {}", n),
                    city: ["Mumbai", "Ratnagiri", "Goa"][(n - 1) as usize].to_string(),
                    lat: 18.0 - n as f64,
                    lng: 73.0,
                    transport: vec![],
                    activities: vec![],
                })
                .collect(),
        }
    }

    fn app_viewing() -> App {
        let mut app = App::new((28.6, 77.2));
        app.session.choose_mode(FormKind::Trip);
        let epoch = app.session.begin_synthesis().unwrap();
        app.session.apply_result(epoch, Ok(sample_plan()));
        app.refresh_plan_artifacts();
        app
    }

    #[test]
    fn test_selection_enter_opens_trip_form() {
        let mut app = App::new((0.0, 0.0));
        app.handle_key(key(KeyCode::Enter));
        assert!(matches!(app.session.view(), View::TripForm));
    }

    #[test]
    fn test_trip_submit_queues_call_and_gates() {
        let mut app = App::new((0.0, 0.0));
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Enter));
        assert!(app.session.is_loading());
        assert_eq!(app.pending.len(), 1);
        match &app.pending[0] {
            PendingCall::Trip { from, to, style, preferences, .. } => {
                assert_eq!(from, "Delhi");
                assert_eq!(to, "Goa");
                assert_eq!(style, "Balanced");
                assert_eq!(preferences, &["Train", "Bus"]);
            }
            other => panic!("expected trip call, got {:?}", other),
        }

        // Submit while loading queues nothing further.
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.pending.len(), 1);
    }

    #[test]
    fn test_form_typing_edits_focused_field() {
        let mut app = App::new((0.0, 0.0));
        app.handle_key(key(KeyCode::Enter));
        app.session.trip_form.from.clear();
        app.handle_key(key(KeyCode::Char('P')));
        app.handle_key(key(KeyCode::Char('u')));
        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.session.trip_form.from, "P");
    }

    #[test]
    fn test_unchecking_both_prefs_blocks_submit() {
        let mut app = App::new((0.0, 0.0));
        app.handle_key(key(KeyCode::Enter));
        app.session.trip_form.prefer_train = false;
        app.session.trip_form.prefer_bus = false;
        app.handle_key(key(KeyCode::Enter));
        assert!(app.pending.is_empty());
        assert!(!app.session.is_loading());
    }

    #[test]
    fn test_noop_refinement_closes_without_call() {
        let mut app = app_viewing();
        app.handle_key(key(KeyCode::Char('r')));
        assert!(matches!(app.overlay, Overlay::Refine(_)));
        // Nothing changed, free text empty.
        app.handle_key(key(KeyCode::Enter));
        assert!(matches!(app.overlay, Overlay::None));
        assert!(app.pending.is_empty());
        assert!(!app.session.is_loading());
    }

    #[test]
    fn test_changed_duration_queues_refinement() {
        let mut app = app_viewing();
        app.handle_key(key(KeyCode::Char('r')));
        app.handle_key(key(KeyCode::Right)); // days 3 -> 4
        app.handle_key(key(KeyCode::Enter));
        assert!(matches!(app.overlay, Overlay::None));
        assert!(app.session.is_loading());
        match &app.pending[0] {
            PendingCall::Refine { instruction, .. } => {
                assert!(instruction.contains("Change the trip duration to 4 days"));
            }
            other => panic!("expected refine call, got {:?}", other),
        }
    }

    #[test]
    fn test_route_submit_queues_call_and_gates() {
        let mut app = App::new((0.0, 0.0));
        app.handle_key(key(KeyCode::Char('j')));
        app.handle_key(key(KeyCode::Enter)); // route form
        app.handle_key(key(KeyCode::Enter)); // submit with defaults
        assert!(app.session.is_loading());
        assert_eq!(app.pending.len(), 1);
        match &app.pending[0] {
            PendingCall::Route { from, to, preferences, .. } => {
                assert_eq!(from, "Mumbai");
                assert_eq!(to, "Pune");
                assert_eq!(preferences, &["Train", "Bus"]);
            }
            other => panic!("expected route call, got {:?}", other),
        }

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.pending.len(), 1);
    }

    #[test]
    fn test_budget_adjustment_steps_and_clamps() {
        let mut app = app_viewing();
        app.handle_key(key(KeyCode::Char('r')));
        app.handle_key(key(KeyCode::Tab)); // focus budget
        // Anchor of "₹6,000 - ₹8,000" is 6000; one step down hits the floor.
        app.handle_key(key(KeyCode::Left));
        app.handle_key(key(KeyCode::Left));
        let Overlay::Refine(panel) = &app.overlay else {
            panic!("refine panel closed");
        };
        assert_eq!(panel.budget, BUDGET_MIN);

        app.handle_key(key(KeyCode::Right));
        let Overlay::Refine(panel) = &mut app.overlay else {
            panic!("refine panel closed");
        };
        assert_eq!(panel.budget, BUDGET_MIN + BUDGET_STEP);

        panel.budget = BUDGET_MAX;
        app.handle_key(key(KeyCode::Right));
        let Overlay::Refine(panel) = &app.overlay else {
            panic!("refine panel closed");
        };
        assert_eq!(panel.budget, BUDGET_MAX);
    }

    #[test]
    fn test_hotels_overlay_shows_selected_day_city() {
        let mut app = app_viewing();
        app.handle_key(key(KeyCode::Char('j'))); // day 2, Ratnagiri
        app.handle_key(key(KeyCode::Char('h')));
        let Overlay::Hotels(panel) = &app.overlay else {
            panic!("expected hotel links, got {:?}", app.overlay);
        };
        assert_eq!(panel.city, "Ratnagiri");
        assert_eq!(panel.links.len(), 4);
        assert!(panel.links[0].url.contains("Ratnagiri"));

        app.handle_key(key(KeyCode::Esc));
        assert!(matches!(app.overlay, Overlay::None));
        // Closing the overlay never touches the plan.
        assert_eq!(app.session.plan().unwrap().title, "Konkan coast");
    }

    #[test]
    fn test_break_modal_hands_off_to_hotels() {
        let mut app = app_viewing();
        app.handle_key(key(KeyCode::Char('b')));
        app.handle_key(key(KeyCode::Char('h')));
        let Overlay::Hotels(panel) = &app.overlay else {
            panic!("expected hotel links, got {:?}", app.overlay);
        };
        assert_eq!(panel.city, "Mumbai");
        assert!(app.pending.is_empty());
    }

    #[test]
    fn test_break_modal_confirm_inert_at_zero() {
        let mut app = app_viewing();
        app.handle_key(key(KeyCode::Char('j'))); // select day 2
        app.handle_key(key(KeyCode::Char('b')));
        // Step hours down to zero: default 2 -> 1 -> 0.
        app.handle_key(key(KeyCode::Left));
        app.handle_key(key(KeyCode::Left));
        app.handle_key(key(KeyCode::Enter));
        // Still open, nothing queued.
        assert!(matches!(app.overlay, Overlay::Break(_)));
        assert!(app.pending.is_empty());
    }

    #[test]
    fn test_break_modal_confirm_emits_exact_instruction() {
        let mut app = app_viewing();
        app.handle_key(key(KeyCode::Char('j'))); // day 2, Ratnagiri
        app.handle_key(key(KeyCode::Char('b')));
        app.handle_key(key(KeyCode::Enter));
        assert!(matches!(app.overlay, Overlay::None));
        match &app.pending[0] {
            PendingCall::Refine { instruction, .. } => {
                assert_eq!(
                    instruction,
                    "On Day 2 in Ratnagiri, add a break of 2 hours. Then, recalculate the rest \
                     of the trip accordingly, updating departure times for subsequent travel."
                );
            }
            other => panic!("expected refine call, got {:?}", other),
        }
    }

    #[test]
    fn test_save_key_inert_once_saved() {
        let mut app = app_viewing();
        app.handle_key(key(KeyCode::Char('s')));
        assert!(app.session.saving);
        assert_eq!(app.pending.len(), 1);

        app.pending.clear();
        let revision = app.session.plan_revision();
        app.session.mark_saved(revision, "t1".to_string());
        app.handle_key(key(KeyCode::Char('s')));
        assert!(app.pending.is_empty());
        assert!(!app.session.saving);
    }

    #[test]
    fn test_locate_sets_flag_and_fills_origin() {
        let mut app = App::new((28.6, 77.2));
        app.handle_key(key(KeyCode::Enter)); // trip form
        app.handle_key(KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL));
        assert!(app.session.locating);
        assert!(matches!(app.pending[0], PendingCall::Locate { .. }));
        // Locate does not gate planner submits.
        assert!(!app.session.is_loading());

        app.apply_located_city("Jaipur, Rajasthan".to_string());
        assert!(!app.session.locating);
        assert_eq!(app.session.trip_form.from, "Jaipur, Rajasthan");
    }

    #[test]
    fn test_map_scene_follows_plan() {
        let app = app_viewing();
        assert_eq!(app.map_scene.markers.len(), 3);
        assert_eq!(app.map_scene.route.len(), 3);
    }

    #[test]
    fn test_esc_from_viewing_goes_home_and_clears_scene_source() {
        let mut app = app_viewing();
        app.handle_key(key(KeyCode::Esc));
        assert!(matches!(app.session.view(), View::Selecting));
        assert!(app.session.plan().is_none());
    }

    #[test]
    fn test_history_enter_opens_saved_plan() {
        let mut app = App::new((0.0, 0.0));
        app.selection_cursor = 2;
        app.handle_key(key(KeyCode::Enter));
        assert!(matches!(app.overlay, Overlay::History));
        assert!(matches!(app.pending[0], PendingCall::History));

        let mut plan = sample_plan();
        plan.id = Some("t1".to_string());
        app.set_history(vec![crate::store::SavedTrip {
            id: "t1".to_string(),
            saved_at: chrono::Utc::now(),
            plan,
        }]);
        app.handle_key(key(KeyCode::Enter));
        assert!(matches!(app.overlay, Overlay::None));
        assert_eq!(app.session.plan().unwrap().title, "Konkan coast");
        assert!(!app.session.can_save());
    }
}
