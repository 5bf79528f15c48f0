//! Plan session state machine
//!
//! Owns the current view, the current plan (or none), error state, and the
//! in-flight flags, and decides how results from the synthesis service apply.
//! The view is one tagged union so illegal combinations (loading together
//! with a blocking error, a banner without a plan) cannot be represented.
//!
//! Asynchronous results are tagged with the session epoch at dispatch time;
//! going home bumps the epoch, so a late response from an abandoned session
//! can never resurrect a stale plan.

use tracing::{debug, warn};

use crate::plan::TripPlan;
use crate::planner::PlannerError;

mod forms;

pub use forms::{TransportFormState, TravelStyle, TripFormState};

/// Which form a synthesis call originated from
///
/// Failures return to the originating form with its inputs intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Trip,
    Transport,
}

/// What the session is currently showing
#[derive(Debug, Clone)]
pub enum View {
    /// Mode-selection screen
    Selecting,
    /// Trip planning form
    TripForm,
    /// Point-to-point route form
    TransportForm,
    /// First synthesis in flight, nothing to show but a loading indicator
    Synthesizing { origin: FormKind },
    /// First synthesis failed with no plan to fall back to
    SynthesisFailed { origin: FormKind, message: String },
    /// A plan is held and displayed
    Viewing {
        plan: TripPlan,
        /// Refinement in flight; the plan stays visible underneath
        refining: bool,
        /// Dismissible non-blocking error banner
        banner: Option<String>,
    },
}

/// Monotonic id for one stay in the planning flow
pub type Epoch = u64;

/// Monotonic id for one plan document held by the session
///
/// Bumped every time the viewed plan is replaced wholesale. A save result
/// tagged with an older revision belongs to a document no longer on screen.
pub type Revision = u64;

/// The session state machine
pub struct Session {
    view: View,
    epoch: Epoch,
    plan_revision: Revision,
    pub trip_form: TripFormState,
    pub transport_form: TransportFormState,
    /// Reverse-geocode lookup in flight; independent of the main loading gate
    pub locating: bool,
    /// Save-to-history in flight; independent of the main loading gate
    pub saving: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            view: View::Selecting,
            epoch: 0,
            plan_revision: 0,
            trip_form: TripFormState::default(),
            transport_form: TransportFormState::default(),
            locating: false,
            saving: false,
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn plan_revision(&self) -> Revision {
        self.plan_revision
    }

    /// Current plan, if one is held
    pub fn plan(&self) -> Option<&TripPlan> {
        match &self.view {
            View::Viewing { plan, .. } => Some(plan),
            _ => None,
        }
    }

    /// True while a synthesis or refinement call is in flight
    ///
    /// The sole gate against duplicate submits: every submit-triggering
    /// control is inert while this holds.
    pub fn is_loading(&self) -> bool {
        matches!(
            self.view,
            View::Synthesizing { .. } | View::Viewing { refining: true, .. }
        )
    }

    /// Saving is offered only for an unsaved plan with no save in flight
    pub fn can_save(&self) -> bool {
        !self.saving && self.plan().is_some_and(|p| p.id.is_none())
    }

    // Transitions

    /// Mode choice from the selection screen
    pub fn choose_mode(&mut self, kind: FormKind) {
        debug!(?kind, "Session::choose_mode: called");
        if !matches!(self.view, View::Selecting) {
            return;
        }
        self.view = match kind {
            FormKind::Trip => View::TripForm,
            FormKind::Transport => View::TransportForm,
        };
    }

    /// Submit the current form; returns the epoch to tag the async call with
    ///
    /// `None` means the submit was refused: wrong view, invalid form, or a
    /// call already in flight.
    pub fn begin_synthesis(&mut self) -> Option<Epoch> {
        debug!(epoch = self.epoch, "Session::begin_synthesis: called");
        if self.is_loading() {
            return None;
        }
        let origin = match &self.view {
            View::TripForm if self.trip_form.can_submit() => FormKind::Trip,
            View::TransportForm if self.transport_form.can_submit() => FormKind::Transport,
            _ => return None,
        };
        self.view = View::Synthesizing { origin };
        Some(self.epoch)
    }

    /// Start a refinement of the currently viewed plan
    ///
    /// The caller builds the instruction first; an empty instruction is a
    /// no-op decided before this point. Returns the epoch tag, or `None` if
    /// no plan is held or a call is already in flight.
    pub fn begin_refinement(&mut self) -> Option<Epoch> {
        debug!(epoch = self.epoch, "Session::begin_refinement: called");
        match &mut self.view {
            View::Viewing { refining, banner, .. } if !*refining => {
                *refining = true;
                *banner = None;
                Some(self.epoch)
            }
            _ => None,
        }
    }

    /// Apply a finished synthesis or refinement result
    ///
    /// Results tagged with an older epoch are discarded outright.
    pub fn apply_result(&mut self, epoch: Epoch, result: Result<TripPlan, PlannerError>) {
        debug!(epoch, current = self.epoch, ok = result.is_ok(), "Session::apply_result: called");
        if epoch != self.epoch {
            warn!(epoch, current = self.epoch, "Discarding stale planner result");
            return;
        }
        match &mut self.view {
            View::Synthesizing { origin } => match result {
                Ok(plan) => {
                    self.plan_revision += 1;
                    self.view = View::Viewing {
                        plan,
                        refining: false,
                        banner: None,
                    };
                }
                Err(e) => {
                    let origin = *origin;
                    self.view = View::SynthesisFailed {
                        origin,
                        message: e.user_message(),
                    };
                }
            },
            View::Viewing { plan, refining, banner } if *refining => {
                *refining = false;
                match result {
                    Ok(new_plan) => {
                        *plan = new_plan;
                        self.plan_revision += 1;
                    }
                    // The prior plan is never discarded by a failed refinement.
                    Err(e) => *banner = Some(e.user_message()),
                }
            }
            _ => {
                warn!("Planner result arrived with no call in flight, ignoring");
            }
        }
    }

    /// Retry after a blocking error: back to the originating form
    ///
    /// Form inputs were never touched, so the user resubmits from where
    /// they left off.
    pub fn retry_from_error(&mut self) {
        debug!("Session::retry_from_error: called");
        if let View::SynthesisFailed { origin, .. } = &self.view {
            self.view = match *origin {
                FormKind::Trip => View::TripForm,
                FormKind::Transport => View::TransportForm,
            };
        }
    }

    /// Dismiss the non-blocking banner; the plan stays
    pub fn dismiss_banner(&mut self) {
        debug!("Session::dismiss_banner: called");
        if let View::Viewing { banner, .. } = &mut self.view {
            *banner = None;
        }
    }

    /// Return to the selection screen from anywhere
    ///
    /// Clears the plan and all error state, resets the forms, and bumps the
    /// epoch so any in-flight result lands dead.
    pub fn go_home(&mut self) {
        debug!(epoch = self.epoch, "Session::go_home: called");
        self.epoch += 1;
        self.view = View::Selecting;
        self.trip_form = TripFormState::default();
        self.transport_form = TransportFormState::default();
        self.locating = false;
        self.saving = false;
    }

    /// Start saving the viewed plan; returns the revision to tag the save with
    ///
    /// `None` means saving is not offered right now: no plan, already saved,
    /// or a save already in flight.
    pub fn begin_save(&mut self) -> Option<Revision> {
        debug!(revision = self.plan_revision, "Session::begin_save: called");
        if !self.can_save() {
            return None;
        }
        self.saving = true;
        Some(self.plan_revision)
    }

    /// Stamp the store-assigned id onto the viewed plan after a save
    ///
    /// A refinement can replace the plan while the save is in flight; the id
    /// then belongs to the superseded document and is dropped, leaving the
    /// current plan unsaved.
    pub fn mark_saved(&mut self, revision: Revision, id: String) {
        debug!(%id, revision, current = self.plan_revision, "Session::mark_saved: called");
        self.saving = false;
        if revision != self.plan_revision {
            warn!(revision, current = self.plan_revision, "Save completed for a superseded plan, dropping id");
            return;
        }
        if let View::Viewing { plan, .. } = &mut self.view {
            plan.id = Some(id);
        }
    }

    /// Record a save failure as a dismissible banner
    ///
    /// A failure for a superseded document only clears the in-flight flag.
    pub fn mark_save_failed(&mut self, revision: Revision, message: String) {
        debug!(%message, revision, "Session::mark_save_failed: called");
        self.saving = false;
        if revision != self.plan_revision {
            return;
        }
        if let View::Viewing { banner, .. } = &mut self.view {
            *banner = Some(message);
        }
    }

    /// Open a previously saved plan directly in the viewing state
    pub fn open_saved(&mut self, plan: TripPlan) {
        debug!(title = %plan.title, "Session::open_saved: called");
        self.plan_revision += 1;
        self.view = View::Viewing {
            plan,
            refining: false,
            banner: None,
        };
    }
}
