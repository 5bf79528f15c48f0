//! TUI runner: owns the terminal, the event loop, and all collaborator I/O
//!
//! Key handling queues [`PendingCall`]s; the runner drains them each tick,
//! spawns the async work, and feeds outcomes back through one channel. Every
//! planner outcome carries the epoch it was dispatched under, and the session
//! drops results from an abandoned epoch.

use std::sync::Arc;
use std::time::Duration;

use eyre::Result;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::plan::TripPlan;
use crate::planner::{PlannerClient, PlannerError};
use crate::session::{Epoch, Revision};
use crate::store::{SavedTrip, TripStore};

use super::Tui;
use super::app::{App, PendingCall};
use super::events::{Event, EventHandler};
use super::views;

/// Results of background work, applied on the main loop
enum Outcome {
    Plan {
        epoch: Epoch,
        result: Result<TripPlan, PlannerError>,
    },
    Located(Result<String, PlannerError>),
    Saved {
        revision: Revision,
        result: Result<String>,
    },
    History(Result<Vec<SavedTrip>>),
}

/// TUI runner that manages the terminal and event loop
pub struct TuiRunner {
    app: App,
    terminal: Tui,
    planner: Arc<dyn PlannerClient>,
    store: Arc<dyn TripStore>,
    event_handler: EventHandler,
    outcome_tx: mpsc::UnboundedSender<Outcome>,
    outcome_rx: mpsc::UnboundedReceiver<Outcome>,
}

impl TuiRunner {
    pub fn new(
        terminal: Tui,
        planner: Arc<dyn PlannerClient>,
        store: Arc<dyn TripStore>,
        home: (f64, f64),
    ) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        Self {
            app: App::new(home),
            terminal,
            planner,
            store,
            event_handler: EventHandler::new(Duration::from_millis(100)),
            outcome_tx,
            outcome_rx,
        }
    }

    /// Run the TUI main loop
    pub async fn run(&mut self) -> Result<()> {
        loop {
            self.terminal.draw(|frame| views::render(&self.app, frame))?;

            match self.event_handler.next().await? {
                Event::Tick => self.handle_tick(),
                Event::Key(key) => self.app.handle_key(key),
                Event::Resize(_, _) => {}
            }

            if self.app.should_quit {
                break;
            }
        }
        Ok(())
    }

    fn handle_tick(&mut self) {
        self.app.tick();

        for call in std::mem::take(&mut self.app.pending) {
            self.dispatch(call);
        }

        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.apply_outcome(outcome);
        }
    }

    /// Spawn the async work for one queued call
    fn dispatch(&self, call: PendingCall) {
        debug!(?call, "TuiRunner::dispatch: called");
        let tx = self.outcome_tx.clone();
        match call {
            PendingCall::Trip {
                epoch,
                from,
                to,
                style,
                preferences,
            } => {
                let planner = self.planner.clone();
                tokio::spawn(async move {
                    let result = planner.synthesize_trip(&from, &to, &style, &preferences).await;
                    let _ = tx.send(Outcome::Plan { epoch, result });
                });
            }
            PendingCall::Route {
                epoch,
                from,
                to,
                preferences,
            } => {
                let planner = self.planner.clone();
                tokio::spawn(async move {
                    let result = planner.synthesize_route(&from, &to, &preferences).await;
                    let _ = tx.send(Outcome::Plan { epoch, result });
                });
            }
            PendingCall::Refine { epoch, plan, instruction } => {
                let planner = self.planner.clone();
                tokio::spawn(async move {
                    let result = planner.refine(&plan, &instruction).await;
                    let _ = tx.send(Outcome::Plan { epoch, result });
                });
            }
            PendingCall::Locate { lat, lng } => {
                let planner = self.planner.clone();
                tokio::spawn(async move {
                    let result = planner.resolve_city(lat, lng).await;
                    let _ = tx.send(Outcome::Located(result));
                });
            }
            PendingCall::Save { revision, plan } => {
                let store = self.store.clone();
                tokio::spawn(async move {
                    let result = tokio::task::spawn_blocking(move || {
                        let identity = store
                            .sign_in()?
                            .ok_or_else(|| eyre::eyre!("Sign-in was cancelled"))?;
                        store.save_trip(&identity.user_id, &plan)
                    })
                    .await
                    .unwrap_or_else(|e| Err(eyre::eyre!("Save task panicked: {e}")));
                    let _ = tx.send(Outcome::Saved { revision, result });
                });
            }
            PendingCall::History => {
                let store = self.store.clone();
                tokio::spawn(async move {
                    let result = tokio::task::spawn_blocking(move || {
                        let identity = store
                            .sign_in()?
                            .ok_or_else(|| eyre::eyre!("Sign-in was cancelled"))?;
                        store.list_trips(&identity.user_id)
                    })
                    .await
                    .unwrap_or_else(|e| Err(eyre::eyre!("History task panicked: {e}")));
                    let _ = tx.send(Outcome::History(result));
                });
            }
        }
    }

    fn apply_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Plan { epoch, result } => {
                self.app.session.apply_result(epoch, result);
                self.app.refresh_plan_artifacts();
            }
            Outcome::Located(Ok(city)) => self.app.apply_located_city(city),
            Outcome::Located(Err(e)) => {
                warn!("Reverse geocoding failed: {}", e);
                self.app.session.locating = false;
            }
            Outcome::Saved { revision, result: Ok(id) } => self.app.session.mark_saved(revision, id),
            Outcome::Saved { revision, result: Err(e) } => {
                warn!("Save failed: {}", e);
                self.app.session.mark_save_failed(
                    revision,
                    "Could not save the trip. Please try again.".to_string(),
                );
            }
            Outcome::History(Ok(trips)) => self.app.set_history(trips),
            Outcome::History(Err(e)) => {
                warn!("Loading history failed: {}", e);
                self.app.set_history(Vec::new());
            }
        }
    }
}
