//! Terminal user interface for Yatra
//!
//! A full-screen planner: mode selection, the two entry forms, the itinerary
//! view with a live route map, and the refinement and break overlays.
//! Logging goes to a file, never stdout; the TUI owns the terminal.

mod app;
mod events;
mod runner;
mod views;

pub use app::{App, PendingCall};
pub use events::{Event, EventHandler};
pub use runner::TuiRunner;

use std::io::{self, Stdout};
use std::sync::Arc;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use eyre::Result;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::config::Config;
use crate::planner::PlannerClient;
use crate::store::TripStore;

/// Terminal type alias
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Initialize the terminal for TUI mode
pub fn init() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
pub fn restore() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

/// Run the planner TUI until the user quits
pub async fn run(config: &Config, planner: Arc<dyn PlannerClient>, store: Arc<dyn TripStore>) -> Result<()> {
    let terminal = init()?;

    // Restore the terminal even on early return or panic unwind
    struct TerminalGuard;
    impl Drop for TerminalGuard {
        fn drop(&mut self) {
            let _ = restore();
        }
    }
    let _guard = TerminalGuard;

    let home = (config.location.lat, config.location.lng);
    let mut runner = TuiRunner::new(terminal, planner, store, home);
    runner.run().await
}
