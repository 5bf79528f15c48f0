//! Trip history persistence
//!
//! Saved trips live in a local SQLite database. The store is an opaque
//! collaborator from the session's point of view: saving hands over a plan
//! without an id and gets the assigned id back; listing returns newest-first.

use chrono::{DateTime, Utc};
use eyre::{Context, Result};
use rusqlite::{Connection, params};
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::plan::TripPlan;

/// A signed-in user of the trip store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub display_name: String,
}

/// One persisted trip, as returned by [`TripStore::list_trips`]
#[derive(Debug, Clone)]
pub struct SavedTrip {
    pub id: String,
    pub saved_at: DateTime<Utc>,
    pub plan: TripPlan,
}

/// Persistence contract for trip history
pub trait TripStore: Send + Sync {
    /// Establish who is saving; `None` means history is unavailable
    fn sign_in(&self) -> Result<Option<Identity>>;

    /// Persist a plan for the given user and return its assigned id
    ///
    /// The stored document never carries an id of its own; the id lives in
    /// the store and is stamped onto the in-memory plan by the caller.
    fn save_trip(&self, user_id: &str, plan: &TripPlan) -> Result<String>;

    /// All trips saved by the given user, newest first
    fn list_trips(&self, user_id: &str) -> Result<Vec<SavedTrip>>;
}

/// SQLite-backed trip store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create storage directory")?;
        }
        let conn = Connection::open(path).context("Failed to open trip database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS trips (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                saved_at TEXT NOT NULL,
                plan_json TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_trips_user ON trips (user_id, saved_at);",
        )
        .context("Failed to initialize trip schema")?;
        debug!(path = %path.display(), "Opened trip store");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store for tests
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "CREATE TABLE trips (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                saved_at TEXT NOT NULL,
                plan_json TEXT NOT NULL
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl TripStore for SqliteStore {
    fn sign_in(&self) -> Result<Option<Identity>> {
        // Local single-user database; identity is the OS user.
        let name = std::env::var("USER").unwrap_or_else(|_| "traveller".to_string());
        Ok(Some(Identity {
            user_id: format!("local:{}", name),
            display_name: name,
        }))
    }

    fn save_trip(&self, user_id: &str, plan: &TripPlan) -> Result<String> {
        let id = Uuid::now_v7().to_string();
        let saved_at = Utc::now();
        let plan_json = serde_json::to_string(&plan.without_id()).context("Failed to serialize plan")?;

        let conn = self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        conn.execute(
            "INSERT INTO trips (id, user_id, title, saved_at, plan_json)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, user_id, plan.title, saved_at.to_rfc3339(), plan_json],
        )
        .context("Failed to insert trip")?;

        info!(trip_id = %id, title = %plan.title, "Saved trip");
        Ok(id)
    }

    fn list_trips(&self, user_id: &str) -> Result<Vec<SavedTrip>> {
        debug!(%user_id, "list_trips: called");
        let conn = self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut stmt = conn.prepare(
            "SELECT id, saved_at, plan_json FROM trips
             WHERE user_id = ?1
             ORDER BY saved_at DESC, id DESC",
        )?;

        let rows = stmt.query_map(params![user_id], |row| {
            let id: String = row.get(0)?;
            let saved_at: String = row.get(1)?;
            let plan_json: String = row.get(2)?;
            Ok((id, saved_at, plan_json))
        })?;

        let mut trips = Vec::new();
        for row in rows {
            let (id, saved_at, plan_json) = row?;
            let saved_at = DateTime::parse_from_rfc3339(&saved_at)
                .context("Invalid saved_at timestamp")?
                .with_timezone(&Utc);
            let mut plan: TripPlan =
                serde_json::from_str(&plan_json).context("Corrupt stored plan")?;
            plan.id = Some(id.clone());
            trips.push(SavedTrip { id, saved_at, plan });
        }
        Ok(trips)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::DayPlan;

    fn sample_plan(title: &str) -> TripPlan {
        TripPlan {
            id: None,
            title: title.to_string(),
            total_duration: 1,
            estimated_budget: Some("₹1,000".to_string()),
            itinerary: vec![DayPlan {
                day: 1,
                title: "Arrival".to_string(),
                city: "Pune".to_string(),
                lat: 18.52,
                lng: 73.85,
                transport: vec![],
                activities: vec!["Shaniwar Wada".to_string()],
            }],
        }
    }

    #[test]
    fn test_save_assigns_id_and_strips_stored_id() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut plan = sample_plan("Pune hop");
        plan.id = Some("stale".to_string());

        let id = store.save_trip("u1", &plan).unwrap();
        assert_ne!(id, "stale");

        let trips = store.list_trips("u1").unwrap();
        assert_eq!(trips.len(), 1);
        // Listed plan carries the store-assigned id, not the stale one.
        assert_eq!(trips[0].plan.id.as_deref(), Some(id.as_str()));
    }

    #[test]
    fn test_list_is_newest_first_and_scoped_to_user() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.save_trip("u1", &sample_plan("First")).unwrap();
        store.save_trip("u1", &sample_plan("Second")).unwrap();
        store.save_trip("u2", &sample_plan("Other user")).unwrap();

        let trips = store.list_trips("u1").unwrap();
        assert_eq!(trips.len(), 2);
        assert_eq!(trips[0].plan.title, "Second");
        assert_eq!(trips[1].plan.title, "First");
    }

    #[test]
    fn test_round_trip_preserves_itinerary() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.save_trip("u1", &sample_plan("Pune hop")).unwrap();

        let trips = store.list_trips("u1").unwrap();
        let plan = &trips[0].plan;
        assert_eq!(plan.itinerary[0].city, "Pune");
        assert_eq!(plan.itinerary[0].activities, vec!["Shaniwar Wada"]);
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn test_sign_in_yields_identity() {
        let store = SqliteStore::open_in_memory().unwrap();
        let identity = store.sign_in().unwrap().unwrap();
        assert!(identity.user_id.starts_with("local:"));
    }

    #[test]
    fn test_open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("trips.db");
        let store = SqliteStore::open(&db_path).unwrap();
        store.save_trip("u1", &sample_plan("Disk trip")).unwrap();
        assert!(db_path.exists());
    }
}
