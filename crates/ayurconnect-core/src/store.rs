//! The application store: current state, one dispatch entry point, and
//! snapshot persistence.
//!
//! ## Lifecycle
//!
//! ```text
//! open() -> read blob -> sweep expired locks -> Initialize
//!        \-> (missing / unreadable) -> seed -> Initialize
//! dispatch(action) -> reducer -> swap state -> persist snapshot
//! ```
//!
//! Persistence is best effort: a failed write is logged and the in-memory
//! transition stands.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::action::Action;
use crate::error::{CoreError, StoreError, TransitionError};
use crate::reducer::TransitionMode;
use crate::seed;
use crate::state::AppState;
use crate::storage::{Config, Database};

/// Somewhere to keep the serialized state blob.
pub trait StateRepository {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn save(&self, key: &str, blob: &str) -> Result<(), StoreError>;
}

impl StateRepository for Database {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.kv_get(key)?)
    }

    fn save(&self, key: &str, blob: &str) -> Result<(), StoreError> {
        Ok(self.kv_set(key, blob)?)
    }
}

/// In-process repository, for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    entries: RefCell<HashMap<String, String>>,
    fail_writes: bool,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository pre-loaded with one blob.
    pub fn with_blob(key: &str, blob: &str) -> Self {
        let repo = Self::default();
        repo.entries
            .borrow_mut()
            .insert(key.to_string(), blob.to_string());
        repo
    }

    /// A repository whose writes always fail.
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl StateRepository for MemoryRepository {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get(key))
    }

    fn save(&self, key: &str, blob: &str) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "quota exceeded",
            )));
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), blob.to_string());
        Ok(())
    }
}

pub struct Store<R: StateRepository> {
    repo: R,
    config: Config,
    mode: TransitionMode,
    state: AppState,
}

impl<R: StateRepository> Store<R> {
    /// Restore the persisted state, or seed a fresh one.
    ///
    /// Never fails: an unreadable blob falls back to seed data.
    pub fn open(repo: R, config: Config, now: DateTime<Utc>) -> Self {
        let mode = TransitionMode::from_strict(config.store.strict_transitions);
        let mut store = Self {
            repo,
            config,
            mode,
            state: AppState::default(),
        };

        let initial = match store.restore(now) {
            Ok(Some(state)) => state,
            Ok(None) => {
                info!("no persisted state, seeding");
                seed::seed_state(now, &store.config.seed)
            }
            Err(e) => {
                warn!(error = %e, "failed to load persisted state, seeding");
                seed::seed_state(now, &store.config.seed)
            }
        };
        store.initialize(initial);
        store
    }

    fn restore(&self, now: DateTime<Utc>) -> Result<Option<AppState>, StoreError> {
        let Some(blob) = self.repo.load(&self.config.store.state_key)? else {
            return Ok(None);
        };
        let mut state: AppState = serde_json::from_str(&blob)?;
        let released = state.release_expired_locks(now);
        if released > 0 {
            info!(released, "released expired slot locks");
        }
        debug!(
            doctors = state.doctors.len(),
            slots = state.slots.len(),
            appointments = state.appointments.len(),
            "restored state"
        );
        Ok(Some(state))
    }

    fn initialize(&mut self, state: AppState) {
        // Initialize has no preconditions in either mode.
        self.state = crate::reducer::reduce_unchecked(&self.state, Action::Initialize(state));
        self.persist();
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn mode(&self) -> TransitionMode {
        self.mode
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Apply one action. On rejection the state is left as it was.
    pub fn dispatch(&mut self, action: Action) -> Result<&AppState, TransitionError> {
        let kind = action.kind();
        match self.mode.apply(&self.state, action) {
            Ok(next) => {
                debug!(action = kind, "applied");
                self.state = next;
                self.persist();
                Ok(&self.state)
            }
            Err(e) => {
                warn!(action = kind, error = %e, "transition rejected");
                Err(e)
            }
        }
    }

    /// Throw away everything and start from fresh seed data.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        info!("resetting state to seed data");
        let seeded = seed::seed_state(now, &self.config.seed);
        self.initialize(seeded);
    }

    fn persist(&self) {
        if self.state.is_loading {
            return;
        }
        let result = serde_json::to_string(&self.state)
            .map_err(StoreError::from)
            .and_then(|blob| self.repo.save(&self.config.store.state_key, &blob));
        if let Err(e) = result {
            error!(error = %e, "failed to save state");
        }
    }
}

impl Store<Database> {
    /// Open the store kept in `dir`: `config.toml` and `ayurconnect.db`.
    pub fn open_in(dir: &Path, now: DateTime<Utc>) -> Result<Self, CoreError> {
        let config = Config::load_from(&dir.join("config.toml"))?;
        let db = Database::open_at(&dir.join("ayurconnect.db"))?;
        Ok(Self::open(db, config, now))
    }
}
