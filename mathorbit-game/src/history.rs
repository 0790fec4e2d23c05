//! Capped log of finished sessions, persisted through a [`KeyValueStore`].
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::KeyValueStore;
use crate::config::QuizConfig;
use crate::error::QuizError;
use crate::presets::{Difficulty, GameMode, OperationGroup};

/// Display labels of the settings a session was played with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    pub group: String,
    pub difficulty: String,
    pub mode: String,
}

impl SessionSettings {
    #[must_use]
    pub fn from_selection(group: OperationGroup, difficulty: Difficulty, mode: GameMode) -> Self {
        Self {
            group: group.name().to_string(),
            difficulty: difficulty.name().to_string(),
            mode: mode.name().to_string(),
        }
    }
}

/// One finished session as stored in history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub date: DateTime<Utc>,
    pub score: u32,
    pub accuracy: u32,
    pub settings: SessionSettings,
}

/// Chart point derived from history, oldest session first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressPoint {
    pub label: String,
    pub score: u32,
    pub accuracy: u32,
}

/// Newest-first list of session summaries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog(Vec<SessionSummary>);

impl HistoryLog {
    #[must_use]
    pub fn entries(&self) -> &[SessionSummary] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn newest(&self) -> Option<&SessionSummary> {
        self.0.first()
    }

    /// Put `summary` first and drop whatever falls past `capacity`.
    pub fn prepend(&mut self, summary: SessionSummary, capacity: usize) {
        self.0.insert(0, summary);
        self.0.truncate(capacity);
    }

    /// A progress chart needs at least two sessions.
    #[must_use]
    pub fn has_progress(&self) -> bool {
        self.0.len() > 1
    }

    #[must_use]
    pub fn progress(&self) -> Vec<ProgressPoint> {
        self.0
            .iter()
            .rev()
            .enumerate()
            .map(|(idx, session)| ProgressPoint {
                label: format!("Game {}", idx + 1),
                score: session.score,
                accuracy: session.accuracy,
            })
            .collect()
    }
}

impl From<Vec<SessionSummary>> for HistoryLog {
    fn from(entries: Vec<SessionSummary>) -> Self {
        Self(entries)
    }
}

/// History log bound to its backing store.
///
/// Read and write failures are logged and absorbed: a bad record loads as an
/// empty log, a failed write still updates the in-memory log.
#[derive(Debug)]
pub struct HistoryStore<S: KeyValueStore> {
    store: S,
    key: String,
    capacity: usize,
    log: HistoryLog,
}

impl<S: KeyValueStore> HistoryStore<S> {
    /// Bind to `store` and load the current log.
    pub fn open(store: S, config: &QuizConfig) -> Self {
        let mut history = Self {
            store,
            key: config.history_key.clone(),
            capacity: config.history_capacity,
            log: HistoryLog::default(),
        };
        history.log = history.load();
        history
    }

    /// Re-read the stored log, falling back to an empty one.
    pub fn load(&self) -> HistoryLog {
        match self.read() {
            Ok(mut log) => {
                log.0.truncate(self.capacity);
                debug!(target: "history", "loaded {} sessions from `{}`", log.len(), self.key);
                log
            }
            Err(err) => {
                warn!(target: "history", "{err}; starting with empty history");
                HistoryLog::default()
            }
        }
    }

    /// Record a finished session and persist the capped log.
    pub fn append(&mut self, summary: SessionSummary) -> &HistoryLog {
        self.log.prepend(summary, self.capacity);
        if let Err(err) = self.write() {
            warn!(target: "history", "{err}; keeping history in memory only");
        }
        &self.log
    }

    #[must_use]
    pub const fn log(&self) -> &HistoryLog {
        &self.log
    }

    #[must_use]
    pub const fn backend(&self) -> &S {
        &self.store
    }

    fn read(&self) -> Result<HistoryLog, QuizError> {
        let raw = self
            .store
            .get(&self.key)
            .map_err(|err| QuizError::PersistenceRead {
                key: self.key.clone(),
                reason: err.to_string(),
            })?;
        let Some(raw) = raw else {
            return Ok(HistoryLog::default());
        };
        serde_json::from_str(&raw).map_err(|err| QuizError::PersistenceRead {
            key: self.key.clone(),
            reason: err.to_string(),
        })
    }

    fn write(&self) -> Result<(), QuizError> {
        let encoded =
            serde_json::to_string(&self.log).map_err(|err| QuizError::PersistenceWrite {
                key: self.key.clone(),
                reason: err.to_string(),
            })?;
        self.store
            .set(&self.key, &encoded)
            .map_err(|err| QuizError::PersistenceWrite {
                key: self.key.clone(),
                reason: err.to_string(),
            })
    }
}
