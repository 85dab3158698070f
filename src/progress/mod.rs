//! Persisted player progress
//!
//! Best scores and completed levels, stored as JSON in the user's config
//! directory. Loading tolerates absent, unreadable, or older-schema files
//! by falling back to defaults field by field; a failed save is logged and
//! the session carries on with in-memory state.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Level ids available from the start
const ALL_LEVELS: [u32; 6] = [1, 2, 3, 4, 5, 6];

/// Best recorded result for one level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestScore {
    /// Final accuracy, 0..=100
    pub accuracy: u32,
    /// Completion time in seconds
    pub time: u64,
    /// Hints spent in the recorded run, 0..=2
    pub hints: u32,
}

impl BestScore {
    /// Strict-improvement comparison: better accuracy wins, equal accuracy
    /// falls back to faster time
    pub fn beats(&self, other: &BestScore) -> bool {
        self.accuracy > other.accuracy
            || (self.accuracy == other.accuracy && self.time < other.time)
    }
}

/// Process-wide progress record, survives sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerProgress {
    /// Levels ever completed (append-only union)
    pub completed_levels: Vec<u32>,
    /// Best result per completed level
    pub best_scores: BTreeMap<u32, BestScore>,
    /// Levels available to play (static: everything is unlocked)
    pub unlocked_levels: Vec<u32>,
}

impl Default for PlayerProgress {
    fn default() -> Self {
        Self {
            completed_levels: Vec::new(),
            best_scores: BTreeMap::new(),
            unlocked_levels: ALL_LEVELS.to_vec(),
        }
    }
}

impl PlayerProgress {
    pub fn is_completed(&self, level_id: u32) -> bool {
        self.completed_levels.contains(&level_id)
    }

    pub fn best(&self, level_id: u32) -> Option<&BestScore> {
        self.best_scores.get(&level_id)
    }

    /// Record a completed run. The level joins the completed set
    /// (idempotent), and the best score is replaced only on strict
    /// improvement. Returns true if the stored best changed.
    pub fn record_completion(&mut self, level_id: u32, score: BestScore) -> bool {
        if !self.completed_levels.contains(&level_id) {
            self.completed_levels.push(level_id);
        }

        match self.best_scores.get(&level_id) {
            Some(current) if !score.beats(current) => false,
            _ => {
                self.best_scores.insert(level_id, score);
                true
            }
        }
    }
}

/// File-backed progress store.
///
/// `path: None` (no config directory, or WASM) degrades to an in-memory
/// store: loads yield defaults and saves report failure without aborting
/// gameplay.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    path: Option<PathBuf>,
}

impl ProgressStore {
    /// Store at the platform config location
    pub fn at_default_location() -> Self {
        Self {
            path: default_path(),
        }
    }

    /// Store at an explicit path (used by tests)
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Load progress, falling back to defaults when nothing is stored or
    /// the stored data is unreadable
    pub fn load(&self) -> PlayerProgress {
        let Some(path) = &self.path else {
            return PlayerProgress::default();
        };

        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return PlayerProgress::default();
            }
            Err(e) => {
                eprintln!("Failed to read progress file {}: {}", path.display(), e);
                return PlayerProgress::default();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(progress) => progress,
            Err(e) => {
                eprintln!("Ignoring malformed progress file {}: {}", path.display(), e);
                PlayerProgress::default()
            }
        }
    }

    /// Save progress. Failures are logged and reported, never fatal.
    pub fn save(&self, progress: &PlayerProgress) -> bool {
        let Some(path) = &self.path else {
            eprintln!("No progress path available, best score not persisted");
            return false;
        };

        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Failed to create progress directory: {}", e);
                return false;
            }
        }

        let contents = match serde_json::to_string_pretty(progress) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to serialize progress: {}", e);
                return false;
            }
        };

        match std::fs::write(path, contents) {
            Ok(()) => true,
            Err(e) => {
                eprintln!("Failed to write progress file {}: {}", path.display(), e);
                false
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("prism-quest").join("progress.json"))
}

#[cfg(target_arch = "wasm32")]
fn default_path() -> Option<PathBuf> {
    None
}
