use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::game_trait::GameId;

/// Persistent high-score capability injected into the games.
///
/// Absence of a stored value means "no record yet", never an error.
pub trait ScoreStore: Send + Sync {
    fn get(&self, game: GameId) -> Option<u32>;
    fn set(&mut self, game: GameId, value: u32);
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    scores: HashMap<&'static str, u32>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryScoreStore {
    fn get(&self, game: GameId) -> Option<u32> {
        self.scores.get(game.storage_key()).copied()
    }

    fn set(&mut self, game: GameId, value: u32) {
        self.scores.insert(game.storage_key(), value);
    }
}

/// Shared handle so a store can outlive the game that writes to it.
impl<S: ScoreStore> ScoreStore for Arc<Mutex<S>> {
    fn get(&self, game: GameId) -> Option<u32> {
        self.lock().unwrap_or_else(|e| e.into_inner()).get(game)
    }

    fn set(&mut self, game: GameId, value: u32) {
        self.lock()
            .unwrap_or_else(|e| e.into_inner())
            .set(game, value);
    }
}

/// JSON-file-backed store.
///
/// The file is read once at construction; `set` rewrites it. Missing or
/// malformed contents are treated as empty, and write failures are logged
/// rather than surfaced; a lost record must not kill a game session.
#[derive(Debug)]
pub struct FileScoreStore {
    path: PathBuf,
    scores: HashMap<String, u32>,
}

impl FileScoreStore {
    /// Open the store at `path`, reading any existing scores.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let scores = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<HashMap<String, u32>>(&content) {
                Ok(scores) => scores,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Malformed score file, treating as empty"
                    );
                    HashMap::new()
                },
            },
            Err(_) => HashMap::new(),
        };
        Self { path, scores }
    }

    /// Open the store at the path named by `ARCADE_SCORE_FILE`, defaulting
    /// to `data/scores.json`.
    pub fn from_env() -> Self {
        let path =
            std::env::var("ARCADE_SCORE_FILE").unwrap_or_else(|_| "data/scores.json".to_string());
        Self::open(path)
    }

    fn persist(&self) {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(dir)
        {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to create score directory"
            );
            return;
        }
        match serde_json::to_string_pretty(&self.scores) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&self.path, json) {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "Failed to write score file"
                    );
                }
            },
            Err(e) => tracing::warn!(error = %e, "Failed to encode score file"),
        }
    }
}

impl ScoreStore for FileScoreStore {
    fn get(&self, game: GameId) -> Option<u32> {
        self.scores.get(game.storage_key()).copied()
    }

    fn set(&mut self, game: GameId, value: u32) {
        self.scores.insert(game.storage_key().to_string(), value);
        self.persist();
    }
}
