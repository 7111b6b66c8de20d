//! High score persistence with Top 10 leaderboard.
//!
//! Scores are saved to a local JSON file in the user's data directory.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::{
    error::LoadError,
    state::{GameFinished, GameOutcome},
};

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<HighScores>();

    // Load high scores on startup
    app.add_systems(Startup, load_high_scores);
    app.add_systems(Update, record_finished_games);
}

/// Maximum number of high scores to keep.
const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub score: u32,
    pub bubbles_popped: u32,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub won: bool,
}

impl ScoreEntry {
    pub fn new(score: u32, bubbles_popped: u32, level: impl Into<String>, won: bool) -> Self {
        Self {
            score,
            bubbles_popped,
            level: level.into(),
            won,
        }
    }
}

/// Resource holding the top 10 high scores.
#[derive(Resource, Debug, Default, Serialize, Deserialize)]
pub struct HighScores {
    pub entries: Vec<ScoreEntry>,
    /// Where the table is saved; `None` keeps it in memory only.
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl HighScores {
    /// An empty table backed by `path`.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            entries: Vec::new(),
            path: Some(path.into()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Check if a score would make it into the top 10.
    pub fn is_high_score(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries
            .last()
            .map(|lowest| score > lowest.score)
            .unwrap_or(true)
    }

    /// Add a new score to the leaderboard (if it qualifies).
    /// Returns true if the score was added.
    pub fn add_score(&mut self, entry: ScoreEntry) -> bool {
        if entry.score == 0 {
            return false;
        }

        // Insert in sorted position (descending by score)
        let pos = self
            .entries
            .iter()
            .position(|e| entry.score > e.score)
            .unwrap_or(self.entries.len());

        if pos >= MAX_HIGH_SCORES {
            return false;
        }

        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_HIGH_SCORES);
        true
    }

    /// Default location of the high score file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_local_dir().map(|dir| dir.join("popgrid").join("highscores.json"))
    }

    /// Load the table stored at `path`. A missing file is an empty table.
    pub fn load_from(path: &Path) -> Result<Self, LoadError> {
        if !path.exists() {
            info!("No high scores file found at {:?}, starting fresh", path);
            return Ok(Self::at(path));
        }

        let contents = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut scores: HighScores =
            serde_json::from_str(&contents).map_err(|source| LoadError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
        scores.entries.truncate(MAX_HIGH_SCORES);
        scores.path = Some(path.to_path_buf());
        info!("Loaded {} high scores from {:?}", scores.entries.len(), path);
        Ok(scores)
    }

    /// Load from the default location, falling back to an empty table.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            warn!("Could not determine data directory for high scores");
            return Self::default();
        };

        Self::load_from(&path).unwrap_or_else(|e| {
            warn!("Failed to load high scores: {}", e);
            Self::at(path)
        })
    }

    /// Save high scores to disk. Does nothing for an in-memory table.
    pub fn save(&self) -> Result<(), LoadError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let io_error = |source| LoadError::Io {
            path: path.clone(),
            source,
        };

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|source| LoadError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(path, json).map_err(io_error)?;
        info!("Saved high scores to {:?}", path);
        Ok(())
    }
}

/// Load high scores on startup.
fn load_high_scores(mut high_scores: ResMut<HighScores>) {
    // A table given a path up front has already been set up by the caller
    if high_scores.path().is_some() {
        return;
    }
    *high_scores = HighScores::load();
}

/// Add each finished game to the leaderboard.
fn record_finished_games(
    mut finished_events: MessageReader<GameFinished>,
    mut high_scores: ResMut<HighScores>,
) {
    for event in finished_events.read() {
        let entry = ScoreEntry::new(
            event.score.score,
            event.score.bubbles_popped,
            event.level.clone(),
            event.outcome == GameOutcome::Won,
        );
        if !high_scores.add_score(entry) {
            continue;
        }
        info!("New high score: {}", event.score.score);
        if let Err(e) = high_scores.save() {
            warn!("Failed to save high scores: {}", e);
        }
    }
}
