//! Hex-grid bubble matching engine.
//!
//! The [`game`] module holds the engine: a hexagonal board, the projectile
//! in flight, match and detachment detection, and the session that scores
//! it. [`PopGridPlugin`] drives a [`game::state::Session`] from Bevy's
//! `Update` schedule.

pub mod game;

use bevy::prelude::*;
use rand::{SeedableRng, rngs::StdRng};

use game::{config::BoardConfig, level::Level, state::Session};

/// Adds the board session, its messages and systems to an app.
pub struct PopGridPlugin {
    pub config: BoardConfig,
    pub level: Level,
    /// Seed for the shooter's colors; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Load and save the leaderboard in the user's data directory.
    pub persist_scores: bool,
}

impl Default for PopGridPlugin {
    fn default() -> Self {
        Self {
            config: BoardConfig::default(),
            level: Level::reference(),
            seed: None,
            persist_scores: true,
        }
    }
}

impl Plugin for PopGridPlugin {
    fn build(&self, app: &mut App) {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        app.insert_resource(Session::new(self.config.clone(), self.level.clone(), rng));

        app.add_plugins(game::plugin);
        if self.persist_scores {
            app.add_plugins(game::highscore_plugin);
        }
    }
}
