//! The main game module for the bubble shooter.
//!
//! This module contains all the gameplay logic including:
//! - Hexagonal grid system (offset rows)
//! - Bubble colors and life cycle
//! - Shooter/launcher mechanics
//! - Projectile physics and placement
//! - Cluster detection, popping and detachment
//! - Game state management
//!
//! Everything below [`state`] is plain data and runs without an ECS world.

pub mod board;
pub mod bubble;
pub mod cluster;
pub mod config;
pub mod error;
pub mod grid;
pub mod hex;
pub mod highscore;
pub mod level;
pub mod projectile;
pub mod schedule;
pub mod shooter;
pub mod state;

use bevy::prelude::*;

pub(super) fn plugin(app: &mut App) {
    app.add_plugins((hex::plugin, bubble::plugin, state::plugin));
}

/// High score recording, added separately so tests and embedders can skip disk access.
pub(super) fn highscore_plugin(app: &mut App) {
    app.add_plugins(highscore::plugin);
}
