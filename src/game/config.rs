//! Board configuration - every geometric and physics constant in one place.
//!
//! Defaults are the reference board: 12 columns x 12 rows of 20px-radius
//! bubbles, match-3, 10/20 points for popped/dropped bubbles.

use bevy::{log::warn, math::DVec2};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use super::{error::LoadError, hex::HexLayout};

/// Vertical distance between hex rows as a fraction of the bubble diameter (~sqrt(3)/2).
pub const HEX_ROW_SPACING: f64 = 0.866;

/// Tunable board parameters.
///
/// Every field has a default, so a config file only needs the keys it overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BoardConfig {
    /// Bubble radius in pixels. Projectiles share it.
    pub radius: f64,
    /// Columns on even rows. Odd rows hold one fewer.
    pub columns: i32,
    /// Number of rows on the board.
    pub rows: i32,
    pub left_margin: f64,
    pub top_margin: f64,
    /// Row spacing factor, see [`HEX_ROW_SPACING`].
    pub row_spacing: f64,
    /// Minimum connected same-color group that pops.
    pub match_threshold: usize,
    /// Added to `pop_progress` every tick.
    pub pop_increment: f64,
    /// Added to `fall_velocity` every tick.
    pub gravity: f64,
    /// Falling bubbles are removed once they are this far below the board top.
    pub fall_bound: f64,
    /// Pixels travelled by a projectile per tick.
    pub projectile_speed: f64,
    /// Ticks between a pop and the detachment check it schedules.
    pub detach_delay_frames: u64,
    /// The game is lost once an attached bubble's center is below this y.
    pub lose_line_y: f64,
    pub points_per_pop: u32,
    pub points_per_drop: u32,
    /// Maximum shooter angle from vertical, in radians.
    pub max_aim_angle: f64,
    /// Distance from the board top to the shooter origin.
    pub shooter_offset: f64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            radius: 20.0,
            columns: 12,
            rows: 12,
            left_margin: 0.0,
            top_margin: 0.0,
            row_spacing: HEX_ROW_SPACING,
            match_threshold: 3,
            pop_increment: 0.1,
            gravity: 0.5,
            fall_bound: 500.0,
            projectile_speed: 10.0,
            // ~100ms at 60 ticks per second
            detach_delay_frames: 6,
            lose_line_y: 380.0,
            points_per_pop: 10,
            points_per_drop: 20,
            max_aim_angle: 1.3,
            shooter_offset: 460.0,
        }
    }
}

impl BoardConfig {
    pub fn diameter(&self) -> f64 {
        self.radius * 2.0
    }

    /// The coordinate mapper for this board.
    pub fn layout(&self) -> HexLayout {
        HexLayout {
            radius: self.radius,
            columns: self.columns,
            rows: self.rows,
            left_margin: self.left_margin,
            top_margin: self.top_margin,
            row_spacing: self.row_spacing,
        }
    }

    pub fn left_wall(&self) -> f64 {
        self.left_margin
    }

    pub fn right_wall(&self) -> f64 {
        self.left_margin + self.columns as f64 * self.diameter()
    }

    /// The y past which falling bubbles and stray projectiles are removed.
    pub fn lower_bound(&self) -> f64 {
        self.top_margin + self.fall_bound
    }

    /// Where projectiles are launched from: horizontally centered below the grid.
    pub fn shooter_origin(&self) -> DVec2 {
        DVec2::new(
            (self.left_wall() + self.right_wall()) / 2.0,
            self.top_margin + self.shooter_offset,
        )
    }

    /// Parse a config from JSON text.
    pub fn from_json_str(json: &str, path: &Path) -> Result<Self, LoadError> {
        serde_json::from_str(json).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read a config file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let contents = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents, path)
    }

    /// Read a config file, falling back to the reference board on any failure.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Using default board config: {}", e);
                Self::default()
            }
        }
    }
}
