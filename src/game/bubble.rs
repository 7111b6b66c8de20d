//! Bubbles - the colored units that sit on the grid.
//!
//! A bubble is created Attached (by level load or by a projectile landing),
//! then leaves the board either by popping (part of a match) or by falling
//! (no longer connected to the anchor row).

use bevy::{math::DVec2, prelude::*};
use rand::Rng;

use super::{
    config::BoardConfig,
    hex::{HexCoord, HexLayout},
};

pub(super) fn plugin(app: &mut App) {
    app.register_type::<BubbleColor>();
    app.register_type::<LifeState>();
}

/// The different bubble colors.
/// Six colors, indexed 0-5 in level tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect, Default)]
pub enum BubbleColor {
    #[default]
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
}

impl BubbleColor {
    /// Get all possible bubble colors, in palette index order.
    pub const ALL: [BubbleColor; 6] = [
        BubbleColor::Red,
        BubbleColor::Blue,
        BubbleColor::Green,
        BubbleColor::Yellow,
        BubbleColor::Purple,
        BubbleColor::Orange,
    ];

    /// Palette index used by level tables.
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Pick a color uniformly from the full palette.
    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// Where a bubble is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Default)]
pub enum LifeState {
    /// On the board; the only state visible to placement and flood fills.
    #[default]
    Attached,
    /// Part of a match, shrinking away.
    Popping,
    /// Cut off from the anchor row, dropping under gravity.
    Falling,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    /// Pixel center.
    pub position: DVec2,
    pub color: BubbleColor,
    /// Board slot, or [`HexCoord::UNATTACHED`].
    pub coord: HexCoord,
    pub state: LifeState,
    /// 0..=1 while popping.
    pub pop_progress: f64,
    /// Downward speed while falling.
    pub fall_velocity: f64,
}

impl Bubble {
    /// A bubble attached to the board at `coord`.
    pub fn attached(coord: HexCoord, color: BubbleColor, layout: &HexLayout) -> Self {
        Self {
            position: layout.grid_to_pixel(coord),
            color,
            coord,
            state: LifeState::Attached,
            pop_progress: 0.0,
            fall_velocity: 0.0,
        }
    }

    /// A bubble that is not on the board, e.g. the on-deck preview.
    pub fn unattached(color: BubbleColor, position: DVec2) -> Self {
        Self {
            position,
            color,
            coord: HexCoord::UNATTACHED,
            state: LifeState::Attached,
            pop_progress: 0.0,
            fall_velocity: 0.0,
        }
    }

    pub(super) fn start_popping(&mut self) {
        debug_assert_eq!(self.state, LifeState::Attached);
        self.state = LifeState::Popping;
        self.pop_progress = 0.0;
    }

    pub(super) fn start_falling(&mut self) {
        debug_assert_eq!(self.state, LifeState::Attached);
        self.state = LifeState::Falling;
        self.fall_velocity = 0.0;
    }

    /// Advance the pop animation or the fall by one tick.
    ///
    /// Returns false once the bubble should be removed.
    pub fn advance(&mut self, config: &BoardConfig) -> bool {
        match self.state {
            LifeState::Attached => true,
            LifeState::Popping => {
                self.pop_progress += config.pop_increment;
                // Accumulated float steps land a hair under 1.0
                if self.pop_progress >= 1.0 - 1e-9 {
                    self.pop_progress = 1.0;
                    false
                } else {
                    true
                }
            }
            LifeState::Falling => {
                self.fall_velocity += config.gravity;
                self.position.y += self.fall_velocity;
                self.position.y <= config.lower_bound()
            }
        }
    }

    /// Scale (and alpha) for rendering a popping bubble.
    pub fn render_scale(&self) -> f64 {
        match self.state {
            LifeState::Popping => 1.0 - self.pop_progress,
            _ => 1.0,
        }
    }
}
