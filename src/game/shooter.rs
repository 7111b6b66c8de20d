//! The shooter/launcher at the bottom of the board.
//!
//! The shooter always has a "loaded" bubble ready to fire and a "next"
//! bubble preview. New colors are drawn from the colors still on the board
//! so the player is never dealt a color that cannot match.

use bevy::{log::debug, math::DVec2};
use rand::Rng;
use std::collections::BTreeSet;

use super::{
    bubble::{Bubble, BubbleColor},
    config::BoardConfig,
    projectile::ProjectileSpawn,
};

/// Pick a color uniformly from those on the board, or from the whole
/// palette when the board is empty.
pub fn pick_color(board_colors: &BTreeSet<BubbleColor>, rng: &mut impl Rng) -> BubbleColor {
    if board_colors.is_empty() {
        return BubbleColor::random(rng);
    }
    let idx = rng.random_range(0..board_colors.len());
    board_colors
        .iter()
        .nth(idx)
        .copied()
        .unwrap_or_else(|| BubbleColor::random(rng))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shooter {
    /// Launch point of every projectile.
    pub origin: DVec2,
    /// Where the next bubble waits, left of the launcher.
    pub next_origin: DVec2,
    /// Radians from straight up, positive to the right.
    angle: f64,
    max_angle: f64,
    loaded: BubbleColor,
    next: BubbleColor,
}

impl Shooter {
    pub fn new(
        config: &BoardConfig,
        board_colors: &BTreeSet<BubbleColor>,
        rng: &mut impl Rng,
    ) -> Self {
        let loaded = pick_color(board_colors, rng);
        let next = pick_color(board_colors, rng);
        debug!("Shooter ready with {:?} loaded, {:?} next", loaded, next);
        Self {
            origin: config.shooter_origin(),
            next_origin: config.shooter_origin() + DVec2::new(-3.0 * config.radius, config.radius),
            angle: 0.0,
            max_angle: config.max_aim_angle,
            loaded,
            next,
        }
    }

    pub fn loaded(&self) -> BubbleColor {
        self.loaded
    }

    pub fn next(&self) -> BubbleColor {
        self.next
    }

    /// The loaded and next bubbles as unattached bubbles, for drawing the on-deck preview.
    pub fn preview(&self) -> [Bubble; 2] {
        [
            Bubble::unattached(self.loaded, self.origin),
            Bubble::unattached(self.next, self.next_origin),
        ]
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Aim at an absolute angle, clamped to keep shots from going too horizontal.
    pub fn set_angle(&mut self, angle: f64) {
        self.angle = angle.clamp(-self.max_angle, self.max_angle);
    }

    /// Turn the shooter by `delta` radians.
    pub fn rotate(&mut self, delta: f64) {
        self.set_angle(self.angle + delta);
    }

    /// Unit direction of the current aim (y grows downward, so up is -y).
    pub fn aim_direction(&self) -> DVec2 {
        DVec2::new(self.angle.sin(), -self.angle.cos())
    }

    /// Exchange the loaded and next bubbles.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.loaded, &mut self.next);
    }

    /// Build a spawn request for the loaded bubble and reload from the queue.
    pub fn fire(
        &mut self,
        board_colors: &BTreeSet<BubbleColor>,
        rng: &mut impl Rng,
    ) -> ProjectileSpawn {
        let spawn = ProjectileSpawn {
            color: self.loaded,
            origin: self.origin,
            direction: self.aim_direction(),
        };
        self.loaded = self.next;
        self.next = pick_color(board_colors, rng);
        debug!("Reloaded with {:?}, next is {:?}", self.loaded, self.next);
        spawn
    }
}
