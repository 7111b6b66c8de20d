//! The hexagonal grid that holds all bubbles.
//!
//! Uses a HashMap for sparse storage - only occupied slots are stored, and
//! only Attached bubbles live in the map. Popping and falling bubbles move
//! to a separate in-transit list, so every occupancy and adjacency query
//! sees Attached bubbles only.

use bevy::log::debug;
use std::collections::{BTreeSet, HashMap};

use super::{
    bubble::{Bubble, BubbleColor},
    config::BoardConfig,
    hex::{HexCoord, HexLayout},
};

#[derive(Debug, Clone)]
pub struct HexGrid {
    layout: HexLayout,
    /// Attached bubbles keyed by slot.
    bubbles: HashMap<HexCoord, Bubble>,
    /// Popping and falling bubbles, kept until their animation ends.
    in_transit: Vec<Bubble>,
}

impl HexGrid {
    /// Create a new empty grid.
    pub fn new(layout: HexLayout) -> Self {
        Self {
            layout,
            bubbles: HashMap::new(),
            in_transit: Vec::new(),
        }
    }

    pub fn layout(&self) -> &HexLayout {
        &self.layout
    }

    /// Check if a slot holds an Attached bubble.
    pub fn is_occupied(&self, coord: HexCoord) -> bool {
        self.bubbles.contains_key(&coord)
    }

    /// Get the Attached bubble at a slot, if any.
    pub fn get(&self, coord: HexCoord) -> Option<&Bubble> {
        self.bubbles.get(&coord)
    }

    /// Attach a new bubble at a slot.
    ///
    /// Refuses (returns false) if the slot is off the board or already taken.
    pub fn insert(&mut self, coord: HexCoord, color: BubbleColor) -> bool {
        if !self.layout.contains(coord) || self.is_occupied(coord) {
            return false;
        }
        self.bubbles.insert(coord, Bubble::attached(coord, color, &self.layout));
        true
    }

    /// Take a bubble off the board without any animation.
    pub fn remove(&mut self, coord: HexCoord) -> Option<Bubble> {
        self.bubbles.remove(&coord)
    }

    /// Occupied neighbors of a slot.
    pub fn neighbors_of(&self, coord: HexCoord) -> impl Iterator<Item = HexCoord> + '_ {
        coord
            .neighbors()
            .into_iter()
            .filter(|n| self.is_occupied(*n))
    }

    /// Move an Attached bubble to Popping. Returns false if the slot was empty.
    pub fn pop(&mut self, coord: HexCoord) -> bool {
        self.retire(coord, Bubble::start_popping)
    }

    /// Move an Attached bubble to Falling. Returns false if the slot was empty.
    pub fn drop_bubble(&mut self, coord: HexCoord) -> bool {
        self.retire(coord, Bubble::start_falling)
    }

    fn retire(&mut self, coord: HexCoord, transition: fn(&mut Bubble)) -> bool {
        let Some(mut bubble) = self.bubbles.remove(&coord) else {
            return false;
        };
        transition(&mut bubble);
        self.in_transit.push(bubble);
        true
    }

    /// Advance every popping/falling bubble one tick and drop finished ones.
    pub fn advance_in_transit(&mut self, config: &BoardConfig) {
        let before = self.in_transit.len();
        self.in_transit.retain_mut(|bubble| bubble.advance(config));
        let removed = before - self.in_transit.len();
        if removed > 0 {
            debug!("Removed {} finished bubbles", removed);
        }
    }

    /// Popping and falling bubbles.
    pub fn in_transit(&self) -> &[Bubble] {
        &self.in_transit
    }

    /// Clear all bubbles, including those in transit.
    pub fn clear(&mut self) {
        self.bubbles.clear();
        self.in_transit.clear();
    }

    /// Get the number of Attached bubbles.
    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }

    /// Iterate over all Attached bubbles.
    pub fn iter(&self) -> impl Iterator<Item = (&HexCoord, &Bubble)> {
        self.bubbles.iter()
    }

    /// Get all occupied coordinates.
    pub fn coords(&self) -> impl Iterator<Item = HexCoord> + '_ {
        self.bubbles.keys().copied()
    }

    /// Attached bubbles in the anchor row.
    /// Used as starting point for floating bubble detection.
    pub fn top_row_coords(&self) -> Vec<HexCoord> {
        self.bubbles.keys().filter(|c| c.row == 0).copied().collect()
    }

    /// Largest center y among Attached bubbles.
    pub fn lowest_y(&self) -> Option<f64> {
        self.bubbles
            .values()
            .map(|b| b.position.y)
            .max_by(|a, b| a.total_cmp(b))
    }

    /// Distinct colors currently attached, in palette order.
    pub fn colors(&self) -> BTreeSet<BubbleColor> {
        self.bubbles.values().map(|b| b.color).collect()
    }
}
