//! Hexagonal coordinate system using offset coordinates.
//!
//! Based on Red Blob Games' guide:
//! https://www.redblobgames.com/grids/hexagons/
//!
//! Rows grow downward and odd rows are shifted right by one radius, the
//! classic "brick" packing of a bubble shooter board. Even rows hold
//! `columns` slots, odd rows one fewer.

use bevy::{math::DVec2, prelude::*};

pub(super) fn plugin(app: &mut App) {
    app.register_type::<HexCoord>();
}

/// Offset hex coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct HexCoord {
    /// Row (y-axis, 0 is the anchor row at the top)
    pub row: i32,
    /// Column (x-axis)
    pub col: i32,
}

/// Neighbor offsets for even rows.
const EVEN_ROW_NEIGHBORS: [(i32, i32); 6] = [(-1, -1), (-1, 0), (0, -1), (0, 1), (1, -1), (1, 0)];

/// Neighbor offsets for odd rows (shifted right).
const ODD_ROW_NEIGHBORS: [(i32, i32); 6] = [(-1, 0), (-1, 1), (0, -1), (0, 1), (1, 0), (1, 1)];

impl HexCoord {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Marks a bubble that is not on the board (in flight or waiting in the shooter).
    pub const UNATTACHED: Self = Self { row: -1, col: -1 };

    #[inline]
    pub const fn is_odd_row(&self) -> bool {
        self.row % 2 != 0
    }

    /// Get all 6 neighboring coordinates, whether or not they are on the board.
    ///
    /// Diagonal neighbors depend on row parity.
    pub fn neighbors(&self) -> [HexCoord; 6] {
        let offsets = if self.is_odd_row() {
            &ODD_ROW_NEIGHBORS
        } else {
            &EVEN_ROW_NEIGHBORS
        };
        offsets.map(|(dr, dc)| HexCoord::new(self.row + dr, self.col + dc))
    }
}

impl std::fmt::Display for HexCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl std::ops::Add for HexCoord {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        HexCoord::new(self.row + other.row, self.col + other.col)
    }
}

/// Maps between board coordinates and pixel centers.
///
/// Built from [`BoardConfig::layout`](super::config::BoardConfig::layout).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexLayout {
    pub radius: f64,
    pub columns: i32,
    pub rows: i32,
    pub left_margin: f64,
    pub top_margin: f64,
    pub row_spacing: f64,
}

impl HexLayout {
    pub fn diameter(&self) -> f64 {
        self.radius * 2.0
    }

    /// Number of slots in a row: `columns` on even rows, one fewer on odd rows.
    pub fn columns_in_row(&self, row: i32) -> i32 {
        if row % 2 != 0 { self.columns - 1 } else { self.columns }
    }

    /// Check if a coordinate is a slot on the board.
    pub fn contains(&self, coord: HexCoord) -> bool {
        coord.row >= 0
            && coord.row < self.rows
            && coord.col >= 0
            && coord.col < self.columns_in_row(coord.row)
    }

    /// Iterate over every slot in row-major order.
    pub fn slots(&self) -> impl Iterator<Item = HexCoord> + '_ {
        (0..self.rows).flat_map(move |row| {
            (0..self.columns_in_row(row)).map(move |col| HexCoord::new(row, col))
        })
    }

    /// Pixel center of a slot.
    pub fn grid_to_pixel(&self, coord: HexCoord) -> DVec2 {
        let d = self.diameter();
        let offset_x = if coord.is_odd_row() { self.radius } else { 0.0 };
        let x = coord.col as f64 * d + self.radius + offset_x + self.left_margin;
        let y = coord.row as f64 * (d * self.row_spacing) + self.radius + self.top_margin;
        DVec2::new(x, y)
    }

    /// The slot whose center is closest to `pos`.
    ///
    /// Exhaustive over the whole board. On a tie the first slot in row-major
    /// order wins.
    pub fn nearest_slot(&self, pos: DVec2) -> HexCoord {
        let mut best = HexCoord::new(0, 0);
        let mut best_distance = f64::INFINITY;

        for coord in self.slots() {
            let distance = self.grid_to_pixel(coord).distance(pos);
            if distance < best_distance {
                best = coord;
                best_distance = distance;
            }
        }

        best
    }
}
