//! Cluster detection - finding matching and floating bubbles.
//!
//! Both searches are breadth-first flood fills over Attached bubbles with
//! an explicit queue and visited set. Popping and falling bubbles are not
//! in the grid's slot map, so they never bridge two groups.

use std::collections::{HashSet, VecDeque};

use super::{grid::HexGrid, hex::HexCoord};

/// Find all Attached bubbles of the seed's color connected to the seed.
///
/// Returns an empty list if the seed slot is empty. The seed is always the
/// first entry; the rest are in BFS order.
pub fn find_cluster(grid: &HexGrid, start: HexCoord) -> Vec<HexCoord> {
    let Some(seed) = grid.get(start) else {
        return Vec::new();
    };
    let target_color = seed.color;

    let mut cluster = vec![start];
    let mut visited = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);

    while let Some(coord) = queue.pop_front() {
        for neighbor in grid.neighbors_of(coord) {
            if !visited.insert(neighbor) {
                continue;
            }
            let same_color = grid.get(neighbor).is_some_and(|b| b.color == target_color);
            if same_color {
                cluster.push(neighbor);
                queue.push_back(neighbor);
            }
        }
    }

    cluster
}

/// Find all Attached bubbles connected to the anchor row (row 0).
pub fn find_anchored(grid: &HexGrid) -> HashSet<HexCoord> {
    let mut anchored = HashSet::new();
    let mut queue = VecDeque::new();

    for coord in grid.top_row_coords() {
        anchored.insert(coord);
        queue.push_back(coord);
    }

    while let Some(coord) = queue.pop_front() {
        for neighbor in grid.neighbors_of(coord) {
            if anchored.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    anchored
}

/// Find all Attached bubbles with no path to the anchor row, sorted row-major.
pub fn find_floating(grid: &HexGrid) -> Vec<HexCoord> {
    let anchored = find_anchored(grid);
    let mut floating: Vec<HexCoord> = grid.coords().filter(|c| !anchored.contains(c)).collect();
    floating.sort();
    floating
}
