//! Projectile - the bubble being shot.
//!
//! The projectile travels in a straight line, bouncing off the side walls,
//! until it touches an attached bubble or the top of the board. It then
//! snaps to the best free slot near where it stopped.

use bevy::{log::warn, math::DVec2};

use super::{bubble::BubbleColor, config::BoardConfig, grid::HexGrid, hex::HexCoord};

/// Placement candidates relative to the nearest slot, probed in this order:
/// self, north, south, west, east, then NW, NE, SW, SE.
pub const PLACEMENT_PROBE: [(i32, i32); 9] = [
    (0, 0),
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

/// A request from the shooter to launch a bubble.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileSpawn {
    pub color: BubbleColor,
    pub origin: DVec2,
    /// Direction of travel; normalized on launch.
    pub direction: DVec2,
}

/// The bubble in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub position: DVec2,
    /// Unit direction of travel.
    pub velocity: DVec2,
    /// Pixels per tick.
    pub speed: f64,
    pub color: BubbleColor,
    pub radius: f64,
}

/// What a projectile ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Within two radii of this attached bubble.
    Bubble(HexCoord),
    /// Reached the top edge of the board.
    Ceiling,
}

impl Projectile {
    /// Launch a projectile. Returns None for a zero-length direction.
    pub fn launch(spawn: ProjectileSpawn, config: &BoardConfig) -> Option<Self> {
        let velocity = spawn.direction.normalize_or_zero();
        if velocity == DVec2::ZERO {
            warn!("Ignoring projectile with no direction: {:?}", spawn);
            return None;
        }
        Some(Self {
            position: spawn.origin,
            velocity,
            speed: config.projectile_speed,
            color: spawn.color,
            radius: config.radius,
        })
    }

    /// Move one tick, bouncing off the side walls.
    pub fn advance(&mut self, config: &BoardConfig) {
        self.position += self.velocity * self.speed;

        let left_wall = config.left_wall();
        let right_wall = config.right_wall();

        if self.position.x - self.radius < left_wall {
            self.position.x = left_wall + self.radius;
            self.velocity.x = self.velocity.x.abs();
        }

        if self.position.x + self.radius > right_wall {
            self.position.x = right_wall - self.radius;
            self.velocity.x = -self.velocity.x.abs();
        }
    }

    /// Check for contact with attached bubbles or the top edge.
    pub fn contact(&self, grid: &HexGrid, config: &BoardConfig) -> Option<Contact> {
        let hit_distance = self.radius * 2.0;
        let hit = grid
            .iter()
            .find(|(_, bubble)| bubble.position.distance(self.position) < hit_distance)
            .map(|(coord, _)| Contact::Bubble(*coord));

        if hit.is_some() {
            return hit;
        }

        if self.position.y <= config.top_margin + self.radius {
            return Some(Contact::Ceiling);
        }

        None
    }

    /// True once the projectile has left through the bottom of the board.
    pub fn is_out_of_bounds(&self, config: &BoardConfig) -> bool {
        self.position.y > config.lower_bound()
    }
}

/// Pick the slot a projectile stopped at `pos` settles into.
///
/// Probes [`PLACEMENT_PROBE`] around the nearest slot and returns the first
/// candidate that is on the board and free.
pub fn resolve_slot(grid: &HexGrid, pos: DVec2) -> Option<HexCoord> {
    let layout = grid.layout();
    let nearest = layout.nearest_slot(pos);

    PLACEMENT_PROBE
        .iter()
        .map(|&(dr, dc)| nearest + HexCoord::new(dr, dc))
        .find(|&candidate| layout.contains(candidate) && !grid.is_occupied(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn(origin: DVec2, direction: DVec2) -> ProjectileSpawn {
        ProjectileSpawn {
            color: BubbleColor::Red,
            origin,
            direction,
        }
    }

    fn launch(origin: DVec2, direction: DVec2, config: &BoardConfig) -> Projectile {
        Projectile::launch(spawn(origin, direction), config).unwrap()
    }

    #[test]
    fn test_launch_normalizes_direction() {
        let config = BoardConfig::default();
        let projectile = launch(DVec2::new(240.0, 460.0), DVec2::new(0.0, -3.0), &config);
        assert_eq!(projectile.velocity, DVec2::new(0.0, -1.0));
        assert_eq!(projectile.radius, config.radius);

        assert!(Projectile::launch(spawn(DVec2::ZERO, DVec2::ZERO), &config).is_none());
    }

    #[test]
    fn test_advance_moves_by_speed() {
        let config = BoardConfig::default();
        let mut projectile = launch(DVec2::new(240.0, 460.0), DVec2::new(0.0, -1.0), &config);
        projectile.advance(&config);
        assert_eq!(projectile.position, DVec2::new(240.0, 450.0));
    }

    #[test]
    fn test_bounces_off_side_walls() {
        let config = BoardConfig::default();
        let mut projectile = launch(DVec2::new(25.0, 400.0), DVec2::new(-1.0, -1.0), &config);
        projectile.advance(&config);
        assert_eq!(projectile.position.x, config.left_wall() + config.radius);
        assert!(projectile.velocity.x > 0.0);
        assert!(projectile.velocity.y < 0.0);

        let mut projectile = launch(DVec2::new(455.0, 400.0), DVec2::new(1.0, -1.0), &config);
        projectile.advance(&config);
        assert_eq!(projectile.position.x, config.right_wall() - config.radius);
        assert!(projectile.velocity.x < 0.0);
    }

    #[test]
    fn test_never_leaves_horizontal_extent() {
        let config = BoardConfig::default();
        let mut projectile = launch(config.shooter_origin(), DVec2::new(5.0, -1.0), &config);
        for _ in 0..200 {
            projectile.advance(&config);
            assert!(projectile.position.x - projectile.radius >= config.left_wall());
            assert!(projectile.position.x + projectile.radius <= config.right_wall());
        }
    }

    #[test]
    fn test_contact_with_bubble_and_ceiling() {
        let config = BoardConfig::default();
        let mut grid = HexGrid::new(config.layout());
        grid.insert(HexCoord::new(2, 5), BubbleColor::Blue);
        let target = grid.layout().grid_to_pixel(HexCoord::new(2, 5));

        let mut projectile = launch(target + DVec2::new(0.0, 41.0), DVec2::new(0.0, -1.0), &config);
        assert_eq!(projectile.contact(&grid, &config), None);
        projectile.position.y -= 2.0;
        assert_eq!(
            projectile.contact(&grid, &config),
            Some(Contact::Bubble(HexCoord::new(2, 5)))
        );

        projectile.position = DVec2::new(100.0, config.radius);
        assert_eq!(projectile.contact(&grid, &config), Some(Contact::Ceiling));
    }

    #[test]
    fn test_resolve_prefers_nearest_slot() {
        let config = BoardConfig::default();
        let grid = HexGrid::new(config.layout());
        let pos = grid.layout().grid_to_pixel(HexCoord::new(3, 4)) + DVec2::new(3.0, -2.0);
        assert_eq!(resolve_slot(&grid, pos), Some(HexCoord::new(3, 4)));
    }

    #[test]
    fn test_resolve_probes_in_fixed_order() {
        let config = BoardConfig::default();
        let mut grid = HexGrid::new(config.layout());
        let center = HexCoord::new(4, 4);
        let pos = grid.layout().grid_to_pixel(center);

        let expected_order = [
            HexCoord::new(4, 4),
            HexCoord::new(3, 4),
            HexCoord::new(5, 4),
            HexCoord::new(4, 3),
            HexCoord::new(4, 5),
            HexCoord::new(3, 3),
            HexCoord::new(3, 5),
            HexCoord::new(5, 3),
            HexCoord::new(5, 5),
        ];
        for expected in expected_order {
            assert_eq!(resolve_slot(&grid, pos), Some(expected));
            grid.insert(expected, BubbleColor::Green);
        }
        // All nine candidates taken
        assert_eq!(resolve_slot(&grid, pos), None);
    }

    #[test]
    fn test_resolve_skips_off_board_candidates() {
        let config = BoardConfig::default();
        let mut grid = HexGrid::new(config.layout());
        grid.insert(HexCoord::new(0, 0), BubbleColor::Green);
        let pos = grid.layout().grid_to_pixel(HexCoord::new(0, 0));
        // North, west and the northern diagonals are off the board
        assert_eq!(resolve_slot(&grid, pos), Some(HexCoord::new(1, 0)));
    }
}
