//! The board - owns the grid and runs one tick of the matching engine.
//!
//! Per tick: due deferred tasks run first, then the projectile moves and is
//! tested for contact. A landed projectile is committed to the grid and
//! matched against its neighbors; a match schedules a detachment check a
//! few frames later. Finally popping and falling bubbles animate.

use bevy::{
    log::{debug, info, warn},
    math::DVec2,
};
use std::collections::BTreeSet;

use super::{
    bubble::BubbleColor,
    cluster::{find_cluster, find_floating},
    config::BoardConfig,
    grid::HexGrid,
    hex::HexCoord,
    level::Level,
    projectile::{Projectile, ProjectileSpawn, resolve_slot},
    schedule::{BoardTask, DeferredTasks},
};

/// Something that happened during a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardEvent {
    /// A projectile became an attached bubble.
    BubbleSettled { coord: HexCoord, color: BubbleColor },
    /// A same-color group started popping.
    BubblesPopped { color: BubbleColor, coords: Vec<HexCoord> },
    /// Bubbles cut off from the anchor row started falling.
    BubblesDetached { coords: Vec<HexCoord> },
    /// A projectile left the board without settling.
    ProjectileDiscarded { position: DVec2 },
}

impl BoardEvent {
    /// Number of bubbles affected, for scoring.
    pub fn count(&self) -> usize {
        match self {
            BoardEvent::BubbleSettled { .. } => 1,
            BoardEvent::BubblesPopped { coords, .. } | BoardEvent::BubblesDetached { coords } => {
                coords.len()
            }
            BoardEvent::ProjectileDiscarded { .. } => 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Board {
    config: BoardConfig,
    grid: HexGrid,
    projectile: Option<Projectile>,
    tasks: DeferredTasks<BoardTask>,
    frame: u64,
}

impl Board {
    /// Create an empty board.
    pub fn new(config: BoardConfig) -> Self {
        Self {
            grid: HexGrid::new(config.layout()),
            config,
            projectile: None,
            tasks: DeferredTasks::new(),
            frame: 0,
        }
    }

    /// Create a board seeded from a level table.
    pub fn from_level(config: BoardConfig, level: &Level) -> Self {
        let mut board = Self::new(config);
        let mut count = 0;
        for (coord, color) in level.bubbles() {
            if board.seed(coord, color) {
                count += 1;
            } else {
                warn!("Level '{}' places a bubble off the board at {}", level.name, coord);
            }
        }
        info!("Seeded {} bubbles from level '{}'", count, level.name);
        board
    }

    /// Attach a bubble without running match detection (level setup).
    pub fn seed(&mut self, coord: HexCoord, color: BubbleColor) -> bool {
        self.grid.insert(coord, color)
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn grid(&self) -> &HexGrid {
        &self.grid
    }

    /// The projectile in flight, if any.
    pub fn projectile(&self) -> Option<&Projectile> {
        self.projectile.as_ref()
    }

    /// Number of completed ticks.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Number of deferred tasks not yet run.
    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Launch a projectile.
    ///
    /// Returns false if one is already in flight or the direction is zero.
    pub fn fire(&mut self, spawn: ProjectileSpawn) -> bool {
        if self.projectile.is_some() {
            debug!("Ignoring fire request, projectile already in flight");
            return false;
        }
        let Some(projectile) = Projectile::launch(spawn, &self.config) else {
            return false;
        };
        info!(
            "Fired {:?} bubble from {:?} towards {:?}",
            projectile.color, projectile.position, projectile.velocity
        );
        self.projectile = Some(projectile);
        true
    }

    /// Advance the board by one frame and return what happened.
    pub fn tick(&mut self) -> Vec<BoardEvent> {
        self.frame += 1;
        let mut events = Vec::new();

        for task in self.tasks.drain_due(self.frame) {
            self.run_task(task, &mut events);
        }

        self.step_projectile(&mut events);
        self.grid.advance_in_transit(&self.config);

        events
    }

    fn run_task(&mut self, task: BoardTask, events: &mut Vec<BoardEvent>) {
        match task {
            BoardTask::DetachFloating => self.detach_floating(events),
        }
    }

    fn step_projectile(&mut self, events: &mut Vec<BoardEvent>) {
        let Some(mut projectile) = self.projectile.take() else {
            return;
        };

        projectile.advance(&self.config);

        if projectile.is_out_of_bounds(&self.config) {
            warn!("Projectile left the board at {:?}, discarding", projectile.position);
            events.push(BoardEvent::ProjectileDiscarded {
                position: projectile.position,
            });
            return;
        }

        let Some(contact) = projectile.contact(&self.grid, &self.config) else {
            self.projectile = Some(projectile);
            return;
        };
        debug!("Projectile contact {:?} at {:?}", contact, projectile.position);

        match resolve_slot(&self.grid, projectile.position) {
            Some(coord) => self.settle(coord, projectile.color, events),
            None => {
                warn!(
                    "No free slot near {:?}, discarding projectile",
                    projectile.position
                );
                events.push(BoardEvent::ProjectileDiscarded {
                    position: projectile.position,
                });
            }
        }
    }

    /// Commit a bubble to a free slot and pop its group if it is big enough.
    fn settle(&mut self, coord: HexCoord, color: BubbleColor, events: &mut Vec<BoardEvent>) {
        if !self.grid.insert(coord, color) {
            warn!("Slot {} is not free, dropping {:?} bubble", coord, color);
            return;
        }
        info!("Bubble landed at {} with color {:?}", coord, color);
        events.push(BoardEvent::BubbleSettled { coord, color });

        let cluster = find_cluster(&self.grid, coord);
        if cluster.len() < self.config.match_threshold {
            return;
        }

        info!("Found cluster of {} {:?} bubbles at {}", cluster.len(), color, coord);
        for &member in &cluster {
            self.grid.pop(member);
        }
        events.push(BoardEvent::BubblesPopped {
            color,
            coords: cluster,
        });

        let run_at = self.frame + self.config.detach_delay_frames;
        self.tasks.schedule(run_at, BoardTask::DetachFloating);
    }

    /// Drop every attached bubble with no path to the anchor row.
    fn detach_floating(&mut self, events: &mut Vec<BoardEvent>) {
        let floating = find_floating(&self.grid);
        if floating.is_empty() {
            return;
        }

        info!("Found {} floating bubbles to drop", floating.len());
        for &coord in &floating {
            self.grid.drop_bubble(coord);
        }
        events.push(BoardEvent::BubblesDetached { coords: floating });
    }

    /// True once no attached bubbles remain.
    pub fn is_board_clear(&self) -> bool {
        self.grid.is_empty()
    }

    /// Center y of the lowest attached bubble.
    pub fn lowest_attached_y(&self) -> Option<f64> {
        self.grid.lowest_y()
    }

    /// True once an attached bubble sits below the lose line.
    pub fn is_past_lose_line(&self) -> bool {
        self.lowest_attached_y().is_some_and(|y| y > self.config.lose_line_y)
    }

    /// Distinct colors currently attached.
    pub fn colors_on_board(&self) -> BTreeSet<BubbleColor> {
        self.grid.colors()
    }

    /// Remove everything and start over at frame zero.
    pub fn reset(&mut self) {
        self.grid.clear();
        self.projectile = None;
        self.tasks.clear();
        self.frame = 0;
    }
}
