//! Game state management - score, shot budget, win/lose conditions.
//!
//! Win: clear every attached bubble from the board.
//! Lose: an attached bubble crosses the lose line, or the shots run out
//! with bubbles still on the board.

use bevy::{math::DVec2, prelude::*};
use rand::{SeedableRng, rngs::StdRng};

use super::{
    board::{Board, BoardEvent},
    bubble::BubbleColor,
    config::BoardConfig,
    error::LoadError,
    hex::HexCoord,
    level::Level,
    projectile::ProjectileSpawn,
    shooter::Shooter,
};

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<Session>();
    app.register_type::<GameScore>();

    app.add_message::<LoadLevel>();
    app.add_message::<AimShooter>();
    app.add_message::<SwapBubbles>();
    app.add_message::<FireProjectile>();
    app.add_message::<FireLoaded>();
    app.add_message::<BubblesPopped>();
    app.add_message::<BubblesDetached>();
    app.add_message::<GameFinished>();

    app.add_systems(
        Update,
        (
            handle_level_requests,
            handle_aim_requests,
            handle_swap_requests,
            handle_fire_requests,
            advance_session,
        )
            .chain()
            .in_set(BoardSystems),
    );
}

/// System set for the systems that drive the board.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoardSystems;

/// Message to restart on a new level.
#[derive(Message, Debug, Clone)]
pub struct LoadLevel {
    pub level: Level,
}

/// Message to turn the shooter by `delta` radians.
#[derive(Message, Debug, Clone)]
pub struct AimShooter {
    pub delta: f64,
}

/// Message to exchange the loaded and next bubbles.
#[derive(Message, Debug, Clone)]
pub struct SwapBubbles;

/// Message to fire a projectile with an explicit color, origin and direction.
#[derive(Message, Debug, Clone)]
pub struct FireProjectile {
    pub color: BubbleColor,
    pub origin: DVec2,
    pub direction: DVec2,
}

/// Message to fire the shooter's loaded bubble along its current aim.
#[derive(Message, Debug, Clone)]
pub struct FireLoaded;

/// Message sent when a cluster starts popping.
#[derive(Message, Debug, Clone)]
pub struct BubblesPopped {
    pub coords: Vec<HexCoord>,
    pub color: BubbleColor,
    pub count: usize,
}

/// Message sent when unsupported bubbles start falling.
#[derive(Message, Debug, Clone)]
pub struct BubblesDetached {
    pub coords: Vec<HexCoord>,
    pub count: usize,
}

/// Message sent once when a level is won or lost.
#[derive(Message, Debug, Clone)]
pub struct GameFinished {
    pub outcome: GameOutcome,
    pub level: String,
    pub score: GameScore,
}

/// Running score for the current level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Reflect)]
pub struct GameScore {
    pub score: u32,
    pub bubbles_popped: u32,
    pub bubbles_dropped: u32,
    pub clusters_popped: u32,
}

impl GameScore {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Score a board event. Returns the points it was worth.
    pub fn apply(&mut self, event: &BoardEvent, config: &BoardConfig) -> u32 {
        let count = event.count() as u32;
        let points = match event {
            BoardEvent::BubblesPopped { .. } => {
                self.bubbles_popped += count;
                self.clusters_popped += 1;
                count * config.points_per_pop
            }
            BoardEvent::BubblesDetached { .. } => {
                self.bubbles_dropped += count;
                count * config.points_per_drop
            }
            BoardEvent::BubbleSettled { .. } | BoardEvent::ProjectileDiscarded { .. } => 0,
        };
        self.score += points;
        points
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossReason {
    /// An attached bubble crossed the lose line.
    ReachedLoseLine,
    /// No shots left and bubbles remain.
    OutOfShots,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Won,
    Lost(LossReason),
}

/// One level in progress: the board, the shooter and the score.
#[derive(Resource, Debug, Clone)]
pub struct Session {
    board: Board,
    shooter: Shooter,
    score: GameScore,
    level: Level,
    shots_remaining: u32,
    outcome: Option<GameOutcome>,
    rng: StdRng,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(BoardConfig::default(), Level::reference(), StdRng::from_os_rng())
    }
}

impl Session {
    /// Start a session on `level`.
    ///
    /// A level that does not fit the board is still seeded, with a warning;
    /// slots off the board and unknown colors are left empty.
    pub fn new(config: BoardConfig, level: Level, mut rng: StdRng) -> Self {
        if let Err(e) = level.validate(&config.layout()) {
            warn!("Starting with an invalid level: {}", e);
        }
        let board = Board::from_level(config, &level);
        let shooter = Shooter::new(board.config(), &board.colors_on_board(), &mut rng);
        Self {
            shots_remaining: level.shots,
            board,
            shooter,
            score: GameScore::default(),
            level,
            outcome: None,
            rng,
        }
    }

    /// A session with a fixed color sequence, for replays and tests.
    pub fn with_seed(config: BoardConfig, level: Level, seed: u64) -> Self {
        Self::new(config, level, StdRng::seed_from_u64(seed))
    }

    /// Start a level from scratch, keeping the board config and rng.
    ///
    /// An invalid level is rejected and the current one keeps running.
    pub fn load_level(&mut self, level: Level) -> Result<(), LoadError> {
        level.validate(self.board.grid().layout())?;
        info!("Loading level '{}' with {} shots", level.name, level.shots);
        self.board = Board::from_level(self.board.config().clone(), &level);
        let colors = self.board.colors_on_board();
        self.shooter = Shooter::new(self.board.config(), &colors, &mut self.rng);
        self.shots_remaining = level.shots;
        self.score.reset();
        self.outcome = None;
        self.level = level;
        Ok(())
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn shooter(&self) -> &Shooter {
        &self.shooter
    }

    pub fn shooter_mut(&mut self) -> &mut Shooter {
        &mut self.shooter
    }

    pub fn score(&self) -> &GameScore {
        &self.score
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn shots_remaining(&self) -> u32 {
        self.shots_remaining
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    fn can_fire(&self) -> bool {
        self.outcome.is_none() && self.shots_remaining > 0 && self.board.projectile().is_none()
    }

    /// Fire the shooter's loaded bubble. Returns false if firing is not allowed.
    pub fn fire(&mut self) -> bool {
        if !self.can_fire() {
            return false;
        }
        let spawn = self.shooter.fire(&self.board.colors_on_board(), &mut self.rng);
        self.launch(spawn)
    }

    /// Fire an externally built projectile. Returns false if firing is not allowed.
    pub fn fire_spawn(&mut self, spawn: ProjectileSpawn) -> bool {
        if !self.can_fire() {
            return false;
        }
        self.launch(spawn)
    }

    fn launch(&mut self, spawn: ProjectileSpawn) -> bool {
        if !self.board.fire(spawn) {
            return false;
        }
        self.shots_remaining -= 1;
        info!(
            "Fired {:?} bubble ({} shots left)",
            spawn.color, self.shots_remaining
        );
        true
    }

    pub fn swap(&mut self) {
        self.shooter.swap();
    }

    /// Advance one frame, score its events, and check for a result.
    pub fn tick(&mut self) -> Vec<BoardEvent> {
        let events = self.board.tick();
        for event in &events {
            let points = self.score.apply(event, self.board.config());
            if points > 0 {
                info!("+{} points (total: {})", points, self.score.score);
            }
        }
        if self.outcome.is_none() {
            self.outcome = self.check_outcome();
            if let Some(outcome) = self.outcome {
                info!(
                    "Level '{}' finished: {:?}, final score {}",
                    self.level.name, outcome, self.score.score
                );
            }
        }
        events
    }

    fn check_outcome(&self) -> Option<GameOutcome> {
        // Need to have popped at least one cluster to win
        // (prevents winning on an empty level at start)
        if self.score.clusters_popped > 0 && self.board.is_board_clear() {
            return Some(GameOutcome::Won);
        }
        if self.board.is_past_lose_line() {
            return Some(GameOutcome::Lost(LossReason::ReachedLoseLine));
        }
        let settled = self.board.projectile().is_none() && self.board.pending_tasks() == 0;
        if self.shots_remaining == 0 && settled && !self.board.is_board_clear() {
            return Some(GameOutcome::Lost(LossReason::OutOfShots));
        }
        None
    }
}

fn handle_level_requests(mut session: ResMut<Session>, mut requests: MessageReader<LoadLevel>) {
    for request in requests.read() {
        if let Err(e) = session.load_level(request.level.clone()) {
            warn!("Ignoring level request: {}", e);
        }
    }
}

fn handle_aim_requests(mut session: ResMut<Session>, mut requests: MessageReader<AimShooter>) {
    for request in requests.read() {
        session.shooter_mut().rotate(request.delta);
    }
}

fn handle_swap_requests(mut session: ResMut<Session>, mut requests: MessageReader<SwapBubbles>) {
    for _ in requests.read() {
        session.swap();
    }
}

fn handle_fire_requests(
    mut session: ResMut<Session>,
    mut fire_events: MessageReader<FireProjectile>,
    mut fire_loaded_events: MessageReader<FireLoaded>,
) {
    for event in fire_events.read() {
        let spawn = ProjectileSpawn {
            color: event.color,
            origin: event.origin,
            direction: event.direction,
        };
        if !session.fire_spawn(spawn) {
            debug!("Fire request rejected: {:?}", event);
        }
    }
    for _ in fire_loaded_events.read() {
        if !session.fire() {
            debug!("Fire request rejected, shooter not ready");
        }
    }
}

/// Run one board tick and forward its events.
fn advance_session(
    mut session: ResMut<Session>,
    mut popped_events: MessageWriter<BubblesPopped>,
    mut detached_events: MessageWriter<BubblesDetached>,
    mut finished_events: MessageWriter<GameFinished>,
) {
    let was_finished = session.outcome().is_some();

    for event in session.tick() {
        match event {
            BoardEvent::BubblesPopped { color, coords } => {
                popped_events.write(BubblesPopped {
                    count: coords.len(),
                    coords,
                    color,
                });
            }
            BoardEvent::BubblesDetached { coords } => {
                detached_events.write(BubblesDetached {
                    count: coords.len(),
                    coords,
                });
            }
            BoardEvent::BubbleSettled { .. } | BoardEvent::ProjectileDiscarded { .. } => {}
        }
    }

    if !was_finished && let Some(outcome) = session.outcome() {
        finished_events.write(GameFinished {
            outcome,
            level: session.level().name.clone(),
            score: session.score().clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(rows: Vec<Vec<i8>>, shots: u32) -> Level {
        Level {
            name: "test".into(),
            shots,
            rows,
        }
    }

    fn up_from_column(session: &Session, col: i32, color: BubbleColor) -> ProjectileSpawn {
        let layout = session.board().grid().layout();
        ProjectileSpawn {
            color,
            origin: DVec2::new(layout.grid_to_pixel(HexCoord::new(0, col)).x, 460.0),
            direction: DVec2::new(0.0, -1.0),
        }
    }

    fn run_until_settled(session: &mut Session) {
        for _ in 0..300 {
            session.tick();
            if session.board().projectile().is_none() && session.board().pending_tasks() == 0 {
                return;
            }
        }
    }

    #[test]
    fn test_score_counts_pops_and_drops_separately() {
        let config = BoardConfig::default();
        let mut score = GameScore::default();
        let popped = BoardEvent::BubblesPopped {
            color: BubbleColor::Red,
            coords: vec![HexCoord::new(0, 0); 4],
        };
        let dropped = BoardEvent::BubblesDetached {
            coords: vec![HexCoord::new(3, 3); 2],
        };
        assert_eq!(score.apply(&popped, &config), 40);
        assert_eq!(score.apply(&dropped, &config), 40);
        assert_eq!(
            score,
            GameScore {
                score: 80,
                bubbles_popped: 4,
                bubbles_dropped: 2,
                clusters_popped: 1
            }
        );
    }

    #[test]
    fn test_clearing_the_board_wins() {
        // Red pair anchored at the top, green bubble hanging beneath it
        let mut session = Session::with_seed(
            BoardConfig::default(),
            level(vec![vec![-1, -1, -1, -1, 0, 0], vec![-1, -1, -1, -1, 2]], 5),
            1,
        );
        assert!(session.fire_spawn(up_from_column(&session, 6, BubbleColor::Red)));
        run_until_settled(&mut session);

        assert_eq!(session.outcome(), Some(GameOutcome::Won));
        assert_eq!(session.score().bubbles_popped, 3);
        assert_eq!(session.score().bubbles_dropped, 1);
        assert_eq!(session.score().score, 3 * 10 + 20);
        assert_eq!(session.shots_remaining(), 4);
        assert!(!session.fire());
    }

    #[test]
    fn test_running_out_of_shots_loses() {
        let mut session = Session::with_seed(BoardConfig::default(), level(vec![vec![0]], 1), 2);
        assert!(session.fire_spawn(up_from_column(&session, 8, BubbleColor::Blue)));
        assert!(!session.fire_spawn(up_from_column(&session, 8, BubbleColor::Blue)));
        run_until_settled(&mut session);

        assert_eq!(session.shots_remaining(), 0);
        assert_eq!(session.outcome(), Some(GameOutcome::Lost(LossReason::OutOfShots)));
    }

    #[test]
    fn test_reaching_lose_line_loses() {
        // One bubble per row down the left edge, the last one at y = 401
        let rows: Vec<Vec<i8>> = (0..12).map(|row: i8| vec![row % 6]).collect();
        let mut session = Session::with_seed(BoardConfig::default(), level(rows, 10), 3);
        session.tick();
        assert_eq!(
            session.outcome(),
            Some(GameOutcome::Lost(LossReason::ReachedLoseLine))
        );
    }

    #[test]
    fn test_shooter_deals_board_colors() {
        let level = level(vec![vec![3, 3, 3, 3]], 50);
        let mut session = Session::with_seed(BoardConfig::default(), level, 4);
        assert_eq!(session.shooter().loaded(), BubbleColor::Yellow);
        assert!(session.fire());
        assert_eq!(session.board().projectile().map(|p| p.color), Some(BubbleColor::Yellow));
        assert_eq!(session.shooter().next(), BubbleColor::Yellow);
    }

    #[test]
    fn test_load_level_resets_progress() {
        let mut session = Session::with_seed(BoardConfig::default(), level(vec![vec![0]], 1), 5);
        session.fire_spawn(up_from_column(&session, 8, BubbleColor::Blue));
        run_until_settled(&mut session);
        assert!(session.outcome().is_some());

        assert!(session.load_level(level(vec![vec![1, 1]], 7)).is_ok());
        assert_eq!(session.outcome(), None);
        assert_eq!(session.shots_remaining(), 7);
        assert_eq!(session.board().grid().len(), 2);
        assert_eq!(session.score(), &GameScore::default());
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        let mut session = Session::with_seed(BoardConfig::default(), level(vec![vec![0]], 3), 6);
        let err = session.load_level(level(vec![vec![0, 9]], 3)).unwrap_err();
        assert!(matches!(err, LoadError::InvalidLevel { .. }));
        assert_eq!(session.level().name, "test");
        assert_eq!(session.board().grid().len(), 1);

        let wide = level(vec![vec![1; 12], vec![1; 12]], 3);
        assert!(session.load_level(wide).is_err());
        assert_eq!(session.board().grid().len(), 1);
    }

    #[test]
    fn test_empty_level_is_not_won() {
        let mut session = Session::with_seed(BoardConfig::default(), level(vec![], 5), 7);
        assert!(session.board().is_board_clear());
        for _ in 0..5 {
            session.tick();
        }
        assert_eq!(session.outcome(), None);
        assert!(session.fire());
    }

    #[test]
    fn test_last_shot_waits_for_pending_detachment() {
        // Red pair anchored at the top, green bubble hanging beneath it
        let mut session = Session::with_seed(
            BoardConfig::default(),
            level(vec![vec![-1, -1, -1, -1, 0, 0], vec![-1, -1, -1, -1, 2]], 1),
            8,
        );
        assert!(session.fire_spawn(up_from_column(&session, 6, BubbleColor::Red)));
        for _ in 0..100 {
            session.tick();
            if session.board().projectile().is_none() {
                break;
            }
        }

        // Out of shots with the green bubble still attached, but its drop is queued
        assert_eq!(session.shots_remaining(), 0);
        assert_eq!(session.board().pending_tasks(), 1);
        assert!(!session.board().is_board_clear());
        assert_eq!(session.outcome(), None);

        run_until_settled(&mut session);
        assert_eq!(session.outcome(), Some(GameOutcome::Won));
        assert_eq!(session.score().bubbles_dropped, 1);
    }
}
