use bevy::math::DVec2;
use bevy::prelude::*;
use popgrid::PopGridPlugin;
use popgrid::game::bubble::BubbleColor;
use popgrid::game::config::BoardConfig;
use popgrid::game::hex::HexCoord;
use popgrid::game::level::Level;
use popgrid::game::state::{
    AimShooter, BoardSystems, BubblesDetached, BubblesPopped, FireLoaded, FireProjectile,
    GameFinished, GameOutcome, LoadLevel, Session, SwapBubbles,
};

#[derive(Resource, Default)]
struct Collected {
    popped: usize,
    detached: usize,
    finished: Vec<GameOutcome>,
}

fn collect(
    mut collected: ResMut<Collected>,
    mut popped: MessageReader<BubblesPopped>,
    mut detached: MessageReader<BubblesDetached>,
    mut finished: MessageReader<GameFinished>,
) {
    collected.popped += popped.read().map(|m| m.count).sum::<usize>();
    collected.detached += detached.read().map(|m| m.count).sum::<usize>();
    collected.finished.extend(finished.read().map(|m| m.outcome));
}

fn app_with_level(level: Level) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(PopGridPlugin {
        config: BoardConfig::default(),
        level,
        seed: Some(7),
        persist_scores: false,
    });
    app.init_resource::<Collected>();
    app.add_systems(Update, collect.after(BoardSystems));
    app
}

fn run_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

#[test]
fn test_fired_bubble_pops_pair_and_wins() {
    // Red pair on the top row with a green bubble hanging off it
    let mut app = app_with_level(Level {
        name: "pair".into(),
        shots: 5,
        rows: vec![vec![-1, -1, -1, -1, 0, 0], vec![-1, -1, -1, -1, 2]],
    });

    let x = BoardConfig::default()
        .layout()
        .grid_to_pixel(HexCoord::new(0, 6))
        .x;
    app.world_mut().write_message(FireProjectile {
        color: BubbleColor::Red,
        origin: DVec2::new(x, 460.0),
        direction: DVec2::new(0.0, -1.0),
    });

    run_frames(&mut app, 150);

    let collected = app.world().resource::<Collected>();
    assert_eq!(collected.popped, 3);
    assert_eq!(collected.detached, 1);
    assert_eq!(collected.finished, vec![GameOutcome::Won]);

    let session = app.world().resource::<Session>();
    assert_eq!(session.score().score, 50);
    assert_eq!(session.shots_remaining(), 4);
    assert!(session.board().is_board_clear());
    assert!(session.board().grid().in_transit().is_empty());
}

#[test]
fn test_shooter_messages_drive_the_session() {
    let mut app = app_with_level(Level {
        name: "yellow".into(),
        shots: 3,
        rows: vec![vec![3, 3, 3, 3]],
    });
    app.update();

    app.world_mut().write_message(AimShooter { delta: 10.0 });
    app.world_mut().write_message(SwapBubbles);
    app.update();
    {
        let session = app.world().resource::<Session>();
        assert_eq!(session.shooter().angle(), BoardConfig::default().max_aim_angle);
        assert_eq!(session.shooter().loaded(), BubbleColor::Yellow);
    }

    app.world_mut().write_message(FireLoaded);
    app.update();
    {
        let session = app.world().resource::<Session>();
        assert_eq!(session.shots_remaining(), 2);
        assert!(session.board().projectile().is_some());
    }

    // Banks off the right wall and lands under the yellow row
    run_frames(&mut app, 200);
    let collected = app.world().resource::<Collected>();
    assert_eq!(collected.popped, 5);
    assert_eq!(collected.finished, vec![GameOutcome::Won]);
    let session = app.world().resource::<Session>();
    assert!(session.board().projectile().is_none());
    assert!(session.board().is_board_clear());
}

#[test]
fn test_load_level_message_restarts() {
    let mut app = app_with_level(Level::reference());
    app.world_mut().write_message(FireLoaded);
    run_frames(&mut app, 3);

    app.world_mut().write_message(LoadLevel {
        level: Level {
            name: "small".into(),
            shots: 9,
            rows: vec![vec![1, 1]],
        },
    });
    app.update();

    let session = app.world().resource::<Session>();
    assert_eq!(session.level().name, "small");
    assert_eq!(session.shots_remaining(), 9);
    assert!(session.board().projectile().is_none());
    assert_eq!(session.board().grid().len(), 2);
}
