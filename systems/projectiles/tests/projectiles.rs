use path_defence_core::{
    BulletId, CellCoord, Command, EnemyId, EnemyStats, Event, Grid, Health, Path, Timestamp,
    TowerId, TowerKind,
};
use path_defence_system_projectiles::{Config, Projectiles};
use path_defence_world::{self as world, query, Config as WorldConfig, World};

fn session() -> World {
    World::new(WorldConfig {
        grid: Grid::new(16, 12, 40.0),
        path: Path::new(vec![CellCoord::new(0, 6), CellCoord::new(15, 6)], 40.0)
            .expect("valid path"),
        lives: 10,
        money: 150,
        kill_reward: 10,
        base_stats: EnemyStats::new(Health::new(10), 1.0),
        difficulty_step: EnemyStats::new(Health::new(5), 0.2),
        start: Timestamp::from_millis(0),
    })
}

fn fly(world: &mut World, projectiles: &mut Projectiles, now: u64) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Tick {
            now: Timestamp::from_millis(now),
        },
        &mut events,
    );
    let mut commands = Vec::new();
    projectiles.handle(
        &events,
        &query::bullet_view(world),
        &query::enemy_view(world),
        &mut commands,
    );
    for command in commands {
        world::apply(world, command, &mut events);
    }
    world::apply(world, Command::ResolveTick, &mut events);
    events
}

#[test]
fn two_hits_from_a_basic_tower_kill_a_fresh_enemy() {
    let mut world = session();
    let mut projectiles = Projectiles::new(Config::default());
    let mut events = Vec::new();
    for command in [
        Command::PlaceTower {
            cell: CellCoord::new(0, 5),
            kind: TowerKind::Basic,
        },
        Command::SpawnEnemy,
        Command::FireBullet {
            tower: TowerId::new(0),
            target: EnemyId::new(0),
        },
    ] {
        world::apply(&mut world, command, &mut events);
    }

    // One cell apart: ten steps of 4 units, then the strike.
    let mut first_hit = None;
    for frame in 1..=20 {
        let events = fly(&mut world, &mut projectiles, frame * 16);
        if events.contains(&Event::BulletSpent {
            bullet: BulletId::new(0),
        }) {
            first_hit = Some(frame);
            break;
        }
    }
    assert_eq!(first_hit, Some(11));
    assert_eq!(
        query::enemy_view(&world).into_vec()[0].health,
        Health::new(5)
    );

    world::apply(
        &mut world,
        Command::Tick {
            now: Timestamp::from_millis(1_200),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::FireBullet {
            tower: TowerId::new(0),
            target: EnemyId::new(0),
        },
        &mut events,
    );

    let mut killed = false;
    for frame in 0..20 {
        let events = fly(&mut world, &mut projectiles, 1_216 + frame * 16);
        if events.iter().any(|event| {
            matches!(
                event,
                Event::EnemyKilled {
                    reward: 10,
                    ..
                }
            )
        }) {
            killed = true;
            break;
        }
    }

    assert!(killed);
    assert_eq!(query::money(&world), 110);
    assert!(query::enemy_view(&world).is_empty());
    assert!(query::bullet_view(&world).into_vec().is_empty());
}

#[test]
fn bullets_chasing_a_departed_enemy_are_discarded() {
    let mut world = session();
    let mut projectiles = Projectiles::new(Config::default());
    let mut events = Vec::new();
    for command in [
        Command::PlaceTower {
            cell: CellCoord::new(5, 5),
            kind: TowerKind::Basic,
        },
        Command::SpawnEnemy,
        Command::FireBullet {
            tower: TowerId::new(0),
            target: EnemyId::new(0),
        },
        Command::ReportReachedEnd {
            enemy: EnemyId::new(0),
        },
        Command::ResolveTick,
    ] {
        world::apply(&mut world, command, &mut events);
    }

    let events = fly(&mut world, &mut projectiles, 16);

    assert!(events.contains(&Event::BulletSpent {
        bullet: BulletId::new(0),
    }));
    assert_eq!(query::money(&world), 100);
    assert!(query::bullet_view(&world).into_vec().is_empty());
}
