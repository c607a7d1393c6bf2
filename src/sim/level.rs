//! Level construction
//!
//! Every world has `levels_per_world - 1` regular levels that cycle through
//! three hand-made layouts, followed by a boss arena. Later worlds add more
//! enemies. Enemy kinds are rolled from a PCG stream seeded by the session
//! seed and the level number, so a seed always builds the same level.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{Boss, BossKind, Collectible, CollectibleKind, EndMarker, Enemy, EnemyKind, Platform, World};
use crate::consts::*;
use crate::ground_top;
use crate::tuning::Tuning;

/// Number of distinct regular layouts
const LAYOUT_COUNT: u32 = 3;

/// Build the World Model for `world`-`level` (both 1-based)
pub fn build_world(seed: u64, world: u32, level: u32, tuning: &Tuning) -> World {
    let level_seed = seed
        .wrapping_add((world as u64).wrapping_mul(2654435761))
        .wrapping_add((level as u64).wrapping_mul(40503));
    let mut rng = Pcg32::seed_from_u64(level_seed);

    let built = if level >= tuning.levels_per_world {
        boss_arena(world, tuning)
    } else {
        let mut built = match level.saturating_sub(1) % LAYOUT_COUNT {
            0 => meadow(),
            1 => stepping_stones(),
            _ => staircase(),
        };
        add_world_enemies(&mut built, world);
        for enemy in &mut built.enemies {
            enemy.kind = roll_enemy_kind(&mut rng);
        }
        built
    };

    log::info!(
        "Built level {}-{}: {} platforms, {} enemies, {} collectibles{}",
        world,
        level,
        built.platforms.len(),
        built.enemies.len(),
        built.collectibles.len(),
        if built.boss.is_some() { ", boss" } else { "" }
    );

    built
}

fn roll_enemy_kind(rng: &mut Pcg32) -> EnemyKind {
    if rng.random_bool(0.5) {
        EnemyKind::Goomba
    } else {
        EnemyKind::Koopa
    }
}

fn ground() -> Platform {
    Platform::solid(0.0, ground_top(), LEVEL_WIDTH, GROUND_HEIGHT)
}

fn spawn_point() -> Vec2 {
    Vec2::new(60.0, ground_top() - PLAYER_HEIGHT)
}

/// Enemy whose feet start slightly above `surface_y`; gravity settles it
fn enemy_on(x: f32, surface_y: f32) -> Enemy {
    Enemy::new(EnemyKind::Goomba, x, surface_y - ENEMY_SIZE - 4.0)
}

/// Power-up resting on a surface
fn power_up_on(kind: CollectibleKind, x: f32, surface_y: f32) -> Collectible {
    Collectible::new(kind, x, surface_y - POWER_UP_SIZE * 0.5)
}

/// A horizontal row of coins
fn coin_row(collectibles: &mut Vec<Collectible>, x: f32, y: f32, count: u32, spacing: f32) {
    collectibles.extend((0..count).map(|i| Collectible::coin(x + i as f32 * spacing, y)));
}

fn flagpole() -> EndMarker {
    EndMarker::flagpole(LEVEL_WIDTH - 100.0, ground_top() - FLAGPOLE_HEIGHT)
}

/// Later worlds get extra ground patrols
fn add_world_enemies(built: &mut World, world: u32) {
    if world >= 2 {
        built.enemies.push(enemy_on(560.0, ground_top()));
    }
    if world >= 4 {
        built.enemies.push(enemy_on(420.0, ground_top()));
    }
}

/// Layout 1: a few floating platforms and a brick to break
fn meadow() -> World {
    let platforms = vec![
        ground(),
        Platform::solid(150.0, 450.0, 180.0, 18.0),
        Platform::solid(420.0, 380.0, 150.0, 18.0),
        Platform::solid(260.0, 290.0, 120.0, 18.0),
        Platform::breakable(200.0, 330.0, 40.0, 30.0),
    ];

    let enemies = vec![enemy_on(300.0, ground_top()), enemy_on(480.0, 380.0)];

    let mut collectibles = Vec::new();
    coin_row(&mut collectibles, 170.0, 425.0, 5, 30.0);
    coin_row(&mut collectibles, 450.0, 355.0, 3, 30.0);
    coin_row(&mut collectibles, 600.0, 520.0, 3, 30.0);
    collectibles.push(power_up_on(CollectibleKind::Mushroom, 320.0, 290.0));

    World {
        platforms,
        enemies,
        collectibles,
        boss: None,
        end_marker: Some(flagpole()),
        spawn: spawn_point(),
    }
}

/// Layout 2: four stepping platforms with a brick bridge above
fn stepping_stones() -> World {
    let mut platforms = vec![ground()];
    let steps = [(120.0, 460.0), (270.0, 390.0), (420.0, 320.0), (570.0, 390.0)];
    for &(x, y) in &steps {
        platforms.push(Platform::solid(x, y, 100.0, 18.0));
    }
    platforms.push(Platform::breakable(300.0, 250.0, 40.0, 30.0));
    platforms.push(Platform::breakable(340.0, 250.0, 40.0, 30.0));

    let enemies = vec![
        enemy_on(250.0, ground_top()),
        enemy_on(290.0, 390.0),
        enemy_on(440.0, 320.0),
    ];

    let mut collectibles = Vec::new();
    for &(x, y) in &steps {
        coin_row(&mut collectibles, x + 20.0, y - 25.0, 3, 30.0);
    }
    collectibles.push(power_up_on(CollectibleKind::Mushroom, 320.0, 390.0));
    collectibles.push(power_up_on(CollectibleKind::FireFlower, 470.0, 320.0));

    World {
        platforms,
        enemies,
        collectibles,
        boss: None,
        end_marker: Some(flagpole()),
        spawn: spawn_point(),
    }
}

/// Layout 3: a rising staircase with a row of bricks overhead
fn staircase() -> World {
    let mut platforms = vec![ground()];
    for i in 0..7 {
        let x = 80.0 + i as f32 * 90.0;
        let y = 470.0 - i as f32 * 40.0;
        platforms.push(Platform::solid(x, y, 60.0, 18.0));
    }
    for i in 0..3 {
        platforms.push(Platform::breakable(330.0 + i as f32 * 30.0, 250.0, 30.0, 30.0));
    }

    let enemies = vec![
        enemy_on(200.0, ground_top()),
        enemy_on(400.0, ground_top()),
        enemy_on(270.0, 390.0),
    ];

    let mut collectibles = Vec::new();
    for i in 0..7 {
        let x = 95.0 + i as f32 * 90.0;
        let y = 445.0 - i as f32 * 40.0;
        coin_row(&mut collectibles, x, y, 2, 30.0);
    }
    collectibles.push(power_up_on(CollectibleKind::Mushroom, 200.0, 430.0));
    collectibles.push(power_up_on(CollectibleKind::FireFlower, 650.0, 230.0));

    World {
        platforms,
        enemies,
        collectibles,
        boss: None,
        end_marker: Some(flagpole()),
        spawn: spawn_point(),
    }
}

/// Boss arena: two ledges, a central platform and the world's boss
fn boss_arena(world: u32, tuning: &Tuning) -> World {
    let platforms = vec![
        ground(),
        Platform::solid(0.0, 450.0, 200.0, 20.0),
        Platform::solid(LEVEL_WIDTH - 200.0, 450.0, 200.0, 20.0),
        Platform::solid(LEVEL_WIDTH / 2.0 - 100.0, 350.0, 200.0, 20.0),
    ];

    let mut collectibles = Vec::new();
    coin_row(&mut collectibles, LEVEL_WIDTH / 2.0 - 60.0, 325.0, 5, 30.0);

    let boss = Boss::new(
        BossKind::for_world(world),
        LEVEL_WIDTH - 150.0,
        ground_top() - BOSS_SIZE,
        tuning,
    );

    World {
        platforms,
        enemies: Vec::new(),
        collectibles,
        boss: Some(boss),
        end_marker: None,
        spawn: spawn_point(),
    }
}
