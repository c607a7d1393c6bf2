//! Fixed timestep simulation tick
//!
//! One call advances the session by one frame: input, kinematics, collision
//! resolution, then phase transitions. Rendering reads the state afterwards.

use glam::Vec2;

use super::collision::{
    ContactOutcome, apply_gravity, classify_contact, move_and_collide, platform_below,
};
use super::geom::{Rect, circle_overlaps_rect};
use super::state::{
    Boss, BossKind, Collectible, CollectibleKind, DefeatCause, Enemy, EnemyState, Facing,
    GameEvent, GamePhase, GameState, Platform, Player, PowerLevel, Projectile, ProjectileKind,
    World,
};
use crate::consts::*;
use crate::tuning::Tuning;

/// Boss patrol limits (left edge of the boss hitbox)
const BOSS_MIN_X: f32 = 50.0;
const BOSS_MAX_X: f32 = LEVEL_WIDTH - 150.0;

/// Projectiles this far outside the level are dropped
const OFFSCREEN_MARGIN: f32 = 20.0;

/// Input commands for a single tick
///
/// `left`, `right` and `crouch` are held states; the rest are one-shot
/// presses the shell clears after each tick.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub crouch: bool,
    pub jump: bool,
    pub spin_jump: bool,
    pub fire: bool,
    /// Reset the level while playing, restart the session when it has ended
    pub restart: bool,
    /// Skip the intro / start again from a terminal screen
    pub start: bool,
    /// Demo mode - the autopilot plays the game
    pub idle_mode: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.events.clear();
    state.time_ticks += 1;

    let input = if input.idle_mode {
        demo_input(state)
    } else {
        input.clone()
    };
    let input = &input;

    match state.phase {
        GamePhase::Intro { ticks } => {
            let ticks = ticks + 1;
            if input.start || input.jump || ticks >= state.tuning.intro_ticks() {
                state.events.push(GameEvent::IntroFinished);
                state.load_level(1, 1);
            } else {
                state.phase = GamePhase::Intro { ticks };
            }
        }

        GamePhase::Playing | GamePhase::BossFight => {
            if input.restart {
                log::info!("Level {}-{} reset", state.world_number, state.level_number);
                state.reset_level();
            } else {
                step_world(state, input);
            }
        }

        GamePhase::LevelComplete { ticks } => {
            animate_collectibles(&mut state.world.collectibles);
            if ticks <= 1 {
                let next = state.level_number + 1;
                state.load_level(state.world_number, next);
            } else {
                state.phase = GamePhase::LevelComplete { ticks: ticks - 1 };
            }
        }

        GamePhase::BossDefeated { ticks } => {
            animate_collectibles(&mut state.world.collectibles);
            if ticks <= 1 {
                advance_world(state);
            } else {
                state.phase = GamePhase::BossDefeated { ticks: ticks - 1 };
            }
        }

        GamePhase::GameOver | GamePhase::Victory => {
            if input.restart || input.start || input.jump {
                state.restart();
            }
        }
    }

    for event in &state.events {
        log::debug!("tick {}: {:?}", state.time_ticks, event);
    }
}

/// One frame of active play
fn step_world(state: &mut GameState, input: &TickInput) {
    let GameState {
        tuning,
        player,
        world,
        events,
        ..
    } = state;

    // Kinematics
    update_player(player, &mut world.platforms, tuning, input, events);
    update_enemies(&mut world.enemies, &world.platforms, tuning);
    let target = player.rect().center();
    if let Some(boss) = world.boss.as_mut() {
        update_boss(boss, &world.platforms, target, tuning, events);
        update_projectiles(&mut boss.projectiles, &world.platforms, tuning);
    }
    update_projectiles(&mut player.fireballs, &world.platforms, tuning);
    animate_collectibles(&mut world.collectibles);

    // Contacts, in priority order
    collect_items(player, &mut world.collectibles, tuning, events);
    let mut lethal = resolve_enemy_contacts(player, &mut world.enemies, tuning, events);
    if let Some(boss) = world.boss.as_mut() {
        lethal |= resolve_boss_contact(player, boss, tuning, events);
    }
    lethal |= resolve_projectile_contacts(player, world, tuning, events);

    // Fell out of the level
    if player.pos.y > LEVEL_HEIGHT {
        lethal = true;
    }

    remove_finished(world, player);

    if lethal {
        lose_life(state);
        if state.phase.is_terminal() {
            return;
        }
    }

    check_level_goals(state);
}

/// Apply input to the player and move it through the level
fn update_player(
    player: &mut Player,
    platforms: &mut [Platform],
    tuning: &Tuning,
    input: &TickInput,
    events: &mut Vec<GameEvent>,
) {
    player.invulnerable_ticks = player.invulnerable_ticks.saturating_sub(1);
    player.fireball_cooldown = player.fireball_cooldown.saturating_sub(1);
    player.spin_ticks = player.spin_ticks.saturating_sub(1);

    // Crouching plants the player in place
    player.crouching = input.crouch && player.grounded;
    player.vel.x = if player.crouching {
        0.0
    } else if input.left && !input.right {
        player.facing = Facing::Left;
        -tuning.walk_speed
    } else if input.right && !input.left {
        player.facing = Facing::Right;
        tuning.walk_speed
    } else {
        0.0
    };

    if player.grounded {
        if input.jump {
            player.vel.y = -tuning.jump_velocity;
            player.grounded = false;
            events.push(GameEvent::Jumped);
        } else if input.spin_jump {
            player.vel.y = -tuning.jump_velocity * tuning.spin_jump_multiplier;
            player.spin_ticks = tuning.spin_jump_ticks;
            player.grounded = false;
            events.push(GameEvent::SpinJumped);
        }
    }

    if input.fire
        && player.power == PowerLevel::Fire
        && player.fireball_cooldown == 0
        && player.fireballs.len() < tuning.max_fireballs
    {
        let origin = player.rect().center();
        let vel = Vec2::new(player.facing.sign() * tuning.fireball_speed, 0.0);
        player.fireballs.push(Projectile::new(
            ProjectileKind::Fireball,
            origin,
            vel,
            tuning.fireball_lifetime_ticks,
        ));
        player.fireball_cooldown = tuning.fireball_cooldown_ticks;
        events.push(GameEvent::FireballThrown);
    }

    apply_gravity(&mut player.vel, tuning.gravity, tuning.max_fall_speed);
    let contacts = move_and_collide(&mut player.pos, &mut player.vel, player.size, platforms);
    player.grounded = contacts.ground.is_some();

    if let Some(i) = contacts.ceiling {
        let platform = &mut platforms[i];
        if platform.breakable && player.power >= PowerLevel::Super {
            platform.broken = true;
            player.score += tuning.brick_score;
            events.push(GameEvent::BrickBroken);
        }
    }

    player.pos.x = player.pos.x.clamp(0.0, LEVEL_WIDTH - player.size.x);
}

/// Walk enemies along their platforms, turning at walls, edges and level bounds
fn update_enemies(enemies: &mut [Enemy], platforms: &[Platform], tuning: &Tuning) {
    for enemy in enemies.iter_mut() {
        if let EnemyState::Defeated { cause, ticks } = enemy.state {
            if cause == DefeatCause::Burned {
                enemy.pos.y -= 2.0;
            }
            enemy.state = EnemyState::Defeated {
                cause,
                ticks: ticks.saturating_sub(1),
            };
            continue;
        }

        let size = enemy.size();
        enemy.vel.x = enemy.facing.sign() * tuning.enemy_speed * enemy.kind.speed_factor();
        apply_gravity(&mut enemy.vel, tuning.gravity, tuning.max_fall_speed);
        let contacts = move_and_collide(&mut enemy.pos, &mut enemy.vel, size, platforms);

        if contacts.blocked {
            enemy.facing = enemy.facing.flipped();
        } else if let Some(i) = contacts.ground {
            let support = platforms[i].rect;
            match enemy.facing {
                Facing::Left if enemy.pos.x <= support.left() => {
                    enemy.pos.x = support.left();
                    enemy.facing = Facing::Right;
                }
                Facing::Right if enemy.pos.x + size.x >= support.right() => {
                    enemy.pos.x = support.right() - size.x;
                    enemy.facing = Facing::Left;
                }
                _ => {}
            }
        }

        if enemy.pos.x <= 0.0 {
            enemy.pos.x = 0.0;
            enemy.facing = Facing::Right;
        } else if enemy.pos.x + size.x >= LEVEL_WIDTH {
            enemy.pos.x = LEVEL_WIDTH - size.x;
            enemy.facing = Facing::Left;
        }
    }
}

/// Patrol, charge and attack
fn update_boss(
    boss: &mut Boss,
    platforms: &[Platform],
    target: Vec2,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) {
    if boss.is_defeated() {
        return;
    }
    boss.hurt_ticks = boss.hurt_ticks.saturating_sub(1);

    let speed = if boss.charge_ticks > 0 {
        boss.charge_ticks -= 1;
        tuning.boss_charge_speed
    } else {
        tuning.boss_speed
    };
    boss.vel.x = boss.facing.sign() * speed;
    apply_gravity(&mut boss.vel, tuning.gravity, tuning.max_fall_speed);
    let size = boss.size();
    let contacts = move_and_collide(&mut boss.pos, &mut boss.vel, size, platforms);
    if contacts.blocked {
        boss.facing = boss.facing.flipped();
    }

    if boss.pos.x <= BOSS_MIN_X {
        boss.pos.x = BOSS_MIN_X;
        boss.facing = Facing::Right;
    } else if boss.pos.x >= BOSS_MAX_X {
        boss.pos.x = BOSS_MAX_X;
        boss.facing = Facing::Left;
    }

    if boss.attack_cooldown == 0 {
        boss_attack(boss, target, tuning);
        boss.attack_cooldown = tuning.boss_attack_interval_ticks;
        events.push(GameEvent::BossAttack(boss.kind));
    } else {
        boss.attack_cooldown -= 1;
    }
}

/// Launch the attack pattern of the boss kind toward `target`
fn boss_attack(boss: &mut Boss, target: Vec2, tuning: &Tuning) {
    let origin = boss.rect().center();
    let speed = tuning.boss_projectile_speed;
    let lifetime = tuning.boss_projectile_lifetime_ticks;
    let toward = if target.x < origin.x { -1.0 } else { 1.0 };

    let shot = |kind, dir: Vec2| Projectile::new(kind, origin, dir * speed, lifetime);

    match boss.kind {
        BossKind::Kamek => {
            boss.projectiles
                .push(shot(ProjectileKind::MagicBolt, Vec2::new(toward, 0.0)));
        }
        BossKind::KingBoo => {
            let aim = (target - origin).try_normalize().unwrap_or(Vec2::new(toward, 0.0));
            boss.projectiles.push(shot(ProjectileKind::GhostOrb, aim));
        }
        BossKind::Wiggler => {
            boss.charge_ticks = tuning.boss_charge_ticks;
            boss.facing = if toward < 0.0 { Facing::Left } else { Facing::Right };
        }
        BossKind::BowserJr => {
            for slope in [-0.3, 0.0, 0.3] {
                let dir = Vec2::new(toward, slope).normalize();
                boss.projectiles.push(shot(ProjectileKind::BossFireball, dir));
            }
        }
        BossKind::DryBowser => {
            for i in 0..5 {
                let angle = (i as f32 - 2.0) * 0.3;
                let dir = Vec2::new(toward * angle.cos(), angle.sin());
                boss.projectiles.push(shot(ProjectileKind::Bone, dir));
            }
        }
    }
}

/// Move projectiles, bounce fireballs, drop expired ones
fn update_projectiles(projectiles: &mut Vec<Projectile>, platforms: &[Platform], tuning: &Tuning) {
    projectiles.retain_mut(|p| advance_projectile(p, platforms, tuning));
}

/// Returns false once the projectile is spent
fn advance_projectile(p: &mut Projectile, platforms: &[Platform], tuning: &Tuning) -> bool {
    if p.lifetime == 0 {
        return false;
    }
    p.lifetime -= 1;

    p.vel.y = (p.vel.y + tuning.gravity * p.kind.gravity_scale()).min(tuning.max_fall_speed);
    let previous = p.pos;
    p.pos += p.vel;
    let radius = p.radius();

    for platform in platforms.iter().filter(|pl| pl.is_solid()) {
        if !circle_overlaps_rect(p.pos, radius, &platform.rect) {
            continue;
        }
        let came_from_above = previous.y + radius <= platform.rect.top() + 0.01;
        if p.kind.bounces() && p.vel.y > 0.0 && came_from_above {
            p.pos.y = platform.rect.top() - radius;
            p.vel.y = -tuning.fireball_bounce;
            p.bounces += 1;
            if p.bounces >= tuning.fireball_max_bounces {
                return false;
            }
        } else {
            return false;
        }
    }

    p.pos.x >= -OFFSCREEN_MARGIN
        && p.pos.x <= LEVEL_WIDTH + OFFSCREEN_MARGIN
        && p.pos.y <= LEVEL_HEIGHT + OFFSCREEN_MARGIN
}

fn animate_collectibles(collectibles: &mut [Collectible]) {
    for item in collectibles.iter_mut() {
        item.phase = (item.phase + 0.1) % std::f32::consts::TAU;
    }
}

/// Pick up every collectible the player touches
fn collect_items(
    player: &mut Player,
    collectibles: &mut [Collectible],
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) {
    let body = player.rect();
    for item in collectibles.iter_mut().filter(|c| !c.collected) {
        if !item.touches(&body) {
            continue;
        }
        item.collected = true;
        match item.kind {
            CollectibleKind::Coin => {
                player.coins += 1;
                player.score += tuning.coin_score;
                events.push(GameEvent::CoinCollected);
            }
            CollectibleKind::Mushroom => {
                player.power = player.power.upgraded();
                player.score += tuning.power_up_score;
                events.push(GameEvent::PowerUp(item.kind));
            }
            CollectibleKind::FireFlower => {
                player.power = PowerLevel::Fire;
                player.score += tuning.power_up_score;
                events.push(GameEvent::PowerUp(item.kind));
            }
        }
    }
}

/// Damage the player. Returns true when the hit costs a life.
fn hurt_player(player: &mut Player, tuning: &Tuning, events: &mut Vec<GameEvent>) -> bool {
    if player.is_invulnerable() {
        return false;
    }
    match player.power.downgraded() {
        Some(lower) => {
            player.power = lower;
            player.invulnerable_ticks = tuning.invulnerability_ticks;
            player.vel.y = -tuning.knockback_hop;
            events.push(GameEvent::PowerDown(lower));
            false
        }
        None => true,
    }
}

/// Stomp or get hurt by walking enemies. Returns true on a lethal hit.
fn resolve_enemy_contacts(
    player: &mut Player,
    enemies: &mut [Enemy],
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) -> bool {
    for enemy in enemies.iter_mut().filter(|e| e.is_alive()) {
        let body = player.rect();
        let target = enemy.rect();
        if !body.overlaps(&target) {
            continue;
        }
        match classify_contact(&body, player.vel.y, &target, tuning.stomp_depth_fraction) {
            ContactOutcome::Stomp => {
                enemy.defeat(DefeatCause::Stomped, tuning.defeat_animation_ticks);
                player.vel.y = -tuning.stomp_bounce;
                player.score += tuning.stomp_score;
                events.push(GameEvent::EnemyStomped(enemy.kind));
            }
            ContactOutcome::Hurt => {
                if hurt_player(player, tuning, events) {
                    return true;
                }
            }
        }
    }
    false
}

/// Stomp or get hurt by the boss. Returns true on a lethal hit.
fn resolve_boss_contact(
    player: &mut Player,
    boss: &mut Boss,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) -> bool {
    if boss.is_defeated() {
        return false;
    }
    let body = player.rect();
    let target = boss.rect();
    if !body.overlaps(&target) {
        return false;
    }
    match classify_contact(&body, player.vel.y, &target, tuning.stomp_depth_fraction) {
        ContactOutcome::Stomp => {
            player.vel.y = -tuning.stomp_bounce;
            if boss.hurt_ticks == 0 {
                hit_boss(boss, &mut player.score, tuning, events);
            }
            false
        }
        ContactOutcome::Hurt => hurt_player(player, tuning, events),
    }
}

fn hit_boss(boss: &mut Boss, score: &mut u64, tuning: &Tuning, events: &mut Vec<GameEvent>) {
    boss.health = boss.health.saturating_sub(1);
    boss.hurt_ticks = tuning.boss_hurt_ticks;
    *score += tuning.boss_hit_score;
    events.push(GameEvent::BossHit {
        remaining: boss.health,
    });

    if boss.is_defeated() {
        *score += tuning.boss_defeat_score;
        boss.projectiles.clear();
        boss.charge_ticks = 0;
        events.push(GameEvent::BossDefeated(boss.kind));
        log::info!("{} defeated", boss.kind.name());
    }
}

/// Fireballs against enemies and boss, boss shots against the player.
/// Returns true on a lethal hit.
fn resolve_projectile_contacts(
    player: &mut Player,
    world: &mut World,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) -> bool {
    let Player {
        fireballs, score, ..
    } = player;

    fireballs.retain(|fireball| {
        if let Some(enemy) = world
            .enemies
            .iter_mut()
            .find(|e| e.is_alive() && fireball.hits(&e.rect()))
        {
            enemy.defeat(DefeatCause::Burned, tuning.defeat_animation_ticks);
            *score += tuning.fireball_kill_score;
            events.push(GameEvent::EnemyBurned(enemy.kind));
            return false;
        }

        if let Some(boss) = world
            .boss
            .as_mut()
            .filter(|b| !b.is_defeated() && fireball.hits(&b.rect()))
        {
            if boss.hurt_ticks == 0 {
                hit_boss(boss, score, tuning, events);
            }
            return false;
        }

        true
    });

    let Some(boss) = world.boss.as_mut() else {
        return false;
    };
    if player.is_invulnerable() {
        return false;
    }

    let body = player.rect();
    let Some(hit) = boss.projectiles.iter().position(|p| p.hits(&body)) else {
        return false;
    };
    boss.projectiles.remove(hit);
    hurt_player(player, tuning, events)
}

/// Drop collected items and enemies whose defeat animation ended
fn remove_finished(world: &mut World, player: &mut Player) {
    world.collectibles.retain(|c| !c.collected);
    world
        .enemies
        .retain(|e| !matches!(e.state, EnemyState::Defeated { ticks: 0, .. }));
    player.fireballs.retain(|f| f.lifetime > 0);
}

/// Take a life; respawn or end the session
fn lose_life(state: &mut GameState) {
    let player = &mut state.player;
    player.lives = player.lives.saturating_sub(1);
    state.events.push(GameEvent::LifeLost {
        remaining: player.lives,
    });

    if player.lives == 0 {
        log::info!("Game over with score {}", player.score);
        state.phase = GamePhase::GameOver;
        state.events.push(GameEvent::GameOver);
    } else {
        player.power = PowerLevel::Small;
        player.respawn(state.world.spawn, state.tuning.invulnerability_ticks);
    }
}

/// End marker and boss checks
fn check_level_goals(state: &mut GameState) {
    match state.phase {
        GamePhase::Playing => {
            let body = state.player.rect();
            let reached = state
                .world
                .end_marker
                .as_mut()
                .filter(|m| !m.flag_raised && body.overlaps_x(&m.rect));
            if let Some(marker) = reached {
                marker.flag_raised = true;
                state.phase = GamePhase::LevelComplete {
                    ticks: state.tuning.level_complete_ticks,
                };
                state.events.push(GameEvent::LevelComplete {
                    world: state.world_number,
                    level: state.level_number,
                });
                log::info!(
                    "Level {}-{} complete, score {}",
                    state.world_number,
                    state.level_number,
                    state.player.score
                );
            }
        }
        GamePhase::BossFight => {
            if state.world.boss.as_ref().is_some_and(|b| b.is_defeated()) {
                state.phase = GamePhase::BossDefeated {
                    ticks: state.tuning.boss_defeated_ticks,
                };
            }
        }
        _ => {}
    }
}

/// Move on after a boss: next world, or victory after the last one
fn advance_world(state: &mut GameState) {
    let next = state.world_number + 1;
    if next > state.tuning.worlds {
        log::info!("Victory! Final score {}", state.player.score);
        state.phase = GamePhase::Victory;
        state.events.push(GameEvent::Victory);
    } else {
        state.load_level(next, 1);
    }
}

/// Synthesise input for demo mode
///
/// Runs right, hops over gaps, walls and enemies, throws fireballs when it
/// can, and chases the boss to land on it.
pub fn demo_input(state: &GameState) -> TickInput {
    let mut input = TickInput {
        idle_mode: true,
        ..Default::default()
    };

    match state.phase {
        GamePhase::Intro { .. } => input.start = true,
        GamePhase::GameOver | GamePhase::Victory => input.restart = true,
        GamePhase::Playing | GamePhase::BossFight => {
            let player = &state.player;
            let world = &state.world;
            let body = player.rect();
            let center = body.center();

            if let Some(boss) = world.boss.as_ref().filter(|b| !b.is_defeated()) {
                let dx = boss.rect().center().x - center.x;
                input.right = dx > 10.0;
                input.left = dx < -10.0;
                input.jump = player.grounded && dx.abs() < 110.0;
                input.fire = player.power == PowerLevel::Fire;
                return input;
            }

            input.right = true;

            let probe = Vec2::new(body.right() + 12.0, body.bottom() + 1.0);
            let gap_ahead = platform_below(probe, 40.0, &world.platforms).is_none();

            let wall_probe = Rect::new(body.right(), body.top() + 2.0, 6.0, body.size.y - 4.0);
            let wall_ahead = world
                .platforms
                .iter()
                .any(|p| p.is_solid() && wall_probe.overlaps(&p.rect));

            let threat_ahead = world.enemies.iter().filter(|e| e.is_alive()).any(|e| {
                let rect = e.rect();
                let dx = rect.left() - body.right();
                (-4.0..90.0).contains(&dx) && (rect.center().y - center.y).abs() < 60.0
            });

            input.jump = player.grounded && (gap_ahead || wall_ahead || threat_ahead);
            input.fire = threat_ahead && player.power == PowerLevel::Fire;
        }
        GamePhase::LevelComplete { .. } | GamePhase::BossDefeated { .. } => {}
    }

    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ground_top;
    use crate::sim::state::{EndMarker, EnemyKind};
    use proptest::prelude::*;

    fn press_start() -> TickInput {
        TickInput {
            start: true,
            ..Default::default()
        }
    }

    /// Session past the intro, at level 1-1
    fn playing_state() -> GameState {
        let mut state = GameState::new(12345, Tuning::default());
        tick(&mut state, &press_start());
        assert_eq!(state.phase, GamePhase::Playing);
        state
    }

    /// Only the ground platform, nothing else
    fn clear_level(state: &mut GameState) {
        state.world.platforms.truncate(1);
        state.world.enemies.clear();
        state.world.collectibles.clear();
        state.world.end_marker = None;
    }

    fn standing_y() -> f32 {
        ground_top() - PLAYER_HEIGHT
    }

    #[test]
    fn test_intro_skips_on_start() {
        let mut state = GameState::new(1, Tuning::default());
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::Intro { ticks: 1 });

        tick(&mut state, &press_start());
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.events.contains(&GameEvent::IntroFinished));
        assert!(state.events.contains(&GameEvent::LevelStarted { world: 1, level: 1 }));
    }

    #[test]
    fn test_intro_ends_on_its_own() {
        let mut state = GameState::new(1, Tuning::default());
        for _ in 0..state.tuning.intro_ticks() {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_coin_scores_exactly_once() {
        let mut state = playing_state();
        clear_level(&mut state);
        state.player.pos = Vec2::new(100.0, standing_y());
        let center = state.player.rect().center();
        state.world.collectibles.push(Collectible::coin(center.x, center.y));

        tick(&mut state, &TickInput::default());
        assert_eq!(state.player.score, 100);
        assert_eq!(state.player.coins, 1);
        assert!(state.world.collectibles.is_empty());

        for _ in 0..10 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.player.score, 100);
        assert_eq!(state.player.coins, 1);
    }

    #[test]
    fn test_power_ups_raise_power_level() {
        let mut state = playing_state();
        clear_level(&mut state);
        state.player.pos = Vec2::new(100.0, standing_y());
        let center = state.player.rect().center();
        state
            .world
            .collectibles
            .push(Collectible::new(CollectibleKind::Mushroom, center.x, center.y));

        tick(&mut state, &TickInput::default());
        assert_eq!(state.player.power, PowerLevel::Super);
        assert_eq!(state.player.score, 1000);

        state
            .world
            .collectibles
            .push(Collectible::new(CollectibleKind::FireFlower, center.x, center.y));
        tick(&mut state, &TickInput::default());
        assert_eq!(state.player.power, PowerLevel::Fire);
    }

    #[test]
    fn test_stomp_defeats_enemy() {
        let mut state = playing_state();
        clear_level(&mut state);
        state
            .world
            .enemies
            .push(Enemy::new(EnemyKind::Goomba, 200.0, ground_top() - ENEMY_SIZE));
        state.player.pos = Vec2::new(202.0, 480.0);
        state.player.vel = Vec2::new(0.0, 4.0);

        tick(&mut state, &TickInput::default());
        assert!(!state.world.enemies[0].is_alive());
        assert_eq!(state.player.score, 200);
        assert!(state.player.vel.y < 0.0);
        assert_eq!(state.player.lives, 3);
        assert!(state.events.contains(&GameEvent::EnemyStomped(EnemyKind::Goomba)));

        // Out of play until its animation ends, then gone
        for _ in 0..state.tuning.defeat_animation_ticks {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.player.score, 200);
        assert!(state.world.enemies.is_empty());
    }

    #[test]
    fn test_side_contact_hurts_unless_invulnerable() {
        let mut state = playing_state();
        clear_level(&mut state);
        state
            .world
            .enemies
            .push(Enemy::new(EnemyKind::Koopa, 210.0, ground_top() - ENEMY_SIZE));
        state.player.pos = Vec2::new(200.0, standing_y());
        state.player.grounded = true;
        state.player.invulnerable_ticks = 60;

        for _ in 0..5 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.player.lives, 3);
        assert!(state.world.enemies[0].is_alive());

        state.player.invulnerable_ticks = 0;
        state.player.pos = Vec2::new(state.world.enemies[0].pos.x - 10.0, standing_y());
        tick(&mut state, &TickInput::default());
        assert_eq!(state.player.lives, 2);
        assert!(state.player.is_invulnerable());
        assert_eq!(state.player.pos, state.world.spawn);
    }

    #[test]
    fn test_powered_player_drops_a_level_instead_of_a_life() {
        let mut state = playing_state();
        clear_level(&mut state);
        state.player.power = PowerLevel::Fire;
        state
            .world
            .enemies
            .push(Enemy::new(EnemyKind::Goomba, 210.0, ground_top() - ENEMY_SIZE));
        state.player.pos = Vec2::new(200.0, standing_y());

        tick(&mut state, &TickInput::default());
        assert_eq!(state.player.power, PowerLevel::Super);
        assert_eq!(state.player.lives, 3);
        assert_eq!(state.player.invulnerable_ticks, state.tuning.invulnerability_ticks);
        assert!(state.events.contains(&GameEvent::PowerDown(PowerLevel::Super)));
    }

    #[test]
    fn test_last_life_ends_game_and_restart_resets() {
        let mut state = playing_state();
        clear_level(&mut state);
        state.player.lives = 1;
        state.player.score = 4200;
        state
            .world
            .enemies
            .push(Enemy::new(EnemyKind::Goomba, 210.0, ground_top() - ENEMY_SIZE));
        state.player.pos = Vec2::new(200.0, standing_y());

        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.player.lives, 0);
        assert!(state.events.contains(&GameEvent::GameOver));

        // Movement does nothing in a terminal state
        let before = state.player.pos;
        tick(
            &mut state,
            &TickInput {
                right: true,
                ..Default::default()
            },
        );
        assert_eq!(state.player.pos, before);
        assert_eq!(state.phase, GamePhase::GameOver);

        tick(
            &mut state,
            &TickInput {
                restart: true,
                ..Default::default()
            },
        );
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player.lives, state.tuning.starting_lives);
        assert_eq!(state.player.score, 0);
        assert_eq!((state.world_number, state.level_number), (1, 1));
    }

    #[test]
    fn test_falling_out_of_level_costs_a_life() {
        let mut state = playing_state();
        state.world.platforms.clear();
        state.world.enemies.clear();
        state.player.power = PowerLevel::Fire;
        state.player.pos = Vec2::new(300.0, LEVEL_HEIGHT - 1.0);
        state.player.vel = Vec2::new(0.0, 5.0);

        tick(&mut state, &TickInput::default());
        assert_eq!(state.player.lives, 2);
        assert_eq!(state.player.power, PowerLevel::Small);
    }

    #[test]
    fn test_end_marker_completes_level_and_builds_next() {
        let mut state = playing_state();
        state.world.enemies.clear();
        let marker = state.world.end_marker.clone().expect("regular level has a flagpole");
        state.player.pos = Vec2::new(marker.rect.left() - 10.0, standing_y());

        tick(&mut state, &TickInput::default());
        assert_eq!(
            state.phase,
            GamePhase::LevelComplete {
                ticks: state.tuning.level_complete_ticks
            }
        );
        assert!(state.world.end_marker.as_ref().is_some_and(|m| m.flag_raised));

        // Input is ignored while the flag is up
        let frozen = state.player.pos;
        for _ in 0..state.tuning.level_complete_ticks - 1 {
            tick(
                &mut state,
                &TickInput {
                    left: true,
                    ..Default::default()
                },
            );
        }
        assert_eq!(state.player.pos, frozen);
        assert!(matches!(state.phase, GamePhase::LevelComplete { ticks: 1 }));

        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.level_number, 2);
        assert!(state.world.platforms.len() > 1);
        assert!(!state.world.enemies.is_empty());
        assert!(!state.world.collectibles.is_empty());
        assert_eq!(state.player.pos, state.world.spawn);
    }

    #[test]
    fn test_last_regular_level_leads_to_boss() {
        let mut state = playing_state();
        let last_regular = state.tuning.levels_per_world - 1;
        state.load_level(1, last_regular);
        state.world.enemies.clear();
        state.world.end_marker = Some(EndMarker::flagpole(state.player.pos.x, 350.0));

        tick(&mut state, &TickInput::default());
        for _ in 0..state.tuning.level_complete_ticks {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.phase, GamePhase::BossFight);
        assert!(state.world.boss.is_some());
    }

    #[test]
    fn test_boss_stomps_and_next_world() {
        let mut state = playing_state();
        state.load_level(1, state.tuning.levels_per_world);
        state.world.collectibles.clear();
        {
            let boss = state.world.boss.as_mut().unwrap();
            boss.health = 2;
            boss.pos = Vec2::new(400.0, ground_top() - BOSS_SIZE);
        }

        let stomp = |state: &mut GameState| {
            let boss_pos = state.world.boss.as_ref().unwrap().pos;
            state.player.pos = Vec2::new(boss_pos.x + 20.0, boss_pos.y - PLAYER_HEIGHT + 5.0);
            state.player.vel = Vec2::new(0.0, 4.0);
            tick(state, &TickInput::default());
        };

        stomp(&mut state);
        assert_eq!(state.world.boss.as_ref().unwrap().health, 1);
        assert!(state.events.contains(&GameEvent::BossHit { remaining: 1 }));
        assert_eq!(state.phase, GamePhase::BossFight);

        // Hurt window swallows an immediate second stomp
        stomp(&mut state);
        assert_eq!(state.world.boss.as_ref().unwrap().health, 1);

        state.world.boss.as_mut().unwrap().hurt_ticks = 0;
        stomp(&mut state);
        assert!(state.world.boss.as_ref().unwrap().is_defeated());
        assert_eq!(
            state.phase,
            GamePhase::BossDefeated {
                ticks: state.tuning.boss_defeated_ticks
            }
        );

        for _ in 0..state.tuning.boss_defeated_ticks {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!((state.world_number, state.level_number), (2, 1));
    }

    #[test]
    fn test_final_boss_wins_the_game() {
        let mut state = playing_state();
        state.load_level(state.tuning.worlds, state.tuning.levels_per_world);
        state.world.collectibles.clear();
        let boss_pos = {
            let boss = state.world.boss.as_mut().unwrap();
            boss.health = 1;
            boss.pos = Vec2::new(400.0, ground_top() - BOSS_SIZE);
            boss.pos
        };
        state.player.pos = Vec2::new(boss_pos.x + 20.0, boss_pos.y - PLAYER_HEIGHT + 5.0);
        state.player.vel = Vec2::new(0.0, 4.0);

        tick(&mut state, &TickInput::default());
        for _ in 0..state.tuning.boss_defeated_ticks {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.phase, GamePhase::Victory);
        assert!(state.events.contains(&GameEvent::Victory));

        tick(&mut state, &press_start());
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!((state.world_number, state.level_number), (1, 1));
    }

    #[test]
    fn test_boss_attack_patterns() {
        let cases = [
            (1, 1usize),
            (2, 1),
            (4, 3),
            (5, 5),
        ];
        for (world, expected) in cases {
            let mut state = playing_state();
            state.load_level(world, state.tuning.levels_per_world);
            state.world.boss.as_mut().unwrap().attack_cooldown = 0;
            tick(&mut state, &TickInput::default());

            let boss = state.world.boss.as_ref().unwrap();
            assert_eq!(boss.projectiles.len(), expected, "world {world}");
            assert!(state.events.contains(&GameEvent::BossAttack(boss.kind)));
        }

        // Wiggler charges instead of shooting
        let mut state = playing_state();
        state.load_level(3, state.tuning.levels_per_world);
        state.world.boss.as_mut().unwrap().attack_cooldown = 0;
        tick(&mut state, &TickInput::default());
        let boss = state.world.boss.as_ref().unwrap();
        assert!(boss.projectiles.is_empty());
        assert_eq!(boss.charge_ticks, state.tuning.boss_charge_ticks);
    }

    #[test]
    fn test_boss_shot_hurts_player() {
        let mut state = playing_state();
        state.load_level(1, state.tuning.levels_per_world);
        let center = state.player.rect().center();
        let boss = state.world.boss.as_mut().unwrap();
        boss.projectiles.push(Projectile::new(
            ProjectileKind::MagicBolt,
            center + Vec2::new(5.0, -10.0),
            Vec2::new(-5.0, 0.0),
            100,
        ));

        tick(&mut state, &TickInput::default());
        assert_eq!(state.player.lives, 2);
        assert!(state.world.boss.as_ref().unwrap().projectiles.is_empty());
    }

    #[test]
    fn test_fireball_expires_after_bounce_limit() {
        let mut state = playing_state();
        clear_level(&mut state);
        state.player.power = PowerLevel::Fire;
        state.player.pos = Vec2::new(100.0, standing_y());
        state.player.grounded = true;

        tick(
            &mut state,
            &TickInput {
                fire: true,
                ..Default::default()
            },
        );
        assert_eq!(state.player.fireballs.len(), 1);
        assert!(state.events.contains(&GameEvent::FireballThrown));

        let mut max_bounces = 0;
        for _ in 0..60 {
            tick(&mut state, &TickInput::default());
            if let Some(f) = state.player.fireballs.first() {
                max_bounces = max_bounces.max(f.bounces);
                assert!(f.pos.y + f.radius() <= ground_top() + 0.01);
            }
        }
        assert!(state.player.fireballs.is_empty());
        assert_eq!(max_bounces, state.tuning.fireball_max_bounces - 1);
    }

    #[test]
    fn test_small_player_cannot_throw_fireballs() {
        let mut state = playing_state();
        clear_level(&mut state);
        tick(
            &mut state,
            &TickInput {
                fire: true,
                ..Default::default()
            },
        );
        assert!(state.player.fireballs.is_empty());
    }

    #[test]
    fn test_fireball_burns_enemy() {
        let mut state = playing_state();
        clear_level(&mut state);
        state
            .world
            .enemies
            .push(Enemy::new(EnemyKind::Koopa, 400.0, ground_top() - ENEMY_SIZE));
        state.player.fireballs.push(Projectile::new(
            ProjectileKind::Fireball,
            Vec2::new(390.0, ground_top() - 10.0),
            Vec2::new(7.0, 0.0),
            100,
        ));

        tick(&mut state, &TickInput::default());
        assert!(!state.world.enemies[0].is_alive());
        assert!(state.player.fireballs.is_empty());
        assert_eq!(state.player.score, state.tuning.fireball_kill_score);
    }

    #[test]
    fn test_head_bump_breaks_brick_only_when_powered() {
        for (power, should_break) in [(PowerLevel::Small, false), (PowerLevel::Super, true)] {
            let mut state = playing_state();
            clear_level(&mut state);
            state.world.platforms.push(Platform::breakable(100.0, 440.0, 40.0, 30.0));
            state.player.power = power;
            state.player.pos = Vec2::new(105.0, 475.0);
            state.player.vel = Vec2::new(0.0, -8.0);
            state.player.grounded = false;

            tick(&mut state, &TickInput::default());
            assert_eq!(state.world.platforms[1].broken, should_break, "{power:?}");
            assert_eq!(state.events.contains(&GameEvent::BrickBroken), should_break);
            assert!(state.player.vel.y >= 0.0);
        }
    }

    #[test]
    fn test_jump_requires_ground() {
        let mut state = playing_state();
        clear_level(&mut state);
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };

        // Settle on the ground first
        tick(&mut state, &TickInput::default());
        assert!(state.player.grounded);

        tick(&mut state, &jump);
        assert!(state.player.vel.y < 0.0);
        assert!(state.events.contains(&GameEvent::Jumped));

        // Mid-air jump is ignored
        let vy = state.player.vel.y;
        tick(&mut state, &jump);
        assert!(!state.events.contains(&GameEvent::Jumped));
        assert!((state.player.vel.y - (vy + state.tuning.gravity)).abs() < 1e-4);
    }

    #[test]
    fn test_spin_jump_goes_higher() {
        let mut state = playing_state();
        clear_level(&mut state);
        tick(&mut state, &TickInput::default());
        tick(
            &mut state,
            &TickInput {
                spin_jump: true,
                ..Default::default()
            },
        );
        let expected = -state.tuning.jump_velocity * state.tuning.spin_jump_multiplier
            + state.tuning.gravity;
        assert!((state.player.vel.y - expected).abs() < 1e-4);
        assert!(state.player.spin_ticks > 0);
    }

    #[test]
    fn test_crouch_stops_walking() {
        let mut state = playing_state();
        clear_level(&mut state);
        tick(&mut state, &TickInput::default());
        let x = state.player.pos.x;
        tick(
            &mut state,
            &TickInput {
                right: true,
                crouch: true,
                ..Default::default()
            },
        );
        assert!(state.player.crouching);
        assert_eq!(state.player.pos.x, x);
    }

    #[test]
    fn test_restart_while_playing_resets_level() {
        let mut state = playing_state();
        let enemy_count = state.world.enemies.len();
        state.world.enemies.clear();
        state.player.score = 300;
        state.player.pos = Vec2::new(400.0, 100.0);

        tick(
            &mut state,
            &TickInput {
                restart: true,
                ..Default::default()
            },
        );
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.world.enemies.len(), enemy_count);
        assert_eq!(state.player.pos, state.world.spawn);
        assert_eq!(state.player.score, 300);
        assert_eq!(state.player.lives, 3);
    }

    #[test]
    fn test_enemy_turns_at_platform_edge() {
        let mut state = playing_state();
        clear_level(&mut state);
        state.world.platforms.push(Platform::solid(300.0, 400.0, 100.0, 18.0));
        let mut enemy = Enemy::new(EnemyKind::Goomba, 302.0, 400.0 - ENEMY_SIZE);
        enemy.facing = Facing::Left;
        state.world.enemies.push(enemy);
        state.player.pos = Vec2::new(700.0, standing_y());

        for _ in 0..200 {
            tick(&mut state, &TickInput::default());
            let enemy = &state.world.enemies[0];
            assert!(enemy.pos.x >= 300.0 && enemy.pos.x + ENEMY_SIZE <= 400.0);
            assert_eq!(enemy.pos.y, 400.0 - ENEMY_SIZE);
        }
    }

    #[test]
    fn test_enemy_turns_at_left_level_bound() {
        let mut state = playing_state();
        clear_level(&mut state);
        let mut enemy = Enemy::new(EnemyKind::Goomba, 3.0, ground_top() - ENEMY_SIZE);
        enemy.facing = Facing::Left;
        state.world.enemies.push(enemy);
        state.player.pos = Vec2::new(700.0, standing_y());

        let mut min_x = f32::MAX;
        for _ in 0..30 {
            tick(&mut state, &TickInput::default());
            min_x = min_x.min(state.world.enemies[0].pos.x);
        }
        assert!(min_x >= 0.0);
        assert_eq!(state.world.enemies[0].facing, Facing::Right);
    }

    #[test]
    fn test_defeated_enemy_is_harmless() {
        let mut state = playing_state();
        clear_level(&mut state);
        let mut enemy = Enemy::new(EnemyKind::Goomba, 210.0, ground_top() - ENEMY_SIZE);
        enemy.defeat(DefeatCause::Stomped, 30);
        state.world.enemies.push(enemy);
        state.player.pos = Vec2::new(200.0, standing_y());
        assert_eq!(state.player.power, PowerLevel::Small);
        assert!(!state.player.is_invulnerable());

        for _ in 0..5 {
            tick(&mut state, &TickInput::default());
            assert!(state.player.rect().overlaps(&state.world.enemies[0].rect()));
            assert!(!state.events.iter().any(|e| matches!(e, GameEvent::LifeLost { .. })));
        }
        assert_eq!(state.player.lives, 3);
        assert_eq!(state.world.enemies.len(), 1);
    }

    #[test]
    fn test_weightless_tuning_still_falls() {
        let tuning = Tuning::from_json(r#"{ "gravity": 0.0, "max_fall_speed": 0.0 }"#).unwrap();
        let mut state = GameState::new(1, tuning);
        tick(&mut state, &press_start());
        state.world.platforms.clear();
        state.world.enemies.clear();
        state.world.collectibles.clear();

        let start_y = state.player.pos.y;
        let mut last_y = start_y;
        for _ in 0..10 {
            tick(&mut state, &TickInput::default());
            assert!(state.player.pos.y > last_y);
            last_y = state.player.pos.y;
        }
    }

    #[test]
    fn test_determinism() {
        let mut state1 = GameState::new(99999, Tuning::default());
        let mut state2 = GameState::new(99999, Tuning::default());

        let inputs = [
            press_start(),
            TickInput {
                right: true,
                ..Default::default()
            },
            TickInput {
                right: true,
                jump: true,
                ..Default::default()
            },
            TickInput::default(),
        ];

        for _ in 0..30 {
            for input in &inputs {
                tick(&mut state1, input);
                tick(&mut state2, input);
            }
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.player.pos, state2.player.pos);
        assert_eq!(state1.world.enemies.len(), state2.world.enemies.len());
    }

    #[test]
    fn test_demo_mode_makes_progress() {
        let mut state = GameState::new(5, Tuning::default());
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        let mut furthest = 0.0f32;
        for _ in 0..600 {
            tick(&mut state, &input);
            furthest = furthest.max(state.player.pos.x);
        }
        assert!(!matches!(state.phase, GamePhase::Intro { .. }));
        assert!(furthest > 200.0, "autopilot only reached x={furthest}");
    }

    proptest! {
        #[test]
        fn prop_unsupported_bodies_keep_falling(frames in 2usize..12) {
            let mut state = playing_state();
            state.world.platforms.clear();
            state.world.collectibles.clear();
            state.world.end_marker = None;
            state.world.enemies.clear();
            state.world.enemies.push(Enemy::new(EnemyKind::Goomba, 500.0, 100.0));

            let mut last_player_y = state.player.pos.y;
            let mut last_enemy_y = state.world.enemies[0].pos.y;
            for _ in 0..frames {
                tick(&mut state, &TickInput::default());
                prop_assert!(state.player.pos.y > last_player_y);
                prop_assert!(state.world.enemies[0].pos.y > last_enemy_y);
                last_player_y = state.player.pos.y;
                last_enemy_y = state.world.enemies[0].pos.y;
            }
        }
    }
}
