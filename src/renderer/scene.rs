//! Scene composition
//!
//! Turns the game state into one triangle list in level pixel coordinates.
//! Runs after the tick and never mutates the state. Draw order is back to
//! front: sky, platforms, flagpole, collectibles, enemies, boss, projectiles,
//! player, overlay panels.

use glam::Vec2;

use super::shapes::{self, DEFAULT_SEGMENTS};
use super::vertex::{Vertex, colors};
use crate::consts::*;
use crate::settings::Settings;
use crate::sim::{
    Boss, BossKind, Collectible, CollectibleKind, DefeatCause, EndMarker, Enemy, EnemyKind,
    EnemyState, GamePhase, GameState, Platform, Player, PowerLevel, Projectile, ProjectileKind,
};

/// Invulnerable player and hurt boss blink with this period (ticks)
const BLINK_PERIOD: u64 = 8;

/// Sky color per world (cycles past the fifth)
pub fn sky_color(world: u32) -> [f32; 4] {
    const SKIES: [[f32; 4]; 5] = [
        [0.53, 0.81, 0.92, 1.0], // Day
        [0.39, 0.39, 0.78, 1.0], // Evening
        [0.59, 0.29, 0.0, 1.0],  // Autumn
        [0.27, 0.27, 0.47, 1.0], // Night
        [0.12, 0.12, 0.24, 1.0], // Space
    ];
    SKIES[(world.saturating_sub(1) as usize) % SKIES.len()]
}

/// Whether a blinking entity is hidden this tick
fn blink_hidden(time_ticks: u64, settings: &Settings) -> bool {
    settings.animations_enabled() && (time_ticks / (BLINK_PERIOD / 2)) % 2 == 1
}

/// Build the full frame for `state`
pub fn build_scene(state: &GameState, settings: &Settings) -> Vec<Vertex> {
    let mut out = Vec::with_capacity(4096);

    out.extend(shapes::rect(
        Vec2::ZERO,
        Vec2::new(LEVEL_WIDTH, LEVEL_HEIGHT),
        sky_color(state.world_number),
    ));

    if let GamePhase::Intro { ticks } = state.phase {
        intro_card(&mut out, ticks < state.tuning.intro_card_ticks);
        return out;
    }

    let world = &state.world;
    for platform in world.platforms.iter().filter(|p| p.is_solid()) {
        draw_platform(&mut out, platform);
    }
    if let Some(marker) = &world.end_marker {
        draw_flagpole(&mut out, marker);
    }
    for item in world.collectibles.iter().filter(|c| !c.collected) {
        draw_collectible(&mut out, item, settings);
    }
    for enemy in &world.enemies {
        draw_enemy(&mut out, enemy, state.tuning.defeat_animation_ticks);
    }
    if let Some(boss) = &world.boss {
        let hidden = boss.hurt_ticks > 0 && blink_hidden(state.time_ticks, settings);
        if !boss.is_defeated() && !hidden {
            draw_boss(&mut out, boss);
        }
        for shot in &boss.projectiles {
            draw_projectile(&mut out, shot);
        }
    }
    for fireball in &state.player.fireballs {
        draw_projectile(&mut out, fireball);
    }

    let player = &state.player;
    let hidden = player.is_invulnerable() && blink_hidden(state.time_ticks, settings);
    if !hidden && !state.phase.is_terminal() {
        draw_player(&mut out, player, state.time_ticks);
    }

    if state.phase.is_terminal() {
        out.extend(shapes::rect(
            Vec2::ZERO,
            Vec2::new(LEVEL_WIDTH, LEVEL_HEIGHT),
            colors::DIM,
        ));
    }

    out
}

/// Logo panel behind the intro text
fn intro_card(out: &mut Vec<Vertex>, first: bool) {
    let center = Vec2::new(LEVEL_WIDTH, LEVEL_HEIGHT) * 0.5;
    let panel = Vec2::new(300.0, 200.0);
    if first {
        out.extend(shapes::rect(center - panel * 0.5, panel, colors::INTRO_BLUE));
        let inner = panel - Vec2::splat(20.0);
        out.extend(shapes::rect(center - inner * 0.5, inner, colors::WHITE));
    } else {
        out.extend(shapes::rect(center - panel * 0.5, panel, colors::RED));
    }
}

fn draw_platform(out: &mut Vec<Vertex>, platform: &Platform) {
    let r = platform.rect;
    if platform.breakable {
        out.extend(shapes::rect(r.min, r.size, colors::BRICK));
        out.extend(shapes::rect_outline(r.min, r.size, 1.5, colors::BRICK_MORTAR));
        // Mortar line across the middle
        out.extend(shapes::rect(
            Vec2::new(r.left(), r.center().y - 0.75),
            Vec2::new(r.size.x, 1.5),
            colors::BRICK_MORTAR,
        ));
    } else if r.top() >= crate::ground_top() {
        out.extend(shapes::rect(r.min, r.size, colors::DIRT));
        out.extend(shapes::rect(r.min, Vec2::new(r.size.x, 8.0), colors::GRASS));
    } else {
        out.extend(shapes::rect(r.min, r.size, colors::GRASS));
        out.extend(shapes::rect_outline(r.min, r.size, 1.0, colors::GRASS_DARK));
    }
}

fn draw_flagpole(out: &mut Vec<Vertex>, marker: &EndMarker) {
    let r = marker.rect;
    let pole_x = r.center().x - 2.5;
    out.extend(shapes::rect(
        Vec2::new(pole_x, r.top()),
        Vec2::new(5.0, r.size.y),
        colors::GRAY,
    ));
    out.extend(shapes::circle(
        Vec2::new(pole_x + 2.5, r.top()),
        5.0,
        colors::GOLD,
        12,
    ));

    // Flag hangs low until raised
    let (flag_y, flag_color) = if marker.flag_raised {
        (r.top() + 6.0, colors::GRASS)
    } else {
        (r.top() + r.size.y * 0.6, colors::RED)
    };
    let base = Vec2::new(pole_x + 5.0, flag_y);
    out.extend(shapes::triangle(
        base,
        base + Vec2::new(28.0, 10.0),
        base + Vec2::new(0.0, 20.0),
        flag_color,
    ));
}

fn draw_collectible(out: &mut Vec<Vertex>, item: &Collectible, settings: &Settings) {
    let bob = if settings.animations_enabled() {
        item.phase.sin() * 3.0
    } else {
        0.0
    };
    let center = item.pos + Vec2::new(0.0, bob);

    match item.kind {
        CollectibleKind::Coin => {
            out.extend(shapes::circle(center, COIN_RADIUS, colors::YELLOW, 16));
            out.extend(shapes::circle(center, COIN_RADIUS - 3.0, colors::GOLD, 16));
        }
        CollectibleKind::Mushroom => {
            let half = POWER_UP_SIZE * 0.5;
            // Stem, then cap with spots
            out.extend(shapes::rect(
                center + Vec2::new(-half * 0.5, 0.0),
                Vec2::new(half, half),
                colors::SKIN,
            ));
            out.extend(shapes::ellipse(
                center,
                Vec2::new(half, half * 0.75),
                colors::RED,
                DEFAULT_SEGMENTS,
            ));
            out.extend(shapes::circle(center + Vec2::new(-4.0, -3.0), 2.5, colors::WHITE, 8));
            out.extend(shapes::circle(center + Vec2::new(4.0, -3.0), 2.5, colors::WHITE, 8));
        }
        CollectibleKind::FireFlower => {
            let half = POWER_UP_SIZE * 0.5;
            out.extend(shapes::rect(
                center + Vec2::new(-1.5, 0.0),
                Vec2::new(3.0, half),
                colors::GRASS,
            ));
            for i in 0..4 {
                let angle = i as f32 * std::f32::consts::FRAC_PI_2;
                let petal = center + Vec2::new(angle.cos(), angle.sin()) * 5.0;
                out.extend(shapes::circle(petal, 4.0, colors::ORANGE, 10));
            }
            out.extend(shapes::circle(center, 3.0, colors::YELLOW, 10));
        }
    }
}

fn draw_enemy(out: &mut Vec<Vertex>, enemy: &Enemy, defeat_ticks: u32) {
    let r = enemy.rect();
    let (body, dark) = match enemy.kind {
        EnemyKind::Goomba => (colors::GOOMBA, colors::GOOMBA_DARK),
        EnemyKind::Koopa => (colors::KOOPA, colors::KOOPA_SHELL),
    };

    match enemy.state {
        EnemyState::Walking => {
            out.extend(shapes::ellipse_in(r.min, r.size, body));
            out.extend(shapes::ellipse_in(
                r.min,
                Vec2::new(r.size.x, r.size.y * 0.5),
                dark,
            ));
            let eye_y = r.top() + r.size.y * 0.4;
            let look = enemy.facing.sign() * 2.0;
            for dx in [r.size.x * 0.3, r.size.x * 0.7] {
                out.extend(shapes::circle(
                    Vec2::new(r.left() + dx, eye_y),
                    3.5,
                    colors::WHITE,
                    10,
                ));
                out.extend(shapes::circle(
                    Vec2::new(r.left() + dx + look, eye_y),
                    1.8,
                    colors::BLACK,
                    8,
                ));
            }
        }
        EnemyState::Defeated {
            cause: DefeatCause::Stomped,
            ..
        } => {
            // Squished flat against the ground
            out.extend(shapes::rect(
                Vec2::new(r.left(), r.bottom() - 6.0),
                Vec2::new(r.size.x, 6.0),
                body,
            ));
        }
        EnemyState::Defeated {
            cause: DefeatCause::Burned,
            ticks,
        } => {
            let fade = ticks as f32 / defeat_ticks.max(1) as f32;
            let mut color = dark;
            color[3] = fade;
            out.extend(shapes::ellipse_in(r.min, r.size, color));
        }
    }
}

fn draw_boss(out: &mut Vec<Vertex>, boss: &Boss) {
    let r = boss.rect();
    let (x, y, w, h) = (r.left(), r.top(), r.size.x, r.size.y);

    match boss.kind {
        BossKind::Kamek => {
            out.extend(shapes::rect(r.min, r.size, colors::KAMEK));
            out.extend(shapes::circle(
                Vec2::new(x + w * 0.5, y - 10.0),
                20.0,
                colors::KAMEK_HAT,
                DEFAULT_SEGMENTS,
            ));
            for ex in [0.25, 0.75] {
                let eye = Vec2::new(x + w * ex, y + 20.0);
                out.extend(shapes::circle(eye, 10.0, colors::YELLOW, 14));
                out.extend(shapes::circle(eye, 5.0, colors::BLACK, 10));
            }
            out.extend(shapes::triangle(
                Vec2::new(x + w * 0.5, y + 30.0),
                Vec2::new(x + w * 0.375, y + 50.0),
                Vec2::new(x + w * 0.625, y + 50.0),
                [1.0, 0.6, 0.6, 1.0],
            ));
        }
        BossKind::KingBoo => {
            let center = r.center();
            out.extend(shapes::circle(center, w * 0.5, colors::BOO, 28));
            out.extend(shapes::circle(center, w * 0.5 - 5.0, [0.8, 0.8, 0.84, 1.0], 28));
            out.extend(shapes::triangle(
                Vec2::new(x + w * 0.25, y + 10.0),
                Vec2::new(x + w * 0.5, y - 20.0),
                Vec2::new(x + w * 0.75, y + 10.0),
                colors::YELLOW,
            ));
            out.extend(shapes::ellipse_in(
                Vec2::new(x + w * 0.25, y + 20.0),
                Vec2::new(20.0, 30.0),
                colors::BLACK,
            ));
            out.extend(shapes::ellipse_in(
                Vec2::new(x + w * 0.5, y + 20.0),
                Vec2::new(20.0, 30.0),
                colors::BLACK,
            ));
        }
        BossKind::Wiggler => {
            // Body segments trailing behind the head
            let seg = h * 0.3;
            for i in (0..4).rev() {
                let offset = -boss.facing.sign() * i as f32 * seg * 0.8;
                let c = Vec2::new(x + w * 0.5 + offset, y + h - seg);
                out.extend(shapes::circle(c, seg, colors::WIGGLER, 18));
            }
            let head = Vec2::new(x + w * 0.5, y + h - seg * 1.6);
            let head_color = if boss.charge_ticks > 0 {
                colors::RED
            } else {
                colors::WIGGLER
            };
            out.extend(shapes::circle(head, seg * 1.1, head_color, 20));
            out.extend(shapes::circle(
                head + Vec2::new(boss.facing.sign() * 8.0, -4.0),
                5.0,
                colors::BLACK,
                10,
            ));
        }
        BossKind::BowserJr => {
            out.extend(shapes::ellipse_in(r.min, r.size, colors::KOOPA));
            out.extend(shapes::ellipse_in(
                Vec2::new(x + 10.0, y + h * 0.35),
                Vec2::new(w - 20.0, h * 0.6),
                colors::KOOPA_SHELL,
            ));
            out.extend(shapes::ellipse_in(
                Vec2::new(x + w * 0.3, y + 5.0),
                Vec2::new(w * 0.4, h * 0.3),
                colors::SKIN,
            ));
            out.extend(shapes::circle(
                Vec2::new(x + w * 0.5 + boss.facing.sign() * 8.0, y + 18.0),
                4.0,
                colors::BLACK,
                10,
            ));
        }
        BossKind::DryBowser => {
            out.extend(shapes::rect(r.min, r.size, colors::DRY_BONES));
            out.extend(shapes::rect_outline(r.min, r.size, 3.0, colors::GRAY));
            for hx in [0.15, 0.85] {
                let base = Vec2::new(x + w * hx, y);
                out.extend(shapes::triangle(
                    base + Vec2::new(-8.0, 0.0),
                    base + Vec2::new(0.0, -22.0),
                    base + Vec2::new(8.0, 0.0),
                    colors::WHITE,
                ));
            }
            for ex in [0.3, 0.7] {
                out.extend(shapes::circle(
                    Vec2::new(x + w * ex, y + 25.0),
                    7.0,
                    colors::BLACK,
                    12,
                ));
                out.extend(shapes::circle(
                    Vec2::new(x + w * ex, y + 25.0),
                    2.5,
                    colors::RED,
                    8,
                ));
            }
        }
    }

    // Health bar above the boss
    let bar = Vec2::new(w, 6.0);
    let bar_pos = Vec2::new(x, y - 34.0);
    out.extend(shapes::rect(bar_pos, bar, colors::BLACK));
    let frac = boss.health as f32 / boss.max_health.max(1) as f32;
    out.extend(shapes::rect(bar_pos, Vec2::new(w * frac, bar.y), colors::RED));
}

fn draw_projectile(out: &mut Vec<Vertex>, shot: &Projectile) {
    let r = shot.radius();
    match shot.kind {
        ProjectileKind::Fireball => {
            out.extend(shapes::circle(shot.pos, r, colors::ORANGE, 12));
            out.extend(shapes::circle(shot.pos, r - 2.0, colors::YELLOW, 10));
        }
        ProjectileKind::MagicBolt => {
            out.extend(shapes::circle(shot.pos, r + 2.0, colors::MAGIC, 12));
        }
        ProjectileKind::GhostOrb => {
            out.extend(shapes::circle(shot.pos, r + 2.0, colors::BOO, 12));
            out.extend(shapes::circle(shot.pos, r - 2.0, colors::MAGIC, 10));
        }
        ProjectileKind::BossFireball => {
            out.extend(shapes::circle(shot.pos, r + 2.0, colors::RED, 12));
            out.extend(shapes::circle(shot.pos, r - 1.0, colors::ORANGE, 10));
        }
        ProjectileKind::Bone => {
            out.extend(shapes::ellipse(
                shot.pos,
                Vec2::new(r + 2.0, r * 0.6),
                colors::WHITE,
                12,
            ));
        }
    }
}

fn draw_player(out: &mut Vec<Vertex>, player: &Player, time_ticks: u64) {
    let r = player.rect();
    let body_color = match player.power {
        PowerLevel::Small | PowerLevel::Super => colors::RED,
        PowerLevel::Fire => colors::PLAYER_FIRE,
    };

    // Small players are drawn shorter inside the same hitbox; crouching halves it
    let scale = match (player.crouching, player.power) {
        (true, _) => 0.5,
        (false, PowerLevel::Small) => 0.75,
        (false, _) => 1.0,
    };
    let height = r.size.y * scale;
    let top = r.bottom() - height;

    out.extend(shapes::rect(
        Vec2::new(r.left(), top),
        Vec2::new(r.size.x, height),
        body_color,
    ));
    out.extend(shapes::rect(
        Vec2::new(r.left() + 3.0, top + height * 0.55),
        Vec2::new(r.size.x - 6.0, height * 0.45),
        colors::OVERALLS,
    ));

    let face = Vec2::new(
        r.center().x + player.facing.sign() * 3.0,
        top + height * 0.25,
    );
    out.extend(shapes::circle(face, 7.0, colors::SKIN, 14));
    out.extend(shapes::circle(
        face + Vec2::new(player.facing.sign() * 3.0, -1.0),
        1.8,
        colors::BLACK,
        8,
    ));

    // Cap
    out.extend(shapes::rect(
        Vec2::new(r.left() - 3.0, top - 2.0),
        Vec2::new(r.size.x + 6.0, 6.0),
        colors::RED,
    ));

    if player.spin_ticks > 0 {
        let center = r.center();
        for i in 0..3 {
            let angle = time_ticks as f32 * 0.3 + i as f32 * 2.0;
            let star = center + Vec2::new(angle.cos(), angle.sin()) * 16.0;
            out.extend(shapes::circle(star, 3.0, colors::YELLOW, 8));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tuning;

    fn playing_state() -> GameState {
        let mut state = GameState::new(3, Tuning::default());
        state.load_level(1, 1);
        state
    }

    #[test]
    fn test_scene_is_triangle_list() {
        let state = playing_state();
        let verts = build_scene(&state, &Settings::default());
        assert!(verts.len() > 6);
        assert_eq!(verts.len() % 3, 0);
    }

    #[test]
    fn test_sky_depends_on_world() {
        assert_ne!(sky_color(1), sky_color(2));
        assert_eq!(sky_color(1), sky_color(6));

        let mut state = playing_state();
        state.load_level(4, 1);
        let verts = build_scene(&state, &Settings::default());
        assert_eq!(verts[0].color, sky_color(4));
    }

    #[test]
    fn test_invulnerable_player_blinks() {
        let mut state = playing_state();
        state.player.invulnerable_ticks = 60;
        let settings = Settings::default();

        let counts: Vec<usize> = (0..BLINK_PERIOD)
            .map(|t| {
                state.time_ticks = t;
                build_scene(&state, &settings).len()
            })
            .collect();
        assert!(counts.iter().any(|&c| c != counts[0]));

        // Reduced motion keeps the player visible
        let calm = Settings {
            reduced_motion: true,
            ..Default::default()
        };
        let counts: Vec<usize> = (0..BLINK_PERIOD)
            .map(|t| {
                state.time_ticks = t;
                build_scene(&state, &calm).len()
            })
            .collect();
        assert!(counts.iter().all(|&c| c == counts[0]));
    }

    #[test]
    fn test_broken_platform_is_not_drawn() {
        let mut state = playing_state();
        let settings = Settings::default();
        let before = build_scene(&state, &settings).len();

        let brick = state
            .world
            .platforms
            .iter_mut()
            .find(|p| p.breakable)
            .expect("layout has a brick");
        brick.broken = true;
        assert!(build_scene(&state, &settings).len() < before);
    }

    #[test]
    fn test_intro_draws_only_card() {
        let state = GameState::new(3, Tuning::default());
        let verts = build_scene(&state, &Settings::default());
        // Sky plus the two card panels
        assert_eq!(verts.len(), 18);
    }
}
