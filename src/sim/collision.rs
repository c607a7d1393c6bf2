//! Collision detection and response against static platforms
//!
//! Movement is axis-separated: the body moves horizontally and is pushed out
//! of any platform it entered, then moves vertically and is pushed out again.
//! Bodies never move more than a platform's thickness per tick, so no
//! sub-stepping is needed.

use glam::Vec2;

use super::geom::Rect;
use super::state::Platform;

/// Vertical slack ignored by the horizontal pass so a body resting exactly on
/// a platform is not pushed sideways by rounding error
const CONTACT_EPSILON: f32 = 0.01;

/// What a body touched while moving
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Contacts {
    /// Stopped by a wall during the horizontal pass
    pub blocked: bool,
    /// Index of the platform the body landed on
    pub ground: Option<usize>,
    /// Index of the platform the body hit with its head
    pub ceiling: Option<usize>,
}

/// Outcome of touching an enemy or boss
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
    /// Player came down on top: target is hit, player bounces
    Stomp,
    /// Anything else: player takes damage
    Hurt,
}

/// Move a body by its velocity and resolve platform overlaps
///
/// `pos` is the top-left corner of a `size` hitbox. Velocity components are
/// zeroed on the axis that made contact.
pub fn move_and_collide(
    pos: &mut Vec2,
    vel: &mut Vec2,
    size: Vec2,
    platforms: &[Platform],
) -> Contacts {
    let mut contacts = Contacts::default();

    // Horizontal pass
    pos.x += vel.x;
    if vel.x != 0.0 {
        for platform in platforms.iter().filter(|p| p.is_solid()) {
            let body = Rect::from_pos_size(*pos, size).inset_y(CONTACT_EPSILON);
            if !body.overlaps(&platform.rect) {
                continue;
            }
            if vel.x > 0.0 {
                pos.x = platform.rect.left() - size.x;
            } else {
                pos.x = platform.rect.right();
            }
            contacts.blocked = true;
        }
        if contacts.blocked {
            vel.x = 0.0;
        }
    }

    // Vertical pass
    pos.y += vel.y;
    for (i, platform) in platforms.iter().enumerate() {
        if !platform.is_solid() {
            continue;
        }
        let body = Rect::from_pos_size(*pos, size);
        if !body.overlaps(&platform.rect) {
            continue;
        }
        if vel.y > 0.0 {
            pos.y = platform.rect.top() - size.y;
            vel.y = 0.0;
            contacts.ground = Some(i);
        } else if vel.y < 0.0 {
            pos.y = platform.rect.bottom();
            vel.y = 0.0;
            contacts.ceiling = Some(i);
        }
    }

    contacts
}

/// Integrate gravity into a vertical velocity, clamped to terminal speed
#[inline]
pub fn apply_gravity(vel: &mut Vec2, gravity: f32, max_fall_speed: f32) {
    vel.y = (vel.y + gravity).min(max_fall_speed);
}

/// Decide whether touching `target` is a stomp or hurts the player
///
/// A stomp needs the player to be falling with its lower edge above the
/// target's top plus `stomp_depth_fraction` of the target's height.
pub fn classify_contact(
    player: &Rect,
    player_vel_y: f32,
    target: &Rect,
    stomp_depth_fraction: f32,
) -> ContactOutcome {
    let threshold = target.top() + target.size.y * stomp_depth_fraction;
    if player_vel_y > 0.0 && player.bottom() < threshold {
        ContactOutcome::Stomp
    } else {
        ContactOutcome::Hurt
    }
}

/// Index of the platform directly under a point, if any
///
/// Used to look ahead for gaps.
pub fn platform_below(point: Vec2, max_drop: f32, platforms: &[Platform]) -> Option<usize> {
    platforms.iter().position(|p| {
        p.is_solid()
            && point.x >= p.rect.left()
            && point.x <= p.rect.right()
            && p.rect.top() >= point.y
            && p.rect.top() - point.y <= max_drop
    })
}
