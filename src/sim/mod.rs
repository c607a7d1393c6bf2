//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (level generation)
//! - Stable iteration order (entity vectors in insertion order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod geom;
pub mod level;
pub mod state;
pub mod tick;

pub use collision::{ContactOutcome, Contacts, classify_contact, move_and_collide};
pub use geom::Rect;
pub use level::build_world;
pub use state::{
    Boss, BossKind, Collectible, CollectibleKind, DefeatCause, EndMarker, Enemy, EnemyKind,
    EnemyState, Facing, GameEvent, GamePhase, GameState, Platform, Player, PowerLevel,
    Projectile, ProjectileKind, World,
};
pub use tick::{TickInput, demo_input, tick};
