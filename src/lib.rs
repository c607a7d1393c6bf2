//! Pocket Platformer - a side-scrolling arcade platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, game state)
//! - `renderer`: Shape composition and the WebGPU pipeline
//! - `ui`: HUD and overlay text
//! - `tuning`: Data-driven gameplay parameters
//! - `settings` / `highscores`: Player preferences and leaderboard

pub mod highscores;
pub mod renderer;
pub mod settings;
pub mod sim;
mod storage;
pub mod tuning;
pub mod ui;

pub use highscores::HighScores;
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate. All gameplay speeds are in pixels per tick.
    pub const SIM_HZ: u32 = 60;
    /// Fixed simulation timestep in seconds
    pub const SIM_DT: f32 = 1.0 / SIM_HZ as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Level dimensions (one screen per level, y grows downward)
    pub const LEVEL_WIDTH: f32 = 800.0;
    pub const LEVEL_HEIGHT: f32 = 600.0;
    /// Height of the ground strip at the bottom of every level
    pub const GROUND_HEIGHT: f32 = 50.0;

    /// Player hitbox
    pub const PLAYER_WIDTH: f32 = 24.0;
    pub const PLAYER_HEIGHT: f32 = 40.0;

    /// Enemy hitbox
    pub const ENEMY_SIZE: f32 = 28.0;

    /// Boss hitbox
    pub const BOSS_SIZE: f32 = 80.0;

    /// Collectible geometry
    pub const COIN_RADIUS: f32 = 9.0;
    pub const POWER_UP_SIZE: f32 = 22.0;

    /// Projectile radius (fireballs and boss shots)
    pub const PROJECTILE_RADIUS: f32 = 6.0;

    /// Flagpole geometry
    pub const FLAGPOLE_WIDTH: f32 = 10.0;
    pub const FLAGPOLE_HEIGHT: f32 = 200.0;
}

/// Y coordinate of the top of the ground strip
#[inline]
pub fn ground_top() -> f32 {
    consts::LEVEL_HEIGHT - consts::GROUND_HEIGHT
}
