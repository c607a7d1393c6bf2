//! Data-driven game balance
//!
//! Every gameplay number the simulation uses lives here. Units are pixels and
//! ticks (see `consts::SIM_HZ`). Any subset can be overridden from JSON; fields
//! left out keep their defaults.

use serde::{Deserialize, Serialize};

/// Gameplay parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Kinematics ===
    /// Downward acceleration added to vertical velocity each tick
    pub gravity: f32,
    /// Terminal fall speed
    pub max_fall_speed: f32,
    /// Player horizontal speed while a direction is held
    pub walk_speed: f32,
    /// Upward launch speed of a normal jump
    pub jump_velocity: f32,
    /// Spin jump launches this much higher than a normal jump
    pub spin_jump_multiplier: f32,
    /// Ticks the spin animation lasts
    pub spin_jump_ticks: u32,
    /// Base enemy walking speed (scaled per enemy kind)
    pub enemy_speed: f32,

    // === Contact rules ===
    /// A falling player stomps a target when its lower edge is above
    /// `target.top + target.height * stomp_depth_fraction`
    pub stomp_depth_fraction: f32,
    /// Upward speed given to the player after a stomp
    pub stomp_bounce: f32,
    /// Invulnerability window after damage or respawn
    pub invulnerability_ticks: u32,
    /// Upward hop given to a powered-up player when hit
    pub knockback_hop: f32,
    /// Ticks a defeated enemy stays around for its animation
    pub defeat_animation_ticks: u32,

    // === Fireballs ===
    pub fireball_speed: f32,
    /// Upward speed after bouncing off a platform top
    pub fireball_bounce: f32,
    pub fireball_max_bounces: u32,
    pub fireball_lifetime_ticks: u32,
    pub fireball_cooldown_ticks: u32,
    /// Maximum fireballs on screen at once
    pub max_fireballs: usize,

    // === Boss ===
    pub boss_health: u32,
    pub boss_speed: f32,
    pub boss_charge_speed: f32,
    pub boss_charge_ticks: u32,
    pub boss_attack_interval_ticks: u32,
    pub boss_projectile_speed: f32,
    pub boss_projectile_lifetime_ticks: u32,
    /// Ticks after a hit during which the boss cannot be hurt again
    pub boss_hurt_ticks: u32,

    // === Scoring ===
    pub coin_score: u64,
    pub power_up_score: u64,
    pub stomp_score: u64,
    pub fireball_kill_score: u64,
    pub brick_score: u64,
    pub boss_hit_score: u64,
    pub boss_defeat_score: u64,

    // === Session ===
    pub starting_lives: u32,
    /// Ticks each intro card is shown
    pub intro_card_ticks: u32,
    pub level_complete_ticks: u32,
    pub boss_defeated_ticks: u32,
    /// Number of worlds; clearing the last boss wins the game
    pub worlds: u32,
    /// Levels per world; the last one is the boss arena
    pub levels_per_world: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 0.5,
            max_fall_speed: 12.0,
            walk_speed: 3.5,
            jump_velocity: 11.0,
            spin_jump_multiplier: 1.2,
            spin_jump_ticks: 30,
            enemy_speed: 1.5,

            stomp_depth_fraction: 0.5,
            stomp_bounce: 7.0,
            invulnerability_ticks: 120,
            knockback_hop: 5.0,
            defeat_animation_ticks: 20,

            fireball_speed: 7.0,
            fireball_bounce: 4.0,
            fireball_max_bounces: 3,
            fireball_lifetime_ticks: 180,
            fireball_cooldown_ticks: 20,
            max_fireballs: 2,

            boss_health: 5,
            boss_speed: 3.0,
            boss_charge_speed: 8.0,
            boss_charge_ticks: 60,
            boss_attack_interval_ticks: 90,
            boss_projectile_speed: 5.0,
            boss_projectile_lifetime_ticks: 240,
            boss_hurt_ticks: 30,

            coin_score: 100,
            power_up_score: 1000,
            stomp_score: 200,
            fireball_kill_score: 100,
            brick_score: 50,
            boss_hit_score: 100,
            boss_defeat_score: 1000,

            starting_lives: 3,
            intro_card_ticks: 180,
            level_complete_ticks: 120,
            boss_defeated_ticks: 120,
            worlds: 5,
            levels_per_world: 4,
        }
    }
}

/// Smallest gravity a tuning file may set
const MIN_GRAVITY: f32 = 0.05;

impl Tuning {
    /// Parse tuning from JSON, filling omitted fields with defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut tuning: Tuning = serde_json::from_str(json)?;
        tuning.sanitize();
        Ok(tuning)
    }

    /// Clamp values that would break the state machine or stop bodies falling
    fn sanitize(&mut self) {
        self.worlds = self.worlds.max(1);
        // At least one regular level before the boss arena
        self.levels_per_world = self.levels_per_world.max(2);
        self.starting_lives = self.starting_lives.max(1);
        self.boss_health = self.boss_health.max(1);
        self.stomp_depth_fraction = self.stomp_depth_fraction.clamp(0.0, 1.0);
        // Unsupported bodies must always fall
        self.gravity = self.gravity.max(MIN_GRAVITY);
        self.max_fall_speed = self.max_fall_speed.max(self.gravity);
    }

    /// Total intro length (two cards)
    pub fn intro_ticks(&self) -> u32 {
        self.intro_card_ticks * 2
    }

    /// Environment variable naming a JSON tuning file (native only)
    #[cfg(not(target_arch = "wasm32"))]
    const ENV_PATH: &'static str = "POCKET_PLATFORMER_TUNING";

    /// Load tuning overrides from the file named by `POCKET_PLATFORMER_TUNING`
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var(Self::ENV_PATH) else {
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path);
                    tuning
                }
                Err(e) => {
                    log::warn!("Invalid tuning file {}: {}", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read tuning file {}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Load tuning overrides stored under `pocket_platformer_tuning`
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let Some(json) = crate::storage::read("pocket_platformer_tuning") else {
            return Self::default();
        };
        match Self::from_json(&json) {
            Ok(tuning) => {
                log::info!("Loaded tuning overrides from LocalStorage");
                tuning
            }
            Err(e) => {
                log::warn!("Ignoring invalid tuning overrides: {}", e);
                Self::default()
            }
        }
    }
}
