//! Game state and core simulation types
//!
//! The World Model for the active level plus everything that survives level
//! transitions (player stats, session phase).

use glam::Vec2;

use super::geom::{Rect, circle_overlaps_rect};
use super::level::build_world;
use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Title cards, counts up to `Tuning::intro_ticks`
    Intro { ticks: u32 },
    /// Regular level in progress
    Playing,
    /// End marker reached; the next level loads when `ticks` runs out
    LevelComplete { ticks: u32 },
    /// Boss arena in progress
    BossFight,
    /// Boss beaten; the next world loads when `ticks` runs out
    BossDefeated { ticks: u32 },
    /// All lives lost, waiting for restart
    GameOver,
    /// Final boss beaten, waiting for restart
    Victory,
}

impl GamePhase {
    /// Terminal phases only leave through a restart
    pub fn is_terminal(&self) -> bool {
        matches!(self, GamePhase::GameOver | GamePhase::Victory)
    }
}

/// Horizontal facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

/// Player upgrade level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum PowerLevel {
    #[default]
    Small,
    Super,
    Fire,
}

impl PowerLevel {
    /// One step up (mushroom)
    pub fn upgraded(self) -> Self {
        match self {
            PowerLevel::Small => PowerLevel::Super,
            PowerLevel::Super | PowerLevel::Fire => PowerLevel::Fire,
        }
    }

    /// One step down, `None` when already small
    pub fn downgraded(self) -> Option<Self> {
        match self {
            PowerLevel::Small => None,
            PowerLevel::Super => Some(PowerLevel::Small),
            PowerLevel::Fire => Some(PowerLevel::Super),
        }
    }
}

/// The player character
#[derive(Debug, Clone)]
pub struct Player {
    /// Top-left corner of the hitbox
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub facing: Facing,
    pub grounded: bool,
    pub crouching: bool,
    pub lives: u32,
    pub score: u64,
    pub coins: u32,
    pub power: PowerLevel,
    pub invulnerable_ticks: u32,
    /// Spin jump animation countdown
    pub spin_ticks: u32,
    pub fireball_cooldown: u32,
    /// Fireballs thrown by the player
    pub fireballs: Vec<Projectile>,
}

impl Player {
    pub fn new(spawn: Vec2, lives: u32) -> Self {
        Self {
            pos: spawn,
            vel: Vec2::ZERO,
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            facing: Facing::Right,
            grounded: false,
            crouching: false,
            lives,
            score: 0,
            coins: 0,
            power: PowerLevel::Small,
            invulnerable_ticks: 0,
            spin_ticks: 0,
            fireball_cooldown: 0,
            fireballs: Vec::new(),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    #[inline]
    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_ticks > 0
    }

    /// Put the player back at a spawn point, keeping stats
    pub fn respawn(&mut self, spawn: Vec2, invulnerable_ticks: u32) {
        self.pos = spawn;
        self.vel = Vec2::ZERO;
        self.facing = Facing::Right;
        self.grounded = false;
        self.crouching = false;
        self.spin_ticks = 0;
        self.fireball_cooldown = 0;
        self.fireballs.clear();
        self.invulnerable_ticks = invulnerable_ticks;
    }
}

/// Static level geometry
#[derive(Debug, Clone, PartialEq)]
pub struct Platform {
    pub rect: Rect,
    /// Can be broken by a powered-up head bump
    pub breakable: bool,
    pub broken: bool,
}

impl Platform {
    pub fn solid(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            rect: Rect::new(x, y, w, h),
            breakable: false,
            broken: false,
        }
    }

    pub fn breakable(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            breakable: true,
            ..Self::solid(x, y, w, h)
        }
    }

    /// Broken platforms take part in no collision
    #[inline]
    pub fn is_solid(&self) -> bool {
        !self.broken
    }
}

/// Enemy types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyKind {
    Goomba,
    Koopa,
}

impl EnemyKind {
    /// Walking speed relative to `Tuning::enemy_speed`
    pub fn speed_factor(self) -> f32 {
        match self {
            EnemyKind::Goomba => 1.0,
            EnemyKind::Koopa => 0.75,
        }
    }
}

/// How an enemy was defeated (selects the defeat animation)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefeatCause {
    Stomped,
    Burned,
}

/// Enemy lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyState {
    Walking,
    /// Out of play; removed when `ticks` reaches zero
    Defeated { cause: DefeatCause, ticks: u32 },
}

/// A walking enemy
#[derive(Debug, Clone)]
pub struct Enemy {
    pub pos: Vec2,
    pub vel: Vec2,
    pub facing: Facing,
    pub kind: EnemyKind,
    pub state: EnemyState,
}

impl Enemy {
    pub fn new(kind: EnemyKind, x: f32, y: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            vel: Vec2::ZERO,
            facing: Facing::Left,
            kind,
            state: EnemyState::Walking,
        }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::splat(ENEMY_SIZE)
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size())
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        matches!(self.state, EnemyState::Walking)
    }

    pub fn defeat(&mut self, cause: DefeatCause, ticks: u32) {
        self.state = EnemyState::Defeated { cause, ticks };
        self.vel = Vec2::ZERO;
    }
}

/// Collectible types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectibleKind {
    Coin,
    /// Raises the power level by one
    Mushroom,
    /// Jumps straight to the fire power level
    FireFlower,
}

/// A coin or power-up
#[derive(Debug, Clone)]
pub struct Collectible {
    /// Center point
    pub pos: Vec2,
    pub kind: CollectibleKind,
    pub collected: bool,
    /// Bobbing animation phase (radians, cosmetic only)
    pub phase: f32,
}

impl Collectible {
    pub fn coin(x: f32, y: f32) -> Self {
        Self::new(CollectibleKind::Coin, x, y)
    }

    pub fn new(kind: CollectibleKind, x: f32, y: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            kind,
            collected: false,
            // Stagger neighbouring coins so they do not bob in lockstep
            phase: x * 0.05,
        }
    }

    /// Whether the pickup hitbox touches `rect`
    pub fn touches(&self, rect: &Rect) -> bool {
        match self.kind {
            CollectibleKind::Coin => circle_overlaps_rect(self.pos, COIN_RADIUS, rect),
            CollectibleKind::Mushroom | CollectibleKind::FireFlower => {
                let half = Vec2::splat(POWER_UP_SIZE * 0.5);
                Rect::from_pos_size(self.pos - half, half * 2.0).overlaps(rect)
            }
        }
    }
}

/// Projectile types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileKind {
    /// Player fireball, bounces along platforms
    Fireball,
    /// Kamek's straight magic shot
    MagicBolt,
    /// King Boo's aimed orb
    GhostOrb,
    /// Bowser Jr.'s spread fire
    BossFireball,
    /// Dry Bowser's fanned bones
    Bone,
}

impl ProjectileKind {
    /// Fraction of gravity applied each tick (magic floats)
    pub fn gravity_scale(self) -> f32 {
        match self {
            ProjectileKind::Fireball => 1.0,
            ProjectileKind::MagicBolt | ProjectileKind::GhostOrb => 0.0,
            ProjectileKind::BossFireball => 0.05,
            ProjectileKind::Bone => 0.15,
        }
    }

    pub fn bounces(self) -> bool {
        self == ProjectileKind::Fireball
    }
}

/// A moving projectile
#[derive(Debug, Clone)]
pub struct Projectile {
    /// Center point
    pub pos: Vec2,
    pub vel: Vec2,
    pub kind: ProjectileKind,
    pub bounces: u32,
    /// Ticks left before the projectile expires
    pub lifetime: u32,
}

impl Projectile {
    pub fn new(kind: ProjectileKind, pos: Vec2, vel: Vec2, lifetime: u32) -> Self {
        Self {
            pos,
            vel,
            kind,
            bounces: 0,
            lifetime,
        }
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        PROJECTILE_RADIUS
    }

    pub fn hits(&self, rect: &Rect) -> bool {
        circle_overlaps_rect(self.pos, self.radius(), rect)
    }
}

/// Boss types, one per world
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossKind {
    Kamek,
    KingBoo,
    Wiggler,
    BowserJr,
    DryBowser,
}

impl BossKind {
    pub const ALL: [BossKind; 5] = [
        BossKind::Kamek,
        BossKind::KingBoo,
        BossKind::Wiggler,
        BossKind::BowserJr,
        BossKind::DryBowser,
    ];

    /// Boss guarding a world (1-based, cycles past the fifth world)
    pub fn for_world(world: u32) -> Self {
        Self::ALL[(world.saturating_sub(1) as usize) % Self::ALL.len()]
    }

    pub fn name(self) -> &'static str {
        match self {
            BossKind::Kamek => "Kamek",
            BossKind::KingBoo => "King Boo",
            BossKind::Wiggler => "Wiggler",
            BossKind::BowserJr => "Bowser Jr.",
            BossKind::DryBowser => "Dry Bowser",
        }
    }
}

/// A boss and the projectiles it owns
#[derive(Debug, Clone)]
pub struct Boss {
    pub kind: BossKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub facing: Facing,
    pub health: u32,
    pub max_health: u32,
    /// Ticks until the next attack
    pub attack_cooldown: u32,
    /// Ticks during which further hits are ignored
    pub hurt_ticks: u32,
    /// Ticks of charging left (Wiggler)
    pub charge_ticks: u32,
    pub projectiles: Vec<Projectile>,
}

impl Boss {
    pub fn new(kind: BossKind, x: f32, y: f32, tuning: &Tuning) -> Self {
        Self {
            kind,
            pos: Vec2::new(x, y),
            vel: Vec2::ZERO,
            facing: Facing::Left,
            health: tuning.boss_health,
            max_health: tuning.boss_health,
            attack_cooldown: tuning.boss_attack_interval_ticks,
            hurt_ticks: 0,
            charge_ticks: 0,
            projectiles: Vec::new(),
        }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::splat(BOSS_SIZE)
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size())
    }

    #[inline]
    pub fn is_defeated(&self) -> bool {
        self.health == 0
    }
}

/// Flagpole at the end of a regular level
#[derive(Debug, Clone, PartialEq)]
pub struct EndMarker {
    pub rect: Rect,
    pub flag_raised: bool,
}

impl EndMarker {
    pub fn flagpole(x: f32, y: f32) -> Self {
        Self {
            rect: Rect::new(x, y, FLAGPOLE_WIDTH, FLAGPOLE_HEIGHT),
            flag_raised: false,
        }
    }
}

/// Everything that belongs to the active level
#[derive(Debug, Clone, Default)]
pub struct World {
    pub platforms: Vec<Platform>,
    pub enemies: Vec<Enemy>,
    pub collectibles: Vec<Collectible>,
    pub boss: Option<Boss>,
    pub end_marker: Option<EndMarker>,
    /// Player start position (top-left of hitbox)
    pub spawn: Vec2,
}

/// Things that happened during a tick (consumed by logging and the shell)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    IntroFinished,
    LevelStarted { world: u32, level: u32 },
    BossFightStarted(BossKind),
    Jumped,
    SpinJumped,
    FireballThrown,
    CoinCollected,
    PowerUp(CollectibleKind),
    EnemyStomped(EnemyKind),
    EnemyBurned(EnemyKind),
    BrickBroken,
    /// Hit while powered up: lost a power level, not a life
    PowerDown(PowerLevel),
    LifeLost { remaining: u32 },
    BossAttack(BossKind),
    BossHit { remaining: u32 },
    BossDefeated(BossKind),
    LevelComplete { world: u32, level: u32 },
    GameOver,
    Victory,
    Restarted,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Session seed (level randomness)
    pub seed: u64,
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// 1-based world number
    pub world_number: u32,
    /// 1-based level number within the world
    pub level_number: u32,
    pub player: Player,
    pub world: World,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events raised by the most recent tick
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a session at world 1-1, starting with the intro
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let world = build_world(seed, 1, 1, &tuning);
        let player = Player::new(world.spawn, tuning.starting_lives);
        Self {
            seed,
            tuning,
            phase: GamePhase::Intro { ticks: 0 },
            world_number: 1,
            level_number: 1,
            player,
            world,
            time_ticks: 0,
            events: Vec::new(),
        }
    }

    /// Whether a level number is the boss arena of its world
    pub fn is_boss_level(&self, level: u32) -> bool {
        level >= self.tuning.levels_per_world
    }

    /// Rebuild the World Model for a level and drop the player at its spawn
    pub fn load_level(&mut self, world: u32, level: u32) {
        self.world_number = world;
        self.level_number = level;
        self.world = build_world(self.seed, world, level, &self.tuning);
        self.player.respawn(self.world.spawn, 0);

        if self.is_boss_level(level) {
            let kind = BossKind::for_world(world);
            log::info!("World {} boss: {}", world, kind.name());
            self.phase = GamePhase::BossFight;
            self.events.push(GameEvent::BossFightStarted(kind));
        } else {
            log::info!("Starting level {}-{}", world, level);
            self.phase = GamePhase::Playing;
            self.events.push(GameEvent::LevelStarted { world, level });
        }
    }

    /// Reset player and progress to world 1-1 (from game over or victory)
    pub fn restart(&mut self) {
        self.player = Player::new(Vec2::ZERO, self.tuning.starting_lives);
        self.load_level(1, 1);
        self.events.push(GameEvent::Restarted);
        log::info!("Session restarted");
    }

    /// Rebuild the current level without touching player stats
    pub fn reset_level(&mut self) {
        let (world, level) = (self.world_number, self.level_number);
        self.load_level(world, level);
        self.player.invulnerable_ticks = self.tuning.invulnerability_ticks;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_level_steps() {
        assert_eq!(PowerLevel::Small.upgraded(), PowerLevel::Super);
        assert_eq!(PowerLevel::Fire.upgraded(), PowerLevel::Fire);
        assert_eq!(PowerLevel::Fire.downgraded(), Some(PowerLevel::Super));
        assert_eq!(PowerLevel::Small.downgraded(), None);
    }

    #[test]
    fn test_boss_per_world_cycles() {
        assert_eq!(BossKind::for_world(1), BossKind::Kamek);
        assert_eq!(BossKind::for_world(5), BossKind::DryBowser);
        assert_eq!(BossKind::for_world(6), BossKind::Kamek);
    }

    #[test]
    fn test_level_zero_loads_as_regular_level() {
        let mut state = GameState::new(1, Tuning::default());
        state.load_level(1, 0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.world.end_marker.is_some());
    }

    #[test]
    fn test_new_session_starts_in_intro() {
        let state = GameState::new(1, Tuning::default());
        assert_eq!(state.phase, GamePhase::Intro { ticks: 0 });
        assert_eq!(state.player.lives, 3);
        assert_eq!((state.world_number, state.level_number), (1, 1));
        assert!(!state.world.platforms.is_empty());
    }

    #[test]
    fn test_load_boss_level_enters_boss_fight() {
        let mut state = GameState::new(1, Tuning::default());
        state.load_level(2, 4);
        assert_eq!(state.phase, GamePhase::BossFight);
        let boss = state.world.boss.as_ref().expect("boss arena has a boss");
        assert_eq!(boss.kind, BossKind::KingBoo);
        assert!(state.world.end_marker.is_none());
    }

    #[test]
    fn test_coin_touch_uses_circle() {
        let coin = Collectible::coin(100.0, 100.0);
        // Nearest corner is ~9.9 px from the center, just past the radius
        let near_corner = Rect::new(107.0, 107.0, 10.0, 10.0);
        assert!(!coin.touches(&near_corner));
        assert!(coin.touches(&Rect::new(105.0, 95.0, 10.0, 10.0)));
    }
}
