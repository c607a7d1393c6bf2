//! HUD and overlay text
//!
//! Pure functions of the game state. The web shell writes the strings into DOM
//! elements; glyph rendering is the browser's job.

use crate::sim::{GamePhase, GameState, PowerLevel};

/// One labelled HUD value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HudItem {
    /// DOM id suffix (`hud-<id>`)
    pub id: &'static str,
    pub label: &'static str,
    pub value: String,
}

impl HudItem {
    fn new(id: &'static str, label: &'static str, value: impl Into<String>) -> Self {
        Self {
            id,
            label,
            value: value.into(),
        }
    }
}

/// Full-screen message shown outside of active play
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    pub title: String,
    pub subtitle: String,
    /// Prompt line, if the player can act
    pub prompt: Option<String>,
}

/// Studios named on the two intro cards
const INTRO_CARDS: [(&str, &str); 2] = [("SamSoft", "presents"), ("Nintendo", "co-presents")];

const RESTART_PROMPT: &str = "Press SPACE to play again or R to restart";

pub fn power_label(power: PowerLevel) -> &'static str {
    match power {
        PowerLevel::Small => "Small",
        PowerLevel::Super => "Super",
        PowerLevel::Fire => "Fire",
    }
}

/// "World 2-3", or "World 2 Boss" in the arena
pub fn stage_label(state: &GameState) -> String {
    if state.is_boss_level(state.level_number) {
        format!("World {} Boss", state.world_number)
    } else {
        format!("World {}-{}", state.world_number, state.level_number)
    }
}

/// HUD values for the current state, in display order
pub fn hud_items(state: &GameState) -> Vec<HudItem> {
    let player = &state.player;
    let mut items = vec![
        HudItem::new("score", "Score", player.score.to_string()),
        HudItem::new("coins", "Coins", player.coins.to_string()),
        HudItem::new("lives", "Lives", player.lives.to_string()),
        HudItem::new("stage", "Stage", stage_label(state)),
        HudItem::new("power", "Power", power_label(player.power)),
    ];

    if let Some(boss) = &state.world.boss {
        items.push(HudItem::new(
            "boss",
            "Boss",
            format!("{} - HP: {}/{}", boss.kind.name(), boss.health, boss.max_health),
        ));
    }

    items
}

/// Overlay for non-interactive phases, None during play
pub fn overlay(state: &GameState) -> Option<Overlay> {
    match state.phase {
        GamePhase::Intro { ticks } => {
            let card = if ticks < state.tuning.intro_card_ticks { 0 } else { 1 };
            let (studio, verb) = INTRO_CARDS[card];
            Some(Overlay {
                title: studio.to_string(),
                subtitle: verb.to_string(),
                prompt: Some("Press SPACE to skip".to_string()),
            })
        }
        GamePhase::Playing | GamePhase::BossFight => None,
        GamePhase::LevelComplete { .. } => Some(Overlay {
            title: "Course Clear!".to_string(),
            subtitle: format!("Score: {}", state.player.score),
            prompt: None,
        }),
        GamePhase::BossDefeated { .. } => {
            let name = state
                .world
                .boss
                .as_ref()
                .map(|b| b.kind.name())
                .unwrap_or("Boss");
            Some(Overlay {
                title: format!("{} defeated!", name),
                subtitle: format!("World {} cleared", state.world_number),
                prompt: None,
            })
        }
        GamePhase::GameOver => Some(Overlay {
            title: "GAME OVER".to_string(),
            subtitle: format!("Final Score: {}", state.player.score),
            prompt: Some(RESTART_PROMPT.to_string()),
        }),
        GamePhase::Victory => Some(Overlay {
            title: "VICTORY!".to_string(),
            subtitle: format!("Final Score: {}", state.player.score),
            prompt: Some(RESTART_PROMPT.to_string()),
        }),
    }
}
