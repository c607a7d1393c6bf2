//! Player preferences
//!
//! Presentation only; nothing here changes the simulation. Persisted as JSON in
//! LocalStorage next to the leaderboard.

use serde::{Deserialize, Serialize};

use crate::storage;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Show FPS counter in the HUD
    pub show_fps: bool,
    /// Reduced motion (no coin bobbing, no invulnerability blink)
    pub reduced_motion: bool,
    /// Go straight to 1-1 without the intro cards
    pub skip_intro: bool,
}

impl Settings {
    /// Whether cosmetic animation (bobbing, blinking) should play
    pub fn animations_enabled(&self) -> bool {
        !self.reduced_motion
    }

    /// Parse settings, tolerating missing fields
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    const STORAGE_KEY: &'static str = "pocket_platformer_settings";

    /// Stored preferences, or defaults when missing or unreadable
    pub fn load() -> Self {
        match storage::read(Self::STORAGE_KEY).map(|json| Self::from_json(&json)) {
            Some(Ok(settings)) => {
                log::info!("Loaded settings: {:?}", settings);
                settings
            }
            Some(Err(e)) => {
                log::warn!("Ignoring stored settings: {}", e);
                Self::default()
            }
            None => Self::default(),
        }
    }

    pub fn save(&self) {
        if let Ok(json) = serde_json::to_string(self)
            && storage::write(Self::STORAGE_KEY, &json)
        {
            log::info!("Settings saved");
        }
    }
}
