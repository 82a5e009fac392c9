//! Game settings and preferences
//!
//! Persisted separately from the profile under their own key.

use serde::{Deserialize, Serialize};

use crate::audio::AudioManager;
use crate::consts::KEY_SETTINGS;
use crate::persistence::{KeyValueStore, PersistError, load_json, save_json};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Sound effects off
    pub muted: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Pause when the window loses focus
    pub pause_on_blur: bool,

    // === HUD ===
    /// Show on-screen touch regions
    pub show_touch_controls: bool,

    // === Accessibility ===
    /// Reduced motion (skip door swing and invincibility flashing)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            muted: false,
            master_volume: 0.8,
            sfx_volume: 1.0,
            pause_on_blur: true,
            show_touch_controls: false,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Load settings, using defaults when absent or unreadable
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        match load_json(store, KEY_SETTINGS) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings");
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Settings unreadable, using defaults: {}", e);
                Self::default()
            }
        }
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), PersistError> {
        save_json(store, KEY_SETTINGS, self)?;
        log::debug!("Settings saved");
        Ok(())
    }

    /// Audio state these settings describe
    pub fn audio(&self) -> AudioManager {
        AudioManager::new(self.master_volume, self.sfx_volume, self.muted)
    }

    /// Effective invincibility flashing (respects reduced_motion)
    pub fn effective_flashing(&self) -> bool {
        !self.reduced_motion
    }
}
