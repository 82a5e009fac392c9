//! Sound effects
//!
//! The simulation only decides *which* sound plays; the frontend owns
//! playback. Mute is an edge-triggered toggle kept here so every frontend
//! gets the same behaviour.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of recorded delivery jingles
pub const DELIVERY_SOUNDS: u8 = 3;
/// Number of recorded barks
pub const BARK_SOUNDS: u8 = 4;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Package handed over (variant index)
    Delivery(u8),
    /// Dog bit the player (variant index)
    Bark(u8),
    /// Powerup picked up
    PowerupCollect,
    /// Health ran out
    GameOver,
}

impl SoundEffect {
    pub fn random_delivery<R: Rng>(rng: &mut R) -> Self {
        SoundEffect::Delivery(rng.random_range(0..DELIVERY_SOUNDS))
    }

    pub fn random_bark<R: Rng>(rng: &mut R) -> Self {
        SoundEffect::Bark(rng.random_range(0..BARK_SOUNDS))
    }

    /// Asset name the frontend loads for this effect
    pub fn asset(&self) -> String {
        match self {
            SoundEffect::Delivery(i) => format!("delivery{}", i + 1),
            SoundEffect::Bark(i) => format!("bark{}", i + 1),
            SoundEffect::PowerupCollect => "powerup".to_string(),
            SoundEffect::GameOver => "gameover".to_string(),
        }
    }
}

/// Mute state and volume for the frontend's player
#[derive(Debug, Clone)]
pub struct AudioManager {
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(0.8, 1.0, false)
    }
}

impl AudioManager {
    pub fn new(master_volume: f32, sfx_volume: f32, muted: bool) -> Self {
        Self {
            master_volume: master_volume.clamp(0.0, 1.0),
            sfx_volume: sfx_volume.clamp(0.0, 1.0),
            muted,
        }
    }

    /// Flip mute; returns the new state
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        log::info!("Audio {}", if self.muted { "muted" } else { "unmuted" });
        self.muted
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Effective gain for an effect, or `None` when nothing should play
    pub fn gain(&self) -> Option<f32> {
        if self.muted {
            return None;
        }
        let gain = self.master_volume * self.sfx_volume;
        (gain > 0.0).then_some(gain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_random_variants_in_range() {
        let mut rng = Pcg32::seed_from_u64(5);
        for _ in 0..100 {
            match SoundEffect::random_bark(&mut rng) {
                SoundEffect::Bark(i) => assert!(i < BARK_SOUNDS),
                other => panic!("unexpected {other:?}"),
            }
            match SoundEffect::random_delivery(&mut rng) {
                SoundEffect::Delivery(i) => assert!(i < DELIVERY_SOUNDS),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_mute_silences() {
        let mut audio = AudioManager::default();
        assert!(audio.gain().is_some());
        assert!(audio.toggle_mute());
        assert_eq!(audio.gain(), None);
        assert!(!audio.toggle_mute());
    }

    #[test]
    fn test_asset_names() {
        assert_eq!(SoundEffect::Bark(0).asset(), "bark1");
        assert_eq!(SoundEffect::Delivery(2).asset(), "delivery3");
    }
}
