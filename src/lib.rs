//! Town Courier - deliver parcels around a randomly built town, dodge the dogs
//!
//! Core modules:
//! - `sim`: Deterministic simulation (world generation, movement, AI, powerups)
//! - `game`: Session driver that routes simulation events to the sinks
//! - `platform`: Input mapping and the browser bridge
//! - `persistence`: Key-value storage and the player profile
//! - `house`: Decoration store, inventory and house layout
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod game;
pub mod highscores;
pub mod house;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use game::Session;
pub use settings::Settings;
pub use sim::{AxisBox, overlaps, point_on_circle};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Storage keys for the persisted profile
    pub const KEY_HIGH_SCORE: &str = "highScore";
    pub const KEY_COINS: &str = "coins";
    pub const KEY_INVENTORY: &str = "inventory";
    pub const KEY_HOUSE_ITEMS: &str = "houseItems";
    pub const KEY_UNSUBMITTED: &str = "unsubmittedHighscores";
    pub const KEY_SETTINGS: &str = "settings";

    /// Coins earned per delivery, regardless of points
    pub const COINS_PER_DELIVERY: u64 = 1;

    /// Seed used by the native runner when none is given
    pub const DEFAULT_SEED: u64 = 0x00C0_FFEE;
}
