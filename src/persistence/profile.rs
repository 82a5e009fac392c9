//! Player profile
//!
//! Everything that outlives a play session. Each field lives under its own
//! key and is written back as soon as it changes.

use serde::de::DeserializeOwned;

use super::{KeyValueStore, PersistError, load_json, save_json};
use crate::consts::{KEY_COINS, KEY_HIGH_SCORE, KEY_HOUSE_ITEMS, KEY_INVENTORY, KEY_UNSUBMITTED};
use crate::highscores::UnsubmittedScores;
use crate::house::{ItemKind, PlacedItem};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub high_score: u64,
    pub coins: u64,
    pub inventory: Vec<ItemKind>,
    pub house_items: Vec<PlacedItem>,
    pub unsubmitted: UnsubmittedScores,
}

/// Load one key, falling back to the default when missing or unreadable
fn load_or_default<T, S>(store: &S, key: &str) -> T
where
    T: DeserializeOwned + Default,
    S: KeyValueStore + ?Sized,
{
    match load_json(store, key) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(e) => {
            log::warn!("Ignoring stored '{}': {}", key, e);
            T::default()
        }
    }
}

impl Profile {
    /// Read the profile; absent or corrupt keys start from their defaults
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let profile = Self {
            high_score: load_or_default(store, KEY_HIGH_SCORE),
            coins: load_or_default(store, KEY_COINS),
            inventory: load_or_default(store, KEY_INVENTORY),
            house_items: load_or_default(store, KEY_HOUSE_ITEMS),
            unsubmitted: load_or_default(store, KEY_UNSUBMITTED),
        };
        log::info!(
            "Profile loaded: high score {}, {} coins, {} queued scores",
            profile.high_score,
            profile.coins,
            profile.unsubmitted.len()
        );
        profile
    }

    pub fn save_high_score<S: KeyValueStore + ?Sized>(
        &self,
        store: &mut S,
    ) -> Result<(), PersistError> {
        save_json(store, KEY_HIGH_SCORE, &self.high_score)
    }

    pub fn save_coins<S: KeyValueStore + ?Sized>(
        &self,
        store: &mut S,
    ) -> Result<(), PersistError> {
        save_json(store, KEY_COINS, &self.coins)
    }

    pub fn save_inventory<S: KeyValueStore + ?Sized>(
        &self,
        store: &mut S,
    ) -> Result<(), PersistError> {
        save_json(store, KEY_INVENTORY, &self.inventory)
    }

    pub fn save_house_items<S: KeyValueStore + ?Sized>(
        &self,
        store: &mut S,
    ) -> Result<(), PersistError> {
        save_json(store, KEY_HOUSE_ITEMS, &self.house_items)
    }

    pub fn save_unsubmitted<S: KeyValueStore + ?Sized>(
        &self,
        store: &mut S,
    ) -> Result<(), PersistError> {
        save_json(store, KEY_UNSUBMITTED, &self.unsubmitted)
    }

    /// Credit a delivery: coins always grow, the high score only when beaten
    pub fn record_delivery<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
        coins: u64,
        score: u64,
    ) -> Result<(), PersistError> {
        self.coins += coins;
        self.save_coins(store)?;
        if score > self.high_score {
            self.high_score = score;
            self.save_high_score(store)?;
        }
        Ok(())
    }

    /// Queue a finished session's score. Returns the key it was stored under.
    pub fn record_game_over<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
        timestamp_ms: u64,
        score: u64,
    ) -> Result<u64, PersistError> {
        let key = self.unsubmitted.record(timestamp_ms, score);
        self.save_unsubmitted(store)?;
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_empty_store_gives_defaults() {
        let store = MemoryStore::new();
        assert_eq!(Profile::load(&store), Profile::default());
    }

    #[test]
    fn test_corrupt_key_falls_back() {
        let mut store = MemoryStore::new();
        store.set(KEY_COINS, "{broken").unwrap();
        store.set(KEY_HIGH_SCORE, "17").unwrap();
        let profile = Profile::load(&store);
        assert_eq!(profile.coins, 0);
        assert_eq!(profile.high_score, 17);
    }

    #[test]
    fn test_delivery_writes_through() {
        let mut store = MemoryStore::new();
        let mut profile = Profile::load(&store);
        profile.record_delivery(&mut store, 1, 2).unwrap();
        profile.record_delivery(&mut store, 1, 3).unwrap();

        let reloaded = Profile::load(&store);
        assert_eq!(reloaded.coins, 2);
        assert_eq!(reloaded.high_score, 3);
    }

    #[test]
    fn test_high_score_is_monotonic() {
        let mut store = MemoryStore::new();
        let mut profile = Profile {
            high_score: 10,
            ..Default::default()
        };
        profile.record_delivery(&mut store, 1, 4).unwrap();
        assert_eq!(profile.high_score, 10);
        assert_eq!(store.get(KEY_HIGH_SCORE).unwrap(), None);
    }

    #[test]
    fn test_game_over_queue_survives_reload() {
        let mut store = MemoryStore::new();
        let mut profile = Profile::load(&store);
        let key = profile.record_game_over(&mut store, 5_000, 8).unwrap();
        assert_eq!(key, 5_000);

        let reloaded = Profile::load(&store);
        assert_eq!(reloaded.unsubmitted.get(5_000), Some(8));
    }
}
