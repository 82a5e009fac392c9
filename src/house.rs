//! Store and house decoration
//!
//! Coins earned from deliveries buy decorations. Bought items sit in the
//! inventory until placed inside the player's house, and can be picked up
//! again. Items are stored by kind only; name, price and footprint come from
//! the catalog, so nothing but plain data is ever serialized.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, PersistError, Profile};
use crate::sim::AxisBox;

/// Interior of the house screen, in its own coordinates
pub const HOUSE_INTERIOR: AxisBox = AxisBox::new(0.0, 0.0, 800.0, 500.0);

/// Decoration kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Rug,
    Plant,
    Lamp,
    Chair,
    Table,
    Bookshelf,
    Sofa,
    Aquarium,
}

/// Catalog entry for one kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemSpec {
    pub name: &'static str,
    pub price: u64,
    pub width: f32,
    pub height: f32,
}

impl ItemKind {
    pub const ALL: [ItemKind; 8] = [
        ItemKind::Rug,
        ItemKind::Plant,
        ItemKind::Lamp,
        ItemKind::Chair,
        ItemKind::Table,
        ItemKind::Bookshelf,
        ItemKind::Sofa,
        ItemKind::Aquarium,
    ];

    pub fn spec(&self) -> ItemSpec {
        let (name, price, width, height) = match self {
            ItemKind::Rug => ("Rug", 5, 160.0, 100.0),
            ItemKind::Plant => ("Potted Plant", 3, 40.0, 40.0),
            ItemKind::Lamp => ("Floor Lamp", 4, 30.0, 30.0),
            ItemKind::Chair => ("Armchair", 8, 60.0, 60.0),
            ItemKind::Table => ("Coffee Table", 10, 100.0, 60.0),
            ItemKind::Bookshelf => ("Bookshelf", 15, 120.0, 40.0),
            ItemKind::Sofa => ("Sofa", 20, 180.0, 70.0),
            ItemKind::Aquarium => ("Aquarium", 35, 110.0, 50.0),
        };
        ItemSpec {
            name,
            price,
            width,
            height,
        }
    }
}

/// An item standing in the house
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacedItem {
    pub kind: ItemKind,
    /// Top-left corner
    pub x: f32,
    pub y: f32,
}

impl PlacedItem {
    pub fn bounds(&self) -> AxisBox {
        let spec = self.kind.spec();
        AxisBox::from_size(self.x, self.y, spec.width, spec.height)
    }
}

/// Store and placement failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{name} costs {price} coins, only {coins} available")]
    InsufficientCoins {
        name: &'static str,
        price: u64,
        coins: u64,
    },

    #[error("no {0:?} in the inventory")]
    NotOwned(ItemKind),

    #[error("{0:?} would overlap another item")]
    Overlaps(ItemKind),

    #[error("{0:?} doesn't fit inside the house")]
    OutOfBounds(ItemKind),

    #[error("nothing placed at ({x}, {y})")]
    NothingThere { x: f32, y: f32 },

    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Spend coins on an item and add it to the inventory
pub fn buy<S: KeyValueStore + ?Sized>(
    profile: &mut Profile,
    store: &mut S,
    kind: ItemKind,
) -> Result<(), StoreError> {
    let spec = kind.spec();
    if profile.coins < spec.price {
        return Err(StoreError::InsufficientCoins {
            name: spec.name,
            price: spec.price,
            coins: profile.coins,
        });
    }
    profile.coins -= spec.price;
    profile.inventory.push(kind);
    profile.save_coins(store)?;
    profile.save_inventory(store)?;
    log::info!("Bought {} for {} coins ({} left)", spec.name, spec.price, profile.coins);
    Ok(())
}

/// Move an owned item from the inventory into the house with its top-left
/// corner at `(x, y)`
pub fn place<S: KeyValueStore + ?Sized>(
    profile: &mut Profile,
    store: &mut S,
    kind: ItemKind,
    x: f32,
    y: f32,
) -> Result<(), StoreError> {
    let slot = profile
        .inventory
        .iter()
        .position(|&k| k == kind)
        .ok_or(StoreError::NotOwned(kind))?;

    let item = PlacedItem { kind, x, y };
    let bounds = item.bounds();
    if !bounds.inside(&HOUSE_INTERIOR) {
        return Err(StoreError::OutOfBounds(kind));
    }
    if profile.house_items.iter().any(|p| p.bounds().overlaps(&bounds)) {
        return Err(StoreError::Overlaps(kind));
    }

    profile.inventory.remove(slot);
    profile.house_items.push(item);
    profile.save_inventory(store)?;
    profile.save_house_items(store)?;
    Ok(())
}

/// Return the top-most item under `(x, y)` to the inventory
pub fn pick_up<S: KeyValueStore + ?Sized>(
    profile: &mut Profile,
    store: &mut S,
    x: f32,
    y: f32,
) -> Result<ItemKind, StoreError> {
    let index = profile
        .house_items
        .iter()
        .rposition(|item| {
            let b = item.bounds();
            (b.x1..=b.x2).contains(&x) && (b.y1..=b.y2).contains(&y)
        })
        .ok_or(StoreError::NothingThere { x, y })?;

    let item = profile.house_items.remove(index);
    profile.inventory.push(item.kind);
    profile.save_inventory(store)?;
    profile.save_house_items(store)?;
    Ok(item.kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{KEY_COINS, KEY_HOUSE_ITEMS, KEY_INVENTORY};
    use crate::persistence::{MemoryStore, load_json};

    fn rich_profile(coins: u64) -> (Profile, MemoryStore) {
        let store = MemoryStore::new();
        let mut profile = Profile::load(&store);
        profile.coins = coins;
        (profile, store)
    }

    #[test]
    fn test_buy_spends_and_writes_through() {
        let (mut profile, mut store) = rich_profile(25);
        buy(&mut profile, &mut store, ItemKind::Sofa).unwrap();
        assert_eq!(profile.coins, 5);
        assert_eq!(profile.inventory, vec![ItemKind::Sofa]);

        assert_eq!(load_json::<u64, _>(&store, KEY_COINS).unwrap(), Some(5));
        let saved: Vec<ItemKind> = load_json(&store, KEY_INVENTORY).unwrap().unwrap();
        assert_eq!(saved, vec![ItemKind::Sofa]);
    }

    #[test]
    fn test_buy_rejects_when_short() {
        let (mut profile, mut store) = rich_profile(2);
        let err = buy(&mut profile, &mut store, ItemKind::Plant).unwrap_err();
        assert!(matches!(err, StoreError::InsufficientCoins { price: 3, coins: 2, .. }));
        assert_eq!(profile.coins, 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_place_and_pick_up() {
        let (mut profile, mut store) = rich_profile(100);
        buy(&mut profile, &mut store, ItemKind::Table).unwrap();
        buy(&mut profile, &mut store, ItemKind::Chair).unwrap();

        place(&mut profile, &mut store, ItemKind::Table, 100.0, 100.0).unwrap();
        assert_eq!(profile.inventory, vec![ItemKind::Chair]);

        // Chair dropped onto the table is refused and stays in the inventory
        let err = place(&mut profile, &mut store, ItemKind::Chair, 150.0, 120.0).unwrap_err();
        assert!(matches!(err, StoreError::Overlaps(ItemKind::Chair)));
        assert_eq!(profile.inventory, vec![ItemKind::Chair]);

        place(&mut profile, &mut store, ItemKind::Chair, 300.0, 100.0).unwrap();
        let saved: Vec<PlacedItem> = load_json(&store, KEY_HOUSE_ITEMS).unwrap().unwrap();
        assert_eq!(saved.len(), 2);

        assert_eq!(pick_up(&mut profile, &mut store, 120.0, 130.0).unwrap(), ItemKind::Table);
        assert_eq!(profile.house_items.len(), 1);
        assert_eq!(profile.inventory, vec![ItemKind::Table]);
        assert!(matches!(
            pick_up(&mut profile, &mut store, 700.0, 450.0),
            Err(StoreError::NothingThere { .. })
        ));
    }

    #[test]
    fn test_place_requires_ownership_and_room() {
        let (mut profile, mut store) = rich_profile(100);
        assert!(matches!(
            place(&mut profile, &mut store, ItemKind::Lamp, 0.0, 0.0),
            Err(StoreError::NotOwned(ItemKind::Lamp))
        ));

        buy(&mut profile, &mut store, ItemKind::Sofa).unwrap();
        assert!(matches!(
            place(&mut profile, &mut store, ItemKind::Sofa, 700.0, 0.0),
            Err(StoreError::OutOfBounds(ItemKind::Sofa))
        ));
    }

    #[test]
    fn test_catalog_is_complete() {
        for kind in ItemKind::ALL {
            let spec = kind.spec();
            assert!(spec.price > 0);
            assert!(spec.width > 0.0 && spec.height > 0.0);
            assert!(spec.width <= HOUSE_INTERIOR.width());
        }
    }
}
