//! Simulation faults
//!
//! The simulation itself is total; the only thing that can go wrong is a
//! configuration that leaves no room for what it asks to place.

use thiserror::Error;

/// What a placement loop was trying to place
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementCategory {
    Building,
    Enemy,
    Powerup,
    Flower,
}

impl std::fmt::Display for PlacementCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PlacementCategory::Building => "building",
            PlacementCategory::Enemy => "enemy",
            PlacementCategory::Powerup => "powerup",
            PlacementCategory::Flower => "flower",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// Rejection sampling hit its attempt cap: counts or canvas size leave no room
    #[error("could not place {category} after {attempts} attempts; reduce counts or enlarge the canvas")]
    PlacementExhausted {
        category: PlacementCategory,
        attempts: u32,
    },
}
