//! Pokedex Module
//!
//! The collection of caught pokemon and the rule that decides a catch.

use std::collections::HashMap;
use std::sync::Arc;

use crate::models::Pokemon;

/// Base experience at or above which a pokemon is hardest to catch.
pub const MAX_BASE_EXPERIENCE: u32 = 255;

// == Catch Rule ==
/// Chance that a throw fails for a pokemon with this base experience.
///
/// Returns `min(base_experience, 255) / 256`, always below 1.0.
pub fn catch_rate(base_experience: Option<u32>) -> f32 {
    let base = base_experience.unwrap_or(0).min(MAX_BASE_EXPERIENCE);
    base as f32 / 256.0
}

/// Whether a throw with `roll` in `[0, 1)` catches the pokemon.
pub fn is_caught(base_experience: Option<u32>, roll: f32) -> bool {
    roll > catch_rate(base_experience)
}

// == Pokedex ==
/// Caught pokemon, looked up by name or id and listed in catch order.
#[derive(Debug, Default)]
pub struct Pokedex {
    by_key: HashMap<String, Arc<Pokemon>>,
    caught: Vec<Arc<Pokemon>>,
}

impl Pokedex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a caught pokemon under its name and its id.
    ///
    /// Catching the same pokemon again replaces the stored record in place.
    pub fn insert(&mut self, pokemon: Pokemon) {
        let pokemon = Arc::new(pokemon);
        let name = pokemon.name.to_lowercase();

        if let Some(slot) = self.caught.iter_mut().find(|p| p.id == pokemon.id) {
            *slot = pokemon.clone();
        } else {
            self.caught.push(pokemon.clone());
        }

        self.by_key.insert(pokemon.id.to_string(), pokemon.clone());
        self.by_key.insert(name, pokemon);
    }

    /// Looks up a caught pokemon by name (case-insensitive) or decimal id.
    pub fn get(&self, name_or_id: &str) -> Option<&Pokemon> {
        self.by_key
            .get(&name_or_id.trim().to_lowercase())
            .map(|p| p.as_ref())
    }

    pub fn contains(&self, name_or_id: &str) -> bool {
        self.get(name_or_id).is_some()
    }

    /// Caught pokemon in the order they were first caught.
    pub fn iter(&self) -> impl Iterator<Item = &Pokemon> {
        self.caught.iter().map(|p| p.as_ref())
    }

    pub fn len(&self) -> usize {
        self.caught.len()
    }

    pub fn is_empty(&self) -> bool {
        self.caught.is_empty()
    }
}
