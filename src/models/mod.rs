//! Models Module
//!
//! Serde types for the parts of the PokeAPI responses the commands read.
//! Fields the commands never look at are ignored during decoding.

mod location;
mod pokemon;

pub use location::{LocationArea, LocationPage, NamedResource, PokemonEncounter};
pub use pokemon::{Pokemon, PokemonStat, PokemonType};
