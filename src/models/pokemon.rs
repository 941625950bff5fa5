//! Pokemon DTOs
//!
//! Decodes `GET pokemon/{name or id}/`.

use serde::Deserialize;

use super::NamedResource;

/// The subset of a pokemon record the client shows and keeps.
#[derive(Debug, Clone, Deserialize)]
pub struct Pokemon {
    pub id: u32,
    pub name: String,
    /// Null for some alternate forms
    #[serde(default)]
    pub base_experience: Option<u32>,
    /// Decimetres
    #[serde(default)]
    pub height: u32,
    /// Hectograms
    #[serde(default)]
    pub weight: u32,
    #[serde(default)]
    pub stats: Vec<PokemonStat>,
    #[serde(default)]
    pub types: Vec<PokemonType>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PokemonStat {
    pub base_stat: u32,
    #[serde(default)]
    pub effort: u32,
    pub stat: NamedResource,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PokemonType {
    pub slot: u32,
    #[serde(rename = "type")]
    pub kind: NamedResource,
}
