//! Location DTOs
//!
//! Decodes the `location-area` list and detail endpoints.

use serde::Deserialize;

/// A `{ name, url }` reference to another API resource.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NamedResource {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// One page of `GET location-area/?offset=..&limit=..`
///
/// `next` and `previous` are full URLs and are null at either end.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationPage {
    /// Total number of location areas
    #[serde(default)]
    pub count: u32,
    /// URL of the following page
    pub next: Option<String>,
    /// URL of the preceding page
    pub previous: Option<String>,
    /// Areas on this page
    #[serde(default)]
    pub results: Vec<NamedResource>,
}

/// Detail for a single area, `GET location-area/{name}/`
#[derive(Debug, Clone, Deserialize)]
pub struct LocationArea {
    pub name: String,
    #[serde(default)]
    pub pokemon_encounters: Vec<PokemonEncounter>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PokemonEncounter {
    pub pokemon: NamedResource,
}
