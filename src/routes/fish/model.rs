use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Species identifier taken verbatim from the request path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpeciesKey(String);

impl SpeciesKey {
    /// Returns `None` for an empty species.
    pub fn parse(species: impl Into<String>) -> Option<Self> {
        let species = species.into();
        (!species.is_empty()).then_some(Self(species))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpeciesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body of a successful `/fish/{species}` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesResponse {
    pub from_cache: bool,
    pub data: Value,
}

impl SpeciesResponse {
    pub fn cached(data: Value) -> Self {
        Self {
            from_cache: true,
            data,
        }
    }

    pub fn fresh(data: Value) -> Self {
        Self {
            from_cache: false,
            data,
        }
    }
}
