//! Domain DTOs for the character catalog.
//!
//! # Design
//! These types mirror the upstream JSON schema but are defined independently
//! from the mock-server crate; integration tests catch any drift between the
//! two. Unknown fields are ignored on decode so new upstream attributes never
//! break existing callers.

use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

/// A named place (origin or last known location) with an optional link to
/// its detail resource. An empty `url` means "no detail available".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Place {
    pub name: String,
    pub url: String,
}

impl Place {
    /// Stand-in for a reference the upstream payload omitted.
    pub fn unknown() -> Self {
        Self {
            name: "unknown".to_string(),
            url: String::new(),
        }
    }
}

impl Default for Place {
    fn default() -> Self {
        Self::unknown()
    }
}

/// A single character returned by the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Character {
    pub id: u64,
    pub name: String,
    pub status: String,
    pub species: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub gender: String,
    #[serde(default, deserialize_with = "place_or_unknown")]
    pub origin: Place,
    #[serde(default, deserialize_with = "place_or_unknown")]
    pub location: Place,
    pub image: String,
    pub episode: Vec<String>,
    pub url: String,
    pub created: String,
}

impl Character {
    /// Check the invariants serde cannot express: a positive id and a
    /// non-empty name.
    pub fn validate(&self) -> Result<(), String> {
        if self.id == 0 {
            return Err("character id must be positive".to_string());
        }
        if self.name.is_empty() {
            return Err(format!("character {} has an empty name", self.id));
        }
        Ok(())
    }
}

/// Accept an absent or `null` place as [`Place::unknown`].
fn place_or_unknown<'de, D>(deserializer: D) -> Result<Place, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Place>::deserialize(deserializer)?.unwrap_or_default())
}

/// Pagination metadata from the listing endpoint's `info` block.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PageInfo {
    /// Total number of characters in the catalog.
    pub count: u64,
    /// Total number of pages.
    pub pages: u64,
    pub next: Option<String>,
    pub prev: Option<String>,
}

impl PageInfo {
    /// Page index referenced by the `next` link, if there is one.
    pub fn next_page(&self) -> Option<i64> {
        self.next.as_deref().and_then(page_param)
    }

    /// Page index referenced by the `prev` link, if there is one.
    pub fn prev_page(&self) -> Option<i64> {
        self.prev.as_deref().and_then(page_param)
    }
}

fn page_param(link: &str) -> Option<i64> {
    Url::parse(link)
        .ok()?
        .query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse().ok())
}

/// One page of the character listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageEnvelope {
    #[serde(default)]
    pub info: PageInfo,
    pub results: Vec<Character>,
}

impl PageEnvelope {
    /// The page returned when the listing runs past its end.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
