//! In-process stand-in for the Rick and Morty character API.
//!
//! Serves a fixed, read-only catalog with the upstream conventions the
//! client depends on: 20 results per page, `info` links built from the
//! request host, a 404 past the last page, and `origin`/`location` omitted
//! from characters that have none.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub const PAGE_SIZE: usize = 20;

const UPSTREAM: &str = "https://rickandmortyapi.com/api";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Place {
    pub name: String,
    pub url: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Character {
    pub id: u64,
    pub name: String,
    pub status: String,
    pub species: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub gender: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<Place>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Place>,
    pub image: String,
    pub episode: Vec<String>,
    pub url: String,
    pub created: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Info {
    pub count: usize,
    pub pages: usize,
    pub next: Option<String>,
    pub prev: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Page {
    pub info: Info,
    pub results: Vec<Character>,
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
}

pub type Catalog = Arc<Vec<Character>>;

fn character(
    id: u64,
    name: &str,
    status: &str,
    gender: &str,
    origin: Option<(&str, u64)>,
    location: Option<(&str, u64)>,
    episodes: &[u64],
) -> Character {
    let place = |(name, loc_id): (&str, u64)| Place {
        name: name.to_string(),
        url: if loc_id == 0 {
            String::new()
        } else {
            format!("{UPSTREAM}/location/{loc_id}")
        },
    };
    Character {
        id,
        name: name.to_string(),
        status: status.to_string(),
        species: "Human".to_string(),
        kind: String::new(),
        gender: gender.to_string(),
        origin: origin.map(place),
        location: location.map(place),
        image: format!("{UPSTREAM}/character/avatar/{id}.jpeg"),
        episode: episodes
            .iter()
            .map(|e| format!("{UPSTREAM}/episode/{e}"))
            .collect(),
        url: format!("{UPSTREAM}/character/{id}"),
        created: "2017-11-04T18:48:46.250Z".to_string(),
    }
}

/// The five Smiths. Jerry has no recorded location, like a handful of
/// upstream entries.
pub fn sample_characters() -> Vec<Character> {
    vec![
        character(1, "Rick Sanchez", "Alive", "Male", Some(("Earth (C-137)", 1)), Some(("Citadel of Ricks", 3)), &[1, 2, 3]),
        character(2, "Morty Smith", "Alive", "Male", Some(("unknown", 0)), Some(("Citadel of Ricks", 3)), &[1, 2, 3]),
        character(3, "Summer Smith", "Alive", "Female", Some(("Earth (Replacement Dimension)", 20)), Some(("Earth (Replacement Dimension)", 20)), &[6, 7]),
        character(4, "Beth Smith", "Alive", "Female", Some(("Earth (Replacement Dimension)", 20)), Some(("Earth (Replacement Dimension)", 20)), &[6, 7]),
        character(5, "Jerry Smith", "Alive", "Male", Some(("Earth (Replacement Dimension)", 20)), None, &[6, 7]),
    ]
}

/// `count` filler characters with ids `1..=count`, for pagination tests.
pub fn generated_characters(count: u64) -> Vec<Character> {
    (1..=count)
        .map(|id| character(id, &format!("Character {id}"), "unknown", "unknown", Some(("unknown", 0)), Some(("unknown", 0)), &[1]))
        .collect()
}

pub fn app() -> Router {
    app_with(sample_characters())
}

pub fn app_with(characters: Vec<Character>) -> Router {
    let catalog: Catalog = Arc::new(characters);
    Router::new()
        .route("/character", get(list_characters))
        .route("/character/{id}", get(get_character))
        .layer(TraceLayer::new_for_http())
        .with_state(catalog)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, app()).await
}

pub async fn serve(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router).await
}

fn nothing_here(message: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

fn page_link(headers: &HeaderMap, page: usize) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{host}/character?page={page}")
}

async fn list_characters(
    State(catalog): State<Catalog>,
    Query(query): Query<PageQuery>,
    headers: HeaderMap,
) -> Response {
    let page = query.page.unwrap_or(1).max(1);
    let pages = catalog.len().div_ceil(PAGE_SIZE);
    if page > pages {
        tracing::debug!(page, pages, "page past end of catalog");
        return nothing_here("There is nothing here");
    }

    let start = (page - 1) * PAGE_SIZE;
    let results = catalog.iter().skip(start).take(PAGE_SIZE).cloned().collect();
    let info = Info {
        count: catalog.len(),
        pages,
        next: (page < pages).then(|| page_link(&headers, page + 1)),
        prev: (page > 1).then(|| page_link(&headers, page - 1)),
    };
    Json(Page { info, results }).into_response()
}

async fn get_character(State(catalog): State<Catalog>, Path(id): Path<u64>) -> Response {
    match catalog.iter().find(|c| c.id == id) {
        Some(c) => Json(c.clone()).into_response(),
        None => nothing_here("Character not found"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn character_serializes_type_key() {
        let json = serde_json::to_value(&sample_characters()[0]).unwrap();
        assert_eq!(json["type"], "");
        assert_eq!(json["name"], "Rick Sanchez");
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn missing_location_is_omitted_from_json() {
        let jerry = &sample_characters()[4];
        let json = serde_json::to_value(jerry).unwrap();
        assert!(json.get("location").is_none());
        assert_eq!(json["origin"]["name"], "Earth (Replacement Dimension)");
    }

    #[test]
    fn unknown_origin_has_empty_url() {
        let morty = &sample_characters()[1];
        let origin = morty.origin.as_ref().unwrap();
        assert_eq!(origin.name, "unknown");
        assert_eq!(origin.url, "");
    }

    #[test]
    fn generated_ids_are_sequential() {
        let characters = generated_characters(45);
        assert_eq!(characters.len(), 45);
        assert_eq!(characters[0].id, 1);
        assert_eq!(characters[44].id, 45);
    }
}
