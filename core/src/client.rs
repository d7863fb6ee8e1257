//! Stateless HTTP request builder and response parser for the catalog API.
//!
//! # Design
//! `CatalogClient` holds only a `base_url` and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! validates its arguments and produces an `HttpRequest`, and a `parse_*`
//! method that consumes an `HttpResponse`. Whoever sits between the two
//! (a host platform or a `Fetcher`) performs the actual I/O.

use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::CatalogError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Character, PageEnvelope};

/// Synchronous, stateless client for the character catalog.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the listing request. `None` and `Some(1)` both address the
    /// first page and omit the query parameter.
    pub fn build_fetch_page(&self, page: Option<i64>) -> Result<HttpRequest, CatalogError> {
        let page = page.unwrap_or(1);
        if page < 1 {
            return Err(CatalogError::InvalidArgument(format!(
                "page index must be >= 1, got {page}"
            )));
        }
        let url = if page == 1 {
            format!("{}/character", self.base_url)
        } else {
            format!("{}/character?page={page}", self.base_url)
        };
        tracing::debug!(%url, page, "built page request");
        Ok(get(url))
    }

    pub fn build_fetch_by_id(&self, id: i64) -> Result<HttpRequest, CatalogError> {
        let id = positive_id(id)?;
        let url = format!("{}/character/{id}", self.base_url);
        tracing::debug!(%url, id, "built character request");
        Ok(get(url))
    }

    /// Parse a listing response. A 404 means the listing ran past its last
    /// page and yields an empty envelope rather than an error.
    pub fn parse_fetch_page(&self, response: HttpResponse) -> Result<PageEnvelope, CatalogError> {
        if response.status == 404 {
            tracing::debug!("listing returned 404, treating as end of catalog");
            return Ok(PageEnvelope::empty());
        }
        check_status(&response)?;
        let page: PageEnvelope = decode(&response.body)?;
        for character in &page.results {
            character.validate().map_err(CatalogError::DecodeError)?;
        }
        tracing::debug!(
            results = page.results.len(),
            pages = page.info.pages,
            "parsed page response"
        );
        Ok(page)
    }

    /// Parse a detail response for the character `id` that was requested.
    pub fn parse_fetch_by_id(&self, id: i64, response: HttpResponse) -> Result<Character, CatalogError> {
        let id = positive_id(id)?;
        if response.status == 404 {
            return Err(CatalogError::NotFound(id));
        }
        check_status(&response)?;
        let character: Character = decode(&response.body)?;
        character.validate().map_err(CatalogError::DecodeError)?;
        if character.id != id {
            tracing::warn!(requested = id, returned = character.id, "character id mismatch");
        }
        tracing::debug!(id = character.id, name = %character.name, "parsed character response");
        Ok(character)
    }
}

fn get(url: String) -> HttpRequest {
    HttpRequest {
        method: HttpMethod::Get,
        url,
        headers: vec![("accept".to_string(), "application/json".to_string())],
    }
}

fn positive_id(id: i64) -> Result<u64, CatalogError> {
    u64::try_from(id)
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| CatalogError::InvalidArgument(format!("character id must be >= 1, got {id}")))
}

/// Map non-success status codes to `HttpError`. 404 is handled by callers
/// because its meaning differs per operation.
fn check_status(response: &HttpResponse) -> Result<(), CatalogError> {
    if response.is_success() {
        return Ok(());
    }
    tracing::warn!(status = response.status, "catalog returned an error status");
    Err(CatalogError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, CatalogError> {
    serde_json::from_str(body).map_err(|e| CatalogError::DecodeError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MORTY: &str = r#"{"id":2,"name":"Morty Smith","status":"Alive","species":"Human","type":"","gender":"Male","origin":{"name":"unknown","url":""},"location":{"name":"Citadel of Ricks","url":"https://rickandmortyapi.com/api/location/3"},"image":"https://rickandmortyapi.com/api/character/avatar/2.jpeg","episode":["https://rickandmortyapi.com/api/episode/1"],"url":"https://rickandmortyapi.com/api/character/2","created":"2017-11-04T18:50:21.651Z"}"#;

    fn client() -> CatalogClient {
        CatalogClient::new("http://localhost:3000")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_first_page_omits_query() {
        for page in [None, Some(1)] {
            let req = client().build_fetch_page(page).unwrap();
            assert_eq!(req.method, HttpMethod::Get);
            assert_eq!(req.url, "http://localhost:3000/character");
            assert_eq!(
                req.headers,
                vec![("accept".to_string(), "application/json".to_string())]
            );
        }
    }

    #[test]
    fn build_later_page_adds_query() {
        let req = client().build_fetch_page(Some(7)).unwrap();
        assert_eq!(req.url, "http://localhost:3000/character?page=7");
    }

    #[test]
    fn build_page_rejects_non_positive_index() {
        for page in [0, -1] {
            let err = client().build_fetch_page(Some(page)).unwrap_err();
            assert!(matches!(err, CatalogError::InvalidArgument(_)));
        }
    }

    #[test]
    fn build_by_id_interpolates_path() {
        let req = client().build_fetch_by_id(183).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/character/183");
    }

    #[test]
    fn build_by_id_rejects_non_positive_id() {
        for id in [0, -3] {
            let err = client().build_fetch_by_id(id).unwrap_err();
            assert!(matches!(err, CatalogError::InvalidArgument(_)), "id {id}");
        }
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = CatalogClient::new("http://localhost:3000/");
        let req = client.build_fetch_page(None).unwrap();
        assert_eq!(req.url, "http://localhost:3000/character");
    }

    #[test]
    fn parse_page_success() {
        let body = format!(
            r#"{{"info":{{"count":1,"pages":1,"next":null,"prev":null}},"results":[{MORTY}]}}"#
        );
        let page = client().parse_fetch_page(response(200, &body)).unwrap();
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].id, 2);
        assert_eq!(page.results[0].name, "Morty Smith");
        assert_eq!(page.info.count, 1);
    }

    #[test]
    fn parse_page_not_found_is_empty() {
        let page = client()
            .parse_fetch_page(response(404, r#"{"error":"There is nothing here"}"#))
            .unwrap();
        assert!(page.is_empty());
        assert_eq!(page, PageEnvelope::empty());
    }

    #[test]
    fn parse_page_server_error() {
        let err = client()
            .parse_fetch_page(response(503, "upstream unavailable"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::HttpError { status: 503, .. }));
    }

    #[test]
    fn parse_page_bad_json() {
        let err = client().parse_fetch_page(response(200, "not json")).unwrap_err();
        assert!(matches!(err, CatalogError::DecodeError(_)));
    }

    #[test]
    fn parse_page_rejects_invalid_character() {
        let nameless = MORTY.replace(r#""name":"Morty Smith""#, r#""name":"""#);
        let body = format!(r#"{{"results":[{nameless}]}}"#);
        let err = client().parse_fetch_page(response(200, &body)).unwrap_err();
        assert!(matches!(err, CatalogError::DecodeError(_)));
    }

    #[test]
    fn parse_by_id_success() {
        let character = client().parse_fetch_by_id(2, response(200, MORTY)).unwrap();
        assert_eq!(character.id, 2);
        assert_eq!(character.origin.url, "");
    }

    #[test]
    fn parse_by_id_not_found() {
        let err = client()
            .parse_fetch_by_id(999_999, response(404, r#"{"error":"Character not found"}"#))
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(999_999)));
    }

    #[test]
    fn parse_by_id_string_id_is_decode_error() {
        let body = MORTY.replace(r#""id":2"#, r#""id":"2""#);
        let err = client().parse_fetch_by_id(2, response(200, &body)).unwrap_err();
        assert!(matches!(err, CatalogError::DecodeError(_)));
    }

    #[test]
    fn parse_by_id_other_status() {
        let err = client()
            .parse_fetch_by_id(2, response(500, "boom"))
            .unwrap_err();
        match err {
            CatalogError::HttpError { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
