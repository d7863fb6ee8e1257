//! Typed client core for the Rick and Morty character catalog.
//!
//! # Overview
//! Two operations, one page of characters and one character by id, exposed
//! at two levels:
//! - `CatalogClient` builds `HttpRequest` values and parses `HttpResponse`
//!   values without touching the network (host-does-IO pattern), so a mobile
//!   or C host can drive it with its own HTTP stack.
//! - `Fetcher` composes build, `Transport::execute` and parse into async
//!   `fetch_page` / `fetch_by_id` calls with optional cancellation.
//!
//! # Design
//! - Both layers are stateless; callers own every fetched value.
//! - Only the listing 404 is recovered (as an empty page). Every other
//!   failure surfaces as a distinct `CatalogError` variant.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod fetch;
pub mod http;
pub mod transport;
pub mod types;

pub use client::CatalogClient;
pub use config::ClientConfig;
pub use error::{CatalogError, TransportError, TransportErrorKind};
pub use fetch::Fetcher;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
pub use transport::Transport;
pub use types::{Character, PageEnvelope, PageInfo, Place};
pub use tokio_util::sync::CancellationToken;
