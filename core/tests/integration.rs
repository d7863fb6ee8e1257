//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives both layers over
//! real HTTP: the sans-IO `CatalogClient` with ureq as the host executor, and
//! `Fetcher` with the reqwest transport.

use std::time::Duration;

use catalog_core::{
    CatalogClient, CatalogError, ClientConfig, Fetcher, HttpMethod, HttpRequest, HttpResponse,
    TransportError, TransportErrorKind,
};

/// Start `router` on a random port in a background thread and return its
/// base URL.
fn start_server(router: axum::Router) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::serve(listener, router).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

/// A base URL nothing is listening on.
fn dead_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// A base URL that accepts connections but never writes a response.
fn silent_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => held.push(stream),
                Err(_) => break,
            }
        }
    });
    format!("http://{addr}")
}

/// Execute an `HttpRequest` with ureq, returning 4xx/5xx as data so the
/// core client interprets status codes itself.
fn execute(req: HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut builder = match req.method {
        HttpMethod::Get => agent.get(&req.url),
    };
    for (key, value) in &req.headers {
        builder = builder.header(key.as_str(), value.as_str());
    }
    let mut response = builder.call().expect("HTTP transport error");

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse {
        status,
        headers: Vec::new(),
        body,
    }
}

fn fetcher(base_url: &str) -> Fetcher<catalog_core::ReqwestTransport> {
    let config = ClientConfig::default()
        .with_base_url(base_url)
        .with_request_timeout(Duration::from_secs(5));
    Fetcher::from_config(&config).unwrap()
}

#[test]
fn host_driven_browse_and_detail() {
    let base = start_server(mock_server::app());
    let client = CatalogClient::new(&base);

    // Step 1: first page lists the whole sample catalog.
    let req = client.build_fetch_page(None).unwrap();
    let page = client.parse_fetch_page(execute(req)).unwrap();
    assert_eq!(page.results.len(), 5);
    assert_eq!(page.info.count, 5);
    assert_eq!(page.info.next_page(), None);

    // Step 2: detail for a character with every field present.
    let req = client.build_fetch_by_id(1).unwrap();
    let rick = client.parse_fetch_by_id(1, execute(req)).unwrap();
    assert_eq!(rick, page.results[0]);
    assert_eq!(rick.origin.name, "Earth (C-137)");

    // Step 3: the server omits Jerry's location.
    let req = client.build_fetch_by_id(5).unwrap();
    let jerry = client.parse_fetch_by_id(5, execute(req)).unwrap();
    assert_eq!(jerry.location.name, "unknown");
    assert_eq!(jerry.location.url, "");

    // Step 4: past the end of the listing.
    let req = client.build_fetch_page(Some(999)).unwrap();
    let page = client.parse_fetch_page(execute(req)).unwrap();
    assert!(page.results.is_empty());

    // Step 5: unknown character.
    let req = client.build_fetch_by_id(999_999).unwrap();
    let err = client.parse_fetch_by_id(999_999, execute(req)).unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(999_999)));
}

#[tokio::test]
async fn fetcher_walks_pages_via_next_links() {
    let base = start_server(mock_server::app_with(mock_server::generated_characters(45)));
    let f = fetcher(&base);

    let mut seen = Vec::new();
    let mut next = None;
    loop {
        let page = f.fetch_page(next).await.unwrap();
        seen.extend(page.results.iter().map(|c| c.id));
        match page.info.next_page() {
            Some(n) => next = Some(n),
            None => break,
        }
    }
    assert_eq!(seen, (1..=45).collect::<Vec<u64>>());
}

#[tokio::test]
async fn fetcher_page_past_end_is_empty() {
    let base = start_server(mock_server::app());
    let page = fetcher(&base).fetch_page(Some(999)).await.unwrap();
    assert!(page.results.is_empty());
}

#[tokio::test]
async fn fetcher_unknown_id_is_not_found() {
    let base = start_server(mock_server::app());
    let err = fetcher(&base).fetch_by_id(999_999).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(999_999)));
}

#[tokio::test]
async fn fetcher_concurrent_lookups() {
    let base = start_server(mock_server::app());
    let f = fetcher(&base);

    let (rick, morty, summer) = tokio::join!(f.fetch_by_id(1), f.fetch_by_id(2), f.fetch_by_id(3));
    assert_eq!(rick.unwrap().name, "Rick Sanchez");
    assert_eq!(morty.unwrap().name, "Morty Smith");
    assert_eq!(summer.unwrap().name, "Summer Smith");
}

#[tokio::test]
async fn connection_refused_is_transport_error() {
    let f = fetcher(&dead_url());

    let err = f.fetch_page(None).await.unwrap_err();
    match err {
        CatalogError::Transport(cause) => assert_eq!(cause.kind, TransportErrorKind::Connect),
        other => panic!("expected transport error, got {other:?}"),
    }

    let err = f.fetch_by_id(1).await.unwrap_err();
    assert!(matches!(err, CatalogError::Transport(_)));
}

#[tokio::test]
async fn silent_server_hits_request_timeout() {
    let config = ClientConfig::default()
        .with_base_url(silent_url())
        .with_request_timeout(Duration::from_millis(200));
    let f = Fetcher::from_config(&config).unwrap();

    let started = std::time::Instant::now();
    let err = f.fetch_by_id(1).await.unwrap_err();
    assert!(
        matches!(
            err,
            CatalogError::Transport(TransportError {
                kind: TransportErrorKind::Timeout,
                ..
            })
        ),
        "expected timeout, got {err:?}"
    );
    assert!(started.elapsed() < Duration::from_secs(5));

    let err = f.fetch_page(None).await.unwrap_err();
    match err {
        CatalogError::Transport(cause) => assert_eq!(cause.kind, TransportErrorKind::Timeout),
        other => panic!("expected transport timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_id_never_reaches_the_server() {
    let f = fetcher(&dead_url());
    let err = f.fetch_by_id(-3).await.unwrap_err();
    assert!(matches!(err, CatalogError::InvalidArgument(_)));
}
