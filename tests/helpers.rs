// Shared test helpers: live servers on ephemeral ports and record builders.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderMap, HeaderValue};
use tempfile::TempDir;
use tokio::net::TcpListener;

use visitor_log::geoip::GeoDatabase;
use visitor_log::initialization::init_state;
use visitor_log::models::CollectionSource;
use visitor_log::{serve, Config, RequestSignals, Resolver, StorageBackend, VisitorRecord};

/// A running server plus the scratch directory backing it.
#[allow(dead_code)] // Not every test file reads every field
pub struct TestServer {
    pub base_url: String,
    pub data_dir: TempDir,
    pub client: reqwest::Client,
}

/// Starts a JSON Lines-backed server on 127.0.0.1 with an ephemeral port.
#[allow(dead_code)] // Used by other test files
pub async fn start_test_server() -> TestServer {
    start_test_server_with(StorageBackend::Jsonl).await
}

/// Starts a server with the given storage backend.
#[allow(dead_code)] // Used by other test files
pub async fn start_test_server_with(storage: StorageBackend) -> TestServer {
    let data_dir = TempDir::new().expect("Failed to create temp dir");
    let config = Config {
        data_dir: data_dir.path().to_path_buf(),
        storage,
        ..Default::default()
    };
    let state = init_state(&config)
        .await
        .expect("Failed to initialize server state");

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr: SocketAddr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = serve(listener, state).await;
    });

    let client = reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to build HTTP client");

    TestServer {
        base_url: format!("http://{}", addr),
        data_dir,
        client,
    }
}

/// Record resolved for a request arriving with `X-Real-IP: ip`.
#[allow(dead_code)] // Used by other test files
pub fn record_from_ip(ip: &str, ua: &str) -> VisitorRecord {
    let mut headers = HeaderMap::new();
    headers.insert("x-real-ip", HeaderValue::from_str(ip).expect("valid header"));
    headers.insert("user-agent", HeaderValue::from_str(ua).expect("valid header"));
    let signals = RequestSignals {
        headers: &headers,
        peer: None,
        framework_ip: None,
    };
    Resolver::new(Arc::new(GeoDatabase::disabled())).resolve(
        &signals,
        None,
        CollectionSource::Collect,
        format!("sess_test_{}", ip),
    )
}
