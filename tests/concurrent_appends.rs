//! Concurrent appends must never lose records, whichever backend is in use.

#[path = "helpers.rs"]
mod helpers;

use std::sync::Arc;

use futures::future::join_all;
use serde_json::Value;
use tempfile::TempDir;

use helpers::{record_from_ip, start_test_server_with};
use visitor_log::{JsonlStore, SqliteStore, StorageBackend, VisitorStore};

const WRITERS: usize = 64;

async fn hammer(store: Arc<dyn VisitorStore>) {
    let tasks = (0..WRITERS).map(|i| {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            let record = record_from_ip(&format!("198.51.100.{}", i), "curl/8.5.0");
            store.append(&record).await
        })
    });

    for result in join_all(tasks).await {
        result.expect("task panicked").expect("append failed");
    }

    let all = store.all().await.expect("read back");
    assert_eq!(all.len(), WRITERS);
    let mut ips: Vec<_> = all.iter().map(|r| r.network.ip.clone()).collect();
    ips.sort();
    ips.dedup();
    assert_eq!(ips.len(), WRITERS, "every writer's record should be present once");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_jsonl_concurrent_appends() {
    let temp = TempDir::new().unwrap();
    let store = JsonlStore::new(temp.path().join("visitors.jsonl"));
    hammer(Arc::new(store)).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sqlite_concurrent_appends() {
    let temp = TempDir::new().unwrap();
    let store = SqliteStore::open(&temp.path().join("visitors.db"))
        .await
        .expect("sqlite store should open");
    hammer(Arc::new(store)).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_collect_requests() {
    for backend in [StorageBackend::Jsonl, StorageBackend::Sqlite] {
        let server = start_test_server_with(backend).await;
        let url = format!("{}/api/collect", server.base_url);

        let requests = (0..32).map(|i| {
            let client = server.client.clone();
            let url = url.clone();
            async move {
                client
                    .post(&url)
                    .header("x-real-ip", format!("203.0.113.{}", i))
                    .send()
                    .await
                    .expect("request failed")
                    .status()
            }
        });
        for status in join_all(requests).await {
            assert_eq!(status, 200);
        }

        let logs: Value = server
            .client
            .get(format!("{}/api/logs?limit=1000", server.base_url))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(logs["total"], 32, "backend {} lost records", backend);

        // the CSV mirror has a single header plus one row per record
        let csv = server
            .client
            .get(format!("{}/api/logs/csv", server.base_url))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(csv.lines().count(), 33);
    }
}
