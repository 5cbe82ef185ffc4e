//! JSON Lines backend: one serialized record per line, appended.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::VisitorStore;
use crate::error_handling::StorageError;
use crate::models::VisitorRecord;

/// Append-only `.jsonl` file.
///
/// Each append is a single `write_all` of one complete line on a file opened
/// in append mode, serialized through an in-process lock that reads also
/// take. Records are never read back before writing.
#[derive(Clone)]
pub struct JsonlStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl JsonlStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every parseable record. A missing or unreadable file reads as
    /// empty; corrupt lines are skipped.
    ///
    /// Holds the write lock so an in-flight append is never seen half written.
    async fn read_records(&self) -> Vec<VisitorRecord> {
        let read = {
            let _guard = self.write_lock.lock().await;
            tokio::fs::read_to_string(&self.path).await
        };
        let contents = match read {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                log::warn!(
                    "Visitor log {} unreadable, treating as empty: {}",
                    self.path.display(),
                    e
                );
                return Vec::new();
            }
        };

        parse_lines(&contents, &self.path)
    }
}

fn parse_lines(contents: &str, path: &Path) -> Vec<VisitorRecord> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(idx, line)| match serde_json::from_str(line) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!(
                    "Skipping corrupt line {} in {}: {}",
                    idx + 1,
                    path.display(),
                    e
                );
                None
            }
        })
        .collect()
}

#[async_trait]
impl VisitorStore for JsonlStore {
    async fn append(&self, record: &VisitorRecord) -> Result<(), StorageError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let path = self.path.clone();
        let _guard = self.write_lock.lock().await;
        tokio::task::spawn_blocking(move || -> Result<(), StorageError> {
            let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
            file.write_all(line.as_bytes())?;
            Ok(())
        })
        .await?
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<VisitorRecord>, StorageError> {
        let records = self.read_records().await;
        Ok(records.into_iter().rev().take(limit).collect())
    }

    async fn all(&self) -> Result<Vec<VisitorRecord>, StorageError> {
        Ok(self.read_records().await)
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                log::info!("Cleared visitor log {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_helpers::sample_record;
    use crate::storage::VisitorField;
    use tempfile::TempDir;

    fn store(temp: &TempDir) -> JsonlStore {
        JsonlStore::new(temp.path().join("visitors.jsonl"))
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        assert!(store.all().await.unwrap().is_empty());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_append_and_list_newest_first() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        for hour in 0..5 {
            store
                .append(&sample_record("8.8.8.8", "Chrome", hour))
                .await
                .unwrap();
        }

        let recent = store.list_recent(3).await.unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].session_id, "sess_test_4");
        assert_eq!(recent[2].session_id, "sess_test_2");

        let all = store.all().await.unwrap();
        assert_eq!(all.len(), 5);
        assert_eq!(all[0].session_id, "sess_test_0");
    }

    #[tokio::test]
    async fn test_corrupt_lines_are_skipped() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        store
            .append(&sample_record("8.8.8.8", "Chrome", 1))
            .await
            .unwrap();
        {
            let mut file = OpenOptions::new().append(true).open(store.path()).unwrap();
            file.write_all(b"{not json\n\n").unwrap();
        }
        store
            .append(&sample_record("1.1.1.1", "Firefox", 2))
            .await
            .unwrap();

        let all = store.all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].browser.name, "Firefox");
    }

    #[tokio::test]
    async fn test_read_waits_for_in_flight_append() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        store
            .append(&sample_record("8.8.8.8", "Chrome", 1))
            .await
            .unwrap();

        let mut line = serde_json::to_string(&sample_record("1.1.1.1", "Firefox", 2)).unwrap();
        line.push('\n');
        let (head, tail) = line.split_at(line.len() / 2);

        // emulate an append that has written half of its line
        let guard = store.write_lock.lock().await;
        let mut file = OpenOptions::new().append(true).open(store.path()).unwrap();
        file.write_all(head.as_bytes()).unwrap();

        let reader = {
            let store = store.clone();
            tokio::spawn(async move { store.all().await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(!reader.is_finished(), "read should wait for the writer");

        file.write_all(tail.as_bytes()).unwrap();
        drop(guard);

        let all = reader.await.unwrap().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].browser.name, "Firefox");
    }

    #[tokio::test]
    async fn test_clear_then_list_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        store
            .append(&sample_record("8.8.8.8", "Chrome", 1))
            .await
            .unwrap();
        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert!(store.list_recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_count_by_browser() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        for (ip, browser) in [("1.1.1.1", "Chrome"), ("2.2.2.2", "Chrome"), ("3.3.3.3", "Safari")] {
            store.append(&sample_record(ip, browser, 1)).await.unwrap();
        }
        let counts = store.count_by(VisitorField::Browser).await.unwrap();
        assert_eq!(counts.get("Chrome"), Some(&2));
        assert_eq!(counts.get("Safari"), Some(&1));
    }

    #[tokio::test]
    async fn test_concurrent_appends_are_all_kept() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        let tasks: Vec<_> = (0..50)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    let record = sample_record(&format!("10.0.0.{}", i), "Chrome", (i % 24) as u32);
                    store.append(&record).await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(store.all().await.unwrap().len(), 50);
    }
}
