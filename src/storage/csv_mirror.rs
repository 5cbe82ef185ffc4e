//! Flat CSV projection of the visitor log, downloadable as a spreadsheet.
//!
//! The mirror is appended best effort next to the primary store. It is
//! never read back to rebuild records.

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error_handling::StorageError;
use crate::models::VisitorRecord;

/// Fixed header row; [`csv_row`] produces values in this order.
pub const CSV_HEADER: [&str; 25] = [
    "timestamp",
    "session_id",
    "source",
    "ip",
    "is_localhost",
    "browser",
    "browser_version",
    "os",
    "os_version",
    "device_type",
    "device_vendor",
    "device_model",
    "engine",
    "cpu_arch",
    "country",
    "region",
    "city",
    "timezone",
    "isp",
    "using_proxy",
    "using_vpn",
    "incognito",
    "screen",
    "language",
    "user_agent",
];

/// Flattens `record` into one CSV row.
pub fn csv_row(record: &VisitorRecord) -> [String; 25] {
    let geo = record.geo.clone().unwrap_or_default();
    let screen = match (record.screen.width, record.screen.height) {
        (Some(w), Some(h)) => format!("{}x{}", w, h),
        _ => String::new(),
    };

    [
        record.timestamp.to_rfc3339(),
        record.session_id.clone(),
        record.source.to_string(),
        record.network.ip.clone(),
        record.network.is_localhost.to_string(),
        record.browser.name.clone(),
        record.browser.version.clone(),
        record.os.name.clone(),
        record.os.version.clone(),
        record.device.device_type.clone(),
        record.device.vendor.clone(),
        record.device.model.clone(),
        record.engine.name.clone(),
        record.cpu.architecture.clone(),
        record.country().to_string(),
        geo.region.unwrap_or_default(),
        geo.city.unwrap_or_default(),
        geo.timezone.unwrap_or_default(),
        record
            .network
            .isp
            .clone()
            .or(geo.isp)
            .unwrap_or_default(),
        record.network.proxy_vpn_heuristic.using_proxy.flag.to_string(),
        record.network.proxy_vpn_heuristic.using_vpn.flag.to_string(),
        record.heuristics.incognito.flag.to_string(),
        screen,
        record.locale.language.clone().unwrap_or_default(),
        record.user_agent.clone(),
    ]
}

/// Append-only CSV file with a header row written on creation.
#[derive(Clone)]
pub struct CsvMirror {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl CsvMirror {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one row, writing the header first if the file is new.
    pub async fn append(&self, record: &VisitorRecord) -> Result<(), StorageError> {
        let row = csv_row(record);
        let path = self.path.clone();
        let _guard = self.lock.lock().await;

        tokio::task::spawn_blocking(move || -> Result<(), StorageError> {
            let (file, is_new) = match OpenOptions::new().append(true).create_new(true).open(&path) {
                Ok(file) => (file, true),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    (OpenOptions::new().append(true).open(&path)?, false)
                }
                Err(e) => return Err(e.into()),
            };

            let mut writer = ::csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(file);
            if is_new {
                writer.write_record(CSV_HEADER)?;
            }
            writer.write_record(&row)?;
            writer.flush()?;
            Ok(())
        })
        .await?
    }

    /// File contents, or `None` when the mirror has not been created yet.
    pub async fn read(&self) -> Result<Option<Vec<u8>>, StorageError> {
        let _guard = self.lock.lock().await;
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes the mirror. Missing file is not an error.
    pub async fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_helpers::sample_record;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_header_written_once() {
        let temp = TempDir::new().unwrap();
        let mirror = CsvMirror::new(temp.path().join("visitors.csv"));

        assert!(mirror.read().await.unwrap().is_none());
        mirror.append(&sample_record("8.8.8.8", "Chrome", 1)).await.unwrap();
        mirror.append(&sample_record("1.1.1.1", "Firefox", 2)).await.unwrap();

        let bytes = mirror.read().await.unwrap().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER.join(","));
        assert!(lines[1].contains("8.8.8.8"));
        assert!(lines[2].contains("Firefox"));
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let mirror = CsvMirror::new(temp.path().join("visitors.csv"));
        mirror.clear().await.unwrap();
        mirror.append(&sample_record("8.8.8.8", "Chrome", 1)).await.unwrap();
        mirror.clear().await.unwrap();
        mirror.clear().await.unwrap();
        assert!(mirror.read().await.unwrap().is_none());
    }

    #[test]
    fn test_row_matches_header_width() {
        let row = csv_row(&sample_record("8.8.8.8", "Chrome", 1));
        assert_eq!(row.len(), CSV_HEADER.len());
        assert_eq!(row[3], "8.8.8.8");
        assert_eq!(row[5], "Chrome");
        assert_eq!(row[14], "Unknown");
    }
}
