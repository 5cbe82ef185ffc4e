//! Visitor record persistence.
//!
//! Records go through the [`VisitorStore`] trait. Two backends exist: an
//! append-only JSON Lines file (the default) and SQLite. Neither ever
//! rewrites an existing record; the only destructive operation is `clear`.

mod csv_mirror;
mod jsonl;
mod sqlite;
mod stats;

pub use csv_mirror::{csv_row, CsvMirror, CSV_HEADER};
pub use jsonl::JsonlStore;
pub use sqlite::SqliteStore;
pub use stats::{count_by, HourlyStats, LogStats};

use std::collections::BTreeMap;

use async_trait::async_trait;
use strum_macros::{Display, EnumIter};

use crate::error_handling::StorageError;
use crate::models::VisitorRecord;

/// Record attributes that can be aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum VisitorField {
    Browser,
    Os,
    DeviceType,
    Country,
    Source,
    Ip,
}

impl VisitorField {
    /// The field's value on `record`, as used for grouping.
    pub fn value_of(&self, record: &VisitorRecord) -> String {
        match self {
            VisitorField::Browser => record.browser.name.clone(),
            VisitorField::Os => record.os.name.clone(),
            VisitorField::DeviceType => record.device.device_type.clone(),
            VisitorField::Country => record.country().to_string(),
            VisitorField::Source => record.source.to_string(),
            VisitorField::Ip => record.network.ip.clone(),
        }
    }

    /// SQLite column holding this field.
    pub(crate) fn column(&self) -> &'static str {
        match self {
            VisitorField::Browser => "browser",
            VisitorField::Os => "os",
            VisitorField::DeviceType => "device_type",
            VisitorField::Country => "country",
            VisitorField::Source => "source",
            VisitorField::Ip => "ip",
        }
    }
}

/// Append-only visitor log.
#[async_trait]
pub trait VisitorStore: Send + Sync {
    /// Appends one record. Never touches existing records.
    async fn append(&self, record: &VisitorRecord) -> Result<(), StorageError>;

    /// Up to `limit` records, newest first.
    async fn list_recent(&self, limit: usize) -> Result<Vec<VisitorRecord>, StorageError>;

    /// Every record, oldest first.
    async fn all(&self) -> Result<Vec<VisitorRecord>, StorageError>;

    /// Removes every record. Idempotent.
    async fn clear(&self) -> Result<(), StorageError>;

    /// Number of stored records.
    async fn count(&self) -> Result<usize, StorageError> {
        Ok(self.all().await?.len())
    }

    /// Record count per distinct value of `field`.
    async fn count_by(&self, field: VisitorField) -> Result<BTreeMap<String, usize>, StorageError> {
        Ok(count_by(&self.all().await?, field))
    }
}
