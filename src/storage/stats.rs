//! Aggregations over stored records.

use std::collections::{BTreeMap, HashSet};

use chrono::{Local, NaiveDate};
use serde::Serialize;
use strum::IntoEnumIterator;

use super::VisitorField;
use crate::models::VisitorRecord;

/// Record count per distinct value of `field`.
pub fn count_by(records: &[VisitorRecord], field: VisitorField) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(field.value_of(record)).or_insert(0) += 1;
    }
    counts
}

/// Summary block of `GET /api/logs`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStats {
    pub browsers: BTreeMap<String, usize>,
    pub os: BTreeMap<String, usize>,
    pub devices: BTreeMap<String, usize>,
    pub countries: BTreeMap<String, usize>,
    pub sources: BTreeMap<String, usize>,
    /// Records whose timestamp falls on `today` in server-local time
    pub today: usize,
}

impl LogStats {
    pub fn from_records(records: &[VisitorRecord], today: NaiveDate) -> Self {
        let mut stats = LogStats {
            today: records
                .iter()
                .filter(|r| r.timestamp.with_timezone(&Local).date_naive() == today)
                .count(),
            ..Default::default()
        };
        for field in VisitorField::iter() {
            let slot = match field {
                VisitorField::Browser => &mut stats.browsers,
                VisitorField::Os => &mut stats.os,
                VisitorField::DeviceType => &mut stats.devices,
                VisitorField::Country => &mut stats.countries,
                VisitorField::Source => &mut stats.sources,
                VisitorField::Ip => continue,
            };
            *slot = count_by(records, field);
        }
        stats
    }
}

/// Body of `GET /api/stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyStats {
    /// Visits per UTC hour, keyed `YYYY-MM-DDTHH`
    pub hourly: BTreeMap<String, usize>,
    /// Distinct client IPs
    pub unique_visitors: usize,
    pub total_visits: usize,
}

impl HourlyStats {
    pub fn from_records(records: &[VisitorRecord]) -> Self {
        let mut hourly = BTreeMap::new();
        let mut ips = HashSet::new();
        for record in records {
            *hourly
                .entry(record.timestamp.format("%Y-%m-%dT%H").to_string())
                .or_insert(0) += 1;
            ips.insert(record.network.ip.as_str());
        }
        HourlyStats {
            hourly,
            unique_visitors: ips.len(),
            total_visits: records.len(),
        }
    }
}
