//! Database loading and IP lookups.

use std::net::IpAddr;
use std::path::Path;

use anyhow::{Context, Result};
use maxminddb::Reader;

use super::types::{GeoIpMetadata, GeoIpResult, GeoRecord};

/// Lookup seam between the resolver and the MaxMind readers.
pub trait GeoLookup: Send + Sync {
    /// Raw lookup; `None` on any miss.
    fn lookup(&self, ip: IpAddr) -> Option<GeoIpResult>;
}

/// GeoLite2 City reader plus an optional ASN reader, held in memory.
#[derive(Default)]
pub struct GeoDatabase {
    city: Option<Reader<Vec<u8>>>,
    asn: Option<Reader<Vec<u8>>>,
    metadata: Vec<GeoIpMetadata>,
}

impl GeoDatabase {
    /// A database with nothing loaded; every lookup misses.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Loads the City and ASN databases from local `.mmdb` files.
    ///
    /// A path that does not exist is logged and skipped. A file that exists
    /// but does not parse is an error.
    pub async fn open(city: Option<&Path>, asn: Option<&Path>) -> Result<Self> {
        let mut db = Self::default();

        if let Some(path) = city {
            if let Some((reader, metadata)) = load_optional(path).await? {
                db.city = Some(reader);
                db.metadata.push(metadata);
            }
        }
        if let Some(path) = asn {
            if let Some((reader, metadata)) = load_optional(path).await? {
                db.asn = Some(reader);
                db.metadata.push(metadata);
            }
        }

        if db.city.is_none() {
            log::warn!("GeoIP City database not loaded; geo lookups disabled");
        }
        Ok(db)
    }

    /// Whether a City database is loaded.
    pub fn is_enabled(&self) -> bool {
        self.city.is_some()
    }

    /// Metadata of every loaded database.
    pub fn metadata(&self) -> &[GeoIpMetadata] {
        &self.metadata
    }
}

async fn load_optional(path: &Path) -> Result<Option<(Reader<Vec<u8>>, GeoIpMetadata)>> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        log::warn!("GeoIP database not found at {}, skipping", path.display());
        return Ok(None);
    }
    load_from_file(path).await.map(Some)
}

/// Loads a GeoIP database from a local file path
async fn load_from_file(path: &Path) -> Result<(Reader<Vec<u8>>, GeoIpMetadata)> {
    log::info!("Loading GeoIP database from: {}", path.display());

    let db_bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read GeoIP database from {}", path.display()))?;

    let reader = Reader::from_source(db_bytes)
        .with_context(|| format!("Failed to parse GeoIP database from {}", path.display()))?;

    let metadata = GeoIpMetadata {
        source: path.display().to_string(),
        database_type: reader.metadata.database_type.clone(),
        version: format!("build_{}", reader.metadata.build_epoch),
    };
    log::info!(
        "Loaded {} ({}) from {}",
        metadata.database_type,
        metadata.version,
        metadata.source
    );

    Ok((reader, metadata))
}

impl GeoLookup for GeoDatabase {
    fn lookup(&self, ip: IpAddr) -> Option<GeoIpResult> {
        let city_reader = self.city.as_ref()?;

        // maxminddb 0.27: lookup() yields a LookupResult; has_data() then decode()
        let city_lookup = city_reader.lookup(ip).ok()?;
        if !city_lookup.has_data() {
            return None;
        }
        let city_result: maxminddb::geoip2::City = city_lookup.decode().ok()??;

        let mut geo_result = GeoIpResult {
            country_code: city_result.country.iso_code.map(|s| s.to_string()),
            country_name: city_result.country.names.english.map(|s| s.to_string()),
            region: city_result
                .subdivisions
                .first()
                .and_then(|s| s.names.english)
                .map(|s| s.to_string()),
            city: city_result.city.names.english.map(|s| s.to_string()),
            latitude: city_result.location.latitude,
            longitude: city_result.location.longitude,
            timezone: city_result.location.time_zone.map(|s| s.to_string()),
            postal_code: city_result.postal.code.map(|s| s.to_string()),
            ..Default::default()
        };

        if let Some(asn_reader) = &self.asn {
            if let Ok(asn_lookup) = asn_reader.lookup(ip) {
                if asn_lookup.has_data() {
                    if let Ok(Some(asn_result)) = asn_lookup.decode::<maxminddb::geoip2::Asn>() {
                        geo_result.asn = asn_result.autonomous_system_number;
                        geo_result.asn_org = asn_result
                            .autonomous_system_organization
                            .map(|s| s.to_string());
                    }
                }
            }
        }

        Some(geo_result)
    }
}

/// Geo record for `ip`: the database hit when there is one, the local
/// placeholder for local addresses, `None` for public misses.
pub fn resolve_geo(lookup: &dyn GeoLookup, ip: &str, is_local: bool) -> Option<GeoRecord> {
    let hit = ip
        .parse::<IpAddr>()
        .ok()
        .and_then(|addr| lookup.lookup(addr));

    match hit {
        Some(result) => Some(result.into()),
        None if is_local => Some(GeoRecord::local_placeholder()),
        None => {
            log::debug!("No geolocation for {}", ip);
            None
        }
    }
}
