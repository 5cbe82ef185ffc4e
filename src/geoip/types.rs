//! GeoIP data structures.

use serde::{Deserialize, Serialize};

/// Metadata about a loaded GeoIP database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoIpMetadata {
    /// Source path
    pub source: String,
    /// Database type reported by the file (e.g. `GeoLite2-City`)
    pub database_type: String,
    /// Database build date/version (extracted from database)
    pub version: String,
}

/// Raw GeoIP lookup result, straight from the databases
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoIpResult {
    pub country_code: Option<String>,
    pub country_name: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub postal_code: Option<String>,
    pub timezone: Option<String>,
    pub asn: Option<u32>,
    pub asn_org: Option<String>,
}

/// Geolocation attached to a visitor record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeoRecord {
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
    pub postal_code: Option<String>,
    pub isp: Option<String>,
    pub org: Option<String>,
    /// `AS<number> <organization>`
    pub asn: Option<String>,
}

impl GeoRecord {
    /// Stand-in record for loopback and private addresses.
    pub fn local_placeholder() -> Self {
        Self {
            country: Some("Localhost".to_string()),
            country_code: Some("LO".to_string()),
            region: Some("Local".to_string()),
            city: Some("Development".to_string()),
            timezone: Some("Local".to_string()),
            isp: Some("Local Network".to_string()),
            org: Some("Local Network".to_string()),
            ..Default::default()
        }
    }
}

impl From<GeoIpResult> for GeoRecord {
    fn from(result: GeoIpResult) -> Self {
        let asn = result.asn.map(|number| match &result.asn_org {
            Some(org) => format!("AS{} {}", number, org),
            None => format!("AS{}", number),
        });
        Self {
            country: result.country_name,
            country_code: result.country_code,
            region: result.region,
            city: result.city,
            latitude: result.latitude,
            longitude: result.longitude,
            timezone: result.timezone,
            postal_code: result.postal_code,
            isp: result.asn_org.clone(),
            org: result.asn_org,
            asn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_lookup_result_formats_asn() {
        let record = GeoRecord::from(GeoIpResult {
            country_name: Some("United States".into()),
            country_code: Some("US".into()),
            asn: Some(15169),
            asn_org: Some("GOOGLE".into()),
            ..Default::default()
        });
        assert_eq!(record.asn.as_deref(), Some("AS15169 GOOGLE"));
        assert_eq!(record.isp.as_deref(), Some("GOOGLE"));
        assert_eq!(record.country.as_deref(), Some("United States"));
    }

    #[test]
    fn test_placeholder_serializes_camel_case() {
        let json = serde_json::to_value(GeoRecord::local_placeholder()).unwrap();
        assert_eq!(json["countryCode"], "LO");
        assert_eq!(json["city"], "Development");
        assert!(json["latitude"].is_null());
    }
}
