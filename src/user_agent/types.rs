//! User-agent data structures.

use serde::{Deserialize, Serialize};

/// Raw output of one parsing strategy. Every field is optional: a parser that
/// cannot tell leaves it empty instead of guessing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UaParse {
    pub browser_name: Option<String>,
    pub browser_version: Option<String>,
    pub os_name: Option<String>,
    pub os_version: Option<String>,
    pub device_type: Option<String>,
    pub device_vendor: Option<String>,
    pub device_model: Option<String>,
    pub engine_name: Option<String>,
    pub engine_version: Option<String>,
    pub cpu_architecture: Option<String>,
}

/// Both parser outputs, kept on the record for auditing disagreements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOutputs {
    pub grammar: UaParse,
    pub tokens: UaParse,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserInfo {
    pub name: String,
    pub version: String,
    pub major: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OsInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceInfo {
    #[serde(rename = "type")]
    pub device_type: String,
    pub vendor: String,
    pub model: String,
    pub is_mobile: bool,
    pub is_tablet: bool,
    pub is_desktop: bool,
    pub is_bot: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuInfo {
    pub architecture: String,
}

/// Final user-agent breakdown for a record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciledUserAgent {
    pub browser: BrowserInfo,
    pub os: OsInfo,
    pub device: DeviceInfo,
    pub engine: EngineInfo,
    pub cpu: CpuInfo,
    pub parsers: ParserOutputs,
}
