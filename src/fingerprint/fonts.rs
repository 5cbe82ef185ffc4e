//! Font availability detection.

use std::collections::HashSet;

use crate::config::FONT_PROBE_SIZE;

/// Families probed by default, in report order.
pub const DEFAULT_FONT_CANDIDATES: &[&str] = &[
    "Arial",
    "Arial Black",
    "Calibri",
    "Cambria",
    "Comic Sans MS",
    "Consolas",
    "Courier New",
    "DejaVu Sans",
    "Georgia",
    "Helvetica",
    "Helvetica Neue",
    "Impact",
    "Liberation Sans",
    "Lucida Console",
    "Menlo",
    "Monaco",
    "Noto Sans",
    "Palatino",
    "Roboto",
    "Segoe UI",
    "San Francisco",
    "Tahoma",
    "Times New Roman",
    "Trebuchet MS",
    "Ubuntu",
    "Verdana",
];

/// Answers whether a font family renders at a given CSS size.
pub trait FontProbe {
    fn is_available(&self, family: &str, size: &str) -> bool;
}

/// Probe backed by the list of families the client measured as available.
/// Matching is case-insensitive; size is irrelevant once the client measured.
#[derive(Debug, Default)]
pub struct ReportedFonts {
    families: HashSet<String>,
}

impl ReportedFonts {
    pub fn new<I, S>(families: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            families: families
                .into_iter()
                .map(|f| f.as_ref().trim().to_lowercase())
                .filter(|f| !f.is_empty())
                .collect(),
        }
    }
}

impl FontProbe for ReportedFonts {
    fn is_available(&self, family: &str, _size: &str) -> bool {
        self.families.contains(&family.to_lowercase())
    }
}

/// Candidates the probe reports as available, in candidate order.
pub fn detect_fonts<P: FontProbe + ?Sized>(probe: &P, candidates: &[&str]) -> Vec<String> {
    candidates
        .iter()
        .filter(|family| probe.is_available(family, FONT_PROBE_SIZE))
        .map(|family| family.to_string())
        .collect()
}
