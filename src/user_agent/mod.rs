//! User-agent reconciliation.
//!
//! Two independent parsers run over the raw string; each display field takes
//! the grammar parser's answer, then the token parser's, then `Unknown`.

mod arch;
mod grammar;
mod tokens;
mod types;

pub use arch::FormFactor;
pub use types::{
    BrowserInfo, CpuInfo, DeviceInfo, EngineInfo, OsInfo, ParserOutputs, ReconciledUserAgent,
    UaParse,
};

use crate::resolver::cascade::first_known;

/// Runs both parsers and merges their answers.
pub fn reconcile(ua: &str) -> ReconciledUserAgent {
    let grammar = grammar::parse(ua);
    let tokens = tokens::parse(ua);
    let flags = FormFactor::from_user_agent(ua);

    let pick = |g: &Option<String>, t: &Option<String>| first_known([g.as_deref(), t.as_deref()]);

    let browser_version = pick(&grammar.browser_version, &tokens.browser_version);
    let browser = BrowserInfo {
        name: pick(&grammar.browser_name, &tokens.browser_name),
        major: major_version(&browser_version),
        version: browser_version,
    };

    let os = OsInfo {
        name: pick(&grammar.os_name, &tokens.os_name),
        version: pick(&grammar.os_version, &tokens.os_version),
    };

    let device = DeviceInfo {
        device_type: first_known([
            grammar.device_type.as_deref(),
            tokens.device_type.as_deref(),
            flags.device_type(),
        ]),
        vendor: pick(&grammar.device_vendor, &tokens.device_vendor),
        model: pick(&grammar.device_model, &tokens.device_model),
        is_mobile: flags.is_mobile,
        is_tablet: flags.is_tablet,
        is_desktop: flags.is_desktop,
        is_bot: flags.is_bot,
    };

    let engine = EngineInfo {
        name: pick(&grammar.engine_name, &tokens.engine_name),
        version: pick(&grammar.engine_version, &tokens.engine_version),
    };

    let cpu = CpuInfo {
        architecture: arch::architecture(
            ua,
            &[
                grammar.cpu_architecture.as_deref(),
                tokens.cpu_architecture.as_deref(),
            ],
        ),
    };

    ReconciledUserAgent {
        browser,
        os,
        device,
        engine,
        cpu,
        parsers: ParserOutputs { grammar, tokens },
    }
}

/// Leading numeric component of a version, or `Unknown`.
fn major_version(version: &str) -> String {
    first_known([version.split('.').next()])
}
