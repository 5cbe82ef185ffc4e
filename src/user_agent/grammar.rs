//! Grammar parser: ordered regex tables, first matching rule wins.
//!
//! Rule order matters. Chromium derivatives (Edge, Opera, Samsung Internet)
//! also carry a `Chrome/` token, and Chrome carries `Safari/`, so the more
//! specific rules come first.

use std::sync::LazyLock;

use regex::Regex;

use super::types::UaParse;

struct BrowserRule {
    re: Regex,
    /// Fixed family name; `None` takes the family from capture group 1
    name: Option<&'static str>,
    version_group: usize,
}

fn rule(pattern: &str, name: Option<&'static str>, version_group: usize) -> BrowserRule {
    BrowserRule {
        re: Regex::new(pattern).expect("static browser pattern"),
        name,
        version_group,
    }
}

static BROWSER_RULES: LazyLock<Vec<BrowserRule>> = LazyLock::new(|| {
    vec![
        rule(
            r"(?i)(googlebot|bingbot|baiduspider|yandexbot|duckduckbot|slurp|facebookexternalhit|twitterbot|applebot)(?:/(\d+[\.\d]*))?",
            None,
            2,
        ),
        rule(r"Edg(?:e|A|iOS)?/(\d+[\.\d]*)", Some("Edge"), 1),
        rule(r"(?:OPR|Opera)/(\d+[\.\d]*)", Some("Opera"), 1),
        rule(r"SamsungBrowser/(\d+[\.\d]*)", Some("Samsung Internet"), 1),
        rule(r"YaBrowser/(\d+[\.\d]*)", Some("Yandex"), 1),
        rule(r"Vivaldi/(\d+[\.\d]*)", Some("Vivaldi"), 1),
        rule(r"FxiOS/(\d+[\.\d]*)", Some("Firefox"), 1),
        rule(r"CriOS/(\d+[\.\d]*)", Some("Chrome"), 1),
        rule(r"Firefox/(\d+[\.\d]*)", Some("Firefox"), 1),
        rule(r"(?:Chrome|Chromium)/(\d+[\.\d]*)", Some("Chrome"), 1),
        rule(r"MSIE (\d+[\.\d]*)", Some("Internet Explorer"), 1),
        rule(r"Trident/.*rv:(\d+[\.\d]*)", Some("Internet Explorer"), 1),
        rule(r"Version/(\d+[\.\d]*).*Safari/", Some("Safari"), 1),
        rule(
            r"(?i)(curl|wget|python-requests|go-http-client|okhttp)/(\d+[\.\d]*)",
            None,
            2,
        ),
    ]
});

static WINDOWS_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Windows Phone(?: OS)? (\d+[\.\d]*)").expect("static pattern"));
static WINDOWS_NT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Windows NT (\d+\.\d+)").expect("static pattern"));
static IOS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:iPhone|CPU) OS (\d+)_(\d+)(?:_(\d+))?").expect("static pattern")
});
static ANDROID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Android(?:[ /](\d+(?:\.\d+)*))?").expect("static pattern"));
static CROS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"CrOS \S+ (\d+[\.\d]*)").expect("static pattern"));
static MAC_OS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Mac OS X (\d+)[_.](\d+)(?:[_.](\d+))?").expect("static pattern")
});

static ANDROID_MODEL_BUILD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Android[^;]*;\s*(?:[a-zA-Z]{2}[-_][a-zA-Z]{2};\s*)?([^;)]+?)\s+Build/")
        .expect("static pattern")
});
static ANDROID_MODEL_REDUCED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Android [\d.]+; ([^;)]+)\)").expect("static pattern"));
static TV: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)smart-?tv|hbbtv|appletv|googletv").expect("static pattern"));
static CONSOLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)playstation|xbox|nintendo").expect("static pattern"));

static TRIDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Trident/(\d+[\.\d]*)").expect("static pattern"));
static EDGE_HTML: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Edge/(\d+[\.\d]*)").expect("static pattern"));
static PRESTO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Presto/(\d+[\.\d]*)").expect("static pattern"));
static BLINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:Chrome|Chromium)/(\d+[\.\d]*)").expect("static pattern"));
static WEBKIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"AppleWebKit/(\d+[\.\d]*)").expect("static pattern"));
static GECKO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"rv:([\w.]+)\).*Gecko/").expect("static pattern"));

/// `(pattern, architecture)`, first match wins.
static CPU_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(r"(?i)\b(?:x86_64|x64|win64|wow64|amd64)\b").expect("static pattern"),
            "amd64",
        ),
        (
            Regex::new(r"(?i)\b(?:aarch64|arm64)\b").expect("static pattern"),
            "arm64",
        ),
        (
            Regex::new(r"(?i)\barm(?:v\d+\w*)?\b").expect("static pattern"),
            "arm",
        ),
        (
            Regex::new(r"(?i)\b(?:i[3-6]86|x86)\b").expect("static pattern"),
            "ia32",
        ),
    ]
});

/// Android model prefixes and the vendor they belong to.
const MODEL_VENDORS: &[(&str, &str)] = &[
    ("SM-", "Samsung"),
    ("GT-", "Samsung"),
    ("Pixel", "Google"),
    ("Nexus", "Google"),
    ("Redmi", "Xiaomi"),
    ("Mi ", "Xiaomi"),
    ("POCO", "Xiaomi"),
    ("HUAWEI", "Huawei"),
    ("ONEPLUS", "OnePlus"),
    ("moto", "Motorola"),
    ("LM-", "LG"),
    ("CPH", "OPPO"),
    ("Nokia", "Nokia"),
];

/// Parses `ua` with the regex tables.
pub fn parse(ua: &str) -> UaParse {
    let mut out = UaParse::default();
    if ua.trim().is_empty() {
        return out;
    }

    if let Some((name, version)) = parse_browser(ua) {
        out.browser_name = Some(name);
        out.browser_version = version;
    }
    if let Some((name, version)) = parse_os(ua) {
        out.os_name = Some(name.to_string());
        out.os_version = version;
    }
    let (device_type, vendor, model) = parse_device(ua);
    out.device_type = device_type.map(str::to_string);
    out.device_vendor = vendor;
    out.device_model = model;
    if let Some((name, version)) = parse_engine(ua) {
        out.engine_name = Some(name.to_string());
        out.engine_version = version;
    }
    out.cpu_architecture = CPU_RULES
        .iter()
        .find(|(re, _)| re.is_match(ua))
        .map(|(_, arch)| arch.to_string());

    out
}

fn parse_browser(ua: &str) -> Option<(String, Option<String>)> {
    BROWSER_RULES.iter().find_map(|rule| {
        let caps = rule.re.captures(ua)?;
        let name = match rule.name {
            Some(name) => name.to_string(),
            None => pretty_family(caps.get(1)?.as_str()),
        };
        let version = caps.get(rule.version_group).map(|m| m.as_str().to_string());
        Some((name, version))
    })
}

fn pretty_family(raw: &str) -> String {
    match raw.to_ascii_lowercase().as_str() {
        "googlebot" => "Googlebot".into(),
        "bingbot" => "Bingbot".into(),
        "baiduspider" => "Baiduspider".into(),
        "yandexbot" => "YandexBot".into(),
        "duckduckbot" => "DuckDuckBot".into(),
        "slurp" => "Yahoo! Slurp".into(),
        "facebookexternalhit" => "Facebook".into(),
        "twitterbot" => "Twitterbot".into(),
        "applebot" => "Applebot".into(),
        "curl" => "curl".into(),
        "wget" => "Wget".into(),
        "python-requests" => "Python Requests".into(),
        "go-http-client" => "Go HTTP Client".into(),
        "okhttp" => "OkHttp".into(),
        _ => raw.to_string(),
    }
}

fn parse_os(ua: &str) -> Option<(&'static str, Option<String>)> {
    if let Some(caps) = WINDOWS_PHONE.captures(ua) {
        return Some(("Windows Phone", caps.get(1).map(|m| m.as_str().to_string())));
    }
    if let Some(caps) = WINDOWS_NT.captures(ua) {
        let nt = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        return Some(("Windows", Some(windows_release(nt).to_string())));
    }
    if let Some(caps) = IOS.captures(ua) {
        return Some(("iOS", Some(join_version(&caps))));
    }
    if let Some(caps) = ANDROID.captures(ua) {
        return Some(("Android", caps.get(1).map(|m| m.as_str().to_string())));
    }
    if let Some(caps) = CROS.captures(ua) {
        return Some(("Chrome OS", caps.get(1).map(|m| m.as_str().to_string())));
    }
    if let Some(caps) = MAC_OS.captures(ua) {
        return Some(("macOS", Some(join_version(&caps))));
    }
    if ua.contains("Ubuntu") {
        return Some(("Ubuntu", None));
    }
    if ua.contains("Fedora") {
        return Some(("Fedora", None));
    }
    if ua.contains("Linux") {
        return Some(("Linux", None));
    }
    None
}

/// Marketing name for a Windows NT kernel version.
fn windows_release(nt: &str) -> &str {
    match nt {
        "10.0" => "10",
        "6.3" => "8.1",
        "6.2" => "8",
        "6.1" => "7",
        "6.0" => "Vista",
        "5.1" | "5.2" => "XP",
        other => other,
    }
}

fn join_version(caps: &regex::Captures<'_>) -> String {
    caps.iter()
        .skip(1)
        .flatten()
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(".")
}

fn parse_device(ua: &str) -> (Option<&'static str>, Option<String>, Option<String>) {
    let apple = |model: &str| Some("Apple".to_string()).zip(Some(model.to_string()));

    if ua.contains("iPad") {
        let (v, m) = apple("iPad").unzip();
        return (Some("tablet"), v, m);
    }
    if ua.contains("iPod") {
        let (v, m) = apple("iPod touch").unzip();
        return (Some("mobile"), v, m);
    }
    if ua.contains("iPhone") {
        let (v, m) = apple("iPhone").unzip();
        return (Some("mobile"), v, m);
    }
    if TV.is_match(ua) {
        return (Some("smarttv"), None, None);
    }
    if CONSOLE.is_match(ua) {
        return (Some("console"), None, None);
    }
    if ua.contains("Android") {
        let model = ANDROID_MODEL_BUILD
            .captures(ua)
            .or_else(|| ANDROID_MODEL_REDUCED.captures(ua))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            // Chrome's reduced UA replaces the model with a single "K"
            .filter(|m| m != "K" && !m.is_empty());
        let vendor = model.as_deref().and_then(vendor_for_model);
        let device_type = if ua.contains("Mobile") {
            "mobile"
        } else {
            "tablet"
        };
        return (Some(device_type), vendor, model);
    }
    if ua.contains("Macintosh") {
        let (v, m) = apple("Macintosh").unzip();
        return (Some("desktop"), v, m);
    }
    if ua.contains("Windows NT") || ua.contains("X11") || ua.contains("CrOS") {
        return (Some("desktop"), None, None);
    }
    (None, None, None)
}

fn vendor_for_model(model: &str) -> Option<String> {
    MODEL_VENDORS
        .iter()
        .find(|(prefix, _)| model.starts_with(prefix))
        .map(|(_, vendor)| vendor.to_string())
}

fn parse_engine(ua: &str) -> Option<(&'static str, Option<String>)> {
    let version = |re: &Regex| {
        re.captures(ua)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    };

    if let Some(v) = version(&TRIDENT) {
        return Some(("Trident", Some(v)));
    }
    if let Some(v) = version(&EDGE_HTML) {
        return Some(("EdgeHTML", Some(v)));
    }
    if let Some(v) = version(&PRESTO) {
        return Some(("Presto", Some(v)));
    }
    if ua.contains("AppleWebKit") {
        if let Some(v) = version(&BLINK) {
            return Some(("Blink", Some(v)));
        }
        return Some(("WebKit", version(&WEBKIT)));
    }
    if let Some(v) = version(&GECKO) {
        return Some(("Gecko", Some(v)));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_WIN: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";
    const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1.2 Mobile/15E148 Safari/604.1";
    const FIREFOX_LINUX: &str =
        "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";
    const SAMSUNG: &str = "Mozilla/5.0 (Linux; Android 13; SM-S918B) AppleWebKit/537.36 (KHTML, like Gecko) SamsungBrowser/23.0 Chrome/115.0.0.0 Mobile Safari/537.36";

    #[test]
    fn test_chrome_on_windows() {
        let p = parse(CHROME_WIN);
        assert_eq!(p.browser_name.as_deref(), Some("Chrome"));
        assert_eq!(p.browser_version.as_deref(), Some("131.0.0.0"));
        assert_eq!(p.os_name.as_deref(), Some("Windows"));
        assert_eq!(p.os_version.as_deref(), Some("10"));
        assert_eq!(p.device_type.as_deref(), Some("desktop"));
        assert_eq!(p.engine_name.as_deref(), Some("Blink"));
        assert_eq!(p.cpu_architecture.as_deref(), Some("amd64"));
    }

    #[test]
    fn test_safari_on_iphone() {
        let p = parse(SAFARI_IPHONE);
        assert_eq!(p.browser_name.as_deref(), Some("Safari"));
        assert_eq!(p.browser_version.as_deref(), Some("17.1.2"));
        assert_eq!(p.os_name.as_deref(), Some("iOS"));
        assert_eq!(p.os_version.as_deref(), Some("17.1.2"));
        assert_eq!(p.device_vendor.as_deref(), Some("Apple"));
        assert_eq!(p.device_model.as_deref(), Some("iPhone"));
        assert_eq!(p.engine_name.as_deref(), Some("WebKit"));
    }

    #[test]
    fn test_firefox_on_ubuntu() {
        let p = parse(FIREFOX_LINUX);
        assert_eq!(p.browser_name.as_deref(), Some("Firefox"));
        assert_eq!(p.os_name.as_deref(), Some("Ubuntu"));
        assert_eq!(p.engine_name.as_deref(), Some("Gecko"));
        assert_eq!(p.engine_version.as_deref(), Some("121.0"));
    }

    #[test]
    fn test_samsung_browser_beats_chrome_token() {
        let p = parse(SAMSUNG);
        assert_eq!(p.browser_name.as_deref(), Some("Samsung Internet"));
        assert_eq!(p.os_version.as_deref(), Some("13"));
        assert_eq!(p.device_model.as_deref(), Some("SM-S918B"));
        assert_eq!(p.device_vendor.as_deref(), Some("Samsung"));
        assert_eq!(p.device_type.as_deref(), Some("mobile"));
    }

    #[test]
    fn test_edge_and_bot() {
        let edge = parse("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.2210.91");
        assert_eq!(edge.browser_name.as_deref(), Some("Edge"));
        assert_eq!(edge.browser_version.as_deref(), Some("120.0.2210.91"));

        let bot = parse("Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)");
        assert_eq!(bot.browser_name.as_deref(), Some("Googlebot"));
        assert_eq!(bot.browser_version.as_deref(), Some("2.1"));
    }

    #[test]
    fn test_reduced_android_model_is_dropped() {
        let p = parse("Mozilla/5.0 (Linux; Android 10; K) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36");
        assert_eq!(p.device_model, None);
        assert_eq!(p.device_type.as_deref(), Some("mobile"));
    }

    #[test]
    fn test_empty_user_agent() {
        assert_eq!(parse(""), UaParse::default());
    }
}
