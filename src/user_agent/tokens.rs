//! Token parser: splits the user agent into product tokens (`Name/version`)
//! and parenthesized comment tokens, then interprets them.
//!
//! Deliberately independent of the grammar tables so the two strategies
//! disagree in useful ways.

use super::types::UaParse;

#[derive(Debug, PartialEq, Eq)]
enum Token<'a> {
    Product {
        name: &'a str,
        version: Option<&'a str>,
    },
    /// One parenthesized group, already split on `;`
    Comment(Vec<&'a str>),
}

/// Product names that every modern browser sends and that identify nothing.
const GENERIC_PRODUCTS: &[&str] = &[
    "Mozilla",
    "AppleWebKit",
    "KHTML,",
    "like",
    "Gecko",
    "Safari",
    "Mobile",
    "Version",
    "Build",
];

/// Product token name -> display family.
const PRODUCT_FAMILIES: &[(&str, &str)] = &[
    ("Edg", "Edge"),
    ("EdgA", "Edge"),
    ("EdgiOS", "Edge"),
    ("Edge", "Edge"),
    ("OPR", "Opera"),
    ("CriOS", "Chrome"),
    ("FxiOS", "Firefox"),
    ("SamsungBrowser", "Samsung Internet"),
    ("YaBrowser", "Yandex"),
    ("Chromium", "Chrome"),
];

/// Case-insensitive keyword -> vendor, checked against comment text.
const VENDOR_KEYWORDS: &[(&str, &str)] = &[
    ("samsung", "Samsung"),
    ("sm-", "Samsung"),
    ("pixel", "Google"),
    ("nexus", "Google"),
    ("xiaomi", "Xiaomi"),
    ("redmi", "Xiaomi"),
    ("huawei", "Huawei"),
    ("oneplus", "OnePlus"),
    ("motorola", "Motorola"),
    ("iphone", "Apple"),
    ("ipad", "Apple"),
    ("macintosh", "Apple"),
];

fn tokenize(ua: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = ua.trim();

    while !rest.is_empty() {
        if let Some(inner) = rest.strip_prefix('(') {
            let end = inner.find(')').unwrap_or(inner.len());
            let parts = inner[..end]
                .split(';')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .collect();
            tokens.push(Token::Comment(parts));
            rest = inner.get(end + 1..).unwrap_or("").trim_start();
            continue;
        }

        let end = rest
            .find(|c: char| c.is_whitespace() || c == '(')
            .unwrap_or(rest.len());
        let word = &rest[..end];
        let (name, version) = match word.split_once('/') {
            Some((name, version)) => (name, Some(version).filter(|v| !v.is_empty())),
            None => (word, None),
        };
        if !name.is_empty() {
            tokens.push(Token::Product { name, version });
        }
        rest = rest[end..].trim_start();
    }

    tokens
}

/// Parses `ua` from its product and comment tokens.
pub fn parse(ua: &str) -> UaParse {
    let mut out = UaParse::default();
    let tokens = tokenize(ua);
    if tokens.is_empty() {
        return out;
    }

    let products: Vec<(&str, Option<&str>)> = tokens
        .iter()
        .filter_map(|t| match t {
            Token::Product { name, version } => Some((*name, *version)),
            Token::Comment(_) => None,
        })
        .collect();
    let comments: Vec<&str> = tokens
        .iter()
        .filter_map(|t| match t {
            Token::Comment(parts) => Some(parts.as_slice()),
            Token::Product { .. } => None,
        })
        .flatten()
        .copied()
        .collect();
    let comment_text = comments.join("; ").to_lowercase();

    let bot = products
        .iter()
        .map(|(name, version)| (*name, *version))
        .chain(comments.iter().map(|c| match c.split_once('/') {
            Some((name, version)) => (name, Some(version)),
            None => (*c, None),
        }))
        .find(|(name, _)| {
            let lower = name.to_lowercase();
            lower.contains("bot") || lower.contains("spider") || lower.contains("crawler")
        });

    if let Some((name, version)) = bot {
        out.browser_name = Some(name.trim().to_string());
        out.browser_version = version.map(str::to_string);
        out.device_type = Some("bot".to_string());
    } else if let Some((name, version)) = browser_product(&products) {
        out.browser_name = Some(name);
        out.browser_version = version;
    }

    if let Some((name, version)) = os_from_comments(&comments) {
        out.os_name = Some(name.to_string());
        out.os_version = version;
    }

    if out.device_type.is_none() {
        out.device_type = device_type(&products, &comment_text).map(str::to_string);
    }
    out.device_vendor = VENDOR_KEYWORDS
        .iter()
        .find(|(keyword, _)| comment_text.contains(keyword))
        .map(|(_, vendor)| vendor.to_string());
    out.device_model = android_model(&comments);

    if let Some((name, version)) = engine(&products, &comments) {
        out.engine_name = Some(name.to_string());
        out.engine_version = version;
    }
    out.cpu_architecture = cpu(&comment_text).map(str::to_string);

    out
}

fn browser_product(products: &[(&str, Option<&str>)]) -> Option<(String, Option<String>)> {
    // The most specific product is the last non-generic one: Chromium
    // derivatives append their own token after `Chrome/ Safari/`.
    let specific = products
        .iter()
        .rev()
        .find(|(name, version)| version.is_some() && !GENERIC_PRODUCTS.contains(name));

    if let Some((name, version)) = specific {
        let family = PRODUCT_FAMILIES
            .iter()
            .find(|(token, _)| token == name)
            .map(|(_, family)| family.to_string())
            .unwrap_or_else(|| name.to_string());
        return Some((family, version.map(str::to_string)));
    }

    let has = |wanted: &str| products.iter().find(|(name, _)| *name == wanted);
    match (has("Safari"), has("Version")) {
        (Some(_), Some((_, version))) => Some(("Safari".to_string(), version.map(str::to_string))),
        _ => None,
    }
}

fn os_from_comments(comments: &[&str]) -> Option<(&'static str, Option<String>)> {
    for part in comments {
        if let Some(v) = part.strip_prefix("Windows NT ") {
            return Some(("Windows", Some(v.trim().to_string())));
        }
        if let Some(v) = part.strip_prefix("Android") {
            let v = v.trim();
            return Some(("Android", (!v.is_empty()).then(|| v.to_string())));
        }
        if part.starts_with("CrOS") {
            let version = part.split_whitespace().nth(2).map(str::to_string);
            return Some(("Chrome OS", version));
        }
        if let Some(idx) = part.find(" OS ") {
            if part.contains("like Mac OS X") {
                let version = part[idx + 4..]
                    .split_whitespace()
                    .next()
                    .map(|v| v.replace('_', "."));
                return Some(("iOS", version));
            }
        }
        if let Some(v) = part.strip_prefix("Intel Mac OS X ") {
            return Some(("Mac OS", Some(v.trim().replace('_', "."))));
        }
    }
    if comments.iter().any(|p| p.contains("Linux")) {
        return Some(("Linux", None));
    }
    None
}

fn device_type(products: &[(&str, Option<&str>)], comment_text: &str) -> Option<&'static str> {
    let mobile_product = products.iter().any(|(name, _)| *name == "Mobile");

    if comment_text.contains("tablet") || comment_text.contains("ipad") {
        Some("tablet")
    } else if comment_text.contains("iphone") || comment_text.contains("ipod") {
        Some("mobile")
    } else if comment_text.contains("xbox")
        || comment_text.contains("playstation")
        || comment_text.contains("nintendo")
    {
        Some("console")
    } else if comment_text.contains("smart-tv") || comment_text.contains("smarttv") {
        Some("smarttv")
    } else if comment_text.contains("android") {
        Some(if mobile_product { "mobile" } else { "tablet" })
    } else if comment_text.contains("windows nt")
        || comment_text.contains("macintosh")
        || comment_text.contains("x11")
        || comment_text.contains("cros ")
    {
        Some("desktop")
    } else {
        None
    }
}

/// The comment segment after `Android x`, minus any ` Build/...` suffix.
fn android_model(comments: &[&str]) -> Option<String> {
    let idx = comments.iter().position(|p| p.starts_with("Android"))?;
    comments[idx + 1..]
        .iter()
        // locale segments such as `en-us`
        .find(|p| !(p.len() == 5 && p.as_bytes()[2] == b'-'))
        .map(|p| p.split(" Build/").next().unwrap_or(*p).trim().to_string())
        .filter(|m| !m.is_empty() && m != "K" && m != "wv")
}

fn engine(products: &[(&str, Option<&str>)], comments: &[&str]) -> Option<(&'static str, Option<String>)> {
    if let Some(v) = comments.iter().find_map(|p| p.strip_prefix("Trident/")) {
        return Some(("Trident", Some(v.to_string())));
    }
    let version_of = |wanted: &str| {
        products
            .iter()
            .find(|(name, _)| *name == wanted)
            .map(|(_, version)| version.map(str::to_string))
    };
    if let Some(v) = version_of("Presto") {
        return Some(("Presto", v));
    }
    if let Some(v) = version_of("AppleWebKit") {
        return Some(("WebKit", v));
    }
    if version_of("Gecko").is_some() {
        let rv = comments
            .iter()
            .find_map(|p| p.strip_prefix("rv:"))
            .map(str::to_string);
        return Some(("Gecko", rv));
    }
    None
}

fn cpu(comment_text: &str) -> Option<&'static str> {
    let has = |needle: &str| comment_text.contains(needle);
    if has("win64") || has("wow64") || has("x86_64") || has("x64") || has("amd64") {
        Some("amd64")
    } else if has("aarch64") || has("arm64") {
        Some("arm64")
    } else if has("armv") || has("arm;") {
        Some("arm")
    } else if has("i686") || has("i386") || has("x86") {
        Some("ia32")
    } else {
        None
    }
}
