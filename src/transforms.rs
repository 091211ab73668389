//! Value transforms shared by the built-in rule tables
//!
//! - URL absolutization against the document URL
//! - Provider (site) name derivation from a host
//! - Comma splitting for keyword lists
//! - Primary language subtag

use tracing::warn;
use url::Url;

/// Resolve a possibly relative URL against `base`.
///
/// Falls back to `relative` when the base is not a valid absolute URL and
/// `relative` cannot stand on its own either.
pub fn make_url_absolute(base: &str, relative: &str) -> String {
    match Url::parse(base) {
        Ok(base_url) => match base_url.join(relative) {
            Ok(resolved) => resolved.to_string(),
            Err(e) => {
                warn!("Failed to resolve '{}' against '{}': {}", relative, base, e);
                relative.to_string()
            }
        },
        Err(e) => {
            warn!("Invalid base URL '{}': {}", base, e);
            Url::parse(relative)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| relative.to_string())
        }
    }
}

/// Turn a host name into a readable site name.
///
/// `www.example.co.uk` becomes `example`, `blog.example.com` becomes
/// `blog example`.
pub fn derive_provider_name(host: &str) -> String {
    let host = strip_www_label(host);
    let host = host.replacen(".co.", ".", 1);

    let labels: Vec<&str> = host.split('.').collect();
    match labels.split_last() {
        Some((_tld, rest)) => rest.join(" "),
        None => String::new(),
    }
}

/// Drop a leading `www`, `www2`, `wwwfoo`... label
fn strip_www_label(host: &str) -> &str {
    let Some(dot) = host.find('.') else {
        return host;
    };
    let label = &host[..dot];
    match label.strip_prefix("www") {
        Some(suffix) if suffix.chars().all(|c| c.is_ascii_alphanumeric()) => &host[dot + 1..],
        _ => host,
    }
}

/// Provider name for the host of `url`, empty when the URL has no host
pub fn provider_from_url(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(derive_provider_name))
        .unwrap_or_default()
}

/// Split a comma separated list, trimming items and dropping empty ones
pub fn split_commas(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

/// Primary subtag of a language tag (`en-US` -> `en`)
pub fn primary_language(tag: &str) -> String {
    tag.trim().split('-').next().unwrap_or_default().to_string()
}
