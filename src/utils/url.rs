//! URL encoding and rule-URL rewriting utilities

use chrono::{DateTime, Datelike, TimeZone};

/// Host prefix of raw GitHub content, which is routed through the configured proxy
pub const RAW_GITHUB_PREFIX: &str = "https://raw.githubusercontent.com";

/// Encodes a string using URL encoding (`%20` for spaces)
///
/// # Examples
/// ```
/// use subsave::utils::url::url_encode;
///
/// let encoded = url_encode("Hello World!");
/// assert_eq!(encoded, "Hello%20World%21");
/// ```
pub fn url_encode(input: &str) -> String {
    urlencoding::encode(input).into_owned()
}

/// Escapes a string for use in a query component or fragment (`+` for spaces)
///
/// Only ASCII letters, digits and `-_.~` are left as they are.
///
/// # Examples
/// ```
/// use subsave::utils::url::query_escape;
///
/// assert_eq!(query_escape("HK Node/01"), "HK+Node%2F01");
/// ```
pub fn query_escape(input: &str) -> String {
    // every `%` in the output starts an escape, so `%20` can only be a space
    urlencoding::encode(input).replace("%20", "+")
}

/// Substitutes the date placeholders `{Y}`, `{m}`, `{d}`, `{Ymd}`, `{Y_m_d}`
/// and `{Y-m-d}` with the given instant.
pub fn format_time_placeholders<Tz: TimeZone>(url: &str, now: &DateTime<Tz>) -> String {
    let (y, m, d) = (now.year(), now.month(), now.day());
    url.replace("{Y}", &format!("{:04}", y))
        .replace("{m}", &format!("{:02}", m))
        .replace("{d}", &format!("{:02}", d))
        .replace("{Ymd}", &format!("{:04}{:02}{:02}", y, m, d))
        .replace("{Y_m_d}", &format!("{:04}_{:02}_{:02}", y, m, d))
        .replace("{Y-m-d}", &format!("{:04}-{:02}-{:02}", y, m, d))
}

/// Expands time placeholders and prepends `github_proxy` to raw GitHub URLs.
pub fn warp_url<Tz: TimeZone>(url: &str, github_proxy: &str, now: &DateTime<Tz>) -> String {
    let url = format_time_placeholders(url, now);
    if url.starts_with(RAW_GITHUB_PREFIX) {
        return format!("{}{}", github_proxy, url);
    }
    url
}
