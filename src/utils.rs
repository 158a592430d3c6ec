//! Small string helpers shared by the analyzer and the alert renderer.

use url::Url;

/// Truncate a string for logging purposes.
///
/// Cuts on a character boundary at or below `max` bytes and appends an
/// ellipsis with the number of bytes dropped.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Host part of a URL, e.g. `"https://maratondemendoza.com/2026/"` -> `"maratondemendoza.com"`.
///
/// Falls back to the input when it does not parse or has no host.
pub fn host_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}
