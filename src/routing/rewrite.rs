//! Path rewriting for matched routes.
//!
//! Applies a single anchored prefix substitution: the portion of the path
//! equal to the route prefix is replaced by the route's replacement string
//! ("" in the observed configuration, i.e. strip the prefix entirely).
//! The query string is not part of the path; the forwarder re-appends it
//! untouched when it assembles the upstream URI.

/// Rewrite `path` by substituting `prefix` with `replacement`.
///
/// An empty result becomes "/", and the result always begins with "/" so it
/// stays a valid origin-form path even for prefix matches that fall inside a
/// segment.
pub fn rewrite_path(path: &str, prefix: &str, replacement: &str) -> String {
    let rest = path.strip_prefix(prefix).unwrap_or(path);
    let rewritten = format!("{}{}", replacement, rest);

    if rewritten.is_empty() {
        "/".to_string()
    } else if !rewritten.starts_with('/') {
        format!("/{}", rewritten)
    } else {
        rewritten
    }
}
