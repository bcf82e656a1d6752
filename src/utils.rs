//! Small helpers for URL handling and log output

/// Maximum number of response-body bytes echoed into log events
pub const LOG_BODY_LIMIT: usize = 256;

/// Remove every trailing `/` from a base URL.
///
/// # Example
/// ```
/// use expensevista_client::utils::trim_trailing_slashes;
///
/// assert_eq!(trim_trailing_slashes("https://api.example.com//"), "https://api.example.com");
/// ```
#[must_use]
pub fn trim_trailing_slashes(url: &str) -> &str {
    url.trim_end_matches('/')
}

/// Join a base URL and a request path with exactly one `/` between them.
///
/// # Example
/// ```
/// use expensevista_client::utils::join_url;
///
/// assert_eq!(join_url("https://api.example.com/", "/transactions"), "https://api.example.com/transactions");
/// assert_eq!(join_url("https://api.example.com", "//transfer/resolve"), "https://api.example.com/transfer/resolve");
/// ```
#[must_use]
pub fn join_url(base: &str, path: &str) -> String {
    let base = trim_trailing_slashes(base);
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{path}")
    }
}

/// Safely truncate a string at a UTF-8 character boundary.
///
/// Returns a slice of at most `max_bytes` bytes.
#[inline]
#[must_use]
pub fn safe_truncate(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }

    let mut boundary = max_bytes;
    while boundary > 0 && !s.is_char_boundary(boundary) {
        boundary -= 1;
    }

    &s[..boundary]
}

/// Render a response body for a log line, truncated with an ellipsis.
#[must_use]
pub fn body_for_log(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let truncated = safe_truncate(&text, LOG_BODY_LIMIT);
    if truncated.len() < text.len() {
        format!("{truncated}...")
    } else {
        truncated.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_trailing_slashes() {
        assert_eq!(trim_trailing_slashes("http://x/"), "http://x");
        assert_eq!(trim_trailing_slashes("http://x///"), "http://x");
        assert_eq!(trim_trailing_slashes("http://x"), "http://x");
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://x", "a/b"), "http://x/a/b");
        assert_eq!(join_url("http://x/", "/a"), "http://x/a");
        assert_eq!(join_url("http://x", ""), "http://x");
    }

    #[test]
    fn test_safe_truncate_multibyte() {
        // 'é' is 2 bytes in UTF-8
        let text = "Café";
        assert_eq!(safe_truncate(text, 4), "Caf");
        assert_eq!(safe_truncate(text, 5), "Café");
    }

    #[test]
    fn test_body_for_log() {
        assert_eq!(body_for_log(b"short"), "short");

        let long = "a".repeat(LOG_BODY_LIMIT + 10);
        let rendered = body_for_log(long.as_bytes());
        assert!(rendered.ends_with("..."));
        assert_eq!(rendered.len(), LOG_BODY_LIMIT + 3);
    }
}
