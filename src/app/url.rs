//! URL input handling.

use log::warn;

use crate::config::MAX_URL_LENGTH;

/// Validates and normalizes a URL given on the command line or in a URL file.
///
/// Bare hosts get an `https://` prefix. URLs longer than `MAX_URL_LENGTH`,
/// unparseable URLs, URLs without a host and non-http(s) schemes are rejected
/// with a warning.
pub fn validate_and_normalize_url(url: &str) -> Option<String> {
    let url = url.trim();
    let normalized = if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else if url.contains("://") {
        warn!("Skipping unsupported scheme for URL: {}", url);
        return None;
    } else {
        format!("https://{url}")
    };

    if normalized.chars().count() > MAX_URL_LENGTH {
        let head: String = normalized.chars().take(50).collect();
        warn!(
            "Skipping URL exceeding maximum length ({} chars): {}...",
            MAX_URL_LENGTH, head
        );
        return None;
    }

    match url::Url::parse(&normalized) {
        Ok(parsed) if parsed.host_str().is_some_and(|host| !host.is_empty()) => Some(normalized),
        Ok(_) => {
            warn!("Skipping URL without a host: {}", url);
            None
        }
        Err(e) => {
            warn!("Skipping invalid URL {}: {}", url, e);
            None
        }
    }
}

/// Extracts candidate URLs from URL-file text: one per line, blank lines and
/// `#` comments skipped.
pub fn read_url_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adds_https_to_bare_host() {
        assert_eq!(
            validate_and_normalize_url("example.com"),
            Some("https://example.com".to_string())
        );
        assert_eq!(
            validate_and_normalize_url("  example.com/path?q=1  "),
            Some("https://example.com/path?q=1".to_string())
        );
    }

    #[test]
    fn test_preserves_http_and_https() {
        assert_eq!(
            validate_and_normalize_url("http://1.2.3.4/login"),
            Some("http://1.2.3.4/login".to_string())
        );
        assert_eq!(
            validate_and_normalize_url("https://example.com:8443"),
            Some("https://example.com:8443".to_string())
        );
    }

    #[test]
    fn test_rejects_other_schemes() {
        assert_eq!(validate_and_normalize_url("ftp://example.com"), None);
        assert_eq!(validate_and_normalize_url("file:///etc/passwd"), None);
    }

    #[test]
    fn test_rejects_invalid() {
        assert_eq!(validate_and_normalize_url("not a valid url!!!"), None);
        assert_eq!(validate_and_normalize_url(""), None);
    }

    #[test]
    fn test_rejects_overlong() {
        let long = format!("https://example.com/{}", "a".repeat(MAX_URL_LENGTH));
        assert_eq!(validate_and_normalize_url(&long), None);

        let fits = format!("https://example.com/{}", "a".repeat(100));
        assert_eq!(validate_and_normalize_url(&fits), Some(fits.clone()));
    }

    #[test]
    fn test_read_url_lines() {
        let text = "# suspicious links\nexample.com\n\n  https://login.example.net/  \n#skip\n";
        assert_eq!(
            read_url_lines(text),
            vec!["example.com", "https://login.example.net/"]
        );
    }
}
