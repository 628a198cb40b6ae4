//! Destination URL normalization.
//!
//! Accepts what people paste into a shortener (`example.com/path`,
//! `HTTPS://Example.COM:443/`) and turns it into a canonical absolute
//! http(s) URL.

use url::Url;

/// Errors that can occur during URL normalization.
#[derive(Debug, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("URL must not be empty")]
    Empty,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL must include a host")]
    MissingHost,

    #[error("Failed to normalize URL: {0}")]
    NormalizationFailed(String),
}

/// Normalizes a destination URL to a canonical form.
///
/// # Normalization Rules
///
/// 1. **Whitespace**: Leading and trailing whitespace is trimmed
/// 2. **Scheme**: `https://` is prepended when no scheme is given
/// 3. **Protocol**: Only HTTP and HTTPS are allowed
/// 4. **Hostname**: Converted to lowercase
/// 5. **Default ports**: Removed (80 for HTTP, 443 for HTTPS)
/// 6. **Path, query, fragment**: Preserved as-is
///
/// `host:port` inputs such as `localhost:3000/x` are treated as scheme-less.
///
/// # Errors
///
/// Returns [`UrlNormalizationError::UnsupportedProtocol`] for `javascript:`,
/// `data:`, `mailto:`, `ftp://` and any other non-HTTP(S) scheme.
/// Returns [`UrlNormalizationError::InvalidFormat`] for anything the URL
/// parser rejects.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     normalize_url("example.com/very/long/path").unwrap(),
///     "https://example.com/very/long/path"
/// );
/// assert_eq!(
///     normalize_url("HTTP://EXAMPLE.COM:80/Path").unwrap(),
///     "http://example.com/Path"
/// );
/// ```
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(UrlNormalizationError::Empty);
    }

    let candidate = if has_explicit_scheme(input) {
        input.to_string()
    } else {
        format!("https://{input}")
    };

    let mut url =
        Url::parse(&candidate).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlNormalizationError::UnsupportedProtocol),
    }

    let Some(host) = url.host_str() else {
        return Err(UrlNormalizationError::MissingHost);
    };
    if host.is_empty() {
        return Err(UrlNormalizationError::MissingHost);
    }

    let host_lowercase = host.to_ascii_lowercase();
    url.set_host(Some(&host_lowercase)).map_err(|_| {
        UrlNormalizationError::NormalizationFailed("Failed to set normalized host".to_string())
    })?;

    let is_default_port = matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    );
    if is_default_port {
        url.set_port(None).map_err(|_| {
            UrlNormalizationError::NormalizationFailed("Failed to remove default port".to_string())
        })?;
    }

    Ok(url.to_string())
}

/// Returns true if `input` starts with a URL scheme.
///
/// Only the text before the first `:` is considered, and only when no `/`,
/// `?` or `#` precedes it, so a nested URL in a query or fragment is ignored.
/// `scheme://` always counts. An opaque `scheme:` (as in `mailto:`) counts
/// unless what follows the colon is a port number.
fn has_explicit_scheme(input: &str) -> bool {
    let Some((prefix, rest)) = input.split_once(':') else {
        return false;
    };
    if prefix.contains(['/', '?', '#']) {
        return false;
    }

    let mut chars = prefix.chars();
    let is_scheme = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !is_scheme {
        return false;
    }

    rest.starts_with("//") || !rest.starts_with(|c: char| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_prepends_https() {
        assert_eq!(
            normalize_url("example.com/very/long/path").unwrap(),
            "https://example.com/very/long/path"
        );
        assert_eq!(normalize_url("example.com").unwrap(), "https://example.com/");
        assert_eq!(
            normalize_url("example.com/login?next=https://example.com/home").unwrap(),
            "https://example.com/login?next=https://example.com/home"
        );
    }

    #[test]
    fn test_normalize_scheme_less_with_query_or_fragment() {
        assert_eq!(
            normalize_url("example.com?q=a:b").unwrap(),
            "https://example.com/?q=a:b"
        );
        assert_eq!(
            normalize_url("example.com/docs#section:2").unwrap(),
            "https://example.com/docs#section:2"
        );
        assert_eq!(
            normalize_url("Example.COM/r#https://other.example").unwrap(),
            "https://example.com/r#https://other.example"
        );
        assert_eq!(
            normalize_url("example.com:8080/a?b=c").unwrap(),
            "https://example.com:8080/a?b=c"
        );
    }

    #[test]
    fn test_normalize_keeps_explicit_http() {
        assert_eq!(
            normalize_url("http://example.com").unwrap(),
            "http://example.com/"
        );
    }

    #[test]
    fn test_normalize_trims_whitespace() {
        assert_eq!(
            normalize_url("  https://example.com/a  ").unwrap(),
            "https://example.com/a"
        );
    }

    #[test]
    fn test_normalize_uppercase_scheme_and_host() {
        assert_eq!(
            normalize_url("HTTPS://EXAMPLE.COM/Path").unwrap(),
            "https://example.com/Path"
        );
    }

    #[test]
    fn test_normalize_remove_default_ports() {
        assert_eq!(
            normalize_url("http://example.com:80/path").unwrap(),
            "http://example.com/path"
        );
        assert_eq!(
            normalize_url("https://example.com:443/path").unwrap(),
            "https://example.com/path"
        );
    }

    #[test]
    fn test_normalize_keep_custom_port() {
        assert_eq!(
            normalize_url("http://example.com:8080/path").unwrap(),
            "http://example.com:8080/path"
        );
    }

    #[test]
    fn test_normalize_host_port_without_scheme() {
        assert_eq!(
            normalize_url("localhost:3000/test").unwrap(),
            "https://localhost:3000/test"
        );
    }

    #[test]
    fn test_normalize_preserves_query_and_fragment() {
        assert_eq!(
            normalize_url("https://example.com/search?q=rust&lang=en#top").unwrap(),
            "https://example.com/search?q=rust&lang=en#top"
        );
    }

    #[test]
    fn test_normalize_encoded_characters() {
        let result = normalize_url("https://example.com/path%20with%20spaces").unwrap();
        assert!(result.contains("path%20with%20spaces"));
    }

    #[test]
    fn test_normalize_very_long_url() {
        let long_path = "a".repeat(2000);
        let result = normalize_url(&format!("example.com/{}", long_path)).unwrap();
        assert!(result.len() > 2000);
    }

    #[test]
    fn test_normalize_empty_string() {
        assert!(matches!(
            normalize_url("   ").unwrap_err(),
            UrlNormalizationError::Empty
        ));
    }

    #[test]
    fn test_normalize_invalid_url() {
        assert!(matches!(
            normalize_url("not a valid url").unwrap_err(),
            UrlNormalizationError::InvalidFormat(_)
        ));
    }

    #[test]
    fn test_normalize_rejects_other_protocols() {
        for input in [
            "ftp://example.com/file.txt",
            "file:///home/user/document.txt",
            "javascript:alert('xss')",
            "data:text/plain,Hello",
            "mailto:test@example.com",
        ] {
            assert!(
                matches!(
                    normalize_url(input).unwrap_err(),
                    UrlNormalizationError::UnsupportedProtocol
                ),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn test_has_explicit_scheme() {
        assert!(has_explicit_scheme("https://example.com"));
        assert!(has_explicit_scheme("mailto:someone@example.com"));
        assert!(!has_explicit_scheme("example.com"));
        assert!(!has_explicit_scheme("example.com:8080/x"));
        assert!(!has_explicit_scheme("localhost:3000"));
        assert!(!has_explicit_scheme("example.com/a?u=https://b.example"));
        assert!(!has_explicit_scheme("example.com#x:y"));
        assert!(!has_explicit_scheme("example.com?x=1:2"));
    }
}
