//! Short code generation and validation utilities.
//!
//! Codes are drawn from OS randomness over a 64-symbol URL-safe alphabet, so
//! each symbol carries exactly six bits and no modulo bias is introduced.

use regex::Regex;
use std::sync::LazyLock;

/// URL-safe alphabet used for generated codes.
pub const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Default number of characters in a generated code.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Longest code accepted at lookup time.
pub const MAX_CODE_LENGTH: usize = 64;

/// Codes that collide with fixed routes and are never issued.
pub const RESERVED_CODES: &[&str] = &["health", "api", "admin"];

static CODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("code pattern is a valid regex")
});

/// Generates a random short code of `length` characters.
///
/// Reserved route names are skipped. Uniqueness is not checked here; the
/// store rejects duplicates and the caller retries.
///
/// # Errors
///
/// Returns the underlying error if the system random number generator fails.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code(6)?;
/// assert_eq!(code.len(), 6);
/// assert!(is_valid_code(&code));
/// ```
pub fn generate_code(length: usize) -> Result<String, getrandom::Error> {
    let mut buffer = vec![0u8; length];

    loop {
        getrandom::fill(&mut buffer)?;

        let code: String = buffer
            .iter()
            .map(|b| ALPHABET[usize::from(b & 63)] as char)
            .collect();

        if !is_reserved(&code) {
            return Ok(code);
        }
    }
}

/// Returns true if `code` names a fixed route.
pub fn is_reserved(code: &str) -> bool {
    RESERVED_CODES.contains(&code)
}

/// Syntactic check applied before a code reaches the store.
///
/// A code that fails this check cannot exist, so lookups can answer "not
/// found" without any I/O.
pub fn is_valid_code(code: &str) -> bool {
    CODE_PATTERN.is_match(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_code_has_requested_length() {
        for length in [4, 6, 12, 32] {
            let code = generate_code(length).unwrap();
            assert_eq!(code.len(), length);
        }
    }

    #[test]
    fn test_generate_code_uses_alphabet() {
        let code = generate_code(DEFAULT_CODE_LENGTH).unwrap();
        assert!(code.bytes().all(|b| ALPHABET.contains(&b)));
        assert!(is_valid_code(&code));
    }

    #[test]
    fn test_generate_code_produces_unique_codes() {
        let mut codes = HashSet::new();

        for _ in 0..1000 {
            codes.insert(generate_code(DEFAULT_CODE_LENGTH).unwrap());
        }

        assert_eq!(codes.len(), 1000);
    }

    #[test]
    fn test_generate_code_covers_alphabet() {
        let mut seen = HashSet::new();
        for _ in 0..500 {
            seen.extend(generate_code(DEFAULT_CODE_LENGTH).unwrap().bytes());
        }

        assert_eq!(seen.len(), ALPHABET.len());
    }

    #[test]
    fn test_reserved_codes() {
        for &reserved in RESERVED_CODES {
            assert!(is_reserved(reserved), "'{}' should be reserved", reserved);
        }
        assert!(!is_reserved("aZ3x9Q"));
        assert!(!is_reserved("Health"));
    }

    #[test]
    fn test_is_valid_code() {
        assert!(is_valid_code("aZ3x9Q"));
        assert!(is_valid_code("a"));
        assert!(is_valid_code("with-dash_and_underscore"));
        assert!(is_valid_code(&"x".repeat(MAX_CODE_LENGTH)));
    }

    #[test]
    fn test_is_valid_code_rejects_bad_input() {
        assert!(!is_valid_code(""));
        assert!(!is_valid_code(&"x".repeat(MAX_CODE_LENGTH + 1)));
        assert!(!is_valid_code("has space"));
        assert!(!is_valid_code("dot.dot"));
        assert!(!is_valid_code("slash/"));
        assert!(!is_valid_code("ünïcode"));
        assert!(!is_valid_code("abc\n"));
    }
}
