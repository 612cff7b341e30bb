//! Content-addressed cache entry keys.

use sha2::{Digest, Sha256};

/// Compute the entry key for a request identity.
///
/// Request identity is method + canonical URL; only GET requests are ever
/// stored, but the method participates in the key so the identity is
/// self-describing.
pub fn compute_entry_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_stability() {
        let key1 = compute_entry_key("GET", "https://example.com/");
        let key2 = compute_entry_key("GET", "https://example.com/");
        assert_eq!(key1, key2);
    }

    #[test]
    fn test_key_different_url() {
        let key1 = compute_entry_key("GET", "https://example.com/papers");
        let key2 = compute_entry_key("GET", "https://example.com/learn");
        assert_ne!(key1, key2);
    }

    #[test]
    fn test_key_different_method() {
        let get = compute_entry_key("GET", "https://example.com/");
        let head = compute_entry_key("HEAD", "https://example.com/");
        assert_ne!(get, head);
    }

    #[test]
    fn test_key_format() {
        let key = compute_entry_key("GET", "https://example.com/");
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
