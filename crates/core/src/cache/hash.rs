//! Cache key hashing.

use sha2::{Digest, Sha256};

/// Compute the primary key for a cached `(url, category)` pair.
pub fn compute_cache_key(url: &str, category: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hasher.update(b"\n");
    hasher.update(category.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_stability() {
        let hash1 = compute_cache_key("https://example.com", "mobile");
        let hash2 = compute_cache_key("https://example.com", "mobile");
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_hash_different_category() {
        let mobile = compute_cache_key("https://example.com", "mobile");
        let desktop = compute_cache_key("https://example.com", "desktop");
        assert_ne!(mobile, desktop);
    }

    #[test]
    fn test_hash_separator_prevents_collisions() {
        let a = compute_cache_key("https://example.com/a", "bout");
        let b = compute_cache_key("https://example.com/", "about");
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_format() {
        let hash = compute_cache_key("https://example.com", "home");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
