//! Request identity keys for cache entries.

use sha2::{Digest, Sha256};
use url::Url;

/// Compute the cache key for a request.
///
/// The key covers the upper-cased method and the URL without its fragment,
/// so `/page#top` and `/page` share an entry.
pub fn compute_cache_key(method: &str, url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);

    let mut hasher = Sha256::new();
    hasher.update(method.to_ascii_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_str().as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_hash_stability() {
        let hash1 = compute_cache_key("GET", &url("http://localhost:5000/static/style.css"));
        let hash2 = compute_cache_key("get", &url("http://localhost:5000/static/style.css"));
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_hash_ignores_fragment() {
        let plain = compute_cache_key("GET", &url("http://localhost:5000/"));
        let fragment = compute_cache_key("GET", &url("http://localhost:5000/#main"));
        assert_eq!(plain, fragment);
    }

    #[test]
    fn test_hash_keeps_query() {
        let plain = compute_cache_key("GET", &url("http://localhost:5000/static/style.css"));
        let query = compute_cache_key("GET", &url("http://localhost:5000/static/style.css?v=2"));
        assert_ne!(plain, query);
    }

    #[test]
    fn test_hash_different_method() {
        let get = compute_cache_key("GET", &url("http://localhost:5000/"));
        let post = compute_cache_key("POST", &url("http://localhost:5000/"));
        assert_ne!(get, post);
    }

    #[test]
    fn test_hash_format() {
        let hash = compute_cache_key("GET", &url("http://localhost:5000/"));
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
