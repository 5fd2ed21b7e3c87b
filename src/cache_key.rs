//! Cache entry names derived from download URLs.

use md5::{Digest, Md5};

/// Hashes `input` into a 32 character lowercase hex string.
///
/// The input is hashed verbatim, so two URLs that differ only in casing or
/// query string get different keys. The hash is used for deduplication only.
pub fn cache_key(input: &str) -> String {
    hex::encode(Md5::digest(input.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_vector() {
        assert_eq!(cache_key("https://foo.com"), "aa2e0510b66edff7f05e2b30d4f1b361");
    }

    #[test]
    fn test_deterministic() {
        let url = "https://storage.googleapis.com/chrome-for-testing-public/120.0.6099.109/linux64/chrome-linux64.zip";
        assert_eq!(cache_key(url), cache_key(url));
    }

    #[test]
    fn test_distinct_inputs() {
        let a = cache_key("https://foo.com");
        let b = cache_key("https://FOO.com");
        let c = cache_key("https://foo.com?x=1");
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }

    #[test]
    fn test_format() {
        for input in ["", "a", "https://foo.com/some/long/path.zip"] {
            let key = cache_key(input);
            assert_eq!(key.len(), 32);
            assert!(key.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }
}
