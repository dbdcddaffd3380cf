use sha2::{Digest, Sha256};

pub fn calculate_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Leading 12 hex digits of the SHA-256, enough to tell staged files apart in listings.
pub fn short_hash(data: &[u8]) -> String {
    let mut full = calculate_hash(data);
    full.truncate(12);
    full
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_hash() {
        let data = b"hello world";
        let hash = calculate_hash(data);
        // SHA-256 for "hello world"
        assert_eq!(
            hash,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_calculate_hash_empty() {
        let hash = calculate_hash(b"");
        // SHA-256 for empty input
        assert_eq!(
            hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_short_hash_is_prefix() {
        let data = b"hello world";
        assert_eq!(short_hash(data), "b94d27b9934d");
        assert!(calculate_hash(data).starts_with(&short_hash(data)));
    }
}
