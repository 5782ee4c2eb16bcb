//! Consistent hash bucketing
//!
//! Maps an identifier to one of [`BUCKET_COUNT`] buckets. The mapping for a
//! given algorithm, seed and identifier never changes, which keeps
//! percentage rollouts sticky across requests and deployments.

use md5::Md5;
use sha2::{Digest, Sha256};

/// Number of buckets, giving 0.001% rollout granularity
pub const BUCKET_COUNT: u32 = 100_000;

/// Hash algorithm used for bucketing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HashAlgorithm {
    /// CRC32 (IEEE)
    #[default]
    Crc32,
    /// MD5, first four digest bytes
    Md5,
    /// SHA-256, first four digest bytes
    Sha256,
}

impl HashAlgorithm {
    /// All supported algorithms
    pub const ALL: [HashAlgorithm; 3] = [Self::Crc32, Self::Md5, Self::Sha256];

    /// Parse a wire name
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "crc32" => Some(Self::Crc32),
            "md5" => Some(Self::Md5),
            "sha256" => Some(Self::Sha256),
            _ => None,
        }
    }

    /// Parse a wire name, falling back to CRC32 for unknown values
    pub fn parse_or_default(name: Option<&str>) -> Self {
        name.and_then(Self::parse).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Crc32 => "crc32",
            Self::Md5 => "md5",
            Self::Sha256 => "sha256",
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Computes buckets for identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCalculator {
    algorithm: HashAlgorithm,
    bucket_count: u32,
}

impl Default for HashCalculator {
    fn default() -> Self {
        Self::new(HashAlgorithm::default())
    }
}

impl HashCalculator {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            bucket_count: BUCKET_COUNT,
        }
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn bucket_count(&self) -> u32 {
        self.bucket_count
    }

    /// Bucket of `seed ++ identifier`, in `[0, bucket_count)`
    pub fn bucket(&self, identifier: &str, seed: &str) -> u32 {
        self.hash(seed, identifier) % self.bucket_count
    }

    fn hash(&self, seed: &str, identifier: &str) -> u32 {
        match self.algorithm {
            HashAlgorithm::Crc32 => {
                let mut hasher = crc32fast::Hasher::new();
                hasher.update(seed.as_bytes());
                hasher.update(identifier.as_bytes());
                hasher.finalize()
            }
            HashAlgorithm::Md5 => {
                let mut hasher = Md5::new();
                hasher.update(seed.as_bytes());
                hasher.update(identifier.as_bytes());
                leading_u32(&hasher.finalize())
            }
            HashAlgorithm::Sha256 => {
                let mut hasher = Sha256::new();
                hasher.update(seed.as_bytes());
                hasher.update(identifier.as_bytes());
                leading_u32(&hasher.finalize())
            }
        }
    }
}

fn leading_u32(digest: &[u8]) -> u32 {
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_algorithm() {
        assert_eq!(HashAlgorithm::parse("md5"), Some(HashAlgorithm::Md5));
        assert_eq!(HashAlgorithm::parse("sha256"), Some(HashAlgorithm::Sha256));
        assert_eq!(HashAlgorithm::parse("murmur3"), None);
        assert_eq!(
            HashAlgorithm::parse_or_default(Some("murmur3")),
            HashAlgorithm::Crc32
        );
        assert_eq!(HashAlgorithm::parse_or_default(None), HashAlgorithm::Crc32);
    }

    #[test]
    fn test_crc32_matches_reference_value() {
        // CRC32("123456789") is the standard check value 0xCBF43926
        let calculator = HashCalculator::new(HashAlgorithm::Crc32);
        assert_eq!(calculator.bucket("123456789", ""), 0xCBF4_3926 % BUCKET_COUNT);
        assert_eq!(calculator.bucket("6789", "12345"), 0xCBF4_3926 % BUCKET_COUNT);
    }

    #[test]
    fn test_md5_uses_leading_bytes() {
        // MD5("") = d41d8cd98f00b204e9800998ecf8427e
        let calculator = HashCalculator::new(HashAlgorithm::Md5);
        assert_eq!(calculator.bucket("", ""), 0xd41d_8cd9 % BUCKET_COUNT);
    }

    #[test]
    fn test_sha256_uses_leading_bytes() {
        // SHA256("") = e3b0c44298fc1c14...
        let calculator = HashCalculator::new(HashAlgorithm::Sha256);
        assert_eq!(calculator.bucket("", ""), 0xe3b0_c442 % BUCKET_COUNT);
    }

    #[test]
    fn test_bucket_is_stable_and_in_range() {
        for algorithm in HashAlgorithm::ALL {
            let calculator = HashCalculator::new(algorithm);
            for i in 0..500 {
                let id = format!("user-{}", i);
                let bucket = calculator.bucket(&id, "seed");
                assert!(bucket < BUCKET_COUNT);
                assert_eq!(bucket, calculator.bucket(&id, "seed"));
            }
        }
    }

    #[test]
    fn test_seed_changes_bucket() {
        let calculator = HashCalculator::default();
        let differing = (0..100)
            .filter(|i| {
                let id = format!("user-{}", i);
                calculator.bucket(&id, "a") != calculator.bucket(&id, "b")
            })
            .count();
        assert!(differing > 90);
    }
}
