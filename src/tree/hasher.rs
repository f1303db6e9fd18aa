//! Content digests for manifest entries
//!
//! Files are streamed through the digest in fixed-size blocks so that large
//! files never have to be held in memory.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

/// Block size used when streaming file content into a digest (64 KiB)
pub const BLOCK_SIZE: usize = 64 * 1024;

/// Digest algorithm used for file entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    #[default]
    Sha256,
    Blake3,
}

impl DigestAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Blake3 => "blake3",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(DigestAlgorithm::Sha256),
            "blake3" => Ok(DigestAlgorithm::Blake3),
            other => Err(format!(
                "Unknown digest algorithm: {} (must be 'sha256' or 'blake3')",
                other
            )),
        }
    }
}

/// Incremental digest accumulator
///
/// Used both when hashing local files and when verifying downloads while
/// they stream to disk.
pub enum StreamingDigest {
    Sha256(Sha256),
    Blake3(Box<blake3::Hasher>),
}

impl StreamingDigest {
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        match algorithm {
            DigestAlgorithm::Sha256 => StreamingDigest::Sha256(Sha256::new()),
            DigestAlgorithm::Blake3 => StreamingDigest::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    pub fn update(&mut self, block: &[u8]) {
        match self {
            StreamingDigest::Sha256(hasher) => hasher.update(block),
            StreamingDigest::Blake3(hasher) => {
                hasher.update(block);
            }
        }
    }

    /// Finish the digest and return it as lowercase hex
    pub fn finalize_hex(self) -> String {
        match self {
            StreamingDigest::Sha256(hasher) => hex::encode(hasher.finalize()),
            StreamingDigest::Blake3(hasher) => hex::encode(hasher.finalize().as_bytes()),
        }
    }
}

/// Computes content digests for files
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentHasher {
    algorithm: DigestAlgorithm,
}

impl ContentHasher {
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        Self { algorithm }
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Hash a file by path, reading it in `BLOCK_SIZE` blocks
    pub fn hash_file(&self, path: &Path) -> io::Result<String> {
        let file = File::open(path)?;
        self.hash_reader(file)
    }

    /// Hash everything readable from `reader`
    pub fn hash_reader<R: Read>(&self, mut reader: R) -> io::Result<String> {
        let mut digest = StreamingDigest::new(self.algorithm);
        let mut buffer = vec![0u8; BLOCK_SIZE];

        loop {
            let bytes_read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            digest.update(&buffer[..bytes_read]);
        }

        Ok(digest.finalize_hex())
    }

    /// Hash an in-memory byte slice
    pub fn hash_bytes(&self, content: &[u8]) -> String {
        let mut digest = StreamingDigest::new(self.algorithm);
        digest.update(content);
        digest.finalize_hex()
    }
}
