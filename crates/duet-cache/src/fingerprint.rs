//! BLAKE3 content fingerprints.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// A 32-byte BLAKE3 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex encoding of the full digest.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Domain-separated BLAKE3 hasher.
///
/// The domain tag is mixed into every digest, so a file and a line with the
/// same bytes never share a hash.
#[derive(Clone, Copy, Debug)]
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Whole-file fingerprints used for cache invalidation.
    pub const FILE: Self = Self {
        domain: "duet-file-v1",
    };
    /// Per-line hashes.
    pub const LINE: Self = Self {
        domain: "duet-line-v1",
    };

    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    pub fn domain(&self) -> &str {
        self.domain
    }

    fn start(&self) -> blake3::Hasher {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher
    }

    pub fn hash(&self, data: &[u8]) -> ContentHash {
        let mut hasher = self.start();
        hasher.update(data);
        ContentHash(*hasher.finalize().as_bytes())
    }

    /// Hash everything `reader` yields, 64 KiB at a time.
    pub fn hash_reader<R: Read>(&self, mut reader: R) -> io::Result<ContentHash> {
        let mut hasher = self.start();
        let mut buf = vec![0u8; 64 * 1024];
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            hasher.update(&buf[..n]);
        }
        Ok(ContentHash(*hasher.finalize().as_bytes()))
    }

    pub fn hash_file(&self, path: &Path) -> io::Result<ContentHash> {
        self.hash_reader(File::open(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(
            ContentHasher::FILE.hash(b"same"),
            ContentHasher::FILE.hash(b"same")
        );
    }

    #[test]
    fn domains_separate_hashes() {
        assert_ne!(
            ContentHasher::FILE.hash(b"data"),
            ContentHasher::LINE.hash(b"data")
        );
    }

    #[test]
    fn reader_matches_slice() {
        let data = vec![7u8; 200 * 1024];
        let streamed = ContentHasher::FILE.hash_reader(&data[..]).unwrap();
        assert_eq!(streamed, ContentHasher::FILE.hash(&data));
    }

    #[test]
    fn file_hash_tracks_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        std::fs::write(&path, "one").unwrap();
        let first = ContentHasher::FILE.hash_file(&path).unwrap();
        std::fs::write(&path, "two").unwrap();
        let second = ContentHasher::FILE.hash_file(&path).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn hex_is_full_length() {
        let hash = ContentHasher::LINE.hash(b"");
        assert_eq!(hash.to_hex().len(), 64);
        assert_eq!(hash.to_string(), hash.to_hex());
    }
}
