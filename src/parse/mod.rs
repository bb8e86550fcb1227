//! Front ends
//!
//! A front end turns one source text into a [`RawCompilationUnit`]. The
//! declaration store only sees the [`FrontEnd`] trait, so a different
//! compiler front end can be plugged in per source root.

mod java;
mod signature;

pub use java::JavaFrontEnd;
pub use signature::parse_signature;

use crate::decl::RawCompilationUnit;
use crate::error::Result;
use sha2::{Digest, Sha256};

/// Options the front end honors while parsing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Keep method bodies as opaque text spans
    pub method_bodies: bool,
}

/// Pluggable compiler front end
pub trait FrontEnd: Send + Sync {
    /// Parse one compilation unit. `path` is root-relative (`a/b/C.java`).
    ///
    /// Malformed input must still yield a unit: declarations that could be
    /// recognized are returned with `has_errors` set.
    fn parse(&self, path: &str, source: &str, options: ParseOptions) -> Result<RawCompilationUnit>;

    /// File extension handled by this front end (without the dot)
    fn extension(&self) -> &'static str;
}

/// `sha256:` prefixed content hash of a source text
pub fn source_hash(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    format!("sha256:{}", hex::encode(&hasher.finalize()[..8]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_hash_is_stable() {
        let a = source_hash("class A {}");
        assert_eq!(a, source_hash("class A {}"));
        assert_ne!(a, source_hash("class B {}"));
        assert!(a.starts_with("sha256:"));
        assert_eq!(a.len(), "sha256:".len() + 16);
    }
}
