//! Semantic version strings as used by version chains.

use std::fmt;

use crate::chain::ChainError;

/// A parsed `major.minor.patch` version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SemVer {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl SemVer {
    pub fn new(major: u64, minor: u64, patch: u64) -> SemVer {
        SemVer {
            major,
            minor,
            patch,
        }
    }

    /// Parse a `"1.2.0"`-style string. Exactly three numeric components;
    /// pre-release and build metadata are not part of this chain's contract.
    pub fn parse(version: &str) -> Result<SemVer, ChainError> {
        let invalid = |reason: &str| ChainError::InvalidVersion {
            version: version.to_string(),
            reason: reason.to_string(),
        };
        let parts: Vec<&str> = version.split('.').collect();
        let &[major, minor, patch] = parts.as_slice() else {
            return Err(invalid("expected exactly three dot-separated components"));
        };
        let number = |s: &str, what: &str| -> Result<u64, ChainError> {
            if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid(&format!("{} component is not a number", what)));
            }
            s.parse::<u64>()
                .map_err(|_| invalid(&format!("{} component overflows", what)))
        };
        Ok(SemVer {
            major: number(major, "major")?,
            minor: number(minor, "minor")?,
            patch: number(patch, "patch")?,
        })
    }

    pub fn bump_major(self) -> SemVer {
        SemVer::new(self.major + 1, 0, 0)
    }

    pub fn bump_minor(self) -> SemVer {
        SemVer::new(self.major, self.minor + 1, 0)
    }

    pub fn bump_patch(self) -> SemVer {
        SemVer::new(self.major, self.minor, self.patch + 1)
    }
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
