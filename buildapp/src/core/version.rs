//! Dotted version numbers for OS releases, interpreters, and Tk patch levels.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};

/// A dotted numeric version such as `10.15.7` or `8.6.13`.
///
/// Components compare numerically. Missing trailing components count as zero,
/// so `11` and `11.0` are equal. Each component keeps only its leading digits
/// (`3.13.0rc1` orders as `3.13.0`). The input text is kept for display.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    parts: Vec<u64>,
}

impl Version {
    /// Parse a version, returning `None` if the first component has no digits.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let mut parts: Vec<u64> = Vec::new();
        for component in raw.split('.') {
            let digits: String = component.chars().take_while(char::is_ascii_digit).collect();
            if digits.is_empty() {
                break;
            }
            parts.push(digits.parse().ok()?);
            if digits.len() != component.len() {
                break;
            }
        }
        if parts.is_empty() {
            return None;
        }
        Some(Self {
            raw: raw.to_string(),
            parts,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    fn significant(&self) -> &[u64] {
        let len = self
            .parts
            .iter()
            .rposition(|part| *part != 0)
            .map_or(0, |idx| idx + 1);
        &self.parts[..len]
    }
}

impl FromStr for Version {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| anyhow!("invalid version {s:?}"))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.significant() == other.significant()
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.significant().cmp(other.significant())
    }
}
