//! Minimum Tk version policy keyed by host OS version.

use std::collections::BTreeMap;

use anyhow::{Context, Result};

use super::version::Version;

/// Read-only table mapping an OS version to the minimum Tk version it needs.
///
/// An OS version picks the entry with the highest key that does not exceed it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MinTkPolicy {
    thresholds: BTreeMap<Version, Version>,
}

impl MinTkPolicy {
    /// Build a policy from string pairs, as stored in configuration.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut thresholds = BTreeMap::new();
        for (os, tk) in pairs {
            let os_version: Version = os.parse().context("min_tk os version")?;
            let tk_version: Version = tk
                .parse()
                .with_context(|| format!("min_tk value for {os}"))?;
            thresholds.insert(os_version, tk_version);
        }
        Ok(Self { thresholds })
    }

    /// Minimum Tk version for `os`, or `None` if no key is at or below it
    /// (or the OS version is unknown).
    pub fn threshold_for(&self, os: Option<&Version>) -> Option<&Version> {
        let os = os?;
        self.thresholds.range::<Version, _>(..=os).next_back().map(|(_, tk)| tk)
    }
}

/// Whether a Tk patch level falls below `threshold`.
///
/// Unknown patch levels and missing thresholds are never flagged.
pub fn below_minimum(tk: Option<&str>, threshold: Option<&Version>) -> bool {
    match (tk.and_then(Version::parse), threshold) {
        (Some(tk), Some(min)) => tk < *min,
        _ => false,
    }
}

/// Whether a candidate survives enforcement: its Tk must be known and at least
/// `threshold`. Without a threshold everything passes.
pub fn meets_minimum(tk: Option<&str>, threshold: Option<&Version>) -> bool {
    let Some(min) = threshold else {
        return true;
    };
    tk.and_then(Version::parse).is_some_and(|tk| tk >= *min)
}
