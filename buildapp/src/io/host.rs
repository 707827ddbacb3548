//! Host OS queries via `sw_vers`, `xcode-select`, and `which`.

use std::path::Path;

use anyhow::Result;
use tracing::{debug, instrument};

use super::process::capture;
use crate::core::discovery::NameLookup;
use crate::core::version::Version;

/// Facts about the host gathered once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostInfo {
    /// macOS product version, `None` when `sw_vers` is unavailable.
    pub os_version: Option<Version>,
}

impl HostInfo {
    #[instrument]
    pub fn detect() -> Self {
        Self {
            os_version: os_version(),
        }
    }
}

fn os_version() -> Option<Version> {
    match capture("sw_vers", &["-productVersion"]) {
        Ok(out) => {
            let version = Version::parse(&out.stdout_lossy());
            debug!(?version, "sw_vers");
            version
        }
        Err(err) => {
            debug!(err = %err, "sw_vers unavailable");
            None
        }
    }
}

/// Whether `xcode-select -p` reports an installed developer directory.
pub fn xcode_tools_installed() -> bool {
    match capture("xcode-select", &["-p"]) {
        Ok(out) => out.success(),
        Err(err) => {
            debug!(err = %err, "xcode-select unavailable");
            false
        }
    }
}

/// Collect `which -a <name>` output and whether `/usr/bin/<name>` exists.
pub fn lookup_name(name: &str) -> Result<NameLookup> {
    let which_output = match capture("which", &["-a", name]) {
        Ok(out) => out.stdout_lossy(),
        Err(err) => {
            debug!(err = %err, name, "which unavailable");
            String::new()
        }
    };
    let system_binary = format!("/usr/bin/{name}");
    Ok(NameLookup {
        name: name.to_string(),
        which_output,
        system_binary_exists: Path::new(&system_binary).exists(),
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_sh() {
        let lookup = lookup_name("sh").expect("lookup");
        assert_eq!(lookup.name, "sh");
        assert!(
            lookup.system_binary_exists || !lookup.which_output.trim().is_empty(),
            "sh should be discoverable"
        );
    }

    #[test]
    fn lookup_of_unknown_name_is_empty() {
        let lookup = lookup_name("buildapp-definitely-not-installed").expect("lookup");
        assert!(lookup.which_output.trim().is_empty());
        assert!(!lookup.system_binary_exists);
    }
}
