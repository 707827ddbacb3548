//! Ordering of interpreter paths discovered on `PATH`.

use super::candidate::Candidate;

/// What the host reported for one interpreter name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameLookup {
    pub name: String,
    /// Raw `which -a <name>` stdout.
    pub which_output: String,
    /// Whether `/usr/bin/<name>` exists.
    pub system_binary_exists: bool,
}

/// Paths to probe, followed by environment launchers to offer unprobed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    pub paths: Vec<String>,
    pub env_launchers: Vec<Candidate>,
}

/// Merge lookups into a de-duplicated probe order.
///
/// For each name, `/usr/bin/<name>` (when present) comes first, then the
/// remaining `which -a` hits in order. A name contributes an
/// `/usr/bin/env <name>` launcher only if it produced at least one path.
pub fn discover(lookups: &[NameLookup]) -> Discovery {
    let mut discovery = Discovery::default();
    for lookup in lookups {
        let system_binary = format!("/usr/bin/{}", lookup.name);
        let mut found: Vec<String> = Vec::new();
        for line in lookup.which_output.split('\n') {
            let line = line.trim();
            if line.is_empty()
                || line == system_binary
                || discovery.paths.iter().any(|p| p == line)
                || found.iter().any(|p| p == line)
            {
                continue;
            }
            found.push(line.to_string());
        }
        if lookup.system_binary_exists {
            found.insert(0, system_binary);
        }
        if found.is_empty() {
            continue;
        }
        discovery.paths.extend(found);
        let launcher = Candidate::env_launcher(&lookup.name);
        if !discovery.env_launchers.contains(&launcher) {
            discovery.env_launchers.push(launcher);
        }
    }
    discovery
}
