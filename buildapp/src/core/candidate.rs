//! Interpreter candidates produced by probing.

use super::policy::below_minimum;
use super::version::Version;

/// A discovered interpreter: its path plus whatever probing learned about it.
///
/// Environment launchers (`/usr/bin/env python3`) are never probed, so they
/// carry neither a version nor a Tk patch level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: String,
    pub version: Option<String>,
    pub tk: Option<String>,
}

impl Candidate {
    pub fn probed(path: impl Into<String>, version: impl Into<String>, tk: Option<String>) -> Self {
        Self {
            path: path.into(),
            version: Some(version.into()),
            tk,
        }
    }

    pub fn env_launcher(name: &str) -> Self {
        Self {
            path: format!("/usr/bin/env {name}"),
            version: None,
            tk: None,
        }
    }

    /// Advisory flag for the menu.
    ///
    /// With a threshold, a probed interpreter is flagged when its Tk patch
    /// level is below it or unknown. Environment launchers are never flagged.
    pub fn below_minimum(&self, threshold: Option<&Version>) -> bool {
        if threshold.is_none() || self.version.is_none() {
            return false;
        }
        match self.tk.as_deref() {
            Some(tk) => below_minimum(Some(tk), threshold),
            None => true,
        }
    }

    /// One-line description used by the selection menu and build summary.
    pub fn describe(&self, threshold: Option<&Version>) -> String {
        let mut line = self.path.clone();
        if let Some(version) = &self.version {
            line.push(' ');
            line.push_str(version);
        }
        if let Some(tk) = &self.tk {
            line.push_str(" - tk ");
            line.push_str(tk);
        }
        if let Some(min) = threshold
            && self.below_minimum(Some(min))
        {
            line.push_str(&format!(" ({min}+ recommended)"));
        }
        line
    }
}

/// Outcome of probing: usable candidates and those that failed the Tk
/// liveness check, both in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeReport {
    pub usable: Vec<Candidate>,
    pub failed: Vec<Candidate>,
}

/// Tk binding module for a Python version string.
pub fn toolkit_module(python_version: &str) -> &'static str {
    if python_version.starts_with("2.") {
        "Tkinter"
    } else {
        "tkinter"
    }
}

/// Inline program printing the Tcl/Tk patch level.
pub fn patchlevel_command(module: &str) -> String {
    format!("import {module} as tk; print(tk.Tcl().call('info','patchlevel'))")
}

/// Inline program that creates a Tk root window and exits.
pub fn liveness_command(module: &str) -> String {
    format!("import {module} as tk; tk.Tk()")
}

/// Extract the version from `python -V` output (stdout and stderr combined):
/// the last space-separated token of the trimmed text.
pub fn parse_version_output(output: &str) -> Option<String> {
    let token = output.trim().rsplit(' ').next().unwrap_or_default();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
