//! Interpreter probing adapter.
//!
//! `InterpreterProbe` is the seam between probe orchestration and the host:
//! the system implementation shells out, tests script the answers.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, instrument};

use super::host::{lookup_name, xcode_tools_installed};
use super::process::{capture, wait_with_warning};
use crate::core::candidate::{liveness_command, parse_version_output, patchlevel_command};
use crate::core::discovery::NameLookup;

pub trait InterpreterProbe {
    /// `which -a` results for an interpreter name.
    fn lookup(&self, name: &str) -> Result<NameLookup>;

    fn is_file(&self, path: &str) -> bool;

    /// Whether the Xcode command line tools are set up.
    fn developer_tools_installed(&self) -> bool;

    /// Python version reported by `<path> -V`, if any.
    fn python_version(&self, path: &str) -> Result<Option<String>>;

    /// Tcl/Tk patch level as seen through `module`, if any.
    fn tk_patchlevel(&self, path: &str, module: &str) -> Result<Option<String>>;

    /// Launch a Tk root window and report whether the process exited cleanly.
    ///
    /// `on_slow` fires at most once if the launch has not finished after the
    /// implementation's warning delay.
    fn tk_launches(&self, path: &str, module: &str, on_slow: &mut dyn FnMut()) -> Result<bool>;
}

/// Probe backed by real subprocesses.
#[derive(Debug, Clone)]
pub struct SystemProbe {
    pub warn_after: Duration,
}

impl SystemProbe {
    pub fn new(warn_after: Duration) -> Self {
        Self { warn_after }
    }
}

impl InterpreterProbe for SystemProbe {
    fn lookup(&self, name: &str) -> Result<NameLookup> {
        lookup_name(name)
    }

    fn is_file(&self, path: &str) -> bool {
        Path::new(path).is_file()
    }

    fn developer_tools_installed(&self) -> bool {
        xcode_tools_installed()
    }

    #[instrument(skip(self))]
    fn python_version(&self, path: &str) -> Result<Option<String>> {
        let out = capture(path, &["-V"])?;
        let combined = format!("{}{}", out.stdout_lossy(), out.stderr_lossy());
        let version = parse_version_output(&combined);
        debug!(?version, "python -V");
        Ok(version)
    }

    #[instrument(skip(self))]
    fn tk_patchlevel(&self, path: &str, module: &str) -> Result<Option<String>> {
        let out = capture(path, &["-c", &patchlevel_command(module)])?;
        let patchlevel = out.stdout_lossy().trim().to_string();
        debug!(%patchlevel, exit_code = ?out.status.code(), "tk patchlevel");
        Ok(if patchlevel.is_empty() {
            None
        } else {
            Some(patchlevel)
        })
    }

    #[instrument(skip(self, on_slow))]
    fn tk_launches(&self, path: &str, module: &str, on_slow: &mut dyn FnMut()) -> Result<bool> {
        let mut cmd = Command::new(path);
        cmd.args(["-c", &liveness_command(module)]);
        let status = wait_with_warning(cmd, self.warn_after, on_slow)?;
        Ok(status.success())
    }
}
