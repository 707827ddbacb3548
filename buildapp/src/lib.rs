//! macOS `.app` bundle builder for a Tkinter-based tool.
//!
//! A run probes the host's Python interpreters, lets the user pick one, and
//! assembles the bundle around a launcher whose shebang names that
//! interpreter. The architecture keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (versions, policy, menu, shebangs).
//!   No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (subprocesses, filesystem, terminal).
//!   The interpreter seam is a trait so probing can be scripted in tests.
//!
//! Orchestration modules ([`probe`], [`select`], [`build`]) coordinate core
//! logic with I/O to implement the CLI.

pub mod build;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod probe;
pub mod select;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
