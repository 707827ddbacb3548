//! I/O helpers for the bundle build.

pub mod bundle;
pub mod config;
pub mod host;
pub mod interpreter;
pub mod process;
pub mod terminal;
