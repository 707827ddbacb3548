//! Deterministic, pure logic shared by the bundle builder.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data (probe results, script text, version tables) and return deterministic
//! outputs suitable for tests.

pub mod candidate;
pub mod discovery;
pub mod info_plist;
pub mod menu;
pub mod policy;
pub mod shebang;
pub mod version;
