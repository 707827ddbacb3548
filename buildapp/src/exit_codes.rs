//! Stable exit codes for the `buildapp` CLI.

/// Bundle saved, or the user quit from the menu.
pub const OK: i32 = 0;
/// Any failure: no usable interpreter, bad output path, I/O errors, or a
/// bundle that was not saved.
pub const FAILURE: i32 = 1;
