//! Shebang line parsing and rewriting for the bundle launcher.
//!
//! Scripts are handled as raw bytes; only the first line is interpreted.

const SHEBANG: &[u8] = b"#!";

/// Interpreter named by the first line of `script`, if it is a non-empty
/// shebang.
pub fn read_shebang(script: &[u8]) -> Option<String> {
    let first = script.split(|b| *b == b'\n').next()?;
    let interpreter = first.strip_prefix(SHEBANG)?;
    let interpreter = String::from_utf8_lossy(interpreter).trim().to_string();
    if interpreter.is_empty() {
        None
    } else {
        Some(interpreter)
    }
}

/// Replace (or add) the shebang so `script` runs under `interpreter`.
///
/// Everything after the first line is kept byte-for-byte.
pub fn rewrite_shebang(script: &[u8], interpreter: &str) -> Vec<u8> {
    let rest: &[u8] = if script.starts_with(SHEBANG) {
        match script.iter().position(|b| *b == b'\n') {
            Some(newline) => &script[newline..],
            None => &[],
        }
    } else {
        script
    };
    let mut launcher = Vec::with_capacity(SHEBANG.len() + interpreter.len() + rest.len() + 1);
    launcher.extend_from_slice(SHEBANG);
    launcher.extend_from_slice(interpreter.as_bytes());
    if !script.starts_with(SHEBANG) {
        launcher.push(b'\n');
    }
    launcher.extend_from_slice(rest);
    launcher
}
