//! Interpreter selection for the bundle build.

use std::io::{BufRead, Write};

use anyhow::{Result, bail};

use crate::core::candidate::{Candidate, ProbeReport};
use crate::core::menu::current_index;
use crate::core::version::Version;
use crate::io::terminal::prompt_for_candidate;

/// Structured selection outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Build with this interpreter.
    Chosen(Candidate),
    /// User quit from the menu.
    Quit,
}

/// Pick the interpreter to build with.
///
/// A single usable candidate is taken without prompting; otherwise the menu
/// is shown on `out` and answers are read from `input`.
pub fn select_candidate<R: BufRead, W: Write>(
    report: &ProbeReport,
    threshold: Option<&Version>,
    current_shebang: Option<&str>,
    input: &mut R,
    out: &mut W,
) -> Result<Selection> {
    match report.usable.as_slice() {
        [] => bail!("no python installs with functioning tk found"),
        [only] => Ok(Selection::Chosen(only.clone())),
        usable => {
            let current = current_index(usable, current_shebang);
            let choice =
                prompt_for_candidate(input, out, usable, &report.failed, threshold, current)?;
            Ok(match choice {
                Some(idx) => Selection::Chosen(usable[idx].clone()),
                None => Selection::Quit,
            })
        }
    }
}
