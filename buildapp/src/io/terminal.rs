//! Terminal handling for the interactive interpreter menu.

use std::io::{BufRead, Write};

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::core::candidate::Candidate;
use crate::core::menu::{MenuChoice, prompt_text, render_menu, resolve_choice, terminal_size};
use crate::core::version::Version;

/// Clear the screen and move the cursor home.
pub fn clear_screen<W: Write>(out: &mut W) -> Result<()> {
    write!(out, "\x1b[H\x1b[2J").context("clear terminal")?;
    out.flush().context("flush terminal")
}

/// Ask the terminal to resize to `rows` x `cols`.
pub fn resize<W: Write>(out: &mut W, rows: usize, cols: usize) -> Result<()> {
    writeln!(out, "\x1b[8;{rows};{cols}t").context("resize terminal")
}

/// Show the menu until the user picks a candidate or quits.
///
/// Returns the chosen index into `usable`, or `None` on quit. Closed input is
/// an error.
pub fn prompt_for_candidate<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    usable: &[Candidate],
    failed: &[Candidate],
    threshold: Option<&Version>,
    current: Option<usize>,
) -> Result<Option<usize>> {
    let current_candidate = current.and_then(|idx| usable.get(idx));
    let menu = render_menu(usable, failed, threshold, current_candidate);
    let (rows, cols) = terminal_size(&menu);
    let prompt = prompt_text(current_candidate.is_some());

    loop {
        resize(out, rows, cols)?;
        clear_screen(out)?;
        writeln!(out, "{menu}").context("write menu")?;
        write!(out, "{prompt}").context("write prompt")?;
        out.flush().context("flush prompt")?;

        let mut line = String::new();
        let read = input.read_line(&mut line).context("read selection")?;
        if read == 0 {
            bail!("no python version selected (input closed)");
        }
        match resolve_choice(&line, usable.len(), current) {
            MenuChoice::Selected(idx) => return Ok(Some(idx)),
            MenuChoice::Quit => return Ok(None),
            MenuChoice::Retry => debug!(input = %line.trim(), "invalid selection"),
        }
    }
}
