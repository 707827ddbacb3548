//! Interpreter selection menu: rendering and choice resolution.
//!
//! Everything here is pure; the prompt loop lives in `io::terminal`.

use super::candidate::Candidate;
use super::version::Version;

const MIN_ROWS: usize = 24;
const MIN_COLS: usize = 80;

/// Result of interpreting one line of menu input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    /// Index into the usable candidate list.
    Selected(usize),
    /// User asked to quit.
    Quit,
    /// Input was empty or invalid; prompt again.
    Retry,
}

/// Index of the usable candidate whose path equals the existing launcher's
/// shebang interpreter.
pub fn current_index(usable: &[Candidate], shebang: Option<&str>) -> Option<usize> {
    let shebang = shebang?;
    usable.iter().position(|c| c.path == shebang)
}

/// Interpret a line of user input.
///
/// Input is case-insensitive. Empty input picks the current interpreter when
/// there is one. Numbers are 1-based.
pub fn resolve_choice(input: &str, candidate_count: usize, current: Option<usize>) -> MenuChoice {
    let input = input.trim().to_lowercase();
    let input = if input.is_empty() {
        match current {
            Some(_) => "c".to_string(),
            None => return MenuChoice::Retry,
        }
    } else {
        input
    };
    if input == "q" {
        return MenuChoice::Quit;
    }
    if input == "c" {
        return current.map_or(MenuChoice::Retry, MenuChoice::Selected);
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=candidate_count).contains(&n) => MenuChoice::Selected(n - 1),
        _ => MenuChoice::Retry,
    }
}

/// Render the menu body listing failed and usable candidates.
pub fn render_menu(
    usable: &[Candidate],
    failed: &[Candidate],
    threshold: Option<&Version>,
    current: Option<&Candidate>,
) -> String {
    let mut out = String::new();
    if !failed.is_empty() {
        out.push_str(" - Omitted Python Versions Due To Unsupported Tk -\n\n");
        for candidate in failed {
            out.push_str(&format!("- {}\n", candidate.describe(threshold)));
        }
        out.push('\n');
    }
    out.push_str(" - Currently Available Python Versions -\n\n");
    for (i, candidate) in usable.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, candidate.describe(threshold)));
    }
    out.push('\n');
    if let Some(current) = current {
        out.push_str(&format!("C. Current ({})\n", current.path));
    }
    out.push_str("Q. Quit\n");
    out
}

/// Prompt shown below the menu.
pub fn prompt_text(has_current: bool) -> String {
    format!(
        "Please select the python version to use{}:  ",
        if has_current { " (default is C)" } else { "" }
    )
}

/// Terminal size `(rows, cols)` large enough to show `menu`, never below 24x80.
pub fn terminal_size(menu: &str) -> (usize, usize) {
    let lines: Vec<&str> = menu.split('\n').collect();
    let cols = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let rows = lines.len() + 1;
    (rows.max(MIN_ROWS), cols.max(MIN_COLS))
}
