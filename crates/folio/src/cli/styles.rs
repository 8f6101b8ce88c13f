//! Terminal styles for folio output.
//!
//! Renderers ask for a style by what the text *is* (a folder name, an id, a
//! warning) and never pick colors themselves. `console` drops the escape codes
//! when stdout is not a terminal.

use console::Style;

pub fn folder() -> Style {
    Style::new().blue().bold()
}

pub fn item() -> Style {
    Style::new()
}

pub fn kind() -> Style {
    Style::new().cyan()
}

pub fn id() -> Style {
    Style::new().color256(244)
}

pub fn starred() -> Style {
    Style::new().yellow().bold()
}

pub fn trashed() -> Style {
    Style::new().red()
}

pub fn success() -> Style {
    Style::new().green()
}

pub fn info() -> Style {
    Style::new().color256(244)
}

pub fn warning() -> Style {
    Style::new().yellow().bold()
}
