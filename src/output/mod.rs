//! Styled diagnostic output for inline-replace
//!
//! Everything here writes to stderr: stdout is reserved for the transformed stream.

use owo_colors::OwoColorize;

/// Print an error message with a red X
pub fn error(message: &str) {
    // Pastel coral/salmon: RGB(255, 160, 160)
    eprintln!(
        "{} {}",
        "✗".truecolor(255, 160, 160).bold(),
        message.bright_white()
    );
}

/// Print a warning message with a yellow warning symbol
pub fn warning(message: &str) {
    // Pastel cream/yellow: RGB(255, 230, 160)
    eprintln!(
        "{} {}",
        "⚠".truecolor(255, 230, 160).bold(),
        message.bright_white()
    );
}

/// Print a dimmed/muted message
pub fn dimmed(message: &str) {
    // Brighter grey: RGB(160, 160, 160)
    eprintln!("{}", message.truecolor(160, 160, 160));
}
