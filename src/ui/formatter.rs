//! Formatting functions for terminal output.
//!
//! Everything here writes to stderr: stdout carries manifests and query
//! results and must stay machine-readable.

use console::style;

use crate::boundary::BoundaryWarning;

/// Print an error message in red
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Print a success message with a green checkmark
pub fn display_success(message: &str) {
    eprintln!("{} {}", style("✓").green(), message);
}

/// Print a status message with a yellow arrow
pub fn display_status(message: &str) {
    eprintln!("{} {}", style("→").yellow(), message);
}

/// Print a boundary warning with a yellow warning icon
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Print the response body returned by a failed webhook call
pub fn display_webhook_body(body: &str) {
    if body.trim().is_empty() {
        return;
    }
    eprintln!("{}", style("Response body:").dim());
    for line in body.lines() {
        eprintln!("  {}", line);
    }
}
