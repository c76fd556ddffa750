//! Progress indicators
//!
//! Spinners for filesystem work whose size is not known up front.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::output::Status;

/// Create a spinner, hidden when output is quiet or stderr is not a terminal
pub fn spinner(message: &str) -> ProgressBar {
    let pb = if Status::is_quiet() {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Clear a spinner that ended in an error reported elsewhere
pub fn finish_error(pb: &ProgressBar) {
    pb.finish_and_clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_creation() {
        let pb = spinner("Measuring build tree...");
        assert!(!pb.is_finished());
        pb.finish_and_clear();
        assert!(pb.is_finished());
    }

    #[test]
    fn test_finish_error_clears() {
        let pb = spinner("Deleting...");
        finish_error(&pb);
        assert!(pb.is_finished());
    }
}
