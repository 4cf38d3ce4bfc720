use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const TICK_INTERVAL: Duration = Duration::from_millis(120);

/// Transient progress indicator on stderr.
///
/// indicatif ticks it from its own thread. Stopping (or dropping) clears the
/// whole line, so nothing of it remains once normal output resumes.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    /// Start a spinner. A spinner that is not `visible` is fully inert.
    pub fn start(message: &str, visible: bool) -> Self {
        let bar = ProgressBar::new_spinner();
        if visible {
            // indicatif hides this target by itself when stderr is not a terminal
            bar.set_draw_target(ProgressDrawTarget::stderr());
            if let Ok(style) = ProgressStyle::with_template("{spinner:.blue.bold} {msg}...") {
                bar.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]));
            }
            bar.enable_steady_tick(TICK_INTERVAL);
        } else {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        bar.set_message(message.to_string());
        Self { bar }
    }

    /// Replace the message shown next to the spinner.
    pub fn set_message(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    /// Stop the spinner and clear its line.
    pub fn stop(self) {
        self.bar.finish_and_clear();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_spinner_starts_and_stops() {
        let spinner = Spinner::start("Creating zone", false);
        spinner.set_message("Creating zone (poll 2)");
        assert_eq!(spinner.bar.message(), "Creating zone (poll 2)");
        assert!(!spinner.bar.is_finished());
        spinner.stop();
    }

    #[test]
    fn dropping_a_spinner_finishes_it() {
        let bar = {
            let spinner = Spinner::start("Deleting zone", false);
            spinner.bar.clone()
        };
        assert!(bar.is_finished());
    }
}
