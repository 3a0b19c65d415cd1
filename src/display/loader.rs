use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

/// Spinner shown while a request is in flight. Cleared when dropped.
pub struct Loader {
    pb: ProgressBar,
    start_time: Instant,
}

impl Loader {
    pub fn start(message: impl Into<String>) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message.into());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self {
            pb,
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl Drop for Loader {
    fn drop(&mut self) {
        self.pb.finish_and_clear();
        tracing::trace!(elapsed_ms = self.elapsed().as_millis() as u64, "Loader finished");
    }
}
