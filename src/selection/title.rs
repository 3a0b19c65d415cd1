use std::io::{IsTerminal, Write};
use std::sync::Arc;

/// Where the "currently showing" label goes.
pub trait TitleSink: Send + Sync {
    fn set_title(&self, title: &str);
}

/// Sets the terminal window title with an OSC 0 sequence. Does nothing
/// when stdout is not a terminal.
pub struct TerminalTitle;

impl TitleSink for TerminalTitle {
    fn set_title(&self, title: &str) {
        let mut out = std::io::stdout().lock();
        if !out.is_terminal() {
            return;
        }
        if let Err(e) = write!(out, "\x1b]0;{title}\x07").and_then(|_| out.flush()) {
            tracing::debug!(error = %e, "Could not set terminal title");
        }
    }
}

/// Shows a title for as long as it lives and restores the default label
/// when dropped.
pub struct TitleGuard {
    sink: Arc<dyn TitleSink>,
    default_title: String,
}

impl TitleGuard {
    pub fn show(sink: Arc<dyn TitleSink>, title: &str, default_title: &str) -> Self {
        sink.set_title(title);
        Self {
            sink,
            default_title: default_title.to_string(),
        }
    }
}

impl Drop for TitleGuard {
    fn drop(&mut self) {
        self.sink.set_title(&self.default_title);
    }
}
