//! Progress reporting for paginated fetches.
//!
//! The fetcher advances an injected sink once per page, out of a total
//! announced up front. Sinks are display-agnostic: a terminal bar, a
//! log line, or nothing at all.

use indicatif::{ProgressBar, ProgressStyle};

/// Observer for page-by-page fetch progress.
pub trait Progress {
    /// Announce the total number of pages about to be fetched.
    ///
    /// Called once, after the first page response reveals the result
    /// count. May be called with zero.
    fn begin(&mut self, total_pages: u64);

    /// Record one fetched page.
    fn advance(&mut self);
}

/// Sink that reports nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Progress for Silent {
    fn begin(&mut self, _total_pages: u64) {}

    fn advance(&mut self) {}
}

/// Terminal progress bar backed by indicatif.
#[derive(Debug, Default)]
pub struct Bar {
    bar: Option<ProgressBar>,
}

impl Bar {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Progress for Bar {
    fn begin(&mut self, total_pages: u64) {
        let bar = ProgressBar::new(total_pages);
        let style = ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} pages ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        self.bar = Some(bar);
    }

    fn advance(&mut self) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
            if Some(bar.position()) >= bar.length() {
                bar.finish();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_is_a_no_op() {
        let mut sink = Silent;
        sink.begin(3);
        sink.advance();
        sink.advance();
    }

    #[test]
    fn test_bar_tracks_position() {
        let mut sink = Bar::new();
        sink.begin(2);
        sink.advance();
        sink.advance();
        let bar = sink.bar.as_ref().unwrap();
        assert_eq!(bar.position(), 2);
        assert!(bar.is_finished());
    }
}
