//! Batched URL opening.
//!
//! Drives a [`BatchJob`] to completion: open one chunk, wait, open the
//! next. The job cancels itself when the board generation changes.

use std::io;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use sbs_core::{BatchJob, BatchStep};

use crate::logging::redact_value;

/// Something that can show a URL to the user.
pub trait UrlOpener {
    fn open(&mut self, url: &str) -> io::Result<()>;
}

/// Opens URLs in the default browser.
#[derive(Debug, Default)]
pub struct BrowserOpener;

impl UrlOpener for BrowserOpener {
    fn open(&mut self, url: &str) -> io::Result<()> {
        open::that(url)
    }
}

/// Prints URLs instead of opening them.
#[derive(Debug, Default)]
pub struct PrintOpener;

impl UrlOpener for PrintOpener {
    fn open(&mut self, url: &str) -> io::Result<()> {
        println!("{url}");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UrlRunReport {
    pub opened: usize,
    pub failed: usize,
    pub batches: usize,
    pub cancelled: bool,
}

/// Progress bar for a job of `total` URLs.
pub fn url_progress_bar(total: usize) -> ProgressBar {
    let style = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
        .map(|style| style.progress_chars("=> "))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    let bar = ProgressBar::new(total as u64);
    bar.set_style(style);
    bar
}

/// Runs `job` until it finishes or is cancelled.
///
/// `generation` is asked before every chunk; `sleep` is called between
/// chunks with the job's delay.
pub fn run_url_job(
    job: &mut BatchJob<String>,
    generation: impl Fn() -> u64,
    opener: &mut dyn UrlOpener,
    progress: &ProgressBar,
    mut sleep: impl FnMut(Duration),
) -> UrlRunReport {
    let mut report = UrlRunReport::default();
    loop {
        match job.next(generation()) {
            BatchStep::Run {
                items,
                done,
                total,
                next_delay,
            } => {
                report.batches += 1;
                for url in &items {
                    match opener.open(url) {
                        Ok(()) => report.opened += 1,
                        Err(error) => {
                            report.failed += 1;
                            tracing::warn!(url = redact_value(url), %error, "could not open URL");
                        }
                    }
                    progress.inc(1);
                }
                tracing::info!(done, total, "URL batch opened");
                if let Some(delay) = next_delay {
                    progress.set_message(format!("next batch in {}s", delay.as_secs()));
                    sleep(delay);
                    progress.set_message("");
                }
            }
            BatchStep::Finished => break,
            BatchStep::Cancelled => {
                report.cancelled = true;
                break;
            }
        }
    }
    progress.finish_and_clear();
    report
}
