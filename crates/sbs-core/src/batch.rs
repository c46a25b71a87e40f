//! Self-rescheduling batch continuations.
//!
//! Long work such as opening many URLs runs in bounded chunks. Each step
//! hands out the next chunk and the delay before the following one. A job
//! captures the board load generation it was created for and cancels itself
//! once the board has been reloaded.

use std::collections::VecDeque;
use std::time::Duration;

use sbs_model::{Field, RowId, RowStatus, RowTable};

use crate::store::RowStore;

/// One step of a [`BatchJob`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchStep<T> {
    Run {
        items: Vec<T>,
        /// Items handed out so far, this step included.
        done: usize,
        total: usize,
        /// Delay before the next step; `None` on the last chunk.
        next_delay: Option<Duration>,
    },
    Finished,
    /// The board was reloaded; the remaining items are discarded.
    Cancelled,
}

/// Ordered work split into chunks of at most `batch_size`.
#[derive(Debug, Clone)]
pub struct BatchJob<T> {
    pending: VecDeque<T>,
    total: usize,
    batch_size: usize,
    delay: Duration,
    generation: u64,
}

impl<T> BatchJob<T> {
    /// A zero `batch_size` is treated as one.
    pub fn new(items: Vec<T>, batch_size: usize, delay: Duration, generation: u64) -> Self {
        Self {
            total: items.len(),
            pending: items.into(),
            batch_size: batch_size.max(1),
            delay,
            generation,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_finished(&self) -> bool {
        self.pending.is_empty()
    }

    /// Takes the next chunk, or cancels when `current_generation` differs
    /// from the generation the job was created for.
    pub fn next(&mut self, current_generation: u64) -> BatchStep<T> {
        if current_generation != self.generation {
            if !self.pending.is_empty() {
                tracing::info!(
                    discarded = self.pending.len(),
                    "batch cancelled after reload"
                );
            }
            self.pending.clear();
            return BatchStep::Cancelled;
        }
        if self.pending.is_empty() {
            return BatchStep::Finished;
        }
        let take = self.batch_size.min(self.pending.len());
        let items: Vec<T> = self.pending.drain(..take).collect();
        let next_delay = (!self.pending.is_empty()).then_some(self.delay);
        BatchStep::Run {
            items,
            done: self.total - self.pending.len(),
            total: self.total,
            next_delay,
        }
    }
}

/// Adds `https://` when the URL has no http(s) scheme.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    let lowered = url.to_ascii_lowercase();
    if lowered.starts_with("http://") || lowered.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// URLs of `rows`, in order, optionally restricted to one status.
/// Rows without a URL are skipped.
pub fn collect_urls(
    table: &RowTable,
    store: &RowStore,
    rows: &[RowId],
    only_status: Option<RowStatus>,
) -> Vec<String> {
    rows.iter()
        .copied()
        .filter(|row| only_status.is_none_or(|status| store.status(*row) == status))
        .filter_map(|row| table.value(row, Field::Url))
        .map(normalize_url)
        .collect()
}
