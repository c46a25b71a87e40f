//! Selection board engine.
//!
//! This crate owns all mutable board state and the rules that act on it:
//!
//! - **RowStore** (`store`): status, assignment and restore-record maps
//! - **ContactIndex** (`contacts`): contact value to row-id grouping
//! - **StatusTransition** (`transition`): the contact dedup / restore state machine
//! - **FilterPipeline** (`filter`): ordered predicate stages producing a projection
//! - **ViewRegistry** (`views`): named projections (primary view and category tabs)
//! - **Statistics** (`stats`) and **batch continuations** (`batch`)
//! - **Board** (`board`): the single owned context tying the pieces together
//!
//! # Example
//!
//! ```ignore
//! use sbs_core::{AssignmentContext, Board, BoardOptions};
//! use sbs_model::{RowId, RowStatus};
//!
//! let mut board = Board::new(BoardOptions::default());
//! board.load(table);
//! let ctx = board.assignment_context(board.primary_view_name())?;
//! board.set_status(RowId(0), RowStatus::Selected, &ctx);
//! let rows = board.projection(board.primary_view_name())?;
//! ```

pub mod batch;
pub mod board;
pub mod contacts;
pub mod error;
pub mod filter;
pub mod stats;
pub mod store;
pub mod transition;
pub mod views;

pub use batch::{BatchJob, BatchStep, collect_urls, normalize_url};
pub use board::{Board, BoardOptions, DEFAULT_CHANNELS, DEFAULT_SELECTED_LABEL};
pub use contacts::ContactIndex;
pub use error::{CoreError, Result};
pub use filter::{FilterOutcome, FilterPipeline, clean_url};
pub use stats::StatusSummary;
pub use store::{Assignment, RestoreRecord, RowStore, StoreState};
pub use transition::{AssignmentContext, TransitionOutcome, dedup_violations};
pub use views::{View, ViewId, ViewKind, ViewRegistry};
