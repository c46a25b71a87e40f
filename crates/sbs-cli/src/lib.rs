//! CLI library components for Selection Board Studio.

#![allow(missing_docs)]

pub mod export;
pub mod logging;
pub mod review;
pub mod session;
pub mod settings;
pub mod summary;
pub mod urls;
