//! Output generation for one-shot CLI runs.
//!
//! - [`json`]: Writes a `ScrapeReport` snapshot per run for later inspection

pub mod json;
