//! Durable output for scraped runs.
//!
//! Two artifacts per run:
//! - the article array itself ([`json`]), rewritten incrementally after
//!   every source so an interrupted run still leaves valid output
//! - a run report next to it ([`report`]) with per-source/region/category
//!   counts and the full error log

pub mod json;
pub mod report;
