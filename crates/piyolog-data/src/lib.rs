//! Parsing and analysis layer for the piyolog analyzer.
//!
//! Responsible for reading exported log texts, merging multiple periods,
//! parsing sleep sessions and daily totals, and deriving summary statistics
//! and chart-ready projections.

pub mod aggregator;
pub mod analysis;
pub mod parser;
pub mod projection;
pub mod reader;

pub use piyolog_core as core;
