//! Shared model, error taxonomy and helpers for the piyolog analyzer.
//!
//! The data-processing crate builds on these types; the binary only adds
//! bootstrap and report rendering on top.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{LogIssue, PiyologError, Result};
