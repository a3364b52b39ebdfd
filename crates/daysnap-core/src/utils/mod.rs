//! Utility functions for formatting.

pub mod format;

pub use format::{format_day, short_address};
