//! Utility functions for date parsing and display formatting.

pub mod format;

pub use format::{format_average, format_date, parse_timestamp, truncate_string};
