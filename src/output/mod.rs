//! Output formatting for refresh results.
//!
//! - [`report`] - Per-network refresh summary
//! - [`terminal`] - Terminal field formatting

mod report;
mod terminal;

pub use report::{format_report_row, print_reports};
pub use terminal::format_field;
