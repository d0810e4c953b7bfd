//! Result reporting: CSV artifacts, console summaries and tables

mod csv_report;
mod summary;

pub use csv_report::{CsvReport, SweepRecord, ALIGNMENT_CASE_COLUMN, SWEEP_CASE_COLUMN};
pub use summary::{print_error, print_section, summary_table, SaxpyReport};
