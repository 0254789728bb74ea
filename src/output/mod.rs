//! Report building and formatting

pub mod report;
pub mod formatter;

pub use formatter::ReportGenerator;
pub use report::ScanReport;
