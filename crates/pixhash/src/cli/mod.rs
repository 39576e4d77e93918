//! Command-line handlers.

pub mod convert;
pub mod report;
