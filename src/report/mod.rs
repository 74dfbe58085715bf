//! Rendering and persisting a [`ClassificationResult`](crate::classifier::ClassificationResult).

mod formatter;
mod writer;

pub use formatter::{Category, Report};
pub use writer::{ReportWriteError, ReportWriter};
