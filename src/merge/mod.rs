//! Turning arranged pages into an output PDF.
//!
//! - [`MergeExporter`] drives an export through its phases
//! - [`PageAssembler`] builds the output document from resolved pages

pub mod exporter;
pub mod pages;

pub use exporter::{ExportReport, ExportState, ExportedPdf, MergeExporter};
pub use pages::PageAssembler;
