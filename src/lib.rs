//! pdfdeck - Arrange pages from several PDF files and merge them.
//!
//! Every loaded PDF becomes a column of pages. Pages can be reordered
//! within a column, copied into other columns by drag and drop, deleted,
//! and finally exported, one column at a time or all columns merged in
//! column order.
//!
//! - [`arrange`]: the page arrangement model ([`Workspace`], columns, drags)
//! - [`merge`]: exporting arrangements as PDF bytes or files
//! - [`io`]: loading sources and writing output files
//! - [`shell`]: a line-oriented front end
//!
//! # Examples
//!
//! ```no_run
//! use pdfdeck::arrange::{PageLayout, Workspace};
//! use pdfdeck::merge::MergeExporter;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut workspace = Workspace::default();
//! let a = workspace.load_document(Path::new("a.pdf")).await?;
//! let b = workspace.load_document(Path::new("b.pdf")).await?;
//!
//! // copy page 2 of a in front of the first page of b
//! let transfer = workspace.begin_drag(a, 1)?;
//! let position = workspace.layout().anchor(0);
//! workspace.complete_drop(transfer, b, position)?;
//!
//! let mut exporter = MergeExporter::new();
//! exporter
//!     .save_workspace(&workspace, Path::new("merged.pdf"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod arrange;
pub mod config;
pub mod error;
pub mod io;
pub mod merge;
pub mod output;
pub mod shell;
pub mod utils;

// Re-export commonly used types
pub use arrange::Workspace;
pub use config::Config;
pub use error::{PdfDeckError, Result};
pub use merge::MergeExporter;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
