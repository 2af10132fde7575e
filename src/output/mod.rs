//! Output formatting and display for pdfdeck.
//!
//! This module handles all user-facing output:
//! - Formatted status messages
//! - Column listings
//! - Load and export summaries
//!
//! # Examples
//!
//! ```no_run
//! use pdfdeck::output::OutputFormatter;
//! use pdfdeck::config::Config;
//!
//! # fn example(config: Config) {
//! let formatter = OutputFormatter::from_config(&config);
//! formatter.info("Loading 2 files");
//! formatter.success("Export complete");
//! # }
//! ```

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter};

use crate::arrange::{Column, Workspace};
use crate::io::{LoadStatistics, WriteStatistics};
use crate::merge::ExportReport;

/// Display load statistics to the user.
pub fn display_load_statistics(formatter: &OutputFormatter, stats: &LoadStatistics) {
    if stats.failure_count > 0 {
        formatter.warning(&format!(
            "{} file(s) failed to load",
            stats.failure_count
        ));
    }

    if stats.success_count > 0 {
        formatter.info(&format!(
            "Loaded {} file(s) in {:.2}s: {} pages, {}",
            stats.success_count,
            stats.total_time.as_secs_f64(),
            stats.total_pages,
            stats.format_total_size()
        ));
    }
}

/// Display a finished save.
pub fn display_export(formatter: &OutputFormatter, report: &ExportReport, stats: &WriteStatistics) {
    formatter.success(&format!(
        "Saved {} page(s) to {} ({})",
        report.pages,
        stats.output_path.display(),
        stats.format_file_size()
    ));
    formatter.detail("Sources", &report.sources.to_string());
    formatter.detail(
        "Time",
        &format!(
            "{:.2}s collecting, {:.2}s writing",
            report.collect_time.as_secs_f64(),
            (report.write_time + stats.write_time).as_secs_f64()
        ),
    );
}

/// One-line summary of a column, numbered from 1.
pub fn column_summary(position: usize, column: &Column) -> String {
    let selected = column.selected_count();
    let mut line = format!(
        "[{}] {} - {} page(s)",
        position + 1,
        column.title(),
        column.len()
    );
    if selected > 0 {
        line.push_str(&format!(", {selected} selected"));
    }
    line
}

/// Display every open column.
pub fn display_workspace(formatter: &OutputFormatter, workspace: &Workspace) {
    if workspace.is_empty() {
        formatter.info("No document loaded");
        return;
    }

    for (position, column) in workspace.columns().iter().enumerate() {
        formatter.info(&column_summary(position, column));
    }

    if workspace.export_enabled() {
        formatter.debug("save-all is available");
    }
}

/// Display the pages of one column, numbered from 1.
///
/// Selected pages are marked with `*`.
pub fn display_column(formatter: &OutputFormatter, position: usize, column: &Column) {
    formatter.section(&column_summary(position, column));
    for (index, entry) in column.entries().iter().enumerate() {
        let mark = if entry.selected { "*" } else { " " };
        formatter.list_item(index + 1, &format!("{mark} {}", entry.page()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrange::{ColumnId, DocumentId, EntryId, PageEntry, PageRef};

    fn column(pages: usize) -> Column {
        let document = DocumentId::new(1);
        let mut column = Column::new(ColumnId::new(1), document, "a.pdf");
        for index in 0..pages {
            column.push(PageEntry::new(
                EntryId::new(index as u64 + 1),
                PageRef::new(document, index),
            ));
        }
        column
    }

    #[test]
    fn test_column_summary() {
        let mut column = column(3);
        assert_eq!(column_summary(0, &column), "[1] a.pdf - 3 page(s)");

        column.set_selected(2, true).unwrap();
        assert_eq!(
            column_summary(4, &column),
            "[5] a.pdf - 3 page(s), 1 selected"
        );
    }

    #[test]
    fn test_display_does_not_panic() {
        let formatter = OutputFormatter::quiet();
        display_column(&formatter, 0, &column(2));
        display_workspace(&formatter, &Workspace::default());
        display_load_statistics(&formatter, &LoadStatistics::default());
    }
}
