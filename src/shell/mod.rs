//! Line-oriented front end.
//!
//! Each input line is one command, parsed with clap. Columns and pages are
//! numbered from 1 as shown by `list` and `show`. A drag is started with
//! `drag` and finished with `drop` or `cancel`, mirroring a pointer gesture.
//!
//! ```text
//! pdfdeck> load a.pdf b.pdf
//! pdfdeck> drag 1 2
//! pdfdeck> drop 2 1
//! pdfdeck> save-all merged.pdf
//! ```

pub mod picker;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::arrange::{ColumnId, DragTransfer, DropOutcome, PageLayout, Workspace};
use crate::config::{Config, OverwriteMode};
use crate::error::{PdfDeckError, Result};
use crate::merge::MergeExporter;
use crate::output::{self, OutputFormatter};

const PROMPT: &str = "pdfdeck>";

/// Where a `drop` lands inside the target column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropSlot {
    /// Onto the tile of this 1-based page.
    Page(usize),
    /// Below the last page.
    End,
}

impl FromStr for DropSlot {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("end") {
            return Ok(Self::End);
        }
        match s.parse::<usize>() {
            Ok(page) if page >= 1 => Ok(Self::Page(page)),
            _ => Err(format!("expected a page number or 'end', got '{s}'")),
        }
    }
}

#[derive(Debug, Parser)]
#[command(multicall = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Open PDF files as new columns (globs and directories allowed)
    Load { paths: Vec<String> },

    /// List open columns
    #[command(alias = "ls")]
    List,

    /// Show the pages of a column
    Show { column: usize },

    /// Select pages of a column
    Select {
        column: usize,
        #[arg(required = true)]
        pages: Vec<usize>,
    },

    /// Deselect pages of a column
    Deselect {
        column: usize,
        #[arg(required = true)]
        pages: Vec<usize>,
    },

    /// Select every page of a column
    SelectAll { column: usize },

    /// Deselect every page of a column
    DeselectAll { column: usize },

    /// Delete the selected pages of a column
    Delete { column: usize },

    /// Close every column that has a selected page
    Unload,

    /// Start dragging a page
    Drag { column: usize, page: usize },

    /// Drop the dragged page onto a page tile, or at the end
    Drop {
        column: usize,
        #[arg(default_value = "end")]
        at: DropSlot,
    },

    /// Cancel the current drag
    Cancel,

    /// Move a column to another position
    MoveColumn { column: usize, position: usize },

    /// Save one column as a PDF
    Save { column: usize, path: Option<PathBuf> },

    /// Save all columns merged into one PDF
    SaveAll { path: Option<PathBuf> },

    /// Leave pdfdeck
    #[command(alias = "exit")]
    Quit,
}

/// Whether the shell keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next command.
    Continue,
    /// Stop.
    Quit,
}

/// Interactive session over a workspace.
pub struct Shell<R> {
    workspace: Workspace,
    exporter: MergeExporter,
    formatter: OutputFormatter,
    overwrite_mode: OverwriteMode,
    drag: Option<DragTransfer>,
    input: R,
}

impl<R: BufRead> Shell<R> {
    /// Create a session reading commands from `input`.
    pub fn new(config: &Config, input: R) -> Self {
        Self {
            workspace: Workspace::with_config(config),
            exporter: MergeExporter::from_config(config),
            formatter: OutputFormatter::from_config(config),
            overwrite_mode: config.overwrite_mode,
            drag: None,
            input,
        }
    }

    /// The workspace being edited.
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Read and execute commands until `quit` or end of input.
    pub async fn run(&mut self) -> Result<()> {
        self.formatter.info("pdfdeck - type 'help' for a list of commands");

        while let Some(line) = self.read_line(PROMPT)? {
            if self.execute(&line).await == Flow::Quit {
                break;
            }
        }

        if let Some(transfer) = self.drag.take() {
            self.workspace.cancel_drag(transfer);
        }
        Ok(())
    }

    /// Execute one command line.
    pub async fn execute(&mut self, line: &str) -> Flow {
        let words = split_words(line);
        if words.is_empty() {
            return Flow::Continue;
        }

        let command = match Line::try_parse_from(&words) {
            Ok(parsed) => parsed.command,
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                println!("{e}");
                return Flow::Continue;
            }
            Err(e) => {
                self.formatter.error(e.to_string().trim_end());
                return Flow::Continue;
            }
        };

        if matches!(command, Command::Quit) {
            return Flow::Quit;
        }

        if let Err(e) = self.dispatch(command).await {
            self.report(&e);
        }
        Flow::Continue
    }

    async fn dispatch(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Load { paths } => self.load(&paths).await?,
            Command::List => output::display_workspace(&self.formatter, &self.workspace),
            Command::Show { column } => {
                let (position, id) = self.resolve_column(column)?;
                output::display_column(&self.formatter, position, self.workspace.column(id)?);
            }
            Command::Select { column, pages } => self.set_selected(column, &pages, true)?,
            Command::Deselect { column, pages } => self.set_selected(column, &pages, false)?,
            Command::SelectAll { column } => {
                let (_, id) = self.resolve_column(column)?;
                self.workspace.select_all(id, true)?;
            }
            Command::DeselectAll { column } => {
                let (_, id) = self.resolve_column(column)?;
                self.workspace.select_all(id, false)?;
            }
            Command::Delete { column } => {
                let (_, id) = self.resolve_column(column)?;
                self.cancel_pending_drag();
                let removed = self.workspace.delete_selected(id)?;
                self.formatter.info(&format!("Deleted {removed} page(s)"));
            }
            Command::Unload => self.unload(),
            Command::Drag { column, page } => self.drag(column, page)?,
            Command::Drop { column, at } => self.drop_at(column, at)?,
            Command::Cancel => {
                if self.cancel_pending_drag() {
                    self.formatter.info("Drag cancelled");
                } else {
                    self.formatter.warning("Nothing is being dragged");
                }
            }
            Command::MoveColumn { column, position } => {
                let (_, id) = self.resolve_column(column)?;
                let landed = self
                    .workspace
                    .move_column(id, position.saturating_sub(1))?;
                self.formatter
                    .info(&format!("Column moved to position {}", landed + 1));
            }
            Command::Save { column, path } => {
                let (_, id) = self.resolve_column(column)?;
                self.save(Some(id), path.as_deref()).await?;
            }
            Command::SaveAll { path } => {
                self.workspace.ensure_export_enabled()?;
                self.save(None, path.as_deref()).await?;
            }
            Command::Quit => {}
        }
        Ok(())
    }

    async fn load(&mut self, args: &[String]) -> Result<()> {
        let paths = picker::open_paths(args)?;
        if paths.is_empty() {
            return Ok(());
        }

        let (outcomes, stats) = self.workspace.load_documents(&paths).await;
        for (path, outcome) in &outcomes {
            match outcome {
                Ok(id) => self
                    .formatter
                    .debug(&format!("{} opened as {id}", path.display())),
                Err(e) => self.report(e),
            }
        }
        output::display_load_statistics(&self.formatter, &stats);
        Ok(())
    }

    fn set_selected(&mut self, column: usize, pages: &[usize], value: bool) -> Result<()> {
        let (_, id) = self.resolve_column(column)?;
        let indices = pages
            .iter()
            .map(|&page| self.resolve_page(id, page))
            .collect::<Result<Vec<_>>>()?;
        for index in indices {
            self.workspace.set_selected(id, index, value)?;
        }
        Ok(())
    }

    fn unload(&mut self) {
        if self.workspace.is_empty() {
            self.formatter.warning("No document loaded");
            return;
        }
        if !self
            .workspace
            .columns()
            .iter()
            .any(|column| column.has_selection())
        {
            self.formatter.warning("No page selected for unloading");
            return;
        }

        self.cancel_pending_drag();
        let removed = self.workspace.unload_selected();
        self.formatter.info(&format!("Unloaded {removed} column(s)"));
    }

    fn drag(&mut self, column: usize, page: usize) -> Result<()> {
        if self.drag.is_some() {
            self.formatter
                .warning("A page is already being dragged; drop or cancel it first");
            return Ok(());
        }

        let (_, id) = self.resolve_column(column)?;
        let index = self.resolve_page(id, page)?;
        let transfer = self.workspace.begin_drag(id, index)?;
        self.formatter
            .info(&format!("Dragging page {page} of column {column}"));
        self.drag = Some(transfer);
        Ok(())
    }

    fn drop_at(&mut self, column: usize, slot: DropSlot) -> Result<()> {
        let Some(transfer) = self.drag.take() else {
            self.formatter.warning("Nothing is being dragged");
            return Ok(());
        };

        // a drop outside every column abandons the gesture
        let Ok((_, target)) = self.resolve_column(column) else {
            self.workspace.cancel_drag(transfer);
            self.formatter
                .warning(&format!("No column {column}; drag cancelled"));
            return Ok(());
        };

        let tile = match slot {
            DropSlot::Page(page) => page - 1,
            DropSlot::End => self.workspace.column(target)?.len(),
        };
        let position = self.workspace.layout().anchor(tile);

        match self.workspace.complete_drop(transfer, target, position)? {
            DropOutcome::Moved { to, .. } => self
                .formatter
                .info(&format!("Moved to page {} of column {column}", to + 1)),
            DropOutcome::Copied { index, .. } => self
                .formatter
                .info(&format!("Copied to page {} of column {column}", index + 1)),
            DropOutcome::Unchanged { .. } => self.formatter.info("Page left in place"),
        }
        Ok(())
    }

    async fn save(&mut self, column: Option<ColumnId>, path: Option<&Path>) -> Result<()> {
        let Some(path) = picker::save_path(path) else {
            return Ok(());
        };

        if self.overwrite_mode == OverwriteMode::Prompt
            && path.exists()
            && !self.confirm(&format!("{} exists. Overwrite? [y/N]", path.display()))?
        {
            return Err(PdfDeckError::Cancelled);
        }

        let (report, stats) = match column {
            Some(id) => {
                self.exporter
                    .save_column(&self.workspace, id, &path)
                    .await?
            }
            None => self.exporter.save_workspace(&self.workspace, &path).await?,
        };
        output::display_export(&self.formatter, &report, &stats);
        Ok(())
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.read_line(question)?.unwrap_or_default();
        Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "Yes"))
    }

    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.formatter.prompt(prompt);
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn cancel_pending_drag(&mut self) -> bool {
        match self.drag.take() {
            Some(transfer) => {
                self.workspace.cancel_drag(transfer);
                true
            }
            None => false,
        }
    }

    /// Map a 1-based column number to its position and id.
    fn resolve_column(&self, column: usize) -> Result<(usize, ColumnId)> {
        column
            .checked_sub(1)
            .and_then(|position| Some((position, self.workspace.column_at(position)?.id())))
            .ok_or_else(|| {
                PdfDeckError::other(format!(
                    "No column {column} ({} open)",
                    self.workspace.len()
                ))
            })
    }

    /// Map a 1-based page number of column `id` to an index.
    fn resolve_page(&self, id: ColumnId, page: usize) -> Result<usize> {
        let len = self.workspace.column(id)?.len();
        page.checked_sub(1)
            .filter(|&index| index < len)
            .ok_or_else(|| PdfDeckError::other(format!("No page {page} ({len} in column)")))
    }

    fn report(&self, error: &PdfDeckError) {
        if matches!(error, PdfDeckError::Cancelled) {
            self.formatter.info(&error.to_string());
        } else if error.is_contract_violation() {
            log::error!("internal error: {error}");
            self.formatter.error("Internal error, the workspace was left unchanged");
        } else {
            self.formatter.error(&error.to_string());
        }
    }
}

/// Split a command line into words, honouring single and double quotes.
fn split_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        words.push(current);
    }
    words
}
