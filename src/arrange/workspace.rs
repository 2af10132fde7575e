//! The set of open columns and everything that changes it.
//!
//! All mutation goes through [`Workspace`] on one logical thread. Each
//! operation validates its inputs before touching any column, so a failed
//! call leaves the workspace exactly as it was.
//!
//! # Examples
//!
//! ```no_run
//! use pdfdeck::arrange::{Workspace, PageLayout};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut workspace = Workspace::default();
//! let a = workspace.load_document(Path::new("a.pdf")).await?;
//! let b = workspace.load_document(Path::new("b.pdf")).await?;
//!
//! // drag page 2 of a onto the first tile of b
//! let transfer = workspace.begin_drag(a, 1)?;
//! let drop_at = workspace.layout().anchor(0);
//! workspace.complete_drop(transfer, b, drop_at)?;
//! # Ok(())
//! # }
//! ```

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::arrange::column::{Column, ColumnId};
use crate::arrange::drag::{DragTransfer, DropOutcome, TransferMode};
use crate::arrange::layout::{Point, StackLayout};
use crate::arrange::page::{DocumentId, EntryId, IdAllocator, PageEntry, PageRef};
use crate::config::Config;
use crate::error::{PdfDeckError, Result};
use crate::io::{LoadStatistics, LoadedPdf, PageInfo, PdfReader, SourceDocument};

/// Source documents referenced by the arrangement, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: HashMap<DocumentId, SourceDocument>,
}

impl SourceRegistry {
    /// Source with identity `id`, if it is still referenced.
    pub fn get(&self, id: DocumentId) -> Option<&SourceDocument> {
        self.sources.get(&id)
    }

    /// Number of registered sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether no source is registered.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// All registered sources, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &SourceDocument> {
        self.sources.values()
    }

    fn insert(&mut self, source: SourceDocument) {
        self.sources.insert(source.id(), source);
    }

    fn retain_referenced(&mut self, referenced: &HashSet<DocumentId>) -> usize {
        let before = self.sources.len();
        self.sources.retain(|id, _| referenced.contains(id));
        before - self.sources.len()
    }
}

/// All open columns, in user-visible order.
#[derive(Debug)]
pub struct Workspace {
    columns: Vec<Column>,
    sources: SourceRegistry,
    layout: StackLayout,
    reader: PdfReader,
    load_jobs: usize,
    document_ids: IdAllocator,
    column_ids: IdAllocator,
    entry_ids: IdAllocator,
    drag_tokens: IdAllocator,
    active_drag: Option<u64>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::with_config(&Config::default())
    }
}

impl Workspace {
    /// Create an empty workspace using the layout and load settings of `config`.
    pub fn with_config(config: &Config) -> Self {
        Self {
            columns: Vec::new(),
            sources: SourceRegistry::default(),
            layout: config.layout,
            reader: PdfReader::new(),
            load_jobs: config.effective_load_jobs(),
            document_ids: IdAllocator::default(),
            column_ids: IdAllocator::default(),
            entry_ids: IdAllocator::default(),
            drag_tokens: IdAllocator::default(),
            active_drag: None,
        }
    }

    /// Tile geometry used to resolve drop positions.
    pub fn layout(&self) -> &StackLayout {
        &self.layout
    }

    /// Open columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of open columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether no column is open.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Whether the global merge is available (at least two columns).
    pub fn export_enabled(&self) -> bool {
        self.columns.len() >= 2
    }

    /// Fail with [`PdfDeckError::ExportDisabled`] unless the global merge is available.
    pub fn ensure_export_enabled(&self) -> Result<()> {
        if self.export_enabled() {
            Ok(())
        } else {
            Err(PdfDeckError::ExportDisabled {
                columns: self.columns.len(),
            })
        }
    }

    /// Position of column `id` in the workspace order.
    pub fn position_of(&self, id: ColumnId) -> Option<usize> {
        self.columns.iter().position(|column| column.id() == id)
    }

    /// Column with identity `id`.
    pub fn column(&self, id: ColumnId) -> Result<&Column> {
        self.columns
            .iter()
            .find(|column| column.id() == id)
            .ok_or(PdfDeckError::UnknownColumn { column: id })
    }

    /// Mutable access to column `id`.
    pub fn column_mut(&mut self, id: ColumnId) -> Result<&mut Column> {
        self.columns
            .iter_mut()
            .find(|column| column.id() == id)
            .ok_or(PdfDeckError::UnknownColumn { column: id })
    }

    /// Column at 0-based `position` in the workspace order.
    pub fn column_at(&self, position: usize) -> Option<&Column> {
        self.columns.get(position)
    }

    /// Registered source documents.
    pub fn sources(&self) -> &SourceRegistry {
        &self.sources
    }

    /// Display information for one page, for a preview renderer.
    pub fn page_info(&self, page: PageRef) -> Result<PageInfo> {
        self.sources
            .get(page.document)
            .ok_or(PdfDeckError::UnknownDocument {
                document: page.document,
            })?
            .page_info(page.page_index)
    }

    /// Page references of every column, concatenated in column order.
    pub fn merged_page_refs(&self) -> Vec<PageRef> {
        self.columns.iter().flat_map(Column::page_refs).collect()
    }

    /// Register an already parsed document and append a column for it.
    ///
    /// The column gets one unselected entry per page, in source order.
    pub fn add_document(&mut self, loaded: LoadedPdf) -> ColumnId {
        let document = DocumentId::new(self.document_ids.next_raw());
        let id = ColumnId::new(self.column_ids.next_raw());

        let mut column = Column::new(id, document, loaded.title());
        for page_index in 0..loaded.page_count {
            let entry = PageEntry::new(self.next_entry_id(), PageRef::new(document, page_index));
            column.push(entry);
        }

        log::info!(
            "opened {} as {} with {} page(s) in {}",
            loaded.path.display(),
            document,
            loaded.page_count,
            id
        );

        self.sources.insert(loaded.into_source(document));
        self.columns.push(column);
        id
    }

    /// Load a PDF from disk and append a column for it.
    ///
    /// # Errors
    ///
    /// Any open error from [`PdfReader::load`]; the workspace is unchanged.
    pub async fn load_document(&mut self, path: &Path) -> Result<ColumnId> {
        let loaded = self.reader.load(path).await?;
        Ok(self.add_document(loaded))
    }

    /// Load several PDFs and append one column per success, in `paths` order.
    ///
    /// Files are read in parallel; each path gets its own result and a
    /// failure does not prevent the others from loading.
    pub async fn load_documents(
        &mut self,
        paths: &[PathBuf],
    ) -> (Vec<(PathBuf, Result<ColumnId>)>, LoadStatistics) {
        let (results, stats) = self.reader.load_all(paths, self.load_jobs).await;

        let outcomes = paths
            .iter()
            .cloned()
            .zip(results)
            .map(|(path, result)| {
                let outcome = result.map(|loaded| self.add_document(loaded));
                if let Err(err) = &outcome {
                    log::warn!("could not load {}: {err}", path.display());
                }
                (path, outcome)
            })
            .collect();

        (outcomes, stats)
    }

    /// Move column `id` to `position` (clamped) in the workspace order.
    ///
    /// Returns the position the column landed at.
    pub fn move_column(&mut self, id: ColumnId, position: usize) -> Result<usize> {
        let from = self
            .position_of(id)
            .ok_or(PdfDeckError::UnknownColumn { column: id })?;
        let column = self.columns.remove(from);
        let to = position.min(self.columns.len());
        self.columns.insert(to, column);
        log::debug!("moved {id} from position {from} to {to}");
        Ok(to)
    }

    /// Set the selection flag of one entry.
    pub fn set_selected(&mut self, id: ColumnId, index: usize, value: bool) -> Result<()> {
        self.column_mut(id)?.set_selected(index, value)
    }

    /// Flip the selection flag of one entry and return the new value.
    pub fn toggle_selected(&mut self, id: ColumnId, index: usize) -> Result<bool> {
        self.column_mut(id)?.toggle_selected(index)
    }

    /// Select or deselect every entry of a column.
    pub fn select_all(&mut self, id: ColumnId, value: bool) -> Result<()> {
        self.column_mut(id)?.set_all_selected(value);
        Ok(())
    }

    /// Delete the selected entries of a column. The column itself stays.
    ///
    /// Returns the number of deleted entries.
    pub fn delete_selected(&mut self, id: ColumnId) -> Result<usize> {
        let removed = self.column_mut(id)?.remove_selected().len();
        if removed > 0 {
            log::debug!("deleted {removed} page(s) from {id}");
            self.prune_sources();
        }
        Ok(removed)
    }

    /// Close every column for which `predicate` holds.
    ///
    /// Returns the number of closed columns; zero matches is not an error.
    pub fn unload_columns<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&Column) -> bool,
    {
        let before = self.columns.len();
        self.columns.retain(|column| !predicate(column));
        let removed = before - self.columns.len();

        if removed > 0 {
            log::info!("unloaded {removed} column(s)");
            self.prune_sources();
        }
        removed
    }

    /// Close every column holding at least one selected entry.
    pub fn unload_selected(&mut self) -> usize {
        self.unload_columns(Column::has_selection)
    }

    /// Start dragging the entry at `page_index` of column `id`.
    ///
    /// # Errors
    ///
    /// - [`PdfDeckError::DragInProgress`] if another drag is active
    /// - [`PdfDeckError::UnknownColumn`] / [`PdfDeckError::IndexOutOfRange`]
    ///   for a bad address
    pub fn begin_drag(&mut self, id: ColumnId, page_index: usize) -> Result<DragTransfer> {
        if self.active_drag.is_some() {
            return Err(PdfDeckError::DragInProgress);
        }

        let column = self.column(id)?;
        let entry = column
            .get(page_index)
            .ok_or(PdfDeckError::IndexOutOfRange {
                index: page_index,
                len: column.len(),
            })?;
        let (entry, page) = (entry.id(), entry.page());

        let token = self.drag_tokens.next_raw();
        self.active_drag = Some(token);
        log::debug!("drag {entry} ({page}) from {id}");

        Ok(DragTransfer {
            token,
            entry,
            page,
            origin: id,
            mode: TransferMode::Copy,
        })
    }

    /// Abandon a drag. No column changes.
    pub fn cancel_drag(&mut self, transfer: DragTransfer) {
        if self.active_drag == Some(transfer.token) {
            self.active_drag = None;
        }
        log::debug!("drag of {} cancelled", transfer.entry);
    }

    /// Whether a drag is currently active.
    pub fn drag_active(&self) -> bool {
        self.active_drag.is_some()
    }

    /// Finish a drag by dropping at `position` inside column `target`.
    ///
    /// Dropping into the origin column moves the dragged entry; dropping
    /// into any other column inserts a fresh, unselected copy and leaves the
    /// origin untouched. The transfer is consumed whether or not the drop
    /// succeeds, and a failed drop changes nothing.
    pub fn complete_drop(
        &mut self,
        mut transfer: DragTransfer,
        target: ColumnId,
        position: Point,
    ) -> Result<DropOutcome> {
        if self.active_drag != Some(transfer.token) {
            return Err(PdfDeckError::NoActiveDrag);
        }
        self.active_drag = None;

        transfer.mode = transfer.mode_for(target);
        let outcome = match transfer.mode {
            TransferMode::Move => self.move_within(&transfer, position)?,
            TransferMode::Copy => self.copy_into(&transfer, target, position)?,
        };

        log::debug!("drop of {} into {target}: {outcome:?}", transfer.entry);
        Ok(outcome)
    }

    fn move_within(&mut self, transfer: &DragTransfer, position: Point) -> Result<DropOutcome> {
        let layout = self.layout;
        let id = transfer.origin;
        let column = self.column_mut(id)?;

        let insert_index = column.index_for_drop_position(position, &layout);
        let from = column
            .position_of(transfer.entry)
            .ok_or(PdfDeckError::EntryNotFound {
                entry: transfer.entry,
                column: id,
            })?;

        // the drop index was computed with the entry still in place
        let to = if from < insert_index {
            insert_index - 1
        } else {
            insert_index
        };

        if from == to {
            return Ok(DropOutcome::Unchanged {
                column: id,
                index: from,
            });
        }

        let entry = column.remove_at(from)?;
        let to = column.insert(entry, to);
        Ok(DropOutcome::Moved {
            column: id,
            from,
            to,
        })
    }

    fn copy_into(
        &mut self,
        transfer: &DragTransfer,
        target: ColumnId,
        position: Point,
    ) -> Result<DropOutcome> {
        let layout = self.layout;
        let insert_index = self.column(target)?.index_for_drop_position(position, &layout);

        // the origin may have been unloaded mid-drag
        if self.sources.get(transfer.page.document).is_none() {
            return Err(PdfDeckError::UnknownDocument {
                document: transfer.page.document,
            });
        }

        let entry = PageEntry::new(self.next_entry_id(), transfer.page);
        let entry_id = entry.id();
        let index = self.column_mut(target)?.insert(entry, insert_index);

        Ok(DropOutcome::Copied {
            column: target,
            index,
            entry: entry_id,
        })
    }

    fn next_entry_id(&mut self) -> EntryId {
        EntryId::new(self.entry_ids.next_raw())
    }

    /// Drop sources no entry refers to any more.
    fn prune_sources(&mut self) {
        let referenced: HashSet<DocumentId> = self
            .columns
            .iter()
            .flat_map(Column::page_refs)
            .map(|page| page.document)
            .collect();

        let dropped = self.sources.retain_referenced(&referenced);
        if dropped > 0 {
            log::debug!("released {dropped} unreferenced source document(s)");
        }
    }
}
