//! An ordered, user-arranged list of pages.

use std::fmt;

use crate::arrange::layout::{PageLayout, Point};
use crate::arrange::page::{DocumentId, EntryId, PageEntry, PageRef};
use crate::error::{PdfDeckError, Result};

/// Identifies an open column inside a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnId(u64);

impl ColumnId {
    /// Wrap a raw id value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw id value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "col#{}", self.0)
    }
}

/// Ordered sequence of page entries with selection state.
///
/// The entry order is the page order used for export. A column may hold
/// pages from documents other than the one it was created for, and may be
/// empty.
#[derive(Debug, Clone)]
pub struct Column {
    id: ColumnId,
    document: DocumentId,
    title: String,
    entries: Vec<PageEntry>,
}

impl Column {
    /// Create an empty column for `document`.
    pub fn new(id: ColumnId, document: DocumentId, title: impl Into<String>) -> Self {
        Self {
            id,
            document,
            title: title.into(),
            entries: Vec::new(),
        }
    }

    /// Column identity.
    pub fn id(&self) -> ColumnId {
        self.id
    }

    /// Document the column was created for. Informational only.
    pub fn document_id(&self) -> DocumentId {
        self.document
    }

    /// Display title (file name of the originating document).
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the column holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in page order.
    pub fn entries(&self) -> &[PageEntry] {
        &self.entries
    }

    /// Entry at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&PageEntry> {
        self.entries.get(index)
    }

    /// Current position of the entry with identity `id`.
    pub fn position_of(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id() == id)
    }

    /// Page references in page order.
    pub fn page_refs(&self) -> impl Iterator<Item = PageRef> + '_ {
        self.entries.iter().map(PageEntry::page)
    }

    /// Insert `entry` at `index`, clamped to `[0, len]`.
    ///
    /// Returns the index the entry actually landed at.
    pub fn insert(&mut self, entry: PageEntry, index: usize) -> usize {
        let index = index.min(self.entries.len());
        self.entries.insert(index, entry);
        index
    }

    /// Append `entry` after the last page.
    pub fn push(&mut self, entry: PageEntry) {
        self.entries.push(entry);
    }

    /// Remove and return the entry at `index`.
    pub fn remove_at(&mut self, index: usize) -> Result<PageEntry> {
        self.check_index(index)?;
        Ok(self.entries.remove(index))
    }

    /// Remove every entry matching `predicate`, keeping the rest in order.
    ///
    /// Returns the removed entries in their former order.
    pub fn remove_where<F>(&mut self, mut predicate: F) -> Vec<PageEntry>
    where
        F: FnMut(&PageEntry) -> bool,
    {
        let (removed, kept): (Vec<_>, Vec<_>) =
            self.entries.drain(..).partition(|entry| predicate(entry));
        self.entries = kept;
        removed
    }

    /// Remove every selected entry.
    pub fn remove_selected(&mut self) -> Vec<PageEntry> {
        self.remove_where(|entry| entry.selected)
    }

    /// Set the selection flag on every entry.
    pub fn set_all_selected(&mut self, value: bool) {
        for entry in &mut self.entries {
            entry.selected = value;
        }
    }

    /// Set the selection flag on the entry at `index`.
    pub fn set_selected(&mut self, index: usize, value: bool) -> Result<()> {
        self.check_index(index)?;
        self.entries[index].selected = value;
        Ok(())
    }

    /// Flip the selection flag on the entry at `index` and return the new value.
    pub fn toggle_selected(&mut self, index: usize) -> Result<bool> {
        self.check_index(index)?;
        let entry = &mut self.entries[index];
        entry.selected = !entry.selected;
        Ok(entry.selected)
    }

    /// Whether at least one entry is selected.
    pub fn has_selection(&self) -> bool {
        self.entries.iter().any(|entry| entry.selected)
    }

    /// Number of selected entries.
    pub fn selected_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.selected).count()
    }

    /// Insertion index for a drop at `position`.
    ///
    /// The first entry whose tile contains the point wins; a point outside
    /// every tile (below the last page, or in a gap) appends at the end.
    pub fn index_for_drop_position<L>(&self, position: Point, layout: &L) -> usize
    where
        L: PageLayout + ?Sized,
    {
        (0..self.entries.len())
            .find(|&index| layout.bounds(index).contains(position))
            .unwrap_or(self.entries.len())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.entries.len() {
            Ok(())
        } else {
            Err(PdfDeckError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrange::layout::StackLayout;
    use rstest::rstest;

    fn column_with_pages(count: usize) -> Column {
        let document = DocumentId::new(1);
        let mut column = Column::new(ColumnId::new(1), document, "a.pdf");
        for index in 0..count {
            column.push(PageEntry::new(
                EntryId::new(index as u64 + 1),
                PageRef::new(document, index),
            ));
        }
        column
    }

    fn page_indices(column: &Column) -> Vec<usize> {
        column.page_refs().map(|page| page.page_index).collect()
    }

    #[rstest]
    #[case(0, vec![9, 0, 1, 2])]
    #[case(2, vec![0, 1, 9, 2])]
    #[case(3, vec![0, 1, 2, 9])]
    #[case(42, vec![0, 1, 2, 9])]
    fn test_insert_clamps_index(#[case] index: usize, #[case] expected: Vec<usize>) {
        let mut column = column_with_pages(3);
        let entry = PageEntry::new(EntryId::new(99), PageRef::new(DocumentId::new(1), 9));
        let landed = column.insert(entry, index);

        assert_eq!(landed, index.min(3));
        assert_eq!(page_indices(&column), expected);
    }

    #[test]
    fn test_remove_at() {
        let mut column = column_with_pages(3);
        let removed = column.remove_at(1).unwrap();
        assert_eq!(removed.page().page_index, 1);
        assert_eq!(page_indices(&column), vec![0, 2]);
    }

    #[test]
    fn test_remove_at_out_of_range() {
        let mut column = column_with_pages(2);
        let err = column.remove_at(2).unwrap_err();
        assert!(matches!(err, PdfDeckError::IndexOutOfRange { index: 2, len: 2 }));
        assert_eq!(column.len(), 2);
    }

    #[test]
    fn test_remove_selected_keeps_order() {
        let mut column = column_with_pages(5);
        column.set_selected(1, true).unwrap();
        column.set_selected(3, true).unwrap();

        let removed = column.remove_selected();

        assert_eq!(
            removed.iter().map(|e| e.page().page_index).collect::<Vec<_>>(),
            vec![1, 3]
        );
        assert_eq!(page_indices(&column), vec![0, 2, 4]);
        assert!(!column.has_selection());
    }

    #[test]
    fn test_remove_selected_everything_leaves_empty_column() {
        let mut column = column_with_pages(3);
        column.set_all_selected(true);
        column.remove_selected();
        assert!(column.is_empty());
    }

    #[test]
    fn test_selection_helpers() {
        let mut column = column_with_pages(3);
        assert!(!column.has_selection());

        column.set_all_selected(true);
        assert_eq!(column.selected_count(), 3);

        assert!(!column.toggle_selected(0).unwrap());
        assert_eq!(column.selected_count(), 2);

        column.set_all_selected(false);
        assert_eq!(column.selected_count(), 0);
        assert!(column.set_selected(3, true).is_err());
    }

    #[test]
    fn test_position_of_uses_entry_identity() {
        let document = DocumentId::new(1);
        let mut column = Column::new(ColumnId::new(1), document, "a.pdf");
        let page = PageRef::new(document, 0);
        column.push(PageEntry::new(EntryId::new(10), page));
        column.push(PageEntry::new(EntryId::new(11), page));

        assert_eq!(column.position_of(EntryId::new(11)), Some(1));
        assert_eq!(column.position_of(EntryId::new(12)), None);
    }

    #[test]
    fn test_index_for_drop_position() {
        let column = column_with_pages(3);
        let layout = StackLayout::default();

        for index in 0..3 {
            assert_eq!(column.index_for_drop_position(layout.anchor(index), &layout), index);
        }

        // below every page
        assert_eq!(column.index_for_drop_position(layout.anchor(7), &layout), 3);
        // in the gap between the first two tiles
        let gap = Point::new(50.0, layout.bounds(1).y - 1.0);
        assert_eq!(column.index_for_drop_position(gap, &layout), 3);
    }

    #[test]
    fn test_index_for_drop_position_empty_column() {
        let column = column_with_pages(0);
        let layout = StackLayout::default();
        assert_eq!(column.index_for_drop_position(layout.anchor(0), &layout), 0);
    }
}
