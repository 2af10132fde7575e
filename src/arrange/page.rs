//! Page identity: which page of which source document, and one placed
//! instance of it inside a column.

use std::fmt;

/// Opaque handle to one loaded source PDF.
///
/// Allocated fresh every time a file is loaded, so loading the same path
/// twice yields two distinct documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u64);

impl DocumentId {
    /// Wrap a raw id value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw id value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc#{}", self.0)
    }
}

/// Synthetic identity of a [`PageEntry`].
///
/// Several entries may share a [`PageRef`] after copies, so moves locate the
/// dragged entry by this id instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

impl EntryId {
    /// Wrap a raw id value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw id value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry#{}", self.0)
    }
}

/// Identifies one page of one source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRef {
    /// Source document the page lives in.
    pub document: DocumentId,
    /// 0-based page index inside the source.
    pub page_index: usize,
}

impl PageRef {
    /// Create a page reference.
    pub const fn new(document: DocumentId, page_index: usize) -> Self {
        Self {
            document,
            page_index,
        }
    }
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:p{}", self.document, self.page_index + 1)
    }
}

/// One placed instance of a page inside a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEntry {
    id: EntryId,
    page: PageRef,
    /// Whether the page is currently ticked in the front end.
    pub selected: bool,
}

impl PageEntry {
    /// Create an unselected entry.
    pub fn new(id: EntryId, page: PageRef) -> Self {
        Self {
            id,
            page,
            selected: false,
        }
    }

    /// Entry identity.
    pub fn id(&self) -> EntryId {
        self.id
    }

    /// The source page this entry shows.
    pub fn page(&self) -> PageRef {
        self.page
    }
}

/// Monotonic id source. Ids are never reused within one allocator.
#[derive(Debug, Clone, Default)]
pub(crate) struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub(crate) fn next_raw(&mut self) -> u64 {
        self.next += 1;
        self.next
    }
}
