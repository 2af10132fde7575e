//! Payload of an in-progress page drag.

use crate::arrange::column::ColumnId;
use crate::arrange::page::{EntryId, PageRef};

/// What a completed drop does with the dragged page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    /// Relocate the entry inside its own column.
    Move,
    /// Place a fresh entry for the same page into another column.
    Copy,
}

/// Describes one page relocation between drag start and drop.
///
/// Obtained from [`Workspace::begin_drag`](crate::arrange::Workspace::begin_drag)
/// and consumed by `complete_drop` or `cancel_drag`. It is deliberately not
/// `Clone`: a transfer is settled exactly once.
#[derive(Debug, PartialEq, Eq)]
pub struct DragTransfer {
    pub(crate) token: u64,
    pub(crate) entry: EntryId,
    pub(crate) page: PageRef,
    pub(crate) origin: ColumnId,
    pub(crate) mode: TransferMode,
}

impl DragTransfer {
    /// The dragged entry.
    pub fn entry(&self) -> EntryId {
        self.entry
    }

    /// The page being dragged.
    pub fn page(&self) -> PageRef {
        self.page
    }

    /// Column the drag started in.
    pub fn origin(&self) -> ColumnId {
        self.origin
    }

    /// Mode as currently known. `Copy` until a drop onto the origin column
    /// resolves it to `Move`.
    pub fn mode(&self) -> TransferMode {
        self.mode
    }

    /// Mode a drop onto `target` would use.
    pub fn mode_for(&self, target: ColumnId) -> TransferMode {
        if target == self.origin {
            TransferMode::Move
        } else {
            TransferMode::Copy
        }
    }
}

/// Result of a completed drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// The entry moved inside its column.
    Moved {
        /// Column the move happened in.
        column: ColumnId,
        /// Index before the move.
        from: usize,
        /// Index after the move.
        to: usize,
    },
    /// A new entry was placed into another column.
    Copied {
        /// Column that received the copy.
        column: ColumnId,
        /// Index of the new entry.
        index: usize,
        /// Identity of the new entry.
        entry: EntryId,
    },
    /// The entry was dropped onto its own position; nothing changed.
    Unchanged {
        /// Column the drop happened in.
        column: ColumnId,
        /// Position of the entry.
        index: usize,
    },
}

impl DropOutcome {
    /// Mode that was applied, if the drop changed anything.
    pub fn mode(&self) -> Option<TransferMode> {
        match self {
            Self::Moved { .. } => Some(TransferMode::Move),
            Self::Copied { .. } => Some(TransferMode::Copy),
            Self::Unchanged { .. } => None,
        }
    }
}
