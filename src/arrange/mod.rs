//! Page arrangement: columns of page entries, drag and drop between them,
//! and the workspace that owns it all.

pub mod column;
pub mod drag;
pub mod layout;
pub mod page;
pub mod workspace;

pub use column::{Column, ColumnId};
pub use drag::{DragTransfer, DropOutcome, TransferMode};
pub use layout::{PageLayout, Point, Rect, StackLayout};
pub use page::{DocumentId, EntryId, PageEntry, PageRef};
pub use workspace::{SourceRegistry, Workspace};
