//! Arranging pages loaded from disk.

use pdfdeck::arrange::{DropOutcome, PageLayout, PageRef, Workspace};
use tempfile::TempDir;

use crate::common::write_pdf;

#[tokio::test]
async fn test_load_creates_one_column_per_file() {
    let dir = TempDir::new().unwrap();
    let paths = vec![
        write_pdf(&dir, "a.pdf", "A", 3),
        write_pdf(&dir, "b.pdf", "B", 2),
    ];

    let mut workspace = Workspace::default();
    let (outcomes, stats) = workspace.load_documents(&paths).await;

    assert!(outcomes.iter().all(|(_, outcome)| outcome.is_ok()));
    assert_eq!(stats.total_pages, 5);
    assert_eq!(workspace.len(), 2);
    assert!(workspace.export_enabled());

    let lengths: Vec<usize> = workspace.columns().iter().map(|c| c.len()).collect();
    assert_eq!(lengths, vec![3, 2]);
}

#[tokio::test]
async fn test_loading_same_file_twice_gives_distinct_documents() {
    let dir = TempDir::new().unwrap();
    let path = write_pdf(&dir, "a.pdf", "A", 1);

    let mut workspace = Workspace::default();
    let first = workspace.load_document(&path).await.unwrap();
    let second = workspace.load_document(&path).await.unwrap();

    assert_ne!(
        workspace.column(first).unwrap().document_id(),
        workspace.column(second).unwrap().document_id()
    );
    assert_eq!(workspace.sources().len(), 2);
}

#[tokio::test]
async fn test_cross_column_copy_and_move() {
    let dir = TempDir::new().unwrap();
    let mut workspace = Workspace::default();
    let a = workspace
        .load_document(&write_pdf(&dir, "a.pdf", "A", 3))
        .await
        .unwrap();
    let b = workspace
        .load_document(&write_pdf(&dir, "b.pdf", "B", 2))
        .await
        .unwrap();
    let da = workspace.column(a).unwrap().document_id();
    let db = workspace.column(b).unwrap().document_id();

    // copy A.p2 to the top of b
    let transfer = workspace.begin_drag(a, 1).unwrap();
    let top = workspace.layout().anchor(0);
    let outcome = workspace.complete_drop(transfer, b, top).unwrap();
    assert!(matches!(outcome, DropOutcome::Copied { index: 0, .. }));

    // move it to the bottom of b
    let transfer = workspace.begin_drag(b, 0).unwrap();
    let bottom = workspace.layout().anchor(3);
    workspace.complete_drop(transfer, b, bottom).unwrap();

    let pages: Vec<PageRef> = workspace.column(b).unwrap().page_refs().collect();
    assert_eq!(
        pages,
        vec![PageRef::new(db, 0), PageRef::new(db, 1), PageRef::new(da, 1)]
    );
    assert_eq!(workspace.column(a).unwrap().len(), 3);
}

#[tokio::test]
async fn test_page_info_reads_media_box() {
    let dir = TempDir::new().unwrap();
    let mut workspace = Workspace::default();
    let a = workspace
        .load_document(&write_pdf(&dir, "a4.pdf", "A", 1))
        .await
        .unwrap();

    let page = workspace.column(a).unwrap().get(0).unwrap().page();
    let info = workspace.page_info(page).unwrap();

    assert_eq!((info.width, info.height), (595.0, 842.0));
    assert_eq!(info.rotation, 0);
}

#[tokio::test]
async fn test_unload_keeps_other_columns() {
    let dir = TempDir::new().unwrap();
    let paths = vec![
        write_pdf(&dir, "a.pdf", "A", 2),
        write_pdf(&dir, "b.pdf", "B", 2),
        write_pdf(&dir, "c.pdf", "C", 2),
    ];
    let mut workspace = Workspace::default();
    workspace.load_documents(&paths).await;

    let b = workspace.column_at(1).unwrap().id();
    workspace.set_selected(b, 0, true).unwrap();
    assert_eq!(workspace.unload_selected(), 1);

    let titles: Vec<&str> = workspace.columns().iter().map(|c| c.title()).collect();
    assert_eq!(titles, vec!["a.pdf", "c.pdf"]);
    assert_eq!(workspace.sources().len(), 2);
}
