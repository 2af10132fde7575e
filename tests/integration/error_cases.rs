//! Failures that must leave the workspace and the filesystem untouched.

use pdfdeck::PdfDeckError;
use pdfdeck::arrange::Workspace;
use pdfdeck::merge::{ExportState, MergeExporter};
use tempfile::TempDir;

use crate::common::write_pdf;

#[tokio::test]
async fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let mut workspace = Workspace::default();

    let err = workspace
        .load_document(&dir.path().join("nope.pdf"))
        .await
        .unwrap_err();

    assert!(matches!(err, PdfDeckError::FileNotFound { .. }));
    assert!(err.is_document_open_error());
    assert!(workspace.is_empty());
}

#[tokio::test]
async fn test_corrupt_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("corrupt.pdf");
    std::fs::write(&path, b"this is not a pdf").unwrap();
    let mut workspace = Workspace::default();

    let err = workspace.load_document(&path).await.unwrap_err();

    assert!(matches!(err, PdfDeckError::DocumentOpen { .. }));
    assert!(workspace.is_empty());
}

#[tokio::test]
async fn test_bad_file_does_not_block_others() {
    let dir = TempDir::new().unwrap();
    let bad = dir.path().join("bad.pdf");
    std::fs::write(&bad, b"garbage").unwrap();
    let paths = vec![write_pdf(&dir, "a.pdf", "A", 1), bad, write_pdf(&dir, "b.pdf", "B", 1)];

    let mut workspace = Workspace::default();
    let (outcomes, stats) = workspace.load_documents(&paths).await;

    assert_eq!(stats.failure_count, 1);
    assert!(outcomes[1].1.is_err());
    assert_eq!(workspace.len(), 2);
}

#[tokio::test]
async fn test_vanished_source_aborts_without_output() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("merged.pdf");
    let a_path = write_pdf(&dir, "a.pdf", "A", 1);
    let b_path = write_pdf(&dir, "b.pdf", "B", 1);

    let mut workspace = Workspace::default();
    workspace.load_document(&a_path).await.unwrap();
    workspace.load_document(&b_path).await.unwrap();
    std::fs::remove_file(&b_path).unwrap();

    let mut exporter = MergeExporter::new();
    let err = exporter
        .save_workspace(&workspace, &output)
        .await
        .unwrap_err();

    assert!(matches!(err, PdfDeckError::SourcePageMissing { .. }));
    assert_eq!(exporter.state(), ExportState::Failed);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_unwritable_destination() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"a file, not a directory").unwrap();
    let output = blocker.join("merged.pdf");

    let mut workspace = Workspace::default();
    let a = workspace
        .load_document(&write_pdf(&dir, "a.pdf", "A", 1))
        .await
        .unwrap();

    let err = MergeExporter::new()
        .save_column(&workspace, a, &output)
        .await
        .unwrap_err();

    assert!(matches!(err, PdfDeckError::ExportIo { .. }));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_second_drag_rejected() {
    let dir = TempDir::new().unwrap();
    let mut workspace = Workspace::default();
    let a = workspace
        .load_document(&write_pdf(&dir, "a.pdf", "A", 2))
        .await
        .unwrap();

    let transfer = workspace.begin_drag(a, 0).unwrap();
    let err = workspace.begin_drag(a, 1).unwrap_err();

    assert!(matches!(err, PdfDeckError::DragInProgress));
    assert!(err.is_contract_violation());
    workspace.cancel_drag(transfer);
}
