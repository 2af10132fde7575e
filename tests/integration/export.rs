//! Exporting arrangements to disk.

use pdfdeck::arrange::{PageLayout, Workspace};
use pdfdeck::config::{CompressionLevel, Config, OverwriteMode};
use pdfdeck::merge::{ExportState, MergeExporter};
use tempfile::TempDir;

use crate::common::{page_markers, write_pdf};

#[tokio::test]
async fn test_merge_follows_rearranged_column_order() {
    let dir = TempDir::new().unwrap();
    let paths = vec![
        write_pdf(&dir, "a.pdf", "A", 2),
        write_pdf(&dir, "b.pdf", "B", 2),
        write_pdf(&dir, "c.pdf", "C", 2),
    ];
    let output = dir.path().join("merged.pdf");

    let mut workspace = Workspace::default();
    workspace.load_documents(&paths).await;
    let a = workspace.column_at(0).unwrap().id();
    let c = workspace.column_at(2).unwrap().id();

    // [C, A, B], then swap the pages of A
    workspace.move_column(c, 0).unwrap();
    let transfer = workspace.begin_drag(a, 1).unwrap();
    let top = workspace.layout().anchor(0);
    workspace.complete_drop(transfer, a, top).unwrap();

    let mut exporter = MergeExporter::new();
    let (report, _) = exporter.save_workspace(&workspace, &output).await.unwrap();

    assert_eq!(report.pages, 6);
    assert_eq!(exporter.state(), ExportState::Done);
    assert_eq!(
        page_markers(&output),
        vec!["C-1", "C-2", "A-2", "A-1", "B-1", "B-2"]
    );
}

#[tokio::test]
async fn test_scenario_copy_then_merge() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("merged.pdf");
    let mut workspace = Workspace::default();
    let a = workspace
        .load_document(&write_pdf(&dir, "a.pdf", "A", 3))
        .await
        .unwrap();
    let b = workspace
        .load_document(&write_pdf(&dir, "b.pdf", "B", 2))
        .await
        .unwrap();

    let transfer = workspace.begin_drag(a, 1).unwrap();
    let top = workspace.layout().anchor(0);
    workspace.complete_drop(transfer, b, top).unwrap();

    MergeExporter::new()
        .save_workspace(&workspace, &output)
        .await
        .unwrap();

    assert_eq!(
        page_markers(&output),
        vec!["A-1", "A-2", "A-3", "A-2", "B-1", "B-2"]
    );
}

#[tokio::test]
async fn test_save_single_column_with_duplicates() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("column.pdf");
    let mut workspace = Workspace::default();
    let a = workspace
        .load_document(&write_pdf(&dir, "a.pdf", "A", 2))
        .await
        .unwrap();
    let b = workspace
        .load_document(&write_pdf(&dir, "b.pdf", "B", 1))
        .await
        .unwrap();

    for _ in 0..2 {
        let transfer = workspace.begin_drag(a, 0).unwrap();
        let end = workspace.layout().anchor(10);
        workspace.complete_drop(transfer, b, end).unwrap();
    }

    let config = Config {
        compression: CompressionLevel::Maximum,
        ..Config::default()
    };
    MergeExporter::from_config(&config)
        .save_column(&workspace, b, &output)
        .await
        .unwrap();

    assert_eq!(page_markers(&output), vec!["B-1", "A-1", "A-1"]);
}

#[tokio::test]
async fn test_exported_column_of_deleted_pages_is_empty_pdf() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("empty.pdf");
    let mut workspace = Workspace::default();
    let a = workspace
        .load_document(&write_pdf(&dir, "a.pdf", "A", 2))
        .await
        .unwrap();

    workspace.select_all(a, true).unwrap();
    workspace.delete_selected(a).unwrap();
    assert_eq!(workspace.len(), 1);

    MergeExporter::new()
        .save_column(&workspace, a, &output)
        .await
        .unwrap();

    assert!(page_markers(&output).is_empty());
}

#[tokio::test]
async fn test_force_overwrites_existing_output() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.pdf");
    std::fs::write(&output, b"stale").unwrap();
    let mut workspace = Workspace::default();
    let a = workspace
        .load_document(&write_pdf(&dir, "a.pdf", "A", 1))
        .await
        .unwrap();

    let config = Config {
        overwrite_mode: OverwriteMode::Force,
        ..Config::default()
    };
    MergeExporter::from_config(&config)
        .save_column(&workspace, a, &output)
        .await
        .unwrap();

    assert_eq!(page_markers(&output), vec!["A-1"]);
}
