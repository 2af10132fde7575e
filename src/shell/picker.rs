//! File picking for the shell.
//!
//! Stands in for an open/save dialog: open arguments are glob patterns or
//! directories, and an empty answer means the user cancelled.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::utils::collect_paths_for_patterns;

/// Files to open for `args`, in argument order.
///
/// A directory opens the PDF files directly inside it. A pattern matching
/// nothing is passed through unchanged so that loading it reports the
/// missing file. No arguments means the picker was cancelled.
pub fn open_paths<S: AsRef<str>>(args: &[S]) -> Result<Vec<PathBuf>> {
    let patterns: Vec<String> = args
        .iter()
        .map(|arg| {
            let arg = arg.as_ref();
            if Path::new(arg).is_dir() {
                let dir = glob::Pattern::escape(arg.trim_end_matches('/'));
                format!("{dir}/*.pdf")
            } else {
                arg.to_string()
            }
        })
        .collect();

    collect_paths_for_patterns(&patterns)
}

/// Destination for a save, or `None` when the picker was cancelled.
pub fn save_path(arg: Option<&Path>) -> Option<PathBuf> {
    arg.filter(|path| !path.as_os_str().is_empty())
        .map(Path::to_path_buf)
}
