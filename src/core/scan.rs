use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::events::EventSender;
use crate::fs::FileSystem;
use crate::models::{DirTree, FsEntry, ScanResult, TreeNode};

use super::filter::EntryFilter;

/// Count every file and subdirectory below `root`.
///
/// Each directory is listed once. A listing failure is logged and counted in
/// `error_count`; the rest of the walk carries on. The status line is
/// refreshed after each visited directory. Cancellation stops the walk
/// between directories and returns the partial totals.
pub async fn count_entries<F: FileSystem>(
    fs: &F,
    root: &Path,
    filter: &EntryFilter,
    events: &EventSender,
    cancel: &CancellationToken,
) -> ScanResult {
    let mut result = ScanResult::new(root);
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        if cancel.is_cancelled() {
            debug!(root = %root.display(), "scan cancelled");
            break;
        }

        let entries = match fs.read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) => {
                result.error_count += 1;
                events.error(format!("{err:#}"));
                continue;
            }
        };
        debug!(dir = %dir.display(), entries = entries.len(), "scanned");

        for entry in entries.into_iter().filter(|e| filter.allows(e)) {
            if entry.kind.is_directory() {
                result.dir_count += 1;
                pending.push(entry.path);
            } else {
                result.file_count += 1;
            }
        }

        events.status(result.status_line());
    }

    result
}

/// Build the display tree for `root`.
///
/// Siblings keep directory-listing order. A directory that cannot be listed
/// keeps its node, carries the error, and is not descended into.
pub async fn build_tree<F: FileSystem>(
    fs: &F,
    root: &Path,
    filter: &EntryFilter,
    events: &EventSender,
    cancel: &CancellationToken,
) -> DirTree {
    match fs.read_dir(root).await {
        Ok(entries) => DirTree {
            root: root.to_path_buf(),
            error: None,
            children: build_children(fs, entries, filter, events, cancel).await,
        },
        Err(err) => {
            events.error(format!("{err:#}"));
            DirTree {
                root: root.to_path_buf(),
                error: Some(err.root_cause().to_string()),
                children: Vec::new(),
            }
        }
    }
}

type Children<'a> = Pin<Box<dyn Future<Output = Vec<TreeNode>> + Send + 'a>>;

fn build_children<'a, F: FileSystem>(
    fs: &'a F,
    entries: Vec<FsEntry>,
    filter: &'a EntryFilter,
    events: &'a EventSender,
    cancel: &'a CancellationToken,
) -> Children<'a> {
    Box::pin(async move {
        let mut children = Vec::with_capacity(entries.len());
        for entry in entries.into_iter().filter(|e| filter.allows(e)) {
            if cancel.is_cancelled() {
                break;
            }

            let mut node = TreeNode {
                name: entry.name,
                kind: entry.kind,
                error: None,
                children: Vec::new(),
            };

            if entry.kind.is_directory() {
                match fs.read_dir(&entry.path).await {
                    Ok(grandchildren) => {
                        node.children =
                            build_children(fs, grandchildren, filter, events, cancel).await;
                    }
                    Err(err) => {
                        events.error(format!("{err:#}"));
                        node.error = Some(err.root_cause().to_string());
                    }
                }
            }

            children.push(node);
        }
        children
    })
}
