mod entry;
mod stats;
mod tree;

pub use entry::{EntryKind, FsEntry};
pub use stats::{ProgressState, ScanResult};
pub use tree::{DirTree, TreeNode};
