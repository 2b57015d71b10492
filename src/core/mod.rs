mod filter;
mod mirror;
mod render;
mod scan;

pub use filter::{EntryFilter, WalkOptions};
pub use mirror::{
    MirrorOutcome, MirrorRequest, MirrorStatus, mirror_structure, normalize_path, validate,
};
pub use render::{progress_bar, root_display_name, write_tree};
pub use scan::{build_tree, count_entries};
