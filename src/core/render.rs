use std::io::{self, Write};
use std::path::Path;

use crate::models::{DirTree, TreeNode};

pub fn root_display_name(root_path: &Path, is_current_dir: bool) -> String {
    if is_current_dir {
        return ".".to_owned();
    }

    root_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| root_path.as_os_str().to_string_lossy().into_owned())
}

/// Write `tree` as an ASCII tree under a `root_label` line. Directories get
/// a trailing `/`; nodes that could not be listed are annotated.
pub fn write_tree<W: Write>(writer: &mut W, root_label: &str, tree: &DirTree) -> io::Result<()> {
    writer.write_all(root_label.as_bytes())?;
    if let Some(error) = tree.error.as_ref() {
        write!(writer, " [error: {error}]")?;
    }
    writer.write_all(b"\n")?;
    write_level(writer, &tree.children, &mut Vec::new())
}

fn write_level<W: Write>(
    writer: &mut W,
    nodes: &[TreeNode],
    ancestor_has_more: &mut Vec<bool>,
) -> io::Result<()> {
    for (index, node) in nodes.iter().enumerate() {
        let is_last = index + 1 == nodes.len();

        for &has_more in ancestor_has_more.iter() {
            writer.write_all(if has_more { b"|   " } else { b"    " })?;
        }
        writer.write_all(if is_last { b"`-- " } else { b"|-- " })?;
        writer.write_all(node.name.as_bytes())?;
        if node.is_directory() {
            writer.write_all(b"/")?;
        }
        if let Some(error) = node.error.as_ref() {
            write!(writer, " [error: {error}]")?;
        }
        writer.write_all(b"\n")?;

        if !node.children.is_empty() {
            ancestor_has_more.push(!is_last);
            write_level(writer, &node.children, ancestor_has_more)?;
            ancestor_has_more.pop();
        }
    }

    Ok(())
}

/// A fixed-width text progress bar such as `[#####-----]  50%`.
pub fn progress_bar(fraction: f64, width: usize) -> String {
    let fraction = fraction.clamp(0.0, 1.0);
    let filled = ((fraction * width as f64).round() as usize).min(width);
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(width - filled),
        (fraction * 100.0).floor() as u32
    )
}
