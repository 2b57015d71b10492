use std::collections::HashSet;

use anyhow::Context;
use regex::RegexSet;

use crate::models::FsEntry;

/// Traversal settings shared by the scanner, the tree builder and the
/// mirror. All three must see the same options so scan totals line up with
/// the entries the mirror creates.
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Pipe-separated names to skip (e.g. "node_modules|.git|*.tmp").
    pub exclude: Option<String>,
}

/// Compiled form of [`WalkOptions::exclude`].
///
/// Plain names are matched through a hash set; only segments with `*` or
/// `?` go through the regex set.
#[derive(Debug, Default)]
pub struct EntryFilter {
    names: HashSet<String>,
    globs: Option<RegexSet>,
}

impl EntryFilter {
    pub fn new(options: &WalkOptions) -> anyhow::Result<Self> {
        let Some(pattern) = options.exclude.as_deref() else {
            return Ok(Self::default());
        };

        let mut names = HashSet::new();
        let mut globs = Vec::new();
        for segment in pattern.split('|').map(str::trim).filter(|s| !s.is_empty()) {
            if segment.contains(['*', '?']) {
                globs.push(glob_to_regex(segment));
            } else {
                names.insert(segment.to_owned());
            }
        }

        let globs = if globs.is_empty() {
            None
        } else {
            Some(
                RegexSet::new(&globs)
                    .with_context(|| format!("invalid exclude pattern: {pattern}"))?,
            )
        };

        Ok(Self { names, globs })
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.names.contains(name)
            || self
                .globs
                .as_ref()
                .is_some_and(|globs| globs.is_match(name))
    }

    pub fn allows(&self, entry: &FsEntry) -> bool {
        !self.is_excluded(&entry.name)
    }
}

fn glob_to_regex(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() * 2 + 2);
    out.push('^');
    let mut literal = String::new();
    for c in glob.chars() {
        match c {
            '*' | '?' => {
                out.push_str(&regex::escape(&literal));
                literal.clear();
                out.push_str(if c == '*' { ".*" } else { "." });
            }
            _ => literal.push(c),
        }
    }
    out.push_str(&regex::escape(&literal));
    out.push('$');
    out
}
