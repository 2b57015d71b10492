use std::path::{Component, Path, PathBuf};
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::Error;
use crate::events::EventSender;
use crate::fs::FileSystem;
use crate::models::ProgressState;

use super::filter::EntryFilter;

#[derive(Clone, Debug, Default)]
pub struct MirrorRequest {
    /// An empty path means "not selected".
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Entry total from the most recent scan; may be stale.
    pub total: u64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MirrorStatus {
    /// The whole source was walked. Individual entries may still have failed.
    Completed,
    Cancelled,
    /// The request was refused before touching the filesystem.
    Rejected,
    /// The worker died before reporting.
    Failed,
}

#[derive(Clone, Debug)]
pub struct MirrorOutcome {
    pub status: MirrorStatus,
    pub progress: ProgressState,
    pub failed_entries: u64,
    pub elapsed: Duration,
}

impl MirrorOutcome {
    fn finished(
        status: MirrorStatus,
        progress: ProgressState,
        failed_entries: u64,
        started: Instant,
    ) -> Self {
        Self {
            status,
            progress,
            failed_entries,
            elapsed: started.elapsed(),
        }
    }

    pub(crate) fn failed() -> Self {
        Self {
            status: MirrorStatus::Failed,
            progress: ProgressState::default(),
            failed_entries: 0,
            elapsed: Duration::ZERO,
        }
    }
}

/// Check a request before anything is written.
///
/// Paths are compared after [`normalize_path`], so `.` and `..` cannot hide a
/// destination inside the source. Symlinks are not resolved here.
pub fn validate(source: &Path, destination: &Path) -> Result<(), Error> {
    if source.as_os_str().is_empty() || destination.as_os_str().is_empty() {
        return Err(Error::MissingPaths);
    }
    let source = normalize_path(source);
    let destination = normalize_path(destination);
    if source == destination {
        return Err(Error::SamePath);
    }
    if destination.starts_with(&source) {
        return Err(Error::DestinationInsideSource {
            source_root: source,
            destination,
        });
    }
    Ok(())
}

/// Lexically drop `.` components and fold `..` into its parent. A `..` at
/// the root stays at the root.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other),
        }
    }
    normalized
}

/// Recreate the directory structure of `request.source` under
/// `request.destination`, with an empty file standing in for every
/// non-directory entry.
///
/// The walk is top-down: a directory is created before it is listed, then
/// its files are created, then its subdirectories are visited in listing
/// order. Existing directories are reused and existing files truncated.
/// Failures are logged per entry and the walk continues; a directory that
/// cannot be created or listed is skipped along with its subtree.
pub async fn mirror_structure<F: FileSystem>(
    fs: &F,
    request: &MirrorRequest,
    filter: &EntryFilter,
    events: &EventSender,
    cancel: &CancellationToken,
) -> MirrorOutcome {
    let started = Instant::now();
    let mut progress = ProgressState::new(request.total);

    if let Err(err) = validate(&request.source, &request.destination) {
        events.error(err);
        return MirrorOutcome::finished(MirrorStatus::Rejected, progress, 0, started);
    }

    info!(
        source = %request.source.display(),
        destination = %request.destination.display(),
        total = request.total,
        "mirror started"
    );
    events.log(format!(
        "Mirroring {} into {}",
        request.source.display(),
        request.destination.display()
    ));

    let mut failed = 0;
    let mut pending = vec![(request.source.clone(), request.destination.clone())];

    while let Some((src_dir, dst_dir)) = pending.pop() {
        if cancel.is_cancelled() {
            return cancelled(events, progress, failed, started);
        }

        if let Err(err) = fs.create_dir_all(&dst_dir).await {
            failed += 1;
            events.error(format!("{err:#}"));
            continue;
        }
        step(&mut progress, events);

        let entries = match fs.read_dir(&src_dir).await {
            Ok(entries) => entries,
            Err(err) => {
                failed += 1;
                events.error(format!("{err:#}"));
                continue;
            }
        };

        let mut subdirs = Vec::new();
        for entry in entries.into_iter().filter(|e| filter.allows(e)) {
            let target = dst_dir.join(&entry.name);
            if entry.kind.is_directory() {
                subdirs.push((entry.path, target));
                continue;
            }

            if cancel.is_cancelled() {
                return cancelled(events, progress, failed, started);
            }

            match fs.create_empty_file(&target).await {
                Ok(()) => step(&mut progress, events),
                Err(err) => {
                    failed += 1;
                    events.error(format!("{err:#}"));
                }
            }
        }
        debug!(dir = %dst_dir.display(), subdirs = subdirs.len(), "mirrored");

        pending.extend(subdirs.into_iter().rev());
    }

    let outcome = MirrorOutcome::finished(MirrorStatus::Completed, progress, failed, started);
    if failed > 0 {
        events.log(format!("{failed} entries could not be mirrored"));
    }
    events.log(format!(
        "Operation completed successfully in {:.2} seconds",
        outcome.elapsed.as_secs_f64()
    ));
    events.status("Completed");
    info!(completed = progress.completed, failed, "mirror finished");
    outcome
}

fn step(progress: &mut ProgressState, events: &EventSender) {
    let fraction = progress.advance();
    events.progress(fraction);
    events.status(progress.status_line());
}

fn cancelled(
    events: &EventSender,
    progress: ProgressState,
    failed: u64,
    started: Instant,
) -> MirrorOutcome {
    events.log("Operation was cancelled by user");
    events.status("Cancelled");
    info!(completed = progress.completed, "mirror cancelled");
    MirrorOutcome::finished(MirrorStatus::Cancelled, progress, failed, started)
}
