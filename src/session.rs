//! Interactive flow: select a source (scan + tree), select a destination,
//! trigger the mirror.
//!
//! A [`Session`] is owned by the consumer of the event queue. Background
//! tasks never touch it; they report through events, and the consumer feeds
//! every event back through [`Session::handle`] so the session can record
//! scan results and return the trigger to idle.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::core::{
    EntryFilter, MirrorOutcome, MirrorRequest, WalkOptions, build_tree, count_entries,
    mirror_structure,
};
use crate::error::Error;
use crate::events::{Event, EventSender, TaskKind};
use crate::fs::FileSystem;
use crate::models::ScanResult;

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub walk: WalkOptions,
    /// Build the display tree alongside each scan.
    pub build_tree: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            walk: WalkOptions::default(),
            build_tree: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TriggerState {
    Idle,
    Running,
}

pub struct Session<F> {
    fs: Arc<F>,
    filter: Arc<EntryFilter>,
    events: EventSender,
    build_tree: bool,
    source: Option<PathBuf>,
    destination: Option<PathBuf>,
    last_scan: Option<ScanResult>,
    state: TriggerState,
    scan_cancel: CancellationToken,
    mirror_cancel: Option<CancellationToken>,
}

impl<F: FileSystem + 'static> Session<F> {
    /// Fails only if the exclude pattern does not compile.
    pub fn new(fs: F, options: SessionOptions, events: EventSender) -> anyhow::Result<Self> {
        Ok(Self {
            fs: Arc::new(fs),
            filter: Arc::new(EntryFilter::new(&options.walk)?),
            events,
            build_tree: options.build_tree,
            source: None,
            destination: None,
            last_scan: None,
            state: TriggerState::Idle,
            scan_cancel: CancellationToken::new(),
            mirror_cancel: None,
        })
    }

    pub fn state(&self) -> TriggerState {
        self.state
    }

    pub fn last_scan(&self) -> Option<&ScanResult> {
        self.last_scan.as_ref()
    }

    /// Select a source and start scanning it in the background. Any scan
    /// still running for a previous source is cancelled.
    pub fn select_source(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.events.log(format!("Source selected: {}", path.display()));
        self.set_source(path.clone());

        self.scan_cancel.cancel();
        self.scan_cancel = CancellationToken::new();
        self.events.status("Scanning...");

        let (fs, filter, events, cancel) = self.task_parts(&self.scan_cancel);
        let root = path.clone();
        tokio::spawn(async move {
            let counted = supervise(events.clone(), TaskKind::Scan, {
                let (events, cancel) = (events.clone(), cancel.clone());
                async move { count_entries(&*fs, &root, &filter, &events, &cancel).await }
            })
            .await;
            match counted {
                Some(_) if cancel.is_cancelled() => {}
                Some(result) => {
                    events.status(result.status_line());
                    events.send(Event::ScanFinished(result));
                }
                None => events.send(Event::TaskFailed(TaskKind::Scan)),
            }
        });

        if !self.build_tree {
            return;
        }
        let (fs, filter, events, cancel) = self.task_parts(&self.scan_cancel);
        tokio::spawn(async move {
            let built = supervise(events.clone(), TaskKind::Tree, {
                let (events, cancel) = (events.clone(), cancel.clone());
                async move { build_tree(&*fs, &path, &filter, &events, &cancel).await }
            })
            .await;
            match built {
                Some(_) if cancel.is_cancelled() => {}
                Some(tree) => events.send(Event::TreeReady(tree)),
                None => events.send(Event::TaskFailed(TaskKind::Tree)),
            }
        });
    }

    /// Change the source path without scanning it. The last scan total is
    /// kept, so progress for the next mirror may be based on a stale count.
    pub fn set_source(&mut self, path: impl Into<PathBuf>) {
        self.source = Some(path.into());
    }

    pub fn select_destination(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.events
            .log(format!("Destination selected: {}", path.display()));
        self.destination = Some(path);
    }

    /// Start mirroring the selected source into the selected destination.
    ///
    /// Missing paths are not checked here: the mirror itself reports them
    /// through the log and finishes immediately.
    pub fn execute(&mut self) -> Result<(), Error> {
        if self.state == TriggerState::Running {
            return Err(Error::AlreadyRunning);
        }
        self.state = TriggerState::Running;
        self.events.progress(0.0);

        let request = MirrorRequest {
            source: self.source.clone().unwrap_or_default(),
            destination: self.destination.clone().unwrap_or_default(),
            total: self.last_scan.as_ref().map_or(0, ScanResult::total),
        };
        info!(total = request.total, "mirror triggered");

        let token = CancellationToken::new();
        self.mirror_cancel = Some(token.clone());
        let (fs, filter, events, cancel) = self.task_parts(&token);
        tokio::spawn(async move {
            let outcome = supervise(events.clone(), TaskKind::Mirror, {
                let events = events.clone();
                async move {
                    mirror_structure(&*fs, &request, &filter, &events, &cancel).await
                }
            })
            .await
            .unwrap_or_else(MirrorOutcome::failed);
            events.send(Event::MirrorFinished(outcome));
        });
        Ok(())
    }

    /// Ask a running mirror to stop at its next step.
    pub fn cancel(&self) {
        if let Some(token) = &self.mirror_cancel {
            self.events.log("Cancelling operation...");
            token.cancel();
        }
    }

    /// Apply an event to the session. Must see every event taken from the
    /// queue.
    pub fn handle(&mut self, event: &Event) {
        match event {
            Event::ScanFinished(result)
                if self.source.as_deref() == Some(result.root.as_path()) =>
            {
                self.last_scan = Some(result.clone());
            }
            Event::MirrorFinished(_) => {
                self.state = TriggerState::Idle;
                self.mirror_cancel = None;
            }
            _ => {}
        }
    }

    fn task_parts(
        &self,
        cancel: &CancellationToken,
    ) -> (Arc<F>, Arc<EntryFilter>, EventSender, CancellationToken) {
        (
            Arc::clone(&self.fs),
            Arc::clone(&self.filter),
            self.events.clone(),
            cancel.clone(),
        )
    }
}

/// Run `work` as its own task and wait for it. A panic inside the task is
/// logged and turned into `None`.
async fn supervise<T, W>(events: EventSender, kind: TaskKind, work: W) -> Option<T>
where
    T: Send + 'static,
    W: Future<Output = T> + Send + 'static,
{
    match tokio::spawn(work).await {
        Ok(value) => Some(value),
        Err(err) => {
            error!(task = %kind, error = %err, "worker failed");
            events.error(format!("{kind} worker failed: {err}"));
            None
        }
    }
}
