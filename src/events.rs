//! The event queue between background tasks and the single consumer that
//! renders them.
//!
//! Any task may hold an [`EventSender`]; the consumer owns the matching
//! [`EventQueue`] and either awaits the next event or drains whatever is
//! queued without blocking. Delivery is FIFO across all event kinds.

use std::fmt;

use chrono::Local;
use tokio::sync::mpsc;

use crate::core::MirrorOutcome;
use crate::models::{DirTree, ScanResult};

/// One line of the user-visible log.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LogMessage {
    pub timestamp: String,
    pub text: String,
}

impl LogMessage {
    pub fn now(text: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            text: text.into(),
        }
    }
}

impl fmt::Display for LogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp, self.text)
    }
}

/// Background work the session spawns.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TaskKind {
    Scan,
    Tree,
    Mirror,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scan => write!(f, "scan"),
            Self::Tree => write!(f, "tree"),
            Self::Mirror => write!(f, "mirror"),
        }
    }
}

#[derive(Debug)]
pub enum Event {
    Log(LogMessage),
    Status(String),
    /// Mirror progress in `0.0..=1.0`.
    Progress(f64),
    ScanFinished(ScanResult),
    TreeReady(DirTree),
    MirrorFinished(MirrorOutcome),
    /// A worker ended without producing its result. The failure has
    /// already been logged.
    TaskFailed(TaskKind),
}

#[derive(Clone, Debug)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<Event>,
}

impl EventSender {
    /// Queue an event. A closed queue means the consumer is gone, so the
    /// event is dropped.
    pub fn send(&self, event: Event) {
        let _ = self.tx.send(event);
    }

    pub fn log(&self, text: impl Into<String>) {
        let text = text.into();
        tracing::info!(target: "ghostfile::log", "{text}");
        self.send(Event::Log(LogMessage::now(text)));
    }

    /// Log a failure. The text is prefixed with `Error: `.
    pub fn error(&self, text: impl fmt::Display) {
        tracing::warn!(target: "ghostfile::log", "{text}");
        self.send(Event::Log(LogMessage::now(format!("Error: {text}"))));
    }

    pub fn status(&self, text: impl Into<String>) {
        self.send(Event::Status(text.into()));
    }

    pub fn progress(&self, fraction: f64) {
        self.send(Event::Progress(fraction));
    }
}

pub struct EventQueue {
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventQueue {
    /// Wait for the next event. Returns `None` once every sender is gone.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Take every event queued right now, oldest first. Never waits.
    pub fn drain(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}

pub fn channel() -> (EventSender, EventQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, EventQueue { rx })
}

#[cfg(test)]
pub(crate) fn log_lines(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::Log(message) => Some(message.text.clone()),
            _ => None,
        })
        .collect()
}
