//! Structure-only directory mirroring.
//!
//! [`Session`] drives the interactive flow: selecting a source starts a
//! background scan (entry counts plus a display tree), and triggering the
//! operation recreates the source's directories under a destination with an
//! empty file in place of every file. Results and log lines come back through
//! the [`events`] queue.

pub mod cli;
pub mod core;
pub mod error;
pub mod events;
pub mod fs;
pub mod models;
pub mod session;

pub use error::Error;
pub use session::{Session, SessionOptions, TriggerState};
