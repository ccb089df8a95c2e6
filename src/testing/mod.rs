//! Headless testing framework: Pilot, outline snapshots.
//!
//! Use the [`Pilot`] to drive a [`ProjectSession`](crate::session::ProjectSession)
//! with simulated pointer and keyboard input. Use [`outline`] to capture a
//! subtree as plain text for snapshot-style assertions.

pub mod pilot;
pub mod snapshot;

pub use pilot::Pilot;
pub use snapshot::outline;
