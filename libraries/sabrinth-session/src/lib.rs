//! Sabrinth Session
//!
//! The process-scoped context tying the engine together: one
//! [`Session`] owns the metadata store, the ingestion pipeline, the
//! playback controller and the persistent stores, and exposes the surface
//! an interactive host drives.
//!
//! Background ingestion workers never touch shared state directly; their
//! events flow through bounded channels and are applied to the queue inside
//! [`Session::pump`], on the host's thread.

mod error;
mod events;
mod session;

pub use error::{Result, SessionError};
pub use events::{RunId, SessionEvent};
pub use session::Session;
