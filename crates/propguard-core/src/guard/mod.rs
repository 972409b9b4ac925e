//! Startup failure guard
//!
//! A process carrying secret references must not keep running with the
//! reference strings in place of its credentials. When a store cannot be
//! opened, the guard tells the operator and ends the host.

mod host;
mod startup;

pub use host::{HostControl, ProcessHost, RecordingHost, STARTUP_ABORT_EXIT_CODE};
pub use startup::{diagnostic, GuardState, OperatorStream, StartupGuard};
