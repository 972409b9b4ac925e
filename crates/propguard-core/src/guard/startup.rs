//! Startup failure guard

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;

use super::host::HostControl;
use crate::logging::SharedLogger;
use crate::resolver::ResolutionError;
use crate::{log_debug, log_error, log_warn};

/// Where operator-facing diagnostics are written
pub type OperatorStream = Box<dyn Write + Send>;

/// Progress of one activation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    NotStarted,
    /// Stores are being opened and references resolved
    Initializing,
    Ready,
    /// Terminal; the host has been asked to exit
    Failed,
}

impl fmt::Display for GuardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GuardState::NotStarted => "not started",
            GuardState::Initializing => "initializing",
            GuardState::Ready => "ready",
            GuardState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// The operator diagnostic for a fatal resolution error
pub fn diagnostic(error: &ResolutionError) -> String {
    let store = error
        .store_kind()
        .map_or("secret store", |kind| kind.display_name());
    let cause = match error {
        ResolutionError::StoreInitialization { message, .. } => message.clone(),
        other => other.to_string(),
    };
    format!("Unable to initialize {}, destroying container: {}", store, cause)
}

/// Aborts the host when a store fails while references are pending
///
/// `NotStarted -> Initializing -> Ready | Failed`. A guard that reached
/// `Ready` can be [`reset`](StartupGuard::reset) after shutdown so the next
/// activation starts over; `Failed` is final.
pub struct StartupGuard {
    state: Mutex<GuardState>,
    host: Arc<dyn HostControl>,
    logger: SharedLogger,
    operator: Mutex<OperatorStream>,
    last_diagnostic: Mutex<Option<String>>,
}

impl StartupGuard {
    /// A guard reporting to stderr
    pub fn new(host: Arc<dyn HostControl>, logger: SharedLogger) -> Self {
        Self::with_operator_stream(host, logger, Box::new(std::io::stderr()))
    }

    pub fn with_operator_stream(
        host: Arc<dyn HostControl>,
        logger: SharedLogger,
        operator: OperatorStream,
    ) -> Self {
        Self {
            state: Mutex::new(GuardState::NotStarted),
            host,
            logger,
            operator: Mutex::new(operator),
            last_diagnostic: Mutex::new(None),
        }
    }

    pub fn state(&self) -> GuardState {
        *self.state.lock()
    }

    /// The diagnostic reported by the last failure, if any
    pub fn last_diagnostic(&self) -> Option<String> {
        self.last_diagnostic.lock().clone()
    }

    fn transition(&self, from: &[GuardState], to: GuardState) -> bool {
        let mut state = self.state.lock();
        if from.contains(&*state) {
            *state = to;
            true
        } else {
            false
        }
    }

    /// Enter `Initializing`; false unless the guard was `NotStarted`
    pub fn begin(&self) -> bool {
        self.transition(&[GuardState::NotStarted], GuardState::Initializing)
    }

    /// Enter `Ready`, also straight from `NotStarted` when nothing needed
    /// initializing
    pub fn ready(&self) -> bool {
        self.transition(
            &[GuardState::NotStarted, GuardState::Initializing],
            GuardState::Ready,
        )
    }

    /// Back to `NotStarted` after a clean shutdown
    pub fn reset(&self) -> bool {
        self.transition(&[GuardState::Ready], GuardState::NotStarted)
    }

    /// Report `error` and terminate the host
    ///
    /// Writes the diagnostic to the operator stream, logs it, moves to
    /// `Failed` and calls the host control. Returns the diagnostic for
    /// hosts whose control returns.
    pub fn fail(&self, error: &ResolutionError) -> String {
        let message = diagnostic(error);

        let written = {
            let mut operator = self.operator.lock();
            write!(operator, "\r\n{}\n", message).and_then(|()| operator.flush())
        };
        if let Err(e) = written {
            log_warn!(self.logger, "Operator diagnostic could not be written: {}", e);
        }
        log_error!(self.logger, "{}", message);
        log_debug!(self.logger, "Startup aborted in state '{}': {:?}", self.state(), error);

        *self.state.lock() = GuardState::Failed;
        *self.last_diagnostic.lock() = Some(message.clone());

        self.host.terminate(&message);
        message
    }
}

impl fmt::Debug for StartupGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StartupGuard")
            .field("state", &self.state())
            .field("last_diagnostic", &self.last_diagnostic())
            .finish()
    }
}
