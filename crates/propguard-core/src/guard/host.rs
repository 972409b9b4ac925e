//! Host process control

use parking_lot::Mutex;

/// Exit status used when startup is aborted
pub const STARTUP_ABORT_EXIT_CODE: i32 = 1;

/// Ends the hosting process when startup cannot complete safely
pub trait HostControl: Send + Sync {
    /// Terminate the host; `diagnostic` has already been reported
    ///
    /// Real hosts do not return from this call.
    fn terminate(&self, diagnostic: &str);
}

/// Exits the current process
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessHost;

impl HostControl for ProcessHost {
    fn terminate(&self, _diagnostic: &str) {
        std::process::exit(STARTUP_ABORT_EXIT_CODE);
    }
}

/// Records termination requests instead of exiting
///
/// For embedding the activator in tests, where the test process must keep
/// running to assert on the outcome.
#[derive(Debug, Default)]
pub struct RecordingHost {
    terminations: Mutex<Vec<String>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diagnostics of every termination request so far
    pub fn terminations(&self) -> Vec<String> {
        self.terminations.lock().clone()
    }

    pub fn was_terminated(&self) -> bool {
        !self.terminations.lock().is_empty()
    }
}

impl HostControl for RecordingHost {
    fn terminate(&self, diagnostic: &str) {
        self.terminations.lock().push(diagnostic.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_host() {
        let host = RecordingHost::new();
        assert!(!host.was_terminated());

        host.terminate("Unable to initialize vault, destroying container: boom");
        assert!(host.was_terminated());
        assert_eq!(host.terminations().len(), 1);
    }
}
