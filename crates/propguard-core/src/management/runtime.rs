//! Runtime introspection capability and the process implementation

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use crate::properties::SystemProperties;

/// Read-only view of the running process, as exposed to remote inspectors
pub trait RuntimeIntrospection: Send + Sync {
    /// Runtime name, `<pid>@<host>` for the process view
    fn name(&self) -> String;

    fn pid(&self) -> u32;

    /// Wall-clock time the runtime started
    fn start_time(&self) -> SystemTime;

    fn uptime(&self) -> Duration;

    /// Command-line arguments the runtime was started with
    fn input_arguments(&self) -> Vec<String>;

    /// Every system property
    fn system_properties(&self) -> BTreeMap<String, String>;

    /// One system property
    fn system_property(&self, key: &str) -> Option<String>;
}

/// Introspection over the current process and its property table
#[derive(Debug)]
pub struct ProcessRuntime {
    properties: Arc<SystemProperties>,
    started: Instant,
    start_time: SystemTime,
    arguments: Vec<String>,
}

impl ProcessRuntime {
    pub fn new(properties: Arc<SystemProperties>) -> Self {
        Self {
            properties,
            started: Instant::now(),
            start_time: SystemTime::now(),
            arguments: std::env::args().skip(1).collect(),
        }
    }

    /// Override the reported arguments
    pub fn with_arguments(mut self, arguments: Vec<String>) -> Self {
        self.arguments = arguments;
        self
    }
}

fn host_name() -> String {
    std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .unwrap_or_else(|_| "localhost".to_string())
}

impl RuntimeIntrospection for ProcessRuntime {
    fn name(&self) -> String {
        format!("{}@{}", self.pid(), host_name())
    }

    fn pid(&self) -> u32 {
        std::process::id()
    }

    fn start_time(&self) -> SystemTime {
        self.start_time
    }

    fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    fn input_arguments(&self) -> Vec<String> {
        self.arguments.clone()
    }

    fn system_properties(&self) -> BTreeMap<String, String> {
        self.properties.snapshot()
    }

    fn system_property(&self, key: &str) -> Option<String> {
        self.properties.get(key)
    }
}
