//! Activation and deactivation of secret substitution

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::Mutex;

use super::error::{ActivationError, ActivationResult};
use crate::config::{ProcessEnvironment, SharedEnvironment};
use crate::filter::SensitiveValueFilter;
use crate::guard::{GuardState, HostControl, OperatorStream, ProcessHost, StartupGuard};
use crate::logging::{NoOpLogger, SharedLogger};
use crate::management::ManagementSurface;
use crate::properties::SystemProperties;
use crate::reference::StoreKind;
use crate::resolver::{self, ResolutionError, StoreHandle, StoreHandles};
use crate::substitution::{self, SubstitutionRecord};
use crate::{log_debug, log_info};

/// What one successful activation changed
#[derive(Debug, Default)]
struct Activation {
    record: SubstitutionRecord,
    handles: StoreHandles,
}

/// Resolves secret references in a property table at startup and undoes
/// the substitution at shutdown
///
/// `start` scans the table, opens the stores the references point into,
/// substitutes every resolvable reference, and redacts the substituted keys
/// on the management surface. A store that cannot be opened aborts the
/// host through the [`StartupGuard`]. `stop` puts the reference strings
/// back, removes the redaction and unloads the stores, after which `start`
/// may run again. A substituted value is never readable through the
/// management surface in between.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use propguard_core::activator::SecretsActivator;
/// use propguard_core::properties::SystemProperties;
///
/// let properties = Arc::new(SystemProperties::with_entries([("app.name", "demo")]));
/// let activator = SecretsActivator::builder(properties).build();
///
/// // No references: nothing is opened and nothing is redacted
/// activator.start().unwrap();
/// assert!(activator.substituted_keys().is_empty());
/// activator.stop();
/// ```
pub struct SecretsActivator {
    properties: Arc<SystemProperties>,
    environment: SharedEnvironment,
    filter: SensitiveValueFilter,
    guard: StartupGuard,
    logger: SharedLogger,
    active: Mutex<Activation>,
}

impl SecretsActivator {
    pub fn builder(properties: Arc<SystemProperties>) -> SecretsActivatorBuilder {
        SecretsActivatorBuilder::new(properties)
    }

    /// Scan, resolve, substitute and redact
    ///
    /// A no-op once the activator is ready.
    pub fn start(&self) -> ActivationResult<()> {
        let mut active = self.active.lock();

        match self.guard.state() {
            GuardState::Ready => {
                log_debug!(self.logger, "Secrets already active; start ignored");
                return Ok(());
            }
            GuardState::Failed => {
                return Err(ActivationError::StartupAborted {
                    message: self.guard.last_diagnostic().unwrap_or_default(),
                });
            }
            GuardState::NotStarted | GuardState::Initializing => {}
        }

        let pending = substitution::reference_keys(&self.properties);
        if pending.is_empty() {
            log_debug!(
                self.logger,
                "No secret references among {} properties; no store opened",
                self.properties.len()
            );
            self.guard.ready();
            return Ok(());
        }

        let kinds = substitution::scan(&self.properties);
        self.guard.begin();
        log_info!(self.logger, "Secret references found for: {}", join_kinds(&kinds));

        let mut handles = match resolver::initialize_all(&kinds, &*self.environment) {
            Ok(handles) => handles,
            Err(e) => return Err(self.abort(&e)),
        };

        // Redact every key the pass may write before any secret lands in the table
        if let Err(e) = self.filter.install(pending.clone()) {
            handles.unload_all();
            return Err(e.into());
        }

        let mut record =
            match substitution::substitute_keys(&self.properties, &pending, &handles, &*self.logger) {
                Ok(record) => record,
                Err(e) => {
                    self.filter.uninstall();
                    handles.unload_all();
                    return Err(self.abort(&e));
                }
            };

        if record.is_empty() {
            self.filter.uninstall();
        } else {
            let substituted = record.keys();
            if substituted != pending {
                // Narrow to what was substituted; the record is a subset of `pending`
                if let Err(e) = self.filter.install(substituted) {
                    record.revert(&self.properties);
                    self.filter.uninstall();
                    handles.unload_all();
                    return Err(e.into());
                }
            }
            log_debug!(self.logger, "Redacting {} properties on the management surface", record.len());
        }

        log_info!(self.logger, "Substituted {} properties from secret stores", record.len());
        *active = Activation { record, handles };
        self.guard.ready();
        Ok(())
    }

    /// Restore the reference strings, remove redaction and unload stores
    ///
    /// The table is reverted while the filter is still installed. Safe to
    /// call any number of times.
    pub fn stop(&self) {
        let mut active = self.active.lock();

        let reverted = active.record.revert(&self.properties);

        if self.filter.uninstall() {
            log_debug!(self.logger, "Sensitive-value filter removed");
        }

        active.handles.unload_all();

        if self.guard.reset() {
            log_info!(self.logger, "Secrets deactivated; {} properties reverted", reverted);
        }
    }

    fn abort(&self, error: &ResolutionError) -> ActivationError {
        ActivationError::StartupAborted {
            message: self.guard.fail(error),
        }
    }

    pub fn state(&self) -> GuardState {
        self.guard.state()
    }

    /// Keys currently holding a substituted secret
    pub fn substituted_keys(&self) -> BTreeSet<String> {
        self.active.lock().record.keys()
    }

    pub fn is_filter_installed(&self) -> bool {
        self.filter.is_installed()
    }

    /// The opened store of `kind`, while active
    pub fn store_handle(&self, kind: StoreKind) -> Option<StoreHandle> {
        self.active.lock().handles.get(kind).cloned()
    }

    pub fn properties(&self) -> &Arc<SystemProperties> {
        &self.properties
    }

    pub fn surface(&self) -> &Arc<ManagementSurface> {
        self.filter.surface()
    }
}

impl std::fmt::Debug for SecretsActivator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretsActivator")
            .field("environment", &self.environment.name())
            .field("guard", &self.guard)
            .field("filter", &self.filter)
            .finish()
    }
}

fn join_kinds(kinds: &BTreeSet<StoreKind>) -> String {
    kinds
        .iter()
        .map(StoreKind::display_name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Builder for [`SecretsActivator`]
///
/// Defaults: the process environment, a management surface over the given
/// properties, a host control that exits the process, stderr for operator
/// diagnostics and a no-op logger.
pub struct SecretsActivatorBuilder {
    properties: Arc<SystemProperties>,
    environment: Option<SharedEnvironment>,
    surface: Option<Arc<ManagementSurface>>,
    host: Option<Arc<dyn HostControl>>,
    logger: Option<SharedLogger>,
    operator: Option<OperatorStream>,
}

impl SecretsActivatorBuilder {
    pub fn new(properties: Arc<SystemProperties>) -> Self {
        Self {
            properties,
            environment: None,
            surface: None,
            host: None,
            logger: None,
            operator: None,
        }
    }

    /// Source of the store configuration keys
    pub fn environment(mut self, environment: SharedEnvironment) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn surface(mut self, surface: Arc<ManagementSurface>) -> Self {
        self.surface = Some(surface);
        self
    }

    pub fn host(mut self, host: Arc<dyn HostControl>) -> Self {
        self.host = Some(host);
        self
    }

    pub fn logger(mut self, logger: SharedLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn operator_stream(mut self, operator: OperatorStream) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn build(self) -> SecretsActivator {
        let logger: SharedLogger = self.logger.unwrap_or_else(|| Arc::new(NoOpLogger::new()));
        let host: Arc<dyn HostControl> = self.host.unwrap_or_else(|| Arc::new(ProcessHost));
        let surface = self
            .surface
            .unwrap_or_else(|| Arc::new(ManagementSurface::for_process(self.properties.clone())));
        let guard = match self.operator {
            Some(operator) => StartupGuard::with_operator_stream(host, logger.clone(), operator),
            None => StartupGuard::new(host, logger.clone()),
        };

        SecretsActivator {
            environment: self
                .environment
                .unwrap_or_else(|| Arc::new(ProcessEnvironment::new())),
            filter: SensitiveValueFilter::new(surface),
            guard,
            logger,
            properties: self.properties,
            active: Mutex::new(Activation::default()),
        }
    }
}
