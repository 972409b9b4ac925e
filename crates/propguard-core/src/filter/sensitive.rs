//! Installing and removing the redacting decorator

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use super::redacting::RedactingRuntime;
use crate::management::{ManagementSurface, RuntimeIntrospection};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("No sensitive keys to redact")]
    EmptyKeySet,
}

pub type FilterResult<T> = Result<T, FilterError>;

/// Redacts substituted properties on a [`ManagementSurface`]
///
/// The filter remembers the view it displaced, so reinstalling replaces the
/// decorator instead of stacking a second one on top, and uninstalling puts
/// back exactly the view that was there before.
pub struct SensitiveValueFilter {
    surface: Arc<ManagementSurface>,
    displaced: Mutex<Option<Arc<dyn RuntimeIntrospection>>>,
}

impl SensitiveValueFilter {
    pub fn new(surface: Arc<ManagementSurface>) -> Self {
        Self {
            surface,
            displaced: Mutex::new(None),
        }
    }

    pub fn surface(&self) -> &Arc<ManagementSurface> {
        &self.surface
    }

    /// Start redacting `keys`
    pub fn install(&self, keys: BTreeSet<String>) -> FilterResult<()> {
        if keys.is_empty() {
            return Err(FilterError::EmptyKeySet);
        }

        let mut displaced = self.displaced.lock();
        let undecorated = match displaced.as_ref() {
            Some(original) => original.clone(),
            None => self.surface.runtime(),
        };

        let previous = self
            .surface
            .replace(Arc::new(RedactingRuntime::new(undecorated, keys)));
        if displaced.is_none() {
            *displaced = Some(previous);
        }
        Ok(())
    }

    /// Stop redacting; returns whether a decorator was removed
    pub fn uninstall(&self) -> bool {
        match self.displaced.lock().take() {
            Some(original) => {
                self.surface.replace(original);
                true
            }
            None => false,
        }
    }

    pub fn is_installed(&self) -> bool {
        self.displaced.lock().is_some()
    }
}

impl std::fmt::Debug for SensitiveValueFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensitiveValueFilter")
            .field("surface", &self.surface)
            .field("installed", &self.is_installed())
            .finish()
    }
}
