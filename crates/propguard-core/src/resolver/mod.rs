//! Reference resolution
//!
//! Opens the secret store for each detected reference kind from the
//! process environment, then turns references into clear text through the
//! resulting handles.

mod error;
mod handle;
mod secret_resolver;

pub use error::{ResolutionError, ResolutionResult};
pub use handle::{StoreHandle, StoreHandles};
pub use secret_resolver::{
    initialize, initialize_all, resolve, resolve_with, list_references, ResolvedSecret,
};
