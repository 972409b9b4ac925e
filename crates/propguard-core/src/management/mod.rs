//! Management and introspection surface
//!
//! Remote inspectors read the process through a [`RuntimeIntrospection`]
//! view held by a [`ManagementSurface`]. The view can be swapped at runtime,
//! which is how the sensitive-value filter decorates it.

mod runtime;
mod surface;

pub use runtime::{RuntimeIntrospection, ProcessRuntime};
pub use surface::ManagementSurface;
