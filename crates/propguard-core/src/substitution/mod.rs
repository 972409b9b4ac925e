//! Property substitution
//!
//! Rewrites reference-shaped property values to the secrets they point at
//! and remembers the originals so they can be put back on shutdown.

mod pass;
mod record;

pub use pass::{reference_keys, scan, substitute, substitute_keys};
pub use record::SubstitutionRecord;
