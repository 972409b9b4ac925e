//! Injected configuration table

mod table;

pub use table::SystemProperties;
