//! Field Registry - whitelist of statistic columns
//!
//! Every stat lookup in the system names its columns through this registry.
//! A field name that is not registered for an entity kind can never reach a
//! query: resolution hands back the registry's own `&'static str` column, not
//! the caller's string.

pub mod fields;
pub mod registry;
pub mod types;

pub use registry::FieldRegistry;
pub use types::{EntityKind, FieldLookupError, Position, StatField};
