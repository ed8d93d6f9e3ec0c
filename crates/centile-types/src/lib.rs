//! Shared value types for the centile engine.
//!
//! The hosting query engine hands the aggregate one dynamically-typed cell
//! per argument per row; [`Datum`] is that cell. The engine's validation
//! boundary is built on [`Datum::storage_class`] and the numeric coercion
//! helpers defined here.

pub mod value;

pub use value::{Datum, StorageClass};
