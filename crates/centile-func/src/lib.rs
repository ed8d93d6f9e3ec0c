//! Streaming percentile/median aggregation engine.
//!
//! This crate provides:
//! - open, host-implementable traits for one-shot aggregates
//!   ([`AggregateFunction`]) and sliding-window aggregates
//!   ([`WindowFunction`]);
//! - a small in-memory [`FunctionRegistry`] resolving functions by
//!   `(name, num_args)` key with variadic fallback;
//! - the percentile family itself (`median`, `percentile`,
//!   `percentile_cont`, `percentile_disc`), built on a per-grouping
//!   accumulator that batch-sorts once for one-shot use and maintains
//!   sorted order incrementally once removals or non-final results begin.
#![allow(clippy::unnecessary_literal_bound)]

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

pub mod accum;
pub mod aggregate;
pub mod percentile;
mod sort;
pub mod window;

pub use accum::Percentile;
pub use aggregate::{AggregateAdapter, AggregateFunction};
pub use percentile::{register_percentile_builtins, PercentileFunc};
pub use window::{WindowAdapter, WindowFunction};

/// Type-erased aggregate function object used by the registry.
pub type ErasedAggregateFunction = dyn AggregateFunction<State = Box<dyn Any + Send>>;

/// Type-erased window function object used by the registry.
pub type ErasedWindowFunction = dyn WindowFunction<State = Box<dyn Any + Send>>;

/// Composite lookup key for functions: `(UPPERCASE name, num_args)`.
///
/// `-1` for `num_args` means variadic (any number of arguments).
/// Names are stored as uppercase ASCII for case-insensitive matching.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct FunctionKey {
    /// Function name, stored as uppercase ASCII.
    pub name: String,
    /// Expected argument count, or `-1` for variadic.
    pub num_args: i32,
}

impl FunctionKey {
    /// Create a new function key with the name canonicalized to uppercase.
    #[must_use]
    pub fn new(name: &str, num_args: i32) -> Self {
        Self {
            name: canonical_name(name),
            num_args,
        }
    }
}

/// Registry for aggregate and window functions, keyed by
/// `(name, num_args)`.
///
/// Lookup strategy:
/// 1. Exact match on `(UPPERCASE_NAME, num_args)`.
/// 2. Fallback to variadic version `(UPPERCASE_NAME, -1)`.
/// 3. `None` if neither found (caller should raise "no such function").
#[derive(Default)]
pub struct FunctionRegistry {
    aggregates: HashMap<FunctionKey, Arc<ErasedAggregateFunction>>,
    windows: HashMap<FunctionKey, Arc<ErasedWindowFunction>>,
}

impl FunctionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an aggregate function using the type-erased adapter.
    ///
    /// Overwrites any existing function with the same `(name, num_args)`
    /// key. Returns the previous function if one existed.
    pub fn register_aggregate<F>(&mut self, function: F) -> Option<Arc<ErasedAggregateFunction>>
    where
        F: AggregateFunction + 'static,
        F::State: 'static,
    {
        let key = FunctionKey::new(function.name(), function.num_args());
        self.aggregates
            .insert(key, Arc::new(AggregateAdapter::new(function)))
    }

    /// Register a window function using the type-erased adapter.
    ///
    /// Overwrites any existing function with the same `(name, num_args)` key.
    pub fn register_window<F>(&mut self, function: F) -> Option<Arc<ErasedWindowFunction>>
    where
        F: WindowFunction + 'static,
        F::State: 'static,
    {
        let key = FunctionKey::new(function.name(), function.num_args());
        self.windows
            .insert(key, Arc::new(WindowAdapter::new(function)))
    }

    /// Look up an aggregate function by `(name, num_args)`.
    ///
    /// Tries exact match first, then falls back to variadic `(name, -1)`.
    #[must_use]
    pub fn find_aggregate(
        &self,
        name: &str,
        num_args: i32,
    ) -> Option<Arc<ErasedAggregateFunction>> {
        let canon = canonical_name(name);
        let exact = FunctionKey {
            name: canon.clone(),
            num_args,
        };
        if let Some(f) = self.aggregates.get(&exact) {
            debug!(name = %canon, arity = num_args, kind = "aggregate", hit = "exact", "registry lookup");
            return Some(Arc::clone(f));
        }
        let variadic = FunctionKey {
            name: canon.clone(),
            num_args: -1,
        };
        let result = self.aggregates.get(&variadic).map(Arc::clone);
        debug!(
            name = %canon,
            arity = num_args,
            kind = "aggregate",
            hit = if result.is_some() { "variadic" } else { "miss" },
            "registry lookup"
        );
        result
    }

    /// Look up a window function by `(name, num_args)`.
    ///
    /// Tries exact match first, then falls back to variadic `(name, -1)`.
    #[must_use]
    pub fn find_window(&self, name: &str, num_args: i32) -> Option<Arc<ErasedWindowFunction>> {
        let canon = canonical_name(name);
        let exact = FunctionKey {
            name: canon.clone(),
            num_args,
        };
        if let Some(f) = self.windows.get(&exact) {
            debug!(name = %canon, arity = num_args, kind = "window", hit = "exact", "registry lookup");
            return Some(Arc::clone(f));
        }
        let variadic = FunctionKey {
            name: canon.clone(),
            num_args: -1,
        };
        let result = self.windows.get(&variadic).map(Arc::clone);
        debug!(
            name = %canon,
            arity = num_args,
            kind = "window",
            hit = if result.is_some() { "variadic" } else { "miss" },
            "registry lookup"
        );
        result
    }

    /// Whether the registry contains any aggregate function with this
    /// name (any arg count).
    #[must_use]
    pub fn contains_aggregate(&self, name: &str) -> bool {
        let canon = canonical_name(name);
        self.aggregates.keys().any(|k| k.name == canon)
    }

    /// Whether the registry contains any window function with this name
    /// (any arg count).
    #[must_use]
    pub fn contains_window(&self, name: &str) -> bool {
        let canon = canonical_name(name);
        self.windows.keys().any(|k| k.name == canon)
    }
}

fn canonical_name(name: &str) -> String {
    name.trim().to_ascii_uppercase()
}
