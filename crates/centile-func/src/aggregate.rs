//! Aggregate function trait with type-erased state adapter.
//!
//! An aggregate function accumulates a result across the rows of one
//! grouping and produces it exactly once, at the end. Each grouping key
//! gets its own state instance.
//!
//! # Type Erasure
//!
//! The [`FunctionRegistry`](crate::FunctionRegistry) stores aggregates as
//! `Arc<dyn AggregateFunction<State = Box<dyn Any + Send>>>`. Concrete
//! implementations use [`AggregateAdapter`] to wrap their typed state.
#![allow(clippy::unnecessary_literal_bound)]

use std::any::Any;

use centile_error::Result;
use centile_types::Datum;

/// A one-shot aggregate over a grouping's rows.
///
/// This trait is **open** (host-implementable); the percentile family in
/// this crate is registered through it, and a host can add its own.
///
/// # State Lifecycle
///
/// 1. [`initial_state`](Self::initial_state) creates a fresh accumulator.
/// 2. [`step`](Self::step) is called once per row.
/// 3. [`finalize`](Self::finalize) consumes the state and returns the result.
///
/// # Send + Sync
///
/// The function object itself is shared across threads via `Arc`. The
/// `State` type must be `Send` so a grouping's accumulator can move to
/// whichever thread computes that grouping.
pub trait AggregateFunction: Send + Sync {
    /// The per-grouping accumulator type.
    type State: Send;

    /// Create a fresh accumulator.
    fn initial_state(&self) -> Self::State;

    /// Process one row, updating the accumulator.
    fn step(&self, state: &mut Self::State, args: &[Datum]) -> Result<()>;

    /// Consume the accumulator and produce the final result.
    fn finalize(&self, state: Self::State) -> Result<Datum>;

    /// The number of arguments this function accepts (`-1` = variadic).
    fn num_args(&self) -> i32;

    /// The function name, used in error messages and registry lookups.
    fn name(&self) -> &str;
}

/// Type-erased adapter that wraps a concrete [`AggregateFunction`] so the
/// registry can store heterogeneous aggregates behind a single trait
/// object. Boxes the concrete state on creation and downcasts on
/// step/finalize.
pub struct AggregateAdapter<F> {
    inner: F,
}

impl<F> AggregateAdapter<F> {
    /// Wrap a concrete aggregate function for type-erased storage.
    pub const fn new(inner: F) -> Self {
        Self { inner }
    }
}

impl<F> AggregateFunction for AggregateAdapter<F>
where
    F: AggregateFunction,
    F::State: 'static,
{
    type State = Box<dyn Any + Send>;

    fn initial_state(&self) -> Self::State {
        Box::new(self.inner.initial_state())
    }

    fn step(&self, state: &mut Self::State, args: &[Datum]) -> Result<()> {
        let concrete = state
            .downcast_mut::<F::State>()
            .expect("aggregate state type mismatch");
        self.inner.step(concrete, args)
    }

    fn finalize(&self, state: Self::State) -> Result<Datum> {
        let concrete = *state
            .downcast::<F::State>()
            .expect("aggregate state type mismatch");
        self.inner.finalize(concrete)
    }

    fn num_args(&self) -> i32 {
        self.inner.num_args()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    // -- Mock: running total over float cells --

    struct TotalAgg;

    impl AggregateFunction for TotalAgg {
        type State = f64;

        fn initial_state(&self) -> f64 {
            0.0
        }

        fn step(&self, state: &mut f64, args: &[Datum]) -> Result<()> {
            if !args[0].is_null() {
                *state += args[0].to_float();
            }
            Ok(())
        }

        fn finalize(&self, state: f64) -> Result<Datum> {
            Ok(Datum::Float(state))
        }

        fn num_args(&self) -> i32 {
            1
        }

        fn name(&self) -> &str {
            "total"
        }
    }

    #[test]
    fn test_aggregate_step_and_finalize() {
        let agg = TotalAgg;
        let mut state = agg.initial_state();

        agg.step(&mut state, &[Datum::Float(10.0)]).unwrap();
        agg.step(&mut state, &[Datum::Null]).unwrap();
        agg.step(&mut state, &[Datum::Float(32.0)]).unwrap();

        let result = agg.finalize(state).unwrap();
        assert_eq!(result, Datum::Float(42.0));
    }

    #[test]
    fn test_aggregate_type_erasure_adapter() {
        let adapted: AggregateAdapter<TotalAgg> = AggregateAdapter::new(TotalAgg);
        let erased: Arc<dyn AggregateFunction<State = Box<dyn Any + Send>>> = Arc::new(adapted);

        let mut state = erased.initial_state();
        erased.step(&mut state, &[Datum::Float(1.5)]).unwrap();
        erased.step(&mut state, &[Datum::Float(2.5)]).unwrap();

        let result = erased.finalize(state).unwrap();
        assert_eq!(result, Datum::Float(4.0));

        // The Arc clones; one function object serves every grouping.
        let e2 = Arc::clone(&erased);
        assert_eq!(e2.name(), "total");
    }
}
