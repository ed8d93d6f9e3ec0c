//! Window function trait with sliding-frame support.
//!
//! A window function extends aggregate semantics with removal and with
//! non-final result requests, so a sliding frame can be maintained
//! incrementally instead of being recomputed from scratch at every row.
//!
//! # State Lifecycle
//!
//! 1. [`initial_state`](WindowFunction::initial_state) creates a fresh
//!    accumulator for the partition.
//! 2. As the frame slides, [`step`](WindowFunction::step) adds the row
//!    entering the frame and [`inverse`](WindowFunction::inverse) removes
//!    the row leaving it (rows leave in the order they entered).
//! 3. After each slide, [`value`](WindowFunction::value) reports the
//!    current result; the state stays usable for further steps.
//! 4. At partition end, [`finalize`](WindowFunction::finalize) consumes
//!    the state and returns the last result.

use std::any::Any;

use centile_error::Result;
use centile_types::Datum;

/// A windowed aggregate over a sliding frame of rows.
///
/// This trait is **open** (host-implementable).
///
/// The key contract difference from
/// [`AggregateFunction`](crate::AggregateFunction) is
/// [`inverse`](Self::inverse): by supporting removal, the engine lets the
/// host maintain a running frame in sublinear time per row rather than
/// recomputing the whole frame.
pub trait WindowFunction: Send + Sync {
    /// The per-partition accumulator type.
    type State: Send;

    /// Create a fresh accumulator.
    fn initial_state(&self) -> Self::State;

    /// Add a row to the frame.
    fn step(&self, state: &mut Self::State, args: &[Datum]) -> Result<()>;

    /// Remove a previously added row from the frame.
    ///
    /// Arguments mirror the `step` call that added the row. Values that
    /// `step` would have skipped or rejected are ignored here without
    /// error; they were never stored, so there is nothing to remove.
    fn inverse(&self, state: &mut Self::State, args: &[Datum]) -> Result<()>;

    /// Return the current result without consuming the state.
    ///
    /// Called once per output row; must be callable any number of times.
    /// Takes the state mutably: a non-final result request is allowed to
    /// reorganize the accumulator (for this crate's functions it triggers
    /// the one-time sort and commits incremental order maintenance),
    /// but the observable result sequence is unaffected.
    fn value(&self, state: &mut Self::State) -> Result<Datum>;

    /// Consume the accumulator and produce the final result.
    fn finalize(&self, state: Self::State) -> Result<Datum>;

    /// The number of arguments this function accepts (`-1` = variadic).
    fn num_args(&self) -> i32;

    /// The function name, used in error messages and registry lookups.
    fn name(&self) -> &str;
}

/// Type-erased adapter for [`WindowFunction`], analogous to
/// [`AggregateAdapter`](crate::AggregateAdapter).
pub struct WindowAdapter<F> {
    inner: F,
}

impl<F> WindowAdapter<F> {
    /// Wrap a concrete window function for type-erased storage.
    pub const fn new(inner: F) -> Self {
        Self { inner }
    }
}

impl<F> WindowFunction for WindowAdapter<F>
where
    F: WindowFunction,
    F::State: 'static,
{
    type State = Box<dyn Any + Send>;

    fn initial_state(&self) -> Self::State {
        Box::new(self.inner.initial_state())
    }

    fn step(&self, state: &mut Self::State, args: &[Datum]) -> Result<()> {
        let concrete = state
            .downcast_mut::<F::State>()
            .expect("window state type mismatch");
        self.inner.step(concrete, args)
    }

    fn inverse(&self, state: &mut Self::State, args: &[Datum]) -> Result<()> {
        let concrete = state
            .downcast_mut::<F::State>()
            .expect("window state type mismatch");
        self.inner.inverse(concrete, args)
    }

    fn value(&self, state: &mut Self::State) -> Result<Datum> {
        let concrete = state
            .downcast_mut::<F::State>()
            .expect("window state type mismatch");
        self.inner.value(concrete)
    }

    fn finalize(&self, state: Self::State) -> Result<Datum> {
        let concrete = *state
            .downcast::<F::State>()
            .expect("window state type mismatch");
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
    use super::*;

    // -- Mock: moving count of non-NULL cells --

    struct MovingCount;

    impl WindowFunction for MovingCount {
        type State = i64;

        fn initial_state(&self) -> i64 {
            0
        }

        fn step(&self, state: &mut i64, args: &[Datum]) -> Result<()> {
            if !args[0].is_null() {
                *state += 1;
            }
            Ok(())
        }

        fn inverse(&self, state: &mut i64, args: &[Datum]) -> Result<()> {
            if !args[0].is_null() {
                *state -= 1;
            }
            Ok(())
        }

        fn value(&self, state: &mut i64) -> Result<Datum> {
            Ok(Datum::Integer(*state))
        }

        fn finalize(&self, state: i64) -> Result<Datum> {
            Ok(Datum::Integer(state))
        }

        fn num_args(&self) -> i32 {
            1
        }

        fn name(&self) -> &str {
            "moving_count"
        }
    }

    #[test]
    fn test_window_step_inverse_value() {
        let f = MovingCount;
        let mut state = f.initial_state();

        // Frame [a, NULL, b]
        f.step(&mut state, &[Datum::Float(1.0)]).unwrap();
        f.step(&mut state, &[Datum::Null]).unwrap();
        f.step(&mut state, &[Datum::Float(2.0)]).unwrap();
        assert_eq!(f.value(&mut state).unwrap(), Datum::Integer(2));

        // Slide: the oldest row leaves, a new one enters.
        f.inverse(&mut state, &[Datum::Float(1.0)]).unwrap();
        f.step(&mut state, &[Datum::Float(3.0)]).unwrap();
        assert_eq!(f.value(&mut state).unwrap(), Datum::Integer(2));

        // The NULL leaves; nothing was stored for it.
        f.inverse(&mut state, &[Datum::Null]).unwrap();
        assert_eq!(f.value(&mut state).unwrap(), Datum::Integer(2));
    }

    #[test]
    fn test_window_value_is_repeatable() {
        let f = MovingCount;
        let mut state = f.initial_state();
        f.step(&mut state, &[Datum::Integer(7)]).unwrap();

        assert_eq!(f.value(&mut state).unwrap(), Datum::Integer(1));
        assert_eq!(f.value(&mut state).unwrap(), Datum::Integer(1));

        // State stays usable after value().
        f.step(&mut state, &[Datum::Integer(8)]).unwrap();
        assert_eq!(f.finalize(state).unwrap(), Datum::Integer(2));
    }
}
