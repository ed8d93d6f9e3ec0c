//! The percentile function family: `median(Y)`, `percentile(Y,P)`,
//! `percentile_cont(Y,P)`, and `percentile_disc(Y,P)`.
//!
//! All four share one accumulator ([`Percentile`]) and differ only in
//! arity, in the scale of the fraction argument (0 to 100 for
//! `percentile`, 0 to 1 for the `_cont`/`_disc` forms, fixed at the
//! median for `median`), and in whether the result is interpolated or
//! snapped to the next lower input (`_disc`).
//!
//! # Validation
//!
//! All input validation happens while a row is added:
//! - the fraction argument must be numeric, in range, and identical
//!   (within 0.001, normalized) across every row of the grouping;
//! - a NULL observation is skipped;
//! - a text or blob observation is an error;
//! - an infinite observation is an error (NaN never reaches the engine;
//!   the host's type system surfaces it as NULL).
//!
//! Removal and result requests never raise: anything a removal names was
//! either stored by a successful step or never stored at all.

use centile_error::{CentileError, Result};
use centile_types::{Datum, StorageClass};

use crate::accum::Percentile;
use crate::{AggregateFunction, FunctionRegistry, WindowFunction};

/// One member of the percentile family.
///
/// The members are plain data: a name, an arity, the maximum legal value
/// of the fraction argument, and the discrete flag. The trait
/// implementations below are shared by all four.
#[derive(Debug, Clone, Copy)]
pub struct PercentileFunc {
    name: &'static str,
    num_args: i32,
    max_fraction: f64,
    discrete: bool,
}

impl PercentileFunc {
    /// `median(Y)`, the single-argument form: `percentile(Y, 50)`.
    #[must_use]
    pub const fn median() -> Self {
        Self {
            name: "median",
            num_args: 1,
            max_fraction: 1.0,
            discrete: false,
        }
    }

    /// `percentile(Y, P)` with P ranging over 0 to 100.
    #[must_use]
    pub const fn percentile() -> Self {
        Self {
            name: "percentile",
            num_args: 2,
            max_fraction: 100.0,
            discrete: false,
        }
    }

    /// `percentile_cont(Y, P)` with P ranging over 0 to 1.
    #[must_use]
    pub const fn percentile_cont() -> Self {
        Self {
            name: "percentile_cont",
            num_args: 2,
            max_fraction: 1.0,
            discrete: false,
        }
    }

    /// `percentile_disc(Y, P)`: like `percentile_cont` but the result is
    /// always one of the inputs (the next lower order statistic).
    #[must_use]
    pub const fn percentile_disc() -> Self {
        Self {
            name: "percentile_disc",
            num_args: 2,
            max_fraction: 1.0,
            discrete: true,
        }
    }

    /// Normalize and validate the fraction argument for this row.
    fn resolve_fraction(&self, args: &[Datum]) -> Result<f64> {
        if self.num_args == 1 {
            return Ok(0.5);
        }
        let raw = args.get(1).and_then(Datum::numeric_value);
        let fraction = raw
            .map(|p| p / self.max_fraction)
            .ok_or_else(|| CentileError::fraction_out_of_range(self.name, self.max_fraction))?;
        if (0.0..=1.0).contains(&fraction) {
            Ok(fraction)
        } else {
            Err(CentileError::fraction_out_of_range(
                self.name,
                self.max_fraction,
            ))
        }
    }

    /// Classify the observation cell: `None` for a skipped (absent) row,
    /// `Some` for a finite double, error otherwise.
    fn classify_observation(&self, y: &Datum) -> Result<Option<f64>> {
        match y.storage_class() {
            StorageClass::Null => Ok(None),
            StorageClass::Integer | StorageClass::Real => {
                let v = y.to_float();
                if v.is_nan() {
                    Ok(None)
                } else if v.is_infinite() {
                    Err(CentileError::infinite_input(self.name))
                } else {
                    Ok(Some(v))
                }
            }
            StorageClass::Text | StorageClass::Blob => {
                Err(CentileError::non_numeric_input(self.name))
            }
        }
    }

    fn step_row(&self, state: &mut Percentile, args: &[Datum]) -> Result<()> {
        let fraction = self.resolve_fraction(args)?;
        state.set_or_check_fraction(fraction, self.name)?;
        let Some(y) = args.first().map_or(Ok(None), |y| self.classify_observation(y))? else {
            return Ok(());
        };
        state.insert(y)
    }

    fn remove_row(&self, state: &mut Percentile, args: &[Datum]) {
        let Some(y) = args.first() else { return };
        match y.storage_class() {
            StorageClass::Integer | StorageClass::Real => {
                let v = y.to_float();
                if v.is_finite() {
                    state.remove(v);
                }
            }
            StorageClass::Null | StorageClass::Text | StorageClass::Blob => {}
        }
    }

    fn result(&self, state: &mut Percentile) -> Datum {
        match state.resolve(self.discrete) {
            Some(v) => Datum::Float(v),
            None => Datum::Null,
        }
    }
}

impl AggregateFunction for PercentileFunc {
    type State = Percentile;

    fn initial_state(&self) -> Self::State {
        Percentile::new()
    }

    fn step(&self, state: &mut Self::State, args: &[Datum]) -> Result<()> {
        self.step_row(state, args)
    }

    fn finalize(&self, mut state: Self::State) -> Result<Datum> {
        Ok(self.result(&mut state))
    }

    fn num_args(&self) -> i32 {
        self.num_args
    }

    fn name(&self) -> &str {
        self.name
    }
}

impl WindowFunction for PercentileFunc {
    type State = Percentile;

    fn initial_state(&self) -> Self::State {
        Percentile::new()
    }

    fn step(&self, state: &mut Self::State, args: &[Datum]) -> Result<()> {
        self.step_row(state, args)
    }

    fn inverse(&self, state: &mut Self::State, args: &[Datum]) -> Result<()> {
        self.remove_row(state, args);
        Ok(())
    }

    fn value(&self, state: &mut Self::State) -> Result<Datum> {
        let result = self.result(state);
        // More rows may follow a non-final result; keep the buffer
        // orderable without a second full sort.
        state.commit_keep_sorted();
        Ok(result)
    }

    fn finalize(&self, mut state: Self::State) -> Result<Datum> {
        // Consuming the state releases the buffer.
        Ok(self.result(&mut state))
    }

    fn num_args(&self) -> i32 {
        self.num_args
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// Register the whole family, both as plain aggregates and as window
/// functions; the host decides per call site which protocol it drives.
pub fn register_percentile_builtins(registry: &mut FunctionRegistry) {
    for func in [
        PercentileFunc::median(),
        PercentileFunc::percentile(),
        PercentileFunc::percentile_cont(),
        PercentileFunc::percentile_disc(),
    ] {
        registry.register_aggregate(func);
        registry.register_window(func);
    }
}
