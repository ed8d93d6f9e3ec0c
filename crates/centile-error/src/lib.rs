use thiserror::Error;

/// Primary error type for the centile engine.
///
/// Every variant is a deterministic input-validation or resource failure:
/// fatal to the grouping whose accumulator raised it, never retried, and
/// isolated from every other grouping's state. Message text matches what
/// the hosting engine reports to the user verbatim.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CentileError {
    /// The fraction argument fell outside the function's accepted range.
    ///
    /// Raised before any row is stored. `max` is 100 for `percentile()`
    /// and 1 for the `percentile_cont()`/`percentile_disc()` forms.
    #[error("the fraction argument to {func}() is not between 0.0 and {max:.1}")]
    FractionOutOfRange { func: String, max: f64 },

    /// The fraction argument changed between rows of one grouping.
    ///
    /// "Changed" means it differs from the first row's value by more than
    /// 0.001 after normalization to the 0.0 to 1.0 range.
    #[error("the fraction argument to {func}() is not the same for all input rows")]
    FractionMismatch { func: String },

    /// A non-NULL observation was not numeric (text or blob cell).
    #[error("input to {func}() is not numeric")]
    NonNumericInput { func: String },

    /// An observation evaluated to plus or minus infinity.
    ///
    /// NaN never reaches the engine; the host's type system surfaces it
    /// as NULL, which is skipped.
    #[error("Inf input to {func}()")]
    InfiniteInput { func: String },

    /// Growing the value buffer failed.
    ///
    /// The accumulator releases its storage and resets to empty before
    /// this is reported, so nothing leaks on the error path.
    #[error("out of memory")]
    OutOfMemory,
}

/// Host-facing result codes, matching the numeric convention of the
/// embedding engine's C API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ResultCode {
    /// Successful result.
    Ok = 0,
    /// Generic evaluation error.
    Error = 1,
    /// Out of memory.
    NoMem = 7,
}

impl CentileError {
    /// Map this error to the host result code.
    pub const fn result_code(&self) -> ResultCode {
        match self {
            Self::FractionOutOfRange { .. }
            | Self::FractionMismatch { .. }
            | Self::NonNumericInput { .. }
            | Self::InfiniteInput { .. } => ResultCode::Error,
            Self::OutOfMemory => ResultCode::NoMem,
        }
    }

    /// Whether this is an input-domain error, raised only while a row is
    /// being accumulated. Removal and result requests never produce these.
    pub const fn is_domain_error(&self) -> bool {
        !matches!(self, Self::OutOfMemory)
    }

    /// Create a fraction-range error.
    pub fn fraction_out_of_range(func: impl Into<String>, max: f64) -> Self {
        Self::FractionOutOfRange {
            func: func.into(),
            max,
        }
    }

    /// Create a fraction-mismatch error.
    pub fn fraction_mismatch(func: impl Into<String>) -> Self {
        Self::FractionMismatch { func: func.into() }
    }

    /// Create a non-numeric-input error.
    pub fn non_numeric_input(func: impl Into<String>) -> Self {
        Self::NonNumericInput { func: func.into() }
    }

    /// Create an infinite-input error.
    pub fn infinite_input(func: impl Into<String>) -> Self {
        Self::InfiniteInput { func: func.into() }
    }
}

/// Result type alias using `CentileError`.
pub type Result<T> = std::result::Result<T, CentileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_range() {
        let err = CentileError::fraction_out_of_range("percentile", 100.0);
        assert_eq!(
            err.to_string(),
            "the fraction argument to percentile() is not between 0.0 and 100.0"
        );

        let err = CentileError::fraction_out_of_range("percentile_cont", 1.0);
        assert_eq!(
            err.to_string(),
            "the fraction argument to percentile_cont() is not between 0.0 and 1.0"
        );
    }

    #[test]
    fn error_display_mismatch() {
        let err = CentileError::fraction_mismatch("median");
        assert_eq!(
            err.to_string(),
            "the fraction argument to median() is not the same for all input rows"
        );
    }

    #[test]
    fn error_display_inputs() {
        assert_eq!(
            CentileError::non_numeric_input("percentile").to_string(),
            "input to percentile() is not numeric"
        );
        assert_eq!(
            CentileError::infinite_input("median").to_string(),
            "Inf input to median()"
        );
        assert_eq!(CentileError::OutOfMemory.to_string(), "out of memory");
    }

    #[test]
    fn result_code_mapping() {
        assert_eq!(
            CentileError::fraction_mismatch("percentile").result_code(),
            ResultCode::Error
        );
        assert_eq!(
            CentileError::non_numeric_input("percentile").result_code(),
            ResultCode::Error
        );
        assert_eq!(CentileError::OutOfMemory.result_code(), ResultCode::NoMem);
    }

    #[test]
    fn result_code_values() {
        assert_eq!(ResultCode::Ok as i32, 0);
        assert_eq!(ResultCode::Error as i32, 1);
        assert_eq!(ResultCode::NoMem as i32, 7);
    }

    #[test]
    fn domain_error_classification() {
        assert!(CentileError::fraction_out_of_range("percentile", 100.0).is_domain_error());
        assert!(CentileError::infinite_input("median").is_domain_error());
        assert!(!CentileError::OutOfMemory.is_domain_error());
    }
}
