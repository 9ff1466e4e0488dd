use thiserror::Error;

/// Errors reported by the reduction engines and search drivers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Two generators with different concrete parameters were combined.
    #[error("generators with different parameters cannot be combined")]
    IncompatibleOperand,

    /// An internal invariant of a reduction engine failed to hold. This
    /// indicates a non-linear generator or a broken trait implementation.
    #[error("algorithm invariant violated: {0}")]
    AlgorithmInvariantViolated(String),

    /// The accumulated parity-word directions admit no certification vector.
    #[error("no parity vector exists for the given factor")]
    ParityVectorNotFound,

    /// A parameter search ran out of its retry budget.
    #[error("search budget exhausted after {tries} attempts")]
    SearchExhausted { tries: usize },
}

pub type Result<T> = core::result::Result<T, Error>;
