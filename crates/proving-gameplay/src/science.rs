//! Integer sequence helpers.
//!
//! Both functions reject negative input instead of returning a sentinel, and
//! report overflow of the `u64` result.

use thiserror::Error;
use tracing::error;

/// Science function errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScienceError {
    /// Input outside the function's domain
    #[error("Invalid input for {function}: {input}")]
    InvalidInput {
        /// Function name
        function: &'static str,
        /// Rejected input
        input: i32,
    },
    /// Result doesn't fit in a `u64`
    #[error("{function}({input}) overflows")]
    Overflow {
        /// Function name
        function: &'static str,
        /// Input that overflowed
        input: i32,
    },
}

/// Result type for science functions.
pub type ScienceResult<T> = Result<T, ScienceError>;

/// Returns the `n`th Fibonacci number, with `fibonacci(0) == 0`.
///
/// Negative input is logged as an error and rejected.
pub fn fibonacci(n: i32) -> ScienceResult<u64> {
    let Ok(steps) = u32::try_from(n) else {
        error!("Invalid input for Fibonacci: {n}");
        return Err(ScienceError::InvalidInput {
            function: "Fibonacci",
            input: n,
        });
    };

    if steps == 0 {
        return Ok(0);
    }

    let (mut previous, mut current) = (0u64, 1u64);
    for _ in 1..steps {
        let next = previous
            .checked_add(current)
            .ok_or(ScienceError::Overflow {
                function: "Fibonacci",
                input: n,
            })?;
        previous = current;
        current = next;
    }
    Ok(current)
}

/// Returns `n!`.
///
/// Factorial is undefined for negative input.
pub fn factorial(n: i32) -> ScienceResult<u64> {
    let n_unsigned = u64::try_from(n).map_err(|_| ScienceError::InvalidInput {
        function: "Factorial",
        input: n,
    })?;

    (1..=n_unsigned).try_fold(1u64, |acc, k| {
        acc.checked_mul(k).ok_or(ScienceError::Overflow {
            function: "Factorial",
            input: n,
        })
    })
}
