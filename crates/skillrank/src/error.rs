//! Errors raised by the rating engines.
//!
//! Every rating computation is pure, so none of these are transient: an error
//! means the inputs were unusable and the caller's ratings were left untouched.

use std::fmt;

/// The part of the Glicko-2 volatility solver that ran out of iterations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolverStage {
    /// Searching for the lower end `B` of the initial bracket.
    Bracket,
    /// Narrowing the bracket with the Illinois variant of regula falsi.
    Illinois,
}

impl fmt::Display for SolverStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bracket => f.write_str("bracket search"),
            Self::Illinois => f.write_str("illinois iteration"),
        }
    }
}

/// Failure of a rating computation.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum RatingError {
    /// A rating, config value or argument shape is outside its domain.
    #[error("invalid parameter: {reason}")]
    InvalidParameter {
        /// What was wrong with the input.
        reason: String,
    },
    /// The volatility root finder did not settle on a finite root.
    #[error("volatility solver did not converge during {stage} after {iterations} iterations")]
    NumericNonconvergence {
        /// Where the solver gave up.
        stage: SolverStage,
        /// Iterations spent in that stage.
        iterations: usize,
    },
    /// A team without any players, and so without aggregate variance.
    #[error("team `{team}` has no players")]
    DegenerateInput {
        /// Index of the offending team.
        team: usize,
    },
}

impl RatingError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            RatingError::invalid("tau must be positive").to_string(),
            "invalid parameter: tau must be positive"
        );
        assert_eq!(
            RatingError::NumericNonconvergence {
                stage: SolverStage::Illinois,
                iterations: 12,
            }
            .to_string(),
            "volatility solver did not converge during illinois iteration after 12 iterations"
        );
        assert_eq!(
            RatingError::DegenerateInput { team: 3 }.to_string(),
            "team `3` has no players"
        );
    }
}
