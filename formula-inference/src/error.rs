//! Error types for formula evaluation.
//!
//! Expected failures ("no fact matches") are not errors: they are
//! reported as a `LogicFormulaResult` whose value is false.  The
//! variants below cover formulas we cannot evaluate at all, and
//! contract violations between the core and its collaborators.
use crate::store::Formula;
use crate::unification::Variable;
use thiserror::Error;

/// Errors that may occur while building or evaluating an expression
/// tree.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// The formula has no recognised connective, or a connective with
    /// the wrong number of operands.
    #[error("malformed formula {formula}: {reason}")]
    MalformedFormula { formula: Formula, reason: String },

    /// An operation needed a value for a variable that is not bound.
    #[error("variable {variable} is unbound")]
    UnboundVariable { variable: Variable },

    /// Binding tables (or a projection) disagree on their columns.
    #[error("column mismatch: {left:?} vs {right:?}")]
    ColumnMismatch {
        left: Vec<Variable>,
        right: Vec<Variable>,
    },

    /// The same predicate was used with two different arities.
    #[error("predicate {predicate} has arity {expected}, got {actual}")]
    ArityMismatch {
        predicate: String,
        expected: usize,
        actual: usize,
    },

    /// Formula nesting exceeded the configured limit (or the formula
    /// graph is cyclic).
    #[error("formula {formula} nests deeper than {limit} levels")]
    FormulaTooDeep { formula: Formula, limit: usize },

    /// A collaborator (fact store, solution index) failed.
    #[error("store error: {0}")]
    Store(String),
}

/// Result type alias for inference operations.
pub type Result<T, E = InferenceError> = std::result::Result<T, E>;

#[test]
fn test_display() {
    let x = Variable::new("x");
    let err = InferenceError::UnboundVariable { variable: x.clone() };
    assert_eq!(err.to_string(), format!("variable {} is unbound", x));

    let err = InferenceError::ArityMismatch {
        predicate: "p".into(),
        expected: 2,
        actual: 3,
    };
    assert_eq!(err.to_string(), "predicate p has arity 2, got 3");

    let err = InferenceError::FormulaTooDeep {
        formula: Formula::new(4),
        limit: 8,
    };
    assert_eq!(err.to_string(), "formula f4 nests deeper than 8 levels");
}
