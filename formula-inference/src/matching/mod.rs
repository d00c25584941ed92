//! Matching covers what we know about a formula before evaluating it:
//! the predicate pattern of atoms, and the connective of everything
//! else.
mod classifier;
mod expression;

pub use classifier::Classifier;
pub use classifier::FormulaType;
pub use classifier::Kind;
pub use expression::PredicateFormula;
