//! The inference core never needs full unification: either we're
//! matching a pattern against a fully ground fact, or fully
//! instantiating a template with an assignment.  In order to join
//! binding tables, we must also implement row restructuring.
//! Matching accepts facts, and returns a row of captured entities (in
//! variable order) on success.  Restructuring accepts a row (or
//! multiple rows), and returns another row.
//!
//! The usual split between static shape and dynamic values pervades
//! our implementations of matching and restructuring.  The
//! transformation or matching we wish to perform is a function of the
//! formula and of the table columns, but not of the data; it makes
//! sense to front-load as much work as possible before traversing
//! rows.
mod assignment;
mod pattern;
mod project;
mod variable;

pub use assignment::Assignment;
pub use pattern::Element;
pub use pattern::Pattern;
pub use pattern::Template;
pub use project::MultiProjection;
pub use project::Projection;
pub use variable::Variable;
