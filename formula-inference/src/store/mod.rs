//! The inference core does not own any data: facts, formula structure
//! and solution records all live in collaborators, which we reach
//! through the traits below.  `MemoryStore` implements all of them in
//! memory, for tests and small embedding programs.
use crate::bindings::BindingTable;
use crate::error::Result;
use crate::ground::Entity;
use crate::matching::PredicateFormula;
use crate::unification::Assignment;

mod memory;

pub use memory::MemoryStore;

/// An opaque reference to a formula node in the store.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Formula(usize);

impl Formula {
    #[must_use]
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    #[inline]
    #[must_use]
    pub fn id(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "f{}", self.0)
    }
}

/// Structural tags recorded against formulas: the connective a formula
/// stands for, and whether an atom may be generated.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Tag {
    Atomic,
    Conjunction,
    Disjunction,
    Negation,
    Implication,
    Equivalence,
    GenerationEligible,
}

/// The shape of a formula node.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Shape {
    /// A predicate pattern.
    Structure,
    /// An ordered list of member formulas.
    Tuple,
    /// A directed connection between two formulas.
    Arc,
    /// An undirected connection between two formulas.
    Edge,
    /// Anything else.
    Node,
}

/// Roles distinguish the members of an implication tuple.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Role {
    If,
    Then,
}

/// Read-only access to formula structure.
pub trait FormulaStore {
    fn has_tag(&self, formula: Formula, tag: Tag) -> bool;

    /// Returns `None` for unknown formulas.
    fn shape(&self, formula: Formula) -> Option<Shape>;

    /// Returns the members of a tuple, in order.
    fn members(&self, formula: Formula) -> Vec<Formula>;

    /// Returns the source and target of an arc, or both ends of an
    /// edge.
    fn endpoints(&self, formula: Formula) -> Option<(Formula, Formula)>;

    /// Returns the member of `tuple` that plays `role`.
    fn role(&self, tuple: Formula, role: Role) -> Option<Formula>;

    /// Returns the predicate pattern of a structure.
    fn pattern(&self, formula: Formula) -> Option<PredicateFormula>;
}

/// Pattern search and fact assertion.
pub trait FactStore {
    /// Returns every extension of `bindings` consistent with a fact
    /// that matches `pattern`: the columns are those of `bindings`
    /// plus the variables of `pattern`.  Searching never mutates the
    /// store.
    ///
    /// # Errors
    ///
    /// Returns `Err` when the store fails, or when `pattern` does not
    /// match the predicate's arity.
    fn search(&self, pattern: &PredicateFormula, bindings: &BindingTable)
        -> Result<BindingTable>;

    /// Instantiates `pattern` with `assignment`, adds the result to the
    /// store, and returns whether the fact is new.  Asserting a fact
    /// that already exists is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `Err` when a variable of `pattern` is unbound in
    /// `assignment`, or when the store fails.
    fn assert_fact(&mut self, pattern: &PredicateFormula, assignment: &Assignment)
        -> Result<bool>;

    /// Returns an entity that appears nowhere in the store.
    ///
    /// # Errors
    ///
    /// Returns `Err` when the store has no unused entity left.
    fn fresh_entity(&mut self) -> Result<Entity>;
}

/// Records of (rule, assignment) pairs for which a rule already fired.
pub trait SolutionIndex {
    /// Returns true iff a solution for `rule` was recorded with the
    /// same values as `assignment` for every variable `assignment`
    /// binds.
    ///
    /// # Errors
    ///
    /// Returns `Err` when the store fails.
    fn solution_exists(&self, rule: Formula, assignment: &Assignment) -> Result<bool>;

    /// Records `assignment` as a solution of `rule`, and returns
    /// whether the record is new.
    ///
    /// # Errors
    ///
    /// Returns `Err` when the store fails.
    fn record_solution(&mut self, rule: Formula, assignment: &Assignment) -> Result<bool>;

    /// Erases every solution recorded for `rule`, and returns how many
    /// there were.
    ///
    /// # Errors
    ///
    /// Returns `Err` when the store fails.
    fn erase_solutions(&mut self, rule: Formula) -> Result<usize>;
}

#[test]
fn test_formula_ids_span_usize() {
    let last = Formula::new(usize::MAX);

    assert_eq!(last.id(), usize::MAX);
    assert_eq!(last.to_string(), format!("f{}", usize::MAX));
    assert!(Formula::new(0) < last);
}
