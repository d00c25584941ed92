//! Solution records keep rule application idempotent: before we commit
//! a rule firing, we check whether the same rule already fired with
//! the same values for all its variables.
use crate::bindings::BindingTable;
use crate::config::InferenceConfig;
use crate::error::Result;
use crate::logic::LogicExpression;
use crate::store::{Formula, FormulaStore, SolutionIndex};
use crate::unification::{Assignment, Variable};
use tracing::trace;

/// Answers whether a (rule, assignment) pair was already recorded.
/// The deduplicator only reads the index.
pub struct SolutionDeduplicator<'s, S: ?Sized> {
    store: &'s S,
    config: &'s InferenceConfig,
}

impl<'s, S: FormulaStore + SolutionIndex + ?Sized> SolutionDeduplicator<'s, S> {
    #[must_use]
    pub fn new(store: &'s S, config: &'s InferenceConfig) -> Self {
        Self { store, config }
    }

    /// Returns true iff a solution of `rule` was recorded with the
    /// values `assignment` gives to the rule's variables.  Variables of
    /// `assignment` that do not appear in `rule` are ignored.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `rule` is malformed, if one of its variables is
    /// unbound in `assignment`, or when the store fails.
    pub fn exists(&self, rule: Formula, assignment: &Assignment) -> Result<bool> {
        let expression = LogicExpression::build(self.store, self.config, rule)?;

        self.exists_with_variables(rule, expression.variables(), assignment)
    }

    /// Like `exists`, for callers that already know the free
    /// `variables` of `rule`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if one of `variables` is unbound in `assignment`,
    /// or when the store fails.
    pub fn exists_with_variables(
        &self,
        rule: Formula,
        variables: &[Variable],
        assignment: &Assignment,
    ) -> Result<bool> {
        for var in variables {
            assignment.require(var)?;
        }

        let key = assignment.restrict(variables);
        let exists = self.store.solution_exists(rule, &key)?;
        trace!(%rule, exists, "solution lookup");
        Ok(exists)
    }
}

/// Records one solution of `rule` per row of `table`, and returns how
/// many of them are new.
///
/// # Errors
///
/// Returns `Err` when the store fails.
pub fn record_solutions<S: SolutionIndex + ?Sized>(
    index: &mut S,
    rule: Formula,
    table: &BindingTable,
) -> Result<usize> {
    let mut recorded = 0;

    for assignment in table.assignments() {
        if index.record_solution(rule, &assignment)? {
            recorded += 1;
        }
    }

    Ok(recorded)
}

#[cfg(test)]
use crate::error::InferenceError;
#[cfg(test)]
use crate::ground::Entity;
#[cfg(test)]
use crate::matching::PredicateFormula;
#[cfg(test)]
use crate::store::MemoryStore;
#[cfg(test)]
use crate::unification::Element;

#[test]
fn test_exists_then_record() {
    let mut store = MemoryStore::new();
    let x = Variable::new("x");
    let y = Variable::new("y");
    let rule = store.add_atomic(PredicateFormula::new(
        "p",
        vec![Element::Reference(x.clone()), Element::Reference(y.clone())],
    ));
    let config = InferenceConfig::default();

    let assignment: Assignment = vec![(x.clone(), Entity::new(1)), (y.clone(), Entity::new(2))]
        .into_iter()
        .collect();

    assert!(!SolutionDeduplicator::new(&store, &config)
        .exists(rule, &assignment)
        .expect("ok"));

    let table = BindingTable::from_assignment(&assignment);
    assert_eq!(record_solutions(&mut store, rule, &table).expect("ok"), 1);
    assert_eq!(record_solutions(&mut store, rule, &table).expect("ok"), 0);

    let dedup = SolutionDeduplicator::new(&store, &config);
    assert!(dedup.exists(rule, &assignment).expect("ok"));

    // Extra variables do not matter...
    let mut extended = assignment.clone();
    extended.insert(Variable::new("z"), Entity::new(3));
    assert!(dedup.exists(rule, &extended).expect("ok"));

    // ... but values do.
    let other: Assignment = vec![(x, Entity::new(1)), (y, Entity::new(3))]
        .into_iter()
        .collect();
    assert!(!dedup.exists(rule, &other).expect("ok"));
}

#[test]
fn test_exists_unbound() {
    let mut store = MemoryStore::new();
    let x = Variable::new("x");
    let y = Variable::new("y");
    let rule = store.add_atomic(PredicateFormula::new(
        "p",
        vec![Element::Reference(x.clone()), Element::Reference(y.clone())],
    ));
    let config = InferenceConfig::default();

    let partial: Assignment = vec![(x, Entity::new(1))].into_iter().collect();
    assert!(matches!(
        SolutionDeduplicator::new(&store, &config).exists(rule, &partial),
        Err(InferenceError::UnboundVariable { variable }) if variable == y
    ));
}

#[test]
fn test_exists_with_known_variables() {
    let mut store = MemoryStore::new();
    let x = Variable::new("x");
    let y = Variable::new("y");
    let rule = store.add_atomic(PredicateFormula::new(
        "p",
        vec![Element::Reference(x.clone()), Element::Reference(y.clone())],
    ));
    let config = InferenceConfig::default();

    let assignment: Assignment = vec![(x.clone(), Entity::new(1)), (y.clone(), Entity::new(2))]
        .into_iter()
        .collect();
    store.record_solution(rule, &assignment).expect("ok");

    let dedup = SolutionDeduplicator::new(&store, &config);
    let variables = [x.clone(), y.clone()];
    assert!(dedup
        .exists_with_variables(rule, &variables, &assignment)
        .expect("ok"));
    assert_eq!(
        dedup.exists_with_variables(rule, &variables, &assignment).expect("ok"),
        dedup.exists(rule, &assignment).expect("ok")
    );

    // Narrower keys match every record that agrees on them.
    let partial: Assignment = vec![(x.clone(), Entity::new(1))].into_iter().collect();
    assert!(dedup
        .exists_with_variables(rule, &[x], &partial)
        .expect("ok"));
    assert!(matches!(
        dedup.exists_with_variables(rule, &variables, &partial),
        Err(InferenceError::UnboundVariable { variable }) if variable == y
    ));
}
