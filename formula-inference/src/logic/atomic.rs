//! Atoms search the fact store for matches of their predicate
//! pattern and, when eligible, assert the facts they are missing.
use super::{Context, LogicFormulaResult};
use crate::bindings::BindingTable;
use crate::config::{GenerationType, ReplacementsUsage};
use crate::error::Result;
use crate::matching::PredicateFormula;
use crate::store::{FactStore, Formula};
use crate::unification::{Assignment, Variable};
use tracing::{debug, trace};

pub struct AtomicNode {
    formula: Formula,
    pattern: PredicateFormula,
    // Sorted and deduplicated.
    variables: Vec<Variable>,
    has_constants: bool,
    generation_eligible: bool,
    // The arguments that bind our variables, if any.
    arguments: Assignment,
}

impl AtomicNode {
    #[must_use]
    pub fn new(formula: Formula, pattern: PredicateFormula, generation_eligible: bool) -> Self {
        let variables = pattern.variables().into_iter().collect();
        let has_constants = pattern.has_constants();

        Self {
            formula,
            pattern,
            variables,
            has_constants,
            generation_eligible,
            arguments: Assignment::new(),
        }
    }

    #[cfg(not(tarpaulin_include))]
    #[must_use]
    pub fn formula(&self) -> Formula {
        self.formula
    }

    #[cfg(not(tarpaulin_include))]
    #[must_use]
    pub fn pattern(&self) -> &PredicateFormula {
        &self.pattern
    }

    #[cfg(not(tarpaulin_include))]
    #[must_use]
    pub fn has_constants(&self) -> bool {
        self.has_constants
    }

    #[cfg(not(tarpaulin_include))]
    #[must_use]
    pub fn is_generation_eligible(&self) -> bool {
        self.generation_eligible
    }

    pub fn set_arguments(&mut self, arguments: &Assignment) {
        self.arguments = arguments.restrict(&self.variables);
    }

    /// Returns `bindings`, further restricted to our arguments.
    fn constraint(&self, bindings: &BindingTable) -> Result<BindingTable> {
        if self.arguments.is_empty() {
            return Ok(bindings.clone());
        }

        bindings.intersect(&BindingTable::from_assignment(&self.arguments))
    }

    /// Searches for facts that match our pattern under `bindings`.
    ///
    /// # Errors
    ///
    /// Returns `Err` when the store fails.
    pub fn compute<S: FactStore + ?Sized>(
        &self,
        ctx: &mut Context<'_, S>,
        bindings: &BindingTable,
    ) -> Result<LogicFormulaResult> {
        let constraint = self.constraint(bindings)?;
        let found = ctx.store.search(&self.pattern, &constraint)?;

        trace!(
            formula = %self.formula,
            pattern = %self.pattern,
            rows = found.rows_amount(),
            "atom searched"
        );
        Ok(LogicFormulaResult::success(found, false))
    }

    /// Like `compute`, but eligible atoms assert a fact for each row of
    /// `bindings` that has no match (or every row, when generating
    /// all), with fresh entities for the variables the row leaves
    /// unbound.  The result counts as generated only when at least one
    /// asserted fact is new.
    ///
    /// # Errors
    ///
    /// Returns `Err` when the store fails.
    pub fn generate<S: FactStore + ?Sized>(
        &self,
        ctx: &mut Context<'_, S>,
        bindings: &BindingTable,
    ) -> Result<LogicFormulaResult> {
        if !self.generation_eligible {
            return self.compute(ctx, bindings);
        }

        let constraint = self.constraint(bindings)?;
        let mut columns: Vec<Variable> = constraint.columns().to_vec();
        for var in &self.variables {
            if !constraint.has_column(var) {
                columns.push(var.clone());
            }
        }

        let mut result = BindingTable::new(&columns)?;
        let mut generated = 0usize;
        for assignment in constraint.assignments() {
            if ctx.config.generation == GenerationType::Unique {
                let existing = ctx
                    .store
                    .search(&self.pattern, &BindingTable::from_assignment(&assignment))?;

                if existing.is_satisfiable() {
                    for found in existing.assignments() {
                        result.insert_assignment(&found)?;
                    }

                    continue;
                }
            }

            let mut full = assignment;
            for var in &self.variables {
                if !full.contains(var) {
                    full.insert(var.clone(), ctx.store.fresh_entity()?);
                }
            }

            let new = ctx.store.assert_fact(&self.pattern, &full)?;
            trace!(formula = %self.formula, pattern = %self.pattern, ?full, new, "asserted");

            result.insert_assignment(&full)?;
            if new {
                generated += 1;
            }
            if ctx.config.replacements == ReplacementsUsage::First {
                break;
            }
        }

        debug!(
            formula = %self.formula,
            pattern = %self.pattern,
            generated,
            rows = result.rows_amount(),
            "atom generated"
        );
        Ok(LogicFormulaResult::success(result, generated > 0))
    }
}

#[cfg(test)]
use crate::config::InferenceConfig;
#[cfg(test)]
use crate::error::InferenceError;
#[cfg(test)]
use crate::ground::Entity;
#[cfg(test)]
use crate::store::MemoryStore;
#[cfg(test)]
use crate::unification::Element;

#[cfg(test)]
fn entities(ids: &[u32]) -> Vec<Entity> {
    ids.iter().map(|id| Entity::new(*id)).collect()
}

#[test]
fn test_atomic_compute() {
    let mut store = MemoryStore::new();
    store.insert_fact("q", &entities(&[1, 2])).expect("ok");
    store.insert_fact("q", &entities(&[1, 3])).expect("ok");
    store.insert_fact("q", &entities(&[4, 3])).expect("ok");

    let x = Variable::new("x");
    let y = Variable::new("y");
    let pattern = PredicateFormula::new(
        "q",
        vec![Element::Reference(x.clone()), Element::Reference(y.clone())],
    );
    let mut node = AtomicNode::new(Formula::new(0), pattern, false);

    let config = InferenceConfig::default();
    let mut ctx = Context::new(&mut store, &config);
    let all = node.compute(&mut ctx, &BindingTable::unit()).expect("ok");
    assert!(all.value());
    assert!(!all.is_generated());
    assert_eq!(all.bindings().rows_amount(), 3);

    // Arguments narrow the search.
    node.set_arguments(&vec![(x.clone(), Entity::new(4))].into_iter().collect());
    let narrowed = node.compute(&mut ctx, &BindingTable::unit()).expect("ok");
    assert_eq!(narrowed.bindings().column(&y), Some(entities(&[3])));

    node.set_arguments(&vec![(x, Entity::new(9))].into_iter().collect());
    let none = node.compute(&mut ctx, &BindingTable::unit()).expect("ok");
    assert_eq!(none, LogicFormulaResult::failure());
}

#[test]
fn test_atomic_generate_not_eligible() {
    let mut store = MemoryStore::new();
    let x = Variable::new("x");
    let node = AtomicNode::new(
        Formula::new(0),
        PredicateFormula::new("r", vec![Element::Reference(x.clone())]),
        false,
    );

    let config = InferenceConfig::default();
    let bound = BindingTable::from_rows(&[x], vec![entities(&[5])]).expect("ok");
    let result = node
        .generate(&mut Context::new(&mut store, &config), &bound)
        .expect("ok");
    assert!(!result.value());
    assert_eq!(store.fact_count("r"), 0);
}

#[test]
fn test_atomic_generate_fresh_entities() {
    let mut store = MemoryStore::new();
    store.insert_fact("s", &entities(&[5, 6])).expect("ok");

    let x = Variable::new("x");
    let y = Variable::new("y");
    let node = AtomicNode::new(
        Formula::new(0),
        PredicateFormula::new(
            "r",
            vec![Element::Reference(x.clone()), Element::Reference(y.clone())],
        ),
        true,
    );

    let config = InferenceConfig::default();
    let bound = BindingTable::from_rows(&[x.clone()], vec![entities(&[5]), entities(&[6])])
        .expect("ok");
    let result = node
        .generate(&mut Context::new(&mut store, &config), &bound)
        .expect("ok");

    assert!(result.value());
    assert!(result.is_generated());
    assert_eq!(result.bindings().columns(), [x.clone(), y.clone()]);
    assert_eq!(result.bindings().rows_amount(), 2);
    assert_eq!(store.fact_count("r"), 2);

    // Generated values for `y` are new, and distinct.
    let ys = result.bindings().column(&y).expect("column");
    assert_ne!(ys[0], ys[1]);
    assert!(ys.iter().all(|value| value.id() > 6));
}

#[test]
fn test_atomic_generate_unique_reuses_matches() {
    let mut store = MemoryStore::new();
    store.insert_fact("r", &entities(&[5])).expect("ok");

    let x = Variable::new("x");
    let node = AtomicNode::new(
        Formula::new(0),
        PredicateFormula::new("r", vec![Element::Reference(x.clone())]),
        true,
    );

    let config = InferenceConfig::default();
    let bound = BindingTable::from_rows(&[x.clone()], vec![entities(&[5]), entities(&[6])])
        .expect("ok");
    let result = node
        .generate(&mut Context::new(&mut store, &config), &bound)
        .expect("ok");

    assert!(result.is_generated());
    assert_eq!(result.bindings().column(&x), Some(entities(&[5, 6])));
    assert_eq!(store.fact_count("r"), 2);

    // Everything exists now: nothing left to generate.
    let again = node
        .generate(&mut Context::new(&mut store, &config), &bound)
        .expect("ok");
    assert!(again.value());
    assert!(!again.is_generated());
    assert_eq!(store.fact_count("r"), 2);
}

#[test]
fn test_atomic_generate_first_replacement() {
    let mut store = MemoryStore::new();
    let x = Variable::new("x");
    let node = AtomicNode::new(
        Formula::new(0),
        PredicateFormula::new("r", vec![Element::Reference(x.clone())]),
        true,
    );

    let config = InferenceConfig {
        replacements: ReplacementsUsage::First,
        ..InferenceConfig::default()
    };
    let bound = BindingTable::from_rows(
        &[x.clone()],
        vec![entities(&[5]), entities(&[6]), entities(&[7])],
    )
    .expect("ok");
    let result = node
        .generate(&mut Context::new(&mut store, &config), &bound)
        .expect("ok");

    assert!(result.is_generated());
    assert_eq!(result.bindings().rows_amount(), 1);
    assert_eq!(store.fact_count("r"), 1);
    assert!(store.contains_fact("r", &entities(&[5])));
}

#[test]
fn test_atomic_generate_all_counts_new_facts() {
    let mut store = MemoryStore::new();
    store.insert_fact("r", &entities(&[5])).expect("ok");

    let x = Variable::new("x");
    let node = AtomicNode::new(
        Formula::new(0),
        PredicateFormula::new("r", vec![Element::Reference(x.clone())]),
        true,
    );

    let config = InferenceConfig {
        generation: GenerationType::All,
        ..InferenceConfig::default()
    };
    let existing = BindingTable::from_rows(&[x.clone()], vec![entities(&[5])]).expect("ok");
    let result = node
        .generate(&mut Context::new(&mut store, &config), &existing)
        .expect("ok");
    assert!(result.value());
    assert!(!result.is_generated());
    assert_eq!(result.bindings().column(&x), Some(entities(&[5])));

    let mixed = BindingTable::from_rows(&[x.clone()], vec![entities(&[5]), entities(&[6])])
        .expect("ok");
    let result = node
        .generate(&mut Context::new(&mut store, &config), &mixed)
        .expect("ok");
    assert!(result.is_generated());
    assert_eq!(result.bindings().column(&x), Some(entities(&[5, 6])));
    assert_eq!(store.fact_count("r"), 2);
}

#[test]
fn test_atomic_generate_out_of_entities() {
    let mut store = MemoryStore::new();
    store.insert_fact("s", &entities(&[u32::MAX])).expect("ok");

    let x = Variable::new("x");
    let node = AtomicNode::new(
        Formula::new(0),
        PredicateFormula::new("r", vec![Element::Reference(x)]),
        true,
    );

    let config = InferenceConfig::default();
    assert!(matches!(
        node.generate(&mut Context::new(&mut store, &config), &BindingTable::unit()),
        Err(InferenceError::Store(_))
    ));
    assert_eq!(store.fact_count("r"), 0);
}
