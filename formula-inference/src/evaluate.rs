//! Evaluation is the entry point of the inference core: `evaluate`
//! builds the expression tree for one formula, binds its arguments,
//! and computes (or generates) it against a store.
//!
//! `apply_rules` drives rule application over sets of rules, in
//! priority order: each rule is computed, and every rule that derived
//! new facts has its solutions recorded, so that repeated applications
//! over the same facts do not record anything twice.
//! `apply_rules_until` does the same, but stops as soon as a target
//! formula holds.
use crate::bindings::BindingTable;
use crate::config::InferenceConfig;
use crate::error::Result;
use crate::logic::{ArgumentVector, Context, LogicExpression, LogicFormulaResult, Mode};
use crate::solution::SolutionDeduplicator;
use crate::store::{FactStore, Formula, FormulaStore, SolutionIndex};
use crate::unification::Variable;
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Evaluates an already built `expression` under `initial`.
fn run<S>(
    store: &mut S,
    config: &InferenceConfig,
    expression: &LogicExpression,
    initial: &BindingTable,
    mode: Mode,
) -> Result<LogicFormulaResult>
where
    S: FactStore + ?Sized,
{
    let unit;
    let initial = if initial.columns_amount() == 0 {
        unit = BindingTable::unit();
        &unit
    } else {
        initial
    };

    let mut ctx = Context::new(store, config);
    let result = expression.evaluate(&mut ctx, initial, mode)?;
    debug!(
        formula = %expression.formula(),
        ?mode,
        value = result.value(),
        is_generated = result.is_generated(),
        rows = result.bindings().rows_amount(),
        "evaluated"
    );
    Ok(result)
}

/// Builds the expression tree for `formula`, binds `arguments` to its
/// free variables, and evaluates it under `initial` in `mode`.
///
/// A table without columns stands for "nothing bound yet", and is
/// replaced with the unit table.
///
/// # Errors
///
/// Returns `Err` when `formula` is malformed or too deep, or when the
/// store fails.
pub fn evaluate<S>(
    store: &mut S,
    config: &InferenceConfig,
    formula: Formula,
    initial: &BindingTable,
    arguments: &ArgumentVector,
    mode: Mode,
) -> Result<LogicFormulaResult>
where
    S: FactStore + FormulaStore + ?Sized,
{
    let mut expression = LogicExpression::build(&*store, config, formula)?;
    expression.bind_arguments(arguments);

    run(store, config, &expression, initial, mode)
}

/// Records each row of `bindings` that binds every one of `variables`
/// as a solution of `rule`, unless it already was.
fn record_new_solutions<S>(
    store: &mut S,
    config: &InferenceConfig,
    rule: Formula,
    variables: &[Variable],
    bindings: &BindingTable,
) -> Result<()>
where
    S: FormulaStore + SolutionIndex + ?Sized,
{
    for assignment in bindings.assignments() {
        if variables.iter().any(|var| !assignment.contains(var)) {
            warn!(%rule, ?assignment, "solution does not bind every rule variable");
            continue;
        }

        let key = assignment.restrict(variables);
        let dedup = SolutionDeduplicator::new(&*store, config);
        if dedup.exists_with_variables(rule, variables, &key)? {
            warn!(%rule, ?key, "solution already recorded");
            continue;
        }

        store.record_solution(rule, &key)?;
    }

    Ok(())
}

/// Computes `rule` once and, if it generated, records its solutions.
fn fire<S>(
    store: &mut S,
    config: &InferenceConfig,
    rule: Formula,
    arguments: &ArgumentVector,
) -> Result<LogicFormulaResult>
where
    S: FactStore + FormulaStore + SolutionIndex + ?Sized,
{
    let mut expression = LogicExpression::build(&*store, config, rule)?;
    expression.bind_arguments(arguments);

    let unit = BindingTable::unit();
    let result = run(&mut *store, config, &expression, &unit, Mode::Compute)?;
    if result.is_generated() {
        record_new_solutions(store, config, rule, expression.variables(), result.bindings())?;
    }

    Ok(result)
}

/// Applies every rule in `rule_sets`, in order, and returns whether any
/// rule derived new facts.
///
/// For each rule that generated, each row of its bindings that gives a
/// value to every variable of the rule is recorded as a solution,
/// unless it already was.
///
/// # Errors
///
/// Returns `Err` when a rule is malformed or too deep, or when the
/// store fails.
pub fn apply_rules<S>(
    store: &mut S,
    config: &InferenceConfig,
    rule_sets: &[Vec<Formula>],
    arguments: &ArgumentVector,
) -> Result<bool>
where
    S: FactStore + FormulaStore + SolutionIndex + ?Sized,
{
    let mut any_generated = false;

    for (priority, rules) in rule_sets.iter().enumerate() {
        debug!(priority, rules = rules.len(), "applying rule set");

        for rule in rules.iter().copied() {
            if fire(&mut *store, config, rule, arguments)?.is_generated() {
                any_generated = true;
            }
        }
    }

    Ok(any_generated)
}

/// Returns whether `target` holds under some row of `bindings`,
/// restricted to the variables the target shares with them.
fn target_holds<S>(
    store: &mut S,
    config: &InferenceConfig,
    target: &LogicExpression,
    bindings: &BindingTable,
) -> Result<bool>
where
    S: FactStore + ?Sized,
{
    let shared: Vec<Variable> = target
        .variables()
        .iter()
        .filter(|var| bindings.has_column(var))
        .cloned()
        .collect();
    let initial = if shared.is_empty() {
        BindingTable::unit()
    } else {
        bindings.project(&shared)?
    };

    Ok(run(store, config, target, &initial, Mode::Compute)?.value())
}

/// Applies the rules in `rule_sets` until `target` holds, and returns
/// whether it was reached by applying them.  A target that already
/// holds yields `false` without applying anything.
///
/// Rules are tried in priority order.  Once a rule generates without
/// reaching the target, the rules of the current set that did not
/// generate are queued again, and the search restarts from the first
/// set after the current one is exhausted.  `target` is only ever
/// searched for, never generated; it shares `arguments` with the rules.
///
/// # Errors
///
/// Returns `Err` when a rule or the target is malformed or too deep,
/// or when the store fails.
pub fn apply_rules_until<S>(
    store: &mut S,
    config: &InferenceConfig,
    rule_sets: &[Vec<Formula>],
    target: Formula,
    arguments: &ArgumentVector,
) -> Result<bool>
where
    S: FactStore + FormulaStore + SolutionIndex + ?Sized,
{
    let mut goal = LogicExpression::build_query(&*store, config, target)?;
    goal.bind_arguments(arguments);

    if target_holds(&mut *store, config, &goal, &BindingTable::unit())? {
        debug!(%target, "target already achieved");
        return Ok(false);
    }

    let mut priority = 0;
    while priority < rule_sets.len() {
        let rules = &rule_sets[priority];
        debug!(priority, rules = rules.len(), "applying rule set");

        let mut unchecked: VecDeque<Formula> = rules.iter().copied().collect();
        let mut checked = Vec::new();
        let mut restart = false;
        while let Some(rule) = unchecked.pop_front() {
            let result = fire(&mut *store, config, rule, arguments)?;
            if !result.is_generated() {
                checked.push(rule);
                continue;
            }

            if target_holds(&mut *store, config, &goal, result.bindings())? {
                debug!(%target, %rule, "target achieved");
                return Ok(true);
            }

            unchecked.extend(checked.drain(..));
            restart = true;
        }

        priority = if restart { 0 } else { priority + 1 };
    }

    debug!(%target, "target not achieved");
    Ok(false)
}

#[cfg(test)]
use crate::error::InferenceError;
#[cfg(test)]
use crate::ground::Entity;
#[cfg(test)]
use crate::matching::PredicateFormula;
#[cfg(test)]
use crate::store::{MemoryStore, Shape, Tag};
#[cfg(test)]
use crate::unification::Element;

#[cfg(test)]
fn entities(ids: &[u32]) -> Vec<Entity> {
    ids.iter().map(|id| Entity::new(*id)).collect()
}

#[cfg(test)]
fn atom(store: &mut MemoryStore, predicate: &str, elements: Vec<Element>) -> Formula {
    store.add_atomic(PredicateFormula::new(predicate, elements))
}

#[cfg(test)]
fn compute(store: &mut MemoryStore, formula: Formula) -> LogicFormulaResult {
    evaluate(
        store,
        &InferenceConfig::default(),
        formula,
        &BindingTable::unit(),
        &ArgumentVector::default(),
        Mode::Compute,
    )
    .expect("ok")
}

#[test]
fn test_conjunction_scenario() {
    let mut store = MemoryStore::new();
    let a = Entity::new(10);
    store.insert_fact("p", &[Entity::new(1), a]).expect("ok");
    store.insert_fact("q", &entities(&[1, 2])).expect("ok");
    store.insert_fact("q", &entities(&[1, 3])).expect("ok");

    let x = Variable::new("x");
    let y = Variable::new("y");
    let p = atom(
        &mut store,
        "p",
        vec![Element::Reference(x.clone()), Element::Constant(a)],
    );
    let q = atom(
        &mut store,
        "q",
        vec![Element::Reference(x.clone()), Element::Reference(y.clone())],
    );
    let conjunction = store.add_tuple(Tag::Conjunction, &[p, q]);

    let result = compute(&mut store, conjunction);
    assert!(result.value());
    assert!(!result.is_generated());
    assert_eq!(result.bindings().columns(), [x.clone(), y.clone()]);
    assert_eq!(result.bindings().column(&x), Some(entities(&[1, 1])));
    assert_eq!(result.bindings().column(&y), Some(entities(&[2, 3])));
}

#[test]
fn test_conjunction_fails() {
    let mut store = MemoryStore::new();
    store.insert_fact("p", &entities(&[1])).expect("ok");
    store.insert_fact("q", &entities(&[2])).expect("ok");

    let x = Variable::new("x");
    let p = atom(&mut store, "p", vec![Element::Reference(x.clone())]);
    let q = atom(&mut store, "q", vec![Element::Reference(x.clone())]);
    let missing = atom(&mut store, "r", vec![Element::Constant(Entity::new(1))]);

    // Both operands hold, but never for the same `x`.
    let disjoint = store.add_tuple(Tag::Conjunction, &[p, q]);
    assert_eq!(compute(&mut store, disjoint), LogicFormulaResult::failure());

    let with_missing = store.add_tuple(Tag::Conjunction, &[p, missing]);
    assert_eq!(
        compute(&mut store, with_missing),
        LogicFormulaResult::failure()
    );
}

#[test]
fn test_conjunction_generates_last() {
    let mut store = MemoryStore::new();
    store.insert_fact("s", &entities(&[5])).expect("ok");

    let x = Variable::new("x");
    let r = atom(&mut store, "r", vec![Element::Reference(x.clone())]);
    store.mark(r, Tag::GenerationEligible);
    let s = atom(&mut store, "s", vec![Element::Reference(x.clone())]);
    // `r` comes first, but only fires once `s` bound `x`.
    let conjunction = store.add_tuple(Tag::Conjunction, &[r, s]);

    let result = compute(&mut store, conjunction);
    assert!(result.value());
    assert!(result.is_generated());
    assert_eq!(result.bindings().column(&x), Some(entities(&[5])));
    assert!(store.contains_fact("r", &entities(&[5])));
    assert_eq!(store.fact_count("r"), 1);
}

#[test]
fn test_generate_with_bound_variable() {
    let mut store = MemoryStore::new();
    let x = Variable::new("x");
    let r = atom(&mut store, "r", vec![Element::Reference(x.clone())]);
    store.mark(r, Tag::GenerationEligible);

    let bound = BindingTable::from_rows(&[x.clone()], vec![entities(&[5])]).expect("ok");
    let config = InferenceConfig::default();
    let computed = evaluate(
        &mut store,
        &config,
        r,
        &bound,
        &ArgumentVector::default(),
        Mode::Compute,
    )
    .expect("ok");
    assert!(!computed.value());
    assert_eq!(store.fact_count("r"), 0);

    let generated = evaluate(
        &mut store,
        &config,
        r,
        &bound,
        &ArgumentVector::default(),
        Mode::Generate,
    )
    .expect("ok");
    assert!(generated.value());
    assert!(generated.is_generated());
    assert!(store.contains_fact("r", &entities(&[5])));
}

#[test]
fn test_double_negation() {
    let mut store = MemoryStore::new();
    store.insert_fact("p", &entities(&[1])).expect("ok");

    let x = Variable::new("x");
    let p = atom(&mut store, "p", vec![Element::Reference(x.clone())]);
    let q = atom(&mut store, "q", vec![Element::Reference(x.clone())]);
    let not_p = store.add_tuple(Tag::Negation, &[p]);
    let not_not_p = store.add_tuple(Tag::Negation, &[not_p]);
    let not_q = store.add_tuple(Tag::Negation, &[q]);
    let not_not_q = store.add_tuple(Tag::Negation, &[not_q]);

    assert!(compute(&mut store, p).value());
    assert!(!compute(&mut store, not_p).value());

    let holds = compute(&mut store, not_not_p);
    assert!(holds.value());
    assert_eq!(holds.bindings(), &BindingTable::unit());

    assert!(compute(&mut store, not_q).value());
    assert_eq!(
        compute(&mut store, not_not_q),
        LogicFormulaResult::failure()
    );
}

#[test]
fn test_disjunction() {
    let mut store = MemoryStore::new();
    store.insert_fact("p", &entities(&[1])).expect("ok");
    store.insert_fact("q", &entities(&[2])).expect("ok");

    let x = Variable::new("x");
    let y = Variable::new("y");
    let p = atom(&mut store, "p", vec![Element::Reference(x.clone())]);
    let q = atom(&mut store, "q", vec![Element::Reference(x.clone())]);
    let r = atom(&mut store, "r", vec![Element::Reference(x.clone())]);
    let q_y = atom(&mut store, "q", vec![Element::Reference(y)]);

    let either = store.add_tuple(Tag::Disjunction, &[p, q, r]);
    let result = compute(&mut store, either);
    assert!(result.value());
    assert_eq!(result.bindings().column(&x), Some(entities(&[1, 2])));

    let neither = store.add_tuple(Tag::Disjunction, &[r]);
    assert_eq!(compute(&mut store, neither), LogicFormulaResult::failure());

    let mismatched = store.add_tuple(Tag::Disjunction, &[p, q_y]);
    assert!(matches!(
        evaluate(
            &mut store,
            &InferenceConfig::default(),
            mismatched,
            &BindingTable::unit(),
            &ArgumentVector::default(),
            Mode::Compute,
        ),
        Err(InferenceError::ColumnMismatch { .. })
    ));

    // Disjunctions are never generated.
    let generated = evaluate(
        &mut store,
        &InferenceConfig::default(),
        either,
        &BindingTable::unit(),
        &ArgumentVector::default(),
        Mode::Generate,
    )
    .expect("ok");
    assert_eq!(generated, LogicFormulaResult::failure());
}

#[test]
fn test_implication_generates_consequent() {
    let mut store = MemoryStore::new();
    store.insert_fact("p", &entities(&[1])).expect("ok");
    store.insert_fact("p", &entities(&[2])).expect("ok");

    let x = Variable::new("x");
    let p = atom(&mut store, "p", vec![Element::Reference(x.clone())]);
    let r = atom(&mut store, "r", vec![Element::Reference(x.clone())]);
    store.mark(r, Tag::GenerationEligible);
    let rule = store.add_implication(p, r);

    let result = compute(&mut store, rule);
    assert!(result.value());
    assert!(result.is_generated());
    assert_eq!(result.bindings().column(&x), Some(entities(&[1, 2])));
    assert_eq!(store.fact_count("r"), 2);

    // Now that the consequent holds, nothing is generated.
    let again = compute(&mut store, rule);
    assert!(again.value());
    assert!(!again.is_generated());
    assert_eq!(store.fact_count("r"), 2);
}

#[test]
fn test_implication_vacuous() {
    let mut store = MemoryStore::new();
    let x = Variable::new("x");
    let p = atom(&mut store, "p", vec![Element::Reference(x.clone())]);
    let r = atom(&mut store, "r", vec![Element::Reference(x)]);
    store.mark(r, Tag::GenerationEligible);
    let rule = store.add_implication_tuple(p, r);

    let result = compute(&mut store, rule);
    assert!(result.value());
    assert!(!result.is_generated());
    assert_eq!(result.bindings(), &BindingTable::unit());
    assert_eq!(store.fact_count("r"), 0);
}

#[test]
fn test_implication_with_arguments() {
    let mut store = MemoryStore::new();
    store.insert_fact("p", &entities(&[1])).expect("ok");
    store.insert_fact("p", &entities(&[2])).expect("ok");

    let x = Variable::new("x");
    let p = atom(&mut store, "p", vec![Element::Reference(x.clone())]);
    let r = atom(&mut store, "r", vec![Element::Reference(x.clone())]);
    store.mark(r, Tag::GenerationEligible);
    let rule = store.add_implication(p, r);

    let result = evaluate(
        &mut store,
        &InferenceConfig::default(),
        rule,
        &BindingTable::unit(),
        &vec![Entity::new(2)].into(),
        Mode::Compute,
    )
    .expect("ok");
    assert!(result.is_generated());
    assert_eq!(result.bindings().column(&x), Some(entities(&[2])));
    assert!(store.contains_fact("r", &entities(&[2])));
    assert!(!store.contains_fact("r", &entities(&[1])));
}

#[test]
fn test_implication_first_replacement() {
    let mut store = MemoryStore::new();
    for id in 1..=3 {
        store.insert_fact("p", &entities(&[id])).expect("ok");
    }

    let x = Variable::new("x");
    let p = atom(&mut store, "p", vec![Element::Reference(x.clone())]);
    let r = atom(&mut store, "r", vec![Element::Reference(x)]);
    store.mark(r, Tag::GenerationEligible);
    let rule = store.add_implication(p, r);

    let config = InferenceConfig {
        replacements: crate::config::ReplacementsUsage::First,
        ..InferenceConfig::default()
    };
    let result = evaluate(
        &mut store,
        &config,
        rule,
        &BindingTable::unit(),
        &ArgumentVector::default(),
        Mode::Compute,
    )
    .expect("ok");
    assert!(result.is_generated());
    assert_eq!(store.fact_count("r"), 1);
}

#[test]
fn test_equivalence() {
    let mut store = MemoryStore::new();
    store.insert_fact("p", &entities(&[1])).expect("ok");
    store.insert_fact("p", &entities(&[2])).expect("ok");
    store.insert_fact("q", &entities(&[2])).expect("ok");
    store.insert_fact("s", &entities(&[3])).expect("ok");
    store.insert_fact("g", &entities(&[7])).expect("ok");

    let x = Variable::new("x");
    let p = atom(&mut store, "p", vec![Element::Reference(x.clone())]);
    let q = atom(&mut store, "q", vec![Element::Reference(x.clone())]);
    let s = atom(&mut store, "s", vec![Element::Reference(x.clone())]);
    let g = atom(&mut store, "g", vec![Element::Constant(Entity::new(7))]);

    let agree = store.add_equivalence(p, q);
    let result = compute(&mut store, agree);
    assert!(result.value());
    assert_eq!(result.bindings().column(&x), Some(entities(&[2])));

    let disagree = store.add_equivalence_tuple(q, s);
    assert_eq!(compute(&mut store, disagree), LogicFormulaResult::failure());

    // Both sides are ground, and hold.
    let ground = store.add_equivalence(g, g);
    let result = compute(&mut store, ground);
    assert!(result.value());
    assert_eq!(result.bindings(), &BindingTable::unit());
}

#[test]
fn test_malformed_formula() {
    let mut store = MemoryStore::new();
    let bare = store.add_formula(Shape::Node);

    assert!(matches!(
        evaluate(
            &mut store,
            &InferenceConfig::default(),
            bare,
            &BindingTable::unit(),
            &ArgumentVector::default(),
            Mode::Compute,
        ),
        Err(InferenceError::MalformedFormula { formula, .. }) if formula == bare
    ));
}

#[test]
fn test_apply_rules_idempotent() {
    let mut store = MemoryStore::new();
    store.insert_fact("parent", &entities(&[1, 2])).expect("ok");
    store.insert_fact("parent", &entities(&[2, 3])).expect("ok");

    let x = Variable::new("x");
    let y = Variable::new("y");
    let parent = atom(
        &mut store,
        "parent",
        vec![Element::Reference(x.clone()), Element::Reference(y.clone())],
    );
    let child = atom(
        &mut store,
        "child",
        vec![Element::Reference(y.clone()), Element::Reference(x.clone())],
    );
    store.mark(child, Tag::GenerationEligible);
    let rule = store.add_implication(parent, child);

    let config = InferenceConfig::default();
    let rule_sets = vec![vec![rule]];
    assert!(apply_rules(&mut store, &config, &rule_sets, &ArgumentVector::default())
        .expect("ok"));
    assert_eq!(store.fact_count("child"), 2);
    assert!(store.contains_fact("child", &entities(&[3, 2])));
    assert_eq!(store.solution_count(rule), 2);

    let solution: crate::unification::Assignment =
        vec![(x.clone(), Entity::new(1)), (y.clone(), Entity::new(2))]
            .into_iter()
            .collect();
    assert!(SolutionDeduplicator::new(&store, &config)
        .exists(rule, &solution)
        .expect("ok"));

    // The second run finds every consequent in place.
    assert!(!apply_rules(&mut store, &config, &rule_sets, &ArgumentVector::default())
        .expect("ok"));
    assert_eq!(store.fact_count("child"), 2);
    assert_eq!(store.solution_count(rule), 2);
}

#[test]
fn test_apply_rules_priority_order() {
    let mut store = MemoryStore::new();
    store.insert_fact("a", &entities(&[1])).expect("ok");

    let x = Variable::new("x");
    let a = atom(&mut store, "a", vec![Element::Reference(x.clone())]);
    let b = atom(&mut store, "b", vec![Element::Reference(x.clone())]);
    let b_premise = atom(&mut store, "b", vec![Element::Reference(x.clone())]);
    let c = atom(&mut store, "c", vec![Element::Reference(x)]);
    store.mark(b, Tag::GenerationEligible);
    store.mark(c, Tag::GenerationEligible);

    let first = store.add_implication(a, b);
    let second = store.add_implication(b_premise, c);

    // `b => c` only fires because `a => b` ran before it.
    let config = InferenceConfig::default();
    assert!(apply_rules(
        &mut store,
        &config,
        &[vec![first], vec![second]],
        &ArgumentVector::default()
    )
    .expect("ok"));
    assert!(store.contains_fact("c", &entities(&[1])));
    assert_eq!(store.solution_count(first), 1);
    assert_eq!(store.solution_count(second), 1);
}

#[test]
fn test_conjunction_generate_chains() {
    let mut store = MemoryStore::new();
    store.insert_fact("p", &entities(&[1])).expect("ok");

    let x = Variable::new("x");
    let y = Variable::new("y");
    let p = atom(&mut store, "p", vec![Element::Reference(x.clone())]);
    let r = atom(&mut store, "r", vec![Element::Reference(x.clone())]);
    let s = atom(
        &mut store,
        "s",
        vec![Element::Reference(x.clone()), Element::Reference(y.clone())],
    );
    store.mark(r, Tag::GenerationEligible);
    store.mark(s, Tag::GenerationEligible);
    let both = store.add_tuple(Tag::Conjunction, &[r, s]);

    let bound = BindingTable::from_rows(&[x.clone()], vec![entities(&[1])]).expect("ok");
    let generated = evaluate(
        &mut store,
        &InferenceConfig::default(),
        both,
        &bound,
        &ArgumentVector::default(),
        Mode::Generate,
    )
    .expect("ok");
    assert!(generated.value());
    assert!(generated.is_generated());
    assert_eq!(generated.bindings().columns(), [x.clone(), y.clone()]);
    assert_eq!(generated.bindings().column(&x), Some(entities(&[1])));
    assert!(store.contains_fact("r", &entities(&[1])));
    assert_eq!(store.fact_count("s"), 1);

    // `s` saw the row `r` produced, and only had to invent `y`.
    let ys = generated.bindings().column(&y).expect("column");
    assert!(ys[0].id() > 1);
    assert!(store.contains_fact("s", &[Entity::new(1), ys[0]]));

    // The chained facts satisfy `p(x) => r(x) & s(x, y)`.
    let rule = store.add_implication(p, both);
    let result = compute(&mut store, rule);
    assert!(result.value());
    assert!(!result.is_generated());
    assert_eq!(store.fact_count("r"), 1);
    assert_eq!(store.fact_count("s"), 1);
}

#[test]
fn test_conjunction_generate_stops_at_failure() {
    let mut store = MemoryStore::new();
    let x = Variable::new("x");
    let q = atom(&mut store, "q", vec![Element::Reference(x.clone())]);
    let r = atom(&mut store, "r", vec![Element::Reference(x.clone())]);
    store.mark(r, Tag::GenerationEligible);
    let conjunction = store.add_tuple(Tag::Conjunction, &[q, r]);

    let bound = BindingTable::from_rows(&[x], vec![entities(&[1])]).expect("ok");
    let generated = evaluate(
        &mut store,
        &InferenceConfig::default(),
        conjunction,
        &bound,
        &ArgumentVector::default(),
        Mode::Generate,
    )
    .expect("ok");
    assert_eq!(generated, LogicFormulaResult::failure());
    assert_eq!(store.fact_count("r"), 0);
}

#[test]
fn test_conjunction_empty_intersection() {
    let mut store = MemoryStore::new();
    store.insert_fact("p", &entities(&[1, 7])).expect("ok");
    store.insert_fact("q", &entities(&[2, 8])).expect("ok");

    let x = Variable::new("x");
    let p = atom(
        &mut store,
        "p",
        vec![Element::Reference(x.clone()), Element::Constant(Entity::new(7))],
    );
    let q = atom(
        &mut store,
        "q",
        vec![Element::Reference(x.clone()), Element::Constant(Entity::new(8))],
    );
    let r = atom(&mut store, "r", vec![Element::Reference(x.clone())]);
    store.mark(r, Tag::GenerationEligible);

    // Each of `p` and `q` holds, and binds `x`, but the two tables
    // share no row: the conjunction fails before `r` is generated.
    assert!(compute(&mut store, p).value());
    assert!(compute(&mut store, q).value());
    let conjunction = store.add_tuple(Tag::Conjunction, &[p, q, r]);
    assert_eq!(compute(&mut store, conjunction), LogicFormulaResult::failure());
    assert_eq!(store.fact_count("r"), 0);
}

#[test]
fn test_negation_and_equivalence_never_generate() {
    let mut store = MemoryStore::new();
    store.insert_fact("p", &entities(&[1])).expect("ok");

    let x = Variable::new("x");
    let p = atom(&mut store, "p", vec![Element::Reference(x.clone())]);
    let q = atom(&mut store, "q", vec![Element::Reference(x.clone())]);
    let r = atom(&mut store, "r", vec![Element::Reference(x)]);
    store.mark(r, Tag::GenerationEligible);

    let not_q = store.add_tuple(Tag::Negation, &[q]);
    let not_r = store.add_tuple(Tag::Negation, &[r]);
    let same = store.add_equivalence(p, p);
    let to_r = store.add_equivalence_tuple(p, r);

    // `not q` and `p <=> p` hold when computed...
    assert!(compute(&mut store, not_q).value());
    assert!(compute(&mut store, same).value());

    // ... but none of these can be generated.
    for formula in [not_q, not_r, same, to_r].iter().copied() {
        let generated = evaluate(
            &mut store,
            &InferenceConfig::default(),
            formula,
            &BindingTable::unit(),
            &ArgumentVector::default(),
            Mode::Generate,
        )
        .expect("ok");
        assert_eq!(generated, LogicFormulaResult::failure());
    }
    assert_eq!(store.fact_count("r"), 0);
}

#[test]
fn test_apply_rules_generate_all_reaches_fixpoint() {
    let mut store = MemoryStore::new();
    store.insert_fact("p", &entities(&[1])).expect("ok");

    let x = Variable::new("x");
    let p = atom(&mut store, "p", vec![Element::Reference(x.clone())]);
    let r = atom(&mut store, "r", vec![Element::Reference(x)]);
    store.mark(r, Tag::GenerationEligible);
    let rule = store.add_tuple(Tag::Conjunction, &[p, r]);

    let config = InferenceConfig {
        generation: crate::config::GenerationType::All,
        ..InferenceConfig::default()
    };
    let rule_sets = vec![vec![rule]];
    assert!(apply_rules(&mut store, &config, &rule_sets, &ArgumentVector::default())
        .expect("ok"));
    assert!(store.contains_fact("r", &entities(&[1])));

    // Asserting `r(1)` again derives nothing new.
    assert!(!apply_rules(&mut store, &config, &rule_sets, &ArgumentVector::default())
        .expect("ok"));
    assert_eq!(store.fact_count("r"), 1);
    assert_eq!(store.solution_count(rule), 1);
}

#[test]
fn test_apply_rules_until_already_achieved() {
    let mut store = MemoryStore::new();
    store.insert_fact("a", &entities(&[1])).expect("ok");
    store.insert_fact("goal", &entities(&[4])).expect("ok");

    let x = Variable::new("x");
    let a = atom(&mut store, "a", vec![Element::Reference(x.clone())]);
    let b = atom(&mut store, "b", vec![Element::Reference(x.clone())]);
    store.mark(b, Tag::GenerationEligible);
    let rule = store.add_implication(a, b);
    let goal = atom(&mut store, "goal", vec![Element::Reference(x)]);

    assert!(!apply_rules_until(
        &mut store,
        &InferenceConfig::default(),
        &[vec![rule]],
        goal,
        &ArgumentVector::default()
    )
    .expect("ok"));
    assert_eq!(store.fact_count("b"), 0);
    assert_eq!(store.solution_count(rule), 0);
}

#[test]
fn test_apply_rules_until_second_rule() {
    let mut store = MemoryStore::new();
    store.insert_fact("a", &entities(&[1])).expect("ok");

    let x = Variable::new("x");
    let a = atom(&mut store, "a", vec![Element::Reference(x.clone())]);
    let b = atom(&mut store, "b", vec![Element::Reference(x.clone())]);
    let b_premise = atom(&mut store, "b", vec![Element::Reference(x.clone())]);
    let c = atom(&mut store, "c", vec![Element::Reference(x.clone())]);
    store.mark(b, Tag::GenerationEligible);
    store.mark(c, Tag::GenerationEligible);
    let first = store.add_implication(a, b);
    let second = store.add_implication(b_premise, c);
    let goal = atom(&mut store, "c", vec![Element::Reference(x)]);

    // `b => c` is tried first, does not fire, and is queued again once
    // `a => b` generated `b(1)`.
    let config = InferenceConfig::default();
    assert!(apply_rules_until(
        &mut store,
        &config,
        &[vec![second, first]],
        goal,
        &ArgumentVector::default()
    )
    .expect("ok"));
    assert!(store.contains_fact("b", &entities(&[1])));
    assert!(store.contains_fact("c", &entities(&[1])));
    assert_eq!(store.solution_count(first), 1);
    assert_eq!(store.solution_count(second), 1);

    // The goal holds now.
    assert!(!apply_rules_until(
        &mut store,
        &config,
        &[vec![second, first]],
        goal,
        &ArgumentVector::default()
    )
    .expect("ok"));
}

#[test]
fn test_apply_rules_until_restarts_from_first_set() {
    let mut store = MemoryStore::new();
    store.insert_fact("a", &entities(&[1])).expect("ok");

    let x = Variable::new("x");
    let a = atom(&mut store, "a", vec![Element::Reference(x.clone())]);
    let b = atom(&mut store, "b", vec![Element::Reference(x.clone())]);
    let b_premise = atom(&mut store, "b", vec![Element::Reference(x.clone())]);
    let c = atom(&mut store, "c", vec![Element::Reference(x.clone())]);
    store.mark(b, Tag::GenerationEligible);
    store.mark(c, Tag::GenerationEligible);
    let first = store.add_implication(a, b);
    let second = store.add_implication(b_premise, c);
    let goal = atom(&mut store, "c", vec![Element::Reference(x.clone())]);
    let unreachable = atom(&mut store, "d", vec![Element::Reference(x)]);
    store.mark(unreachable, Tag::GenerationEligible);

    let config = InferenceConfig::default();
    let rule_sets = vec![vec![first], vec![second]];
    assert!(apply_rules_until(
        &mut store,
        &config,
        &rule_sets,
        goal,
        &ArgumentVector::default()
    )
    .expect("ok"));
    assert!(store.contains_fact("c", &entities(&[1])));

    // Every rule set is exhausted without reaching `d`, and the goal
    // itself is never generated, even when eligible.
    assert!(!apply_rules_until(
        &mut store,
        &config,
        &rule_sets,
        unreachable,
        &ArgumentVector::default()
    )
    .expect("ok"));
    assert_eq!(store.fact_count("d"), 0);
}
