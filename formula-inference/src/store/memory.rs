use super::{FactStore, Formula, FormulaStore, Role, Shape, SolutionIndex, Tag};
use crate::bindings::BindingTable;
use crate::error::{InferenceError, Result};
use crate::ground::{Entity, Fact};
use crate::matching::PredicateFormula;
use crate::unification::{Assignment, Element};
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::convert::TryFrom;

/// All the facts for one predicate, which must share the same arity.
#[derive(Clone, Debug)]
struct Relation {
    arity: usize,
    facts: BTreeSet<Fact>,
}

#[derive(Clone, Debug)]
struct FormulaNode {
    shape: Shape,
    tags: BTreeSet<Tag>,
    members: Vec<Formula>,
    roles: Vec<(Role, Formula)>,
    endpoints: Option<(Formula, Formula)>,
    pattern: Option<PredicateFormula>,
}

impl FormulaNode {
    fn new(shape: Shape) -> Self {
        Self {
            shape,
            tags: BTreeSet::new(),
            members: Vec::new(),
            roles: Vec::new(),
            endpoints: None,
            pattern: None,
        }
    }
}

/// An in-memory fact store, formula store and solution index.
#[derive(Clone, Debug)]
pub struct MemoryStore {
    relations: BTreeMap<String, Relation>,
    formulas: Vec<FormulaNode>,
    solutions: BTreeMap<Formula, BTreeSet<Assignment>>,
    // Smallest entity id greater than every id we have seen; wider
    // than `Entity` so that seeing `u32::MAX` does not wrap.
    next_entity: u64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            relations: BTreeMap::new(),
            formulas: Vec::new(),
            solutions: BTreeMap::new(),
            next_entity: 1,
        }
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn observe(&mut self, entity: Entity) {
        self.next_entity = self.next_entity.max(u64::from(entity.id()) + 1);
    }

    /// Adds the fact `predicate(entities)`, and returns whether it is
    /// new.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `predicate` already has facts of another arity.
    pub fn insert_fact(&mut self, predicate: &str, entities: &[Entity]) -> Result<bool> {
        for entity in entities.iter().copied() {
            self.observe(entity);
        }

        let relation = self
            .relations
            .entry(predicate.to_string())
            .or_insert_with(|| Relation {
                arity: entities.len(),
                facts: BTreeSet::new(),
            });

        if relation.arity != entities.len() {
            return Err(InferenceError::ArityMismatch {
                predicate: predicate.into(),
                expected: relation.arity,
                actual: entities.len(),
            });
        }

        Ok(relation.facts.insert(Fact::from_slice(entities)))
    }

    #[must_use]
    pub fn contains_fact(&self, predicate: &str, entities: &[Entity]) -> bool {
        self.relations
            .get(predicate)
            .map_or(false, |relation| {
                relation.facts.contains(&Fact::from_slice(entities))
            })
    }

    /// Returns the number of facts for `predicate`.
    #[must_use]
    pub fn fact_count(&self, predicate: &str) -> usize {
        self.relations
            .get(predicate)
            .map_or(0, |relation| relation.facts.len())
    }

    /// Returns the number of solutions recorded for `rule`.
    #[must_use]
    pub fn solution_count(&self, rule: Formula) -> usize {
        self.solutions.get(&rule).map_or(0, BTreeSet::len)
    }

    fn push(&mut self, node: FormulaNode) -> Formula {
        let formula = Formula::new(self.formulas.len());

        self.formulas.push(node);
        formula
    }

    fn node(&self, formula: Formula) -> Option<&FormulaNode> {
        self.formulas.get(formula.id())
    }

    /// Adds a bare formula node with `shape` and nothing else.
    pub fn add_formula(&mut self, shape: Shape) -> Formula {
        self.push(FormulaNode::new(shape))
    }

    /// Adds an untagged structure for `pattern`.
    pub fn add_structure(&mut self, pattern: PredicateFormula) -> Formula {
        for elt in &pattern.pattern {
            if let Element::Constant(entity) = elt {
                self.observe(*entity);
            }
        }

        let mut node = FormulaNode::new(Shape::Structure);
        node.pattern = Some(pattern);
        self.push(node)
    }

    /// Adds an atomic formula for `pattern`.
    pub fn add_atomic(&mut self, pattern: PredicateFormula) -> Formula {
        let formula = self.add_structure(pattern);

        self.mark(formula, Tag::Atomic);
        formula
    }

    /// Adds a tuple of `members`, tagged with `tag`.
    pub fn add_tuple(&mut self, tag: Tag, members: &[Formula]) -> Formula {
        let mut node = FormulaNode::new(Shape::Tuple);
        node.tags.insert(tag);
        node.members = members.to_vec();
        self.push(node)
    }

    /// Adds a connection of `shape` from `source` to `target`, tagged
    /// with `tag`.
    pub fn add_connection(
        &mut self,
        shape: Shape,
        tag: Tag,
        source: Formula,
        target: Formula,
    ) -> Formula {
        let mut node = FormulaNode::new(shape);
        node.tags.insert(tag);
        node.endpoints = Some((source, target));
        self.push(node)
    }

    /// Adds `antecedent => consequent`, encoded as an arc.
    pub fn add_implication(&mut self, antecedent: Formula, consequent: Formula) -> Formula {
        self.add_connection(Shape::Arc, Tag::Implication, antecedent, consequent)
    }

    /// Adds `antecedent => consequent`, encoded as a tuple with roles.
    pub fn add_implication_tuple(&mut self, antecedent: Formula, consequent: Formula) -> Formula {
        let formula = self.add_tuple(Tag::Implication, &[antecedent, consequent]);

        if let Some(node) = self.formulas.get_mut(formula.id()) {
            node.roles = vec![(Role::If, antecedent), (Role::Then, consequent)];
        }

        formula
    }

    /// Adds `left <=> right`, encoded as an edge.
    pub fn add_equivalence(&mut self, left: Formula, right: Formula) -> Formula {
        self.add_connection(Shape::Edge, Tag::Equivalence, left, right)
    }

    /// Adds `left <=> right`, encoded as a tuple.
    pub fn add_equivalence_tuple(&mut self, left: Formula, right: Formula) -> Formula {
        self.add_tuple(Tag::Equivalence, &[left, right])
    }

    /// Records `tag` against `formula`.  Unknown formulas are ignored.
    pub fn mark(&mut self, formula: Formula, tag: Tag) {
        if let Some(node) = self.formulas.get_mut(formula.id()) {
            node.tags.insert(tag);
        }
    }
}

impl FormulaStore for MemoryStore {
    fn has_tag(&self, formula: Formula, tag: Tag) -> bool {
        self.node(formula)
            .map_or(false, |node| node.tags.contains(&tag))
    }

    fn shape(&self, formula: Formula) -> Option<Shape> {
        self.node(formula).map(|node| node.shape)
    }

    fn members(&self, formula: Formula) -> Vec<Formula> {
        self.node(formula)
            .map(|node| node.members.clone())
            .unwrap_or_default()
    }

    fn endpoints(&self, formula: Formula) -> Option<(Formula, Formula)> {
        self.node(formula)?.endpoints
    }

    fn role(&self, tuple: Formula, role: Role) -> Option<Formula> {
        self.node(tuple)?
            .roles
            .iter()
            .find(|(candidate, _)| *candidate == role)
            .map(|(_, member)| *member)
    }

    fn pattern(&self, formula: Formula) -> Option<PredicateFormula> {
        self.node(formula)?.pattern.clone()
    }
}

impl FactStore for MemoryStore {
    fn search(
        &self,
        pattern: &PredicateFormula,
        bindings: &BindingTable,
    ) -> Result<BindingTable> {
        let matcher = pattern.matcher();
        let mut matches = BindingTable::new(matcher.output())?;

        if let Some(relation) = self.relations.get(&pattern.predicate) {
            if relation.arity != pattern.arity() {
                return Err(InferenceError::ArityMismatch {
                    predicate: pattern.predicate.clone(),
                    expected: relation.arity,
                    actual: pattern.arity(),
                });
            }

            for fact in relation.facts.iter() {
                if let Some(row) = matcher.try_match(fact) {
                    matches.insert_row(row);
                }
            }
        }

        bindings.intersect(&matches)
    }

    fn assert_fact(
        &mut self,
        pattern: &PredicateFormula,
        assignment: &Assignment,
    ) -> Result<bool> {
        let fact = pattern.template().apply(assignment)?;

        self.insert_fact(&pattern.predicate, fact.entities())
    }

    fn fresh_entity(&mut self) -> Result<Entity> {
        let id = u32::try_from(self.next_entity)
            .map_err(|_| InferenceError::Store("entity ids exhausted".into()))?;

        self.next_entity += 1;
        Ok(Entity::new(id))
    }
}

impl SolutionIndex for MemoryStore {
    fn solution_exists(&self, rule: Formula, assignment: &Assignment) -> Result<bool> {
        Ok(self.solutions.get(&rule).map_or(false, |records| {
            records
                .iter()
                .any(|record| record.restrict(assignment.variables()) == *assignment)
        }))
    }

    fn record_solution(&mut self, rule: Formula, assignment: &Assignment) -> Result<bool> {
        for (_, value) in assignment.iter() {
            self.observe(value);
        }

        Ok(self
            .solutions
            .entry(rule)
            .or_default()
            .insert(assignment.clone()))
    }

    fn erase_solutions(&mut self, rule: Formula) -> Result<usize> {
        Ok(self.solutions.remove(&rule).map_or(0, |records| records.len()))
    }
}

#[cfg(test)]
use crate::unification::Variable;

#[cfg(test)]
fn entities(ids: &[u32]) -> Vec<Entity> {
    ids.iter().map(|id| Entity::new(*id)).collect()
}

#[test]
fn test_insert_fact() {
    let mut store = MemoryStore::new();

    assert!(store.insert_fact("p", &entities(&[1, 2])).expect("ok"));
    assert!(!store.insert_fact("p", &entities(&[1, 2])).expect("ok"));
    assert!(store.contains_fact("p", &entities(&[1, 2])));
    assert!(!store.contains_fact("p", &entities(&[2, 1])));
    assert_eq!(store.fact_count("p"), 1);
    assert_eq!(store.fact_count("q"), 0);

    assert!(matches!(
        store.insert_fact("p", &entities(&[1])),
        Err(InferenceError::ArityMismatch {
            expected: 2,
            actual: 1,
            ..
        })
    ));
}

#[test]
fn test_search() {
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

    let all = store.search(&pattern, &BindingTable::unit()).expect("ok");
    assert_eq!(all.rows_amount(), 3);

    let bound =
        BindingTable::from_rows(&[x.clone()], vec![entities(&[1])]).expect("ok");
    let restricted = store.search(&pattern, &bound).expect("ok");
    assert_eq!(restricted.columns(), [x.clone(), y.clone()]);
    assert_eq!(restricted.column(&y), Some(entities(&[2, 3])));

    let unknown = PredicateFormula::new("r", vec![Element::Reference(x.clone())]);
    let none = store.search(&unknown, &BindingTable::unit()).expect("ok");
    assert_eq!(none.columns(), [x.clone()]);
    assert!(!none.is_satisfiable());

    let wrong_arity = PredicateFormula::new("q", vec![Element::Reference(x)]);
    assert!(store.search(&wrong_arity, &BindingTable::unit()).is_err());
}

#[test]
fn test_search_ground() {
    let mut store = MemoryStore::new();
    store.insert_fact("p", &entities(&[1])).expect("ok");

    let present = PredicateFormula::new("p", vec![Element::Constant(Entity::new(1))]);
    let absent = PredicateFormula::new("p", vec![Element::Constant(Entity::new(2))]);

    assert!(store
        .search(&present, &BindingTable::unit())
        .expect("ok")
        .is_satisfiable());
    assert!(!store
        .search(&absent, &BindingTable::unit())
        .expect("ok")
        .is_satisfiable());
}

#[test]
fn test_assert_fact() {
    let mut store = MemoryStore::new();
    let x = Variable::new("x");
    let pattern = PredicateFormula::new(
        "r",
        vec![Element::Reference(x.clone()), Element::Constant(Entity::new(7))],
    );

    let assignment: Assignment = vec![(x.clone(), Entity::new(5))].into_iter().collect();
    assert!(store.assert_fact(&pattern, &assignment).expect("ok"));
    assert!(store.contains_fact("r", &entities(&[5, 7])));
    assert!(!store.assert_fact(&pattern, &assignment).expect("ok"));
    assert_eq!(store.fact_count("r"), 1);

    assert!(matches!(
        store.assert_fact(&pattern, &Assignment::new()),
        Err(InferenceError::UnboundVariable { .. })
    ));
}

#[test]
fn test_fresh_entity() {
    let mut store = MemoryStore::new();
    store.insert_fact("p", &entities(&[3, 9])).expect("ok");

    let fresh = store.fresh_entity().expect("ok");
    assert!(fresh.id() > 9);
    assert_ne!(store.fresh_entity().expect("ok"), fresh);
}

#[test]
fn test_fresh_entity_exhausted() {
    let mut store = MemoryStore::new();
    assert!(store.insert_fact("p", &entities(&[u32::MAX])).expect("ok"));
    assert!(store.contains_fact("p", &entities(&[u32::MAX])));

    assert!(matches!(
        store.fresh_entity(),
        Err(InferenceError::Store(_))
    ));
}

#[test]
fn test_fresh_entity_last_id() {
    let mut store = MemoryStore::new();
    store.insert_fact("p", &entities(&[u32::MAX - 1])).expect("ok");

    assert_eq!(store.fresh_entity().expect("ok"), Entity::new(u32::MAX));
    assert!(store.fresh_entity().is_err());
}

#[test]
fn test_formula_structure() {
    let mut store = MemoryStore::new();
    let x = Variable::new("x");
    let atom = store.add_atomic(PredicateFormula::new("p", vec![Element::Reference(x)]));
    let other = store.add_atomic(PredicateFormula::new(
        "q",
        vec![Element::Constant(Entity::new(1))],
    ));

    let conjunction = store.add_tuple(Tag::Conjunction, &[atom, other]);
    let arc = store.add_implication(atom, other);
    let tuple = store.add_implication_tuple(atom, other);

    assert!(store.has_tag(atom, Tag::Atomic));
    assert!(!store.has_tag(atom, Tag::GenerationEligible));
    store.mark(atom, Tag::GenerationEligible);
    assert!(store.has_tag(atom, Tag::GenerationEligible));

    assert_eq!(store.shape(conjunction), Some(Shape::Tuple));
    assert_eq!(store.members(conjunction), vec![atom, other]);
    assert_eq!(store.endpoints(arc), Some((atom, other)));
    assert_eq!(store.role(tuple, Role::If), Some(atom));
    assert_eq!(store.role(tuple, Role::Then), Some(other));
    assert_eq!(store.role(conjunction, Role::If), None);
    assert_eq!(store.pattern(other).map(|p| p.predicate), Some("q".into()));

    // Formula ids are node indices.
    assert_eq!(atom.id(), 0);
    assert_eq!(tuple.id(), 4);

    let unknown = Formula::new(1000);
    assert_eq!(store.shape(unknown), None);
    assert!(store.members(unknown).is_empty());
}

#[test]
fn test_solution_index() {
    let mut store = MemoryStore::new();
    let rule = Formula::new(0);
    let x = Variable::new("x");
    let y = Variable::new("y");

    let full: Assignment = vec![(x.clone(), Entity::new(1)), (y.clone(), Entity::new(2))]
        .into_iter()
        .collect();
    let partial: Assignment = vec![(x.clone(), Entity::new(1))].into_iter().collect();

    assert!(!store.solution_exists(rule, &full).expect("ok"));
    assert!(store.record_solution(rule, &full).expect("ok"));
    assert!(!store.record_solution(rule, &full).expect("ok"));
    assert!(store.solution_exists(rule, &full).expect("ok"));
    assert!(store.solution_exists(rule, &partial).expect("ok"));
    assert!(!store
        .solution_exists(Formula::new(1), &full)
        .expect("ok"));
    assert_eq!(store.solution_count(rule), 1);

    assert_eq!(store.erase_solutions(rule).expect("ok"), 1);
    assert!(!store.solution_exists(rule, &full).expect("ok"));
}
