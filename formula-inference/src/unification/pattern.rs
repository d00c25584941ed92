//! Patterns describe expectations to match against (yielding rows of
//! captured entities), or, symmetrically, templates to populate from
//! assignments.
//!
//! The inference core never needs full unification: either we're
//! matching a pattern against a fully ground fact, or fully
//! instantiating a template with an assignment.
use super::{Assignment, Variable};
use crate::error::Result;
#[cfg(test)]
use crate::error::InferenceError;
use crate::ground::{Entity, Fact, Row};

/// A match pattern (or template...) is a slice of constant entities
/// and references to variables.  When a reference appears multiple
/// times, it must match against (be populated with) the same entity.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Element {
    /// Constants must match the literal entity exactly.
    Constant(Entity),
    /// References may match any entity, but references with the same
    /// variable must match the same entity.
    Reference(Variable),
}

impl Element {
    #[must_use]
    pub fn is_constant(&self) -> bool {
        matches!(self, Element::Constant(_))
    }
}

/// Once instantiated, a pattern takes a Fact (which must match the
/// number of elements passed to `new`), and attempts to make it fit
/// the elements.  On success, the result is a row with one entity for
/// each distinct variable, in variable order.
pub struct Pattern {
    output: Vec<Variable>,
    fun: Box<dyn Fn(&Fact) -> Option<Row>>,
}

impl Pattern {
    /// Constructs a new pattern that attempts to match Facts against
    /// the `pattern` elements.
    #[must_use]
    pub fn new(pattern: &[Element]) -> Self {
        make_pattern(pattern)
    }

    /// The variables captured by the pattern, sorted and deduplicated.
    #[must_use]
    pub fn output(&self) -> &[Variable] {
        &self.output
    }

    #[inline]
    #[must_use]
    pub fn try_match(&self, fact: &Fact) -> Option<Row> {
        (self.fun)(fact)
    }
}

fn make_pattern(pattern: &[Element]) -> Pattern {
    let mut constants = Vec::<(usize, Entity)>::new();
    let mut match_variables = Vec::<Variable>::new();

    for (index, elt) in pattern.iter().enumerate() {
        match elt {
            Element::Constant(entity) => constants.push((index, *entity)),
            Element::Reference(var) => match_variables.push(var.clone()),
        }
    }

    match_variables.sort();
    match_variables.dedup();

    // The first item in the tuple is the source index,
    // the last is the destination index.
    let mut match_indices = Vec::<(usize, usize)>::new();
    for (src_index, elt) in pattern.iter().enumerate() {
        if let Element::Reference(var) = elt {
            if let Ok(dst_index) = match_variables.binary_search(var) {
                match_indices.push((src_index, dst_index));
            }
        }
    }

    let num = pattern.len();
    let match_size = match_variables.len();
    let matcher = move |fact: &Fact| {
        let entities = fact.entities();

        if entities.len() != num {
            return None;
        }

        for (index, expected) in constants.iter().copied() {
            if entities[index] != expected {
                return None;
            }
        }

        let mut ret = vec![Entity::uninit(); match_size];
        for (in_index, ret_index) in match_indices.iter().copied() {
            let actual = entities[in_index];
            let prev = ret[ret_index];

            if !prev.is_uninit() && actual != prev {
                return None;
            }

            ret[ret_index] = actual;
        }

        Some(Row::from_vec(ret))
    };

    Pattern {
        output: match_variables,
        fun: Box::new(matcher),
    }
}

/// A template is the dual of a pattern: it accepts an assignment, and
/// populates a fact with the constants and the assigned values.
#[derive(Clone, Debug)]
pub struct Template {
    elements: Vec<Element>,
}

impl Template {
    #[must_use]
    pub fn new(pattern: &[Element]) -> Self {
        Self {
            elements: pattern.to_vec(),
        }
    }

    /// Instantiates the template with `assignment`.
    ///
    /// # Errors
    ///
    /// Returns `Err` when one of the template's variables is unbound
    /// in `assignment`.
    pub fn apply(&self, assignment: &Assignment) -> Result<Fact> {
        let mut entities = Vec::with_capacity(self.elements.len());

        for elt in &self.elements {
            entities.push(match elt {
                Element::Constant(entity) => *entity,
                Element::Reference(var) => assignment.require(var)?,
            });
        }

        Ok(Fact::from_vec(entities))
    }
}

impl From<Variable> for Element {
    fn from(var: Variable) -> Self {
        Element::Reference(var)
    }
}

impl From<Entity> for Element {
    fn from(entity: Entity) -> Self {
        Element::Constant(entity)
    }
}

#[test]
fn test_pattern_match_happy_path() {
    use super::Projection;

    let x = Variable::new("x");
    let y = Variable::new("y");

    let pattern = Pattern::new(&[
        Element::Constant(Entity::new(1)),
        Element::Reference(x.clone()),
        Element::Reference(y.clone()),
        Element::Reference(x.clone()),
    ]);

    assert_eq!(pattern.output().len(), 2);

    let extract_x = Projection::new(pattern.output(), &[x.clone()]).expect("ok");
    let extract_y = Projection::new(pattern.output(), &[y.clone()]).expect("ok");

    let args: Fact = [1, 2, 3, 2]
        .iter()
        .map(|i| Entity::new(*i))
        .collect::<Vec<_>>()
        .into();
    let extracted = pattern.try_match(&args).expect("matches");

    assert_eq!(extract_x.apply(&extracted), [Entity::new(2)].into());
    assert_eq!(extract_y.apply(&extracted), [Entity::new(3)].into());
}

#[test]
fn test_pattern_match_mismatch() {
    let x = Variable::new("x");
    let y = Variable::new("y");

    let pattern = Pattern::new(&[
        Element::Constant(Entity::new(1)),
        Element::Reference(x.clone()),
        Element::Reference(y.clone()),
        Element::Reference(x.clone()),
    ]);

    let args1: Fact = [2, 2, 3, 2]
        .iter()
        .map(|i| Entity::new(*i))
        .collect::<Vec<_>>()
        .into();
    assert_eq!(pattern.try_match(&args1), None);

    let args2: Fact = [1, 2, 3, 4]
        .iter()
        .map(|i| Entity::new(*i))
        .collect::<Vec<_>>()
        .into();
    assert_eq!(pattern.try_match(&args2), None);

    // Wrong arity never matches.
    let args3: Fact = [Entity::new(1), Entity::new(2)].into();
    assert_eq!(pattern.try_match(&args3), None);
}

#[test]
fn test_ground_pattern_yields_unit() {
    let pattern = Pattern::new(&[Element::Constant(Entity::new(7))]);

    assert!(pattern.output().is_empty());
    assert_eq!(
        pattern.try_match(&[Entity::new(7)].into()),
        Some(Row::unit())
    );
    assert_eq!(pattern.try_match(&[Entity::new(8)].into()), None);
}

#[test]
fn test_template_apply() {
    let x = Variable::new("x");
    let y = Variable::new("y");
    let template = Template::new(&[
        Element::Reference(x.clone()),
        Element::Constant(Entity::new(5)),
        Element::Reference(x.clone()),
    ]);

    let assignment: Assignment = vec![(x.clone(), Entity::new(2)), (y, Entity::new(9))]
        .into_iter()
        .collect();
    assert_eq!(
        template.apply(&assignment).expect("ok"),
        [Entity::new(2), Entity::new(5), Entity::new(2)].into()
    );
}

#[test]
fn test_template_unbound() {
    let x = Variable::new("x");
    let fact = Template::new(&[Element::Reference(x.clone())]).apply(&Assignment::new());

    assert!(matches!(
        fact,
        Err(InferenceError::UnboundVariable { variable }) if variable == x
    ));
}
