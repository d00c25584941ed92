//! Predicate formulas describe the atoms we match against the fact
//! store (and, for eligible atoms, instantiate into new facts).
use crate::unification::{Element, Pattern, Template, Variable};
use std::collections::BTreeSet;

/// A predicate formula represents an expression of the form
/// `predicate(pattern*)`.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PredicateFormula {
    pub predicate: String,
    pub pattern: Vec<Element>,
}

impl PredicateFormula {
    #[must_use]
    pub fn new<I: IntoIterator<Item = Element>>(predicate: &str, pattern: I) -> Self {
        Self {
            predicate: predicate.into(),
            pattern: pattern.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.pattern.len()
    }

    /// Inserts all `Variable`s in the pattern into `dst`.
    #[must_use]
    pub fn insert_variables(&self, mut dst: BTreeSet<Variable>) -> BTreeSet<Variable> {
        for elt in &self.pattern {
            if let Element::Reference(var) = elt {
                dst.insert(var.clone());
            }
        }

        dst
    }

    #[must_use]
    pub fn variables(&self) -> BTreeSet<Variable> {
        self.insert_variables(BTreeSet::new())
    }

    #[must_use]
    pub fn has_constants(&self) -> bool {
        self.pattern.iter().any(Element::is_constant)
    }

    #[must_use]
    pub fn has_variables(&self) -> bool {
        self.pattern.iter().any(|elt| !elt.is_constant())
    }

    /// Compiles the pattern into a matcher for facts of this predicate.
    #[must_use]
    pub fn matcher(&self) -> Pattern {
        Pattern::new(&self.pattern)
    }

    #[must_use]
    pub fn template(&self) -> Template {
        Template::new(&self.pattern)
    }
}

impl std::fmt::Display for PredicateFormula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(", self.predicate)?;
        for (index, elt) in self.pattern.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }

            match elt {
                Element::Constant(entity) => write!(f, "{}", entity)?,
                Element::Reference(var) => write!(f, "{}", var)?,
            }
        }

        write!(f, ")")
    }
}

#[test]
fn predicate_smoke_test() {
    let x = Variable::new("x");
    let y = Variable::new("y");
    let z = Variable::new("z");

    let formula = PredicateFormula::new(
        "p",
        [
            Element::Reference(x.clone()),
            Element::Reference(y.clone()),
            Element::Reference(x.clone()),
        ]
        .iter()
        .cloned(),
    );

    assert_eq!(formula.arity(), 3);
    assert!(formula.has_variables());
    assert!(!formula.has_constants());

    // Get the correct variable set for an empty initial set.
    assert_eq!(
        formula.variables(),
        [x.clone(), y.clone()].iter().cloned().collect()
    );

    // ... and with a pre-initialised set.
    assert_eq!(
        formula.insert_variables([z.clone()].iter().cloned().collect()),
        [x.clone(), y.clone(), z.clone()].iter().cloned().collect()
    );
}

#[test]
fn predicate_constants() {
    use crate::ground::Entity;

    let x = Variable::new("x");
    let mixed = PredicateFormula::new(
        "q",
        vec![Element::Reference(x.clone()), Element::Constant(Entity::new(3))],
    );
    assert!(mixed.has_constants());
    assert!(mixed.has_variables());
    assert_eq!(mixed.to_string(), format!("q({}, #3)", x));

    let ground = PredicateFormula::new("r", vec![Element::Constant(Entity::new(1))]);
    assert!(ground.has_constants());
    assert!(!ground.has_variables());
    assert!(ground.variables().is_empty());
}
