//! The classifier decides which connective a stored formula stands
//! for, from the tags recorded against it and from its shape.
use crate::store::{Formula, FormulaStore, Shape, Tag};

/// The connective of a formula.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Kind {
    Atomic,
    Conjunction,
    Disjunction,
    Negation,
    Implication,
    Equivalence,
}

/// The connective of a formula, along with its encoding.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FormulaType {
    Atomic,
    Conjunction,
    Disjunction,
    Negation,
    /// `antecedent => consequent`, as an arc.
    ImplicationArc,
    /// `antecedent => consequent`, as a tuple with `If` and `Then`
    /// roles.
    ImplicationTuple,
    /// `left <=> right`, as an edge.
    EquivalenceEdge,
    /// `left <=> right`, as a two-member tuple.
    EquivalenceTuple,
    MalformedFormula,
}

impl FormulaType {
    /// Returns the connective for well-formed formulas.
    #[must_use]
    pub fn kind(self) -> Option<Kind> {
        match self {
            FormulaType::Atomic => Some(Kind::Atomic),
            FormulaType::Conjunction => Some(Kind::Conjunction),
            FormulaType::Disjunction => Some(Kind::Disjunction),
            FormulaType::Negation => Some(Kind::Negation),
            FormulaType::ImplicationArc | FormulaType::ImplicationTuple => {
                Some(Kind::Implication)
            }
            FormulaType::EquivalenceEdge | FormulaType::EquivalenceTuple => {
                Some(Kind::Equivalence)
            }
            FormulaType::MalformedFormula => None,
        }
    }
}

const CONNECTIVES: [Tag; 6] = [
    Tag::Atomic,
    Tag::Conjunction,
    Tag::Disjunction,
    Tag::Negation,
    Tag::Implication,
    Tag::Equivalence,
];

/// A `Classifier` answers structural questions about the formulas in
/// one store.
pub struct Classifier<'s, S: FormulaStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: FormulaStore + ?Sized> Classifier<'s, S> {
    #[must_use]
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Returns the connective and encoding of `formula`.  Formulas
    /// with no recognised connective, or with a connective tag but an
    /// unexpected shape, are `MalformedFormula`.
    #[must_use]
    pub fn classify(&self, formula: Formula) -> FormulaType {
        let store = self.store;
        let shape = store.shape(formula);

        if store.has_tag(formula, Tag::Atomic)
            || (shape == Some(Shape::Structure)
                && !self.has_connective(formula)
                && self.has_variables(formula))
        {
            return FormulaType::Atomic;
        }

        if store.has_tag(formula, Tag::Implication) {
            return match shape {
                Some(Shape::Arc) => FormulaType::ImplicationArc,
                Some(Shape::Tuple) => FormulaType::ImplicationTuple,
                _ => FormulaType::MalformedFormula,
            };
        }

        if store.has_tag(formula, Tag::Negation) {
            return FormulaType::Negation;
        }

        if store.has_tag(formula, Tag::Conjunction) {
            return FormulaType::Conjunction;
        }

        if store.has_tag(formula, Tag::Disjunction) {
            return FormulaType::Disjunction;
        }

        if store.has_tag(formula, Tag::Equivalence) {
            return match shape {
                Some(Shape::Edge) => FormulaType::EquivalenceEdge,
                Some(Shape::Tuple) => FormulaType::EquivalenceTuple,
                _ => FormulaType::MalformedFormula,
            };
        }

        FormulaType::MalformedFormula
    }

    fn has_connective(&self, formula: Formula) -> bool {
        CONNECTIVES
            .iter()
            .any(|tag| self.store.has_tag(formula, *tag))
    }

    /// Returns true iff `formula` is an atom with at least one constant
    /// in its pattern.
    #[must_use]
    pub fn has_constants(&self, formula: Formula) -> bool {
        self.store
            .pattern(formula)
            .map_or(false, |pattern| pattern.has_constants())
    }

    /// Returns true iff `formula` is an atom with at least one variable
    /// in its pattern.
    #[must_use]
    pub fn has_variables(&self, formula: Formula) -> bool {
        self.store
            .pattern(formula)
            .map_or(false, |pattern| pattern.has_variables())
    }

    /// Returns true iff we may derive new facts for `formula`.
    #[must_use]
    pub fn is_generation_eligible(&self, formula: Formula) -> bool {
        self.store.has_tag(formula, Tag::GenerationEligible)
    }
}

#[cfg(test)]
use crate::ground::Entity;
#[cfg(test)]
use crate::matching::PredicateFormula;
#[cfg(test)]
use crate::store::MemoryStore;
#[cfg(test)]
use crate::unification::{Element, Variable};

#[test]
fn test_classify_atomic() {
    let mut store = MemoryStore::new();
    let x = Variable::new("x");

    let tagged = store.add_atomic(PredicateFormula::new(
        "p",
        vec![Element::Constant(Entity::new(1))],
    ));
    let untagged = store.add_structure(PredicateFormula::new(
        "p",
        vec![Element::Reference(x.clone())],
    ));
    let ground = store.add_structure(PredicateFormula::new(
        "p",
        vec![Element::Constant(Entity::new(1))],
    ));

    let classifier = Classifier::new(&store);
    assert_eq!(classifier.classify(tagged), FormulaType::Atomic);
    assert_eq!(classifier.classify(untagged), FormulaType::Atomic);
    assert_eq!(classifier.classify(ground), FormulaType::MalformedFormula);

    assert!(classifier.has_constants(tagged));
    assert!(!classifier.has_variables(tagged));
    assert!(classifier.has_variables(untagged));
    assert!(!classifier.has_constants(untagged));
    assert!(!classifier.is_generation_eligible(untagged));
}

#[test]
fn test_classify_connectives() {
    let mut store = MemoryStore::new();
    let x = Variable::new("x");
    let a = store.add_atomic(PredicateFormula::new("p", vec![Element::Reference(x.clone())]));
    let b = store.add_atomic(PredicateFormula::new("q", vec![Element::Reference(x)]));

    let conjunction = store.add_tuple(Tag::Conjunction, &[a, b]);
    let disjunction = store.add_tuple(Tag::Disjunction, &[a, b]);
    let negation = store.add_tuple(Tag::Negation, &[a]);
    let arc = store.add_implication(a, b);
    let tuple = store.add_implication_tuple(a, b);
    let edge = store.add_equivalence(a, b);
    let pair = store.add_equivalence_tuple(a, b);

    let classifier = Classifier::new(&store);
    assert_eq!(classifier.classify(conjunction), FormulaType::Conjunction);
    assert_eq!(classifier.classify(disjunction), FormulaType::Disjunction);
    assert_eq!(classifier.classify(negation), FormulaType::Negation);
    assert_eq!(classifier.classify(arc), FormulaType::ImplicationArc);
    assert_eq!(classifier.classify(tuple), FormulaType::ImplicationTuple);
    assert_eq!(classifier.classify(edge), FormulaType::EquivalenceEdge);
    assert_eq!(classifier.classify(pair), FormulaType::EquivalenceTuple);

    assert_eq!(classifier.classify(arc).kind(), Some(Kind::Implication));
    assert_eq!(classifier.classify(pair).kind(), Some(Kind::Equivalence));

    // Connectives have no pattern of their own.
    assert!(!classifier.has_constants(conjunction));
    assert!(!classifier.has_variables(conjunction));
}

#[test]
fn test_classify_malformed() {
    let mut store = MemoryStore::new();
    let x = Variable::new("x");
    let a = store.add_atomic(PredicateFormula::new("p", vec![Element::Reference(x)]));

    let implication_edge = store.add_connection(Shape::Edge, Tag::Implication, a, a);
    let equivalence_arc = store.add_connection(Shape::Arc, Tag::Equivalence, a, a);
    let bare = store.add_formula(Shape::Node);

    let classifier = Classifier::new(&store);
    assert_eq!(
        classifier.classify(implication_edge),
        FormulaType::MalformedFormula
    );
    assert_eq!(
        classifier.classify(equivalence_arc),
        FormulaType::MalformedFormula
    );
    assert_eq!(classifier.classify(bare), FormulaType::MalformedFormula);
    assert_eq!(classifier.classify(bare).kind(), None);
    assert_eq!(
        classifier.classify(Formula::new(1000)),
        FormulaType::MalformedFormula
    );
}
