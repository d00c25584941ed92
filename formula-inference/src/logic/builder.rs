//! `LogicExpression` turns a stored formula into an expression tree,
//! and wires caller-supplied arguments into the tree's atoms.
use super::{
    AtomicNode, ConjunctionNode, Context, DisjunctionNode, EquivalenceNode, ExpressionNode,
    ImplicationNode, LogicFormulaResult, Mode, NegationNode,
};
use crate::bindings::BindingTable;
use crate::config::InferenceConfig;
use crate::error::{InferenceError, Result};
use crate::ground::Entity;
use crate::matching::{Classifier, FormulaType};
use crate::store::{FactStore, Formula, FormulaStore, Role};
use crate::unification::{Assignment, Variable};
use tracing::{debug, trace};

/// Positional arguments for a rule: the i-th entity binds the i-th
/// free variable of the rule, in variable order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ArgumentVector(pub Vec<Entity>);

impl From<Vec<Entity>> for ArgumentVector {
    fn from(entities: Vec<Entity>) -> Self {
        Self(entities)
    }
}

/// An expression tree, along with its free variables and the
/// arguments bound to them.
pub struct LogicExpression {
    formula: Formula,
    root: ExpressionNode,
    variables: Vec<Variable>,
    arguments: Assignment,
}

fn malformed(formula: Formula, reason: &str) -> InferenceError {
    InferenceError::MalformedFormula {
        formula,
        reason: reason.into(),
    }
}

struct Builder<'s, S: FormulaStore + ?Sized> {
    store: &'s S,
    classifier: Classifier<'s, S>,
    max_depth: usize,
    // False for queries: no atom may assert facts.
    generation: bool,
}

impl<'s, S: FormulaStore + ?Sized> Builder<'s, S> {
    fn node(&self, formula: Formula, depth: usize) -> Result<ExpressionNode> {
        if depth > self.max_depth {
            return Err(InferenceError::FormulaTooDeep {
                formula,
                limit: self.max_depth,
            });
        }

        let formula_type = self.classifier.classify(formula);
        trace!(%formula, ?formula_type, depth, "classified");

        let child = |operand: Formula| self.node(operand, depth + 1);
        let node = match formula_type {
            FormulaType::Atomic => {
                let pattern = self
                    .store
                    .pattern(formula)
                    .ok_or_else(|| malformed(formula, "atom without a pattern"))?;

                ExpressionNode::Atomic(AtomicNode::new(
                    formula,
                    pattern,
                    self.generation && self.classifier.is_generation_eligible(formula),
                ))
            }
            FormulaType::Conjunction | FormulaType::Disjunction => {
                let members = self.store.members(formula);
                if members.is_empty() {
                    return Err(malformed(formula, "connective without operands"));
                }

                let operands = members
                    .into_iter()
                    .map(child)
                    .collect::<Result<Vec<_>>>()?;
                if formula_type == FormulaType::Conjunction {
                    ExpressionNode::Conjunction(ConjunctionNode::new(formula, operands))
                } else {
                    ExpressionNode::Disjunction(DisjunctionNode::new(formula, operands))
                }
            }
            FormulaType::Negation => match self.store.members(formula).as_slice() {
                [operand] => ExpressionNode::Negation(NegationNode::new(formula, child(*operand)?)),
                _ => return Err(malformed(formula, "negation takes exactly one operand")),
            },
            FormulaType::ImplicationArc => {
                let (antecedent, consequent) = self
                    .store
                    .endpoints(formula)
                    .ok_or_else(|| malformed(formula, "implication arc without endpoints"))?;

                ExpressionNode::Implication(ImplicationNode::new(
                    formula,
                    child(antecedent)?,
                    child(consequent)?,
                ))
            }
            FormulaType::ImplicationTuple => {
                let antecedent = self.store.role(formula, Role::If);
                let consequent = self.store.role(formula, Role::Then);

                match (antecedent, consequent) {
                    (Some(antecedent), Some(consequent)) => ExpressionNode::Implication(
                        ImplicationNode::new(formula, child(antecedent)?, child(consequent)?),
                    ),
                    _ => {
                        return Err(malformed(
                            formula,
                            "implication tuple without antecedent and consequent",
                        ))
                    }
                }
            }
            FormulaType::EquivalenceEdge => {
                let (left, right) = self
                    .store
                    .endpoints(formula)
                    .ok_or_else(|| malformed(formula, "equivalence edge without endpoints"))?;

                ExpressionNode::Equivalence(EquivalenceNode::new(
                    formula,
                    child(left)?,
                    child(right)?,
                ))
            }
            FormulaType::EquivalenceTuple => match self.store.members(formula).as_slice() {
                [left, right] => ExpressionNode::Equivalence(EquivalenceNode::new(
                    formula,
                    child(*left)?,
                    child(*right)?,
                )),
                _ => {
                    return Err(malformed(
                        formula,
                        "equivalence tuple takes exactly two operands",
                    ))
                }
            },
            FormulaType::MalformedFormula => {
                return Err(malformed(formula, "no recognised connective"));
            }
        };

        Ok(node)
    }
}

impl LogicExpression {
    /// Builds the expression tree for `formula`.
    ///
    /// # Errors
    ///
    /// Returns `Err` when `formula`, or one of its sub-formulas, is
    /// malformed, or when formulas nest deeper than
    /// `config.max_depth`.
    pub fn build<S: FormulaStore + ?Sized>(
        store: &S,
        config: &InferenceConfig,
        formula: Formula,
    ) -> Result<Self> {
        Self::build_with(store, config, formula, true)
    }

    /// Builds the expression tree for `formula` as a query: every atom
    /// is treated as ineligible for generation, so evaluating the tree
    /// never asserts facts.
    ///
    /// # Errors
    ///
    /// Same as `build`.
    pub fn build_query<S: FormulaStore + ?Sized>(
        store: &S,
        config: &InferenceConfig,
        formula: Formula,
    ) -> Result<Self> {
        Self::build_with(store, config, formula, false)
    }

    fn build_with<S: FormulaStore + ?Sized>(
        store: &S,
        config: &InferenceConfig,
        formula: Formula,
        generation: bool,
    ) -> Result<Self> {
        let builder = Builder {
            store,
            classifier: Classifier::new(store),
            max_depth: config.max_depth,
            generation,
        };

        let root = builder.node(formula, 1)?;
        let variables: Vec<Variable> = root
            .insert_variables(Default::default())
            .into_iter()
            .collect();

        debug!(%formula, variables = variables.len(), "built expression tree");
        Ok(Self {
            formula,
            root,
            variables,
            arguments: Assignment::new(),
        })
    }

    #[cfg(not(tarpaulin_include))]
    #[must_use]
    pub fn formula(&self) -> Formula {
        self.formula
    }

    #[cfg(not(tarpaulin_include))]
    #[must_use]
    pub fn root(&self) -> &ExpressionNode {
        &self.root
    }

    /// Returns the free variables of the whole tree, in variable order.
    #[cfg(not(tarpaulin_include))]
    #[must_use]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Returns the assignment from the last `bind_arguments` call.
    #[cfg(not(tarpaulin_include))]
    #[must_use]
    pub fn arguments(&self) -> &Assignment {
        &self.arguments
    }

    /// Binds `arguments` positionally to `variables()`, and propagates
    /// the assignment to every node.  Extra arguments are ignored;
    /// variables without an argument stay free.
    pub fn bind_arguments(&mut self, arguments: &ArgumentVector) -> &Assignment {
        if arguments.0.len() > self.variables.len() {
            debug!(
                formula = %self.formula,
                expected = self.variables.len(),
                actual = arguments.0.len(),
                "ignoring extra arguments"
            );
        }

        self.arguments = self
            .variables
            .iter()
            .cloned()
            .zip(arguments.0.iter().copied())
            .collect();
        self.root.set_arguments(&self.arguments);
        &self.arguments
    }

    /// Evaluates the tree's root under `bindings`.
    ///
    /// # Errors
    ///
    /// Returns `Err` when the store fails or binding tables do not
    /// line up.
    pub fn evaluate<S: FactStore + ?Sized>(
        &self,
        ctx: &mut Context<'_, S>,
        bindings: &BindingTable,
        mode: Mode,
    ) -> Result<LogicFormulaResult> {
        self.root.evaluate(ctx, bindings, mode)
    }
}

#[cfg(test)]
use crate::matching::PredicateFormula;
#[cfg(test)]
use crate::store::{MemoryStore, Shape, Tag};
#[cfg(test)]
use crate::unification::Element;

#[test]
fn test_build_tree() {
    let mut store = MemoryStore::new();
    let x = Variable::new("x");
    let y = Variable::new("y");
    let p = store.add_atomic(PredicateFormula::new(
        "p",
        vec![Element::Reference(x.clone())],
    ));
    let q = store.add_atomic(PredicateFormula::new(
        "q",
        vec![Element::Reference(x.clone()), Element::Reference(y.clone())],
    ));
    let not_q = store.add_tuple(Tag::Negation, &[q]);
    let rule = store.add_implication_tuple(p, not_q);

    let expression = LogicExpression::build(&store, &InferenceConfig::default(), rule)
        .expect("ok");
    assert_eq!(expression.formula(), rule);
    assert_eq!(expression.variables(), [x.clone(), y.clone()]);

    let root = expression.root();
    assert!(matches!(root, ExpressionNode::Implication(_)));
    let operands = root.operands();
    assert_eq!(operands.len(), 2);
    assert_eq!(operands[0].formula(), p);
    assert!(matches!(operands[1], ExpressionNode::Negation(_)));
    assert_eq!(operands[1].operands()[0].formula(), q);
}

#[test]
fn test_build_query_never_generates() {
    let mut store = MemoryStore::new();
    let x = Variable::new("x");
    let r = store.add_atomic(PredicateFormula::new(
        "r",
        vec![Element::Reference(x.clone())],
    ));
    store.mark(r, Tag::GenerationEligible);

    let config = InferenceConfig::default();
    let rule = LogicExpression::build(&store, &config, r).expect("ok");
    let query = LogicExpression::build_query(&store, &config, r).expect("ok");
    assert!(matches!(rule.root(), ExpressionNode::Atomic(atom) if atom.is_generation_eligible()));
    assert!(matches!(query.root(), ExpressionNode::Atomic(atom) if !atom.is_generation_eligible()));

    let bound = BindingTable::from_rows(&[x], vec![vec![Entity::new(5)]]).expect("ok");
    let result = query
        .evaluate(&mut Context::new(&mut store, &config), &bound, Mode::Generate)
        .expect("ok");
    assert_eq!(result, LogicFormulaResult::failure());
    assert_eq!(store.fact_count("r"), 0);
}

#[test]
fn test_bind_arguments() {
    let mut store = MemoryStore::new();
    let x = Variable::new("x");
    let y = Variable::new("y");
    let atom = store.add_atomic(PredicateFormula::new(
        "p",
        vec![Element::Reference(x.clone()), Element::Reference(y.clone())],
    ));

    let mut expression =
        LogicExpression::build(&store, &InferenceConfig::default(), atom).expect("ok");

    let partial = expression
        .bind_arguments(&vec![Entity::new(1)].into())
        .clone();
    assert_eq!(partial.get(&x), Some(Entity::new(1)));
    assert!(!partial.contains(&y));

    let extra = expression
        .bind_arguments(&vec![Entity::new(1), Entity::new(2), Entity::new(3)].into())
        .clone();
    assert_eq!(extra.len(), 2);
    assert_eq!(extra.get(&y), Some(Entity::new(2)));
    assert_eq!(expression.arguments(), &extra);
}

#[test]
fn test_build_malformed() {
    let mut store = MemoryStore::new();
    let x = Variable::new("x");
    let atom = store.add_atomic(PredicateFormula::new("p", vec![Element::Reference(x)]));
    let bare = store.add_formula(Shape::Node);
    let empty_conjunction = store.add_tuple(Tag::Conjunction, &[]);
    let double_negation = store.add_tuple(Tag::Negation, &[atom, atom]);
    let reflexive = store.add_equivalence_tuple(atom, atom);
    let nested = store.add_tuple(Tag::Disjunction, &[atom, bare]);
    let patternless = store.add_formula(Shape::Structure);
    store.mark(patternless, Tag::Atomic);

    let config = InferenceConfig::default();
    for formula in [bare, empty_conjunction, double_negation, nested, patternless].iter() {
        assert!(matches!(
            LogicExpression::build(&store, &config, *formula),
            Err(InferenceError::MalformedFormula { .. })
        ));
    }

    // Both members may be the same formula.
    assert!(LogicExpression::build(&store, &config, reflexive).is_ok());
}

#[test]
fn test_build_too_deep() {
    let mut store = MemoryStore::new();
    let x = Variable::new("x");
    let atom = store.add_atomic(PredicateFormula::new("p", vec![Element::Reference(x)]));
    let once = store.add_tuple(Tag::Negation, &[atom]);
    let twice = store.add_tuple(Tag::Negation, &[once]);

    let config = InferenceConfig {
        max_depth: 2,
        ..InferenceConfig::default()
    };
    assert!(LogicExpression::build(&store, &config, once).is_ok());
    assert!(matches!(
        LogicExpression::build(&store, &config, twice),
        Err(InferenceError::FormulaTooDeep { limit: 2, .. })
    ));
}

#[test]
fn test_build_cycle() {
    let mut store = MemoryStore::new();
    let x = Variable::new("x");
    let atom = store.add_atomic(PredicateFormula::new("p", vec![Element::Reference(x)]));

    // The conjunction lists itself as its second operand.
    let cycle = Formula::new(atom.id() + 1);
    assert_eq!(store.add_tuple(Tag::Conjunction, &[atom, cycle]), cycle);

    assert!(matches!(
        LogicExpression::build(&store, &InferenceConfig::default(), cycle),
        Err(InferenceError::FormulaTooDeep { .. })
    ));
}
