//! Expression trees mirror the structure of a stored formula: one
//! node per connective, with atoms at the leaves.  Every node
//! implements two protocols:
//!
//! - `compute` checks whether the formula holds, and returns the
//!   bindings under which it does;
//! - `generate` may additionally derive missing facts for atoms
//!   tagged as generation-eligible.
//!
//! Both accept the bindings accumulated by the caller, and return a
//! fresh `LogicFormulaResult`.  Atoms never write to the store in
//! `compute`; composite nodes only do so where their connective routes
//! an operand through `generate` (the eligible atoms of a conjunction,
//! and the consequent of an implication).
use crate::bindings::BindingTable;
use crate::config::InferenceConfig;
use crate::error::Result;
use crate::store::{FactStore, Formula};
use crate::unification::{Assignment, Variable};
use std::collections::BTreeSet;

mod atomic;
mod builder;
mod conjunction;
mod disjunction;
mod equivalence;
mod implication;
mod negation;

pub use atomic::AtomicNode;
pub use builder::ArgumentVector;
pub use builder::LogicExpression;
pub use conjunction::ConjunctionNode;
pub use disjunction::DisjunctionNode;
pub use equivalence::EquivalenceNode;
pub use implication::ImplicationNode;
pub use negation::NegationNode;

/// Whether an evaluation may derive new facts.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Mode {
    Compute,
    Generate,
}

/// The outcome of evaluating a formula.
///
/// A false result never carries bindings nor generation: the only way
/// to build one is `failure()`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LogicFormulaResult {
    value: bool,
    is_generated: bool,
    bindings: BindingTable,
}

impl LogicFormulaResult {
    #[must_use]
    pub fn failure() -> Self {
        Self {
            value: false,
            is_generated: false,
            bindings: BindingTable::empty(),
        }
    }

    /// Returns a true result with `bindings`, or a failure when
    /// `bindings` has no row.
    #[must_use]
    pub fn success(bindings: BindingTable, is_generated: bool) -> Self {
        if !bindings.is_satisfiable() {
            return Self::failure();
        }

        Self {
            value: true,
            is_generated,
            bindings,
        }
    }

    #[inline]
    #[must_use]
    pub fn value(&self) -> bool {
        self.value
    }

    #[inline]
    #[must_use]
    pub fn is_generated(&self) -> bool {
        self.is_generated
    }

    #[inline]
    #[must_use]
    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    #[must_use]
    pub fn into_bindings(self) -> BindingTable {
        self.bindings
    }
}

/// Evaluation context: the store, and how to generate facts in it.
pub struct Context<'a, S: ?Sized> {
    pub store: &'a mut S,
    pub config: &'a InferenceConfig,
}

impl<'a, S: FactStore + ?Sized> Context<'a, S> {
    pub fn new(store: &'a mut S, config: &'a InferenceConfig) -> Self {
        Self { store, config }
    }
}

/// A node in an expression tree.  Each node owns its operands.
pub enum ExpressionNode {
    Atomic(AtomicNode),
    Conjunction(ConjunctionNode),
    Disjunction(DisjunctionNode),
    Negation(NegationNode),
    Implication(ImplicationNode),
    Equivalence(EquivalenceNode),
}

impl ExpressionNode {
    /// Returns the formula this node was built from.
    #[must_use]
    pub fn formula(&self) -> Formula {
        match self {
            ExpressionNode::Atomic(node) => node.formula(),
            ExpressionNode::Conjunction(node) => node.formula(),
            ExpressionNode::Disjunction(node) => node.formula(),
            ExpressionNode::Negation(node) => node.formula(),
            ExpressionNode::Implication(node) => node.formula(),
            ExpressionNode::Equivalence(node) => node.formula(),
        }
    }

    /// Returns the operands of a composite node, in evaluation order
    /// for binary connectives.
    #[must_use]
    pub fn operands(&self) -> Vec<&ExpressionNode> {
        match self {
            ExpressionNode::Atomic(_) => Vec::new(),
            ExpressionNode::Conjunction(node) => node.operands().iter().collect(),
            ExpressionNode::Disjunction(node) => node.operands().iter().collect(),
            ExpressionNode::Negation(node) => vec![node.operand()],
            ExpressionNode::Implication(node) => vec![node.antecedent(), node.consequent()],
            ExpressionNode::Equivalence(node) => vec![node.left(), node.right()],
        }
    }

    /// Inserts the variables of every atom under this node into `dst`.
    #[must_use]
    pub fn insert_variables(&self, mut dst: BTreeSet<Variable>) -> BTreeSet<Variable> {
        if let ExpressionNode::Atomic(atom) = self {
            return atom.pattern().insert_variables(dst);
        }

        for operand in self.operands() {
            dst = operand.insert_variables(dst);
        }

        dst
    }

    /// Propagates the argument assignment to every node.
    pub fn set_arguments(&mut self, arguments: &Assignment) {
        match self {
            ExpressionNode::Atomic(node) => node.set_arguments(arguments),
            ExpressionNode::Conjunction(node) => node.set_arguments(arguments),
            ExpressionNode::Disjunction(node) => node.set_arguments(arguments),
            ExpressionNode::Negation(node) => node.set_arguments(arguments),
            ExpressionNode::Implication(node) => node.set_arguments(arguments),
            ExpressionNode::Equivalence(node) => node.set_arguments(arguments),
        }
    }

    /// Checks whether the formula holds under `bindings`.
    ///
    /// # Errors
    ///
    /// Returns `Err` when the store fails or binding tables do not
    /// line up.
    pub fn compute<S: FactStore + ?Sized>(
        &self,
        ctx: &mut Context<'_, S>,
        bindings: &BindingTable,
    ) -> Result<LogicFormulaResult> {
        match self {
            ExpressionNode::Atomic(node) => node.compute(ctx, bindings),
            ExpressionNode::Conjunction(node) => node.compute(ctx, bindings),
            ExpressionNode::Disjunction(node) => node.compute(ctx, bindings),
            ExpressionNode::Negation(node) => node.compute(ctx, bindings),
            ExpressionNode::Implication(node) => node.compute(ctx, bindings),
            ExpressionNode::Equivalence(node) => node.compute(ctx, bindings),
        }
    }

    /// Checks whether the formula holds under `bindings`, deriving
    /// facts for eligible atoms when it does not.
    ///
    /// # Errors
    ///
    /// Returns `Err` when the store fails or binding tables do not
    /// line up.
    pub fn generate<S: FactStore + ?Sized>(
        &self,
        ctx: &mut Context<'_, S>,
        bindings: &BindingTable,
    ) -> Result<LogicFormulaResult> {
        match self {
            ExpressionNode::Atomic(node) => node.generate(ctx, bindings),
            ExpressionNode::Conjunction(node) => node.generate(ctx, bindings),
            ExpressionNode::Disjunction(node) => Ok(node.generate()),
            ExpressionNode::Negation(node) => Ok(node.generate()),
            ExpressionNode::Implication(node) => node.generate(ctx, bindings),
            ExpressionNode::Equivalence(node) => Ok(node.generate()),
        }
    }

    /// Dispatches to `compute` or `generate` depending on `mode`.
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
        match mode {
            Mode::Compute => self.compute(ctx, bindings),
            Mode::Generate => self.generate(ctx, bindings),
        }
    }
}
