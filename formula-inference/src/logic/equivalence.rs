use super::{Context, ExpressionNode, LogicFormulaResult};
use crate::bindings::BindingTable;
use crate::error::Result;
use crate::store::{FactStore, Formula};
use crate::unification::Assignment;
use tracing::trace;

/// `left <=> right` holds when both sides hold under compatible
/// bindings.
pub struct EquivalenceNode {
    formula: Formula,
    left: Box<ExpressionNode>,
    right: Box<ExpressionNode>,
}

impl EquivalenceNode {
    #[must_use]
    pub fn new(formula: Formula, left: ExpressionNode, right: ExpressionNode) -> Self {
        Self {
            formula,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[cfg(not(tarpaulin_include))]
    #[must_use]
    pub fn formula(&self) -> Formula {
        self.formula
    }

    #[cfg(not(tarpaulin_include))]
    #[must_use]
    pub fn left(&self) -> &ExpressionNode {
        &self.left
    }

    #[cfg(not(tarpaulin_include))]
    #[must_use]
    pub fn right(&self) -> &ExpressionNode {
        &self.right
    }

    pub fn set_arguments(&mut self, arguments: &Assignment) {
        self.left.set_arguments(arguments);
        self.right.set_arguments(arguments);
    }

    /// Computes both sides independently under `bindings`, and joins
    /// their bindings.
    ///
    /// # Errors
    ///
    /// Returns `Err` when an operand fails to evaluate.
    pub fn compute<S: FactStore + ?Sized>(
        &self,
        ctx: &mut Context<'_, S>,
        bindings: &BindingTable,
    ) -> Result<LogicFormulaResult> {
        let left = self.left.compute(ctx, bindings)?;
        let right = self.right.compute(ctx, bindings)?;

        trace!(
            formula = %self.formula,
            left = left.value(),
            right = right.value(),
            "equivalence computed"
        );
        if !left.value() || !right.value() {
            return Ok(LogicFormulaResult::failure());
        }

        let joined = left.bindings().intersect(right.bindings())?;
        Ok(LogicFormulaResult::success(
            joined,
            left.is_generated() || right.is_generated(),
        ))
    }

    /// No generation rule is defined for equivalences: generation
    /// always fails.
    #[must_use]
    pub fn generate(&self) -> LogicFormulaResult {
        LogicFormulaResult::failure()
    }
}
