use super::{Context, ExpressionNode, LogicFormulaResult};
use crate::bindings::BindingTable;
use crate::error::Result;
use crate::store::{FactStore, Formula};
use crate::unification::Assignment;
use tracing::trace;

/// A negation holds when its operand does not.  It never changes the
/// current bindings, only whether they satisfy the formula.
pub struct NegationNode {
    formula: Formula,
    operand: Box<ExpressionNode>,
}

impl NegationNode {
    #[must_use]
    pub fn new(formula: Formula, operand: ExpressionNode) -> Self {
        Self {
            formula,
            operand: Box::new(operand),
        }
    }

    #[cfg(not(tarpaulin_include))]
    #[must_use]
    pub fn formula(&self) -> Formula {
        self.formula
    }

    #[cfg(not(tarpaulin_include))]
    #[must_use]
    pub fn operand(&self) -> &ExpressionNode {
        &self.operand
    }

    pub fn set_arguments(&mut self, arguments: &Assignment) {
        self.operand.set_arguments(arguments);
    }

    /// # Errors
    ///
    /// Returns `Err` when the operand fails to evaluate.
    pub fn compute<S: FactStore + ?Sized>(
        &self,
        ctx: &mut Context<'_, S>,
        bindings: &BindingTable,
    ) -> Result<LogicFormulaResult> {
        let result = self.operand.compute(ctx, bindings)?;

        trace!(formula = %self.formula, operand = result.value(), "negation computed");
        if result.value() {
            Ok(LogicFormulaResult::failure())
        } else {
            Ok(LogicFormulaResult::success(bindings.clone(), false))
        }
    }

    /// A negated fact cannot be derived: generation always fails.
    #[must_use]
    pub fn generate(&self) -> LogicFormulaResult {
        LogicFormulaResult::failure()
    }
}
