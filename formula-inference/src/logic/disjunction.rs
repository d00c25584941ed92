use super::{Context, ExpressionNode, LogicFormulaResult};
use crate::bindings::BindingTable;
use crate::error::Result;
use crate::store::{FactStore, Formula};
use crate::unification::Assignment;
use tracing::trace;

/// A disjunction holds when any operand holds; its bindings are the
/// union of the bindings of every operand that holds.
pub struct DisjunctionNode {
    formula: Formula,
    operands: Vec<ExpressionNode>,
}

impl DisjunctionNode {
    #[must_use]
    pub fn new(formula: Formula, operands: Vec<ExpressionNode>) -> Self {
        Self { formula, operands }
    }

    #[cfg(not(tarpaulin_include))]
    #[must_use]
    pub fn formula(&self) -> Formula {
        self.formula
    }

    #[cfg(not(tarpaulin_include))]
    #[must_use]
    pub fn operands(&self) -> &[ExpressionNode] {
        &self.operands
    }

    pub fn set_arguments(&mut self, arguments: &Assignment) {
        for operand in self.operands.iter_mut() {
            operand.set_arguments(arguments);
        }
    }

    /// Computes every operand under the same `bindings`.
    ///
    /// # Errors
    ///
    /// Returns `Err` when operands that hold bind different variables,
    /// or when the store fails.
    pub fn compute<S: FactStore + ?Sized>(
        &self,
        ctx: &mut Context<'_, S>,
        bindings: &BindingTable,
    ) -> Result<LogicFormulaResult> {
        let mut united = BindingTable::empty();
        let mut is_generated = false;

        for operand in &self.operands {
            let result = operand.compute(ctx, bindings)?;
            if result.value() {
                is_generated |= result.is_generated();
                united = united.unite(result.bindings())?;
            }
        }

        trace!(formula = %self.formula, rows = united.rows_amount(), "disjunction computed");
        Ok(LogicFormulaResult::success(united, is_generated))
    }

    /// We do not know which alternative to derive: generation always
    /// fails.
    #[must_use]
    pub fn generate(&self) -> LogicFormulaResult {
        LogicFormulaResult::failure()
    }
}
