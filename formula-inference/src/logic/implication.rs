use super::{Context, ExpressionNode, LogicFormulaResult};
use crate::bindings::BindingTable;
use crate::error::Result;
use crate::store::{FactStore, Formula};
use crate::unification::Assignment;
use tracing::debug;

/// `antecedent => consequent`.  When the antecedent holds but the
/// consequent does not, we try to generate the consequent.
pub struct ImplicationNode {
    formula: Formula,
    antecedent: Box<ExpressionNode>,
    consequent: Box<ExpressionNode>,
}

impl ImplicationNode {
    #[must_use]
    pub fn new(formula: Formula, antecedent: ExpressionNode, consequent: ExpressionNode) -> Self {
        Self {
            formula,
            antecedent: Box::new(antecedent),
            consequent: Box::new(consequent),
        }
    }

    #[cfg(not(tarpaulin_include))]
    #[must_use]
    pub fn formula(&self) -> Formula {
        self.formula
    }

    #[cfg(not(tarpaulin_include))]
    #[must_use]
    pub fn antecedent(&self) -> &ExpressionNode {
        &self.antecedent
    }

    #[cfg(not(tarpaulin_include))]
    #[must_use]
    pub fn consequent(&self) -> &ExpressionNode {
        &self.consequent
    }

    pub fn set_arguments(&mut self, arguments: &Assignment) {
        self.antecedent.set_arguments(arguments);
        self.consequent.set_arguments(arguments);
    }

    /// Returns a vacuous success when the antecedent does not hold;
    /// otherwise, the result of computing (or, failing that,
    /// generating) the consequent under the antecedent's bindings.
    ///
    /// # Errors
    ///
    /// Returns `Err` when an operand fails to evaluate.
    pub fn compute<S: FactStore + ?Sized>(
        &self,
        ctx: &mut Context<'_, S>,
        bindings: &BindingTable,
    ) -> Result<LogicFormulaResult> {
        let premise = self.antecedent.compute(ctx, bindings)?;
        if !premise.value() {
            debug!(formula = %self.formula, "antecedent does not hold");
            return Ok(LogicFormulaResult::success(BindingTable::unit(), false));
        }

        let conclusion = self.consequent.compute(ctx, premise.bindings())?;
        if conclusion.value() {
            let is_generated = premise.is_generated() || conclusion.is_generated();
            return Ok(LogicFormulaResult::success(
                conclusion.into_bindings(),
                is_generated,
            ));
        }

        let generated = self.consequent.generate(ctx, premise.bindings())?;
        debug!(
            formula = %self.formula,
            value = generated.value(),
            is_generated = generated.is_generated(),
            "consequent generated"
        );
        Ok(generated)
    }

    /// The consequent is already generated on demand: generating an
    /// implication is computing it.
    ///
    /// # Errors
    ///
    /// Returns `Err` when an operand fails to evaluate.
    pub fn generate<S: FactStore + ?Sized>(
        &self,
        ctx: &mut Context<'_, S>,
        bindings: &BindingTable,
    ) -> Result<LogicFormulaResult> {
        self.compute(ctx, bindings)
    }
}
