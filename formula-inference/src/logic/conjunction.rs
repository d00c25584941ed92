//! Conjunctions evaluate their operands in a fixed order: composite
//! operands and atoms with constants first, then the remaining atoms
//! (searched under everything the first group bound), and finally the
//! generation-eligible atoms, so that generation only fires once every
//! other constraint on its variables is known.
use super::{AtomicNode, Context, ExpressionNode, LogicFormulaResult};
use crate::bindings::BindingTable;
use crate::error::Result;
use crate::store::{FactStore, Formula};
use crate::unification::Assignment;
use tracing::trace;

pub struct ConjunctionNode {
    formula: Formula,
    operands: Vec<ExpressionNode>,
}

/// Folds `result` into `running`.  Returns false when the conjunction
/// fails.
fn absorb(
    running: &mut BindingTable,
    is_generated: &mut bool,
    result: LogicFormulaResult,
) -> Result<bool> {
    if !result.value() {
        return Ok(false);
    }

    *is_generated |= result.is_generated();
    *running = running.intersect(result.bindings())?;
    Ok(running.is_satisfiable())
}

impl ConjunctionNode {
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

    /// Returns (composite and constant-bearing operands, variable-only
    /// atoms, generation-eligible atoms).
    fn partition(&self) -> (Vec<&ExpressionNode>, Vec<&AtomicNode>, Vec<&AtomicNode>) {
        let mut immediate = Vec::new();
        let mut deferred = Vec::new();
        let mut to_generate = Vec::new();

        for operand in &self.operands {
            match operand {
                ExpressionNode::Atomic(atom) if atom.is_generation_eligible() => {
                    to_generate.push(atom)
                }
                ExpressionNode::Atomic(atom) if !atom.has_constants() => deferred.push(atom),
                _ => immediate.push(operand),
            }
        }

        (immediate, deferred, to_generate)
    }

    /// # Errors
    ///
    /// Returns `Err` when the store fails or binding tables do not
    /// line up.
    pub fn compute<S: FactStore + ?Sized>(
        &self,
        ctx: &mut Context<'_, S>,
        bindings: &BindingTable,
    ) -> Result<LogicFormulaResult> {
        let (immediate, deferred, to_generate) = self.partition();
        let mut running = bindings.clone();
        let mut is_generated = false;

        for operand in immediate {
            let result = operand.compute(ctx, bindings)?;
            if !absorb(&mut running, &mut is_generated, result)? {
                trace!(formula = %self.formula, operand = %operand.formula(), "conjunct failed");
                return Ok(LogicFormulaResult::failure());
            }
        }

        for atom in deferred {
            let result = atom.compute(ctx, &running)?;
            if !absorb(&mut running, &mut is_generated, result)? {
                trace!(formula = %self.formula, operand = %atom.formula(), "conjunct failed");
                return Ok(LogicFormulaResult::failure());
            }
        }

        for atom in to_generate {
            let result = atom.generate(ctx, &running)?;
            if !absorb(&mut running, &mut is_generated, result)? {
                trace!(formula = %self.formula, operand = %atom.formula(), "conjunct failed");
                return Ok(LogicFormulaResult::failure());
            }
        }

        trace!(formula = %self.formula, rows = running.rows_amount(), is_generated, "conjunction holds");
        Ok(LogicFormulaResult::success(running, is_generated))
    }

    /// Generates every operand in turn, each under the bindings
    /// accumulated so far.
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
        let mut running = bindings.clone();
        let mut is_generated = false;

        for operand in &self.operands {
            let result = operand.generate(ctx, &running)?;
            if !absorb(&mut running, &mut is_generated, result)? {
                trace!(formula = %self.formula, operand = %operand.formula(), "conjunct not generated");
                return Ok(LogicFormulaResult::failure());
            }
        }

        Ok(LogicFormulaResult::success(running, is_generated))
    }
}
