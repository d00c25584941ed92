//! An assignment is one row of a binding table, seen as a map from
//! variable to entity.  Generation works row by row, arguments bind
//! variables one by one, and solution records key on an assignment,
//! so this view comes up wherever a single combination of values
//! matters more than the whole relation.
use super::Variable;
use crate::error::{InferenceError, Result};
use crate::ground::Entity;
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Assignment {
    values: BTreeMap<Variable, Entity>,
}

impl Assignment {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `variable` to `value`, and returns the previous value, if
    /// any.
    pub fn insert(&mut self, variable: Variable, value: Entity) -> Option<Entity> {
        self.values.insert(variable, value)
    }

    #[must_use]
    pub fn get(&self, variable: &Variable) -> Option<Entity> {
        self.values.get(variable).copied()
    }

    /// Returns the value bound to `variable`.
    ///
    /// # Errors
    ///
    /// Returns `Err` when `variable` is unbound.
    pub fn require(&self, variable: &Variable) -> Result<Entity> {
        self.get(variable)
            .ok_or_else(|| InferenceError::UnboundVariable {
                variable: variable.clone(),
            })
    }

    #[must_use]
    pub fn contains(&self, variable: &Variable) -> bool {
        self.values.contains_key(variable)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over the bound variables, in variable order.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.values.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variable, Entity)> {
        self.values.iter().map(|(var, value)| (var, *value))
    }

    /// Returns the restriction of `self` to `variables`; variables
    /// absent from `self` are skipped.
    #[must_use]
    pub fn restrict<'a, I>(&self, variables: I) -> Self
    where
        I: IntoIterator<Item = &'a Variable>,
    {
        let mut ret = Self::new();
        for var in variables {
            if let Some(value) = self.get(var) {
                ret.insert(var.clone(), value);
            }
        }

        ret
    }
}

impl std::iter::FromIterator<(Variable, Entity)> for Assignment {
    fn from_iter<I: IntoIterator<Item = (Variable, Entity)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[test]
fn test_require() {
    let x = Variable::new("x");
    let y = Variable::new("y");
    let mut assignment = Assignment::new();

    assert_eq!(assignment.insert(x.clone(), Entity::new(3)), None);
    assert_eq!(assignment.require(&x).expect("ok"), Entity::new(3));
    assert!(matches!(
        assignment.require(&y),
        Err(InferenceError::UnboundVariable { variable }) if variable == y
    ));
}

#[test]
fn test_restrict() {
    let x = Variable::new("x");
    let y = Variable::new("y");
    let z = Variable::new("z");

    let full: Assignment = vec![
        (x.clone(), Entity::new(1)),
        (y.clone(), Entity::new(2)),
        (z.clone(), Entity::new(3)),
    ]
    .into_iter()
    .collect();

    let restricted = full.restrict(&[x.clone(), z.clone()]);
    assert_eq!(restricted.len(), 2);
    assert!(!restricted.contains(&y));
    assert_eq!(restricted.get(&x), full.get(&x));
    assert_eq!(restricted.get(&z), full.get(&z));

    // Variables missing from the assignment are skipped.
    let partial = restricted.restrict(&[x.clone(), y]);
    assert_eq!(partial.len(), 1);
    assert_eq!(partial.get(&x), Some(Entity::new(1)));
}
