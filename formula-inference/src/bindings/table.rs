use crate::error::{InferenceError, Result};
use crate::ground::{Entity, Row};
use crate::unification::{Assignment, Projection, Variable};
use std::collections::BTreeSet;
use std::collections::HashSet;

/// A binding table is a relation: a sorted list of distinct variables
/// (the columns), and a set of rows with one entity per column.
///
/// Tables without columns come in two flavours: the unit table holds
/// the single empty row (trivially true), and the empty table holds
/// nothing (the bindings of a failure).
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct BindingTable {
    pub(super) columns: Vec<Variable>,
    pub(super) rows: BTreeSet<Row>,
}

fn check_columns(columns: &[Variable]) -> Result<()> {
    let distinct: BTreeSet<&Variable> = columns.iter().collect();

    if distinct.len() != columns.len() {
        return Err(InferenceError::ColumnMismatch {
            left: columns.to_vec(),
            right: distinct.into_iter().cloned().collect(),
        });
    }

    Ok(())
}

impl BindingTable {
    /// Returns a table with `columns` and no row.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a variable appears more than once in `columns`.
    pub fn new(columns: &[Variable]) -> Result<Self> {
        check_columns(columns)?;

        let mut columns = columns.to_vec();
        columns.sort();
        Ok(Self {
            columns,
            rows: BTreeSet::new(),
        })
    }

    /// Returns a table with `columns` and `rows`; each row lists its
    /// values in the same order as `columns`, which need not be
    /// sorted.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a variable appears more than once in `columns`.
    ///
    /// # Panics
    ///
    /// Panics if a row does not have one value per column.
    pub fn from_rows<I, R>(columns: &[Variable], rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[Entity]>,
    {
        let mut ret = Self::new(columns)?;
        let reorder = Projection::new(columns, &ret.columns)?;

        for row in rows {
            let row = row.as_ref();

            assert_eq!(row.len(), columns.len());
            ret.rows.insert(reorder.apply(&Row::from_slice(row)));
        }

        Ok(ret)
    }

    /// Returns the single-row table for `assignment`.
    #[must_use]
    pub fn from_assignment(assignment: &Assignment) -> Self {
        // Assignments iterate in variable order, i.e., column order.
        let (columns, values): (Vec<Variable>, Vec<Entity>) = assignment
            .iter()
            .map(|(var, value)| (var.clone(), value))
            .unzip();

        let mut rows = BTreeSet::new();
        rows.insert(Row::from_vec(values));
        Self { columns, rows }
    }

    /// Returns the trivially true table: no column, one empty row.
    #[must_use]
    pub fn unit() -> Self {
        let mut rows = BTreeSet::new();
        rows.insert(Row::unit());

        Self {
            columns: Vec::new(),
            rows,
        }
    }

    /// Returns the table of a failure: no column, no row.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: BTreeSet::new(),
        }
    }

    #[cfg(not(tarpaulin_include))]
    #[must_use]
    pub fn columns(&self) -> &[Variable] {
        &self.columns
    }

    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    #[must_use]
    pub fn columns_amount(&self) -> usize {
        self.columns.len()
    }

    /// Returns the number of rows; tables without columns always
    /// count zero rows, even the unit table.
    #[must_use]
    pub fn rows_amount(&self) -> usize {
        if self.columns.is_empty() {
            0
        } else {
            self.rows.len()
        }
    }

    /// Returns true iff the table has at least one row, counting the
    /// unit table's empty row.
    #[must_use]
    pub fn is_satisfiable(&self) -> bool {
        !self.rows.is_empty()
    }

    #[must_use]
    pub fn has_column(&self, variable: &Variable) -> bool {
        self.columns.binary_search(variable).is_ok()
    }

    /// Returns the values of `variable`, in row order, or `None` if
    /// `variable` is not a column.
    #[must_use]
    pub fn column(&self, variable: &Variable) -> Option<Vec<Entity>> {
        let index = self.columns.binary_search(variable).ok()?;

        Some(self.rows.iter().map(|row| row.entities()[index]).collect())
    }

    /// Iterates over the rows as assignments.
    pub fn assignments(&self) -> impl Iterator<Item = Assignment> + '_ {
        self.rows.iter().map(move |row| {
            self.columns
                .iter()
                .cloned()
                .zip(row.entities().iter().copied())
                .collect()
        })
    }

    /// Adds the restriction of `assignment` to our columns as a row,
    /// and returns whether the row is new.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `assignment` leaves one of the columns unbound.
    pub fn insert_assignment(&mut self, assignment: &Assignment) -> Result<bool> {
        let mut values = Vec::with_capacity(self.columns.len());
        for var in &self.columns {
            values.push(assignment.require(var)?);
        }

        Ok(self.rows.insert(Row::from_vec(values)))
    }

    /// Adds `row` (values in column order), and returns whether the row
    /// is new.
    ///
    /// # Panics
    ///
    /// Panics if `row` does not have one value per column.
    pub fn insert_row(&mut self, row: Row) -> bool {
        assert_eq!(row.len(), self.columns.len());
        self.rows.insert(row)
    }

    /// Returns the table restricted to `columns`, with duplicate rows
    /// merged.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `columns` names a variable that is not a
    /// column of `self`.
    pub fn project(&self, columns: &[Variable]) -> Result<Self> {
        let mut ret = Self::new(columns)?;
        let projection = Projection::new(&self.columns, &ret.columns)?;

        ret.rows = self.rows.iter().map(|row| projection.apply(row)).collect();
        Ok(ret)
    }

    /// Returns the union of the rows of `self` and `other`.  A table
    /// without columns nor rows is the identity for `unite`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the tables have different columns.
    pub fn unite(&self, other: &Self) -> Result<Self> {
        if self.columns.is_empty() && self.rows.is_empty() {
            return Ok(other.clone());
        }

        if other.columns.is_empty() && other.rows.is_empty() {
            return Ok(self.clone());
        }

        if self.columns != other.columns {
            return Err(InferenceError::ColumnMismatch {
                left: self.columns.clone(),
                right: other.columns.clone(),
            });
        }

        let mut ret = self.clone();
        ret.rows.extend(other.rows.iter().cloned());
        Ok(ret)
    }

    /// Returns the rows of `self` whose projection on `other`'s columns
    /// is not a row of `other`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `other` has a column that `self` lacks.
    pub fn subtract(&self, other: &Self) -> Result<Self> {
        let projection = Projection::new(&self.columns, &other.columns)?;

        Ok(Self {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| !other.rows.contains(&projection.apply(row)))
                .cloned()
                .collect(),
        })
    }

    /// Returns `self` without the rows that bind `variable` to one of
    /// `values`.  When `variable` is not a column, no row is removed.
    #[must_use]
    pub fn remove_rows<I>(&self, variable: &Variable, values: I) -> Self
    where
        I: IntoIterator<Item = Entity>,
    {
        let index = match self.columns.binary_search(variable) {
            Ok(index) => index,
            Err(_) => return self.clone(),
        };

        let values: HashSet<Entity> = values.into_iter().collect();
        Self {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| !values.contains(&row.entities()[index]))
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
fn entities(ids: &[u32]) -> Vec<Entity> {
    ids.iter().map(|id| Entity::new(*id)).collect()
}

#[test]
fn test_from_rows_sorts_columns() {
    let x = Variable::new("x");
    let y = Variable::new("y");

    let table = BindingTable::from_rows(&[y.clone(), x.clone()], vec![entities(&[2, 1])])
        .expect("ok");
    assert_eq!(table.columns(), [x.clone(), y.clone()]);
    assert_eq!(table.column(&x), Some(entities(&[1])));
    assert_eq!(table.column(&y), Some(entities(&[2])));
    assert_eq!(table.column(&Variable::new("z")), None);
}

#[test]
fn test_duplicate_columns() {
    let x = Variable::new("x");

    assert!(matches!(
        BindingTable::new(&[x.clone(), x]),
        Err(InferenceError::ColumnMismatch { .. })
    ));
}

#[test]
fn test_counts() {
    let x = Variable::new("x");
    let table =
        BindingTable::from_rows(&[x], vec![entities(&[1]), entities(&[2]), entities(&[1])])
            .expect("ok");

    assert_eq!(table.columns_amount(), 1);
    assert_eq!(table.rows_amount(), 2);
    assert!(table.is_satisfiable());

    assert_eq!(BindingTable::unit().rows_amount(), 0);
    assert!(BindingTable::unit().is_satisfiable());
    assert_eq!(BindingTable::empty().rows_amount(), 0);
    assert!(!BindingTable::empty().is_satisfiable());
}

#[test]
fn test_assignments() {
    let x = Variable::new("x");
    let y = Variable::new("y");
    let table = BindingTable::from_rows(&[x.clone(), y.clone()], vec![entities(&[1, 2])])
        .expect("ok");

    let assignments: Vec<Assignment> = table.assignments().collect();
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0].get(&x), Some(Entity::new(1)));
    assert_eq!(assignments[0].get(&y), Some(Entity::new(2)));

    assert_eq!(BindingTable::from_assignment(&assignments[0]), table);
    assert_eq!(
        BindingTable::unit().assignments().collect::<Vec<_>>(),
        vec![Assignment::new()]
    );
}

#[test]
fn test_insert_assignment() {
    let x = Variable::new("x");
    let y = Variable::new("y");
    let mut table = BindingTable::new(&[x.clone()]).expect("ok");

    let assignment: Assignment = vec![(x.clone(), Entity::new(4)), (y.clone(), Entity::new(5))]
        .into_iter()
        .collect();
    assert!(table.insert_assignment(&assignment).expect("ok"));
    assert!(!table.insert_assignment(&assignment).expect("ok"));
    assert_eq!(table.rows_amount(), 1);

    let missing: Assignment = vec![(y, Entity::new(5))].into_iter().collect();
    assert!(table.insert_assignment(&missing).is_err());
}

#[test]
fn test_unite() {
    let x = Variable::new("x");
    let a = BindingTable::from_rows(&[x.clone()], vec![entities(&[1]), entities(&[2])])
        .expect("ok");
    let b = BindingTable::from_rows(&[x.clone()], vec![entities(&[2]), entities(&[3])])
        .expect("ok");

    let union = a.unite(&b).expect("ok");
    assert_eq!(union.column(&x), Some(entities(&[1, 2, 3])));

    assert_eq!(BindingTable::empty().unite(&a).expect("ok"), a);
    assert_eq!(a.unite(&BindingTable::empty()).expect("ok"), a);

    let y = Variable::new("y");
    let c = BindingTable::new(&[y]).expect("ok");
    assert!(matches!(
        a.unite(&c),
        Err(InferenceError::ColumnMismatch { .. })
    ));
}

#[test]
fn test_subtract() {
    let x = Variable::new("x");
    let y = Variable::new("y");
    let a = BindingTable::from_rows(
        &[x.clone(), y.clone()],
        vec![entities(&[1, 2]), entities(&[2, 3]), entities(&[3, 3])],
    )
    .expect("ok");
    let b = BindingTable::from_rows(&[y.clone()], vec![entities(&[3])]).expect("ok");

    let diff = a.subtract(&b).expect("ok");
    assert_eq!(diff.columns(), a.columns());
    assert_eq!(diff.column(&x), Some(entities(&[1])));

    let z = Variable::new("z");
    let c = BindingTable::new(&[z]).expect("ok");
    assert!(a.subtract(&c).is_err());

    // Subtracting the unit table removes everything.
    assert_eq!(
        a.subtract(&BindingTable::unit()).expect("ok").rows_amount(),
        0
    );
}

#[test]
fn test_remove_rows() {
    let x = Variable::new("x");
    let y = Variable::new("y");
    let a = BindingTable::from_rows(
        &[x.clone()],
        vec![entities(&[1]), entities(&[2]), entities(&[3])],
    )
    .expect("ok");

    let removed = a.remove_rows(&x, entities(&[1, 3]));
    assert_eq!(removed.column(&x), Some(entities(&[2])));

    assert_eq!(a.remove_rows(&y, entities(&[1])), a);
}

#[test]
fn test_project() {
    let x = Variable::new("x");
    let y = Variable::new("y");
    let a = BindingTable::from_rows(
        &[x.clone(), y.clone()],
        vec![entities(&[1, 2]), entities(&[1, 3])],
    )
    .expect("ok");

    let projected = a.project(&[x.clone()]).expect("ok");
    assert_eq!(projected.rows_amount(), 1);
    assert!(a.project(&[Variable::new("z")]).is_err());
}
