//! Natural join of binding tables.  Rows are keyed on the columns the
//! tables have in common; without common columns, every row has the
//! same (empty) key and the join degenerates into a Cartesian product.
use super::BindingTable;
use crate::error::Result;
use crate::ground::Row;
use crate::unification::{MultiProjection, Projection, Variable};
use std::collections::BTreeSet;
use std::collections::HashMap;

impl BindingTable {
    /// Returns the natural join of `self` and `other`: its columns are
    /// the union of both tables' columns, and its rows combine each
    /// pair of rows that agree on the common columns.
    ///
    /// The unit table is the identity for `intersect`.
    ///
    /// # Errors
    ///
    /// Only propagates projection failures, which cannot happen for
    /// well-formed tables.
    pub fn intersect(&self, other: &Self) -> Result<Self> {
        let common: Vec<Variable> = self
            .columns
            .iter()
            .filter(|var| other.has_column(var))
            .cloned()
            .collect();
        let columns: Vec<Variable> = self
            .columns
            .iter()
            .chain(other.columns.iter())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let self_key = Projection::new(&self.columns, &common)?;
        let other_key = Projection::new(&other.columns, &common)?;
        let combine = MultiProjection::new(
            &[
                self.columns.clone().into_boxed_slice(),
                other.columns.clone().into_boxed_slice(),
            ],
            &columns,
        )?;

        // Index the smaller table, and probe with the larger one.
        let (build, build_key, probe, probe_key, swapped) = if other.rows.len() <= self.rows.len()
        {
            (other, &other_key, self, &self_key, false)
        } else {
            (self, &self_key, other, &other_key, true)
        };

        let mut index = HashMap::<Row, Vec<&Row>>::new();
        for row in build.rows.iter() {
            index.entry(build_key.apply(row)).or_default().push(row);
        }

        let mut rows = BTreeSet::new();
        for row in probe.rows.iter() {
            if let Some(matches) = index.get(&probe_key.apply(row)) {
                for other_row in matches.iter().copied() {
                    rows.insert(if swapped {
                        combine.from_pair(other_row, row)
                    } else {
                        combine.from_pair(row, other_row)
                    });
                }
            }
        }

        Ok(Self { columns, rows })
    }
}

#[cfg(test)]
use crate::ground::Entity;

#[cfg(test)]
fn entities(ids: &[u32]) -> Vec<Entity> {
    ids.iter().map(|id| Entity::new(*id)).collect()
}

#[test]
fn test_join_common_column() {
    let x = Variable::new("x");
    let y = Variable::new("y");
    let z = Variable::new("z");

    let a = BindingTable::from_rows(
        &[x.clone(), y.clone()],
        vec![entities(&[1, 2]), entities(&[1, 3]), entities(&[4, 5])],
    )
    .expect("ok");
    let b = BindingTable::from_rows(
        &[y.clone(), z.clone()],
        vec![entities(&[2, 7]), entities(&[3, 8]), entities(&[9, 9])],
    )
    .expect("ok");

    let joined = a.intersect(&b).expect("ok");
    assert_eq!(joined.columns(), [x.clone(), y.clone(), z.clone()]);
    assert_eq!(joined.rows_amount(), 2);
    assert_eq!(joined.column(&x), Some(entities(&[1, 1])));
    assert_eq!(joined.column(&y), Some(entities(&[2, 3])));
    assert_eq!(joined.column(&z), Some(entities(&[7, 8])));

    assert_eq!(b.intersect(&a).expect("ok"), joined);
}

#[test]
fn test_join_cartesian() {
    let x = Variable::new("x");
    let y = Variable::new("y");

    let a = BindingTable::from_rows(&[x.clone()], vec![entities(&[1]), entities(&[2])])
        .expect("ok");
    let b = BindingTable::from_rows(&[y.clone()], vec![entities(&[3]), entities(&[4])])
        .expect("ok");

    let joined = a.intersect(&b).expect("ok");
    assert_eq!(joined.columns_amount(), 2);
    assert_eq!(joined.rows_amount(), 4);
}

#[test]
fn test_join_unit_and_empty() {
    let x = Variable::new("x");
    let a = BindingTable::from_rows(&[x.clone()], vec![entities(&[1]), entities(&[2])])
        .expect("ok");

    assert_eq!(a.intersect(&BindingTable::unit()).expect("ok"), a);
    assert_eq!(BindingTable::unit().intersect(&a).expect("ok"), a);

    let failed = a.intersect(&BindingTable::empty()).expect("ok");
    assert_eq!(failed.columns(), a.columns());
    assert_eq!(failed.rows_amount(), 0);
}

#[test]
fn test_join_disjoint_values() {
    let x = Variable::new("x");
    let a = BindingTable::from_rows(&[x.clone()], vec![entities(&[1])]).expect("ok");
    let b = BindingTable::from_rows(&[x.clone()], vec![entities(&[2])]).expect("ok");

    let joined = a.intersect(&b).expect("ok");
    assert_eq!(joined.columns_amount(), 1);
    assert_eq!(joined.rows_amount(), 0);
    assert!(!joined.is_satisfiable());
}
