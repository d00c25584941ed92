//! Property-based tests for the binding table algebra.

use formula_inference::bindings::BindingTable;
use formula_inference::ground::Entity;
use formula_inference::unification::Variable;
use proptest::prelude::*;

// ===== Strategies for generating test data =====

/// Which of the three pool variables are columns, and up to five rows
/// of small entity ids (only the first values of each row are used).
fn arb_table_data() -> impl Strategy<Value = (u8, Vec<Vec<u32>>)> {
    (
        0u8..8,
        prop::collection::vec(prop::collection::vec(1u32..4, 3), 0..6),
    )
}

fn pool() -> Vec<Variable> {
    vec![Variable::new("x"), Variable::new("y"), Variable::new("z")]
}

fn build(pool: &[Variable], mask: u8, rows: &[Vec<u32>]) -> BindingTable {
    let columns: Vec<Variable> = pool
        .iter()
        .enumerate()
        .filter(|(index, _)| mask & (1 << index) != 0)
        .map(|(_, var)| var.clone())
        .collect();
    let rows = rows.iter().map(|row| {
        row.iter()
            .take(columns.len())
            .map(|id| Entity::new(*id))
            .collect::<Vec<_>>()
    });

    BindingTable::from_rows(&columns, rows).expect("distinct columns")
}

// ===== Property Tests =====

proptest! {
    #[test]
    fn prop_intersect_commutes(a in arb_table_data(), b in arb_table_data()) {
        let pool = pool();
        let a = build(&pool, a.0, &a.1);
        let b = build(&pool, b.0, &b.1);

        prop_assert_eq!(a.intersect(&b).expect("ok"), b.intersect(&a).expect("ok"));
    }

    #[test]
    fn prop_intersect_idempotent(a in arb_table_data()) {
        let pool = pool();
        let a = build(&pool, a.0, &a.1);
        let joined = a.intersect(&a).expect("ok");

        prop_assert_eq!(joined.rows_amount(), a.rows_amount());
        prop_assert_eq!(joined, a);
    }

    #[test]
    fn prop_intersect_rows_come_from_both(a in arb_table_data(), b in arb_table_data()) {
        let pool = pool();
        let a = build(&pool, a.0, &a.1);
        let b = build(&pool, b.0, &b.1);
        let joined = a.intersect(&b).expect("ok");

        let from_a = joined.project(a.columns()).expect("ok");
        let from_b = joined.project(b.columns()).expect("ok");
        prop_assert!(from_a.rows().all(|row| a.rows().any(|other| other == row)));
        prop_assert!(from_b.rows().all(|row| b.rows().any(|other| other == row)));
    }

    #[test]
    fn prop_unit_is_identity(a in arb_table_data()) {
        let pool = pool();
        let a = build(&pool, a.0, &a.1);

        prop_assert_eq!(a.intersect(&BindingTable::unit()).expect("ok"), a.clone());
        prop_assert_eq!(BindingTable::unit().intersect(&a).expect("ok"), a);
    }

    #[test]
    fn prop_unite_contains_both(mask in 0u8..8, a in arb_table_data(), b in arb_table_data()) {
        let pool = pool();
        let a = build(&pool, mask, &a.1);
        let b = build(&pool, mask, &b.1);
        let union = a.unite(&b).expect("same columns");

        prop_assert!(a.rows().all(|row| union.rows().any(|other| other == row)));
        prop_assert!(b.rows().all(|row| union.rows().any(|other| other == row)));
        prop_assert_eq!(union, b.unite(&a).expect("same columns"));
    }

    #[test]
    fn prop_subtract_removes_matches(a in arb_table_data(), b in arb_table_data()) {
        let pool = pool();
        let a = build(&pool, a.0 | b.0, &a.1);
        let b = build(&pool, b.0, &b.1);
        let diff = a.subtract(&b).expect("b's columns are a's");

        let projected = diff.project(b.columns()).expect("ok");
        prop_assert!(projected.rows().all(|row| !b.rows().any(|other| other == row)));
        prop_assert!(diff.rows().all(|row| a.rows().any(|other| other == row)));
    }

    #[test]
    fn prop_remove_rows(a in arb_table_data(), value in 1u32..4) {
        let pool = pool();
        let a = build(&pool, a.0, &a.1);
        let removed = a.remove_rows(&pool[0], vec![Entity::new(value)]);

        match removed.column(&pool[0]) {
            Some(values) => prop_assert!(values.iter().all(|v| *v != Entity::new(value))),
            None => prop_assert_eq!(removed, a),
        }
    }
}
