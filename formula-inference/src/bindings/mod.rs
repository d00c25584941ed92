//! Binding tables hold the variable assignments that satisfy a
//! formula.  Every evaluation step produces a fresh table: the
//! algebra (`intersect`, `unite`, `subtract`, `remove_rows`) never
//! mutates its inputs.
mod join;
mod table;

pub use table::BindingTable;
