//! A record of entities is the key value of the inference core:
//! facts in the store, as well as the rows of binding tables, are
//! records of entities, with shape metadata (predicate name and
//! arity, or list of bound variables) stored next to the container.
//!
//! Records are boxed slices of entities (with explicit clone, which
//! should be avoided in inner loops).

use super::Entity;

// We should not need to implement these traits for a phantom type,
// but https://github.com/rust-lang/rust/issues/26925...
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct FactTag;
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct RowTag;

/// A fact is a predicate that is known to be true for a given list of
/// entities.  The predicate is tracked separately from the (container
/// of) lists of entities, and a fact is thus only a record.
pub type Fact = Record<FactTag>;

/// A row holds the entities bound to a binding table's columns, in
/// column order.  The columns themselves are tracked by the table.
pub type Row = Record<RowTag>;

/// A Record is a type-tagged pointer to a slice of Entities.  We use
/// type tags to avoid accidental compatibility between records that
/// represent different data.
///
/// ```compile_fail
/// use formula_inference::ground::{Fact, Row};
/// fn mismatch(fact: &Fact, row: &Row) -> bool {
///     fact == row
/// }
/// ```
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Record<Tag: 'static> {
    tag: std::marker::PhantomData<&'static Tag>,
    entities: Box<[Entity]>,
}

impl<Tag> Record<Tag> {
    #[inline]
    #[must_use]
    pub fn from_vec(vec: Vec<Entity>) -> Self {
        Self {
            tag: std::marker::PhantomData,
            entities: vec.into_boxed_slice(),
        }
    }

    #[inline]
    #[must_use]
    pub fn from_box(entities: Box<[Entity]>) -> Self {
        Self {
            tag: std::marker::PhantomData,
            entities,
        }
    }

    #[inline]
    #[must_use]
    pub fn from_slice(entities: &[Entity]) -> Self {
        Self::from_vec(entities.to_vec())
    }

    /// Returns the nullary record `()`.
    #[inline]
    #[must_use]
    pub fn unit() -> Self {
        Self::from_vec(Vec::new())
    }

    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl<T, Tag> From<T> for Record<Tag>
where
    T: Sized + AsRef<[Entity]>,
{
    #[inline]
    fn from(slice: T) -> Self {
        Self::from_slice(slice.as_ref())
    }
}

#[test]
fn construct() {
    let e1 = Entity::new(1);
    let e2 = Entity::new(2);
    let from_vec: Fact = vec![e1, e2].into();
    assert_eq!(from_vec, Fact::from_vec(vec![e1, e2]));

    let from_box: Fact = vec![e1, e2].into_boxed_slice().into();
    assert_eq!(from_box, Fact::from_box(vec![e1, e2].into_boxed_slice()));

    let from_slice: Fact = [e1, e2].into();
    assert_eq!(from_slice, Fact::from_slice(&[e1, e2]));

    assert_eq!(from_vec, from_box);
    assert_eq!(from_vec, from_slice);

    assert_eq!(from_vec.entities()[0], e1);
    assert_eq!(from_vec.entities()[1], e2);
    assert_eq!(from_vec.len(), 2);
}

#[test]
fn eq() {
    let e1 = Entity::new(1);
    let e2 = Entity::new(2);

    assert_ne!(Fact::from_slice(&[e1, e2]), Fact::from_slice(&[e1, e1]));
    assert_eq!(Row::from_slice(&[e1, e2]), Row::from_slice(&[e1, e2]));
}

#[test]
fn unit_is_empty() {
    assert!(Row::unit().is_empty());
    assert_eq!(Row::unit(), Row::from_slice(&[]));
}
