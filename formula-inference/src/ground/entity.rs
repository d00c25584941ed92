//! Facts mention opaque entities, adorned only with an opaque
//! identity: the fact store decides what an entity stands for, and
//! the inference core only ever compares, hashes, and copies them.
//!
//! Entities end up in every row of every binding table, so they must
//! stay as small as a machine integer.

/// A concrete entity is simply a machine integer.  New entities are
/// introduced by the fact store when generation needs a witness for a
/// variable no row binds; 32-bit integers are more than enough.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Entity(u32);

impl Entity {
    /// A new entity must have a positive index: we use 0 as a
    /// sentinel.
    #[must_use]
    pub fn new(id: u32) -> Self {
        assert!(id > 0);
        Self(id)
    }

    /// Returns a sentinel Entity value.
    #[inline]
    #[must_use]
    pub fn uninit() -> Self {
        Self(0)
    }

    /// Returns true iff `self` is a sentinel `uninit` value.
    #[inline]
    #[must_use]
    pub fn is_uninit(self) -> bool {
        self.0 == 0
    }

    #[inline]
    #[must_use]
    pub fn id(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[test]
fn test_uninit() {
    assert_eq!(Entity::uninit(), Entity::uninit());
    assert!(Entity::uninit().is_uninit());
    assert!(!Entity::new(1).is_uninit());
    assert!(!Entity::new(u32::MAX).is_uninit());
}

#[test]
fn test_display() {
    assert_eq!(Entity::new(42).to_string(), "#42");
    assert_eq!(Entity::new(42).id(), 42);
}
