/// A variable is a name for an unbound slot in a formula, e.g., the
/// `x` in `p(x, a)`.
///
/// Variables are uniquely identified by their sequence id; the name
/// itself is only useful for pretty-printing and logs.
///
/// The implicit order on variables sorts by sequence id (ascending).
/// Binding tables keep their columns in that order, and argument
/// vectors bind positionally against it, so a formula's variables
/// should be created in the order its arguments are listed.
#[derive(Clone, Debug, Eq)]
pub struct Variable {
    sequence: usize,
    name: String,
}

impl Variable {
    /// Returns a new Variable with `name`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        #[cfg(not(tarpaulin_include))]
        fn id() -> usize {
            use std::sync::atomic::{AtomicUsize, Ordering};
            static VARIABLE_COUNTER: AtomicUsize = AtomicUsize::new(0);

            VARIABLE_COUNTER.fetch_add(1, Ordering::Relaxed)
        }

        Self {
            sequence: id(),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.name, self.sequence)
    }
}

impl std::hash::Hash for Variable {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.sequence.hash(state);
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.sequence == other.sequence
    }
}

impl PartialOrd for Variable {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Variable {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sequence.cmp(&other.sequence)
    }
}

#[test]
fn test_smoke() {
    let v0 = Variable::new("zxc");
    let v1 = Variable::new("asd");

    assert!(v0 < v1);
    assert_ne!(v0, v1);
    assert_eq!(v0.name(), "zxc");
}

#[test]
fn test_eq_hash() {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::Hash;
    use std::hash::Hasher;

    let v0 = Variable::new("a");
    let v0_clone = v0.clone();
    // v0 and v1 should be distinct, despite their name.
    let v1 = Variable::new("a");

    assert_eq!(v0, v0_clone);
    assert_ne!(v0, v1);
    assert_ne!(v0.to_string(), v1.to_string());

    {
        let mut h0 = DefaultHasher::new();
        let mut h1 = DefaultHasher::new();

        v0.hash(&mut h0);
        v1.hash(&mut h1);
        assert_ne!(h0.finish(), h1.finish());
    }

    {
        let mut h0 = DefaultHasher::new();
        let mut h0_clone = DefaultHasher::new();

        v0.hash(&mut h0);
        v0_clone.hash(&mut h0_clone);

        assert_eq!(h0.finish(), h0_clone.finish());
    }
}
