//! Knobs that change how generation behaves.  The configuration is a
//! plain value: embedding programs decide where it comes from.

/// How an eligible atomic formula treats facts that already satisfy it.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum GenerationType {
    /// Reuse existing matches, and only assert facts for rows that
    /// have none.
    Unique,
    /// Assert a fact for every row, even when a match exists.
    All,
}

/// How many rows an eligible atomic formula generates facts for.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ReplacementsUsage {
    /// Stop after the first row that generated a fact.
    First,
    /// Generate for every row.
    All,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct InferenceConfig {
    pub generation: GenerationType,
    pub replacements: ReplacementsUsage,
    /// Maximum nesting depth of connectives in a formula.
    pub max_depth: usize,
}

impl InferenceConfig {
    pub const DEFAULT_MAX_DEPTH: usize = 64;
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            generation: GenerationType::Unique,
            replacements: ReplacementsUsage::All,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

#[test]
fn test_default() {
    let config = InferenceConfig::default();

    assert_eq!(config.generation, GenerationType::Unique);
    assert_eq!(config.replacements, ReplacementsUsage::All);
    assert_eq!(config.max_depth, 64);
}
