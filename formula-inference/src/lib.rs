//! The evaluation core of a small rule engine: formulas (atoms,
//! conjunctions, disjunctions, negations, implications and
//! equivalences) are read from a store, turned into expression trees,
//! and evaluated against the store's facts.  Evaluation yields binding
//! tables for the formula's variables and, for atoms tagged as
//! generation-eligible, derives the facts a rule needs to hold.
//!
//! The store is reached through the traits in `store`; `MemoryStore`
//! implements them in memory.
//!
//! ```
//! use formula_inference::config::InferenceConfig;
//! use formula_inference::evaluate::apply_rules;
//! use formula_inference::ground::Entity;
//! use formula_inference::logic::ArgumentVector;
//! use formula_inference::matching::PredicateFormula;
//! use formula_inference::store::{MemoryStore, Tag};
//! use formula_inference::unification::{Element, Variable};
//!
//! let mut store = MemoryStore::new();
//! store.insert_fact("human", &[Entity::new(1)]).expect("ok");
//!
//! let x = Variable::new("x");
//! let human = store.add_atomic(PredicateFormula::new("human", vec![Element::from(x.clone())]));
//! let mortal = store.add_atomic(PredicateFormula::new("mortal", vec![Element::from(x)]));
//! store.mark(mortal, Tag::GenerationEligible);
//! let rule = store.add_implication(human, mortal);
//!
//! let config = InferenceConfig::default();
//! assert!(apply_rules(&mut store, &config, &[vec![rule]], &ArgumentVector::default()).expect("ok"));
//! assert!(store.contains_fact("mortal", &[Entity::new(1)]));
//! ```
pub mod bindings;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod ground;
pub mod logic;
pub mod matching;
pub mod solution;
pub mod store;
pub mod unification;

pub use bindings::BindingTable;
pub use config::InferenceConfig;
pub use error::InferenceError;
pub use error::Result;
pub use evaluate::apply_rules;
pub use evaluate::apply_rules_until;
pub use evaluate::evaluate;
pub use logic::LogicFormulaResult;
pub use logic::Mode;
