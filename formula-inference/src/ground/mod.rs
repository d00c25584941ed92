//! The fact store holds "ground" facts: records of opaque entities
//! under named predicates.  The inference core manipulates entities,
//! more precisely lists of entities, and these lists constitute the
//! bulk of what binding tables store.  Our ground data structures
//! must thus be as light as possible, while offering fast hashing and
//! comparison.

mod entity;
mod record;

pub use entity::Entity;
pub use record::Fact;
pub use record::Record;
pub use record::Row;
