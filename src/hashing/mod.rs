//! Hashing Module
//!
//! Converts tuple keys into canonical string hashes.
//!
//! Primitive arguments contribute their type-tagged text, reference-like
//! arguments contribute a surrogate id assigned on first sighting.

mod arg;
mod engine;
mod identity;
mod key;

// Re-export public types
pub use arg::{Arg, ArgKind, ObjectRef};
pub(crate) use engine::HashedKey;
pub use engine::{HashingEngine, SEPARATOR};
pub use identity::IdentityTable;
pub use key::{Tuple, TupleKey};
