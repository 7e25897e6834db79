//! Core reusable data structures
pub mod bit_set;
pub mod cuckoo_table;
pub mod scope_encoder;


// Export the main types
pub use bit_set::{BitSet, BuiltinBitSet};
pub use cuckoo_table::{CuckooTable, KickoutOutcome, SingleCuckooTable, TagPosition, EMPTY_TAG};
pub use scope_encoder::ScopeEncoder;
