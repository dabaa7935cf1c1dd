//! Core data types: values, tuples and tuple descriptors.

mod tuple;
mod value;

pub use tuple::{FieldDesc, Tuple, TupleDesc, NULL_NAME};
pub use value::{DataType, Value};

/// Identifier of a table in the catalog.
pub type TableId = u32;
