//! Catalog for resolving table ids to names and storage handles.

mod schema;

pub use schema::{Catalog, TableInfo};
