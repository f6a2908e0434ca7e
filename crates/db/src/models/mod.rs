//! Database row structs.
//!
//! Each submodule contains a `FromRow` entity struct matching the database
//! row and its conversion into the domain type.

pub mod asset;
