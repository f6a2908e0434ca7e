//! Repository structs holding the SQL for each table.
//!
//! Repositories take a `&PgPool` and return row models; mapping to domain
//! errors happens in [`crate::store`].

pub mod asset_repo;

pub use asset_repo::AssetRepo;
