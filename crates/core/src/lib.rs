//! Depot core: asset domain model, ports, search query engine and the
//! upload-then-publish lifecycle coordinator.
//!
//! This crate has no internal dependencies so it can be shared by the
//! database adapter, the publisher adapters and the HTTP server.

pub mod asset;
pub mod error;
pub mod lifecycle;
pub mod memory;
pub mod ports;
pub mod search;
pub mod types;
pub mod validation;
