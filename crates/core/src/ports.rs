//! Ports consumed by the lifecycle coordinator.
//!
//! Adapters live in other crates (`depot-db`, `depot-cloud`) or in
//! [`crate::memory`]. Clock and identifier generation are ports too so tests
//! can pin them.

use async_trait::async_trait;
use chrono::SubsecRound;

use crate::asset::{Asset, AssetId, PublishedUrl};
use crate::error::{PublishError, StoreError};
use crate::search::AssetQuery;
use crate::types::Timestamp;

pub use crate::validation::AssetValidator;

// ---------------------------------------------------------------------------
// Metadata store
// ---------------------------------------------------------------------------

/// Durable keyed storage for asset records.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Persist a new record. Fails with [`StoreError::DuplicateIdentity`] if
    /// the identifier is taken; the existing record is never overwritten.
    async fn create(&self, asset: &Asset) -> Result<Asset, StoreError>;

    /// Replace a `PENDING` record with a new value of the same identity.
    /// Fails with [`StoreError::NotPending`] when no pending record matches.
    async fn replace(&self, asset: &Asset) -> Result<Asset, StoreError>;

    /// Return every record accepted by the query, in the query's order.
    async fn find(&self, query: &AssetQuery) -> Result<Vec<Asset>, StoreError>;

    /// Cheap reachability check for health reporting.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Publisher
// ---------------------------------------------------------------------------

/// External content distribution.
#[async_trait]
pub trait AssetPublisher: Send + Sync {
    /// Copy `content` to the publishing target and return its public URL.
    async fn publish(&self, asset: &Asset, content: &[u8]) -> Result<PublishedUrl, PublishError>;
}

// ---------------------------------------------------------------------------
// Clock & identifiers
// ---------------------------------------------------------------------------

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock, truncated to microseconds (the precision PostgreSQL keeps).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        chrono::Utc::now().trunc_subsecs(6)
    }
}

pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> AssetId;
}

/// Random (v4) UUID identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> AssetId {
        AssetId::new(uuid::Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Timelike;

    use super::*;

    #[test]
    fn uuid_generator_yields_distinct_ids() {
        let a = UuidGenerator.generate();
        let b = UuidGenerator.generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn system_clock_has_microsecond_precision() {
        let now = SystemClock.now();
        assert_eq!(now.nanosecond() % 1_000, 0);
    }
}
