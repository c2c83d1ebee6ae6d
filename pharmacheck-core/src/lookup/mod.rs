//! Product verification lookups.
//!
//! The session controller talks to the verification service through the
//! [`ProductLookup`] trait so that tests and demos can substitute canned
//! answers for the real HTTP client.
//!
//! - [`HttpProductLookup`] - the verification service over HTTP
//! - [`FixtureLookup`] - canned demo answers with simulated latency

mod fixture;
mod http;

pub use fixture::FixtureLookup;
pub use http::{HttpProductLookup, LookupConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT};

use async_trait::async_trait;

use crate::error::Result;
use crate::identifier::ProductId;
use crate::product::VerificationRecord;

/// A source of verification records.
///
/// Implementations perform at most one read-only request per call and never
/// retry; retries are always initiated by the user.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    /// Look up `id`. A record whose previously-used flag is set is reported
    /// as [`VerifyError::AlreadyUsed`](crate::error::VerifyError::AlreadyUsed).
    async fn lookup(&self, id: &ProductId) -> Result<VerificationRecord>;
}

#[async_trait]
impl<T: ProductLookup + ?Sized> ProductLookup for std::sync::Arc<T> {
    async fn lookup(&self, id: &ProductId) -> Result<VerificationRecord> {
        (**self).lookup(id).await
    }
}
