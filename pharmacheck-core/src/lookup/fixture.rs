//! Offline lookup backed by the demo fixtures.

use async_trait::async_trait;

use super::ProductLookup;
use crate::error::Result;
use crate::fixtures::DemoFixtures;
use crate::identifier::ProductId;
use crate::product::VerificationRecord;

/// Lookup that answers from [`DemoFixtures`] after the fixture latency.
/// WARNING: never talks to the verification service.
#[derive(Debug, Clone, Default)]
pub struct FixtureLookup {
    fixtures: DemoFixtures,
}

impl FixtureLookup {
    pub fn new(fixtures: DemoFixtures) -> Self {
        Self { fixtures }
    }

    pub fn fixtures(&self) -> &DemoFixtures {
        &self.fixtures
    }
}

#[async_trait]
impl ProductLookup for FixtureLookup {
    async fn lookup(&self, id: &ProductId) -> Result<VerificationRecord> {
        tokio::time::sleep(self.fixtures.latency).await;
        self.fixtures.resolve_id(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VerifyError;
    use crate::fixtures::{SAMPLE_PRODUCT_ID, UNKNOWN_PRODUCT_ID};

    #[tokio::test(start_paused = true)]
    async fn test_known_product() {
        let lookup = FixtureLookup::default();
        let record = lookup.lookup(&SAMPLE_PRODUCT_ID).await.unwrap();
        assert_eq!(record.pharmacy.name, "Asperine");
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_product() {
        let lookup = FixtureLookup::default();
        assert!(matches!(
            lookup.lookup(&UNKNOWN_PRODUCT_ID).await,
            Err(VerifyError::NotFound)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_used_product() {
        let mut fixtures = DemoFixtures::default();
        fixtures.record.pharmacy.is_read = true;
        let lookup = FixtureLookup::new(fixtures);
        assert!(matches!(
            lookup.lookup(&SAMPLE_PRODUCT_ID).await,
            Err(VerifyError::AlreadyUsed { .. })
        ));
    }
}
