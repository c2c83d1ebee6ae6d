//! Canned demo outcomes.
//!
//! The demo buttons simulate the three interesting verification results
//! without touching the network. The fixtures are plain data passed into the
//! session controller so tests can swap them out.

use std::time::Duration;

use uuid::uuid;

use crate::error::VerifyError;
use crate::identifier::ProductId;
use crate::product::{LatestBlock, Pharmacy, Recommendation, VerificationRecord};

/// Simulated lookup latency for demo outcomes.
pub const DEMO_LATENCY: Duration = Duration::from_secs(1);

/// Identifier of the sample product.
pub const SAMPLE_PRODUCT_ID: ProductId =
    ProductId::from_uuid(uuid!("4a43bbb0-68b1-413a-bcf8-b50fd0174d05"));

/// Identifier that the backend does not know.
pub const UNKNOWN_PRODUCT_ID: ProductId =
    ProductId::from_uuid(uuid!("12345678-1234-1234-1234-123456789012"));

/// Which canned result a demo run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoOutcome {
    Valid,
    Duplicate,
    NotFound,
}

impl std::str::FromStr for DemoOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "valid" => Ok(Self::Valid),
            "duplicate" => Ok(Self::Duplicate),
            "fake" | "not-found" | "notfound" => Ok(Self::NotFound),
            other => Err(format!(
                "unknown demo outcome '{other}' (expected valid, duplicate or fake)"
            )),
        }
    }
}

/// Immutable demo configuration.
#[derive(Debug, Clone)]
pub struct DemoFixtures {
    pub record: VerificationRecord,
    pub unknown_id: ProductId,
    pub latency: Duration,
}

impl Default for DemoFixtures {
    fn default() -> Self {
        Self {
            record: sample_record(),
            unknown_id: UNKNOWN_PRODUCT_ID,
            latency: DEMO_LATENCY,
        }
    }
}

impl DemoFixtures {
    /// Identifier shown while the demo outcome is "verifying".
    pub fn identifier(&self, outcome: DemoOutcome) -> ProductId {
        match outcome {
            DemoOutcome::Valid | DemoOutcome::Duplicate => self.record.pharmacy.uuid,
            DemoOutcome::NotFound => self.unknown_id,
        }
    }

    /// The canned lookup result for `outcome`.
    pub fn resolve(&self, outcome: DemoOutcome) -> Result<VerificationRecord, VerifyError> {
        match outcome {
            DemoOutcome::Valid => {
                let mut record = self.record.clone();
                record.pharmacy.is_read = false;
                Ok(record)
            }
            DemoOutcome::Duplicate => {
                let mut record = self.record.clone();
                record.pharmacy.is_read = true;
                Err(VerifyError::AlreadyUsed {
                    record: Box::new(record),
                })
            }
            DemoOutcome::NotFound => Err(VerifyError::NotFound),
        }
    }

    /// Resolve by identifier, the way the real service would answer.
    pub fn resolve_id(&self, id: &ProductId) -> Result<VerificationRecord, VerifyError> {
        if *id == self.record.pharmacy.uuid {
            if self.record.pharmacy.is_read {
                self.resolve(DemoOutcome::Duplicate)
            } else {
                self.resolve(DemoOutcome::Valid)
            }
        } else {
            Err(VerifyError::NotFound)
        }
    }
}

/// The "Asperine" sample product used by the demo.
pub fn sample_record() -> VerificationRecord {
    VerificationRecord {
        pharmacy: Pharmacy {
            uuid: SAMPLE_PRODUCT_ID,
            name: "Asperine".into(),
            brand: "Medlink".into(),
            brand_cert_link: "http://google.com".into(),
            brand_licence_link: "http://google.com".into(),
            dosage_form: "Syrup".into(),
            strength: "500mg".into(),
            active_ingredients: Some("Acetylsalicylic acid".into()),
            gtin: "34567654567".into(),
            batch: "345676556".into(),
            manufacture_date: "2025-09-20".into(),
            expiry_date: "2026-01-15".into(),
            storage_conditions: "Dry room, below 25°C".into(),
            regulatory_info: "Only for Uzbekistan".into(),
            image_example: "https://images.unsplash.com/photo-1584308666744-24d5c474f2ae?w=400"
                .into(),
            is_read: false,
            cost_status: "high".into(),
            created_at: "2025-09-20T13:48:22.559546Z".into(),
            updated_at: "2025-12-03T14:46:19.099462Z".into(),
            recommendations: vec![Recommendation {
                name: "Qupen Forte".into(),
                brand: "Medlabs".into(),
                cost_status: "medium".into(),
                image_example:
                    "https://images.unsplash.com/photo-1587854692152-cbe660dbde88?w=200".into(),
            }],
        },
        latest_block: LatestBlock {
            index: 87,
            timestamp: 1764782747.8565,
            data: SAMPLE_PRODUCT_ID.to_string(),
            previous_hash: "6db4190087b7e3924142e42987aa44d311aec632ac46ef6b4803baec012df7df"
                .into(),
            hash: "8fd2b511479304d6fad1495a624ad30cdb3ec29527aa8f8feec76c7575902789".into(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    #[test]
    fn test_outcomes() {
        let fixtures = DemoFixtures::default();
        assert!(fixtures.resolve(DemoOutcome::Valid).is_ok());
        assert_eq!(
            fixtures.resolve(DemoOutcome::Duplicate).unwrap_err().kind(),
            FailureKind::AlreadyUsed
        );
        assert_eq!(
            fixtures.resolve(DemoOutcome::NotFound).unwrap_err().kind(),
            FailureKind::NotFound
        );
    }

    #[test]
    fn test_identifiers() {
        let fixtures = DemoFixtures::default();
        assert_eq!(fixtures.identifier(DemoOutcome::Valid), SAMPLE_PRODUCT_ID);
        assert_eq!(
            fixtures.identifier(DemoOutcome::NotFound).to_string(),
            "12345678-1234-1234-1234-123456789012"
        );
    }

    #[test]
    fn test_resolve_by_id() {
        let fixtures = DemoFixtures::default();
        assert!(fixtures.resolve_id(&SAMPLE_PRODUCT_ID).is_ok());
        assert!(matches!(
            fixtures.resolve_id(&UNKNOWN_PRODUCT_ID),
            Err(VerifyError::NotFound)
        ));
    }

    #[test]
    fn test_parse_outcome() {
        assert_eq!("fake".parse::<DemoOutcome>(), Ok(DemoOutcome::NotFound));
        assert_eq!("Valid".parse::<DemoOutcome>(), Ok(DemoOutcome::Valid));
        assert!("other".parse::<DemoOutcome>().is_err());
    }
}
