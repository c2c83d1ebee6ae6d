//! Verification records returned by the product lookup service.
//!
//! Field names mirror the service's JSON exactly, including its mixed casing.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::identifier::ProductId;

/// Products expiring within this many days are flagged.
pub const EXPIRY_WARNING_DAYS: i64 = 90;

/// Full lookup response: the product plus the latest ledger block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub pharmacy: Pharmacy,
    pub latest_block: LatestBlock,
}

impl VerificationRecord {
    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    pub fn is_previously_used(&self) -> bool {
        self.pharmacy.is_read
    }
}

/// Product descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pharmacy {
    pub uuid: ProductId,
    pub name: String,
    pub brand: String,
    #[serde(rename = "brandCertLink")]
    pub brand_cert_link: String,
    #[serde(rename = "brandLicenceLink")]
    pub brand_licence_link: String,
    #[serde(rename = "dosageForm")]
    pub dosage_form: String,
    pub strength: String,
    #[serde(rename = "activeingredients")]
    pub active_ingredients: Option<String>,
    pub gtin: String,
    pub batch: String,
    #[serde(rename = "manufactureDate")]
    pub manufacture_date: String,
    #[serde(rename = "expiryDate")]
    pub expiry_date: String,
    #[serde(rename = "StorageConditions")]
    pub storage_conditions: String,
    #[serde(rename = "regulatoryInfo")]
    pub regulatory_info: String,
    #[serde(rename = "imageExample")]
    pub image_example: String,
    /// Set by the backend once the code has been redeemed.
    pub is_read: bool,
    pub cost_status: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
}

impl Pharmacy {
    pub fn cost_tier(&self) -> CostTier {
        CostTier::parse(&self.cost_status)
    }

    /// Days from `today` until expiry, rounded up. `None` if the date does not parse.
    pub fn days_until_expiry(&self, today: NaiveDate) -> Option<i64> {
        parse_date(&self.expiry_date).map(|expiry| (expiry - today).num_days())
    }

    pub fn is_expiring_soon(&self, today: NaiveDate) -> bool {
        self.days_until_expiry(today)
            .is_some_and(|days| days < EXPIRY_WARNING_DAYS)
    }
}

/// Cheaper or comparable alternative product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub name: String,
    pub brand: String,
    pub cost_status: String,
    #[serde(rename = "imageExample", default)]
    pub image_example: String,
}

impl Recommendation {
    pub fn cost_tier(&self) -> CostTier {
        CostTier::parse(&self.cost_status)
    }
}

/// Ledger block descriptor. Displayed for provenance, never verified locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestBlock {
    pub index: u64,
    /// Seconds since the Unix epoch, fractional.
    pub timestamp: f64,
    pub data: String,
    pub previous_hash: String,
    pub hash: String,
}

impl LatestBlock {
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        if !self.timestamp.is_finite() {
            return None;
        }
        let secs = self.timestamp.floor();
        let nanos = ((self.timestamp - secs) * 1e9).round() as u32;
        DateTime::from_timestamp(secs as i64, nanos.min(999_999_999))
    }
}

/// Price tier of a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CostTier {
    Low,
    Medium,
    High,
    Other(String),
}

impl CostTier {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Self::Low,
            "medium" => Self::Medium,
            "high" => Self::High,
            _ => Self::Other(s.to_string()),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Low => "LOW COST".to_string(),
            Self::Medium => "MEDIUM COST".to_string(),
            Self::High => "HIGH COST".to_string(),
            Self::Other(s) => format!("{} COST", s.to_uppercase()),
        }
    }
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SAMPLE_JSON: &str = r#"{
        "pharmacy": {
            "uuid": "4a43bbb0-68b1-413a-bcf8-b50fd0174d05",
            "name": "Asperine",
            "brand": "Medlink",
            "brandCertLink": "http://google.com",
            "brandLicenceLink": "http://google.com",
            "dosageForm": "Syrup",
            "strength": "500mg",
            "activeingredients": null,
            "gtin": "34567654567",
            "batch": "345676556",
            "manufactureDate": "2025-09-20",
            "expiryDate": "2026-01-15",
            "StorageConditions": "Dry room, below 25°C",
            "regulatoryInfo": "Only for Uzbekistan",
            "imageExample": "https://images.unsplash.com/photo-1584308666744-24d5c474f2ae?w=400",
            "is_read": false,
            "cost_status": "high",
            "created_at": "2025-09-20T13:48:22.559546Z",
            "updated_at": "2025-12-03T14:46:19.099462Z",
            "recommendations": [
                {"name": "Qupen Forte", "brand": "Medlabs", "cost_status": "medium", "imageExample": ""}
            ]
        },
        "latest_block": {
            "index": 87,
            "timestamp": 1764782747.8565,
            "data": "4a43bbb0-68b1-413a-bcf8-b50fd0174d05",
            "previous_hash": "6db4190087b7e3924142e42987aa44d311aec632ac46ef6b4803baec012df7df",
            "hash": "8fd2b511479304d6fad1495a624ad30cdb3ec29527aa8f8feec76c7575902789"
        }
    }"#;

    #[test]
    fn test_parse_service_json() {
        let record = VerificationRecord::from_json(SAMPLE_JSON.as_bytes()).unwrap();
        assert_eq!(record.pharmacy.name, "Asperine");
        assert_eq!(record.pharmacy.storage_conditions, "Dry room, below 25°C");
        assert_eq!(record.pharmacy.active_ingredients, None);
        assert!(!record.is_previously_used());
        assert_eq!(record.pharmacy.recommendations.len(), 1);
        assert_eq!(record.latest_block.index, 87);
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let json = r#"{"pharmacy": {"name": "x"}, "latest_block": {}}"#;
        assert!(VerificationRecord::from_json(json.as_bytes()).is_err());
    }

    #[test]
    fn test_cost_tier() {
        assert_eq!(CostTier::parse("HIGH"), CostTier::High);
        assert_eq!(CostTier::parse("low"), CostTier::Low);
        assert_eq!(
            CostTier::parse("premium"),
            CostTier::Other("premium".into())
        );
        assert_eq!(CostTier::Medium.label(), "MEDIUM COST");
    }

    #[test]
    fn test_expiry_window() {
        let record = VerificationRecord::from_json(SAMPLE_JSON.as_bytes()).unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        assert_eq!(record.pharmacy.days_until_expiry(today), Some(45));
        assert!(record.pharmacy.is_expiring_soon(today));

        let early = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert!(!record.pharmacy.is_expiring_soon(early));
    }

    #[test]
    fn test_unparsable_expiry() {
        let mut record = VerificationRecord::from_json(SAMPLE_JSON.as_bytes()).unwrap();
        record.pharmacy.expiry_date = "soon".into();
        let today = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        assert_eq!(record.pharmacy.days_until_expiry(today), None);
        assert!(!record.pharmacy.is_expiring_soon(today));
    }

    #[test]
    fn test_block_timestamp() {
        let record = VerificationRecord::from_json(SAMPLE_JSON.as_bytes()).unwrap();
        let at = record.latest_block.recorded_at().unwrap();
        assert_eq!(at.timestamp(), 1764782747);
    }
}
