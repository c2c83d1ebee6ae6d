//! Page routing.
//!
//! A few fixed demo paths map to static verification presentations; every
//! other product is reached through `/product/{id}`. Both kinds of page show
//! the same mock product, built by [`Route::page`].

use serde::Serialize;

/// Static outcome shown on a demo product page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Presentation {
    Valid,
    Counterfeit,
    Undefined,
}

/// Fixed demo paths. The first segment of the "valid" path is seven
/// characters long; it is matched literally, not as an identifier.
pub const DEMO_PATHS: &[(&str, Presentation)] = &[
    ("e0d892c-e530-4077-b79e-61b99c837984", Presentation::Valid),
    ("eb8c56d3-68bd-41b9-af2e-0e263b345443", Presentation::Counterfeit),
    ("0ff7920b-2183-4a7a-87fd-357b96a510a2", Presentation::Undefined),
];

impl Presentation {
    pub fn headline(self) -> &'static str {
        match self {
            Self::Valid => "Product Verified & Authentic",
            Self::Counterfeit => "COUNTERFEIT PRODUCT ALERT",
            Self::Undefined => "PRODUCT STATUS UNDEFINED",
        }
    }

    /// Safety notes shown under the headline.
    pub fn warnings(self) -> &'static [&'static str] {
        match self {
            Self::Counterfeit => &[
                "This product is NOT registered in the official database",
                "Likely contains harmful or ineffective ingredients",
                "Not approved by health authorities",
                "DO NOT CONSUME - Return to pharmacy immediately",
            ],
            Self::Valid | Self::Undefined => &[],
        }
    }
}

/// Identifier shown when a demo path carries none.
pub const UNKNOWN_PAGE_UUID: &str = "unknown-uuid";

/// A product sold as a replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Alternative {
    pub name: &'static str,
    pub brand: &'static str,
    pub description: &'static str,
    pub price: &'static str,
    pub availability: &'static str,
}

/// Static product details rendered on a product page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageProduct {
    pub name: &'static str,
    pub brand: &'static str,
    pub strength: &'static str,
    pub dosage_form: &'static str,
    pub manufacture_date: &'static str,
    pub expiry_date: &'static str,
    pub batch: &'static str,
    pub active_ingredients: &'static str,
    pub storage_conditions: &'static str,
    pub about: &'static str,
}

pub const PAGE_PRODUCT: PageProduct = PageProduct {
    name: "Yoshlik Eliksiri",
    brand: "MediLife Pharmaceuticals",
    strength: "250mg/5ml",
    dosage_form: "Syrup",
    manufacture_date: "2024-01-15",
    expiry_date: "2025-12-31",
    batch: "YLK-2024-002",
    active_ingredients: "Multivitamin complex (A, C, D, E, B12), Zinc, Ginseng extract",
    storage_conditions: "Store in a cool, dry place below 25°C. Protect from light.",
    about: "Yoshlik Eliksiri is a premium multivitamin syrup designed to support overall \
            health and vitality. It contains a carefully balanced formula of essential \
            vitamins and minerals to boost immunity, enhance energy levels, and promote \
            healthy growth and development.",
};

pub const PAGE_ALTERNATIVES: &[Alternative] = &[
    Alternative {
        name: "ImmunoPlus Forte",
        brand: "MedTech Labs",
        description: "Immune system booster with Vitamin C & Zinc",
        price: "₩35,000",
        availability: "Available in most pharmacies",
    },
    Alternative {
        name: "VitaYouth Tonic",
        brand: "Natural Health",
        description: "Herbal tonic for energy and vitality",
        price: "₩28,000",
        availability: "Available in specialized stores",
    },
    Alternative {
        name: "MultiVita Complex",
        brand: "PharmaFirst",
        description: "Complete multivitamin supplement for all ages",
        price: "₩42,000",
        availability: "Widely available",
    },
];

/// Everything a product page displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductPage {
    pub uuid: String,
    pub presentation: Presentation,
    pub headline: &'static str,
    pub warnings: &'static [&'static str],
    pub product: PageProduct,
    pub alternatives: &'static [Alternative],
}

impl ProductPage {
    pub fn new(uuid: impl Into<String>, presentation: Presentation) -> Self {
        Self {
            uuid: uuid.into(),
            presentation,
            headline: presentation.headline(),
            warnings: presentation.warnings(),
            product: PAGE_PRODUCT,
            alternatives: PAGE_ALTERNATIVES,
        }
    }

    /// First eight characters of the identifier followed by `...`.
    pub fn uuid_preview(&self) -> String {
        let head: String = self.uuid.chars().take(8).collect();
        format!("{head}...")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "route", content = "value", rename_all = "snake_case")]
pub enum Route {
    Home,
    Demo(Presentation),
    Product(String),
    NotFound,
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_matches('/');

        if trimmed.is_empty() {
            return Self::Home;
        }

        if let Some((_, presentation)) = DEMO_PATHS.iter().find(|(p, _)| *p == trimmed) {
            return Self::Demo(*presentation);
        }

        match trimmed.split_once('/') {
            Some(("product", id)) if !id.is_empty() && !id.contains('/') => {
                Self::Product(id.to_string())
            }
            _ => Self::NotFound,
        }
    }

    /// The product page behind this route. Home and not-found have none.
    pub fn page(&self) -> Option<ProductPage> {
        match self {
            Self::Demo(presentation) => Some(ProductPage::new(UNKNOWN_PAGE_UUID, *presentation)),
            Self::Product(id) => Some(ProductPage::new(id.as_str(), Presentation::Valid)),
            Self::Home | Self::NotFound => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
    }

    #[test]
    fn test_demo_paths() {
        assert_eq!(
            Route::parse("/e0d892c-e530-4077-b79e-61b99c837984"),
            Route::Demo(Presentation::Valid)
        );
        assert_eq!(
            Route::parse("/eb8c56d3-68bd-41b9-af2e-0e263b345443/"),
            Route::Demo(Presentation::Counterfeit)
        );
        assert_eq!(
            Route::parse("/0ff7920b-2183-4a7a-87fd-357b96a510a2"),
            Route::Demo(Presentation::Undefined)
        );
    }

    #[test]
    fn test_dynamic_product() {
        assert_eq!(
            Route::parse("/product/abc-123"),
            Route::Product("abc-123".into())
        );
        assert_eq!(
            Route::parse("/product/abc?ref=qr"),
            Route::Product("abc".into())
        );
    }

    #[test]
    fn test_not_found() {
        assert_eq!(Route::parse("/product/"), Route::NotFound);
        assert_eq!(Route::parse("/product/a/b"), Route::NotFound);
        assert_eq!(Route::parse("/scanner"), Route::NotFound);
        // Canonical identifiers outside the demo table are not routes.
        assert_eq!(
            Route::parse("/4a43bbb0-68b1-413a-bcf8-b50fd0174d05"),
            Route::NotFound
        );
    }

    #[test]
    fn test_demo_page() {
        let page = Route::parse("/eb8c56d3-68bd-41b9-af2e-0e263b345443")
            .page()
            .unwrap();
        assert_eq!(page.presentation, Presentation::Counterfeit);
        assert_eq!(page.headline, "COUNTERFEIT PRODUCT ALERT");
        assert_eq!(page.warnings.len(), 4);
        assert_eq!(page.uuid, UNKNOWN_PAGE_UUID);
        assert_eq!(page.product.name, "Yoshlik Eliksiri");
        assert_eq!(page.alternatives.len(), 3);

        let undefined = Route::parse("/0ff7920b-2183-4a7a-87fd-357b96a510a2")
            .page()
            .unwrap();
        assert_eq!(undefined.headline, "PRODUCT STATUS UNDEFINED");
        assert!(undefined.warnings.is_empty());
    }

    #[test]
    fn test_product_page_uses_path_id() {
        let page = Route::parse("/product/4a43bbb0-68b1-413a-bcf8-b50fd0174d05")
            .page()
            .unwrap();
        assert_eq!(page.presentation, Presentation::Valid);
        assert_eq!(page.uuid_preview(), "4a43bbb0...");

        assert!(Route::parse("/").page().is_none());
        assert!(Route::parse("/settings").page().is_none());
    }
}
