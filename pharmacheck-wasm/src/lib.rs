//! WebAssembly bindings for PharmaCheck.
//!
//! Code parsing, routing, onboarding and lookup-response classification run
//! in the browser; the page performs the HTTP request itself and hands the
//! body to [`classify_response`]. Every export returns a JSON string.

use chrono::NaiveDate;
use pharmacheck_core::onboarding::{self, OnboardingStep};
use pharmacheck_core::{
    extract_identifier as extract, FailureKind, ProductId, ProductPage, Route, VerificationRecord,
    VerifyError,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

#[derive(Serialize)]
struct Failure {
    ok: bool,
    kind: FailureKind,
    message: String,
}

impl Failure {
    fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            kind,
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
struct Extracted {
    ok: bool,
    identifier: ProductId,
    preview: String,
}

#[derive(Serialize)]
struct Verdict<'a> {
    ok: bool,
    status: &'static str,
    expiring_soon: bool,
    record: &'a VerificationRecord,
}

#[derive(Serialize)]
struct Step {
    ok: bool,
    index: usize,
    total: usize,
    is_last: bool,
    step: &'static OnboardingStep,
}

#[derive(Serialize)]
struct Resolved {
    #[serde(flatten)]
    route: Route,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<ProductPage>,
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| serialization_failure(&e.to_string()))
}

fn serialization_failure(error: &str) -> String {
    serde_json::json!({
        "ok": false,
        "kind": FailureKind::MalformedResponse,
        "message": format!("Serialization error: {error}"),
    })
    .to_string()
}

fn extract_internal(text: &str) -> String {
    match extract(text) {
        Ok(id) => to_json(&Extracted {
            ok: true,
            identifier: id,
            preview: id.preview(),
        }),
        Err(e) => to_json(&Failure::new(e.kind(), e.to_string())),
    }
}

fn route_internal(path: &str) -> String {
    let route = Route::parse(path);
    let page = route.page();
    to_json(&Resolved { route, page })
}

fn step_internal(index: usize) -> String {
    let total = onboarding::STEPS.len();
    match onboarding::step(index) {
        Some(step) => to_json(&Step {
            ok: true,
            index,
            total,
            is_last: index + 1 == total,
            step,
        }),
        None => to_json(&Failure::new(
            FailureKind::InvalidCodeFormat,
            format!("No onboarding step {index}"),
        )),
    }
}

fn classify_internal(status: u16, body: &[u8], today: NaiveDate) -> String {
    if !(200..300).contains(&status) {
        let err = if status == 404 {
            VerifyError::NotFound
        } else {
            VerifyError::ServerError { status }
        };
        return to_json(&Failure::new(err.kind(), err.to_string()));
    }

    let record = match VerificationRecord::from_json(body) {
        Ok(record) => record,
        Err(e) => {
            let err = VerifyError::MalformedResponse(e.to_string());
            return to_json(&Failure::new(err.kind(), err.to_string()));
        }
    };

    if record.is_previously_used() {
        let err = VerifyError::AlreadyUsed {
            record: Box::new(record),
        };
        return to_json(&Failure::new(err.kind(), err.to_string()));
    }

    to_json(&Verdict {
        ok: true,
        status: "authentic",
        expiring_soon: record.pharmacy.is_expiring_soon(today),
        record: &record,
    })
}

/// Today's date from the browser clock.
fn today() -> Option<NaiveDate> {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(
        now.get_full_year() as i32,
        now.get_month() + 1,
        now.get_date(),
    )
}

/// Extract the product identifier from scanned text.
#[wasm_bindgen]
pub fn extract_identifier(text: &str) -> String {
    extract_internal(text)
}

/// Resolve an application path to its page, with the page content when the
/// route shows a product.
#[wasm_bindgen]
pub fn resolve_route(path: &str) -> String {
    route_internal(path)
}

/// Onboarding step by zero-based index.
#[wasm_bindgen]
pub fn onboarding_step(index: usize) -> String {
    step_internal(index)
}

/// Classify a verification API response.
///
/// # Arguments
/// * `status` - HTTP status code of the lookup response
/// * `body` - Raw response body
#[wasm_bindgen]
pub fn classify_response(status: u16, body: &[u8]) -> String {
    match today() {
        Some(today) => classify_internal(status, body, today),
        None => {
            web_sys::console::warn_1(&"Browser clock unavailable".into());
            classify_internal(status, body, NaiveDate::MIN)
        }
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pharmacheck_core::fixtures::sample_record;
    use serde_json::Value;

    fn parse(json: &str) -> Value {
        serde_json::from_str(json).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn test_extract() {
        let doc = parse(&extract_internal(
            "https://pharmacheck.example/api/4a43bbb0-68b1-413a-bcf8-b50fd0174d05/",
        ));
        assert_eq!(doc["ok"], true);
        assert_eq!(doc["identifier"], "4a43bbb0-68b1-413a-bcf8-b50fd0174d05");
        assert_eq!(doc["preview"], "4a43bbb0...");

        let doc = parse(&extract_internal("12345"));
        assert_eq!(doc["ok"], false);
        assert_eq!(doc["kind"], "invalid_code_format");
        assert_eq!(doc["message"], "Invalid QR code format");
    }

    #[test]
    fn test_route() {
        let doc = parse(&route_internal("/product/abc"));
        assert_eq!(doc["route"], "product");
        assert_eq!(doc["value"], "abc");
        assert_eq!(doc["page"]["product"]["name"], "Yoshlik Eliksiri");

        let home = parse(&route_internal("/"));
        assert_eq!(home["route"], "home");
        assert!(home.get("page").is_none());
    }

    #[test]
    fn test_onboarding() {
        let doc = parse(&step_internal(4));
        assert_eq!(doc["total"], 5);
        assert_eq!(doc["is_last"], true);
        assert_eq!(parse(&step_internal(5))["ok"], false);
    }

    #[test]
    fn test_serialization_failure_is_valid_json() {
        let doc = parse(&serialization_failure(r#"key "a\b" must be a string"#));
        assert_eq!(doc["ok"], false);
        assert_eq!(doc["kind"], "malformed_response");
        assert_eq!(
            doc["message"],
            r#"Serialization error: key "a\b" must be a string"#
        );
    }

    #[test]
    fn test_classify_outcomes() {
        let body = serde_json::to_vec(&sample_record()).unwrap();
        let doc = parse(&classify_internal(200, &body, today()));
        assert_eq!(doc["status"], "authentic");
        assert_eq!(doc["expiring_soon"], false);

        let mut used = sample_record();
        used.pharmacy.is_read = true;
        let body = serde_json::to_vec(&used).unwrap();
        assert_eq!(
            parse(&classify_internal(200, &body, today()))["kind"],
            "already_used"
        );

        assert_eq!(
            parse(&classify_internal(404, b"", today()))["kind"],
            "not_found"
        );
        assert_eq!(
            parse(&classify_internal(503, b"", today()))["message"],
            "Server error - please try again"
        );
        assert_eq!(
            parse(&classify_internal(200, b"not json", today()))["kind"],
            "malformed_response"
        );
    }
}
