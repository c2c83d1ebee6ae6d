//! Common rendering shared across CLI commands.

use chrono::{NaiveDate, Utc};
use colored::Colorize;
use pharmacheck_core::{
    AlertTrack, LatestBlock, Presentation, ProductId, ProductPage, ScanFailure,
    VerificationRecord,
};
use serde_json::{json, Value};

/// Format a ledger block timestamp (fractional Unix seconds) as UTC.
pub fn format_block_timestamp(block: &LatestBlock) -> String {
    match block.recorded_at() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => format!("{}s", block.timestamp),
    }
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// JSON document for a verified product.
pub fn authentic_json(record: &VerificationRecord, today: NaiveDate) -> Value {
    json!({
        "status": "authentic",
        "identifier": record.pharmacy.uuid,
        "expiring_soon": record.pharmacy.is_expiring_soon(today),
        "record": record,
    })
}

/// JSON document for a rejected scan.
pub fn rejected_json(identifier: Option<ProductId>, failure: &ScanFailure) -> Value {
    json!({
        "status": failure.alert(),
        "identifier": identifier,
        "kind": failure.kind,
        "message": failure.message,
        "retryable": failure.kind.is_transient(),
    })
}

pub fn print_authentic(record: &VerificationRecord, today: NaiveDate) {
    let pharmacy = &record.pharmacy;

    println!();
    println!("{}", "╔════════════════════════════════════════╗".green());
    println!(
        "{}",
        "║           VERIFIED AUTHENTIC           ║".green().bold()
    );
    println!("{}", "╚════════════════════════════════════════╝".green());
    println!();
    println!("   {} {}", "Product:".dimmed(), pharmacy.name.bold());
    println!("   {} {}", "Brand:".dimmed(), pharmacy.brand);
    println!(
        "   {} {} {}",
        "Form:".dimmed(),
        pharmacy.dosage_form,
        pharmacy.strength
    );
    if let Some(active) = &pharmacy.active_ingredients {
        println!("   {} {}", "Active:".dimmed(), active);
    }
    println!("   {} {}", "Batch:".dimmed(), pharmacy.batch);
    println!("   {} {}", "GTIN:".dimmed(), pharmacy.gtin);
    println!("   {} {}", "Manufactured:".dimmed(), pharmacy.manufacture_date);

    match pharmacy.days_until_expiry(today) {
        Some(days) if days < 0 => println!(
            "   {} {} {}",
            "Expires:".dimmed(),
            pharmacy.expiry_date.red().bold(),
            "(EXPIRED)".red().bold()
        ),
        Some(days) if pharmacy.is_expiring_soon(today) => println!(
            "   {} {} {}",
            "Expires:".dimmed(),
            pharmacy.expiry_date.red().bold(),
            format!("(expiring soon: {days} days)").red()
        ),
        _ => println!("   {} {}", "Expires:".dimmed(), pharmacy.expiry_date),
    }

    println!("   {} {}", "Storage:".dimmed(), pharmacy.storage_conditions);
    println!("   {} {}", "Regulatory:".dimmed(), pharmacy.regulatory_info);
    println!("   {} {}", "Price:".dimmed(), pharmacy.cost_tier().label());
    println!(
        "   {} #{} at {}",
        "Ledger block:".dimmed(),
        record.latest_block.index,
        format_block_timestamp(&record.latest_block)
    );

    if !pharmacy.recommendations.is_empty() {
        println!();
        println!("   {}", "Recommended alternatives:".bold());
        for rec in &pharmacy.recommendations {
            println!(
                "     - {} ({}) {}",
                rec.name,
                rec.brand,
                rec.cost_tier().label().dimmed()
            );
        }
    }
}

pub fn print_rejected(identifier: Option<ProductId>, failure: &ScanFailure) {
    println!();
    match failure.alert() {
        AlertTrack::Counterfeit => {
            println!("{}", "╔════════════════════════════════════════╗".red());
            println!(
                "{}",
                "║          FAKE PRODUCT ALERT!           ║".red().bold()
            );
            println!("{}", "╚════════════════════════════════════════╝".red());
            println!();
            println!("   {}", failure.message.red().bold());
            println!("   This medicine is NOT registered in our system:");
            println!("     - Likely counterfeit product");
            println!("     - Not approved by regulatory authorities");
            println!("     - May contain harmful substances");
            println!("   {}", "DO NOT PURCHASE - Report immediately!".red().bold());
        }
        AlertTrack::Duplicate => {
            println!("{}", "╔════════════════════════════════════════╗".yellow());
            println!(
                "{}",
                "║           DUPLICATE WARNING!           ║".yellow().bold()
            );
            println!("{}", "╚════════════════════════════════════════╝".yellow());
            println!();
            println!("   {}", failure.message.yellow().bold());
            if failure.kind.is_transient() {
                println!("   Please try again.");
            } else {
                println!("   This medicine may be:");
                println!("     - A counterfeit copy");
                println!("     - Resold/returned product");
                println!("     - Stolen merchandise");
                println!("   {}", "DO NOT PURCHASE - Report to pharmacy!".yellow().bold());
            }
        }
    }
    if let Some(id) = identifier {
        println!("   {} {}", "UUID:".dimmed(), id.preview());
    }
}

pub fn print_page(page: &ProductPage) {
    let headline = match page.presentation {
        Presentation::Valid => page.headline.green().bold(),
        Presentation::Counterfeit => page.headline.red().bold(),
        Presentation::Undefined => page.headline.yellow().bold(),
    };
    let product = &page.product;

    println!();
    println!("   {headline}");
    println!("   {} {}", "UUID:".dimmed(), page.uuid_preview());
    for warning in page.warnings {
        println!("     - {}", warning.red());
    }
    println!();
    println!("   {} by {}", product.name.bold(), product.brand);
    println!("   {} {}", "Strength:".dimmed(), product.strength);
    println!("   {} {}", "Form:".dimmed(), product.dosage_form);
    println!("   {} {}", "Active:".dimmed(), product.active_ingredients);
    println!("   {} {}", "Manufactured:".dimmed(), product.manufacture_date);
    println!("   {} {}", "Expires:".dimmed(), product.expiry_date);
    println!("   {} {}", "Batch:".dimmed(), product.batch);
    println!("   {} {}", "Storage:".dimmed(), product.storage_conditions);
    println!();
    println!("   {}", product.about);

    println!();
    println!("   {}", "Recommended alternatives:".bold());
    for alt in page.alternatives {
        println!(
            "     - {} by {}: {} ({}, {})",
            alt.name, alt.brand, alt.description, alt.price, alt.availability
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pharmacheck_core::fixtures::sample_record;
    use pharmacheck_core::FailureKind;

    #[test]
    fn test_format_block_timestamp() {
        let record = sample_record();
        let formatted = format_block_timestamp(&record.latest_block);
        assert!(formatted.starts_with("2025-12-03"));
        assert!(formatted.ends_with("UTC"));
    }

    #[test]
    fn test_unrepresentable_timestamp_falls_back() {
        let mut block = sample_record().latest_block;
        block.timestamp = f64::NAN;
        assert_eq!(format_block_timestamp(&block), "NaNs");
    }

    #[test]
    fn test_authentic_json() {
        let record = sample_record();
        let today = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        let doc = authentic_json(&record, today);
        assert_eq!(doc["status"], "authentic");
        assert_eq!(doc["identifier"], "4a43bbb0-68b1-413a-bcf8-b50fd0174d05");
        assert_eq!(doc["expiring_soon"], true);
        assert_eq!(doc["record"]["pharmacy"]["name"], "Asperine");
    }

    #[test]
    fn test_rejected_json_tracks() {
        let fake = ScanFailure {
            kind: FailureKind::NotFound,
            message: "Product not found in database - Possibly FAKE!".into(),
        };
        let doc = rejected_json(None, &fake);
        assert_eq!(doc["status"], "counterfeit");
        assert_eq!(doc["kind"], "not_found");
        assert_eq!(doc["retryable"], false);

        let timeout = ScanFailure {
            kind: FailureKind::Timeout,
            message: "Verification timed out - please try again".into(),
        };
        let doc = rejected_json(None, &timeout);
        assert_eq!(doc["status"], "duplicate");
        assert_eq!(doc["retryable"], true);
    }
}
