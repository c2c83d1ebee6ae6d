#![no_main]

//! Fuzz target for lookup response decoding
//!
//! Run with: cargo +nightly fuzz run fuzz_record

use chrono::NaiveDate;
use libfuzzer_sys::fuzz_target;
use pharmacheck_core::VerificationRecord;

fuzz_target!(|data: &[u8]| {
    if let Ok(record) = VerificationRecord::from_json(data) {
        // Derived views must cope with whatever strings the service sent
        let _ = record.is_previously_used();
        let _ = record.pharmacy.cost_tier().label();
        let _ = record.latest_block.recorded_at();
        if let Some(today) = NaiveDate::from_ymd_opt(2025, 6, 1) {
            let _ = record.pharmacy.is_expiring_soon(today);
        }
    }
});
