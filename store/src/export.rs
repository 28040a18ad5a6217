//! CSV export of log records.

use crate::error::StoreError;
use crate::record::TransactionRecord;

pub const CSV_HEADER: [&str; 9] = [
    "Timestamp", "Type", "Success", "From", "To", "Amount", "Currency", "Hash", "Error",
];

/// Render `records` as CSV in the given order.
///
/// `Currency` falls back to the record's configured currency.
pub fn to_csv(records: &[TransactionRecord]) -> Result<String, StoreError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(CSV_HEADER)
        .map_err(|e| StoreError::Csv(e.to_string()))?;
    for record in records {
        let mut currency = record.detail("currency");
        if currency.is_empty() {
            currency = record.config.currency.clone();
        }
        writer
            .write_record([
                record.timestamp_text(),
                record.kind.to_string(),
                record.success.to_string(),
                record.detail("from"),
                record.detail("to"),
                record.detail("amount"),
                currency,
                record.detail("hash"),
                record.detail("error"),
            ])
            .map_err(|e| StoreError::Csv(e.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| StoreError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| StoreError::Csv(e.to_string()))
}
