use crate::db::models::open_models::{format_timestamp, OpenEvent};
use crate::error::Error;

pub const CSV_HEADER: [&str; 8] = [
    "id",
    "subject_id",
    "timestamp",
    "remote_address",
    "forwarded_for",
    "resolved_ip",
    "user_agent",
    "referrer",
];

/// Render events as RFC 4180 CSV with a header row
pub fn events_to_csv(events: &[OpenEvent]) -> Result<Vec<u8>, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(CSV_HEADER)
        .map_err(|e| Error::Internal(format!("Failed to write CSV header: {}", e)))?;

    for event in events {
        let id = event.id.to_string();
        let timestamp = format_timestamp(&event.timestamp);
        writer
            .write_record([
                id.as_str(),
                event.subject_id.as_str(),
                timestamp.as_str(),
                event.remote_address.as_str(),
                event.forwarded_for.as_deref().unwrap_or(""),
                event.resolved_ip.as_deref().unwrap_or(""),
                event.user_agent.as_str(),
                event.referrer.as_str(),
            ])
            .map_err(|e| Error::Internal(format!("Failed to write CSV row: {}", e)))?;
    }

    writer
        .into_inner()
        .map_err(|e| Error::Internal(format!("Failed to flush CSV: {}", e)))
}
