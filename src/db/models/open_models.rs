use crate::error::Error;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Number of rows shown on the interactive admin page
pub const DEFAULT_VIEW_LIMIT: i64 = 100;

/// One recorded fetch of the tracking pixel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenEvent {
    pub id: i64,
    pub subject_id: String,
    pub timestamp: DateTime<Utc>,
    pub remote_address: String,
    pub forwarded_for: Option<String>,
    pub resolved_ip: Option<String>,
    pub user_agent: String,
    pub referrer: String,
}

/// An event that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOpenEvent {
    pub subject_id: String,
    pub timestamp: DateTime<Utc>,
    pub remote_address: String,
    pub forwarded_for: Option<String>,
    pub resolved_ip: Option<String>,
    pub user_agent: String,
    pub referrer: String,
}

impl NewOpenEvent {
    /// Build an event stamped with the current UTC time.
    ///
    /// An empty `X-Forwarded-For` value is recorded as absent.
    pub fn received_now(
        subject_id: String,
        remote_address: String,
        forwarded_for: Option<String>,
        user_agent: String,
        referrer: String,
    ) -> Self {
        let forwarded_for = forwarded_for.filter(|value| !value.trim().is_empty());
        let resolved_ip = resolve_client_ip(forwarded_for.as_deref(), &remote_address);

        Self {
            subject_id,
            timestamp: Utc::now(),
            remote_address,
            forwarded_for,
            resolved_ip: Some(resolved_ip),
            user_agent,
            referrer,
        }
    }
}

/// First hop of `X-Forwarded-For` when it has one, the TCP peer otherwise.
pub fn resolve_client_ip(forwarded_for: Option<&str>, remote_address: &str) -> String {
    forwarded_for
        .and_then(|chain| chain.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
        .unwrap_or(remote_address)
        .to_string()
}

/// Fixed-width so that text order in SQLite equals time order.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| Error::Database(format!("Invalid stored timestamp {:?}: {}", value, e)))
}

/// Row as stored in the `opens` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OpenEventDb {
    pub id: i64,
    pub subject_id: String,
    pub ts: String,
    pub remote_addr: String,
    pub forwarded_for: Option<String>,
    pub resolved_ip: Option<String>,
    pub user_agent: String,
    pub referer: String,
}

impl TryFrom<OpenEventDb> for OpenEvent {
    type Error = Error;

    fn try_from(row: OpenEventDb) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            subject_id: row.subject_id,
            timestamp: parse_timestamp(&row.ts)?,
            remote_address: row.remote_addr,
            forwarded_for: row.forwarded_for,
            resolved_ip: row.resolved_ip,
            user_agent: row.user_agent,
            referrer: row.referer,
        })
    }
}

/// Selection for list queries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenFilter {
    pub subject_id: Option<String>,
    pub limit: Option<i64>,
}

impl OpenFilter {
    /// Bounded selection used by the HTML view
    pub fn interactive(subject_id: Option<String>) -> Self {
        Self {
            subject_id,
            limit: Some(DEFAULT_VIEW_LIMIT),
        }
    }

    /// Unbounded selection used by the CSV export
    pub fn export(subject_id: Option<String>) -> Self {
        Self {
            subject_id,
            limit: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn forwarded_first_hop_wins() {
        assert_eq!(
            resolve_client_ip(Some(" 203.0.113.7 , 10.0.0.1"), "10.0.0.2"),
            "203.0.113.7"
        );
    }

    #[test]
    fn remote_address_used_without_forwarded_header() {
        assert_eq!(resolve_client_ip(None, "10.0.0.2"), "10.0.0.2");
        assert_eq!(resolve_client_ip(Some(""), "10.0.0.2"), "10.0.0.2");
        assert_eq!(resolve_client_ip(Some(" , 10.0.0.1"), "10.0.0.2"), "10.0.0.2");
    }

    #[test]
    fn empty_forwarded_header_is_not_stored() {
        let event = NewOpenEvent::received_now(
            "abc".into(),
            "127.0.0.1".into(),
            Some("   ".into()),
            "ua".into(),
            String::new(),
        );
        assert_eq!(event.forwarded_for, None);
        assert_eq!(event.resolved_ip.as_deref(), Some("127.0.0.1"));
    }

    #[test]
    fn timestamps_are_fixed_width_and_parse_back() {
        let whole = Utc.with_ymd_and_hms(2026, 10, 18, 9, 15, 2).unwrap();
        let text = format_timestamp(&whole);
        assert_eq!(text, "2026-10-18T09:15:02.000000Z");
        assert_eq!(parse_timestamp(&text).unwrap(), whole);
    }

    #[test]
    fn garbage_timestamp_is_a_database_error() {
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(Error::Database(_))
        ));
    }
}
