use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use fest_common::Rupees;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{EventStat, Registration, RegistrationOverview},
    fest_api::errors::AdminApiError,
};

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 1000;
pub const RECENT_REGISTRATIONS: i64 = 5;
/// The `eventFilter` value meaning "every event".
pub const ALL_EVENTS: &str = "all";

/// Query parameters accepted by the registration listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub event_filter: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Query parameters accepted by the spreadsheet export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportParams {
    pub event_filter: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// `None` for an absent, blank or `all` event filter.
pub fn event_filter(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case(ALL_EVENTS)).map(str::to_string)
}

/// Parses an RFC 3339 timestamp, or a plain `YYYY-MM-DD` date. A plain date is taken as the start of that day (UTC),
/// or as its very last instant if `end_of_day` is set.
pub fn parse_date_bound(value: &str, end_of_day: bool) -> Result<DateTime<Utc>, AdminApiError> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AdminApiError::InvalidQuery(format!("Invalid date: {value}. Use YYYY-MM-DD or RFC 3339.")))?;
    let time = if end_of_day {
        NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)
    }
    .ok_or_else(|| AdminApiError::InvalidQuery(format!("Invalid date: {value}")))?;
    Ok(Utc.from_utc_datetime(&date.and_time(time)))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_count: i64,
    pub limit: i64,
}

impl PaginationInfo {
    pub fn new(current_page: i64, limit: i64, total_count: i64) -> Self {
        let total_pages = if limit > 0 { total_count / limit + i64::from(total_count % limit != 0) } else { 0 };
        Self { current_page, total_pages, total_count, limit }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilters {
    pub available_events: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationPage {
    pub registrations: Vec<Registration>,
    pub pagination: PaginationInfo,
    pub filters: ListFilters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentRegistration {
    pub leader_name: String,
    pub selected_event: String,
    pub created_at: DateTime<Utc>,
    pub total_fee: Rupees,
}

impl From<Registration> for RecentRegistration {
    fn from(r: Registration) -> Self {
        Self {
            leader_name: r.leader_name,
            selected_event: r.selected_event,
            created_at: r.created_at,
            total_fee: r.total_fee,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationStats {
    pub overview: RegistrationOverview,
    pub event_stats: Vec<EventStat>,
    pub recent_registrations: Vec<RecentRegistration>,
}

/// A generated spreadsheet, ready to be sent as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod test {
    use chrono::{Datelike, Timelike};

    use super::*;

    #[test]
    fn page_counts_round_up() {
        assert_eq!(PaginationInfo::new(1, 50, 0).total_pages, 0);
        assert_eq!(PaginationInfo::new(1, 50, 50).total_pages, 1);
        assert_eq!(PaginationInfo::new(2, 50, 51).total_pages, 2);
        assert_eq!(PaginationInfo::new(1, i64::MAX, 1).total_pages, 1);
        assert_eq!(PaginationInfo::new(1, i64::MAX, 0).total_pages, 0);
        assert_eq!(PaginationInfo::new(1, 1, i64::MAX).total_pages, i64::MAX);
    }

    #[test]
    fn event_filter_values() {
        assert_eq!(event_filter(None), None);
        assert_eq!(event_filter(Some(" ALL ")), None);
        assert_eq!(event_filter(Some("")), None);
        assert_eq!(event_filter(Some(" Robo Race")), Some("Robo Race".to_string()));
    }

    #[test]
    fn date_bounds() {
        let start = parse_date_bound("2025-02-14", false).unwrap();
        assert_eq!((start.year(), start.month(), start.day(), start.hour()), (2025, 2, 14, 0));
        let end = parse_date_bound("2025-02-14", true).unwrap();
        assert_eq!((end.day(), end.hour(), end.minute(), end.second()), (14, 23, 59, 59));
        let exact = parse_date_bound("2025-02-14T10:30:00+05:30", true).unwrap();
        assert_eq!((exact.hour(), exact.minute()), (5, 0));
        assert!(matches!(parse_date_bound("14/02/2025", false), Err(AdminApiError::InvalidQuery(_))));
    }
}
