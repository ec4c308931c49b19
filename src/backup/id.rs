//! Backup run ids
//!
//! Every artifact name carries a 14-digit UTC timestamp (`YYYYMMDDHHMMSS`)
//! between two `-` delimiters. All artifacts written by one backup run share
//! the same id.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;

use crate::error::{DumpError, DumpResult};

/// strftime layout of a run id
pub const ID_FORMAT: &str = "%Y%m%d%H%M%S";

/// Number of digits in a run id
pub const ID_LEN: usize = 14;

const HUMAN_FORMAT: &str = "%b %d, %Y at %H:%M:%S";

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"-([0-9]{14})-").expect("id pattern is valid"))
}

/// Create a run id from a reference time, or from the current UTC time
pub fn create_id(reference: Option<DateTime<Utc>>) -> String {
    reference
        .unwrap_or_else(Utc::now)
        .format(ID_FORMAT)
        .to_string()
}

/// Extract the run id embedded in an artifact file name
///
/// Returns the first run of exactly 14 digits delimited by `-` on both sides.
pub fn extract_id(file_name: &str) -> Option<String> {
    id_pattern()
        .captures(file_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Parse a run id into the UTC timestamp it encodes
pub fn parse_id(id: &str) -> DumpResult<DateTime<Utc>> {
    if id.len() != ID_LEN || !id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DumpError::InvalidId(id.to_string()));
    }

    let naive = NaiveDateTime::parse_from_str(id, ID_FORMAT)
        .map_err(|_| DumpError::InvalidId(id.to_string()))?;

    Ok(DateTime::from_naive_utc_and_offset(naive, Utc))
}

/// Render a run id as a human readable date, e.g. `Jan 01, 2024 at 12:00:00`
pub fn humanize(id: &str) -> DumpResult<String> {
    Ok(parse_id(id)?.format(HUMAN_FORMAT).to_string())
}

/// Check whether a string is a well-formed run id
pub fn is_well_formed(id: &str) -> bool {
    parse_id(id).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_create_id_from_reference() {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(create_id(Some(t)), "20240101120000");
    }

    #[test]
    fn test_create_id_now_is_well_formed() {
        let id = create_id(None);
        assert_eq!(id.len(), ID_LEN);
        assert!(is_well_formed(&id));
    }

    #[test]
    fn test_humanize() {
        assert_eq!(
            humanize("20240101120000").unwrap(),
            "Jan 01, 2024 at 12:00:00"
        );
        assert_eq!(
            humanize("19991231235959").unwrap(),
            "Dec 31, 1999 at 23:59:59"
        );
    }

    #[test]
    fn test_humanize_round_trips_create_id() {
        let times = [
            Utc.with_ymd_and_hms(2021, 2, 28, 0, 0, 1).unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap(),
            Utc.with_ymd_and_hms(2030, 11, 5, 7, 8, 9).unwrap(),
        ];

        for t in times {
            let id = create_id(Some(t));
            assert_eq!(parse_id(&id).unwrap(), t);
            assert_eq!(
                humanize(&id).unwrap(),
                t.format("%b %d, %Y at %H:%M:%S").to_string()
            );
        }
    }

    #[test]
    fn test_humanize_rejects_malformed_ids() {
        for bad in ["", "2024", "2024010112000", "202401011200000", "2024O101120000", "20241301120000", "20240230120000", "+2024010112000"] {
            let err = humanize(bad).unwrap_err();
            assert!(matches!(err, DumpError::InvalidId(_)), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_extract_id() {
        assert_eq!(
            extract_id("db-bkp-20240101120000-users.gz").as_deref(),
            Some("20240101120000")
        );
        assert_eq!(
            extract_id("db-bkp-20240101120000-users.gz.gpg").as_deref(),
            Some("20240101120000")
        );
    }

    #[test]
    fn test_extract_id_requires_both_delimiters() {
        assert_eq!(extract_id("db-bkp-20240101120000.gz"), None);
        assert_eq!(extract_id("20240101120000-users.gz"), None);
        assert_eq!(extract_id("notes.txt"), None);
    }

    #[test]
    fn test_extract_id_ignores_other_digit_runs() {
        // 15 digits is not an id
        assert_eq!(extract_id("db-bkp-202401011200001-users.gz"), None);
        // a prefix with its own digits does not confuse extraction
        assert_eq!(
            extract_id("app2-20240101120000-table_2024.gz").as_deref(),
            Some("20240101120000")
        );
        // first match wins
        assert_eq!(
            extract_id("x-20240101120000-20250101120000-y.gz").as_deref(),
            Some("20240101120000")
        );
    }
}
