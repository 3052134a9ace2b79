//! Arrival-date derivation from a single "now" snapshot.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use crate::conf::C_EXT_XLSX;
use crate::spec::ChakugoError;

/// "Tomorrow" in the configured offset, derived once per request.
///
/// The footer text and the download file name both read from this value,
/// so they cannot disagree across midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecArrivalStamp {
    /// Calendar day after `now` in the fixed offset.
    pub date_next: NaiveDate,
}

impl SpecArrivalStamp {
    /// Derive the stamp from `now` observed at `utc_offset_hours`.
    pub fn from_now(now: DateTime<Utc>, utc_offset_hours: i32) -> Result<Self, ChakugoError> {
        let tz = utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                ChakugoError::InvalidDate(format!("UTC offset out of range: {utc_offset_hours}h"))
            })?;
        let date_next = now
            .with_timezone(&tz)
            .date_naive()
            .succ_opt()
            .ok_or_else(|| ChakugoError::InvalidDate(format!("no day after {now}")))?;
        Ok(Self { date_next })
    }

    /// In-sheet footer text, e.g. `03/15 着後必要数`.
    pub fn footer_text(&self, label: &str) -> String {
        format!("{} {label}", self.date_next.format("%m/%d"))
    }

    /// Download file name, e.g. `0315着後必要数.xlsx`.
    pub fn file_name(&self, label: &str) -> String {
        format!("{}{label}{C_EXT_XLSX}", self.date_next.format("%m%d"))
    }
}

/// Download file name for `now` without building a document.
pub fn derive_file_name(
    now: DateTime<Utc>,
    utc_offset_hours: i32,
    label: &str,
) -> Result<String, ChakugoError> {
    Ok(SpecArrivalStamp::from_now(now, utc_offset_hours)?.file_name(label))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn jst(y: i32, m: u32, d: u32, hh: u32, mm: u32) -> DateTime<Utc> {
        FixedOffset::east_opt(9 * 3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, hh, mm, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_footer_and_file_name_share_next_day() {
        let stamp = SpecArrivalStamp::from_now(jst(2024, 3, 14, 23, 0), 9).unwrap();
        assert_eq!(stamp.date_next, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(stamp.footer_text("着後必要数"), "03/15 着後必要数");
        assert_eq!(stamp.file_name("着後必要数"), "0315着後必要数.xlsx");
    }

    #[test]
    fn test_next_day_uses_offset_not_utc() {
        // 2024-03-14 16:30 UTC is already 03/15 01:30 in UTC+9.
        let now = Utc.with_ymd_and_hms(2024, 3, 14, 16, 30, 0).unwrap();
        let stamp = SpecArrivalStamp::from_now(now, 9).unwrap();
        assert_eq!(stamp.footer_text("着後必要数"), "03/16 着後必要数");

        let stamp_utc = SpecArrivalStamp::from_now(now, 0).unwrap();
        assert_eq!(stamp_utc.footer_text("着後必要数"), "03/15 着後必要数");
    }

    #[test]
    fn test_next_day_rolls_month_and_year() {
        let stamp = SpecArrivalStamp::from_now(jst(2024, 2, 29, 8, 0), 9).unwrap();
        assert_eq!(stamp.file_name("着後必要数"), "0301着後必要数.xlsx");

        let stamp = SpecArrivalStamp::from_now(jst(2024, 12, 31, 0, 0), 9).unwrap();
        assert_eq!(stamp.footer_text("着後必要数"), "01/01 着後必要数");
    }

    #[test]
    fn test_invalid_offset_is_rejected() {
        let err = SpecArrivalStamp::from_now(jst(2024, 3, 14, 0, 0), 30).unwrap_err();
        assert!(matches!(err, ChakugoError::InvalidDate(_)));
    }

    #[test]
    fn test_derive_file_name() {
        assert_eq!(
            derive_file_name(jst(2024, 3, 14, 23, 0), 9, "着後必要数").unwrap(),
            "0315着後必要数.xlsx"
        );
    }
}
