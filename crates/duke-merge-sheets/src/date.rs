//! Excel serial date conversion

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use duke_merge_core::CellValue;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Serial of 9999-12-31, the last day Excel can show
const MAX_SERIAL: f64 = 2_958_465.0;

fn epoch(date1904: bool) -> Option<NaiveDateTime> {
    let date = if date1904 {
        NaiveDate::from_ymd_opt(1904, 1, 1)?
    } else {
        // 1899-12-30 absorbs the phantom 1900-02-29 for serials from 61 on
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    date.and_hms_opt(0, 0, 0)
}

/// Convert a date-formatted serial number to a date or time value.
///
/// Fractions are rounded to the millisecond. A serial in `[0, 1)` is a
/// time of day. In the 1900 system serials below 60 are shifted by a day
/// to account for Excel's nonexistent 1900-02-29. Returns `None` when the
/// serial is out of range.
pub fn from_excel_serial(serial: f64, date1904: bool) -> Option<CellValue> {
    if !serial.is_finite() || serial.abs() > MAX_SERIAL + 1.0 {
        return None;
    }

    let mut day = serial.floor();
    let fraction = serial - day;
    let mut millis = (fraction * MILLIS_PER_DAY as f64).round() as i64;
    if millis == MILLIS_PER_DAY {
        day += 1.0;
        millis = 0;
    }

    if (0.0..1.0).contains(&serial) && day == 0.0 {
        let midnight = NaiveTime::from_hms_opt(0, 0, 0)?;
        return Some(CellValue::Time(midnight + Duration::milliseconds(millis)));
    }

    let mut day = day as i64;
    if !date1904 && serial > 0.0 && serial < 60.0 {
        day += 1;
    }

    epoch(date1904)?
        .checked_add_signed(Duration::days(day))?
        .checked_add_signed(Duration::milliseconds(millis))
        .map(CellValue::DateTime)
}
