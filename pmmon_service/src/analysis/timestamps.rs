/// AirKorea measurement-time parsing.
///
/// The real-time feed reports `dataTime` as local (KST) wall-clock time in
/// `YYYY-MM-DD HH:MM` form, and labels the last hour of a day as `24:00`
/// rather than `00:00` of the next day. Values are only compared with one
/// another, so they are kept naive.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

const DATA_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Parses an AirKorea `dataTime`, mapping `24:00` to next-day midnight.
pub fn parse_data_time(text: &str) -> Result<NaiveDateTime, String> {
    let text = text.trim();

    if let Some(date_part) = text.strip_suffix(" 24:00") {
        let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            .map_err(|e| format!("invalid date in '{}': {}", text, e))?;
        return Ok(NaiveDateTime::new(date, NaiveTime::MIN) + Duration::days(1));
    }

    NaiveDateTime::parse_from_str(text, DATA_TIME_FORMAT)
        .map_err(|e| format!("invalid dataTime '{}': {}", text, e))
}

/// Returns the index and text of the first timestamp strictly newer than
/// `first`, if any. Unparseable timestamps are ignored.
///
/// The aggregate reports the first record's time as the latest; this is
/// used to flag feeds where that does not hold.
pub fn find_newer_than_first<'a, I>(first: &str, rest: I) -> Option<(usize, &'a str)>
where
    I: IntoIterator<Item = (usize, &'a str)>,
{
    let first = parse_data_time(first).ok()?;
    rest.into_iter()
        .find(|(_, text)| parse_data_time(text).map(|t| t > first).unwrap_or(false))
}
