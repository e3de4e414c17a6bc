//! Date and time templates for rendered page links.
//!
//! Workflowy stores timestamps as seconds since its own epoch; [`workflowy_to_datetime`]
//! shifts them onto the unix epoch and into [`WORKFLOWY_TIME_ZONE`] before formatting.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use chrono_tz::Tz;

/// Offset between the Workflowy epoch and the unix epoch, in seconds
pub const WF_EPOCH_SECONDS: i64 = 1_350_385_936;

/// Zone Workflowy displays dates in
pub const WORKFLOWY_TIME_ZONE: Tz = chrono_tz::America::Los_Angeles;

option_enum! {
    /// Date templates accepted by `dateFormat`
    pub enum DateFormat {
        ShortWeekdayMdySlash => "E, MM/dd/yyyy",
        ShortWeekdayMdyDash => "E, MM-dd-yyyy",
        ShortWeekdayMdyDot => "E, MM.dd.yyyy",
        ShortWeekdayYmdSlash => "E, yyyy/MM/dd",
        AbbrevWeekdayMdySlash => "EEE, MM/dd/yyyy",
        AbbrevWeekdayMdyDash => "EEE, MM-dd-yyyy",
        AbbrevWeekdayMdyDot => "EEE, MM.dd.yyyy",
        AbbrevWeekdayYmdSlash => "EEE, yyyy/MM/dd",
        LongWeekdayMdySlash => "EEEE, MM/dd/yyyy",
        LongWeekdayMdyDash => "EEEE, MM-dd-yyyy",
        LongWeekdayMdyDot => "EEEE, MM.dd.yyyy",
        LongWeekdayYmdSlash => "EEEE, yyyy/MM/dd",
        MdyDash => "MM-dd-yyyy",
        MdySlash => "MM/dd/yyyy",
        ShortMonthOrdinal => "MMM do, yyyy",
        LongMonthOrdinal => "MMMM do, yyyy",
        MdyUnderscore => "MM_dd_yyyy",
        DmyDash => "dd-MM-yyyy",
        OrdinalShortMonth => "do MMM yyyy",
        OrdinalLongMonth => "do MMMM yyyy",
        Iso => "yyyy-MM-dd",
        IsoLongWeekday => "yyyy-MM-dd EEEE",
        YmdSlash => "yyyy/MM/dd",
        Compact => "yyyyMMdd",
        YmdUnderscore => "yyyy_MM_dd",
        Cjk => "yyyy年MM月dd日",
    }
}

option_enum! {
    /// Time templates accepted by `timeFormat`
    pub enum TimeFormat {
        TwentyFourHourPadded => "HH:mm",
        TwentyFourHour => "H:mm",
        TwelveHourUpper => "h:mm A",
        TwelveHourLower => "h:mm a",
        UnixSeconds => "X",
        UnixMillis => "x",
    }
}

impl Default for DateFormat {
    fn default() -> Self {
        DateFormat::Iso
    }
}

impl Default for TimeFormat {
    fn default() -> Self {
        TimeFormat::TwentyFourHourPadded
    }
}

/// Placeholder for the ordinal day inside a strftime pattern
const ORDINAL: &str = "{ord}";

impl DateFormat {
    fn strftime(self) -> &'static str {
        match self {
            DateFormat::ShortWeekdayMdySlash | DateFormat::AbbrevWeekdayMdySlash => "%a, %m/%d/%Y",
            DateFormat::ShortWeekdayMdyDash | DateFormat::AbbrevWeekdayMdyDash => "%a, %m-%d-%Y",
            DateFormat::ShortWeekdayMdyDot | DateFormat::AbbrevWeekdayMdyDot => "%a, %m.%d.%Y",
            DateFormat::ShortWeekdayYmdSlash | DateFormat::AbbrevWeekdayYmdSlash => "%a, %Y/%m/%d",
            DateFormat::LongWeekdayMdySlash => "%A, %m/%d/%Y",
            DateFormat::LongWeekdayMdyDash => "%A, %m-%d-%Y",
            DateFormat::LongWeekdayMdyDot => "%A, %m.%d.%Y",
            DateFormat::LongWeekdayYmdSlash => "%A, %Y/%m/%d",
            DateFormat::MdyDash => "%m-%d-%Y",
            DateFormat::MdySlash => "%m/%d/%Y",
            DateFormat::ShortMonthOrdinal => "%b {ord}, %Y",
            DateFormat::LongMonthOrdinal => "%B {ord}, %Y",
            DateFormat::MdyUnderscore => "%m_%d_%Y",
            DateFormat::DmyDash => "%d-%m-%Y",
            DateFormat::OrdinalShortMonth => "{ord} %b %Y",
            DateFormat::OrdinalLongMonth => "{ord} %B %Y",
            DateFormat::Iso => "%Y-%m-%d",
            DateFormat::IsoLongWeekday => "%Y-%m-%d %A",
            DateFormat::YmdSlash => "%Y/%m/%d",
            DateFormat::Compact => "%Y%m%d",
            DateFormat::YmdUnderscore => "%Y_%m_%d",
            DateFormat::Cjk => "%Y年%m月%d日",
        }
    }

    /// Render a calendar date with this template
    pub fn format(self, date: NaiveDate) -> String {
        let rendered = date.format(self.strftime()).to_string();
        if rendered.contains(ORDINAL) {
            rendered.replace(ORDINAL, &ordinal_day(date))
        } else {
            rendered
        }
    }
}

impl TimeFormat {
    /// Render the time of day (or the timestamp, for `X`/`x`)
    pub fn format(self, at: NaiveDateTime) -> String {
        match self {
            TimeFormat::TwentyFourHourPadded => at.format("%H:%M").to_string(),
            TimeFormat::TwentyFourHour => at.format("%-H:%M").to_string(),
            TimeFormat::TwelveHourUpper => at.format("%-I:%M %p").to_string(),
            TimeFormat::TwelveHourLower => at.format("%-I:%M %P").to_string(),
            TimeFormat::UnixSeconds => at.and_utc().timestamp().to_string(),
            TimeFormat::UnixMillis => at.and_utc().timestamp_millis().to_string(),
        }
    }
}

/// English ordinal suffix for a day of the month
pub fn ordinal_suffix(day: u32) -> &'static str {
    match day % 100 {
        11..=13 => "th",
        _ => match day % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    }
}

fn ordinal_day(date: NaiveDate) -> String {
    use chrono::Datelike;
    let day = date.day();
    format!("{}{}", day, ordinal_suffix(day))
}

/// Convert a Workflowy timestamp (seconds since its epoch) into local Workflowy time
pub fn workflowy_to_datetime(seconds: i64) -> Option<DateTime<Tz>> {
    DateTime::from_timestamp(seconds.checked_add(WF_EPOCH_SECONDS)?, 0)
        .map(|at| at.with_timezone(&WORKFLOWY_TIME_ZONE))
}

/// Convert a Workflowy timestamp into unix milliseconds
pub fn workflowy_to_unix_millis(seconds: i64) -> i64 {
    seconds.saturating_add(WF_EPOCH_SECONDS).saturating_mul(1000)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sept_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 1).unwrap()
    }

    #[test]
    fn test_date_templates() {
        let date = sept_first();
        assert_eq!(DateFormat::ShortWeekdayMdySlash.format(date), "Sun, 09/01/2024");
        assert_eq!(DateFormat::AbbrevWeekdayMdyDot.format(date), "Sun, 09.01.2024");
        assert_eq!(DateFormat::LongWeekdayYmdSlash.format(date), "Sunday, 2024/09/01");
        assert_eq!(DateFormat::ShortMonthOrdinal.format(date), "Sep 1st, 2024");
        assert_eq!(DateFormat::OrdinalLongMonth.format(date), "1st September 2024");
        assert_eq!(DateFormat::IsoLongWeekday.format(date), "2024-09-01 Sunday");
        assert_eq!(DateFormat::Compact.format(date), "20240901");
        assert_eq!(DateFormat::Cjk.format(date), "2024年09月01日");
    }

    #[test]
    fn test_every_template_parses_back() {
        assert_eq!(DateFormat::ALL.len(), 26);
        for format in DateFormat::ALL {
            assert_eq!(format.as_str().parse::<DateFormat>().unwrap(), *format);
        }
        assert!("yyyy.MM.dd".parse::<DateFormat>().is_err());
    }

    #[test]
    fn test_ordinal_suffix() {
        assert_eq!(ordinal_suffix(1), "st");
        assert_eq!(ordinal_suffix(2), "nd");
        assert_eq!(ordinal_suffix(3), "rd");
        assert_eq!(ordinal_suffix(4), "th");
        assert_eq!(ordinal_suffix(11), "th");
        assert_eq!(ordinal_suffix(12), "th");
        assert_eq!(ordinal_suffix(13), "th");
        assert_eq!(ordinal_suffix(21), "st");
        assert_eq!(ordinal_suffix(22), "nd");
        assert_eq!(ordinal_suffix(31), "st");
    }

    #[test]
    fn test_time_templates() {
        let at = NaiveDate::from_ymd_opt(2024, 10, 31)
            .unwrap()
            .and_hms_opt(8, 53, 0)
            .unwrap();
        assert_eq!(TimeFormat::TwentyFourHourPadded.format(at), "08:53");
        assert_eq!(TimeFormat::TwentyFourHour.format(at), "8:53");
        assert_eq!(TimeFormat::TwelveHourUpper.format(at), "8:53 AM");
        assert_eq!(TimeFormat::TwelveHourLower.format(at), "8:53 am");
        assert_eq!(TimeFormat::UnixSeconds.format(at), "1730364780");
        assert_eq!(TimeFormat::UnixMillis.format(at), "1730364780000");
    }

    #[test]
    fn test_workflowy_epoch() {
        let at = workflowy_to_datetime(376_165_087).unwrap();
        assert_eq!(DateFormat::LongMonthOrdinal.format(at.date_naive()), "September 16th, 2024");
        assert_eq!(workflowy_to_unix_millis(0), 1_350_385_936_000);
    }

    #[test]
    fn test_evening_completion_stays_on_pacific_day() {
        // 2024-09-17 05:30:23 UTC
        let at = workflowy_to_datetime(376_165_087).unwrap();
        assert_eq!(at.naive_utc().date(), NaiveDate::from_ymd_opt(2024, 9, 17).unwrap());
        assert_eq!(at.date_naive(), NaiveDate::from_ymd_opt(2024, 9, 16).unwrap());
        assert_eq!(at.format("%H:%M").to_string(), "22:30");
    }
}
