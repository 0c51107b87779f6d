// Schedule parsing and next fire time calculation
//
// Cron expressions are accepted in the common five-field form (minute precision)
// as well as the six/seven-field forms with seconds and year understood by the
// `cron` crate.

use crate::errors::ScheduleError;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule as CronSchedule;
use std::str::FromStr;

/// Parse and validate a cron expression
pub fn parse_cron_expression(expression: &str) -> Result<CronSchedule, ScheduleError> {
    let normalized = normalize_expression(expression);

    CronSchedule::from_str(&normalized).map_err(|e| ScheduleError::InvalidCronExpression {
        expression: expression.to_string(),
        reason: e.to_string(),
    })
}

/// Rewrite a five-field crontab expression into the `cron` crate's dialect
///
/// A zero seconds field is prepended and day-of-week numbers are shifted from
/// crontab numbering (0 or 7 = Sunday) to the crate's (1 = Sunday).
fn normalize_expression(expression: &str) -> String {
    let trimmed = expression.trim();

    if trimmed.starts_with('@') {
        return trimmed.to_string();
    }

    let fields: Vec<&str> = trimmed.split_whitespace().collect();
    match fields.as_slice() {
        [minute, hour, day, month, weekday] => format!(
            "0 {} {} {} {} {}",
            minute,
            hour,
            day,
            month,
            translate_day_of_week(weekday)
        ),
        _ => trimmed.to_string(),
    }
}

/// Translate a crontab day-of-week field, item by item
///
/// Numeric items (values, ranges, steps) are expanded into an explicit list of
/// `cron` crate day numbers. Names such as `MON-FRI`, and anything that does
/// not parse, are passed through for the crate to accept or reject.
fn translate_day_of_week(field: &str) -> String {
    field
        .split(',')
        .map(translate_day_of_week_item)
        .collect::<Vec<_>>()
        .join(",")
}

fn translate_day_of_week_item(item: &str) -> String {
    let (range, step) = match item.split_once('/') {
        Some((range, step)) => (range, Some(step)),
        None => (item, None),
    };

    let step = match step.map(str::parse::<u32>) {
        None => 1,
        Some(Ok(step)) if step > 0 => step,
        _ => return item.to_string(),
    };

    let bounds: Option<(u32, u32)> = match (range, range.split_once('-')) {
        ("*", _) if step == 1 => return item.to_string(),
        ("*", _) => Some((0, 6)),
        (_, Some((low, high))) => low.parse().ok().zip(high.parse().ok()),
        // `n/step` runs from n to the end of the week
        (_, None) if item.contains('/') => range.parse().ok().map(|low: u32| (low, low.max(6))),
        (_, None) => range.parse().ok().map(|day| (day, day)),
    };

    let Some((low, high)) = bounds.filter(|&(low, high)| low <= high && high <= 7) else {
        return item.to_string();
    };

    let mut days: Vec<u32> = (low..=high)
        .step_by(step as usize)
        .map(|day| day % 7 + 1)
        .collect();
    days.sort_unstable();
    days.dedup();

    days.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Calculate the next fire time strictly after `after`
///
/// The expression is evaluated in `timezone`; the result is returned in UTC.
pub fn next_fire_time(
    schedule: &CronSchedule,
    timezone: Tz,
    after: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let reference_in_tz = after.with_timezone(&timezone);

    schedule
        .after(&reference_in_tz)
        .next()
        .map(|next| next.with_timezone(&Utc))
}

/// Validate that an expression parses and has at least one upcoming fire time
pub fn validate_cron_expression(
    expression: &str,
    timezone: Tz,
) -> Result<CronSchedule, ScheduleError> {
    let schedule = parse_cron_expression(expression)?;

    if next_fire_time(&schedule, timezone, Utc::now()).is_none() {
        return Err(ScheduleError::NoUpcomingFire {
            expression: expression.to_string(),
        });
    }

    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike, Weekday};

    #[test]
    fn test_parse_five_field_expression() {
        assert!(parse_cron_expression("*/5 * * * *").is_ok());
    }

    #[test]
    fn test_parse_six_field_expression() {
        assert!(parse_cron_expression("*/10 * * * * *").is_ok());
    }

    #[test]
    fn test_parse_shorthand_expression() {
        assert!(parse_cron_expression("@hourly").is_ok());
    }

    #[test]
    fn test_parse_invalid_cron_expression() {
        let result = parse_cron_expression("invalid");
        assert!(matches!(
            result,
            Err(ScheduleError::InvalidCronExpression { .. })
        ));
    }

    #[test]
    fn test_parse_empty_expression() {
        assert!(parse_cron_expression("").is_err());
    }

    #[test]
    fn test_five_field_fires_on_minute_boundary() {
        let schedule = parse_cron_expression("*/5 * * * *").unwrap();
        let after = Utc.with_ymd_and_hms(2024, 1, 1, 10, 2, 30).unwrap();

        let next = next_fire_time(&schedule, Tz::UTC, after).unwrap();

        assert_eq!(next, Utc.with_ymd_and_hms(2024, 1, 1, 10, 5, 0).unwrap());
        assert_eq!(next.second(), 0);
    }

    #[test]
    fn test_next_fire_time_respects_timezone() {
        // 09:00 daily in Ho Chi Minh City (UTC+7) is 02:00 UTC
        let schedule = parse_cron_expression("0 9 * * *").unwrap();
        let after = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let next = next_fire_time(&schedule, chrono_tz::Asia::Ho_Chi_Minh, after).unwrap();

        assert_eq!(next, Utc.with_ymd_and_hms(2024, 1, 1, 2, 0, 0).unwrap());
    }

    #[test]
    fn test_validate_expression_without_upcoming_fire() {
        let result = validate_cron_expression("0 0 0 1 1 * 2000", Tz::UTC);
        assert!(matches!(result, Err(ScheduleError::NoUpcomingFire { .. })));
    }

    /// Saturday 2024-01-06 12:00 UTC
    fn saturday_noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 6, 12, 0, 0).unwrap()
    }

    fn upcoming_weekdays(expression: &str, count: usize) -> Vec<Weekday> {
        let schedule = parse_cron_expression(expression).unwrap();
        let mut after = saturday_noon();
        let mut weekdays = Vec::new();
        for _ in 0..count {
            after = next_fire_time(&schedule, Tz::UTC, after).unwrap();
            weekdays.push(after.weekday());
        }
        weekdays
    }

    #[test]
    fn test_day_of_week_zero_is_sunday() {
        assert_eq!(upcoming_weekdays("0 9 * * 0", 2), vec![Weekday::Sun, Weekday::Sun]);

        let schedule = parse_cron_expression("* * * * 0").unwrap();
        let next = next_fire_time(&schedule, Tz::UTC, saturday_noon()).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 1, 7, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_day_of_week_seven_is_sunday() {
        assert_eq!(upcoming_weekdays("0 9 * * 7", 1), vec![Weekday::Sun]);
    }

    #[test]
    fn test_day_of_week_weekday_range() {
        assert_eq!(
            upcoming_weekdays("0 9 * * 1-5", 6),
            vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Mon,
            ]
        );
    }

    #[test]
    fn test_day_of_week_names_pass_through() {
        assert_eq!(upcoming_weekdays("0 9 * * MON-FRI", 2), vec![Weekday::Mon, Weekday::Tue]);
    }

    #[test]
    fn test_translate_day_of_week() {
        assert_eq!(translate_day_of_week("*"), "*");
        assert_eq!(translate_day_of_week("0"), "1");
        assert_eq!(translate_day_of_week("7"), "1");
        assert_eq!(translate_day_of_week("1-5"), "2,3,4,5,6");
        assert_eq!(translate_day_of_week("5-7"), "1,6,7");
        assert_eq!(translate_day_of_week("0,6"), "1,7");
        assert_eq!(translate_day_of_week("*/2"), "1,3,5,7");
        assert_eq!(translate_day_of_week("1-5/2"), "2,4,6");
        assert_eq!(translate_day_of_week("3/2"), "4,6");
        assert_eq!(translate_day_of_week("SUN,MON"), "SUN,MON");
        assert_eq!(translate_day_of_week("8"), "8");
    }

    #[test]
    fn test_day_of_week_out_of_range_is_rejected() {
        assert!(parse_cron_expression("0 9 * * 8").is_err());
    }

    #[test]
    fn test_six_field_expression_is_not_translated() {
        // Seconds-precision expressions already use the crate's numbering
        assert_eq!(normalize_expression("0 0 9 * * 2"), "0 0 9 * * 2");
    }
}
