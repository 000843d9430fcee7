//! Date and time functions
//!
//! Dates travel as ISO 8601 text (`2025-11-03`, `2025-11-04 11:30:30.861096+00:00`).
//! Components are read in the offset the value was written in.

use super::single_arg;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SecondsFormat, Timelike, Utc};
use tessera_core::{FormulaError, FormulaResult, FormulaValue, RuntimeContext};

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO date or datetime
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(dt.naive_local());
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn datetime_arg(name: &str, args: &[FormulaValue]) -> FormulaResult<NaiveDateTime> {
    let value = single_arg(name, args)?;
    let parsed = match value {
        FormulaValue::String(text) => parse_datetime(text),
        _ => None,
    };
    parsed.ok_or_else(|| {
        FormulaError::evaluation(format!(
            "{} expects a date, got {} '{}'",
            name,
            value.type_name(),
            value.as_string()
        ))
    })
}

fn component(
    name: &str,
    args: &[FormulaValue],
    extract: fn(&NaiveDateTime) -> u32,
) -> FormulaResult<FormulaValue> {
    let dt = datetime_arg(name, args)?;
    Ok(FormulaValue::Number(f64::from(extract(&dt))))
}

/// DAY(date)
pub fn fn_day(args: &[FormulaValue], _ctx: &dyn RuntimeContext) -> FormulaResult<FormulaValue> {
    component("day", args, |dt| dt.day())
}

/// MONTH(date)
pub fn fn_month(args: &[FormulaValue], _ctx: &dyn RuntimeContext) -> FormulaResult<FormulaValue> {
    component("month", args, |dt| dt.month())
}

/// YEAR(date)
pub fn fn_year(args: &[FormulaValue], _ctx: &dyn RuntimeContext) -> FormulaResult<FormulaValue> {
    let dt = datetime_arg("year", args)?;
    Ok(FormulaValue::Number(f64::from(dt.year())))
}

/// HOUR(datetime)
pub fn fn_hour(args: &[FormulaValue], _ctx: &dyn RuntimeContext) -> FormulaResult<FormulaValue> {
    component("hour", args, |dt| dt.hour())
}

/// MINUTE(datetime)
pub fn fn_minute(args: &[FormulaValue], _ctx: &dyn RuntimeContext) -> FormulaResult<FormulaValue> {
    component("minute", args, |dt| dt.minute())
}

/// SECOND(datetime)
pub fn fn_second(args: &[FormulaValue], _ctx: &dyn RuntimeContext) -> FormulaResult<FormulaValue> {
    component("second", args, |dt| dt.second())
}

/// TODAY(): the current UTC date
pub fn fn_today(_args: &[FormulaValue], _ctx: &dyn RuntimeContext) -> FormulaResult<FormulaValue> {
    let today = Utc::now().date_naive();
    Ok(FormulaValue::String(today.format("%Y-%m-%d").to_string()))
}

/// NOW(): the current UTC datetime
pub fn fn_now(_args: &[FormulaValue], _ctx: &dyn RuntimeContext) -> FormulaResult<FormulaValue> {
    Ok(FormulaValue::String(
        Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false),
    ))
}
