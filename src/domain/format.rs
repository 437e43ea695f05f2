use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::domain::entities::table::{CellContent, CellValue, RenderKind};

const MONTHS_SHORT: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
];

const MONTHS_LONG: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.naive_local());
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(parsed);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${}.{:02}", group_thousands(cents / 100), cents % 100)
}

pub fn format_short_date(value: &NaiveDateTime) -> String {
    format!(
        "{:02} {} {}",
        value.day(),
        MONTHS_SHORT[value.month0() as usize],
        value.year()
    )
}

pub fn format_long_date(value: &NaiveDateTime) -> String {
    format!(
        "{} de {} de {}, {:02}:{:02}",
        value.day(),
        MONTHS_LONG[value.month0() as usize],
        value.year(),
        value.hour(),
        value.minute()
    )
}

pub fn format_short_date_str(raw: &str) -> String {
    parse_datetime(raw)
        .map(|value| format_short_date(&value))
        .unwrap_or_else(|| "-".to_string())
}

/// Today in the `YYYY-MM-DD` form date inputs use.
pub fn today_input() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

pub fn raw_text(value: &CellValue) -> String {
    match value {
        CellValue::Empty => String::new(),
        CellValue::Text(text) => text.clone(),
        CellValue::Number(number) => format_number(*number),
        CellValue::Date(date) => date.format("%Y-%m-%d %H:%M").to_string(),
        CellValue::Bool(flag) => flag.to_string(),
    }
}

fn numeric(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Number(number) if number.is_finite() => Some(*number),
        CellValue::Text(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn truthy(value: &CellValue) -> bool {
    match value {
        CellValue::Empty => false,
        CellValue::Text(text) => !text.is_empty(),
        CellValue::Number(number) => *number != 0.0 && !number.is_nan(),
        CellValue::Date(_) => true,
        CellValue::Bool(flag) => *flag,
    }
}

pub fn format_value(kind: &RenderKind, value: &CellValue) -> CellContent {
    match kind {
        RenderKind::Text => CellContent::Text(raw_text(value)),
        RenderKind::Currency => match numeric(value) {
            Some(amount) => CellContent::Text(format_currency(amount)),
            None => CellContent::Text(raw_text(value)),
        },
        RenderKind::Date => match value {
            CellValue::Date(date) => CellContent::Text(format_short_date(date)),
            CellValue::Text(text) => parse_datetime(text)
                .map(|date| CellContent::Text(format_short_date(&date)))
                .unwrap_or(CellContent::Placeholder),
            _ => CellContent::Placeholder,
        },
        RenderKind::Boolean => CellContent::Flag(truthy(value)),
        RenderKind::Badge(palette) => match value {
            CellValue::Text(label) => CellContent::Badge {
                label: label.clone(),
                tone: palette.tone_for(label),
            },
            other => CellContent::Text(raw_text(other)),
        },
    }
}
