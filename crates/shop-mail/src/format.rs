//! Formatting helpers shared by the notification templates.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime};

/// Japan Standard Time, used when a timestamp carries an explicit offset
const JST_OFFSET_SECS: i32 = 9 * 3600;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Mask all but the last group of a `"1234 5678 9012 3456"` card number.
///
/// Input that is not exactly four space-separated groups is returned as is.
pub fn mask_card_number(card_number: &str) -> String {
    if card_number.is_empty() {
        return String::new();
    }

    let groups: Vec<&str> = card_number.split(' ').collect();
    match groups.as_slice() {
        [_, _, _, last] => format!("**** **** **** {}", last),
        _ => card_number.to_string(),
    }
}

fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        let jst = FixedOffset::east_opt(JST_OFFSET_SECS)?;
        return Some(ts.with_timezone(&jst).date_naive());
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
        })
}

/// Render a date as `2024年1月5日`.
///
/// Offset timestamps are shown in Japan time. Unparseable input is
/// returned unchanged.
pub fn format_date(input: &str) -> String {
    match parse_date(input) {
        Some(date) => format!("{}年{}月{}日", date.year(), date.month(), date.day()),
        None => input.to_string(),
    }
}

/// Escape text for interpolation into an HTML body
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_card_number() {
        assert_eq!(mask_card_number("1234 5678 9012 3456"), "**** **** **** 3456");
        assert_eq!(mask_card_number(""), "");
        assert_eq!(mask_card_number("1234567890123456"), "1234567890123456");
        assert_eq!(mask_card_number("1234 5678 9012"), "1234 5678 9012");
        assert_eq!(
            mask_card_number("1234 5678 9012 3456 7890"),
            "1234 5678 9012 3456 7890"
        );
        assert_eq!(mask_card_number("1234-5678-9012-3456"), "1234-5678-9012-3456");
    }

    #[test]
    fn test_format_plain_date() {
        assert_eq!(format_date("2024-01-05"), "2024年1月5日");
        assert_eq!(format_date("2024/12/31"), "2024年12月31日");
    }

    #[test]
    fn test_format_datetime() {
        assert_eq!(format_date("2024-01-15T14:30"), "2024年1月15日");
        assert_eq!(format_date("2024-01-15 09:00:00"), "2024年1月15日");
    }

    #[test]
    fn test_format_offset_timestamp_in_japan_time() {
        // 20:00 UTC on Jan 31 is already Feb 1 in Japan
        assert_eq!(format_date("2024-01-31T20:00:00Z"), "2024年2月1日");
        assert_eq!(format_date("2024-01-31T20:00:00+09:00"), "2024年1月31日");
    }

    #[test]
    fn test_unparseable_date_is_unchanged() {
        assert_eq!(format_date("来週の土曜日"), "来週の土曜日");
        assert_eq!(format_date(""), "");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Rose" & 'Lily'</b>"#),
            "&lt;b&gt;&quot;Rose&quot; &amp; &#39;Lily&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_html("山田 花子"), "山田 花子");
    }
}
