// Utility functions
use crate::model::DATE_FORMAT;
use chrono::NaiveDate;

/// Drops every non-ASCII character, keeping the rest in order.
pub fn to_ascii(text: &str) -> String {
    text.chars().filter(char::is_ascii).collect()
}

/// Parses a `YYYY-MM-DD` date key.
pub fn parse_date(date_str: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(date_str.trim(), DATE_FORMAT)
}
