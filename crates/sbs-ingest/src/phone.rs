//! Contact normalization.

/// Formats Korean phone numbers by digit count.
///
/// 11 digits become `3-4-4`, 10 digits `3-3-4`. Anything else is returned
/// unchanged so the contact still groups by its raw text.
pub fn format_phone_number(value: &str) -> String {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        11 => format!("{}-{}-{}", &digits[..3], &digits[3..7], &digits[7..]),
        10 => format!("{}-{}-{}", &digits[..3], &digits[3..6], &digits[6..]),
        _ => value.to_string(),
    }
}
