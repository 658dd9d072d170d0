//! Ghana mobile number helpers
//!
//! Canonical wire format is `+233` followed by 9 local digits. Every function
//! here is total over strings: nothing panics and nothing returns an error.

/// Number of digits in a Ghana mobile number without the country code.
pub const LOCAL_NUMBER_LENGTH: usize = 9;

/// Country code prefix used in the canonical form.
pub const GHANA_COUNTRY_CODE: &str = "+233";

const LOCAL_VALID_PREFIXES: [char; 3] = ['2', '3', '5'];

/// Strip every non-digit character.
pub fn digits_only(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// True when the input holds exactly 9 digits starting with 2, 3 or 5.
pub fn is_valid_ghana_mobile(input: &str) -> bool {
    let digits = digits_only(input);
    digits.len() == LOCAL_NUMBER_LENGTH
        && digits
            .chars()
            .next()
            .is_some_and(|first| LOCAL_VALID_PREFIXES.contains(&first))
}

/// Live input formatting: up to 9 digits grouped as `XX XXX XXXX`.
pub fn format_for_display(input: &str) -> String {
    let digits = digits_only(input);
    let mut buffer = String::with_capacity(LOCAL_NUMBER_LENGTH + 2);

    for (i, digit) in digits.chars().take(LOCAL_NUMBER_LENGTH).enumerate() {
        buffer.push(digit);
        if i == 1 || i == 4 {
            buffer.push(' ');
        }
    }

    buffer.trim_end().to_string()
}

/// Canonicalize to `+233XXXXXXXXX`.
///
/// Resolution order matters: a 10-digit local number with a leading zero is
/// checked before the bare 9-digit case.
pub fn normalize_ghana_phone(input: &str) -> String {
    let trimmed = input.trim();
    let digits = digits_only(trimmed);
    if digits.is_empty() {
        return trimmed.to_string();
    }

    if digits.starts_with("233") && digits.len() == 12 {
        return format!("+{digits}");
    }

    if let Some(local) = digits.strip_prefix('0') {
        if digits.len() == LOCAL_NUMBER_LENGTH + 1 {
            return format!("{GHANA_COUNTRY_CODE}{local}");
        }
    }

    if digits.len() == LOCAL_NUMBER_LENGTH {
        return format!("{GHANA_COUNTRY_CODE}{digits}");
    }

    if trimmed.starts_with('+') {
        return trimmed.to_string();
    }

    format!("+{digits}")
}

/// Insert a space after the country code for display.
///
/// Only the first occurrence of `+233` is touched and no digits are hidden.
pub fn mask_for_display(normalized: &str) -> String {
    normalized.replacen(GHANA_COUNTRY_CODE, &format!("{GHANA_COUNTRY_CODE} "), 1)
}

/// Local part of whatever the user typed: the last 9 digits when there are
/// at least 9, otherwise every digit.
pub fn local_digits(input: &str) -> String {
    let digits = digits_only(input);
    if digits.len() >= LOCAL_NUMBER_LENGTH {
        digits[digits.len() - LOCAL_NUMBER_LENGTH..].to_string()
    } else {
        digits
    }
}
