//! Chilean RUT (Rol Único Tributario) check-digit validation.
//!
//! A RUT is a numeric body followed by a check character, usually written
//! `12.345.678-5`. The check character is `0`-`9` or `K`.

/// Splits a RUT into its digit body and uppercased check character.
///
/// Dots, dashes and spaces are ignored. Returns `None` when the body is empty
/// or contains anything but ASCII digits.
pub fn split_rut(rut: &str) -> Option<(String, char)> {
    let cleaned: String = rut
        .chars()
        .filter(|c| !matches!(c, '.' | '-' | ' '))
        .collect::<String>()
        .to_uppercase();

    let check = cleaned.chars().last()?;
    let body = &cleaned[..cleaned.len() - check.len_utf8()];
    if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some((body.to_string(), check))
}

/// The check character for a digit body, or `None` if `body` is not all digits.
///
/// Digits are weighted 2, 3, 4, 5, 6, 7, 2, 3, ... starting from the least
/// significant one. `11 - sum % 11` gives the check value, with 11 written
/// as `0` and 10 as `K`.
pub fn check_digit(body: &str) -> Option<char> {
    let mut sum = 0u32;
    for (position, c) in body.chars().rev().enumerate() {
        let digit = c.to_digit(10)?;
        let weight = 2 + (position as u32 % 6);
        sum += digit * weight;
    }

    Some(match 11 - sum % 11 {
        11 => '0',
        10 => 'K',
        n => char::from_digit(n, 10)?,
    })
}

/// Whether `rut` carries the correct check character.
pub fn is_valid_rut(rut: &str) -> bool {
    match split_rut(rut) {
        Some((body, check)) => check_digit(&body) == Some(check),
        None => false,
    }
}

/// Canonical `BODY-C` form, e.g. `12345678-5`.
pub fn format_rut(rut: &str) -> Option<String> {
    split_rut(rut).map(|(body, check)| format!("{}-{}", body, check))
}
