//! Field rules shared by the console forms.
//!
//! These mirror the server's checks so obviously bad input is caught before
//! a round trip. The server remains the authority.

use crate::error::ValidationErrors;
use regex::Regex;
use std::sync::LazyLock;

/// Minimum length of a person's name.
pub const MIN_NAME_CHARS: usize = 2;
/// Minimum length of a password.
pub const MIN_PASSWORD_CHARS: usize = 6;

pub(crate) const MSG_NAME_TOO_SHORT: &str = "Минимум 2 символа";
pub(crate) const MSG_PASSWORD_TOO_SHORT: &str = "Минимум 6 символов";
pub(crate) const MSG_INVALID_EMAIL: &str = "Некорректный email";
pub(crate) const MSG_PLOT_REQUIRED: &str = "Укажите участок";
pub(crate) const MSG_INVALID_PLATE: &str = "Неверный формат номера";
pub(crate) const MSG_WINDOW_REVERSED: &str = "Дата окончания раньше даты начала";

// Latin letters and their Cyrillic look-alikes used on plates.
#[allow(clippy::expect_used)] // Pattern is a literal
static PLATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        "^[ABEKMHOPCTYXАВЕКМНОРСТУХ][0-9]{3}[ABEKMHOPCTYXАВЕКМНОРСТУХ]{2}[0-9]{2,3}$",
    )
    .expect("plate pattern compiles")
});

/// Trim and upper-case a plate number.
///
/// # Examples
///
/// ```
/// use pipo_console_core::validation::normalize_plate;
///
/// assert_eq!(normalize_plate("  a123bc77 "), "A123BC77");
/// assert_eq!(normalize_plate("в456ор199"), "В456ОР199");
/// ```
#[must_use]
pub fn normalize_plate(input: &str) -> String {
    input.trim().to_uppercase()
}

/// Returns `true` if `input` is a valid plate after normalization.
///
/// # Examples
///
/// ```
/// use pipo_console_core::validation::is_valid_plate;
///
/// assert!(is_valid_plate("A123BC77"));
/// assert!(is_valid_plate("м001мм750"));
/// assert!(!is_valid_plate("A12BC77"));
/// assert!(!is_valid_plate("Z123BC77"));
/// ```
#[must_use]
pub fn is_valid_plate(input: &str) -> bool {
    PLATE.is_match(&normalize_plate(input))
}

/// Validate email address format.
///
/// Basic shape check only:
/// - exactly one `@` with non-empty local and domain parts
/// - domain has a dot and no empty labels
/// - length between 3 and 255 characters
///
/// # Examples
///
/// ```
/// use pipo_console_core::validation::is_valid_email;
///
/// assert!(is_valid_email("guard@pipo.local"));
/// assert!(!is_valid_email("guard@"));
/// assert!(!is_valid_email("guard"));
/// ```
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 3 || email.len() > 255 {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }

    let valid_local_chars = |c: char| c.is_alphanumeric() || matches!(c, '.' | '-' | '+' | '_');
    let valid_domain_chars = |c: char| c.is_alphanumeric() || matches!(c, '.' | '-');

    local.chars().all(valid_local_chars)
        && domain.chars().all(valid_domain_chars)
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

/// Returns `true` if `value` has at least `min` characters.
#[must_use]
pub fn has_min_chars(value: &str, min: usize) -> bool {
    value.chars().count() >= min
}

pub(crate) fn check_name(errors: &mut ValidationErrors, field: &'static str, value: &str) {
    if !has_min_chars(value, MIN_NAME_CHARS) {
        errors.add(field, MSG_NAME_TOO_SHORT);
    }
}

pub(crate) fn check_email(errors: &mut ValidationErrors, value: &str) {
    if !is_valid_email(value) {
        errors.add("email", MSG_INVALID_EMAIL);
    }
}

pub(crate) fn check_password(errors: &mut ValidationErrors, value: &str) {
    if !has_min_chars(value, MIN_PASSWORD_CHARS) {
        errors.add("password", MSG_PASSWORD_TOO_SHORT);
    }
}

pub(crate) fn check_plate(errors: &mut ValidationErrors, value: &str) {
    if !is_valid_plate(value) {
        errors.add("plate_number", MSG_INVALID_PLATE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_plate_formats() {
        assert!(is_valid_plate("A123BC77"));
        assert!(is_valid_plate("A123BC777"));
        assert!(is_valid_plate(" x999xx99 "));
        assert!(is_valid_plate("А123ВС77")); // Cyrillic letters

        assert!(!is_valid_plate(""));
        assert!(!is_valid_plate("A123BC7"));
        assert!(!is_valid_plate("A123BC7777"));
        assert!(!is_valid_plate("AA23BC77"));
        assert!(!is_valid_plate("D123BC77")); // D has no Cyrillic twin
        assert!(!is_valid_plate("Б123ВС77"));
        assert!(!is_valid_plate("A123 BC77"));
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("admin@pipo.local"));
        assert!(is_valid_email("first.last+gate@mail.example.com"));
        assert!(!is_valid_email("@pipo.local"));
        assert!(!is_valid_email("admin@@pipo.local"));
        assert!(!is_valid_email("admin@pipo"));
        assert!(!is_valid_email("admin@pipo..local"));
        assert!(!is_valid_email("a@"));
    }

    #[test]
    fn test_min_chars_counts_characters_not_bytes() {
        assert!(has_min_chars("Ян", 2));
        assert!(!has_min_chars("Я", 2));
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(input in "[a-zA-Zа-яА-Я0-9 ]{0,16}") {
            let once = normalize_plate(&input);
            prop_assert_eq!(normalize_plate(&once), once.clone());
        }

        #[test]
        fn prop_valid_plates_accept_any_case_and_padding(
            first in "[ABEKMHOPCTYX]",
            digits in "[0-9]{3}",
            series in "[ABEKMHOPCTYX]{2}",
            region in "[0-9]{2,3}",
            pad in " {0,3}",
        ) {
            let plate = format!("{pad}{first}{digits}{series}{region}{pad}").to_lowercase();
            prop_assert!(is_valid_plate(&plate));
        }
    }
}
