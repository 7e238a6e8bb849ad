//! Input validation functions
//!
//! Field-level rules used both by `validator` derive attributes on the
//! request types and directly by the backend services.

use crate::errors::FieldError;
use crate::types::IngredientAmount;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::borrow::Cow;
use std::collections::HashSet;
use validator::ValidationError;

/// Smallest accepted cooking time, in minutes
pub const MIN_COOKING_TIME: i32 = 1;

/// Smallest accepted ingredient amount
pub const MIN_AMOUNT: i32 = 1;

/// Usernames reserved by the routing layer
pub const RESERVED_USERNAMES: &[&str] = &["me"];

static USERNAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\w.@+-]+$").expect("username pattern is valid")
});

fn error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Validate a username: letters, digits and `. @ + - _`, not reserved
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if !USERNAME_RE.is_match(username) {
        return Err(error(
            "username_format",
            "Username may only contain letters, digits and . @ + - _",
        ));
    }
    if RESERVED_USERNAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(username))
    {
        return Err(error("username_reserved", "This username is reserved"));
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < 8 {
        return Err(error(
            "password_too_short",
            "Password must be at least 8 characters",
        ));
    }
    if password.chars().count() > 128 {
        return Err(error("password_too_long", "Password too long"));
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err(error(
            "password_numeric",
            "Password cannot be entirely numeric",
        ));
    }
    Ok(())
}

/// Validate the ingredient list of a recipe payload.
///
/// The list must be non-empty, reference each ingredient once, and carry
/// amounts of at least [`MIN_AMOUNT`].
pub fn validate_ingredient_amounts(items: &[IngredientAmount]) -> Result<(), FieldError> {
    if items.is_empty() {
        return Err(FieldError::new(
            "ingredients",
            "At least one ingredient is required",
        ));
    }

    let mut seen = HashSet::with_capacity(items.len());
    let mut duplicates: Vec<i64> = items
        .iter()
        .filter(|item| !seen.insert(item.id))
        .map(|item| item.id)
        .collect();
    if !duplicates.is_empty() {
        duplicates.sort_unstable();
        duplicates.dedup();
        let ids = duplicates
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(FieldError::new(
            "ingredients",
            format!("Ingredients must not repeat. Duplicates: {}", ids),
        ));
    }

    if let Some(item) = items.iter().find(|item| item.amount < MIN_AMOUNT) {
        return Err(FieldError::new(
            "ingredients",
            format!(
                "Amount for ingredient {} must be at least {}",
                item.id, MIN_AMOUNT
            ),
        ));
    }

    Ok(())
}

/// Validate cooking time in minutes
pub fn validate_cooking_time(minutes: i32) -> Result<(), FieldError> {
    if minutes < MIN_COOKING_TIME {
        return Err(FieldError::new(
            "cooking_time",
            format!("Cooking time must be at least {} minute", MIN_COOKING_TIME),
        ));
    }
    Ok(())
}

/// Boolean query flags: only `1`, `true` and `True` count as set
pub fn is_truthy(value: &str) -> bool {
    matches!(value, "1" | "true" | "True")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn amount(id: i64, amount: i32) -> IngredientAmount {
        IngredientAmount { id, amount }
    }

    #[rstest]
    #[case("chef", true)]
    #[case("chef.anna+1@home", true)]
    #[case("under_score-dash", true)]
    #[case("has space", false)]
    #[case("semi;colon", false)]
    #[case("", false)]
    #[case("me", false)]
    #[case("ME", false)]
    fn test_validate_username(#[case] username: &str, #[case] valid: bool) {
        assert_eq!(validate_username(username).is_ok(), valid);
    }

    #[rstest]
    #[case("short", false)]
    #[case("12345678", false)]
    #[case("tomato-soup", true)]
    #[case("pässwörd1", true)]
    fn test_validate_password(#[case] password: &str, #[case] valid: bool) {
        assert_eq!(validate_password(password).is_ok(), valid);
    }

    #[test]
    fn test_empty_ingredients_rejected() {
        let err = validate_ingredient_amounts(&[]).unwrap_err();
        assert_eq!(err.field, "ingredients");
    }

    #[test]
    fn test_duplicate_ingredients_reported_once() {
        let items = [amount(3, 1), amount(5, 2), amount(3, 4), amount(3, 1)];
        let err = validate_ingredient_amounts(&items).unwrap_err();
        assert!(err.message.ends_with("Duplicates: 3"));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let err = validate_ingredient_amounts(&[amount(1, 2), amount(2, 0)]).unwrap_err();
        assert!(err.message.contains("ingredient 2"));
    }

    #[test]
    fn test_valid_ingredients_accepted() {
        assert!(validate_ingredient_amounts(&[amount(1, 200), amount(2, 1)]).is_ok());
    }

    #[rstest]
    #[case(0, false)]
    #[case(-10, false)]
    #[case(1, true)]
    #[case(90, true)]
    fn test_validate_cooking_time(#[case] minutes: i32, #[case] valid: bool) {
        assert_eq!(validate_cooking_time(minutes).is_ok(), valid);
    }

    #[rstest]
    #[case("1", true)]
    #[case("true", true)]
    #[case("True", true)]
    #[case("0", false)]
    #[case("false", false)]
    #[case("TRUE", false)]
    #[case("", false)]
    fn test_is_truthy(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(is_truthy(value), expected);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Distinct ids with positive amounts always validate
        #[test]
        fn prop_distinct_positive_ingredients_valid(
            ids in prop::collection::hash_set(1i64..10_000, 1..30),
            amount_value in 1i32..10_000
        ) {
            let items: Vec<_> = ids.into_iter().map(|id| amount(id, amount_value)).collect();
            prop_assert!(validate_ingredient_amounts(&items).is_ok());
        }

        /// Repeating any id is always rejected
        #[test]
        fn prop_repeated_ingredient_rejected(
            ids in prop::collection::vec(1i64..10_000, 1..30),
            pick in any::<prop::sample::Index>()
        ) {
            let mut items: Vec<_> = ids.iter().map(|id| amount(*id, 1)).collect();
            let repeated = items[pick.index(items.len())].clone();
            items.push(repeated);
            prop_assert!(validate_ingredient_amounts(&items).is_err());
        }

        #[test]
        fn prop_word_usernames_valid(username in "[a-zA-Z0-9_.@+-]{3,150}") {
            prop_assert!(validate_username(&username).is_ok());
        }
    }
}
