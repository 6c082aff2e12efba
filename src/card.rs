// 💳 Card Validator
// Brand resolution, length/prefix/CVV/expiry rules and the Luhn checksum
//
// Every failing check contributes a reason; nothing short-circuits except
// checks that have nothing to check against (no digits, no brand spec).

use crate::brands::{BrandRules, BrandSpec, CardBrand};
use crate::digits_only;
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

pub const REASON_NUMBER_REQUIRED: &str = "card number is required";
pub const REASON_UNRECOGNIZED_BRAND: &str = "unrecognized brand or card type";
pub const REASON_CVV_REQUIRED: &str = "CVV is required";
pub const REASON_MONTH_REQUIRED: &str = "expiration month is required";
pub const REASON_INVALID_MONTH: &str = "invalid expiration month";
pub const REASON_YEAR_REQUIRED: &str = "expiration year is required";
pub const REASON_INVALID_YEAR: &str = "invalid expiration year";
pub const REASON_EXPIRED: &str = "expired";
pub const REASON_LUHN: &str = "failed Luhn check";

/// How far ahead an expiration year may be
pub const MAX_YEARS_AHEAD: i64 = 20;

// ============================================================================
// INPUT / RESULT
// ============================================================================

/// Card details as received from the caller.
///
/// Every field is optional so a missing value turns into a reason
/// instead of a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardInput {
    #[serde(default)]
    pub number: Option<String>,

    /// visa | mastercard | discover | amex; inferred from the prefix when absent
    #[serde(default)]
    pub brand: Option<String>,

    #[serde(default)]
    pub cvv: Option<String>,

    /// Accepts 12 or "12"
    #[serde(default, deserialize_with = "int_or_string")]
    pub exp_month: Option<i64>,

    /// Four-digit year, or two-digit shorthand (27 → 2027)
    #[serde(default, deserialize_with = "int_or_string")]
    pub exp_year: Option<i64>,
}

/// Voice tool calls often send numbers as strings; a blank string is absent
fn int_or_string<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IntOrString {
        Int(i64),
        Text(String),
    }

    match Option::<IntOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(IntOrString::Int(n)) => Ok(Some(n)),
        Some(IntOrString::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse::<i64>()
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("expected a number, got {:?}", text)))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardValidationResult {
    pub ok: bool,
    pub reasons: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<CardBrand>,

    /// Only the last four digits ever leave the validator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_four: Option<String>,
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Validate against today's local date
pub fn validate_card(input: &CardInput) -> CardValidationResult {
    validate_card_at(input, Local::now().date_naive())
}

pub fn validate_card_at(input: &CardInput, today: NaiveDate) -> CardValidationResult {
    validate_card_with(BrandRules::standard(), input, today)
}

pub fn validate_card_with(
    rules: &BrandRules,
    input: &CardInput,
    today: NaiveDate,
) -> CardValidationResult {
    let mut reasons: Vec<String> = Vec::new();

    let digits = input.number.as_deref().map(digits_only).unwrap_or_default();
    if digits.is_empty() {
        reasons.push(REASON_NUMBER_REQUIRED.to_string());
    }

    let spec = resolve_brand(rules, input.brand.as_deref(), &digits);
    if spec.is_none() && (!digits.is_empty() || has_text(input.brand.as_deref())) {
        reasons.push(REASON_UNRECOGNIZED_BRAND.to_string());
    }

    if let Some(spec) = spec {
        if !digits.is_empty() {
            // 1. Length
            if !spec.allows_length(digits.len()) {
                reasons.push(format!("invalid card number length for {}", spec.brand));
            }

            // 2. Prefix
            if !spec.matches_prefix(&digits) {
                reasons.push(format!("card number does not match {}", spec.brand));
            }
        }
    }

    // 3. CVV (presence is checked even without a brand spec)
    match input.cvv.as_deref().map(str::trim) {
        None | Some("") => reasons.push(REASON_CVV_REQUIRED.to_string()),
        Some(cvv) => {
            if let Some(spec) = spec {
                let all_digits = cvv.chars().all(|c| c.is_ascii_digit());
                if !all_digits || cvv.len() != spec.cvv_length {
                    reasons.push(format!("invalid CVV for {}", spec.brand));
                }
            }
        }
    }

    // 4-6. Expiry
    reasons.extend(check_expiry(input.exp_month, input.exp_year, today));

    // 7. Luhn
    if !digits.is_empty() && !luhn_valid(&digits) {
        reasons.push(REASON_LUHN.to_string());
    }

    let last_four = if digits.len() >= 4 {
        Some(digits[digits.len() - 4..].to_string())
    } else {
        None
    };

    CardValidationResult {
        ok: reasons.is_empty(),
        reasons,
        brand: spec.map(|s| s.brand),
        last_four,
    }
}

fn has_text(value: Option<&str>) -> bool {
    value.map(|v| !v.trim().is_empty()).unwrap_or(false)
}

/// Explicit brand wins; otherwise infer from the digit prefix
fn resolve_brand<'a>(
    rules: &'a BrandRules,
    brand: Option<&str>,
    digits: &str,
) -> Option<&'a BrandSpec> {
    match brand.map(str::trim).filter(|b| !b.is_empty()) {
        Some(name) => name
            .parse::<CardBrand>()
            .ok()
            .and_then(|brand| rules.spec_for(brand)),
        None if digits.is_empty() => None,
        None => rules.infer(digits),
    }
}

/// Two-digit years are read as 20xx
fn normalize_year(year: i64) -> i64 {
    if (0..100).contains(&year) {
        2000 + year
    } else {
        year
    }
}

fn check_expiry(month: Option<i64>, year: Option<i64>, today: NaiveDate) -> Vec<String> {
    let mut reasons = Vec::new();
    let current_year = today.year() as i64;
    let current_month = today.month() as i64;

    let month_valid = match month {
        None => {
            reasons.push(REASON_MONTH_REQUIRED.to_string());
            false
        }
        Some(m) if !(1..=12).contains(&m) => {
            reasons.push(REASON_INVALID_MONTH.to_string());
            false
        }
        Some(_) => true,
    };

    let year = year.map(normalize_year);
    let year_valid = match year {
        None => {
            reasons.push(REASON_YEAR_REQUIRED.to_string());
            false
        }
        Some(y) if y < current_year || y > current_year + MAX_YEARS_AHEAD => {
            reasons.push(REASON_INVALID_YEAR.to_string());
            false
        }
        Some(_) => true,
    };

    if let (true, true, Some(m), Some(y)) = (month_valid, year_valid, month, year) {
        if y == current_year && m < current_month {
            reasons.push(REASON_EXPIRED.to_string());
        }
    }

    reasons
}

// ============================================================================
// LUHN
// ============================================================================

/// Luhn checksum over a digit string. Empty or non-digit input is invalid.
pub fn luhn_valid(digits: &str) -> bool {
    if digits.is_empty() {
        return false;
    }

    let mut sum = 0u32;
    for (i, c) in digits.chars().rev().enumerate() {
        let Some(mut d) = c.to_digit(10) else {
            return false;
        };

        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }

    sum % 10 == 0
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()
    }

    fn visa_input() -> CardInput {
        CardInput {
            number: Some("4111 1111 1111 1111".to_string()),
            brand: None,
            cvv: Some("123".to_string()),
            exp_month: Some(12),
            exp_year: Some(2028),
        }
    }

    /// Append the digit that makes `body` Luhn-valid
    fn with_check_digit(body: &str) -> String {
        (0..10)
            .map(|d| format!("{}{}", body, d))
            .find(|candidate| luhn_valid(candidate))
            .unwrap()
    }

    #[test]
    fn test_valid_visa_inferred() {
        let result = validate_card_at(&visa_input(), today());

        assert!(result.ok, "unexpected reasons: {:?}", result.reasons);
        assert!(result.reasons.is_empty());
        assert_eq!(result.brand, Some(CardBrand::Visa));
        assert_eq!(result.last_four.as_deref(), Some("1111"));
    }

    #[test]
    fn test_any_luhn_valid_visa_16_passes() {
        for body in ["400000000000000", "412345678901234", "498765432109876", "455555555555555"] {
            let number = with_check_digit(body);
            let input = CardInput {
                number: Some(number.clone()),
                ..visa_input()
            };

            let result = validate_card_at(&input, today());
            assert!(result.ok, "{} rejected: {:?}", number, result.reasons);
            assert_eq!(result.brand, Some(CardBrand::Visa));
        }
    }

    #[test]
    fn test_luhn_known_numbers() {
        assert!(luhn_valid("4111111111111111"));
        assert!(luhn_valid("378282246310005"));
        assert!(luhn_valid("6011111111111117"));
        assert!(luhn_valid("5500000000000004"));
        assert!(!luhn_valid(""));
        assert!(!luhn_valid("4111-1111"));
    }

    #[test]
    fn test_luhn_single_digit_change_fails() {
        let valid = "4111111111111111";

        // Every position except the check digit
        for pos in 0..valid.len() - 1 {
            let mut chars: Vec<char> = valid.chars().collect();
            let d = chars[pos].to_digit(10).unwrap();
            chars[pos] = char::from_digit((d + 1) % 10, 10).unwrap();
            let mutated: String = chars.into_iter().collect();

            assert!(!luhn_valid(&mutated), "mutation at {} still passes", pos);
        }
    }

    #[test]
    fn test_valid_amex_explicit() {
        let input = CardInput {
            number: Some("3782-822463-10005".to_string()),
            brand: Some("amex".to_string()),
            cvv: Some("1234".to_string()),
            exp_month: Some(1),
            exp_year: Some(2030),
        };

        let result = validate_card_at(&input, today());
        assert!(result.ok, "unexpected reasons: {:?}", result.reasons);
        assert_eq!(result.brand, Some(CardBrand::Amex));
    }

    #[test]
    fn test_amex_requires_four_digit_cvv() {
        let input = CardInput {
            number: Some("378282246310005".to_string()),
            brand: None,
            cvv: Some("123".to_string()),
            exp_month: Some(1),
            exp_year: Some(2030),
        };

        let result = validate_card_at(&input, today());
        assert!(!result.ok);
        assert_eq!(result.reasons, vec!["invalid CVV for amex".to_string()]);
    }

    #[test]
    fn test_explicit_brand_mismatch_accumulates() {
        let input = CardInput {
            brand: Some("mastercard".to_string()),
            ..visa_input()
        };

        let result = validate_card_at(&input, today());
        assert!(!result.ok);
        assert_eq!(result.brand, Some(CardBrand::Mastercard));
        assert_eq!(
            result.reasons,
            vec!["card number does not match mastercard".to_string()]
        );
    }

    #[test]
    fn test_all_reasons_in_order() {
        let input = CardInput {
            number: Some("4111111111111112".to_string()),
            brand: Some("visa".to_string()),
            cvv: Some("12a".to_string()),
            exp_month: Some(13),
            exp_year: Some(2020),
        };

        let result = validate_card_at(&input, today());
        assert!(!result.ok);
        assert_eq!(
            result.reasons,
            vec![
                "invalid CVV for visa".to_string(),
                REASON_INVALID_MONTH.to_string(),
                REASON_INVALID_YEAR.to_string(),
                REASON_LUHN.to_string(),
            ]
        );
    }

    #[test]
    fn test_wrong_length() {
        let input = CardInput {
            number: Some(with_check_digit("41111111111111")),
            ..visa_input()
        };

        let result = validate_card_at(&input, today());
        assert_eq!(result.reasons, vec!["invalid card number length for visa".to_string()]);
    }

    #[test]
    fn test_unrecognized_brand_inferred() {
        let input = CardInput {
            number: Some("9111111111111111".to_string()),
            ..visa_input()
        };

        let result = validate_card_at(&input, today());
        assert!(!result.ok);
        assert_eq!(result.brand, None);
        assert_eq!(result.reasons[0], REASON_UNRECOGNIZED_BRAND);
    }

    #[test]
    fn test_unknown_explicit_brand() {
        let input = CardInput {
            brand: Some("diners".to_string()),
            ..visa_input()
        };

        let result = validate_card_at(&input, today());
        assert!(!result.ok);
        assert_eq!(result.reasons, vec![REASON_UNRECOGNIZED_BRAND.to_string()]);
    }

    #[test]
    fn test_expired_this_year() {
        let input = CardInput {
            exp_month: Some(5),
            exp_year: Some(2026),
            ..visa_input()
        };

        let result = validate_card_at(&input, today());
        assert_eq!(result.reasons, vec![REASON_EXPIRED.to_string()]);

        // Current month is still valid
        let input = CardInput {
            exp_month: Some(6),
            exp_year: Some(2026),
            ..visa_input()
        };
        assert!(validate_card_at(&input, today()).ok);
    }

    #[test]
    fn test_year_window() {
        let at_limit = CardInput {
            exp_year: Some(2046),
            ..visa_input()
        };
        assert!(validate_card_at(&at_limit, today()).ok);

        let past_limit = CardInput {
            exp_year: Some(2047),
            ..visa_input()
        };
        assert_eq!(
            validate_card_at(&past_limit, today()).reasons,
            vec![REASON_INVALID_YEAR.to_string()]
        );
    }

    #[test]
    fn test_two_digit_year() {
        let input = CardInput {
            exp_year: Some(28),
            ..visa_input()
        };
        assert!(validate_card_at(&input, today()).ok);
    }

    #[test]
    fn test_missing_fields_become_reasons() {
        let result = validate_card_at(&CardInput::default(), today());

        assert!(!result.ok);
        assert_eq!(
            result.reasons,
            vec![
                REASON_NUMBER_REQUIRED.to_string(),
                REASON_CVV_REQUIRED.to_string(),
                REASON_MONTH_REQUIRED.to_string(),
                REASON_YEAR_REQUIRED.to_string(),
            ]
        );
        assert_eq!(result.last_four, None);
    }

    #[test]
    fn test_deserialize_partial_json() {
        let input: CardInput = serde_json::from_str(r#"{"number": "4111111111111111"}"#).unwrap();
        assert_eq!(input.number.as_deref(), Some("4111111111111111"));
        assert!(input.cvv.is_none());
    }

    #[test]
    fn test_deserialize_expiry_as_strings() {
        let input: CardInput = serde_json::from_str(
            r#"{"number": "4111111111111111", "cvv": "123", "exp_month": " 12 ", "exp_year": "2030"}"#,
        )
        .unwrap();
        assert_eq!(input.exp_month, Some(12));
        assert_eq!(input.exp_year, Some(2030));
        assert!(validate_card_at(&input, today()).ok);

        let blank: CardInput = serde_json::from_str(r#"{"exp_month": "", "exp_year": null}"#).unwrap();
        assert_eq!(blank.exp_month, None);
        assert_eq!(blank.exp_year, None);

        assert!(serde_json::from_str::<CardInput>(r#"{"exp_month": "June"}"#).is_err());
    }

    #[test]
    fn test_discover_inferred_lengths() {
        for body in ["601111111111111", "601111111111111111"] {
            let input = CardInput {
                number: Some(with_check_digit(body)),
                ..visa_input()
            };

            let result = validate_card_at(&input, today());
            assert!(result.ok, "{} rejected: {:?}", body, result.reasons);
            assert_eq!(result.brand, Some(CardBrand::Discover));
        }

        let input = CardInput {
            number: Some(with_check_digit("65111111111111")),
            ..visa_input()
        };
        let result = validate_card_at(&input, today());
        assert_eq!(result.brand, Some(CardBrand::Discover));
        assert_eq!(result.reasons, vec!["invalid card number length for discover".to_string()]);
    }

    #[test]
    fn test_mastercard_two_series_end_to_end() {
        let input = CardInput {
            number: Some(with_check_digit("222100000000000")),
            ..visa_input()
        };
        let result = validate_card_at(&input, today());
        assert!(result.ok, "unexpected reasons: {:?}", result.reasons);
        assert_eq!(result.brand, Some(CardBrand::Mastercard));

        let input = CardInput {
            number: Some(with_check_digit("27200000000000000")),
            ..visa_input()
        };
        let result = validate_card_at(&input, today());
        assert_eq!(result.brand, Some(CardBrand::Mastercard));
        assert_eq!(result.reasons, vec!["invalid card number length for mastercard".to_string()]);
    }

    #[test]
    fn test_cvv_required_even_without_brand() {
        let input = CardInput {
            number: Some("9111111111111111".to_string()),
            cvv: None,
            ..visa_input()
        };

        let result = validate_card_at(&input, today());
        assert_eq!(
            result.reasons,
            vec![
                REASON_UNRECOGNIZED_BRAND.to_string(),
                REASON_CVV_REQUIRED.to_string(),
                REASON_LUHN.to_string(),
            ]
        );
    }

    #[test]
    fn test_pure() {
        let input = visa_input();
        assert_eq!(validate_card_at(&input, today()), validate_card_at(&input, today()));
    }
}
