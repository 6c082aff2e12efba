// 🏦 Bank Account Validator
// Format checks only: routing length, account length, optional check number

use crate::digits_only;
use serde::{Deserialize, Serialize};

pub const ROUTING_LENGTH: usize = 9;
pub const ACCOUNT_MIN_LENGTH: usize = 7;
pub const ACCOUNT_MAX_LENGTH: usize = 12;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BankInput {
    #[serde(default)]
    pub routing_number: Option<String>,

    #[serde(default)]
    pub account_number: Option<String>,

    #[serde(default)]
    pub check_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankValidationResult {
    pub ok: bool,
    pub reasons: Vec<String>,
}

pub fn validate_bank(input: &BankInput) -> BankValidationResult {
    let mut reasons = Vec::new();

    match non_blank(&input.routing_number) {
        None => reasons.push("routing number is required".to_string()),
        Some(routing) => {
            if digits_only(routing).len() != ROUTING_LENGTH {
                reasons.push(format!("routing number must be {} digits", ROUTING_LENGTH));
            }
        }
    }

    match non_blank(&input.account_number) {
        None => reasons.push("account number is required".to_string()),
        Some(account) => {
            let len = digits_only(account).len();
            if !(ACCOUNT_MIN_LENGTH..=ACCOUNT_MAX_LENGTH).contains(&len) {
                reasons.push(format!(
                    "account number must be {}-{} digits",
                    ACCOUNT_MIN_LENGTH, ACCOUNT_MAX_LENGTH
                ));
            }
        }
    }

    // Provided-but-blank still counts as provided
    if let Some(check) = &input.check_number {
        if digits_only(check).is_empty() {
            reasons.push("check number must contain digits".to_string());
        }
    }

    BankValidationResult {
        ok: reasons.is_empty(),
        reasons,
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}
