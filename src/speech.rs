// 🗣️ Speech Helpers
// Turn codes, digits and amounts into text a TTS voice reads naturally,
// and strip stage directions that leak into generated replies.

use crate::digits_only;
use crate::pricing::round_cents;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

const STATE_NAMES: [(&str, &str); 51] = [
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("DC", "District of Columbia"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
];

const DIGIT_WORDS: [&str; 10] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
];

lazy_static! {
    static ref STATES: HashMap<&'static str, &'static str> = STATE_NAMES.iter().copied().collect();

    // "Silent 2 S Pause", "silent 1.5s pause"
    static ref SILENT_PAUSE: Regex =
        Regex::new(r"(?i)\bsilent\s*\d+(?:\.\d+)?\s*s\s*pause\b").unwrap();

    // "Agent waits 500ms", "agent waits 1200 ms"
    static ref AGENT_WAITS: Regex =
        Regex::new(r"(?i)\bagent\s+waits\s*\d+(?:\.\d+)?\s*ms\b").unwrap();

    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s{2,}").unwrap();
}

// ============================================================================
// STATES / DIGITS
// ============================================================================

/// "ca" → "California"; unknown codes come back untouched
pub fn expand_state_abbrev(code: &str) -> String {
    let key = code.trim().to_uppercase();

    match STATES.get(key.as_str()) {
        Some(name) => name.to_string(),
        None => code.to_string(),
    }
}

/// "12a3" → "one two three"
pub fn articulate_digits(input: &str) -> String {
    digits_only(input)
        .chars()
        .filter_map(|c| c.to_digit(10))
        .map(|d| DIGIT_WORDS[d as usize])
        .collect::<Vec<_>>()
        .join(" ")
}

/// "ending in one one one one" for the last four digits
pub fn speak_card_ending(number: &str) -> String {
    let digits = digits_only(number);
    if digits.len() < 4 {
        return String::new();
    }

    format!("ending in {}", articulate_digits(&digits[digits.len() - 4..]))
}

// ============================================================================
// SANITIZATION
// ============================================================================

pub fn sanitize_speech(text: &str) -> String {
    let mut cleaned = text.to_string();

    // Removing one artifact can expose another ("Silent Silent 2 S Pause 3 S Pause")
    loop {
        let next = AGENT_WAITS
            .replace_all(&SILENT_PAUSE.replace_all(&cleaned, " "), " ")
            .into_owned();
        if next == cleaned {
            break;
        }
        cleaned = next;
    }

    WHITESPACE_RUN.replace_all(&cleaned, " ").trim().to_string()
}

// ============================================================================
// SPOKEN SUMMARIES
// ============================================================================

/// 142.5 → "142 dollars and 50 cents"
pub fn speak_amount(amount: f64) -> String {
    let cents_total = (round_cents(amount) * 100.0).round() as u64;
    let dollars = cents_total / 100;
    let cents = cents_total % 100;

    let dollar_part = format!("{} {}", dollars, if dollars == 1 { "dollar" } else { "dollars" });
    let cent_part = format!("{} {}", cents, if cents == 1 { "cent" } else { "cents" });

    match (dollars, cents) {
        (_, 0) => dollar_part,
        (0, _) => cent_part,
        _ => format!("{} and {}", dollar_part, cent_part),
    }
}

/// One sentence the agent can read back after a validation
pub fn speak_reasons(ok: bool, reasons: &[String]) -> String {
    if ok || reasons.is_empty() {
        return "Thanks, that all checks out.".to_string();
    }

    let listed = match reasons.split_last() {
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{}, and {}", rest.join(", "), last),
        None => String::new(),
    };

    format!("I'm sorry, there's a problem: {}.", listed)
}
