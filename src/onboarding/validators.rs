//! Pure validators for phone numbers, personal names, and yes/no phrases.

use std::sync::LazyLock;

use regex::Regex;

/// Tanzanian mobile numbers: `+255` or local `0`, network prefix 6 or 7,
/// then eight digits.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\+255|0)[67]\d{8}$").expect("phone regex"));

/// Localized affirmations, including the misspellings people actually send.
const YES_RESPONSES: &[&str] = &[
    "ndio", "ndiyo", "yes", "yeah", "yep", "nd", "yess", "yea", "yaa", "yup", "yee", "ydi", "ndi",
    "ndy",
];

/// Localized negations.
const NO_RESPONSES: &[&str] = &[
    "hapana", "no", "nope", "nop", "na", "nap", "np", "hapan", "hapn",
];

/// Whether the phone number is inside the allow-listed country prefixes.
///
/// Checked once, at first contact, before any state-machine logic runs.
pub fn is_supported_phone(phone_number: &str) -> bool {
    PHONE_RE.is_match(phone_number.trim())
}

/// Outcome of running the affirmation validator over a confirmation reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affirmation {
    Yes,
    No,
    /// Not a recognized yes or no. Treated as invalid input and re-prompted,
    /// never as a negation.
    Unrecognized,
}

/// Classify a confirmation reply against the localized yes/no synonym sets.
pub fn classify_affirmation(text: &str) -> Affirmation {
    let normalized = text.trim().to_lowercase();
    if YES_RESPONSES.contains(&normalized.as_str()) {
        Affirmation::Yes
    } else if NO_RESPONSES.contains(&normalized.as_str()) {
        Affirmation::No
    } else {
        Affirmation::Unrecognized
    }
}

/// Validate and normalize a personal name.
///
/// Requires at least two space-separated tokens, each purely alphabetic.
/// Returns the name with each token capitalized, or `None` if invalid.
pub fn validate_name(text: &str) -> Option<String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() < 2 {
        return None;
    }
    if !tokens.iter().all(|t| t.chars().all(|c| c.is_alphabetic())) {
        return None;
    }
    let capitalized: Vec<String> = tokens.iter().map(|t| capitalize(t)).collect();
    Some(capitalized.join(" "))
}

fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
