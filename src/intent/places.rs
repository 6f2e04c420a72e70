//! Place-name alias table for route extraction.
//!
//! Maps the city names, nicknames, and misspellings people actually type to
//! airport codes. Used only when parsing search requests from free text;
//! onboarding location input stays unconstrained.

/// Resolve a normalized (lowercase, trimmed) place name to an airport code.
pub fn resolve(name: &str) -> Option<&'static str> {
    let code = match name {
        // Tanzania
        "dar es salaam" | "dar" | "dsm" | "darussalam" | "dar-es-salaam" | "dar es salam"
        | "bongo" | "jiji kubwa" => "DAR",
        "zanzibar" | "unguja" | "stone town" | "zanzibar mjini" => "ZNZ",
        "kilimanjaro" | "moshi" | "jro" => "JRO",
        "arusha" | "arusha mjini" => "ARK",
        "mwanza" | "rock city" => "MWZ",
        // East Africa
        "nairobi" => "NBO",
        "addis ababa" | "addis" => "ADD",
        // Long-haul
        "dubai" => "DXB",
        "doha" => "DOH",
        "istanbul" => "IST",
        "bangkok" => "BKK",
        "mumbai" | "bombay" => "BOM",
        "london" | "heathrow" => "LHR",
        _ => return None,
    };
    Some(code)
}

/// Resolve a free-text span to an airport code.
///
/// Tries the whole span, then a bare IATA code, then the longest word prefix
/// (so `"dar es salaam tarehe"` still resolves to DAR).
pub fn resolve_span(span: &str) -> Option<String> {
    let trimmed = span.trim().trim_matches(|c: char| c == ',' || c == '.');
    let normalized = trimmed.to_lowercase();

    if let Some(code) = resolve(&normalized) {
        return Some(code.to_string());
    }
    if trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return Some(trimmed.to_uppercase());
    }

    let words: Vec<&str> = normalized.split_whitespace().collect();
    for n in (1..=words.len().min(3)).rev() {
        if let Some(code) = resolve_window(&words[..n]) {
            return Some(code);
        }
    }
    // Leading filler words: try trailing windows too
    for n in (1..=words.len().min(3)).rev() {
        if let Some(code) = resolve_window(&words[words.len() - n..]) {
            return Some(code);
        }
    }
    None
}

fn resolve_window(words: &[&str]) -> Option<String> {
    if let Some(code) = resolve(&words.join(" ")) {
        return Some(code.to_string());
    }
    // A lone three-letter word reads as an IATA code
    if let [word] = words {
        if word.len() == 3 && word.chars().all(|c| c.is_ascii_alphabetic()) {
            return Some(word.to_uppercase());
        }
    }
    None
}
