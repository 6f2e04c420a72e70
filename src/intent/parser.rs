//! Rule-based intent parser for active contacts.
//!
//! Extracts a structured search request (route, dates, passengers, class)
//! from free text that may mix Swahili and English, and recognizes the
//! distinct booking-confirmation intent. Anything else is a clarification
//! request; parsing never mutates contact or task state.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::search::model::{Passengers, SearchRequest, TravelClass};

use super::places;

/// What an active contact's message means.
#[derive(Debug, Clone)]
pub enum Intent {
    /// A new flight search.
    Search(SearchRequest),
    /// Confirmation of intent to book from a prior search. Forwarded as a
    /// signal; never re-invokes the orchestrator.
    ConfirmBooking,
    /// Could not extract a route and date; ask the user to clarify.
    Unrecognized,
}

static BOOKING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(book(\s+it)?|confirm|thibitisha|nikatie|kata\s+tiketi|kununua\s+tiketi|nataka\s+tiketi)\b",
    )
    .expect("booking regex")
});

static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").expect("iso date regex"));

static SLASH_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})(?:/(\d{2,4}))?\b").expect("slash date regex"));

static MONTH_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:(\d{1,2})\s+)?(januari|februari|machi|aprili|mei|juni|julai|agosti|septemba|oktoba|novemba|desemba|january|february|march|april|may|june|july|august|september|october|november|december)(?:\s+(\d{1,2}))?\b",
    )
    .expect("month date regex")
});

static RELATIVE_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(keshokutwa|kesho|leo)\b").expect("relative date regex"));

static SWAHILI_ROUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)kutoka\s+(?P<o>.+?)\s+(?:kwenda|hadi|mpaka)\s+(?P<d>.+)$")
        .expect("swahili route regex")
});

static ENGLISH_ROUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bfrom\s+(?P<o>.+?)\s+to\s+(?P<d>.+)$").expect("english route regex")
});

static GENERIC_ROUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<o>.+?)\s+(?:to|kwenda)\s+(?P<d>.+)$").expect("generic route regex")
});

static ADULTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+)\s*(?:adults?|watu\s+wazima|wakubwa|abiria)\b").expect("adults regex")
});

static CHILDREN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+)\s*(?:children|child|kids?|watoto)\b").expect("children regex")
});

static INFANTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+)\s*(?:infants?|wachanga)\b").expect("infants regex")
});

/// Parser for free-text messages from active contacts.
#[derive(Debug, Default)]
pub struct IntentParser;

impl IntentParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a message relative to `today` (used for relative dates and for
    /// bumping year-less dates into the future).
    pub fn parse(&self, text: &str, today: NaiveDate) -> Intent {
        let text = text.trim();
        if text.is_empty() {
            return Intent::Unrecognized;
        }

        if BOOKING_RE.is_match(text) {
            return Intent::ConfirmBooking;
        }

        let (dates, cleaned) = extract_dates(text, today);
        let Some((origin, destination)) = extract_route(&cleaned) else {
            return Intent::Unrecognized;
        };
        let Some(&departure_date) = dates.first() else {
            return Intent::Unrecognized;
        };

        let request = SearchRequest {
            origin,
            destination,
            departure_date,
            return_date: dates.get(1).copied(),
            passengers: extract_passengers(text),
            travel_class: extract_class(text),
        };
        match request.validate() {
            Ok(()) => Intent::Search(request),
            Err(_) => Intent::Unrecognized,
        }
    }
}

/// Pull every date mention out of the text, in order of appearance, and
/// return the text with those spans blanked so route matching sees only
/// place words.
fn extract_dates(text: &str, today: NaiveDate) -> (Vec<NaiveDate>, String) {
    let mut found: Vec<(usize, usize, NaiveDate)> = Vec::new();

    for caps in ISO_DATE_RE.captures_iter(text) {
        let m = caps.get(0).unwrap();
        let (y, mo, d) = (cap_u32(&caps, 1), cap_u32(&caps, 2), cap_u32(&caps, 3));
        if let Some(date) = NaiveDate::from_ymd_opt(y as i32, mo, d) {
            found.push((m.start(), m.end(), date));
        }
    }

    for caps in SLASH_DATE_RE.captures_iter(text) {
        let m = caps.get(0).unwrap();
        if overlaps(&found, m.start()) {
            continue;
        }
        let (d, mo) = (cap_u32(&caps, 1), cap_u32(&caps, 2));
        let year = caps
            .get(3)
            .map(|y| {
                let y: i32 = y.as_str().parse().unwrap_or(today.year());
                if y < 100 { y + 2000 } else { y }
            })
            .unwrap_or(today.year());
        if let Some(date) = NaiveDate::from_ymd_opt(year, mo, d) {
            let date = bump_past_dates(date, today, caps.get(3).is_none());
            found.push((m.start(), m.end(), date));
        }
    }

    for caps in MONTH_DATE_RE.captures_iter(text) {
        let m = caps.get(0).unwrap();
        if overlaps(&found, m.start()) {
            continue;
        }
        let day = caps
            .get(1)
            .or(caps.get(3))
            .and_then(|d| d.as_str().parse::<u32>().ok());
        let Some(day) = day else { continue };
        let Some(month) = month_number(&caps[2].to_lowercase()) else {
            continue;
        };
        if let Some(date) = NaiveDate::from_ymd_opt(today.year(), month, day) {
            found.push((m.start(), m.end(), bump_past_dates(date, today, true)));
        }
    }

    for m in RELATIVE_DATE_RE.find_iter(text) {
        let offset = match m.as_str().to_lowercase().as_str() {
            "leo" => 0,
            "kesho" => 1,
            _ => 2,
        };
        found.push((m.start(), m.end(), today + chrono::Duration::days(offset)));
    }

    found.sort_by_key(|(start, _, _)| *start);

    let mut cleaned = String::with_capacity(text.len());
    let mut cursor = 0;
    for &(start, end, _) in &found {
        if start >= cursor {
            cleaned.push_str(&text[cursor..start]);
            cleaned.push(' ');
            cursor = end;
        }
    }
    cleaned.push_str(&text[cursor..]);

    (found.into_iter().map(|(_, _, date)| date).collect(), cleaned)
}

fn overlaps(found: &[(usize, usize, NaiveDate)], pos: usize) -> bool {
    found.iter().any(|&(start, end, _)| pos >= start && pos < end)
}

fn cap_u32(caps: &regex::Captures<'_>, i: usize) -> u32 {
    caps.get(i)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Year-less dates already behind us mean next year.
fn bump_past_dates(date: NaiveDate, today: NaiveDate, year_was_omitted: bool) -> NaiveDate {
    if year_was_omitted && date < today {
        NaiveDate::from_ymd_opt(date.year() + 1, date.month(), date.day()).unwrap_or(date)
    } else {
        date
    }
}

fn extract_route(cleaned: &str) -> Option<(String, String)> {
    for route_re in [&*SWAHILI_ROUTE_RE, &*ENGLISH_ROUTE_RE, &*GENERIC_ROUTE_RE] {
        if let Some(caps) = route_re.captures(cleaned) {
            let origin = places::resolve_span(&caps["o"]);
            let destination = places::resolve_span(&caps["d"]);
            if let (Some(origin), Some(destination)) = (origin, destination) {
                return Some((origin, destination));
            }
        }
    }
    None
}

fn extract_passengers(text: &str) -> Passengers {
    let grab = |re: &Regex| {
        re.captures(text)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u8>().ok())
    };
    Passengers {
        adults: grab(&ADULTS_RE).unwrap_or(1),
        children: grab(&CHILDREN_RE).unwrap_or(0),
        infants: grab(&INFANTS_RE).unwrap_or(0),
    }
}

fn extract_class(text: &str) -> TravelClass {
    let lower = text.to_lowercase();
    if lower.contains("first class") || lower.contains("daraja la kwanza") {
        TravelClass::First
    } else if lower.contains("business") || lower.contains("biashara") {
        TravelClass::Business
    } else if lower.contains("premium") {
        TravelClass::PremiumEconomy
    } else {
        TravelClass::Economy
    }
}

fn month_number(name: &str) -> Option<u32> {
    let n = match name {
        "januari" | "january" => 1,
        "februari" | "february" => 2,
        "machi" | "march" => 3,
        "aprili" | "april" => 4,
        "mei" | "may" => 5,
        "juni" | "june" => 6,
        "julai" | "july" => 7,
        "agosti" | "august" => 8,
        "septemba" | "september" => 9,
        "oktoba" | "october" => 10,
        "novemba" | "november" => 11,
        "desemba" | "december" => 12,
        _ => return None,
    };
    Some(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()
    }

    fn parse(text: &str) -> Intent {
        IntentParser::new().parse(text, today())
    }

    fn expect_search(text: &str) -> SearchRequest {
        match parse(text) {
            Intent::Search(request) => request,
            other => panic!("expected Search for {text:?}, got {other:?}"),
        }
    }

    #[test]
    fn swahili_route_with_iso_date() {
        let req = expect_search("Nataka kusafiri kutoka Dar es Salaam kwenda Dubai tarehe 2026-09-15");
        assert_eq!(req.origin, "DAR");
        assert_eq!(req.destination, "DXB");
        assert_eq!(req.departure_date, NaiveDate::from_ymd_opt(2026, 9, 15).unwrap());
        assert!(req.return_date.is_none());
        assert_eq!(req.passengers.adults, 1);
    }

    #[test]
    fn english_roundtrip_with_passengers() {
        let req = expect_search("from moshi to nairobi on 15/09/2026 returning 22/09/2026 for 2 adults and 1 child");
        assert_eq!(req.origin, "JRO");
        assert_eq!(req.destination, "NBO");
        assert_eq!(req.departure_date, NaiveDate::from_ymd_opt(2026, 9, 15).unwrap());
        assert_eq!(req.return_date, NaiveDate::from_ymd_opt(2026, 9, 22));
        assert_eq!(req.passengers.adults, 2);
        assert_eq!(req.passengers.children, 1);
    }

    #[test]
    fn bare_codes_and_month_names() {
        let req = expect_search("DAR to BKK 15 septemba business");
        assert_eq!(req.origin, "DAR");
        assert_eq!(req.destination, "BKK");
        assert_eq!(req.departure_date, NaiveDate::from_ymd_opt(2026, 9, 15).unwrap());
        assert_eq!(req.travel_class, TravelClass::Business);
    }

    #[test]
    fn yearless_past_date_bumps_to_next_year() {
        let req = expect_search("dar kwenda dubai 15/03");
        assert_eq!(req.departure_date, NaiveDate::from_ymd_opt(2027, 3, 15).unwrap());
    }

    #[test]
    fn relative_dates() {
        let req = expect_search("kutoka dar kwenda zanzibar kesho");
        assert_eq!(req.origin, "DAR");
        assert_eq!(req.destination, "ZNZ");
        assert_eq!(req.departure_date, today() + chrono::Duration::days(1));
    }

    #[test]
    fn booking_confirmation_is_distinct() {
        assert!(matches!(parse("Ndio, nikatie tiketi"), Intent::ConfirmBooking));
        assert!(matches!(parse("yes please book it"), Intent::ConfirmBooking));
        assert!(matches!(parse("confirm"), Intent::ConfirmBooking));
    }

    #[test]
    fn missing_date_is_unrecognized() {
        assert!(matches!(
            parse("kutoka dar kwenda dubai"),
            Intent::Unrecognized
        ));
    }

    #[test]
    fn missing_route_is_unrecognized() {
        assert!(matches!(parse("2026-09-15"), Intent::Unrecognized));
        assert!(matches!(parse("habari yako"), Intent::Unrecognized));
        assert!(matches!(parse(""), Intent::Unrecognized));
    }

    #[test]
    fn unknown_place_is_unrecognized() {
        assert!(matches!(
            parse("from gotham to metropolis 2026-09-15"),
            Intent::Unrecognized
        ));
    }

    #[test]
    fn same_endpoints_are_unrecognized() {
        assert!(matches!(
            parse("from dar to dar es salaam 2026-09-15"),
            Intent::Unrecognized
        ));
    }
}
