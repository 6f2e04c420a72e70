//! Budget-carrier checker.
//!
//! Low-cost carriers missing from aggregator feeds are matched by region and
//! returned as deep-link calls to action, never as priced itineraries.

use chrono::NaiveDate;

use super::model::{BudgetOption, SearchRequest};
use super::strategy::RouteBook;

struct BudgetCarrier {
    name: &'static str,
    code: &'static str,
    regions: &'static [&'static str],
    base_url: &'static str,
}

/// Carriers checked per region. Deliberately static: availability is
/// confirmed by the user following the link, not by us.
static BUDGET_CARRIERS: &[BudgetCarrier] = &[
    BudgetCarrier {
        name: "Ryanair",
        code: "FR",
        regions: &["europe"],
        base_url: "https://www.ryanair.com",
    },
    BudgetCarrier {
        name: "Wizz Air",
        code: "W6",
        regions: &["europe"],
        base_url: "https://wizzair.com",
    },
    BudgetCarrier {
        name: "easyJet",
        code: "U2",
        regions: &["europe"],
        base_url: "https://www.easyjet.com",
    },
    BudgetCarrier {
        name: "AirAsia",
        code: "AK",
        regions: &["asia"],
        base_url: "https://www.airasia.com",
    },
    BudgetCarrier {
        name: "Scoot",
        code: "TR",
        regions: &["asia"],
        base_url: "https://www.flyscoot.com",
    },
    BudgetCarrier {
        name: "IndiGo",
        code: "6E",
        regions: &["asia"],
        base_url: "https://www.goindigo.in",
    },
    BudgetCarrier {
        name: "flydubai",
        code: "FZ",
        regions: &["middle_east"],
        base_url: "https://www.flydubai.com",
    },
    BudgetCarrier {
        name: "Air Arabia",
        code: "G9",
        regions: &["middle_east"],
        base_url: "https://www.airarabia.com",
    },
    BudgetCarrier {
        name: "Fastjet",
        code: "FN",
        regions: &["africa"],
        base_url: "https://www.fastjet.com",
    },
    BudgetCarrier {
        name: "FlySafair",
        code: "FA",
        regions: &["africa"],
        base_url: "https://www.flysafair.co.za",
    },
    BudgetCarrier {
        name: "Jambojet",
        code: "JM",
        regions: &["africa"],
        base_url: "https://www.jambojet.com",
    },
];

/// Budget carriers plausibly serving either endpoint's region.
pub fn budget_alternatives(book: &RouteBook, request: &SearchRequest) -> Vec<BudgetOption> {
    let origin_region = book.region(&request.origin);
    let destination_region = book.region(&request.destination);

    BUDGET_CARRIERS
        .iter()
        .filter(|carrier| {
            carrier.regions.iter().any(|r| {
                origin_region == Some(*r) || destination_region == Some(*r)
            })
        })
        .map(|carrier| BudgetOption {
            airline: carrier.name.to_string(),
            airline_code: carrier.code.to_string(),
            check_url: check_url(
                carrier.base_url,
                &request.origin,
                &request.destination,
                request.departure_date,
                request.return_date,
            ),
            note: format!(
                "{} is not covered by fare aggregators — check prices directly",
                carrier.name
            ),
        })
        .collect()
}

fn check_url(
    base: &str,
    origin: &str,
    destination: &str,
    departure: NaiveDate,
    return_date: Option<NaiveDate>,
) -> String {
    let mut url = format!(
        "{base}/booking?from={origin}&to={destination}&depart={}",
        departure.format("%Y-%m-%d")
    );
    if let Some(ret) = return_date {
        url.push_str(&format!("&return={}", ret.format("%Y-%m-%d")));
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::model::{Passengers, TravelClass};

    fn request(origin: &str, destination: &str) -> SearchRequest {
        SearchRequest {
            origin: origin.into(),
            destination: destination.into(),
            departure_date: NaiveDate::from_ymd_opt(2026, 9, 15).unwrap(),
            return_date: None,
            passengers: Passengers::default(),
            travel_class: TravelClass::Economy,
        }
    }

    #[test]
    fn african_route_matches_african_carriers() {
        let book = RouteBook::builtin();
        let options = budget_alternatives(&book, &request("DAR", "NBO"));
        let codes: Vec<&str> = options.iter().map(|o| o.airline_code.as_str()).collect();
        assert!(codes.contains(&"FN"));
        assert!(codes.contains(&"JM"));
        assert!(!codes.contains(&"FR"));
    }

    #[test]
    fn cross_region_route_matches_both_sides() {
        let book = RouteBook::builtin();
        let options = budget_alternatives(&book, &request("DAR", "BKK"));
        let codes: Vec<&str> = options.iter().map(|o| o.airline_code.as_str()).collect();
        assert!(codes.contains(&"FN")); // africa side
        assert!(codes.contains(&"AK")); // asia side
    }

    #[test]
    fn check_url_carries_dates() {
        let url = check_url(
            "https://www.fastjet.com",
            "DAR",
            "JNB",
            NaiveDate::from_ymd_opt(2026, 9, 15).unwrap(),
            NaiveDate::from_ymd_opt(2026, 9, 22),
        );
        assert!(url.contains("from=DAR"));
        assert!(url.contains("depart=2026-09-15"));
        assert!(url.contains("return=2026-09-22"));
    }

    #[test]
    fn unknown_airports_match_nothing() {
        let book = RouteBook::builtin();
        assert!(budget_alternatives(&book, &request("XXX", "YYY")).is_empty());
    }
}
