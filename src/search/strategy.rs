//! Routing strategies and the static route book behind them.
//!
//! The route book holds the airport graph the orchestrator searches over:
//! which airports count as close substitutes (with ground-transport cost)
//! and which hubs are reachable for multi-leg routings. Strategies are
//! generated per request and ranked direct < nearby < hub.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::model::{PolicyFlags, SearchRequest};

/// A substitute airport near a primary one.
#[derive(Debug, Clone)]
pub struct NearbyAirport {
    pub code: String,
    pub distance_km: u32,
    /// Typical ground-transport cost to/from the primary airport.
    pub transport_cost: Decimal,
    pub transport_minutes: u32,
}

/// An airport known to the route book.
#[derive(Debug, Clone)]
pub struct Airport {
    pub code: String,
    pub name: String,
    pub city: String,
    pub country: String,
    /// Coarse region tag used by the budget-carrier checker.
    pub region: &'static str,
    pub nearby: Vec<NearbyAirport>,
    pub hubs: Vec<String>,
}

/// How a strategy routes the itinerary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Direct,
    Nearby,
    Hub,
}

impl StrategyKind {
    fn priority(&self) -> u8 {
        match self {
            Self::Direct => 1,
            Self::Nearby => 2,
            Self::Hub => 3,
        }
    }
}

/// One way of searching the requested trip.
#[derive(Debug, Clone)]
pub struct SearchStrategy {
    /// Ordered outbound airport path, e.g. `["DAR", "BKK"]` or
    /// `["DAR", "DXB", "BKK"]`.
    pub outbound_route: Vec<String>,
    /// Return path for round trips.
    pub return_route: Option<Vec<String>>,
    pub kind: StrategyKind,
    /// Ground transport to a substitute airport, charged once per trip.
    pub extra_transport_cost: Decimal,
    pub explanation: String,
}

/// Static airport graph + airline policy table.
pub struct RouteBook {
    airports: HashMap<String, Airport>,
    policies: HashMap<&'static str, PolicyFlags>,
}

impl RouteBook {
    /// The built-in dataset: East-African primaries plus the long-haul hubs
    /// that serve them.
    pub fn builtin() -> Self {
        let mut airports = HashMap::new();
        let mut add = |airport: Airport| {
            airports.insert(airport.code.clone(), airport);
        };

        add(Airport {
            code: "DAR".into(),
            name: "Julius Nyerere International".into(),
            city: "Dar es Salaam".into(),
            country: "TZ".into(),
            region: "africa",
            nearby: vec![NearbyAirport {
                code: "ZNZ".into(),
                distance_km: 75,
                transport_cost: dec!(35),
                transport_minutes: 120,
            }],
            hubs: vec!["DXB".into(), "DOH".into(), "NBO".into(), "ADD".into()],
        });
        add(Airport {
            code: "ZNZ".into(),
            name: "Abeid Amani Karume International".into(),
            city: "Zanzibar".into(),
            country: "TZ".into(),
            region: "africa",
            nearby: vec![NearbyAirport {
                code: "DAR".into(),
                distance_km: 75,
                transport_cost: dec!(35),
                transport_minutes: 120,
            }],
            hubs: vec!["DXB".into(), "DOH".into(), "NBO".into()],
        });
        add(Airport {
            code: "JRO".into(),
            name: "Kilimanjaro International".into(),
            city: "Kilimanjaro".into(),
            country: "TZ".into(),
            region: "africa",
            nearby: vec![NearbyAirport {
                code: "ARK".into(),
                distance_km: 50,
                transport_cost: dec!(25),
                transport_minutes: 70,
            }],
            hubs: vec!["DOH".into(), "ADD".into(), "NBO".into()],
        });
        add(Airport {
            code: "ARK".into(),
            name: "Arusha".into(),
            city: "Arusha".into(),
            country: "TZ".into(),
            region: "africa",
            nearby: vec![NearbyAirport {
                code: "JRO".into(),
                distance_km: 50,
                transport_cost: dec!(25),
                transport_minutes: 70,
            }],
            hubs: vec!["NBO".into(), "DAR".into()],
        });
        add(Airport {
            code: "MWZ".into(),
            name: "Mwanza".into(),
            city: "Mwanza".into(),
            country: "TZ".into(),
            region: "africa",
            nearby: vec![],
            hubs: vec!["DAR".into(), "NBO".into()],
        });
        for (code, name, city, country, region) in [
            ("NBO", "Jomo Kenyatta International", "Nairobi", "KE", "africa"),
            ("ADD", "Addis Ababa Bole International", "Addis Ababa", "ET", "africa"),
            ("DXB", "Dubai International", "Dubai", "AE", "middle_east"),
            ("DOH", "Hamad International", "Doha", "QA", "middle_east"),
            ("IST", "Istanbul Airport", "Istanbul", "TR", "europe"),
            ("BKK", "Suvarnabhumi", "Bangkok", "TH", "asia"),
            ("BOM", "Chhatrapati Shivaji International", "Mumbai", "IN", "asia"),
            ("LHR", "Heathrow", "London", "GB", "europe"),
        ] {
            add(Airport {
                code: code.into(),
                name: name.into(),
                city: city.into(),
                country: country.into(),
                region,
                nearby: vec![],
                hubs: vec![],
            });
        }

        let policies = HashMap::from([
            ("EK", PolicyFlags { checked_bag_included: true, refundable: false, changeable: true }),
            ("QR", PolicyFlags { checked_bag_included: true, refundable: false, changeable: true }),
            ("TK", PolicyFlags { checked_bag_included: true, refundable: false, changeable: true }),
            ("ET", PolicyFlags { checked_bag_included: true, refundable: false, changeable: true }),
            ("KQ", PolicyFlags { checked_bag_included: true, refundable: false, changeable: false }),
            ("PW", PolicyFlags { checked_bag_included: true, refundable: false, changeable: false }),
            ("FN", PolicyFlags { checked_bag_included: false, refundable: false, changeable: false }),
        ]);

        Self { airports, policies }
    }

    pub fn airport(&self, code: &str) -> Option<&Airport> {
        self.airports.get(code)
    }

    pub fn nearby(&self, code: &str) -> &[NearbyAirport] {
        self.airports
            .get(code)
            .map(|a| a.nearby.as_slice())
            .unwrap_or(&[])
    }

    pub fn hubs(&self, code: &str) -> &[String] {
        self.airports
            .get(code)
            .map(|a| a.hubs.as_slice())
            .unwrap_or(&[])
    }

    /// Region tag for the budget-carrier checker. Unknown airports have no
    /// region and match nothing.
    pub fn region(&self, code: &str) -> Option<&'static str> {
        self.airports.get(code).map(|a| a.region)
    }

    /// Airports counting as close substitutes for either requested endpoint.
    pub fn proximity_set(&self, origin: &str, destination: &str) -> HashSet<String> {
        self.nearby(origin)
            .iter()
            .chain(self.nearby(destination).iter())
            .map(|n| n.code.clone())
            .collect()
    }

    /// Policy flags for an airline, defaulting to all-false for carriers not
    /// in the table.
    pub fn policy(&self, airline_code: &str) -> PolicyFlags {
        self.policies.get(airline_code).copied().unwrap_or_default()
    }

    /// Ground-transport cost for a substitute of `primary`, if known.
    pub fn transport_cost(&self, primary: &str, substitute: &str) -> Option<Decimal> {
        self.nearby(primary)
            .iter()
            .find(|n| n.code == substitute)
            .map(|n| n.transport_cost)
    }

    /// Generate the ranked routing strategies for a request, capped at
    /// `max_strategies`.
    pub fn strategies(&self, request: &SearchRequest, max_strategies: usize) -> Vec<SearchStrategy> {
        let origin = &request.origin;
        let destination = &request.destination;
        let roundtrip = request.is_roundtrip();
        let mut strategies = Vec::new();

        strategies.push(SearchStrategy {
            outbound_route: vec![origin.clone(), destination.clone()],
            return_route: roundtrip.then(|| vec![destination.clone(), origin.clone()]),
            kind: StrategyKind::Direct,
            extra_transport_cost: Decimal::ZERO,
            explanation: if roundtrip {
                "Direct round-trip".into()
            } else {
                "Direct flight".into()
            },
        });

        for nearby in self.nearby(origin) {
            if nearby.code == *destination {
                continue;
            }
            strategies.push(SearchStrategy {
                outbound_route: vec![nearby.code.clone(), destination.clone()],
                return_route: roundtrip.then(|| vec![destination.clone(), nearby.code.clone()]),
                kind: StrategyKind::Nearby,
                extra_transport_cost: nearby.transport_cost,
                explanation: format!(
                    "Fly from {} (+${} transport)",
                    nearby.code, nearby.transport_cost
                ),
            });
        }

        for hub in self.hubs(origin) {
            if hub == origin || hub == destination {
                continue;
            }
            strategies.push(SearchStrategy {
                outbound_route: vec![origin.clone(), hub.clone(), destination.clone()],
                return_route: roundtrip
                    .then(|| vec![destination.clone(), hub.clone(), origin.clone()]),
                kind: StrategyKind::Hub,
                extra_transport_cost: Decimal::ZERO,
                explanation: format!("Connect via {hub}"),
            });
        }

        strategies.sort_by_key(|s| {
            (
                s.kind.priority(),
                s.outbound_route.len(),
                s.extra_transport_cost,
            )
        });
        strategies.truncate(max_strategies);
        strategies
    }
}

impl Default for RouteBook {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::model::{Passengers, TravelClass};
    use chrono::NaiveDate;

    fn request(origin: &str, destination: &str, roundtrip: bool) -> SearchRequest {
        SearchRequest {
            origin: origin.into(),
            destination: destination.into(),
            departure_date: NaiveDate::from_ymd_opt(2026, 9, 15).unwrap(),
            return_date: roundtrip.then(|| NaiveDate::from_ymd_opt(2026, 9, 22).unwrap()),
            passengers: Passengers::default(),
            travel_class: TravelClass::Economy,
        }
    }

    #[test]
    fn direct_strategy_always_first() {
        let book = RouteBook::builtin();
        let strategies = book.strategies(&request("DAR", "BKK", false), 8);
        assert!(!strategies.is_empty());
        assert_eq!(strategies[0].kind, StrategyKind::Direct);
        assert_eq!(strategies[0].outbound_route, vec!["DAR", "BKK"]);
        assert!(strategies[0].return_route.is_none());
    }

    #[test]
    fn nearby_before_hub_and_capped() {
        let book = RouteBook::builtin();
        let strategies = book.strategies(&request("DAR", "BKK", false), 3);
        assert_eq!(strategies.len(), 3);
        assert_eq!(strategies[0].kind, StrategyKind::Direct);
        assert_eq!(strategies[1].kind, StrategyKind::Nearby);
        assert_eq!(strategies[1].outbound_route[0], "ZNZ");
        assert_eq!(strategies[2].kind, StrategyKind::Hub);
        assert_eq!(strategies[2].outbound_route.len(), 3);
    }

    #[test]
    fn roundtrip_mirrors_routes() {
        let book = RouteBook::builtin();
        let strategies = book.strategies(&request("DAR", "BKK", true), 8);
        let hub = strategies
            .iter()
            .find(|s| s.kind == StrategyKind::Hub)
            .unwrap();
        let ret = hub.return_route.as_ref().unwrap();
        assert_eq!(ret.first().map(String::as_str), Some("BKK"));
        assert_eq!(ret.last().map(String::as_str), Some("DAR"));
        assert_eq!(ret.len(), 3);
    }

    #[test]
    fn proximity_set_covers_both_endpoints() {
        let book = RouteBook::builtin();
        let set = book.proximity_set("DAR", "JRO");
        assert!(set.contains("ZNZ"));
        assert!(set.contains("ARK"));
        assert!(!set.contains("DXB"));
    }

    #[test]
    fn unknown_airport_yields_direct_only() {
        let book = RouteBook::builtin();
        let strategies = book.strategies(&request("XXX", "YYY", false), 8);
        assert_eq!(strategies.len(), 1);
        assert_eq!(strategies[0].kind, StrategyKind::Direct);
    }

    #[test]
    fn policies_default_for_unknown_airlines() {
        let book = RouteBook::builtin();
        assert!(book.policy("QR").checked_bag_included);
        assert_eq!(book.policy("??"), PolicyFlags::default());
    }
}
