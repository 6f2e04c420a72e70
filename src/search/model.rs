//! Search request and flight offer models.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SearchError;

/// Passenger counts for a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passengers {
    #[serde(default = "default_adults")]
    pub adults: u8,
    #[serde(default)]
    pub children: u8,
    #[serde(default)]
    pub infants: u8,
}

fn default_adults() -> u8 {
    1
}

impl Default for Passengers {
    fn default() -> Self {
        Self {
            adults: 1,
            children: 0,
            infants: 0,
        }
    }
}

impl Passengers {
    pub fn total(&self) -> u8 {
        self.adults + self.children + self.infants
    }

    /// Bounds shared by search submission and price-alert registration.
    pub fn validate(&self) -> Result<(), String> {
        if self.adults == 0 {
            return Err("at least one adult is required".into());
        }
        if self.infants > self.adults {
            return Err("each infant must travel with an adult".into());
        }
        if self.total() > 9 {
            return Err("at most 9 passengers per booking".into());
        }
        Ok(())
    }
}

/// Cabin class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TravelClass {
    #[default]
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl std::fmt::Display for TravelClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Economy => "economy",
            Self::PremiumEconomy => "premium_economy",
            Self::Business => "business",
            Self::First => "first",
        };
        write!(f, "{s}")
    }
}

/// A structured flight-search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Requested origin airport (IATA code).
    pub origin: String,
    /// Requested destination airport (IATA code).
    pub destination: String,
    pub departure_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<NaiveDate>,
    #[serde(default)]
    pub passengers: Passengers,
    #[serde(default)]
    pub travel_class: TravelClass,
}

impl SearchRequest {
    pub fn is_roundtrip(&self) -> bool {
        self.return_date.is_some()
    }

    /// Synchronous validation run at submission, before any task is created.
    pub fn validate(&self) -> Result<(), SearchError> {
        let invalid = |reason: &str| SearchError::InvalidRequest {
            reason: reason.to_string(),
        };
        if !is_airport_code(&self.origin) {
            return Err(invalid("origin must be a 3-letter airport code"));
        }
        if !is_airport_code(&self.destination) {
            return Err(invalid("destination must be a 3-letter airport code"));
        }
        if self.origin == self.destination {
            return Err(invalid("origin and destination are the same"));
        }
        if let Some(ret) = self.return_date {
            if ret < self.departure_date {
                return Err(invalid("return date is before departure date"));
            }
        }
        self.passengers
            .validate()
            .map_err(|reason| SearchError::InvalidRequest { reason })?;
        Ok(())
    }
}

fn is_airport_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase())
}

/// A raw priced itinerary as returned by a provider, before classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawItinerary {
    /// Data source that produced this itinerary.
    pub provider: String,
    pub airline: String,
    pub airline_code: String,
    /// Ordered airport path, length >= 2. `["DAR", "BKK"]` is nonstop;
    /// `["DAR", "DXB", "BKK"]` is a two-leg routing.
    pub routing: Vec<String>,
    /// Declared stop count.
    pub stops: u32,
    /// Whether the itinerary is sold as a single through fare (one ticket).
    pub through_fare: bool,
    pub price_total: Decimal,
    pub currency: String,
    pub duration_minutes: u32,
    pub departure: DateTime<Utc>,
    pub arrival: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_url: Option<String>,
}

/// Result group for a priced offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferGroup {
    Direct,
    NearbyAirport,
    HubConnection,
    BudgetAlternative,
}

impl OfferGroup {
    /// Classify a raw itinerary into exactly one priced group.
    ///
    /// `nearby` is the proximity set for the requested endpoints: airport
    /// codes that count as "close enough" substitutes. Budget alternatives
    /// are populated from a separate carrier table, never from here.
    pub fn classify(
        itinerary: &RawItinerary,
        origin: &str,
        destination: &str,
        nearby: &HashSet<String>,
    ) -> OfferGroup {
        let multi_leg = itinerary.routing.len() > 2;
        if multi_leg || itinerary.stops > 0 {
            // Through-fare one-stops land here too: the closed set has no
            // other group whose invariant they satisfy.
            return OfferGroup::HubConnection;
        }

        let first = itinerary.routing.first().map(String::as_str).unwrap_or("");
        let last = itinerary.routing.last().map(String::as_str).unwrap_or("");
        if first == origin && last == destination {
            OfferGroup::Direct
        } else if nearby.contains(first) || nearby.contains(last) {
            OfferGroup::NearbyAirport
        } else {
            // Endpoints outside the proximity set can only come from a
            // provider substituting airports on its own; still a substitute.
            OfferGroup::NearbyAirport
        }
    }
}

/// Baggage / cancellation / change policy flags for an offer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyFlags {
    pub checked_bag_included: bool,
    pub refundable: bool,
    pub changeable: bool,
}

/// One step of the manual booking guide attached to separate-ticket
/// hub connections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingStep {
    pub step: usize,
    pub from: String,
    pub to: String,
    pub date: NaiveDate,
    pub instruction: String,
}

/// A priced, grouped flight offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightOffer {
    pub id: Uuid,
    pub group: OfferGroup,
    pub airline: String,
    pub airline_code: String,
    pub routing: Vec<String>,
    pub stops: u32,
    pub price_total: Decimal,
    /// Price plus any ground-transport cost to a substitute airport; the
    /// ranking key.
    pub effective_total: Decimal,
    pub currency: String,
    pub duration_minutes: u32,
    pub departure: DateTime<Utc>,
    pub arrival: DateTime<Utc>,
    pub policies: PolicyFlags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_url: Option<String>,
    /// Present only on separate-ticket hub connections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_guide: Option<Vec<BookingStep>>,
}

/// A budget-carrier suggestion outside aggregator coverage. A call to
/// action with a deep link, not a priced itinerary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetOption {
    pub airline: String,
    pub airline_code: String,
    pub check_url: String,
    pub note: String,
}

/// Summary block attached to completed results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSummary {
    pub strategies_attempted: usize,
    pub successful_queries: usize,
    pub failed_queries: usize,
    pub total_offers_found: usize,
    pub request: SearchRequest,
}

/// The four offer groups plus the search summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    pub summary: SearchSummary,
    pub direct: Vec<FlightOffer>,
    pub nearby_airport: Vec<FlightOffer>,
    pub hub_connections: Vec<FlightOffer>,
    pub budget_alternatives: Vec<BudgetOption>,
}

/// Sort offers ascending by effective price, ties broken by duration then
/// departure time.
pub fn sort_offers(offers: &mut [FlightOffer]) {
    offers.sort_by(|a, b| {
        a.effective_total
            .cmp(&b.effective_total)
            .then(a.duration_minutes.cmp(&b.duration_minutes))
            .then(a.departure.cmp(&b.departure))
    });
}
