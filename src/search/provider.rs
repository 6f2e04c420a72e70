//! Flight-data provider seam.
//!
//! Providers answer leg queries with raw priced itineraries; everything
//! vendor-specific stays behind the trait. The one shipped implementation
//! speaks a plain JSON-over-HTTP contract so any aggregator can be wired in
//! through configuration.

use async_trait::async_trait;
use chrono::NaiveDate;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::error::ProviderError;

use super::model::{Passengers, RawItinerary, SearchRequest, TravelClass};

/// A single origin→destination query against one data source.
#[derive(Debug, Clone, Serialize)]
pub struct LegQuery {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_date: Option<NaiveDate>,
    pub passengers: Passengers,
    pub travel_class: TravelClass,
}

impl LegQuery {
    /// Query for one leg of a routing, inheriting passenger/class details
    /// from the request. Hub legs are searched one-way.
    pub fn for_leg(request: &SearchRequest, origin: &str, destination: &str) -> Self {
        Self {
            origin: origin.to_string(),
            destination: destination.to_string(),
            departure_date: request.departure_date,
            return_date: None,
            passengers: request.passengers,
            travel_class: request.travel_class,
        }
    }

    /// Query for a whole point-to-point trip (direct or nearby strategy),
    /// keeping the return date for round trips.
    pub fn for_trip(request: &SearchRequest, origin: &str, destination: &str) -> Self {
        Self {
            return_date: request.return_date,
            ..Self::for_leg(request, origin, destination)
        }
    }
}

/// An external flight-data source.
#[async_trait]
pub trait FlightProvider: Send + Sync {
    /// Short identifier used in logs and itinerary provenance.
    fn name(&self) -> &str;

    /// Search one leg query. Failures are isolated by the orchestrator; a
    /// provider erroring out never fails the task on its own.
    async fn search(&self, query: &LegQuery) -> Result<Vec<RawItinerary>, ProviderError>;
}

/// Generic JSON-over-HTTP provider.
///
/// POSTs the leg query to `{base_url}/offers` with optional bearer auth and
/// expects a JSON array of itineraries back.
pub struct HttpProvider {
    name: String,
    base_url: String,
    api_key: Option<SecretString>,
    client: reqwest::Client,
}

impl HttpProvider {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: Option<SecretString>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl FlightProvider for HttpProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, query: &LegQuery) -> Result<Vec<RawItinerary>, ProviderError> {
        let url = format!("{}/offers", self.base_url.trim_end_matches('/'));
        let mut request = self.client.post(&url).json(query);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed {
                provider: self.name.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::RequestFailed {
                provider: self.name.clone(),
                reason: format!("HTTP {status}"),
            });
        }

        let mut itineraries: Vec<RawItinerary> =
            response
                .json()
                .await
                .map_err(|e| ProviderError::InvalidResponse {
                    provider: self.name.clone(),
                    reason: e.to_string(),
                })?;

        for itinerary in &mut itineraries {
            itinerary.provider = self.name.clone();
        }
        Ok(itineraries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn request() -> SearchRequest {
        SearchRequest {
            origin: "DAR".into(),
            destination: "BKK".into(),
            departure_date: NaiveDate::from_ymd_opt(2026, 9, 15).unwrap(),
            return_date: NaiveDate::from_ymd_opt(2026, 9, 22),
            passengers: Passengers::default(),
            travel_class: TravelClass::Economy,
        }
    }

    #[test]
    fn trip_query_keeps_return_date() {
        let q = LegQuery::for_trip(&request(), "DAR", "BKK");
        assert_eq!(q.return_date, NaiveDate::from_ymd_opt(2026, 9, 22));
    }

    #[test]
    fn leg_query_is_one_way() {
        let q = LegQuery::for_leg(&request(), "DXB", "BKK");
        assert_eq!(q.origin, "DXB");
        assert!(q.return_date.is_none());
    }
}
