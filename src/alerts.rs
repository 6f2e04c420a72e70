//! Notification/tracking sink — price-alert subscriptions and booking-click
//! analytics.
//!
//! Two independent write paths. Price alerts are validated (email syntax,
//! passenger bounds) before persisting; duplicates are allowed and treated as
//! independent subscriptions. Booking clicks persist unconditionally and
//! never fail the caller's navigation.

use std::sync::Arc;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AlertError;
use crate::search::model::{Passengers, TravelClass};
use crate::store::Database;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex"));

/// Incoming price-alert registration.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceAlertRequest {
    pub email: String,
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    #[serde(default)]
    pub return_date: Option<NaiveDate>,
    #[serde(default)]
    pub passengers: Passengers,
    #[serde(default)]
    pub travel_class: TravelClass,
}

/// A persisted price-alert subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceAlert {
    pub id: Uuid,
    pub email: String,
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<NaiveDate>,
    pub passengers: Passengers,
    pub travel_class: TravelClass,
    pub created_at: DateTime<Utc>,
}

/// Incoming booking-click event.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingClickRequest {
    #[serde(default)]
    pub flight_offer_id: Option<String>,
    #[serde(default)]
    pub task_id: Option<Uuid>,
    pub origin: String,
    pub destination: String,
    #[serde(default)]
    pub departure_date: Option<NaiveDate>,
    #[serde(default)]
    pub return_date: Option<NaiveDate>,
    #[serde(default)]
    pub price: Option<Decimal>,
    pub booking_site: String,
}

/// A persisted booking-click event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingClick {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_offer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<Uuid>,
    pub origin: String,
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    pub booking_site: String,
    /// Where the click came from: `web` for the polling client,
    /// `conversation` for in-chat booking confirmations.
    pub source: String,
    pub created_at: DateTime<Utc>,
}

/// Write-only sink for subscriptions and analytics events.
pub struct NotificationSink {
    db: Arc<dyn Database>,
}

impl NotificationSink {
    pub fn new(db: Arc<dyn Database>) -> Arc<Self> {
        Arc::new(Self { db })
    }

    /// Validate and persist a price-alert subscription.
    pub async fn record_price_alert(
        &self,
        request: PriceAlertRequest,
    ) -> crate::error::Result<PriceAlert> {
        if !EMAIL_RE.is_match(request.email.trim()) {
            return Err(AlertError::InvalidEmail(request.email).into());
        }
        request
            .passengers
            .validate()
            .map_err(|reason| AlertError::InvalidPassengers { reason })?;

        let alert = PriceAlert {
            id: Uuid::new_v4(),
            email: request.email.trim().to_string(),
            origin: request.origin,
            destination: request.destination,
            departure_date: request.departure_date,
            return_date: request.return_date,
            passengers: request.passengers,
            travel_class: request.travel_class,
            created_at: Utc::now(),
        };
        self.db.insert_price_alert(&alert).await?;
        info!(alert_id = %alert.id, route = %format!("{}-{}", alert.origin, alert.destination),
              "Price alert recorded");
        Ok(alert)
    }

    /// Persist a booking click from the web client. Storage failures are
    /// logged and swallowed; the caller's navigation is never blocked.
    pub async fn record_booking_click(&self, request: BookingClickRequest) {
        let click = BookingClick {
            id: Uuid::new_v4(),
            flight_offer_id: request.flight_offer_id,
            task_id: request.task_id,
            origin: request.origin,
            destination: request.destination,
            departure_date: request.departure_date,
            return_date: request.return_date,
            price: request.price,
            booking_site: request.booking_site,
            source: "web".to_string(),
            created_at: Utc::now(),
        };
        if let Err(e) = self.db.insert_booking_click(&click).await {
            warn!(click_id = %click.id, error = %e, "Failed to persist booking click");
        }
    }

    /// Record an in-chat booking-confirmation signal from an active contact.
    /// Same guarantees as `record_booking_click`.
    pub async fn record_booking_confirmation(&self, phone_number: &str) {
        let click = BookingClick {
            id: Uuid::new_v4(),
            flight_offer_id: None,
            task_id: None,
            origin: String::new(),
            destination: String::new(),
            departure_date: None,
            return_date: None,
            price: None,
            booking_site: phone_number.to_string(),
            source: "conversation".to_string(),
            created_at: Utc::now(),
        };
        if let Err(e) = self.db.insert_booking_click(&click).await {
            warn!(phone = %phone_number, error = %e, "Failed to persist booking confirmation");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LibSqlBackend;

    async fn sink() -> Arc<NotificationSink> {
        let db = LibSqlBackend::new_memory().await.unwrap();
        NotificationSink::new(Arc::new(db))
    }

    fn alert_request(email: &str) -> PriceAlertRequest {
        PriceAlertRequest {
            email: email.to_string(),
            origin: "DAR".into(),
            destination: "DXB".into(),
            departure_date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            return_date: None,
            passengers: Passengers::default(),
            travel_class: TravelClass::Economy,
        }
    }

    #[tokio::test]
    async fn valid_alert_is_persisted() {
        let sink = sink().await;
        let alert = sink
            .record_price_alert(alert_request("asha@example.com"))
            .await
            .unwrap();
        assert_eq!(alert.email, "asha@example.com");
    }

    #[tokio::test]
    async fn bad_email_is_rejected() {
        let sink = sink().await;
        for email in ["not-an-email", "a@b", "a b@c.com", ""] {
            assert!(
                sink.record_price_alert(alert_request(email)).await.is_err(),
                "{email:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn bad_passenger_counts_are_rejected() {
        let sink = sink().await;
        let mut request = alert_request("asha@example.com");
        request.passengers = Passengers {
            adults: 0,
            children: 2,
            infants: 0,
        };
        assert!(sink.record_price_alert(request).await.is_err());
    }

    #[tokio::test]
    async fn duplicate_alerts_are_independent() {
        let sink = sink().await;
        let a = sink
            .record_price_alert(alert_request("asha@example.com"))
            .await
            .unwrap();
        let b = sink
            .record_price_alert(alert_request("asha@example.com"))
            .await
            .unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn booking_click_never_fails() {
        let sink = sink().await;
        sink.record_booking_click(BookingClickRequest {
            flight_offer_id: Some("offer-1".into()),
            task_id: None,
            origin: "DAR".into(),
            destination: "DXB".into(),
            departure_date: NaiveDate::from_ymd_opt(2026, 10, 1),
            return_date: None,
            price: None,
            booking_site: "emirates.com".into(),
        })
        .await;
        sink.record_booking_confirmation("+255712345678").await;
    }
}
