//! Unified `Database` trait — single async interface for all persistence.

use async_trait::async_trait;

use crate::alerts::{BookingClick, PriceAlert};
use crate::contacts::model::Contact;
use crate::error::DatabaseError;

/// Backend-agnostic database trait covering contacts and the tracking sink.
///
/// Search tasks are deliberately not here: they are time-bounded, in-memory
/// records owned by the task store.
#[async_trait]
pub trait Database: Send + Sync {
    /// Run all pending schema migrations.
    async fn run_migrations(&self) -> Result<(), DatabaseError>;

    // ── Contacts ────────────────────────────────────────────────────

    /// Look up a contact by phone number.
    async fn get_contact(&self, phone_number: &str) -> Result<Option<Contact>, DatabaseError>;

    /// Insert or replace a contact record.
    async fn upsert_contact(&self, contact: &Contact) -> Result<(), DatabaseError>;

    /// Number of stored contacts.
    async fn count_contacts(&self) -> Result<u64, DatabaseError>;

    // ── Tracking sink ───────────────────────────────────────────────

    /// Persist a price-alert subscription. Duplicates are permitted.
    async fn insert_price_alert(&self, alert: &PriceAlert) -> Result<(), DatabaseError>;

    /// Persist a booking-click event.
    async fn insert_booking_click(&self, click: &BookingClick) -> Result<(), DatabaseError>;

    /// Number of stored price alerts.
    async fn count_price_alerts(&self) -> Result<u64, DatabaseError>;

    /// Number of stored booking clicks.
    async fn count_booking_clicks(&self) -> Result<u64, DatabaseError>;
}
