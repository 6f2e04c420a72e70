//! libSQL backend — async `Database` trait implementation.
//!
//! Supports local file and in-memory databases; in-memory is used by tests.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::info;

use crate::alerts::{BookingClick, PriceAlert};
use crate::contacts::model::Contact;
use crate::error::DatabaseError;
use crate::store::migrations;
use crate::store::traits::Database;

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.run_migrations().await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to create in-memory database: {e}")))?;
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.run_migrations().await?;
        Ok(backend)
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }

    async fn count(&self, sql: &str) -> Result<u64, DatabaseError> {
        let mut rows = self
            .conn()
            .query(sql, ())
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;
        match rows.next().await.map_err(|e| DatabaseError::Query(e.to_string()))? {
            Some(row) => {
                let n: i64 = row.get(0).map_err(|e| DatabaseError::Query(e.to_string()))?;
                Ok(n as u64)
            }
            None => Ok(0),
        }
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

fn row_to_contact(row: &libsql::Row) -> Result<Contact, DatabaseError> {
    let query_err = |e: libsql::Error| DatabaseError::Query(e.to_string());

    let phone_number: String = row.get(0).map_err(query_err)?;
    let state_str: String = row.get(1).map_err(query_err)?;
    // Nullable columns: a NULL fails the typed get, which is fine
    let candidate_name: Option<String> = row.get(2).ok();
    let confirmed_name: Option<String> = row.get(3).ok();
    let candidate_location: Option<String> = row.get(4).ok();
    let confirmed_location: Option<String> = row.get(5).ok();
    let created_str: String = row.get(6).map_err(query_err)?;
    let activated_str: Option<String> = row.get(7).ok();

    let state = state_str
        .parse()
        .map_err(|e: String| DatabaseError::Serialization(e))?;

    Ok(Contact {
        phone_number,
        state,
        candidate_name,
        confirmed_name,
        candidate_location,
        confirmed_location,
        created_at: parse_datetime(&created_str),
        activated_at: activated_str.as_deref().map(parse_datetime),
    })
}

#[async_trait]
impl Database for LibSqlBackend {
    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        migrations::run_migrations(self.conn()).await
    }

    // ── Contacts ────────────────────────────────────────────────────

    async fn get_contact(&self, phone_number: &str) -> Result<Option<Contact>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT phone_number, state, candidate_name, confirmed_name,
                        candidate_location, confirmed_location, created_at, activated_at
                 FROM contacts WHERE phone_number = ?1",
                params![phone_number],
            )
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        match rows.next().await.map_err(|e| DatabaseError::Query(e.to_string()))? {
            Some(row) => Ok(Some(row_to_contact(&row)?)),
            None => Ok(None),
        }
    }

    async fn upsert_contact(&self, contact: &Contact) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO contacts (phone_number, state, candidate_name, confirmed_name,
                                       candidate_location, confirmed_location, created_at, activated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(phone_number) DO UPDATE SET
                     state = excluded.state,
                     candidate_name = excluded.candidate_name,
                     confirmed_name = excluded.confirmed_name,
                     candidate_location = excluded.candidate_location,
                     confirmed_location = excluded.confirmed_location,
                     activated_at = excluded.activated_at",
                params![
                    contact.phone_number.as_str(),
                    contact.state.to_string(),
                    contact.candidate_name.as_deref(),
                    contact.confirmed_name.as_deref(),
                    contact.candidate_location.as_deref(),
                    contact.confirmed_location.as_deref(),
                    contact.created_at.to_rfc3339(),
                    contact.activated_at.map(|t| t.to_rfc3339()),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;
        Ok(())
    }

    async fn count_contacts(&self) -> Result<u64, DatabaseError> {
        self.count("SELECT COUNT(*) FROM contacts").await
    }

    // ── Tracking sink ───────────────────────────────────────────────

    async fn insert_price_alert(&self, alert: &PriceAlert) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO price_alerts (id, email, origin, destination, departure_date,
                                           return_date, adults, children, infants,
                                           travel_class, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    alert.id.to_string(),
                    alert.email.as_str(),
                    alert.origin.as_str(),
                    alert.destination.as_str(),
                    alert.departure_date.format("%Y-%m-%d").to_string(),
                    alert.return_date.map(|d| d.format("%Y-%m-%d").to_string()),
                    i64::from(alert.passengers.adults),
                    i64::from(alert.passengers.children),
                    i64::from(alert.passengers.infants),
                    alert.travel_class.to_string(),
                    alert.created_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;
        Ok(())
    }

    async fn insert_booking_click(&self, click: &BookingClick) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO booking_clicks (id, flight_offer_id, task_id, origin, destination,
                                             departure_date, return_date, price, booking_site,
                                             source, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    click.id.to_string(),
                    click.flight_offer_id.as_deref(),
                    click.task_id.map(|id| id.to_string()),
                    click.origin.as_str(),
                    click.destination.as_str(),
                    click.departure_date.map(|d| d.format("%Y-%m-%d").to_string()),
                    click.return_date.map(|d| d.format("%Y-%m-%d").to_string()),
                    click.price.map(|p| p.to_string()),
                    click.booking_site.as_str(),
                    click.source.as_str(),
                    click.created_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;
        Ok(())
    }

    async fn count_price_alerts(&self) -> Result<u64, DatabaseError> {
        self.count("SELECT COUNT(*) FROM price_alerts").await
    }

    async fn count_booking_clicks(&self) -> Result<u64, DatabaseError> {
        self.count("SELECT COUNT(*) FROM booking_clicks").await
    }
}
