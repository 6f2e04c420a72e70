//! Conversational gateway — the single entry point for inbound messages.
//!
//! Validates the phone number before anything else, drives onboarding for
//! contacts that are not yet active, and routes active contacts' messages
//! through the intent parser to the search orchestrator or the tracking
//! sink. Replies are synchronous; search work is not.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::alerts::NotificationSink;
use crate::contacts::ContactStore;
use crate::error::{Error, GatewayError, Result, SearchError};
use crate::intent::{Intent, IntentParser};
use crate::onboarding::{self, prompts};
use crate::search::model::SearchRequest;
use crate::search::SearchOrchestrator;

/// Routes inbound `{user_id, message}` pairs to the right component.
pub struct ConversationalGateway {
    contacts: Arc<ContactStore>,
    parser: IntentParser,
    orchestrator: Arc<SearchOrchestrator>,
    sink: Arc<NotificationSink>,
}

impl ConversationalGateway {
    pub fn new(
        contacts: Arc<ContactStore>,
        orchestrator: Arc<SearchOrchestrator>,
        sink: Arc<NotificationSink>,
    ) -> Arc<Self> {
        Arc::new(Self {
            contacts,
            parser: IntentParser::new(),
            orchestrator,
            sink,
        })
    }

    /// Handle one inbound message and produce the reply text.
    pub async fn handle_message(&self, user_id: &str, message: &str) -> Result<String> {
        let phone_number = user_id.trim();
        let message = message.trim();
        if message.is_empty() {
            return Err(GatewayError::EmptyMessage {
                user_id: phone_number.to_string(),
            }
            .into());
        }

        // Region gate precedes all state-machine logic; unsupported numbers
        // get a terminal reply and no contact record.
        if !onboarding::is_supported_phone(phone_number) {
            info!(phone = %phone_number, "Unsupported region");
            return Ok(prompts::region_unsupported());
        }

        let entry = self.contacts.entry(phone_number).await.map_err(Error::from)?;
        let mut contact = entry.lock().await;

        if !contact.state.is_active() {
            let reply = onboarding::handle_message(&mut contact, message);
            self.contacts.persist(&contact).await.map_err(Error::from)?;
            return Ok(reply);
        }

        match self.parser.parse(message, Utc::now().date_naive()) {
            Intent::Search(request) => self.start_search(&contact, request).await,
            Intent::ConfirmBooking => {
                self.sink.record_booking_confirmation(phone_number).await;
                Ok(booking_acknowledged(contact.first_name().unwrap_or("rafiki")))
            }
            Intent::Unrecognized => Ok(clarification()),
        }
    }

    async fn start_search(
        &self,
        contact: &crate::contacts::Contact,
        request: SearchRequest,
    ) -> Result<String> {
        let route = format!("{} → {}", request.origin, request.destination);
        let date = request.departure_date;
        match self.orchestrator.submit(request).await {
            Ok(task_id) => Ok(search_started(
                contact.first_name().unwrap_or("rafiki"),
                &route,
                &date.format("%Y-%m-%d").to_string(),
                task_id,
            )),
            // The parser validates before submitting, but the orchestrator
            // may still reject; answer conversationally rather than erroring.
            Err(SearchError::InvalidRequest { .. }) => Ok(clarification()),
            Err(e) => Err(e.into()),
        }
    }
}

fn search_started(first_name: &str, route: &str, date: &str, task_id: Uuid) -> String {
    format!(
        "Safi {first_name}! 🔍 Natafuta safari za ndege: *{route}* tarehe {date}.\n\
         Nitakutumia matokeo hivi punde — utafutaji unaendelea.\n\n\
         (Searching flights for {route} on {date}. Track progress with id `{task_id}`.)"
    )
}

fn booking_acknowledged(first_name: &str) -> String {
    format!(
        "Asante {first_name}! 🎫 Nimepokea uthibitisho wako wa kukata tiketi. \
         Mshauri wetu atawasiliana nawe kukamilisha malipo na tiketi yako.\n\n\
         (Booking confirmation received — our agent will contact you to complete \
         the ticket.)"
    )
}

fn clarification() -> String {
    "Samahani, sikuelewa ombi lako. 😅 Tafadhali niambie unataka kusafiri \
     kutoka wapi, kwenda wapi, na tarehe gani.\n\n\
     Kwa mfano: *Kutoka Dar es Salaam kwenda Dubai tarehe 2026-09-15*\n\
     (Please tell me where you're flying from, where to, and on which date.)"
        .to_string()
}
