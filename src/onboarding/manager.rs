//! Onboarding dialog driver — consumes inbound text, mutates the contact,
//! and produces the reply.
//!
//! Every invalid input is locally recoverable: the machine re-prompts and
//! stays put. There is no retry limit; that is intentional.

use tracing::debug;

use crate::contacts::model::Contact;

use super::prompts;
use super::state::ContactState;
use super::validators::{self, Affirmation};

/// Drive the onboarding state machine one step with an inbound message.
///
/// The caller holds the contact's per-key lock for the duration, so two
/// concurrent messages from the same number cannot interleave here. Returns
/// the reply text to send back on the same channel.
pub fn handle_message(contact: &mut Contact, text: &str) -> String {
    let text = text.trim();
    let from = contact.state;

    let reply = match contact.state {
        ContactState::New => {
            // The greeting content itself is not validated; any first message
            // advances the machine.
            contact.state = ContactState::AwaitingName;
            prompts::greeting()
        }
        ContactState::AwaitingName => match validators::validate_name(text) {
            Some(name) => {
                contact.candidate_name = Some(name.clone());
                contact.state = ContactState::AwaitingNameConfirm;
                prompts::confirm_name(&name)
            }
            None => prompts::invalid_name(),
        },
        ContactState::AwaitingNameConfirm => match validators::classify_affirmation(text) {
            Affirmation::Yes => {
                contact.confirmed_name = contact.candidate_name.take();
                contact.state = ContactState::AwaitingLocation;
                let first = contact
                    .confirmed_name
                    .as_deref()
                    .and_then(|n| n.split_whitespace().next())
                    .unwrap_or("rafiki");
                prompts::ask_location(first)
            }
            Affirmation::No => {
                contact.candidate_name = None;
                contact.state = ContactState::AwaitingName;
                prompts::reenter_name()
            }
            Affirmation::Unrecognized => {
                let name = contact.candidate_name.as_deref().unwrap_or("");
                format!("{}\n\n{}", prompts::reconfirm_name(), prompts::confirm_name(name))
            }
        },
        ContactState::AwaitingLocation => {
            // Any non-empty text is accepted as a candidate location.
            if text.is_empty() {
                prompts::reenter_location()
            } else {
                contact.candidate_location = Some(text.to_string());
                contact.state = ContactState::AwaitingLocationConfirm;
                prompts::confirm_location(text)
            }
        }
        ContactState::AwaitingLocationConfirm => match validators::classify_affirmation(text) {
            Affirmation::Yes => {
                contact.confirmed_location = contact.candidate_location.take();
                contact.state = ContactState::Active;
                contact.activated_at = Some(chrono::Utc::now());
                let first = contact.first_name().unwrap_or("rafiki").to_string();
                let location = contact
                    .confirmed_location
                    .as_deref()
                    .unwrap_or("Tanzania")
                    .to_string();
                prompts::welcome(&first, &location)
            }
            Affirmation::No => {
                contact.candidate_location = None;
                contact.state = ContactState::AwaitingLocation;
                prompts::reenter_location()
            }
            Affirmation::Unrecognized => {
                let location = contact.candidate_location.as_deref().unwrap_or("");
                format!(
                    "{}\n\n{}",
                    prompts::reconfirm_location(),
                    prompts::confirm_location(location)
                )
            }
        },
        // The gateway routes Active contacts to the intent parser; reaching
        // here means a caller skipped that check.
        ContactState::Active => prompts::welcome(
            contact.first_name().unwrap_or("rafiki"),
            contact.confirmed_location.as_deref().unwrap_or("Tanzania"),
        ),
    };

    if contact.state != from {
        debug!(
            phone = %contact.phone_number,
            from = %from,
            to = %contact.state,
            "Onboarding transition"
        );
    }

    reply
}
