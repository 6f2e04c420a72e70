//! Contact record — a phone-number-identified user and their onboarding state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::onboarding::state::ContactState;

/// A contact progressing through (or past) onboarding.
///
/// Keyed by canonical phone number. Created on the first inbound message from
/// an unseen, supported number; mutated only by the onboarding state machine;
/// never deleted. At most one candidate field is awaiting confirmation at any
/// time, and the `confirmed_*` fields are set only after an affirmative reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    /// Canonical phone number (unique key).
    pub phone_number: String,
    /// Current onboarding state.
    pub state: ContactState,
    /// Name captured but not yet confirmed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_name: Option<String>,
    /// Name the contact confirmed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_name: Option<String>,
    /// Location captured but not yet confirmed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_location: Option<String>,
    /// Location the contact confirmed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_location: Option<String>,
    /// When the contact was first seen.
    pub created_at: DateTime<Utc>,
    /// When the contact reached `Active`, if it has.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activated_at: Option<DateTime<Utc>>,
}

impl Contact {
    /// Create a fresh contact in the `New` state.
    pub fn new(phone_number: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
            state: ContactState::New,
            candidate_name: None,
            confirmed_name: None,
            candidate_location: None,
            confirmed_location: None,
            created_at: Utc::now(),
            activated_at: None,
        }
    }

    /// First name of the confirmed name, for personalized replies.
    pub fn first_name(&self) -> Option<&str> {
        self.confirmed_name
            .as_deref()
            .and_then(|n| n.split_whitespace().next())
    }
}
