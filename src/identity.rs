//! Participant identity and communication direction.
//!
//! Every communication row names exactly two parties: the counterparty, found
//! in the handle directory by row id, and the local account, named by the
//! row's destination caller id. Which of the two is the sender depends only on
//! `is_from_me`.

use serde::{Deserialize, Serialize};

use crate::handles::HandleDirectory;
use crate::models::{AttachmentRow, HiddenMessageRow, MessageRow};

/// True iff the identifier contains `@`.
#[must_use]
pub fn is_email(identifier: Option<&str>) -> bool {
    identifier.is_some_and(|id| id.contains('@'))
}

/// One side of a communication.
///
/// When an identifier is known exactly one of `phone_number` and `email` is
/// set. `handle_id` is only ever set on the counterparty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Phone number, when the identifier is not an email
    pub phone_number: Option<String>,
    /// Email, when the identifier contains `@`
    pub email: Option<String>,
    /// Country code
    pub country: Option<String>,
    /// Counterparty handle row id
    pub handle_id: Option<i64>,
}

impl Participant {
    /// Classify an identifier into the phone or email slot.
    #[must_use]
    pub fn from_identifier(identifier: Option<&str>, country: Option<String>, handle_id: Option<i64>) -> Self {
        let (phone_number, email) = if is_email(identifier) {
            (None, identifier.map(String::from))
        } else {
            (identifier.map(String::from), None)
        };
        Self { phone_number, email, country, handle_id }
    }

    /// Flattened display value: phone, else email, else empty.
    #[must_use]
    pub fn display(&self) -> &str {
        self.phone_number.as_deref().or(self.email.as_deref()).unwrap_or("")
    }
}

/// Sender and receiver of one communication.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Direction {
    /// Author of the communication
    pub sender: Participant,
    /// Recipient of the communication
    pub receiver: Participant,
}

/// The fields direction resolution needs from a row.
pub trait CommunicationRow {
    /// Whether the local account authored the row
    fn is_from_me(&self) -> bool;
    /// Counterparty handle row id, if recorded
    fn handle_id(&self) -> Option<i64>;
    /// Local account identifier, if recorded
    fn destination_caller_id(&self) -> Option<&str>;
}

/// Resolve sender and receiver for a row.
///
/// A row without a handle id is treated as handle `0`, so the counterparty
/// always carries a handle id and the local side never does.
#[must_use]
pub fn resolve_direction(row: &impl CommunicationRow, directory: &HandleDirectory) -> Direction {
    let handle_id = row.handle_id().unwrap_or(0);
    let counterparty = directory.by_row_id(handle_id).map_or_else(
        || Participant::from_identifier(None, None, Some(handle_id)),
        |entry| Participant::from_identifier(entry.identifier.as_deref(), entry.country.clone(), Some(handle_id)),
    );

    let caller_id = row.destination_caller_id();
    let country = caller_id.and_then(|id| directory.by_identifier(id)).and_then(|entry| entry.country.clone());
    let me = Participant::from_identifier(caller_id, country, None);

    if row.is_from_me() {
        Direction { sender: me, receiver: counterparty }
    } else {
        Direction { sender: counterparty, receiver: me }
    }
}

macro_rules! impl_communication_row {
    ($($row:ty),+) => {
        $(
            impl CommunicationRow for $row {
                fn is_from_me(&self) -> bool {
                    self.is_from_me
                }

                fn handle_id(&self) -> Option<i64> {
                    self.handle_id
                }

                fn destination_caller_id(&self) -> Option<&str> {
                    self.destination_caller_id.as_deref()
                }
            }
        )+
    };
}

impl_communication_row!(MessageRow, AttachmentRow, HiddenMessageRow);
