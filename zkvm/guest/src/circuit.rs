//! The message circuit: turns a private message into its public output.
//!
//! Code in this module is written the way it has to run inside a proof
//! circuit. Loops have a fixed trip count and never exit early.

use std::fmt;

use crate::{seal, CircuitChars, JournalFields, CIRCUIT_STRING_CAPACITY};

/// Logical content length a message must have.
pub const REQUIRED_CONTENT_LENGTH: usize = 12;

/// Whether the circuit enforces the content length or only computes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentCheck {
    /// Length is computed, never asserted. Default for shielded submissions.
    #[default]
    Disabled,
    Enforced,
}

impl ContentCheck {
    pub fn as_byte(self) -> u8 {
        match self {
            Self::Disabled => 0,
            Self::Enforced => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitDescriptor {
    pub name: &'static str,
    pub content_check: ContentCheck,
}

pub const VERIFY_MESSAGE: CircuitDescriptor = CircuitDescriptor {
    name: "verify-message",
    content_check: ContentCheck::Disabled,
};

pub const VERIFY_MESSAGE_STRICT: CircuitDescriptor = CircuitDescriptor {
    name: "verify-message-strict",
    content_check: ContentCheck::Enforced,
};

pub const CIRCUITS: [CircuitDescriptor; 2] = [VERIFY_MESSAGE, VERIFY_MESSAGE_STRICT];

impl CircuitDescriptor {
    pub fn find(name: &str) -> Option<&'static CircuitDescriptor> {
        CIRCUITS.iter().find(|circuit| circuit.name == name)
    }

    pub fn for_content_check(check: ContentCheck) -> &'static CircuitDescriptor {
        match check {
            ContentCheck::Disabled => &CIRCUITS[0],
            ContentCheck::Enforced => &CIRCUITS[1],
        }
    }

    pub fn image_id(&self) -> seal::ImageId {
        seal::image_id_for(self.name, self.content_check)
    }
}

/// Private input of the circuit. Never leaves the submitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrivateMessage {
    pub number: u32,
    pub agent_id: u32,
    pub content: CircuitChars,
    pub security_code: CircuitChars,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitError {
    ContentLength { expected: usize, actual: usize },
}

impl fmt::Display for CircuitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContentLength { expected, actual } => {
                write!(
                    f,
                    "message content length is not {expected} characters (got {actual})"
                )
            }
        }
    }
}

impl std::error::Error for CircuitError {}

/// Index of the first `0` terminator, or the capacity if there is none.
///
/// Every position is visited and selected arithmetically, matching the
/// flattened control flow of the circuit.
pub fn logical_length(chars: &CircuitChars) -> usize {
    let mut length = CIRCUIT_STRING_CAPACITY;
    let mut found = 0_usize;

    for (index, character) in chars.iter().enumerate() {
        let is_terminator = usize::from(*character == 0);
        let is_first = is_terminator & (1 - found);
        length = is_first * index + (1 - is_first) * length;
        found |= is_terminator;
    }

    length
}

pub fn verify_message_circuit(
    message: &PrivateMessage,
    check: ContentCheck,
) -> Result<JournalFields, CircuitError> {
    let content_length = logical_length(&message.content);

    // With `ContentCheck::Disabled` the length is computed and discarded.
    if check == ContentCheck::Enforced && content_length != REQUIRED_CONTENT_LENGTH {
        return Err(CircuitError::ContentLength {
            expected: REQUIRED_CONTENT_LENGTH,
            actual: content_length,
        });
    }

    Ok(JournalFields {
        agent_id: message.agent_id,
        message_number: message.number,
        security_code: message.security_code,
    })
}
