//! State structures for agent message acceptance

use std::fmt;

use agent_messages_zkvm_guest::{
    circuit_chars_from_str, CircuitChars, JournalError, JournalFields, CIRCUIT_STRING_CAPACITY,
};
use borsh::{BorshDeserialize, BorshSerialize};

use crate::utils::validation::logical_length;

/// Capacity of every character buffer handled by the acceptance pipeline.
pub const STRING_CAPACITY: usize = CIRCUIT_STRING_CAPACITY;

/// Agent identifier. Not assumed dense or bounded.
#[derive(
    BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct AgentId(pub u32);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for AgentId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Per-agent message counter. Absent counters read as `ZERO`.
#[derive(
    BorshSerialize,
    BorshDeserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
)]
pub struct MessageNumber(pub u32);

impl MessageNumber {
    pub const ZERO: Self = Self(0);
}

impl fmt::Display for MessageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for MessageNumber {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Fixed-capacity character buffer, one code point per position, terminated
/// by the first `0`.
///
/// Equality compares logical contents only, so positions past the terminator
/// never make two strings differ.
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy)]
pub struct CircuitString {
    chars: CircuitChars,
}

pub type SecurityCode = CircuitString;
pub type MessageContent = CircuitString;

impl CircuitString {
    pub fn new(field: &'static str, value: &str) -> Result<Self, JournalError> {
        Ok(Self {
            chars: circuit_chars_from_str(field, value)?,
        })
    }

    pub fn from_chars(chars: CircuitChars) -> Self {
        Self { chars }
    }

    pub fn as_chars(&self) -> &CircuitChars {
        &self.chars
    }

    pub fn logical_len(&self) -> usize {
        logical_length(&self.chars, STRING_CAPACITY)
    }

    pub fn logical_chars(&self) -> &[u32] {
        &self.chars[..self.logical_len()]
    }
}

impl PartialEq for CircuitString {
    fn eq(&self, other: &Self) -> bool {
        self.logical_chars() == other.logical_chars()
    }
}

impl Eq for CircuitString {}

/// Logical contents; positions that are not valid scalar values print as U+FFFD.
impl fmt::Display for CircuitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.logical_chars()
            .iter()
            .map(|code_point| char::from_u32(*code_point).unwrap_or(char::REPLACEMENT_CHARACTER))
            .try_for_each(|character| fmt::Write::write_char(f, character))
    }
}

impl fmt::Debug for CircuitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CircuitString")
            .field(&self.to_string())
            .finish()
    }
}

/// The unit a submitter constructs. Only the plaintext path sees it whole.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub number: MessageNumber,
    pub agent_id: AgentId,
    pub content: MessageContent,
    pub security_code: SecurityCode,
}

impl Message {
    pub fn new(
        number: u32,
        agent_id: u32,
        content: &str,
        security_code: &str,
    ) -> Result<Self, JournalError> {
        Ok(Self {
            number: MessageNumber(number),
            agent_id: AgentId(agent_id),
            content: CircuitString::new("content", content)?,
            security_code: CircuitString::new("security_code", security_code)?,
        })
    }
}

/// Trusted public output of a verified attestation.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProofOutput {
    pub agent_id: AgentId,
    pub message_number: MessageNumber,
    pub security_code: SecurityCode,
}

impl From<JournalFields> for ProofOutput {
    fn from(fields: JournalFields) -> Self {
        Self {
            agent_id: AgentId(fields.agent_id),
            message_number: MessageNumber(fields.message_number),
            security_code: CircuitString::from_chars(fields.security_code),
        }
    }
}

/// Submitter identity as reported by the execution context.
#[derive(
    BorshSerialize,
    BorshDeserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
)]
pub struct SubmitterId(pub [u8; 32]);

/// Written once per accepted shielded message, never modified.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvenanceRecord {
    pub block_height: u64,
    pub sender: SubmitterId,
    pub nonce: u64,
}

#[derive(
    BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct MessageKey {
    pub agent_id: AgentId,
    pub message_number: MessageNumber,
}

impl MessageKey {
    pub fn new(agent_id: AgentId, message_number: MessageNumber) -> Self {
        Self {
            agent_id,
            message_number,
        }
    }
}
