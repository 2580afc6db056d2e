//! Rejection reasons for agent message acceptance
//!
//! Every rejection is an ordinary outcome. The pipeline stops at the first
//! failing check and commits nothing.

use std::fmt;

use agent_messages_zkvm_guest::{JournalError, Selector};
use thiserror::Error;

use crate::state::MessageNumber;

/// Which buffer failed a length check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LengthCheckedField {
    MessageContent,
    SecurityCode,
}

impl fmt::Display for LengthCheckedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MessageContent => f.write_str("message content"),
            Self::SecurityCode => f.write_str("security code"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionReason {
    #[error("agent isn't registered")]
    AgentNotRegistered,

    #[error("security code for agent is invalid")]
    InvalidSecurityCode,

    #[error("{field} length is not {expected} characters")]
    InvalidContentLength {
        field: LengthCheckedField,
        expected: usize,
        actual: usize,
    },

    #[error("message number isn't greater than the last one")]
    NonMonotonicSequenceNumber {
        last: MessageNumber,
        candidate: MessageNumber,
    },

    #[error("invalid proof: {0}")]
    InvalidProof(#[from] ProofError),
}

/// Fieldless mirror of [`RejectionReason`] for callers matching on kind only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionKind {
    AgentNotRegistered,
    InvalidSecurityCode,
    InvalidContentLength,
    NonMonotonicSequenceNumber,
    InvalidProof,
}

impl RejectionReason {
    pub fn kind(&self) -> RejectionKind {
        match self {
            Self::AgentNotRegistered => RejectionKind::AgentNotRegistered,
            Self::InvalidSecurityCode => RejectionKind::InvalidSecurityCode,
            Self::InvalidContentLength { .. } => RejectionKind::InvalidContentLength,
            Self::NonMonotonicSequenceNumber { .. } => RejectionKind::NonMonotonicSequenceNumber,
            Self::InvalidProof(_) => RejectionKind::InvalidProof,
        }
    }
}

/// Why an attestation failed verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProofError {
    #[error("untrusted image id")]
    UntrustedImageId,

    #[error("unexpected journal length: expected {expected}, got {actual}")]
    UnexpectedJournalLength { expected: usize, actual: usize },

    #[error("seal encoding is invalid: {0}")]
    InvalidSealEncoding(String),

    #[error("untrusted selector: expected {expected:?}, got {actual:?}")]
    UntrustedSelector { expected: Selector, actual: Selector },

    #[error("no trusted prover key is configured")]
    NoTrustedProver,

    #[error("pinned prover key is not a valid public key")]
    InvalidProverKey,

    #[error("seal signature does not match journal")]
    SealMismatch,

    #[error("malformed journal: {0}")]
    MalformedJournal(JournalError),
}
