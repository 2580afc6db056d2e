//! Per-transaction context supplied by the ledger

use crate::state::{ProvenanceRecord, SubmitterId};

/// Who submitted a transaction, at which height, with which nonce.
///
/// Values are taken verbatim. The ledger is responsible for their meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecutionContext {
    pub sender: SubmitterId,
    pub block_height: u64,
    pub nonce: u64,
}

impl ExecutionContext {
    pub fn new(sender: SubmitterId, block_height: u64, nonce: u64) -> Self {
        Self {
            sender,
            block_height,
            nonce,
        }
    }

    pub fn provenance(&self) -> ProvenanceRecord {
        ProvenanceRecord {
            block_height: self.block_height,
            sender: self.sender,
            nonce: self.nonce,
        }
    }
}
