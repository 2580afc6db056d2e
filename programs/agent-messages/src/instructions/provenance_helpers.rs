//! Provenance ledger for shielded submissions.

use crate::context::ExecutionContext;
use crate::errors::RejectionReason;
use crate::state::{MessageKey, MessageNumber, ProvenanceRecord};
use crate::store::MessageStore;

/// Rejects a key that already carries a record. A fresh sequence number
/// never does; this only fires on a store that disagrees with its counters.
pub fn require_unrecorded<S: MessageStore + ?Sized>(
    store: &S,
    key: MessageKey,
    last: MessageNumber,
) -> Result<(), RejectionReason> {
    match store.provenance(key) {
        Some(_) => Err(RejectionReason::NonMonotonicSequenceNumber {
            last,
            candidate: key.message_number,
        }),
        None => Ok(()),
    }
}

pub fn record<S: MessageStore + ?Sized>(
    store: &mut S,
    key: MessageKey,
    exec: &ExecutionContext,
) -> ProvenanceRecord {
    let record = exec.provenance();
    if !store.insert_provenance(key, record) {
        tracing::warn!(
            agent_id = %key.agent_id,
            message_number = %key.message_number,
            "provenance already recorded, keeping existing entry"
        );
    }
    record
}

pub fn lookup<S: MessageStore + ?Sized>(store: &S, key: MessageKey) -> Option<ProvenanceRecord> {
    store.provenance(key)
}
