//! Sequence guard: the last accepted message number per agent.
//!
//! Checking and committing are separate so that a later check can still
//! reject without the counter having moved.

use crate::errors::RejectionReason;
use crate::state::{AgentId, MessageNumber};
use crate::store::MessageStore;

pub fn last_number<S: MessageStore + ?Sized>(store: &S, agent_id: AgentId) -> MessageNumber {
    store.last_message_number(agent_id).unwrap_or(MessageNumber::ZERO)
}

pub fn check_advance<S: MessageStore + ?Sized>(
    store: &S,
    agent_id: AgentId,
    candidate: MessageNumber,
) -> Result<(), RejectionReason> {
    let last = last_number(store, agent_id);
    if candidate > last {
        Ok(())
    } else {
        Err(RejectionReason::NonMonotonicSequenceNumber { last, candidate })
    }
}

/// Persists `candidate`. Callers must have passed `check_advance` first.
pub fn commit_advance<S: MessageStore + ?Sized>(
    store: &mut S,
    agent_id: AgentId,
    candidate: MessageNumber,
) {
    store.put_last_message_number(agent_id, candidate);
}
