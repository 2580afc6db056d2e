//! Read the provenance of an accepted shielded message

use crate::state::{AgentId, MessageKey, MessageNumber, ProvenanceRecord};
use crate::store::MessageStore;

use super::provenance_helpers;

pub fn handler<S: MessageStore + ?Sized>(
    store: &S,
    agent_id: AgentId,
    message_number: MessageNumber,
) -> Option<ProvenanceRecord> {
    provenance_helpers::lookup(store, MessageKey::new(agent_id, message_number))
}
