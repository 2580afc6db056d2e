//! Key-value storage for the three acceptance maps

use std::collections::BTreeMap;
use std::io;

use borsh::{BorshDeserialize, BorshSerialize};

use crate::state::{AgentId, MessageKey, MessageNumber, ProvenanceRecord, SecurityCode};

/// Storage consumed by the acceptance pipeline.
///
/// Reads return `None` for absent keys, distinct from any stored value.
/// Writes are only issued after every check of an operation passed.
pub trait MessageStore {
    fn security_code(&self, agent_id: AgentId) -> Option<SecurityCode>;

    /// Returns the code that was replaced, if any.
    fn put_security_code(&mut self, agent_id: AgentId, code: SecurityCode)
        -> Option<SecurityCode>;

    fn last_message_number(&self, agent_id: AgentId) -> Option<MessageNumber>;

    fn put_last_message_number(&mut self, agent_id: AgentId, number: MessageNumber);

    fn provenance(&self, key: MessageKey) -> Option<ProvenanceRecord>;

    /// Inserts a record unless one exists for `key`. Existing records are
    /// never replaced; returns whether the insert happened.
    fn insert_provenance(&mut self, key: MessageKey, record: ProvenanceRecord) -> bool;
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryStore {
    security_codes: BTreeMap<AgentId, SecurityCode>,
    last_message_numbers: BTreeMap<AgentId, MessageNumber>,
    provenance: BTreeMap<MessageKey, ProvenanceRecord>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Borsh encoding of all three maps.
    pub fn snapshot(&self) -> io::Result<Vec<u8>> {
        self.try_to_vec()
    }

    pub fn restore(bytes: &[u8]) -> io::Result<Self> {
        Self::try_from_slice(bytes)
    }

    pub fn agent_count(&self) -> usize {
        self.security_codes.len()
    }

    pub fn provenance_records(&self) -> impl Iterator<Item = (&MessageKey, &ProvenanceRecord)> {
        self.provenance.iter()
    }
}

impl MessageStore for InMemoryStore {
    fn security_code(&self, agent_id: AgentId) -> Option<SecurityCode> {
        self.security_codes.get(&agent_id).copied()
    }

    fn put_security_code(
        &mut self,
        agent_id: AgentId,
        code: SecurityCode,
    ) -> Option<SecurityCode> {
        self.security_codes.insert(agent_id, code)
    }

    fn last_message_number(&self, agent_id: AgentId) -> Option<MessageNumber> {
        self.last_message_numbers.get(&agent_id).copied()
    }

    fn put_last_message_number(&mut self, agent_id: AgentId, number: MessageNumber) {
        self.last_message_numbers.insert(agent_id, number);
    }

    fn provenance(&self, key: MessageKey) -> Option<ProvenanceRecord> {
        self.provenance.get(&key).copied()
    }

    fn insert_provenance(&mut self, key: MessageKey, record: ProvenanceRecord) -> bool {
        match self.provenance.entry(key) {
            std::collections::btree_map::Entry::Occupied(_) => false,
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
        }
    }
}
