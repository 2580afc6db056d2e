//! Events emitted by agent message acceptance
//!
//! Events are recorded only when an operation commits. A host drains them
//! with `MessageAcceptance::take_events`. An undrained log keeps the newest
//! [`EVENT_LOG_CAPACITY`] events and counts the ones it dropped.

use std::collections::VecDeque;

use crate::state::{AgentId, MessageNumber, ProvenanceRecord};

pub const EVENT_LOG_CAPACITY: usize = 4096;

/// Emitted when an agent's security code is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentRegistered {
    pub agent_id: AgentId,
    /// Whether an earlier code was overwritten
    pub replaced: bool,
}

/// Emitted when a plaintext message is accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageAccepted {
    pub agent_id: AgentId,
    pub message_number: MessageNumber,
}

/// Emitted when a shielded message is accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShieldedMessageAccepted {
    pub agent_id: AgentId,
    pub message_number: MessageNumber,
    pub provenance: ProvenanceRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptanceEvent {
    AgentRegistered(AgentRegistered),
    MessageAccepted(MessageAccepted),
    ShieldedMessageAccepted(ShieldedMessageAccepted),
}

impl From<AgentRegistered> for AcceptanceEvent {
    fn from(event: AgentRegistered) -> Self {
        Self::AgentRegistered(event)
    }
}

impl From<MessageAccepted> for AcceptanceEvent {
    fn from(event: MessageAccepted) -> Self {
        Self::MessageAccepted(event)
    }
}

impl From<ShieldedMessageAccepted> for AcceptanceEvent {
    fn from(event: ShieldedMessageAccepted) -> Self {
        Self::ShieldedMessageAccepted(event)
    }
}

#[derive(Debug, Clone)]
pub struct EventLog {
    events: VecDeque<AcceptanceEvent>,
    capacity: usize,
    dropped: u64,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::with_capacity(EVENT_LOG_CAPACITY)
    }
}

impl EventLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::new(),
            capacity: capacity.max(1),
            dropped: 0,
        }
    }

    /// Appends `event`, evicting the oldest one when the log is full.
    pub fn emit(&mut self, event: impl Into<AcceptanceEvent>) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
            self.dropped += 1;
            tracing::warn!(
                capacity = self.capacity,
                dropped = self.dropped,
                "event log full, oldest event dropped"
            );
        }
        self.events.push_back(event.into());
    }

    /// Drains every retained event in emit order.
    pub fn take(&mut self) -> Vec<AcceptanceEvent> {
        self.events.drain(..).collect()
    }

    /// Events evicted since the log was created.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
