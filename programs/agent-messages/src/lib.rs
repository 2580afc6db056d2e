//! Agent Messages
//!
//! Accepts numbered messages from registered agents. A message is accepted
//! only if it carries the agent's current security code and its number is
//! strictly greater than the last accepted one. Plaintext submissions show
//! the message itself; shielded submissions show an attestation whose
//! public output is checked the same way.

pub mod config;
pub mod context;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod state;
pub mod store;
pub mod utils;
pub mod verifier;

pub use agent_messages_zkvm_guest::Attestation;
pub use config::{AcceptancePolicy, ProverKey, ShieldedContentCheck};
pub use context::ExecutionContext;
pub use errors::{LengthCheckedField, ProofError, RejectionKind, RejectionReason};
pub use events::AcceptanceEvent;
pub use state::{
    AgentId, CircuitString, Message, MessageContent, MessageNumber, ProofOutput,
    ProvenanceRecord, SecurityCode, SubmitterId,
};
pub use store::{InMemoryStore, MessageStore};
pub use verifier::{AttestationVerifier, SealVerifier};

use events::EventLog;
use instructions::Context;

/// The acceptance state machine over a store and an attestation verifier.
///
/// Each operation either applies all of its writes or none of them. Calls
/// are expected one transaction at a time, in submission order.
#[derive(Debug, Clone)]
pub struct MessageAcceptance<S = InMemoryStore, V = SealVerifier> {
    store: S,
    verifier: V,
    policy: AcceptancePolicy,
    events: EventLog,
}

impl MessageAcceptance {
    /// Plaintext rules: any security code length at registration, content
    /// length enforced on every submission.
    pub fn plaintext() -> Self {
        Self::with_policy(AcceptancePolicy::plaintext())
    }

    /// Shielded rules: two-character security codes, content length left to
    /// the pinned circuit, seals trusted only from `prover_key`.
    pub fn shielded(prover_key: ProverKey) -> Self {
        Self::with_policy(AcceptancePolicy::shielded().with_prover_key(prover_key))
    }

    pub fn with_policy(policy: AcceptancePolicy) -> Self {
        let verifier = SealVerifier::for_policy(&policy);
        Self::new(InMemoryStore::new(), verifier, policy)
    }
}

impl<S: MessageStore, V: AttestationVerifier> MessageAcceptance<S, V> {
    pub fn new(store: S, verifier: V, policy: AcceptancePolicy) -> Self {
        Self {
            store,
            verifier,
            policy,
            events: EventLog::default(),
        }
    }

    fn context(&mut self) -> Context<'_, S> {
        Context {
            store: &mut self.store,
            policy: &self.policy,
            events: &mut self.events,
        }
    }

    /// Register an agent, overwriting any code it had.
    ///
    /// # Arguments
    /// * `agent_id` - Agent to register
    /// * `code` - Its new security code; under the shielded policy its
    ///   logical length must be 2
    pub fn register_agent(
        &mut self,
        agent_id: AgentId,
        code: SecurityCode,
    ) -> Result<(), RejectionReason> {
        instructions::register_agent::handler(self.context(), agent_id, code)
            .inspect_err(|reason| log_rejection("register_agent", reason))
    }

    /// Submit a plaintext message.
    pub fn submit_message(&mut self, message: &Message) -> Result<(), RejectionReason> {
        instructions::submit_message::handler(self.context(), message)
            .inspect_err(|reason| log_rejection("submit_message", reason))
    }

    /// Submit an attestation in place of a message. On acceptance the
    /// provenance of `exec` is recorded under the attested agent and number.
    pub fn submit_shielded_message(
        &mut self,
        attestation: &Attestation,
        exec: &ExecutionContext,
    ) -> Result<(), RejectionReason> {
        let ctx = Context {
            store: &mut self.store,
            policy: &self.policy,
            events: &mut self.events,
        };
        instructions::submit_shielded_message::handler(ctx, &self.verifier, attestation, exec)
            .inspect_err(|reason| log_rejection("submit_shielded_message", reason))
    }

    /// Verify every attestation first, then apply the verified outputs in
    /// input order. One result per input.
    pub fn submit_shielded_messages(
        &mut self,
        batch: &[(Attestation, ExecutionContext)],
    ) -> Vec<Result<(), RejectionReason>> {
        let verified =
            verifier::verify_batch(&self.verifier, batch.iter().map(|(attestation, _)| attestation));

        verified
            .into_iter()
            .zip(batch)
            .map(|(output, (_, exec))| -> Result<(), RejectionReason> {
                let output = output?;
                instructions::submit_shielded_message::apply_verified(self.context(), &output, exec)
            })
            .map(|result| {
                result.inspect_err(|reason| log_rejection("submit_shielded_messages", reason))
            })
            .collect()
    }

    pub fn query_provenance(
        &self,
        agent_id: AgentId,
        message_number: MessageNumber,
    ) -> Option<ProvenanceRecord> {
        instructions::query_provenance::handler(&self.store, agent_id, message_number)
    }

    /// Last accepted number for `agent_id`, `MessageNumber::ZERO` if none.
    pub fn last_message_number(&self, agent_id: AgentId) -> MessageNumber {
        instructions::sequence_helpers::last_number(&self.store, agent_id)
    }

    pub fn security_code_of(&self, agent_id: AgentId) -> Option<SecurityCode> {
        instructions::directory_helpers::lookup(&self.store, agent_id)
    }

    pub fn is_registered(&self, agent_id: AgentId) -> bool {
        self.security_code_of(agent_id).is_some()
    }

    /// Drain the events recorded by committed operations. The log is
    /// bounded; see [`events::EVENT_LOG_CAPACITY`].
    pub fn take_events(&mut self) -> Vec<AcceptanceEvent> {
        self.events.take()
    }

    pub fn policy(&self) -> &AcceptancePolicy {
        &self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn verifier(&self) -> &V {
        &self.verifier
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

fn log_rejection(operation: &'static str, reason: &RejectionReason) {
    tracing::debug!(operation, kind = ?reason.kind(), %reason, "rejected");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(value: &str) -> SecurityCode {
        CircuitString::new("security_code", value).expect("fits")
    }

    #[test]
    fn test_queries_on_fresh_instance() {
        let acceptance = MessageAcceptance::plaintext();
        assert!(!acceptance.is_registered(AgentId(7)));
        assert_eq!(acceptance.last_message_number(AgentId(7)), MessageNumber::ZERO);
        assert_eq!(acceptance.security_code_of(AgentId(7)), None);
        assert_eq!(acceptance.query_provenance(AgentId(7), MessageNumber(1)), None);
    }

    #[test]
    fn test_registration_is_visible_through_queries() {
        let mut acceptance = MessageAcceptance::plaintext();
        acceptance
            .register_agent(AgentId(7), code("jb"))
            .expect("plaintext registration always succeeds");

        assert!(acceptance.is_registered(AgentId(7)));
        assert_eq!(acceptance.security_code_of(AgentId(7)), Some(code("jb")));
    }

    #[test]
    fn test_presets_pin_verifier_to_policy_circuit() {
        let shielded = MessageAcceptance::shielded([3_u8; 32]);
        assert_eq!(
            shielded.verifier().trusted(),
            shielded.policy().trusted_circuit()
        );
        assert_eq!(shielded.verifier().prover_key(), Some(&[3_u8; 32]));

        let strict = MessageAcceptance::with_policy(AcceptancePolicy {
            shielded_content_check: ShieldedContentCheck::Enforced,
            ..AcceptancePolicy::shielded()
        });
        assert_eq!(strict.verifier().prover_key(), None);
        assert_ne!(
            strict.verifier().trusted().image_id(),
            shielded.verifier().trusted().image_id()
        );
    }

    #[test]
    fn test_events_are_drained_once() {
        let mut acceptance = MessageAcceptance::plaintext();
        acceptance
            .register_agent(AgentId(7), code("jb"))
            .expect("registration");

        assert_eq!(acceptance.take_events().len(), 1);
        assert!(acceptance.take_events().is_empty());
    }
}
