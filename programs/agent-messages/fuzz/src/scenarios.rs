//! Fuzz testing scenarios that drive the acceptance state machine
//!
//! Every simulated operation runs against a real `MessageAcceptance`. State
//! is captured before and after so invariants can be checked per step.

use agent_messages::{
    AcceptancePolicy, AgentId, Attestation, CircuitString, ExecutionContext, InMemoryStore,
    Message, MessageAcceptance, MessageStore, RejectionKind, RejectionReason, SubmitterId,
};
use agent_messages_zkvm_host::{generate_proof, ProveRequest, Prover};

use crate::arbitrary::{Operation, Tamper};
use crate::invariants::*;

/// Result of a simulated operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationResult {
    Success,
    Rejected(RejectionKind),
    /// Inputs the operation can never see, e.g. a string over capacity
    Skipped,
    InvariantViolation(String),
}

impl SimulationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, SimulationResult::Success)
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, SimulationResult::Rejected(_))
    }

    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, SimulationResult::InvariantViolation(_))
    }
}

/// Acceptance instance plus a simulated ledger handing out heights and nonces
pub struct SimulatedLedger {
    pub acceptance: MessageAcceptance,
    /// The prover whose key the policy pins
    pub prover: Prover,
    pub block_height: u64,
    pub nonce: u64,
    pub sender: SubmitterId,
}

impl SimulatedLedger {
    pub fn new(policy: AcceptancePolicy) -> Self {
        let prover = Prover::from_seed([0x42; 32]);
        Self {
            acceptance: MessageAcceptance::with_policy(policy.with_prover_key(prover.prover_key())),
            prover,
            block_height: 1,
            nonce: 0,
            sender: SubmitterId([0x5a; 32]),
        }
    }

    pub fn plaintext() -> Self {
        Self::new(AcceptancePolicy::plaintext())
    }

    pub fn shielded() -> Self {
        Self::new(AcceptancePolicy::shielded())
    }

    /// Next transaction context. Heights advance every four transactions.
    pub fn next_context(&mut self) -> ExecutionContext {
        self.nonce += 1;
        if self.nonce % 4 == 0 {
            self.block_height += 1;
        }
        ExecutionContext::new(self.sender, self.block_height, self.nonce)
    }

    /// Directly seed an agent, bypassing policy checks.
    pub fn seed_agent(&mut self, agent_id: u32, code: &str, last_number: u32) -> bool {
        let Ok(code) = CircuitString::new("security_code", code) else {
            return false;
        };
        let mut store = self.acceptance.store().clone();
        store.put_security_code(AgentId(agent_id), code);
        if last_number > 0 {
            store.put_last_message_number(AgentId(agent_id), last_number.into());
        }
        self.acceptance = MessageAcceptance::new(
            store,
            *self.acceptance.verifier(),
            self.acceptance.policy().clone(),
        );
        true
    }
}

fn violation(label: &str, detail: impl std::fmt::Debug) -> SimulationResult {
    SimulationResult::InvariantViolation(format!("{label}: {detail:?}"))
}

// ============================================================================
// Register Agent Simulation
// ============================================================================

pub fn simulate_register_agent(
    ledger: &mut SimulatedLedger,
    agent_id: u32,
    security_code: &str,
) -> SimulationResult {
    let Ok(code) = CircuitString::new("security_code", security_code) else {
        return SimulationResult::Skipped;
    };
    let before = ledger.acceptance.store().clone();

    match ledger.acceptance.register_agent(AgentId(agent_id), code) {
        Ok(()) => {
            if ledger.acceptance.security_code_of(AgentId(agent_id)) != Some(code) {
                return violation("registered code not stored", agent_id);
            }
            // Registration never touches counters or provenance.
            let counter_before = before
                .last_message_number(AgentId(agent_id))
                .unwrap_or_default();
            if ledger.acceptance.last_message_number(AgentId(agent_id)) != counter_before {
                return violation("registration moved counter", agent_id);
            }
            SimulationResult::Success
        }
        Err(reason) => {
            let result = check_unchanged_on_rejection(&before, ledger.acceptance.store());
            if result != AtomicityInvariantResult::Valid {
                return violation("A1", result);
            }
            SimulationResult::Rejected(reason.kind())
        }
    }
}

// ============================================================================
// Submit Message Simulation
// ============================================================================

pub fn simulate_submit_message(
    ledger: &mut SimulatedLedger,
    agent_id: u32,
    message_number: u32,
    content: &str,
    security_code: &str,
) -> SimulationResult {
    let Ok(message) = Message::new(message_number, agent_id, content, security_code) else {
        return SimulationResult::Skipped;
    };
    let before = ledger.acceptance.store().clone();
    let outcome = ledger.acceptance.submit_message(&message);
    check_step(&before, ledger, message.agent_id, message.number.0, outcome, None)
}

// ============================================================================
// Submit Shielded Message Simulation
// ============================================================================

/// Proves the message with the default circuit, applies `tamper`, submits.
pub fn prove_for_submission(
    prover: &Prover,
    agent_id: u32,
    message_number: u32,
    content: &str,
    security_code: &str,
    tamper: Tamper,
) -> Option<Attestation> {
    let mut attestation =
        generate_proof(prover, &ProveRequest::new(agent_id, message_number, content, security_code))
            .ok()?;

    match tamper {
        Tamper::None => {}
        Tamper::FlipJournalByte(index) => {
            let index = index % attestation.journal.len();
            attestation.journal[index] ^= 0x01;
        }
        Tamper::FlipSealByte(index) => {
            let index = index % attestation.seal_bytes.len();
            attestation.seal_bytes[index] ^= 0x01;
        }
        Tamper::TruncateSeal => {
            attestation.seal_bytes.pop();
        }
        Tamper::WrongImageId => {
            attestation.image_id[0] ^= 0xff;
        }
    }

    Some(attestation)
}

pub fn simulate_submit_shielded_message(
    ledger: &mut SimulatedLedger,
    agent_id: u32,
    message_number: u32,
    content: &str,
    security_code: &str,
    tamper: Tamper,
) -> SimulationResult {
    let Some(attestation) = prove_for_submission(
        &ledger.prover,
        agent_id,
        message_number,
        content,
        security_code,
        tamper,
    ) else {
        return SimulationResult::Skipped;
    };

    let exec = ledger.next_context();
    let before = ledger.acceptance.store().clone();
    let outcome = ledger.acceptance.submit_shielded_message(&attestation, &exec);

    if tamper != Tamper::None && outcome.is_ok() {
        return violation("tampered attestation accepted", tamper);
    }

    check_step(
        &before,
        ledger,
        AgentId(agent_id),
        message_number,
        outcome,
        Some(exec),
    )
}

fn check_step(
    before: &InMemoryStore,
    ledger: &SimulatedLedger,
    agent_id: AgentId,
    message_number: u32,
    outcome: Result<(), RejectionReason>,
    exec: Option<ExecutionContext>,
) -> SimulationResult {
    let after = ledger.acceptance.store();
    let counter_before = before.last_message_number(agent_id).unwrap_or_default();
    let counter_after = ledger.acceptance.last_message_number(agent_id);

    let result = check_counter_monotonic(counter_before, counter_after);
    if result != SequenceInvariantResult::Valid {
        return violation("S1", result);
    }

    let result = check_provenance_immutable(before, after);
    if result != ProvenanceInvariantResult::Valid {
        return violation("P3", result);
    }

    match outcome {
        Ok(()) => {
            let result =
                check_accepted_advance(counter_before, message_number.into(), counter_after);
            if result != SequenceInvariantResult::Valid {
                return violation("S2/S3", result);
            }

            if let Some(exec) = exec {
                let recorded = ledger
                    .acceptance
                    .query_provenance(agent_id, message_number.into());
                let result = check_provenance_recorded(exec.provenance(), recorded);
                if result != ProvenanceInvariantResult::Valid {
                    return violation("P1/P2", result);
                }
            }

            SimulationResult::Success
        }
        Err(reason) => {
            let result = check_unchanged_on_rejection(before, after);
            if result != AtomicityInvariantResult::Valid {
                return violation("A1", result);
            }
            SimulationResult::Rejected(reason.kind())
        }
    }
}

// ============================================================================
// Operation Sequences
// ============================================================================

pub fn simulate_operation(ledger: &mut SimulatedLedger, operation: &Operation) -> SimulationResult {
    match operation {
        Operation::Register {
            agent_id,
            security_code,
        } => simulate_register_agent(ledger, *agent_id, security_code),
        Operation::Submit {
            agent_id,
            message_number,
            content,
            security_code,
        } => simulate_submit_message(ledger, *agent_id, *message_number, content, security_code),
        Operation::SubmitShielded {
            agent_id,
            message_number,
            security_code,
            tamper,
        } => simulate_submit_shielded_message(
            ledger,
            *agent_id,
            *message_number,
            "iamjamesbond",
            security_code,
            *tamper,
        ),
    }
}

/// Runs every operation, stopping at the first invariant violation.
pub fn simulate_operations(
    ledger: &mut SimulatedLedger,
    operations: &[Operation],
) -> Vec<SimulationResult> {
    let mut results = Vec::with_capacity(operations.len());
    for operation in operations {
        let result = simulate_operation(ledger, operation);
        let stop = result.is_invariant_violation();
        results.push(result);
        if stop {
            break;
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_scenario_through_simulation() {
        let mut ledger = SimulatedLedger::plaintext();

        assert_eq!(
            simulate_submit_message(&mut ledger, 7, 1, "iamjamesbond", "jb"),
            SimulationResult::Rejected(RejectionKind::AgentNotRegistered)
        );
        assert!(simulate_register_agent(&mut ledger, 7, "jb").is_success());
        assert!(simulate_submit_message(&mut ledger, 7, 1, "iamjamesbond", "jb").is_success());
        assert_eq!(
            simulate_submit_message(&mut ledger, 7, 2, "iamjamesbond", "aa"),
            SimulationResult::Rejected(RejectionKind::InvalidSecurityCode)
        );
        assert_eq!(
            simulate_submit_message(&mut ledger, 7, 3, "iamjames", "jb"),
            SimulationResult::Rejected(RejectionKind::InvalidContentLength)
        );
        assert_eq!(
            simulate_submit_message(&mut ledger, 7, 0, "iamjamesbond", "jb"),
            SimulationResult::Rejected(RejectionKind::NonMonotonicSequenceNumber)
        );
    }

    #[test]
    fn test_ledger_contexts_are_monotonic() {
        let mut ledger = SimulatedLedger::shielded();
        let first = ledger.next_context();
        let second = ledger.next_context();
        assert!(second.nonce > first.nonce);
        assert!(second.block_height >= first.block_height);
    }

    #[test]
    fn test_seed_agent_sets_counter() {
        let mut ledger = SimulatedLedger::plaintext();
        assert!(ledger.seed_agent(3, "jb", 10));
        assert_eq!(
            simulate_submit_message(&mut ledger, 3, 10, "iamjamesbond", "jb"),
            SimulationResult::Rejected(RejectionKind::NonMonotonicSequenceNumber)
        );
        assert!(simulate_submit_message(&mut ledger, 3, 11, "iamjamesbond", "jb").is_success());
    }

    #[test]
    fn test_tampered_shielded_submission_is_rejected() {
        let mut ledger = SimulatedLedger::shielded();
        assert!(simulate_register_agent(&mut ledger, 1, "jb").is_success());

        assert_eq!(
            simulate_submit_shielded_message(
                &mut ledger,
                1,
                1,
                "iamjamesbond",
                "jb",
                Tamper::WrongImageId,
            ),
            SimulationResult::Rejected(RejectionKind::InvalidProof)
        );
        assert!(simulate_submit_shielded_message(
            &mut ledger,
            1,
            1,
            "iamjamesbond",
            "jb",
            Tamper::None,
        )
        .is_success());
    }

    #[test]
    fn test_outsider_seal_is_rejected() {
        let mut ledger = SimulatedLedger::shielded();
        assert!(simulate_register_agent(&mut ledger, 1, "jb").is_success());

        let outsider = Prover::from_seed([0x99; 32]);
        let attestation =
            prove_for_submission(&outsider, 1, 1, "iamjamesbond", "jb", Tamper::None)
                .expect("outsider can run the circuit");
        let exec = ledger.next_context();
        let err = ledger
            .acceptance
            .submit_shielded_message(&attestation, &exec)
            .expect_err("seal from an unpinned prover");
        assert_eq!(err.kind(), RejectionKind::InvalidProof);
    }
}
