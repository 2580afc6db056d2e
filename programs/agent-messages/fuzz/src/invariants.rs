//! Acceptance invariant checking for fuzz testing
//!
//! Each checker compares state observed before and after one operation.

use agent_messages::{InMemoryStore, MessageNumber, ProvenanceRecord};
use agent_messages_zkvm_guest::CircuitChars;

/// Sequence invariant results
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceInvariantResult {
    Valid,
    /// S1: the counter moved backwards
    CounterDecreased { before: u32, after: u32 },
    /// S2: an accepted number was not above the previous counter
    AcceptedNonIncreasing { last: u32, accepted: u32 },
    /// S3: an acceptance left the counter somewhere other than the number
    CounterNotAdvanced { expected: u32, actual: u32 },
}

/// Atomicity invariant results
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtomicityInvariantResult {
    Valid,
    /// A1: a rejected operation changed stored state
    StateChangedOnRejection,
}

/// Provenance invariant results
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvenanceInvariantResult {
    Valid,
    /// P1: an accepted shielded message left no record
    Missing,
    /// P2: the record differs from the execution context
    Mismatch { expected: ProvenanceRecord, actual: ProvenanceRecord },
    /// P3: an existing record changed or vanished
    Overwritten,
}

/// Length agreement results
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LengthInvariantResult {
    Valid,
    /// L1: the direct scan and the circuit scan disagree
    ScanMismatch { direct: usize, circuit: usize },
}

// ============================================================================
// Sequence Invariants (S1-S3)
// ============================================================================

/// S1: Monotonic counter
pub fn check_counter_monotonic(before: MessageNumber, after: MessageNumber) -> SequenceInvariantResult {
    if after < before {
        SequenceInvariantResult::CounterDecreased {
            before: before.0,
            after: after.0,
        }
    } else {
        SequenceInvariantResult::Valid
    }
}

/// S2 + S3: Accepted numbers strictly advance the counter to themselves
pub fn check_accepted_advance(
    before: MessageNumber,
    accepted: MessageNumber,
    after: MessageNumber,
) -> SequenceInvariantResult {
    if accepted <= before {
        return SequenceInvariantResult::AcceptedNonIncreasing {
            last: before.0,
            accepted: accepted.0,
        };
    }
    if after != accepted {
        return SequenceInvariantResult::CounterNotAdvanced {
            expected: accepted.0,
            actual: after.0,
        };
    }
    SequenceInvariantResult::Valid
}

// ============================================================================
// Atomicity Invariants (A1)
// ============================================================================

/// A1: No partial mutation on rejection
pub fn check_unchanged_on_rejection(
    before: &InMemoryStore,
    after: &InMemoryStore,
) -> AtomicityInvariantResult {
    if before == after {
        AtomicityInvariantResult::Valid
    } else {
        AtomicityInvariantResult::StateChangedOnRejection
    }
}

// ============================================================================
// Provenance Invariants (P1-P3)
// ============================================================================

/// P1 + P2: Record written exactly from the execution context
pub fn check_provenance_recorded(
    expected: ProvenanceRecord,
    actual: Option<ProvenanceRecord>,
) -> ProvenanceInvariantResult {
    match actual {
        None => ProvenanceInvariantResult::Missing,
        Some(actual) if actual != expected => {
            ProvenanceInvariantResult::Mismatch { expected, actual }
        }
        Some(_) => ProvenanceInvariantResult::Valid,
    }
}

/// P3: Every record present before is present and identical after
pub fn check_provenance_immutable(
    before: &InMemoryStore,
    after: &InMemoryStore,
) -> ProvenanceInvariantResult {
    let mut after_records = after.provenance_records();
    for (key, record) in before.provenance_records() {
        // Both iterate in key order and records are never removed.
        let unchanged = after_records
            .by_ref()
            .find(|(after_key, _)| *after_key == key)
            .is_some_and(|(_, after_record)| after_record == record);
        if !unchanged {
            return ProvenanceInvariantResult::Overwritten;
        }
    }
    ProvenanceInvariantResult::Valid
}

// ============================================================================
// Length Invariants (L1)
// ============================================================================

/// L1: Both length scans agree on every buffer
pub fn check_length_agreement(chars: &CircuitChars) -> LengthInvariantResult {
    let direct = agent_messages::utils::validation::logical_length(chars, chars.len());
    let circuit = agent_messages_zkvm_guest::logical_length(chars);
    if direct == circuit {
        LengthInvariantResult::Valid
    } else {
        LengthInvariantResult::ScanMismatch { direct, circuit }
    }
}
