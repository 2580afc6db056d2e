//! Fuzz target for mixed operation sequences
//!
//! Tests invariants:
//! - S1-S3, A1 and P1-P3 hold after every step of a random history
//! - L1: the direct and circuit length scans agree on every buffer
//!
//! Run with: cargo test --release -p agent-messages-fuzz sequence

use crate::*;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn fuzz_operation_sequence_plaintext(operations in arb_operations(40)) {
        let mut ledger = SimulatedLedger::plaintext();
        let results = simulate_operations(&mut ledger, &operations);

        for (step, result) in results.iter().enumerate() {
            prop_assert!(!result.is_invariant_violation(),
                "Invariant violation at step {}: {:?}\nOperations: {:?}",
                step, result, operations);
        }
    }

    #[test]
    fn fuzz_operation_sequence_shielded(operations in arb_operations(40)) {
        let mut ledger = SimulatedLedger::shielded();
        let results = simulate_operations(&mut ledger, &operations);

        for (step, result) in results.iter().enumerate() {
            prop_assert!(!result.is_invariant_violation(),
                "Invariant violation at step {}: {:?}\nOperations: {:?}",
                step, result, operations);
        }
    }

    #[test]
    fn fuzz_length_scans_agree(chars in arb_circuit_chars()) {
        prop_assert_eq!(check_length_agreement(&chars), LengthInvariantResult::Valid);
    }
}
