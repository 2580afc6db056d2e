//! Fuzz target for submit_shielded_message
//!
//! Tests invariants:
//! - Tampered attestations are always rejected as invalid proofs
//! - Content length is not checked on this path
//! - P1-P3: provenance matches the execution context and is never replaced
//!
//! Run with: cargo test --release -p agent-messages-fuzz submit_shielded_message

use crate::*;
use agent_messages::{AgentId, MessageNumber, RejectionKind};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn fuzz_submit_shielded_message(input in any::<ShieldedSubmissionInput>()) {
        let mut ledger = SimulatedLedger::shielded();
        ledger.sender = agent_messages::SubmitterId(input.sender);
        prop_assert!(simulate_register_agent(&mut ledger, input.agent_id, "jb").is_success());

        let result = simulate_submit_shielded_message(
            &mut ledger,
            input.agent_id,
            input.message_number,
            &input.content,
            &input.security_code,
            input.tamper,
        );

        prop_assert!(!result.is_invariant_violation(),
            "Invariant violation: {:?}\nInput: {:?}", result, input);

        if input.tamper != Tamper::None {
            prop_assert_eq!(result, SimulationResult::Rejected(RejectionKind::InvalidProof));
        } else if input.security_code != "jb" {
            prop_assert_eq!(result, SimulationResult::Rejected(RejectionKind::InvalidSecurityCode));
        } else if input.message_number == 0 {
            prop_assert_eq!(
                result,
                SimulationResult::Rejected(RejectionKind::NonMonotonicSequenceNumber)
            );
        } else {
            // Any content length passes while the shielded check is disabled.
            prop_assert!(result.is_success(), "expected success: {:?}", input);
            let record = ledger
                .acceptance
                .query_provenance(AgentId(input.agent_id), MessageNumber(input.message_number))
                .expect("accepted message has provenance");
            prop_assert_eq!(record.sender.0, input.sender);
            prop_assert_eq!(record.nonce, ledger.nonce);
        }
    }

    /// Replaying an accepted attestation never replaces its provenance
    #[test]
    fn fuzz_shielded_replay(message_number in 1u32..u32::MAX, replays in 1usize..4usize) {
        let mut ledger = SimulatedLedger::shielded();
        prop_assert!(simulate_register_agent(&mut ledger, 1, "jb").is_success());
        prop_assert!(simulate_submit_shielded_message(
            &mut ledger, 1, message_number, "iamjamesbond", "jb", Tamper::None
        ).is_success());
        let first = ledger.acceptance.query_provenance(AgentId(1), MessageNumber(message_number));

        for _ in 0..replays {
            let result = simulate_submit_shielded_message(
                &mut ledger, 1, message_number, "iamjamesbond", "jb", Tamper::None
            );
            prop_assert_eq!(
                result,
                SimulationResult::Rejected(RejectionKind::NonMonotonicSequenceNumber)
            );
        }

        prop_assert_eq!(
            ledger.acceptance.query_provenance(AgentId(1), MessageNumber(message_number)),
            first
        );
    }
}
