//! Fuzz target for submit_message
//!
//! Tests invariants:
//! - Unregistered agents are always rejected
//! - Wrong codes are rejected before content and sequence checks
//! - Content must have logical length 12
//! - S1-S3: counters only advance, and only to the accepted number
//! - A1: rejections change nothing
//!
//! Run with: cargo test --release -p agent-messages-fuzz submit_message

use crate::*;
use agent_messages::RejectionKind;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// Fuzz submit_message with arbitrary inputs
    /// Verifies no invariant violations occur and the rejection reason
    /// follows the fixed check order
    #[test]
    fn fuzz_submit_message(input in any::<SubmitMessageInput>()) {
        let mut ledger = SimulatedLedger::plaintext();
        if let Some(code) = &input.registered_code {
            prop_assert!(ledger.seed_agent(input.agent_id, code, input.last_number));
        }

        let result = simulate_submit_message(
            &mut ledger,
            input.agent_id,
            input.message_number,
            &input.content,
            &input.security_code,
        );

        prop_assert!(!result.is_invariant_violation(),
            "Invariant violation: {:?}\nInput: {:?}", result, input);

        let expected = match &input.registered_code {
            None => Some(RejectionKind::AgentNotRegistered),
            Some(code) if *code != input.security_code => Some(RejectionKind::InvalidSecurityCode),
            Some(_) if input.content.chars().count() != 12 => {
                Some(RejectionKind::InvalidContentLength)
            }
            Some(_) if input.message_number <= input.last_number => {
                Some(RejectionKind::NonMonotonicSequenceNumber)
            }
            Some(_) => None,
        };

        match expected {
            None => prop_assert!(result.is_success(), "expected success: {:?}", input),
            Some(kind) => prop_assert_eq!(result, SimulationResult::Rejected(kind)),
        }
    }

    /// Unregistered agents are rejected regardless of message contents
    #[test]
    fn fuzz_submit_message_unregistered(
        agent_id in arb_agent_id(),
        message_number in arb_message_number(),
        content in arb_content(),
        code in arb_security_code(),
    ) {
        let mut ledger = SimulatedLedger::plaintext();
        let result = simulate_submit_message(&mut ledger, agent_id, message_number, &content, &code);
        prop_assert_eq!(result, SimulationResult::Rejected(RejectionKind::AgentNotRegistered));
    }

    /// Any code other than the registered one fails authentication
    #[test]
    fn fuzz_submit_message_wrong_code(
        registered in "[a-z]{2}",
        provided in arb_security_code(),
        message_number in 1u32..u32::MAX,
    ) {
        prop_assume!(registered != provided);

        let mut ledger = SimulatedLedger::plaintext();
        prop_assert!(simulate_register_agent(&mut ledger, 7, &registered).is_success());

        let result =
            simulate_submit_message(&mut ledger, 7, message_number, "iamjamesbond", &provided);
        prop_assert_eq!(result, SimulationResult::Rejected(RejectionKind::InvalidSecurityCode));
    }
}
