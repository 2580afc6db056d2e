//! Fuzz target for register_agent
//!
//! Tests invariants:
//! - Registration overwrites, never merges
//! - Shielded registration accepts exactly two characters, counted as chars
//! - A1: rejected registration changes nothing
//!
//! Run with: cargo test --release -p agent-messages-fuzz register_agent

use crate::*;
use agent_messages::{AgentId, CircuitString, RejectionKind};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn fuzz_register_agent(input in any::<RegisterAgentInput>()) {
        let mut ledger = if input.shielded_policy {
            SimulatedLedger::shielded()
        } else {
            SimulatedLedger::plaintext()
        };

        let result = simulate_register_agent(&mut ledger, input.agent_id, &input.security_code);

        prop_assert!(!result.is_invariant_violation(),
            "Invariant violation: {:?}\nInput: {:?}", result, input);

        let two_chars = input.security_code.chars().count() == 2;
        if !input.shielded_policy || two_chars {
            prop_assert!(result.is_success(), "expected success: {:?}", input);
        } else {
            prop_assert_eq!(result, SimulationResult::Rejected(RejectionKind::InvalidContentLength));
        }
    }

    /// Re-registration leaves only the latest code active
    #[test]
    fn fuzz_register_agent_overwrite(
        agent_id in arb_agent_id(),
        first in "[a-z]{2}",
        second in "[a-z]{2}",
    ) {
        let mut ledger = SimulatedLedger::shielded();
        prop_assert!(simulate_register_agent(&mut ledger, agent_id, &first).is_success());
        prop_assert!(simulate_register_agent(&mut ledger, agent_id, &second).is_success());

        let active = ledger.acceptance.security_code_of(AgentId(agent_id));
        prop_assert_eq!(
            active,
            Some(CircuitString::new("security_code", &second).expect("fits"))
        );
        prop_assert_eq!(ledger.acceptance.store().agent_count(), 1);
    }
}
