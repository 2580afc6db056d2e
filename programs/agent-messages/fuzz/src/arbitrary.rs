//! Arbitrary input generators for fuzz testing
//!
//! Generates random but well-formed inputs for the acceptance operations.

use agent_messages_zkvm_guest::{
    CircuitChars, CIRCUIT_STRING_CAPACITY, JOURNAL_TOTAL_LEN, SEAL_BYTES_LEN,
};
use proptest::prelude::*;

/// Agent id with edge cases
pub fn arb_agent_id() -> impl Strategy<Value = u32> {
    prop_oneof![
        Just(0u32),
        Just(7u32),
        Just(u32::MAX),
        // A small pool so operations collide on the same agent
        1u32..8u32,
        any::<u32>(),
    ]
}

/// Message number with edge cases
/// Tests: 0, 1, u32::MAX, small values
pub fn arb_message_number() -> impl Strategy<Value = u32> {
    prop_oneof![
        Just(0u32),
        Just(1u32),
        Just(u32::MAX),
        Just(u32::MAX - 1),
        1u32..16u32,
        any::<u32>(),
    ]
}

/// Security code text, weighted toward the two-character shape.
/// Multibyte characters must count as one position each.
pub fn arb_security_code() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[a-z]{2}",
        1 => "[a-zéñü✓]{2}",
        1 => "[a-z]{0,1}",
        1 => "[a-zé]{3,8}",
    ]
}

/// Message content text, weighted toward the twelve-character shape
pub fn arb_content() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[a-z]{12}",
        1 => "[ñé日本✓]{12}",
        1 => "[a-z]{0,11}",
        1 => "[a-zñ]{13,40}",
        1 => "[é]{128}",
    ]
}

/// Raw code point buffer; terminators may appear anywhere or nowhere
pub fn arb_circuit_chars() -> impl Strategy<Value = CircuitChars> {
    prop::collection::vec(
        prop_oneof![3 => 1u32..=0x10_ffffu32, 1 => Just(0u32)],
        CIRCUIT_STRING_CAPACITY,
    )
    .prop_map(|code_points| {
        let mut out = [0u32; CIRCUIT_STRING_CAPACITY];
        out.copy_from_slice(&code_points);
        out
    })
}

/// Input for register_agent fuzzing
#[derive(Debug, Clone)]
pub struct RegisterAgentInput {
    pub agent_id: u32,
    pub security_code: String,
    pub shielded_policy: bool,
}

impl Arbitrary for RegisterAgentInput {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (arb_agent_id(), arb_security_code(), any::<bool>())
            .prop_map(|(agent_id, security_code, shielded_policy)| RegisterAgentInput {
                agent_id,
                security_code,
                shielded_policy,
            })
            .boxed()
    }
}

/// Input for submit_message fuzzing
#[derive(Debug, Clone)]
pub struct SubmitMessageInput {
    pub registered_code: Option<String>,
    pub agent_id: u32,
    pub last_number: u32,
    pub message_number: u32,
    pub content: String,
    pub security_code: String,
}

impl Arbitrary for SubmitMessageInput {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            proptest::option::weighted(0.8, arb_security_code()),
            arb_agent_id(),
            0u32..32u32,
            arb_message_number(),
            arb_content(),
            arb_security_code(),
        )
            .prop_map(
                |(
                    registered_code,
                    agent_id,
                    last_number,
                    message_number,
                    content,
                    security_code,
                )| SubmitMessageInput {
                    registered_code,
                    agent_id,
                    last_number,
                    message_number,
                    content,
                    security_code,
                },
            )
            .boxed()
    }
}

/// How an attestation is damaged before submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tamper {
    None,
    FlipJournalByte(usize),
    FlipSealByte(usize),
    TruncateSeal,
    WrongImageId,
}

pub fn arb_tamper() -> impl Strategy<Value = Tamper> {
    prop_oneof![
        4 => Just(Tamper::None),
        1 => (0usize..JOURNAL_TOTAL_LEN).prop_map(Tamper::FlipJournalByte),
        1 => (0usize..SEAL_BYTES_LEN).prop_map(Tamper::FlipSealByte),
        1 => Just(Tamper::TruncateSeal),
        1 => Just(Tamper::WrongImageId),
    ]
}

/// Input for submit_shielded_message fuzzing
#[derive(Debug, Clone)]
pub struct ShieldedSubmissionInput {
    pub agent_id: u32,
    pub message_number: u32,
    pub content: String,
    pub security_code: String,
    pub sender: [u8; 32],
    pub tamper: Tamper,
}

impl Arbitrary for ShieldedSubmissionInput {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            1u32..4u32,
            arb_message_number(),
            arb_content(),
            arb_security_code(),
            prop::array::uniform32(any::<u8>()),
            arb_tamper(),
        )
            .prop_map(
                |(agent_id, message_number, content, security_code, sender, tamper)| {
                    ShieldedSubmissionInput {
                        agent_id,
                        message_number,
                        content,
                        security_code,
                        sender,
                        tamper,
                    }
                },
            )
            .boxed()
    }
}

/// One step of a generated operation sequence
#[derive(Debug, Clone)]
pub enum Operation {
    Register { agent_id: u32, security_code: String },
    Submit { agent_id: u32, message_number: u32, content: String, security_code: String },
    SubmitShielded { agent_id: u32, message_number: u32, security_code: String, tamper: Tamper },
}

pub fn arb_operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        1 => (1u32..4u32, arb_security_code()).prop_map(|(agent_id, security_code)| {
            Operation::Register { agent_id, security_code }
        }),
        3 => (1u32..4u32, 0u32..24u32, arb_content(), arb_security_code()).prop_map(
            |(agent_id, message_number, content, security_code)| Operation::Submit {
                agent_id,
                message_number,
                content,
                security_code,
            }
        ),
        3 => (1u32..4u32, 0u32..24u32, arb_security_code(), arb_tamper()).prop_map(
            |(agent_id, message_number, security_code, tamper)| Operation::SubmitShielded {
                agent_id,
                message_number,
                security_code,
                tamper,
            }
        ),
    ]
}

pub fn arb_operations(max: usize) -> impl Strategy<Value = Vec<Operation>> {
    prop::collection::vec(arb_operation(), 1..max)
}
