//! Property-based fuzz testing library for agent message acceptance
//!
//! Drives the real acceptance state machine with generated inputs and
//! checks its invariants after every operation.
//!
//! # Usage
//!
//! ```bash
//! # Run all property-based tests
//! cargo test --release -p agent-messages-fuzz
//!
//! # Run the fuzz test runner
//! cargo run --release -p agent-messages-fuzz --bin fuzz_all
//!
//! # Run with more iterations
//! PROPTEST_CASES=10000 cargo test --release -p agent-messages-fuzz
//! ```

pub mod arbitrary;
pub mod invariants;
pub mod scenarios;

pub use arbitrary::*;
pub use invariants::*;
pub use scenarios::*;

// Include fuzz targets as test modules
#[cfg(test)]
#[path = "../fuzz_targets/register_agent.rs"]
mod register_agent_tests;

#[cfg(test)]
#[path = "../fuzz_targets/submit_message.rs"]
mod submit_message_tests;

#[cfg(test)]
#[path = "../fuzz_targets/submit_shielded_message.rs"]
mod submit_shielded_message_tests;

#[cfg(test)]
#[path = "../fuzz_targets/sequence.rs"]
mod sequence_tests;
