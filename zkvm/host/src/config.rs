pub use agent_messages_zkvm_guest::{
    require_allowlisted_circuit, AllowlistError, TrustedCircuit, TRUSTED_CIRCUITS,
};
use agent_messages_zkvm_guest::VERIFY_MESSAGE;

pub const DEFAULT_CIRCUIT: &str = VERIFY_MESSAGE.name;

/// Environment variable holding the hex-encoded 32-byte signing key seed.
pub const PROVER_SEED_ENV: &str = "AGENT_MESSAGES_PROVER_SEED";
