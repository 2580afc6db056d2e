//! Pinned circuit allowlist shared by the prover and every verifier.

use std::fmt;

use crate::circuit::{CircuitDescriptor, ContentCheck, VERIFY_MESSAGE, VERIFY_MESSAGE_STRICT};
use crate::seal::{ImageId, Selector, TRUSTED_SEAL_SELECTOR};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrustedCircuit {
    pub circuit: CircuitDescriptor,
    pub selector: Selector,
}

impl TrustedCircuit {
    pub fn image_id(&self) -> ImageId {
        self.circuit.image_id()
    }

    pub fn for_content_check(check: ContentCheck) -> &'static TrustedCircuit {
        match check {
            ContentCheck::Disabled => &TRUSTED_CIRCUITS[0],
            ContentCheck::Enforced => &TRUSTED_CIRCUITS[1],
        }
    }
}

// Both circuits share the seal selector; they differ only in image id.
pub const TRUSTED_CIRCUITS: [TrustedCircuit; 2] = [
    TrustedCircuit {
        circuit: VERIFY_MESSAGE,
        selector: TRUSTED_SEAL_SELECTOR,
    },
    TrustedCircuit {
        circuit: VERIFY_MESSAGE_STRICT,
        selector: TRUSTED_SEAL_SELECTOR,
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowlistError {
    CircuitNotAllowlisted { circuit: String },
}

impl fmt::Display for AllowlistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CircuitNotAllowlisted { circuit } => {
                write!(f, "circuit is not allowlisted: {circuit}")
            }
        }
    }
}

impl std::error::Error for AllowlistError {}

pub fn require_allowlisted_circuit(name: &str) -> Result<&'static TrustedCircuit, AllowlistError> {
    TRUSTED_CIRCUITS
        .iter()
        .find(|trusted| trusted.circuit.name == name)
        .ok_or_else(|| AllowlistError::CircuitNotAllowlisted {
            circuit: name.to_string(),
        })
}
