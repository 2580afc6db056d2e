#![forbid(unsafe_code)]

pub mod config;

use agent_messages_zkvm_guest::{
    circuit_chars_from_str, encode_seal, seal_preimage, serialize_journal, verify_message_circuit,
    AllowlistError, Attestation, CircuitError, JournalError, PrivateMessage, ProverKey,
    TrustedCircuit,
};
use ed25519_dalek::{Signer, SigningKey};
use thiserror::Error;

/// What a submitter proves. Content and security code stay on this side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProveRequest {
    pub agent_id: u32,
    pub message_number: u32,
    pub content: String,
    pub security_code: String,
    pub circuit: String,
}

impl TryFrom<&ProveRequest> for PrivateMessage {
    type Error = JournalError;

    fn try_from(r: &ProveRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            number: r.message_number,
            agent_id: r.agent_id,
            content: circuit_chars_from_str("content", &r.content)?,
            security_code: circuit_chars_from_str("security_code", &r.security_code)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProveError {
    #[error("invalid prover input: {0}")]
    InvalidInput(#[from] JournalError),
    #[error("circuit rejected message: {0}")]
    CircuitRejected(#[from] CircuitError),
    #[error("{0}")]
    CircuitNotAllowlisted(#[from] AllowlistError),
    #[error("invalid prover key seed: {0}")]
    InvalidSeed(String),
    #[error("seal encoding failed: {0}")]
    SealEncodingFailed(String),
    #[error("response rendering failed: {0}")]
    RenderFailed(String),
}

impl ProveRequest {
    pub fn new(
        agent_id: u32,
        message_number: u32,
        content: impl Into<String>,
        security_code: impl Into<String>,
    ) -> Self {
        Self {
            agent_id,
            message_number,
            content: content.into(),
            security_code: security_code.into(),
            circuit: config::DEFAULT_CIRCUIT.to_string(),
        }
    }

    pub fn with_circuit(mut self, circuit: impl Into<String>) -> Self {
        self.circuit = circuit.into();
        self
    }
}

/// Signing identity of a prover. Verifiers pin its `prover_key`.
#[derive(Debug, Clone)]
pub struct Prover {
    signing_key: SigningKey,
}

impl Prover {
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    /// Parses a 64-character hex seed.
    pub fn from_seed_hex(seed_hex: &str) -> Result<Self, ProveError> {
        let mut seed = [0_u8; 32];
        hex::decode_to_slice(seed_hex.trim(), &mut seed)
            .map_err(|err| ProveError::InvalidSeed(err.to_string()))?;
        Ok(Self::from_seed(seed))
    }

    pub fn prover_key(&self) -> ProverKey {
        self.signing_key.verifying_key().to_bytes()
    }

    pub fn prove(&self, request: &ProveRequest) -> Result<Attestation, ProveError> {
        generate_proof(self, request)
    }
}

pub fn default_prove_request() -> ProveRequest {
    ProveRequest::new(7, 1, "iamjamesbond", "jb")
}

/// Runs the circuit over the private message and seals its public output.
pub fn generate_proof(prover: &Prover, request: &ProveRequest) -> Result<Attestation, ProveError> {
    let trusted = config::require_allowlisted_circuit(&request.circuit)?;
    let message = PrivateMessage::try_from(request)?;
    prove_message(prover, &message, trusted)
}

/// Only journals the circuit produced are signed.
pub fn prove_message(
    prover: &Prover,
    message: &PrivateMessage,
    trusted: &TrustedCircuit,
) -> Result<Attestation, ProveError> {
    let fields = verify_message_circuit(message, trusted.circuit.content_check)?;
    let journal = serialize_journal(&fields);

    let image_id = trusted.image_id();
    let signature = prover
        .signing_key
        .sign(&seal_preimage(&image_id, &journal))
        .to_bytes();
    let seal_bytes =
        encode_seal(&signature).map_err(|err| ProveError::SealEncodingFailed(err.to_string()))?;

    tracing::debug!(
        circuit = trusted.circuit.name,
        agent_id = fields.agent_id,
        message_number = fields.message_number,
        "attestation generated"
    );

    Ok(Attestation {
        seal_bytes,
        journal: journal.to_vec(),
        image_id,
    })
}

pub fn prove_cli_output(prover: &Prover, request: &ProveRequest) -> Result<String, ProveError> {
    let attestation = generate_proof(prover, request)?;
    render_attestation(&attestation)
}

pub fn render_attestation(attestation: &Attestation) -> Result<String, ProveError> {
    #[derive(serde::Serialize)]
    struct JsonAttestation<'a> {
        seal_bytes: &'a [u8],
        journal: &'a [u8],
        image_id: &'a [u8],
    }

    let json = JsonAttestation {
        seal_bytes: &attestation.seal_bytes,
        journal: &attestation.journal,
        image_id: &attestation.image_id,
    };
    serde_json::to_string(&json).map_err(|err| ProveError::RenderFailed(err.to_string()))
}
