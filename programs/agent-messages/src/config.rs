//! Acceptance policy, the pinned prover key and the circuit allowlist

pub use agent_messages_zkvm_guest::{
    require_allowlisted_circuit, AllowlistError, ProverKey, TrustedCircuit, TRUSTED_CIRCUITS,
};
use agent_messages_zkvm_guest::{ContentCheck, REQUIRED_CONTENT_LENGTH};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Logical length every plaintext message content must have.
pub const CONTENT_LENGTH: usize = REQUIRED_CONTENT_LENGTH;

/// Logical length a security code must have under the shielded policy.
pub const SHIELDED_SECURITY_CODE_LENGTH: usize = 2;

/// Content length check for shielded submissions.
///
/// The shielded path never sees content, so the check can only run inside
/// the circuit. `Disabled` keeps the length computed but unasserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShieldedContentCheck {
    #[default]
    Disabled,
    Enforced,
}

impl ShieldedContentCheck {
    pub fn content_check(self) -> ContentCheck {
        match self {
            Self::Disabled => ContentCheck::Disabled,
            Self::Enforced => ContentCheck::Enforced,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptancePolicy {
    /// `None` accepts a security code of any length at registration.
    #[serde(default)]
    pub registration_code_length: Option<usize>,
    #[serde(default = "default_content_length")]
    pub content_length: usize,
    #[serde(default)]
    pub shielded_content_check: ShieldedContentCheck,
    /// Public key of the only prover whose seals are trusted. With `None`
    /// every attestation is rejected.
    #[serde(default)]
    pub prover_key: Option<ProverKey>,
}

fn default_content_length() -> usize {
    CONTENT_LENGTH
}

impl AcceptancePolicy {
    pub fn plaintext() -> Self {
        Self {
            registration_code_length: None,
            content_length: CONTENT_LENGTH,
            shielded_content_check: ShieldedContentCheck::Disabled,
            prover_key: None,
        }
    }

    pub fn shielded() -> Self {
        Self {
            registration_code_length: Some(SHIELDED_SECURITY_CODE_LENGTH),
            content_length: CONTENT_LENGTH,
            shielded_content_check: ShieldedContentCheck::Disabled,
            prover_key: None,
        }
    }

    pub fn with_prover_key(mut self, prover_key: ProverKey) -> Self {
        self.prover_key = Some(prover_key);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|err| ConfigError::InvalidPolicy(err.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string(self).map_err(|err| ConfigError::InvalidPolicy(err.to_string()))
    }

    /// The circuit whose attestations this policy accepts.
    pub fn trusted_circuit(&self) -> &'static TrustedCircuit {
        TrustedCircuit::for_content_check(self.shielded_content_check.content_check())
    }
}

impl Default for AcceptancePolicy {
    fn default() -> Self {
        Self::plaintext()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error(transparent)]
    CircuitNotAllowlisted(#[from] AllowlistError),

    #[error("invalid acceptance policy: {0}")]
    InvalidPolicy(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_differ_only_in_registration_length() {
        let plaintext = AcceptancePolicy::plaintext();
        let shielded = AcceptancePolicy::shielded();

        assert_eq!(plaintext.registration_code_length, None);
        assert_eq!(shielded.registration_code_length, Some(2));
        assert_eq!(plaintext.content_length, 12);
        assert_eq!(shielded.content_length, 12);
        assert_eq!(
            shielded.shielded_content_check,
            ShieldedContentCheck::Disabled
        );
    }

    #[test]
    fn test_policy_from_json_fills_defaults() {
        let policy = AcceptancePolicy::from_json(r#"{"registration_code_length": 2}"#)
            .expect("partial policy must parse");
        assert_eq!(policy, AcceptancePolicy::shielded());

        let strict = AcceptancePolicy::from_json(r#"{"shielded_content_check": "enforced"}"#)
            .expect("strict policy must parse");
        assert_eq!(strict.shielded_content_check, ShieldedContentCheck::Enforced);
        assert_eq!(
            strict.trusted_circuit().circuit,
            agent_messages_zkvm_guest::VERIFY_MESSAGE_STRICT
        );
    }

    #[test]
    fn test_policy_json_round_trips() {
        let policy = AcceptancePolicy::shielded();
        let json = policy.to_json().expect("policy must serialize");
        assert_eq!(
            AcceptancePolicy::from_json(&json).expect("policy must parse"),
            policy
        );
    }

    #[test]
    fn test_invalid_policy_json() {
        let err = AcceptancePolicy::from_json(r#"{"shielded_content_check": "sometimes"}"#)
            .expect_err("unknown mode must fail");
        assert!(matches!(err, ConfigError::InvalidPolicy(_)));
    }

    #[test]
    fn test_allowlist_lookup() {
        let trusted = require_allowlisted_circuit("verify-message").expect("default circuit");
        assert_eq!(trusted, AcceptancePolicy::shielded().trusted_circuit());

        let err = require_allowlisted_circuit("verify-anything").expect_err("unknown circuit");
        let err = ConfigError::from(err);
        assert_eq!(err.to_string(), "circuit is not allowlisted: verify-anything");
    }

    #[test]
    fn test_prover_key_is_pinned_through_json() {
        let policy = AcceptancePolicy::shielded().with_prover_key([3_u8; 32]);
        let json = policy.to_json().expect("policy must serialize");
        let parsed = AcceptancePolicy::from_json(&json).expect("policy must parse");
        assert_eq!(parsed.prover_key, Some([3_u8; 32]));

        assert_eq!(AcceptancePolicy::shielded().prover_key, None);
    }
}
