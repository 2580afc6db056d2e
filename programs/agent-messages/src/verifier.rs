//! Attestation verification for shielded submissions
//!
//! An attestation is untrusted until `verify` succeeds. Checks run in a
//! fixed order: image id, journal length, seal encoding, selector, prover
//! signature, journal decoding.

use agent_messages_zkvm_guest::{
    decode_seal, deserialize_journal, seal_preimage, Attestation, ProverKey, JOURNAL_TOTAL_LEN,
};
use ed25519_dalek::{Signature, VerifyingKey};

use crate::config::{AcceptancePolicy, TrustedCircuit};
use crate::errors::ProofError;
use crate::state::ProofOutput;

/// Stateless proof check. Implementations may be shared across threads.
pub trait AttestationVerifier: Send + Sync {
    fn verify(&self, attestation: &Attestation) -> Result<ProofOutput, ProofError>;
}

/// Verifier pinned to a single allowlisted circuit and a single prover key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SealVerifier {
    trusted: TrustedCircuit,
    prover_key: Option<ProverKey>,
}

impl SealVerifier {
    pub fn new(trusted: TrustedCircuit, prover_key: Option<ProverKey>) -> Self {
        Self {
            trusted,
            prover_key,
        }
    }

    pub fn for_policy(policy: &AcceptancePolicy) -> Self {
        Self::new(*policy.trusted_circuit(), policy.prover_key)
    }

    pub fn trusted(&self) -> &TrustedCircuit {
        &self.trusted
    }

    pub fn prover_key(&self) -> Option<&ProverKey> {
        self.prover_key.as_ref()
    }
}

impl Default for SealVerifier {
    fn default() -> Self {
        Self::for_policy(&AcceptancePolicy::default())
    }
}

impl AttestationVerifier for SealVerifier {
    fn verify(&self, attestation: &Attestation) -> Result<ProofOutput, ProofError> {
        if attestation.image_id != self.trusted.image_id() {
            return Err(ProofError::UntrustedImageId);
        }

        if attestation.journal.len() != JOURNAL_TOTAL_LEN {
            return Err(ProofError::UnexpectedJournalLength {
                expected: JOURNAL_TOTAL_LEN,
                actual: attestation.journal.len(),
            });
        }

        let seal = decode_seal(&attestation.seal_bytes)
            .map_err(|err| ProofError::InvalidSealEncoding(err.to_string()))?;

        if seal.selector != self.trusted.selector {
            return Err(ProofError::UntrustedSelector {
                expected: self.trusted.selector,
                actual: seal.selector,
            });
        }

        let prover_key = self.prover_key.ok_or(ProofError::NoTrustedProver)?;
        let prover_key =
            VerifyingKey::from_bytes(&prover_key).map_err(|_| ProofError::InvalidProverKey)?;
        let preimage = seal_preimage(&attestation.image_id, &attestation.journal);
        prover_key
            .verify_strict(&preimage, &Signature::from_bytes(&seal.signature))
            .map_err(|_| ProofError::SealMismatch)?;

        let fields = deserialize_journal(&attestation.journal).map_err(ProofError::MalformedJournal)?;
        Ok(ProofOutput::from(fields))
    }
}

/// Verifies every attestation independently. Results keep input order.
pub fn verify_batch<'a, V, I>(verifier: &V, attestations: I) -> Vec<Result<ProofOutput, ProofError>>
where
    V: AttestationVerifier + ?Sized,
    I: IntoIterator<Item = &'a Attestation>,
{
    attestations
        .into_iter()
        .map(|attestation| verifier.verify(attestation))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShieldedContentCheck;
    use crate::state::{AgentId, MessageNumber};
    use agent_messages_zkvm_guest::{
        circuit_chars_from_str, encode_seal, serialize_journal, ContentCheck, ImageId,
        JournalFields, SEAL_BYTES_LEN, SEAL_SIGNATURE_LEN, VERIFY_MESSAGE, VERIFY_MESSAGE_STRICT,
    };
    use ed25519_dalek::{Signer, SigningKey};

    fn prover() -> SigningKey {
        SigningKey::from_bytes(&[7_u8; 32])
    }

    fn verifier() -> SealVerifier {
        SealVerifier::new(
            *TrustedCircuit::for_content_check(ContentCheck::Disabled),
            Some(prover().verifying_key().to_bytes()),
        )
    }

    fn sealed(signer: &SigningKey, image_id: ImageId, agent_id: u32, message_number: u32) -> Attestation {
        let journal = serialize_journal(&JournalFields {
            agent_id,
            message_number,
            security_code: circuit_chars_from_str("security_code", "jb").expect("fits"),
        });
        let signature = signer.sign(&seal_preimage(&image_id, &journal)).to_bytes();

        Attestation {
            seal_bytes: encode_seal(&signature).expect("seal must encode"),
            journal: journal.to_vec(),
            image_id,
        }
    }

    fn attestation(agent_id: u32, message_number: u32) -> Attestation {
        sealed(&prover(), VERIFY_MESSAGE.image_id(), agent_id, message_number)
    }

    #[test]
    fn test_valid_attestation_yields_public_output() {
        let output = verifier()
            .verify(&attestation(7, 1))
            .expect("honest attestation must verify");

        assert_eq!(output.agent_id, AgentId(7));
        assert_eq!(output.message_number, MessageNumber(1));
        assert_eq!(output.security_code.to_string(), "jb");
    }

    #[test]
    fn test_tampered_journal_is_rejected() {
        let mut forged = attestation(7, 1);
        forged.journal[4] = 2;

        assert_eq!(verifier().verify(&forged), Err(ProofError::SealMismatch));
    }

    #[test]
    fn test_hand_built_strict_seal_is_rejected() {
        let strict = SealVerifier::new(
            *TrustedCircuit::for_content_check(ContentCheck::Enforced),
            Some(prover().verifying_key().to_bytes()),
        );
        let outsider = SigningKey::from_bytes(&[9_u8; 32]);
        let forged = sealed(&outsider, VERIFY_MESSAGE_STRICT.image_id(), 7, 1);
        assert_eq!(strict.verify(&forged), Err(ProofError::SealMismatch));

        let mut unsigned = forged;
        unsigned.seal_bytes = encode_seal(&[0_u8; SEAL_SIGNATURE_LEN]).expect("seal must encode");
        assert_eq!(strict.verify(&unsigned), Err(ProofError::SealMismatch));

        let honest = sealed(&prover(), VERIFY_MESSAGE_STRICT.image_id(), 7, 1);
        strict.verify(&honest).expect("prover seal must verify");
    }

    #[test]
    fn test_missing_prover_key_rejects_everything() {
        let keyless = SealVerifier::for_policy(&AcceptancePolicy::shielded());
        assert_eq!(keyless.prover_key(), None);
        assert_eq!(
            keyless.verify(&attestation(7, 1)),
            Err(ProofError::NoTrustedProver)
        );
    }

    #[test]
    fn test_invalid_pinned_key_is_reported() {
        // Not a point on the curve.
        let mut bad_key = [0xff_u8; 32];
        bad_key[31] = 0x7f;
        let broken = SealVerifier::new(*verifier().trusted(), Some(bad_key));

        let err = broken
            .verify(&attestation(7, 1))
            .expect_err("unusable key must not verify");
        assert!(matches!(
            err,
            ProofError::InvalidProverKey | ProofError::SealMismatch
        ));
    }

    #[test]
    fn test_untrusted_image_id_is_rejected() {
        let strict = SealVerifier::for_policy(
            &AcceptancePolicy {
                shielded_content_check: ShieldedContentCheck::Enforced,
                ..AcceptancePolicy::shielded()
            }
            .with_prover_key(prover().verifying_key().to_bytes()),
        );

        assert_eq!(
            strict.verify(&attestation(7, 1)),
            Err(ProofError::UntrustedImageId)
        );
    }

    #[test]
    fn test_wrong_journal_length_is_rejected() {
        let mut short = attestation(7, 1);
        short.journal.pop();

        assert_eq!(
            verifier().verify(&short),
            Err(ProofError::UnexpectedJournalLength {
                expected: JOURNAL_TOTAL_LEN,
                actual: JOURNAL_TOTAL_LEN - 1,
            })
        );
    }

    #[test]
    fn test_malformed_seal_is_rejected() {
        let mut truncated = attestation(7, 1);
        truncated.seal_bytes.truncate(SEAL_BYTES_LEN - 1);

        let err = verifier()
            .verify(&truncated)
            .expect_err("truncated seal must fail");
        assert!(matches!(err, ProofError::InvalidSealEncoding(_)));
    }

    #[test]
    fn test_untrusted_selector_is_rejected() {
        let mut wrong_selector = attestation(7, 1);
        wrong_selector.seal_bytes[..4].copy_from_slice(&[0xde, 0xad, 0xbe, 0xef]);

        let err = verifier()
            .verify(&wrong_selector)
            .expect_err("foreign selector must fail");
        assert!(matches!(err, ProofError::UntrustedSelector { .. }));
    }

    #[test]
    fn test_batch_preserves_order() {
        let mut forged = attestation(7, 2);
        forged.journal[0] = 8;
        let batch = [attestation(7, 1), forged, attestation(9, 4)];

        let results = verify_batch(&verifier(), &batch);
        assert_eq!(results.len(), 3);
        assert_eq!(
            results[0].as_ref().map(|out| out.message_number),
            Ok(MessageNumber(1))
        );
        assert_eq!(results[1], Err(ProofError::SealMismatch));
        assert_eq!(
            results[2].as_ref().map(|out| out.agent_id),
            Ok(AgentId(9))
        );
    }

    #[test]
    fn test_verifier_is_shareable_across_threads() {
        let verifier = verifier();
        let batch = vec![attestation(1, 1), attestation(2, 1)];

        std::thread::scope(|scope| {
            for item in &batch {
                let verifier = &verifier;
                scope.spawn(move || {
                    verifier.verify(item).expect("honest attestation must verify");
                });
            }
        });
    }
}
