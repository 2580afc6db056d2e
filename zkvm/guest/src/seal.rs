//! Attestation and seal schema shared by the prover and the verifier.
//!
//! A seal is an Ed25519 signature by the prover over the circuit image id and
//! the journal. Only a holder of the prover's signing key can produce one, and
//! the prover signs only journals its circuit produced. Verifiers pin the
//! prover's public key. The seal layout is the one a real backend would fill.

use borsh::{BorshDeserialize, BorshSerialize};
use sha2::{Digest, Sha256};

use crate::circuit::ContentCheck;

pub const IMAGE_ID_LEN: usize = 32;
pub const SEAL_SELECTOR_LEN: usize = 4;
pub const SEAL_SIGNATURE_LEN: usize = 64;
pub const SEAL_BYTES_LEN: usize = SEAL_SELECTOR_LEN + SEAL_SIGNATURE_LEN;
pub const PROVER_KEY_LEN: usize = 32;

/// "AMSG"
pub const TRUSTED_SEAL_SELECTOR: Selector = [0x41, 0x4d, 0x53, 0x47];

const IMAGE_DOMAIN: &[u8] = b"agent-messages/image/v1";
const SEAL_DOMAIN: &[u8] = b"agent-messages/seal/v2";

pub type ImageId = [u8; IMAGE_ID_LEN];
pub type Selector = [u8; SEAL_SELECTOR_LEN];
pub type SealSignature = [u8; SEAL_SIGNATURE_LEN];
/// Compressed Ed25519 verifying key of a prover.
pub type ProverKey = [u8; PROVER_KEY_LEN];

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Seal {
    pub selector: Selector,
    pub signature: SealSignature,
}

/// Proof plus its public output, as handed to a verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attestation {
    pub seal_bytes: Vec<u8>,
    pub journal: Vec<u8>,
    pub image_id: ImageId,
}

pub fn image_id_for(circuit_name: &str, check: ContentCheck) -> ImageId {
    let mut hasher = Sha256::new();
    hasher.update(IMAGE_DOMAIN);
    hasher.update((circuit_name.len() as u32).to_le_bytes());
    hasher.update(circuit_name.as_bytes());
    hasher.update([check.as_byte()]);
    hasher.finalize().into()
}

/// Bytes the prover signs: domain tag, image id, length-prefixed journal.
pub fn seal_preimage(image_id: &ImageId, journal: &[u8]) -> Vec<u8> {
    let mut preimage = Vec::with_capacity(SEAL_DOMAIN.len() + IMAGE_ID_LEN + 4 + journal.len());
    preimage.extend_from_slice(SEAL_DOMAIN);
    preimage.extend_from_slice(image_id);
    preimage.extend_from_slice(&(journal.len() as u32).to_le_bytes());
    preimage.extend_from_slice(journal);
    preimage
}

pub fn encode_seal(signature: &SealSignature) -> std::io::Result<Vec<u8>> {
    Seal {
        selector: TRUSTED_SEAL_SELECTOR,
        signature: *signature,
    }
    .try_to_vec()
}

pub fn decode_seal(bytes: &[u8]) -> std::io::Result<Seal> {
    Seal::try_from_slice(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_seal_shape_and_lengths_are_correct() {
        let signature = [5_u8; SEAL_SIGNATURE_LEN];
        let bytes = encode_seal(&signature).expect("seal must serialize");

        assert_eq!(bytes.len(), SEAL_BYTES_LEN);
        assert_eq!(&bytes[..SEAL_SELECTOR_LEN], &TRUSTED_SEAL_SELECTOR);

        let decoded = decode_seal(&bytes).expect("seal must decode");
        assert_eq!(decoded.signature, signature);
    }

    #[test]
    fn preimage_is_bound_to_image_id_and_journal() {
        let image_id = [1_u8; IMAGE_ID_LEN];
        let preimage = seal_preimage(&image_id, b"journal-a");

        assert!(preimage.starts_with(SEAL_DOMAIN));
        assert_eq!(preimage, seal_preimage(&image_id, b"journal-a"));
        assert_ne!(preimage, seal_preimage(&image_id, b"journal-b"));
        assert_ne!(preimage, seal_preimage(&[2_u8; IMAGE_ID_LEN], b"journal-a"));
    }

    #[test]
    fn truncated_seal_fails_to_decode() {
        let bytes = encode_seal(&[0_u8; SEAL_SIGNATURE_LEN]).expect("seal must serialize");
        assert!(decode_seal(&bytes[..SEAL_BYTES_LEN - 1]).is_err());
    }

    #[test]
    fn image_id_depends_on_content_check() {
        assert_ne!(
            image_id_for("verify-message", ContentCheck::Disabled),
            image_id_for("verify-message", ContentCheck::Enforced)
        );
    }
}
