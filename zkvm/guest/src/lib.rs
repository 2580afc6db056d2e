#![forbid(unsafe_code)]

use std::fmt;

pub mod allowlist;
pub mod circuit;
pub mod seal;

pub use allowlist::{
    require_allowlisted_circuit, AllowlistError, TrustedCircuit, TRUSTED_CIRCUITS,
};
pub use circuit::{
    logical_length, verify_message_circuit, CircuitDescriptor, CircuitError, ContentCheck,
    PrivateMessage, CIRCUITS, REQUIRED_CONTENT_LENGTH, VERIFY_MESSAGE, VERIFY_MESSAGE_STRICT,
};
pub use seal::{
    decode_seal, encode_seal, image_id_for, seal_preimage, Attestation, ImageId, ProverKey, Seal,
    SealSignature, Selector, IMAGE_ID_LEN, PROVER_KEY_LEN, SEAL_BYTES_LEN, SEAL_SELECTOR_LEN,
    SEAL_SIGNATURE_LEN, TRUSTED_SEAL_SELECTOR,
};

pub const CIRCUIT_STRING_CAPACITY: usize = 128;
/// Bytes per character position in the journal (one `u32` code point).
pub const CIRCUIT_CHAR_LEN: usize = 4;
pub const AGENT_ID_LEN: usize = 4;
pub const MESSAGE_NUMBER_LEN: usize = 4;
pub const SECURITY_CODE_LEN: usize = CIRCUIT_STRING_CAPACITY * CIRCUIT_CHAR_LEN;
pub const JOURNAL_TOTAL_LEN: usize = AGENT_ID_LEN + MESSAGE_NUMBER_LEN + SECURITY_CODE_LEN;

const MESSAGE_NUMBER_OFFSET: usize = AGENT_ID_LEN;
const SECURITY_CODE_OFFSET: usize = AGENT_ID_LEN + MESSAGE_NUMBER_LEN;

/// Fixed-capacity character buffer, one Unicode code point per position.
/// Unused positions hold the `0` terminator.
pub type CircuitChars = [u32; CIRCUIT_STRING_CAPACITY];
pub type JournalBytes = [u8; JOURNAL_TOTAL_LEN];

/// Public output committed by the message circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JournalFields {
    pub agent_id: u32,
    pub message_number: u32,
    pub security_code: CircuitChars,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalError {
    InvalidJournalLength {
        expected: usize,
        actual: usize,
    },
    StringTooLong {
        field: &'static str,
        capacity: usize,
        actual: usize,
    },
}

impl fmt::Display for JournalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidJournalLength { expected, actual } => {
                write!(
                    f,
                    "invalid journal length: expected {}, got {}",
                    expected, actual
                )
            }
            Self::StringTooLong {
                field,
                capacity,
                actual,
            } => {
                write!(
                    f,
                    "{field} is {actual} characters, capacity is {capacity}"
                )
            }
        }
    }
}

impl std::error::Error for JournalError {}

impl JournalFields {
    pub fn to_bytes(&self) -> JournalBytes {
        let mut out = [0_u8; JOURNAL_TOTAL_LEN];
        out[..MESSAGE_NUMBER_OFFSET].copy_from_slice(&self.agent_id.to_le_bytes());
        out[MESSAGE_NUMBER_OFFSET..SECURITY_CODE_OFFSET]
            .copy_from_slice(&self.message_number.to_le_bytes());
        for (slot, character) in out[SECURITY_CODE_OFFSET..]
            .chunks_exact_mut(CIRCUIT_CHAR_LEN)
            .zip(self.security_code.iter())
        {
            slot.copy_from_slice(&character.to_le_bytes());
        }
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, JournalError> {
        if bytes.len() != JOURNAL_TOTAL_LEN {
            return Err(JournalError::InvalidJournalLength {
                expected: JOURNAL_TOTAL_LEN,
                actual: bytes.len(),
            });
        }

        let mut agent_id = [0_u8; AGENT_ID_LEN];
        agent_id.copy_from_slice(&bytes[..MESSAGE_NUMBER_OFFSET]);
        let mut message_number = [0_u8; MESSAGE_NUMBER_LEN];
        message_number.copy_from_slice(&bytes[MESSAGE_NUMBER_OFFSET..SECURITY_CODE_OFFSET]);
        let mut security_code = [0_u32; CIRCUIT_STRING_CAPACITY];
        for (character, slot) in security_code
            .iter_mut()
            .zip(bytes[SECURITY_CODE_OFFSET..].chunks_exact(CIRCUIT_CHAR_LEN))
        {
            let mut code_point = [0_u8; CIRCUIT_CHAR_LEN];
            code_point.copy_from_slice(slot);
            *character = u32::from_le_bytes(code_point);
        }

        Ok(Self {
            agent_id: u32::from_le_bytes(agent_id),
            message_number: u32::from_le_bytes(message_number),
            security_code,
        })
    }
}

pub fn serialize_journal(fields: &JournalFields) -> JournalBytes {
    fields.to_bytes()
}

pub fn deserialize_journal(bytes: &[u8]) -> Result<JournalFields, JournalError> {
    JournalFields::from_bytes(bytes)
}

/// Copies the characters of `value` into a zero-padded buffer, one
/// position per `char`, the way a circuit string is built.
pub fn circuit_chars_from_str(field: &'static str, value: &str) -> Result<CircuitChars, JournalError> {
    let count = value.chars().count();
    if count > CIRCUIT_STRING_CAPACITY {
        return Err(JournalError::StringTooLong {
            field,
            capacity: CIRCUIT_STRING_CAPACITY,
            actual: count,
        });
    }

    let mut out = [0_u32; CIRCUIT_STRING_CAPACITY];
    for (slot, character) in out.iter_mut().zip(value.chars()) {
        *slot = u32::from(character);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> JournalFields {
        JournalFields {
            agent_id: 7,
            message_number: 0x0102_0304,
            security_code: circuit_chars_from_str("security_code", "jb")
                .expect("short code must fit"),
        }
    }

    #[test]
    fn journal_output_length_is_exact() {
        assert_eq!(CIRCUIT_STRING_CAPACITY, 128);
        assert_eq!(JOURNAL_TOTAL_LEN, 520);

        let journal = serialize_journal(&fields());
        assert_eq!(journal.len(), JOURNAL_TOTAL_LEN);
    }

    #[test]
    fn journal_field_order_matches_schema_offsets() {
        let fields = fields();
        let journal = serialize_journal(&fields);

        assert_eq!(&journal[0..4], &7_u32.to_le_bytes());
        assert_eq!(&journal[4..8], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&journal[8..12], &u32::from(b'j').to_le_bytes());
        assert_eq!(&journal[12..16], &u32::from(b'b').to_le_bytes());
        assert!(journal[16..].iter().all(|byte| *byte == 0));
    }

    #[test]
    fn journal_decodes_what_it_encodes() {
        let fields = fields();
        let decoded =
            deserialize_journal(&serialize_journal(&fields)).expect("canonical journal decodes");
        assert_eq!(decoded, fields);
    }

    #[test]
    fn malformed_journal_is_rejected() {
        let journal = serialize_journal(&fields());

        let err = deserialize_journal(&journal[..JOURNAL_TOTAL_LEN - 1])
            .expect_err("short journal must fail");
        assert_eq!(
            err,
            JournalError::InvalidJournalLength {
                expected: JOURNAL_TOTAL_LEN,
                actual: JOURNAL_TOTAL_LEN - 1,
            }
        );

        let mut long = journal.to_vec();
        long.push(0);
        let err = deserialize_journal(&long).expect_err("long journal must fail");
        assert_eq!(
            err,
            JournalError::InvalidJournalLength {
                expected: JOURNAL_TOTAL_LEN,
                actual: JOURNAL_TOTAL_LEN + 1,
            }
        );
    }

    #[test]
    fn oversized_string_is_rejected() {
        let long = "x".repeat(CIRCUIT_STRING_CAPACITY + 1);
        let err = circuit_chars_from_str("content", &long).expect_err("129 chars must fail");
        assert_eq!(
            err,
            JournalError::StringTooLong {
                field: "content",
                capacity: CIRCUIT_STRING_CAPACITY,
                actual: CIRCUIT_STRING_CAPACITY + 1,
            }
        );

        let exact = "x".repeat(CIRCUIT_STRING_CAPACITY);
        let chars = circuit_chars_from_str("content", &exact).expect("128 chars must fit");
        assert!(chars.iter().all(|character| *character == u32::from('x')));
    }

    #[test]
    fn multibyte_characters_take_one_position_each() {
        let chars = circuit_chars_from_str("security_code", "jé").expect("two chars fit");
        assert_eq!(chars[0], u32::from('j'));
        assert_eq!(chars[1], u32::from('é'));
        assert_eq!(chars[2], 0);

        // 128 two-byte characters fill the buffer exactly.
        let full = "é".repeat(CIRCUIT_STRING_CAPACITY);
        let chars = circuit_chars_from_str("content", &full).expect("128 chars must fit");
        assert!(chars.iter().all(|character| *character == u32::from('é')));

        let err = circuit_chars_from_str("content", &"ñ".repeat(CIRCUIT_STRING_CAPACITY + 1))
            .expect_err("129 chars must fail");
        assert_eq!(
            err,
            JournalError::StringTooLong {
                field: "content",
                capacity: CIRCUIT_STRING_CAPACITY,
                actual: CIRCUIT_STRING_CAPACITY + 1,
            }
        );
    }

    #[test]
    fn journal_carries_code_points_verbatim() {
        let fields = JournalFields {
            agent_id: 7,
            message_number: 1,
            security_code: circuit_chars_from_str("security_code", "ñ✓").expect("fits"),
        };
        let journal = serialize_journal(&fields);

        assert_eq!(&journal[8..12], &0x00f1_u32.to_le_bytes());
        assert_eq!(&journal[12..16], &0x2713_u32.to_le_bytes());
        assert_eq!(
            deserialize_journal(&journal).expect("journal decodes"),
            fields
        );
    }
}
