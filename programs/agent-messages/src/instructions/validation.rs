//! Authentication and length checks shared by the handlers.

use crate::errors::{LengthCheckedField, RejectionReason};
use crate::state::{CircuitString, SecurityCode, STRING_CAPACITY};
use crate::utils::validation::{logical_contents_match, logical_length};

pub fn authenticate(stored: &SecurityCode, provided: &SecurityCode) -> Result<(), RejectionReason> {
    if logical_contents_match(stored.as_chars(), provided.as_chars(), STRING_CAPACITY) {
        Ok(())
    } else {
        Err(RejectionReason::InvalidSecurityCode)
    }
}

pub fn require_length(
    field: LengthCheckedField,
    value: &CircuitString,
    expected: usize,
) -> Result<(), RejectionReason> {
    let actual = logical_length(value.as_chars(), STRING_CAPACITY);
    if actual == expected {
        Ok(())
    } else {
        Err(RejectionReason::InvalidContentLength {
            field,
            expected,
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(value: &str) -> SecurityCode {
        CircuitString::new("security_code", value).expect("fits")
    }

    #[test]
    fn test_authenticate() {
        assert!(authenticate(&code("jb"), &code("jb")).is_ok());
        assert_eq!(
            authenticate(&code("jb"), &code("aa")),
            Err(RejectionReason::InvalidSecurityCode)
        );
        assert_eq!(
            authenticate(&code("jb"), &code("")),
            Err(RejectionReason::InvalidSecurityCode)
        );
    }

    #[test]
    fn test_require_length_reports_actual() {
        let content = CircuitString::new("content", "iamjames").expect("fits");
        assert_eq!(
            require_length(LengthCheckedField::MessageContent, &content, 12),
            Err(RejectionReason::InvalidContentLength {
                field: LengthCheckedField::MessageContent,
                expected: 12,
                actual: 8,
            })
        );
        assert!(require_length(LengthCheckedField::MessageContent, &content, 8).is_ok());
    }
}
