#![forbid(unsafe_code)]

//! Error types for encoding and decoding destination values.

use crate::destination::DestinationType;

/// Errors raised while turning an encoded element back into a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The payload was tagged for a different destination type.
    TypeMismatch {
        expected: DestinationType,
        found: DestinationType,
    },
    /// The payload could not be parsed as the tagged type.
    Malformed {
        destination: DestinationType,
        message: String,
    },
}

impl DecodeError {
    /// Destination type the payload claimed to be.
    #[must_use]
    pub fn destination(&self) -> &DestinationType {
        match self {
            Self::TypeMismatch { found, .. } => found,
            Self::Malformed { destination, .. } => destination,
        }
    }
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TypeMismatch { expected, found } => {
                write!(f, "expected a '{expected}' payload, found '{found}'")
            }
            Self::Malformed {
                destination,
                message,
            } => write!(f, "malformed '{destination}' payload: {message}"),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Errors raised while serializing a destination value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeError {
    pub destination: DestinationType,
    pub message: String,
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "failed to encode '{}' destination: {}",
            self.destination, self.message
        )
    }
}

impl std::error::Error for EncodeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_destination() {
        let err = DecodeError::Malformed {
            destination: DestinationType::from_tag("profile"),
            message: "eof".into(),
        };
        assert_eq!(err.to_string(), "malformed 'profile' payload: eof");
        assert_eq!(err.destination().as_str(), "profile");
    }

    #[test]
    fn mismatch_reports_found_type() {
        let err = DecodeError::TypeMismatch {
            expected: DestinationType::from_tag("a"),
            found: DestinationType::from_tag("b"),
        };
        assert_eq!(err.destination().as_str(), "b");
        assert!(err.to_string().contains("expected a 'a' payload"));
    }
}
