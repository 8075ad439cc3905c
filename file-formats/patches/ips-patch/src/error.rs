//! Error types for IPS decoding and application

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for IPS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while decoding an IPS record stream
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The stream does not start with the `PATCH` magic
    #[error("Invalid IPS header: expected 'PATCH', found {found:?}")]
    InvalidHeader {
        /// The leading bytes actually present (at most five)
        found: Vec<u8>,
    },

    /// A declared field or payload runs past the end of the input
    #[error("Unexpected end of stream reading {field} of record at position {position}")]
    TruncatedStream {
        /// The field being read when input ran out
        field: &'static str,
        /// Stream position where the truncated record starts
        position: u64,
    },
}

/// Main error type for IPS operations
#[derive(Debug, Error)]
pub enum Error {
    /// A patch could not be decoded
    #[error("{patch} is not a valid IPS patch: {source}")]
    Decode {
        /// Name or path of the offending patch
        patch: String,
        /// The underlying decode failure
        #[source]
        source: DecodeError,
    },

    /// Reading or writing storage failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path involved in the failed operation
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Application stopped part way through the patch sequence
    #[error("Applying patches aborted at {patch}: {source}")]
    ApplyAborted {
        /// The patch that failed to load
        patch: String,
        /// Why it failed
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a new Io error for `path`
    pub fn io<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a new Decode error for `patch`
    pub fn decode<S: Into<String>>(patch: S, source: DecodeError) -> Self {
        Error::Decode {
            patch: patch.into(),
            source,
        }
    }

    /// The patch name or path this error is about
    pub fn subject(&self) -> String {
        match self {
            Error::Decode { patch, .. } | Error::ApplyAborted { patch, .. } => patch.clone(),
            Error::Io { path, .. } => path.display().to_string(),
        }
    }

    /// Check if this error indicates a corrupt or non-IPS patch
    pub fn is_corruption(&self) -> bool {
        match self {
            Error::Decode { .. } => true,
            Error::Io { .. } => false,
            Error::ApplyAborted { source, .. } => source.is_corruption(),
        }
    }

    /// The decode failure behind this error, if there is one
    pub fn decode_error(&self) -> Option<&DecodeError> {
        match self {
            Error::Decode { source, .. } => Some(source),
            Error::Io { .. } => None,
            Error::ApplyAborted { source, .. } => source.decode_error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = DecodeError::TruncatedStream {
            field: "rle value",
            position: 12,
        };
        assert_eq!(
            error.to_string(),
            "Unexpected end of stream reading rle value of record at position 12"
        );

        let error = Error::decode(
            "hack.ips",
            DecodeError::InvalidHeader {
                found: b"PK\x03\x04\x14".to_vec(),
            },
        );
        assert!(error.to_string().starts_with("hack.ips is not a valid IPS patch"));
    }

    #[test]
    fn test_aborted_keeps_cause() {
        let inner = Error::decode(
            "b.ips",
            DecodeError::TruncatedStream {
                field: "data",
                position: 5,
            },
        );
        let error = Error::ApplyAborted {
            patch: "b.ips".to_string(),
            source: Box::new(inner),
        };

        assert!(error.is_corruption());
        assert_eq!(error.subject(), "b.ips");
        assert!(matches!(
            error.decode_error(),
            Some(DecodeError::TruncatedStream { field: "data", .. })
        ));

        let io = Error::io("missing.ips", io::Error::from(io::ErrorKind::NotFound));
        assert!(!io.is_corruption());
        assert!(io.decode_error().is_none());
    }
}
