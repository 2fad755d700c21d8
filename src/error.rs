//! Error types for chain inspection.
//!
//! This module defines the error taxonomy for the connect-and-capture path.
//! Validation outcomes are not errors; an invalid chain is a normal result
//! and is represented by [`crate::ChainVerdict::Invalid`].

use std::fmt;
use std::io;

/// Error type for failures while capturing a peer certificate chain.
///
/// Every variant is terminal for the request that produced it: there is no
/// retry and no partial result. The HTTP layer maps each variant onto a
/// single status code and JSON envelope.
#[derive(Debug)]
pub enum TlsCheckError {
    /// DNS resolution failed for the given target
    DnsResolution {
        /// The host string that failed to resolve
        host: String,
        /// The underlying I/O error
        source: io::Error,
    },

    /// TCP connection failed to the target address
    ConnectionFailed {
        /// The address (host:port) that connection failed to
        address: String,
        /// The underlying I/O error
        source: io::Error,
    },

    /// TLS handshake failed
    HandshakeFailed {
        /// Details about why the handshake failed
        details: String,
    },

    /// Handshake completed but the peer presented zero certificates
    NoCertificates,

    /// Network operation timeout
    Timeout {
        /// Description of which operation timed out
        operation: String,
    },

    /// Invalid input provided to the API
    InvalidInput {
        /// Which field/parameter was invalid
        field: String,
        /// Why it was invalid
        reason: String,
    },

    /// OpenSSL error occurred
    OpenSsl {
        /// The underlying OpenSSL error
        details: String,
    },

    /// Generic I/O error
    Io {
        /// The underlying I/O error
        source: io::Error,
    },
}

impl fmt::Display for TlsCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DnsResolution { host, .. } => {
                write!(f, "Failed to resolve target address: {}", host)
            }
            Self::ConnectionFailed { address, source } => {
                write!(f, "Connection failed to {}: {}", address, source)
            }
            Self::HandshakeFailed { details } => {
                write!(f, "TLS handshake failed: {}", details)
            }
            Self::NoCertificates => {
                write!(f, "Server did not provide any certificates.")
            }
            Self::Timeout { operation } => {
                write!(f, "Operation timed out: {}", operation)
            }
            Self::InvalidInput { field, reason } => {
                write!(f, "Invalid input for '{}': {}", field, reason)
            }
            Self::OpenSsl { details } => {
                write!(f, "OpenSSL error: {}", details)
            }
            Self::Io { source } => {
                write!(f, "I/O error: {}", source)
            }
        }
    }
}

impl std::error::Error for TlsCheckError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DnsResolution { source, .. } => Some(source),
            Self::ConnectionFailed { source, .. } => Some(source),
            Self::Io { source } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for TlsCheckError {
    fn from(e: io::Error) -> Self {
        Self::Io { source: e }
    }
}

impl From<openssl::error::ErrorStack> for TlsCheckError {
    fn from(e: openssl::error::ErrorStack) -> Self {
        Self::OpenSsl {
            details: e.to_string(),
        }
    }
}

impl<S: fmt::Debug> From<openssl::ssl::HandshakeError<S>> for TlsCheckError {
    fn from(e: openssl::ssl::HandshakeError<S>) -> Self {
        Self::HandshakeFailed {
            details: format!("{}", e),
        }
    }
}
