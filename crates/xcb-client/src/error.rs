//! Adapter error types.

use xcb_state::CollaboratorError;

/// Errors from the JSON-RPC client and the relayer driver.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The endpoint URL does not parse.
    #[error("invalid endpoint {url}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },

    /// The node answered with a non-success HTTP status.
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The node answered with a JSON-RPC error object.
    #[error("{endpoint} {method} returned error {code}: {message}")]
    Rpc {
        endpoint: String,
        method: String,
        code: i64,
        message: String,
    },

    /// The node's answer does not have the expected shape.
    #[error("unexpected response from {endpoint} {method}: {reason}")]
    Decode {
        endpoint: String,
        method: String,
        reason: String,
    },

    /// The relayer binary could not be started.
    #[error("failed to run {binary}: {source}")]
    Spawn {
        binary: String,
        source: std::io::Error,
    },

    /// The relayer exited unsuccessfully.
    #[error("{command} exited with {status}: {stderr}")]
    Relayer {
        command: String,
        status: String,
        stderr: String,
    },
}

impl ClientError {
    /// Classify for the sequencer. Transport problems and node-side errors
    /// are retryable. Malformed answers and relayer failures are not.
    pub fn into_collaborator(self, collaborator: &str) -> CollaboratorError {
        match &self {
            Self::Http { .. } | Self::Rpc { .. } => CollaboratorError::unavailable(collaborator, self.to_string()),
            Self::Status { status, .. } if *status >= 500 => {
                CollaboratorError::unavailable(collaborator, self.to_string())
            }
            _ => CollaboratorError::rejected(collaborator, self.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_errors_are_not_retryable() {
        let err = ClientError::Decode {
            endpoint: "http://localhost:8943".to_string(),
            method: "chain_getHeader".to_string(),
            reason: "missing number".to_string(),
        };
        assert!(!err.into_collaborator("bridge-hub-rococo").is_retryable());
    }

    #[test]
    fn missing_binary_is_rejected() {
        let err = ClientError::Spawn {
            binary: "substrate-relay".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        let collab = err.into_collaborator("relay");
        assert!(matches!(collab, CollaboratorError::Rejected { .. }));
    }

    #[test]
    fn only_server_errors_are_retryable() {
        let status = |status| ClientError::Status {
            endpoint: "http://localhost:8943".to_string(),
            status,
            body: String::new(),
        };
        assert!(status(503).into_collaborator("bh").is_retryable());
        assert!(!status(404).into_collaborator("bh").is_retryable());
    }

    #[test]
    fn rpc_errors_are_retryable() {
        let err = ClientError::Rpc {
            endpoint: "http://localhost:8943".to_string(),
            method: "state_getStorage".to_string(),
            code: -32000,
            message: "busy".to_string(),
        };
        assert!(err.into_collaborator("bridge-hub-rococo").is_retryable());
    }
}
