//! Shared error type for the fetcher. Every variant names the request it failed on.

use thiserror::Error;

/// Coarse classification used for exit codes and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing account URL, or an account the host does not know.
    InvalidInput,
    /// Transport failure or non-success HTTP status.
    Network,
    /// Response body or headers did not have the expected structure.
    Parse,
}

/// Fetch error for profile resolution, HTTP and response parsing.
#[derive(Debug, Error)]
pub enum FetchError {
    // Input
    #[error("Invalid account URL: {input}: {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("No account found for {acct} on {host}")]
    AccountNotFound { acct: String, host: String },

    // Network
    #[error("Network error: could not reach {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("HTTP {status} when fetching {context}: {url}")]
    HttpStatus {
        status: u16,
        url: String,
        /// Which request failed, e.g. "account lookup" or "page 3".
        context: String,
    },

    #[error("Failed to read response body from {url}: {source}")]
    BodyRead { url: String, source: reqwest::Error },

    // Parsing
    #[error("Unexpected response for {context} at {url}: {reason}")]
    ParseResponse {
        url: String,
        context: String,
        reason: String,
    },

    #[error("Invalid Link header at {url}: {reason}")]
    InvalidLink { url: String, reason: String },

    #[error("The {relation} list of {acct} is not public ({count} accounts reported, none listed)")]
    ListHidden {
        acct: String,
        relation: String,
        count: u64,
    },

    #[error("The {relation} list of {acct} is hidden or unknown to {host} ({count} accounts reported, none listed). Query the account's home instance instead.")]
    ListNotFederated {
        acct: String,
        host: String,
        relation: String,
        count: u64,
    },
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::InvalidUrl { .. } | FetchError::AccountNotFound { .. } => {
                ErrorKind::InvalidInput
            }
            FetchError::Network { .. }
            | FetchError::HttpStatus { .. }
            | FetchError::BodyRead { .. } => ErrorKind::Network,
            FetchError::ParseResponse { .. }
            | FetchError::InvalidLink { .. }
            | FetchError::ListHidden { .. }
            | FetchError::ListNotFederated { .. } => ErrorKind::Parse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        let invalid = FetchError::InvalidUrl {
            input: "x".into(),
            reason: "y".into(),
        };
        assert_eq!(invalid.kind(), ErrorKind::InvalidInput);
        let missing = FetchError::AccountNotFound {
            acct: "alice".into(),
            host: "example.social".into(),
        };
        assert_eq!(missing.kind(), ErrorKind::InvalidInput);
        let status = FetchError::HttpStatus {
            status: 503,
            url: "https://example.social/".into(),
            context: "page 1".into(),
        };
        assert_eq!(status.kind(), ErrorKind::Network);
        let hidden = FetchError::ListHidden {
            acct: "alice".into(),
            relation: "followers".into(),
            count: 12,
        };
        assert_eq!(hidden.kind(), ErrorKind::Parse);
    }

    #[test]
    fn messages_name_the_failing_request() {
        let e = FetchError::HttpStatus {
            status: 500,
            url: "https://example.social/api/v1/accounts/1/following?limit=80".into(),
            context: "page 2".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("HTTP 500"));
        assert!(msg.contains("page 2"));
        assert!(msg.contains("/api/v1/accounts/1/following"));
    }
}
