//! Error types for ghrel operations.
//!
//! Everything the library can fail with lives here, including the
//! request/response capture attached to HTTP failures so a CI log is enough
//! to diagnose a rejected call.

use std::fmt;
use thiserror::Error;

/// Result type alias for ghrel operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for all ghrel operations
#[derive(Error, Debug)]
pub enum Error {
    /// No release carries the requested tag name
    #[error("release with tag '{tag}' not found in {repo}")]
    ReleaseNotFound {
        /// Repository in `owner/name` form
        repo: String,
        /// Tag name that failed to resolve
        tag: String,
    },

    /// The remote rejected a request with a non-2xx status
    #[error("{0}")]
    Http(Box<HttpFailure>),

    /// The request never produced a response (DNS, connect, timeout, TLS)
    #[error("request to {url} failed: {source}")]
    Transport {
        /// URL of the failed request
        url: String,
        /// Underlying client error
        source: reqwest::Error,
    },

    /// A transient failure survived the bounded retry loop
    #[error("{operation} gave up after {attempts} attempt(s): {source}")]
    RetriesExhausted {
        /// Human-readable name of the operation
        operation: String,
        /// Number of attempts made
        attempts: u32,
        /// Error from the final attempt
        source: Box<Error>,
    },

    /// A step of the tag-rewrite sequence failed, leaving the release in
    /// the intermediate state named by `step`
    #[error("tag rewrite failed during {step}: {source}")]
    Retarget {
        /// Step that failed
        step: RetargetStep,
        /// Error raised by the step
        source: Box<Error>,
    },

    /// Invalid glob pattern supplied on the command line
    #[error("invalid pattern '{pattern}': {source}")]
    Pattern {
        /// Offending pattern text
        pattern: String,
        /// Parser error
        source: glob::PatternError,
    },

    /// No authentication token available
    #[error("GitHub token not provided. Set GITHUB_TOKEN or GH_TOKEN, or pass --github-token")]
    MissingToken,

    /// `$EDITOR` invocation failed during `release notes`
    #[error("editor '{editor}' exited with status {status}")]
    Editor {
        /// Editor command that was run
        editor: String,
        /// Its exit status
        status: i32,
    },

    /// Invalid command line arguments
    #[error("invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Steps of the release-tag rewrite sequence, in execution order.
///
/// Attached to [`Error::Retarget`] so a partial failure reports exactly how
/// far the sequence got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetargetStep {
    /// Listing references to resolve the current tag
    ResolveRef,
    /// First PATCH: move the release onto the temporary tag
    RenameToTemp,
    /// Deleting the orphaned original reference
    DeleteOldRef,
    /// Second PATCH: move the release back onto the final tag
    RenameToFinal,
    /// Deleting the leftover temporary reference
    DeleteTempRef,
}

impl fmt::Display for RetargetStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RetargetStep::ResolveRef => "resolve-ref",
            RetargetStep::RenameToTemp => "rename-to-temp",
            RetargetStep::DeleteOldRef => "delete-old-ref",
            RetargetStep::RenameToFinal => "rename-to-final",
            RetargetStep::DeleteTempRef => "delete-temp-ref",
        };
        f.write_str(name)
    }
}

/// Captured context of a rejected HTTP exchange.
///
/// Bodies are truncated to [`HttpFailure::BODY_PREVIEW`] bytes; the full
/// lengths are reported alongside.
#[derive(Debug)]
pub struct HttpFailure {
    /// Request method
    pub method: String,
    /// Request URL
    pub url: String,
    /// Request headers, sorted by name
    pub request_headers: Vec<(String, String)>,
    /// Truncated request body, if one was sent
    pub request_body: Option<String>,
    /// Total request body length in bytes
    pub request_body_len: usize,
    /// Response status code
    pub status: u16,
    /// Response status reason phrase
    pub reason: String,
    /// Response headers, sorted by name
    pub response_headers: Vec<(String, String)>,
    /// Truncated response body
    pub response_body: String,
    /// Total response body length in bytes
    pub response_body_len: usize,
}

impl HttpFailure {
    /// Bytes of request/response body kept for diagnostics
    pub const BODY_PREVIEW: usize = 64;

    /// True for statuses worth retrying at the transport layer
    pub fn is_transient(&self) -> bool {
        self.status >= 500 || self.status == 429
    }
}

impl fmt::Display for HttpFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error sending {} to {}", self.method, self.url)?;
        writeln!(f, "< {} {}", self.method, self.url)?;
        for (name, value) in &self.request_headers {
            writeln!(f, "< {name}: {value}")?;
        }
        if let Some(body) = &self.request_body {
            writeln!(f, "<")?;
            writeln!(
                f,
                "< {:?} (total {} bytes of data)",
                body, self.request_body_len
            )?;
        }
        writeln!(f, "> {} {}", self.status, self.reason)?;
        for (name, value) in &self.response_headers {
            writeln!(f, "> {name}: {value}")?;
        }
        if !self.response_body.is_empty() {
            writeln!(f, ">")?;
            write!(
                f,
                "> {:?} (total {} bytes of data)",
                self.response_body, self.response_body_len
            )?;
        }
        Ok(())
    }
}

impl Error {
    /// Check whether retrying the same request can plausibly succeed.
    ///
    /// Transient means a 5xx/429 response or a connection-level failure.
    /// 4xx responses (including conflicts) and lookup misses are final.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Http(failure) => failure.is_transient(),
            Error::Transport { source, .. } => {
                source.is_connect() || source.is_timeout() || source.is_request()
            }
            _ => false,
        }
    }

    /// Step attribution for partial tag-rewrite failures, if any
    pub fn retarget_step(&self) -> Option<RetargetStep> {
        match self {
            Error::Retarget { step, .. } => Some(*step),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(status: u16) -> Error {
        Error::Http(Box::new(HttpFailure {
            method: "PATCH".into(),
            url: "https://api.github.com/repos/o/r/releases/1".into(),
            request_headers: vec![],
            request_body: None,
            request_body_len: 0,
            status,
            reason: String::new(),
            response_headers: vec![],
            response_body: String::new(),
            response_body_len: 0,
        }))
    }

    #[test]
    fn server_errors_are_transient() {
        assert!(failure(500).is_transient());
        assert!(failure(503).is_transient());
        assert!(failure(429).is_transient());
    }

    #[test]
    fn client_errors_are_final() {
        assert!(!failure(404).is_transient());
        assert!(!failure(409).is_transient());
        assert!(!failure(422).is_transient());
    }

    #[test]
    fn lookup_misses_are_final() {
        let err = Error::ReleaseNotFound {
            repo: "o/r".into(),
            tag: "1.0.0".into(),
        };
        assert!(!err.is_transient());
    }

    #[test]
    fn retarget_failures_name_their_step() {
        let err = Error::Retarget {
            step: RetargetStep::DeleteOldRef,
            source: Box::new(failure(502)),
        };
        assert_eq!(err.retarget_step(), Some(RetargetStep::DeleteOldRef));
        assert!(err.to_string().contains("delete-old-ref"));
    }

    #[test]
    fn http_failure_renders_both_directions() {
        let failure = HttpFailure {
            method: "POST".into(),
            url: "https://api.github.com/repos/o/r/git/refs".into(),
            request_headers: vec![("content-type".into(), "application/json".into())],
            request_body: Some("{\"ref\":\"refs/tags/1.0".into()),
            request_body_len: 48,
            status: 422,
            reason: "Unprocessable Entity".into(),
            response_headers: vec![],
            response_body: "{\"message\":\"Reference already exists\"".into(),
            response_body_len: 90,
        };
        let rendered = failure.to_string();
        assert!(rendered.contains("< POST"));
        assert!(rendered.contains("> 422 Unprocessable Entity"));
        assert!(rendered.contains("total 90 bytes"));
    }
}
