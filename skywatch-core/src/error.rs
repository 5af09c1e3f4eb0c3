use thiserror::Error;

/// Credential problems. Fatal to the process's ability to talk to the
/// provider; there is no automatic recovery.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("failed to load signing key: {0}")]
    KeyLoad(#[source] jsonwebtoken::errors::Error),

    #[error("no signing key loaded")]
    KeyMissing,

    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// A remote call that did not produce a usable payload.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{endpoint} request failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    /// The provider's in-body status code was not the success value.
    #[error("{endpoint} returned provider code {code}")]
    Provider {
        endpoint: &'static str,
        code: String,
    },

    #[error("failed to parse {endpoint} response: {source}")]
    Parse {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Structurally valid response with a field value that does not parse
    /// as the expected number.
    #[error("{endpoint} returned unparseable {field} value {value:?}")]
    Malformed {
        endpoint: &'static str,
        field: &'static str,
        value: String,
    },

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Location lookup failed or returned nothing. Fatal to initialization;
/// retried only by a fresh initialization.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("location lookup returned no match for {0:?}")]
    NoMatch(String),

    #[error("location lookup returned unparseable coordinate {0:?}")]
    Coordinate(String),
}
