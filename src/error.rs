use kube::core::ErrorResponse;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Resource not found: {kind} {name} in namespace {namespace}")]
    NotFound {
        kind: String,
        name: String,
        namespace: String,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid patch: {0}")]
    InvalidPatch(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// True for failures while encoding, decoding or merging object JSON.
    pub fn is_serialization(&self) -> bool {
        matches!(self, Error::SerializationError(_) | Error::InvalidPatch(_))
    }

    /// Convert into the error a real `kube::Client` would return for the same condition.
    pub fn into_kube_err(self) -> kube::Error {
        let (reason, code) = match &self {
            Error::NotFound { .. } => ("NotFound", 404),
            Error::SerializationError(_) | Error::InvalidRequest(_) => ("BadRequest", 400),
            Error::InvalidPatch(_) => ("Invalid", 422),
            Error::Internal(_) => ("InternalError", 500),
        };

        kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: self.to_string(),
            reason: reason.to_string(),
            code,
        })
    }
}
