/// Failures talking to the remote catalog, for reads and writes alike.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The service answered with something other than a 2xx status.
    #[error("{status} - {body}")]
    Status { status: u16, body: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl TransportError {
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// HTTP status code, when the failure came from a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether repeating the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Status { status, .. } => *status == 429 || (500..600).contains(status),
            Self::Parse(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display_leads_with_code() {
        let err = TransportError::status(422, r#"{"errors":"cost is invalid"}"#);
        assert_eq!(err.to_string(), r#"422 - {"errors":"cost is invalid"}"#);
        assert_eq!(err.status_code(), Some(422));
    }

    #[test]
    fn transient_classification() {
        assert!(TransportError::Network("reset".into()).is_transient());
        assert!(TransportError::status(429, "").is_transient());
        assert!(TransportError::status(503, "").is_transient());
        assert!(!TransportError::status(422, "").is_transient());
        assert!(!TransportError::status(302, "").is_transient());
        assert!(!TransportError::Parse("bad json".into()).is_transient());
    }
}
