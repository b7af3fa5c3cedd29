use emco_api::{path::PathError, validate::ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to reach the backend: {0}")]
    Transport(#[from] ::reqwest::Error),
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode the backend response: {0}")]
    Decode(#[from] ::serde_json::Error),
    #[error("the backend returned an empty body")]
    EmptyBody,
    #[error("invalid backend url: {0}")]
    Url(#[from] ::url::ParseError),
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ApiError {
    pub const FORBIDDEN: u16 = 403;

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(error) => error.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(Self::FORBIDDEN)
    }

    /// The text shown to an operator: policy rejections carry the server body
    /// verbatim.
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { status, body } if *status == Self::FORBIDDEN && !body.is_empty() => {
                body.trim().to_string()
            }
            error => error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_body_is_verbatim() {
        let error = ApiError::Status {
            status: 403,
            body: "cluster quota exceeded\n".into(),
        };
        assert!(error.is_forbidden());
        assert_eq!(error.user_message(), "cluster quota exceeded");

        let error = ApiError::Status {
            status: 500,
            body: "boom".into(),
        };
        assert!(!error.is_forbidden());
        assert_eq!(error.user_message(), "backend returned 500: boom");
    }
}
