use emco_api::{path::PathError, validate::ValidationError};
use emco_client::ApiError;
use thiserror::Error;

use crate::mutation::PendingOperation;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("{0} is already in progress")]
    Busy(PendingOperation),
    #[error("{0}")]
    Blocked(String),
    #[error("{0}")]
    Empty(String),
    #[error("no such resource: {0}")]
    NotFound(String),
    #[error("the wizard is not at the {0} step")]
    WrongStep(crate::wizard::WizardStep),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ConsoleError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(error) => error.user_message(),
            error => error.to_string(),
        }
    }
}

pub type Result<T, E = ConsoleError> = ::std::result::Result<T, E>;
