use crate::api::Error as ApiError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The server answered, and refused
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The server could not be reached, or answered garbage
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

impl Error {
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Error::Api(ApiError::Unauthenticated))
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, Error::Api(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Error {
        Error::Transport(anyhow::Error::new(e))
    }
}
