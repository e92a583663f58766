use thiserror::Error;

use crate::admin::AdminError;

/// Failure of a single command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Wrong arguments; carries the command's one-line usage.
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Admin(#[from] AdminError),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl CommandError {
    pub fn is_usage(&self) -> bool {
        matches!(self, CommandError::Usage(_))
    }
}
