use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing required argument: {arg}")]
    MissingArgument { arg: String },

    #[error("Invalid threshold {value}: must be a finite number >= 0")]
    InvalidThreshold { value: f64 },

    #[error("{failed} of {total} outputs failed")]
    UnitsFailed { failed: usize, total: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Reframe(#[from] adreframe::Error),
}
