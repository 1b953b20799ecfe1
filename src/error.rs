use thiserror::Error;

/// Application-level error carrying the process exit code.
///
/// Exit codes:
/// - `2`: invalid input, configuration or I/O
/// - `3`: not enough usable data
/// - `4`: numerical failure
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failure modes of the least squares estimator.
///
/// Both are recoverable: the selection controller answers them with its
/// fixed coefficient set instead of propagating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FitError {
    #[error("regression needs at least 2 points, got {n}")]
    InsufficientSamples { n: usize },
    #[error("independent variable has zero variance")]
    DegenerateInput,
}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        let code = match err {
            FitError::InsufficientSamples { .. } => 3,
            FitError::DegenerateInput => 4,
        };
        AppError::new(code, format!("Regression failed: {err}"))
    }
}
