//! Error types.
//!
//! The binary reports every failure as an [`AppError`], which carries the
//! process exit code alongside a message:
//!
//! - `2`: bad input, usage or IO
//! - `3`: not enough usable data
//! - `4`: numerical failure
//!
//! Library code returns the narrower typed errors below and lets `?` convert
//! them at the application boundary.

use thiserror::Error;

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

/// Problems turning a loose parameter mapping into a model's parameter record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    #[error("Missing parameter '{0}'.")]
    Missing(String),

    #[error("Parameter '{name}' is not finite ({value}).")]
    NonFinite { name: String, value: f64 },

    #[error("Unknown model '{0}' (expected one of: m6, m111).")]
    UnknownModel(String),

    #[error("QU data column '{column}' has {got} entries but there are {expected} channels.")]
    DataLength {
        column: &'static str,
        expected: usize,
        got: usize,
    },
}

/// Problems building or sampling a prior specification.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PriorError {
    #[error("Invalid bounds for prior '{name}': minimum={minimum}, maximum={maximum} (must be finite and maximum > minimum).")]
    InvalidBounds {
        name: String,
        minimum: f64,
        maximum: f64,
    },

    #[error("Unit-cube sample has {got} entries but the prior has {expected} search parameters.")]
    UnitCubeLength { expected: usize, got: usize },

    #[error("No prior draw satisfied the constraints after {0} attempts.")]
    SamplingExhausted(usize),

    #[error("Prior conversion failed: {0}")]
    Conversion(#[from] ParamError),
}

impl From<ParamError> for AppError {
    fn from(e: ParamError) -> Self {
        AppError::new(2, e.to_string())
    }
}

impl From<PriorError> for AppError {
    fn from(e: PriorError) -> Self {
        let code = match e {
            PriorError::SamplingExhausted(_) => 4,
            _ => 2,
        };
        AppError::new(code, e.to_string())
    }
}
