use thiserror::Error;

/// Errors raised by the indicator/classification core.
///
/// Thin or inconclusive data is never an error: the classifier answers HOLD
/// for that. Only structurally invalid input or configuration ends up here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SignalError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        SignalError::MalformedInput(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        SignalError::InvalidConfig(msg.into())
    }

    pub fn is_malformed_input(&self) -> bool {
        matches!(self, SignalError::MalformedInput(_))
    }
}
