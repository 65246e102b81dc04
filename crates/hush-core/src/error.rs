use thiserror::Error;

#[derive(Debug, Error)]
pub enum HushError {
    /// A rule or the `global` section is malformed or missing a required field.
    #[error("Validation error in {location}: {field}: {reason}")]
    Validation {
        location: String,
        field: String,
        reason: String,
    },

    /// The silence store returned something that is not a silence list.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Listing pods, spawning or executing a command failed.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HushError {
    pub fn validation(
        location: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        HushError::Validation {
            location: location.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Short error code string attached to log lines.
    pub fn code(&self) -> &'static str {
        match self {
            HushError::Validation { .. } => "VALIDATION_ERROR",
            HushError::Parse(_) => "PARSE_ERROR",
            HushError::Transport(_) => "TRANSPORT_ERROR",
            HushError::Config(_) => "CONFIG_ERROR",
            HushError::Io(_) => "IO_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, HushError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_names_location_and_field() {
        let err = HushError::validation("alerts[2]", "timeStart", "expected H:M:S");
        assert_eq!(
            err.to_string(),
            "Validation error in alerts[2]: timeStart: expected H:M:S"
        );
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
