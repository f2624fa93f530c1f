use ec_core::EcError;
use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Expr(#[from] crate::expr::ExprError),

    #[error(transparent)]
    Core(#[from] EcError),
}

impl From<ModelError> for EcError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Core(e) => e,
            other => EcError::InvalidArg {
                what: Box::leak(other.to_string().into_boxed_str()),
            },
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate {context} name: {name}")]
    DuplicateName { name: String, context: &'static str },

    #[error("Unknown {context} reference: {name}")]
    MissingReference { name: String, context: &'static str },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("{feature} is not supported: {reason}")]
    Unsupported {
        feature: &'static str,
        reason: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ModelError::Validation(ValidationError::DuplicateName {
            name: "train-a".into(),
            context: "MODELS",
        });
        assert!(err.to_string().contains("train-a"));
    }
}
