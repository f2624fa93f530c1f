use thiserror::Error;

pub type EcResult<T> = Result<T, EcError>;

#[derive(Error, Debug)]
pub enum EcError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Index out of bounds: {what} (index={index}, len={len})")]
    IndexOob {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Invariant violated: {what}")]
    Invariant { what: &'static str },

    #[error("Root-finder did not converge: {what}")]
    DidNotConverge { what: &'static str },
}
