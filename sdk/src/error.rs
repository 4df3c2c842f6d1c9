use thiserror::Error;

/// Failure raised by a generated loader while populating a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("Environment variable {var} holds unknown enum symbol \"{symbol}\"")]
    UnknownEnumSymbol {
        var:    String,
        symbol: String,
    },
}
