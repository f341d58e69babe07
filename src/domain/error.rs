use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    /// The credential for the generative service is missing.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Network or service failure, surfaced verbatim.
    #[error("Upstream error: {0}")]
    UpstreamError(String),

    /// Model output was not valid JSON after fence stripping.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Well-formed JSON of the wrong shape.
    #[error("Contract error: {0}")]
    ContractError(String),

    /// Rejected locally; no request was made.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl DomainError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::UpstreamError(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    pub fn contract(msg: impl Into<String>) -> Self {
        Self::ContractError(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigError(_))
    }

    pub fn is_upstream_error(&self) -> bool {
        matches!(self, Self::UpstreamError(_))
    }

    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::ParseError(_))
    }

    pub fn is_contract_error(&self) -> bool {
        matches!(self, Self::ContractError(_))
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicates_match_their_variant_only() {
        let err = DomainError::contract("missing document_id");
        assert!(err.is_contract_error());
        assert!(!err.is_parse_error());
        assert!(!err.is_config_error());
        assert!(!err.is_upstream_error());
        assert!(!err.is_invalid_input());
        assert!(DomainError::invalid_input("blank").is_invalid_input());
    }

    #[test]
    fn display_carries_the_message() {
        let err = DomainError::upstream("503 Service Unavailable");
        assert_eq!(err.to_string(), "Upstream error: 503 Service Unavailable");
    }
}
