use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedErrorClass {
    /// The request did not complete normally; the caller may retry.
    Transport,
    /// The upstream rejected or garbled this particular request.
    Contract,
}

/// Failure of one births feed request.
///
/// A 404 from the feed is not represented here: it means "no records for this
/// date" and is returned as an empty result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    #[error("feed request failed due to timeout")]
    Timeout,
    #[error("feed request cancelled")]
    Cancelled,
    #[error("feed request failed due to network error: {0}")]
    NetworkUnavailable(String),
    #[error("feed rejected the request: invalid parameter")]
    InvalidParameter,
    #[error("feed rejected the request: unsupported language")]
    UnsupportedLanguage,
    #[error("feed returned unexpected HTTP status {0}")]
    UnexpectedStatus(u16),
    #[error("feed failed to return births data: {0}")]
    MalformedPayload(String),
}

impl FeedError {
    pub fn class(&self) -> FeedErrorClass {
        match self {
            Self::Timeout
            | Self::Cancelled
            | Self::NetworkUnavailable(_)
            | Self::UnexpectedStatus(_) => FeedErrorClass::Transport,
            Self::InvalidParameter | Self::UnsupportedLanguage | Self::MalformedPayload(_) => {
                FeedErrorClass::Contract
            }
        }
    }

    /// Whether repeating the same request may succeed. `MalformedPayload` is
    /// treated as a transient upstream defect.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidParameter | Self::UnsupportedLanguage)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("invalid calendar date: month {month}, day {day}")]
    InvalidDate { month: u32, day: u32 },
    #[error("unrecognised date '{0}', expected MM-DD")]
    UnparseableDate(String),
    #[error("unknown sort field '{0}', expected 'year' or 'name'")]
    UnknownSortField(String),
    #[error("unknown sort direction '{0}', expected 'asc' or 'desc'")]
    UnknownSortDirection(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_transport_and_contract_errors() {
        assert_eq!(FeedError::Timeout.class(), FeedErrorClass::Transport);
        assert_eq!(FeedError::Cancelled.class(), FeedErrorClass::Transport);
        assert_eq!(
            FeedError::UnexpectedStatus(503).class(),
            FeedErrorClass::Transport
        );
        assert_eq!(
            FeedError::InvalidParameter.class(),
            FeedErrorClass::Contract
        );
        assert_eq!(
            FeedError::MalformedPayload("missing births".into()).class(),
            FeedErrorClass::Contract
        );
    }

    #[test]
    fn only_caller_input_errors_are_not_retryable() {
        assert!(FeedError::Timeout.is_retryable());
        assert!(FeedError::NetworkUnavailable("refused".into()).is_retryable());
        assert!(FeedError::MalformedPayload("x".into()).is_retryable());
        assert!(!FeedError::InvalidParameter.is_retryable());
        assert!(!FeedError::UnsupportedLanguage.is_retryable());
    }
}
