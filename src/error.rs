use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid account id: {0}")]
    InvalidAccountId(String),

    #[error("invalid ARN: {0}")]
    InvalidArn(String),

    #[error("policy statement has an empty sid")]
    EmptySid,

    #[error("policy statement '{0}' has no principals")]
    EmptyPrincipals(String),

    #[error("policy statement '{0}' has no actions")]
    EmptyActions(String),

    #[error("policy statement '{0}' has no resources")]
    EmptyResources(String),

    #[error("policy document has no statements")]
    EmptyDocument,

    #[error("duplicate statement id in policy document: {0}")]
    DuplicateSid(String),

    #[error("duplicate logical id in stack '{stack}': {logical_id}")]
    DuplicateLogicalId { stack: String, logical_id: String },

    #[error("duplicate stack name: {0}")]
    DuplicateStack(String),

    #[error("unresolved reference: {0}")]
    UnresolvedReference(String),

    #[error("invalid context: {0}")]
    InvalidContext(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::InvalidFormat(err.to_string())
    }
}
