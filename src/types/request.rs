//! Simulated access requests.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

use super::account::AccountId;

/// Well-known condition keys used by the encryption stacks.
pub mod keys {
    pub const SECURE_TRANSPORT: &str = "aws:SecureTransport";
    pub const SOURCE_ARN: &str = "AWS:SourceArn";
    pub const PRINCIPAL_ACCOUNT: &str = "aws:PrincipalAccount";
    pub const PRINCIPAL_ARN: &str = "aws:PrincipalArn";
    pub const SSE: &str = "s3:x-amz-server-side-encryption";
    pub const ACL: &str = "s3:x-amz-acl";
    pub const GRANT_READ: &str = "s3:x-amz-grant-read";
}

/// The identity making a request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Caller {
    /// Unauthenticated request.
    Anonymous,
    /// An AWS service principal, e.g. `cloudfront.amazonaws.com`.
    Service(String),
    /// An IAM identity (user or role) in some account.
    Iam { account: AccountId, arn: String },
}

impl Caller {
    /// An IAM identity; `resource` is the part after the account, e.g. `role/deployer`.
    pub fn iam(account: AccountId, resource: &str) -> Self {
        let arn = format!("arn:aws:iam::{account}:{resource}");
        Caller::Iam { account, arn }
    }
}

impl Display for Caller {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Caller::Anonymous => write!(f, "anonymous"),
            Caller::Service(name) => write!(f, "service:{name}"),
            Caller::Iam { arn, .. } => write!(f, "{arn}"),
        }
    }
}

/// A request to evaluate against a resource policy.
///
/// Requests default to secure transport. IAM callers get
/// `aws:PrincipalAccount` and `aws:PrincipalArn` filled in. Context keys are
/// case-insensitive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessRequest {
    pub caller: Caller,
    pub action: String,
    pub resource: String,
    context: BTreeMap<String, String>,
}

impl AccessRequest {
    pub fn new(caller: Caller, action: impl Into<String>, resource: impl Into<String>) -> Self {
        let mut request = AccessRequest {
            caller,
            action: action.into(),
            resource: resource.into(),
            context: BTreeMap::new(),
        };
        request.set(keys::SECURE_TRANSPORT, "true");
        if let Caller::Iam { account, arn } = request.caller.clone() {
            request.set(keys::PRINCIPAL_ACCOUNT, account.as_str());
            request.set(keys::PRINCIPAL_ARN, &arn);
        }
        request
    }

    pub fn with_context(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set(key, &value.into());
        self
    }

    pub fn without_context(mut self, key: &str) -> Self {
        self.context.remove(&key.to_ascii_lowercase());
        self
    }

    pub fn over_insecure_transport(self) -> Self {
        self.with_context(keys::SECURE_TRANSPORT, "false")
    }

    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    fn set(&mut self, key: &str, value: &str) {
        self.context
            .insert(key.to_ascii_lowercase(), value.to_string());
    }
}

impl Display for AccessRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} {} {}", self.caller, self.action, self.resource)
    }
}
