//! AWS Config managed rules.

use serde_json::{Value, json};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::error::ConfigError;
use crate::traits::CfnResource;
use crate::types::Expr;

/// Managed rule identifiers used by the encryption stacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
pub enum ManagedRuleIdentifier {
    #[strum(serialize = "S3_BUCKET_SERVER_SIDE_ENCRYPTION_ENABLED")]
    S3BucketServerSideEncryptionEnabled,
    #[strum(serialize = "S3_BUCKET_SSL_REQUESTS_ONLY")]
    S3BucketSslRequestsOnly,
}

/// Limits a rule to one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleScope {
    pub resource_type: String,
    pub resource_id: Expr,
}

impl RuleScope {
    pub fn from_resource(resource_type: impl Into<String>, resource_id: impl Into<Expr>) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
        }
    }
}

/// A continuously evaluated conformance check. Reported, never enforced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedRule {
    logical_id: String,
    identifier: ManagedRuleIdentifier,
    scope: RuleScope,
}

impl ManagedRule {
    pub fn new(
        logical_id: impl Into<String>,
        identifier: ManagedRuleIdentifier,
        scope: RuleScope,
    ) -> Self {
        Self {
            logical_id: logical_id.into(),
            identifier,
            scope,
        }
    }

    pub fn identifier(&self) -> ManagedRuleIdentifier {
        self.identifier
    }

    pub fn scope(&self) -> &RuleScope {
        &self.scope
    }
}

impl CfnResource for ManagedRule {
    fn resource_type(&self) -> &'static str {
        "AWS::Config::ConfigRule"
    }

    fn logical_id(&self) -> &str {
        &self.logical_id
    }

    fn properties(&self) -> Result<Value, ConfigError> {
        Ok(json!({
            "Source": {
                "Owner": "AWS",
                "SourceIdentifier": self.identifier.as_ref(),
            },
            "Scope": {
                "ComplianceResourceTypes": [self.scope.resource_type],
                "ComplianceResourceId": self.scope.resource_id,
            },
        }))
    }
}
