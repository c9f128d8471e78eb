//! KMS customer-managed keys and aliases.

use serde_json::{Value, json};

use crate::error::ConfigError;
use crate::traits::CfnResource;
use crate::types::{Expr, PolicyDocument};

use super::RemovalPolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyProps {
    /// Alias name including the `alias/` prefix.
    pub alias: String,
    pub enable_key_rotation: bool,
    pub removal_policy: RemovalPolicy,
}

/// A symmetric customer-managed key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KmsKey {
    logical_id: String,
    props: KeyProps,
    policy: PolicyDocument,
}

impl KmsKey {
    pub fn new(
        logical_id: impl Into<String>,
        props: KeyProps,
        policy: PolicyDocument,
    ) -> Result<Self, ConfigError> {
        if !props.alias.starts_with("alias/") || props.alias.starts_with("alias/aws/") {
            return Err(ConfigError::InvalidFormat(format!(
                "key alias '{}' must start with 'alias/' and not use the reserved 'alias/aws/' prefix",
                props.alias
            )));
        }
        Ok(Self {
            logical_id: logical_id.into(),
            props,
            policy,
        })
    }

    pub fn props(&self) -> &KeyProps {
        &self.props
    }

    pub fn policy(&self) -> &PolicyDocument {
        &self.policy
    }

    pub fn arn(&self) -> Expr {
        self.attr("Arn")
    }

    /// The alias resource pointing at this key; its logical id is `<key>Alias`.
    pub fn alias(&self) -> KmsAlias {
        KmsAlias {
            logical_id: format!("{}Alias", self.logical_id),
            alias_name: self.props.alias.clone(),
            target_key_id: self.arn(),
        }
    }
}

impl CfnResource for KmsKey {
    fn resource_type(&self) -> &'static str {
        "AWS::KMS::Key"
    }

    fn logical_id(&self) -> &str {
        &self.logical_id
    }

    fn properties(&self) -> Result<Value, ConfigError> {
        Ok(json!({
            "KeyPolicy": serde_json::to_value(&self.policy)?,
            "EnableKeyRotation": self.props.enable_key_rotation,
        }))
    }

    fn removal_policy(&self) -> Option<RemovalPolicy> {
        Some(self.props.removal_policy)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KmsAlias {
    logical_id: String,
    alias_name: String,
    target_key_id: Expr,
}

impl KmsAlias {
    pub fn alias_name(&self) -> &str {
        &self.alias_name
    }
}

impl CfnResource for KmsAlias {
    fn resource_type(&self) -> &'static str {
        "AWS::KMS::Alias"
    }

    fn logical_id(&self) -> &str {
        &self.logical_id
    }

    fn properties(&self) -> Result<Value, ConfigError> {
        Ok(json!({
            "AliasName": self.alias_name,
            "TargetKeyId": self.target_key_id,
        }))
    }
}
