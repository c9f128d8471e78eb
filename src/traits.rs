use std::fmt::Debug;

use serde_json::{Map, Value, json};

use crate::error::ConfigError;
use crate::resources::RemovalPolicy;
use crate::types::Expr;

/// Anything that can be declared in a template, e.g. an `AWS::S3::Bucket`
/// or an `AWS::KMS::Key`.
pub trait CfnResource: Debug + Send + Sync {
    /// The CloudFormation type name ("AWS::S3::Bucket", "AWS::KMS::Key", etc)
    fn resource_type(&self) -> &'static str;

    /// Logical id, unique within a stack
    fn logical_id(&self) -> &str;

    /// The `Properties` block
    fn properties(&self) -> Result<Value, ConfigError>;

    /// What happens to the physical resource when it leaves the stack, none by default
    fn removal_policy(&self) -> Option<RemovalPolicy> {
        None
    }

    /// Logical ids this resource must be created after, none by default
    fn depends_on(&self) -> Vec<String> {
        Vec::new()
    }

    /// `{"Ref": "<logical id>"}`
    fn reference(&self) -> Expr {
        Expr::reference(self.logical_id())
    }

    /// `{"Fn::GetAtt": ["<logical id>", "<attribute>"]}`
    fn attr(&self, attribute: &str) -> Expr {
        Expr::get_att(self.logical_id(), attribute)
    }

    /// Build the full template entry for this resource
    fn to_template(&self) -> Result<Value, ConfigError> {
        let mut entry = Map::new();
        entry.insert("Type".into(), json!(self.resource_type()));
        entry.insert("Properties".into(), self.properties()?);
        let depends_on = self.depends_on();
        if !depends_on.is_empty() {
            entry.insert("DependsOn".into(), json!(depends_on));
        }
        if let Some(policy) = self.removal_policy() {
            entry.insert("UpdateReplacePolicy".into(), json!(policy.as_ref()));
            entry.insert("DeletionPolicy".into(), json!(policy.as_ref()));
        }
        Ok(Value::Object(entry))
    }
}
