//! S3 buckets and bucket policies.

use serde_json::{Value, json};

use crate::error::ConfigError;
use crate::traits::CfnResource;
use crate::types::{Expr, PolicyDocument};

use super::RemovalPolicy;

/// `arn:aws:s3:::<bucket>`; bucket ARNs carry no region or account.
pub fn bucket_arn(bucket_name: &str) -> String {
    format!("arn:aws:s3:::{bucket_name}")
}

/// The four public access block switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPublicAccess {
    pub block_public_acls: bool,
    pub block_public_policy: bool,
    pub ignore_public_acls: bool,
    pub restrict_public_buckets: bool,
}

impl BlockPublicAccess {
    pub const BLOCK_ALL: BlockPublicAccess = BlockPublicAccess {
        block_public_acls: true,
        block_public_policy: true,
        ignore_public_acls: true,
        restrict_public_buckets: true,
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BucketEncryption {
    Kms { key_arn: Expr },
}

impl BucketEncryption {
    fn to_json(&self) -> Value {
        let default = match self {
            BucketEncryption::Kms { key_arn } => json!({
                "SSEAlgorithm": "aws:kms",
                "KMSMasterKeyID": key_arn,
            }),
        };
        json!({
            "ServerSideEncryptionConfiguration": [
                {"ServerSideEncryptionByDefault": default}
            ]
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    logical_id: String,
    bucket_name: String,
    block_public_access: BlockPublicAccess,
    encryption: BucketEncryption,
    removal_policy: RemovalPolicy,
}

impl Bucket {
    /// Declare a bucket. Names follow the S3 rules: 3-63 characters of
    /// lowercase letters, digits, `.` and `-`, starting and ending with a
    /// letter or digit.
    pub fn new(
        logical_id: impl Into<String>,
        bucket_name: impl Into<String>,
        block_public_access: BlockPublicAccess,
        encryption: BucketEncryption,
        removal_policy: RemovalPolicy,
    ) -> Result<Self, ConfigError> {
        let bucket_name = bucket_name.into();
        validate_bucket_name(&bucket_name)?;
        Ok(Self {
            logical_id: logical_id.into(),
            bucket_name,
            block_public_access,
            encryption,
            removal_policy,
        })
    }

    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    pub fn arn(&self) -> Expr {
        Expr::lit(bucket_arn(&self.bucket_name))
    }

    pub fn regional_domain_name(&self) -> Expr {
        self.attr("RegionalDomainName")
    }

    pub fn encryption(&self) -> &BucketEncryption {
        &self.encryption
    }

    pub fn block_public_access(&self) -> BlockPublicAccess {
        self.block_public_access
    }
}

fn validate_bucket_name(name: &str) -> Result<(), ConfigError> {
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.');
    let valid_ends = name
        .chars()
        .next()
        .zip(name.chars().last())
        .is_some_and(|(first, last)| first.is_ascii_alphanumeric() && last.is_ascii_alphanumeric());
    if (3..=63).contains(&name.len()) && valid_chars && valid_ends {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormat(format!(
            "invalid bucket name '{name}'"
        )))
    }
}

impl CfnResource for Bucket {
    fn resource_type(&self) -> &'static str {
        "AWS::S3::Bucket"
    }

    fn logical_id(&self) -> &str {
        &self.logical_id
    }

    fn properties(&self) -> Result<Value, ConfigError> {
        let bpa = self.block_public_access;
        Ok(json!({
            "BucketName": self.bucket_name,
            "BucketEncryption": self.encryption.to_json(),
            "PublicAccessBlockConfiguration": {
                "BlockPublicAcls": bpa.block_public_acls,
                "BlockPublicPolicy": bpa.block_public_policy,
                "IgnorePublicAcls": bpa.ignore_public_acls,
                "RestrictPublicBuckets": bpa.restrict_public_buckets,
            },
        }))
    }

    fn removal_policy(&self) -> Option<RemovalPolicy> {
        Some(self.removal_policy)
    }
}

/// The resource policy attached to a bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketPolicy {
    logical_id: String,
    bucket: Expr,
    bucket_logical_id: String,
    document: PolicyDocument,
}

impl BucketPolicy {
    pub fn new(logical_id: impl Into<String>, bucket: &Bucket, document: PolicyDocument) -> Self {
        Self {
            logical_id: logical_id.into(),
            bucket: bucket.reference(),
            bucket_logical_id: bucket.logical_id().to_string(),
            document,
        }
    }

    pub fn document(&self) -> &PolicyDocument {
        &self.document
    }
}

impl CfnResource for BucketPolicy {
    fn resource_type(&self) -> &'static str {
        "AWS::S3::BucketPolicy"
    }

    fn logical_id(&self) -> &str {
        &self.logical_id
    }

    fn properties(&self) -> Result<Value, ConfigError> {
        Ok(json!({
            "Bucket": self.bucket,
            "PolicyDocument": serde_json::to_value(&self.document)?,
        }))
    }

    fn depends_on(&self) -> Vec<String> {
        vec![self.bucket_logical_id.clone()]
    }
}
