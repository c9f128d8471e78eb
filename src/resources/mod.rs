//! Typed declarations for the resources the encryption stacks deploy.

mod cloudfront;
mod config_rule;
mod kms;
mod s3;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

pub use cloudfront::{
    AllowedMethods, BehaviorOptions, CachePolicy, Distribution, OriginAccessControl, PriceClass,
    S3Origin, ViewerProtocolPolicy,
};
pub use config_rule::{ManagedRule, ManagedRuleIdentifier, RuleScope};
pub use kms::{KeyProps, KmsAlias, KmsKey};
pub use s3::{BlockPublicAccess, Bucket, BucketEncryption, BucketPolicy, bucket_arn};

/// What happens to a physical resource when it is removed from its stack.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Serialize,
    Deserialize,
    ToSchema,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum RemovalPolicy {
    /// Delete on teardown. Suitable for non-production stacks only.
    #[strum(serialize = "Delete")]
    Destroy,
    #[default]
    Retain,
    Snapshot,
}
