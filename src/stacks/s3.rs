//! S3 encryption best practices: a KMS-encrypted private bucket, Config
//! rules watching it, and a CloudFront distribution as the only read path.

use tracing::info;

use crate::assembler::{BucketPolicyAssembler, KeyPolicyAssembler};
use crate::config::AppConfig;
use crate::error::ConfigError;
use crate::resources::{
    AllowedMethods, BehaviorOptions, BlockPublicAccess, Bucket, BucketEncryption, BucketPolicy,
    CachePolicy, Distribution, KeyProps, KmsKey, ManagedRule, ManagedRuleIdentifier,
    OriginAccessControl, PriceClass, RemovalPolicy, RuleScope, S3Origin, ViewerProtocolPolicy,
};
use crate::stack::Stack;
use crate::traits::CfnResource;
use crate::types::{Expr, PolicyDocument};

use super::physical_name;

pub const KEY_ID: &str = "EncbpKey";
pub const KEY_ALIAS: &str = "alias/encbp/s3-key";
pub const BUCKET_ID: &str = "EncbpS3Bucket";
pub const BUCKET_POLICY_ID: &str = "EncbpS3BucketPolicy";
pub const SSE_RULE_ID: &str = "S3BucketSSEEnabledRule";
pub const SSL_RULE_ID: &str = "S3BucketSSLRequestsOnlyRule";
pub const OAC_ID: &str = "EncbpOAC";
pub const OAC_NAME: &str = "encbp-oac";
pub const DISTRIBUTION_ID: &str = "EncbpCDN";

/// The assembled stack plus the pieces callers inspect or simulate against.
#[derive(Debug)]
pub struct S3EncryptionStack {
    stack: Stack,
    bucket_name: String,
    bucket_policy: PolicyDocument,
    key_policy: PolicyDocument,
    distribution_arn: Expr,
}

impl S3EncryptionStack {
    pub fn new(name: &str, config: &AppConfig) -> Result<Self, ConfigError> {
        let account = &config.account;
        let external = config.external_account_id.clone();
        let mut stack = Stack::new(name)?
            .with_description("Encryption best practices: KMS-encrypted S3 bucket served through CloudFront");

        // KMS
        let key_policy = KeyPolicyAssembler::new(account.clone())
            .with_external_account(external.clone())
            .assemble()?;
        let key = KmsKey::new(
            KEY_ID,
            KeyProps {
                alias: KEY_ALIAS.to_string(),
                enable_key_rotation: true,
                removal_policy: RemovalPolicy::Destroy,
            },
            key_policy.clone(),
        )?;

        // S3
        let bucket_name = physical_name("s3", account);
        let bucket = Bucket::new(
            BUCKET_ID,
            bucket_name.clone(),
            BlockPublicAccess::BLOCK_ALL,
            BucketEncryption::Kms { key_arn: key.arn() },
            RemovalPolicy::Destroy,
        )?;

        // Config
        let sse_rule = ManagedRule::new(
            SSE_RULE_ID,
            ManagedRuleIdentifier::S3BucketServerSideEncryptionEnabled,
            RuleScope::from_resource(bucket.resource_type(), bucket_name.clone()),
        );
        let ssl_rule = ManagedRule::new(
            SSL_RULE_ID,
            ManagedRuleIdentifier::S3BucketSslRequestsOnly,
            RuleScope::from_resource(bucket.resource_type(), bucket_name.clone()),
        );

        // CloudFront
        let oac = OriginAccessControl::new(OAC_ID, OAC_NAME);
        let distribution = Distribution::new(
            DISTRIBUTION_ID,
            BehaviorOptions {
                origin: S3Origin {
                    domain_name: bucket.regional_domain_name(),
                    origin_access_control_id: oac.id(),
                },
                viewer_protocol_policy: ViewerProtocolPolicy::RedirectToHttps,
                allowed_methods: AllowedMethods::GetHead,
                cache_policy: CachePolicy::CachingOptimized,
                compress: true,
            },
            PriceClass::PriceClassAll,
        )
        .with_logging(None);
        let distribution_arn = distribution.arn(account);

        // Bucket policy
        let bucket_policy =
            BucketPolicyAssembler::new(bucket.arn(), distribution_arn.clone(), account.clone())
                .with_external_account(external)
                .assemble()?;
        let policy = BucketPolicy::new(BUCKET_POLICY_ID, &bucket, bucket_policy.clone());

        stack.add_output("BucketName", bucket.reference());
        stack.add_output("KeyArn", key.arn());
        stack.add_output("DistributionDomainName", distribution.domain_name());

        let alias = key.alias();
        stack.add(key)?;
        stack.add(alias)?;
        stack.add(bucket)?;
        stack.add(policy)?;
        stack.add(sse_rule)?;
        stack.add(ssl_rule)?;
        stack.add(oac)?;
        stack.add(distribution)?;

        info!(
            event = "Stack",
            phase = "Assembled",
            stack = name,
            bucket = bucket_name.as_str(),
            bucket_policy_statements = bucket_policy.len(),
            key_policy_statements = key_policy.len()
        );

        Ok(Self {
            stack,
            bucket_name,
            bucket_policy,
            key_policy,
            distribution_arn,
        })
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn into_stack(self) -> Stack {
        self.stack
    }

    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    pub fn bucket_policy(&self) -> &PolicyDocument {
        &self.bucket_policy
    }

    pub fn key_policy(&self) -> &PolicyDocument {
        &self.key_policy
    }

    /// Unresolved until deployment; bind `EncbpCDN` to simulate against it.
    pub fn distribution_arn(&self) -> &Expr {
        &self.distribution_arn
    }
}
