//! CloudFront distributions fronting a private S3 origin.

use serde_json::{Map, Value, json};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::error::ConfigError;
use crate::traits::CfnResource;
use crate::types::{AccountId, Expr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
pub enum ViewerProtocolPolicy {
    #[strum(serialize = "redirect-to-https")]
    RedirectToHttps,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllowedMethods {
    GetHead,
}

impl AllowedMethods {
    pub fn methods(self) -> &'static [&'static str] {
        match self {
            AllowedMethods::GetHead => &["GET", "HEAD"],
        }
    }
}

/// Managed cache policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CachePolicy {
    CachingOptimized,
}

impl CachePolicy {
    pub fn id(self) -> &'static str {
        match self {
            CachePolicy::CachingOptimized => "658327ea-f89d-4fab-a63d-7e88639e58f6",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
pub enum PriceClass {
    #[strum(serialize = "PriceClass_All")]
    PriceClassAll,
}

/// Signing identity the distribution uses to fetch from a private bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginAccessControl {
    logical_id: String,
    name: String,
}

impl OriginAccessControl {
    /// An S3 origin access control that always signs with SigV4.
    pub fn new(logical_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            logical_id: logical_id.into(),
            name: name.into(),
        }
    }

    pub fn id(&self) -> Expr {
        self.attr("Id")
    }
}

impl CfnResource for OriginAccessControl {
    fn resource_type(&self) -> &'static str {
        "AWS::CloudFront::OriginAccessControl"
    }

    fn logical_id(&self) -> &str {
        &self.logical_id
    }

    fn properties(&self) -> Result<Value, ConfigError> {
        Ok(json!({
            "OriginAccessControlConfig": {
                "Name": self.name,
                "OriginAccessControlOriginType": "s3",
                "SigningBehavior": "always",
                "SigningProtocol": "sigv4",
            }
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Origin {
    pub domain_name: Expr,
    pub origin_access_control_id: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BehaviorOptions {
    pub origin: S3Origin,
    pub viewer_protocol_policy: ViewerProtocolPolicy,
    pub allowed_methods: AllowedMethods,
    pub cache_policy: CachePolicy,
    pub compress: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    logical_id: String,
    default_behavior: BehaviorOptions,
    price_class: PriceClass,
    /// Access log bucket domain; `None` disables logging.
    log_bucket: Option<Expr>,
}

impl Distribution {
    pub fn new(
        logical_id: impl Into<String>,
        default_behavior: BehaviorOptions,
        price_class: PriceClass,
    ) -> Self {
        Self {
            logical_id: logical_id.into(),
            default_behavior,
            price_class,
            log_bucket: None,
        }
    }

    pub fn with_logging(mut self, log_bucket: Option<Expr>) -> Self {
        self.log_bucket = log_bucket;
        self
    }

    pub fn default_behavior(&self) -> &BehaviorOptions {
        &self.default_behavior
    }

    /// `arn:aws:cloudfront::<account>:distribution/<id>`. Distributions are
    /// global, so the ARN has no region.
    pub fn arn(&self, account: &AccountId) -> Expr {
        Expr::join([
            Expr::lit(format!("arn:aws:cloudfront::{account}:distribution/")),
            self.reference(),
        ])
    }

    pub fn domain_name(&self) -> Expr {
        self.attr("DomainName")
    }

    fn origin_id(&self) -> String {
        format!("{}Origin1", self.logical_id)
    }
}

impl CfnResource for Distribution {
    fn resource_type(&self) -> &'static str {
        "AWS::CloudFront::Distribution"
    }

    fn logical_id(&self) -> &str {
        &self.logical_id
    }

    fn properties(&self) -> Result<Value, ConfigError> {
        let behavior = &self.default_behavior;
        let mut config = Map::new();
        config.insert(
            "DefaultCacheBehavior".into(),
            json!({
                "AllowedMethods": behavior.allowed_methods.methods(),
                "CachePolicyId": behavior.cache_policy.id(),
                "Compress": behavior.compress,
                "TargetOriginId": self.origin_id(),
                "ViewerProtocolPolicy": behavior.viewer_protocol_policy.as_ref(),
            }),
        );
        config.insert("Enabled".into(), json!(true));
        config.insert("HttpVersion".into(), json!("http2"));
        config.insert("IPV6Enabled".into(), json!(true));
        if let Some(log_bucket) = &self.log_bucket {
            config.insert("Logging".into(), json!({ "Bucket": log_bucket }));
        }
        config.insert(
            "Origins".into(),
            json!([{
                "DomainName": behavior.origin.domain_name,
                "Id": self.origin_id(),
                "OriginAccessControlId": behavior.origin.origin_access_control_id,
                "S3OriginConfig": {"OriginAccessIdentity": ""},
            }]),
        );
        config.insert("PriceClass".into(), json!(self.price_class.as_ref()));

        Ok(json!({ "DistributionConfig": Value::Object(config) }))
    }
}
