//! Resource policies for the encrypted bucket and its key.
//!
//! The bucket policy layers explicit denies over the provider's implicit
//! default-deny. Deny always overrides allow, so the single allow for the
//! distribution is paired with denies for every other read path.

use tracing::debug;

use crate::error::ConfigError;
use crate::types::{
    AccountId, ConditionOperator, Expr, PolicyDocument, PolicyStatement, Principal, keys,
};

/// Statement ids. These are part of the deployed policy and must stay stable.
pub mod sid {
    pub const DENY_OBJECTS_NOT_SSE_KMS: &str = "DenyObjectsThatAreNotSSEKMS";
    pub const DENY_PUBLIC_READ_ACL: &str = "DenyPublicReadACL";
    pub const DENY_PUBLIC_READ_GRANT: &str = "DenyPublicReadGrant";
    pub const DENY_PUBLIC_LIST_ACL: &str = "DenyPublicListACL";
    pub const DENY_PUBLIC_LIST_GRANT: &str = "DenyPublicListGrant";
    pub const ALLOW_SSL_REQUESTS_ONLY: &str = "AllowSSLRequestsOnly";
    pub const ALLOW_CLOUDFRONT_READ_ONLY: &str = "AllowCloudFrontServicePrincipalReadOnly";
    pub const DENY_READ_EXCEPT_CLOUDFRONT: &str = "DenyAllReadAccessExceptCloudFront";
    pub const DENY_ALL_EXCEPT_CLOUDFRONT_AND_ACCOUNT: &str = "DenyAllExceptCloudFrontAndAccount";
    pub const ALLOW_EXTERNAL_ACCOUNT_READ: &str = "AllowExternalAccountReadAccess";

    pub const ENABLE_IAM_USER_PERMISSIONS: &str = "EnableIamUserPermissions";
    pub const ALLOW_EXTERNAL_ACCOUNT_KEY_USE: &str = "AllowExternalAccountToUseKey";
}

pub const CLOUDFRONT_SERVICE_PRINCIPAL: &str = "cloudfront.amazonaws.com";
pub const SSE_KMS: &str = "aws:kms";

pub const PUBLIC_ACLS: [&str; 3] = ["public-read", "public-read-write", "authenticated-read"];

/// Grant headers are compound strings (`uri="..."`), hence pattern matches.
pub const PUBLIC_GRANT_PATTERNS: [&str; 2] = [
    "*http://acs.amazonaws.com/groups/global/AllUsers*",
    "*http://acs.amazonaws.com/groups/global/AuthenticatedUsers*",
];

pub const EXTERNAL_READ_ACTIONS: [&str; 4] = [
    "s3:GetObject",
    "s3:GetObjectVersion",
    "s3:ListBucket",
    "s3:GetBucketLocation",
];

pub const EXTERNAL_KEY_ACTIONS: [&str; 5] = [
    "kms:Decrypt",
    "kms:ReEncryptFrom",
    "kms:ReEncryptTo",
    "kms:GenerateDataKey*",
    "kms:DescribeKey",
];

/// Builds the bucket resource policy.
#[derive(Debug, Clone)]
pub struct BucketPolicyAssembler {
    bucket_arn: Expr,
    distribution_arn: Expr,
    account: AccountId,
    external_account: Option<AccountId>,
}

impl BucketPolicyAssembler {
    pub fn new(bucket_arn: impl Into<Expr>, distribution_arn: Expr, account: AccountId) -> Self {
        Self {
            bucket_arn: bucket_arn.into(),
            distribution_arn,
            account,
            external_account: None,
        }
    }

    /// Grant read access to another account. `None` leaves the policy
    /// single-account with no trace of the cross-account statements.
    pub fn with_external_account(mut self, external_account: Option<AccountId>) -> Self {
        self.external_account = external_account;
        self
    }

    fn objects_arn(&self) -> Expr {
        self.bucket_arn.with_suffix("/*")
    }

    fn bucket_and_objects(&self) -> [Expr; 2] {
        [self.bucket_arn.clone(), self.objects_arn()]
    }

    pub fn assemble(&self) -> Result<PolicyDocument, ConfigError> {
        let mut statements = vec![
            self.deny_objects_not_sse_kms()?,
            self.deny_public_read_acl()?,
            self.deny_public_read_grant()?,
            self.deny_public_list_acl()?,
            self.deny_public_list_grant()?,
            self.deny_insecure_transport()?,
            self.allow_cloudfront_read()?,
            self.deny_read_except_cloudfront()?,
            self.deny_all_except_cloudfront_and_account()?,
        ];
        if let Some(external) = &self.external_account {
            statements.push(self.allow_external_read(external)?);
        }

        debug!(
            event = "Assembler",
            phase = "BucketPolicy",
            bucket = self.bucket_arn.to_string(),
            statements = statements.len(),
            external_account = self.external_account.is_some()
        );

        PolicyDocument::builder().statements(statements).build()
    }

    fn deny_objects_not_sse_kms(&self) -> Result<PolicyStatement, ConfigError> {
        PolicyStatement::builder(sid::DENY_OBJECTS_NOT_SSE_KMS)
            .deny()
            .principal(Principal::Any)
            .actions(["s3:PutObject"])
            .resources([self.objects_arn()])
            .condition(ConditionOperator::StringNotEquals, keys::SSE, [SSE_KMS])
            .build()
    }

    fn deny_public_read_acl(&self) -> Result<PolicyStatement, ConfigError> {
        PolicyStatement::builder(sid::DENY_PUBLIC_READ_ACL)
            .deny()
            .principal(Principal::Any)
            .actions(["s3:PutObject", "s3:PutObjectAcl"])
            .resources([self.objects_arn()])
            .condition(ConditionOperator::StringEquals, keys::ACL, PUBLIC_ACLS)
            .build()
    }

    fn deny_public_read_grant(&self) -> Result<PolicyStatement, ConfigError> {
        PolicyStatement::builder(sid::DENY_PUBLIC_READ_GRANT)
            .deny()
            .principal(Principal::Any)
            .actions(["s3:PutObject", "s3:PutObjectAcl"])
            .resources([self.objects_arn()])
            .condition(ConditionOperator::StringLike, keys::GRANT_READ, PUBLIC_GRANT_PATTERNS)
            .build()
    }

    fn deny_public_list_acl(&self) -> Result<PolicyStatement, ConfigError> {
        PolicyStatement::builder(sid::DENY_PUBLIC_LIST_ACL)
            .deny()
            .principal(Principal::Any)
            .actions(["s3:PutBucketAcl"])
            .resources([self.bucket_arn.clone()])
            .condition(ConditionOperator::StringEquals, keys::ACL, PUBLIC_ACLS)
            .build()
    }

    fn deny_public_list_grant(&self) -> Result<PolicyStatement, ConfigError> {
        PolicyStatement::builder(sid::DENY_PUBLIC_LIST_GRANT)
            .deny()
            .principal(Principal::Any)
            .actions(["s3:PutBucketAcl"])
            .resources([self.bucket_arn.clone()])
            .condition(ConditionOperator::StringLike, keys::GRANT_READ, PUBLIC_GRANT_PATTERNS)
            .build()
    }

    fn deny_insecure_transport(&self) -> Result<PolicyStatement, ConfigError> {
        PolicyStatement::builder(sid::ALLOW_SSL_REQUESTS_ONLY)
            .deny()
            .principal(Principal::Any)
            .actions(["s3:*"])
            .resources(self.bucket_and_objects())
            .condition(ConditionOperator::Bool, keys::SECURE_TRANSPORT, ["false"])
            .build()
    }

    fn allow_cloudfront_read(&self) -> Result<PolicyStatement, ConfigError> {
        PolicyStatement::builder(sid::ALLOW_CLOUDFRONT_READ_ONLY)
            .principal(Principal::service(CLOUDFRONT_SERVICE_PRINCIPAL))
            .actions(["s3:GetObject"])
            .resources([self.objects_arn()])
            .condition(
                ConditionOperator::StringEquals,
                keys::SOURCE_ARN,
                [self.distribution_arn.clone()],
            )
            .build()
    }

    fn deny_read_except_cloudfront(&self) -> Result<PolicyStatement, ConfigError> {
        let mut builder = PolicyStatement::builder(sid::DENY_READ_EXCEPT_CLOUDFRONT)
            .deny()
            .principal(Principal::Any)
            .actions(["s3:GetObject"])
            .resources([self.objects_arn()])
            .condition(
                ConditionOperator::StringNotEquals,
                keys::SOURCE_ARN,
                [self.distribution_arn.clone()],
            );
        if let Some(external) = &self.external_account {
            builder = builder.condition(
                ConditionOperator::StringNotEqualsIfExists,
                keys::PRINCIPAL_ARN,
                [external.root_arn()],
            );
        }
        builder.build()
    }

    fn deny_all_except_cloudfront_and_account(&self) -> Result<PolicyStatement, ConfigError> {
        let accounts = std::iter::once(&self.account)
            .chain(self.external_account.as_ref())
            .map(|a| a.to_string());
        PolicyStatement::builder(sid::DENY_ALL_EXCEPT_CLOUDFRONT_AND_ACCOUNT)
            .deny()
            .principal(Principal::Any)
            .actions(["s3:*"])
            .resources(self.bucket_and_objects())
            .condition(
                ConditionOperator::StringNotEqualsIfExists,
                keys::SOURCE_ARN,
                [self.distribution_arn.clone()],
            )
            .condition(
                ConditionOperator::StringNotEqualsIfExists,
                keys::PRINCIPAL_ACCOUNT,
                accounts,
            )
            .build()
    }

    fn allow_external_read(&self, external: &AccountId) -> Result<PolicyStatement, ConfigError> {
        PolicyStatement::builder(sid::ALLOW_EXTERNAL_ACCOUNT_READ)
            .principal(Principal::Account(external.clone()))
            .actions(EXTERNAL_READ_ACTIONS)
            .resources(self.bucket_and_objects())
            .build()
    }
}

/// Builds the key policy for the bucket's encryption key.
#[derive(Debug, Clone)]
pub struct KeyPolicyAssembler {
    account: AccountId,
    external_account: Option<AccountId>,
}

impl KeyPolicyAssembler {
    pub fn new(account: AccountId) -> Self {
        Self {
            account,
            external_account: None,
        }
    }

    pub fn with_external_account(mut self, external_account: Option<AccountId>) -> Self {
        self.external_account = external_account;
        self
    }

    pub fn assemble(&self) -> Result<PolicyDocument, ConfigError> {
        // Key policies must name the owning account or the key becomes unmanageable.
        let mut statements = vec![
            PolicyStatement::builder(sid::ENABLE_IAM_USER_PERMISSIONS)
                .principal(Principal::Account(self.account.clone()))
                .actions(["kms:*"])
                .resources(["*"])
                .build()?,
        ];

        if let Some(external) = &self.external_account {
            // Key resources must be "*" in a key policy.
            statements.push(
                PolicyStatement::builder(sid::ALLOW_EXTERNAL_ACCOUNT_KEY_USE)
                    .principal(Principal::Account(external.clone()))
                    .actions(EXTERNAL_KEY_ACTIONS)
                    .resources(["*"])
                    .condition(
                        ConditionOperator::StringEquals,
                        keys::PRINCIPAL_ACCOUNT,
                        [external.to_string()],
                    )
                    .build()?,
            );
        }

        debug!(
            event = "Assembler",
            phase = "KeyPolicy",
            statements = statements.len(),
            external_account = self.external_account.is_some()
        );

        PolicyDocument::builder().statements(statements).build()
    }
}
