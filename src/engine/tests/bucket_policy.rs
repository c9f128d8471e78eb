//! The assembled bucket policy, simulated against the requests it exists to
//! allow and block.

use super::*;
use crate::assembler::sid;
use crate::config::AppConfig;
use crate::stacks::S3EncryptionStack;

const ACCOUNT: &str = "123456789012";
const EXTERNAL: &str = "210987654321";
const DISTRIBUTION_ARN: &str = "arn:aws:cloudfront::123456789012:distribution/E1EXAMPLE";
const BUCKET_ARN: &str = "arn:aws:s3:::encbp-s3-123456789012";
const OBJECT_ARN: &str = "arn:aws:s3:::encbp-s3-123456789012/index.html";

fn engine_for(config: &AppConfig) -> PolicyEngine {
    let s3 = S3EncryptionStack::new("encbp-01-s3", config).unwrap();
    PolicyEngine::new(s3.bucket_policy().clone())
        .with_bindings(Bindings::new().with_ref("EncbpCDN", "E1EXAMPLE"))
}

fn engine() -> PolicyEngine {
    engine_for(&AppConfig::new(AccountId::new(ACCOUNT).unwrap()))
}

fn engine_with_external() -> PolicyEngine {
    engine_for(
        &AppConfig::new(AccountId::new(ACCOUNT).unwrap())
            .with_external_account(AccountId::new(EXTERNAL).unwrap()),
    )
}

fn cloudfront() -> Caller {
    Caller::Service("cloudfront.amazonaws.com".into())
}

fn deployer() -> Caller {
    Caller::iam(AccountId::new(ACCOUNT).unwrap(), "role/deployer")
}

fn outsider() -> Caller {
    Caller::iam(AccountId::new("999999999999").unwrap(), "role/intruder")
}

fn denied_by(sid: &str) -> Decision {
    Decision::ExplicitDeny { sid: sid.into() }
}

#[test]
fn test_cloudfront_reads_objects_from_its_distribution() {
    let request = AccessRequest::new(cloudfront(), "s3:GetObject", OBJECT_ARN)
        .with_context(keys::SOURCE_ARN, DISTRIBUTION_ARN);
    assert_eq!(
        engine().evaluate(&request).unwrap(),
        Decision::Allow {
            sid: sid::ALLOW_CLOUDFRONT_READ_ONLY.into()
        }
    );
}

#[parameterized(
    other_distribution = { "arn:aws:cloudfront::123456789012:distribution/EOTHER" },
    other_account = { "arn:aws:cloudfront::999999999999:distribution/E1EXAMPLE" },
    prefix_only = { "arn:aws:cloudfront::123456789012:distribution/" },
)]
fn test_cloudfront_from_other_source_is_denied(source_arn: &str) {
    let request = AccessRequest::new(cloudfront(), "s3:GetObject", OBJECT_ARN)
        .with_context(keys::SOURCE_ARN, source_arn);
    assert_eq!(
        engine().evaluate(&request).unwrap(),
        denied_by(sid::DENY_READ_EXCEPT_CLOUDFRONT)
    );
}

#[test]
fn test_cloudfront_cannot_write() {
    let request = AccessRequest::new(cloudfront(), "s3:PutObject", OBJECT_ARN)
        .with_context(keys::SOURCE_ARN, DISTRIBUTION_ARN)
        .with_context(keys::SSE, "aws:kms");
    assert_eq!(engine().evaluate(&request).unwrap(), Decision::ImplicitDeny);
}

#[parameterized(
    missing_header = { None },
    aes256 = { Some("AES256") },
    kms_dsse = { Some("aws:kms:dsse") },
)]
fn test_unencrypted_writes_are_denied(sse: Option<&str>) {
    let mut request = AccessRequest::new(deployer(), "s3:PutObject", OBJECT_ARN);
    if let Some(sse) = sse {
        request = request.with_context(keys::SSE, sse);
    }
    assert_eq!(
        engine().evaluate(&request).unwrap(),
        denied_by(sid::DENY_OBJECTS_NOT_SSE_KMS)
    );
}

#[test]
fn test_kms_encrypted_write_from_account_is_left_to_iam() {
    let request =
        AccessRequest::new(deployer(), "s3:PutObject", OBJECT_ARN).with_context(keys::SSE, "aws:kms");
    assert_eq!(engine().evaluate(&request).unwrap(), Decision::ImplicitDeny);
}

#[parameterized(
    cloudfront_read = { cloudfront(), "s3:GetObject", OBJECT_ARN },
    deployer_list = { deployer(), "s3:ListBucket", BUCKET_ARN },
    deployer_delete = { deployer(), "s3:DeleteObject", OBJECT_ARN },
    anonymous_read = { Caller::Anonymous, "s3:GetObject", OBJECT_ARN },
    outsider_policy = { outsider(), "s3:GetBucketPolicy", BUCKET_ARN },
)]
fn test_insecure_transport_is_always_denied(caller: Caller, action: &str, resource: &str) {
    let request = AccessRequest::new(caller, action, resource)
        .with_context(keys::SOURCE_ARN, DISTRIBUTION_ARN)
        .over_insecure_transport();
    let decision = engine().evaluate(&request).unwrap();
    assert!(decision.is_explicit_deny(), "{decision}");
}

#[test]
fn test_insecure_read_is_attributed_to_ssl_statement() {
    let request = AccessRequest::new(cloudfront(), "s3:GetObject", OBJECT_ARN)
        .with_context(keys::SOURCE_ARN, DISTRIBUTION_ARN)
        .over_insecure_transport();
    assert_eq!(
        engine().evaluate(&request).unwrap(),
        denied_by(sid::ALLOW_SSL_REQUESTS_ONLY)
    );
}

#[test]
fn test_same_account_read_without_distribution_is_denied() {
    let request = AccessRequest::new(deployer(), "s3:GetObject", OBJECT_ARN);
    assert_eq!(
        engine().evaluate(&request).unwrap(),
        denied_by(sid::DENY_READ_EXCEPT_CLOUDFRONT)
    );
}

#[parameterized(
    list_bucket = { "s3:ListBucket", BUCKET_ARN },
    delete_object = { "s3:DeleteObject", OBJECT_ARN },
    put_bucket_policy = { "s3:PutBucketPolicy", BUCKET_ARN },
)]
fn test_same_account_management_is_left_to_iam(action: &str, resource: &str) {
    let request = AccessRequest::new(deployer(), action, resource);
    assert_eq!(engine().evaluate(&request).unwrap(), Decision::ImplicitDeny);
}

#[parameterized(
    list_bucket = { "s3:ListBucket", BUCKET_ARN },
    delete_object = { "s3:DeleteObject", OBJECT_ARN },
    get_bucket_policy = { "s3:GetBucketPolicy", BUCKET_ARN },
)]
fn test_other_accounts_are_denied(action: &str, resource: &str) {
    let request = AccessRequest::new(outsider(), action, resource);
    assert_eq!(
        engine().evaluate(&request).unwrap(),
        denied_by(sid::DENY_ALL_EXCEPT_CLOUDFRONT_AND_ACCOUNT)
    );
}

#[test]
fn test_backstop_passes_when_either_identity_matches() {
    // Negated IfExists keys in one block are ANDed: the backstop denies only
    // when neither the distribution nor the account matches.
    let via_distribution = AccessRequest::new(outsider(), "s3:ListBucket", BUCKET_ARN)
        .with_context(keys::SOURCE_ARN, DISTRIBUTION_ARN);
    assert_eq!(
        engine().evaluate(&via_distribution).unwrap(),
        Decision::ImplicitDeny
    );

    let trace = engine()
        .explain(&AccessRequest::new(deployer(), "s3:ListBucket", BUCKET_ARN))
        .unwrap();
    let backstop = trace
        .iter()
        .find(|e| e.sid == sid::DENY_ALL_EXCEPT_CLOUDFRONT_AND_ACCOUNT)
        .unwrap();
    assert!(!backstop.matched);
    assert_eq!(backstop.reason, "condition");
}

#[parameterized(
    public_read = { "public-read" },
    public_read_write = { "public-read-write" },
    authenticated_read = { "authenticated-read" },
)]
fn test_public_acls_are_denied(acl: &str) {
    let object = AccessRequest::new(deployer(), "s3:PutObjectAcl", OBJECT_ARN)
        .with_context(keys::ACL, acl);
    assert_eq!(
        engine().evaluate(&object).unwrap(),
        denied_by(sid::DENY_PUBLIC_READ_ACL)
    );

    let bucket = AccessRequest::new(deployer(), "s3:PutBucketAcl", BUCKET_ARN)
        .with_context(keys::ACL, acl);
    assert_eq!(
        engine().evaluate(&bucket).unwrap(),
        denied_by(sid::DENY_PUBLIC_LIST_ACL)
    );
}

#[test]
fn test_private_acl_is_not_denied() {
    let request = AccessRequest::new(deployer(), "s3:PutObjectAcl", OBJECT_ARN)
        .with_context(keys::ACL, "private");
    assert_eq!(engine().evaluate(&request).unwrap(), Decision::ImplicitDeny);
}

#[parameterized(
    all_users = { r#"uri="http://acs.amazonaws.com/groups/global/AllUsers""# },
    authenticated_users = { r#"uri="http://acs.amazonaws.com/groups/global/AuthenticatedUsers""# },
    mixed = { r#"id="abc123", uri="http://acs.amazonaws.com/groups/global/AllUsers""# },
)]
fn test_public_grants_are_denied(grant: &str) {
    let object = AccessRequest::new(deployer(), "s3:PutObjectAcl", OBJECT_ARN)
        .with_context(keys::GRANT_READ, grant);
    assert_eq!(
        engine().evaluate(&object).unwrap(),
        denied_by(sid::DENY_PUBLIC_READ_GRANT)
    );

    let bucket = AccessRequest::new(deployer(), "s3:PutBucketAcl", BUCKET_ARN)
        .with_context(keys::GRANT_READ, grant);
    assert_eq!(
        engine().evaluate(&bucket).unwrap(),
        denied_by(sid::DENY_PUBLIC_LIST_GRANT)
    );
}

#[test]
fn test_external_account_root_can_read() {
    let external = Caller::iam(AccountId::new(EXTERNAL).unwrap(), "root");
    for (action, resource) in [("s3:GetObject", OBJECT_ARN), ("s3:ListBucket", BUCKET_ARN)] {
        let request = AccessRequest::new(external.clone(), action, resource);
        assert_eq!(
            engine_with_external().evaluate(&request).unwrap(),
            Decision::Allow {
                sid: sid::ALLOW_EXTERNAL_ACCOUNT_READ.into()
            },
            "{action}"
        );
    }
}

#[test]
fn test_external_account_cannot_write() {
    let external = Caller::iam(AccountId::new(EXTERNAL).unwrap(), "root");
    let request = AccessRequest::new(external, "s3:DeleteObject", OBJECT_ARN);
    assert_eq!(
        engine_with_external().evaluate(&request).unwrap(),
        Decision::ImplicitDeny
    );
}

#[test]
fn test_external_account_without_configuration_is_denied() {
    let external = Caller::iam(AccountId::new(EXTERNAL).unwrap(), "root");
    let request = AccessRequest::new(external, "s3:ListBucket", BUCKET_ARN);
    assert_eq!(
        engine().evaluate(&request).unwrap(),
        denied_by(sid::DENY_ALL_EXCEPT_CLOUDFRONT_AND_ACCOUNT)
    );
}
