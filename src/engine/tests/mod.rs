use super::*;
use crate::types::{AccountId, Caller, ConditionOperator, Expr, Principal, keys};
use insta::assert_json_snapshot;
use yare::parameterized;

mod bucket_policy;

const BUCKET: &str = "arn:aws:s3:::photos";
const OBJECT: &str = "arn:aws:s3:::photos/2024/cat.jpg";

fn account() -> AccountId {
    AccountId::new("111111111111").unwrap()
}

/// Allow the account to read objects; deny everyone writes without TLS.
fn simple_document() -> PolicyDocument {
    PolicyDocument::builder()
        .statement(
            PolicyStatement::builder("AccountRead")
                .principal(Principal::Account(account()))
                .actions(["s3:GetObject", "s3:ListBucket"])
                .resources([BUCKET, "arn:aws:s3:::photos/*"])
                .build()
                .unwrap(),
        )
        .statement(
            PolicyStatement::builder("DenyInsecure")
                .deny()
                .principal(Principal::Any)
                .actions(["s3:*"])
                .resources([BUCKET, "arn:aws:s3:::photos/*"])
                .condition(ConditionOperator::Bool, keys::SECURE_TRANSPORT, ["false"])
                .build()
                .unwrap(),
        )
        .build()
        .unwrap()
}

fn reader() -> Caller {
    Caller::iam(account(), "role/reader")
}

#[parameterized(
    get_object = { "s3:GetObject", OBJECT },
    list_bucket = { "s3:ListBucket", BUCKET },
    lowercase_action = { "s3:getobject", OBJECT },
)]
fn test_allow_matches(action: &str, resource: &str) {
    let engine = PolicyEngine::new(simple_document());
    let decision = engine
        .evaluate(&AccessRequest::new(reader(), action, resource))
        .unwrap();
    assert_eq!(
        decision,
        Decision::Allow {
            sid: "AccountRead".into()
        }
    );
}

#[parameterized(
    other_action = { reader(), "s3:PutObject", OBJECT },
    other_bucket = { reader(), "s3:GetObject", "arn:aws:s3:::photos-archive/cat.jpg" },
    resource_case_differs = { reader(), "s3:GetObject", "arn:aws:s3:::Photos/cat.jpg" },
    anonymous = { Caller::Anonymous, "s3:GetObject", OBJECT },
    other_account = { Caller::iam(AccountId::new("222222222222").unwrap(), "role/reader"), "s3:GetObject", OBJECT },
)]
fn test_implicit_deny(caller: Caller, action: &str, resource: &str) {
    let engine = PolicyEngine::new(simple_document());
    let decision = engine
        .evaluate(&AccessRequest::new(caller, action, resource))
        .unwrap();
    assert_eq!(decision, Decision::ImplicitDeny);
}

#[test]
fn test_deny_overrides_allow() {
    let engine = PolicyEngine::new(simple_document());
    let request = AccessRequest::new(reader(), "s3:GetObject", OBJECT).over_insecure_transport();
    let decision = engine.evaluate(&request).unwrap();
    assert_eq!(
        decision,
        Decision::ExplicitDeny {
            sid: "DenyInsecure".into()
        }
    );
}

#[test]
fn test_first_matching_allow_is_reported() {
    let document = PolicyDocument::builder()
        .statement(
            PolicyStatement::builder("First")
                .principal(Principal::Any)
                .actions(["s3:*"])
                .resources(["*"])
                .build()
                .unwrap(),
        )
        .statement(
            PolicyStatement::builder("Second")
                .principal(Principal::Any)
                .actions(["s3:GetObject"])
                .resources(["*"])
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let decision = PolicyEngine::new(document)
        .evaluate(&AccessRequest::new(Caller::Anonymous, "s3:GetObject", OBJECT))
        .unwrap();
    assert_eq!(decision.sid(), Some("First"));
}

#[test]
fn test_unbound_reference_is_an_error() {
    let document = PolicyDocument::builder()
        .statement(
            PolicyStatement::builder("ViaDistribution")
                .principal(Principal::service("cloudfront.amazonaws.com"))
                .actions(["s3:GetObject"])
                .resources(["arn:aws:s3:::photos/*"])
                .condition(
                    ConditionOperator::StringEquals,
                    keys::SOURCE_ARN,
                    [Expr::reference("EncbpCDN")],
                )
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let request = AccessRequest::new(
        Caller::Service("cloudfront.amazonaws.com".into()),
        "s3:GetObject",
        OBJECT,
    )
    .with_context(keys::SOURCE_ARN, "E1EXAMPLE");

    let err = PolicyEngine::new(document.clone())
        .evaluate(&request)
        .unwrap_err();
    assert!(matches!(err, ConfigError::UnresolvedReference(_)));

    let engine =
        PolicyEngine::new(document).with_bindings(Bindings::new().with_ref("EncbpCDN", "E1EXAMPLE"));
    assert!(engine.evaluate(&request).unwrap().is_allowed());
}

#[test]
fn test_explain_reports_every_statement() {
    let engine = PolicyEngine::new(simple_document());
    let request = AccessRequest::new(reader(), "s3:PutObject", OBJECT).over_insecure_transport();
    let trace = engine.explain(&request).unwrap();
    assert_json_snapshot!(trace, @r#"
    [
      {
        "sid": "AccountRead",
        "effect": "Allow",
        "matched": false,
        "reason": "action"
      },
      {
        "sid": "DenyInsecure",
        "effect": "Deny",
        "matched": true,
        "reason": "matched"
      }
    ]
    "#);
}

#[test]
fn test_explain_agrees_with_evaluate() {
    let engine = PolicyEngine::new(simple_document());
    let request = AccessRequest::new(reader(), "s3:GetObject", OBJECT);
    let matched: Vec<String> = engine
        .explain(&request)
        .unwrap()
        .into_iter()
        .filter(|e| e.matched)
        .map(|e| e.sid)
        .collect();
    assert_eq!(matched, vec!["AccountRead".to_string()]);
    assert_eq!(
        engine.evaluate(&request).unwrap().sid(),
        Some("AccountRead")
    );
    assert_eq!(engine.document().len(), 2);
}
