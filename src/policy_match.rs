use regex::{Regex, RegexBuilder};

use crate::error::ConfigError;
use crate::types::{AccessRequest, Bindings, ConditionOperator, Conditions, Expr, Principal};

/// Why a statement applied to a request, reported alongside a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MatchOutcome {
    Matched,
    PrincipalMismatch,
    ActionMismatch,
    ResourceMismatch,
    ConditionFailed,
}

/// IAM-style wildcard: `*` matches any run of characters, `?` exactly one.
pub(crate) fn wildcard_pattern(pattern: &str, case_insensitive: bool) -> Result<Regex, ConfigError> {
    let mut re = String::with_capacity(pattern.len() + 2);
    re.push('^');
    for c in pattern.chars() {
        match c {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            other => re.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    re.push('$');
    RegexBuilder::new(&re)
        .case_insensitive(case_insensitive)
        .dot_matches_new_line(true)
        .build()
        .map_err(|e| ConfigError::InvalidFormat(e.to_string()))
}

pub(crate) fn wildcard_match(
    pattern: &str,
    value: &str,
    case_insensitive: bool,
) -> Result<bool, ConfigError> {
    if !pattern.contains(['*', '?']) {
        return Ok(if case_insensitive {
            pattern.eq_ignore_ascii_case(value)
        } else {
            pattern == value
        });
    }
    Ok(wildcard_pattern(pattern, case_insensitive)?.is_match(value))
}

pub(crate) fn principal_matches(principals: &[Principal], request: &AccessRequest) -> bool {
    principals.iter().any(|p| p.matches(&request.caller))
}

/// Action names are case-insensitive.
pub(crate) fn action_matches(actions: &[String], request: &AccessRequest) -> Result<bool, ConfigError> {
    for action in actions {
        if wildcard_match(action, &request.action, true)? {
            return Ok(true);
        }
    }
    Ok(false)
}

pub(crate) fn resource_matches(
    resources: &[Expr],
    request: &AccessRequest,
    bindings: &Bindings,
) -> Result<bool, ConfigError> {
    for resource in resources {
        let pattern = resource.resolve(bindings)?;
        if wildcard_match(&pattern, &request.resource, false)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn value_matches(op: ConditionOperator, expected: &str, actual: &str) -> Result<bool, ConfigError> {
    match op {
        ConditionOperator::Bool => Ok(expected.eq_ignore_ascii_case(actual)),
        op if op.is_wildcard() => wildcard_match(expected, actual, false),
        _ => Ok(expected == actual),
    }
}

/// Every operator block and every key must hold. Within one key, any value
/// may match; negated operators invert that.
pub(crate) fn conditions_hold(
    conditions: &Conditions,
    request: &AccessRequest,
    bindings: &Bindings,
) -> Result<bool, ConfigError> {
    for (op, key, values) in conditions.iter() {
        let Some(actual) = request.context_value(key) else {
            if op.holds_when_missing() {
                continue;
            }
            return Ok(false);
        };

        let mut any = false;
        for value in values {
            if value_matches(op, &value.resolve(bindings)?, actual)? {
                any = true;
                break;
            }
        }
        let holds = if op.is_negated() { !any } else { any };
        if !holds {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccountId, Caller};
    use yare::parameterized;

    #[parameterized(
        exact = { "s3:GetObject", "s3:GetObject", true, true },
        exact_case_insensitive = { "s3:getobject", "s3:GetObject", true, true },
        exact_case_sensitive = { "s3:getobject", "s3:GetObject", false, false },
        service_wildcard = { "s3:*", "s3:PutBucketAcl", true, true },
        other_service = { "s3:*", "kms:Decrypt", true, false },
        suffix_wildcard = { "kms:GenerateDataKey*", "kms:GenerateDataKeyWithoutPlaintext", true, true },
        object_wildcard = { "arn:aws:s3:::bucket/*", "arn:aws:s3:::bucket/a/b.txt", false, true },
        object_wildcard_not_bucket = { "arn:aws:s3:::bucket/*", "arn:aws:s3:::bucket", false, false },
        prefix_bucket = { "arn:aws:s3:::bucket/*", "arn:aws:s3:::bucket-other/x", false, false },
        question_mark = { "a?c", "abc", false, true },
        regex_meta_is_literal = { "a.c", "abc", false, false },
        grant_pattern = { "*http://acs.amazonaws.com/groups/global/AllUsers*", "uri=\"http://acs.amazonaws.com/groups/global/AllUsers\"", false, true },
    )]
    fn test_wildcard_match(pattern: &str, value: &str, ci: bool, expected: bool) {
        assert_eq!(wildcard_match(pattern, value, ci).unwrap(), expected);
    }

    fn request() -> AccessRequest {
        AccessRequest::new(
            Caller::iam(AccountId::new("111111111111").unwrap(), "role/ops"),
            "s3:GetObject",
            "arn:aws:s3:::bucket/key",
        )
    }

    #[parameterized(
        equals_hit = { ConditionOperator::StringEquals, "aws:PrincipalAccount", "111111111111", true },
        equals_miss = { ConditionOperator::StringEquals, "aws:PrincipalAccount", "222222222222", false },
        equals_missing_key = { ConditionOperator::StringEquals, "AWS:SourceArn", "arn:dist", false },
        not_equals_hit = { ConditionOperator::StringNotEquals, "aws:PrincipalAccount", "222222222222", true },
        not_equals_miss = { ConditionOperator::StringNotEquals, "aws:PrincipalAccount", "111111111111", false },
        not_equals_missing_key = { ConditionOperator::StringNotEquals, "AWS:SourceArn", "arn:dist", true },
        not_equals_if_exists_missing_key = { ConditionOperator::StringNotEqualsIfExists, "AWS:SourceArn", "arn:dist", true },
        equals_if_exists_missing_key = { ConditionOperator::StringEqualsIfExists, "AWS:SourceArn", "arn:dist", true },
        bool_true = { ConditionOperator::Bool, "aws:SecureTransport", "TRUE", true },
        bool_false = { ConditionOperator::Bool, "aws:SecureTransport", "false", false },
        like_hit = { ConditionOperator::StringLike, "aws:PrincipalArn", "arn:aws:iam::*:role/*", true },
        not_like_hit = { ConditionOperator::StringNotLike, "aws:PrincipalArn", "arn:aws:iam::*:user/*", true },
    )]
    fn test_single_condition(op: ConditionOperator, key: &str, value: &str, expected: bool) {
        let conditions = Conditions::new().with(op, key, [value]);
        assert_eq!(
            conditions_hold(&conditions, &request(), &Bindings::new()).unwrap(),
            expected
        );
    }

    #[test]
    fn test_keys_within_operator_are_anded() {
        let conditions = Conditions::new()
            .with(ConditionOperator::StringNotEqualsIfExists, "AWS:SourceArn", ["arn:dist"])
            .with(
                ConditionOperator::StringNotEqualsIfExists,
                "aws:PrincipalAccount",
                ["111111111111"],
            );
        // SourceArn is missing (holds) but the account matches (fails), so the block fails.
        assert!(!conditions_hold(&conditions, &request(), &Bindings::new()).unwrap());
    }

    #[test]
    fn test_negated_multi_value_requires_no_match() {
        let conditions = Conditions::new().with(
            ConditionOperator::StringNotEquals,
            "aws:PrincipalAccount",
            ["222222222222", "111111111111"],
        );
        assert!(!conditions_hold(&conditions, &request(), &Bindings::new()).unwrap());
    }

    #[test]
    fn test_unresolved_condition_value_is_an_error() {
        let conditions = Conditions::new().with(
            ConditionOperator::StringEquals,
            "aws:PrincipalAccount",
            [Expr::reference("EncbpCDN")],
        );
        let err = conditions_hold(&conditions, &request(), &Bindings::new()).unwrap_err();
        assert!(matches!(err, ConfigError::UnresolvedReference(_)));
    }

    #[test]
    fn test_principal_and_resource_matching() {
        let request = request();
        assert!(principal_matches(&[Principal::Any], &request));
        assert!(!principal_matches(&[Principal::service("cloudfront.amazonaws.com")], &request));
        assert!(action_matches(&["s3:*".to_string()], &request).unwrap());
        assert!(
            resource_matches(
                &[Expr::lit("arn:aws:s3:::bucket"), Expr::lit("arn:aws:s3:::bucket/*")],
                &request,
                &Bindings::new()
            )
            .unwrap()
        );
    }
}
