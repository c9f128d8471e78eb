//! Statement principals.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

use serde_json::Value;

use super::account::AccountId;
use super::request::Caller;

/// Who a statement applies to.
///
/// Rendered in policy JSON under the `AWS` or `Service` key, e.g.
/// `{"AWS": "*"}` or `{"Service": "cloudfront.amazonaws.com"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Principal {
    /// Everyone, including anonymous callers (`"AWS": "*"`).
    Any,
    /// An AWS service acting on its own behalf.
    Service(String),
    /// Every identity in an account (`arn:aws:iam::<id>:root`).
    Account(AccountId),
}

impl Principal {
    pub fn service(name: impl Into<String>) -> Self {
        Principal::Service(name.into())
    }

    /// The key this principal is listed under in policy JSON.
    pub fn json_key(&self) -> &'static str {
        match self {
            Principal::Any | Principal::Account(_) => "AWS",
            Principal::Service(_) => "Service",
        }
    }

    pub fn json_value(&self) -> String {
        match self {
            Principal::Any => "*".to_string(),
            Principal::Service(name) => name.clone(),
            Principal::Account(account) => account.root_arn(),
        }
    }

    pub fn matches(&self, caller: &Caller) -> bool {
        match (self, caller) {
            (Principal::Any, _) => true,
            (Principal::Service(expected), Caller::Service(name)) => expected == name,
            (Principal::Account(expected), Caller::Iam { account, .. }) => expected == account,
            _ => false,
        }
    }
}

impl Display for Principal {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}:{}", self.json_key(), self.json_value())
    }
}

/// Render a principal list the way IAM expects it: grouped by key, with a
/// bare string for a single entry and an array otherwise.
pub(crate) fn principals_to_json(principals: &[Principal]) -> Value {
    let mut grouped: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
    for principal in principals {
        grouped
            .entry(principal.json_key())
            .or_default()
            .push(principal.json_value());
    }
    let map = grouped
        .into_iter()
        .map(|(key, mut values)| {
            let value = if values.len() == 1 {
                Value::String(values.remove(0))
            } else {
                Value::from(values)
            };
            (key.to_string(), value)
        })
        .collect();
    Value::Object(map)
}
