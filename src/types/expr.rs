//! Template values that may refer to attributes only known after deployment.
//!
//! Serialized forms follow the CloudFormation intrinsic functions:
//! - Literal: `"text"`
//! - Ref: `{"Ref": "EncbpCDN"}`
//! - GetAtt: `{"Fn::GetAtt": ["EncbpKey", "Arn"]}`
//! - Join: `{"Fn::Join": ["", [ ... ]]}`

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::json;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Expr {
    Literal(String),
    Ref(String),
    GetAtt { logical_id: String, attribute: String },
    Join(Vec<Expr>),
}

impl Expr {
    pub fn lit(value: impl Into<String>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn reference(logical_id: impl Into<String>) -> Self {
        Expr::Ref(logical_id.into())
    }

    pub fn get_att(logical_id: impl Into<String>, attribute: impl Into<String>) -> Self {
        Expr::GetAtt {
            logical_id: logical_id.into(),
            attribute: attribute.into(),
        }
    }

    /// Concatenate parts. Adjacent literals are merged, and a join made only
    /// of literals collapses into a single literal.
    pub fn join(parts: impl IntoIterator<Item = Expr>) -> Self {
        let mut merged: Vec<Expr> = Vec::new();
        for part in parts {
            let flattened = match part {
                Expr::Join(inner) => inner,
                other => vec![other],
            };
            for p in flattened {
                if let Expr::Literal(s) = &p {
                    if s.is_empty() {
                        continue;
                    }
                    if let Some(Expr::Literal(prev)) = merged.last_mut() {
                        prev.push_str(s);
                        continue;
                    }
                }
                merged.push(p);
            }
        }
        match merged.len() {
            0 => Expr::Literal(String::new()),
            1 => merged.remove(0),
            _ => Expr::Join(merged),
        }
    }

    /// Append a literal suffix, e.g. `/*` for "every object under this bucket".
    pub fn with_suffix(&self, suffix: &str) -> Self {
        Expr::join([self.clone(), Expr::lit(suffix)])
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Expr::Literal(s) => Some(s),
            _ => None,
        }
    }

    /// Substitute deployed values for every reference.
    pub fn resolve(&self, bindings: &Bindings) -> Result<String, ConfigError> {
        match self {
            Expr::Literal(s) => Ok(s.clone()),
            Expr::Ref(id) => bindings
                .lookup(id, None)
                .ok_or_else(|| ConfigError::UnresolvedReference(format!("Ref {id}"))),
            Expr::GetAtt {
                logical_id,
                attribute,
            } => bindings
                .lookup(logical_id, Some(attribute))
                .ok_or_else(|| {
                    ConfigError::UnresolvedReference(format!("Fn::GetAtt {logical_id}.{attribute}"))
                }),
            Expr::Join(parts) => parts.iter().map(|p| p.resolve(bindings)).collect(),
        }
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Expr::lit(value)
    }
}

impl From<String> for Expr {
    fn from(value: String) -> Self {
        Expr::Literal(value)
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Expr::Literal(s) => write!(f, "{s}"),
            Expr::Ref(id) => write!(f, "${{{id}}}"),
            Expr::GetAtt {
                logical_id,
                attribute,
            } => write!(f, "${{{logical_id}.{attribute}}}"),
            Expr::Join(parts) => parts.iter().try_for_each(|p| write!(f, "{p}")),
        }
    }
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Expr::Literal(s) => serializer.serialize_str(s),
            Expr::Ref(id) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Ref", id)?;
                map.end()
            }
            Expr::GetAtt {
                logical_id,
                attribute,
            } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::GetAtt", &[logical_id, attribute])?;
                map.end()
            }
            Expr::Join(parts) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::Join", &json!(["", parts]))?;
                map.end()
            }
        }
    }
}

/// Physical values for logical ids, as they would be known after deployment.
///
/// `Ref` lookups use the bare logical id, `Fn::GetAtt` lookups use
/// `<logical id>.<attribute>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    values: BTreeMap<String, String>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ref(mut self, logical_id: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(logical_id.into(), value.into());
        self
    }

    pub fn with_att(
        mut self,
        logical_id: &str,
        attribute: &str,
        value: impl Into<String>,
    ) -> Self {
        self.values
            .insert(format!("{logical_id}.{attribute}"), value.into());
        self
    }

    fn lookup(&self, logical_id: &str, attribute: Option<&str>) -> Option<String> {
        let key = match attribute {
            Some(attr) => format!("{logical_id}.{attr}"),
            None => logical_id.to_string(),
        };
        self.values.get(&key).cloned()
    }
}
