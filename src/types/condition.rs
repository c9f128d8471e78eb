//! Condition blocks: operator -> key -> values.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use super::expr::Expr;

#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    ToSchema,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum ConditionOperator {
    StringEquals,
    StringNotEquals,
    StringEqualsIfExists,
    StringNotEqualsIfExists,
    StringLike,
    StringNotLike,
    Bool,
}

impl ConditionOperator {
    /// Negated operators hold when no listed value matches.
    pub fn is_negated(self) -> bool {
        matches!(
            self,
            Self::StringNotEquals | Self::StringNotEqualsIfExists | Self::StringNotLike
        )
    }

    pub fn is_if_exists(self) -> bool {
        matches!(self, Self::StringEqualsIfExists | Self::StringNotEqualsIfExists)
    }

    /// Outcome when the request carries no value for the key.
    ///
    /// `...IfExists` operators and negated operators hold; everything else fails.
    pub fn holds_when_missing(self) -> bool {
        self.is_if_exists() || self.is_negated()
    }

    pub fn is_wildcard(self) -> bool {
        matches!(self, Self::StringLike | Self::StringNotLike)
    }
}

/// The `Condition` element of a statement.
///
/// Operators are ANDed, keys within an operator are ANDed, and the values
/// of one key are ORed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conditions {
    blocks: BTreeMap<ConditionOperator, BTreeMap<String, Vec<Expr>>>,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add values for `key` under `op`; repeated calls extend the value list.
    pub fn with<I, V>(mut self, op: ConditionOperator, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Expr>,
    {
        self.insert(op, key, values);
        self
    }

    /// Keys are case-insensitive: a key differing only in case from one
    /// already present extends it and keeps the first spelling.
    pub fn insert<I, V>(&mut self, op: ConditionOperator, key: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<Expr>,
    {
        let key = key.into();
        let keys = self.blocks.entry(op).or_default();
        let existing = keys
            .keys()
            .find(|k| k.eq_ignore_ascii_case(&key))
            .cloned()
            .unwrap_or(key);
        keys.entry(existing)
            .or_default()
            .extend(values.into_iter().map(Into::into));
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, op: ConditionOperator, key: &str) -> Option<&[Expr]> {
        self.blocks
            .get(&op)
            .and_then(|keys| keys.iter().find(|(k, _)| k.eq_ignore_ascii_case(key)))
            .map(|(_, values)| values.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (ConditionOperator, &str, &[Expr])> {
        self.blocks.iter().flat_map(|(op, keys)| {
            keys.iter()
                .map(move |(key, values)| (*op, key.as_str(), values.as_slice()))
        })
    }
}

struct OneOrMany<'a>(&'a [Expr]);

impl Serialize for OneOrMany<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            [single] => single.serialize(serializer),
            many => many.serialize(serializer),
        }
    }
}

struct KeyBlock<'a>(&'a BTreeMap<String, Vec<Expr>>);

impl Serialize for KeyBlock<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, values) in self.0 {
            map.serialize_entry(key, &OneOrMany(values))?;
        }
        map.end()
    }
}

impl Serialize for Conditions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.blocks.len()))?;
        for (op, keys) in &self.blocks {
            map.serialize_entry(op.as_ref(), &KeyBlock(keys))?;
        }
        map.end()
    }
}
