//! Policy statements and their builder.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::error::ConfigError;

use super::condition::{ConditionOperator, Conditions};
use super::effect::Effect;
use super::expr::Expr;
use super::principal::{Principal, principals_to_json};

/// A single allow/deny rule.
///
/// Only constructed through [`StatementBuilder::build`], so principals,
/// actions and resources are never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyStatement {
    sid: String,
    effect: Effect,
    principals: Vec<Principal>,
    actions: Vec<String>,
    resources: Vec<Expr>,
    conditions: Conditions,
}

impl PolicyStatement {
    pub fn builder(sid: impl Into<String>) -> StatementBuilder {
        StatementBuilder::new(sid)
    }

    pub fn sid(&self) -> &str {
        &self.sid
    }

    pub fn effect(&self) -> Effect {
        self.effect
    }

    pub fn principals(&self) -> &[Principal] {
        &self.principals
    }

    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    pub fn resources(&self) -> &[Expr] {
        &self.resources
    }

    pub fn conditions(&self) -> &Conditions {
        &self.conditions
    }
}

impl Display for PolicyStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{}({}; {}; {})",
            self.effect,
            self.sid,
            self.actions.join(","),
            self.resources
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",")
        )
    }
}

impl Serialize for PolicyStatement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.conditions.is_empty() { 5 } else { 6 };
        let mut state = serializer.serialize_struct("Statement", len)?;
        state.serialize_field("Sid", &self.sid)?;
        state.serialize_field("Effect", &self.effect)?;
        state.serialize_field("Principal", &principals_to_json(&self.principals))?;
        match self.actions.as_slice() {
            [single] => state.serialize_field("Action", single)?,
            many => state.serialize_field("Action", many)?,
        }
        match self.resources.as_slice() {
            [single] => state.serialize_field("Resource", single)?,
            many => state.serialize_field("Resource", many)?,
        }
        if !self.conditions.is_empty() {
            state.serialize_field("Condition", &self.conditions)?;
        }
        state.end()
    }
}

#[derive(Debug, Clone)]
pub struct StatementBuilder {
    sid: String,
    effect: Effect,
    principals: Vec<Principal>,
    actions: Vec<String>,
    resources: Vec<Expr>,
    conditions: Conditions,
}

impl StatementBuilder {
    /// Start a statement. The effect defaults to `Allow`.
    pub fn new(sid: impl Into<String>) -> Self {
        Self {
            sid: sid.into(),
            effect: Effect::Allow,
            principals: Vec::new(),
            actions: Vec::new(),
            resources: Vec::new(),
            conditions: Conditions::new(),
        }
    }

    pub fn effect(mut self, effect: Effect) -> Self {
        self.effect = effect;
        self
    }

    pub fn deny(self) -> Self {
        self.effect(Effect::Deny)
    }

    pub fn principal(mut self, principal: Principal) -> Self {
        self.principals.push(principal);
        self
    }

    pub fn actions<I, A>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.actions.extend(actions.into_iter().map(Into::into));
        self
    }

    pub fn resources<I, R>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Expr>,
    {
        self.resources.extend(resources.into_iter().map(Into::into));
        self
    }

    pub fn condition<I, V>(mut self, op: ConditionOperator, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Expr>,
    {
        self.conditions.insert(op, key, values);
        self
    }

    pub fn build(self) -> Result<PolicyStatement, ConfigError> {
        if self.sid.trim().is_empty() {
            return Err(ConfigError::EmptySid);
        }
        if self.principals.is_empty() {
            return Err(ConfigError::EmptyPrincipals(self.sid));
        }
        if self.actions.is_empty() {
            return Err(ConfigError::EmptyActions(self.sid));
        }
        if self.resources.is_empty() {
            return Err(ConfigError::EmptyResources(self.sid));
        }
        if let Some(bad) = self
            .resources
            .iter()
            .filter_map(Expr::as_literal)
            .find(|r| *r != "*" && !r.starts_with("arn:"))
        {
            return Err(ConfigError::InvalidArn(bad.to_string()));
        }

        debug!(
            event = "Statement",
            phase = "Built",
            sid = self.sid,
            effect = self.effect.as_ref(),
            actions = self.actions.len(),
            resources = self.resources.len()
        );

        Ok(PolicyStatement {
            sid: self.sid,
            effect: self.effect,
            principals: self.principals,
            actions: self.actions,
            resources: self.resources,
            conditions: self.conditions,
        })
    }
}
