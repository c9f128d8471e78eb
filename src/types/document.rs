//! Policy documents.

use itertools::Itertools;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::error::ConfigError;

use super::statement::PolicyStatement;

pub const POLICY_VERSION: &str = "2012-10-17";

/// A validated policy document: at least one statement, unique sids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDocument {
    statements: Vec<PolicyStatement>,
}

impl PolicyDocument {
    pub fn builder() -> PolicyDocumentBuilder {
        PolicyDocumentBuilder::default()
    }

    pub fn statements(&self) -> &[PolicyStatement] {
        &self.statements
    }

    pub fn statement(&self, sid: &str) -> Option<&PolicyStatement> {
        self.statements.iter().find(|s| s.sid() == sid)
    }

    pub fn sids(&self) -> Vec<&str> {
        self.statements.iter().map(PolicyStatement::sid).collect()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl Serialize for PolicyDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PolicyDocument", 2)?;
        state.serialize_field("Version", POLICY_VERSION)?;
        state.serialize_field("Statement", &self.statements)?;
        state.end()
    }
}

/// Accumulates statements in order; nothing is observable until `build`.
#[derive(Debug, Clone, Default)]
pub struct PolicyDocumentBuilder {
    statements: Vec<PolicyStatement>,
}

impl PolicyDocumentBuilder {
    pub fn statement(mut self, statement: PolicyStatement) -> Self {
        self.statements.push(statement);
        self
    }

    pub fn statements(mut self, statements: impl IntoIterator<Item = PolicyStatement>) -> Self {
        self.statements.extend(statements);
        self
    }

    pub fn build(self) -> Result<PolicyDocument, ConfigError> {
        if self.statements.is_empty() {
            return Err(ConfigError::EmptyDocument);
        }
        if let Some(dup) = self.statements.iter().map(PolicyStatement::sid).duplicates().next() {
            return Err(ConfigError::DuplicateSid(dup.to_string()));
        }

        debug!(
            event = "PolicyDocument",
            phase = "Built",
            statements = self.statements.len(),
            sids = self.statements.iter().map(PolicyStatement::sid).join(",")
        );

        Ok(PolicyDocument {
            statements: self.statements,
        })
    }
}
