use serde::Serialize;
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::policy_match::{
    MatchOutcome, action_matches, conditions_hold, principal_matches, resource_matches,
};
use crate::types::{AccessRequest, Bindings, Decision, Effect, PolicyDocument, PolicyStatement};

/// Per-statement trace of an evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementEvaluation {
    pub sid: String,
    pub effect: Effect,
    pub matched: bool,
    pub reason: &'static str,
}

/// Local deny-overrides simulator for a single resource policy.
///
/// Deployment-time values referenced by the document (a distribution id,
/// for instance) must be supplied through `Bindings`.
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    document: PolicyDocument,
    bindings: Bindings,
}

impl PolicyEngine {
    pub fn new(document: PolicyDocument) -> Self {
        PolicyEngine {
            document,
            bindings: Bindings::new(),
        }
    }

    pub fn with_bindings(mut self, bindings: Bindings) -> Self {
        self.bindings = bindings;
        self
    }

    pub fn document(&self) -> &PolicyDocument {
        &self.document
    }

    pub fn evaluate(&self, request: &AccessRequest) -> Result<Decision, ConfigError> {
        debug!(
            event = "Request",
            phase = "Evaluation",
            caller = request.caller.to_string(),
            action = request.action,
            resource = request.resource
        );

        let mut allowed_by: Option<&str> = None;

        for statement in self.document.statements() {
            let outcome = self.match_statement(statement, request)?;
            debug!(
                event = "Request",
                phase = "Statement",
                sid = statement.sid(),
                outcome = ?outcome
            );
            if outcome != MatchOutcome::Matched {
                continue;
            }
            match statement.effect() {
                Effect::Deny => {
                    let decision = Decision::ExplicitDeny {
                        sid: statement.sid().to_string(),
                    };
                    info!(
                        event = "Request",
                        phase = "Decision",
                        request = request.to_string(),
                        decision = decision.to_string()
                    );
                    return Ok(decision);
                }
                Effect::Allow => {
                    allowed_by.get_or_insert(statement.sid());
                }
            }
        }

        let decision = match allowed_by {
            Some(sid) => Decision::Allow {
                sid: sid.to_string(),
            },
            None => Decision::ImplicitDeny,
        };
        info!(
            event = "Request",
            phase = "Decision",
            request = request.to_string(),
            decision = decision.to_string()
        );
        Ok(decision)
    }

    /// Every statement with whether it matched the request and, if not, why.
    pub fn explain(&self, request: &AccessRequest) -> Result<Vec<StatementEvaluation>, ConfigError> {
        self.document
            .statements()
            .iter()
            .map(|statement| {
                let outcome = self.match_statement(statement, request)?;
                Ok(StatementEvaluation {
                    sid: statement.sid().to_string(),
                    effect: statement.effect(),
                    matched: outcome == MatchOutcome::Matched,
                    reason: outcome_reason(outcome),
                })
            })
            .collect()
    }

    fn match_statement(
        &self,
        statement: &PolicyStatement,
        request: &AccessRequest,
    ) -> Result<MatchOutcome, ConfigError> {
        if !principal_matches(statement.principals(), request) {
            return Ok(MatchOutcome::PrincipalMismatch);
        }
        if !action_matches(statement.actions(), request)? {
            return Ok(MatchOutcome::ActionMismatch);
        }
        if !resource_matches(statement.resources(), request, &self.bindings)? {
            return Ok(MatchOutcome::ResourceMismatch);
        }
        if !conditions_hold(statement.conditions(), request, &self.bindings)? {
            return Ok(MatchOutcome::ConditionFailed);
        }
        Ok(MatchOutcome::Matched)
    }
}

fn outcome_reason(outcome: MatchOutcome) -> &'static str {
    match outcome {
        MatchOutcome::Matched => "matched",
        MatchOutcome::PrincipalMismatch => "principal",
        MatchOutcome::ActionMismatch => "action",
        MatchOutcome::ResourceMismatch => "resource",
        MatchOutcome::ConditionFailed => "condition",
    }
}

#[cfg(test)]
mod tests;
