//! Outcome of evaluating a request against a resource policy.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Deny-overrides result. `ImplicitDeny` means no statement matched; for a
/// same-account caller an identity policy may still grant access.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
pub enum Decision {
    Allow { sid: String },
    ExplicitDeny { sid: String },
    ImplicitDeny,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow { .. })
    }

    pub fn is_explicit_deny(&self) -> bool {
        matches!(self, Decision::ExplicitDeny { .. })
    }

    /// The statement that decided the request, if any.
    pub fn sid(&self) -> Option<&str> {
        match self {
            Decision::Allow { sid } | Decision::ExplicitDeny { sid } => Some(sid),
            Decision::ImplicitDeny => None,
        }
    }
}

impl Display for Decision {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Decision::Allow { sid } => write!(f, "Allow({sid})"),
            Decision::ExplicitDeny { sid } => write!(f, "ExplicitDeny({sid})"),
            Decision::ImplicitDeny => write!(f, "ImplicitDeny"),
        }
    }
}
