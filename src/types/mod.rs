//! Policy model types.
//!
//! Canonical JSON forms follow the IAM policy language:
//! - Principal: `{"AWS": "*"}`, `{"Service": "cloudfront.amazonaws.com"}`,
//!   `{"AWS": "arn:aws:iam::123456789012:root"}`
//! - Action / Resource: a bare string for one entry, an array otherwise
//! - Condition: `{"<Operator>": {"<key>": "<value>" | ["<value>", ...]}}`
//!
//! Values that are only known after deployment (a distribution id, a key
//! ARN) are carried as [`Expr`] and rendered as CloudFormation intrinsics.

mod account;
mod condition;
mod decision;
mod document;
mod effect;
mod expr;
mod principal;
mod request;
mod statement;

pub use account::AccountId;
pub use condition::{ConditionOperator, Conditions};
pub use decision::Decision;
pub use document::{POLICY_VERSION, PolicyDocument, PolicyDocumentBuilder};
pub use effect::Effect;
pub use expr::{Bindings, Expr};
pub use principal::Principal;
pub use request::{AccessRequest, Caller, keys};
pub use statement::{PolicyStatement, StatementBuilder};
