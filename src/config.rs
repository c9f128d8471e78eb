//! Application configuration, read from the app context.
//!
//! The context is a flat string map, as passed with `--context key=value`,
//! or the `context` object of a `cdk.json`-style file:
//!
//! ```json
//! {
//!   "context": {
//!     "topic": "encryption-best-practices",
//!     "account": "123456789012",
//!     "external_account_id": "210987654321"
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::ConfigError;
use crate::types::AccountId;

pub const CONTEXT_TOPIC: &str = "topic";
pub const CONTEXT_ACCOUNT: &str = "account";
pub const CONTEXT_REGION: &str = "region";
pub const CONTEXT_EXTERNAL_ACCOUNT: &str = "external_account_id";

/// Region placeholder for environment-agnostic stacks.
pub const UNKNOWN_REGION: &str = "unknown-region";

const KNOWN_KEYS: [&str; 4] = [
    CONTEXT_TOPIC,
    CONTEXT_ACCOUNT,
    CONTEXT_REGION,
    CONTEXT_EXTERNAL_ACCOUNT,
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Selects which topic's stacks to register; `None` registers every topic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    /// Deploying account. Feeds the bucket name and the policy conditions.
    pub account: AccountId,
    /// Target region; part of every stack's environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Account granted cross-account read and key use, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_account_id: Option<AccountId>,
}

impl AppConfig {
    pub fn new(account: AccountId) -> Self {
        Self {
            topic: None,
            account,
            region: None,
            external_account_id: None,
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_external_account(mut self, account: AccountId) -> Self {
        self.external_account_id = Some(account);
        self
    }

    /// Deployment target in `aws://<account>/<region>` form.
    pub fn environment(&self) -> String {
        format!(
            "aws://{}/{}",
            self.account.as_str(),
            self.region.as_deref().unwrap_or(UNKNOWN_REGION)
        )
    }

    /// Build from `key=value` context entries. Keys other than the known
    /// ones are ignored so unrelated context does not break synthesis.
    ///
    /// `topic` is taken verbatim: an empty or padded value selects no topic.
    pub fn from_context(context: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| {
            context
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        let account: AccountId = non_empty(CONTEXT_ACCOUNT)
            .ok_or_else(|| {
                ConfigError::InvalidContext(format!("missing required context '{CONTEXT_ACCOUNT}'"))
            })?
            .parse()?;
        let external_account_id: Option<AccountId> = non_empty(CONTEXT_EXTERNAL_ACCOUNT)
            .map(str::parse)
            .transpose()?;

        let config = AppConfig {
            topic: context.get(CONTEXT_TOPIC).cloned(),
            account,
            region: non_empty(CONTEXT_REGION).map(str::to_string),
            external_account_id,
        };
        debug!(
            event = "Config",
            phase = "Context",
            account = config.account.as_str(),
            topic = config.topic.as_deref().unwrap_or("<all>"),
            external_account = config.external_account_id.is_some()
        );
        Ok(config)
    }

    /// Parse a `cdk.json`-style document. A top-level `context` object is
    /// used when present, otherwise the document itself is the context.
    /// Feature flags and lookups under other keys are skipped; the known
    /// keys must hold strings or numbers.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(text)?;
        let context = match value.get("context") {
            Some(context) => context.clone(),
            None => value,
        };
        let Value::Object(entries) = context else {
            return Err(ConfigError::InvalidContext(
                "context must be a JSON object".to_string(),
            ));
        };

        let mut flat = BTreeMap::new();
        for (key, value) in entries {
            let value = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Null => continue,
                _ if !KNOWN_KEYS.contains(&key.as_str()) => continue,
                other => {
                    return Err(ConfigError::InvalidContext(format!(
                        "context '{key}' must be a string, found {other}"
                    )));
                }
            };
            flat.insert(key, value);
        }
        Self::from_context(&flat)
    }
}
