//! The root of the declaration graph and its synthesized output.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};
use tracing::info;

use crate::config::AppConfig;
use crate::error::ConfigError;
use crate::stack::Stack;

/// Artifact type of a synthesized stack in the assembly manifest.
pub const STACK_ARTIFACT: &str = "aws:cloudformation:stack";

/// Holds the configuration and every registered stack, in registration order.
#[derive(Debug)]
pub struct App {
    config: AppConfig,
    stacks: Vec<Stack>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            stacks: Vec::new(),
        }
    }

    pub fn from_context(context: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        Ok(Self::new(AppConfig::from_context(context)?))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn add_stack(&mut self, stack: Stack) -> Result<(), ConfigError> {
        if self.stack(stack.name()).is_some() {
            return Err(ConfigError::DuplicateStack(stack.name().to_string()));
        }
        info!(
            event = "App",
            phase = "Register",
            stack = stack.name(),
            resources = stack.logical_ids().len()
        );
        self.stacks.push(stack);
        Ok(())
    }

    pub fn stack(&self, name: &str) -> Option<&Stack> {
        self.stacks.iter().find(|s| s.name() == name)
    }

    pub fn stacks(&self) -> &[Stack] {
        &self.stacks
    }

    /// Render every stack. Output depends only on the configuration and the
    /// registered stacks, so repeated runs are identical.
    pub fn synth(&self) -> Result<CloudAssembly, ConfigError> {
        let environment = self.config.environment();
        let artifacts = self
            .stacks
            .iter()
            .map(|stack| {
                Ok(StackArtifact {
                    name: stack.name().to_string(),
                    environment: environment.clone(),
                    template: stack.synth()?,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        info!(
            event = "App",
            phase = "Synth",
            stacks = artifacts.len(),
            environment = environment.as_str()
        );

        Ok(CloudAssembly { artifacts })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StackArtifact {
    name: String,
    environment: String,
    template: Value,
}

/// Synthesized templates keyed by stack name, in registration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudAssembly {
    artifacts: Vec<StackArtifact>,
}

impl CloudAssembly {
    fn artifact(&self, stack_name: &str) -> Option<&StackArtifact> {
        self.artifacts.iter().find(|a| a.name == stack_name)
    }

    pub fn stack_names(&self) -> Vec<&str> {
        self.artifacts.iter().map(|a| a.name.as_str()).collect()
    }

    pub fn template(&self, stack_name: &str) -> Option<&Value> {
        self.artifact(stack_name).map(|a| &a.template)
    }

    /// The `aws://<account>/<region>` target the stack deploys to.
    pub fn environment(&self, stack_name: &str) -> Option<&str> {
        self.artifact(stack_name).map(|a| a.environment.as_str())
    }

    /// Manifest describing each stack artifact and its environment.
    pub fn manifest(&self) -> Value {
        let artifacts: Map<String, Value> = self
            .artifacts
            .iter()
            .map(|a| {
                (
                    a.name.clone(),
                    json!({ "type": STACK_ARTIFACT, "environment": a.environment }),
                )
            })
            .collect();
        json!({ "artifacts": artifacts })
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Serialize for CloudAssembly {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let map: Map<String, Value> = self
            .artifacts
            .iter()
            .map(|a| (a.name.clone(), a.template.clone()))
            .collect();
        map.serialize(serializer)
    }
}
