//! Deployable units.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::error::ConfigError;
use crate::traits::CfnResource;
use crate::types::Expr;

static STACK_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9-]{0,127}$").unwrap());

/// A group of resources created, updated and destroyed together.
#[derive(Debug)]
pub struct Stack {
    name: String,
    description: Option<String>,
    resources: Vec<Box<dyn CfnResource>>,
    outputs: Vec<(String, Expr)>,
}

impl Stack {
    pub fn new(name: impl Into<String>) -> Result<Self, ConfigError> {
        let name = name.into();
        if !STACK_NAME_PATTERN.is_match(&name) {
            return Err(ConfigError::InvalidFormat(format!(
                "invalid stack name '{name}' (letters, digits and '-', starting with a letter)"
            )));
        }
        Ok(Self {
            name,
            description: None,
            resources: Vec::new(),
            outputs: Vec::new(),
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare a resource. Logical ids must be unique within the stack.
    pub fn add<R: CfnResource + 'static>(&mut self, resource: R) -> Result<(), ConfigError> {
        if self.get(resource.logical_id()).is_some() {
            return Err(ConfigError::DuplicateLogicalId {
                stack: self.name.clone(),
                logical_id: resource.logical_id().to_string(),
            });
        }
        debug!(
            event = "Stack",
            phase = "Declare",
            stack = self.name,
            logical_id = resource.logical_id(),
            resource_type = resource.resource_type()
        );
        self.resources.push(Box::new(resource));
        Ok(())
    }

    pub fn add_output(&mut self, name: impl Into<String>, value: Expr) {
        self.outputs.push((name.into(), value));
    }

    pub fn get(&self, logical_id: &str) -> Option<&dyn CfnResource> {
        self.resources
            .iter()
            .find(|r| r.logical_id() == logical_id)
            .map(|r| &**r)
    }

    pub fn resources(&self) -> impl Iterator<Item = &dyn CfnResource> {
        self.resources.iter().map(|r| &**r)
    }

    pub fn logical_ids(&self) -> Vec<&str> {
        self.resources.iter().map(|r| r.logical_id()).collect()
    }

    /// Render the stack as a template, resources in declaration order.
    pub fn synth(&self) -> Result<Value, ConfigError> {
        let mut template = Map::new();
        if let Some(description) = &self.description {
            template.insert("Description".into(), json!(description));
        }

        let mut resources = Map::new();
        for resource in &self.resources {
            resources.insert(resource.logical_id().to_string(), resource.to_template()?);
        }
        template.insert("Resources".into(), Value::Object(resources));

        if !self.outputs.is_empty() {
            let outputs: Map<String, Value> = self
                .outputs
                .iter()
                .map(|(name, value)| (name.clone(), json!({ "Value": value })))
                .collect();
            template.insert("Outputs".into(), Value::Object(outputs));
        }

        Ok(Value::Object(template))
    }
}
