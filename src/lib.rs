// src/lib.rs
pub use app::{App, CloudAssembly};
pub use assembler::{BucketPolicyAssembler, KeyPolicyAssembler, sid};
pub use config::AppConfig;
pub use engine::{PolicyEngine, StatementEvaluation};
pub use error::ConfigError;
pub use registry::{
    ENCRYPTION_BEST_PRACTICES, declare_encryption_stacks, register_all, register_stacks, topic,
    topic_selected,
};
pub use stack::Stack;
pub use stacks::{S3EncryptionStack, physical_name, unit_name};
pub use traits::CfnResource;

pub mod app;
pub mod assembler;
pub mod config;
mod engine;
mod error;
mod policy_match;
pub mod registry;
pub mod resources;
pub mod stack;
pub mod stacks;
mod traits;
pub mod types;

#[cfg(test)]
mod tests;
