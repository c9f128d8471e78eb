//! Topic registry: decides which stacks an app run declares.
//!
//! Each topic registers its own stacks. The `topic` context value restricts
//! registration to a single topic; without it every topic registers.

use tracing::{debug, info};

use crate::app::App;
use crate::error::ConfigError;
use crate::stacks::{S3EncryptionStack, unit_name};

pub const ENCRYPTION_BEST_PRACTICES: &str = "encryption-best-practices";

/// A topic's registration hook.
pub type Register = fn(&mut App) -> Result<(), ConfigError>;

/// Every known topic's filtered registration, in registration order.
pub const TOPICS: &[Register] = &[register_stacks];

/// True when no topic is selected or `topic` is the selected one. Matching is exact.
pub fn topic_selected(selected: Option<&str>, topic: &str) -> bool {
    selected.is_none_or(|s| s == topic)
}

/// Wrap `register` so it only runs when the app's configured topic selects `expected`.
pub fn topic<F>(expected: &'static str, register: F) -> impl Fn(&mut App) -> Result<(), ConfigError>
where
    F: Fn(&mut App) -> Result<(), ConfigError>,
{
    move |app: &mut App| {
        let selected = app.config().topic.clone();
        if !topic_selected(selected.as_deref(), expected) {
            debug!(
                event = "Registry",
                phase = "Skip",
                topic = expected,
                selected = selected.as_deref().unwrap_or("<all>")
            );
            return Ok(());
        }
        info!(event = "Registry", phase = "Register", topic = expected);
        register(app)
    }
}

/// Declare the encryption best practices stacks, unconditionally.
pub fn declare_encryption_stacks(app: &mut App) -> Result<(), ConfigError> {
    let s3 = S3EncryptionStack::new(&unit_name(1, "s3"), app.config())?;
    app.add_stack(s3.into_stack())
}

/// The encryption best practices topic: `encbp-01-s3`, unless another topic is selected.
pub fn register_stacks(app: &mut App) -> Result<(), ConfigError> {
    topic(ENCRYPTION_BEST_PRACTICES, declare_encryption_stacks)(app)
}

/// Run every topic's registration against `app`.
pub fn register_all(app: &mut App) -> Result<(), ConfigError> {
    for register in TOPICS {
        register(app)?;
    }
    Ok(())
}
