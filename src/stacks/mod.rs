//! Stacks for: Encryption Best Practices.
//!
//! Stack names carry a numeric prefix for sorting: `encbp-01-s3`,
//! `encbp-02-kms`, ... Physical names derive from the account id so they are
//! globally unique. Both are part of the deployed state: renaming a bucket
//! replaces it.

mod s3;

pub use s3::S3EncryptionStack;

use crate::types::AccountId;

pub const STACK_PREFIX: &str = "encbp";

/// `encbp-<NN>-<service>`
pub fn unit_name(ordinal: u8, service: &str) -> String {
    format!("{STACK_PREFIX}-{ordinal:02}-{service}")
}

/// `encbp-<service>-<account>`
pub fn physical_name(service: &str, account: &AccountId) -> String {
    format!("{STACK_PREFIX}-{service}-{account}")
}
