//! Account records, credentials and connections for developer and company users.
//!
//! Every write of an account goes through [`credentials::CredentialStore`]
//! explicitly: `create` hashes the submitted password once and `update` only
//! re-hashes when the submitted value differs from the stored hash.

pub mod company;
pub mod connection;
pub mod credentials;
pub mod developer;
pub mod error;
pub mod store;

#[cfg(test)]
mod testing;

pub use credentials::{CredentialStore, HashingCost};
pub use error::{AccountError, Result};
