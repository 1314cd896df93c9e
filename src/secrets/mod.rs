//! Secret store integration.
//!
//! `${ secret:<path>@<key> }` placeholders are resolved against HashiCorp
//! Vault's HTTP API. Credentials come from the environment the first time a
//! secret is needed and are kept for the rest of the run.

mod session;
mod vault;

pub use session::SecretStoreSession;
pub use vault::{ReqwestTransport, VaultClient, VaultTransport};

#[cfg(test)]
pub use vault::MockVaultTransport;
