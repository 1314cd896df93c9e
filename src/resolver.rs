use crate::context::Context;
use crate::error::ReplaceResult;
use crate::kv::KvStore;
use crate::secrets::{SecretStoreSession, VaultClient};
use std::path::PathBuf;

/// Per-run resolution state.
///
/// The secret store session and the key-value file are loaded the first time
/// they are needed and never reloaded; a run that only uses `ref:`
/// placeholders never reads the Vault variables, and vice versa.
pub struct ResolverContext<'a> {
    ctx: &'a Context,
    kv_path: PathBuf,
    session: Option<SecretStoreSession>,
    kv_store: Option<KvStore>,
}

impl<'a> ResolverContext<'a> {
    pub fn new(ctx: &'a Context, kv_path: PathBuf) -> Self {
        Self {
            ctx,
            kv_path,
            session: None,
            kv_store: None,
        }
    }

    fn session(&mut self) -> ReplaceResult<&SecretStoreSession> {
        let session = match self.session.take() {
            Some(session) => session,
            None => SecretStoreSession::from_env(&*self.ctx.env)?,
        };

        Ok(self.session.insert(session))
    }

    fn kv_store(&mut self) -> ReplaceResult<&KvStore> {
        let store = match self.kv_store.take() {
            Some(store) => store,
            None => KvStore::load(&*self.ctx.fs, &self.kv_path)?,
        };

        Ok(self.kv_store.insert(store))
    }

    /// Field `key` of the secret at `path`; empty when it does not exist
    pub fn resolve_secret(&mut self, path: &str, key: &str) -> ReplaceResult<String> {
        let ctx = self.ctx;
        let session = self.session()?;
        let client = VaultClient::new(session, &*ctx.vault);

        match client.read_field(path, key) {
            Ok(value) => Ok(value),
            Err(err) if err.is_not_found() => {
                tracing::debug!(path = %path, key = %key, reason = %err, "secret not found, using empty value");
                Ok(String::new())
            }
            Err(err) => Err(err),
        }
    }

    /// Value of `key` in the key-value file; empty when absent
    pub fn resolve_reference(&mut self, key: &str) -> ReplaceResult<String> {
        let store = self.kv_store()?;

        match store.get(key) {
            Some(value) => Ok(value.to_string()),
            None => {
                tracing::debug!(key = %key, "key not found, using empty value");
                Ok(String::new())
            }
        }
    }

    #[allow(dead_code)]
    pub fn session_loaded(&self) -> bool {
        self.session.is_some()
    }

    #[allow(dead_code)]
    pub fn kv_store_loaded(&self) -> bool {
        self.kv_store.is_some()
    }
}
