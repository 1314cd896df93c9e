use crate::secrets::{ReqwestTransport, VaultTransport};
use crate::traits::{
    Environment, FileSystem, Output, ProcessEnvironment, RealFileSystem, TerminalOutput,
};
use std::sync::Arc;

/// Application context that holds all dependencies for dependency injection
pub struct Context {
    pub fs: Arc<dyn FileSystem>,
    pub env: Arc<dyn Environment>,
    pub output: Arc<dyn Output>,
    pub vault: Arc<dyn VaultTransport>,
}

impl Context {
    /// Create a new context with real implementations (for production use)
    pub fn new() -> Self {
        Self {
            fs: Arc::new(RealFileSystem),
            env: Arc::new(ProcessEnvironment),
            output: Arc::new(TerminalOutput),
            vault: Arc::new(ReqwestTransport),
        }
    }

    /// Create a test context with specific mock implementations
    #[cfg(test)]
    pub fn test_with(
        fs: Arc<dyn FileSystem>,
        env: Arc<dyn Environment>,
        output: Arc<dyn Output>,
        vault: Arc<dyn VaultTransport>,
    ) -> Self {
        Self {
            fs,
            env,
            output,
            vault,
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
