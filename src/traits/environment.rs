use std::collections::HashMap;
use std::sync::RwLock;

/// Trait for reading process environment variables to enable testing with mocks
pub trait Environment: Send + Sync {
    /// Value of a variable, `None` when unset or not valid unicode
    fn var(&self, name: &str) -> Option<String>;
}

/// Real environment backed by `std::env`
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Mock environment for testing
#[allow(dead_code)]
pub struct MockEnvironment {
    vars: RwLock<HashMap<String, String>>,
}

#[allow(dead_code)]
impl MockEnvironment {
    /// Create an empty mock environment
    pub fn new() -> Self {
        Self {
            vars: RwLock::new(HashMap::new()),
        }
    }

    /// Set a variable
    pub fn with_var(self, name: &str, value: &str) -> Self {
        self.vars
            .write()
            .unwrap()
            .insert(name.to_string(), value.to_string());
        self
    }
}

impl Default for MockEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for MockEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.read().unwrap().get(name).cloned()
    }
}
