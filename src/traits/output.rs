use std::sync::Mutex;

/// Output message captured by MockOutput for testing
#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)]
pub enum OutputMessage {
    Error(String),
    Warning(String),
    Dimmed(String),
}

/// Trait for diagnostic output to enable testing with mocks.
///
/// Standard output carries the transformed stream, so every implementation
/// must keep diagnostics off stdout.
pub trait Output: Send + Sync {
    /// Print an error message
    fn error(&self, message: &str);

    /// Print a warning message
    fn warning(&self, message: &str);

    /// Print a dimmed/muted message
    fn dimmed(&self, message: &str);
}

/// Real terminal output implementation using the output module
pub struct TerminalOutput;

impl Output for TerminalOutput {
    fn error(&self, message: &str) {
        crate::output::error(message);
    }

    fn warning(&self, message: &str) {
        crate::output::warning(message);
    }

    fn dimmed(&self, message: &str) {
        crate::output::dimmed(message);
    }
}

/// Mock output implementation for testing (captures output)
#[allow(dead_code)]
pub struct MockOutput {
    messages: Mutex<Vec<OutputMessage>>,
}

#[allow(dead_code)]
impl MockOutput {
    /// Create new mock output
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Get all captured messages
    pub fn get_messages(&self) -> Vec<OutputMessage> {
        self.messages.lock().unwrap().clone()
    }

    /// Get all error messages
    pub fn get_errors(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter_map(|m| {
                if let OutputMessage::Error(msg) = m {
                    Some(msg.clone())
                } else {
                    None
                }
            })
            .collect()
    }

    /// Check if any warning message was output
    pub fn has_warning(&self) -> bool {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .any(|m| matches!(m, OutputMessage::Warning(_)))
    }
}

impl Default for MockOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl Output for MockOutput {
    fn error(&self, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push(OutputMessage::Error(message.to_string()));
    }

    fn warning(&self, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push(OutputMessage::Warning(message.to_string()));
    }

    fn dimmed(&self, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push(OutputMessage::Dimmed(message.to_string()));
    }
}
