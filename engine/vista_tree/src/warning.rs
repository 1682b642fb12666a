//! Soft-failure channel.
//!
//! Conditions the engine can recover from are published here instead of
//! being returned as errors. Subscribers always see them; the sink decides
//! what else happens:
//! - `Log`: forwarded to `tracing` at warn level (default)
//! - `Buffer`: captured for assertions and REPL-style consumers
//! - `Silent`: subscribers only
//!
//! # Performance
//! Uses enum dispatch instead of trait objects; the sink is fixed at build time.

use std::fmt;

use parking_lot::Mutex;

use crate::node::Node;

/// One soft failure.
#[derive(Clone)]
pub struct Warning {
    pub node: Node,
    pub message: String,
}

impl fmt::Debug for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Warning")
            .field("node", &self.node.header())
            .field("message", &self.message)
            .finish()
    }
}

/// Captured warning lines.
#[derive(Default)]
pub struct WarningBuffer {
    lines: Mutex<Vec<String>>,
}

impl WarningBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, line: String) {
        self.lines.lock().push(line);
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

/// Where warnings go besides subscribers.
#[derive(Default)]
pub enum WarningSink {
    #[default]
    Log,
    Buffer(WarningBuffer),
    Silent,
}

impl WarningSink {
    pub fn buffered() -> Self {
        WarningSink::Buffer(WarningBuffer::new())
    }

    pub fn publish(&self, header: &str, message: &str) {
        match self {
            WarningSink::Log => tracing::warn!(node = header, "{message}"),
            WarningSink::Buffer(buffer) => {
                tracing::debug!(node = header, "{message}");
                buffer.push(format!("{header}: {message}"));
            }
            WarningSink::Silent => {}
        }
    }

    /// Captured lines; empty unless buffering.
    pub fn captured(&self) -> Vec<String> {
        match self {
            WarningSink::Buffer(buffer) => buffer.lines(),
            WarningSink::Log | WarningSink::Silent => Vec::new(),
        }
    }

    pub fn clear(&self) {
        if let WarningSink::Buffer(buffer) = self {
            buffer.clear();
        }
    }
}

impl fmt::Debug for WarningSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WarningSink::Log => "Log",
            WarningSink::Buffer(_) => "Buffer",
            WarningSink::Silent => "Silent",
        })
    }
}
