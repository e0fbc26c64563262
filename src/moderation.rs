//! Content moderation
//!
//! The single gate between generated content and persistence. Every path
//! that mutates a record's files runs through here, both at creation and
//! after every improvement pass.
//!
//! Matching is deliberately crude: case-sensitive literal substring search
//! against a fixed denylist, no normalization. The `ContentClassifier`
//! trait exists so a stronger analyzer can replace it without touching
//! callers.

use crate::types::FileMap;
use tracing::warn;

/// Built-in denylist. Static configuration, never data-driven from the store.
pub const DEFAULT_DENYLIST: &[&str] = &["<script>alert", "eval(", "malicious"];

/// Classification verdict for a single piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Clean,
    Flagged,
}

/// Pluggable content classifier capability.
pub trait ContentClassifier: Send + Sync {
    /// Classify one file's content.
    fn classify(&self, content: &str) -> Verdict;
}

/// Literal-substring denylist classifier.
#[derive(Debug, Clone)]
pub struct DenylistClassifier {
    patterns: Vec<String>,
}

impl Default for DenylistClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_DENYLIST.iter().map(|p| p.to_string()).collect())
    }
}

impl DenylistClassifier {
    /// Create a classifier over a fixed pattern list.
    pub fn new(patterns: Vec<String>) -> Self {
        Self { patterns }
    }

    /// Check a whole files mapping. Returns true if any file's content
    /// contains any denylisted pattern.
    ///
    /// Pure function of its input; the only side effect is a warning log on
    /// a hit.
    pub fn is_flagged(&self, files: &FileMap) -> bool {
        for (filename, content) in files {
            if self.classify(content) == Verdict::Flagged {
                warn!(file = %filename, "content matched denylist");
                return true;
            }
        }
        false
    }
}

impl ContentClassifier for DenylistClassifier {
    fn classify(&self, content: &str) -> Verdict {
        if self.patterns.iter().any(|p| content.contains(p.as_str())) {
            Verdict::Flagged
        } else {
            Verdict::Clean
        }
    }
}
