//! De-duplicated diagnostics.
//!
//! Each view owns one [`WarningSet`]. A message is reported the first time it
//! is seen after the last document open; repeats are suppressed so that a
//! stylesheet with a thousand broken rules does not flood the event stream.

use std::collections::HashSet;

use parking_lot::Mutex;

/// Set of warnings already reported since the last [`WarningSet::clear`].
#[derive(Debug, Default)]
pub struct WarningSet {
    seen: Mutex<HashSet<String>>,
}

impl WarningSet {
    /// Create an empty warning set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` and report whether it should be emitted.
    ///
    /// Returns `true` exactly once per distinct message between clears. The
    /// first occurrence is also logged through `tracing`.
    ///
    /// # Example
    /// ```
    /// use wombat_common::WarningSet;
    ///
    /// let warnings = WarningSet::new();
    /// assert!(warnings.should_emit("unsupported unit 'vw'"));
    /// assert!(!warnings.should_emit("unsupported unit 'vw'"));
    /// ```
    pub fn should_emit(&self, message: &str) -> bool {
        let fresh = self.seen.lock().insert(message.to_owned());
        if fresh {
            tracing::warn!("{message}");
        }
        fresh
    }

    /// Forget every recorded warning (called when a document is opened).
    pub fn clear(&self) {
        self.seen.lock().clear();
    }

    /// Number of distinct warnings recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    /// Whether no warning has been recorded since the last clear.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_rearms_messages() {
        let warnings = WarningSet::new();
        assert!(warnings.should_emit("a"));
        assert!(warnings.should_emit("b"));
        assert!(!warnings.should_emit("a"));
        assert_eq!(warnings.len(), 2);

        warnings.clear();
        assert!(warnings.is_empty());
        assert!(warnings.should_emit("a"));
    }
}
