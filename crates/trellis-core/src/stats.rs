//! Per-translation statistics.

use serde::{Deserialize, Serialize};

/// Counters accumulated while a tree is converted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationStats {
    /// Nodes visited by the converter
    pub elements_processed: usize,

    /// Nodes rendered into the target dialect (natively or substituted)
    pub elements_translated: usize,

    /// Source elements dropped because their kind could not be mapped
    pub elements_skipped: usize,

    /// Human-readable warnings
    pub warnings: Vec<String>,
}

impl TranslationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Add another set of counters into this one.
    pub fn merge(&mut self, other: &TranslationStats) {
        self.elements_processed += other.elements_processed;
        self.elements_translated += other.elements_translated;
        self.elements_skipped += other.elements_skipped;
        self.warnings.extend(other.warnings.iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_adds_counters_and_warnings() {
        let mut a = TranslationStats {
            elements_processed: 2,
            elements_translated: 2,
            ..Default::default()
        };
        let mut b = TranslationStats::new();
        b.elements_skipped = 1;
        b.warn("dropped");

        a.merge(&b);

        assert_eq!(a.elements_processed, 2);
        assert_eq!(a.elements_skipped, 1);
        assert_eq!(a.warnings, vec!["dropped".to_string()]);
    }
}
