use std::collections::HashSet;

use crate::config::GenericNameConfig;

/// Flags normalized name keys that denote a category of registrant
/// rather than an identifiable company.
///
/// Built once from config and injected into the grouping engine. A match
/// here keeps records separate even when their keys are byte-identical:
/// thousands of unrelated registrants share these strings.
pub struct GenericClassifier {
    exact: HashSet<String>,
    surname_pairs: HashSet<String>,
    max_bare_token_len: usize,
    numeric_only: bool,
}

impl GenericClassifier {
    pub fn new(config: &GenericNameConfig) -> Self {
        let exact = config.exact.iter().map(|e| e.to_lowercase()).collect();

        let mut surname_pairs = HashSet::new();
        for surname in &config.surnames {
            for form in &config.surname_forms {
                surname_pairs.insert(format!("{} {}", surname.to_lowercase(), form.to_lowercase()));
            }
        }

        Self {
            exact,
            surname_pairs,
            max_bare_token_len: config.max_bare_token_len,
            numeric_only: config.numeric_only,
        }
    }

    /// Evaluated against the normalized key, not the raw name.
    pub fn is_generic(&self, key: &str) -> bool {
        if key.is_empty() {
            return true;
        }
        if self.exact.contains(key) {
            return true;
        }
        if key.chars().count() <= self.max_bare_token_len && key.chars().all(|c| c.is_alphabetic())
        {
            return true;
        }
        if self.numeric_only && key.chars().all(|c| c.is_ascii_digit()) {
            return true;
        }
        self.surname_pairs.contains(key)
    }
}
