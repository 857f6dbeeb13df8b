use regex::Regex;

/// Tokens that keep their trailing period: stripping it would collapse
/// distinct legal forms into unrelated words.
const PROTECTED_TOKENS: &[&str] = &["co.", "e.v.", "e.k."];

/// Canonicalizes a raw operator name into a comparison key.
///
/// Deterministic and pure: same input, same key, no locale or global
/// state. Compiled patterns live on the struct so per-record cost stays
/// O(len).
pub struct Normalizer {
    whitespace: Regex,
    gmbh_co_kg: Regex,
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            whitespace: Regex::new(r"\s+").unwrap(),
            gmbh_co_kg: Regex::new(r"\bgmbh\s*(?:&|u\.|und)\s*co\.?\s*kg\b").unwrap(),
        }
    }

    /// Lowercase, collapse whitespace, normalize ampersand spacing, strip
    /// identity-neutral punctuation, and canonicalize the
    /// `GmbH & Co. KG` family of legal forms. Numeric suffixes and
    /// location qualifiers pass through untouched.
    pub fn normalize(&self, name: &str) -> String {
        let lowered = name.trim().to_lowercase();
        let spaced = lowered.replace('&', " & ");
        let collapsed = self.whitespace.replace_all(&spaced, " ");
        let canonical = self.gmbh_co_kg.replace_all(&collapsed, "gmbh & co. kg");

        canonical
            .split(' ')
            .filter_map(strip_token)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop commas, strip trailing periods from unprotected tokens.
fn strip_token(token: &str) -> Option<String> {
    let without_commas: String = token.chars().filter(|&c| c != ',').collect();
    if PROTECTED_TOKENS.contains(&without_commas.as_str()) {
        return Some(without_commas);
    }
    let stripped = without_commas.trim_end_matches('.');
    if stripped.is_empty() {
        None
    } else {
        Some(stripped.to_string())
    }
}
