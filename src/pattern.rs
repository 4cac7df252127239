//! Translatable-text extraction.
//!
//! Operators configure an ordered list of regular expressions under
//! `match.include`. A pattern must match the whole plain-text message and its
//! first capture group is the text offered for translation, which lets a pattern
//! strip whatever wrapper a plugin or client mod puts around relayed chat.
//!
//! Patterns containing `%username%` are templates: they are instantiated per
//! player with the player's name and compiled on first use.

use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::ConfigError;

/// Placeholder replaced with the sending player's name. The name is escaped,
/// so it matches literally even when it contains regex metacharacters.
pub const USERNAME_PLACEHOLDER: &str = "%username%";

/// Stand-in used to validate a template's syntax at startup.
const VALIDATION_USERNAME: &str = "Player";

/// Compile `source` so that it only matches the entire input.
///
/// The source is wrapped in a non-capturing group, so its group numbering is
/// unchanged.
fn compile_full_match(source: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"\A(?:{source})\z"))
}

/// `None` when `regex` does not match; `Some(None)` when it matches but group 1
/// did not participate.
fn first_group(regex: &Regex, text: &str) -> Option<Option<String>> {
    regex
        .captures(text)
        .map(|captures| captures.get(1).map(|group| group.as_str().to_string()))
}

/// A template instantiated lazily per player.
///
/// Each player slot is an `OnceLock`, so compilation for a (template, player)
/// pair happens once, and only callers for that same pair wait on it. The map
/// lock is held just long enough to find or insert the slot.
#[derive(Debug)]
struct TemplatedPattern {
    source: String,
    instances: RwLock<HashMap<Uuid, Arc<OnceLock<Option<Regex>>>>>,
}

impl TemplatedPattern {
    fn new(source: String) -> Self {
        Self {
            source,
            instances: RwLock::new(HashMap::new()),
        }
    }

    fn slot(&self, user_id: Uuid) -> Arc<OnceLock<Option<Regex>>> {
        if let Some(slot) = self
            .instances
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&user_id)
        {
            return Arc::clone(slot);
        }

        let mut instances = self
            .instances
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(instances.entry(user_id).or_default())
    }

    /// The compiled instance for `user_id`, compiling it with `user_name` on first use.
    ///
    /// `None` when the instantiated pattern failed to compile; the failure is
    /// cached like a success.
    fn instance(&self, user_id: Uuid, user_name: &str) -> Option<Regex> {
        let slot = self.slot(user_id);
        slot.get_or_init(|| {
            let source = self
                .source
                .replace(USERNAME_PLACEHOLDER, &regex::escape(user_name));
            match compile_full_match(&source) {
                Ok(regex) => Some(regex),
                Err(e) => {
                    warn!(
                        "Pattern `{}` failed to compile for {} ({}): {}",
                        self.source, user_name, user_id, e
                    );
                    None
                }
            }
        })
        .clone()
    }

    fn cached_instances(&self) -> usize {
        self.instances
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

#[derive(Debug)]
enum MatchRule {
    Static(Regex),
    Templated(TemplatedPattern),
}

impl MatchRule {
    /// `None` when the rule does not match, so the next rule is tried.
    fn try_match(&self, text: &str, user_id: Uuid, user_name: &str) -> Option<Option<String>> {
        match self {
            MatchRule::Static(regex) => first_group(regex, text),
            MatchRule::Templated(template) => {
                let regex = template.instance(user_id, user_name)?;
                first_group(&regex, text)
            }
        }
    }
}

/// Decides whether a chat message is translatable and extracts the text to translate.
#[derive(Debug)]
pub struct PatternExtractor {
    /// Static patterns first, then templates, each in configured order
    rules: Vec<MatchRule>,
}

impl PatternExtractor {
    /// Build an extractor from `match.include`.
    ///
    /// # Errors
    /// `ConfigError::InvalidPatternSyntax` for the first entry that does not
    /// compile. Templates are checked with a placeholder name substituted.
    pub fn new<S: AsRef<str>>(sources: &[S]) -> Result<Self, ConfigError> {
        let mut statics = Vec::new();
        let mut templates = Vec::new();

        for source in sources {
            let source = source.as_ref();
            let invalid = |e| ConfigError::InvalidPatternSyntax {
                pattern: source.to_string(),
                source: e,
            };

            if source.contains(USERNAME_PLACEHOLDER) {
                compile_full_match(&source.replace(USERNAME_PLACEHOLDER, VALIDATION_USERNAME))
                    .map_err(invalid)?;
                templates.push(MatchRule::Templated(TemplatedPattern::new(source.to_string())));
            } else {
                statics.push(MatchRule::Static(compile_full_match(source).map_err(invalid)?));
            }
        }

        info!(
            "Prepared {} static patterns and {} per-user templates",
            statics.len(),
            templates.len()
        );

        statics.extend(templates);
        Ok(Self { rules: statics })
    }

    /// Extract the translatable part of `text` sent by the given player.
    ///
    /// Returns the first capture group of the first pattern that matches the
    /// whole text, or `None` when the message should not be offered for
    /// translation. The first full match decides even when its group 1 did not
    /// participate, which lets a pattern exclude lines from later patterns.
    pub fn extract(&self, text: &str, user_id: Uuid, user_name: &str) -> Option<String> {
        self.rules
            .iter()
            .find_map(|rule| rule.try_match(text, user_id, user_name))
            .flatten()
    }

    pub fn static_count(&self) -> usize {
        self.rules
            .iter()
            .filter(|rule| matches!(rule, MatchRule::Static(_)))
            .count()
    }

    pub fn template_count(&self) -> usize {
        self.rules.len() - self.static_count()
    }

    /// Number of compiled per-player instances across all templates.
    pub fn cached_instances(&self) -> usize {
        self.rules
            .iter()
            .map(|rule| match rule {
                MatchRule::Templated(template) => template.cached_instances(),
                MatchRule::Static(_) => 0,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const BRIDGE: &str = r"^\[Bridge\] <(?:.+)> (.+)$";

    fn alice() -> Uuid {
        Uuid::from_u128(0xA11CE)
    }

    fn bob() -> Uuid {
        Uuid::from_u128(0xB0B)
    }

    // ==================== Construction Tests ====================

    #[test]
    fn test_partitions_static_and_templated() {
        let extractor = PatternExtractor::new(&[BRIDGE, r"^<%username%> (.+)$"]).unwrap();
        assert_eq!(extractor.static_count(), 1);
        assert_eq!(extractor.template_count(), 1);
        assert_eq!(extractor.cached_instances(), 0);
    }

    #[test]
    fn test_invalid_static_pattern_fails() {
        let err = PatternExtractor::new(&["^(unclosed$"]).unwrap_err();
        match err {
            ConfigError::InvalidPatternSyntax { pattern, .. } => assert_eq!(pattern, "^(unclosed$"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_template_fails() {
        let err = PatternExtractor::new(&["^<%username%> ([a-$"]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPatternSyntax { .. }));
    }

    #[test]
    fn test_empty_config() {
        let extractor = PatternExtractor::new::<&str>(&[]).unwrap();
        assert_eq!(extractor.extract("anything", alice(), "Alice"), None);
    }

    // ==================== Static Pattern Tests ====================

    #[test]
    fn test_bridge_pattern_extracts_message() {
        let extractor = PatternExtractor::new(&[r"^\[Bridge\] <(.+)> (.+)$"]).unwrap();
        // Group 1 of this pattern is the name; the message is group 2
        assert_eq!(
            extractor.extract("[Bridge] <Alice> hi", alice(), "Alice"),
            Some("Alice".to_string())
        );

        let extractor = PatternExtractor::new(&[BRIDGE]).unwrap();
        assert_eq!(
            extractor.extract("[Bridge] <Alice> hi", alice(), "Alice"),
            Some("hi".to_string())
        );
    }

    #[test]
    fn test_non_matching_text() {
        let extractor = PatternExtractor::new(&[BRIDGE]).unwrap();
        assert_eq!(extractor.extract("Server restarting in 5m", alice(), "Alice"), None);
    }

    #[test]
    fn test_requires_full_match() {
        let extractor = PatternExtractor::new(&["hi (.+)"]).unwrap();
        assert_eq!(extractor.extract("hi there", alice(), "Alice"), Some("there".to_string()));
        assert_eq!(extractor.extract("oh hi there", alice(), "Alice"), None);
    }

    #[test]
    fn test_full_match_with_alternation() {
        let extractor = PatternExtractor::new(&["(a|ab)"]).unwrap();
        assert_eq!(extractor.extract("ab", alice(), "Alice"), Some("ab".to_string()));
    }

    #[test]
    fn test_first_matching_pattern_wins() {
        let extractor = PatternExtractor::new(&["^(never)$", "^\\[G\\] (.+)$", "^(.+)$"]).unwrap();
        assert_eq!(extractor.extract("[G] hello", alice(), "Alice"), Some("hello".to_string()));
        assert_eq!(extractor.extract("plain", alice(), "Alice"), Some("plain".to_string()));
    }

    #[test]
    fn test_pattern_without_group_does_not_extract() {
        let extractor = PatternExtractor::new(&["^no group$", "^(.+)$"]).unwrap();
        assert_eq!(extractor.extract("no group", alice(), "Alice"), None);
        assert_eq!(extractor.extract("other", alice(), "Alice"), Some("other".to_string()));
    }

    #[test]
    fn test_unset_group_excludes_line_from_later_patterns() {
        let extractor =
            PatternExtractor::new(&[r"^(?:\[G\] (.+)|\[Bot\] .+)$", r"^(.+)$"]).unwrap();
        assert_eq!(extractor.extract("[Bot] restarting", alice(), "Alice"), None);
        assert_eq!(extractor.extract("[G] hello", alice(), "Alice"), Some("hello".to_string()));
        assert_eq!(extractor.extract("plain", alice(), "Alice"), Some("plain".to_string()));
    }

    // ==================== Templated Pattern Tests ====================

    #[test]
    fn test_template_matches_own_name_only() {
        let extractor = PatternExtractor::new(&["^<%username%> (.+)$"]).unwrap();
        assert_eq!(extractor.extract("<Alice> hi", alice(), "Alice"), Some("hi".to_string()));
        assert_eq!(extractor.extract("<Alice> hi", bob(), "Bob"), None);
    }

    #[test]
    fn test_template_replaces_every_placeholder() {
        let extractor = PatternExtractor::new(&["^%username% -> %username%: (.+)$"]).unwrap();
        assert_eq!(
            extractor.extract("Alice -> Alice: note", alice(), "Alice"),
            Some("note".to_string())
        );
    }

    #[test]
    fn test_template_cached_per_user() {
        let extractor = PatternExtractor::new(&["^<%username%> (.+)$"]).unwrap();
        extractor.extract("<Alice> one", alice(), "Alice");
        extractor.extract("<Alice> two", alice(), "Alice");
        assert_eq!(extractor.cached_instances(), 1);

        extractor.extract("<Bob> three", bob(), "Bob");
        assert_eq!(extractor.cached_instances(), 2);
    }

    #[test]
    fn test_rename_does_not_change_cached_instance() {
        let extractor = PatternExtractor::new(&["^<%username%> (.+)$"]).unwrap();
        assert_eq!(extractor.extract("<Alice> hi", alice(), "Alice"), Some("hi".to_string()));

        // Same identity under a new name keeps the first instance
        assert_eq!(extractor.extract("<Alicia> hi", alice(), "Alicia"), None);
        assert_eq!(extractor.extract("<Alice> hi", alice(), "Alicia"), Some("hi".to_string()));
    }

    #[test]
    fn test_name_with_metacharacters_is_literal() {
        let extractor = PatternExtractor::new(&["^<%username%> (.+)$"]).unwrap();
        let id = Uuid::from_u128(7);
        assert_eq!(extractor.extract("<.Steve> yo", id, ".Steve"), Some("yo".to_string()));
        assert_eq!(extractor.extract("<xSteve> yo", id, ".Steve"), None);
    }

    #[test]
    fn test_template_compile_failure_falls_through() {
        // Valid with a real name, but an empty name leaves an unclosed `[]` class
        let extractor =
            PatternExtractor::new(&[r"^[%username%] (.+)$", r"^%username%x (.+)$"]).unwrap();
        let id = Uuid::from_u128(3);

        assert_eq!(extractor.extract("x hi", id, ""), Some("hi".to_string()));
        assert_eq!(extractor.cached_instances(), 2);

        // The failure stays cached
        assert_eq!(extractor.extract("x again", id, ""), Some("again".to_string()));
        assert_eq!(extractor.cached_instances(), 2);
    }

    #[test]
    fn test_static_patterns_take_precedence() {
        let extractor = PatternExtractor::new(&["^<%username%> (.+)$", "^<Alice> (h).*$"]).unwrap();
        assert_eq!(extractor.extract("<Alice> hi", alice(), "Alice"), Some("h".to_string()));
        // The static pattern matched, so no template was instantiated
        assert_eq!(extractor.cached_instances(), 0);
    }

    #[test]
    fn test_concurrent_lookups_compile_once_per_user() {
        let extractor = Arc::new(PatternExtractor::new(&["^<%username%> (.+)$"]).unwrap());
        let users: Vec<(Uuid, String)> = (0..8)
            .map(|i| (Uuid::from_u128(i), format!("User{i}")))
            .collect();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                for (id, name) in &users {
                    let extractor = Arc::clone(&extractor);
                    scope.spawn(move || {
                        let text = format!("<{name}> hello");
                        assert_eq!(extractor.extract(&text, *id, name), Some("hello".to_string()));
                    });
                }
            }
        });

        assert_eq!(extractor.cached_instances(), users.len());
    }

    // ==================== Properties ====================

    proptest! {
        #[test]
        fn prop_extract_iff_full_match(word in "[a-z]{1,8}", noise in "[a-z]{0,4}") {
            let extractor = PatternExtractor::new(&["x(\\w+)", "(never)"]).unwrap();
            let id = Uuid::from_u128(1);

            let matched = format!("x{word}");
            prop_assert_eq!(extractor.extract(&matched, id, "P"), Some(word.clone()));

            let prefixed = format!("{noise} x{word}");
            prop_assert_eq!(extractor.extract(&prefixed, id, "P"), None);
        }

        #[test]
        fn prop_non_matching_patterns_do_not_affect_result(word in "[a-z]{1,8}") {
            let forward = PatternExtractor::new(&["^(zzz\\d)$", "^(qqq\\d)$", "^say (.+)$"]).unwrap();
            let reversed = PatternExtractor::new(&["^(qqq\\d)$", "^(zzz\\d)$", "^say (.+)$"]).unwrap();
            let id = Uuid::from_u128(1);
            let text = format!("say {word}");

            prop_assert_eq!(forward.extract(&text, id, "P"), reversed.extract(&text, id, "P"));
        }
    }
}
