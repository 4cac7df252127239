//! Language registry: Single source of truth for all supported languages.
//!
//! Codes follow the translation backend's conventions (`EN-US`, `ZH-HANS`, ...),
//! so a player's stored default language can be passed to it unchanged. The
//! registry is a singleton initialised on first access with `OnceLock`.

use std::sync::OnceLock;

use crate::i18n::strings::{
    LanguageStrings, CHINESE_STRINGS, ENGLISH_STRINGS, FRENCH_STRINGS, GERMAN_STRINGS,
    JAPANESE_STRINGS, SPANISH_STRINGS,
};

/// Configuration for a supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// Upper-case language code (e.g., "EN-US", "ZH-HANS", "JA")
    pub code: &'static str,

    /// English name of the language
    pub name: &'static str,

    /// Native name of the language
    pub native_name: &'static str,

    /// Whether this language is used when a player has none set (only one should be true)
    pub is_fallback: bool,

    /// Localized interface strings
    pub strings: &'static LanguageStrings,
}

/// Global language registry singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code, ignoring case.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages
            .iter()
            .find(|lang| lang.code.eq_ignore_ascii_case(code))
    }

    /// All languages, in registry order.
    pub fn list_all(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().collect()
    }

    /// The language used when a player has no (or an unknown) default.
    ///
    /// # Panics
    /// Panics if the registry does not define exactly one fallback language.
    pub fn fallback(&self) -> &LanguageConfig {
        let fallbacks: Vec<_> = self
            .languages
            .iter()
            .filter(|lang| lang.is_fallback)
            .collect();

        match fallbacks.len() {
            0 => panic!("No fallback language found in registry"),
            1 => fallbacks[0],
            _ => panic!("Multiple fallback languages found in registry"),
        }
    }

    /// Resolve an optional code to a configured language, falling back when
    /// unset or unknown.
    pub fn resolve(&self, code: Option<&str>) -> &LanguageConfig {
        code.and_then(|code| self.get_by_code(code))
            .unwrap_or_else(|| self.fallback())
    }

    pub fn is_supported(&self, code: &str) -> bool {
        self.get_by_code(code).is_some()
    }
}

fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "EN-US",
            name: "English (American)",
            native_name: "English",
            is_fallback: true,
            strings: &ENGLISH_STRINGS,
        },
        LanguageConfig {
            code: "EN-GB",
            name: "English (British)",
            native_name: "English",
            is_fallback: false,
            strings: &ENGLISH_STRINGS,
        },
        LanguageConfig {
            code: "ZH-HANS",
            name: "Chinese (simplified)",
            native_name: "简体中文",
            is_fallback: false,
            strings: &CHINESE_STRINGS,
        },
        LanguageConfig {
            code: "JA",
            name: "Japanese",
            native_name: "日本語",
            is_fallback: false,
            strings: &JAPANESE_STRINGS,
        },
        LanguageConfig {
            code: "ES",
            name: "Spanish",
            native_name: "Español",
            is_fallback: false,
            strings: &SPANISH_STRINGS,
        },
        LanguageConfig {
            code: "DE",
            name: "German",
            native_name: "Deutsch",
            is_fallback: false,
            strings: &GERMAN_STRINGS,
        },
        LanguageConfig {
            code: "FR",
            name: "French",
            native_name: "Français",
            is_fallback: false,
            strings: &FRENCH_STRINGS,
        },
    ]
}
