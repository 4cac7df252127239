//! Supported languages and the strings this service shows to players.
//!
//! - `registry`: Single source of truth for supported language codes
//! - `strings`: Localized interface strings per language

mod registry;
mod strings;

pub use registry::{LanguageConfig, LanguageRegistry};
pub use strings::LanguageStrings;

/// Look up a localized string, falling back to the fallback language when
/// `code` is unset or unknown, and to the key itself when the key is unknown.
pub fn lookup(key: &str, code: Option<&str>) -> String {
    let registry = LanguageRegistry::get();
    registry
        .resolve(code)
        .strings
        .get(key)
        .or_else(|| registry.fallback().strings.get(key))
        .unwrap_or(key)
        .to_string()
}
