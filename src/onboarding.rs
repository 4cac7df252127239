//! First-join handling: pick a default language from the player's location and
//! greet them.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use crate::component::Component;
use crate::geolocation::Geolocation;
use crate::packet::Player;
use crate::pattern::USERNAME_PLACEHOLDER;
use crate::store::{ChatStore, Language};

const WELCOME_COLOR: &str = "gray";
const HEADER_COLOR: &str = "light_purple";

/// Regions whose language code differs from the region code.
const REGION_OVERRIDES: [(&str, &str); 6] = [
    ("CN", "ZH"),
    ("TW", "ZH"),
    ("HK", "ZH"),
    ("JP", "JA"),
    ("GB", "EN-GB"),
    ("US", "EN-US"),
];

/// Map a region code to the language code to search for.
pub fn apply_region_override(region: Option<&str>) -> Option<String> {
    let region = region?;
    let code = REGION_OVERRIDES
        .iter()
        .find(|(from, _)| *from == region)
        .map_or(region, |(_, to)| *to);
    Some(code.to_string())
}

/// First supported language whose code contains `code`, ignoring case.
pub fn find_supported_language(languages: &[Language], code: &str) -> Option<String> {
    let needle = code.to_uppercase();
    languages
        .iter()
        .find(|language| language.code.to_uppercase().contains(&needle))
        .map(|language| language.code.clone())
}

/// Header followed by three lines, each gray.
pub fn welcome_message(header: &str, first: &str, second: &str, third: &str) -> Component {
    Component::text(header)
        .color(HEADER_COLOR)
        .append(Component::text(first).color(WELCOME_COLOR))
        .append(Component::newline())
        .append(Component::text(second).color(WELCOME_COLOR))
        .append(Component::newline())
        .append(Component::text(third).color(WELCOME_COLOR))
}

pub struct NewUserOnboarding {
    store: Arc<dyn ChatStore>,
    geolocation: Arc<dyn Geolocation>,
}

impl NewUserOnboarding {
    pub fn new(store: Arc<dyn ChatStore>, geolocation: Arc<dyn Geolocation>) -> Self {
        Self { store, geolocation }
    }

    /// Handle a player joining.
    ///
    /// Returns the welcome message to deliver when this is the player's first
    /// contact, `None` otherwise.
    ///
    /// # Errors
    /// Only when the first-contact check itself fails. Failing to store the
    /// default language is logged and the welcome is still returned.
    pub async fn on_player_join(&self, player: &Player) -> Result<Option<Component>> {
        let is_new = self
            .store
            .is_new_user(player.id, &player.name)
            .await
            .context("Failed to check for first contact")?;
        if !is_new {
            return Ok(None);
        }

        let language = self.resolve_language(player).await;
        if let Some(code) = &language {
            match self.store.set_user_default_language(player.id, code).await {
                Ok(()) => info!("Default language for {} ({}) set to {}", player.name, player.id, code),
                Err(e) => warn!(
                    "Failed to set default language for {} ({}) to {}: {}",
                    player.name, player.id, code, e
                ),
            }
        }

        let code = language.as_deref();
        let header = self.store.translation("welcome.header", code).await;
        let first = self
            .store
            .translation("welcome.first", code)
            .await
            .replace(USERNAME_PLACEHOLDER, &player.name);
        let second = self.store.translation("welcome.second", code).await;
        let third = self.store.translation("welcome.third", code).await;

        Ok(Some(welcome_message(&header, &first, &second, &third)))
    }

    async fn resolve_language(&self, player: &Player) -> Option<String> {
        let region = self.geolocation.country_code(player).await;
        let code = apply_region_override(region.as_deref())?;
        let languages = self.store.languages().await;
        find_supported_language(&languages, &code)
    }
}
