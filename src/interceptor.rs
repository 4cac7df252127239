//! Outbound chat interception.
//!
//! Every chat packet on its way to a player passes through
//! [`ChatInterceptor::on_packet_sending`]. Messages worth translating are
//! stored and the packet is rewritten so that hovering shows a hint and
//! clicking runs `<translate command> <message id>`.
//!
//! Signed player chat is always real player text and is always offered.
//! System chat mixes plugin broadcasts with relayed chat, so it is only offered
//! when the configured patterns extract text from it.
//!
//! Interception never drops a packet. Any failure leaves the packet as it was.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::chat_type::ChatTypeRegistry;
use crate::component::{ClickEvent, Component, HoverEvent};
use crate::packet::{ClientboundPacket, PacketEvent, Player, PlayerChatPacket, SystemChatPacket};
use crate::pattern::PatternExtractor;
use crate::store::{ChatStore, MessageId};

const HOVER_KEY: &str = "translate.hover";
const HOVER_COLOR: &str = "gray";

/// What the host should send in place of the intercepted packet.
#[derive(Debug, Clone, PartialEq)]
pub enum PacketAction {
    /// Send the original packet unchanged
    PassThrough,
    Replace(ClientboundPacket),
}

impl PacketAction {
    /// The packet to deliver, given the original.
    pub fn into_packet(self, original: ClientboundPacket) -> ClientboundPacket {
        match self {
            PacketAction::PassThrough => original,
            PacketAction::Replace(packet) => packet,
        }
    }
}

/// One intercepted chat message, reduced to what gets stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedChatMessage {
    /// Text as the player would read it
    pub display_text: String,
    /// JSON form of the displayed component
    pub serialized: String,
    pub user_id: Uuid,
    pub user_name: String,
}

/// Add the translate hover hint and click command to `content`.
///
/// The events are set on the root node, so the whole message is the affordance
/// and the existing children keep their own formatting.
pub fn attach_translate_affordance(
    content: Component,
    command: &str,
    message_id: MessageId,
    hover_hint: &str,
) -> Component {
    content
        .hover_event(HoverEvent::show_text(
            Component::text(hover_hint).color(HOVER_COLOR),
        ))
        .click_event(ClickEvent::run_command(format!("{command} {message_id}")))
}

pub struct ChatInterceptor {
    store: Arc<dyn ChatStore>,
    extractor: Arc<PatternExtractor>,
    chat_types: Arc<ChatTypeRegistry>,
    translate_command: String,
}

impl ChatInterceptor {
    pub fn new(
        store: Arc<dyn ChatStore>,
        extractor: Arc<PatternExtractor>,
        chat_types: Arc<ChatTypeRegistry>,
        translate_command: impl Into<String>,
    ) -> Self {
        Self {
            store,
            extractor,
            chat_types,
            translate_command: translate_command.into(),
        }
    }

    /// Decide what to send in place of an outbound packet.
    pub async fn on_packet_sending(&self, event: &PacketEvent) -> PacketAction {
        let result = match &event.packet {
            ClientboundPacket::PlayerChat(packet) => self.on_player_chat(&event.player, packet).await,
            ClientboundPacket::SystemChat(packet) => self.on_system_chat(&event.player, packet).await,
        };

        result.unwrap_or_else(|e| {
            warn!(
                "Passing chat packet for {} through unmodified: {:#}",
                event.player.name, e
            );
            PacketAction::PassThrough
        })
    }

    async fn on_player_chat(&self, player: &Player, packet: &PlayerChatPacket) -> Result<PacketAction> {
        let message = packet
            .unsigned_content
            .as_deref()
            .cloned()
            .unwrap_or_else(|| Component::text(packet.body.content.clone()));

        let Some(chat_type) = self.chat_types.resolve(&packet.chat_type) else {
            warn!(
                "Don't know how to process packet with unknown chat type {}",
                packet.chat_type.chat_type
            );
            return Ok(PacketAction::PassThrough);
        };

        // Flatten the decorated message; the replacement is plain text
        let display = Component::text(chat_type.decorate(&message).plain_text());
        let normalized = NormalizedChatMessage {
            display_text: display.text.clone(),
            serialized: display
                .to_json()
                .context("Failed to serialize decorated chat")?,
            user_id: player.id,
            user_name: player.name.clone(),
        };

        let content = self
            .offer_translation(display, &normalized, &message.plain_text())
            .await?;

        Ok(PacketAction::Replace(ClientboundPacket::SystemChat(
            SystemChatPacket::chat(content),
        )))
    }

    async fn on_system_chat(&self, player: &Player, packet: &SystemChatPacket) -> Result<PacketAction> {
        let component = match Component::from_json(&packet.content) {
            Ok(component) => component,
            Err(e) => {
                debug!("Ignoring system chat that is not a text component: {}", e);
                return Ok(PacketAction::PassThrough);
            }
        };

        let normalized = NormalizedChatMessage {
            display_text: component.plain_text(),
            serialized: packet.content.clone(),
            user_id: player.id,
            user_name: player.name.clone(),
        };

        let Some(text) = self.extractor.extract(
            &normalized.display_text,
            normalized.user_id,
            &normalized.user_name,
        ) else {
            return Ok(PacketAction::PassThrough);
        };

        let content = self.offer_translation(component, &normalized, &text).await?;

        Ok(PacketAction::Replace(ClientboundPacket::SystemChat(
            SystemChatPacket {
                content,
                overlay: packet.overlay,
            },
        )))
    }

    /// Store the message and return the JSON of `content` with the affordance attached.
    async fn offer_translation(
        &self,
        content: Component,
        message: &NormalizedChatMessage,
        translatable: &str,
    ) -> Result<String> {
        // Look up the viewer first so a failure here leaves nothing stored
        let viewer_language = self
            .store
            .user_default_language(message.user_id)
            .await
            .context("Failed to look up viewer language")?;
        let message_id = self
            .store
            .add_message(&message.serialized, translatable)
            .await
            .context("Failed to store chat message")?;

        let hint = self
            .store
            .translation(HOVER_KEY, viewer_language.as_deref())
            .await;

        debug!(
            "Offering translation of message {} to {}",
            message_id, message.user_name
        );

        attach_translate_affordance(content, &self.translate_command, message_id, &hint)
            .to_json()
            .context("Failed to serialize rewritten chat")
    }
}
