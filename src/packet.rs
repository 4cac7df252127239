//! Outbound chat packet shapes handed over by the host transport.

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat_type::ChatTypeBinding;
use crate::component::{deserialize_optional_node, Component};

/// The player a connection belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    /// Network origin, when the host knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<IpAddr>,
}

impl Player {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            address: None,
        }
    }

    pub fn with_address(mut self, address: IpAddr) -> Self {
        self.address = Some(address);
        self
    }
}

/// The signed part of a player chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedMessageBody {
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub salt: i64,
}

/// Signed player chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerChatPacket {
    pub sender: Uuid,
    #[serde(default)]
    pub index: i32,
    /// Base64 message signature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    pub body: SignedMessageBody,
    /// Server-decorated replacement for the signed content
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_node"
    )]
    pub unsigned_content: Option<Box<Component>>,
    pub chat_type: ChatTypeBinding,
}

/// Freeform chat from the server or a plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemChatPacket {
    /// Component tree in its JSON wire form
    pub content: String,
    /// Shown above the hotbar instead of in chat
    #[serde(default)]
    pub overlay: bool,
}

impl SystemChatPacket {
    pub fn chat(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            overlay: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientboundPacket {
    PlayerChat(PlayerChatPacket),
    SystemChat(SystemChatPacket),
}

/// A packet about to be sent to `player`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketEvent {
    pub player: Player,
    pub packet: ClientboundPacket,
}
