//! Chat types: how the server decorates a signed chat body before display.
//!
//! A player-chat packet does not carry its final text. It references a chat
//! type by network id and supplies the sender (and optionally target) name; the
//! chat type's decoration rule turns those plus the message into a translatable
//! component such as `chat.type.text` → `<Alice> hello`.

use serde::{Deserialize, Serialize};

use crate::component::{deserialize_node, deserialize_optional_node, Component};

/// Argument slots a decoration rule can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecorationParameter {
    Sender,
    Target,
    Content,
}

/// Decoration rule of a chat type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatDecoration {
    pub translation_key: String,
    pub parameters: Vec<DecorationParameter>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatType {
    /// Registry name, e.g. `minecraft:chat`
    pub name: String,
    pub chat: ChatDecoration,
}

/// Reference to a chat type as carried in a player-chat packet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTypeBinding {
    /// Network id: index into the registry
    pub chat_type: i32,
    #[serde(deserialize_with = "deserialize_node")]
    pub name: Component,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_node"
    )]
    pub target_name: Option<Box<Component>>,
}

/// A chat type resolved against a registry, bound to its sender and target names.
#[derive(Debug, Clone, Copy)]
pub struct BoundChatType<'a> {
    pub chat_type: &'a ChatType,
    pub name: &'a Component,
    pub target_name: Option<&'a Component>,
}

impl BoundChatType<'_> {
    /// Apply the decoration rule to the message content.
    pub fn decorate(&self, content: &Component) -> Component {
        let decoration = &self.chat_type.chat;
        let args = decoration
            .parameters
            .iter()
            .map(|parameter| match parameter {
                DecorationParameter::Sender => self.name.clone(),
                DecorationParameter::Target => self
                    .target_name
                    .cloned()
                    .unwrap_or_default(),
                DecorationParameter::Content => content.clone(),
            })
            .collect();

        let mut decorated = Component::translatable(decoration.translation_key.clone(), args);
        decorated.color = decoration.color.clone();
        decorated
    }
}

/// Chat types known to the server, indexed by network id.
#[derive(Debug, Clone)]
pub struct ChatTypeRegistry {
    types: Vec<ChatType>,
}

impl ChatTypeRegistry {
    pub fn new(types: Vec<ChatType>) -> Self {
        Self { types }
    }

    /// The chat types a vanilla server registers, in network-id order.
    pub fn vanilla() -> Self {
        use DecorationParameter::{Content, Sender, Target};

        let entry = |name: &str, key: &str, parameters: Vec<DecorationParameter>| ChatType {
            name: name.to_string(),
            chat: ChatDecoration {
                translation_key: key.to_string(),
                parameters,
                color: None,
            },
        };

        Self::new(vec![
            entry("minecraft:chat", "chat.type.text", vec![Sender, Content]),
            entry("minecraft:emote_command", "chat.type.emote", vec![Sender, Content]),
            entry(
                "minecraft:msg_command_incoming",
                "commands.message.display.incoming",
                vec![Sender, Content],
            ),
            entry(
                "minecraft:msg_command_outgoing",
                "commands.message.display.outgoing",
                vec![Target, Content],
            ),
            entry("minecraft:say_command", "chat.type.announcement", vec![Sender, Content]),
            entry(
                "minecraft:team_msg_command_incoming",
                "chat.type.team.text",
                vec![Target, Sender, Content],
            ),
            entry(
                "minecraft:team_msg_command_outgoing",
                "chat.type.team.sent",
                vec![Target, Sender, Content],
            ),
        ])
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Resolve a packet's chat type reference. `None` when the id is unknown.
    pub fn resolve<'a>(&'a self, binding: &'a ChatTypeBinding) -> Option<BoundChatType<'a>> {
        let index = usize::try_from(binding.chat_type).ok()?;
        let chat_type = self.types.get(index)?;
        Some(BoundChatType {
            chat_type,
            name: &binding.name,
            target_name: binding.target_name.as_deref(),
        })
    }
}

impl Default for ChatTypeRegistry {
    fn default() -> Self {
        Self::vanilla()
    }
}

/// Server-side (en_us) format for a translation key, used when flattening
/// translatable components to plain text.
pub fn translation_format(key: &str) -> Option<&'static str> {
    match key {
        "chat.type.text" => Some("<%s> %s"),
        "chat.type.emote" => Some("* %s %s"),
        "chat.type.announcement" => Some("[%s] %s"),
        "chat.type.team.text" => Some("%s <%s> %s"),
        "chat.type.team.sent" => Some("-> %s <%s> %s"),
        "commands.message.display.incoming" => Some("%s whispers to you: %s"),
        "commands.message.display.outgoing" => Some("You whisper to %s: %s"),
        "multiplayer.player.joined" => Some("%s joined the game"),
        "multiplayer.player.left" => Some("%s left the game"),
        _ => None,
    }
}
