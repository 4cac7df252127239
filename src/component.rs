//! Structured chat content.
//!
//! Chat on the wire is a JSON text-component tree: a node carries literal `text`
//! or a `translate` key with arguments, optional styling, click/hover behaviour
//! and `extra` children that inherit its style. A node may also appear in a
//! compact form, either a bare string or an array whose head is the parent of
//! the remaining elements.
//!
//! Style keys this module does not model (`bold`, `font`, `insertion`, ...) are
//! kept verbatim so a tree survives a parse/serialize cycle without losing
//! formatting.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::chat_type::translation_format;

/// A node of a chat component tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Component {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,

    /// Translation key, rendered with `with` as positional arguments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translate: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "deserialize_nodes"
    )]
    pub with: Vec<Component>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(rename = "clickEvent", default, skip_serializing_if = "Option::is_none")]
    pub click_event: Option<ClickEvent>,

    #[serde(rename = "hoverEvent", default, skip_serializing_if = "Option::is_none")]
    pub hover_event: Option<HoverEvent>,

    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "deserialize_nodes"
    )]
    pub extra: Vec<Component>,

    /// Unmodelled style keys, preserved as-is
    #[serde(flatten)]
    pub style: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub action: String,
    pub value: String,
}

impl ClickEvent {
    pub fn run_command(command: impl Into<String>) -> Self {
        Self {
            action: "run_command".to_string(),
            value: command.into(),
        }
    }
}

/// Hover behaviour. `contents` holds the modern payload, `value` the legacy one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoverEvent {
    pub action: String,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_node"
    )]
    pub contents: Option<Box<Component>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl HoverEvent {
    pub fn show_text(text: Component) -> Self {
        Self {
            action: "show_text".to_string(),
            contents: Some(Box::new(text)),
            value: None,
        }
    }
}

impl Component {
    /// A literal text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// A translatable node with positional arguments.
    pub fn translatable(key: impl Into<String>, args: Vec<Component>) -> Self {
        Self {
            translate: Some(key.into()),
            with: args,
            ..Self::default()
        }
    }

    pub fn newline() -> Self {
        Self::text("\n")
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn click_event(mut self, event: ClickEvent) -> Self {
        self.click_event = Some(event);
        self
    }

    pub fn hover_event(mut self, event: HoverEvent) -> Self {
        self.hover_event = Some(event);
        self
    }

    /// Append a child node.
    pub fn append(mut self, child: Component) -> Self {
        self.extra.push(child);
        self
    }

    /// Parse a component from its JSON wire form.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    fn from_value(value: Value) -> serde_json::Result<Self> {
        match value {
            Value::String(text) => Ok(Self::text(text)),
            Value::Number(n) => Ok(Self::text(n.to_string())),
            Value::Bool(b) => Ok(Self::text(b.to_string())),
            Value::Array(items) => {
                let mut nodes = items
                    .into_iter()
                    .map(Self::from_value)
                    .collect::<serde_json::Result<Vec<_>>>()?;
                if nodes.is_empty() {
                    return Err(serde_json::Error::custom("empty component array"));
                }
                let mut head = nodes.remove(0);
                head.extra.extend(nodes);
                Ok(head)
            }
            Value::Object(_) => serde_json::from_value(value),
            Value::Null => Err(serde_json::Error::custom("null is not a text component")),
        }
    }

    /// Flatten the tree into the text a player would read, without styling.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.write_plain(&mut out);
        out
    }

    fn write_plain(&self, out: &mut String) {
        out.push_str(&self.text);
        if let Some(key) = &self.translate {
            let args: Vec<String> = self.with.iter().map(Component::plain_text).collect();
            match translation_format(key) {
                Some(format) => out.push_str(&apply_format(format, &args)),
                None => out.push_str(key),
            }
        }
        for child in &self.extra {
            child.write_plain(out);
        }
    }
}

/// Substitute `%s` and `%N$s` placeholders; `%%` is a literal percent sign.
pub fn apply_format(format: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(format.len());
    let mut next = 0;
    let mut rest = format;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];

        if let Some(after) = tail.strip_prefix('%') {
            out.push('%');
            rest = after;
        } else if let Some(after) = tail.strip_prefix('s') {
            if let Some(arg) = args.get(next) {
                out.push_str(arg);
            }
            next += 1;
            rest = after;
        } else {
            let digits: String = tail.chars().take_while(|c| c.is_ascii_digit()).collect();
            let positional = tail[digits.len()..].strip_prefix("$s");
            match (digits.parse::<usize>(), positional) {
                (Ok(index), Some(after)) if index > 0 => {
                    if let Some(arg) = args.get(index - 1) {
                        out.push_str(arg);
                    }
                    rest = after;
                }
                _ => {
                    out.push('%');
                    rest = tail;
                }
            }
        }
    }

    out.push_str(rest);
    out
}

pub(crate) fn deserialize_node<'de, D>(deserializer: D) -> Result<Component, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Component::from_value(value).map_err(D::Error::custom)
}

pub(crate) fn deserialize_optional_node<'de, D>(
    deserializer: D,
) -> Result<Option<Box<Component>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(value) => Component::from_value(value)
            .map(|node| Some(Box::new(node)))
            .map_err(D::Error::custom),
        None => Ok(None),
    }
}

fn deserialize_nodes<'de, D>(deserializer: D) -> Result<Vec<Component>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<Value>::deserialize(deserializer)?
        .into_iter()
        .map(|value| Component::from_value(value).map_err(D::Error::custom))
        .collect()
}
