//! Message and activity types shared by the ingestion pipeline.
//!
//! `RawMessage` is what the chat bridge hands us; `ParsedActivity` is what the
//! dashboard consumes. Serialized field names follow the dashboard's
//! Portuguese vocabulary (`autor`, `tipo`, `categoria`, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One field of a rich embed (`name: value`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    /// Field label
    pub name: String,
    /// Field body
    pub value: String,
}

/// Rich embed attached to a chat message. Some bridge configurations deliver
/// the whole log entry here instead of in `content`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    /// Embed title
    #[serde(default)]
    pub title: Option<String>,
    /// Embed body
    #[serde(default)]
    pub description: Option<String>,
    /// Structured fields
    #[serde(default)]
    pub fields: Vec<EmbedField>,
}

/// A chat-log line as delivered by the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMessage {
    /// Delivery id, unique per delivery (not per event)
    pub id: String,
    /// Account that posted the line, often the bridge itself
    pub author: String,
    /// Raw text
    pub content: String,
    /// When the line was posted
    pub timestamp: DateTime<Utc>,
    /// Optional embeds
    #[serde(default)]
    pub embeds: Vec<Embed>,
}

impl RawMessage {
    /// Creates a message without embeds.
    pub fn new(
        id: impl Into<String>,
        author: impl Into<String>,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            author: author.into(),
            content: content.into(),
            timestamp,
            embeds: Vec::new(),
        }
    }

    /// Content plus any embed text, one piece per line.
    ///
    /// Matchers and the fingerprint both scan this, so a log entry delivered as an
    /// embed is recognized exactly like one delivered as plain content.
    #[must_use]
    pub fn text(&self) -> String {
        if self.embeds.is_empty() {
            return self.content.clone();
        }

        let mut parts: Vec<&str> = Vec::new();
        if !self.content.trim().is_empty() {
            parts.push(&self.content);
        }
        let mut field_lines = Vec::new();
        for embed in &self.embeds {
            if let Some(title) = embed.title.as_deref() {
                parts.push(title);
            }
            if let Some(description) = embed.description.as_deref() {
                parts.push(description);
            }
            for field in &embed.fields {
                field_lines.push(format!("{}: {}", field.name, field.value));
            }
        }

        let mut text = parts.join("\n");
        for line in field_lines {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(&line);
        }
        text
    }
}

/// What happened, when a matcher recognized the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    /// Item put into the shared inventory
    Adicionar,
    /// Item taken out of the shared inventory
    Remover,
    /// Cash deposited in the organization safe
    Deposito,
    /// Cash withdrawn from the organization safe
    Saque,
    /// Animals sold at the slaughterhouse
    Venda,
}

impl ActivityType {
    /// Stable lowercase name, as stored and serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Adicionar => "adicionar",
            Self::Remover => "remover",
            Self::Deposito => "deposito",
            Self::Saque => "saque",
            Self::Venda => "venda",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dashboard grouping. Always set, even for unrecognized lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Inventory movements
    Inventario,
    /// Cash and sales
    Financeiro,
    /// Anything else
    Sistema,
}

impl Category {
    /// Stable lowercase name, as stored and serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inventario => "inventario",
            Self::Financeiro => "financeiro",
            Self::Sistema => "sistema",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How much to trust a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Nothing to go on (empty line)
    None,
    /// No keyword matched
    Low,
    /// Category guessed from keywords
    Medium,
    /// A matcher extracted every field
    High,
}

impl Confidence {
    /// Stable lowercase name, as stored and serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured result of classifying one `RawMessage`. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedActivity {
    /// Id of the source message
    pub id: String,
    /// Timestamp of the source message
    pub timestamp: DateTime<Utc>,
    /// Player responsible for the event
    #[serde(rename = "autor")]
    pub author: String,
    /// Original text, kept for audit
    pub content: String,
    /// Event type, only when a matcher succeeded
    #[serde(rename = "tipo", skip_serializing_if = "Option::is_none", default)]
    pub kind: Option<ActivityType>,
    /// Dashboard grouping
    #[serde(rename = "categoria")]
    pub category: Category,
    /// Canonical item name
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub item: Option<String>,
    /// Item or animal count
    #[serde(rename = "quantidade", skip_serializing_if = "Option::is_none", default)]
    pub quantity: Option<u32>,
    /// Money involved
    #[serde(rename = "valor", skip_serializing_if = "Option::is_none", default)]
    pub amount: Option<f64>,
    /// Short summary
    #[serde(rename = "descricao", skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    /// What the dashboard shows; always populated
    pub display_text: String,
    /// Whether a matcher recognized the line
    pub parse_success: bool,
    /// Trust level of the classification
    pub confidence: Confidence,
}
