//! Core data model shared by the resolver, the gate and the daemon.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which branch of the mode gate produced a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationMode {
    /// Heuristic replies from the intent resolver
    Mock,
    /// Delegated to the external provider (placeholder)
    Openai,
    /// Real mode requested but nothing is configured
    Disabled,
}

impl std::fmt::Display for ConversationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Mock => "mock",
            Self::Openai => "openai",
            Self::Disabled => "disabled",
        };
        write!(f, "{}", s)
    }
}

/// Simulated action triggered by a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ChatAction {
    CreateTicket { ticket_id: String },
    CheckOrder { order_id: String },
}

/// How a heuristic reply was produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplyMeta {
    Test,
    Action(ChatAction),
    SmallTalk,
    Kb { matched_q: String },
    Pricing,
    Fallback,
}

impl ReplyMeta {
    /// Wire name of the `type` discriminator
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::Action(_) => "action",
            Self::SmallTalk => "small_talk",
            Self::Kb { .. } => "kb",
            Self::Pricing => "pricing",
            Self::Fallback => "fallback",
        }
    }
}

/// Metadata returned with every chat reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatMeta {
    Reply(ReplyMeta),
    Mode { mode: ConversationMode },
}

impl ChatMeta {
    pub fn mode(mode: ConversationMode) -> Self {
        ChatMeta::Mode { mode }
    }
}

impl From<ReplyMeta> for ChatMeta {
    fn from(meta: ReplyMeta) -> Self {
        ChatMeta::Reply(meta)
    }
}

/// Reply text plus the descriptor of the rule that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub reply: String,
    pub meta: ReplyMeta,
}

impl Resolution {
    pub fn new(reply: impl Into<String>, meta: ReplyMeta) -> Self {
        Self {
            reply: reply.into(),
            meta,
        }
    }
}

/// One line of the conversation log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    #[serde(rename = "ts")]
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    pub message: String,
    pub reply: String,
    pub mode: ConversationMode,
}

impl ConversationRecord {
    pub fn new(user_id: &str, message: &str, reply: &str, mode: ConversationMode) -> Self {
        Self {
            timestamp: Utc::now(),
            user_id: user_id.to_string(),
            message: message.to_string(),
            reply: reply.to_string(),
            mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reply_meta_wire_shapes() {
        assert_eq!(serde_json::to_value(ReplyMeta::Test).unwrap(), json!({"type": "test"}));
        assert_eq!(
            serde_json::to_value(ReplyMeta::Action(ChatAction::CreateTicket {
                ticket_id: "T-1000".to_string()
            }))
            .unwrap(),
            json!({"type": "action", "action": "create_ticket", "ticket_id": "T-1000"})
        );
        assert_eq!(
            serde_json::to_value(ReplyMeta::Kb {
                matched_q: "como cancelar".to_string()
            })
            .unwrap(),
            json!({"type": "kb", "matched_q": "como cancelar"})
        );
        assert_eq!(
            serde_json::to_value(ReplyMeta::SmallTalk).unwrap(),
            json!({"type": "small_talk"})
        );
    }

    #[test]
    fn test_chat_meta_mode_shape() {
        let meta = ChatMeta::mode(ConversationMode::Disabled);
        assert_eq!(serde_json::to_value(&meta).unwrap(), json!({"mode": "disabled"}));
    }

    #[test]
    fn test_chat_meta_parses_both_shapes() {
        let reply: ChatMeta =
            serde_json::from_value(json!({"type": "action", "action": "check_order", "order_id": "1234"}))
                .unwrap();
        assert_eq!(
            reply,
            ChatMeta::Reply(ReplyMeta::Action(ChatAction::CheckOrder {
                order_id: "1234".to_string()
            }))
        );

        let mode: ChatMeta = serde_json::from_value(json!({"mode": "openai"})).unwrap();
        assert_eq!(mode, ChatMeta::mode(ConversationMode::Openai));
    }

    #[test]
    fn test_record_timestamp_is_utc_z() {
        let record = ConversationRecord::new("anon", "oi", "Olá!", ConversationMode::Mock);
        let value = serde_json::to_value(&record).unwrap();
        let ts = value["ts"].as_str().unwrap();
        assert!(ts.ends_with('Z'), "timestamp should be UTC: {}", ts);
        assert_eq!(value["mode"], "mock");
        assert_eq!(value["user_id"], "anon");
    }
}
