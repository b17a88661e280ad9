//! Per-request choice between heuristic and external replies.
//!
//! | credential | mock mode | branch   |
//! |------------|-----------|----------|
//! | yes        | off       | openai   |
//! | any        | on        | mock     |
//! | no         | off       | disabled |
//!
//! Every branch appends one conversation record before returning.

use crate::config::ChatConfig;
use crate::conversation_log::{safe_append, ConversationLogger, ConversationSink};
use crate::error::Result;
use crate::intent::IntentResolver;
use crate::knowledge::KnowledgeBase;
use crate::provider::{ExternalProvider, HeuristicProvider, PlaceholderProvider};
use crate::random::ThreadRandom;
use crate::schemas::ANONYMOUS_USER;
use crate::types::{ChatMeta, ConversationMode, ConversationRecord};
use std::sync::Arc;
use tracing::{info, warn};

pub const DISABLED_REPLY: &str =
    "⚠️ Modo real não habilitado. Configure USE_MOCK=false e a integração com LLM.";

/// Outcome of one gated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateReply {
    pub reply: String,
    pub meta: ChatMeta,
    pub mode: ConversationMode,
    /// False when the conversation record could not be written
    pub logged: bool,
}

pub struct ModeGate {
    heuristic: HeuristicProvider,
    external: Arc<dyn ExternalProvider>,
    sink: Arc<dyn ConversationSink>,
    use_mock: bool,
    /// Configured API key, used when the request carries none
    default_credential: Option<String>,
}

impl ModeGate {
    pub fn new(
        heuristic: HeuristicProvider,
        external: Arc<dyn ExternalProvider>,
        sink: Arc<dyn ConversationSink>,
        use_mock: bool,
        default_credential: Option<String>,
    ) -> Self {
        Self {
            heuristic,
            external,
            sink,
            use_mock,
            default_credential: default_credential.filter(|c| !c.trim().is_empty()),
        }
    }

    /// Production wiring: KB and log file from config, thread RNG,
    /// placeholder external provider. Fails if the KB cannot be loaded.
    pub fn from_config(config: &ChatConfig) -> Result<Self> {
        let knowledge = Arc::new(KnowledgeBase::load(&config.storage.kb_file)?);
        let resolver = IntentResolver::new(
            knowledge,
            config.matcher.options()?,
            Arc::new(ThreadRandom),
        );
        Ok(Self::new(
            HeuristicProvider::new(resolver),
            Arc::new(PlaceholderProvider),
            Arc::new(ConversationLogger::new(&config.storage.log_file)),
            config.mode.use_mock,
            config.mode.api_key.clone(),
        ))
    }

    pub fn is_mock(&self) -> bool {
        self.use_mock
    }

    pub fn heuristic(&self) -> &HeuristicProvider {
        &self.heuristic
    }

    /// Per-request credential wins over the configured one; blanks count as absent
    fn effective_credential<'a>(&'a self, supplied: Option<&'a str>) -> Option<&'a str> {
        supplied
            .filter(|c| !c.trim().is_empty())
            .or(self.default_credential.as_deref())
    }

    pub fn handle(
        &self,
        message: &str,
        user_id: Option<&str>,
        supplied_credential: Option<&str>,
    ) -> GateReply {
        let user_id = user_id
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(ANONYMOUS_USER);

        let (reply, meta, mode) = match self.effective_credential(supplied_credential) {
            Some(credential) if !self.use_mock => {
                match self.external.generate(message, credential) {
                    Ok(reply) => (
                        reply,
                        ChatMeta::mode(ConversationMode::Openai),
                        ConversationMode::Openai,
                    ),
                    Err(e) => {
                        warn!("External provider failed, replying as disabled: {}", e);
                        disabled()
                    }
                }
            }
            _ if self.use_mock => {
                let resolution = self.heuristic.generate(message);
                (
                    resolution.reply,
                    ChatMeta::Reply(resolution.meta),
                    ConversationMode::Mock,
                )
            }
            _ => disabled(),
        };

        info!("Chat reply for {} via {} mode", user_id, mode);

        let record = ConversationRecord::new(user_id, message, &reply, mode);
        let logged = safe_append(self.sink.as_ref(), &record);

        GateReply {
            reply,
            meta,
            mode,
            logged,
        }
    }
}

fn disabled() -> (String, ChatMeta, ConversationMode) {
    (
        DISABLED_REPLY.to_string(),
        ChatMeta::mode(ConversationMode::Disabled),
        ConversationMode::Disabled,
    )
}
