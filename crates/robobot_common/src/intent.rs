//! Rule-based intent resolver for mock mode.
//!
//! An ordered list of rules is evaluated over the trimmed, lowercased message.
//! The first rule that fires produces the reply; later rules are not consulted.
//! Order matters: "oi, abrir chamado" is a ticket request, not a greeting.

use crate::knowledge::KnowledgeBase;
use crate::matcher::MatchOptions;
use crate::random::RandomSource;
use crate::types::{ChatAction, ReplyMeta, Resolution};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

pub const TEST_PROBE: &str = "teste";
pub const TEST_REPLY: &str = "🧩 Modo teste: o servidor está funcionando perfeitamente!";

pub const TICKET_PHRASES: &[&str] = &["abrir chamado", "criar ticket", "abrir ticket"];

pub const ORDER_STATUS_PHRASE: &str = "status do pedido";
/// Simulated order every status query reports on
pub const DEMO_ORDER_ID: &str = "1234";
pub const ORDER_STATUS_REPLY: &str =
    "O pedido #1234 está em transporte e deve chegar em 3 dias úteis.";

pub const GREETING_TOKENS: &[&str] = &["olá", "oi", "bom dia", "boa tarde", "boa noite", "fala"];
pub const GREETING_REPLY: &str = "Olá! Eu sou o RobôBot. Como posso ajudar você hoje?";

pub const PRICING_TOKENS: &[&str] = &["preço", "valor", "custo"];
pub const PRICING_REPLY: &str =
    "Temos planos que começam em R$ 39/mês. Quer que eu envie os detalhes por e-mail?";

pub const FALLBACK_REPLIES: [&str; 3] = [
    "Desculpe — não entendi completamente. Pode dizer de outro jeito?",
    "Posso ajudar com: 'abrir chamado', 'préços', 'horário de atendimento' ou 'status do pedido'.",
    "Ainda não sei isso, quer que eu crie um chamado para a equipe humana?",
];

/// Which rule answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Test,
    CreateTicket,
    CheckOrder,
    SmallTalk,
    Knowledge,
    Pricing,
    Fallback,
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Test => "test",
            Self::CreateTicket => "create_ticket",
            Self::CheckOrder => "check_order",
            Self::SmallTalk => "small_talk",
            Self::Knowledge => "kb",
            Self::Pricing => "pricing",
            Self::Fallback => "fallback",
        };
        write!(f, "{}", s)
    }
}

/// Normalize a message the way every rule sees it
pub fn normalize(message: &str) -> String {
    message.trim().to_lowercase()
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

pub fn is_test_probe(text: &str) -> bool {
    text == TEST_PROBE
}

pub fn wants_ticket(text: &str) -> bool {
    contains_any(text, TICKET_PHRASES)
}

pub fn asks_order_status(text: &str) -> bool {
    text.contains(ORDER_STATUS_PHRASE) || (text.contains("status") && text.contains("pedido"))
}

pub fn is_greeting(text: &str) -> bool {
    contains_any(text, GREETING_TOKENS)
}

pub fn asks_pricing(text: &str) -> bool {
    contains_any(text, PRICING_TOKENS)
}

/// Format a ticket id, e.g. `T-4821`
pub fn ticket_id(number: u16) -> String {
    format!("T-{}", number)
}

/// What a rule can see while deciding
struct RuleContext<'a> {
    knowledge: &'a KnowledgeBase,
    match_options: &'a MatchOptions,
    random: &'a dyn RandomSource,
}

/// Returns a resolution when the rule fires
type RuleFn = fn(&RuleContext<'_>, &str) -> Option<Resolution>;

struct Rule {
    intent: Intent,
    apply: RuleFn,
}

/// Evaluation order; first hit wins
const RULES: &[Rule] = &[
    Rule {
        intent: Intent::Test,
        apply: test_rule,
    },
    Rule {
        intent: Intent::CreateTicket,
        apply: ticket_rule,
    },
    Rule {
        intent: Intent::CheckOrder,
        apply: order_rule,
    },
    Rule {
        intent: Intent::SmallTalk,
        apply: greeting_rule,
    },
    Rule {
        intent: Intent::Knowledge,
        apply: knowledge_rule,
    },
    Rule {
        intent: Intent::Pricing,
        apply: pricing_rule,
    },
    Rule {
        intent: Intent::Fallback,
        apply: fallback_rule,
    },
];

fn test_rule(_ctx: &RuleContext<'_>, text: &str) -> Option<Resolution> {
    is_test_probe(text).then(|| Resolution::new(TEST_REPLY, ReplyMeta::Test))
}

fn ticket_rule(ctx: &RuleContext<'_>, text: &str) -> Option<Resolution> {
    if !wants_ticket(text) {
        return None;
    }
    let id = ticket_id(ctx.random.ticket_number());
    let reply = format!(
        "✅ Chamado criado com sucesso. ID: {}. Nosso time responderá em até 24h.",
        id
    );
    Some(Resolution::new(
        reply,
        ReplyMeta::Action(ChatAction::CreateTicket { ticket_id: id }),
    ))
}

fn order_rule(_ctx: &RuleContext<'_>, text: &str) -> Option<Resolution> {
    asks_order_status(text).then(|| {
        Resolution::new(
            ORDER_STATUS_REPLY,
            ReplyMeta::Action(ChatAction::CheckOrder {
                order_id: DEMO_ORDER_ID.to_string(),
            }),
        )
    })
}

fn greeting_rule(_ctx: &RuleContext<'_>, text: &str) -> Option<Resolution> {
    is_greeting(text).then(|| Resolution::new(GREETING_REPLY, ReplyMeta::SmallTalk))
}

fn knowledge_rule(ctx: &RuleContext<'_>, text: &str) -> Option<Resolution> {
    let hit = ctx.knowledge.lookup(text, ctx.match_options)?;
    // An entry without an answer does not count as a hit
    if hit.answer.trim().is_empty() {
        return None;
    }
    Some(Resolution::new(
        hit.answer,
        ReplyMeta::Kb {
            matched_q: hit.question,
        },
    ))
}

fn pricing_rule(_ctx: &RuleContext<'_>, text: &str) -> Option<Resolution> {
    asks_pricing(text).then(|| Resolution::new(PRICING_REPLY, ReplyMeta::Pricing))
}

fn fallback_rule(ctx: &RuleContext<'_>, _text: &str) -> Option<Resolution> {
    let reply = FALLBACK_REPLIES[ctx.random.pick(FALLBACK_REPLIES.len())];
    Some(Resolution::new(reply, ReplyMeta::Fallback))
}

/// Mock-mode reply generator
pub struct IntentResolver {
    knowledge: Arc<KnowledgeBase>,
    match_options: MatchOptions,
    random: Arc<dyn RandomSource>,
}

impl IntentResolver {
    pub fn new(
        knowledge: Arc<KnowledgeBase>,
        match_options: MatchOptions,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            knowledge,
            match_options,
            random,
        }
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Rule names in evaluation order
    pub fn intent_names() -> Vec<Intent> {
        RULES.iter().map(|r| r.intent).collect()
    }

    /// Resolve a message into a reply; always succeeds thanks to the fallback
    pub fn resolve(&self, message: &str) -> Resolution {
        self.resolve_with_intent(message).1
    }

    /// Like [`resolve`](Self::resolve), also reporting which rule fired
    pub fn resolve_with_intent(&self, message: &str) -> (Intent, Resolution) {
        let text = normalize(message);
        let ctx = RuleContext {
            knowledge: &self.knowledge,
            match_options: &self.match_options,
            random: self.random.as_ref(),
        };

        for rule in RULES {
            if let Some(resolution) = (rule.apply)(&ctx, &text) {
                debug!("Intent resolved: {}", rule.intent);
                return (rule.intent, resolution);
            }
        }

        // Unreachable while the fallback rule is last
        (
            Intent::Fallback,
            Resolution::new(FALLBACK_REPLIES[0], ReplyMeta::Fallback),
        )
    }
}
