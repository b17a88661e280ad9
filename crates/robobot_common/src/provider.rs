//! Reply providers: the heuristic resolver and the external LLM seam.
//!
//! Only a placeholder external provider exists; it acknowledges the
//! credential without making any network call.

use crate::error::Result;
use crate::intent::IntentResolver;
use crate::types::Resolution;

/// Heuristic replies from the intent rules
pub struct HeuristicProvider {
    resolver: IntentResolver,
}

impl HeuristicProvider {
    pub fn new(resolver: IntentResolver) -> Self {
        Self { resolver }
    }

    pub fn generate(&self, message: &str) -> Resolution {
        self.resolver.resolve(message)
    }

    pub fn resolver(&self) -> &IntentResolver {
        &self.resolver
    }
}

/// Delegation to an external language-model provider
pub trait ExternalProvider: Send + Sync {
    fn generate(&self, message: &str, credential: &str) -> Result<String>;
}

/// Stand-in until a real provider is wired up
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderProvider;

impl ExternalProvider for PlaceholderProvider {
    fn generate(&self, _message: &str, credential: &str) -> Result<String> {
        Ok(format!(
            "✅ Modo inteligente ativado! Chave recebida: {}... (não mostrada toda por segurança)",
            credential_prefix(credential, 5)
        ))
    }
}

/// First `n` characters of a credential
pub fn credential_prefix(credential: &str, n: usize) -> String {
    credential.chars().take(n).collect()
}

/// Printable form of a credential: first and last 5 characters only
pub fn mask_credential(credential: &str) -> String {
    let chars: Vec<char> = credential.chars().collect();
    if chars.len() <= 10 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..5].iter().collect();
    let tail: String = chars[chars.len() - 5..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_shows_prefix_only() {
        let reply = PlaceholderProvider
            .generate("oi", "sk-abcdef123456")
            .unwrap();
        assert_eq!(
            reply,
            "✅ Modo inteligente ativado! Chave recebida: sk-ab... (não mostrada toda por segurança)"
        );
        assert!(!reply.contains("123456"));
    }

    #[test]
    fn test_short_credential_prefix() {
        assert_eq!(credential_prefix("abc", 5), "abc");
        assert_eq!(credential_prefix("çãõéíú", 5), "çãõéí");
    }

    #[test]
    fn test_mask_credential() {
        assert_eq!(mask_credential("sk-abcdefghijklmnop"), "sk-ab...lmnop");
        assert_eq!(mask_credential("short"), "*****");
    }
}
