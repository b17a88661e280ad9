//! FAQ knowledge base backed by a JSON file.
//!
//! The file is a JSON array of `{"q": ..., "a": ...}` objects. When it does
//! not exist a small demo set is written so the service answers something
//! out of the box. The KB is read once and never reloaded.

use crate::error::{ChatError, Result};
use crate::matcher::{close_matches, MatchOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};

/// Default knowledge-base file name
pub const DEFAULT_KB_FILE: &str = "kb.json";

/// One question/answer pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KbEntry {
    #[serde(rename = "q")]
    pub question: String,
    #[serde(rename = "a")]
    pub answer: String,
}

impl KbEntry {
    pub fn new(question: &str, answer: &str) -> Self {
        Self {
            question: question.to_string(),
            answer: answer.to_string(),
        }
    }
}

/// Result of a successful lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KbMatch {
    pub answer: String,
    /// The stored question, as written in the KB
    pub question: String,
}

/// Seed entries written when no KB file exists
pub fn demo_entries() -> Vec<KbEntry> {
    vec![
        KbEntry::new(
            "horário de atendimento",
            "Nosso horário é Segunda a Sexta das 9h às 18h.",
        ),
        KbEntry::new(
            "preço do plano básico",
            "O plano básico custa R$ 39/mês. Temos descontos para annual.",
        ),
        KbEntry::new(
            "como cancelar",
            "Para cancelar, acesse sua conta > Configurações > Cancelar assinatura.",
        ),
    ]
}

#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    entries: Vec<KbEntry>,
    /// Lowercased questions, same order as `entries`
    keys: Vec<String>,
}

impl KnowledgeBase {
    /// Build from in-memory entries
    pub fn from_entries(entries: Vec<KbEntry>) -> Self {
        let keys = entries.iter().map(|e| e.question.to_lowercase()).collect();
        Self { entries, keys }
    }

    /// Load the KB from `path`, seeding it with [`demo_entries`] if missing
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            let demo = demo_entries();
            Self::write_entries(path, &demo)?;
            warn!(
                "Knowledge base not found, created demo set at {}",
                path.display()
            );
            return Ok(Self::from_entries(demo));
        }

        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::InvalidData => ChatError::knowledge_base(path, "not valid UTF-8"),
            _ => ChatError::Io(e),
        })?;
        let entries: Vec<KbEntry> = serde_json::from_str(&content)
            .map_err(|e| ChatError::knowledge_base(path, format!("malformed JSON: {}", e)))?;

        if let Some(pos) = entries.iter().position(|e| e.question.trim().is_empty()) {
            return Err(ChatError::knowledge_base(
                path,
                format!("entry {} has an empty question", pos),
            ));
        }

        info!(
            "Loaded {} knowledge base entries from {}",
            entries.len(),
            path.display()
        );
        Ok(Self::from_entries(entries))
    }

    fn write_entries(path: &Path, entries: &[KbEntry]) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(entries)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn entries(&self) -> &[KbEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Closest question to `query`, compared case-insensitively
    pub fn lookup(&self, query: &str, opts: &MatchOptions) -> Option<KbMatch> {
        let query = query.to_lowercase();
        let best = close_matches(&query, &self.keys, opts).into_iter().next()?;
        let entry = &self.entries[best.index];
        Some(KbMatch {
            answer: entry.answer.clone(),
            question: entry.question.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_bootstrap_creates_demo_set() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kb.json");

        let kb = KnowledgeBase::load(&path).unwrap();
        assert_eq!(kb.len(), 3);
        assert_eq!(kb.entries(), demo_entries().as_slice());
        assert!(path.exists());

        // Written file parses back to the same three entries
        let on_disk: Vec<KbEntry> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk, demo_entries());
        assert_eq!(on_disk[0].question, "horário de atendimento");
        assert_eq!(on_disk[1].question, "preço do plano básico");
        assert_eq!(on_disk[2].question, "como cancelar");
    }

    #[test]
    fn test_bootstrap_after_delete() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kb.json");

        fs::write(&path, r#"[{"q": "wifi", "a": "Senha: robobot"}]"#).unwrap();
        assert_eq!(KnowledgeBase::load(&path).unwrap().len(), 1);

        fs::remove_file(&path).unwrap();
        let kb = KnowledgeBase::load(&path).unwrap();
        assert_eq!(kb.entries(), demo_entries().as_slice());
    }

    #[test]
    fn test_bootstrap_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data").join("kb.json");
        KnowledgeBase::load(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_load_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kb.json");
        fs::write(
            &path,
            r#"[
                {"q": "Formas de Pagamento", "a": "Aceitamos cartão e pix."},
                {"q": "prazo de entrega", "a": "Entregamos em até 5 dias úteis."}
            ]"#,
        )
        .unwrap();

        let kb = KnowledgeBase::load(&path).unwrap();
        assert_eq!(kb.len(), 2);

        // Mixed-case stored question still matches a lowercase query
        let hit = kb
            .lookup("formas de pagamento?", &MatchOptions::default())
            .unwrap();
        assert_eq!(hit.answer, "Aceitamos cartão e pix.");
        assert_eq!(hit.question, "Formas de Pagamento");

        assert!(kb.lookup("xyz123", &MatchOptions::default()).is_none());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kb.json");
        fs::write(&path, "{not json").unwrap();

        let err = KnowledgeBase::load(&path).unwrap_err();
        assert!(matches!(err, ChatError::KnowledgeBase { .. }));
        assert!(err.is_config());

        // Never silently replaced by the demo set
        assert_eq!(fs::read_to_string(&path).unwrap(), "{not json");
    }

    #[test]
    fn test_invalid_utf8_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kb.json");
        fs::write(&path, b"[{\"q\": \"\xff\", \"a\": \"x\"}]").unwrap();

        let err = KnowledgeBase::load(&path).unwrap_err();
        assert!(err.is_config());
        match err {
            ChatError::KnowledgeBase { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_question_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kb.json");
        fs::write(&path, r#"[{"q": "  ", "a": "nada"}]"#).unwrap();

        let err = KnowledgeBase::load(&path).unwrap_err();
        assert!(err.to_string().contains("empty question"));
    }

    #[test]
    fn test_lookup_demo_set() {
        let kb = KnowledgeBase::from_entries(demo_entries());
        let opts = MatchOptions::default();

        let hit = kb.lookup("Horário de atendimento?", &opts).unwrap();
        assert_eq!(hit.question, "horário de atendimento");
        assert_eq!(hit.answer, "Nosso horário é Segunda a Sexta das 9h às 18h.");

        let hit = kb.lookup("quero cancelar", &opts).unwrap();
        assert_eq!(hit.question, "como cancelar");

        assert!(kb.lookup("qual o custo?", &opts).is_none());
    }

    #[test]
    fn test_lookup_respects_cutoff() {
        let kb = KnowledgeBase::from_entries(demo_entries());
        // "custo do plano" scores ~0.57 against "preço do plano básico"
        assert!(kb.lookup("custo do plano", &MatchOptions::default()).is_some());
        assert!(kb
            .lookup("custo do plano", &MatchOptions::new(1, 0.8).unwrap())
            .is_none());
    }
}
