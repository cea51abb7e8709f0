//! # Persistência — Base de Conhecimento e Log de Resultados
//!
//! Serializa/desserializa a [`KnowledgeBase`] como JSON e mantém um log
//! append-only das inferências executadas.
//!
//! ## Formato de Armazenamento
//!
//! A KB é salva como JSON "pretty-printed" para facilitar edição manual.
//! O índice de fatos é `#[serde(skip)]` e reconstruído após o load via
//! [`KnowledgeBase::rebuild_index()`].
//!
//! ## Escrita
//!
//! A gravação escreve em `<arquivo>.tmp` e renomeia por cima do original,
//! para que um crash no meio da escrita não corrompa a base.
//!
//! ## Log de Resultados
//!
//! Cada inferência gera uma linha JSON em `data/resultados.jsonl`:
//!
//! ```json
//! {"run_id":"…","at":"2026-…Z","selected":["1","6"],"conclusions":["Gastrite"],"trace":["…"],"status":"Concluded"}
//! ```

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::core::{seed, Domain, KnowledgeBase};
use crate::inference::Inference;

/// Salva a KnowledgeBase em disco como JSON pretty-printed.
///
/// Cria o diretório pai se não existir.
///
/// # Erros
///
/// Retorna erro se não conseguir criar o diretório, serializar,
/// escrever o arquivo temporário ou renomeá-lo.
pub fn save_kb(kb: &KnowledgeBase, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Falha ao criar diretório {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(kb).context("Falha ao serializar KnowledgeBase")?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)
        .with_context(|| format!("Falha ao escrever {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Falha ao substituir {}", path.display()))?;
    Ok(())
}

/// Carrega a KnowledgeBase de um arquivo existente.
///
/// # Erros
///
/// Retorna erro se o arquivo não puder ser lido, estiver corrompido ou
/// tiver ids de regra repetidos ou esgotados.
pub fn load_kb(path: &Path) -> Result<KnowledgeBase> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Falha ao ler {}", path.display()))?;
    let mut kb: KnowledgeBase = serde_json::from_str(&json)
        .with_context(|| format!("Falha ao desserializar {}", path.display()))?;
    kb.rebuild_index()
        .with_context(|| format!("Ids de regra inválidos em {}", path.display()))?;
    Ok(kb)
}

/// Carrega a KB do disco ou, se o arquivo não existir, semeia o domínio
/// e grava a base inicial.
///
/// Um arquivo existente mas corrompido é **erro**: ele não é sobrescrito.
pub fn load_or_seed(path: &Path, domain: Domain) -> Result<KnowledgeBase> {
    if path.exists() {
        return load_kb(path);
    }
    tracing::info!(path = %path.display(), "Nenhuma KB encontrada, semeando");
    let kb = seed(domain);
    save_kb(&kb, path)?;
    Ok(kb)
}

/// Linha do log de resultados.
#[derive(Debug, Serialize)]
pub struct ResultRecord {
    pub run_id: Uuid,
    pub at: DateTime<Utc>,
    pub selected: Vec<String>,
    pub conclusions: Vec<String>,
    /// Linhas do trace, na ordem do raciocínio.
    pub trace: Vec<String>,
    pub status: String,
}

impl ResultRecord {
    pub fn from_inference(inference: &Inference) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            at: Utc::now(),
            selected: inference.selected.iter().map(ToString::to_string).collect(),
            conclusions: inference
                .results
                .iter()
                .map(|c| c.conclusion_name.clone())
                .collect(),
            trace: inference.trace_lines(),
            status: format!("{:?}", inference.status),
        }
    }
}

/// Acrescenta uma linha JSON ao log de resultados.
pub fn append_result(path: &Path, record: &ResultRecord) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Falha ao criar diretório {}", parent.display()))?;
    }
    let line = serde_json::to_string(record).context("Falha ao serializar resultado")?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Falha ao abrir {}", path.display()))?;
    writeln!(file, "{line}").with_context(|| format!("Falha ao escrever {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FactId;
    use crate::inference::{EngineSettings, InferenceEngine};
    use crate::store::RuleSnapshot;
    use tempfile::TempDir;

    #[test]
    fn test_load_or_seed_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("kb.json");
        let kb = load_or_seed(&path, Domain::Diagnosis).unwrap();
        assert!(path.exists());
        assert_eq!(kb.rule_count(), 12);

        let again = load_or_seed(&path, Domain::Books).unwrap();
        assert_eq!(again.title, kb.title);
    }

    /// Arquivo corrompido não é sobrescrito pela semente
    #[test]
    fn test_corrupt_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kb.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(load_or_seed(&path, Domain::Diagnosis).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    /// Ids repetidos ou no limite de `u32` abortam o load com contexto
    #[test]
    fn test_load_rejects_bad_rule_ids() {
        let dir = TempDir::new().unwrap();
        let row = |id: u64| {
            serde_json::json!({"id": id, "premises": "1", "conclusion": "101", "description": ""})
        };
        for (name, ids) in [("max.json", [1u64, 4_294_967_295]), ("dup.json", [2, 2])] {
            let path = dir.path().join(name);
            let kb = serde_json::json!({
                "title": "manual",
                "facts": [],
                "rules": ids.iter().map(|&id| row(id)).collect::<Vec<_>>(),
            });
            std::fs::write(&path, kb.to_string()).unwrap();
            let err = load_kb(&path).unwrap_err();
            assert!(format!("{err:#}").contains("Ids de regra inválidos"));
        }
    }

    #[test]
    fn test_append_result_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("resultados.jsonl");
        let inference = InferenceEngine::evaluate(
            &RuleSnapshot::default(),
            &[FactId::from(1)],
            EngineSettings::default(),
        );
        let record = ResultRecord::from_inference(&inference);
        append_result(&path, &record).unwrap();
        append_result(&path, &record).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed["status"], "NoConclusion");
        assert_eq!(parsed["selected"][0], "1");
    }
}
