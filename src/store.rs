//! # KnowledgeStore — Fronteira com a Base de Conhecimento
//!
//! O motor de inferência e o construtor de grafo **nunca** abrem arquivos
//! nem gerenciam armazenamento. Eles recebem um handle [`KnowledgeStore`]
//! injetado e leem dele um [`RuleSnapshot`] imutável por invocação.
//!
//! ## Parse na Fronteira
//!
//! As regras são persistidas com premissas em string delimitada (`"1,6,8,9"`).
//! [`KnowledgeStore::snapshot()`] faz o parse **aqui**, entregando ao motor:
//!
//! - `rules`: regras válidas, em ordem de id
//! - `malformed`: linhas rejeitadas (id + motivo), reportadas no trace
//! - `names`: tabela `id → nome` para resolver conclusões
//!
//! ## Implementação em Arquivo JSON
//!
//! [`JsonStore`] mantém a [`KnowledgeBase`] atrás de um `RwLock` e grava
//! cada alteração em disco via [`persistence::save_kb`]:
//!
//! ```text
//! snapshot()      → read lock → clona regras + nomes (atômico p/ escritas)
//! add/update/del  → write lock → clona KB → aplica → salva → troca
//! ```
//!
//! Se a gravação falhar, nem a memória nem o disco mudam.

use std::collections::HashMap;
use std::path::PathBuf;

use parking_lot::RwLock;

use crate::core::{FactEntry, FactId, KnowledgeBase, Rule, RuleDraft, RuleRow, UNKNOWN_NAME};
use crate::error::{RuleError, StoreError};
use crate::persistence;

/// Cópia imutável das regras e nomes, tirada uma vez por invocação.
#[derive(Clone, Debug, Default)]
pub struct RuleSnapshot {
    /// Regras válidas em ordem de id.
    pub rules: Vec<Rule>,
    /// Linhas que falharam no parse.
    pub malformed: Vec<(u32, RuleError)>,
    names: HashMap<FactId, String>,
}

impl RuleSnapshot {
    pub fn new(
        rules: Vec<Rule>,
        malformed: Vec<(u32, RuleError)>,
        names: HashMap<FactId, String>,
    ) -> Self {
        Self {
            rules,
            malformed,
            names,
        }
    }

    /// Snapshot só com regras, sem nomes registrados.
    #[cfg(test)]
    pub fn from_rules(rules: Vec<Rule>) -> Self {
        Self::new(rules, Vec::new(), HashMap::new())
    }

    /// Nome de exibição, ou [`UNKNOWN_NAME`] se o id não está registrado.
    pub fn resolve_name(&self, id: &FactId) -> &str {
        self.names.get(id).map_or(UNKNOWN_NAME, String::as_str)
    }

    /// Como [`resolve_name`](Self::resolve_name), mas devolve o próprio id
    /// quando não há nome. Usado em descrições geradas de regras.
    pub fn label<'a>(&'a self, id: &'a FactId) -> &'a str {
        self.names.get(id).map_or(id.as_str(), String::as_str)
    }
}

/// Operações que a base de conhecimento oferece ao núcleo e à interface.
///
/// Todas as leituras e escritas são síncronas. Falhas de acesso são
/// [`StoreError::Unavailable`]: nunca "zero regras".
pub trait KnowledgeStore: Send + Sync {
    /// Título da base, exibido na interface.
    fn title(&self) -> Result<String, StoreError>;

    /// `(fatos, regras)` registrados.
    fn counts(&self) -> Result<(usize, usize), StoreError>;

    /// Fatos selecionáveis, em ordem de registro: observações e todo fato
    /// usado como premissa de alguma regra.
    fn list_facts(&self) -> Result<Vec<FactEntry>, StoreError>;

    /// Diagnósticos/livros registrados.
    fn list_conclusions(&self) -> Result<Vec<FactEntry>, StoreError>;

    /// Linhas de regra no formato persistido, em ordem de id.
    fn list_rules(&self) -> Result<Vec<RuleRow>, StoreError>;

    /// Nome de exibição ou [`UNKNOWN_NAME`].
    fn resolve_fact_name(&self, id: &FactId) -> Result<String, StoreError>;

    fn add_rule(&self, draft: RuleDraft) -> Result<u32, StoreError>;

    fn update_rule(&self, id: u32, draft: RuleDraft) -> Result<(), StoreError>;

    fn delete_rule(&self, id: u32) -> Result<(), StoreError>;

    /// Regras já parseadas + tabela de nomes, em uma única leitura.
    fn snapshot(&self) -> Result<RuleSnapshot, StoreError>;
}

/// Base de conhecimento em memória, persistida em um arquivo JSON.
pub struct JsonStore {
    kb: RwLock<KnowledgeBase>,
    /// `None` = somente memória (testes).
    path: Option<PathBuf>,
}

impl JsonStore {
    pub fn new(kb: KnowledgeBase, path: PathBuf) -> Self {
        Self {
            kb: RwLock::new(kb),
            path: Some(path),
        }
    }

    /// Store sem arquivo: alterações ficam só em memória.
    #[cfg(test)]
    pub fn in_memory(kb: KnowledgeBase) -> Self {
        Self {
            kb: RwLock::new(kb),
            path: None,
        }
    }

    /// Aplica `op` a uma cópia da KB, persiste, e só então publica.
    fn mutate<T>(
        &self,
        op: impl FnOnce(&mut KnowledgeBase) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.kb.write();
        let mut next = guard.clone();
        let out = op(&mut next)?;
        if let Some(path) = &self.path {
            persistence::save_kb(&next, path).map_err(StoreError::Persist)?;
        }
        *guard = next;
        Ok(out)
    }
}

impl KnowledgeStore for JsonStore {
    fn title(&self) -> Result<String, StoreError> {
        Ok(self.kb.read().title.clone())
    }

    fn counts(&self) -> Result<(usize, usize), StoreError> {
        let kb = self.kb.read();
        Ok((kb.fact_count(), kb.rule_count()))
    }

    fn list_facts(&self) -> Result<Vec<FactEntry>, StoreError> {
        Ok(self.kb.read().selectable_facts().into_iter().cloned().collect())
    }

    fn list_conclusions(&self) -> Result<Vec<FactEntry>, StoreError> {
        Ok(self.kb.read().conclusions().into_iter().cloned().collect())
    }

    fn list_rules(&self) -> Result<Vec<RuleRow>, StoreError> {
        Ok(self.kb.read().rules.clone())
    }

    fn resolve_fact_name(&self, id: &FactId) -> Result<String, StoreError> {
        Ok(self.kb.read().resolve_name(id).to_string())
    }

    fn add_rule(&self, draft: RuleDraft) -> Result<u32, StoreError> {
        let id = self.mutate(|kb| kb.add_rule(draft))?;
        tracing::info!(id, "Regra adicionada");
        Ok(id)
    }

    fn update_rule(&self, id: u32, draft: RuleDraft) -> Result<(), StoreError> {
        self.mutate(|kb| kb.update_rule(id, draft))?;
        tracing::info!(id, "Regra atualizada");
        Ok(())
    }

    fn delete_rule(&self, id: u32) -> Result<(), StoreError> {
        self.mutate(|kb| kb.delete_rule(id))?;
        tracing::info!(id, "Regra removida");
        Ok(())
    }

    fn snapshot(&self) -> Result<RuleSnapshot, StoreError> {
        let kb = self.kb.read();
        let (rules, malformed) = kb.parsed_rules();
        for (id, err) in &malformed {
            tracing::warn!(id, error = %err, "Regra malformada na base");
        }
        Ok(RuleSnapshot::new(rules, malformed, kb.name_table()))
    }
}

/// Store que sempre falha, para exercitar os caminhos de indisponibilidade.
#[cfg(test)]
pub struct OfflineStore;

#[cfg(test)]
impl OfflineStore {
    fn down<T>() -> Result<T, StoreError> {
        Err(StoreError::Unavailable("offline".into()))
    }
}

#[cfg(test)]
impl KnowledgeStore for OfflineStore {
    fn title(&self) -> Result<String, StoreError> {
        Self::down()
    }
    fn counts(&self) -> Result<(usize, usize), StoreError> {
        Self::down()
    }
    fn list_facts(&self) -> Result<Vec<FactEntry>, StoreError> {
        Self::down()
    }
    fn list_conclusions(&self) -> Result<Vec<FactEntry>, StoreError> {
        Self::down()
    }
    fn list_rules(&self) -> Result<Vec<RuleRow>, StoreError> {
        Self::down()
    }
    fn resolve_fact_name(&self, _: &FactId) -> Result<String, StoreError> {
        Self::down()
    }
    fn add_rule(&self, _: RuleDraft) -> Result<u32, StoreError> {
        Self::down()
    }
    fn update_rule(&self, _: u32, _: RuleDraft) -> Result<(), StoreError> {
        Self::down()
    }
    fn delete_rule(&self, _: u32) -> Result<(), StoreError> {
        Self::down()
    }
    fn snapshot(&self) -> Result<RuleSnapshot, StoreError> {
        Self::down()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{seed, Domain};

    #[test]
    fn test_snapshot_is_isolated_from_later_writes() {
        let store = JsonStore::in_memory(seed(Domain::Diagnosis));
        let before = store.snapshot().unwrap();
        store
            .add_rule(RuleDraft::parse("13", "103", "icterícia").unwrap())
            .unwrap();
        assert_eq!(before.rules.len(), 12);
        assert_eq!(store.snapshot().unwrap().rules.len(), 13);
    }

    #[test]
    fn test_resolve_fact_name() {
        let store = JsonStore::in_memory(seed(Domain::Diagnosis));
        assert_eq!(
            store.resolve_fact_name(&FactId::from(105)).unwrap(),
            "Pancreatite"
        );
        assert_eq!(
            store.resolve_fact_name(&FactId::from(999)).unwrap(),
            UNKNOWN_NAME
        );
    }

    /// Uma alteração rejeitada não deixa rastro
    #[test]
    fn test_failed_mutation_leaves_state() {
        let store = JsonStore::in_memory(seed(Domain::Diagnosis));
        let draft = RuleDraft::parse("1", "101", "").unwrap();
        assert!(matches!(
            store.update_rule(77, draft),
            Err(StoreError::RuleNotFound(77))
        ));
        assert_eq!(store.list_rules().unwrap().len(), 12);
    }

    /// Cada alteração é gravada no arquivo
    #[test]
    fn test_mutations_are_persisted() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("kb.json");
        let store = JsonStore::new(seed(Domain::Books), path.clone());
        let id = store
            .add_rule(RuleDraft::parse("detetive", "suspense", "").unwrap())
            .unwrap();
        store.delete_rule(1).unwrap();

        let reloaded = persistence::load_kb(&path).unwrap();
        assert!(reloaded.rule(id).is_some());
        assert!(reloaded.rule(1).is_none());
    }

    /// Uma conclusão reaproveitada como premissa passa a ser selecionável
    #[test]
    fn test_list_facts_includes_premise_conclusions() {
        let store = JsonStore::in_memory(KnowledgeBase::new("Livros", true));
        store
            .add_rule(RuleDraft::parse("robôs", "ficção científica", "").unwrap())
            .unwrap();
        let names = |store: &JsonStore| -> Vec<String> {
            store.list_facts().unwrap().into_iter().map(|f| f.name).collect()
        };
        assert_eq!(names(&store), vec!["robôs"]);

        store
            .add_rule(RuleDraft::parse("ficção científica,século XX", "Fundação", "").unwrap())
            .unwrap();
        assert_eq!(names(&store), vec!["robôs", "ficção científica", "século XX"]);
        assert_eq!(store.counts().unwrap(), (4, 2));
    }

    #[test]
    fn test_snapshot_reports_malformed_rows() {
        let mut kb = seed(Domain::Diagnosis);
        kb.rules.push(RuleRow {
            id: 50,
            premises: String::new(),
            conclusion: "101".into(),
            description: String::new(),
        });
        let store = JsonStore::in_memory(kb);
        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.malformed, vec![(50, RuleError::EmptyPremises)]);
        assert_eq!(snapshot.rules.len(), 12);
    }
}
