//! # KnowledgeBase — Tabelas de Fatos e Regras
//!
//! A [`KnowledgeBase`] guarda, em memória, as duas tabelas do sistema
//! especialista:
//!
//! - **Fatos nomeados** (`facts`): sintomas/características selecionáveis e
//!   diagnósticos/livros que só aparecem como conclusão ([`FactKind`])
//! - **Regras** (`rules`): linhas [`RuleRow`] no formato persistido, em ordem de id
//!
//! ## Índice por Identificador
//!
//! O campo `index` (`FactId → posição em facts`) é construído em memória e
//! **não é serializado** (`#[serde(skip)]`). Após desserialização deve ser
//! reconstruído via [`rebuild_index()`](KnowledgeBase::rebuild_index), que
//! também recalcula o próximo id de regra e recusa ids repetidos ou um
//! id igual a `u32::MAX` (não sobraria id para a próxima regra).
//!
//! ## Identificadores Autonomeados
//!
//! No domínio de livros os identificadores já são textos legíveis
//! ("ficção científica"). Com `self_named_ids = true`, `add_rule()` registra
//! automaticamente identificadores desconhecidos usando o próprio id como nome.
//!
//! ## Exemplo
//!
//! ```rust
//! let mut kb = KnowledgeBase::new("Livros", true);
//! let draft = RuleDraft::parse("robôs", "ficção científica", "")?;
//! let id = kb.add_rule(draft)?;
//! assert_eq!(kb.resolve_name(&FactId::new("robôs")?), "robôs");
//! ```

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::fact::{FactEntry, FactId, FactKind};
use super::rule::{Rule, RuleDraft, RuleRow};
use crate::error::{RuleError, StoreError};

/// Nome de exibição devolvido quando um identificador não está registrado.
pub const UNKNOWN_NAME: &str = "desconhecido";

/// Base de conhecimento in-memory: fatos nomeados + regras.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KnowledgeBase {
    /// Título exibido na interface (ex: "Diagnóstico de dor abdominal").
    pub title: String,

    /// Registra ids desconhecidos como nomes deles mesmos ao adicionar regras.
    #[serde(default)]
    pub self_named_ids: bool,

    /// Fatos em ordem de inserção (a ordem do formulário).
    pub facts: Vec<FactEntry>,

    /// Regras em ordem crescente de id.
    pub rules: Vec<RuleRow>,

    /// Índice `FactId → posição em facts`. **Não serializado.**
    #[serde(skip, default)]
    index: HashMap<FactId, usize>,

    /// Próximo id de regra. **Não serializado**: derivado das regras.
    #[serde(skip, default)]
    next_rule_id: u32,
}

impl KnowledgeBase {
    pub fn new(title: &str, self_named_ids: bool) -> Self {
        Self {
            title: title.to_string(),
            self_named_ids,
            facts: Vec::new(),
            rules: Vec::new(),
            index: HashMap::new(),
            next_rule_id: 1,
        }
    }

    /// Reconstrói o índice de fatos e o contador de ids de regra.
    ///
    /// **Deve ser chamado após desserialização.** Também reordena as
    /// regras por id, caso o arquivo tenha sido editado à mão.
    ///
    /// # Erros
    ///
    /// - [`StoreError::DuplicateRuleId`]: duas linhas com o mesmo id
    /// - [`StoreError::RuleIdsExhausted`]: uma regra usa `u32::MAX`
    pub fn rebuild_index(&mut self) -> Result<(), StoreError> {
        self.index.clear();
        for (pos, entry) in self.facts.iter().enumerate() {
            self.index.entry(entry.id.clone()).or_insert(pos);
        }
        self.rules.sort_by_key(|r| r.id);
        if let Some(pair) = self.rules.windows(2).find(|w| w[0].id == w[1].id) {
            return Err(StoreError::DuplicateRuleId(pair[0].id));
        }
        self.next_rule_id = match self.rules.last() {
            Some(last) => last.id.checked_add(1).ok_or(StoreError::RuleIdsExhausted)?,
            None => 1,
        };
        Ok(())
    }

    /// Registra um fato nomeado. Ids repetidos são ignorados (retorna `false`).
    pub fn add_fact(&mut self, entry: FactEntry) -> bool {
        if self.index.contains_key(&entry.id) {
            tracing::debug!(id = %entry.id, "KB: fato já registrado, ignorando");
            return false;
        }
        self.index.insert(entry.id.clone(), self.facts.len());
        self.facts.push(entry);
        true
    }

    pub fn fact(&self, id: &FactId) -> Option<&FactEntry> {
        self.index.get(id).and_then(|&pos| self.facts.get(pos))
    }

    /// Nome de exibição de um id, ou [`UNKNOWN_NAME`] se não registrado.
    pub fn resolve_name(&self, id: &FactId) -> &str {
        self.fact(id).map_or(UNKNOWN_NAME, |f| f.name.as_str())
    }

    /// Fatos que o formulário oferece: observações e qualquer fato usado
    /// como premissa de uma regra válida, mesmo que registrado como conclusão.
    pub fn selectable_facts(&self) -> Vec<&FactEntry> {
        let premises: HashSet<FactId> = self
            .rules
            .iter()
            .filter_map(|row| row.parse().ok())
            .flat_map(|rule| rule.premises)
            .collect();
        self.facts
            .iter()
            .filter(|f| f.kind == FactKind::Observation || premises.contains(&f.id))
            .collect()
    }

    /// Diagnósticos/livros: fatos registrados como conclusão.
    pub fn conclusions(&self) -> Vec<&FactEntry> {
        self.facts_of(FactKind::Conclusion)
    }

    fn facts_of(&self, kind: FactKind) -> Vec<&FactEntry> {
        self.facts.iter().filter(|f| f.kind == kind).collect()
    }

    /// Tabela `id → nome` de todos os fatos registrados.
    pub fn name_table(&self) -> HashMap<FactId, String> {
        self.facts
            .iter()
            .map(|f| (f.id.clone(), f.name.clone()))
            .collect()
    }

    #[cfg(test)]
    pub fn rule(&self, id: u32) -> Option<&RuleRow> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Converte todas as linhas em [`Rule`]s, separando as malformadas.
    ///
    /// Linhas malformadas só existem se o arquivo foi editado à mão:
    /// `add_rule`/`update_rule` recebem rascunhos já validados.
    pub fn parsed_rules(&self) -> (Vec<Rule>, Vec<(u32, RuleError)>) {
        let mut valid = Vec::with_capacity(self.rules.len());
        let mut malformed = Vec::new();
        for row in &self.rules {
            match row.parse() {
                Ok(rule) => valid.push(rule),
                Err(e) => malformed.push((row.id, e)),
            }
        }
        (valid, malformed)
    }

    /// Adiciona uma regra e retorna o id atribuído.
    ///
    /// O último id atribuível é `u32::MAX - 1`; depois dele a base recusa
    /// novas regras com [`StoreError::RuleIdsExhausted`], sem alterar nada.
    pub fn add_rule(&mut self, draft: RuleDraft) -> Result<u32, StoreError> {
        let id = self.next_rule_id.max(1);
        let next = id.checked_add(1).ok_or(StoreError::RuleIdsExhausted)?;
        self.register_self_named(&draft);
        self.next_rule_id = next;
        tracing::debug!(id, conclusion = %draft.conclusion, "KB: regra adicionada");
        self.rules.push(draft.into_row(id));
        Ok(id)
    }

    /// Substitui premissas, conclusão e descrição de uma regra existente.
    pub fn update_rule(&mut self, id: u32, draft: RuleDraft) -> Result<(), StoreError> {
        let pos = self
            .rules
            .iter()
            .position(|r| r.id == id)
            .ok_or(StoreError::RuleNotFound(id))?;
        self.register_self_named(&draft);
        tracing::debug!(id, "KB: regra atualizada");
        self.rules[pos] = draft.into_row(id);
        Ok(())
    }

    pub fn delete_rule(&mut self, id: u32) -> Result<(), StoreError> {
        let pos = self
            .rules
            .iter()
            .position(|r| r.id == id)
            .ok_or(StoreError::RuleNotFound(id))?;
        self.rules.remove(pos);
        tracing::debug!(id, "KB: regra removida");
        Ok(())
    }

    fn register_self_named(&mut self, draft: &RuleDraft) {
        if !self.self_named_ids {
            return;
        }
        for premise in &draft.premises {
            if self.fact(premise).is_none() {
                let name = premise.to_string();
                self.add_fact(FactEntry::new(premise.clone(), &name, "", FactKind::Observation));
            }
        }
        if self.fact(&draft.conclusion).is_none() {
            let name = draft.conclusion.to_string();
            self.add_fact(FactEntry::new(
                draft.conclusion.clone(),
                &name,
                "",
                FactKind::Conclusion,
            ));
        }
    }

    pub fn fact_count(&self) -> usize {
        self.facts.len()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> FactId {
        FactId::new(s).unwrap()
    }

    fn diagnosis_kb() -> KnowledgeBase {
        let mut kb = KnowledgeBase::new("teste", false);
        kb.add_fact(FactEntry::new(id("1"), "Dor epigástrica", "", FactKind::Observation));
        kb.add_fact(FactEntry::new(id("101"), "Gastrite", "", FactKind::Conclusion));
        kb
    }

    #[test]
    fn test_resolve_name_placeholder() {
        let kb = diagnosis_kb();
        assert_eq!(kb.resolve_name(&id("101")), "Gastrite");
        assert_eq!(kb.resolve_name(&id("999")), UNKNOWN_NAME);
    }

    /// Registrar o mesmo id duas vezes mantém o primeiro registro
    #[test]
    fn test_add_fact_ignores_duplicates() {
        let mut kb = diagnosis_kb();
        assert!(!kb.add_fact(FactEntry::new(id("1"), "Outro", "", FactKind::Observation)));
        assert_eq!(kb.resolve_name(&id("1")), "Dor epigástrica");
        assert_eq!(kb.selectable_facts().len(), 1);
        assert_eq!(kb.conclusions().len(), 1);
    }

    #[test]
    fn test_rule_crud() {
        let mut kb = diagnosis_kb();
        let a = kb.add_rule(RuleDraft::parse("1", "101", "a").unwrap()).unwrap();
        let b = kb.add_rule(RuleDraft::parse("1,8", "101", "b").unwrap()).unwrap();
        assert_eq!((a, b), (1, 2));

        kb.update_rule(a, RuleDraft::parse("1,9", "101", "a2").unwrap())
            .unwrap();
        assert_eq!(kb.rule(a).unwrap().premises, "1,9");

        kb.delete_rule(b).unwrap();
        assert_eq!(kb.rule_count(), 1);
        assert!(matches!(kb.delete_rule(b), Err(StoreError::RuleNotFound(2))));
        assert!(matches!(
            kb.update_rule(42, RuleDraft::parse("1", "101", "").unwrap()),
            Err(StoreError::RuleNotFound(42))
        ));
    }

    /// Após load, o índice e o contador de ids são reconstruídos
    #[test]
    fn test_rebuild_index_after_serde() {
        let mut kb = diagnosis_kb();
        kb.add_rule(RuleDraft::parse("1", "101", "").unwrap()).unwrap();
        let json = serde_json::to_string(&kb).unwrap();

        let mut loaded: KnowledgeBase = serde_json::from_str(&json).unwrap();
        loaded.rebuild_index().unwrap();
        assert_eq!(loaded.resolve_name(&id("101")), "Gastrite");
        assert_eq!(loaded.add_rule(RuleDraft::parse("1", "101", "").unwrap()).unwrap(), 2);
    }

    fn kb_with_rule_ids(ids: &[u32]) -> KnowledgeBase {
        let mut kb = diagnosis_kb();
        for &rule_id in ids {
            kb.rules.push(RuleRow {
                id: rule_id,
                premises: "1".into(),
                conclusion: "101".into(),
                description: String::new(),
            });
        }
        kb
    }

    /// Um id no topo do espaço `u32` é recusado no load, sem overflow
    #[test]
    fn test_rebuild_index_rejects_exhausted_ids() {
        let mut kb = kb_with_rule_ids(&[1, u32::MAX]);
        assert!(matches!(kb.rebuild_index(), Err(StoreError::RuleIdsExhausted)));
    }

    #[test]
    fn test_rebuild_index_rejects_duplicate_ids() {
        let mut kb = kb_with_rule_ids(&[3, 1, 3]);
        assert!(matches!(kb.rebuild_index(), Err(StoreError::DuplicateRuleId(3))));
    }

    /// O último id livre é atribuído; o seguinte é recusado sem mudar a base
    #[test]
    fn test_add_rule_stops_at_last_id() {
        let mut kb = kb_with_rule_ids(&[u32::MAX - 2]);
        kb.rebuild_index().unwrap();
        let last = kb.add_rule(RuleDraft::parse("1", "101", "").unwrap()).unwrap();
        assert_eq!(last, u32::MAX - 1);
        assert!(matches!(
            kb.add_rule(RuleDraft::parse("1", "101", "").unwrap()),
            Err(StoreError::RuleIdsExhausted)
        ));
        assert_eq!(kb.rule_count(), 2);
    }

    #[test]
    fn test_parsed_rules_separates_malformed() {
        let mut kb = diagnosis_kb();
        kb.add_rule(RuleDraft::parse("1", "101", "").unwrap()).unwrap();
        kb.rules.push(RuleRow {
            id: 7,
            premises: "1,,8".into(),
            conclusion: "101".into(),
            description: String::new(),
        });
        let (valid, malformed) = kb.parsed_rules();
        assert_eq!(valid.len(), 1);
        assert_eq!(malformed, vec![(7, RuleError::BlankIdentifier)]);
    }

    /// Um diagnóstico usado como premissa entra no formulário
    #[test]
    fn test_selectable_facts_follow_premises() {
        let mut kb = diagnosis_kb();
        assert_eq!(kb.selectable_facts().len(), 1);
        kb.add_rule(RuleDraft::parse("101,1", "999", "").unwrap())
            .unwrap();
        let ids: Vec<&str> = kb.selectable_facts().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "101"]);
    }

    #[test]
    fn test_self_named_registration() {
        let mut kb = KnowledgeBase::new("Livros", true);
        kb.add_rule(RuleDraft::parse("robôs", "ficção científica", "").unwrap())
            .unwrap();
        assert_eq!(kb.resolve_name(&id("robôs")), "robôs");
        let concl = kb.fact(&id("ficção científica")).unwrap();
        assert_eq!(concl.kind, FactKind::Conclusion);
    }
}
