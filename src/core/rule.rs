//! # Rule — Regra de Produção SE-premissas-ENTÃO-conclusão
//!
//! Uma regra liga um **conjunto de premissas** a uma **única conclusão**:
//!
//! ```text
//! SE  1 (dor epigástrica) ∧ 6 (dor contínua) ∧ 8 (náusea) ∧ 9 (vômito)
//! ENTÃO 102 (úlcera gástrica)
//! ```
//!
//! ## Três Representações
//!
//! | Tipo | Onde vive | Premissas |
//! |------|-----------|-----------|
//! | [`RuleRow`] | Arquivo JSON (formato persistido) | `"1,6,8,9"`: string com `,` |
//! | [`RuleDraft`] | Entrada do CRUD (formulário) | `Vec<FactId>` validado, sem id |
//! | [`Rule`] | Snapshot entregue ao motor | `Vec<FactId>` validado + id |
//!
//! A conversão `RuleRow → Rule` ([`RuleRow::parse`]) acontece **na fronteira
//! da base de conhecimento**. O motor de inferência nunca vê strings
//! delimitadas.

use serde::{Deserialize, Serialize};

use super::fact::{FactId, PREMISE_DELIMITER};
use crate::error::RuleError;

/// Divide e valida uma lista de premissas delimitada por `,`.
///
/// Mantém a ordem original e as duplicatas (a semântica de conjunto é
/// aplicada no casamento, não aqui).
///
/// # Erros
///
/// - [`RuleError::EmptyPremises`]: string vazia
/// - [`RuleError::BlankIdentifier`]: entrada vazia (`"1,,3"`, `"1,"`)
pub fn parse_premises(raw: &str) -> Result<Vec<FactId>, RuleError> {
    if raw.trim().is_empty() {
        return Err(RuleError::EmptyPremises);
    }
    raw.split(PREMISE_DELIMITER).map(FactId::new).collect()
}

/// Junta premissas no formato persistido (`"1,6,8,9"`).
pub fn join_premises(premises: &[FactId]) -> String {
    premises
        .iter()
        .map(FactId::as_str)
        .collect::<Vec<_>>()
        .join(&PREMISE_DELIMITER.to_string())
}

/// Linha da tabela de regras, exatamente como persistida.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRow {
    pub id: u32,
    /// Identificadores separados por `,`.
    pub premises: String,
    pub conclusion: String,
    #[serde(default)]
    pub description: String,
}

impl RuleRow {
    /// Converte a linha persistida em uma [`Rule`] validada.
    pub fn parse(&self) -> Result<Rule, RuleError> {
        let premises = parse_premises(&self.premises)?;
        let conclusion = match FactId::new(&self.conclusion) {
            Ok(id) => id,
            Err(RuleError::BlankIdentifier) => return Err(RuleError::EmptyConclusion),
            Err(e) => return Err(e),
        };
        Ok(Rule {
            id: self.id,
            premises,
            conclusion,
            description: self.description.trim().to_string(),
        })
    }
}

/// Regra validada, pronta para o motor de inferência.
///
/// Invariante: `premises` nunca é vazio.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub id: u32,
    pub premises: Vec<FactId>,
    pub conclusion: FactId,
    pub description: String,
}

impl Rule {
    /// `true` se todas as premissas pertencem a `known`.
    pub fn is_satisfied_by<F>(&self, mut known: F) -> bool
    where
        F: FnMut(&FactId) -> bool,
    {
        self.premises.iter().all(|p| known(p))
    }
}

/// Entrada validada para `add_rule` / `update_rule`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleDraft {
    pub premises: Vec<FactId>,
    pub conclusion: FactId,
    pub description: String,
}

impl RuleDraft {
    /// Constrói um rascunho a partir dos campos brutos do formulário.
    ///
    /// # Exemplo
    ///
    /// ```rust
    /// let draft = RuleDraft::parse("1, 6, 8, 9", "102", "…->Úlcera gástrica")?;
    /// assert_eq!(draft.premises.len(), 4);
    /// ```
    pub fn parse(premises: &str, conclusion: &str, description: &str) -> Result<Self, RuleError> {
        let premises = parse_premises(premises)?;
        let conclusion = FactId::new(conclusion).map_err(|e| match e {
            RuleError::BlankIdentifier => RuleError::EmptyConclusion,
            other => other,
        })?;
        Ok(Self {
            premises,
            conclusion,
            description: description.trim().to_string(),
        })
    }

    /// Materializa o rascunho como linha persistida com o id dado.
    pub fn into_row(self, id: u32) -> RuleRow {
        RuleRow {
            id,
            premises: join_premises(&self.premises),
            conclusion: self.conclusion.into(),
            description: self.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<FactId> {
        raw.iter().map(|s| FactId::new(s).unwrap()).collect()
    }

    /// Espaços em volta dos identificadores são tolerados
    #[test]
    fn test_parse_premises_trims() {
        assert_eq!(parse_premises("1, 6 ,8").unwrap(), ids(&["1", "6", "8"]));
    }

    #[test]
    fn test_parse_premises_rejects_empty_entries() {
        assert_eq!(parse_premises(""), Err(RuleError::EmptyPremises));
        assert_eq!(parse_premises("1,,3"), Err(RuleError::BlankIdentifier));
        assert_eq!(parse_premises("1,"), Err(RuleError::BlankIdentifier));
    }

    #[test]
    fn test_row_parse() {
        let row = RuleRow {
            id: 3,
            premises: "4,6,12,18".into(),
            conclusion: "103".into(),
            description: " colecistite ".into(),
        };
        let rule = row.parse().unwrap();
        assert_eq!(rule.premises, ids(&["4", "6", "12", "18"]));
        assert_eq!(rule.conclusion, FactId::from(103));
        assert_eq!(rule.description, "colecistite");
    }

    #[test]
    fn test_row_without_conclusion() {
        let row = RuleRow {
            id: 1,
            premises: "1".into(),
            conclusion: "  ".into(),
            description: String::new(),
        };
        assert_eq!(row.parse(), Err(RuleError::EmptyConclusion));
    }

    #[test]
    fn test_draft_into_row() {
        let row = RuleDraft::parse("robôs", "ficção científica", "")
            .unwrap()
            .into_row(9);
        assert_eq!(row.premises, "robôs");
        assert_eq!(row.conclusion, "ficção científica");
        assert_eq!(row.id, 9);
    }
}
