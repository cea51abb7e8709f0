//! # Fact — Identificador Canônico de Fatos
//!
//! Um fato é um **identificador opaco**: um sintoma observado ("1" = dor
//! epigástrica), uma característica de um livro ("ficção científica") ou uma
//! conclusão derivável ("105" = pancreatite). Não carrega grau de verdade:
//! está presente no conjunto de fatos conhecidos ou não está.
//!
//! ## Normalização
//!
//! Identificadores numéricos e textuais compartilham o mesmo tipo, [`FactId`].
//! Na construção:
//!
//! 1. Aplica normalização Unicode **NFC** (`"ç"` composto e decomposto viram o mesmo id)
//! 2. Remove espaços nas bordas (`" 6 "` → `"6"`)
//! 3. Rejeita strings vazias e strings com o delimitador `,`
//!
//! Igualdade, ordenação e hash são definidos uma única vez sobre a string
//! normalizada.
//!
//! ```rust
//! let a = FactId::new(" 6 ")?;
//! let b = FactId::new("6")?;
//! assert_eq!(a, b);
//! ```

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::error::RuleError;

/// Delimitador das listas de premissas no formato persistido.
pub const PREMISE_DELIMITER: char = ',';

/// Identificador canônico de um fato ou conclusão.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FactId(String);

impl FactId {
    /// Normaliza e valida um identificador.
    ///
    /// # Erros
    ///
    /// - [`RuleError::BlankIdentifier`]: vazio após `trim`
    /// - [`RuleError::DelimiterInIdentifier`]: contém `,`
    pub fn new(raw: &str) -> Result<Self, RuleError> {
        let normalized: String = raw.trim().nfc().collect();
        if normalized.is_empty() {
            return Err(RuleError::BlankIdentifier);
        }
        if normalized.contains(PREMISE_DELIMITER) {
            return Err(RuleError::DelimiterInIdentifier(normalized));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for FactId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for FactId {
    type Error = RuleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        FactId::new(&value)
    }
}

impl From<FactId> for String {
    fn from(id: FactId) -> Self {
        id.0
    }
}

impl From<u32> for FactId {
    fn from(n: u32) -> Self {
        Self(n.to_string())
    }
}

/// Papel de um registro na base: observação de entrada ou conclusão.
///
/// Corresponde às duas tabelas de nomes da base persistida
/// (sintomas/características e diagnósticos/livros).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FactKind {
    /// Fato que o usuário pode selecionar no formulário.
    Observation,
    /// Fato que só aparece como conclusão de regras.
    Conclusion,
}

impl FactKind {
    /// Classe CSS usada nos templates e no JSON do grafo.
    pub fn css_class(&self) -> &'static str {
        match self {
            FactKind::Observation => "observation",
            FactKind::Conclusion => "conclusion",
        }
    }
}

/// Registro nomeado de um fato: `(id, nome, descrição)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactEntry {
    pub id: FactId,
    /// Nome de exibição (ex: "Náusea", "Gastrite").
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub kind: FactKind,
}

impl FactEntry {
    pub fn new(id: FactId, name: &str, description: &str, kind: FactKind) -> Self {
        Self {
            id,
            name: name.to_string(),
            description: description.to_string(),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Espaços nas bordas não fazem parte da identidade
    #[test]
    fn test_trim() {
        assert_eq!(FactId::new("  18 ").unwrap(), FactId::from(18));
    }

    /// Formas NFC e NFD do mesmo texto são o mesmo fato
    #[test]
    fn test_nfc() {
        let composed = FactId::new("ficção").unwrap();
        let decomposed = FactId::new("ficc\u{0327}a\u{0303}o").unwrap();
        assert_eq!(composed, decomposed);
    }

    #[test]
    fn test_rejects_blank_and_delimiter() {
        assert_eq!(FactId::new("   "), Err(RuleError::BlankIdentifier));
        assert!(matches!(
            FactId::new("1,2"),
            Err(RuleError::DelimiterInIdentifier(_))
        ));
    }

    /// A desserialização passa pela mesma validação
    #[test]
    fn test_serde_validates() {
        let ok: FactId = serde_json::from_str("\" 7 \"").unwrap();
        assert_eq!(ok.as_str(), "7");
        assert!(serde_json::from_str::<FactId>("\"\"").is_err());
    }
}
