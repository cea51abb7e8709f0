//! # Erros do Domínio
//!
//! Tipos de erro tipados do motor de regras, definidos com `thiserror`.
//!
//! | Tipo | Origem | Efeito |
//! |------|--------|--------|
//! | [`RuleError`] | Parse/validação de premissas e conclusões | Regra rejeitada (CRUD) ou ignorada (inferência) |
//! | [`StoreError`] | [`KnowledgeStore`](crate::store::KnowledgeStore) | Fatal para a operação pedida |
//! | [`ConfigError`] | Variáveis de ambiente | Aborta a inicialização |
//!
//! O código de aplicação (`main`, `persistence`) usa `anyhow` por cima destes.

use thiserror::Error;

/// Falha de validação de uma regra ou de um identificador de fato.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// Lista de premissas vazia: uma regra sem premissas dispararia sempre.
    #[error("a regra não tem premissas")]
    EmptyPremises,

    /// Identificador vazio ou só com espaços (ex: `"1,,3"`).
    #[error("identificador vazio na lista de premissas")]
    BlankIdentifier,

    /// Identificador contendo o delimitador `,`.
    #[error("o identificador '{0}' contém o delimitador ','")]
    DelimiterInIdentifier(String),

    /// Conclusão ausente.
    #[error("a regra não tem conclusão")]
    EmptyConclusion,
}

/// Falha da base de conhecimento externa.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Não foi possível ler regras/fatos. Distinto de "nenhuma regra".
    #[error("base de conhecimento indisponível: {0}")]
    Unavailable(String),

    #[error("regra #{0} não encontrada")]
    RuleNotFound(u32),

    #[error("regra inválida: {0}")]
    InvalidRule(#[from] RuleError),

    /// Duas linhas com o mesmo id: alterar ou remover ficaria ambíguo.
    #[error("id de regra #{0} repetido na base")]
    DuplicateRuleId(u32),

    /// Não há id livre depois da maior regra cadastrada.
    #[error("ids de regra esgotados")]
    RuleIdsExhausted,

    /// A alteração não pôde ser gravada em disco; nada foi aplicado.
    #[error("falha ao persistir a base de conhecimento: {0:#}")]
    Persist(anyhow::Error),
}

/// Valor inválido em uma variável de configuração.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("valor inválido para {var}: '{value}' (esperado: {expected})")]
    InvalidValue {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}
