//! # Módulo Core — Modelo de Dados do Sistema Especialista
//!
//! Tipos fundamentais sobre os quais o motor de inferência e o construtor
//! de grafo trabalham:
//!
//! - [`FactId`]: identificador canônico de fato/conclusão (normalizado)
//! - [`FactEntry`] / [`FactKind`]: registro nomeado de um fato
//! - [`Rule`]: regra validada `premissas → conclusão`
//! - [`RuleRow`]: regra no formato persistido (premissas `"1,6,8,9"`)
//! - [`RuleDraft`]: entrada validada do CRUD de regras
//! - [`KnowledgeBase`]: tabelas de fatos e regras em memória
//! - [`Domain`] / [`seed()`]: bases de conhecimento embutidas
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use crate::core::{seed, Domain, FactId};
//!
//! let kb = seed(Domain::Diagnosis);
//! let (rules, malformed) = kb.parsed_rules();
//! assert!(malformed.is_empty());
//! assert_eq!(kb.resolve_name(&FactId::from(101)), "Gastrite");
//! ```

/// Sub-módulo com [`FactId`], [`FactEntry`] e [`FactKind`].
pub mod fact;

/// Sub-módulo com [`Rule`], [`RuleRow`], [`RuleDraft`] e o parse de premissas.
pub mod rule;

/// Sub-módulo com a implementação de [`KnowledgeBase`].
pub mod knowledge_base;

/// Sub-módulo com os domínios embutidos e seus dados iniciais.
pub mod seed;

pub use fact::{FactEntry, FactId, FactKind};
pub use knowledge_base::{KnowledgeBase, UNKNOWN_NAME};
pub use rule::{Rule, RuleDraft, RuleRow};
pub use seed::{seed, Domain};
