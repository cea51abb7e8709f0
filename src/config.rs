//! # Configuração por Variáveis de Ambiente
//!
//! | Variável | Padrão | Significado |
//! |----------|--------|-------------|
//! | `ENGINE_ADDR` | `0.0.0.0:3000` | Endereço do servidor |
//! | `ENGINE_DOMAIN` | `diagnostico` | Base inicial: `diagnostico` ou `livros` |
//! | `ENGINE_DATA` | `data/<domínio>.json` | Arquivo da base de conhecimento |
//! | `ENGINE_RESULTS` | `data/resultados.jsonl` | Log de resultados |
//! | `ENGINE_POLICY` | depende do domínio | `passagem-unica` ou `fechamento` |
//! | `ENGINE_PRESENTATION` | depende do domínio | `todas` ou `terminal` |
//!
//! O nível de log continua sendo controlado por `RUST_LOG`.

use std::path::PathBuf;

use crate::core::Domain;
use crate::error::ConfigError;
use crate::inference::{EngineSettings, MatchPolicy, Presentation};

/// Configuração completa da aplicação.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub domain: Domain,
    pub data_path: PathBuf,
    pub results_path: PathBuf,
    pub engine: EngineSettings,
}

impl AppConfig {
    /// Lê a configuração do ambiente do processo.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Lê a configuração a partir de uma função de lookup (testável).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let domain = match get("ENGINE_DOMAIN") {
            Some(v) => v.parse()?,
            None => Domain::Diagnosis,
        };
        let defaults = domain_defaults(domain);
        let policy = match get("ENGINE_POLICY") {
            Some(v) => v.parse()?,
            None => defaults.policy,
        };
        let presentation = match get("ENGINE_PRESENTATION") {
            Some(v) => v.parse()?,
            None => defaults.presentation,
        };

        Ok(Self {
            bind_addr: get("ENGINE_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            domain,
            data_path: get("ENGINE_DATA")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(format!("data/{}.json", domain.slug()))),
            results_path: get("ENGINE_RESULTS")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/resultados.jsonl")),
            engine: EngineSettings {
                policy,
                presentation,
            },
        })
    }
}

/// Política padrão de cada domínio.
///
/// Diagnóstico reporta todos os diagnósticos compatíveis com os sintomas;
/// livros encadeia características e aponta um único livro.
pub fn domain_defaults(domain: Domain) -> EngineSettings {
    match domain {
        Domain::Diagnosis => EngineSettings {
            policy: MatchPolicy::SinglePass,
            presentation: Presentation::AllDerived,
        },
        Domain::Books => EngineSettings {
            policy: MatchPolicy::Closure,
            presentation: Presentation::TerminalOnly,
        },
    }
}
