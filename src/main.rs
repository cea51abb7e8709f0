#![allow(rustdoc::broken_intra_doc_links)]
//! # Motor de Regras — Sistema Especialista por Encadeamento para Frente
//!
//! **Ponto de entrada** da aplicação: carrega a base de conhecimento,
//! monta o motor de inferência e inicia o servidor web.
//!
//! ## Fluxo de Inicialização
//!
//! ```text
//! main()
//!   ├── Configura tracing/logging (RUST_LOG)
//!   ├── Lê AppConfig das variáveis ENGINE_*
//!   ├── Carrega a KB do disco (ou semeia o domínio escolhido)
//!   ├── Monta JsonStore + InferenceEngine → AppState
//!   └── Inicia servidor TCP
//! ```
//!
//! Uma base corrompida em disco **aborta** a inicialização: o arquivo não
//! é sobrescrito com a semente, para não perder regras editadas.
//!
//! ## Exemplo de Uso
//!
//! ```bash
//! # Diagnóstico de dor abdominal (passagem única)
//! cargo run
//!
//! # Identificação de livros (fechamento, só a conclusão terminal)
//! ENGINE_DOMAIN=livros cargo run
//!
//! # Logs detalhados (cada regra disparada)
//! RUST_LOG=debug cargo run
//! ```

/// Módulo `config`: variáveis de ambiente ENGINE_*.
mod config;

/// Módulo `core`: fatos, regras, KnowledgeBase e bases iniciais.
mod core;

/// Módulo `error`: erros tipados (thiserror).
mod error;

/// Módulo `graph`: grafo premissa → conclusão para visualização.
mod graph;

/// Módulo `inference`: motor de encadeamento para frente.
mod inference;

/// Módulo `persistence`: KB em JSON e log de resultados.
mod persistence;

/// Módulo `store`: interface de acesso à base de conhecimento.
mod store;

/// Módulo `web`: servidor axum, handlers HTTP e templates.
mod web;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::store::JsonStore;
use crate::web::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().context("Configuração inválida")?;
    tracing::info!(
        domain = %config.domain,
        policy = %config.engine.policy,
        presentation = %config.engine.presentation,
        "⚙️ Motor de Regras iniciando"
    );

    let kb = persistence::load_or_seed(&config.data_path, config.domain)?;
    tracing::info!(
        facts = kb.fact_count(),
        rules = kb.rule_count(),
        path = %config.data_path.display(),
        "KB carregada"
    );

    let store = Arc::new(JsonStore::new(kb, config.data_path.clone()));
    let addr = config.bind_addr.clone();
    let app = web::create_router(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Falha ao abrir {}", addr))?;
    tracing::info!("🚀 Servidor em http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
