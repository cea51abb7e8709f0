//! # Estado da Aplicação Web
//!
//! Tudo que os handlers compartilham, montado uma vez em `main`:
//!
//! ```text
//! AppState
//!  ├── store  ── dyn KnowledgeStore (em produção, JsonStore)
//!  ├── engine ── InferenceEngine (lê snapshots do mesmo store)
//!  └── config ── AppConfig (domínio, política, caminhos)
//! ```
//!
//! O motor não guarda estado entre requisições, então não há lock em
//! volta dele: cada `/infer` trabalha sobre seu próprio snapshot.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::inference::InferenceEngine;
use crate::store::KnowledgeStore;

/// Estado compartilhado da aplicação Axum.
#[derive(Clone)]
pub struct AppState {
    /// Base de conhecimento (fatos + regras), com CRUD persistido.
    pub store: Arc<dyn KnowledgeStore>,
    pub engine: Arc<InferenceEngine>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Liga motor e store, usando a política configurada.
    pub fn new(store: Arc<dyn KnowledgeStore>, config: AppConfig) -> Self {
        let engine = InferenceEngine::new(store.clone(), config.engine);
        Self {
            store,
            engine: Arc::new(engine),
            config: Arc::new(config),
        }
    }
}
