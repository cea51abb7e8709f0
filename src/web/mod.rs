//! # Módulo Web — Interface do Motor de Regras
//!
//! Camada web construída com **Axum** + **HTMX** + **Maud**.
//!
//! ## Arquitetura Web
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Browser (HTMX)                                          │
//! ├─────────────────────────────────────────────────────────┤
//! │ Axum Router (este módulo)                               │
//! │  ├── GET  /                    → página principal       │
//! │  ├── POST /infer               → HTMX fragment (trace)  │
//! │  ├── GET  /rules               → HTMX fragment (tabela) │
//! │  ├── POST /rules               → cria regra             │
//! │  ├── POST /rules/{id}          → altera regra           │
//! │  ├── POST /rules/{id}/delete   → remove regra           │
//! │  ├── GET  /knowledge/graph     → JSON (nós + arestas)   │
//! │  ├── GET  /knowledge/edges     → HTMX fragment          │
//! │  └── GET  /status              → JSON: domínio, contagem│
//! ├─────────────────────────────────────────────────────────┤
//! │ Static Assets (tower_http::ServeDir → /assets/)         │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Submódulos
//!
//! | Módulo | Responsabilidade |
//! |--------|------------------|
//! | [`state`] | Estado compartilhado (`AppState`) |
//! | [`handlers`] | Handlers Axum para cada rota |
//! | [`templates`] | Templates Maud (HTML server-side) |

pub mod handlers;
pub mod state;
pub mod templates;

use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Cria o router Axum com todas as rotas da aplicação.
///
/// Mutações de regras respondem com o header `HX-Trigger: rules-changed`,
/// que faz a lista de arestas se recarregar no cliente.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // ── Páginas HTML ──────────────────────────────────────
        .route("/", get(handlers::index))
        // ── Inferência ────────────────────────────────────────
        .route("/infer", post(handlers::infer))
        // ── Manutenção de regras ──────────────────────────────
        .route("/rules", get(handlers::rules_panel).post(handlers::add_rule))
        .route("/rules/{id}", post(handlers::update_rule))
        .route("/rules/{id}/delete", post(handlers::delete_rule))
        // ── Grafo ─────────────────────────────────────────────
        .route("/knowledge/graph", get(handlers::graph_data))
        .route("/knowledge/edges", get(handlers::graph_edges))
        // ── API JSON ──────────────────────────────────────────
        .route("/status", get(handlers::engine_status))
        // ── Arquivos estáticos ────────────────────────────────
        .nest_service("/assets", ServeDir::new("assets"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
