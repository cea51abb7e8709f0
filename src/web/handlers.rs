//! # Handlers HTTP — Os Endpoints da Aplicação
//!
//! Cada função pública neste módulo é um handler Axum, mapeado a uma
//! rota em [`super::create_router()`]. Os handlers seguem o padrão
//! **HTMX fragment**: retornam fragmentos HTML que o HTMX injeta no DOM
//! via `hx-swap`.
//!
//! ## Padrão de Resposta
//!
//! | Handler | Método | Retorno | Uso |
//! |---------|--------|---------|-----|
//! | `index` | GET | HTML completo | Página principal (Maud) |
//! | `infer` | POST | HTMX fragment | Conclusões + trace |
//! | `rules_panel` | GET | HTMX fragment | Tabela de regras |
//! | `add_rule` | POST | HTMX fragment | Tabela atualizada ou erro |
//! | `update_rule` | POST | HTMX fragment | Tabela atualizada ou erro |
//! | `delete_rule` | POST | HTMX fragment | Tabela atualizada ou erro |
//! | `graph_data` | GET | JSON / 204 / 503 | Dados do grafo |
//! | `graph_edges` | GET | HTMX fragment | Lista de arestas nomeadas |
//! | `engine_status` | GET | JSON / 503 | Domínio, política, contagens |
//!
//! ## Erros
//!
//! Regras inválidas e ids inexistentes não viram status HTTP de erro:
//! o HTMX só troca o conteúdo em respostas 2xx, então o fragmento devolvido
//! traz a mensagem junto da tabela. Já os endpoints JSON respondem `503`
//! quando a base está indisponível.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::{Form, Json};
use maud::html;

use super::state::AppState;
use super::templates;
use crate::core::RuleDraft;
use crate::error::StoreError;
use crate::graph::{build_graph, GraphError};
use crate::persistence::{self, ResultRecord};

/// Header que avisa o cliente de que as regras mudaram.
const RULES_CHANGED: (&str, &str) = ("HX-Trigger", "rules-changed");

/// Resposta do endpoint `/status`.
#[derive(serde::Serialize)]
pub struct StatusResponse {
    pub domain: String,
    pub title: String,
    pub policy: String,
    pub presentation: String,
    pub facts: usize,
    pub rules: usize,
}

/// Campos do formulário de criação/edição de regra.
#[derive(serde::Deserialize)]
pub struct RuleForm {
    /// Identificadores separados por `,`.
    #[serde(default)]
    pub premises: String,
    #[serde(default)]
    pub conclusion: String,
    #[serde(default)]
    pub description: String,
}

/// Converte Maud Markup em resposta Html<String> do Axum.
fn markup_to_html(m: maud::Markup) -> Html<String> {
    Html(m.into_string())
}

fn error_fragment(message: &str) -> maud::Markup {
    html! {
        div class="notice error" role="alert" { (message) }
    }
}

/// GET `/`: Página principal.
///
/// Lista as observações selecionáveis, a tabela de regras e os painéis
/// de resultado e grafo (carregados via HTMX).
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let page = state.store.list_facts().and_then(|facts| {
        let conclusions = state.store.list_conclusions()?;
        let rows = state.store.list_rules()?;
        let snapshot = state.store.snapshot()?;
        Ok(templates::full_page(
            &state.store.title()?,
            &state.config,
            &facts,
            &conclusions,
            &rows,
            &snapshot,
        ))
    });
    match page {
        Ok(markup) => markup_to_html(markup),
        Err(e) => {
            tracing::error!(error = %e, "Falha ao montar a página principal");
            markup_to_html(templates::error_page(&e.to_string()))
        }
    }
}

/// POST `/infer`: Executa o motor sobre os fatos marcados.
///
/// O formulário envia um campo `fact` por checkbox marcado
/// (`fact=1&fact=6&…`), por isso o corpo é lido como lista de pares.
///
/// ## Fluxo
///
/// ```text
/// 1. Coleta os valores de `fact`
/// 2. engine.infer() → Inference + snapshot avaliado
/// 3. Acrescenta uma linha ao log de resultados
/// 4. Renderiza conclusões + trace com os nomes do mesmo snapshot
/// ```
pub async fn infer(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Html<String> {
    let selected: Vec<String> = pairs
        .into_iter()
        .filter(|(key, _)| key == "fact")
        .map(|(_, value)| value)
        .collect();

    let (inference, snapshot) = match state.engine.infer(selected.as_slice()) {
        Ok(evaluated) => evaluated,
        Err(e) => {
            tracing::error!(error = %e, "Inferência abortada");
            return markup_to_html(error_fragment(&e.to_string()));
        }
    };

    let record = ResultRecord::from_inference(&inference);
    if let Err(e) = persistence::append_result(&state.config.results_path, &record) {
        tracing::error!(error = %e, "Falha ao registrar resultado");
    }

    markup_to_html(templates::inference_result(&inference, &snapshot))
}

/// Renderiza a tabela de regras, com uma mensagem opcional no topo.
fn render_rules(state: &AppState, notice: Option<maud::Markup>) -> Html<String> {
    let table = state.store.list_rules().and_then(|rows| {
        let snapshot = state.store.snapshot()?;
        Ok(templates::rules_panel(&rows, &snapshot))
    });
    markup_to_html(match table {
        Ok(table) => html! {
            @if let Some(notice) = notice { (notice) }
            (table)
        },
        Err(e) => error_fragment(&e.to_string()),
    })
}

/// Resposta de uma mutação de regra: tabela atualizada + `HX-Trigger`
/// em caso de sucesso, tabela + erro caso contrário.
fn mutation_response(state: &AppState, outcome: Result<String, StoreError>) -> Response {
    match outcome {
        Ok(message) => {
            let notice = html! { div class="notice ok" { (message) } };
            ([RULES_CHANGED], render_rules(state, Some(notice))).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Alteração de regra recusada");
            render_rules(state, Some(error_fragment(&e.to_string()))).into_response()
        }
    }
}

fn parse_draft(form: &RuleForm) -> Result<RuleDraft, StoreError> {
    Ok(RuleDraft::parse(&form.premises, &form.conclusion, &form.description)?)
}

/// GET `/rules`: Fragmento com a tabela de regras.
pub async fn rules_panel(State(state): State<AppState>) -> Html<String> {
    render_rules(&state, None)
}

/// POST `/rules`: Cria uma regra a partir do formulário.
pub async fn add_rule(State(state): State<AppState>, Form(form): Form<RuleForm>) -> Response {
    let outcome = parse_draft(&form).and_then(|draft| {
        let conclusion = draft.conclusion.clone();
        let id = state.store.add_rule(draft)?;
        let name = state.store.resolve_fact_name(&conclusion)?;
        Ok(format!("Regra #{} adicionada: conclui {}.", id, name))
    });
    mutation_response(&state, outcome)
}

/// POST `/rules/{id}`: Substitui premissas, conclusão e descrição.
pub async fn update_rule(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Form(form): Form<RuleForm>,
) -> Response {
    let outcome = parse_draft(&form)
        .and_then(|draft| state.store.update_rule(id, draft))
        .map(|_| format!("Regra #{} atualizada.", id));
    mutation_response(&state, outcome)
}

/// POST `/rules/{id}/delete`: Remove uma regra.
pub async fn delete_rule(State(state): State<AppState>, Path(id): Path<u32>) -> Response {
    let outcome = state
        .store
        .delete_rule(id)
        .map(|_| format!("Regra #{} removida.", id));
    mutation_response(&state, outcome)
}

/// GET `/knowledge/graph`: Grafo premissa → conclusão em JSON.
///
/// `204 No Content` quando não há regras para desenhar.
pub async fn graph_data(State(state): State<AppState>) -> Response {
    let snapshot = match state.store.snapshot() {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Grafo indisponível");
            return (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response();
        }
    };
    match build_graph(&snapshot.rules) {
        Ok(graph) => Json(graph.to_view(|id| snapshot.label(id).to_string())).into_response(),
        Err(GraphError::NoData) => StatusCode::NO_CONTENT.into_response(),
    }
}

/// GET `/knowledge/edges`: Lista textual das arestas do grafo.
///
/// Recarregada pelo cliente no evento `rules-changed`.
pub async fn graph_edges(State(state): State<AppState>) -> Html<String> {
    let snapshot = match state.store.snapshot() {
        Ok(s) => s,
        Err(e) => return markup_to_html(error_fragment(&e.to_string())),
    };
    markup_to_html(match build_graph(&snapshot.rules) {
        Ok(graph) => templates::edge_list(&graph, &snapshot),
        Err(e) => html! { p class="empty" { (e.to_string()) } },
    })
}

/// GET `/status`: Configuração ativa e tamanho da base.
///
/// `503` quando a base está indisponível.
pub async fn engine_status(State(state): State<AppState>) -> Response {
    let read = state
        .store
        .counts()
        .and_then(|counts| Ok((counts, state.store.title()?)));
    let ((facts, rules), title) = match read {
        Ok(read) => read,
        Err(e) => {
            tracing::error!(error = %e, "Status indisponível");
            return (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response();
        }
    };
    let settings = state.engine.settings();
    Json(StatusResponse {
        domain: state.config.domain.slug().to_string(),
        title,
        policy: settings.policy.slug().to_string(),
        presentation: settings.presentation.slug().to_string(),
        facts,
        rules,
    })
    .into_response()
}
