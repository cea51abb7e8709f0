//! # Templates Maud — HTML Server-Side Rendering
//!
//! Templates HTML gerados em tempo de compilação pelo macro
//! [`maud`](https://maud.lambda.xyz/). O servidor devolve **fragments**
//! HTML e o HTMX os injeta no DOM; não há JavaScript de aplicação além
//! de um pequeno script inline.
//!
//! ## Templates Disponíveis
//!
//! | Função | Tipo | Descrição |
//! |--------|------|-----------|
//! | [`full_page()`] | Página completa | Seleção de fatos + regras + grafo |
//! | [`error_page()`] | Página completa | Base indisponível |
//! | [`inference_result()`] | Fragment HTMX | Conclusões + trace |
//! | [`rules_panel()`] | Fragment HTMX | Lista editável de regras |
//! | [`edge_list()`] | Fragment HTMX | Arestas premissa → conclusão |
//!
//! ## Layout Principal (`full_page`)
//!
//! ```text
//! ┌──────────────── nav-bar ─────────────────────┐
//! │ MR │ título da base │ política · apresentação│
//! ├───────────────────────┬──────────────────────┤
//! │ [x] Fato 1            │ Regras               │
//! │ [ ] Fato 2            │  #1 a + b → c  [✎][🗑]│
//! │ ...                   │  + nova regra        │
//! │ [Inferir] [Limpar]    ├──────────────────────┤
//! │                       │ Grafo (arestas)      │
//! │ Resultado + trace     │  a → c  (regra 1)    │
//! └───────────────────────┴──────────────────────┘
//! ```

use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::config::AppConfig;
use crate::core::rule::parse_premises;
use crate::core::{FactEntry, FactId, RuleRow};
use crate::graph::KnowledgeGraph;
use crate::inference::{Inference, InferenceStatus, MatchPolicy, TraceEntry};
use crate::store::RuleSnapshot;

fn head(title: &str) -> Markup {
    html! {
        head {
            meta charset="UTF-8";
            meta name="viewport" content="width=device-width, initial-scale=1.0";
            title { (title) " · Motor de Regras" }
            link rel="stylesheet" href="/assets/style.css";
            script src="https://unpkg.com/htmx.org@2.0.4" {}
        }
    }
}

/// Página principal: fatos selecionáveis, conclusões possíveis, regras e grafo.
///
/// O painel de arestas escuta o evento `rules-changed` (enviado pelos
/// handlers via `HX-Trigger`) e se recarrega sozinho.
pub fn full_page(
    title: &str,
    config: &AppConfig,
    facts: &[FactEntry],
    conclusions: &[FactEntry],
    rows: &[RuleRow],
    snapshot: &RuleSnapshot,
) -> Markup {
    html! {
        (DOCTYPE)
        html lang="pt-BR" {
            (head(title))
            body {
                div class="app-shell" {
                    nav class="nav-bar" {
                        a href="/" class="nav-brand" {
                            span class="nav-brand-icon" { "MR" }
                            span class="nav-brand-text" { (title) }
                        }
                        div class="nav-status" {
                            span class="badge" { (config.engine.policy.label()) }
                            @if config.engine.policy == MatchPolicy::Closure {
                                span class="badge" { "apresentação: " (config.engine.presentation.slug()) }
                            }
                        }
                    }

                    div class="app-container" {
                        // Seleção de fatos (esquerda)
                        section class="facts-panel" {
                            h2 { "Fatos observados" }
                            form id="infer-form"
                                hx-post="/infer"
                                hx-target="#result"
                                hx-swap="innerHTML" {
                                div class="fact-grid" {
                                    @for fact in facts {
                                        label class={ "fact-option " (fact.kind.css_class()) } title=(fact.description) {
                                            input type="checkbox" name="fact" value=(fact.id.as_str());
                                            span { (fact.name) }
                                        }
                                    }
                                }
                                div class="actions" {
                                    button type="submit" { "Inferir" }
                                    button type="reset" class="secondary" { "Limpar" }
                                }
                            }
                            div id="result" class="result" {
                                p class="empty" { "Marque os fatos e clique em Inferir." }
                            }

                            @if !conclusions.is_empty() {
                                h2 { "Conclusões possíveis" }
                                ul class="conclusion-list" {
                                    @for c in conclusions {
                                        li class=(c.kind.css_class()) title=(c.description) { (c.name) }
                                    }
                                }
                            }
                        }

                        // Regras e grafo (direita)
                        section class="rules-side" {
                            h2 { "Regras" }
                            div id="rules-panel" { (rules_panel(rows, snapshot)) }

                            form id="new-rule-form"
                                class="rule-form"
                                hx-post="/rules"
                                hx-target="#rules-panel"
                                hx-swap="innerHTML" {
                                input type="text" name="premises" placeholder="premissas (ex: 1,6,8)" required;
                                input type="text" name="conclusion" placeholder="conclusão" required;
                                input type="text" name="description" placeholder="descrição (opcional)";
                                button type="submit" { "+ Nova regra" }
                            }

                            h2 { "Grafo de conhecimento" }
                            div id="edges"
                                hx-get="/knowledge/edges"
                                hx-trigger="load, rules-changed from:body"
                                hx-swap="innerHTML" {
                                p class="empty" { "Carregando..." }
                            }
                        }
                    }
                }

                (PreEscaped(r#"<script>
document.body.addEventListener('htmx:afterRequest', function(e) {
  var form = document.getElementById('new-rule-form');
  if (e.detail.elt === form && e.detail.xhr.getResponseHeader('HX-Trigger')) {
    form.reset();
  }
});
</script>"#))
            }
        }
    }
}

/// Página mínima exibida quando a base não pôde ser lida.
pub fn error_page(message: &str) -> Markup {
    html! {
        (DOCTYPE)
        html lang="pt-BR" {
            (head("Erro"))
            body {
                div class="notice error" role="alert" {
                    "Base de conhecimento indisponível: " (message)
                }
            }
        }
    }
}

/// Fragmento com o resultado de uma inferência.
///
/// Avisos de regras malformadas aparecem no trace, antes dos disparos.
pub fn inference_result(inference: &Inference, snapshot: &RuleSnapshot) -> Markup {
    let status_class = match inference.status {
        InferenceStatus::Concluded => "status concluded",
        InferenceStatus::NoConclusion => "status none",
    };
    html! {
        div class=(status_class) { (inference.status.label()) }

        @if !inference.results.is_empty() {
            h3 { "Conclusões" }
            ul class="conclusions" {
                @for c in &inference.results {
                    li {
                        strong { (c.conclusion_name) }
                        " "
                        span class="fact-id" { "(" (c.conclusion_id.as_str()) ")" }
                        div class="rule-description" { (c.description) }
                    }
                }
            }
        }

        @if !inference.trace.is_empty() {
            h3 { "Raciocínio" }
            ol class="trace" {
                @for entry in &inference.trace {
                    @match entry {
                        TraceEntry::Fired { rule_id, pass, .. } => {
                            li class="fired" {
                                span class="rule-id" { "#" (rule_id) }
                                @if inference.policy == MatchPolicy::Closure {
                                    span class="pass" { "passagem " (pass) }
                                }
                                (entry.to_string())
                            }
                        }
                        TraceEntry::Skipped { .. } => {
                            li class="skipped" { (entry.to_string()) }
                        }
                    }
                }
            }
        }

        p class="summary" {
            (inference.policy.label()) " · "
            (inference.firing_count()) " regra(s) disparada(s) · "
            (inference.passes) " passagem(ns)"
        }
        @if !inference.selected.is_empty() {
            p class="known" {
                "Fatos conhecidos: "
                @for (i, id) in inference.known.iter().enumerate() {
                    @if i > 0 { ", " }
                    (snapshot.label(id))
                }
            }
        }
    }
}

/// Lista editável de regras.
///
/// Linhas malformadas continuam editáveis, com um aviso.
pub fn rules_panel(rows: &[RuleRow], snapshot: &RuleSnapshot) -> Markup {
    html! {
        @if rows.is_empty() {
            p class="empty" { "Nenhuma regra cadastrada." }
        }
        ul class="rule-list" {
            @for row in rows {
                li class="rule-item" {
                    div class="rule-summary" {
                        span class="rule-id" { "#" (row.id) }
                        (rule_summary(row, snapshot))
                        @if let Err(e) = row.parse() {
                            span class="badge warning" { "⚠️ " (e.to_string()) }
                        }
                    }
                    form class="rule-form"
                        hx-post=(format!("/rules/{}", row.id))
                        hx-target="#rules-panel"
                        hx-swap="innerHTML" {
                        input type="text" name="premises" value=(row.premises);
                        input type="text" name="conclusion" value=(row.conclusion);
                        input type="text" name="description" value=(row.description);
                        button type="submit" { "Salvar" }
                        button type="button" class="danger"
                            hx-post=(format!("/rules/{}/delete", row.id))
                            hx-target="#rules-panel"
                            hx-swap="innerHTML"
                            hx-confirm=(format!("Remover a regra #{}?", row.id)) {
                            "Remover"
                        }
                    }
                }
            }
        }
    }
}

/// `Náusea + Vômito → Gastrite`, ou o texto cru se não parsear.
fn rule_summary(row: &RuleRow, snapshot: &RuleSnapshot) -> String {
    let Ok(premises) = parse_premises(&row.premises) else {
        return format!("{} → {}", row.premises, row.conclusion);
    };
    let names: Vec<&str> = premises.iter().map(|p| snapshot.label(p)).collect();
    let conclusion = match FactId::new(&row.conclusion) {
        Ok(id) => snapshot.label(&id).to_string(),
        Err(_) => row.conclusion.clone(),
    };
    format!("{} → {}", names.join(" + "), conclusion)
}

/// Arestas do grafo com nomes resolvidos.
pub fn edge_list(graph: &KnowledgeGraph, snapshot: &RuleSnapshot) -> Markup {
    html! {
        p class="graph-stats" {
            (graph.node_count()) " nós · " (graph.edge_count()) " arestas · "
            (graph.observations().len()) " entradas · "
            (graph.terminal_conclusions().len()) " conclusões terminais"
            @if graph.has_cycle() {
                " · " span class="badge warning" { "ciclo detectado" }
            }
        }
        ul class="edge-list" {
            @for (source, target, rules) in graph.edges() {
                li {
                    (snapshot.label(source)) " → " (snapshot.label(target))
                    span class="edge-rules" {
                        " (regra "
                        (rules.iter().map(|r| format!("#{}", r)).collect::<Vec<_>>().join(", "))
                        ")"
                    }
                }
            }
        }
    }
}
