//! # Motor de Inferência por Encadeamento para Frente
//!
//! Dado um conjunto de fatos selecionados e um [`RuleSnapshot`], o
//! [`InferenceEngine`] determina quais regras disparam e produz as
//! conclusões e o trace do raciocínio.
//!
//! ## Políticas de Casamento ([`MatchPolicy`])
//!
//! As duas políticas **não são equivalentes**: cada implantação escolhe uma.
//!
//! ### Passagem única
//!
//! ```text
//! para cada regra, em ordem de id:
//!   se set(premissas) ⊆ set(entrada):
//!     registra conclusão + trace
//! ```
//!
//! Conclusões não voltam como fatos. Várias conclusões simultâneas são
//! permitidas (nenhum corte de "melhor resposta").
//!
//! ### Fechamento (encadeamento)
//!
//! ```text
//! known = set(entrada)
//! repete:
//!   visíveis = known no início da passagem
//!   para cada regra, em ordem de id:
//!     se set(premissas) ⊆ visíveis e conclusão ∉ known:
//!       trace + known.insert(conclusão)
//! até uma passagem sem mudança
//! ```
//!
//! Um fato derivado só é usado como premissa **na passagem seguinte**.
//! Cada regra dispara no máximo uma vez (a conclusão passa a ser conhecida),
//! então há no máximo `|regras|` passagens produtivas, mais uma de
//! confirmação.
//!
//! ## Apresentação ([`Presentation`])
//!
//! No fechamento, as conclusões reportadas são os fatos derivados além da
//! entrada: todos, em ordem de derivação, ou só o último.
//!
//! ## Exemplo
//!
//! ```text
//! Regra 1: ficção científica + autor estrangeiro → século XX
//! Regra 2: século XX → Fundação
//! Entrada: {ficção científica, autor estrangeiro}
//! ─────────────────────────────────────────────
//! Passagem 1: dispara regra 1
//! Passagem 2: dispara regra 2
//! Passagem 3: nada muda → fim
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use super::trace::{Conclusion, Inference, InferenceStatus, TraceEntry};
use crate::core::{FactId, Rule};
use crate::error::{ConfigError, StoreError};
use crate::store::{KnowledgeStore, RuleSnapshot};

/// Política de casamento de regras.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum MatchPolicy {
    /// Cada regra avaliada uma vez contra a entrada original.
    #[default]
    SinglePass,
    /// Passagens repetidas até o ponto fixo, realimentando conclusões.
    Closure,
}

impl MatchPolicy {
    pub fn slug(&self) -> &'static str {
        match self {
            MatchPolicy::SinglePass => "passagem-unica",
            MatchPolicy::Closure => "fechamento",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MatchPolicy::SinglePass => "Passagem única",
            MatchPolicy::Closure => "Fechamento (encadeamento)",
        }
    }
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for MatchPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "passagem-unica" | "single-pass" => Ok(MatchPolicy::SinglePass),
            "fechamento" | "closure" => Ok(MatchPolicy::Closure),
            _ => Err(ConfigError::InvalidValue {
                var: "ENGINE_POLICY",
                value: s.to_string(),
                expected: "passagem-unica | fechamento",
            }),
        }
    }
}

/// Quais fatos derivados o fechamento reporta como conclusões.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum Presentation {
    /// Todos os fatos derivados, em ordem de derivação.
    #[default]
    AllDerived,
    /// Só o último fato derivado.
    TerminalOnly,
}

impl Presentation {
    pub fn slug(&self) -> &'static str {
        match self {
            Presentation::AllDerived => "todas",
            Presentation::TerminalOnly => "terminal",
        }
    }
}

impl fmt::Display for Presentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Presentation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "todas" | "all" => Ok(Presentation::AllDerived),
            "terminal" => Ok(Presentation::TerminalOnly),
            _ => Err(ConfigError::InvalidValue {
                var: "ENGINE_PRESENTATION",
                value: s.to_string(),
                expected: "todas | terminal",
            }),
        }
    }
}

/// Configuração fixa de uma implantação do motor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineSettings {
    pub policy: MatchPolicy,
    pub presentation: Presentation,
}

/// Motor de inferência ligado a uma base de conhecimento.
///
/// O motor não guarda estado entre execuções: cada chamada a
/// [`infer()`](InferenceEngine::infer) lê um snapshot novo da base e
/// trabalha sobre seu próprio conjunto de fatos conhecidos.
pub struct InferenceEngine {
    store: Arc<dyn KnowledgeStore>,
    settings: EngineSettings,
}

impl InferenceEngine {
    pub fn new(store: Arc<dyn KnowledgeStore>, settings: EngineSettings) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> EngineSettings {
        self.settings
    }

    /// Normaliza a entrada, lê um snapshot da base e executa a inferência.
    ///
    /// Devolve também o snapshot avaliado: quem exibe o resultado resolve
    /// nomes nele, e não em uma leitura posterior da base.
    ///
    /// Identificadores inválidos na entrada (vazios, com `,`) são
    /// descartados com aviso no log.
    ///
    /// # Erros
    ///
    /// Só falha se a base estiver indisponível ([`StoreError::Unavailable`]).
    pub fn infer<S: AsRef<str>>(
        &self,
        selected: &[S],
    ) -> Result<(Inference, RuleSnapshot), StoreError> {
        let facts = normalize_input(selected);
        let snapshot = self.store.snapshot()?;
        let inference = Self::evaluate(&snapshot, &facts, self.settings);
        Ok((inference, snapshot))
    }

    /// Núcleo puro: `(snapshot, fatos) → Inference`. Sem efeitos colaterais.
    pub fn evaluate(
        snapshot: &RuleSnapshot,
        selected: &[FactId],
        settings: EngineSettings,
    ) -> Inference {
        let selected = dedup(selected);

        if selected.is_empty() {
            tracing::debug!("Entrada vazia, nenhuma regra pode casar");
            return Inference {
                policy: settings.policy,
                selected,
                results: Vec::new(),
                trace: Vec::new(),
                status: InferenceStatus::NoConclusion,
                known: Vec::new(),
                passes: 0,
            };
        }

        let mut trace: Vec<TraceEntry> = snapshot
            .malformed
            .iter()
            .map(|(rule_id, err)| TraceEntry::Skipped {
                rule_id: *rule_id,
                reason: err.to_string(),
            })
            .collect();

        let (results, known, passes) = match settings.policy {
            MatchPolicy::SinglePass => {
                let results = single_pass(snapshot, &selected, &mut trace);
                (results, selected.clone(), 1)
            }
            MatchPolicy::Closure => closure(snapshot, &selected, settings.presentation, &mut trace),
        };

        let status = if results.is_empty() {
            InferenceStatus::NoConclusion
        } else {
            InferenceStatus::Concluded
        };

        tracing::info!(
            policy = %settings.policy,
            selected = selected.len(),
            conclusions = results.len(),
            passes,
            "Inferência concluída"
        );

        Inference {
            policy: settings.policy,
            selected,
            results,
            trace,
            status,
            known,
            passes,
        }
    }
}

/// Converte strings brutas em [`FactId`]s, descartando as inválidas.
pub fn normalize_input<S: AsRef<str>>(raw: &[S]) -> Vec<FactId> {
    raw.iter()
        .filter_map(|s| match FactId::new(s.as_ref()) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(input = %s.as_ref(), error = %e, "Fato de entrada ignorado");
                None
            }
        })
        .collect()
}

fn dedup(facts: &[FactId]) -> Vec<FactId> {
    let mut out: Vec<FactId> = Vec::with_capacity(facts.len());
    for f in facts {
        if !out.contains(f) {
            out.push(f.clone());
        }
    }
    out
}

/// Descrição da regra para o trace; gera uma a partir dos nomes se vazia.
fn describe(rule: &Rule, snapshot: &RuleSnapshot) -> String {
    if !rule.description.is_empty() {
        return rule.description.clone();
    }
    let premises: Vec<&str> = rule.premises.iter().map(|p| snapshot.label(p)).collect();
    format!(
        "{} → {}",
        premises.join(" + "),
        snapshot.label(&rule.conclusion)
    )
}

fn conclusion_for(rule: &Rule, snapshot: &RuleSnapshot, description: String) -> Conclusion {
    Conclusion {
        conclusion_name: snapshot.resolve_name(&rule.conclusion).to_string(),
        conclusion_id: rule.conclusion.clone(),
        description,
    }
}

fn single_pass(
    snapshot: &RuleSnapshot,
    selected: &[FactId],
    trace: &mut Vec<TraceEntry>,
) -> Vec<Conclusion> {
    let mut results = Vec::new();
    for rule in &snapshot.rules {
        if rule.is_satisfied_by(|p| selected.contains(p)) {
            let description = describe(rule, snapshot);
            tracing::debug!(rule = rule.id, conclusion = %rule.conclusion, "Regra disparada");
            trace.push(TraceEntry::Fired {
                rule_id: rule.id,
                description: description.clone(),
                pass: 1,
            });
            results.push(conclusion_for(rule, snapshot, description));
        }
    }
    results
}

fn closure(
    snapshot: &RuleSnapshot,
    selected: &[FactId],
    presentation: Presentation,
    trace: &mut Vec<TraceEntry>,
) -> (Vec<Conclusion>, Vec<FactId>, usize) {
    // fato → passagem em que passou a ser conhecido (entrada = 0)
    let mut known: HashMap<FactId, usize> = selected.iter().map(|f| (f.clone(), 0)).collect();
    let mut order: Vec<FactId> = selected.to_vec();
    let mut derived: Vec<Conclusion> = Vec::new();
    let mut pass = 0;

    loop {
        pass += 1;
        let mut changed = false;
        for rule in &snapshot.rules {
            if known.contains_key(&rule.conclusion) {
                continue;
            }
            let visible = rule.is_satisfied_by(|p| known.get(p).is_some_and(|&at| at < pass));
            if !visible {
                continue;
            }
            let description = describe(rule, snapshot);
            tracing::debug!(rule = rule.id, conclusion = %rule.conclusion, pass, "Regra disparada");
            trace.push(TraceEntry::Fired {
                rule_id: rule.id,
                description: description.clone(),
                pass,
            });
            known.insert(rule.conclusion.clone(), pass);
            order.push(rule.conclusion.clone());
            derived.push(conclusion_for(rule, snapshot, description));
            changed = true;
        }
        if !changed {
            break;
        }
    }

    let results = match presentation {
        Presentation::AllDerived => derived,
        Presentation::TerminalOnly => derived.pop().into_iter().collect(),
    };
    (results, order, pass)
}
