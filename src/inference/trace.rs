//! # Resultado de uma Inferência
//!
//! Tipos produzidos pelo [`InferenceEngine`](super::InferenceEngine) e
//! consumidos pela camada de apresentação:
//!
//! - [`TraceEntry`]: passo do raciocínio (regra disparada ou regra ignorada)
//! - [`Conclusion`]: tupla `(nome, id, descrição)` exibida ao usuário
//! - [`InferenceStatus`]: "chegou a uma conclusão" vs. "nenhuma conclusão"
//! - [`Inference`]: tudo isso junto, mais o conjunto final de fatos conhecidos

use std::fmt;

use serde::Serialize;

use super::engine::MatchPolicy;
use crate::core::FactId;

/// Um passo do raciocínio, em ordem de avaliação.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum TraceEntry {
    /// Todas as premissas satisfeitas; a conclusão foi registrada.
    Fired {
        rule_id: u32,
        description: String,
        /// Passagem (1-indexed) em que a regra disparou.
        pass: usize,
    },
    /// Regra malformada na base, ignorada nesta execução.
    Skipped { rule_id: u32, reason: String },
}

impl TraceEntry {
    pub fn is_firing(&self) -> bool {
        matches!(self, TraceEntry::Fired { .. })
    }
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEntry::Fired { description, .. } => f.write_str(description),
            TraceEntry::Skipped { rule_id, reason } => {
                write!(f, "⚠️ Regra #{} ignorada: {}", rule_id, reason)
            }
        }
    }
}

/// Conclusão apresentada ao usuário.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Conclusion {
    /// Nome resolvido na base (ou o marcador "desconhecido").
    pub conclusion_name: String,
    pub conclusion_id: FactId,
    /// Descrição da regra que produziu a conclusão.
    pub description: String,
}

/// Desfecho de uma inferência. "Nenhuma conclusão" não é erro.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum InferenceStatus {
    Concluded,
    NoConclusion,
}

impl InferenceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            InferenceStatus::Concluded => "Conclusão alcançada",
            InferenceStatus::NoConclusion => "Nenhuma conclusão alcançada",
        }
    }
}

/// Resultado completo de uma execução do motor.
#[derive(Clone, Debug, Serialize)]
pub struct Inference {
    pub policy: MatchPolicy,
    /// Fatos de entrada normalizados, sem duplicatas, na ordem recebida.
    pub selected: Vec<FactId>,
    pub results: Vec<Conclusion>,
    pub trace: Vec<TraceEntry>,
    pub status: InferenceStatus,
    /// Fatos conhecidos ao final: entrada primeiro, depois os derivados.
    pub known: Vec<FactId>,
    /// Passagens completas sobre as regras (0 para entrada vazia).
    pub passes: usize,
}

impl Inference {
    /// O trace como linhas de texto.
    pub fn trace_lines(&self) -> Vec<String> {
        self.trace.iter().map(ToString::to_string).collect()
    }

    /// Quantas regras dispararam.
    pub fn firing_count(&self) -> usize {
        self.trace.iter().filter(|t| t.is_firing()).count()
    }
}
