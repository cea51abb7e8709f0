//! # Módulo Inference — Motor de Regras de Produção
//!
//! Este módulo contém o **motor de inferência** do sistema especialista,
//! responsável por derivar conclusões a partir dos fatos selecionados pelo
//! usuário e das regras da base de conhecimento.
//!
//! ## Políticas
//!
//! | Política | Realimenta conclusões? | Uso |
//! |----------|------------------------|-----|
//! | **Passagem única** | Não | Diagnóstico: vários diagnósticos simultâneos |
//! | **Fechamento** | Sim, até o ponto fixo | Livros: características intermediárias |
//!
//! ## Exemplo
//!
//! ```text
//! Entrada: {1, 6, 8, 9, 18}
//! Regras:  {1,6,8,9} → Úlcera gástrica, {1,6,8,9,18} → Colecistite
//! Passagem única: [Úlcera gástrica, Colecistite]
//! ```
//!
//! Veja [`InferenceEngine`] para detalhes.

/// Sub-módulo com o motor e as políticas de casamento.
pub mod engine;

/// Sub-módulo com os tipos de resultado (trace, conclusões, status).
pub mod trace;

pub use engine::{EngineSettings, InferenceEngine, MatchPolicy, Presentation};
pub use trace::{Conclusion, Inference, InferenceStatus, TraceEntry};
