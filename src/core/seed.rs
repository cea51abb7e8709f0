//! # Bases de Conhecimento Iniciais
//!
//! Na primeira execução (sem arquivo em disco) a base é semeada com um
//! dos dois domínios embutidos:
//!
//! | Domínio | Ids | Fatos | Regras | Uso típico |
//! |---------|-----|-------|--------|------------|
//! | [`Domain::Diagnosis`] | numéricos (`1`–`20`, `101`–`110`) | 20 sintomas + 10 diagnósticos | 12 | passagem única |
//! | [`Domain::Books`] | textuais (autonomeados) | características + livros | 7 | fechamento |
//!
//! As descrições das regras de diagnóstico são geradas a partir dos nomes
//! (`"Náusea+Vômito->Gastrite"`); as regras de livros não têm descrição.

use std::fmt;
use std::str::FromStr;

use super::fact::{FactEntry, FactId, FactKind};
use super::knowledge_base::KnowledgeBase;
use super::rule::RuleDraft;
use crate::error::ConfigError;

/// Domínio de conhecimento de uma implantação.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Domain {
    /// Diagnóstico de dor abdominal por sintomas.
    Diagnosis,
    /// Identificação de livros por características.
    Books,
}

impl Domain {
    /// Nome usado em variáveis de ambiente e nomes de arquivo.
    pub fn slug(&self) -> &'static str {
        match self {
            Domain::Diagnosis => "diagnostico",
            Domain::Books => "livros",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Domain {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "diagnostico" | "diagnóstico" => Ok(Domain::Diagnosis),
            "livros" => Ok(Domain::Books),
            _ => Err(ConfigError::InvalidValue {
                var: "ENGINE_DOMAIN",
                value: s.to_string(),
                expected: "diagnostico | livros",
            }),
        }
    }
}

/// Cria a base inicial do domínio.
pub fn seed(domain: Domain) -> KnowledgeBase {
    let kb = match domain {
        Domain::Diagnosis => seed_diagnosis(),
        Domain::Books => seed_books(),
    };
    tracing::info!(
        domain = %domain,
        facts = kb.fact_count(),
        rules = kb.rule_count(),
        "KB semeada"
    );
    kb
}

const SYMPTOMS: [(u32, &str, &str); 20] = [
    (1, "Dor epigástrica", "Dor abdominal acima do umbigo"),
    (2, "Dor no baixo ventre", "Dor abdominal abaixo do umbigo"),
    (3, "Dor no flanco esquerdo", "Dor no lado esquerdo do abdômen"),
    (4, "Dor no flanco direito", "Dor no lado direito do abdômen"),
    (5, "Dor abdominal difusa", "Dor em todo o abdômen"),
    (6, "Dor contínua", "Dor persistente, sem alívio evidente"),
    (7, "Dor em cólica", "Dor que vem em crises"),
    (8, "Náusea", "Sensação de vontade de vomitar"),
    (9, "Vômito", "Expulsão do conteúdo gástrico pela boca"),
    (10, "Diarreia", "Evacuações frequentes e amolecidas"),
    (11, "Constipação", "Dificuldade ou redução das evacuações"),
    (12, "Febre", "Temperatura corporal acima do normal"),
    (13, "Icterícia", "Pele e esclera amareladas"),
    (14, "Hematúria", "Sangue na urina"),
    (15, "Sangue nas fezes", "Presença de sangue nas evacuações"),
    (16, "Excesso alimentar", "Ingestão recente de grande quantidade de comida"),
    (17, "Consumo de álcool", "Ingestão recente de bebida alcoólica"),
    (18, "Comida gordurosa", "Ingestão recente de alimentos gordurosos"),
    (19, "Alteração menstrual", "Alteração do ciclo ou do fluxo menstrual"),
    (20, "Trauma abdominal", "Impacto recente sobre o abdômen"),
];

const DIAGNOSES: [(u32, &str, &str); 10] = [
    (101, "Gastrite", "Inflamação da mucosa gástrica: dor epigástrica, náusea, vômito"),
    (102, "Úlcera gástrica", "Lesão ulcerosa da mucosa gástrica com dor epigástrica periódica"),
    (103, "Colecistite", "Inflamação da vesícula biliar, geralmente por cálculos: dor no flanco direito, febre"),
    (104, "Apendicite", "Inflamação do apêndice: dor migratória para o flanco direito"),
    (105, "Pancreatite", "Inflamação do pâncreas, associada a excesso alimentar ou álcool"),
    (106, "Obstrução intestinal", "Bloqueio do trânsito intestinal: dor, vômito, parada de eliminação"),
    (107, "Cálculo urinário", "Cálculo no trato urinário: dor no flanco, hematúria"),
    (108, "Gastroenterite aguda", "Inflamação aguda do trato gastrointestinal: dor, diarreia, vômito"),
    (109, "Inflamação ginecológica", "Inflamação do sistema reprodutor feminino: dor no baixo ventre"),
    (110, "Peritonite", "Inflamação do peritônio: dor abdominal difusa, febre"),
];

const DIAGNOSIS_RULES: [(&str, u32); 12] = [
    ("1,6,8,9,16,17", 105),
    ("1,7,8,9", 101),
    ("1,6,8,9", 102),
    ("4,6,12,18", 103),
    ("4,7,12", 104),
    ("5,6,9,11", 106),
    ("3,7,14", 107),
    ("2,7,10,12", 108),
    ("2,6,19", 109),
    ("5,6,12", 110),
    ("4,7,12,20", 104),
    ("1,6,8,9,18", 103),
];

fn seed_diagnosis() -> KnowledgeBase {
    let mut kb = KnowledgeBase::new("Diagnóstico de dor abdominal", false);
    for (id, name, description) in SYMPTOMS {
        kb.add_fact(FactEntry::new(id.into(), name, description, FactKind::Observation));
    }
    for (id, name, description) in DIAGNOSES {
        kb.add_fact(FactEntry::new(id.into(), name, description, FactKind::Conclusion));
    }
    for (premises, conclusion) in DIAGNOSIS_RULES {
        let Ok(mut draft) = RuleDraft::parse(premises, &conclusion.to_string(), "") else {
            continue;
        };
        let names: Vec<&str> = draft.premises.iter().map(|p| kb.resolve_name(p)).collect();
        draft.description = format!(
            "{}->{}",
            names.join("+"),
            kb.resolve_name(&FactId::from(conclusion))
        );
        if let Err(e) = kb.add_rule(draft) {
            tracing::warn!(error = %e, "Regra da semente ignorada");
        }
    }
    kb
}

const BOOK_RULES: [(&str, &str); 7] = [
    ("ficção científica,autor estrangeiro,século XX", "Fundação"),
    ("literatura,autor estrangeiro,século XIX", "Os Miseráveis"),
    ("filosofia,antiguidade,autor estrangeiro", "A República"),
    ("suspense,autor estrangeiro,contemporâneo", "As Aventuras de Sherlock Holmes"),
    ("tecnologia,não ficção,contemporâneo", "Sapiens"),
    ("robôs", "ficção científica"),
    ("viagem espacial", "ficção científica"),
];

fn seed_books() -> KnowledgeBase {
    let mut kb = KnowledgeBase::new("Identificação de livros", true);
    for (premises, conclusion) in BOOK_RULES {
        let Ok(draft) = RuleDraft::parse(premises, conclusion, "") else {
            continue;
        };
        if let Err(e) = kb.add_rule(draft) {
            tracing::warn!(error = %e, "Regra da semente ignorada");
        }
    }
    kb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnosis_seed_shape() {
        let kb = seed(Domain::Diagnosis);
        assert_eq!(kb.selectable_facts().len(), 20);
        assert_eq!(kb.conclusions().len(), 10);
        assert_eq!(kb.rule_count(), 12);
        let first = kb.rule(1).unwrap();
        assert_eq!(first.conclusion, "105");
        assert!(first.description.ends_with("->Pancreatite"));
        let (_, malformed) = kb.parsed_rules();
        assert!(malformed.is_empty());
    }

    /// "ficção científica" é característica e também conclusão de regras
    #[test]
    fn test_books_seed_self_named() {
        let kb = seed(Domain::Books);
        assert_eq!(kb.rule_count(), 7);
        let sci_fi = FactId::new("ficção científica").unwrap();
        assert_eq!(kb.resolve_name(&sci_fi), "ficção científica");
        assert_eq!(kb.fact(&sci_fi).unwrap().kind, FactKind::Observation);
        assert!(kb
            .conclusions()
            .iter()
            .any(|f| f.name == "Fundação"));
    }

    #[test]
    fn test_domain_from_str() {
        assert_eq!("Livros".parse::<Domain>().unwrap(), Domain::Books);
        assert_eq!("diagnóstico".parse::<Domain>().unwrap(), Domain::Diagnosis);
        assert!("receitas".parse::<Domain>().is_err());
    }
}
