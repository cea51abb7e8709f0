//! # Grafo de Conhecimento — Premissas → Conclusão
//!
//! Deriva, a partir das regras, um grafo dirigido usado **só para
//! visualização** (não para raciocínio):
//!
//! ```text
//! Regra: 1 + 6 + 12 → 110
//!
//!   1 ──┐
//!   6 ──┼──▶ 110
//!  12 ──┘
//! ```
//!
//! - **Nós**: todo identificador que aparece como premissa ou conclusão
//! - **Arestas**: uma por par `(premissa, conclusão)`. Grafo simples: pares
//!   repetidos em regras diferentes colapsam em uma aresta que lista os ids
//!   de todas as regras que a produziram.
//!
//! Usa `petgraph` para a estrutura e um `HashMap<FactId, NodeIndex>` para
//! lookup O(1) por identificador. Layout e desenho ficam com o cliente:
//! o endpoint `/knowledge/graph` entrega um [`GraphView`] em JSON.

use std::collections::HashMap;

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use thiserror::Error;

use crate::core::{FactId, FactKind, Rule};

/// Falhas da construção do grafo.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// Nenhum nó: o chamador deve pular a visualização.
    #[error("nenhuma regra para montar o grafo")]
    NoData,
}

/// Ids das regras que produziram uma aresta.
pub type EdgeRules = Vec<u32>;

/// Grafo dirigido premissa → conclusão.
pub struct KnowledgeGraph {
    graph: DiGraph<FactId, EdgeRules>,
    node_index: HashMap<FactId, NodeIndex>,
}

/// Monta o grafo a partir das regras.
///
/// Premissas vazias/só espaços são ignoradas.
///
/// # Erros
///
/// [`GraphError::NoData`] se nenhum nó resultar (sem regras).
pub fn build_graph(rules: &[Rule]) -> Result<KnowledgeGraph, GraphError> {
    let mut kg = KnowledgeGraph {
        graph: DiGraph::new(),
        node_index: HashMap::new(),
    };
    for rule in rules {
        let target = kg.ensure_node(&rule.conclusion);
        for premise in &rule.premises {
            if premise.as_str().trim().is_empty() {
                continue;
            }
            let source = kg.ensure_node(premise);
            match kg.graph.find_edge(source, target) {
                Some(edge) => {
                    if let Some(ids) = kg.graph.edge_weight_mut(edge) {
                        if !ids.contains(&rule.id) {
                            ids.push(rule.id);
                        }
                    }
                }
                None => {
                    kg.graph.add_edge(source, target, vec![rule.id]);
                }
            }
        }
    }
    if kg.graph.node_count() == 0 {
        return Err(GraphError::NoData);
    }
    tracing::debug!(
        nodes = kg.node_count(),
        edges = kg.edge_count(),
        "Grafo de conhecimento montado"
    );
    Ok(kg)
}

impl KnowledgeGraph {
    fn ensure_node(&mut self, id: &FactId) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(id.clone());
        self.node_index.insert(id.clone(), idx);
        idx
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Arestas `(premissa, conclusão, regras)` em ordem de inserção.
    pub fn edges(&self) -> impl Iterator<Item = (&FactId, &FactId, &EdgeRules)> {
        self.graph
            .edge_references()
            .map(move |e| (&self.graph[e.source()], &self.graph[e.target()], e.weight()))
    }

    /// Nós sem aresta de entrada: fatos que nenhuma regra conclui.
    pub fn observations(&self) -> Vec<&FactId> {
        self.nodes_without(Direction::Incoming)
    }

    /// Nós sem aresta de saída: conclusões que não alimentam outra regra.
    pub fn terminal_conclusions(&self) -> Vec<&FactId> {
        self.nodes_without(Direction::Outgoing)
    }

    fn nodes_without(&self, dir: Direction) -> Vec<&FactId> {
        self.graph
            .node_indices()
            .filter(|&idx| self.graph.neighbors_directed(idx, dir).next().is_none())
            .map(|idx| &self.graph[idx])
            .collect()
    }

    /// `true` se alguma cadeia de regras volta a um fato anterior.
    pub fn has_cycle(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Converte para a forma serializável, resolvendo nomes com `label`.
    pub fn to_view<F>(&self, mut label: F) -> GraphView
    where
        F: FnMut(&FactId) -> String,
    {
        let nodes = self
            .graph
            .node_indices()
            .map(|idx| {
                let id = &self.graph[idx];
                let kind = if self.graph.neighbors_directed(idx, Direction::Incoming).next().is_none() {
                    FactKind::Observation
                } else {
                    FactKind::Conclusion
                };
                GraphNode {
                    id: id.to_string(),
                    label: label(id),
                    kind: kind.css_class(),
                }
            })
            .collect();
        let edges = self
            .edges()
            .map(|(source, target, rules)| GraphEdge {
                source: source.to_string(),
                target: target.to_string(),
                rules: rules.clone(),
            })
            .collect();
        GraphView {
            nodes,
            edges,
            has_cycle: self.has_cycle(),
        }
    }
}

/// Grafo serializado para renderização externa.
#[derive(Debug, Serialize)]
pub struct GraphView {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub has_cycle: bool,
}

/// Nó do grafo serializado.
#[derive(Debug, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    /// `"observation"` (sem arestas de entrada) ou `"conclusion"`.
    pub kind: &'static str,
}

/// Aresta do grafo serializado.
#[derive(Debug, Serialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    /// Regras que produziram esta aresta.
    pub rules: EdgeRules,
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;
    use crate::core::{seed, Domain, RuleRow};

    fn rule(rule_id: u32, premises: &str, conclusion: &str) -> Rule {
        RuleRow {
            id: rule_id,
            premises: premises.into(),
            conclusion: conclusion.into(),
            description: String::new(),
        }
        .parse()
        .unwrap()
    }

    fn id(s: &str) -> FactId {
        FactId::new(s).unwrap()
    }

    #[test]
    fn test_no_rules_is_no_data() {
        assert_eq!(build_graph(&[]).err(), Some(GraphError::NoData));
    }

    /// Pares repetidos colapsam, guardando todas as regras de origem
    #[test]
    fn test_duplicate_pairs_collapse() {
        let rules = vec![rule(4, "4,7,12", "104"), rule(11, "4,7,12,20", "104")];
        let g = build_graph(&rules).unwrap();
        assert_eq!(g.node_count(), 5);
        assert_eq!(g.edge_count(), 4);
        let (_, _, sources) = g
            .edges()
            .find(|(s, _, _)| **s == id("4"))
            .unwrap();
        assert_eq!(sources, &vec![4, 11]);
    }

    /// Uma aresta por par distinto e todo identificador vira nó
    #[test]
    fn test_edges_match_distinct_pairs() {
        let kb = seed(Domain::Diagnosis);
        let (rules, _) = kb.parsed_rules();
        let g = build_graph(&rules).unwrap();

        let mut pairs = HashSet::new();
        let mut ids = HashSet::new();
        for r in &rules {
            ids.insert(r.conclusion.to_string());
            for p in &r.premises {
                ids.insert(p.to_string());
                pairs.insert((p.clone(), r.conclusion.clone()));
            }
        }
        assert_eq!(g.edge_count(), pairs.len());
        let view = g.to_view(|id| id.to_string());
        let nodes: HashSet<String> = view.nodes.into_iter().map(|n| n.id).collect();
        assert_eq!(nodes, ids);
        assert!(!g.has_cycle());
    }

    #[test]
    fn test_observations_and_terminals() {
        let rules = vec![
            rule(1, "robôs", "ficção científica"),
            rule(2, "ficção científica,século XX", "Fundação"),
        ];
        let g = build_graph(&rules).unwrap();
        assert_eq!(g.observations(), vec![&id("robôs"), &id("século XX")]);
        assert_eq!(g.terminal_conclusions(), vec![&id("Fundação")]);
    }

    #[test]
    fn test_cycle_detection() {
        let rules = vec![rule(1, "a", "b"), rule(2, "b", "a")];
        assert!(build_graph(&rules).unwrap().has_cycle());
    }

    #[test]
    fn test_view_uses_labels() {
        let kb = seed(Domain::Diagnosis);
        let (rules, _) = kb.parsed_rules();
        let view = build_graph(&rules[..1])
            .unwrap()
            .to_view(|id| kb.resolve_name(id).to_string());
        assert_eq!(view.nodes[0].label, "Pancreatite");
        assert_eq!(view.nodes[0].kind, "conclusion");
        assert_eq!(view.nodes[1].kind, "observation");
        assert_eq!(view.edges.len(), 6);
    }

    proptest! {
        /// Uma aresta por par distinto, com todas as regras que o produzem
        #[test]
        fn property_one_edge_per_distinct_pair(
            raw in prop::collection::vec((prop::collection::vec(0..5usize, 1..4), 0..5usize), 1..8)
        ) {
            let rules: Vec<Rule> = raw
                .into_iter()
                .zip(1u32..)
                .map(|((premises, conclusion), rule_id)| {
                    let premises: Vec<String> = premises.iter().map(|p| format!("n{p}")).collect();
                    rule(rule_id, &premises.join(","), &format!("n{conclusion}"))
                })
                .collect();
            let g = build_graph(&rules).unwrap();

            let mut pairs: HashMap<(FactId, FactId), EdgeRules> = HashMap::new();
            let mut ids = HashSet::new();
            for r in &rules {
                ids.insert(r.conclusion.clone());
                for p in &r.premises {
                    ids.insert(p.clone());
                    let sources = pairs.entry((p.clone(), r.conclusion.clone())).or_default();
                    if !sources.contains(&r.id) {
                        sources.push(r.id);
                    }
                }
            }
            prop_assert_eq!(g.node_count(), ids.len());
            prop_assert_eq!(g.edge_count(), pairs.len());
            for (source, target, sources) in g.edges() {
                prop_assert_eq!(Some(sources), pairs.get(&(source.clone(), target.clone())));
            }
        }
    }
}
