//! Structural analytics over the dependency graph.
//!
//! Everything here is derived and stateless: build a [`GraphAnalytics`] view
//! from nodes and edges, read what you need, drop it.
//!
//! [`find_critical_path`] is a ranking heuristic (inbound blocking edges),
//! not a duration-based schedule. Its `total_duration` is a plain sum of
//! estimates and must not be read as a project end date.

use crate::config::EngineConfig;
use crate::types::{Card, CardId, Edge, RelationType, Relationship, RelationshipId};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// Summary statistics of a graph
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub average_degree: f64,
    pub density: f64,
    pub isolated_nodes: Vec<CardId>,
    /// Up to `hub_count` highest-degree nodes. Nodes without edges are never
    /// hubs, so this holds fewer entries when the graph has isolated nodes.
    pub hub_nodes: Vec<CardId>,
    pub most_common_relation_type: Option<RelationType>,
}

/// Approximate critical path
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalPath {
    pub card_ids: Vec<CardId>,
    pub relationship_ids: Vec<RelationshipId>,
    pub total_duration: f64,
    pub bottlenecks: Vec<CardId>,
}

/// Degree-based view of a node set and the edges among them
#[derive(Debug, Clone)]
pub struct GraphAnalytics {
    degrees: BTreeMap<CardId, usize>,
    edges: Vec<Edge>,
}

impl GraphAnalytics {
    /// Build the view. Edges with an endpoint outside `nodes` are ignored.
    pub fn new<'a>(
        nodes: impl IntoIterator<Item = &'a CardId>,
        edges: impl IntoIterator<Item = Edge>,
    ) -> Self {
        let mut degrees: BTreeMap<CardId, usize> =
            nodes.into_iter().map(|id| (id.clone(), 0)).collect();

        let mut kept = Vec::new();
        for edge in edges {
            if !degrees.contains_key(&edge.source) || !degrees.contains_key(&edge.target) {
                debug!(
                    source = %edge.source,
                    target = %edge.target,
                    "ignoring edge to unknown node"
                );
                continue;
            }
            if let Some(d) = degrees.get_mut(&edge.source) {
                *d += 1;
            }
            if edge.source != edge.target {
                if let Some(d) = degrees.get_mut(&edge.target) {
                    *d += 1;
                }
            }
            kept.push(edge);
        }

        Self {
            degrees,
            edges: kept,
        }
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.degrees.len()
    }

    /// Number of counted edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges touching `node`, either direction
    pub fn degree(&self, node: &CardId) -> usize {
        self.degrees.get(node).copied().unwrap_or(0)
    }

    /// `edges / (n * (n - 1) / 2)`; 0 when there are fewer than two nodes
    pub fn density(&self) -> f64 {
        let n = self.node_count();
        if n < 2 {
            return 0.0;
        }
        let possible = (n * (n - 1)) as f64 / 2.0;
        self.edge_count() as f64 / possible
    }

    /// Mean degree; 0 for an empty graph
    pub fn average_degree(&self) -> f64 {
        if self.degrees.is_empty() {
            return 0.0;
        }
        self.degrees.values().sum::<usize>() as f64 / self.node_count() as f64
    }

    /// Top `k` nodes by degree, ties broken by id ascending. Nodes without
    /// edges are never hubs.
    pub fn hub_nodes(&self, k: usize) -> Vec<CardId> {
        let mut ranked: Vec<(&CardId, usize)> = self
            .degrees
            .iter()
            .filter(|(_, d)| **d > 0)
            .map(|(id, d)| (id, *d))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.into_iter().take(k).map(|(id, _)| id.clone()).collect()
    }

    /// Nodes with degree 0, in id order
    pub fn isolated_nodes(&self) -> Vec<CardId> {
        self.degrees
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Relation type with the most edges; ties go to the earlier-declared type
    pub fn most_common_relation_type(&self) -> Option<RelationType> {
        let mut counts: HashMap<RelationType, usize> = HashMap::new();
        for edge in &self.edges {
            *counts.entry(edge.kind).or_default() += 1;
        }
        RelationType::ALL
            .iter()
            .filter_map(|kind| counts.get(kind).map(|c| (*kind, *c)))
            .fold(None, |best: Option<(RelationType, usize)>, (kind, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((kind, count)),
            })
            .map(|(kind, _)| kind)
    }

    /// Inbound ordering-edge count per node
    pub fn inbound_blocking(&self) -> BTreeMap<&CardId, usize> {
        let mut inbound = BTreeMap::new();
        for edge in self.edges.iter().filter(|e| e.kind.is_ordering()) {
            *inbound.entry(&edge.target).or_insert(0) += 1;
        }
        inbound
    }

    /// All statistics at once
    pub fn stats(&self, hub_count: usize) -> GraphStats {
        GraphStats {
            total_nodes: self.node_count(),
            total_edges: self.edge_count(),
            average_degree: self.average_degree(),
            density: self.density(),
            isolated_nodes: self.isolated_nodes(),
            hub_nodes: self.hub_nodes(hub_count),
            most_common_relation_type: self.most_common_relation_type(),
        }
    }
}

/// Compute summary statistics for `nodes` and `edges`
pub fn calculate_graph_stats(
    nodes: &[CardId],
    edges: &[Relationship],
    config: &EngineConfig,
) -> GraphStats {
    GraphAnalytics::new(nodes, edges.iter().map(Relationship::edge)).stats(config.hub_count)
}

/// Rank cards by inbound `blocks`/`depends_on` edges and keep the top ones.
///
/// Members are the `critical_path_length` cards with the most inbound
/// ordering edges (ties by id), highest first; cards with none are left out.
/// The first `bottleneck_count` members are the bottlenecks.
pub fn find_critical_path(
    cards: &[Card],
    relationships: &[Relationship],
    config: &EngineConfig,
) -> CriticalPath {
    let ids: Vec<&CardId> = cards.iter().map(|c| &c.id).collect();
    let analytics = GraphAnalytics::new(ids, relationships.iter().map(Relationship::edge));

    let mut ranked: Vec<(&CardId, usize)> = analytics.inbound_blocking().into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let card_ids: Vec<CardId> = ranked
        .into_iter()
        .take(config.critical_path_length)
        .map(|(id, _)| id.clone())
        .collect();
    let members: BTreeSet<&CardId> = card_ids.iter().collect();

    let relationship_ids = relationships
        .iter()
        .filter(|r| r.kind.is_ordering())
        .filter(|r| members.contains(&r.source_id) && members.contains(&r.target_id))
        .map(|r| r.id.clone())
        .collect();

    let total_duration = cards
        .iter()
        .filter(|c| members.contains(&c.id))
        .filter_map(|c| c.estimated_hours)
        .sum();

    let bottlenecks = card_ids
        .iter()
        .take(config.bottleneck_count)
        .cloned()
        .collect();

    CriticalPath {
        card_ids,
        relationship_ids,
        total_duration,
        bottlenecks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<CardId> {
        raw.iter().map(|s| CardId::from(*s)).collect()
    }

    fn rel(id: &str, source: &str, target: &str, kind: RelationType) -> Relationship {
        Relationship::new(source, target, kind).with_id(id)
    }

    #[test]
    fn test_path_graph_stats() {
        let nodes = ids(&["a", "b", "c", "d"]);
        let edges = vec![
            rel("r1", "a", "b", RelationType::Blocks),
            rel("r2", "b", "c", RelationType::Blocks),
            rel("r3", "c", "d", RelationType::Blocks),
        ];
        let stats = calculate_graph_stats(&nodes, &edges, &EngineConfig::default());

        assert_eq!(stats.total_nodes, 4);
        assert_eq!(stats.total_edges, 3);
        assert_eq!(stats.density, 0.5);
        assert_eq!(stats.average_degree, 1.5);
        assert!(stats.isolated_nodes.is_empty());
        assert_eq!(stats.hub_nodes, ids(&["b", "c", "a", "d"]));
        assert_eq!(stats.most_common_relation_type, Some(RelationType::Blocks));
    }

    #[test]
    fn test_density_small_graphs() {
        let none: Vec<CardId> = Vec::new();
        let empty = GraphAnalytics::new(&none, Vec::<Edge>::new());
        assert_eq!(empty.density(), 0.0);
        assert_eq!(empty.average_degree(), 0.0);

        let single = ids(&["a"]);
        assert_eq!(GraphAnalytics::new(&single, Vec::<Edge>::new()).density(), 0.0);
    }

    #[test]
    fn test_isolated_and_degree() {
        let nodes = ids(&["a", "b", "z"]);
        let edges = vec![rel("r1", "a", "b", RelationType::RelatesTo).edge()];
        let analytics = GraphAnalytics::new(&nodes, edges);
        assert_eq!(analytics.degree(&"a".into()), 1);
        assert_eq!(analytics.degree(&"missing".into()), 0);
        assert_eq!(analytics.isolated_nodes(), ids(&["z"]));
    }

    #[test]
    fn test_edges_to_unknown_nodes_ignored() {
        let nodes = ids(&["a", "b"]);
        let edges = vec![
            rel("r1", "a", "b", RelationType::Blocks).edge(),
            rel("r2", "a", "ghost", RelationType::Blocks).edge(),
        ];
        let analytics = GraphAnalytics::new(&nodes, edges);
        assert_eq!(analytics.edge_count(), 1);
        assert_eq!(analytics.degree(&"a".into()), 1);
    }

    #[test]
    fn test_hub_ties_break_by_id() {
        let nodes = ids(&["d", "c", "b", "a"]);
        let edges = vec![
            rel("r1", "d", "c", RelationType::Blocks).edge(),
            rel("r2", "b", "a", RelationType::Blocks).edge(),
        ];
        let analytics = GraphAnalytics::new(&nodes, edges);
        assert_eq!(analytics.hub_nodes(2), ids(&["a", "b"]));
        assert_eq!(analytics.hub_nodes(10).len(), 4);
    }

    #[test]
    fn test_stats_hubs_skip_isolated_nodes() {
        let nodes = ids(&["a", "b", "lonely"]);
        let edges = vec![rel("r1", "a", "b", RelationType::Blocks)];
        let stats = calculate_graph_stats(&nodes, &edges, &EngineConfig::default());
        assert_eq!(stats.hub_nodes, ids(&["a", "b"]));
        assert_eq!(stats.isolated_nodes, ids(&["lonely"]));
    }

    #[test]
    fn test_most_common_relation_ties_go_to_declaration_order() {
        let nodes = ids(&["a", "b", "c"]);
        let edges = vec![
            rel("r1", "a", "b", RelationType::SimilarTo).edge(),
            rel("r2", "b", "c", RelationType::DependsOn).edge(),
        ];
        let analytics = GraphAnalytics::new(&nodes, edges);
        assert_eq!(
            analytics.most_common_relation_type(),
            Some(RelationType::DependsOn)
        );
        let empty = GraphAnalytics::new(&nodes, Vec::<Edge>::new());
        assert_eq!(empty.most_common_relation_type(), None);
    }

    #[test]
    fn test_critical_path_ranks_by_inbound_blocking() {
        let cards = vec![
            Card::new("a", "todo").with_estimate(2.0),
            Card::new("b", "todo").with_estimate(3.0),
            Card::new("c", "todo").with_estimate(5.0),
            Card::new("d", "todo"),
        ];
        let relationships = vec![
            rel("r1", "a", "c", RelationType::Blocks),
            rel("r2", "b", "c", RelationType::DependsOn),
            rel("r3", "a", "b", RelationType::Blocks),
            rel("r4", "d", "a", RelationType::RelatesTo),
        ];
        let path = find_critical_path(&cards, &relationships, &EngineConfig::default());

        assert_eq!(path.card_ids, ids(&["c", "b"]));
        assert_eq!(path.bottlenecks, ids(&["c", "b"]));
        assert_eq!(path.relationship_ids, vec![RelationshipId::from("r2")]);
        assert_eq!(path.total_duration, 8.0);
    }

    #[test]
    fn test_critical_path_respects_length_and_bottleneck_count() {
        let cards: Vec<Card> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|id| Card::new(*id, "todo"))
            .collect();
        let relationships = vec![
            rel("r1", "a", "b", RelationType::Blocks),
            rel("r2", "a", "c", RelationType::Blocks),
            rel("r3", "b", "c", RelationType::Blocks),
            rel("r4", "c", "d", RelationType::Blocks),
            rel("r5", "d", "e", RelationType::Blocks),
        ];
        let config = EngineConfig {
            critical_path_length: 2,
            bottleneck_count: 1,
            ..Default::default()
        };
        let path = find_critical_path(&cards, &relationships, &config);
        assert_eq!(path.card_ids, ids(&["c", "b"]));
        assert_eq!(path.bottlenecks, ids(&["c"]));
        assert_eq!(path.total_duration, 0.0);
    }

    #[test]
    fn test_critical_path_without_blocking_edges_is_empty() {
        let cards = vec![Card::new("a", "todo"), Card::new("b", "todo")];
        let relationships = vec![rel("r1", "a", "b", RelationType::RelatesTo)];
        let path = find_critical_path(&cards, &relationships, &EngineConfig::default());
        assert!(path.card_ids.is_empty());
        assert!(path.bottlenecks.is_empty());
    }
}
