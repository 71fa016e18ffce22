//! Dependency graph over cards.
//!
//! Edges run from prerequisite to dependent. Only ordering edges (`blocks`,
//! `depends_on`) enter the adjacency map used for cycle detection; every edge
//! is still kept for analytics.
//!
//! Cycle detection is a depth-first search with visited/in-stack marks driven
//! by an explicit stack, so deep chains cannot overflow the call stack. A
//! traversal that visits more nodes than its step limit fails with
//! `IntegrityViolation`.

use crate::error::{EngineError, Result};
use crate::types::{Card, CardId, Dependency, Edge, RelationType, Relationship};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InStack,
    Done,
}

struct Frame {
    node: CardId,
    children: Vec<CardId>,
    next: usize,
}

/// Adjacency view of card dependencies
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    adjacency: BTreeMap<CardId, Vec<CardId>>,
    reverse: BTreeMap<CardId, Vec<CardId>>,
    edges: Vec<Edge>,
    step_limit: usize,
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self {
            adjacency: BTreeMap::new(),
            reverse: BTreeMap::new(),
            edges: Vec::new(),
            step_limit: usize::MAX,
        }
    }
}

impl DependencyGraph {
    /// Empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the dependency lists of `cards`
    pub fn from_cards<'a>(cards: impl IntoIterator<Item = &'a Card>) -> Self {
        let mut graph = Self::new();
        for card in cards {
            for dep in &card.dependencies {
                graph.insert_edge(Edge {
                    source: dep.on.clone(),
                    target: card.id.clone(),
                    kind: dep.kind,
                });
            }
        }
        graph
    }

    /// Build from free-standing relationships
    pub fn from_relationships<'a>(
        relationships: impl IntoIterator<Item = &'a Relationship>,
    ) -> Self {
        let mut graph = Self::new();
        for relationship in relationships {
            graph.insert_edge(relationship.edge());
        }
        graph
    }

    /// Cap the number of nodes a single traversal may visit
    pub fn with_step_limit(mut self, limit: usize) -> Self {
        self.step_limit = limit;
        self
    }

    /// Add an edge
    pub fn insert_edge(&mut self, edge: Edge) {
        if edge.kind.is_ordering() {
            let targets = self.adjacency.entry(edge.source.clone()).or_default();
            if !targets.contains(&edge.target) {
                targets.push(edge.target.clone());
                self.reverse
                    .entry(edge.target.clone())
                    .or_default()
                    .push(edge.source.clone());
            }
        }
        self.edges.push(edge);
    }

    /// All edges, informational ones included
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Cards that directly depend on `id` through ordering edges
    pub fn dependents_of(&self, id: &CardId) -> &[CardId] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Direct ordering prerequisites of `id`
    pub fn prerequisites_of(&self, id: &CardId) -> &[CardId] {
        self.reverse.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether adding the ordering edge `from -> to` would close a cycle.
    ///
    /// Simulates the insertion and searches from `to`; true iff `from == to`
    /// or `to` already reaches `from`.
    pub fn would_create_cycle(&self, from: &CardId, to: &CardId) -> Result<bool> {
        if from == to {
            return Ok(true);
        }
        let mut marks = HashMap::new();
        let mut steps = 0;
        let hit = self.search(to, Some((from, to)), &mut marks, &mut steps)?;
        debug!(%from, %to, steps, cycle = hit.is_some(), "checked candidate dependency");
        Ok(hit.is_some())
    }

    /// Find a node on some cycle, if the graph has one
    pub fn find_cycle(&self) -> Result<Option<CardId>> {
        let mut marks = HashMap::new();
        let mut steps = 0;
        for node in self.adjacency.keys() {
            if let Some(hit) = self.search(node, None, &mut marks, &mut steps)? {
                return Ok(Some(hit));
            }
        }
        Ok(None)
    }

    /// Reject the candidate edge with `Cycle { target: to }` if it would close
    /// a cycle. Informational kinds always pass.
    pub fn check_insert(&self, from: &CardId, to: &CardId, kind: RelationType) -> Result<()> {
        if kind.is_ordering() && self.would_create_cycle(from, to)? {
            return Err(EngineError::Cycle {
                target: to.to_string(),
            });
        }
        Ok(())
    }

    fn children(&self, node: &CardId, extra: Option<(&CardId, &CardId)>) -> Vec<CardId> {
        let mut children = self.adjacency.get(node).cloned().unwrap_or_default();
        if let Some((from, to)) = extra {
            if node == from && !children.contains(to) {
                children.push(to.clone());
            }
        }
        children
    }

    fn push(
        &self,
        node: &CardId,
        extra: Option<(&CardId, &CardId)>,
        marks: &mut HashMap<CardId, Mark>,
        steps: &mut usize,
        stack: &mut Vec<Frame>,
    ) -> Result<()> {
        *steps += 1;
        if *steps > self.step_limit {
            warn!(limit = self.step_limit, %node, "dependency traversal exceeded step limit");
            return Err(EngineError::integrity(format!(
                "dependency traversal exceeded {} steps",
                self.step_limit
            )));
        }
        marks.insert(node.clone(), Mark::InStack);
        stack.push(Frame {
            node: node.clone(),
            children: self.children(node, extra),
            next: 0,
        });
        Ok(())
    }

    /// Depth-first search from `start`; returns the in-stack node that was
    /// reached again, if any.
    fn search(
        &self,
        start: &CardId,
        extra: Option<(&CardId, &CardId)>,
        marks: &mut HashMap<CardId, Mark>,
        steps: &mut usize,
    ) -> Result<Option<CardId>> {
        if marks.contains_key(start) {
            return Ok(None);
        }
        let mut stack = Vec::new();
        self.push(start, extra, marks, steps, &mut stack)?;

        loop {
            let next_child = match stack.last_mut() {
                None => break,
                Some(frame) if frame.next < frame.children.len() => {
                    frame.next += 1;
                    Some(frame.children[frame.next - 1].clone())
                }
                Some(_) => None,
            };

            match next_child {
                Some(child) => match marks.get(&child) {
                    Some(Mark::InStack) => return Ok(Some(child)),
                    Some(Mark::Done) => {}
                    None => self.push(&child, extra, marks, steps, &mut stack)?,
                },
                None => {
                    if let Some(frame) = stack.pop() {
                        marks.insert(frame.node, Mark::Done);
                    }
                }
            }
        }
        Ok(None)
    }
}

/// Whether making `to` depend on `from` would create a cycle among `cards`
pub fn would_create_circular_dependency(
    cards: &[Card],
    from: &CardId,
    to: &CardId,
) -> Result<bool> {
    DependencyGraph::from_cards(cards).would_create_cycle(from, to)
}

/// Make `to` depend on `from` with relation `kind`.
///
/// Both cards must be in `cards`. An existing entry for the same pair is
/// updated in place. Nothing is modified when the edge would close a cycle.
pub fn add_dependency(
    cards: &mut [Card],
    from: &CardId,
    to: &CardId,
    kind: RelationType,
) -> Result<()> {
    if !cards.iter().any(|c| &c.id == from) {
        return Err(EngineError::CardNotFound {
            id: from.to_string(),
        });
    }
    let dependent = cards
        .iter()
        .position(|c| &c.id == to)
        .ok_or_else(|| EngineError::CardNotFound { id: to.to_string() })?;

    DependencyGraph::from_cards(cards.iter()).check_insert(from, to, kind)?;

    upsert_dependency(&mut cards[dependent], Dependency::new(from.clone()).with_kind(kind));
    info!(%from, %to, %kind, "dependency added");
    Ok(())
}

/// Remove the dependency of `to` on `from`. Returns whether an entry was
/// removed; removal never fails.
pub fn remove_dependency(cards: &mut [Card], from: &CardId, to: &CardId) -> bool {
    cards
        .iter_mut()
        .find(|c| &c.id == to)
        .map(|card| drop_dependency(card, from))
        .unwrap_or(false)
}

pub(crate) fn upsert_dependency(card: &mut Card, dependency: Dependency) {
    match card.dependencies.iter_mut().find(|d| d.on == dependency.on) {
        Some(existing) => {
            existing.kind = dependency.kind;
            if dependency.strength.is_some() {
                existing.strength = dependency.strength;
            }
        }
        None => card.dependencies.push(dependency),
    }
}

pub(crate) fn drop_dependency(card: &mut Card, from: &CardId) -> bool {
    let before = card.dependencies.len();
    card.dependencies.retain(|d| &d.on != from);
    card.dependencies.len() != before
}
