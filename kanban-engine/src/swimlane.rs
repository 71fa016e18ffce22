//! Swimlane projection: group cards into horizontal lanes.

use crate::types::{Card, CardId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute cards are grouped by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    #[default]
    None,
    Assignee,
    Priority,
    Label,
}

impl GroupBy {
    /// Id and title of the lane for cards without the attribute
    fn fallback(self) -> (&'static str, &'static str) {
        match self {
            GroupBy::None => ("all", "All Cards"),
            GroupBy::Assignee => ("unassigned", "Unassigned"),
            GroupBy::Priority => ("no-priority", "No Priority"),
            GroupBy::Label => ("no-label", "No Label"),
        }
    }

    /// Lane keys of a card as `(id, title)` pairs; empty means fallback
    fn keys(self, card: &Card) -> Vec<(String, String)> {
        match self {
            GroupBy::None => Vec::new(),
            GroupBy::Assignee => card
                .assignee
                .as_deref()
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(|a| vec![(a.to_string(), a.to_string())])
                .unwrap_or_default(),
            GroupBy::Priority => card
                .priority
                .map(|p| vec![(p.title().to_lowercase(), p.title().to_string())])
                .unwrap_or_default(),
            GroupBy::Label => card
                .labels
                .iter()
                .map(|l| l.trim())
                .filter(|l| !l.is_empty())
                .map(|l| (l.to_string(), l.to_string()))
                .collect(),
        }
    }
}

/// A horizontal group of cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Swimlane {
    pub id: String,
    pub title: String,
    pub card_ids: Vec<CardId>,
}

impl Swimlane {
    fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            card_ids: Vec::new(),
        }
    }

    fn push(&mut self, card: &CardId) {
        if !self.card_ids.contains(card) {
            self.card_ids.push(card.clone());
        }
    }
}

/// Group `cards` into lanes.
///
/// Lanes are ordered by title (case-insensitive, then id) with the fallback
/// lane last, present only when some card lacks the attribute. Cards keep
/// their input order inside a lane.
pub fn project_swimlanes<'a>(
    cards: impl IntoIterator<Item = &'a Card>,
    group_by: GroupBy,
) -> Vec<Swimlane> {
    let (fallback_id, fallback_title) = group_by.fallback();
    let mut fallback = Swimlane::new(fallback_id, fallback_title);
    let mut lanes: BTreeMap<String, Swimlane> = BTreeMap::new();

    for card in cards {
        let keys = group_by.keys(card);
        if keys.is_empty() {
            fallback.push(&card.id);
            continue;
        }
        for (id, title) in keys {
            lanes
                .entry(id.clone())
                .or_insert_with(|| Swimlane::new(id, title))
                .push(&card.id);
        }
    }

    let mut result: Vec<Swimlane> = lanes.into_values().collect();
    result.sort_by(|a, b| {
        a.title
            .to_lowercase()
            .cmp(&b.title.to_lowercase())
            .then_with(|| a.id.cmp(&b.id))
    });
    if !fallback.card_ids.is_empty() {
        result.push(fallback);
    }
    result
}
