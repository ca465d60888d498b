use std::collections::BTreeMap;

use super::{ItemScore, ScoreOutcome};
use crate::catalog::domain::{GroupId, Item, ItemId};

/// Running per-item totals for one session.
#[derive(Debug, Default)]
pub(crate) struct Tally {
    totals: BTreeMap<ItemId, (Item, f64)>,
}

impl Tally {
    /// Add one impact. Items outside `group` or inactive items are ignored.
    pub(crate) fn add(&mut self, group: GroupId, item: &Item, score: f64) {
        if !item.is_active || item.group_id != group {
            return;
        }
        self.totals
            .entry(item.id)
            .or_insert_with(|| (item.clone(), 0.0))
            .1 += score;
    }

    /// Rank the totals: score descending, then item name ascending.
    pub(crate) fn rank(self) -> ScoreOutcome {
        let scores: BTreeMap<ItemId, f64> = self
            .totals
            .iter()
            .map(|(id, (_, score))| (*id, *score))
            .collect();

        let mut breakdown: Vec<ItemScore> = self
            .totals
            .into_values()
            .map(|(item, score)| ItemScore { item, score })
            .collect();
        breakdown.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.item.name.cmp(&b.item.name))
        });

        let Some(max_score) = breakdown.first().map(|entry| entry.score) else {
            return ScoreOutcome::default();
        };

        // Exact equality on purpose: ties are only ties when the sums match bit for bit.
        let top_items: Vec<Item> = breakdown
            .iter()
            .filter(|entry| entry.score == max_score)
            .map(|entry| entry.item.clone())
            .collect();
        let recommended = top_items
            .iter()
            .min_by(|a, b| a.name.cmp(&b.name))
            .cloned();

        ScoreOutcome {
            scores,
            breakdown,
            top_items,
            recommended,
        }
    }
}
