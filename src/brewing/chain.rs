//! The ordered chain of fermentation steps within one brew.
//!
//! Steps are ordered by `(date, id)`. Ids grow with insertion, so two steps
//! logged for the same day keep the order in which they were recorded.
//!
//! The final gravity of one step and the original gravity of the step after
//! it are the same physical reading. Saving a step writes its readings into
//! its immediate neighbors only; nothing further along the chain is touched.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use crate::entities::fermentation_step;

type Step = fermentation_step::Model;

fn order_key(step: &Step) -> (NaiveDate, i32) {
    (step.date, step.id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Gravity {
    Original,
    Final,
}

/// One neighbor write produced by propagation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GravityUpdate {
    pub step_id: i32,
    pub gravity: Gravity,
    pub value: Option<f64>,
}

impl GravityUpdate {
    pub fn apply_to(&self, step: &mut Step) {
        match self.gravity {
            Gravity::Original => step.og = self.value,
            Gravity::Final => step.fg = self.value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FermentationChain {
    brew_id: i32,
    steps: Vec<Step>,
}

impl FermentationChain {
    pub fn new(brew_id: i32, mut steps: Vec<Step>) -> Self {
        steps.retain(|s| s.brew_id == brew_id);
        steps.sort_by_key(order_key);
        Self { brew_id, steps }
    }

    pub fn brew_id(&self) -> i32 {
        self.brew_id
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, step_id: i32) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == step_id)
    }

    pub fn first(&self) -> Option<&Step> {
        self.steps.first()
    }

    pub fn last(&self) -> Option<&Step> {
        self.steps.last()
    }

    pub fn previous_of(&self, step: &Step) -> Option<&Step> {
        let key = order_key(step);
        let idx = self.steps.partition_point(|s| order_key(s) < key);
        idx.checked_sub(1).map(|i| &self.steps[i])
    }

    pub fn next_of(&self, step: &Step) -> Option<&Step> {
        let key = order_key(step);
        let idx = self.steps.partition_point(|s| order_key(s) <= key);
        self.steps.get(idx)
    }

    /// Original gravity of the brew: the first step's reading.
    pub fn og(&self) -> Option<f64> {
        self.first().and_then(|s| s.og)
    }

    /// Final gravity of the brew: the last step's reading.
    pub fn fg(&self) -> Option<f64> {
        self.last().and_then(|s| s.fg)
    }

    pub fn fermentation_start_date(&self) -> Option<NaiveDate> {
        self.first().map(|s| s.date)
    }

    pub fn brew_length(&self) -> Option<f64> {
        self.first().and_then(|s| s.volume)
    }

    /// Neighbor writes required after `step` was inserted or updated.
    ///
    /// The previous step takes `step.og` as its final gravity. When `step.fg`
    /// is set, the next step takes it as its original gravity. Writes that
    /// would not change a value are left out.
    pub fn propagate(&self, step: &Step) -> Vec<GravityUpdate> {
        if step.brew_id != self.brew_id {
            warn!(
                step_id = step.id,
                step_brew = step.brew_id,
                chain_brew = self.brew_id,
                "step does not belong to this chain, nothing to propagate"
            );
            return Vec::new();
        }

        let mut updates = Vec::with_capacity(2);
        if let Some(prev) = self.previous_of(step) {
            if prev.fg != step.og {
                updates.push(GravityUpdate {
                    step_id: prev.id,
                    gravity: Gravity::Final,
                    value: step.og,
                });
            }
        }
        if let Some(fg) = step.fg {
            if let Some(next) = self.next_of(step) {
                if next.og != Some(fg) {
                    updates.push(GravityUpdate {
                        step_id: next.id,
                        gravity: Gravity::Original,
                        value: Some(fg),
                    });
                }
            }
        }
        updates
    }

    /// Reflect committed writes in this request's copy of the chain.
    pub fn apply(&mut self, updates: &[GravityUpdate]) {
        for update in updates {
            if let Some(step) = self.steps.iter_mut().find(|s| s.id == update.step_id) {
                update.apply_to(step);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn step(id: i32, day: u32, og: Option<f64>, fg: Option<f64>) -> Step {
        Step {
            id,
            brew_id: 1,
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            name: None,
            og,
            fg,
            volume: None,
            temperature: None,
            notes: None,
        }
    }

    fn three_step_chain() -> FermentationChain {
        FermentationChain::new(
            1,
            vec![
                step(3, 20, Some(5.0), Some(3.0)),
                step(1, 1, Some(12.0), Some(6.0)),
                step(2, 10, Some(6.0), Some(5.0)),
            ],
        )
    }

    /// Reload the chain with `new_step` in it, then stitch its neighbors.
    fn save(chain: &mut FermentationChain, new_step: Step) -> Vec<GravityUpdate> {
        let mut steps: Vec<Step> = chain
            .steps()
            .iter()
            .filter(|s| s.id != new_step.id)
            .cloned()
            .collect();
        steps.push(new_step.clone());
        *chain = FermentationChain::new(chain.brew_id(), steps);
        let updates = chain.propagate(&new_step);
        chain.apply(&updates);
        updates
    }

    #[test]
    fn test_chain_is_ordered_by_date() {
        let chain = three_step_chain();
        let ids: Vec<i32> = chain.steps().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(chain.first().unwrap().id, 1);
        assert_eq!(chain.last().unwrap().id, 3);
    }

    #[test]
    fn test_empty_chain() {
        let chain = FermentationChain::new(1, vec![]);
        assert!(chain.first().is_none());
        assert!(chain.last().is_none());
        assert!(chain.og().is_none());
        assert!(chain.fg().is_none());
        assert!(chain.propagate(&step(1, 1, Some(12.0), Some(3.0))).is_empty());
    }

    #[test]
    fn test_neighbors() {
        let chain = three_step_chain();
        let middle = chain.get(2).unwrap();
        assert_eq!(chain.previous_of(middle).unwrap().id, 1);
        assert_eq!(chain.next_of(middle).unwrap().id, 3);
        assert!(chain.previous_of(chain.first().unwrap()).is_none());
        assert!(chain.next_of(chain.last().unwrap()).is_none());
    }

    #[test]
    fn test_same_day_steps_keep_insertion_order() {
        let chain = FermentationChain::new(
            1,
            vec![step(8, 5, None, None), step(4, 5, None, None), step(6, 5, None, None)],
        );
        let ids: Vec<i32> = chain.steps().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![4, 6, 8]);
        let middle = chain.get(6).unwrap();
        assert_eq!(chain.previous_of(middle).unwrap().id, 4);
        assert_eq!(chain.next_of(middle).unwrap().id, 8);
    }

    #[test]
    fn test_insert_between_stitches_both_neighbors() {
        let mut chain = three_step_chain();
        let updates = save(&mut chain, step(4, 15, Some(4.5), Some(4.0)));
        assert_eq!(updates.len(), 2);
        assert_eq!(chain.get(2).unwrap().fg, Some(4.5));
        assert_eq!(chain.get(3).unwrap().og, Some(4.0));
        assert_eq!(chain.get(1).unwrap(), &step(1, 1, Some(12.0), Some(6.0)));
    }

    #[test]
    fn test_insert_before_all_only_touches_successor() {
        let mut chain = FermentationChain::new(
            1,
            vec![step(1, 10, Some(6.0), Some(5.0)), step(2, 20, Some(5.0), Some(3.0))],
        );
        let updates = save(&mut chain, step(3, 2, Some(12.0), Some(7.0)));
        assert_eq!(
            updates,
            vec![GravityUpdate {
                step_id: 1,
                gravity: Gravity::Original,
                value: Some(7.0),
            }]
        );
        assert_eq!(chain.get(2).unwrap().og, Some(5.0));
    }

    #[test]
    fn test_missing_og_clears_previous_fg() {
        let mut chain = three_step_chain();
        let updates = save(&mut chain, step(4, 25, None, None));
        assert_eq!(
            updates,
            vec![GravityUpdate {
                step_id: 3,
                gravity: Gravity::Final,
                value: None,
            }]
        );
        assert_eq!(chain.get(3).unwrap().fg, None);
    }

    #[test]
    fn test_propagation_is_idempotent() {
        let mut chain = three_step_chain();
        let new_step = step(4, 15, Some(4.5), Some(4.0));
        save(&mut chain, new_step.clone());
        assert!(chain.propagate(&new_step).is_empty());
    }

    #[test]
    fn test_boundaries_feed_brew_gravity() {
        let mut chain = three_step_chain();
        save(&mut chain, step(4, 25, Some(3.0), Some(2.5)));
        assert_eq!(chain.og(), chain.first().unwrap().og);
        assert_eq!(chain.fg(), Some(2.5));
        assert_eq!(chain.fg(), chain.last().unwrap().fg);
    }

    #[test]
    fn test_foreign_step_is_ignored() {
        let chain = three_step_chain();
        let mut foreign = step(9, 15, Some(1.0), Some(1.0));
        foreign.brew_id = 2;
        assert!(chain.propagate(&foreign).is_empty());
        assert_eq!(FermentationChain::new(2, chain.steps().to_vec()).len(), 0);
    }
}
