//! N-way merge of branches already sorted on their key slots
//!
//! Each branch `i` exposes key slots `input_keys[i]` (one per direction)
//! and value slots `input_vals[i]` (one per output slot). Every call emits
//! the smallest current row across branches into the output slots. Only
//! the branch that produced the previous row is pulled again, so a
//! branch's accessors stay valid while its row waits. Ties go to the lower
//! branch index.

use std::cmp::Ordering;

use crate::document::{compare_values, Value};
use crate::exec::{CommonStats, SortDirection, SpecificStats};

use super::stage::{assert_slots_resolve, BoxedSbeStage, PlanNodeId, PlanState, SbeStage};
use super::value::{OwnedValueAccessor, SlotAccessor, SlotId, SlotVector};

pub struct MergeSortStage {
    children: Vec<BoxedSbeStage>,
    input_keys: Vec<SlotVector>,
    dirs: Vec<SortDirection>,
    input_vals: Vec<SlotVector>,
    output_vals: SlotVector,
    out_accessors: Vec<OwnedValueAccessor>,
    /// Whether branch `i` currently holds an unconsumed row
    ready: Vec<bool>,
    last_popped: Option<usize>,
    primed: bool,
    common: CommonStats,
}

impl MergeSortStage {
    pub fn new(
        children: Vec<BoxedSbeStage>,
        input_keys: Vec<SlotVector>,
        dirs: Vec<SortDirection>,
        input_vals: Vec<SlotVector>,
        output_vals: SlotVector,
        node_id: PlanNodeId,
    ) -> Self {
        assert_eq!(input_keys.len(), children.len(), "sort_merge: one key vector per branch");
        assert_eq!(input_vals.len(), children.len(), "sort_merge: one value vector per branch");
        assert!(
            input_keys.iter().all(|k| k.len() == dirs.len()),
            "sort_merge: every key vector needs one slot per direction"
        );
        assert!(
            input_vals.iter().all(|v| v.len() == output_vals.len()),
            "sort_merge: every value vector needs one slot per output slot"
        );

        let branches = children.len();
        Self {
            children,
            input_keys,
            dirs,
            input_vals,
            out_accessors: output_vals.iter().map(|_| OwnedValueAccessor::new()).collect(),
            output_vals,
            ready: vec![false; branches],
            last_popped: None,
            primed: false,
            common: CommonStats::with_node_id("sort_merge", node_id),
        }
    }

    fn key_value(&self, branch: usize, key: usize) -> &Value {
        let slot = self.input_keys[branch][key];
        self.children[branch]
            .get_accessor(slot)
            .unwrap_or_else(|| panic!("sort_merge: key slot s{} vanished after prepare", slot))
            .get_view_of_value()
    }

    fn compare_branches(&self, lhs: usize, rhs: usize) -> Ordering {
        for (key, dir) in self.dirs.iter().enumerate() {
            let ord = compare_values(self.key_value(lhs, key), self.key_value(rhs, key));
            let ord = dir.apply(ord);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    fn pull(&mut self, branch: usize) {
        self.ready[branch] = self.children[branch].get_next() == PlanState::Advanced;
    }
}

impl SbeStage for MergeSortStage {
    fn name(&self) -> &'static str {
        "sort_merge"
    }

    fn prepare(&mut self) {
        for (idx, child) in self.children.iter_mut().enumerate() {
            child.prepare();
            assert_slots_resolve("sort_merge", child.as_ref(), &self.input_keys[idx]);
            assert_slots_resolve("sort_merge", child.as_ref(), &self.input_vals[idx]);
        }
    }

    fn get_accessor(&self, slot: SlotId) -> Option<&dyn SlotAccessor> {
        self.output_vals
            .iter()
            .position(|s| *s == slot)
            .map(|idx| &self.out_accessors[idx] as &dyn SlotAccessor)
    }

    fn open(&mut self, re_open: bool) {
        self.common.opens += 1;
        self.common.is_eof = false;
        for child in self.children.iter_mut() {
            child.open(re_open);
        }
        self.ready.iter_mut().for_each(|r| *r = false);
        self.last_popped = None;
        self.primed = false;
    }

    fn get_next(&mut self) -> PlanState {
        if !self.primed {
            for branch in 0..self.children.len() {
                self.pull(branch);
            }
            self.primed = true;
        } else if let Some(branch) = self.last_popped.take() {
            self.pull(branch);
        }

        let mut best: Option<usize> = None;
        for branch in (0..self.children.len()).filter(|b| self.ready[*b]) {
            best = match best {
                Some(cur) if self.compare_branches(branch, cur) != Ordering::Less => Some(cur),
                _ => Some(branch),
            };
        }

        let Some(branch) = best else {
            self.common.is_eof = true;
            return PlanState::IsEof;
        };

        for idx in 0..self.output_vals.len() {
            let slot = self.input_vals[branch][idx];
            let value = self.children[branch]
                .get_accessor(slot)
                .map(|a| a.copy_value())
                .unwrap_or_default();
            self.out_accessors[idx].reset(value);
        }
        self.ready[branch] = false;
        self.last_popped = Some(branch);
        self.common.advanced += 1;
        PlanState::Advanced
    }

    fn close(&mut self) {
        self.common.closes += 1;
        for child in self.children.iter_mut() {
            child.close();
        }
    }

    fn common_stats(&self) -> &CommonStats {
        &self.common
    }

    fn specific_stats(&self) -> SpecificStats {
        SpecificStats::MergeSort {
            branches: self.children.len(),
        }
    }

    fn children(&self) -> Vec<&dyn SbeStage> {
        self.children.iter().map(|c| c.as_ref()).collect()
    }

    fn debug_slots(&self) -> Vec<SlotId> {
        self.output_vals.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sbe::ValuesStage;
    use serde_json::json;

    fn branch(keys: &[i64], tag: &str, node_id: PlanNodeId) -> BoxedSbeStage {
        let rows = keys.iter().map(|k| vec![json!(k), json!(tag)]).collect();
        Box::new(ValuesStage::new(vec![1, 2], rows, node_id))
    }

    fn drain(stage: &mut MergeSortStage) -> Vec<(i64, String)> {
        let mut out = Vec::new();
        while stage.get_next() == PlanState::Advanced {
            let k = stage.get_accessor(10).unwrap().get_view_of_value().as_i64().unwrap();
            let t = stage.get_accessor(11).unwrap().get_view_of_value().as_str().unwrap();
            out.push((k, t.to_string()));
        }
        out
    }

    fn merge(children: Vec<BoxedSbeStage>, dir: SortDirection) -> MergeSortStage {
        let n = children.len();
        MergeSortStage::new(
            children,
            vec![vec![1]; n],
            vec![dir],
            vec![vec![1, 2]; n],
            vec![10, 11],
            9,
        )
    }

    #[test]
    fn test_merges_ascending_with_ties_to_lower_branch() {
        let branches = vec![branch(&[1, 4, 4], "a", 1), branch(&[2, 4, 6], "b", 2)];
        let mut stage = merge(branches, SortDirection::Asc);
        stage.prepare();
        stage.open(false);

        let out = drain(&mut stage);
        let expected = [(1, "a"), (2, "b"), (4, "a"), (4, "a"), (4, "b"), (6, "b")];
        let expected: Vec<(i64, String)> =
            expected.iter().map(|(k, t)| (*k, t.to_string())).collect();
        assert_eq!(out, expected);
        assert!(stage.get_stats().common.is_eof);
    }

    #[test]
    fn test_merges_descending_and_handles_empty_branch() {
        let mut stage = merge(
            vec![branch(&[9, 3], "a", 1), branch(&[], "b", 2), branch(&[5], "c", 3)],
            SortDirection::Desc,
        );
        stage.prepare();
        stage.open(false);

        let keys: Vec<i64> = drain(&mut stage).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![9, 5, 3]);
        assert_eq!(stage.get_stats().specific, SpecificStats::MergeSort { branches: 3 });
    }

    #[test]
    fn test_reopen_restarts_merge() {
        let branches = vec![branch(&[1], "a", 1), branch(&[0], "b", 2)];
        let mut stage = merge(branches, SortDirection::Asc);
        stage.prepare();
        stage.open(false);
        assert_eq!(drain(&mut stage).len(), 2);
        stage.close();
        stage.open(true);
        assert_eq!(drain(&mut stage).len(), 2);
    }

    #[test]
    #[should_panic(expected = "one slot per direction")]
    fn test_key_arity_checked() {
        MergeSortStage::new(
            vec![branch(&[1], "a", 1)],
            vec![vec![1, 2]],
            vec![SortDirection::Asc],
            vec![vec![1]],
            vec![10],
            9,
        );
    }
}
