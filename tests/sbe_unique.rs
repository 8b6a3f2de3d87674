//! Slot-Based Unique and Merge Tests
//!
//! - Unique keeps exactly the first row of every distinct key, in order
//! - Numerically equal keys of different types are duplicates
//! - Unique over a merge of sorted branches composes

use std::collections::HashSet;

use aeroexec::document::Value;
use aeroexec::exec::{SortDirection, SpecificStats};
use aeroexec::sbe::{
    debug_print, BoxedSbeStage, MaterializedRow, MergeSortStage, OwnedValueAccessor, PlanState,
    SbeStage, SlotAccessor, UniqueStage, ValuesStage,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn drain(stage: &mut dyn SbeStage, slots: &[u32]) -> Vec<Vec<Value>> {
    let mut out = Vec::new();
    while stage.get_next() == PlanState::Advanced {
        out.push(
            slots
                .iter()
                .map(|s| stage.get_accessor(*s).unwrap().copy_value())
                .collect(),
        );
    }
    out
}

fn row_key(row: &[Value], key_positions: &[usize]) -> MaterializedRow {
    let accessors: Vec<OwnedValueAccessor> = key_positions
        .iter()
        .map(|p| {
            let mut a = OwnedValueAccessor::new();
            a.reset(row[*p].clone());
            a
        })
        .collect();
    MaterializedRow::from_accessors(accessors.iter().map(|a| a as &dyn SlotAccessor))
}

// =============================================================================
// Unique
// =============================================================================

#[test]
fn test_random_rows_keep_first_occurrence() {
    let mut rng = StdRng::seed_from_u64(7);

    for round in 0..100 {
        let n = rng.gen_range(0..60);
        let rows: Vec<Vec<Value>> = (0..n)
            .map(|i| vec![json!(rng.gen_range(0..5)), json!(rng.gen_range(0..3)), json!(i)])
            .collect();
        let compound = round % 2 == 0;
        let key_slots = if compound { vec![1, 2] } else { vec![1] };
        let key_positions: Vec<usize> = key_slots.iter().map(|s| *s as usize - 1).collect();

        let mut seen = HashSet::new();
        let expected: Vec<Vec<Value>> = rows
            .iter()
            .filter(|r| seen.insert(row_key(r, &key_positions)))
            .cloned()
            .collect();

        let values = ValuesStage::new(vec![1, 2, 3], rows.clone(), 1);
        let mut stage = UniqueStage::new(Box::new(values), key_slots, 2);
        stage.prepare();
        stage.open(false);
        let out = drain(&mut stage, &[1, 2, 3]);
        stage.close();

        assert_eq!(out, expected, "round {}", round);
        assert_eq!(stage.dupes_dropped(), (rows.len() - expected.len()) as u64);
    }
}

#[test]
fn test_numeric_types_collapse() {
    let rows = vec![
        vec![json!(1), json!("int")],
        vec![json!(1.0), json!("float")],
        vec![json!("1"), json!("string")],
    ];
    let values = ValuesStage::new(vec![1, 2], rows, 1);
    let mut stage = UniqueStage::new(Box::new(values), vec![1], 2);
    stage.prepare();
    stage.open(false);
    let tags: Vec<Value> = drain(&mut stage, &[2]).into_iter().map(|mut r| r.remove(0)).collect();
    assert_eq!(tags, vec![json!("int"), json!("string")]);
}

#[test]
fn test_object_keys_compare_by_value() {
    let rows = vec![
        vec![json!({"a": 1, "b": [1, 2]})],
        vec![json!({"a": 1, "b": [1, 2.0]})],
        vec![json!({"a": 1, "b": [2, 1]})],
    ];
    let values = ValuesStage::new(vec![1], rows, 1);
    let mut stage = UniqueStage::new(Box::new(values), vec![1], 2);
    stage.prepare();
    stage.open(false);
    assert_eq!(drain(&mut stage, &[1]).len(), 2);
}

// =============================================================================
// Composition with merge
// =============================================================================

fn branch(keys: &[i64], node_id: u32) -> BoxedSbeStage {
    let rows = keys.iter().map(|k| vec![json!(k), json!(node_id)]).collect();
    Box::new(ValuesStage::new(vec![1, 2], rows, node_id))
}

#[test]
fn test_unique_over_merge_yields_sorted_distinct_keys() {
    let merge = MergeSortStage::new(
        vec![branch(&[1, 3, 5, 7], 1), branch(&[1, 2, 3, 8], 2), branch(&[], 3)],
        vec![vec![1]; 3],
        vec![SortDirection::Asc],
        vec![vec![1, 2]; 3],
        vec![10, 11],
        4,
    );
    let mut stage = UniqueStage::new(Box::new(merge), vec![10], 5);
    stage.prepare();
    stage.open(false);

    let out = drain(&mut stage, &[10, 11]);
    let keys: Vec<i64> = out.iter().map(|r| r[0].as_i64().unwrap()).collect();
    assert_eq!(keys, vec![1, 2, 3, 5, 7, 8]);
    // Ties go to the first branch.
    assert_eq!(out[0][1], json!(1));
    assert_eq!(out[2][1], json!(1));

    let stats = stage.get_stats();
    assert_eq!(
        stats.specific,
        SpecificStats::Unique {
            dupes_dropped: 2,
            keys_seen: 6
        }
    );
    assert_eq!(stats.children[0].specific, SpecificStats::MergeSort { branches: 3 });
    assert!(debug_print(&stage).starts_with("[5] unique [s10]\n  [4] sort_merge [s10, s11]"));
}
