//! Sort Order Enforcement Property Tests
//!
//! Randomized with a fixed seed:
//! - Output is always in order under the pattern's comparator
//! - Every input result is either returned or dropped, never both
//! - Output equals the greedy "keep if not before the last kept" filter
//! - Dropped members are returned to the working set

use std::cmp::Ordering;

use aeroexec::document::{into_document, Document, Value};
use aeroexec::exec::{
    EnsureSortedStage, PlanExecutor, QueuedDataStage, SortKeyComparator, SortKeyGeneratorStage,
    SortPattern, SpecificStats, StageState,
};
use aeroexec::working_set::WorkingSet;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn random_docs(rng: &mut StdRng, n: usize) -> Vec<Document> {
    (0..n)
        .map(|i| {
            let a: Value = match rng.gen_range(0..4) {
                0 => json!(rng.gen_range(-5..5)),
                1 => json!(rng.gen_range(-5.0..5.0)),
                2 => json!(["x", "y", "z"][rng.gen_range(0..3)]),
                _ => Value::Null,
            };
            into_document(json!({ "a": a, "b": rng.gen_range(0..3), "seq": i })).unwrap()
        })
        .collect()
}

fn sort_key(pattern: &SortPattern, doc: &Document) -> Value {
    let comps = pattern.components();
    let get = |p: &str| doc.get(p).cloned().unwrap_or(Value::Null);
    if comps.len() == 1 {
        get(&comps[0].path)
    } else {
        Value::Array(comps.iter().map(|c| get(&c.path)).collect())
    }
}

/// Reference model of the stage
fn greedy_filter(pattern: &SortPattern, docs: &[Document]) -> Vec<Document> {
    let cmp = SortKeyComparator::new(pattern);
    let mut last: Option<Value> = None;
    let mut kept = Vec::new();
    for doc in docs {
        let key = sort_key(pattern, doc);
        if let Some(prev) = &last {
            if cmp.compare(prev, &key) == Ordering::Greater {
                continue;
            }
        }
        last = Some(key);
        kept.push(doc.clone());
    }
    kept
}

fn run(pattern: &SortPattern, docs: &[Document], stall: bool) -> (Vec<Document>, PlanExecutor) {
    let mut ws = WorkingSet::new();
    let mut q = QueuedDataStage::new();
    for doc in docs {
        q.push_back_document(&mut ws, doc.clone());
        if stall {
            q.push_back(StageState::NeedTime);
        }
    }
    let keyed = SortKeyGeneratorStage::new(pattern.clone(), Box::new(q));
    let root = EnsureSortedStage::new(pattern, Box::new(keyed));
    let mut exec = PlanExecutor::new(ws, Box::new(root));
    let out = exec.collect_all().unwrap();
    (out, exec)
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_output_matches_reference_and_is_sorted() {
    let mut rng = StdRng::seed_from_u64(0xE5);
    let patterns = ["a:asc", "a:desc", "b:asc,a:desc", "a:desc,b:desc"];

    for round in 0..200 {
        let pattern = SortPattern::parse(patterns[round % patterns.len()]).unwrap();
        let n = rng.gen_range(0..40);
        let docs = random_docs(&mut rng, n);

        let (out, exec) = run(&pattern, &docs, round % 2 == 0);
        assert_eq!(out, greedy_filter(&pattern, &docs), "round {}", round);

        let cmp = SortKeyComparator::new(&pattern);
        for pair in out.windows(2) {
            let ord = cmp.compare(&sort_key(&pattern, &pair[0]), &sort_key(&pattern, &pair[1]));
            assert_ne!(ord, Ordering::Greater, "round {}", round);
        }

        let SpecificStats::EnsureSorted { n_dropped } = exec.explain().specific else {
            panic!("unexpected root stats");
        };
        assert_eq!(out.len() as u64 + n_dropped, docs.len() as u64);
        assert_eq!(exec.live_members(), 0);
    }
}

#[test]
fn test_sorted_input_is_untouched() {
    let mut rng = StdRng::seed_from_u64(42);
    let pattern = SortPattern::parse("a:asc").unwrap();
    let mut values: Vec<i64> = (0..50).map(|_| rng.gen_range(0..20)).collect();
    values.sort();
    let docs: Vec<Document> = values
        .iter()
        .map(|v| into_document(json!({ "a": v })).unwrap())
        .collect();

    let (out, exec) = run(&pattern, &docs, false);
    assert_eq!(out, docs);
    assert_eq!(
        exec.explain().specific,
        SpecificStats::EnsureSorted { n_dropped: 0 }
    );
}

#[test]
fn test_equal_keys_are_kept() {
    let pattern = SortPattern::parse("a:desc").unwrap();
    let docs: Vec<Document> = [3, 3, 1, 2, 1, 1]
        .iter()
        .map(|v| into_document(json!({ "a": v })).unwrap())
        .collect();
    let (out, _) = run(&pattern, &docs, false);
    let kept: Vec<i64> = out.iter().map(|d| d["a"].as_i64().unwrap()).collect();
    assert_eq!(kept, vec![3, 3, 1, 1, 1]);
}

#[test]
fn test_integer_and_float_keys_compare_numerically() {
    let pattern = SortPattern::parse("a:asc").unwrap();
    let docs: Vec<Document> = [json!(1), json!(1.5), json!(1.0), json!(2)]
        .into_iter()
        .map(|v| into_document(json!({ "a": v })).unwrap())
        .collect();
    let (out, _) = run(&pattern, &docs, false);
    assert_eq!(out.len(), 3);
    assert_eq!(out[2]["a"], json!(2));
}
