use std::collections::BTreeMap;
use std::hash::Hasher;

use casewalk_engine::{
    CaseContent, CaseEngine, CaseGraph, EnginePolicy, PlayState, PlayStatus, StageType,
    golden_path,
};
use serde_json::{Map, Value};
use twox_hash::XxHash64;

#[test]
fn bundled_policy_matches_the_builtin_defaults() {
    let mut snapshot = BTreeMap::new();
    snapshot.insert(
        "builtin",
        canonicalize_value(serde_json::to_value(EnginePolicy::default_config()).unwrap()),
    );
    snapshot.insert(
        "bundled",
        canonicalize_value(serde_json::to_value(EnginePolicy::load_from_static()).unwrap()),
    );
    let canonical = serde_json::to_string_pretty(&snapshot).unwrap();

    let builtin = snapshot_hash(serde_json::to_string(&snapshot["builtin"]).unwrap().as_bytes());
    let bundled = snapshot_hash(serde_json::to_string(&snapshot["bundled"]).unwrap().as_bytes());
    assert_eq!(
        builtin, bundled,
        "policy asset drifted from builtin defaults\n{canonical}"
    );
}

#[test]
fn demo_case_decodes_with_expected_shape() {
    let content =
        CaseContent::from_json(include_str!("../assets/cases/chest_pain.json")).unwrap();
    assert_eq!(content.meta.slug, "chest-pain");
    assert_eq!(content.meta.estimated_minutes, 25);
    assert_eq!(content.entry_stage.as_deref(), Some("triage"));
    assert_eq!(content.stages.len(), 7);

    let types: BTreeMap<&str, StageType> = content
        .stages
        .iter()
        .map(|stage| (stage.slug.as_str(), stage.stage_type))
        .collect();
    assert_eq!(types["triage"], StageType::Decision);
    assert_eq!(types["vitals-ecg"], StageType::Order);
    assert_eq!(types["differential"], StageType::Diagnosis);
    assert_eq!(types["reperfusion"], StageType::Management);
    assert_eq!(types["debrief"], StageType::Summary);

    let graph = CaseGraph::build(content).expect("bundled case builds");
    assert_eq!(graph.entry_slug(), "triage");
    assert_eq!(
        golden_path(&graph).len(),
        7,
        "every demo stage contributes a golden hop"
    );
}

#[test]
fn play_state_serialization_round_trips_mid_attempt() {
    let graph = CaseGraph::build(CaseContent::load_demo()).unwrap();
    let path = golden_path(&graph);
    let policy = EnginePolicy::default_config();
    let mut engine = CaseEngine::new(graph.clone(), policy.clone());
    for segment in &path[..3] {
        engine
            .select_option_at(&segment.stage_slug, &segment.option_value)
            .expect("golden hop applies");
    }
    let state = engine.state().clone();
    assert_eq!(state.timeline.len(), 3);
    assert_eq!(state.status, PlayStatus::InProgress);

    let saved = serde_json::to_string(&state).unwrap();
    let restored: PlayState = serde_json::from_str(&saved).unwrap();

    let original_value = serde_json::to_value(&state).unwrap();
    let restored_value = serde_json::to_value(&restored).unwrap();
    assert_eq!(original_value, restored_value, "round-trip mismatch");
    assert_eq!(restored.timeline, state.timeline);
    assert_eq!(restored.current_stage_slug, state.current_stage_slug);

    // Resuming from the restored snapshot picks up exactly where play stopped.
    let mut resumed = CaseEngine::from_state(graph, policy, restored);
    assert_eq!(
        resumed.state().last_step.as_ref().map(|step| step.id),
        Some(3)
    );
    for segment in &path[3..] {
        resumed
            .select_option_at(&segment.stage_slug, &segment.option_value)
            .expect("resumed attempt keeps playing");
    }
    assert_eq!(resumed.status(), PlayStatus::Completed);
}

fn canonicalize_value(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(canonicalize_value)
                .collect::<Vec<_>>(),
        ),
        Value::Object(map) => {
            let mut result = Map::with_capacity(map.len());
            let mut entries: Vec<_> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            for (key, value) in entries {
                result.insert(key, canonicalize_value(value));
            }
            Value::Object(result)
        }
        other => other,
    }
}

fn snapshot_hash(bytes: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(bytes);
    hasher.finish()
}
